//! # Event Bus
//!
//! Named events a page emits for the navigation collaborators. Delivery is a
//! Tokio broadcast channel; emitting with nobody subscribed is fine.

use tokio::sync::broadcast;
use tracing::debug;

pub const TOP_NAV_SUBREDDIT_CHANGE: &str = "topnav:subreddit:change";
pub const PAGE_UPDATE: &str = "page:update";

const DEFAULT_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// Navigation context changed; carries the new route, e.g. `r/pics/about`.
    TopNavSubredditChange(String),
    /// The page re-rendered with new props; carries its route.
    PageUpdate(String),
}

impl AppEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::TopNavSubredditChange(_) => TOP_NAV_SUBREDDIT_CHANGE,
            Self::PageUpdate(_) => PAGE_UPDATE,
        }
    }
}

#[derive(Clone, Debug)]
pub struct EventBus {
    sender: broadcast::Sender<AppEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.sender.subscribe()
    }

    /// Emits `event`, returning how many subscribers received it.
    pub fn emit(&self, event: AppEvent) -> usize {
        let name = event.name();
        let receivers = self.sender.send(event).unwrap_or(0);
        debug!(event = name, receivers, "Emit");
        receivers
    }
}
