//! # Subreddit About Page
//!
//! Page component for `r/{name}/about`. It owns its [`RenderState`], asks a
//! [`PopulateController`] for data and moves from *loading* to *loaded* when
//! the data arrives.
//!
//! The render state lives behind an `Arc` that only the page holds; the task
//! started by [`SubredditAboutPage::mount`] keeps a `Weak` to it. If the page
//! is dropped before the data arrives, the result is discarded and the task
//! reports [`MountOutcome::Stale`].

use crate::events::AppEvent;
use crate::populate::PopulateController;
use crate::props::PageProps;
use hydrate_framework::{FetchError, Payload, PayloadPromise};
use serde::Deserialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;
use tracing::{debug, info, info_span, warn, Instrument};

/// The fields of the about resource this page shows.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SubredditAbout {
    #[serde(default)]
    pub subscribers: u64,
    #[serde(default)]
    pub accounts_active: u64,
    #[serde(default)]
    pub description_html: String,
}

/// Per-instance state. `loaded` is true iff `payload` is populated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderState {
    pub payload: Payload,
    pub loaded: bool,
}

impl RenderState {
    pub fn from_props(data: Option<&Payload>) -> Self {
        let payload = data.cloned().unwrap_or_default();
        let loaded = payload.is_populated();
        Self { payload, loaded }
    }

    fn apply(&mut self, payload: Payload) {
        self.loaded = payload.is_populated();
        self.payload = payload;
    }
}

/// What the template needs to draw the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AboutView {
    pub loading: bool,
    pub summary: Option<AboutSummary>,
    pub tracking: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AboutSummary {
    pub readers: String,
    pub users_here_now: String,
    pub description_html: String,
}

/// How a mount's data request ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MountOutcome {
    /// The result was applied to the page's state.
    Applied,
    /// The page was gone when the result arrived.
    Stale,
    /// The request failed; the page stays in its loading state.
    Failed(FetchError),
}

pub struct SubredditAboutPage {
    props: PageProps,
    state: Arc<Mutex<RenderState>>,
    controller: PopulateController,
}

impl SubredditAboutPage {
    pub fn new(props: PageProps) -> Self {
        let state = RenderState::from_props(props.data.as_ref());
        Self {
            props,
            state: Arc::new(Mutex::new(state)),
            controller: PopulateController::subreddit_about(),
        }
    }

    pub fn route(&self) -> String {
        format!("r/{}/about", self.props.subreddit_name)
    }

    /// Server-render entry point: a fresh controller per render pass.
    pub fn populate_data(props: &PageProps, synchronous: bool, use_cache: bool) -> PayloadPromise {
        PopulateController::subreddit_about().populate(props, synchronous, use_cache)
    }

    /// Announces the route and starts loading data. The returned task applies
    /// the result to this page's state, if the page still exists by then.
    pub fn mount(&self) -> JoinHandle<MountOutcome> {
        let promise = self.controller.populate(&self.props, true, true);
        let state = Arc::downgrade(&self.state);
        let route = self.route();
        self.props
            .app
            .emit(AppEvent::TopNavSubredditChange(route.clone()));

        let span = info_span!("mount", %route);
        tokio::spawn(
            async move {
                let result = promise.await;
                let Some(state) = state.upgrade() else {
                    debug!("Discarded result for unmounted page");
                    return MountOutcome::Stale;
                };
                match result {
                    Ok(payload) => {
                        let mut state = lock(&state);
                        state.apply(payload);
                        info!(loaded = state.loaded, "Page data applied");
                        MountOutcome::Applied
                    }
                    Err(e) => {
                        warn!(error = %e, status = ?e.status(), "Page data failed to load");
                        MountOutcome::Failed(e)
                    }
                }
            }
            .instrument(span),
        )
    }

    /// Signals that the page re-rendered.
    pub fn update(&self) {
        self.props.app.emit(AppEvent::PageUpdate(self.route()));
    }

    pub fn controller(&self) -> &PopulateController {
        &self.controller
    }

    pub fn render_state(&self) -> RenderState {
        lock(&self.state).clone()
    }

    pub fn is_loaded(&self) -> bool {
        lock(&self.state).loaded
    }

    pub fn view(&self) -> AboutView {
        let state = lock(&self.state);
        let tracking = if self.props.render_tracking {
            state.payload.tracking().map(str::to_string)
        } else {
            None
        };

        let summary = if state.loaded {
            match state.payload.decode::<SubredditAbout>() {
                Ok(about) => Some(AboutSummary {
                    readers: format!("{} readers", about.subscribers),
                    users_here_now: format!("{} users here now", about.accounts_active),
                    description_html: about.description_html,
                }),
                Err(e) => {
                    warn!(error = %e, "Unreadable about data");
                    None
                }
            }
        } else {
            None
        };

        AboutView {
            loading: summary.is_none(),
            summary,
            tracking,
        }
    }
}

fn lock(state: &Mutex<RenderState>) -> MutexGuard<'_, RenderState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EventBus, TOP_NAV_SUBREDDIT_CHANGE};
    use hydrate_framework::mock::MockGateway;
    use hydrate_framework::HydrationStore;
    use serde_json::json;

    fn about() -> Payload {
        Payload::from_value(json!({
            "subscribers": 100,
            "accounts_active": 5,
            "description_html": "<p>hi</p>"
        }))
    }

    #[test]
    fn test_render_state_from_props() {
        assert_eq!(RenderState::from_props(None), RenderState::default());
        let seeded = RenderState::from_props(Some(&about()));
        assert!(seeded.loaded);
        let empty = RenderState::from_props(Some(&Payload::from_value(json!({}))));
        assert!(!empty.loaded);
    }

    #[tokio::test]
    async fn test_view_of_preseeded_page() {
        let mock = MockGateway::new();
        let props = PageProps::new("pics", mock.api(HydrationStore::new()), EventBus::default())
            .with_data(about().with_tracking("https://pixel.example/t.gif"))
            .with_tracking(true);
        let page = SubredditAboutPage::new(props);

        let view = page.view();
        assert!(!view.loading);
        let summary = view.summary.unwrap();
        assert_eq!(summary.readers, "100 readers");
        assert_eq!(summary.users_here_now, "5 users here now");
        assert_eq!(summary.description_html, "<p>hi</p>");
        assert_eq!(view.tracking.as_deref(), Some("https://pixel.example/t.gif"));
    }

    #[tokio::test]
    async fn test_tracking_hidden_unless_requested() {
        let mock = MockGateway::new();
        let props = PageProps::new("pics", mock.api(HydrationStore::new()), EventBus::default())
            .with_data(about().with_tracking("https://pixel.example/t.gif"));
        assert_eq!(SubredditAboutPage::new(props).view().tracking, None);
    }

    #[tokio::test]
    async fn test_mount_emits_route_and_update_emits_page_update() {
        let mock = MockGateway::new();
        let app = EventBus::default();
        let mut events = app.subscribe();
        let props = PageProps::new("pics", mock.api(HydrationStore::new()), app)
            .with_data(about());
        let page = SubredditAboutPage::new(props);

        assert_eq!(page.mount().await.unwrap(), MountOutcome::Applied);
        page.update();

        let first = events.recv().await.unwrap();
        assert_eq!(first.name(), TOP_NAV_SUBREDDIT_CHANGE);
        assert_eq!(first, AppEvent::TopNavSubredditChange("r/pics/about".into()));
        assert_eq!(
            events.recv().await.unwrap(),
            AppEvent::PageUpdate("r/pics/about".into())
        );
        assert_eq!(mock.call_count(), 0);
    }
}
