//! # Data Population Controller
//!
//! Decides, for one page instance, where its data comes from: the payload
//! already present on the props, the shared store, or a fresh gateway fetch.
//!
//! ## State machine
//!
//! ```text
//! Unresolved ──populate──▶ Resolving ──ok──▶ Resolved
//!                               └──────err──▶ Failed(FetchError)
//! ```
//!
//! Each controller leaves `Unresolved` once. Further `populate` calls return
//! the promise created by the first call, so a second caller never triggers a
//! second gateway request. A failure is terminal for the instance: retrying
//! means remounting with a new controller.
//!
//! ## Decision rules (evaluated in order)
//!
//! 1. `synchronous == false`: resolve with `props.data` as is (an empty
//!    payload when absent). No store or gateway interaction.
//! 2. Build the request options from `props.api_options` plus the page's
//!    identifying parameter (`subreddit = props.subreddit_name`).
//! 3. `use_cache` and `props.data` populated: hydrate the store with it and
//!    resolve immediately.
//! 4. Otherwise load through the store and gateway; errors propagate with
//!    their original kind.

use crate::props::PageProps;
use hydrate_framework::{FetchError, Payload, PayloadPromise, Promise};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tracing::{debug, info, warn};

/// Resource type of the subreddit about data.
pub const SUBREDDITS: &str = "subreddits";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopulateState {
    Unresolved,
    Resolving,
    Resolved,
    Failed(FetchError),
}

#[derive(Debug)]
struct ControllerInner {
    state: PopulateState,
    promise: Option<PayloadPromise>,
}

#[derive(Debug)]
pub struct PopulateController {
    resource_type: &'static str,
    identity_param: &'static str,
    inner: Arc<Mutex<ControllerInner>>,
}

impl PopulateController {
    /// A controller for `resource_type`, keyed by the page's identifying
    /// parameter under `identity_param`.
    pub fn new(resource_type: &'static str, identity_param: &'static str) -> Self {
        Self {
            resource_type,
            identity_param,
            inner: Arc::new(Mutex::new(ControllerInner {
                state: PopulateState::Unresolved,
                promise: None,
            })),
        }
    }

    pub fn subreddit_about() -> Self {
        Self::new(SUBREDDITS, "subreddit")
    }

    pub fn state(&self) -> PopulateState {
        lock(&self.inner).state.clone()
    }

    pub fn populate(&self, props: &PageProps, synchronous: bool, use_cache: bool) -> PayloadPromise {
        let mut inner = lock(&self.inner);
        if let Some(promise) = &inner.promise {
            debug!(state = ?inner.state, "Reusing pending population");
            return promise.clone();
        }
        inner.state = PopulateState::Resolving;

        if !synchronous {
            debug!("Resolving with props data");
            return resolve_now(&mut inner, props.data.clone().unwrap_or_default());
        }

        let mut extra = BTreeMap::new();
        extra.insert(self.identity_param.to_string(), props.subreddit_name.clone());
        let options = props
            .api
            .build_options(&props.api_options, &extra)
            .use_cache(use_cache);

        if let Some(data) = props.data.as_ref().filter(|d| use_cache && d.is_populated()) {
            match props.api.hydrate(self.resource_type, &options, data) {
                Ok(outcome) => debug!(?outcome, "Hydrated store from props"),
                Err(e) => warn!(error = %e, "Hydration rejected"),
            }
            return resolve_now(&mut inner, data.clone());
        }

        info!(
            resource_type = self.resource_type,
            subreddit = %props.subreddit_name,
            use_cache,
            "Fetching"
        );
        let source = props.api.get(self.resource_type, options);
        let tracker = Arc::downgrade(&self.inner);
        let promise = Promise::from_future(async move {
            let result = source.await;
            settle(&tracker, &result);
            result
        });
        inner.promise = Some(promise.clone());
        promise
    }
}

fn resolve_now(inner: &mut ControllerInner, payload: Payload) -> PayloadPromise {
    let promise = Promise::resolved(Ok(payload));
    inner.state = PopulateState::Resolved;
    inner.promise = Some(promise.clone());
    promise
}

// The controller may be gone by the time the fetch completes; then there is
// nothing to update.
fn settle(tracker: &Weak<Mutex<ControllerInner>>, result: &Result<Payload, FetchError>) {
    let Some(inner) = tracker.upgrade() else {
        return;
    };
    let mut inner = lock(&inner);
    if inner.state != PopulateState::Resolving {
        return;
    }
    inner.state = match result {
        Ok(_) => PopulateState::Resolved,
        Err(e) => PopulateState::Failed(e.clone()),
    };
}

fn lock(inner: &Mutex<ControllerInner>) -> MutexGuard<'_, ControllerInner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}
