use async_trait::async_trait;
use hydrate_framework::{
    ApiHandle, ApiOptions, EntryState, FetchError, GatewayActor, HydrateOutcome, HydrationStore,
    Origin, Payload, RequestOptions, Transport, FINGERPRINT_HEADER,
};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

// --- Test Transport ---

/// Counts calls and holds every response until released.
struct GatedTransport {
    calls: Arc<AtomicUsize>,
    release: Arc<Notify>,
    fingerprints: Arc<std::sync::Mutex<Vec<String>>>,
}

#[async_trait]
impl Transport for GatedTransport {
    async fn send(
        &self,
        _resource_type: &str,
        options: &RequestOptions,
    ) -> Result<Payload, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(fp) = options.headers.get(FINGERPRINT_HEADER) {
            self.fingerprints.lock().unwrap().push(fp.clone());
        }
        self.release.notified().await;
        let subreddit = options.query.get("subreddit").cloned().unwrap_or_default();
        if subreddit == "broken" {
            return Err(FetchError::Server { status: 500 });
        }
        Ok(Payload::from_value(json!({ "display_name": subreddit, "subscribers": 100 })))
    }
}

fn options_for(api: &ApiHandle, subreddit: &str) -> RequestOptions {
    let mut extra = BTreeMap::new();
    extra.insert("subreddit".to_string(), subreddit.to_string());
    api.build_options(&ApiOptions::default(), &extra)
}

// --- Test ---

#[tokio::test]
async fn test_concurrent_loads_share_one_gateway_call() {
    let calls = Arc::new(AtomicUsize::new(0));
    let release = Arc::new(Notify::new());
    let fingerprints = Arc::new(std::sync::Mutex::new(Vec::new()));

    let (actor, client) = GatewayActor::new(8);
    let handle = tokio::spawn(actor.run(GatedTransport {
        calls: calls.clone(),
        release: release.clone(),
        fingerprints: fingerprints.clone(),
    }));
    let store = HydrationStore::new();
    let api = ApiHandle::new(client, store.clone());

    // 1. Three consumers ask for the same key before anything resolves
    let first = api.get("subreddits", options_for(&api, "pics"));
    let second = api.get("subreddits", options_for(&api, "pics"));
    let third = api.get("subreddits", options_for(&api, "pics"));
    assert!(first.ptr_eq(&second) && second.ptr_eq(&third));

    // 2. Drive the shared fetch and let the transport answer
    let driver = tokio::spawn(first.clone());
    while calls.load(Ordering::SeqCst) == 0 {
        tokio::task::yield_now().await;
    }
    release.notify_one();

    let payload = driver.await.unwrap().unwrap();
    assert_eq!(second.await, Ok(payload.clone()));
    assert_eq!(third.await, Ok(payload));
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    // 3. The result is now cached as fetched, and hydration cannot replace it
    let query = options_for(&api, "pics").to_query("subreddits");
    assert_eq!(store.state(&query), Some(EntryState::Ready(Origin::Fetched)));
    let outcome = api
        .hydrate(
            "subreddits",
            &options_for(&api, "pics"),
            &Payload::from_value(json!({ "subscribers": 1 })),
        )
        .unwrap();
    assert_eq!(outcome, HydrateOutcome::Superseded);

    assert_eq!(
        fingerprints.lock().unwrap().as_slice(),
        &[query.key().to_string()]
    );

    drop(api);
    handle.await.unwrap();
}

#[tokio::test]
async fn test_server_error_is_shared_and_not_cached() {
    let calls = Arc::new(AtomicUsize::new(0));
    let release = Arc::new(Notify::new());
    let (actor, client) = GatewayActor::new(8);
    tokio::spawn(actor.run(GatedTransport {
        calls: calls.clone(),
        release: release.clone(),
        fingerprints: Arc::default(),
    }));
    let store = HydrationStore::new();
    let api = ApiHandle::new(client, store.clone());

    let promise = api.get("subreddits", options_for(&api, "broken"));
    let joined = api.get("subreddits", options_for(&api, "broken"));

    let driver = tokio::spawn(promise);
    while calls.load(Ordering::SeqCst) == 0 {
        tokio::task::yield_now().await;
    }
    release.notify_one();

    assert_eq!(driver.await.unwrap(), Err(FetchError::Server { status: 500 }));
    assert_eq!(joined.await, Err(FetchError::Server { status: 500 }));
    assert!(store.is_empty());
}
