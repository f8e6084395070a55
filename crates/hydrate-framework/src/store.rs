//! # Cache/Hydration Store
//!
//! The process-wide keyed store mapping a [`ResourceKey`] to either a resolved
//! [`Payload`] or the shared future of the one fetch currently in flight for
//! that key.
//!
//! [`HydrationStore`] is a cheap, cloneable handle. It is created once by the
//! runtime and passed to every controller and gateway call; there is no
//! module-level global. All mutation goes through [`hydrate`], [`get`],
//! [`invalidate`] and [`load`].
//!
//! Every operation takes the lock for a single map operation and never holds
//! it across an `.await`, so a consumer observes either the in-flight future
//! or a fully resolved entry.
//!
//! [`hydrate`]: HydrationStore::hydrate
//! [`get`]: HydrationStore::get
//! [`invalidate`]: HydrationStore::invalidate
//! [`load`]: HydrationStore::load

use crate::deferred::{PayloadPromise, Promise};
use crate::error::{FetchError, HydrateError};
use crate::payload::{Payload, ResourceKey, ResourceQuery};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tracing::{debug, warn};

/// Where a ready entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Seeded from server-rendered data.
    Hydrated,
    /// Produced by a completed gateway fetch.
    Fetched,
}

/// Result of a successful [`HydrationStore::hydrate`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HydrateOutcome {
    /// The payload is now the entry for the key.
    Seeded,
    /// The key already held this exact hydrated payload.
    Unchanged,
    /// The key holds a fetched result or a fetch in flight; left as is.
    Superseded,
}

/// Observable state of one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    Ready(Origin),
    InFlight,
}

enum Entry {
    Ready { payload: Payload, origin: Origin },
    InFlight { generation: u64, promise: PayloadPromise },
}

// Entries live as long as the store: there is no eviction, only
// `invalidate` and `clear`.
#[derive(Default)]
struct StoreInner {
    entries: HashMap<ResourceKey, Entry>,
    next_generation: u64,
}

/// Shared handle to the cache.
#[derive(Clone, Default)]
pub struct HydrationStore {
    inner: Arc<Mutex<StoreInner>>,
}

impl HydrationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the entry for `query` with an already-known payload.
    ///
    /// Never replaces a fetched result or an in-flight fetch. Rejects payloads
    /// without populated `data`, leaving the entry unchanged.
    pub fn hydrate(
        &self,
        query: &ResourceQuery,
        payload: &Payload,
    ) -> Result<HydrateOutcome, HydrateError> {
        let key = query.key();
        if !payload.is_populated() {
            warn!(%key, "Rejected hydration without data");
            return Err(HydrateError::InvalidPayload { key });
        }

        let mut inner = lock(&self.inner);
        let outcome = match inner.entries.get(&key) {
            Some(Entry::Ready {
                origin: Origin::Fetched,
                ..
            })
            | Some(Entry::InFlight { .. }) => HydrateOutcome::Superseded,
            Some(Entry::Ready {
                payload: existing,
                origin: Origin::Hydrated,
            }) if existing == payload => HydrateOutcome::Unchanged,
            _ => {
                inner.entries.insert(
                    key.clone(),
                    Entry::Ready {
                        payload: payload.clone(),
                        origin: Origin::Hydrated,
                    },
                );
                HydrateOutcome::Seeded
            }
        };
        debug!(%key, ?outcome, "Hydrate");
        Ok(outcome)
    }

    /// Returns the ready payload for `query`, if caching was requested.
    pub fn get(&self, query: &ResourceQuery) -> Option<Payload> {
        if !query.use_cache {
            return None;
        }
        let key = query.key();
        let inner = lock(&self.inner);
        let found = match inner.entries.get(&key) {
            Some(Entry::Ready { payload, .. }) => Some(payload.clone()),
            _ => None,
        };
        debug!(%key, hit = found.is_some(), "Get");
        found
    }

    /// Removes the entry for `query`. Returns whether anything was removed.
    pub fn invalidate(&self, query: &ResourceQuery) -> bool {
        let key = query.key();
        let removed = lock(&self.inner).entries.remove(&key).is_some();
        debug!(%key, removed, "Invalidate");
        removed
    }

    /// Single-flight load.
    ///
    /// With `use_cache`, a ready entry resolves immediately and an in-flight
    /// fetch is joined (the returned promise is the same future). Without it,
    /// the entry is dropped and a fresh fetch always starts.
    ///
    /// The fetch runs on its own Tokio task, started here, so it completes
    /// and settles the entry even if every promise is dropped unpolled. Must
    /// be called inside a Tokio runtime. On success the entry becomes
    /// [`Origin::Fetched`]; on failure it is removed so a later attempt
    /// fetches again. A payload without populated `data` is a failure
    /// ([`FetchError::Decode`]) and is never cached. A completion that was
    /// superseded by a newer fetch of the same key is not written back.
    pub fn load<F, Fut>(&self, query: &ResourceQuery, fetch: F) -> PayloadPromise
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<Payload, FetchError>> + Send + 'static,
    {
        let key = query.key();
        let mut inner = lock(&self.inner);

        if query.use_cache {
            match inner.entries.get(&key) {
                Some(Entry::Ready { payload, .. }) => {
                    debug!(%key, "Cache hit");
                    return Promise::resolved(Ok(payload.clone()));
                }
                Some(Entry::InFlight { promise, .. }) => {
                    debug!(%key, "Joined in-flight fetch");
                    return promise.clone();
                }
                None => {}
            }
        } else if inner.entries.remove(&key).is_some() {
            debug!(%key, "Bypassed cached entry");
        }

        let generation = inner.next_generation;
        inner.next_generation += 1;

        // The task settles under the same lock, so it cannot run `settle`
        // before the in-flight entry below is inserted.
        let store = Arc::downgrade(&self.inner);
        let settle_key = key.clone();
        let task = tokio::spawn(async move {
            let result = fetch().await.and_then(require_data);
            settle(&store, &settle_key, generation, &result);
            result
        });
        let promise = Promise::from_future(async move {
            task.await
                .unwrap_or_else(|e| Err(FetchError::Network(format!("fetch task failed: {e}"))))
        });

        debug!(%key, generation, "Fetch started");
        inner.entries.insert(
            key,
            Entry::InFlight {
                generation,
                promise: promise.clone(),
            },
        );
        promise
    }

    pub fn state(&self, query: &ResourceQuery) -> Option<EntryState> {
        lock(&self.inner)
            .entries
            .get(&query.key())
            .map(|entry| match entry {
                Entry::Ready { origin, .. } => EntryState::Ready(*origin),
                Entry::InFlight { .. } => EntryState::InFlight,
            })
    }

    pub fn len(&self) -> usize {
        lock(&self.inner).entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every entry. In-flight fetches still resolve their promises but
    /// will not write back.
    pub fn clear(&self) {
        lock(&self.inner).entries.clear();
    }
}

impl std::fmt::Debug for HydrationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HydrationStore")
            .field("entries", &self.len())
            .finish()
    }
}

fn settle(
    store: &Weak<Mutex<StoreInner>>,
    key: &ResourceKey,
    generation: u64,
    result: &Result<Payload, FetchError>,
) {
    let Some(store) = store.upgrade() else {
        return;
    };
    let mut inner = lock(&store);
    match inner.entries.get(key) {
        Some(Entry::InFlight { generation: g, .. }) if *g == generation => {}
        _ => {
            debug!(%key, generation, "Discarded superseded fetch result");
            return;
        }
    }
    match result {
        Ok(payload) => {
            inner.entries.insert(
                key.clone(),
                Entry::Ready {
                    payload: payload.clone(),
                    origin: Origin::Fetched,
                },
            );
            debug!(%key, generation, size = inner.entries.len(), "Fetch settled");
        }
        Err(e) => {
            inner.entries.remove(key);
            warn!(%key, generation, error = %e, "Fetch failed");
        }
    }
}

fn require_data(payload: Payload) -> Result<Payload, FetchError> {
    if payload.is_populated() {
        Ok(payload)
    } else {
        Err(FetchError::Decode("response has no data".to_string()))
    }
}

// Critical sections only swap map entries, so a poisoned lock still guards
// a consistent map.
fn lock(inner: &Mutex<StoreInner>) -> MutexGuard<'_, StoreInner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}
