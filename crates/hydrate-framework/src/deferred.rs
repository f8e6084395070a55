//! # Resolve-Once Promises
//!
//! [`Promise<T>`] is a cloneable handle to a future that resolves **at most
//! once**. Every clone observes the same output, and the underlying work is
//! driven by whichever clone is polled first. This replaces the manual
//! `defer.resolve(..)` style: there is no resolver that could be called twice,
//! only a future whose output is cached after its single completion.
//!
//! Two promises are "the same future object" iff [`Promise::ptr_eq`] holds.

use crate::error::FetchError;
use crate::payload::Payload;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

/// The promise type handed out by the store and the population controller.
pub type PayloadPromise = Promise<Result<Payload, FetchError>>;

/// A shared, resolve-once future.
pub struct Promise<T: Clone> {
    inner: Shared<BoxFuture<'static, T>>,
}

impl<T> Promise<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Wraps a future. It starts running the first time any clone is polled.
    pub fn from_future<F>(future: F) -> Self
    where
        F: Future<Output = T> + Send + 'static,
    {
        Self {
            inner: future.boxed().shared(),
        }
    }

    /// A promise that is already resolved with `value`.
    pub fn resolved(value: T) -> Self {
        Self::from_future(futures::future::ready(value))
    }

    /// Returns `true` if both handles point at the same underlying future.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.inner.ptr_eq(&other.inner)
    }

    /// The output, if the future has already completed.
    pub fn peek(&self) -> Option<&T> {
        self.inner.peek()
    }
}

impl<T: Clone> Clone for Promise<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone> Future for Promise<T> {
    type Output = T;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<T> {
        self.inner.poll_unpin(cx)
    }
}

impl<T: Clone> fmt::Debug for Promise<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Promise").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_clones_share_a_single_run() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = runs.clone();
        let promise = Promise::from_future(async move {
            counter.fetch_add(1, Ordering::SeqCst);
            42u32
        });
        let other = promise.clone();

        assert!(promise.ptr_eq(&other));
        assert_eq!(other.await, 42);
        assert_eq!(promise.clone().await, 42);
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(promise.peek(), Some(&42));
    }

    #[tokio::test]
    async fn test_distinct_promises_are_not_ptr_eq() {
        let a = Promise::resolved(1u8);
        let b = Promise::resolved(1u8);
        assert!(!a.ptr_eq(&b));
        assert_eq!(a.await, b.await);
    }
}
