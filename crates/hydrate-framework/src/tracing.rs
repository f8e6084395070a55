//! # Observability & Tracing
//!
//! [`setup_tracing`] installs the structured logger used by the binaries.
//!
//! The format is compact and hides module paths (`with_target(false)`); the
//! interesting context travels in span fields instead. Every gateway request
//! runs in a `request` span carrying `resource_type` and `fingerprint`, so a
//! line like
//!
//! ```text
//! INFO request{id=1 resource_type=subreddits fingerprint=subreddits{"subreddit":"pics"}}: Request ok
//! ```
//!
//! ties a response back to the cache key it will settle.
//!
//! ```bash
//! RUST_LOG=info cargo run -- pics     # requests and page transitions
//! RUST_LOG=debug cargo run -- pics    # plus cache hits, misses and hydrations
//! ```

pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
