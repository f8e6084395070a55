//! # Listing Client
//!
//! Data population and hydration for the pages of a content-listing web
//! client, built on [`hydrate_framework`].
//!
//! ## Module Tour
//!
//! - [`populate`]: the Data Population Controller. Decides between props
//!   data, the shared store and a fresh fetch, and resolves exactly once.
//! - [`pages`]: page components. [`SubredditAboutPage`](pages::SubredditAboutPage)
//!   owns its render state and moves from loading to loaded.
//! - [`props`] and [`events`]: the contract with the page-view layer and the
//!   navigation collaborators.
//! - [`lifecycle`]: [`ClientRuntime`](lifecycle::ClientRuntime) wires the store,
//!   the gateway actor and the event bus together.
//!
//! ## Server render, then client hand-off
//!
//! ```rust,ignore
//! let runtime = ClientRuntime::from_env()?;
//!
//! // server: resolve everything before producing output
//! let data = SubredditAboutPage::populate_data(&runtime.props("pics"), true, true).await?;
//!
//! // client: the page starts loaded and hydrates the store instead of refetching
//! let page = SubredditAboutPage::new(runtime.props("pics").with_data(data));
//! page.mount().await?;
//! ```
//!
//! ```bash
//! RUST_LOG=info cargo run -- pics
//! ```

pub mod events;
pub mod lifecycle;
pub mod pages;
pub mod populate;
pub mod props;
