//! # Listing Client Demo
//!
//! Renders the about page of one subreddit the way a full page load would:
//!
//! 1. **Server pass**: [`SubredditAboutPage::populate_data`] with
//!    `synchronous = true` fetches the about data through the gateway.
//! 2. **Hand-off**: the payload becomes the client page's props.
//! 3. **Client pass**: the page starts loaded, mounts, and hydrates the
//!    store instead of fetching again.
//!
//! ```bash
//! RUST_LOG=info cargo run -- pics
//! LISTING_API_BASE_URL=http://localhost:8080 cargo run -- rust
//! ```

use hydrate_framework::tracing::setup_tracing;
use listing_client::lifecycle::ClientRuntime;
use listing_client::pages::{MountOutcome, SubredditAboutPage};
use tracing::{error, info, Instrument};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), String> {
    setup_tracing();

    let subreddit = std::env::args().nth(1).unwrap_or_else(|| "pics".to_string());
    let runtime = ClientRuntime::from_env().map_err(|e| e.to_string())?;

    let span = tracing::info_span!("server_render", %subreddit);
    let server_props = runtime.props(&subreddit).with_tracking(true);
    let data = async {
        info!("Populating about page");
        SubredditAboutPage::populate_data(&server_props, true, true).await
    }
    .instrument(span)
    .await;

    let data = match data {
        Ok(data) => data,
        Err(e) => {
            error!(error = %e, "Server render could not load data");
            drop(server_props);
            runtime.shutdown().await.map_err(|e| e.to_string())?;
            return Err(e.to_string());
        }
    };

    let page = SubredditAboutPage::new(runtime.props(&subreddit).with_data(data).with_tracking(true));
    let outcome = page
        .mount()
        .instrument(tracing::info_span!("client_mount", %subreddit))
        .await
        .map_err(|e| e.to_string())?;

    match (&outcome, page.view().summary) {
        (MountOutcome::Applied, Some(summary)) => {
            info!(route = %page.route(), readers = %summary.readers, active = %summary.users_here_now, "Rendered");
            println!("{}", page.route());
            println!("{}", summary.readers);
            println!("{}", summary.users_here_now);
            println!("{}", summary.description_html);
        }
        _ => error!(?outcome, "Page did not load"),
    }

    drop(page);
    drop(server_props);
    runtime.shutdown().await.map_err(|e| e.to_string())?;
    Ok(())
}
