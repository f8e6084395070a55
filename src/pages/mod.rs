//! Page-level components.

pub mod subreddit_about;

pub use subreddit_about::{
    AboutSummary, AboutView, MountOutcome, RenderState, SubredditAbout, SubredditAboutPage,
};
