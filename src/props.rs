//! # Page Props
//!
//! The props contract a page component receives from the page-view layer.

use crate::events::EventBus;
use hydrate_framework::{ApiHandle, ApiOptions, Payload};
use serde::{Deserialize, Serialize};

/// The signed-in user, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    pub name: String,
    #[serde(default)]
    pub inbox_count: u32,
}

#[derive(Clone, Debug)]
pub struct PageProps {
    /// Server-rendered payload handed over to the client, if any.
    pub data: Option<Payload>,
    pub api_options: ApiOptions,
    pub subreddit_name: String,
    pub api: ApiHandle,
    pub user: Option<UserRef>,
    pub app: EventBus,
    pub render_tracking: bool,
}

impl PageProps {
    pub fn new(subreddit_name: impl Into<String>, api: ApiHandle, app: EventBus) -> Self {
        Self {
            data: None,
            api_options: ApiOptions::default(),
            subreddit_name: subreddit_name.into(),
            api,
            user: None,
            app,
            render_tracking: false,
        }
    }

    pub fn with_data(mut self, data: Payload) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_api_options(mut self, api_options: ApiOptions) -> Self {
        self.api_options = api_options;
        self
    }

    pub fn with_user(mut self, user: UserRef) -> Self {
        self.user = Some(user);
        self
    }

    pub fn with_tracking(mut self, render_tracking: bool) -> Self {
        self.render_tracking = render_tracking;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hydrate_framework::mock::MockGateway;
    use hydrate_framework::HydrationStore;

    #[tokio::test]
    async fn test_builders_fill_props() {
        let mock = MockGateway::new();
        let props = PageProps::new("pics", mock.api(HydrationStore::new()), EventBus::default());
        assert_eq!(props.subreddit_name, "pics");
        assert!(props.data.is_none() && props.user.is_none() && !props.render_tracking);

        let props = props
            .with_user(UserRef {
                name: "reader".into(),
                inbox_count: 3,
            })
            .with_api_options(ApiOptions::default().with_query("sort", "top"))
            .with_tracking(true);
        assert_eq!(props.user.as_ref().map(|u| u.name.as_str()), Some("reader"));
        assert_eq!(props.api_options.query.get("sort").map(String::as_str), Some("top"));
        assert!(props.render_tracking);
    }

    #[test]
    fn test_user_ref_inbox_count_defaults_to_zero() {
        let user: UserRef = serde_json::from_str(r#"{ "name": "reader" }"#).unwrap();
        assert_eq!(user.inbox_count, 0);
    }
}
