pub mod api;
pub mod auth;
pub mod models;
pub mod rate_limiter;
mod source;


pub use api::RedditApiClient;
pub use auth::{with_fresh_token, AppOnlyAuthenticator, RedditOAuth2Config, RedditToken, TokenSource};
pub use rate_limiter::{RateLimitConfig, RateLimiter};

use reqwest::redirect::Policy;
use reqwest::Client;
use std::time::Duration;
use wordcount_core::CoreError;

/// Read-only Reddit client authenticated as an application.
#[derive(Debug)]
pub struct RedditClient {
    config: RedditOAuth2Config,
    auth: AppOnlyAuthenticator,
    api: RedditApiClient,
}

impl RedditClient {
    pub fn new(config: RedditOAuth2Config) -> Result<Self, CoreError> {
        let http_client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(30))
            .redirect(Policy::none())
            .build()?;

        let auth = AppOnlyAuthenticator::new(&config, http_client.clone())?;
        let api = RedditApiClient::new(http_client);

        Ok(Self { config, auth, api })
    }

    pub fn user_agent(&self) -> &str {
        &self.config.user_agent
    }

    /// Runs `call` with the cached application token.
    pub(crate) async fn with_token<T, F, Fut>(&self, call: F) -> Result<T, CoreError>
    where
        F: Fn(String) -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>>,
    {
        with_fresh_token(&self.auth, call).await
    }
}
