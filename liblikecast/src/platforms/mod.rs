//! Remote API abstraction and implementations
//!
//! The core only needs three remote calls: resolve the authenticated
//! identity, look up a tweet, and like it. [`LikeApi`] captures exactly those,
//! so the service layer can run against the real HTTP client or the mock.
//!
//! # Examples
//!
//! ```no_run
//! use liblikecast::config::TwitterConfig;
//! use liblikecast::credentials::Credentials;
//! use liblikecast::platforms::{twitter::TwitterClient, LikeApi};
//!
//! # async fn example() -> Result<(), liblikecast::platforms::ApiError> {
//! let credentials = Credentials::new("bearer", "key", "secret", "token", "token-secret");
//! let client = TwitterClient::new(credentials, &TwitterConfig::default())?;
//!
//! let me = client.get_me().await?;
//! let tweet = client.get_tweet("1234567890").await?;
//! println!("@{} can see: {}", me.username, tweet.preview);
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use thiserror::Error;

use crate::rate_limiter::RateLimitHeaders;
use crate::types::{Identity, LikeResponse, TweetSummary};

pub mod mock;
pub mod oauth;
pub mod twitter;

/// Raw failure reported by a [`LikeApi`] call
///
/// Carries whatever the transport could observe. Interpretation into an
/// [`crate::error::ErrorKind`] happens in [`crate::classify`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ApiError {
    /// HTTP status, absent for connection-level failures
    pub status: Option<u16>,
    pub message: String,
    /// Response body text, when one was received
    pub body: Option<String>,
    pub rate_limit: RateLimitHeaders,
}

impl ApiError {
    /// Failure that never produced an HTTP response
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
            body: None,
            rate_limit: RateLimitHeaders::default(),
        }
    }

    /// Failure with an HTTP status and no extra detail
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
            body: None,
            rate_limit: RateLimitHeaders::default(),
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_rate_limit(mut self, rate_limit: RateLimitHeaders) -> Self {
        self.rate_limit = rate_limit;
        self
    }
}

/// The remote calls the like workflow depends on
#[async_trait]
pub trait LikeApi: Send + Sync {
    /// Resolve the user the credentials belong to
    ///
    /// # Errors
    ///
    /// Fails with a 401-style [`ApiError`] when the credentials are rejected.
    async fn get_me(&self) -> Result<Identity, ApiError>;

    /// Fetch a tweet by id (read-only)
    ///
    /// # Errors
    ///
    /// Fails with a 404-style [`ApiError`] when the tweet does not exist or
    /// is not visible to the caller.
    async fn get_tweet(&self, tweet_id: &str) -> Result<TweetSummary, ApiError>;

    /// Like `tweet_id` on behalf of `user_id`
    async fn like(&self, user_id: &str, tweet_id: &str) -> Result<LikeResponse, ApiError>;

    /// Short identifier for logs
    fn name(&self) -> &str;
}
