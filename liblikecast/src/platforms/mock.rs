//! Mock API implementation for testing
//!
//! Provides a configurable [`LikeApi`] that returns canned results and counts
//! every call, so the like workflow can be exercised without credentials or
//! network access. Available in all builds to support integration tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use crate::platforms::{ApiError, LikeApi};
use crate::rate_limiter::RateLimitHeaders;
use crate::types::{Identity, LikeResponse, TweetSummary};

/// Configuration for mock API behavior
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Identity returned by `get_me`, or the error to fail with
    pub me: Result<Identity, ApiError>,

    /// Known tweets by id; unknown ids fail with a 404
    pub tweets: HashMap<String, String>,

    /// Error returned by `get_tweet` for every id, overriding `tweets`
    pub tweet_error: Option<ApiError>,

    /// Errors returned by successive `like` calls; once drained, likes succeed
    pub like_errors: Arc<Mutex<Vec<ApiError>>>,

    /// Delay before completing operations (simulates network latency)
    pub delay: Duration,

    /// Number of times `get_me` has been called
    pub me_call_count: Arc<Mutex<usize>>,

    /// Number of times `get_tweet` has been called
    pub tweet_call_count: Arc<Mutex<usize>>,

    /// Number of times `like` has been called
    pub like_call_count: Arc<Mutex<usize>>,

    /// Tweet ids passed to `like`, in call order
    pub liked: Arc<Mutex<Vec<String>>>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            me: Ok(Identity {
                id: "1001".to_string(),
                username: "mockuser".to_string(),
            }),
            tweets: HashMap::new(),
            tweet_error: None,
            like_errors: Arc::new(Mutex::new(Vec::new())),
            delay: Duration::from_millis(0),
            me_call_count: Arc::new(Mutex::new(0)),
            tweet_call_count: Arc::new(Mutex::new(0)),
            like_call_count: Arc::new(Mutex::new(0)),
            liked: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

/// Mock API for testing
///
/// Clones share their call counters, so a test can keep one handle while the
/// session owns another.
#[derive(Debug, Clone)]
pub struct MockApi {
    config: MockConfig,
}

impl MockApi {
    /// Create a new mock API with the given configuration
    pub fn new(config: MockConfig) -> Self {
        Self { config }
    }

    /// Mock that knows the given tweets and likes them successfully
    pub fn with_tweets(tweets: &[(&str, &str)]) -> Self {
        Self::new(MockConfig {
            tweets: tweets
                .iter()
                .map(|(id, text)| (id.to_string(), text.to_string()))
                .collect(),
            ..Default::default()
        })
    }

    /// Mock whose identity call rejects the credentials
    pub fn unauthorized() -> Self {
        Self::new(MockConfig {
            me: Err(ApiError::http(401, "Unauthorized")),
            ..Default::default()
        })
    }

    /// Queue an error for the next `like` call
    pub fn fail_next_like(self, error: ApiError) -> Self {
        self.config.like_errors.lock().unwrap().push(error);
        self
    }

    /// Queue a 429 response carrying a `retry-after` header
    pub fn rate_limit_next_like(self, retry_after: u64) -> Self {
        self.fail_next_like(
            ApiError::http(429, "Too Many Requests").with_rate_limit(RateLimitHeaders {
                reset_at: None,
                retry_after: Some(retry_after),
            }),
        )
    }

    /// Get the number of times `get_me` was called
    pub fn me_call_count(&self) -> usize {
        *self.config.me_call_count.lock().unwrap()
    }

    /// Get the number of times `get_tweet` was called
    pub fn tweet_call_count(&self) -> usize {
        *self.config.tweet_call_count.lock().unwrap()
    }

    /// Get the number of times `like` was called
    pub fn like_call_count(&self) -> usize {
        *self.config.like_call_count.lock().unwrap()
    }

    /// Get all tweet ids that reached the like endpoint
    pub fn liked(&self) -> Vec<String> {
        self.config.liked.lock().unwrap().clone()
    }

    async fn simulate_latency(&self) {
        if !self.config.delay.is_zero() {
            sleep(self.config.delay).await;
        }
    }
}

#[async_trait]
impl LikeApi for MockApi {
    async fn get_me(&self) -> Result<Identity, ApiError> {
        *self.config.me_call_count.lock().unwrap() += 1;
        self.simulate_latency().await;
        self.config.me.clone()
    }

    async fn get_tweet(&self, tweet_id: &str) -> Result<TweetSummary, ApiError> {
        *self.config.tweet_call_count.lock().unwrap() += 1;
        self.simulate_latency().await;

        if let Some(error) = &self.config.tweet_error {
            return Err(error.clone());
        }

        match self.config.tweets.get(tweet_id) {
            Some(text) => Ok(TweetSummary::new(tweet_id, text.clone())),
            None => Err(ApiError::http(404, format!("Tweet {} not found", tweet_id))),
        }
    }

    async fn like(&self, _user_id: &str, tweet_id: &str) -> Result<LikeResponse, ApiError> {
        *self.config.like_call_count.lock().unwrap() += 1;
        self.simulate_latency().await;

        let queued = {
            let mut errors = self.config.like_errors.lock().unwrap();
            if errors.is_empty() {
                None
            } else {
                Some(errors.remove(0))
            }
        };
        if let Some(error) = queued {
            return Err(error);
        }

        self.config.liked.lock().unwrap().push(tweet_id.to_string());
        Ok(LikeResponse {
            liked: true,
            raw: serde_json::json!({ "liked": true }),
        })
    }

    fn name(&self) -> &str {
        "mock"
    }
}
