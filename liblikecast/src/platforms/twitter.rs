//! Twitter (X) API v2 client
//!
//! Talks to three endpoints:
//!
//! - `GET /2/users/me` (OAuth 1.0a user context) to resolve the identity
//! - `GET /2/tweets/:id` (app bearer token) to check the target exists
//! - `POST /2/users/:id/likes` (OAuth 1.0a user context) to like it
//!
//! Non-success responses are returned as [`ApiError`] with the status code,
//! body and rate-limit headers attached so the classifier can decide what
//! they mean.

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Method, RequestBuilder};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

use crate::config::TwitterConfig;
use crate::credentials::Credentials;
use crate::platforms::oauth::{self, percent_encode, Nonce};
use crate::platforms::{ApiError, LikeApi};
use crate::rate_limiter::RateLimitHeaders;
use crate::types::{Identity, LikeResponse, TweetSummary};

/// Production API host
pub const DEFAULT_API_BASE: &str = "https://api.twitter.com";

const RATE_LIMIT_RESET_HEADER: &str = "x-rate-limit-reset";
const RETRY_AFTER_HEADER: &str = "retry-after";

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<Problem>,
}

/// Error object as returned by v2 endpoints, either top-level or in `errors`
#[derive(Debug, Default, Deserialize)]
struct Problem {
    title: Option<String>,
    detail: Option<String>,
    message: Option<String>,
}

impl Problem {
    fn summary(&self) -> Option<String> {
        match (&self.title, &self.detail, &self.message) {
            (Some(title), Some(detail), _) if title != detail => {
                Some(format!("{}: {}", title, detail))
            }
            (_, Some(detail), _) => Some(detail.clone()),
            (Some(title), None, _) => Some(title.clone()),
            (None, None, Some(message)) => Some(message.clone()),
            (None, None, None) => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct UserData {
    id: String,
    username: String,
}

#[derive(Debug, Deserialize)]
struct TweetData {
    id: String,
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct LikeData {
    liked: bool,
}

/// HTTP client for the Twitter API v2
pub struct TwitterClient {
    http: reqwest::Client,
    base_url: String,
    credentials: Credentials,
}

impl TwitterClient {
    /// Create a client from credentials and API settings
    ///
    /// No network traffic happens here; call [`LikeApi::get_me`] to validate
    /// the credentials.
    pub fn new(credentials: Credentials, config: &TwitterConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("likecast/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ApiError::network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.api_base.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Request signed with the user's OAuth 1.0a credentials
    fn user_request(&self, method: Method, url: &str) -> Result<RequestBuilder, ApiError> {
        let header = oauth::authorization_header(
            method.as_str(),
            url,
            &[],
            &self.credentials,
            &Nonce::generate(),
        )?;
        Ok(self
            .http
            .request(method, url)
            .header(reqwest::header::AUTHORIZATION, header))
    }

    /// Request authorised with the app bearer token
    fn app_request(&self, method: Method, url: &str) -> RequestBuilder {
        self.http
            .request(method, url)
            .bearer_auth(self.credentials.bearer_token().expose_secret())
    }

    /// Send a request and decode the v2 envelope, turning every non-success
    /// response into an [`ApiError`]
    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        context: &str,
    ) -> Result<Envelope<T>, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| map_reqwest_error(e, context))?;

        let status = response.status();
        let rate_limit = rate_limit_headers(response.headers());
        let body = response
            .text()
            .await
            .map_err(|e| map_reqwest_error(e, context))?;

        tracing::debug!("Twitter {} responded {}", context, status.as_u16());

        if !status.is_success() {
            let message = error_message(status.as_u16(), status.canonical_reason(), &body);
            return Err(ApiError {
                status: Some(status.as_u16()),
                message: format!("Twitter {} failed: {}", context, message),
                body: Some(body),
                rate_limit,
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            ApiError::http(
                status.as_u16(),
                format!("Twitter {} returned an unexpected response: {}", context, e),
            )
            .with_body(body.clone())
        })
    }
}

#[async_trait]
impl LikeApi for TwitterClient {
    async fn get_me(&self) -> Result<Identity, ApiError> {
        let url = self.url("/2/users/me");
        let request = self.user_request(Method::GET, &url)?;
        let envelope: Envelope<UserData> = self.send(request, "identity lookup").await?;

        match envelope.data {
            Some(user) => Ok(Identity {
                id: user.id,
                username: user.username,
            }),
            None => {
                let detail = envelope.errors.first().and_then(Problem::summary);
                let message = match detail {
                    Some(detail) => format!(
                        "Authentication successful but couldn't fetch user details: {}",
                        detail
                    ),
                    None => "Authentication successful but couldn't fetch user details".to_string(),
                };
                Err(ApiError::http(200, message))
            }
        }
    }

    async fn get_tweet(&self, tweet_id: &str) -> Result<TweetSummary, ApiError> {
        let url = self.url(&format!("/2/tweets/{}", percent_encode(tweet_id)));
        let request = self.app_request(Method::GET, &url);
        let envelope: Envelope<TweetData> = self.send(request, "tweet lookup").await?;

        match envelope.data {
            Some(tweet) => Ok(TweetSummary::new(tweet.id, tweet.text)),
            // Missing tweets come back as 200 with only an `errors` array
            None => {
                let detail = envelope
                    .errors
                    .first()
                    .and_then(Problem::summary)
                    .unwrap_or_else(|| "Tweet not found or not accessible".to_string());
                Err(ApiError::http(404, format!("Tweet {} not found: {}", tweet_id, detail)))
            }
        }
    }

    async fn like(&self, user_id: &str, tweet_id: &str) -> Result<LikeResponse, ApiError> {
        let url = self.url(&format!("/2/users/{}/likes", percent_encode(user_id)));
        let request = self
            .user_request(Method::POST, &url)?
            .json(&serde_json::json!({ "tweet_id": tweet_id }));
        let envelope: Envelope<serde_json::Value> = self.send(request, "like").await?;

        let raw = envelope.data.unwrap_or(serde_json::Value::Null);
        let liked = serde_json::from_value::<LikeData>(raw.clone())
            .map(|data| data.liked)
            .unwrap_or(false);

        Ok(LikeResponse { liked, raw })
    }

    fn name(&self) -> &str {
        "twitter"
    }
}

fn rate_limit_headers(headers: &HeaderMap) -> RateLimitHeaders {
    let get = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
    RateLimitHeaders::parse(get(RATE_LIMIT_RESET_HEADER), get(RETRY_AFTER_HEADER))
}

/// Human-readable message for a failed response
fn error_message(status: u16, reason: Option<&str>, body: &str) -> String {
    let reason = reason.unwrap_or("Unknown Status");
    let detail = serde_json::from_str::<Problem>(body)
        .ok()
        .and_then(|problem| problem.summary())
        .or_else(|| {
            serde_json::from_str::<Envelope<serde_json::Value>>(body)
                .ok()
                .and_then(|envelope| envelope.errors.first().and_then(Problem::summary))
        });

    match detail {
        Some(detail) => format!("{} {} ({})", status, reason, detail),
        None => format!("{} {}", status, reason),
    }
}

/// Map reqwest failures that never produced a usable response
fn map_reqwest_error(error: reqwest::Error, context: &str) -> ApiError {
    let kind = if error.is_timeout() {
        "timed out"
    } else if error.is_connect() {
        "could not connect"
    } else {
        "failed"
    };

    ApiError {
        status: error.status().map(|s| s.as_u16()),
        message: format!("Twitter {} {}: {}", context, kind, error),
        body: None,
        rate_limit: RateLimitHeaders::default(),
    }
}
