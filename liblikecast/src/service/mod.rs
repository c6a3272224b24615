//! Service layer for Likecast
//!
//! [`ActionService`] is the entry point callers use. It owns no session
//! state: the [`AuthSession`] and [`RateLimitTracker`] are passed in on every
//! call, so one service value can serve any number of sessions and tests can
//! construct each piece directly.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use liblikecast::config::LimitsConfig;
//! use liblikecast::platforms::mock::MockApi;
//! use liblikecast::service::{auth::AuthSession, ActionService};
//!
//! # async fn example() -> Result<(), liblikecast::error::ErrorKind> {
//! let session = AuthSession::authenticate_with(Arc::new(MockApi::with_tweets(&[("42", "hi")]))).await?;
//! let service = ActionService::new(LimitsConfig::default());
//! let mut tracker = service.tracker();
//!
//! let now = chrono::Utc::now().timestamp();
//! let outcome = service.like(Some(&session), &mut tracker, "42", now).await;
//! assert!(outcome.is_liked());
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod verify;

use crate::classify::{classify_with_fallback, describe};
use crate::config::{Config, LimitsConfig};
use crate::error::ErrorKind;
use crate::rate_limiter::RateLimitTracker;
use crate::types::{ActionOutcome, CapacityStatus, TweetSummary};

use self::auth::AuthSession;

/// Orchestrates verify → like → classify → record
#[derive(Debug, Clone)]
pub struct ActionService {
    limits: LimitsConfig,
}

impl Default for ActionService {
    fn default() -> Self {
        Self::new(LimitsConfig::default())
    }
}

impl ActionService {
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.limits.clone())
    }

    /// Fresh tracker using this service's fallback window
    pub fn tracker(&self) -> RateLimitTracker {
        RateLimitTracker::with_fallback(self.limits.fallback_retry_secs)
    }

    /// Look up a tweet without liking it
    pub async fn preview(
        &self,
        session: Option<&AuthSession>,
        tweet_id: &str,
    ) -> Result<TweetSummary, ErrorKind> {
        let session = session.ok_or(ErrorKind::NotAuthenticated)?;
        verify::verify(session, tweet_id).await
    }

    /// Like `tweet_id` as the session's user
    ///
    /// Steps, in order:
    ///
    /// 1. fail with `NotAuthenticated` if there is no valid session
    /// 2. fail with `RateLimited` without any remote call while the tracker
    ///    holds an unexpired window (`retry_after_secs` is the time left)
    /// 3. verify the tweet exists; its failure is returned as-is
    /// 4. like it, recording the success in the tracker
    /// 5. classify a failure; a rate limit is recorded in the tracker once
    ///    before being returned
    pub async fn like(
        &self,
        session: Option<&AuthSession>,
        tracker: &mut RateLimitTracker,
        tweet_id: &str,
        now: i64,
    ) -> ActionOutcome {
        let Some(session) = session.filter(|s| s.is_valid()) else {
            return fail(ErrorKind::NotAuthenticated, tweet_id);
        };

        if let Some(window) = tracker.is_active(now).then(|| tracker.active_limit()).flatten() {
            let remaining = window.remaining_secs(now);
            tracing::debug!("Skipping like of {}: rate limited for {}s", tweet_id, remaining);
            return ActionOutcome::failed(
                ErrorKind::RateLimited {
                    reset_at: window.reset_at,
                    retry_after_secs: remaining,
                },
                format!(
                    "Currently rate limited. Please wait {} seconds before trying again.",
                    remaining
                ),
            );
        }

        if let Err(kind) = verify::verify(session, tweet_id).await {
            let message = match &kind {
                ErrorKind::Transport { message, .. } => format!("Cannot like tweet: {}", message),
                other => describe(other, tweet_id, None),
            };
            return ActionOutcome::failed(kind, message);
        }

        let api = match session.transport() {
            Ok(api) => api,
            Err(kind) => return fail(kind, tweet_id),
        };
        let user_id = &session.identity().id;

        match api.like(user_id, tweet_id).await {
            Ok(response) => {
                tracker.record_success(now);
                tracing::info!("Liked tweet {}", tweet_id);
                ActionOutcome::Liked { response }
            }
            Err(error) => {
                let kind = match classify_with_fallback(&error, now, self.limits.fallback_retry_secs)
                {
                    ErrorKind::RateLimited { .. } => {
                        let window = tracker.record_rate_limit(&error.rate_limit, now);
                        tracing::warn!(
                            "Rate limited liking {}; window resets in {}s",
                            tweet_id,
                            window.retry_after_secs
                        );
                        ErrorKind::RateLimited {
                            reset_at: window.reset_at,
                            retry_after_secs: window.retry_after_secs,
                        }
                    }
                    other => {
                        tracing::warn!("Liking {} failed: {}", tweet_id, other);
                        other
                    }
                };
                let message = describe(&kind, tweet_id, error.body.as_deref());
                ActionOutcome::failed(kind, message)
            }
        }
    }

    /// Display snapshot of recent activity and estimated capacity
    pub fn status(&self, tracker: &mut RateLimitTracker, now: i64) -> CapacityStatus {
        let active_limit = tracker.is_active(now).then(|| tracker.active_limit()).flatten();
        CapacityStatus {
            recent_count: tracker.recent_successes().len(),
            span_secs: tracker.oldest_success().map(|oldest| now.saturating_sub(oldest)),
            estimated_remaining: tracker.estimate_remaining(
                now,
                self.limits.window_secs,
                self.limits.quota,
            ),
            active_limit,
        }
    }
}

fn fail(kind: ErrorKind, tweet_id: &str) -> ActionOutcome {
    let message = describe(&kind, tweet_id, None);
    ActionOutcome::failed(kind, message)
}
