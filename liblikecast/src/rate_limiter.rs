//! Rate-limit tracking for the like action
//!
//! The remote API does not report how much of the like quota is left, so the
//! tracker keeps two things: a short history of recent successes (used for a
//! display-only capacity estimate) and the window reported by the last
//! rate-limit response. Only the remote API decides whether a call is allowed;
//! the tracker merely remembers the last refusal so known-failing calls are
//! not sent.

use serde::Serialize;
use std::collections::VecDeque;

/// Successes kept for the capacity estimate
pub const MAX_RECENT_SUCCESSES: usize = 10;

/// Likes per window on the free access tier
pub const DEFAULT_QUOTA: u32 = 50;

/// Quota window length (24 hours)
pub const DEFAULT_WINDOW_SECS: u64 = 24 * 60 * 60;

/// Window assumed when a rate-limit response carries no usable headers
pub const DEFAULT_FALLBACK_RETRY_SECS: u64 = 3 * 60;

/// Rate-limit hints extracted from a failed response
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateLimitHeaders {
    /// `x-rate-limit-reset`: Unix time at which the window resets
    pub reset_at: Option<i64>,
    /// `retry-after`: seconds to wait before retrying
    pub retry_after: Option<u64>,
}

impl RateLimitHeaders {
    /// Build from raw header values, ignoring anything unparsable
    pub fn parse(reset_at: Option<&str>, retry_after: Option<&str>) -> Self {
        Self {
            reset_at: reset_at.and_then(|v| v.trim().parse().ok()),
            retry_after: retry_after.and_then(|v| v.trim().parse().ok()),
        }
    }
}

/// An outstanding rate-limit window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateLimitWindow {
    pub reset_at: i64,
    pub retry_after_secs: u64,
}

impl RateLimitWindow {
    /// Derive the window from response headers observed at `now`
    ///
    /// A reset instant later than `now` wins, then a retry-after duration,
    /// then `now + fallback_secs`. The window always ends at least one second
    /// after `now`, whatever the headers say.
    pub fn from_headers(headers: &RateLimitHeaders, now: i64, fallback_secs: u64) -> Self {
        let reset_at = headers
            .reset_at
            .filter(|&reset_at| reset_at > now)
            .or_else(|| headers.retry_after.map(|secs| now.saturating_add(to_i64(secs))))
            .unwrap_or_else(|| now.saturating_add(to_i64(fallback_secs)))
            .max(now.saturating_add(1));

        Self {
            reset_at,
            retry_after_secs: seconds_between(now, reset_at),
        }
    }

    /// Seconds left until the window resets, never negative
    pub fn remaining_secs(&self, now: i64) -> u64 {
        seconds_between(now, self.reset_at)
    }
}

fn to_i64(secs: u64) -> i64 {
    i64::try_from(secs).unwrap_or(i64::MAX)
}

/// Non-negative distance from `from` to `to`, saturating on overflow
pub(crate) fn seconds_between(from: i64, to: i64) -> u64 {
    to.saturating_sub(from).max(0) as u64
}

/// Per-session rate-limit state
#[derive(Debug, Clone)]
pub struct RateLimitTracker {
    recent_successes: VecDeque<i64>,
    active_limit: Option<RateLimitWindow>,
    fallback_retry_secs: u64,
}

impl Default for RateLimitTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl RateLimitTracker {
    pub fn new() -> Self {
        Self::with_fallback(DEFAULT_FALLBACK_RETRY_SECS)
    }

    /// Tracker using a custom window when responses carry no rate-limit headers
    pub fn with_fallback(fallback_retry_secs: u64) -> Self {
        Self {
            recent_successes: VecDeque::with_capacity(MAX_RECENT_SUCCESSES + 1),
            active_limit: None,
            fallback_retry_secs,
        }
    }

    /// Record a successful action, evicting the oldest beyond the cap
    ///
    /// Timestamps earlier than the newest recorded one are clamped so the
    /// history stays non-decreasing.
    pub fn record_success(&mut self, now: i64) {
        let now = match self.recent_successes.back() {
            Some(&last) if now < last => last,
            _ => now,
        };
        self.recent_successes.push_back(now);
        while self.recent_successes.len() > MAX_RECENT_SUCCESSES {
            self.recent_successes.pop_front();
        }
    }

    /// Rough remaining capacity extrapolated from recent successes
    ///
    /// `max(quota - count * window / max(now - oldest, 1), 0)`. This is a
    /// display heuristic and must not gate calls.
    pub fn estimate_remaining(&self, now: i64, window_secs: u64, quota: u32) -> f64 {
        let Some(&oldest) = self.recent_successes.front() else {
            return quota as f64;
        };

        let count = self.recent_successes.len() as f64;
        let span = now.saturating_sub(oldest).max(1) as f64;
        (quota as f64 - count * window_secs as f64 / span).max(0.0)
    }

    /// Remember a rate-limit response and return the derived window
    pub fn record_rate_limit(&mut self, headers: &RateLimitHeaders, now: i64) -> RateLimitWindow {
        let window = RateLimitWindow::from_headers(headers, now, self.fallback_retry_secs);
        self.active_limit = Some(window);
        window
    }

    /// Whether a rate-limit window is still in force at `now`
    ///
    /// An elapsed window is cleared as part of the query.
    pub fn is_active(&mut self, now: i64) -> bool {
        match self.active_limit {
            Some(window) if now < window.reset_at => true,
            Some(_) => {
                self.active_limit = None;
                false
            }
            None => false,
        }
    }

    /// The outstanding window, if any. Does not expire it.
    pub fn active_limit(&self) -> Option<RateLimitWindow> {
        self.active_limit
    }

    pub fn recent_successes(&self) -> Vec<i64> {
        self.recent_successes.iter().copied().collect()
    }

    pub fn oldest_success(&self) -> Option<i64> {
        self.recent_successes.front().copied()
    }

    /// Seconds until the active window resets, or `None` when not limited
    pub fn seconds_until_reset(&mut self, now: i64) -> Option<u64> {
        if !self.is_active(now) {
            return None;
        }
        self.active_limit.map(|window| window.remaining_secs(now))
    }
}
