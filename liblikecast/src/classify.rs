//! Translation of raw API failures into [`ErrorKind`]
//!
//! This is the only place that interprets HTTP statuses and error text. The
//! status code decides when present; message text is consulted only for
//! failures without one.

use chrono::{Local, TimeZone};

use crate::error::ErrorKind;
use crate::platforms::ApiError;
use crate::rate_limiter::{RateLimitWindow, DEFAULT_FALLBACK_RETRY_SECS};

/// Classify a failed call observed at `now`
///
/// Rate-limit windows use the default 180 second fallback; see
/// [`classify_with_fallback`] to override it.
pub fn classify(error: &ApiError, now: i64) -> ErrorKind {
    classify_with_fallback(error, now, DEFAULT_FALLBACK_RETRY_SECS)
}

/// Classify a failed call, using `fallback_secs` when a rate-limit response
/// carries no usable headers
pub fn classify_with_fallback(error: &ApiError, now: i64, fallback_secs: u64) -> ErrorKind {
    let rate_limited = || {
        let window = RateLimitWindow::from_headers(&error.rate_limit, now, fallback_secs);
        ErrorKind::RateLimited {
            reset_at: window.reset_at,
            retry_after_secs: window.retry_after_secs,
        }
    };

    match error.status {
        Some(429) => rate_limited(),
        Some(401) => ErrorKind::Unauthorized,
        Some(403) => ErrorKind::Forbidden,
        Some(404) => ErrorKind::TargetNotFound,
        Some(status) => ErrorKind::Transport {
            message: error.message.clone(),
            status: Some(status),
        },
        None => {
            let lower = error.message.to_lowercase();
            if lower.contains("too many requests") || lower.contains("rate limit") {
                rate_limited()
            } else if lower.contains("unauthorized") {
                ErrorKind::Unauthorized
            } else if lower.contains("forbidden") {
                ErrorKind::Forbidden
            } else if lower.contains("not found") {
                ErrorKind::TargetNotFound
            } else {
                ErrorKind::Transport {
                    message: error.message.clone(),
                    status: None,
                }
            }
        }
    }
}

/// Format a Unix timestamp as local wall-clock `HH:MM:SS`
pub fn format_reset_time(reset_at: i64) -> String {
    match Local.timestamp_opt(reset_at, 0).single() {
        Some(time) => time.format("%H:%M:%S").to_string(),
        None => reset_at.to_string(),
    }
}

/// User-facing message for a failed like
///
/// `details` is the remote response body, appended when present.
pub fn describe(kind: &ErrorKind, tweet_id: &str, details: Option<&str>) -> String {
    let mut message = match kind {
        ErrorKind::NotAuthenticated => {
            "Client not authenticated. Please authenticate first.".to_string()
        }
        ErrorKind::TargetNotFound => format!("Tweet with ID {} not found.", tweet_id),
        ErrorKind::RateLimited {
            reset_at,
            retry_after_secs,
        } => format!(
            "Rate limit exceeded. Twitter's rate limits will reset at {} (in {} seconds).",
            format_reset_time(*reset_at),
            retry_after_secs
        ),
        ErrorKind::Unauthorized => {
            "Authentication error. Please check your credentials.".to_string()
        }
        ErrorKind::Forbidden => format!(
            "Forbidden to like tweet with ID {}. You may lack proper permissions.",
            tweet_id
        ),
        ErrorKind::Transport { message, status } => match status {
            Some(status) => format!("Error liking tweet: {}\nStatus: {}", message, status),
            None => format!("Error liking tweet: {}", message),
        },
    };

    if let Some(details) = details.filter(|d| !d.trim().is_empty()) {
        message.push_str("\nDetails: ");
        message.push_str(details);
    }

    message
}
