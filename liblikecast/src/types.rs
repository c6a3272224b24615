//! Core data types for Likecast

use serde::{Deserialize, Serialize};

use crate::error::ErrorKind;
use crate::rate_limiter::RateLimitWindow;

/// Number of characters kept in a tweet preview before truncating
pub const PREVIEW_CHARS: usize = 100;

/// Authenticated user as reported by the identity endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub username: String,
}

/// Short description of a verified target tweet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TweetSummary {
    pub id: String,
    pub text: String,
    /// Text truncated to [`PREVIEW_CHARS`] characters
    pub preview: String,
}

impl TweetSummary {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        let preview = truncate_preview(&text);
        Self {
            id: id.into(),
            text,
            preview,
        }
    }
}

/// Truncate text to [`PREVIEW_CHARS`] characters, appending `...` when cut
pub fn truncate_preview(text: &str) -> String {
    if text.chars().count() > PREVIEW_CHARS {
        let head: String = text.chars().take(PREVIEW_CHARS).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

/// Successful like response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LikeResponse {
    pub liked: bool,
    /// Raw response payload, kept for diagnostics
    pub raw: serde_json::Value,
}

/// Result of a like attempt. Never both.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    Liked { response: LikeResponse },
    Failed { kind: ErrorKind, message: String },
}

impl ActionOutcome {
    pub fn failed(kind: ErrorKind, message: impl Into<String>) -> Self {
        ActionOutcome::Failed {
            kind,
            message: message.into(),
        }
    }

    pub fn is_liked(&self) -> bool {
        matches!(self, ActionOutcome::Liked { .. })
    }

    pub fn error_kind(&self) -> Option<&ErrorKind> {
        match self {
            ActionOutcome::Liked { .. } => None,
            ActionOutcome::Failed { kind, .. } => Some(kind),
        }
    }
}

/// Snapshot of estimated capacity, for display only
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapacityStatus {
    /// Number of successes currently tracked (at most 10)
    pub recent_count: usize,
    /// Seconds since the oldest tracked success, if any
    pub span_secs: Option<i64>,
    /// Heuristic remaining actions in the quota window
    pub estimated_remaining: f64,
    /// Outstanding rate-limit window, if one is active
    pub active_limit: Option<RateLimitWindow>,
}
