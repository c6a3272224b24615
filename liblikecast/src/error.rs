//! Error types for Likecast

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LikecastError>;

#[derive(Error, Debug)]
pub enum LikecastError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Action(#[from] ErrorKind),

    #[error("Access denied: {0}")]
    Gate(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl LikecastError {
    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            LikecastError::InvalidInput(_) => 3,
            LikecastError::Gate(_) => 2,
            LikecastError::Action(ErrorKind::Unauthorized)
            | LikecastError::Action(ErrorKind::NotAuthenticated) => 2,
            LikecastError::Action(_) => 1,
            LikecastError::Config(_) => 1,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

/// Closed set of failure kinds an action can end in.
///
/// Every remote failure is translated into exactly one of these by
/// [`crate::classify::classify`]; call sites match on it exhaustively.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Target not found")]
    TargetNotFound,

    #[error("Rate limited until {reset_at} (retry after {retry_after_secs}s)")]
    RateLimited { reset_at: i64, retry_after_secs: u64 },

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("Transport error{}: {message}", .status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default())]
    Transport {
        message: String,
        status: Option<u16>,
    },
}

impl ErrorKind {
    /// Shorthand for a transport failure without an HTTP status
    pub fn transport(message: impl Into<String>) -> Self {
        ErrorKind::Transport {
            message: message.into(),
            status: None,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ErrorKind::RateLimited { .. })
    }
}
