//! Likecast - rate-limit aware liking for the Twitter API
//!
//! This library authenticates a user, checks that a tweet exists, likes it,
//! and keeps just enough history to tell the caller how long to wait when
//! the API starts refusing requests.

pub mod classify;
pub mod config;
pub mod countdown;
pub mod credentials;
pub mod error;
pub mod gate;
pub mod logging;
pub mod platforms;
pub mod rate_limiter;
pub mod service;
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use credentials::Credentials;
pub use error::{ErrorKind, LikecastError, Result};
pub use rate_limiter::{RateLimitTracker, RateLimitWindow};
pub use service::auth::AuthSession;
pub use service::ActionService;
pub use types::{ActionOutcome, CapacityStatus, Identity, TweetSummary};
