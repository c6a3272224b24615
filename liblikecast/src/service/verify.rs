//! Target existence check performed before every like

use crate::classify::classify;
use crate::error::ErrorKind;
use crate::service::auth::AuthSession;
use crate::types::TweetSummary;

/// Confirm `tweet_id` exists and is visible to the session's user
///
/// # Errors
///
/// - `NotAuthenticated` if the session was logged out
/// - `TargetNotFound` if the API reports the tweet absent
/// - `Transport` for anything else, with the original message and status
pub async fn verify(session: &AuthSession, tweet_id: &str) -> Result<TweetSummary, ErrorKind> {
    let api = session.transport()?;
    tracing::debug!("Verifying tweet {} exists", tweet_id);

    match api.get_tweet(tweet_id).await {
        Ok(summary) => {
            tracing::debug!("Tweet {} found ({} chars)", tweet_id, summary.text.chars().count());
            Ok(summary)
        }
        Err(error) => {
            let now = chrono::Utc::now().timestamp();
            match classify(&error, now) {
                ErrorKind::TargetNotFound => {
                    tracing::debug!("Tweet {} not found", tweet_id);
                    Err(ErrorKind::TargetNotFound)
                }
                _ => {
                    tracing::warn!("Checking tweet {} failed: {}", tweet_id, error);
                    Err(ErrorKind::Transport {
                        message: format!("Error checking tweet: {}", error.message),
                        status: error.status,
                    })
                }
            }
        }
    }
}
