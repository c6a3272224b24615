//! End-to-end like workflow against the mock transport

use std::sync::Arc;

use liblikecast::config::LimitsConfig;
use liblikecast::countdown::{CancelFlag, Countdown, CountdownOutcome};
use liblikecast::platforms::mock::MockApi;
use liblikecast::platforms::ApiError;
use liblikecast::rate_limiter::RateLimitHeaders;
use liblikecast::{ActionOutcome, ActionService, AuthSession, ErrorKind};

const NOW: i64 = 1_700_000_000;

async fn login(mock: &MockApi) -> AuthSession {
    AuthSession::authenticate_with(Arc::new(mock.clone()))
        .await
        .expect("mock identity should authenticate")
}

#[tokio::test]
async fn test_like_existing_tweet() {
    let mock = MockApi::with_tweets(&[("42", "The answer to everything")]);
    let session = login(&mock).await;
    let service = ActionService::default();
    let mut tracker = service.tracker();

    let outcome = service.like(Some(&session), &mut tracker, "42", NOW).await;

    match outcome {
        ActionOutcome::Liked { response } => assert!(response.liked),
        other => panic!("Expected Liked, got {:?}", other),
    }
    assert_eq!(tracker.recent_successes(), vec![NOW]);
    assert_eq!(mock.liked(), vec!["42".to_string()]);
}

#[tokio::test]
async fn test_missing_tweet_is_never_liked() {
    let mock = MockApi::with_tweets(&[("42", "hello")]);
    let session = login(&mock).await;
    let service = ActionService::default();
    let mut tracker = service.tracker();

    let outcome = service.like(Some(&session), &mut tracker, "999", NOW).await;

    assert_eq!(outcome.error_kind(), Some(&ErrorKind::TargetNotFound));
    assert_eq!(mock.like_call_count(), 0);
    assert!(tracker.recent_successes().is_empty());
    assert!(tracker.active_limit().is_none());
}

#[tokio::test]
async fn test_rate_limit_blocks_immediate_retry() {
    let mock = MockApi::with_tweets(&[("42", "hello")]).rate_limit_next_like(60);
    let session = login(&mock).await;
    let service = ActionService::default();
    let mut tracker = service.tracker();

    let first = service.like(Some(&session), &mut tracker, "42", NOW).await;
    let expected = ErrorKind::RateLimited {
        reset_at: NOW + 60,
        retry_after_secs: 60,
    };
    assert_eq!(first.error_kind(), Some(&expected));
    assert_eq!(tracker.active_limit().map(|w| w.reset_at), Some(NOW + 60));

    let second = service.like(Some(&session), &mut tracker, "42", NOW).await;
    assert_eq!(second.error_kind(), Some(&expected));
    assert_eq!(mock.like_call_count(), 1);
    assert_eq!(mock.tweet_call_count(), 1);
}

#[tokio::test]
async fn test_retry_after_window_succeeds() {
    let mock = MockApi::with_tweets(&[("42", "hello")]).rate_limit_next_like(60);
    let session = login(&mock).await;
    let service = ActionService::default();
    let mut tracker = service.tracker();

    let first = service.like(Some(&session), &mut tracker, "42", NOW).await;
    assert!(first.error_kind().is_some_and(ErrorKind::is_rate_limited));

    let retried = service.like(Some(&session), &mut tracker, "42", NOW + 60).await;
    assert!(retried.is_liked());
    assert!(tracker.active_limit().is_none());
    assert_eq!(tracker.recent_successes(), vec![NOW + 60]);
}

#[tokio::test]
async fn test_rate_limit_without_headers_uses_configured_fallback() {
    let mock = MockApi::with_tweets(&[("42", "hello")])
        .fail_next_like(ApiError::http(429, "Too Many Requests"));
    let session = login(&mock).await;
    let service = ActionService::new(LimitsConfig {
        fallback_retry_secs: 30,
        ..LimitsConfig::default()
    });
    let mut tracker = service.tracker();

    let outcome = service.like(Some(&session), &mut tracker, "42", NOW).await;
    assert_eq!(
        outcome.error_kind(),
        Some(&ErrorKind::RateLimited {
            reset_at: NOW + 30,
            retry_after_secs: 30
        })
    );
}

#[tokio::test]
async fn test_out_of_range_rate_limit_headers_still_block_retry() {
    let mock = MockApi::with_tweets(&[("42", "hello")])
        .fail_next_like(
            ApiError::http(429, "Too Many Requests")
                .with_rate_limit(RateLimitHeaders::parse(None, Some("18446744073709551615"))),
        )
        .fail_next_like(
            ApiError::http(429, "Too Many Requests")
                .with_rate_limit(RateLimitHeaders::parse(Some("-9223372036854775808"), None)),
        );
    let session = login(&mock).await;
    let service = ActionService::default();

    let mut tracker = service.tracker();
    let first = service.like(Some(&session), &mut tracker, "42", NOW).await;
    assert!(first.error_kind().is_some_and(ErrorKind::is_rate_limited));
    let blocked = service.like(Some(&session), &mut tracker, "42", NOW).await;
    assert!(blocked.error_kind().is_some_and(ErrorKind::is_rate_limited));
    assert_eq!(mock.like_call_count(), 1);

    let mut tracker = service.tracker();
    let second = service.like(Some(&session), &mut tracker, "42", NOW).await;
    assert_eq!(
        second.error_kind(),
        Some(&ErrorKind::RateLimited {
            reset_at: NOW + 180,
            retry_after_secs: 180
        })
    );
    let blocked = service.like(Some(&session), &mut tracker, "42", NOW).await;
    assert!(blocked.error_kind().is_some_and(ErrorKind::is_rate_limited));
    assert_eq!(mock.like_call_count(), 2);
}

#[tokio::test]
async fn test_unauthorized_like_keeps_tracker_clean() {
    let mock = MockApi::with_tweets(&[("42", "hello")])
        .fail_next_like(ApiError::http(401, "Unauthorized"));
    let session = login(&mock).await;
    let service = ActionService::default();
    let mut tracker = service.tracker();

    let outcome = service.like(Some(&session), &mut tracker, "42", NOW).await;
    assert_eq!(outcome.error_kind(), Some(&ErrorKind::Unauthorized));
    assert!(tracker.recent_successes().is_empty());
    assert!(tracker.active_limit().is_none());
}

#[tokio::test]
async fn test_logout_blocks_further_likes() {
    let mock = MockApi::with_tweets(&[("42", "hello")]);
    let mut session = login(&mock).await;
    let service = ActionService::default();
    let mut tracker = service.tracker();

    session.logout();
    let outcome = service.like(Some(&session), &mut tracker, "42", NOW).await;

    assert_eq!(outcome.error_kind(), Some(&ErrorKind::NotAuthenticated));
    assert_eq!(mock.tweet_call_count(), 0);
    assert_eq!(mock.like_call_count(), 0);
}

#[tokio::test]
async fn test_failed_authentication_yields_no_session() {
    let result = AuthSession::authenticate_with(Arc::new(MockApi::unauthorized())).await;
    assert_eq!(result.unwrap_err(), ErrorKind::Unauthorized);
}

#[tokio::test]
async fn test_history_capped_across_many_likes() {
    let mock = MockApi::with_tweets(&[("42", "hello")]);
    let session = login(&mock).await;
    let service = ActionService::default();
    let mut tracker = service.tracker();

    for i in 0..12 {
        let outcome = service.like(Some(&session), &mut tracker, "42", NOW + i).await;
        assert!(outcome.is_liked());
    }

    let recent = tracker.recent_successes();
    assert_eq!(recent.len(), 10);
    assert_eq!(recent.first(), Some(&(NOW + 2)));
    assert_eq!(service.status(&mut tracker, NOW + 11).recent_count, 10);
}

#[tokio::test(start_paused = true)]
async fn test_countdown_from_tracker_window() {
    let mock = MockApi::with_tweets(&[("42", "hello")]).rate_limit_next_like(3);
    let session = login(&mock).await;
    let service = ActionService::default();
    let mut tracker = service.tracker();

    service.like(Some(&session), &mut tracker, "42", NOW).await;
    let window = tracker.active_limit().expect("window recorded");

    let mut seen = Vec::new();
    let outcome = Countdown::until(window.reset_at, NOW)
        .run(|remaining| seen.push(remaining), || false)
        .await;

    assert_eq!(outcome, CountdownOutcome::Completed);
    assert_eq!(seen, vec![3, 2, 1, 0]);
}

#[tokio::test(start_paused = true)]
async fn test_countdown_cancelled_from_another_task() {
    let cancel = CancelFlag::new();
    let trigger = cancel.clone();
    let stopper = tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_millis(2500)).await;
        trigger.cancel();
    });

    let mut seen = Vec::new();
    let outcome = Countdown::new(10)
        .run(|remaining| seen.push(remaining), || cancel.is_cancelled())
        .await;
    stopper.await.unwrap();

    assert_eq!(outcome, CountdownOutcome::Cancelled);
    assert_eq!(seen, vec![10, 9, 8]);
}
