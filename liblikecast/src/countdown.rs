//! Cancellable countdown until a rate-limit window resets
//!
//! The countdown is an async stream of one tick per second. It runs on the
//! caller's runtime like any other future, so nothing else is blocked while
//! it waits, and it can be stopped at any tick boundary through a
//! [`CancelFlag`].
//!
//! ```no_run
//! use liblikecast::countdown::{format_clock, CancelFlag, Countdown, CountdownOutcome};
//!
//! # async fn example() {
//! let cancel = CancelFlag::new();
//! let outcome = Countdown::new(90)
//!     .run(|remaining| eprint!("\r{}", format_clock(remaining)), || cancel.is_cancelled())
//!     .await;
//! assert_eq!(outcome, CountdownOutcome::Completed);
//! # }
//! ```

use futures::stream::{self, Stream, StreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

const TICK: Duration = Duration::from_secs(1);

/// How a countdown ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownOutcome {
    /// Counted all the way down to zero
    Completed,
    /// Stopped early by the cancel signal
    Cancelled,
}

/// External cancel signal shared between the countdown and whoever stops it
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Remaining-seconds countdown. Consumed by [`Countdown::ticks`] or
/// [`Countdown::run`], so it cannot be restarted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    total_secs: u64,
}

impl Countdown {
    pub fn new(total_secs: u64) -> Self {
        Self { total_secs }
    }

    /// Countdown to a reset instant observed at `now`
    pub fn until(reset_at: i64, now: i64) -> Self {
        Self::new(crate::rate_limiter::seconds_between(now, reset_at))
    }

    pub fn total_secs(&self) -> u64 {
        self.total_secs
    }

    /// Lazy sequence `total, total - 1, ..., 0`, one second apart
    pub fn ticks(self) -> impl Stream<Item = u64> {
        stream::unfold((Some(self.total_secs), true), |(next, first)| async move {
            let remaining = next?;
            if !first {
                sleep(TICK).await;
            }
            Some((remaining, (remaining.checked_sub(1), false)))
        })
    }

    /// Drive the countdown, reporting each tick to `on_tick`
    ///
    /// `is_cancelled` is consulted before every tick; once it returns true
    /// no further ticks are reported.
    pub async fn run<F, C>(self, mut on_tick: F, is_cancelled: C) -> CountdownOutcome
    where
        F: FnMut(u64),
        C: Fn() -> bool,
    {
        let total = self.total_secs;
        let ticks = self.ticks();
        futures::pin_mut!(ticks);

        while let Some(remaining) = ticks.next().await {
            if is_cancelled() {
                tracing::debug!("Countdown cancelled with {}s of {}s left", remaining, total);
                return CountdownOutcome::Cancelled;
            }
            on_tick(remaining);
        }

        tracing::debug!("Countdown of {}s completed", total);
        CountdownOutcome::Completed
    }
}

/// `MM:SS` clock display (minutes are not wrapped into hours)
pub fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Human-readable wait, e.g. `2m 30s`
pub fn format_wait(secs: u64) -> String {
    humantime::format_duration(Duration::from_secs(secs)).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[tokio::test(start_paused = true)]
    async fn test_completes_with_every_tick() {
        let mut seen = Vec::new();
        let outcome = Countdown::new(3).run(|r| seen.push(r), || false).await;

        assert_eq!(outcome, CountdownOutcome::Completed);
        assert_eq!(seen, vec![3, 2, 1, 0]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_are_one_second_apart() {
        let start = tokio::time::Instant::now();
        let ticks: Vec<u64> = Countdown::new(3).ticks().collect().await;

        assert_eq!(ticks, vec![3, 2, 1, 0]);
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(3));
        assert!(elapsed < Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_after_first_tick() {
        let cancel = CancelFlag::new();
        let seen = Mutex::new(Vec::new());

        let outcome = Countdown::new(3)
            .run(
                |r| {
                    seen.lock().unwrap().push(r);
                    cancel.cancel();
                },
                || cancel.is_cancelled(),
            )
            .await;

        assert_eq!(outcome, CountdownOutcome::Cancelled);
        assert_eq!(*seen.lock().unwrap(), vec![3]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_before_start_emits_nothing() {
        let cancel = CancelFlag::new();
        cancel.cancel();
        let mut seen = Vec::new();

        let outcome = Countdown::new(5)
            .run(|r| seen.push(r), || cancel.is_cancelled())
            .await;

        assert_eq!(outcome, CountdownOutcome::Cancelled);
        assert!(seen.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_countdown_ticks_once() {
        let mut seen = Vec::new();
        let outcome = Countdown::new(0).run(|r| seen.push(r), || false).await;

        assert_eq!(outcome, CountdownOutcome::Completed);
        assert_eq!(seen, vec![0]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_does_not_block_other_tasks() {
        let other = tokio::spawn(async { 7 });
        let countdown = Countdown::new(2).run(|_| {}, || false);

        let (outcome, value) = tokio::join!(countdown, other);
        assert_eq!(outcome, CountdownOutcome::Completed);
        assert_eq!(value.unwrap(), 7);
    }

    #[test]
    fn test_until_clamps_past_reset() {
        assert_eq!(Countdown::until(100, 40).total_secs(), 60);
        assert_eq!(Countdown::until(100, 140).total_secs(), 0);
        assert_eq!(Countdown::until(i64::MIN, i64::MAX).total_secs(), 0);
        assert_eq!(Countdown::until(i64::MAX, i64::MIN).total_secs(), i64::MAX as u64);
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(59), "00:59");
        assert_eq!(format_clock(180), "03:00");
        assert_eq!(format_clock(3725), "62:05");
    }

    #[test]
    fn test_format_wait() {
        assert_eq!(format_wait(150), "2m 30s");
        assert_eq!(format_wait(0), "0s");
    }
}
