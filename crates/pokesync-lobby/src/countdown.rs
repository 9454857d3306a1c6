//! Game-start countdown.
//!
//! Armed from a server-pushed [`GameStart`] signal so every lobby in the
//! room counts down from the same number at the same moment.

use tokio::time::{Duration, Interval, interval_at};

use pokesync_protocol::GameStart;

/// A once-per-second countdown toward game start.
#[derive(Debug)]
pub struct Countdown {
    remaining: u32,
    interval: Interval,
}

impl Countdown {
    /// Starts counting down from `seconds`.
    pub fn start(seconds: u32) -> Self {
        let second = Duration::from_secs(1);
        Self {
            remaining: seconds,
            interval: interval_at(tokio::time::Instant::now() + second, second),
        }
    }

    /// Arms the countdown from a start signal.
    pub fn from_signal(signal: GameStart) -> Self {
        Self::start(signal.starts_in)
    }

    /// Waits one second, then returns the updated remaining count.
    ///
    /// Returns `None` once the countdown has already reached zero.
    pub async fn tick(&mut self) -> Option<u32> {
        if self.remaining == 0 {
            return None;
        }
        self.interval.tick().await;
        self.remaining -= 1;
        Some(self.remaining)
    }

    /// Seconds left until the game starts.
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Whether the countdown has reached zero.
    pub fn is_finished(&self) -> bool {
        self.remaining == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_counts_down_to_zero() {
        let mut countdown = Countdown::start(3);
        assert_eq!(countdown.remaining(), 3);
        assert!(!countdown.is_finished());

        assert_eq!(countdown.tick().await, Some(2));
        assert_eq!(countdown.tick().await, Some(1));
        assert_eq!(countdown.tick().await, Some(0));
        assert!(countdown.is_finished());
        assert_eq!(countdown.tick().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_are_one_second_apart() {
        let mut countdown = Countdown::start(2);

        let armed = tokio::time::Instant::now();
        countdown.tick().await;
        assert_eq!(armed.elapsed(), Duration::from_secs(1));
        countdown.tick().await;
        assert_eq!(armed.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_second_signal_is_already_finished() {
        let mut countdown =
            Countdown::from_signal(GameStart { starts_in: 0 });
        assert!(countdown.is_finished());
        assert_eq!(countdown.tick().await, None);
    }
}
