use chrono::{DateTime, Duration, Utc};
use tokio::time::Instant;

/// Source of "now" for the polling loops
pub trait WallClock: Send {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl WallClock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Starts at a chosen instant and advances with the tokio clock, so paused
/// test time and `--now` replays both move it forward.
#[derive(Debug, Clone, Copy)]
pub struct ShiftedClock {
    origin: DateTime<Utc>,
    started: Instant,
}

impl ShiftedClock {
    pub fn starting_at(origin: DateTime<Utc>) -> Self {
        Self {
            origin,
            started: Instant::now(),
        }
    }
}

impl WallClock for ShiftedClock {
    fn now(&self) -> DateTime<Utc> {
        let elapsed = Duration::from_std(self.started.elapsed()).unwrap_or_else(|_| Duration::zero());
        self.origin.checked_add_signed(elapsed).unwrap_or(self.origin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_shifted_clock_follows_tokio_time() {
        let origin = DateTime::parse_from_rfc3339("2025-10-17T16:59:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let clock = ShiftedClock::starting_at(origin);
        assert_eq!(clock.now(), origin);

        tokio::time::advance(std::time::Duration::from_secs(90)).await;
        assert_eq!(clock.now(), origin + Duration::seconds(90));
    }
}
