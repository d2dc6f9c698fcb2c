//! Frame pacing.
//!
//! The event loop redraws continuously; [`FramePacer`] gates how often a
//! redraw actually renders. A frame is accepted when at least the target
//! interval has passed since the previously accepted frame, otherwise the
//! call is a no-op and the caller skips all frame work.

use std::time::{Duration, Instant};

/// Target interval between accepted frames: 1000/60 ms.
pub const TARGET_FRAME_INTERVAL: Duration = Duration::from_nanos(1_000_000_000 / 60);

/// Gate limiting frame work to the target rate.
///
/// Skipped calls leave the gate untouched, so the elapsed time reported for
/// an accepted frame covers everything since the last accepted one.
pub struct FramePacer {
    interval: Duration,
    last_frame: Instant,
}

impl FramePacer {
    /// Creates a pacer whose first call is always accepted.
    pub fn new() -> Self {
        Self::with_interval(TARGET_FRAME_INTERVAL)
    }

    pub fn with_interval(interval: Duration) -> Self {
        let now = Instant::now();
        Self {
            interval,
            // Backdate the gate so the first frame renders immediately.
            last_frame: now.checked_sub(interval).unwrap_or(now),
        }
    }

    /// Checks the gate against the current time.
    ///
    /// Returns the time elapsed since the last accepted frame when this
    /// frame should render, or `None` when it should be skipped.
    pub fn try_begin_frame(&mut self) -> Option<Duration> {
        self.try_begin_frame_at(Instant::now())
    }

    /// Checks the gate against an explicit timestamp.
    pub fn try_begin_frame_at(&mut self, now: Instant) -> Option<Duration> {
        let elapsed = now.saturating_duration_since(self.last_frame);
        if elapsed < self.interval {
            return None;
        }
        self.last_frame = now;
        Some(elapsed)
    }

    /// The configured target interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Default for FramePacer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_frame_is_accepted() {
        let mut pacer = FramePacer::new();
        assert!(pacer.try_begin_frame_at(Instant::now()).is_some());
    }

    #[test]
    fn test_short_interval_is_skipped() {
        let mut pacer = FramePacer::new();
        let start = Instant::now();
        assert!(pacer.try_begin_frame_at(start).is_some());
        assert!(
            pacer
                .try_begin_frame_at(start + Duration::from_millis(5))
                .is_none()
        );
    }

    #[test]
    fn test_long_interval_is_accepted() {
        let mut pacer = FramePacer::new();
        let start = Instant::now();
        assert!(pacer.try_begin_frame_at(start).is_some());
        let elapsed = pacer.try_begin_frame_at(start + Duration::from_millis(20));
        assert_eq!(elapsed, Some(Duration::from_millis(20)));
    }

    #[test]
    fn test_skipped_calls_do_not_move_the_gate() {
        let mut pacer = FramePacer::new();
        let start = Instant::now();
        assert!(pacer.try_begin_frame_at(start).is_some());

        // Poll every 5 ms; nothing renders until the interval has passed,
        // and the accepted frame reports the full elapsed span.
        assert!(
            pacer
                .try_begin_frame_at(start + Duration::from_millis(5))
                .is_none()
        );
        assert!(
            pacer
                .try_begin_frame_at(start + Duration::from_millis(10))
                .is_none()
        );
        let elapsed = pacer.try_begin_frame_at(start + Duration::from_millis(20));
        assert_eq!(elapsed, Some(Duration::from_millis(20)));
    }

    #[test]
    fn test_interval_matches_60hz() {
        let pacer = FramePacer::new();
        let millis = pacer.interval().as_secs_f64() * 1000.0;
        assert!((millis - 1000.0 / 60.0).abs() < 0.001);
    }
}
