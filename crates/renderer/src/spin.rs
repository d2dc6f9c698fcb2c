//! Model rotation state.

use std::f32::consts::TAU;

/// Rotation speed: one milliradian of yaw per millisecond of frame time.
pub const RADIANS_PER_MS: f32 = 0.001;

/// Accumulated yaw of the triangle.
///
/// The stored angle is kept in `[0, 2π)`; `advance` returns the step so the
/// caller can rotate its model matrix incrementally.
#[derive(Debug, Clone, Copy)]
pub struct Spin {
    angle: f32,
}

impl Spin {
    pub fn new() -> Self {
        Self { angle: 0.0 }
    }

    /// Advances the rotation by the elapsed frame time and returns the step
    /// in radians.
    pub fn advance(&mut self, elapsed_ms: f32) -> f32 {
        let step = RADIANS_PER_MS * elapsed_ms;
        self.angle = (self.angle + step).rem_euclid(TAU);
        step
    }

    /// Current yaw in `[0, 2π)`.
    pub fn angle(&self) -> f32 {
        self.angle
    }
}

impl Default for Spin {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_zero() {
        assert_eq!(Spin::new().angle(), 0.0);
    }

    #[test]
    fn test_step_is_proportional_to_elapsed_time() {
        let mut spin = Spin::new();
        let step = spin.advance(20.0);
        assert!((step - 0.02).abs() < 1e-6);
        assert!((spin.angle() - 0.02).abs() < 1e-6);
    }

    #[test]
    fn test_accumulates_across_frames() {
        let mut spin = Spin::new();
        spin.advance(100.0);
        spin.advance(100.0);
        assert!((spin.angle() - 0.2).abs() < 1e-5);
    }

    #[test]
    fn test_wraps_after_full_revolution() {
        // 6283.185 ms of frame time is one full turn.
        let mut spin = Spin::new();
        for _ in 0..6283 {
            spin.advance(1.0);
        }
        spin.advance(0.185);

        assert!(spin.angle() >= 0.0);
        assert!(spin.angle() < TAU);
    }

    #[test]
    fn test_angle_stays_in_range() {
        let mut spin = Spin::new();
        for _ in 0..1000 {
            spin.advance(33.0);
            assert!(spin.angle() >= 0.0);
            assert!(spin.angle() < TAU);
        }
    }
}
