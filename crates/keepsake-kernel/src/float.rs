//! Vertical bobbing for floating decorations.

use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// A looping up-and-down motion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FloatingBob {
    /// Full cycle length in seconds.
    pub duration_secs: f64,
    /// Peak displacement in pixels.
    pub y_offset: f32,
}

impl Default for FloatingBob {
    fn default() -> Self {
        Self {
            duration_secs: 3.0,
            y_offset: 10.0,
        }
    }
}

impl FloatingBob {
    /// Create a bob with the given period and amplitude.
    #[must_use]
    pub const fn new(duration_secs: f64, y_offset: f32) -> Self {
        Self {
            duration_secs,
            y_offset,
        }
    }

    /// Vertical offset at `time_secs`.
    ///
    /// Starts at `-y_offset`, reaches `+y_offset` half a period later and
    /// returns. The cosine gives the ease-in-out at both ends.
    #[must_use]
    pub fn offset_at(&self, time_secs: f64) -> f32 {
        if self.duration_secs <= 0.0 {
            return -self.y_offset;
        }
        let phase = TAU * time_secs / self.duration_secs;
        -self.y_offset * phase.cos() as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyframes() {
        let bob = FloatingBob::default();
        assert!((bob.offset_at(0.0) + 10.0).abs() < 1e-4);
        assert!((bob.offset_at(1.5) - 10.0).abs() < 1e-4);
        assert!((bob.offset_at(3.0) + 10.0).abs() < 1e-4);
        assert!(bob.offset_at(0.75).abs() < 1e-4);
    }

    #[test]
    fn test_zero_duration_holds() {
        let bob = FloatingBob::new(0.0, 6.0);
        assert_eq!(bob.offset_at(12.0), -6.0);
    }

    proptest::proptest! {
        #[test]
        fn prop_offset_in_range(
            t in 0.0f64..10_000.0,
            duration in 0.1f64..20.0,
            amplitude in 0.0f32..100.0,
        ) {
            let bob = FloatingBob::new(duration, amplitude);
            let y = bob.offset_at(t);
            proptest::prop_assert!(y.abs() <= amplitude + 1e-3);
        }
    }
}
