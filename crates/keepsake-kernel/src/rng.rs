//! Random sources for particle emission.
//!
//! Every animator draws its per-particle parameters from an injected
//! [`RandomSource`], so tests can pin the sequence while the page uses
//! an entropy-seeded generator.

/// A source of uniformly distributed floats in `[0.0, 1.0)`.
pub trait RandomSource: Send {
    /// Generate a random f32 in [0.0, 1.0).
    fn next_f32(&mut self) -> f32;

    /// Generate a random f32 in [min, max).
    fn range(&mut self, min: f32, max: f32) -> f32 {
        min + self.next_f32() * (max - min)
    }

    /// Generate a value centered on zero: `(u - 0.5) * scale`.
    fn centered(&mut self, scale: f32) -> f32 {
        (self.next_f32() - 0.5) * scale
    }

    /// Pick an index in `0..len`. Returns 0 for an empty range.
    fn index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        ((self.next_f32() * len as f32) as usize).min(len - 1)
    }
}

impl<R: RandomSource + ?Sized> RandomSource for Box<R> {
    fn next_f32(&mut self) -> f32 {
        (**self).next_f32()
    }
}

/// Random source backed by `fastrand`.
#[derive(Debug, Clone)]
pub struct FastRandSource {
    rng: fastrand::Rng,
}

impl Default for FastRandSource {
    fn default() -> Self {
        Self::new()
    }
}

impl FastRandSource {
    /// Create an entropy-seeded source.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: fastrand::Rng::new(),
        }
    }

    /// Create a deterministic source from a seed.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    /// Create a source that is seeded when `seed` is set and random otherwise.
    #[must_use]
    pub fn from_optional_seed(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::new, Self::with_seed)
    }
}

impl RandomSource for FastRandSource {
    fn next_f32(&mut self) -> f32 {
        self.rng.f32()
    }
}

/// Replays a fixed list of values, wrapping around at the end.
///
/// Values are clamped into `[0.0, 1.0)`. An empty list always yields `0.0`.
#[derive(Debug, Clone, Default)]
pub struct SequenceSource {
    values: Vec<f32>,
    cursor: usize,
}

impl SequenceSource {
    /// Create a source that cycles through `values`.
    #[must_use]
    pub fn new(values: impl Into<Vec<f32>>) -> Self {
        let values = values
            .into()
            .into_iter()
            .map(|v| v.clamp(0.0, 1.0 - f32::EPSILON))
            .collect();
        Self { values, cursor: 0 }
    }

    /// Create a source that always returns the same value.
    #[must_use]
    pub fn constant(value: f32) -> Self {
        Self::new(vec![value])
    }

    /// Number of values drawn so far.
    #[must_use]
    pub fn draws(&self) -> usize {
        self.cursor
    }
}

impl RandomSource for SequenceSource {
    fn next_f32(&mut self) -> f32 {
        if self.values.is_empty() {
            return 0.0;
        }
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_sources_repeat() {
        let mut a = FastRandSource::with_seed(42);
        let mut b = FastRandSource::with_seed(42);
        for _ in 0..16 {
            assert_eq!(a.next_f32().to_bits(), b.next_f32().to_bits());
        }
    }

    #[test]
    fn test_sequence_wraps() {
        let mut rng = SequenceSource::new(vec![0.1, 0.2]);
        assert!((rng.next_f32() - 0.1).abs() < f32::EPSILON);
        assert!((rng.next_f32() - 0.2).abs() < f32::EPSILON);
        assert!((rng.next_f32() - 0.1).abs() < f32::EPSILON);
        assert_eq!(rng.draws(), 3);
    }

    #[test]
    fn test_sequence_clamps() {
        let mut rng = SequenceSource::new(vec![1.5, -3.0]);
        assert!(rng.next_f32() < 1.0);
        assert_eq!(rng.next_f32(), 0.0);
    }

    #[test]
    fn test_empty_sequence() {
        let mut rng = SequenceSource::default();
        assert_eq!(rng.next_f32(), 0.0);
    }

    #[test]
    fn test_range_and_centered() {
        let mut rng = SequenceSource::constant(0.5);
        assert!((rng.range(10.0, 20.0) - 15.0).abs() < 1e-5);
        assert!(rng.centered(3.0).abs() < 1e-5);
    }

    #[test]
    fn test_index_bounds() {
        let mut rng = SequenceSource::constant(0.999);
        assert_eq!(rng.index(7), 6);
        assert_eq!(rng.index(0), 0);
    }

    #[test]
    fn test_boxed_source() {
        let mut rng: Box<dyn RandomSource> = Box::new(SequenceSource::constant(0.25));
        assert!((rng.next_f32() - 0.25).abs() < f32::EPSILON);
    }

    proptest::proptest! {
        #[test]
        fn prop_fastrand_in_unit_range(seed in proptest::prelude::any::<u64>()) {
            let mut rng = FastRandSource::with_seed(seed);
            for _ in 0..32 {
                let v = rng.next_f32();
                proptest::prop_assert!((0.0..1.0).contains(&v));
            }
        }
    }
}
