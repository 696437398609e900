//! ID types for animators and particles.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Global counter for animator IDs.
static ANIMATOR_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a mounted animator instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnimatorId(u64);

impl AnimatorId {
    /// Creates a new unique animator ID.
    #[must_use]
    pub fn new() -> Self {
        Self(ANIMATOR_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl Default for AnimatorId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AnimatorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "animator#{}", self.0)
    }
}

/// Identifier of a particle within one animator.
///
/// Issued in strictly increasing order and never reused, so a removed
/// particle can never come back under the same ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ParticleId(u64);

impl ParticleId {
    /// Creates a particle ID from a raw value.
    #[must_use]
    pub const fn from_raw(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Issues particle IDs for a single animator.
#[derive(Debug, Clone, Default)]
pub struct ParticleIdGenerator {
    next: u64,
}

impl ParticleIdGenerator {
    /// Creates a generator starting at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self { next: 0 }
    }

    /// Returns the next unused ID.
    pub fn next_id(&mut self) -> ParticleId {
        let id = ParticleId(self.next);
        self.next += 1;
        id
    }

    /// Number of IDs issued so far.
    #[must_use]
    pub const fn issued(&self) -> u64 {
        self.next
    }
}
