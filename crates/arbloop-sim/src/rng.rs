use serde::{Deserialize, Serialize};

/// Tiny deterministic RNG used by the market generator.
///
/// A 64-bit LCG with the high half folded into the output, so small moduli
/// do not see the LCG's short low-bit periods. Same seed, same stream, on
/// every platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    /// Create a new deterministic RNG from a seed.
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self {
            state: seed ^ 0x9E37_79B9_7F4A_7C15,
        }
    }

    /// Next pseudo-random `u64`.
    #[must_use]
    pub const fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        self.state ^ (self.state >> 32)
    }

    /// Next value in `[0, upper_exclusive)`.
    #[must_use]
    pub const fn next_bounded(&mut self, upper_exclusive: u64) -> u64 {
        if upper_exclusive == 0 {
            return 0;
        }
        self.next_u64() % upper_exclusive
    }

    /// Next index in `[0, len)`; `0` when `len == 0`.
    #[must_use]
    pub fn next_index(&mut self, len: usize) -> usize {
        let bound = u64::try_from(len).unwrap_or(u64::MAX);
        usize::try_from(self.next_bounded(bound)).unwrap_or(0)
    }

    /// Uniform `f64` in `[0, 1)` from the top 53 bits.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub const fn next_f64(&mut self) -> f64 {
        // < 2^53, so the conversion is exact.
        (self.next_u64() >> 11) as f64 / (1_u64 << 53) as f64
    }

    /// Uniform `f64` in `[-half_width, half_width)`.
    #[must_use]
    pub fn next_symmetric(&mut self, half_width: f64) -> f64 {
        self.next_f64().mul_add(2.0 * half_width, -half_width)
    }

    /// Bernoulli trial with integer percent.
    #[must_use]
    pub fn hit_rate_percent(&mut self, percent: u8) -> bool {
        if percent == 0 {
            return false;
        }
        if percent >= 100 {
            return true;
        }
        self.next_bounded(100) < u64::from(percent)
    }
}
