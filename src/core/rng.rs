//! Deterministic random number generation for the random builtins.
//!
//! Scripts are re-evaluated whenever their dependencies change, so a
//! random builtin backed by an unseeded generator would make card text
//! flicker between refreshes. The engine seeds one generator from
//! [`EngineConfig::rng_seed`](super::EngineConfig) instead.
//!
//! ```
//! use rust_cardsmith::core::ScriptRng;
//!
//! let mut a = ScriptRng::new(42);
//! let mut b = ScriptRng::new(42);
//! assert_eq!(a.gen_range_inclusive(1, 6), b.gen_range_inclusive(1, 6));
//! ```

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Seeded RNG for script evaluation.
#[derive(Clone, Debug)]
pub struct ScriptRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl ScriptRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Random integer in `[low, high]`. Bounds may be given in either order.
    pub fn gen_range_inclusive(&mut self, low: i64, high: i64) -> i64 {
        let (low, high) = if low <= high { (low, high) } else { (high, low) };
        self.inner.gen_range(low..=high)
    }

    /// Shuffle a slice in place.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        use rand::seq::SliceRandom;
        slice.shuffle(&mut self.inner);
    }

    /// Choose a random element from a slice.
    #[must_use]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose(&mut self.inner)
    }

    /// Get the current state for checkpointing.
    #[must_use]
    pub fn state(&self) -> ScriptRngState {
        ScriptRngState {
            seed: self.seed,
            word_pos: self.inner.get_word_pos(),
        }
    }

    /// Restore from a saved state.
    #[must_use]
    pub fn from_state(state: &ScriptRngState) -> Self {
        let mut inner = ChaCha8Rng::seed_from_u64(state.seed);
        inner.set_word_pos(state.word_pos);
        Self {
            inner,
            seed: state.seed,
        }
    }
}

/// Serializable RNG state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptRngState {
    /// Original seed
    pub seed: u64,
    /// ChaCha8 word position
    pub word_pos: u128,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determinism() {
        let mut rng1 = ScriptRng::new(42);
        let mut rng2 = ScriptRng::new(42);

        for _ in 0..100 {
            assert_eq!(
                rng1.gen_range_inclusive(0, 1000),
                rng2.gen_range_inclusive(0, 1000)
            );
        }
    }

    #[test]
    fn test_range_bounds() {
        let mut rng = ScriptRng::new(1);
        for _ in 0..200 {
            let v = rng.gen_range_inclusive(5, 2);
            assert!((2..=5).contains(&v));
        }
    }

    #[test]
    fn test_shuffle_is_permutation() {
        let mut rng = ScriptRng::new(3);
        let mut items = vec![1, 2, 3, 4, 5, 6];
        rng.shuffle(&mut items);
        let mut sorted = items.clone();
        sorted.sort();
        assert_eq!(sorted, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_state_restore() {
        let mut rng = ScriptRng::new(9);
        rng.gen_range_inclusive(0, 10);
        let state = rng.state();
        let mut restored = ScriptRng::from_state(&state);
        assert_eq!(
            rng.gen_range_inclusive(0, 1_000_000),
            restored.gen_range_inclusive(0, 1_000_000)
        );
    }
}
