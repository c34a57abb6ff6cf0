//! Deterministic random number generation
//!
//! One ChaCha stream per (seed, player). Every component of a run draws from
//! that single stream in a fixed order, so a seed fully determines the output.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub type GenerationRng = ChaCha8Rng;

pub struct RngManager {
    master_seed: u64,
}

impl RngManager {
    pub fn new(seed: u64) -> Self {
        Self { master_seed: seed }
    }

    /// Independent stream for one player's generation run
    pub fn player_rng(&self, player: u32) -> GenerationRng {
        ChaCha8Rng::seed_from_u64(self.derive_seed(player))
    }

    fn derive_seed(&self, player: u32) -> u64 {
        let mut seed = self.master_seed;
        seed = seed
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        seed ^= (player as u64).wrapping_mul(1103515245);
        seed = seed
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        seed
    }
}

impl Default for RngManager {
    fn default() -> Self {
        Self::new(42)
    }
}

/// Helper functions for common random operations
pub trait RngExt {
    /// Index drawn with probability proportional to its weight, the same
    /// distribution as a uniform draw over a list holding `weights[i]` copies
    /// of entry `i`. `None` when every weight is zero.
    fn weighted_index(&mut self, weights: &[u32]) -> Option<usize>;
}

impl<R: Rng + ?Sized> RngExt for R {
    fn weighted_index(&mut self, weights: &[u32]) -> Option<usize> {
        let total: u64 = weights.iter().map(|&w| u64::from(w)).sum();
        if total == 0 {
            return None;
        }
        let mut ticket = self.gen_range(0..total);
        for (index, &weight) in weights.iter().enumerate() {
            let weight = u64::from(weight);
            if ticket < weight {
                return Some(index);
            }
            ticket -= weight;
        }
        None
    }
}
