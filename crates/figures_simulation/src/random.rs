//! Случайные числа для сцен (всегда через seeded RNG)

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Случайное число в [-1, 1)
pub fn random_unit(rng: &mut impl Rng) -> f32 {
    2.0 * rng.gen::<f32>() - 1.0
}

/// Случайное число между `lo` и `hi` (порядок границ не важен)
pub fn random_in(rng: &mut impl Rng, lo: f32, hi: f32) -> f32 {
    lo + (hi - lo) * rng.gen::<f32>()
}

/// Детерминистичный источник seed'ов для emitter'ов
#[derive(Debug, Clone)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Seed для очередного emitter'а
    pub fn next_seed(&mut self) -> u64 {
        self.rng.gen()
    }
}
