// src/combat/src/rng.rs
use rand::{Rng, RngCore, SeedableRng};
use rand_pcg::Pcg32;

/// Deterministic run-scoped RNG.
///
/// Not persisted. Consumers that must be reproducible after a resume
/// rebuild their stream with `fork` from the run seed.
#[derive(Debug, Clone)]
pub struct RunRng {
    rng: Pcg32,
    seed: u64,
}

impl RunRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            seed,
        }
    }

    /// Fresh generator from OS entropy
    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Independent stream derived from this seed and a salt
    pub fn fork(&self, salt: u64) -> Self {
        Self::new(derive_seed(self.seed, salt))
    }

    pub fn chance(&mut self, probability: f64) -> bool {
        self.rng.random_bool(probability.clamp(0.0, 1.0))
    }
}

/// Stable seed mixing (splitmix64 finaliser)
pub fn derive_seed(seed: u64, salt: u64) -> u64 {
    let mut z = seed ^ salt.wrapping_mul(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

impl RngCore for RunRng {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        self.rng.fill_bytes(dst)
    }
}
