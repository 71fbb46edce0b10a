//! Cryptographically secure randomness abstraction.

use rand::RngCore;

/// Source of cryptographically secure random bytes.
pub trait RandomSource: Send + Sync + std::fmt::Debug + 'static {
    /// Fill `dest` with random bytes.
    fn fill_bytes(&self, dest: &mut [u8]);
}

/// Randomness from the thread-local CSPRNG, seeded from the OS.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn fill_bytes(&self, dest: &mut [u8]) {
        rand::rng().fill_bytes(dest);
    }
}
