use ::rand::{Rng, rng};

use crate::{RandSource, Result};

/// A `RandSource` that uses the thread-local RNG (`rand::rng()`).
///
/// This RNG is fast, cryptographically secure (ChaCha-based), and
/// automatically reseeded periodically. It never fails.
///
/// Each OS thread has its own RNG instance, so concurrent readers do not
/// contend. This type does **not** store the RNG itself; it accesses the
/// thread-local generator on each call, which keeps it `Send + Sync`.
#[derive(Default, Clone, Copy, Debug)]
pub struct ThreadRandom;

impl RandSource<u32> for ThreadRandom {
    fn try_rand(&self) -> Result<u32> {
        Ok(rng().random())
    }
}

impl RandSource<u64> for ThreadRandom {
    fn try_rand(&self) -> Result<u64> {
        Ok(rng().random())
    }
}
