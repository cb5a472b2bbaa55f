use std::sync::{Mutex, MutexGuard};

use ::rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{Error, RandSource, Result};

/// A deterministic `RandSource` seeded from a `u64`.
///
/// Two sources built from the same seed yield the same sequence, which makes
/// productions reproducible. The generator sits behind a mutex so the source
/// can be shared across readers; with more than one reader the interleaving
/// of draws, and therefore the output, is no longer deterministic.
#[derive(Debug)]
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, StdRng>> {
        self.rng.lock().map_err(|_| Error::RandomSourceUnavailable {
            reason: "seeded generator lock poisoned".to_string(),
        })
    }
}

impl RandSource<u32> for SeededRandom {
    fn try_rand(&self) -> Result<u32> {
        Ok(self.lock()?.random())
    }
}

impl RandSource<u64> for SeededRandom {
    fn try_rand(&self) -> Result<u64> {
        Ok(self.lock()?.random())
    }
}
