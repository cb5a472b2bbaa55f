use ::rand::{TryRngCore, rngs::OsRng};

use crate::{Error, RandSource, Result};

/// A `RandSource` that reads the operating system's entropy pool on every
/// draw (`getrandom(2)` on Linux).
///
/// Reads can fail, for example in sandboxes that deny the syscall; failures
/// surface as [`Error::RandomSourceUnavailable`].
#[derive(Default, Clone, Copy, Debug)]
pub struct OsRandom;

impl RandSource<u32> for OsRandom {
    fn try_rand(&self) -> Result<u32> {
        OsRng.try_next_u32().map_err(unavailable)
    }
}

impl RandSource<u64> for OsRandom {
    fn try_rand(&self) -> Result<u64> {
        OsRng.try_next_u64().map_err(unavailable)
    }
}

fn unavailable(err: impl core::fmt::Display) -> Error {
    #[cfg(feature = "tracing")]
    tracing::error!("Failed to read OS entropy: {err}");

    Error::RandomSourceUnavailable {
        reason: err.to_string(),
    }
}
