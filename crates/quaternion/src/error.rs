/// A result type whose error defaults to [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All errors a production can report.
///
/// Every variant is fatal to the single read that raised it: the in-progress
/// batch is dropped and nothing is delivered to the caller.
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The output buffer for a production could not be reserved.
    #[error("out of memory reserving {requested} bytes")]
    OutOfMemory {
        /// Capacity that was requested from the allocator.
        requested: usize,
    },

    /// The transfer boundary could not deliver the produced bytes.
    #[error("failed to copy {len} bytes to the caller")]
    CopyFailed {
        /// Length of the buffer that was being delivered.
        len: usize,
    },

    /// The random source could not supply entropy.
    #[error("random source unavailable: {reason}")]
    RandomSourceUnavailable {
        /// Description reported by the source.
        reason: String,
    },
}

impl From<Error> for std::io::Error {
    fn from(err: Error) -> Self {
        let kind = match err {
            Error::OutOfMemory { .. } => std::io::ErrorKind::OutOfMemory,
            Error::CopyFailed { .. } => std::io::ErrorKind::WriteZero,
            Error::RandomSourceUnavailable { .. } => std::io::ErrorKind::Other,
        };
        Self::new(kind, err)
    }
}
