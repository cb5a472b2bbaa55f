use crate::Result;

/// A trait for random sources that return random integers.
///
/// This abstraction allows you to plug in a real entropy source or a mocked
/// random source in tests. The source is owned by the host: generators only
/// borrow it per draw and never lock or serialize access to it.
///
/// A source that cannot supply entropy must return
/// [`Error::RandomSourceUnavailable`] rather than a substitute value.
///
/// # Example
/// ```
/// use quaternion::{RandSource, Result};
///
/// struct FixedRand;
/// impl RandSource<u32> for FixedRand {
///     fn try_rand(&self) -> Result<u32> {
///         Ok(1234)
///     }
/// }
///
/// let rng = FixedRand;
/// let value: u32 = rng.try_rand().unwrap();
/// assert_eq!(value, 1234);
/// ```
///
/// [`Error::RandomSourceUnavailable`]: crate::Error::RandomSourceUnavailable
pub trait RandSource<T> {
    /// Returns a random integer.
    ///
    /// # Errors
    /// - [`Error::RandomSourceUnavailable`] if the source cannot be read.
    ///
    /// [`Error::RandomSourceUnavailable`]: crate::Error::RandomSourceUnavailable
    fn try_rand(&self) -> Result<T>;
}

impl<T, R> RandSource<T> for &R
where
    R: RandSource<T> + ?Sized,
{
    fn try_rand(&self) -> Result<T> {
        (**self).try_rand()
    }
}

impl<T, R> RandSource<T> for Box<R>
where
    R: RandSource<T> + ?Sized,
{
    fn try_rand(&self) -> Result<T> {
        (**self).try_rand()
    }
}

impl<T, R> RandSource<T> for std::sync::Arc<R>
where
    R: RandSource<T> + ?Sized,
{
    fn try_rand(&self) -> Result<T> {
        (**self).try_rand()
    }
}
