#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{FixedPoint, Quaternion, RandSource, Result, SCALE};

/// Draws bounded fixed-point components from a random source.
///
/// Each component is `base + (rand % (2 * scale)) - scale`, uniform over
/// `[base - scale, base + scale)`, then clamped into `[-scale, scale]`.
///
/// ## Features
/// - ✅ Stateless: the only state is the borrowed random source
/// - ✅ `Send + Sync` whenever the source is
/// - ✅ Reproducible under a deterministic source
///
/// ## See Also
/// - [`StreamProducer`]
///
/// [`StreamProducer`]: crate::StreamProducer
#[derive(Clone, Debug, Default)]
pub struct ComponentGenerator<R>
where
    R: RandSource<u32>,
{
    rng: R,
}

impl<R> ComponentGenerator<R>
where
    R: RandSource<u32>,
{
    /// Creates a new [`ComponentGenerator`] drawing from `rng`.
    ///
    /// # Example
    /// ```
    /// use quaternion::{ComponentGenerator, FixedPoint, SCALE, ThreadRandom};
    ///
    /// let generator = ComponentGenerator::new(ThreadRandom);
    /// let value = generator.generate(FixedPoint::ZERO, SCALE).unwrap();
    ///
    /// assert!(value >= FixedPoint::from_raw(-1600) && value <= SCALE);
    /// ```
    pub const fn new(rng: R) -> Self {
        Self { rng }
    }

    pub const fn rng(&self) -> &R {
        &self.rng
    }

    /// Generates one component centered on `base` with half-width `scale`.
    ///
    /// The clamp never triggers for `base = 0`; it is what keeps the result in
    /// `[-scale, scale]` for any other base. `scale` is taken by magnitude,
    /// and a zero scale yields `0.00` without drawing from the source.
    ///
    /// # Errors
    /// - [`Error::RandomSourceUnavailable`] if the source cannot be read.
    ///
    /// [`Error::RandomSourceUnavailable`]: crate::Error::RandomSourceUnavailable
    pub fn generate(&self, base: FixedPoint, scale: FixedPoint) -> Result<FixedPoint> {
        let half_width = i64::from(scale.to_raw().saturating_abs());
        if half_width == 0 {
            return Ok(FixedPoint::ZERO);
        }

        let span = 2 * half_width as u64;
        let jitter = (u64::from(self.rng.try_rand()?) % span) as i64;
        let value = i64::from(base.to_raw()) + jitter - half_width;

        // Saturating into `i32` first leaves the clamp result unchanged, since
        // `half_width <= i32::MAX`.
        let value = value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32;
        Ok(FixedPoint::from_raw(value).clamp_to(scale))
    }

    /// Generates one record, drawing `h`, `i`, `j`, `k` in that order with
    /// `base = 0` and `scale = SCALE`.
    ///
    /// # Errors
    /// - [`Error::RandomSourceUnavailable`] if the source cannot be read.
    ///
    /// [`Error::RandomSourceUnavailable`]: crate::Error::RandomSourceUnavailable
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn next_record(&self) -> Result<Quaternion> {
        Ok(Quaternion::new(
            self.generate(FixedPoint::ZERO, SCALE)?,
            self.generate(FixedPoint::ZERO, SCALE)?,
            self.generate(FixedPoint::ZERO, SCALE)?,
            self.generate(FixedPoint::ZERO, SCALE)?,
        ))
    }
}
