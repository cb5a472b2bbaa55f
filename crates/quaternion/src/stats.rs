//! Summary statistics over a record stream.
//!
//! Per-component count, extrema, mean and variance plus the 4×4 correlation
//! matrix, accumulated online (Welford's update, with Chan's pairwise merge for
//! combining summaries from concurrent readers).
//!
//! Mahalanobis distances need the final covariance, so they take a second pass
//! over the records: [`Summary::mahalanobis`] for one record,
//! [`Summary::distances`] for a whole stream.

use core::fmt;

use crate::{FixedPoint, Quaternion};

/// Component labels, in record order.
pub const COMPONENT_NAMES: [&str; 4] = ["h", "i", "j", "k"];

/// Running statistics over a sequence of records.
///
/// # Example
/// ```
/// use quaternion::{FixedPoint, Quaternion, Summary};
///
/// let records = [
///     Quaternion::from([100, 200, 300, 400].map(FixedPoint::from_raw)),
///     Quaternion::from([300, 600, 900, 1200].map(FixedPoint::from_raw)),
/// ];
/// let summary: Summary = records.into_iter().collect();
///
/// assert_eq!(summary.count(), 2);
/// assert_eq!(summary.mean()[0], 2.0);
/// assert_eq!(summary.variance()[0], 1.0);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Summary {
    count: u64,
    mean: [f64; 4],
    /// Sum of co-deviations; the diagonal holds the sums of squares.
    comoment: [[f64; 4]; 4],
    min: [FixedPoint; 4],
    max: [FixedPoint; 4],
}

impl Summary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: &Quaternion) {
        let components = record.components();
        let x = components.map(FixedPoint::to_f64);

        if self.count == 0 {
            self.min = components;
            self.max = components;
        } else {
            for c in 0..4 {
                self.min[c] = self.min[c].min(components[c]);
                self.max[c] = self.max[c].max(components[c]);
            }
        }

        self.count += 1;
        let n = self.count as f64;
        let before: [f64; 4] = core::array::from_fn(|c| x[c] - self.mean[c]);
        for c in 0..4 {
            self.mean[c] += before[c] / n;
        }
        for a in 0..4 {
            for b in 0..4 {
                self.comoment[a][b] += before[a] * (x[b] - self.mean[b]);
            }
        }
    }

    /// Folds another summary into this one.
    pub fn merge(&mut self, other: &Self) {
        if other.count == 0 {
            return;
        }
        if self.count == 0 {
            *self = other.clone();
            return;
        }

        let (na, nb) = (self.count as f64, other.count as f64);
        let n = na + nb;
        let delta: [f64; 4] = core::array::from_fn(|c| other.mean[c] - self.mean[c]);

        for a in 0..4 {
            for b in 0..4 {
                self.comoment[a][b] += other.comoment[a][b] + delta[a] * delta[b] * na * nb / n;
            }
        }
        for c in 0..4 {
            self.mean[c] += delta[c] * nb / n;
            self.min[c] = self.min[c].min(other.min[c]);
            self.max[c] = self.max[c].max(other.max[c]);
        }
        self.count += other.count;
    }

    pub const fn count(&self) -> u64 {
        self.count
    }

    /// Per-component minimum, `None` before the first record.
    pub fn min(&self) -> Option<[FixedPoint; 4]> {
        (self.count > 0).then_some(self.min)
    }

    /// Per-component maximum, `None` before the first record.
    pub fn max(&self) -> Option<[FixedPoint; 4]> {
        (self.count > 0).then_some(self.max)
    }

    pub const fn mean(&self) -> [f64; 4] {
        self.mean
    }

    /// Population variance per component; zeros before the first record.
    pub fn variance(&self) -> [f64; 4] {
        if self.count == 0 {
            return [0.0; 4];
        }
        let n = self.count as f64;
        core::array::from_fn(|c| self.comoment[c][c] / n)
    }

    /// Sample covariance matrix (`n - 1` denominator); `None` with fewer than
    /// two records.
    pub fn covariance(&self) -> Option<[[f64; 4]; 4]> {
        if self.count < 2 {
            return None;
        }
        let n = (self.count - 1) as f64;
        Some(self.comoment.map(|row| row.map(|v| v / n)))
    }

    /// Inverse of the sample covariance matrix; `None` with fewer than two
    /// records or when the matrix is singular.
    pub fn inverse_covariance(&self) -> Option<[[f64; 4]; 4]> {
        invert(self.covariance()?)
    }

    /// Mahalanobis distance of `record` from the mean, under the sample
    /// covariance.
    ///
    /// Returns `None` with fewer than two records or when the covariance is
    /// singular (for example, a component that never varies).
    pub fn mahalanobis(&self, record: &Quaternion) -> Option<f64> {
        let inverse = self.inverse_covariance()?;
        Some(distance(&inverse, &self.mean, record))
    }

    /// Mean and standard deviation of the Mahalanobis distances of `records`,
    /// which are usually the records this summary was built from.
    ///
    /// The covariance is inverted once for the whole pass. Returns `None`
    /// when [`Self::mahalanobis`] would.
    pub fn distances<'a, I>(&self, records: I) -> Option<DistanceSummary>
    where
        I: IntoIterator<Item = &'a Quaternion>,
    {
        let inverse = self.inverse_covariance()?;
        let mut summary = DistanceSummary::default();
        for record in records {
            summary.push(distance(&inverse, &self.mean, record));
        }
        Some(summary)
    }

    /// Pearson correlation matrix. Entries involving a component with zero
    /// variance are `NaN`.
    pub fn correlation(&self) -> [[f64; 4]; 4] {
        core::array::from_fn(|a| {
            core::array::from_fn(|b| {
                let denom = (self.comoment[a][a] * self.comoment[b][b]).sqrt();
                if denom == 0.0 {
                    f64::NAN
                } else {
                    self.comoment[a][b] / denom
                }
            })
        })
    }
}

/// `sqrt(dᵀ · inverse · d)` with `d = record - mean`.
fn distance(inverse: &[[f64; 4]; 4], mean: &[f64; 4], record: &Quaternion) -> f64 {
    let x = record.components().map(FixedPoint::to_f64);
    let d: [f64; 4] = core::array::from_fn(|c| x[c] - mean[c]);

    let mut squared = 0.0_f64;
    for a in 0..4 {
        for b in 0..4 {
            squared += d[a] * inverse[a][b] * d[b];
        }
    }
    // Rounding can leave a tiny negative for points at the mean.
    squared.max(0.0).sqrt()
}

/// Gauss-Jordan inversion with partial pivoting.
///
/// A pivot below `1e-12` of the largest entry is treated as zero.
fn invert(matrix: [[f64; 4]; 4]) -> Option<[[f64; 4]; 4]> {
    let largest = matrix.iter().flatten().fold(0.0_f64, |acc, v| acc.max(v.abs()));
    if largest == 0.0 || !largest.is_finite() {
        return None;
    }
    let tolerance = largest * 1e-12;

    let mut a = matrix;
    let mut inverse: [[f64; 4]; 4] =
        core::array::from_fn(|r| core::array::from_fn(|c| if r == c { 1.0 } else { 0.0 }));

    for col in 0..4 {
        let pivot = (col..4).max_by(|&x, &y| a[x][col].abs().total_cmp(&a[y][col].abs()))?;
        if a[pivot][col].abs() <= tolerance {
            return None;
        }
        a.swap(col, pivot);
        inverse.swap(col, pivot);

        let p = a[col][col];
        for k in 0..4 {
            a[col][k] /= p;
            inverse[col][k] /= p;
        }

        for row in 0..4 {
            let factor = a[row][col];
            if row == col || factor == 0.0 {
                continue;
            }
            for k in 0..4 {
                a[row][k] -= factor * a[col][k];
                inverse[row][k] -= factor * inverse[col][k];
            }
        }
    }
    Some(inverse)
}

/// Count, mean and standard deviation of a set of Mahalanobis distances.
///
/// The standard deviation is the population one, matching how the distances
/// are usually compared against a χ² distribution with four degrees of
/// freedom.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DistanceSummary {
    count: u64,
    mean: f64,
    m2: f64,
}

impl DistanceSummary {
    pub fn push(&mut self, distance: f64) {
        self.count += 1;
        let delta = distance - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (distance - self.mean);
    }

    pub const fn count(&self) -> u64 {
        self.count
    }

    pub const fn mean(&self) -> f64 {
        self.mean
    }

    /// Population standard deviation; `0.0` before the first distance.
    pub fn std_dev(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        (self.m2 / self.count as f64).sqrt()
    }
}

impl fmt::Display for DistanceSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "mahalanobis distance: mean {:.4}, std {:.4} over {} records",
            self.mean,
            self.std_dev(),
            self.count
        )
    }
}

impl Extend<Quaternion> for Summary {
    fn extend<I: IntoIterator<Item = Quaternion>>(&mut self, iter: I) {
        for record in iter {
            self.push(&record);
        }
    }
}

impl<'a> Extend<&'a Quaternion> for Summary {
    fn extend<I: IntoIterator<Item = &'a Quaternion>>(&mut self, iter: I) {
        for record in iter {
            self.push(record);
        }
    }
}

impl FromIterator<Quaternion> for Summary {
    fn from_iter<I: IntoIterator<Item = Quaternion>>(iter: I) -> Self {
        let mut summary = Self::new();
        summary.extend(iter);
        summary
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "records: {}", self.count)?;
        let (Some(min), Some(max)) = (self.min(), self.max()) else {
            return Ok(());
        };

        let mean = self.mean();
        let variance = self.variance();
        writeln!(
            f,
            "{:>4} {:>10} {:>10} {:>10} {:>10}",
            "", "min", "max", "mean", "variance"
        )?;
        for c in 0..4 {
            writeln!(
                f,
                "{:>4} {:>10} {:>10} {:>10.4} {:>10.4}",
                COMPONENT_NAMES[c],
                min[c].to_string(),
                max[c].to_string(),
                mean[c],
                variance[c]
            )?;
        }

        writeln!(f, "correlation:")?;
        for (name, row) in COMPONENT_NAMES.iter().zip(self.correlation()) {
            write!(f, "{name:>4}")?;
            for value in row {
                write!(f, " {value:>8.4}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
