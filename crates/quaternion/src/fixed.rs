use core::fmt;
use core::str::FromStr;

use crate::ParseError;

/// Number of raw units per whole unit: `value = raw / FRACTION_SCALE`.
pub const FRACTION_SCALE: i32 = 100;

/// Half-width of the window generated components are drawn from
/// (`16.00`).
pub const SCALE: FixedPoint = FixedPoint::from_raw(1600);

/// A decimal value stored as an integer scaled by [`FRACTION_SCALE`].
///
/// `FixedPoint::from_raw(-150)` is `-1.50`, `FixedPoint::from_raw(5)` is
/// `0.05`.
///
/// The text form is `<integer>.<fraction>`, where the integer part is the
/// truncated quotient (sign preserved) and the fraction is the absolute
/// remainder, always two digits. Values strictly between `-1.00` and `0.00`
/// therefore render without a sign: `-50` renders as `0.50`.
///
/// # Example
/// ```
/// use quaternion::FixedPoint;
///
/// assert_eq!(FixedPoint::from_raw(-150).to_string(), "-1.50");
/// assert_eq!(FixedPoint::from_raw(5).to_string(), "0.05");
/// assert_eq!("16.00".parse::<FixedPoint>(), Ok(FixedPoint::from_raw(1600)));
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FixedPoint(i32);

impl FixedPoint {
    /// `0.00`
    pub const ZERO: Self = Self(0);

    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    pub const fn to_raw(self) -> i32 {
        self.0
    }

    /// Truncated whole part, sign preserved.
    pub const fn integer_part(self) -> i32 {
        self.0 / FRACTION_SCALE
    }

    /// Absolute remainder, always in `0..=99`.
    pub const fn fraction_part(self) -> u32 {
        (self.0 % FRACTION_SCALE).unsigned_abs()
    }

    pub fn to_f64(self) -> f64 {
        f64::from(self.0) / f64::from(FRACTION_SCALE)
    }

    /// Clamps the value into `[-bound, bound]`.
    ///
    /// The bound is taken by magnitude, so a negative `bound` behaves like its
    /// absolute value.
    pub const fn clamp_to(self, bound: Self) -> Self {
        let bound = bound.0.saturating_abs();
        if self.0 > bound {
            Self(bound)
        } else if self.0 < -bound {
            Self(-bound)
        } else {
            self
        }
    }

    /// Appends the text form to `buf` and returns the number of bytes written.
    pub fn encode_into(self, buf: &mut Vec<u8>) -> usize {
        let start = buf.len();
        let int = self.integer_part();
        if int < 0 {
            buf.push(b'-');
        }
        push_decimal(buf, int.unsigned_abs());
        buf.push(b'.');
        let frac = self.fraction_part();
        buf.push(b'0' + (frac / 10) as u8);
        buf.push(b'0' + (frac % 10) as u8);
        buf.len() - start
    }
}

fn push_decimal(buf: &mut Vec<u8>, mut n: u32) {
    let mut digits = [0_u8; 10];
    let mut pos = digits.len();
    loop {
        pos -= 1;
        digits[pos] = b'0' + (n % 10) as u8;
        n /= 10;
        if n == 0 {
            break;
        }
    }
    buf.extend_from_slice(&digits[pos..]);
}

impl fmt::Display for FixedPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.integer_part(), self.fraction_part())
    }
}

impl FromStr for FixedPoint {
    type Err = ParseError;

    /// Parses `[-]<digits>.<two digits>`.
    ///
    /// A leading `-` applies to the whole value, so `-0.50` parses to `-50`
    /// even though encoding `-50` yields `0.50`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseError::InvalidValue {
            value: s.to_string(),
        };

        let (negative, unsigned) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let (int, frac) = unsigned.split_once('.').ok_or_else(invalid)?;
        if int.is_empty()
            || frac.len() != 2
            || !int.bytes().all(|b| b.is_ascii_digit())
            || !frac.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let int: i64 = int.parse().map_err(|_| invalid())?;
        let frac: i64 = frac.parse().map_err(|_| invalid())?;
        let magnitude = int
            .checked_mul(i64::from(FRACTION_SCALE))
            .and_then(|v| v.checked_add(frac))
            .ok_or_else(invalid)?;
        let raw = if negative { -magnitude } else { magnitude };

        i32::try_from(raw).map(Self).map_err(|_| invalid())
    }
}
