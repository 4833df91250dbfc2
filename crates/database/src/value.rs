//! Parsing helpers for property values.

use core::fmt;
use core::ops::Mul;
use core::str::FromStr;

use crate::DataError;

/// Parses `yes`/`no` (or `true`/`false`).
pub fn parse_bool(key: &str, value: &str) -> Result<bool, DataError> {
    match value {
        "yes" | "true" => Ok(true),
        "no" | "false" => Ok(false),
        _ => Err(DataError::invalid_value(key, value, "expected 'yes' or 'no'")),
    }
}

/// Parses any integer type, naming the key on failure.
pub fn parse_number<T>(key: &str, value: &str) -> Result<T, DataError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    value
        .parse::<T>()
        .map_err(|error| DataError::invalid_value(key, value, error.to_string()))
}

/// Decimal number with four fractional digits, stored as an integer count of
/// ten-thousandths.
///
/// Used for probabilities and multipliers so that comparisons against a
/// random draw over `0..10_000` are exact.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FixedPoint(i64);

impl FixedPoint {
    pub const DECIMAL_DIGITS: usize = 4;
    pub const SCALE: i64 = 10_000;
    pub const ZERO: Self = Self(0);
    pub const ONE: Self = Self(Self::SCALE);

    pub const fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    /// Saturates at the representable range.
    pub const fn from_int(value: i64) -> Self {
        Self(value.saturating_mul(Self::SCALE))
    }

    /// `None` when `value` does not fit once scaled.
    pub const fn checked_from_int(value: i64) -> Option<Self> {
        match value.checked_mul(Self::SCALE) {
            Some(raw) => Some(Self(raw)),
            None => None,
        }
    }

    /// Value in ten-thousandths.
    pub const fn raw(self) -> i64 {
        self.0
    }

    /// Integer part, truncated toward zero.
    pub const fn to_int(self) -> i64 {
        self.0 / Self::SCALE
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn parse_value(key: &str, value: &str) -> Result<Self, DataError> {
        value
            .parse()
            .map_err(|reason: String| DataError::invalid_value(key, value, reason))
    }
}

impl FromStr for FixedPoint {
    type Err = String;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let (negative, digits) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));

        if whole.is_empty() && fraction.is_empty() {
            return Err("expected a number".into());
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit())
        {
            return Err("expected a decimal number".into());
        }
        if fraction.len() > Self::DECIMAL_DIGITS {
            return Err(format!(
                "at most {} decimal digits are supported",
                Self::DECIMAL_DIGITS
            ));
        }

        let whole: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| "number is too large".to_owned())?
        };
        let padded = format!("{fraction:0<width$}", width = Self::DECIMAL_DIGITS);
        let fraction: i64 = padded.parse().map_err(|_| "expected a decimal number".to_owned())?;

        let raw = whole
            .checked_mul(Self::SCALE)
            .and_then(|scaled| scaled.checked_add(fraction))
            .ok_or_else(|| "number is too large".to_owned())?;

        Ok(Self(if negative { -raw } else { raw }))
    }
}

impl fmt::Display for FixedPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let whole = abs / Self::SCALE as u64;
        let fraction = abs % Self::SCALE as u64;

        if fraction == 0 {
            return write!(f, "{sign}{whole}");
        }
        let fraction = format!("{fraction:04}");
        write!(f, "{sign}{whole}.{}", fraction.trim_end_matches('0'))
    }
}

/// Saturating product.
impl Mul for FixedPoint {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        let product = i128::from(self.0) * i128::from(rhs.0) / i128::from(Self::SCALE);
        Self(i64::try_from(product).unwrap_or(if product < 0 { i64::MIN } else { i64::MAX }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_booleans() {
        assert!(parse_bool("only_once", "yes").unwrap());
        assert!(!parse_bool("only_once", "no").unwrap());
        assert!(parse_bool("only_once", "maybe").is_err());
    }

    #[test]
    fn parse_number_reports_key() {
        let error = parse_number::<i32>("hit_points", "ten").unwrap_err();
        assert!(error.to_string().contains("hit_points"));
        assert_eq!(parse_number::<i64>("gold", "-15").unwrap(), -15);
    }

    #[test]
    fn fixed_point_parses_four_digits() {
        assert_eq!("0.25".parse::<FixedPoint>().unwrap().raw(), 2_500);
        assert_eq!("1.0001".parse::<FixedPoint>().unwrap().raw(), 10_001);
        assert_eq!("3".parse::<FixedPoint>().unwrap(), FixedPoint::from_int(3));
        assert_eq!("-0.5".parse::<FixedPoint>().unwrap().raw(), -5_000);
        assert_eq!(".5".parse::<FixedPoint>().unwrap().raw(), 5_000);
    }

    #[test]
    fn fixed_point_rejects_excess_precision() {
        assert!("0.12345".parse::<FixedPoint>().is_err());
        assert!("1.2.3".parse::<FixedPoint>().is_err());
        assert!("abc".parse::<FixedPoint>().is_err());
        assert!("".parse::<FixedPoint>().is_err());
    }

    #[test]
    fn fixed_point_multiplies_and_displays() {
        let half = FixedPoint::from_raw(5_000);
        assert_eq!(FixedPoint::from_int(30) * half, FixedPoint::from_int(15));
        assert_eq!(half.to_string(), "0.5");
        assert_eq!(FixedPoint::from_raw(-12_500).to_string(), "-1.25");
        assert_eq!(FixedPoint::from_int(2).to_string(), "2");
    }

    #[test]
    fn fixed_point_saturates_instead_of_overflowing() {
        let huge = 1_000_000_000_000_000;
        assert_eq!(FixedPoint::checked_from_int(huge), None);
        assert_eq!(FixedPoint::from_int(huge).raw(), i64::MAX);
        assert_eq!(FixedPoint::from_int(-huge).raw(), i64::MIN);

        let large = FixedPoint::from_int(900_000_000_000_000);
        assert_eq!((large * FixedPoint::from_int(100)).raw(), i64::MAX);
        assert_eq!((large * FixedPoint::from_int(-100)).raw(), i64::MIN);
        assert_eq!(large * FixedPoint::ONE, large);
    }
}
