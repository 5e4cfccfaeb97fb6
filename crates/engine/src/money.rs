use std::{fmt, str::FromStr};

use crate::EngineError;

/// Signed money amount represented as an integer number of **millionths** of
/// a currency unit (six fixed decimals).
///
/// Prices carry at most four decimals ([`Money::PRICE_DECIMALS`]) and size
/// multipliers are whole percentages, so `price x multiplier` is always exact:
/// `1.255 x 0.85` is `1.06675`, with no floating-point drift and no early
/// rounding.
///
/// Amounts that are stored "to the cent" (an account's lifetime spend) go
/// through [`Money::round_to_cents`].
///
/// # Examples
///
/// ```rust
/// use engine::Money;
///
/// let price = Money::from_cents(3_99);
/// assert_eq!(price.minor(), 3_990_000);
/// assert_eq!(price.to_string(), "$3.99");
/// ```
///
/// Parsing from user input (accepts `.` or `,` as decimal separator; rejects >
/// 4 decimals):
///
/// ```rust
/// use engine::Money;
///
/// assert_eq!("10".parse::<Money>().unwrap(), Money::from_cents(1000));
/// assert_eq!("10,5".parse::<Money>().unwrap(), Money::from_cents(1050));
/// assert_eq!("1.255".parse::<Money>().unwrap(), Money::new(1_255_000));
/// assert!("0.00001".parse::<Money>().is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Minor units in one currency unit.
    pub const SCALE: i64 = 1_000_000;

    /// Fractional digits a price may carry.
    pub const PRICE_DECIMALS: usize = 4;

    /// Minor units in the smallest price step (`0.0001`).
    const PRICE_STEP: i64 = 100;

    const MINOR_PER_CENT: i64 = 10_000;

    /// Creates a new amount from raw minor units (millionths).
    #[must_use]
    pub const fn new(minor: i64) -> Self {
        Self(minor)
    }

    /// Creates a new amount from integer cents.
    #[must_use]
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents * Self::MINOR_PER_CENT)
    }

    /// Returns the raw value in minor units.
    #[must_use]
    pub const fn minor(self) -> i64 {
        self.0
    }

    /// Returns `true` if the amount is positive.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Returns `true` if the amount is negative.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Whether the amount fits in [`Money::PRICE_DECIMALS`] decimals.
    #[must_use]
    pub const fn is_price_precision(self) -> bool {
        self.0 % Self::PRICE_STEP == 0
    }

    /// Checked addition (returns `None` on overflow).
    #[must_use]
    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }

    /// Scales the amount by `percent / 100`.
    ///
    /// Returns `None` on overflow or when the result is not representable
    /// exactly; never truncates.
    #[must_use]
    pub fn checked_mul_percent(self, percent: i64) -> Option<Money> {
        let scaled = self.0.checked_mul(percent)?;
        (scaled % 100 == 0).then_some(Money(scaled / 100))
    }

    /// Rounds to a whole number of cents, half away from zero.
    #[must_use]
    pub fn round_to_cents(self) -> Money {
        let rem = self.0 % Self::MINOR_PER_CENT;
        let truncated = self.0 - rem;
        if rem.abs() * 2 >= Self::MINOR_PER_CENT {
            Money(truncated + rem.signum() * Self::MINOR_PER_CENT)
        } else {
            Money(truncated)
        }
    }

    /// `floor(self x factor)` in whole currency units.
    ///
    /// Returns `None` on overflow.
    #[must_use]
    pub fn floor_units_times(self, factor: i64) -> Option<i64> {
        self.0
            .checked_mul(factor)
            .map(|scaled| scaled.div_euclid(Self::SCALE))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cents = self.round_to_cents().0 / Self::MINOR_PER_CENT;
        let sign = if cents < 0 { "-" } else { "" };
        let abs = cents.unsigned_abs();
        let units = abs / 100;
        let cents = abs % 100;
        write!(f, "{sign}${units}.{cents:02}")
    }
}

impl FromStr for Money {
    type Err = EngineError;

    /// Parses a decimal string.
    ///
    /// Accepts `.` or `,` as decimal separator and an optional leading `+`/`-`.
    ///
    /// Validation rules:
    /// - max 4 fractional digits (rejects `0.00001`)
    /// - rejects empty/invalid strings
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let empty = || EngineError::InvalidAmount("empty amount".to_string());
        let invalid = || EngineError::InvalidAmount(format!("invalid amount: {s}"));
        let overflow = || EngineError::InvalidAmount("amount too large".to_string());

        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(empty());
        }

        let (negative, rest) = if let Some(stripped) = trimmed.strip_prefix('-') {
            (true, stripped)
        } else if let Some(stripped) = trimmed.strip_prefix('+') {
            (false, stripped)
        } else {
            (false, trimmed)
        };

        let rest = rest.trim();
        if rest.is_empty() {
            return Err(empty());
        }

        let rest = rest.replace(',', ".");
        let mut parts = rest.split('.');
        let units_str = parts.next().ok_or_else(invalid)?;
        let frac_str = parts.next();

        if parts.next().is_some() {
            return Err(invalid());
        }

        if units_str.is_empty() || !units_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let units: i64 = units_str.parse().map_err(|_| overflow())?;

        let fraction: i64 = match frac_str {
            None | Some("") => 0,
            Some(frac) => {
                if !frac.chars().all(|c| c.is_ascii_digit()) {
                    return Err(invalid());
                }
                if frac.len() > Self::PRICE_DECIMALS {
                    return Err(EngineError::InvalidAmount(
                        "too many decimals".to_string(),
                    ));
                }
                // Right-pad to four digits: "5" -> 5000, "255" -> 2550.
                let digits: i64 = frac.parse().map_err(|_| invalid())?;
                digits * 10_i64.pow((Self::PRICE_DECIMALS - frac.len()) as u32)
            }
        };

        let steps_per_unit = Self::SCALE / Self::PRICE_STEP;
        let minor = units
            .checked_mul(steps_per_unit)
            .and_then(|v| v.checked_add(fraction))
            .and_then(|v| v.checked_mul(Self::PRICE_STEP))
            .ok_or_else(overflow)?;

        Ok(Money(if negative { -minor } else { minor }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_rounds_to_cents() {
        assert_eq!(Money::ZERO.to_string(), "$0.00");
        assert_eq!(Money::from_cents(1).to_string(), "$0.01");
        assert_eq!(Money::from_cents(1050).to_string(), "$10.50");
        assert_eq!(Money::from_cents(-1050).to_string(), "-$10.50");
        assert_eq!(Money::new(3_391_500).to_string(), "$3.39");
        assert_eq!(Money::new(3_395_000).to_string(), "$3.40");
    }

    #[test]
    fn parse_accepts_dot_or_comma() {
        assert_eq!("10".parse::<Money>().unwrap(), Money::from_cents(1000));
        assert_eq!("10.5".parse::<Money>().unwrap(), Money::from_cents(1050));
        assert_eq!("10,50".parse::<Money>().unwrap(), Money::from_cents(1050));
        assert_eq!("-0.01".parse::<Money>().unwrap(), Money::from_cents(-1));
        assert_eq!("+1.00".parse::<Money>().unwrap(), Money::from_cents(100));
        assert_eq!("  2.30 ".parse::<Money>().unwrap(), Money::from_cents(230));
    }

    #[test]
    fn parse_keeps_up_to_four_decimals() {
        assert_eq!("1.255".parse::<Money>().unwrap(), Money::new(1_255_000));
        assert_eq!("0,0001".parse::<Money>().unwrap(), Money::new(100));
        assert_eq!("-2.5005".parse::<Money>().unwrap(), Money::new(-2_500_500));
    }

    #[test]
    fn parse_rejects_more_than_four_decimals() {
        assert!("12.34567".parse::<Money>().is_err());
        assert!("0.00001".parse::<Money>().is_err());
        assert!("abc".parse::<Money>().is_err());
        assert!("".parse::<Money>().is_err());
    }

    #[test]
    fn round_to_cents_is_half_away_from_zero() {
        assert_eq!(Money::new(3_391_500).round_to_cents(), Money::from_cents(339));
        assert_eq!(Money::new(3_395_000).round_to_cents(), Money::from_cents(340));
        assert_eq!(Money::new(-3_395_000).round_to_cents(), Money::from_cents(-340));
        assert_eq!(Money::new(-3_394_999).round_to_cents(), Money::from_cents(-339));
    }

    #[test]
    fn percent_scaling_is_exact_for_prices() {
        let price = Money::from_cents(399);
        assert_eq!(price.checked_mul_percent(85), Some(Money::new(3_391_500)));
        assert_eq!(price.checked_mul_percent(125), Some(Money::new(4_987_500)));
        assert_eq!(price.checked_mul_percent(100), Some(price));

        let fine = Money::new(1_255_000);
        assert_eq!(fine.checked_mul_percent(85), Some(Money::new(1_066_750)));
        assert_eq!(Money::new(100).checked_mul_percent(85), Some(Money::new(85)));
    }

    #[test]
    fn percent_scaling_refuses_to_truncate() {
        assert_eq!(Money::new(1).checked_mul_percent(85), None);
        assert!(!Money::new(1).is_price_precision());
        assert!(Money::new(1_255_000).is_price_precision());
    }

    #[test]
    fn floor_units_discards_fractions() {
        assert_eq!(Money::from_cents(100).floor_units_times(5), Some(5));
        assert_eq!(Money::new(3_391_500).floor_units_times(5), Some(16));
        assert_eq!(Money::from_cents(19).floor_units_times(5), Some(0));
    }
}
