use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// Wei per ether.
pub const WEI_PER_ETHER: u128 = 1_000_000_000_000_000_000;

const ETHER_DECIMALS: usize = 18;

/// Wei - an amount of the single ledger currency, in its smallest unit.
///
/// Arithmetic is checked. A `None` from any `checked_*` helper means the
/// operation would overflow and must be rejected by the caller.
///
/// Serialized as a decimal string so amounts above `u64::MAX` survive JSON
/// and tagged enums; integers are accepted on input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Wei(pub u128);

impl Wei {
    pub const ZERO: Wei = Wei(0);

    pub const fn new(wei: u128) -> Self {
        Self(wei)
    }

    pub const fn from_ether(ether: u128) -> Self {
        Self(ether * WEI_PER_ETHER)
    }

    /// Parse a decimal ether amount such as `"0.0001"` or `"2"`.
    pub fn parse_ether(text: &str) -> Result<Self, AmountParseError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AmountParseError::Empty);
        }

        let (whole, fraction) = match text.split_once('.') {
            Some((w, f)) => (w, f),
            None => (text, ""),
        };
        if fraction.len() > ETHER_DECIMALS {
            return Err(AmountParseError::TooPrecise(fraction.len()));
        }
        let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(whole) || !all_digits(fraction) || (whole.is_empty() && fraction.is_empty())
        {
            return Err(AmountParseError::Malformed(text.to_string()));
        }

        let whole: u128 = if whole.is_empty() {
            0
        } else {
            whole
                .parse()
                .map_err(|_| AmountParseError::Overflow(text.to_string()))?
        };
        let mut padded = fraction.to_string();
        padded.extend(std::iter::repeat('0').take(ETHER_DECIMALS - fraction.len()));
        let fraction: u128 = padded
            .parse()
            .map_err(|_| AmountParseError::Malformed(text.to_string()))?;

        whole
            .checked_mul(WEI_PER_ETHER)
            .and_then(|w| w.checked_add(fraction))
            .map(Wei)
            .ok_or_else(|| AmountParseError::Overflow(text.to_string()))
    }

    pub fn as_u128(&self) -> u128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Wei) -> Option<Wei> {
        self.0.checked_add(other.0).map(Wei)
    }

    pub fn checked_sub(self, other: Wei) -> Option<Wei> {
        self.0.checked_sub(other.0).map(Wei)
    }

    /// Render as a decimal ether string without trailing zeros.
    pub fn to_ether_string(&self) -> String {
        let whole = self.0 / WEI_PER_ETHER;
        let fraction = self.0 % WEI_PER_ETHER;
        if fraction == 0 {
            return whole.to_string();
        }
        let digits = format!("{:0width$}", fraction, width = ETHER_DECIMALS);
        format!("{}.{}", whole, digits.trim_end_matches('0'))
    }
}

impl fmt::Display for Wei {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} wei", self.0)
    }
}

impl Serialize for Wei {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Wei {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct WeiVisitor;

        impl<'de> Visitor<'de> for WeiVisitor {
            type Value = Wei;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a wei amount as a decimal string or unsigned integer")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Wei, E> {
                Ok(Wei(u128::from(v)))
            }

            fn visit_u128<E: de::Error>(self, v: u128) -> Result<Wei, E> {
                Ok(Wei(v))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Wei, E> {
                v.trim().parse::<u128>().map(Wei).map_err(E::custom)
            }
        }

        deserializer.deserialize_any(WeiVisitor)
    }
}

/// Errors parsing a decimal ether amount.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AmountParseError {
    #[error("empty amount")]
    Empty,

    #[error("malformed ether amount: {0}")]
    Malformed(String),

    #[error("ether amount has {0} fractional digits, at most 18 allowed")]
    TooPrecise(usize),

    #[error("ether amount overflows: {0}")]
    Overflow(String),
}

/// Payout multiplier expressed as an exact ratio.
///
/// The default 3/2 pays 1.5× the premium. Integer division truncates
/// towards zero, so odd premiums lose at most one wei.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutMultiplier {
    pub numerator: u32,
    pub denominator: u32,
}

impl PayoutMultiplier {
    pub const fn new(numerator: u32, denominator: u32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Apply the multiplier to a premium.
    pub fn apply(&self, premium: Wei) -> Option<Wei> {
        if self.denominator == 0 {
            return None;
        }
        premium
            .0
            .checked_mul(u128::from(self.numerator))
            .map(|scaled| Wei(scaled / u128::from(self.denominator)))
    }
}

impl Default for PayoutMultiplier {
    fn default() -> Self {
        Self::new(3, 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_whole_and_fractional_ether() {
        assert_eq!(Wei::parse_ether("1").unwrap(), Wei::from_ether(1));
        assert_eq!(
            Wei::parse_ether("0.0001").unwrap(),
            Wei(100_000_000_000_000)
        );
        assert_eq!(
            Wei::parse_ether("0.00015").unwrap(),
            Wei(150_000_000_000_000)
        );
        assert_eq!(Wei::parse_ether(".5").unwrap(), Wei(WEI_PER_ETHER / 2));
        assert_eq!(Wei::parse_ether("2.").unwrap(), Wei::from_ether(2));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(Wei::parse_ether(""), Err(AmountParseError::Empty));
        assert!(matches!(
            Wei::parse_ether("1.2.3"),
            Err(AmountParseError::Malformed(_))
        ));
        assert!(matches!(
            Wei::parse_ether("-1"),
            Err(AmountParseError::Malformed(_))
        ));
        assert_eq!(
            Wei::parse_ether("0.0000000000000000001"),
            Err(AmountParseError::TooPrecise(19))
        );
    }

    #[test]
    fn ether_string_trims_trailing_zeros() {
        assert_eq!(Wei(150_000_000_000_000).to_ether_string(), "0.00015");
        assert_eq!(Wei::from_ether(4).to_ether_string(), "4");
        assert_eq!(Wei(1).to_ether_string(), "0.000000000000000001");
    }

    #[test]
    fn default_payout_is_one_and_a_half() {
        let payout = PayoutMultiplier::default();
        let premium = Wei::parse_ether("0.0001").unwrap();
        assert_eq!(
            payout.apply(premium),
            Some(Wei::parse_ether("0.00015").unwrap())
        );
        assert_eq!(payout.apply(Wei(3)), Some(Wei(4)));
    }

    #[test]
    fn payout_overflow_is_reported() {
        assert_eq!(PayoutMultiplier::default().apply(Wei(u128::MAX)), None);
        assert_eq!(PayoutMultiplier::new(1, 0).apply(Wei(10)), None);
    }

    #[test]
    fn serde_uses_decimal_strings() {
        let big = Wei(u128::from(u64::MAX) + 1);
        let json = serde_json::to_string(&big).unwrap();
        assert_eq!(json, "\"18446744073709551616\"");
        assert_eq!(serde_json::from_str::<Wei>(&json).unwrap(), big);
        assert_eq!(serde_json::from_str::<Wei>("42").unwrap(), Wei(42));
        assert!(serde_json::from_str::<Wei>("\"-1\"").is_err());
    }

    #[test]
    fn checked_arithmetic() {
        assert_eq!(Wei(5).checked_sub(Wei(6)), None);
        assert_eq!(Wei(u128::MAX).checked_add(Wei(1)), None);
        assert_eq!(Wei(5).checked_add(Wei(6)), Some(Wei(11)));
        let total = [Wei(1), Wei(2)]
            .into_iter()
            .try_fold(Wei::ZERO, Wei::checked_add);
        assert_eq!(total, Some(Wei(3)));
        let total = [Wei(u128::MAX), Wei(1)]
            .into_iter()
            .try_fold(Wei::ZERO, Wei::checked_add);
        assert_eq!(total, None);
    }
}
