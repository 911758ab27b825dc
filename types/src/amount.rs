//! Fixed-point decimal amounts.
//!
//! A [`Dec`] carries 18 decimal places in an `i128`, matching the network's `numeric.Dec`.
//! Because one ITC is 10^18 atto, the raw mantissa of a token amount is exactly its
//! value in atto, the smallest indivisible unit.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::TypesError;

/// Number of decimal places carried by [`Dec`].
pub const PRECISION: u32 = 18;

const SCALE: i128 = 1_000_000_000_000_000_000;

/// Atto per ITC (the display unit).
pub const ATTO_PER_ITC: u128 = 1_000_000_000_000_000_000;

/// Atto per nano-ITC (the unit gas prices are quoted in).
pub const ATTO_PER_NANO: u128 = 1_000_000_000;

/// A signed fixed-point decimal with 18 decimal places.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Dec(i128);

impl Dec {
    pub const ZERO: Self = Self(0);
    pub const ONE: Self = Self(SCALE);

    /// Build from the raw mantissa (value × 10^18).
    pub const fn from_raw(raw: i128) -> Self {
        Self(raw)
    }

    pub const fn raw(&self) -> i128 {
        self.0
    }

    pub fn from_int(value: i64) -> Self {
        Self(value as i128 * SCALE)
    }

    /// Interpret an atto quantity as a token amount.
    pub fn from_atto(atto: u128) -> Result<Self, TypesError> {
        i128::try_from(atto)
            .map(Self)
            .map_err(|_| TypesError::Overflow(format!("{atto} atto")))
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Token amount in atto. Negative amounts are rejected.
    pub fn to_atto(&self) -> Result<u128, TypesError> {
        self.to_base_units(1_000_000_000_000_000_000)
    }

    /// Convert a value quoted in some unit into atto, truncating any fraction of an atto.
    ///
    /// `atto_per_unit` is the size of the quoted unit, e.g. [`ATTO_PER_NANO`] for gas prices.
    pub fn to_base_units(&self, atto_per_unit: u128) -> Result<u128, TypesError> {
        if self.is_negative() {
            return Err(TypesError::Negative(self.to_string()));
        }
        let raw = self.0 as u128;
        let scale = SCALE as u128;
        let whole = (raw / scale)
            .checked_mul(atto_per_unit)
            .ok_or_else(|| TypesError::Overflow(self.to_string()))?;
        let frac = (raw % scale).checked_mul(atto_per_unit).map(|v| v / scale);
        frac.and_then(|f| whole.checked_add(f))
            .ok_or_else(|| TypesError::Overflow(self.to_string()))
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }
}

fn parse_unsigned(input: &str, s: &str) -> Result<i128, TypesError> {
    let invalid = || TypesError::InvalidDecimal(input.to_string());

    let (mantissa, exponent) = match s.find(['e', 'E']) {
        Some(i) => {
            let exp = s[i + 1..].parse::<i32>().map_err(|_| invalid())?;
            (&s[..i], exp)
        }
        None => (s, 0),
    };
    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(invalid());
    }
    if !int_part.bytes().chain(frac_part.bytes()).all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let mut digits: Vec<u8> = int_part.bytes().chain(frac_part.bytes()).collect();
    let mut shift = PRECISION as i64 + exponent as i64 - frac_part.len() as i64;
    if shift < 0 {
        let cut = (-shift) as usize;
        let keep = digits.len().saturating_sub(cut);
        if digits[keep..].iter().any(|&d| d != b'0') {
            return Err(TypesError::TooMuchPrecision(input.to_string()));
        }
        digits.truncate(keep);
        shift = 0;
    }

    let overflow = || TypesError::Overflow(input.to_string());
    let mut raw: i128 = 0;
    for d in digits {
        raw = raw
            .checked_mul(10)
            .and_then(|v| v.checked_add((d - b'0') as i128))
            .ok_or_else(overflow)?;
    }
    if raw == 0 {
        return Ok(0);
    }
    let factor = u32::try_from(shift)
        .ok()
        .and_then(|e| 10i128.checked_pow(e))
        .ok_or_else(overflow)?;
    raw.checked_mul(factor).ok_or_else(overflow)
}

impl FromStr for Dec {
    type Err = TypesError;

    /// Parses plain (`12`, `0.5`, `-3.25`, `.5`) and exponent (`1e18`, `2.5E-3`) notation.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (negative, body) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };
        let raw = parse_unsigned(s, body)?;
        Ok(Self(if negative { -raw } else { raw }))
    }
}

impl fmt::Display for Dec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let abs = self.0.unsigned_abs();
        let scale = SCALE as u128;
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{sign}{}.{:018}", abs / scale, abs % scale)
    }
}

impl Serialize for Dec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Dec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
