//! Fixed-point monetary amount with eight decimal places

use crate::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::str::FromStr;

/// Number of base units in one whole unit
pub const FIXED8_ONE: i64 = 100_000_000;

/// Exact amount, stored as a signed count of 10^-8 units.
///
/// Operator arithmetic panics on overflow the same way integer overflow
/// checks do; ledger code that sums untrusted values uses the `checked_*`
/// methods instead.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Fixed8(i64);

impl Fixed8 {
    /// Zero amount
    pub const ZERO: Fixed8 = Fixed8(0);
    /// Smallest positive amount
    pub const SATOSHI: Fixed8 = Fixed8(1);
    /// Largest representable amount
    pub const MAX: Fixed8 = Fixed8(i64::MAX);
    /// Smallest representable amount
    pub const MIN: Fixed8 = Fixed8(i64::MIN);

    /// Create from a raw count of base units
    pub const fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    /// Create from a whole number of units
    pub fn from_units(units: i64) -> CoreResult<Self> {
        units
            .checked_mul(FIXED8_ONE)
            .map(Self)
            .ok_or(CoreError::Overflow)
    }

    /// Raw count of base units
    pub const fn raw(self) -> i64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    pub fn checked_add(self, other: Fixed8) -> Option<Fixed8> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Fixed8) -> Option<Fixed8> {
        self.0.checked_sub(other.0).map(Self)
    }

    /// Multiply by an integer factor
    pub fn checked_mul_int(self, factor: i64) -> Option<Fixed8> {
        self.0.checked_mul(factor).map(Self)
    }

    /// Sum an iterator of amounts, `None` on overflow
    pub fn checked_sum<I>(iter: I) -> Option<Fixed8>
    where
        I: IntoIterator<Item = Fixed8>,
    {
        iter.into_iter()
            .try_fold(Fixed8::ZERO, |acc, value| acc.checked_add(value))
    }

    /// Check that the amount has no more than `decimals` fractional digits
    pub fn has_precision(self, decimals: u8) -> bool {
        if decimals >= 8 {
            return true;
        }
        let step = 10i64.pow(u32::from(8 - decimals));
        self.0 % step == 0
    }
}

impl Add for Fixed8 {
    type Output = Fixed8;

    fn add(self, other: Fixed8) -> Fixed8 {
        match self.checked_add(other) {
            Some(sum) => sum,
            None => panic!("Fixed8 addition overflow"),
        }
    }
}

impl AddAssign for Fixed8 {
    fn add_assign(&mut self, other: Fixed8) {
        *self = *self + other;
    }
}

impl Sub for Fixed8 {
    type Output = Fixed8;

    fn sub(self, other: Fixed8) -> Fixed8 {
        match self.checked_sub(other) {
            Some(diff) => diff,
            None => panic!("Fixed8 subtraction overflow"),
        }
    }
}

impl SubAssign for Fixed8 {
    fn sub_assign(&mut self, other: Fixed8) {
        *self = *self - other;
    }
}

impl Neg for Fixed8 {
    type Output = Fixed8;

    fn neg(self) -> Fixed8 {
        match self.0.checked_neg() {
            Some(raw) => Fixed8(raw),
            None => panic!("Fixed8 negation overflow"),
        }
    }
}

impl Sum for Fixed8 {
    fn sum<I: Iterator<Item = Fixed8>>(iter: I) -> Fixed8 {
        iter.fold(Fixed8::ZERO, |acc, value| acc + value)
    }
}

impl<'a> Sum<&'a Fixed8> for Fixed8 {
    fn sum<I: Iterator<Item = &'a Fixed8>>(iter: I) -> Fixed8 {
        iter.copied().sum()
    }
}

impl fmt::Display for Fixed8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let magnitude = self.0.unsigned_abs();
        let one = FIXED8_ONE as u64;
        let units = magnitude / one;
        let fraction = magnitude % one;
        if fraction == 0 {
            return write!(f, "{}{}", sign, units);
        }
        let digits = format!("{:08}", fraction);
        write!(f, "{}{}.{}", sign, units, digits.trim_end_matches('0'))
    }
}

impl FromStr for Fixed8 {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        let invalid = || CoreError::InvalidAmount(s.to_string());
        let (negative, body) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let (whole, fraction) = match body.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (body, ""),
        };
        if whole.is_empty() || fraction.len() > 8 {
            return Err(invalid());
        }
        if !whole.bytes().all(|b| b.is_ascii_digit()) || !fraction.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let units: i64 = whole.parse().map_err(|_| invalid())?;
        let mut fraction_raw: i64 = 0;
        if !fraction.is_empty() {
            fraction_raw = format!("{:0<8}", fraction).parse().map_err(|_| invalid())?;
        }
        let raw = units
            .checked_mul(FIXED8_ONE)
            .and_then(|v| v.checked_add(fraction_raw))
            .ok_or(CoreError::Overflow)?;
        Ok(Fixed8(if negative { -raw } else { raw }))
    }
}
