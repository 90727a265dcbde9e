//! Exact rhythmic durations
//!
//! Durations are fractions of a whole note (`1/4` is a quarter note). All
//! arithmetic is exact so that two voices with equal total length always
//! line up without drift.

use std::fmt;
use std::ops::{Add, AddAssign, Mul};
use std::str::FromStr;

use num_rational::Ratio;
use serde::{Deserialize, Serialize};

use crate::error::{AgniError, Result};

/// A span of musical time as an exact fraction of a whole note
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Duration(Ratio<u64>);

impl Duration {
    pub const ZERO: Duration = Duration(Ratio::new_raw(0, 1));

    /// Build a duration from a numerator and denominator.
    ///
    /// # Panics
    /// Panics if `denom` is zero.
    pub fn new(numer: u64, denom: u64) -> Self {
        Self(Ratio::new(numer, denom))
    }

    pub fn numer(&self) -> u64 {
        *self.0.numer()
    }

    pub fn denom(&self) -> u64 {
        *self.0.denom()
    }

    pub fn is_zero(&self) -> bool {
        self.numer() == 0
    }

    /// `self - other`, or `None` when the result would be negative
    pub fn checked_sub(self, other: Duration) -> Option<Duration> {
        (self >= other).then(|| Duration(self.0 - other.0))
    }

    /// Scale by a tuplet ratio
    pub fn scaled(self, ratio: TupletRatio) -> Duration {
        Duration(self.0 * ratio.0)
    }

    /// True when the value can be written as a single (possibly dotted)
    /// note head: a power-of-two denominator, a numerator whose binary form
    /// is a run of ones followed by zeros, and less than a maxima (16 wholes).
    pub fn is_assignable(&self) -> bool {
        let numer = self.numer();
        if numer == 0 || self.0 >= Ratio::from_integer(16) {
            return false;
        }
        if !self.denom().is_power_of_two() {
            return false;
        }
        let ones = numer >> numer.trailing_zeros();
        (ones + 1).is_power_of_two()
    }
}

impl Default for Duration {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Add for Duration {
    type Output = Duration;

    fn add(self, rhs: Duration) -> Duration {
        Duration(self.0 + rhs.0)
    }
}

impl AddAssign for Duration {
    fn add_assign(&mut self, rhs: Duration) {
        self.0 += rhs.0;
    }
}

impl Mul<TupletRatio> for Duration {
    type Output = Duration;

    fn mul(self, rhs: TupletRatio) -> Duration {
        self.scaled(rhs)
    }
}

impl std::iter::Sum for Duration {
    fn sum<I: Iterator<Item = Duration>>(iter: I) -> Duration {
        iter.fold(Duration::ZERO, Add::add)
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Duration {
    type Err = AgniError;

    fn from_str(s: &str) -> Result<Self> {
        parse_ratio(s).map(Duration)
    }
}

impl TryFrom<String> for Duration {
    type Error = AgniError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Duration> for String {
    fn from(value: Duration) -> Self {
        value.to_string()
    }
}

/// Multiplier applied to the written durations inside a tuplet
/// (`2/3` for a triplet: three notes in the time of two)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TupletRatio(Ratio<u64>);

impl TupletRatio {
    /// # Panics
    /// Panics if `denom` is zero.
    pub fn new(numer: u64, denom: u64) -> Self {
        Self(Ratio::new(numer, denom))
    }

    pub fn numer(&self) -> u64 {
        *self.0.numer()
    }

    pub fn denom(&self) -> u64 {
        *self.0.denom()
    }

    /// LilyPond-style `denom:numer` string, e.g. `3:2` for a triplet
    pub fn colon_string(&self) -> String {
        format!("{}:{}", self.denom(), self.numer())
    }
}

impl fmt::Display for TupletRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TupletRatio {
    type Err = AgniError;

    fn from_str(s: &str) -> Result<Self> {
        let ratio = parse_ratio(s)?;
        if *ratio.numer() == 0 {
            return Err(AgniError::InvalidDuration(format!("zero tuplet ratio '{s}'")));
        }
        Ok(TupletRatio(ratio))
    }
}

impl TryFrom<String> for TupletRatio {
    type Error = AgniError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<TupletRatio> for String {
    fn from(value: TupletRatio) -> Self {
        value.to_string()
    }
}

fn parse_ratio(s: &str) -> Result<Ratio<u64>> {
    s.trim()
        .parse::<Ratio<u64>>()
        .map_err(|e| AgniError::InvalidDuration(format!("'{s}': {e}")))
}
