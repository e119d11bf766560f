//! Bounded numeric inputs and percentage metrics.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Error;

/// A rubric rating on the integer 1–5 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    /// Lowest rating.
    pub const MIN: Rating = Rating(1);
    /// Highest rating.
    pub const MAX: Rating = Rating(5);

    /// Creates a rating, rejecting values outside 1–5.
    pub fn new(value: u8) -> Result<Self, Error> {
        if (1..=5).contains(&value) {
            Ok(Self(value))
        } else {
            Err(Error::OutOfRange {
                field: "rating",
                value: i64::from(value),
                min: 1,
                max: 5,
            })
        }
    }

    /// The rating as an integer.
    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for Rating {
    fn default() -> Self {
        Rating(3)
    }
}

impl TryFrom<u8> for Rating {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An integer percentage in 0–100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Percentage(u8);

impl Percentage {
    /// Creates a percentage, rejecting values above 100.
    pub fn new(value: u8) -> Result<Self, Error> {
        if value <= 100 {
            Ok(Self(value))
        } else {
            Err(Error::OutOfRange {
                field: "percentage",
                value: i64::from(value),
                min: 0,
                max: 100,
            })
        }
    }

    /// The percentage as an integer.
    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for Percentage {
    fn default() -> Self {
        Percentage(50)
    }
}

impl TryFrom<u8> for Percentage {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Percentage> for u8 {
    fn from(p: Percentage) -> Self {
        p.0
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// `numerator / denominator * 100`, or 0 when the denominator is 0.
///
/// The numerator may exceed the denominator (make-up sessions), so the
/// result is not capped at 100.
pub fn ratio_percent(numerator: u32, denominator: u32) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    f64::from(numerator) / f64::from(denominator) * 100.0
}

/// Formats a rate with one decimal, as stored in the sheet.
pub fn format_rate(rate: f64) -> String {
    format!("{rate:.1}")
}

/// Rates below this attendance percentage raise a continuity warning.
pub const ATTENDANCE_WARNING_THRESHOLD: f64 = 75.0;
