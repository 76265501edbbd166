//! Whole-Rupiah amounts and their id-ID formatting.
//!
//! The ledger never deals in fractions of a Rupiah. Input coming from a user is parsed leniently:
//! every character that is not an ASCII digit is dropped, so `"Rp 10.000"`, `"10,000"` and
//! `"10000"` are all ten thousand. Anything that yields no digits (or overflows) is zero.

use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// A non-negative amount of whole Rupiah.
///
/// ```
/// # use kas_hima::model::Rupiah;
/// let amount: Rupiah = "Rp 1.500.000".parse().unwrap();
/// assert_eq!(amount.value(), 1_500_000);
/// assert_eq!(amount.to_string(), "Rp 1.500.000");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Rupiah(u64);

impl Rupiah {
    pub const ZERO: Rupiah = Rupiah(0);

    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Parses user input the lenient way described in the module docs. Never fails.
    pub fn parse(s: &str) -> Self {
        let digits: String = s.chars().filter(|c| c.is_ascii_digit()).collect();
        Self(digits.parse().unwrap_or_default())
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// The value as a signed number, saturating at `i64::MAX`.
    pub fn signed(&self) -> i64 {
        i64::try_from(self.0).unwrap_or(i64::MAX)
    }
}

impl FromStr for Rupiah {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl Display for Rupiah {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", format_rupiah(self.signed()))
    }
}

impl From<u64> for Rupiah {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Formats `n` with `.` as the thousands separator, e.g. `-1.234.567`.
pub fn format_number(n: i64) -> String {
    let sign = if n < 0 { "-" } else { "" };
    // f64 is exact for every amount a student treasury will ever see.
    let grouped = format_num::format_num!(",.0f", n.unsigned_abs() as f64);
    format!("{sign}{}", grouped.replace(',', "."))
}

/// Formats `n` as Indonesian currency without decimals, e.g. `Rp 25.000` or `-Rp 5.000`.
pub fn format_rupiah(n: i64) -> String {
    let sign = if n < 0 { "-" } else { "" };
    format!("{sign}Rp {}", format_number(n.saturating_abs()))
}
