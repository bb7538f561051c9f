use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A seat within an auditorium, identified by row label and seat number.
///
/// Serialized as the compact form customers see on tickets: `"A1"`, `"B12"`.
/// Ordering is row-first, then numeric within the row, so `A2` sorts before
/// `A10`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SeatId {
    pub row: String,
    pub number: u32,
}

impl SeatId {
    pub fn new(row: impl Into<String>, number: u32) -> Self {
        Self {
            row: row.into().to_uppercase(),
            number,
        }
    }
}

impl fmt::Display for SeatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.row, self.number)
    }
}

impl FromStr for SeatId {
    type Err = SeatIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_uppercase();
        let digits_start = s
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(|| SeatIdError(s.clone()))?;

        let (row, number) = s.split_at(digits_start);
        if row.is_empty() || !row.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(SeatIdError(s.clone()));
        }

        let number: u32 = number.parse().map_err(|_| SeatIdError(s.clone()))?;
        if number == 0 {
            return Err(SeatIdError(s));
        }

        Ok(SeatId {
            row: row.to_string(),
            number,
        })
    }
}

impl TryFrom<String> for SeatId {
    type Error = SeatIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SeatId> for String {
    fn from(seat: SeatId) -> Self {
        seat.to_string()
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Invalid seat identifier: {0}")]
pub struct SeatIdError(pub String);
