use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A 1-5 ordinal priority attached to ideas and projects.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(try_from = "i64", into = "i64")]
pub struct Ranking(u8);

impl Ranking {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: i64) -> Result<Self, ValidationError> {
        if (Self::MIN as i64..=Self::MAX as i64).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(ValidationError::RankingOutOfRange(value))
        }
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    pub fn label(&self) -> &'static str {
        match self.0 {
            1 => "Not happening",
            2 => "Maybe later",
            3 => "Under consideration",
            4 => "Planned",
            _ => "Actively working on",
        }
    }

    pub fn all() -> impl Iterator<Item = Ranking> {
        (Self::MIN..=Self::MAX).map(Ranking)
    }
}

impl Default for Ranking {
    /// Forms start at "Under consideration".
    fn default() -> Self {
        Self(3)
    }
}

impl TryFrom<i64> for Ranking {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Ranking> for i64 {
    fn from(ranking: Ranking) -> Self {
        ranking.0 as i64
    }
}
