//! Learner's self-assessed recall quality for one review.
use crate::error::SrsError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    Again,
    Hard,
    Good,
    Easy,
}

impl Rating {
    pub const ALL: [Rating; 4] = [Rating::Again, Rating::Hard, Rating::Good, Rating::Easy];

    /// Maps the rating keys 1-4 to again/hard/good/easy.
    pub fn from_key(key: char) -> Result<Self, SrsError> {
        match key {
            '1' => Ok(Rating::Again),
            '2' => Ok(Rating::Hard),
            '3' => Ok(Rating::Good),
            '4' => Ok(Rating::Easy),
            other => Err(SrsError::InvalidRating(other.to_string())),
        }
    }

    pub fn key(self) -> char {
        match self {
            Rating::Again => '1',
            Rating::Hard => '2',
            Rating::Good => '3',
            Rating::Easy => '4',
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Rating::Again => "again",
            Rating::Hard => "hard",
            Rating::Good => "good",
            Rating::Easy => "easy",
        }
    }
}

impl FromStr for Rating {
    type Err = SrsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        if let (Some(key), None) = (chars.next(), chars.next()) {
            if key.is_ascii_digit() {
                return Rating::from_key(key);
            }
        }

        match trimmed.to_ascii_lowercase().as_str() {
            "again" => Ok(Rating::Again),
            "hard" => Ok(Rating::Hard),
            "good" => Ok(Rating::Good),
            "easy" => Ok(Rating::Easy),
            _ => Err(SrsError::InvalidRating(s.to_string())),
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
