use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::EngineError;

/// The six supported polyhedral dice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DieType {
    D4,
    D6,
    D8,
    D10,
    D12,
    D20,
}

impl DieType {
    pub const ALL: [DieType; 6] = [
        DieType::D4,
        DieType::D6,
        DieType::D8,
        DieType::D10,
        DieType::D12,
        DieType::D20,
    ];

    /// Number of faces, which is also the highest value (d10 reads 1..=10).
    pub const fn sides(self) -> u32 {
        match self {
            DieType::D4 => 4,
            DieType::D6 => 6,
            DieType::D8 => 8,
            DieType::D10 => 10,
            DieType::D12 => 12,
            DieType::D20 => 20,
        }
    }

    /// Stable small index, used in the instance transfer buffer.
    pub const fn index(self) -> u8 {
        match self {
            DieType::D4 => 0,
            DieType::D6 => 1,
            DieType::D8 => 2,
            DieType::D10 => 3,
            DieType::D12 => 4,
            DieType::D20 => 5,
        }
    }

    pub const fn token(self) -> &'static str {
        match self {
            DieType::D4 => "d4",
            DieType::D6 => "d6",
            DieType::D8 => "d8",
            DieType::D10 => "d10",
            DieType::D12 => "d12",
            DieType::D20 => "d20",
        }
    }

    /// Parse a whole tray of tokens; the first unknown token aborts.
    pub fn parse_tray<S: AsRef<str>>(tokens: &[S]) -> Result<Vec<DieType>, EngineError> {
        tokens.iter().map(|t| t.as_ref().parse()).collect()
    }
}

impl FromStr for DieType {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "d4" => Ok(DieType::D4),
            "d6" => Ok(DieType::D6),
            "d8" => Ok(DieType::D8),
            "d10" => Ok(DieType::D10),
            "d12" => Ok(DieType::D12),
            "d20" => Ok(DieType::D20),
            _ => Err(EngineError::UnknownDieType(s.to_string())),
        }
    }
}

impl fmt::Display for DieType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// One die's outcome. A roll reports these in tray order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollResult {
    #[serde(rename = "type")]
    pub die_type: DieType,
    pub value: u32,
}
