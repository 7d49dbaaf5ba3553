//! Generated number sets.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::constants::PICK_SIZE;
use crate::numbers::format_numbers;

/// Six drawn numbers as returned by the server (not re-validated).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DrawnNumbers(SmallVec<[u8; PICK_SIZE]>);

impl DrawnNumbers {
    /// Accept exactly six numbers; anything else is `None`.
    #[must_use]
    pub fn from_slice(numbers: &[u8]) -> Option<Self> {
        (numbers.len() == PICK_SIZE).then(|| Self(SmallVec::from_slice(numbers)))
    }

    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Comma-joined display text.
    #[must_use]
    pub fn display(&self) -> String {
        format_numbers(&self.0)
    }
}

/// Where a result came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultSource {
    #[default]
    Server,
    LocalFallback,
}

/// A generated set for one pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub pattern_id: u32,
    pub numbers: DrawnNumbers,
    #[serde(default)]
    pub source: ResultSource,
}

impl GenerationResult {
    #[must_use]
    pub const fn from_server(pattern_id: u32, numbers: DrawnNumbers) -> Self {
        Self {
            pattern_id,
            numbers,
            source: ResultSource::Server,
        }
    }

    #[must_use]
    pub fn display(&self) -> String {
        self.numbers.display()
    }
}
