//! Screen-local constraint state: number slots and personal factor fields.
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::constants::{FULL_SLOT_COUNT, MAX_FIXED_NUMBERS};
use crate::numbers::{is_lotto_number, parse_bound};
use crate::validation::ValidationError;

/// Validated fixed/excluded numbers.
///
/// Invariants: every number is within 1..=45, `fixed.len() <= 6` and the two
/// sets are disjoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NumberConstraintSet {
    fixed: BTreeSet<u8>,
    excluded: BTreeSet<u8>,
}

impl NumberConstraintSet {
    /// Build a constraint set, enforcing its invariants.
    ///
    /// Out-of-range numbers are dropped the same way slot parsing drops them.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::TooManyFixedNumbers`] or
    /// [`ValidationError::OverlappingConstraints`].
    pub fn new(
        fixed: impl IntoIterator<Item = u8>,
        excluded: impl IntoIterator<Item = u8>,
    ) -> Result<Self, ValidationError> {
        let fixed: BTreeSet<u8> = fixed.into_iter().filter(|n| is_lotto_number(*n)).collect();
        let excluded: BTreeSet<u8> = excluded
            .into_iter()
            .filter(|n| is_lotto_number(*n))
            .collect();

        if fixed.len() > MAX_FIXED_NUMBERS {
            return Err(ValidationError::TooManyFixedNumbers { count: fixed.len() });
        }
        let overlap: Vec<u8> = fixed.intersection(&excluded).copied().collect();
        if !overlap.is_empty() {
            return Err(ValidationError::OverlappingConstraints { numbers: overlap });
        }
        Ok(Self { fixed, excluded })
    }

    #[must_use]
    pub const fn fixed(&self) -> &BTreeSet<u8> {
        &self.fixed
    }

    #[must_use]
    pub const fn excluded(&self) -> &BTreeSet<u8> {
        &self.excluded
    }

    /// Fixed numbers in ascending order.
    #[must_use]
    pub fn fixed_vec(&self) -> Vec<u8> {
        self.fixed.iter().copied().collect()
    }

    /// Excluded numbers in ascending order.
    #[must_use]
    pub fn excluded_vec(&self) -> Vec<u8> {
        self.excluded.iter().copied().collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fixed.is_empty() && self.excluded.is_empty()
    }
}

/// Calendar used to interpret a birth date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalendarType {
    Solar,
    Lunar,
}

impl CalendarType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Solar => "solar",
            Self::Lunar => "lunar",
        }
    }
}

impl fmt::Display for CalendarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive numeric bounds entered on option screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumericRange {
    pub start: u32,
    pub end: u32,
}

impl NumericRange {
    #[must_use]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Parse two free-form text inputs; `None` when either is blank or not a number.
    #[must_use]
    pub fn from_text(start: &str, end: &str) -> Option<Self> {
        Some(Self::new(parse_bound(start)?, parse_bound(end)?))
    }
}

/// A menu selection on an option screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DiscreteOption {
    Int(i64),
    Text(String),
}

impl fmt::Display for DiscreteOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

/// User-supplied auxiliary fields. Which ones matter depends on the screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalFactor {
    #[serde(default)]
    pub birth_date: String,
    #[serde(default)]
    pub calendar_type: Option<CalendarType>,
    #[serde(default)]
    pub korean_name: String,
    #[serde(default)]
    pub hanja_name: String,
    #[serde(default)]
    pub english_name: String,
    #[serde(default)]
    pub numeric_range: Option<NumericRange>,
    #[serde(default)]
    pub discrete_option: Option<DiscreteOption>,
}

impl PersonalFactor {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Reset every field to empty.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Transient per-screen constraint state, re-derived on every mount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintStore {
    fixed_slots: Vec<String>,
    excluded_slots: Vec<String>,
    pub personal: PersonalFactor,
}

impl Default for ConstraintStore {
    fn default() -> Self {
        Self::new(FULL_SLOT_COUNT)
    }
}

impl ConstraintStore {
    /// Create a store with `slot_count` empty slots on each side.
    #[must_use]
    pub fn new(slot_count: usize) -> Self {
        Self {
            fixed_slots: vec![String::new(); slot_count],
            excluded_slots: vec![String::new(); slot_count],
            personal: PersonalFactor::default(),
        }
    }

    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.fixed_slots.len()
    }

    #[must_use]
    pub fn fixed_slots(&self) -> &[String] {
        &self.fixed_slots
    }

    #[must_use]
    pub fn excluded_slots(&self) -> &[String] {
        &self.excluded_slots
    }

    /// Overwrite one fixed slot. Returns `false` when the index is out of range.
    pub fn set_fixed_slot(&mut self, index: usize, value: impl Into<String>) -> bool {
        set_slot(&mut self.fixed_slots, index, value.into())
    }

    /// Overwrite one excluded slot. Returns `false` when the index is out of range.
    pub fn set_excluded_slot(&mut self, index: usize, value: impl Into<String>) -> bool {
        set_slot(&mut self.excluded_slots, index, value.into())
    }

    /// Fill fixed slots from the front, ignoring entries beyond the slot count.
    pub fn fill_fixed<S: AsRef<str>>(&mut self, values: &[S]) {
        fill(&mut self.fixed_slots, values);
    }

    /// Fill excluded slots from the front, ignoring entries beyond the slot count.
    pub fn fill_excluded<S: AsRef<str>>(&mut self, values: &[S]) {
        fill(&mut self.excluded_slots, values);
    }

    pub fn clear_numbers(&mut self) {
        self.fixed_slots.iter_mut().for_each(String::clear);
        self.excluded_slots.iter_mut().for_each(String::clear);
    }

    pub fn clear_personal(&mut self) {
        self.personal.clear();
    }
}

fn set_slot(slots: &mut [String], index: usize, value: String) -> bool {
    match slots.get_mut(index) {
        Some(slot) => {
            *slot = value;
            true
        }
        None => false,
    }
}

fn fill<S: AsRef<str>>(slots: &mut [String], values: &[S]) {
    for (slot, value) in slots.iter_mut().zip(values) {
        *slot = value.as_ref().to_string();
    }
}
