//! Per-pattern result display state with generation tokens.
//!
//! Every dispatch takes a fresh token for its pattern and every reset advances
//! it, so a response only lands if nothing newer happened to that pattern
//! while it was in flight.
use std::collections::BTreeMap;

use crate::result::GenerationResult;

/// Identifies one in-flight generation for one pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GenerationToken {
    pattern_id: u32,
    serial: u64,
}

impl GenerationToken {
    #[must_use]
    pub const fn pattern_id(self) -> u32 {
        self.pattern_id
    }

    #[must_use]
    pub const fn serial(self) -> u64 {
        self.serial
    }
}

/// What a pattern's display area shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DisplayState {
    /// Static description text.
    #[default]
    Description,
    Generated(GenerationResult),
}

/// Result of trying to store a completed generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    /// A newer dispatch or a reset superseded this token.
    Stale,
}

#[derive(Debug, Clone, Default)]
struct Entry {
    state: DisplayState,
    latest_serial: u64,
}

#[derive(Debug, Clone, Default)]
pub struct ResultCache {
    entries: BTreeMap<u32, Entry>,
}

impl ResultCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the token for a new dispatch on `pattern_id`.
    pub fn issue_token(&mut self, pattern_id: u32) -> GenerationToken {
        let entry = self.entries.entry(pattern_id).or_default();
        entry.latest_serial += 1;
        GenerationToken {
            pattern_id,
            serial: entry.latest_serial,
        }
    }

    /// True when `token` is still the latest for its pattern.
    #[must_use]
    pub fn is_current(&self, token: GenerationToken) -> bool {
        self.entries
            .get(&token.pattern_id)
            .is_some_and(|entry| entry.latest_serial == token.serial)
    }

    /// Store a result if its token is still current.
    pub fn apply(&mut self, token: GenerationToken, result: GenerationResult) -> ApplyOutcome {
        match self.entries.get_mut(&token.pattern_id) {
            Some(entry) if entry.latest_serial == token.serial => {
                entry.state = DisplayState::Generated(result);
                ApplyOutcome::Applied
            }
            _ => {
                log::debug!(
                    "discarding stale result for pattern {} (token {})",
                    token.pattern_id,
                    token.serial
                );
                ApplyOutcome::Stale
            }
        }
    }

    /// Return a pattern to its description, superseding any in-flight request.
    pub fn reset(&mut self, pattern_id: u32) {
        let entry = self.entries.entry(pattern_id).or_default();
        entry.latest_serial += 1;
        entry.state = DisplayState::Description;
    }

    #[must_use]
    pub fn state(&self, pattern_id: u32) -> &DisplayState {
        static EMPTY: DisplayState = DisplayState::Description;
        self.entries
            .get(&pattern_id)
            .map_or(&EMPTY, |entry| &entry.state)
    }

    #[must_use]
    pub fn result(&self, pattern_id: u32) -> Option<&GenerationResult> {
        match self.state(pattern_id) {
            DisplayState::Generated(result) => Some(result),
            DisplayState::Description => None,
        }
    }

    /// Text for a display area: numbers if generated, else `description`.
    #[must_use]
    pub fn display_text(&self, pattern_id: u32, description: &str) -> String {
        self.result(pattern_id)
            .map_or_else(|| description.to_string(), GenerationResult::display)
    }

    /// Drop everything; outstanding tokens can never apply afterwards.
    pub fn clear(&mut self) {
        for entry in self.entries.values_mut() {
            entry.latest_serial += 1;
            entry.state = DisplayState::Description;
        }
    }
}
