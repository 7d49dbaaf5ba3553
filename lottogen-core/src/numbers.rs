//! Number parsing and formatting helpers shared by every screen.

use std::collections::BTreeSet;

use crate::constants::{NUMBER_MAX, NUMBER_MIN};

/// Parse one slot entry into a lottery number.
///
/// Returns `None` for empty, non-numeric or out-of-range input; those entries
/// are dropped silently rather than treated as errors.
#[must_use]
pub fn parse_slot(raw: &str) -> Option<u8> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let value: i64 = trimmed.parse().ok()?;
    u8::try_from(value).ok().filter(|n| is_lotto_number(*n))
}

/// Parse every slot, collapsing duplicates.
#[must_use]
pub fn parse_slots<S: AsRef<str>>(slots: &[S]) -> BTreeSet<u8> {
    slots
        .iter()
        .filter_map(|slot| parse_slot(slot.as_ref()))
        .collect()
}

#[must_use]
pub const fn is_lotto_number(value: u8) -> bool {
    value >= NUMBER_MIN && value <= NUMBER_MAX
}

/// Comma-joined rendering used by result displays, e.g. `3, 11, 19`.
#[must_use]
pub fn format_numbers(numbers: &[u8]) -> String {
    numbers
        .iter()
        .map(u8::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse an integer entered into a free-form numeric field (range bounds).
#[must_use]
pub fn parse_bound(raw: &str) -> Option<u32> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_slot_drops_invalid_entries() {
        assert_eq!(parse_slot(" 7 "), Some(7));
        assert_eq!(parse_slot("45"), Some(45));
        assert_eq!(parse_slot("0"), None);
        assert_eq!(parse_slot("46"), None);
        assert_eq!(parse_slot("-3"), None);
        assert_eq!(parse_slot("abc"), None);
        assert_eq!(parse_slot(""), None);
        assert_eq!(parse_slot("   "), None);
        assert_eq!(parse_slot("7.5"), None);
        assert_eq!(parse_slot("99999999999999999999"), None);
    }

    #[test]
    fn parse_slots_collapses_duplicates() {
        let parsed = parse_slots(&["7", "7", "50", "abc"]);
        assert_eq!(parsed.into_iter().collect::<Vec<_>>(), vec![7]);
    }

    #[test]
    fn format_numbers_joins_with_comma() {
        assert_eq!(format_numbers(&[3, 11, 19]), "3, 11, 19");
        assert_eq!(format_numbers(&[]), "");
    }

    #[test]
    fn parse_bound_accepts_whitespace() {
        assert_eq!(parse_bound(" 120 "), Some(120));
        assert_eq!(parse_bound("x"), None);
        assert_eq!(parse_bound(""), None);
    }
}
