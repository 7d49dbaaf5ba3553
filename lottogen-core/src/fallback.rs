//! Screen-wide policy for network failures, and the seeded local draw used by
//! screens configured for it.
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::constants::{NUMBER_MAX, NUMBER_MIN, PICK_SIZE};
use crate::constraints::NumberConstraintSet;
use crate::result::{DrawnNumbers, GenerationResult, ResultSource};

/// What a screen does when the generation call cannot reach the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Show the network alert and leave the result display unchanged.
    #[default]
    SurfaceError,
    /// Substitute a locally drawn set, flagged as [`ResultSource::LocalFallback`].
    LocalDraw,
}

/// Draw six distinct numbers honoring fixed and excluded constraints.
///
/// Returns `None` when the exclusions leave too few candidates.
pub fn local_draw(
    pattern_id: u32,
    constraints: &NumberConstraintSet,
    rng: &mut ChaCha8Rng,
) -> Option<GenerationResult> {
    let mut picked: Vec<u8> = constraints.fixed_vec();
    let candidates: Vec<u8> = (NUMBER_MIN..=NUMBER_MAX)
        .filter(|n| !constraints.fixed().contains(n) && !constraints.excluded().contains(n))
        .collect();
    let needed = PICK_SIZE.saturating_sub(picked.len());
    if candidates.len() < needed {
        return None;
    }
    picked.extend(candidates.choose_multiple(rng, needed).copied());
    picked.sort_unstable();
    Some(GenerationResult {
        pattern_id,
        numbers: DrawnNumbers::from_slice(&picked)?,
        source: ResultSource::LocalFallback,
    })
}
