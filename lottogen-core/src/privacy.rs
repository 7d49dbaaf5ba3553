//! Disclosure modal and timed erasure of personal fields.
//!
//! `Idle -> Disclosing -> Idle`. Every dispatch carrying personal data owns
//! its own deadline and fires regardless of the request outcome. A later
//! dispatch never postpones an earlier one. Acknowledging the modal only
//! hides it; the erasure still happens.
use std::collections::VecDeque;

use crate::Millis;
use crate::constants::{MSG_PRIVACY_DISCLOSURE, PRIVACY_CLEAR_DELAY_MS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrivacyState {
    Idle,
    /// `clear_at` is the earliest outstanding deadline.
    Disclosing { clear_at: Millis, modal_visible: bool },
}

#[derive(Debug, Clone)]
pub struct PrivacyTimeoutController {
    deadlines: VecDeque<Millis>,
    modal_visible: bool,
    delay_ms: u64,
}

impl Default for PrivacyTimeoutController {
    fn default() -> Self {
        Self::new(PRIVACY_CLEAR_DELAY_MS)
    }
}

impl PrivacyTimeoutController {
    #[must_use]
    pub const fn new(delay_ms: u64) -> Self {
        Self {
            deadlines: VecDeque::new(),
            modal_visible: false,
            delay_ms,
        }
    }

    /// Text of the disclosure modal.
    #[must_use]
    pub const fn disclosure_text() -> &'static str {
        MSG_PRIVACY_DISCLOSURE
    }

    #[must_use]
    pub fn state(&self) -> PrivacyState {
        self.deadlines
            .front()
            .map_or(PrivacyState::Idle, |&clear_at| PrivacyState::Disclosing {
                clear_at,
                modal_visible: self.modal_visible,
            })
    }

    #[must_use]
    pub fn is_disclosing(&self) -> bool {
        !self.deadlines.is_empty()
    }

    #[must_use]
    pub fn modal_visible(&self) -> bool {
        self.modal_visible && self.is_disclosing()
    }

    /// Show the disclosure and schedule an erasure `delay_ms` after `now`.
    /// Deadlines already pending keep their time.
    pub fn arm(&mut self, now: Millis) {
        let clear_at = now.saturating_add(self.delay_ms);
        log::debug!(
            "privacy erasure scheduled at {clear_at} ({} pending)",
            self.deadlines.len()
        );
        let at = self.deadlines.partition_point(|&d| d <= clear_at);
        self.deadlines.insert(at, clear_at);
        self.modal_visible = true;
    }

    /// Hide the modal; erasure deadlines are unaffected.
    pub fn acknowledge(&mut self) {
        self.modal_visible = false;
    }

    /// Milliseconds until the next erasure, if disclosing.
    #[must_use]
    pub fn remaining_ms(&self, now: Millis) -> Option<u64> {
        self.deadlines.front().map(|clear_at| clear_at.saturating_sub(now))
    }

    /// Advance the timer. Returns `true` when at least one deadline elapsed
    /// and the caller must erase personal fields.
    pub fn poll(&mut self, now: Millis) -> bool {
        let mut fired = false;
        while self.deadlines.front().is_some_and(|&clear_at| now >= clear_at) {
            self.deadlines.pop_front();
            fired = true;
        }
        if fired {
            log::debug!(
                "privacy deadline reached; clearing personal fields ({} pending)",
                self.deadlines.len()
            );
            if self.deadlines.is_empty() {
                self.modal_visible = false;
            }
        }
        fired
    }

    /// Drop every pending deadline without firing it (screen unmount).
    pub fn teardown(&mut self) {
        self.deadlines.clear();
        self.modal_visible = false;
    }
}
