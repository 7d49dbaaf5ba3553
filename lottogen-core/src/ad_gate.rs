//! Forced-wait advertisement gate around a deferred action.
use serde::{Deserialize, Serialize};

use crate::Millis;
use crate::constants::{
    DEFAULT_SKIP_AFTER_MS, INTERSTITIAL_LONG_MS, INTERSTITIAL_SHORT_MS, REWARD_AD_DURATION_MS,
};

/// Countdown parameters for one gate activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdGateConfig {
    pub duration_ms: u64,
    pub skip_after_ms: u64,
    pub can_skip: bool,
}

impl Default for AdGateConfig {
    fn default() -> Self {
        Self::reward()
    }
}

impl AdGateConfig {
    /// Full-length reward ad; cannot be skipped.
    #[must_use]
    pub const fn reward() -> Self {
        Self {
            duration_ms: REWARD_AD_DURATION_MS,
            skip_after_ms: REWARD_AD_DURATION_MS,
            can_skip: false,
        }
    }

    #[must_use]
    pub const fn interstitial_short() -> Self {
        Self {
            duration_ms: INTERSTITIAL_SHORT_MS,
            skip_after_ms: INTERSTITIAL_SHORT_MS,
            can_skip: false,
        }
    }

    /// Longer interstitial with a skip button after the default delay.
    #[must_use]
    pub const fn interstitial_long() -> Self {
        Self {
            duration_ms: INTERSTITIAL_LONG_MS,
            skip_after_ms: DEFAULT_SKIP_AFTER_MS,
            can_skip: true,
        }
    }

    #[must_use]
    pub const fn skippable_after(mut self, skip_after_ms: u64) -> Self {
        self.can_skip = true;
        self.skip_after_ms = skip_after_ms;
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MembershipTier {
    #[default]
    Free,
    Premium,
}

/// What runs once the gate completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AdAction {
    Navigate { route: String },
    Unlock { feature: String },
    Generate { pattern_id: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivateOutcome {
    Started,
    /// A gate was already showing; the new action was dropped.
    Ignored,
    /// Premium bypass: the action is ready to run now.
    Completed(AdAction),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Showing {
    action: AdAction,
    config: AdGateConfig,
    started_at: Millis,
}

impl Showing {
    const fn ends_at(&self) -> Millis {
        self.started_at.saturating_add(self.config.duration_ms)
    }

    const fn skippable_at(&self, now: Millis) -> bool {
        self.config.can_skip && now.saturating_sub(self.started_at) >= self.config.skip_after_ms
    }
}

#[derive(Debug, Clone, Default)]
pub struct AdGate {
    showing: Option<Showing>,
}

impl AdGate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a gate for `action`.
    pub fn activate(
        &mut self,
        action: AdAction,
        config: AdGateConfig,
        tier: MembershipTier,
        now: Millis,
    ) -> ActivateOutcome {
        if self.showing.is_some() {
            log::debug!("ad gate already showing; ignoring {action:?}");
            return ActivateOutcome::Ignored;
        }
        if tier == MembershipTier::Premium {
            log::debug!("premium membership bypasses ad gate for {action:?}");
            return ActivateOutcome::Completed(action);
        }
        log::info!("ad gate started for {}ms", config.duration_ms);
        self.showing = Some(Showing {
            action,
            config,
            started_at: now,
        });
        ActivateOutcome::Started
    }

    #[must_use]
    pub const fn is_blocking(&self) -> bool {
        self.showing.is_some()
    }

    /// Countdown left for display, if showing.
    #[must_use]
    pub fn remaining_ms(&self, now: Millis) -> Option<u64> {
        self.showing
            .as_ref()
            .map(|showing| showing.ends_at().saturating_sub(now))
    }

    #[must_use]
    pub fn can_skip_now(&self, now: Millis) -> bool {
        self.showing
            .as_ref()
            .is_some_and(|showing| showing.skippable_at(now))
    }

    /// Fire the pending action when the countdown has elapsed.
    pub fn poll(&mut self, now: Millis) -> Option<AdAction> {
        if self
            .showing
            .as_ref()
            .is_some_and(|showing| now >= showing.ends_at())
        {
            return self.finish("countdown");
        }
        None
    }

    /// Skip tap. Fires the action only once skipping is allowed.
    pub fn skip(&mut self, now: Millis) -> Option<AdAction> {
        if self.can_skip_now(now) {
            return self.finish("skip");
        }
        None
    }

    /// Drop the session without running its action (screen unmount).
    pub fn teardown(&mut self) {
        if self.showing.take().is_some() {
            log::debug!("ad gate torn down before completion");
        }
    }

    fn finish(&mut self, reason: &str) -> Option<AdAction> {
        let showing = self.showing.take()?;
        log::info!("ad gate completed ({reason})");
        Some(showing.action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unlock() -> AdAction {
        AdAction::Unlock {
            feature: "analysis".to_string(),
        }
    }

    #[test]
    fn countdown_fires_exactly_once() {
        let mut gate = AdGate::new();
        let started = gate.activate(unlock(), AdGateConfig::reward(), MembershipTier::Free, 100);
        assert_eq!(started, ActivateOutcome::Started);
        assert!(gate.is_blocking());
        assert_eq!(gate.poll(15_099), None);
        assert_eq!(gate.remaining_ms(15_099), Some(1));
        assert_eq!(gate.poll(15_100), Some(unlock()));
        assert_eq!(gate.poll(20_000), None);
        assert!(!gate.is_blocking());
    }

    #[test]
    fn reactivation_while_showing_is_ignored() {
        let mut gate = AdGate::new();
        gate.activate(unlock(), AdGateConfig::interstitial_short(), MembershipTier::Free, 0);
        let second = gate.activate(
            AdAction::Generate { pattern_id: 3 },
            AdGateConfig::reward(),
            MembershipTier::Free,
            10,
        );
        assert_eq!(second, ActivateOutcome::Ignored);
        assert_eq!(gate.poll(3_000), Some(unlock()));
    }

    #[test]
    fn skip_respects_delay_and_flag() {
        let mut gate = AdGate::new();
        gate.activate(unlock(), AdGateConfig::reward(), MembershipTier::Free, 0);
        assert_eq!(gate.skip(14_000), None);
        gate.teardown();

        gate.activate(unlock(), AdGateConfig::interstitial_long(), MembershipTier::Free, 0);
        assert!(!gate.can_skip_now(4_999));
        assert_eq!(gate.skip(4_999), None);
        assert_eq!(gate.skip(5_000), Some(unlock()));
        assert_eq!(gate.poll(5_000), None);
    }

    #[test]
    fn premium_completes_immediately() {
        let mut gate = AdGate::new();
        let outcome = gate.activate(unlock(), AdGateConfig::reward(), MembershipTier::Premium, 0);
        assert_eq!(outcome, ActivateOutcome::Completed(unlock()));
        assert!(!gate.is_blocking());
        assert_eq!(gate.poll(60_000), None);
    }

    #[test]
    fn teardown_never_fires() {
        let mut gate = AdGate::new();
        gate.activate(unlock(), AdGateConfig::reward(), MembershipTier::Free, 0);
        gate.teardown();
        assert_eq!(gate.poll(60_000), None);
        assert_eq!(gate.remaining_ms(0), None);
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: AdGateConfig = serde_json::from_str(r#"{"duration_ms":3000}"#).unwrap();
        assert_eq!(config.duration_ms, 3_000);
        assert!(!config.can_skip);
        let skippable = AdGateConfig::reward().skippable_after(8_000);
        assert!(skippable.can_skip);
        assert_eq!(skippable.skip_after_ms, 8_000);
    }
}
