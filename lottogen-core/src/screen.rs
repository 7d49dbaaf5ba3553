//! A mounted generation screen: one owner for constraint input, result
//! displays, the privacy timer, the ad gate, and the current alert.
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

use crate::Millis;
use crate::ad_gate::{ActivateOutcome, AdAction, AdGate, MembershipTier};
use crate::alert::UserAlert;
use crate::client::{GenerationClient, GenerationError, GenerationTransport};
use crate::constraints::ConstraintStore;
use crate::fallback::{FallbackPolicy, local_draw};
use crate::privacy::PrivacyTimeoutController;
use crate::request::{GenerationRequest, GenerationRequestBuilder};
use crate::result::GenerationResult;
use crate::result_cache::{ApplyOutcome, GenerationToken, ResultCache};
use crate::screen_config::{ScreenConfig, ScreenConfigError};
use crate::validation::{ConstraintValidator, ValidationError};

/// Why no request was produced for a generate tap.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GenerationRejected {
    #[error("an ad gate is blocking the screen")]
    GateActive,
    #[error("the screen is no longer mounted")]
    Unmounted,
    #[error("pattern {pattern_id} is not served by this screen")]
    UnknownPattern { pattern_id: u32 },
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// A dispatched request waiting for its response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingGeneration {
    token: GenerationToken,
    request: GenerationRequest,
}

impl PendingGeneration {
    #[must_use]
    pub const fn token(&self) -> GenerationToken {
        self.token
    }

    #[must_use]
    pub const fn request(&self) -> &GenerationRequest {
        &self.request
    }
}

/// What happened to a completed generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    Applied(GenerationResult),
    AppliedFallback(GenerationResult),
    /// The alert was raised and the display left unchanged.
    Failed(GenerationError),
    /// Superseded by a reset or a newer dispatch for the same pattern.
    Stale,
    /// Arrived after unmount.
    Dropped,
}

/// Timer side effects from one [`GenerationScreen::tick`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub fired: Option<AdAction>,
    pub personal_cleared: bool,
}

#[derive(Debug, Clone)]
pub struct GenerationScreen {
    config: ScreenConfig,
    store: ConstraintStore,
    cache: ResultCache,
    privacy: PrivacyTimeoutController,
    gate: AdGate,
    tier: MembershipTier,
    alert: Option<UserAlert>,
    mounted: bool,
    rng: ChaCha8Rng,
}

impl GenerationScreen {
    /// Mount a screen with fresh constraint state.
    ///
    /// # Errors
    ///
    /// Returns [`ScreenConfigError`] when the configuration is inconsistent.
    pub fn new(config: ScreenConfig, tier: MembershipTier) -> Result<Self, ScreenConfigError> {
        config.validate()?;
        let store = ConstraintStore::new(config.slot_count);
        Ok(Self {
            config,
            store,
            cache: ResultCache::new(),
            privacy: PrivacyTimeoutController::default(),
            gate: AdGate::new(),
            tier,
            alert: None,
            mounted: true,
            rng: ChaCha8Rng::from_entropy(),
        })
    }

    /// Seed the local fallback draw for reproducible runs.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
        self
    }

    #[must_use]
    pub const fn config(&self) -> &ScreenConfig {
        &self.config
    }

    #[must_use]
    pub const fn store(&self) -> &ConstraintStore {
        &self.store
    }

    /// Edit constraint input. Returns `None` while the screen is blocked.
    pub fn with_store_mut<R>(&mut self, f: impl FnOnce(&mut ConstraintStore) -> R) -> Option<R> {
        if self.is_blocked() {
            return None;
        }
        Some(f(&mut self.store))
    }

    #[must_use]
    pub const fn cache(&self) -> &ResultCache {
        &self.cache
    }

    #[must_use]
    pub const fn privacy(&self) -> &PrivacyTimeoutController {
        &self.privacy
    }

    /// Disclosure text while the privacy modal is on screen.
    #[must_use]
    pub fn disclosure(&self) -> Option<&'static str> {
        self.privacy
            .modal_visible()
            .then(PrivacyTimeoutController::disclosure_text)
    }

    #[must_use]
    pub const fn gate(&self) -> &AdGate {
        &self.gate
    }

    #[must_use]
    pub const fn tier(&self) -> MembershipTier {
        self.tier
    }

    pub const fn set_tier(&mut self, tier: MembershipTier) {
        self.tier = tier;
    }

    #[must_use]
    pub const fn alert(&self) -> Option<&UserAlert> {
        self.alert.as_ref()
    }

    #[must_use]
    pub const fn is_mounted(&self) -> bool {
        self.mounted
    }

    const fn is_blocked(&self) -> bool {
        !self.mounted || self.gate.is_blocking()
    }

    /// Numbers if generated, otherwise the pattern's description.
    #[must_use]
    pub fn display_text(&self, pattern_id: u32) -> String {
        self.cache
            .display_text(pattern_id, &self.config.description(pattern_id))
    }

    /// Validate, build the request, take a token, and arm the privacy timer
    /// when personal fields leave the device.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationRejected`]; validation failures also raise the alert.
    pub fn prepare_generation(
        &mut self,
        pattern_id: u32,
        now: Millis,
    ) -> Result<PendingGeneration, GenerationRejected> {
        if !self.mounted {
            return Err(GenerationRejected::Unmounted);
        }
        if self.gate.is_blocking() {
            return Err(GenerationRejected::GateActive);
        }
        if !self.config.serves(pattern_id) {
            return Err(GenerationRejected::UnknownPattern { pattern_id });
        }
        let input = match ConstraintValidator::new(&self.config).validate(&self.store, pattern_id)
        {
            Ok(input) => input,
            Err(err) => {
                log::info!("pattern {pattern_id} rejected before dispatch: {err}");
                self.alert = Some(err.alert());
                return Err(err.into());
            }
        };
        let request = GenerationRequestBuilder::new(&self.config).build(pattern_id, input);
        let token = self.cache.issue_token(pattern_id);
        if request.carries_personal_data() {
            self.privacy.arm(now);
        }
        Ok(PendingGeneration { token, request })
    }

    /// Apply the response for a pending generation.
    pub fn complete_generation(
        &mut self,
        pending: PendingGeneration,
        outcome: Result<GenerationResult, GenerationError>,
    ) -> GenerationOutcome {
        if !self.mounted {
            log::debug!(
                "dropping completion for pattern {} after unmount",
                pending.token.pattern_id()
            );
            return GenerationOutcome::Dropped;
        }
        match outcome {
            Ok(result) => match self.cache.apply(pending.token, result.clone()) {
                ApplyOutcome::Applied => GenerationOutcome::Applied(result),
                ApplyOutcome::Stale => GenerationOutcome::Stale,
            },
            Err(_) if !self.cache.is_current(pending.token) => GenerationOutcome::Stale,
            Err(err) => self.fail(&pending, err),
        }
    }

    fn fail(&mut self, pending: &PendingGeneration, err: GenerationError) -> GenerationOutcome {
        if err.is_network() && self.config.fallback == FallbackPolicy::LocalDraw {
            let pattern_id = pending.request.pattern_id();
            if let Some(result) = local_draw(pattern_id, pending.request.numbers(), &mut self.rng)
            {
                log::warn!("pattern {pattern_id} offline; using local draw");
                return match self.cache.apply(pending.token, result.clone()) {
                    ApplyOutcome::Applied => GenerationOutcome::AppliedFallback(result),
                    ApplyOutcome::Stale => GenerationOutcome::Stale,
                };
            }
        }
        self.alert = Some(err.alert());
        GenerationOutcome::Failed(err)
    }

    /// Prepare, send through `client`, and complete in one call.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationRejected`] when nothing was dispatched.
    pub async fn generate<T: GenerationTransport>(
        &mut self,
        client: &GenerationClient<T>,
        pattern_id: u32,
        now: Millis,
    ) -> Result<GenerationOutcome, GenerationRejected> {
        let pending = self.prepare_generation(pattern_id, now)?;
        let outcome = client.generate(pending.request()).await;
        Ok(self.complete_generation(pending, outcome))
    }

    /// Tap on a display area: back to the description, superseding any
    /// in-flight request. Returns `false` when the screen is blocked.
    pub fn tap_display(&mut self, pattern_id: u32) -> bool {
        if self.is_blocked() {
            return false;
        }
        self.cache.reset(pattern_id);
        true
    }

    /// Run `action` behind the screen's ad gate.
    pub fn request_gated(&mut self, action: AdAction, now: Millis) -> ActivateOutcome {
        if !self.mounted {
            return ActivateOutcome::Ignored;
        }
        self.gate
            .activate(action, self.config.ad_gate, self.tier, now)
    }

    pub fn skip_ad(&mut self, now: Millis) -> Option<AdAction> {
        if !self.mounted {
            return None;
        }
        self.gate.skip(now)
    }

    /// Advance the gate countdown and the privacy deadline.
    pub fn tick(&mut self, now: Millis) -> TickReport {
        if !self.mounted {
            return TickReport::default();
        }
        let fired = self.gate.poll(now);
        let personal_cleared = self.privacy.poll(now);
        if personal_cleared {
            self.store.clear_personal();
        }
        TickReport {
            fired,
            personal_cleared,
        }
    }

    /// Dismiss the current alert, returning it.
    pub fn acknowledge_alert(&mut self) -> Option<UserAlert> {
        self.alert.take()
    }

    pub fn acknowledge_disclosure(&mut self) {
        self.privacy.acknowledge();
    }

    /// Tear down timers; later completions and ticks are ignored.
    pub fn unmount(&mut self) {
        self.mounted = false;
        self.privacy.teardown();
        self.gate.teardown();
        self.cache.clear();
        self.alert = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ad_gate::AdGateConfig;
    use crate::client::{TransportError, TransportResponse};
    use crate::constants::{
        MSG_GENERATION_FAILED, MSG_NETWORK_CHECK, MSG_PRIVACY_DISCLOSURE, MSG_TOO_MANY_FIXED,
    };
    use crate::constraints::{CalendarType, NumericRange};
    use crate::result::{DrawnNumbers, ResultSource};
    use crate::screen_config::PersonalGroup;
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use std::sync::Mutex;

    fn simple_screen() -> GenerationScreen {
        let config = ScreenConfig::simple("balance", [3, 4]).with_description(3, "균형 패턴");
        GenerationScreen::new(config, MembershipTier::Free)
            .unwrap()
            .with_seed(7)
    }

    fn server(pattern_id: u32) -> GenerationResult {
        GenerationResult::from_server(
            pattern_id,
            DrawnNumbers::from_slice(&[3, 11, 19, 27, 38, 44]).unwrap(),
        )
    }

    #[test]
    fn junk_slots_are_dropped_before_dispatch() {
        let mut screen = simple_screen();
        screen.with_store_mut(|store| store.fill_fixed(&["7", "7", "50", "abc"]));
        let pending = screen.prepare_generation(3, 0).unwrap();
        let body = pending.request().body().unwrap();
        assert_eq!(body["user_numbers"], json!([7]));
        assert_eq!(body["user_excludes"], json!([]));
        assert!(screen.alert().is_none());
    }

    #[test]
    fn too_many_fixed_raises_alert_without_request() {
        let config = ScreenConfig::simple("wide", [5]).with_slot_count(6);
        let mut screen = GenerationScreen::new(config, MembershipTier::Free).unwrap();
        screen.with_store_mut(|store| store.fill_fixed(&["1", "2", "3", "4", "5", "6"]));
        assert!(screen.prepare_generation(5, 0).is_ok());
        let mut store = ConstraintStore::new(7);
        store.fill_fixed(&["1", "2", "3", "4", "5", "6", "7"]);
        screen.store = store;
        let err = screen.prepare_generation(5, 0).unwrap_err();
        assert_eq!(
            err,
            GenerationRejected::Invalid(ValidationError::TooManyFixedNumbers { count: 7 })
        );
        assert_eq!(screen.alert().unwrap().message, MSG_TOO_MANY_FIXED);
        assert!(screen.cache().result(5).is_none());
    }

    #[test]
    fn overlap_is_rejected() {
        let mut screen = simple_screen();
        screen.with_store_mut(|store| {
            store.fill_fixed(&["10"]);
            store.fill_excluded(&["10"]);
        });
        assert!(matches!(
            screen.prepare_generation(3, 0),
            Err(GenerationRejected::Invalid(
                ValidationError::OverlappingConstraints { .. }
            ))
        ));
    }

    #[test]
    fn unknown_pattern_is_rejected() {
        let mut screen = simple_screen();
        assert_eq!(
            screen.prepare_generation(9, 0),
            Err(GenerationRejected::UnknownPattern { pattern_id: 9 })
        );
    }

    #[test]
    fn server_error_keeps_previous_display() {
        let mut screen = simple_screen();
        let first = screen.prepare_generation(3, 0).unwrap();
        screen.complete_generation(first, Ok(server(3)));
        let before = screen.display_text(3);

        let second = screen.prepare_generation(3, 10).unwrap();
        let outcome =
            screen.complete_generation(second, Err(GenerationError::Status { status: 500 }));
        assert_eq!(
            outcome,
            GenerationOutcome::Failed(GenerationError::Status { status: 500 })
        );
        let alert = screen.acknowledge_alert().unwrap();
        assert_eq!(alert.title, "오류");
        assert_eq!(alert.message, MSG_GENERATION_FAILED);
        assert_eq!(screen.display_text(3), before);
    }

    #[test]
    fn tap_resets_display_to_description() {
        let mut screen = simple_screen();
        let pending = screen.prepare_generation(3, 0).unwrap();
        screen.complete_generation(pending, Ok(server(3)));
        assert_eq!(screen.display_text(3), "3, 11, 19, 27, 38, 44");
        assert!(screen.tap_display(3));
        assert_eq!(screen.display_text(3), "균형 패턴");
        assert_eq!(screen.display_text(4), "패턴 4");
    }

    #[test]
    fn response_after_tap_is_stale() {
        let mut screen = simple_screen();
        let pending = screen.prepare_generation(3, 0).unwrap();
        screen.tap_display(3);
        assert_eq!(
            screen.complete_generation(pending, Ok(server(3))),
            GenerationOutcome::Stale
        );
        assert!(screen.cache().result(3).is_none());
    }

    #[test]
    fn stale_failure_raises_no_alert() {
        let mut screen = simple_screen();
        let older = screen.prepare_generation(3, 0).unwrap();
        let newer = screen.prepare_generation(3, 5).unwrap();
        screen.complete_generation(newer, Ok(server(3)));
        let outcome = screen.complete_generation(older, Err(GenerationError::Rejected));
        assert_eq!(outcome, GenerationOutcome::Stale);
        assert!(screen.alert().is_none());
    }

    fn birth_screen() -> GenerationScreen {
        let config = ScreenConfig::simple("birthday", [12]).with_personal(PersonalGroup::Birth);
        let mut screen = GenerationScreen::new(config, MembershipTier::Free).unwrap();
        screen.with_store_mut(|store| {
            store.personal.birth_date = "19900101".to_string();
            store.personal.calendar_type = Some(CalendarType::Solar);
        });
        screen
    }

    #[test]
    fn personal_fields_clear_two_seconds_after_dispatch() {
        let mut screen = birth_screen();
        let pending = screen.prepare_generation(12, 1_000).unwrap();
        assert_eq!(screen.disclosure(), Some(MSG_PRIVACY_DISCLOSURE));
        screen.complete_generation(pending, Err(GenerationError::Network("offline".into())));
        assert_eq!(screen.acknowledge_alert().unwrap().message, MSG_NETWORK_CHECK);
        screen.acknowledge_disclosure();
        assert!(!screen.tick(2_999).personal_cleared);
        assert!(!screen.store().personal.is_empty());
        assert!(screen.tick(3_000).personal_cleared);
        assert!(screen.store().personal.is_empty());
        assert!(!screen.privacy().is_disclosing());
        assert_eq!(screen.disclosure(), None);
    }

    #[test]
    fn second_dispatch_does_not_postpone_first_erasure() {
        let mut screen = birth_screen();
        let first = screen.prepare_generation(12, 0).unwrap();
        screen.complete_generation(first, Ok(server(12)));
        let second = screen.prepare_generation(12, 1_500).unwrap();
        assert!(screen.tick(2_000).personal_cleared);
        assert!(screen.store().personal.is_empty());
        assert!(screen.privacy().is_disclosing());

        screen.complete_generation(second, Ok(server(12)));
        screen.with_store_mut(|store| store.personal.birth_date = "20000229".to_string());
        assert!(!screen.tick(3_499).personal_cleared);
        assert!(screen.tick(3_500).personal_cleared);
        assert!(screen.store().personal.is_empty());
        assert!(!screen.privacy().is_disclosing());
    }

    #[test]
    fn option_selection_never_arms_privacy() {
        let config = ScreenConfig::option(7);
        let mut screen = GenerationScreen::new(config, MembershipTier::Free).unwrap();
        screen.with_store_mut(|store| {
            store.personal.numeric_range = Some(NumericRange::new(120, 170));
        });
        let pending = screen.prepare_generation(7, 0).unwrap();
        assert!(!screen.privacy().is_disclosing());
        let body = pending.request().body().unwrap();
        assert_eq!(
            body["filter_kwargs"],
            json!({"7": {"sum_min": 120, "sum_max": 170}})
        );
    }

    #[test]
    fn ad_gate_blocks_handlers_and_fires_once() {
        let mut screen = simple_screen();
        let action = AdAction::Generate { pattern_id: 3 };
        assert_eq!(
            screen.request_gated(action.clone(), 0),
            ActivateOutcome::Started
        );
        assert_eq!(
            screen.prepare_generation(3, 10),
            Err(GenerationRejected::GateActive)
        );
        assert!(!screen.tap_display(3));
        assert!(screen.with_store_mut(|_| ()).is_none());
        assert_eq!(screen.skip_ad(10_000), None);
        assert_eq!(screen.tick(14_999).fired, None);
        assert_eq!(screen.tick(15_000).fired, Some(action));
        assert_eq!(screen.tick(15_001).fired, None);
        assert!(screen.prepare_generation(3, 15_002).is_ok());
    }

    #[test]
    fn premium_skips_the_gate() {
        let config =
            ScreenConfig::simple("unlock", [3]).with_ad_gate(AdGateConfig::interstitial_long());
        let mut screen = GenerationScreen::new(config, MembershipTier::Premium).unwrap();
        let action = AdAction::Navigate {
            route: "/analysis".to_string(),
        };
        assert_eq!(
            screen.request_gated(action.clone(), 0),
            ActivateOutcome::Completed(action)
        );
        assert!(!screen.gate().is_blocking());
    }

    #[test]
    fn unmount_drops_timers_and_completions() {
        let mut screen = birth_screen();
        let shown = screen.prepare_generation(12, 0).unwrap();
        screen.complete_generation(shown, Ok(server(12)));
        assert!(screen.cache().result(12).is_some());
        let pending = screen.prepare_generation(12, 100).unwrap();
        screen.unmount();
        assert_eq!(
            screen.complete_generation(pending, Ok(server(12))),
            GenerationOutcome::Dropped
        );
        assert_eq!(screen.cache().result(12), None);
        assert_eq!(screen.tick(5_000), TickReport::default());
        assert_eq!(
            screen.prepare_generation(12, 5_000),
            Err(GenerationRejected::Unmounted)
        );
        assert_eq!(
            screen.request_gated(AdAction::Generate { pattern_id: 12 }, 0),
            ActivateOutcome::Ignored
        );
    }

    #[test]
    fn local_draw_only_covers_network_failures() {
        let config = ScreenConfig::simple("legacy", [4]).with_fallback(FallbackPolicy::LocalDraw);
        let mut screen = GenerationScreen::new(config, MembershipTier::Free)
            .unwrap()
            .with_seed(42);
        screen.with_store_mut(|store| {
            store.fill_fixed(&["5"]);
            store.fill_excluded(&["6", "7"]);
        });
        let pending = screen.prepare_generation(4, 0).unwrap();
        let outcome =
            screen.complete_generation(pending, Err(GenerationError::Network("down".into())));
        let GenerationOutcome::AppliedFallback(result) = outcome else {
            panic!("expected local draw, got {outcome:?}");
        };
        assert_eq!(result.source, ResultSource::LocalFallback);
        assert!(result.numbers.as_slice().contains(&5));
        assert!(!result.numbers.as_slice().contains(&6));
        assert!(screen.alert().is_none());

        let pending = screen.prepare_generation(4, 1).unwrap();
        let outcome =
            screen.complete_generation(pending, Err(GenerationError::Status { status: 502 }));
        assert!(matches!(outcome, GenerationOutcome::Failed(_)));
        assert!(screen.alert().is_some());
    }

    struct Recording {
        reply: TransportResponse,
        calls: Mutex<Vec<(String, Value)>>,
    }

    #[async_trait]
    impl GenerationTransport for Recording {
        async fn post_json(
            &self,
            path: &str,
            body: Value,
        ) -> Result<TransportResponse, TransportError> {
            self.calls.lock().unwrap().push((path.to_string(), body));
            Ok(self.reply.clone())
        }
    }

    #[test]
    fn generate_runs_the_full_flow() {
        let client = GenerationClient::new(Recording {
            reply: TransportResponse::new(200, r#"{"numbers":[3,11,19,27,38,44]}"#),
            calls: Mutex::new(Vec::new()),
        });
        let mut screen = simple_screen();
        screen.with_store_mut(|store| store.fill_excluded(&["1", "2"]));
        let outcome = tokio_test::block_on(screen.generate(&client, 3, 0)).unwrap();
        assert_eq!(outcome, GenerationOutcome::Applied(server(3)));
        assert_eq!(screen.display_text(3), "3, 11, 19, 27, 38, 44");

        let calls = client.transport().calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "/api/generate");
        assert_eq!(calls[0].1["patterns"], json!([3]));
        assert_eq!(calls[0].1["user_excludes"], json!([1, 2]));
    }

    #[test]
    fn invalid_input_never_reaches_the_transport() {
        let client = GenerationClient::new(Recording {
            reply: TransportResponse::new(200, r#"{"numbers":[1,2,3,4,5,6]}"#),
            calls: Mutex::new(Vec::new()),
        });
        let mut screen = simple_screen();
        screen.with_store_mut(|store| {
            store.fill_fixed(&["10"]);
            store.fill_excluded(&["10"]);
        });
        assert!(tokio_test::block_on(screen.generate(&client, 3, 0)).is_err());
        assert!(client.transport().calls.lock().unwrap().is_empty());
    }
}
