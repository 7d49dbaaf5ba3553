use anyhow::{Result, anyhow, bail, ensure};
use async_trait::async_trait;
use lottogen_core::constants::{MSG_GENERATION_FAILED, MSG_NETWORK_CHECK};
use lottogen_core::{
    ActivateOutcome, AdAction, AdGateConfig, CalendarType, FallbackPolicy, GenerationOutcome,
    GenerationRejected, GenerationScreen, MembershipTier, PersonalGroup, ResultSource,
    ScreenConfig,
};

use super::{Scenario, ScenarioCtx};
use crate::backend::OfflineBehavior;

pub struct ServerError;

#[async_trait]
impl Scenario for ServerError {
    fn name(&self) -> &'static str {
        "server-error"
    }

    fn description(&self) -> &'static str {
        "HTTP 500 raises one error alert and keeps the previous display"
    }

    async fn run(&self, ctx: &ScenarioCtx) -> Result<()> {
        let healthy = ctx.scripted(OfflineBehavior::Healthy);
        let broken = ctx.scripted(OfflineBehavior::Status(500));
        let mut screen =
            GenerationScreen::new(ScreenConfig::simple("errors", [8]), MembershipTier::Free)?;

        screen.generate(&healthy, 8, 0).await?;
        let before = screen.display_text(8);

        let outcome = screen.generate(&broken, 8, 100).await?;
        ensure!(
            matches!(outcome, GenerationOutcome::Failed(_)),
            "expected failure, got {outcome:?}"
        );
        let alert = screen
            .acknowledge_alert()
            .ok_or_else(|| anyhow!("no alert after HTTP 500"))?;
        ensure!(alert.title == "오류", "wrong alert title {:?}", alert.title);
        ensure!(alert.message == MSG_GENERATION_FAILED);
        ensure!(screen.acknowledge_alert().is_none(), "alert raised twice");
        ensure!(
            screen.display_text(8) == before,
            "display changed after failure"
        );
        ensure!(broken.transport().calls() == 1, "failed call was retried");
        Ok(())
    }
}

pub struct NetworkError;

#[async_trait]
impl Scenario for NetworkError {
    fn name(&self) -> &'static str {
        "network-error"
    }

    fn description(&self) -> &'static str {
        "An unreachable server asks the user to check the connection"
    }

    async fn run(&self, ctx: &ScenarioCtx) -> Result<()> {
        let down = ctx.scripted(OfflineBehavior::Unreachable);
        let mut screen =
            GenerationScreen::new(ScreenConfig::simple("offline", [9]), MembershipTier::Free)?;
        let outcome = screen.generate(&down, 9, 0).await?;
        ensure!(
            matches!(outcome, GenerationOutcome::Failed(ref err) if err.is_network()),
            "expected network failure, got {outcome:?}"
        );
        let alert = screen
            .alert()
            .ok_or_else(|| anyhow!("no alert when offline"))?;
        ensure!(alert.message == MSG_NETWORK_CHECK);
        ensure!(screen.cache().result(9).is_none());
        Ok(())
    }
}

pub struct PrivacyTimeout;

#[async_trait]
impl Scenario for PrivacyTimeout {
    fn name(&self) -> &'static str {
        "privacy-timeout"
    }

    fn description(&self) -> &'static str {
        "Birth data is erased 2000 ms after dispatch, whatever the outcome"
    }

    async fn run(&self, ctx: &ScenarioCtx) -> Result<()> {
        for behavior in [OfflineBehavior::Healthy, OfflineBehavior::Status(503)] {
            let client = ctx.scripted(behavior);
            let config =
                ScreenConfig::simple("birthday", [12]).with_personal(PersonalGroup::Birth);
            let mut screen = GenerationScreen::new(config, MembershipTier::Free)?;
            screen.with_store_mut(|store| {
                store.personal.birth_date = "19950815".to_string();
                store.personal.calendar_type = Some(CalendarType::Solar);
            });

            screen.generate(&client, 12, 1_000).await?;
            ensure!(
                screen.disclosure().is_some(),
                "disclosure not shown ({behavior:?})"
            );
            screen.acknowledge_disclosure();
            screen.acknowledge_alert();

            ensure!(
                !screen.tick(2_999).personal_cleared,
                "cleared early ({behavior:?})"
            );
            ensure!(!screen.store().personal.is_empty());
            ensure!(
                screen.tick(3_000).personal_cleared,
                "not cleared at deadline ({behavior:?})"
            );
            ensure!(
                screen.store().personal.is_empty(),
                "personal fields survived ({behavior:?})"
            );
        }
        Ok(())
    }
}

pub struct AdGateFlow;

#[async_trait]
impl Scenario for AdGateFlow {
    fn name(&self) -> &'static str {
        "ad-gate"
    }

    fn description(&self) -> &'static str {
        "Gates block the screen, complete exactly once, and skip for premium"
    }

    async fn run(&self, ctx: &ScenarioCtx) -> Result<()> {
        let client = ctx.scripted(OfflineBehavior::Healthy);
        let action = AdAction::Unlock {
            feature: "analysis".to_string(),
        };

        let mut screen =
            GenerationScreen::new(ScreenConfig::simple("reward", [3]), MembershipTier::Free)?;
        ensure!(screen.request_gated(action.clone(), 0) == ActivateOutcome::Started);
        ensure!(
            screen.request_gated(action.clone(), 100) == ActivateOutcome::Ignored,
            "second activation was not ignored"
        );
        match screen.generate(&client, 3, 500).await {
            Err(GenerationRejected::GateActive) => {}
            other => bail!("generation ran under the gate: {other:?}"),
        }
        ensure!(screen.skip_ad(10_000).is_none(), "reward ad was skippable");
        ensure!(screen.tick(14_999).fired.is_none(), "gate fired early");
        let mut fired = 0;
        for now in [15_000, 15_001, 30_000] {
            if screen.tick(now).fired.is_some() {
                fired += 1;
            }
        }
        ensure!(fired == 1, "gate fired {fired} times");

        let config =
            ScreenConfig::simple("interstitial", [3]).with_ad_gate(AdGateConfig::interstitial_long());
        let mut screen = GenerationScreen::new(config, MembershipTier::Free)?;
        screen.request_gated(action.clone(), 0);
        ensure!(screen.skip_ad(4_999).is_none(), "skipped before the delay");
        ensure!(screen.skip_ad(5_000) == Some(action.clone()));
        ensure!(screen.tick(10_000).fired.is_none(), "fired again after skip");

        let mut premium =
            GenerationScreen::new(ScreenConfig::simple("premium", [3]), MembershipTier::Premium)?;
        ensure!(
            premium.request_gated(action.clone(), 0) == ActivateOutcome::Completed(action),
            "premium membership did not bypass the gate"
        );
        ensure!(!premium.gate().is_blocking());
        Ok(())
    }
}

pub struct StaleResponse;

#[async_trait]
impl Scenario for StaleResponse {
    fn name(&self) -> &'static str {
        "stale-response"
    }

    fn description(&self) -> &'static str {
        "Late responses never overwrite a newer request or a reset"
    }

    async fn run(&self, ctx: &ScenarioCtx) -> Result<()> {
        let client = ctx.scripted(OfflineBehavior::Healthy);
        let config = ScreenConfig::simple("race", [6]).with_description(6, "설명");
        let mut screen = GenerationScreen::new(config, MembershipTier::Free)?;

        let older = screen.prepare_generation(6, 0)?;
        let newer = screen.prepare_generation(6, 50)?;
        let older_response = client.generate(older.request()).await;
        let newer_response = client.generate(newer.request()).await;

        let applied = screen.complete_generation(newer, newer_response);
        let GenerationOutcome::Applied(result) = applied else {
            bail!("newer response not applied: {applied:?}");
        };
        let late = screen.complete_generation(older, older_response);
        ensure!(late == GenerationOutcome::Stale, "older response applied: {late:?}");
        ensure!(screen.display_text(6) == result.display());

        let pending = screen.prepare_generation(6, 100)?;
        screen.tap_display(6);
        let response = client.generate(pending.request()).await;
        let outcome = screen.complete_generation(pending, response);
        ensure!(
            outcome == GenerationOutcome::Stale,
            "response after reset applied: {outcome:?}"
        );
        ensure!(screen.display_text(6) == "설명");
        Ok(())
    }
}

pub struct LocalFallback;

#[async_trait]
impl Scenario for LocalFallback {
    fn name(&self) -> &'static str {
        "local-fallback"
    }

    fn description(&self) -> &'static str {
        "Legacy screens draw locally when offline, honoring constraints"
    }

    async fn run(&self, ctx: &ScenarioCtx) -> Result<()> {
        let config = ScreenConfig::simple("legacy", [4]).with_fallback(FallbackPolicy::LocalDraw);
        let mut screen = GenerationScreen::new(config, MembershipTier::Free)?.with_seed(ctx.seed);
        screen.with_store_mut(|store| {
            store.fill_fixed(&["5", "40"]);
            store.fill_excluded(&["6", "7", "8"]);
        });

        let down = ctx.scripted(OfflineBehavior::Unreachable);
        let outcome = screen.generate(&down, 4, 0).await?;
        let GenerationOutcome::AppliedFallback(result) = outcome else {
            bail!("expected local draw, got {outcome:?}");
        };
        let numbers = result.numbers.as_slice();
        ensure!(result.source == ResultSource::LocalFallback);
        ensure!(numbers.contains(&5) && numbers.contains(&40), "fixed missing: {numbers:?}");
        ensure!(
            !numbers.iter().any(|n| (6..=8).contains(n)),
            "excluded drawn: {numbers:?}"
        );
        ensure!(screen.alert().is_none(), "fallback should not alert");

        let broken = ctx.scripted(OfflineBehavior::Status(500));
        let outcome = screen.generate(&broken, 4, 10).await?;
        ensure!(
            matches!(outcome, GenerationOutcome::Failed(_)),
            "server errors must not fall back: {outcome:?}"
        );
        ensure!(screen.display_text(4) == result.display());
        Ok(())
    }
}
