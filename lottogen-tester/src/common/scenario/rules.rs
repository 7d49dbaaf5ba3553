use anyhow::{Result, bail, ensure};
use async_trait::async_trait;
use lottogen_core::validation::validate_numbers;
use lottogen_core::{
    GenerationOutcome, GenerationRejected, GenerationScreen, MembershipTier, NumericRange,
    ScreenConfig, ValidationError,
};
use serde_json::json;

use super::{Scenario, ScenarioCtx};
use crate::backend::OfflineBehavior;

pub struct ValidationRules;

#[async_trait]
impl Scenario for ValidationRules {
    fn name(&self) -> &'static str {
        "validation-rules"
    }

    fn description(&self) -> &'static str {
        "Slot parsing, the six-number cap, and overlap rejection before any request"
    }

    async fn run(&self, ctx: &ScenarioCtx) -> Result<()> {
        let client = ctx.scripted(OfflineBehavior::Healthy);
        let mut screen =
            GenerationScreen::new(ScreenConfig::simple("rules", [3]), MembershipTier::Free)?
                .with_seed(ctx.seed);

        screen.with_store_mut(|store| store.fill_fixed(&["7", "7", "50", "abc"]));
        let pending = screen.prepare_generation(3, 0)?;
        let body = pending.request().body()?;
        ensure!(
            body["user_numbers"] == json!([7]),
            "junk slots leaked into {}",
            body["user_numbers"]
        );
        let response = client.generate(pending.request()).await;
        let outcome = screen.complete_generation(pending, response);
        ensure!(
            matches!(outcome, GenerationOutcome::Applied(_)),
            "expected applied result, got {outcome:?}"
        );

        let seven = ["1", "2", "3", "4", "5", "6", "7"];
        match validate_numbers(&seven, &[]) {
            Err(ValidationError::TooManyFixedNumbers { count: 7 }) => {}
            other => bail!("seven fixed numbers should be rejected, got {other:?}"),
        }

        screen.with_store_mut(|store| {
            store.clear_numbers();
            store.fill_fixed(&["10"]);
            store.fill_excluded(&["10"]);
        });
        match screen.generate(&client, 3, 10).await {
            Err(GenerationRejected::Invalid(ValidationError::OverlappingConstraints {
                numbers,
            })) => ensure!(numbers == vec![10], "wrong overlap {numbers:?}"),
            other => bail!("overlap should be rejected, got {other:?}"),
        }
        let alert = screen
            .acknowledge_alert()
            .ok_or_else(|| anyhow::anyhow!("overlap raised no alert"))?;
        ensure!(alert.message.contains("10"), "alert omits the number: {alert:?}");

        ensure!(
            client.transport().calls() == 1,
            "rejected input reached the server ({} calls)",
            client.transport().calls()
        );
        Ok(())
    }
}

pub struct OptionSumRange;

#[async_trait]
impl Scenario for OptionSumRange {
    fn name(&self) -> &'static str {
        "option-sum-range"
    }

    fn description(&self) -> &'static str {
        "Option 7 sends only sum_min/sum_max for a 120..170 range"
    }

    async fn run(&self, ctx: &ScenarioCtx) -> Result<()> {
        let client = ctx.client();
        let mut screen = GenerationScreen::new(ScreenConfig::option(7), MembershipTier::Free)?;
        screen.with_store_mut(|store| {
            store.personal.numeric_range = Some(NumericRange::new(120, 170));
        });

        let pending = screen.prepare_generation(7, 0)?;
        let body = pending.request().body()?;
        ensure!(
            body["filter_kwargs"] == json!({"7": {"sum_min": 120, "sum_max": 170}}),
            "unexpected kwargs {}",
            body["filter_kwargs"]
        );
        ensure!(body["pattern_ids"] == json!([7]));
        ensure!(
            !screen.privacy().is_disclosing(),
            "option ranges are not personal data"
        );

        let response = client.generate(pending.request()).await;
        let outcome = screen.complete_generation(pending, response);
        let GenerationOutcome::Applied(result) = outcome else {
            bail!("expected applied result, got {outcome:?}");
        };
        if !ctx.live {
            let sum: u32 = result.numbers.as_slice().iter().map(|n| u32::from(*n)).sum();
            ensure!((120..=170).contains(&sum), "sum {sum} outside 120..=170");
        }
        Ok(())
    }
}
