use anyhow::{Result, bail, ensure};
use async_trait::async_trait;
use lottogen_core::{GenerationOutcome, GenerationScreen, MembershipTier, ScreenConfig};
use std::collections::BTreeSet;

use super::{Scenario, ScenarioCtx};

const PATTERN: u32 = 3;
const DESCRIPTION: &str = "균형 패턴";

pub struct Smoke;

#[async_trait]
impl Scenario for Smoke {
    fn name(&self) -> &'static str {
        "smoke"
    }

    fn description(&self) -> &'static str {
        "Generate one simple pattern, then tap to restore its description"
    }

    async fn run(&self, ctx: &ScenarioCtx) -> Result<()> {
        let client = ctx.client();
        let config = ScreenConfig::simple("smoke", [PATTERN]).with_description(PATTERN, DESCRIPTION);
        let mut screen = GenerationScreen::new(config, MembershipTier::Free)?.with_seed(ctx.seed);
        screen.with_store_mut(|store| {
            store.fill_fixed(&["7"]);
            store.fill_excluded(&["1", "2"]);
        });
        ensure!(
            screen.display_text(PATTERN) == DESCRIPTION,
            "fresh display should show the description"
        );

        let outcome = screen.generate(&client, PATTERN, 0).await?;
        let GenerationOutcome::Applied(result) = outcome else {
            bail!("expected a server result, got {outcome:?}");
        };
        let numbers: BTreeSet<u8> = result.numbers.as_slice().iter().copied().collect();
        ensure!(numbers.len() == 6, "expected six distinct numbers, got {numbers:?}");
        ensure!(
            numbers.iter().all(|n| (1..=45).contains(n)),
            "numbers out of range: {numbers:?}"
        );
        if !ctx.live {
            ensure!(numbers.contains(&7), "fixed number missing from {numbers:?}");
            ensure!(
                !numbers.contains(&1) && !numbers.contains(&2),
                "excluded number drawn: {numbers:?}"
            );
        }
        if ctx.verbose {
            println!("   drew {}", result.display());
        }
        ensure!(screen.display_text(PATTERN) == result.display());

        ensure!(screen.tap_display(PATTERN), "tap was blocked");
        ensure!(
            screen.display_text(PATTERN) == DESCRIPTION,
            "tap did not restore the description"
        );
        Ok(())
    }
}
