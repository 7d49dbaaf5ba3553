use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::common::scenario::{Scenario, ScenarioCtx};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub seed: u64,
    pub mode: String,
    pub passed: bool,
    pub failures: Vec<String>,
    #[serde(with = "duration_serde")]
    pub duration: Duration,
}

pub struct ScenarioRunner {
    verbose: bool,
}

impl ScenarioRunner {
    pub const fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    pub async fn run(&self, scenario: &dyn Scenario, ctx: &ScenarioCtx) -> ScenarioResult {
        if self.verbose {
            println!(
                "🧪 Running scenario: {} (seed {})",
                scenario.name().bright_white(),
                ctx.seed
            );
        }
        let start = Instant::now();
        let outcome = scenario.run(ctx).await;
        let duration = start.elapsed();

        let failures = match outcome {
            Ok(()) => Vec::new(),
            Err(err) => {
                log::warn!("scenario {} failed: {err:#}", scenario.name());
                vec![format!("{err:#}")]
            }
        };
        let passed = failures.is_empty();
        if passed {
            println!("✅ {} - {duration:?}", scenario.name().green());
        } else {
            eprintln!("❌ {} - {duration:?}", scenario.name().red());
        }

        ScenarioResult {
            scenario_name: scenario.name().to_string(),
            seed: ctx.seed,
            mode: if ctx.live { "live" } else { "offline" }.to_string(),
            passed,
            failures,
            duration,
        }
    }
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u128::deserialize(deserializer)?;
        Ok(Duration::from_millis(u64::try_from(millis).unwrap_or(0)))
    }
}
