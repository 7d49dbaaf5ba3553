use anyhow::Result;
use async_trait::async_trait;
use lottogen_core::{GenerationClient, GenerationTransport};
use std::sync::Arc;

use crate::backend::{OfflineBehavior, OfflineServer};

pub mod flows;
pub mod rules;
pub mod smoke;

/// Everything a scenario run needs besides its own screen.
pub struct ScenarioCtx {
    pub seed: u64,
    pub verbose: bool,
    /// True when `client()` talks to a real API.
    pub live: bool,
    transport: Arc<dyn GenerationTransport>,
}

impl ScenarioCtx {
    pub fn new(transport: Arc<dyn GenerationTransport>, seed: u64, verbose: bool, live: bool) -> Self {
        Self {
            seed,
            verbose,
            live,
            transport,
        }
    }

    /// Client for the configured backend (offline server or live API).
    pub fn client(&self) -> GenerationClient<Arc<dyn GenerationTransport>> {
        GenerationClient::new(Arc::clone(&self.transport))
    }

    /// Client over an offline server with forced behavior, regardless of mode.
    pub fn scripted(&self, behavior: OfflineBehavior) -> GenerationClient<OfflineServer> {
        GenerationClient::new(OfflineServer::new(self.seed, behavior))
    }
}

#[async_trait]
pub trait Scenario: Send + Sync {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    async fn run(&self, ctx: &ScenarioCtx) -> Result<()>;
}

const CATALOG: &[&dyn Scenario] = &[
    &smoke::Smoke,
    &rules::ValidationRules,
    &rules::OptionSumRange,
    &flows::ServerError,
    &flows::NetworkError,
    &flows::PrivacyTimeout,
    &flows::AdGateFlow,
    &flows::StaleResponse,
    &flows::LocalFallback,
];

pub fn get_scenario(name: &str) -> Option<&'static dyn Scenario> {
    CATALOG
        .iter()
        .copied()
        .find(|scenario| scenario.name() == name)
}

pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    CATALOG
        .iter()
        .map(|scenario| (scenario.name(), scenario.description()))
        .collect()
}

pub fn scenario_names() -> Vec<String> {
    CATALOG
        .iter()
        .map(|scenario| scenario.name().to_string())
        .collect()
}
