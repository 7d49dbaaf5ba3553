use anyhow::{Context, Result};
use async_trait::async_trait;
use lottogen_core::constants::{NUMBER_MAX, NUMBER_MIN, OPTION_GENERATE_PATH, PICK_SIZE};
use lottogen_core::{
    GenerationTransport, HttpConfig, HttpTransport, TransportError, TransportResponse,
};
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use serde_json::{Value, json};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Draw attempts before an option request with an unsatisfiable sum is rejected.
const SUM_ATTEMPTS: usize = 500;

/// How the in-process server answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfflineBehavior {
    Healthy,
    Status(u16),
    Unreachable,
}

/// In-process stand-in for the generation API, seeded for reproducibility.
///
/// Honors `user_numbers`/`user_excludes`, and for option requests the
/// `sum_min`/`sum_max` kwargs.
#[derive(Debug)]
pub struct OfflineServer {
    behavior: OfflineBehavior,
    rng: Mutex<ChaCha8Rng>,
    calls: AtomicUsize,
}

impl OfflineServer {
    pub fn new(seed: u64, behavior: OfflineBehavior) -> Self {
        Self {
            behavior,
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn draw(&self, body: &Value, sum_range: Option<(u64, u64)>) -> Option<Vec<u8>> {
        let fixed = number_set(&body["user_numbers"]);
        let excluded = number_set(&body["user_excludes"]);
        let candidates: Vec<u8> = (NUMBER_MIN..=NUMBER_MAX)
            .filter(|n| !fixed.contains(n) && !excluded.contains(n))
            .collect();
        let needed = PICK_SIZE.checked_sub(fixed.len())?;
        if candidates.len() < needed {
            return None;
        }
        let mut rng = self.rng.lock().ok()?;
        for _ in 0..SUM_ATTEMPTS {
            let mut picked: Vec<u8> = fixed.iter().copied().collect();
            picked.extend(candidates.choose_multiple(&mut *rng, needed).copied());
            picked.sort_unstable();
            let sum: u64 = picked.iter().map(|n| u64::from(*n)).sum();
            match sum_range {
                Some((min, max)) if sum < min || sum > max => continue,
                _ => return Some(picked),
            }
        }
        None
    }
}

fn number_set(value: &Value) -> BTreeSet<u8> {
    value
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(Value::as_u64)
        .filter_map(|n| u8::try_from(n).ok())
        .collect()
}

fn sum_range(body: &Value) -> Option<(u64, u64)> {
    let kwargs = body["filter_kwargs"].as_object()?.values().next()?;
    let min = kwargs.get("sum_min")?.as_u64()?;
    let max = kwargs.get("sum_max")?.as_u64()?;
    Some((min, max))
}

#[async_trait]
impl GenerationTransport for OfflineServer {
    async fn post_json(
        &self,
        path: &str,
        body: Value,
    ) -> Result<TransportResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            OfflineBehavior::Unreachable => {
                return Err(TransportError("offline server unreachable".to_string()));
            }
            OfflineBehavior::Status(status) => {
                return Ok(TransportResponse::new(status, "scripted failure"));
            }
            OfflineBehavior::Healthy => {}
        }
        let reply = if path == OPTION_GENERATE_PATH {
            match self.draw(&body, sum_range(&body)) {
                Some(numbers) => json!({ "success": true, "numbers": numbers }),
                None => json!({ "success": false }),
            }
        } else {
            match self.draw(&body, None) {
                Some(numbers) => json!({ "numbers": numbers }),
                None => return Ok(TransportResponse::new(422, "unsatisfiable constraints")),
            }
        };
        Ok(TransportResponse::new(200, reply.to_string()))
    }
}

/// Transport for scenarios that talk to "the server": offline or a live API.
pub fn shared_transport(
    live: Option<HttpConfig>,
    seed: u64,
) -> Result<Arc<dyn GenerationTransport>> {
    match live {
        Some(config) => {
            let base_url = config.base_url.clone();
            let transport = HttpTransport::new(config)
                .with_context(|| format!("failed to build HTTP client for {base_url}"))?;
            Ok(Arc::new(transport))
        }
        None => Ok(Arc::new(OfflineServer::new(seed, OfflineBehavior::Healthy))),
    }
}
