//! Generation client: sends a request through a platform transport and
//! interprets the response.
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::alert::UserAlert;
use crate::constants::{MSG_GENERATION_FAILED, MSG_NETWORK_CHECK};
use crate::request::GenerationRequest;
use crate::result::{DrawnNumbers, GenerationResult};

/// Raw HTTP response handed back by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// The request never produced a response (offline, DNS, timeout, ...).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("transport failure: {0}")]
pub struct TransportError(pub String);

/// Trait for abstracting the HTTP POST.
/// Platform-specific implementations should provide this.
#[async_trait]
pub trait GenerationTransport: Send + Sync {
    /// POST a JSON body to `path` and return whatever the server answered.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when no response was received.
    async fn post_json(&self, path: &str, body: Value)
    -> Result<TransportResponse, TransportError>;
}

#[async_trait]
impl<T: GenerationTransport + ?Sized> GenerationTransport for std::sync::Arc<T> {
    async fn post_json(
        &self,
        path: &str,
        body: Value,
    ) -> Result<TransportResponse, TransportError> {
        (**self).post_json(path, body).await
    }
}

/// Every way a generation call can fail after the request left the validator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GenerationError {
    #[error("network failure: {0}")]
    Network(String),
    #[error("server responded with HTTP {status}")]
    Status { status: u16 },
    #[error("malformed response body: {0}")]
    MalformedBody(String),
    #[error("server reported an unsuccessful generation")]
    Rejected,
}

impl GenerationError {
    #[must_use]
    pub const fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    /// The one alert shown for this failure.
    #[must_use]
    pub fn alert(&self) -> UserAlert {
        if self.is_network() {
            UserAlert::error(MSG_NETWORK_CHECK)
        } else {
            UserAlert::error(MSG_GENERATION_FAILED)
        }
    }
}

impl From<TransportError> for GenerationError {
    fn from(err: TransportError) -> Self {
        Self::Network(err.0)
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    numbers: Vec<i64>,
}

#[derive(Debug, Deserialize)]
struct OptionGenerateResponse {
    success: bool,
    #[serde(default)]
    numbers: Option<Vec<i64>>,
}

/// Interpret a transport response for `request`.
///
/// The server is trusted: numbers are only shape-checked, never compared
/// against the user's fixed/excluded sets.
///
/// # Errors
///
/// Returns [`GenerationError::Status`] for non-2xx, [`GenerationError::Rejected`]
/// for `success: false`, and [`GenerationError::MalformedBody`] otherwise.
pub fn interpret_response(
    request: &GenerationRequest,
    response: &TransportResponse,
) -> Result<GenerationResult, GenerationError> {
    if !response.is_success() {
        return Err(GenerationError::Status {
            status: response.status,
        });
    }
    let numbers = if request.is_option() {
        let parsed: OptionGenerateResponse = serde_json::from_str(&response.body)
            .map_err(|err| GenerationError::MalformedBody(err.to_string()))?;
        if !parsed.success {
            return Err(GenerationError::Rejected);
        }
        parsed
            .numbers
            .ok_or_else(|| GenerationError::MalformedBody("missing numbers".to_string()))?
    } else {
        let parsed: GenerateResponse = serde_json::from_str(&response.body)
            .map_err(|err| GenerationError::MalformedBody(err.to_string()))?;
        parsed.numbers
    };
    let numbers = drawn_numbers(&numbers)?;
    Ok(GenerationResult::from_server(request.pattern_id(), numbers))
}

fn drawn_numbers(raw: &[i64]) -> Result<DrawnNumbers, GenerationError> {
    let bytes = raw
        .iter()
        .map(|n| u8::try_from(*n))
        .collect::<Result<Vec<u8>, _>>()
        .map_err(|_| GenerationError::MalformedBody(format!("numbers out of range: {raw:?}")))?;
    DrawnNumbers::from_slice(&bytes).ok_or_else(|| {
        GenerationError::MalformedBody(format!("expected 6 numbers, got {}", bytes.len()))
    })
}

/// Issues one POST per call; never retries.
#[derive(Debug, Clone)]
pub struct GenerationClient<T> {
    transport: T,
}

impl<T: GenerationTransport> GenerationClient<T> {
    pub const fn new(transport: T) -> Self {
        Self { transport }
    }

    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Send `request` and interpret the answer.
    ///
    /// # Errors
    ///
    /// Returns a [`GenerationError`] for transport, status, or body failures.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResult, GenerationError> {
        let body = request
            .body()
            .map_err(|err| GenerationError::MalformedBody(err.to_string()))?;
        log::debug!(
            "dispatching pattern {} to {}",
            request.pattern_id(),
            request.path()
        );
        let response = self.transport.post_json(request.path(), body).await?;
        let outcome = interpret_response(request, &response);
        match &outcome {
            Ok(result) => log::info!("pattern {} generated {}", result.pattern_id, result.display()),
            Err(err) => log::warn!("pattern {} generation failed: {err}", request.pattern_id()),
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::NumberConstraintSet;
    use crate::options::OptionFilter;
    use crate::request::{OptionRequest, PersonalPayload, SimpleRequest};
    use std::sync::Mutex;

    fn simple() -> GenerationRequest {
        GenerationRequest::Simple(SimpleRequest {
            pattern_id: 3,
            numbers: NumberConstraintSet::default(),
            personal: PersonalPayload::None,
        })
    }

    fn option() -> GenerationRequest {
        GenerationRequest::Option(OptionRequest {
            option_id: 7,
            numbers: NumberConstraintSet::default(),
            filter: OptionFilter::default(),
        })
    }

    struct Canned {
        reply: Result<TransportResponse, TransportError>,
        seen: Mutex<Vec<(String, Value)>>,
    }

    #[async_trait]
    impl GenerationTransport for Canned {
        async fn post_json(
            &self,
            path: &str,
            body: Value,
        ) -> Result<TransportResponse, TransportError> {
            self.seen.lock().unwrap().push((path.to_string(), body));
            self.reply.clone()
        }
    }

    #[test]
    fn simple_success_is_interpreted() {
        let response = TransportResponse::new(200, r#"{"numbers":[1,9,17,25,33,41]}"#);
        let result = interpret_response(&simple(), &response).unwrap();
        assert_eq!(result.pattern_id, 3);
        assert_eq!(result.numbers.as_slice(), &[1, 9, 17, 25, 33, 41]);
    }

    #[test]
    fn option_requires_success_flag() {
        let ok = TransportResponse::new(200, r#"{"success":true,"numbers":[2,4,6,8,10,12]}"#);
        assert_eq!(interpret_response(&option(), &ok).unwrap().pattern_id, 7);
        let rejected = TransportResponse::new(200, r#"{"success":false}"#);
        assert_eq!(
            interpret_response(&option(), &rejected),
            Err(GenerationError::Rejected)
        );
        let missing = TransportResponse::new(200, r#"{"success":true}"#);
        assert!(matches!(
            interpret_response(&option(), &missing),
            Err(GenerationError::MalformedBody(_))
        ));
    }

    #[test]
    fn bad_status_and_bodies_fail() {
        let server_error = TransportResponse::new(500, "oops");
        assert_eq!(
            interpret_response(&simple(), &server_error),
            Err(GenerationError::Status { status: 500 })
        );
        let short = TransportResponse::new(200, r#"{"numbers":[1,2,3]}"#);
        assert!(matches!(
            interpret_response(&simple(), &short),
            Err(GenerationError::MalformedBody(_))
        ));
        let junk = TransportResponse::new(200, "<html>");
        assert!(matches!(
            interpret_response(&simple(), &junk),
            Err(GenerationError::MalformedBody(_))
        ));
        let negative = TransportResponse::new(200, r#"{"numbers":[-1,2,3,4,5,6]}"#);
        assert!(matches!(
            interpret_response(&simple(), &negative),
            Err(GenerationError::MalformedBody(_))
        ));
    }

    #[test]
    fn alerts_distinguish_network_failures() {
        let network = GenerationError::from(TransportError("offline".to_string()));
        assert_eq!(network.alert().message, MSG_NETWORK_CHECK);
        let status = GenerationError::Status { status: 500 };
        assert_eq!(status.alert().title, "오류");
        assert_eq!(status.alert().message, MSG_GENERATION_FAILED);
    }

    #[test]
    fn client_posts_once_to_request_path() {
        let transport = Canned {
            reply: Ok(TransportResponse::new(
                200,
                r#"{"success":true,"numbers":[5,6,7,8,9,10]}"#,
            )),
            seen: Mutex::new(Vec::new()),
        };
        let client = GenerationClient::new(transport);
        let result = tokio_test::block_on(client.generate(&option())).unwrap();
        assert_eq!(result.display(), "5, 6, 7, 8, 9, 10");
        let seen = client.transport().seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, "/api/option-generate");
        assert_eq!(seen[0].1["pattern_ids"], serde_json::json!([7]));
    }

    #[test]
    fn client_maps_transport_errors_to_network() {
        let transport = Canned {
            reply: Err(TransportError("dns".to_string())),
            seen: Mutex::new(Vec::new()),
        };
        let client = GenerationClient::new(transport);
        let err = tokio_test::block_on(client.generate(&simple())).unwrap_err();
        assert_eq!(err, GenerationError::Network("dns".to_string()));
    }
}
