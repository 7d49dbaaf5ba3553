//! Lottogen Client Core
//!
//! Platform-agnostic client logic for the lottery number generator: constraint
//! validation, request construction, the generation call, per-pattern result
//! state, privacy erasure, and the ad gate. No UI or platform dependencies;
//! hosts supply a [`GenerationTransport`] and drive timers with [`Millis`].

pub mod ad_gate;
pub mod alert;
pub mod client;
pub mod constants;
pub mod constraints;
pub mod fallback;
#[cfg(feature = "http")]
pub mod http;
pub mod numbers;
pub mod options;
pub mod privacy;
pub mod request;
pub mod result;
pub mod result_cache;
pub mod screen;
pub mod screen_config;
pub mod validation;

/// Host clock reading in milliseconds. Only differences matter.
pub type Millis = u64;

// Re-export commonly used types
pub use ad_gate::{ActivateOutcome, AdAction, AdGate, AdGateConfig, MembershipTier};
pub use alert::UserAlert;
pub use client::{
    GenerationClient, GenerationError, GenerationTransport, TransportError, TransportResponse,
    interpret_response,
};
pub use constraints::{
    CalendarType, ConstraintStore, DiscreteOption, NumberConstraintSet, NumericRange,
    PersonalFactor,
};
pub use fallback::{FallbackPolicy, local_draw};
#[cfg(feature = "http")]
pub use http::{HttpConfig, HttpTransport};
pub use options::{OptionControl, OptionFilter, OptionPattern, option_pattern, option_patterns};
pub use privacy::PrivacyTimeoutController;
pub use request::{GenerationRequest, GenerationRequestBuilder, PersonalPayload};
pub use result::{DrawnNumbers, GenerationResult, ResultSource};
pub use result_cache::{ApplyOutcome, DisplayState, GenerationToken, ResultCache};
pub use screen::{
    GenerationOutcome, GenerationRejected, GenerationScreen, PendingGeneration, TickReport,
};
pub use screen_config::{
    EndpointShape, PersonalGroup, RequiredField, ScreenConfig, ScreenConfigError,
};
pub use validation::{ConstraintValidator, ValidatedInput, ValidationError};
