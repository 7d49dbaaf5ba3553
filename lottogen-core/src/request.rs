//! Request construction: validated input plus pattern id(s) mapped onto the
//! two supported wire shapes.
use serde::Serialize;
use serde_json::{Map, Value};

use crate::constants::{GENERATE_PATH, OPTION_GENERATE_PATH};
use crate::constraints::{CalendarType, NumberConstraintSet};
use crate::options::OptionFilter;
use crate::screen_config::{EndpointShape, ScreenConfig};
use crate::validation::ValidatedInput;

/// Birth data attached to a simple request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BirthFields {
    pub birth_date: String,
    pub calendar_type: CalendarType,
}

/// Names attached to a simple request. Optional names are omitted when blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameFields {
    pub korean: String,
    pub hanja: Option<String>,
    pub english: Option<String>,
}

/// Personal fields legal for a simple request, by pattern group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PersonalPayload {
    #[default]
    None,
    Birth(BirthFields),
    Name(NameFields),
    BirthAndName(BirthFields, NameFields),
}

impl PersonalPayload {
    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    const fn birth(&self) -> Option<&BirthFields> {
        match self {
            Self::Birth(birth) | Self::BirthAndName(birth, _) => Some(birth),
            Self::None | Self::Name(_) => None,
        }
    }

    const fn name(&self) -> Option<&NameFields> {
        match self {
            Self::Name(name) | Self::BirthAndName(_, name) => Some(name),
            Self::None | Self::Birth(_) => None,
        }
    }
}

/// Body for `POST /api/generate`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleRequest {
    pub pattern_id: u32,
    pub numbers: NumberConstraintSet,
    pub personal: PersonalPayload,
}

#[derive(Serialize)]
struct SimpleWire<'a> {
    patterns: [u32; 1],
    user_numbers: Vec<u8>,
    user_excludes: Vec<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    birth_date: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    calendar_type: Option<CalendarType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name_korean: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name_hanja: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name_english: Option<&'a str>,
}

impl Serialize for SimpleRequest {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let birth = self.personal.birth();
        let name = self.personal.name();
        SimpleWire {
            patterns: [self.pattern_id],
            user_numbers: self.numbers.fixed_vec(),
            user_excludes: self.numbers.excluded_vec(),
            birth_date: birth.map(|b| b.birth_date.as_str()),
            calendar_type: birth.map(|b| b.calendar_type),
            name_korean: name.map(|n| n.korean.as_str()),
            name_hanja: name.and_then(|n| n.hanja.as_deref()),
            name_english: name.and_then(|n| n.english.as_deref()),
        }
        .serialize(serializer)
    }
}

/// Body for `POST /api/option-generate`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionRequest {
    pub option_id: u32,
    pub numbers: NumberConstraintSet,
    pub filter: OptionFilter,
}

#[derive(Serialize)]
struct OptionWire {
    pattern_ids: [u32; 1],
    filter_ids: [u32; 0],
    generator_ids: [u32; 0],
    user_numbers: Vec<u8>,
    user_excludes: Vec<u8>,
    filter_kwargs: Map<String, Value>,
}

impl Serialize for OptionRequest {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut filter_kwargs = Map::new();
        filter_kwargs.insert(
            self.option_id.to_string(),
            Value::Object(self.filter.kwargs().clone()),
        );
        OptionWire {
            pattern_ids: [self.option_id],
            filter_ids: [],
            generator_ids: [],
            user_numbers: self.numbers.fixed_vec(),
            user_excludes: self.numbers.excluded_vec(),
            filter_kwargs,
        }
        .serialize(serializer)
    }
}

/// One generation attempt; created fresh per tap and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum GenerationRequest {
    Simple(SimpleRequest),
    Option(OptionRequest),
}

impl GenerationRequest {
    #[must_use]
    pub const fn path(&self) -> &'static str {
        match self {
            Self::Simple(_) => GENERATE_PATH,
            Self::Option(_) => OPTION_GENERATE_PATH,
        }
    }

    #[must_use]
    pub const fn pattern_id(&self) -> u32 {
        match self {
            Self::Simple(request) => request.pattern_id,
            Self::Option(request) => request.option_id,
        }
    }

    #[must_use]
    pub const fn numbers(&self) -> &NumberConstraintSet {
        match self {
            Self::Simple(request) => &request.numbers,
            Self::Option(request) => &request.numbers,
        }
    }

    /// True when the body includes personally-identifying fields.
    #[must_use]
    pub const fn carries_personal_data(&self) -> bool {
        match self {
            Self::Simple(request) => !request.personal.is_none(),
            Self::Option(_) => false,
        }
    }

    #[must_use]
    pub const fn is_option(&self) -> bool {
        matches!(self, Self::Option(_))
    }

    /// Serialize the wire body.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn body(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

/// Maps validated input onto the request shape a screen is configured for.
#[derive(Debug, Clone, Copy)]
pub struct GenerationRequestBuilder<'a> {
    config: &'a ScreenConfig,
}

impl<'a> GenerationRequestBuilder<'a> {
    #[must_use]
    pub const fn new(config: &'a ScreenConfig) -> Self {
        Self { config }
    }

    /// Build exactly one request for `pattern_id`.
    #[must_use]
    pub fn build(&self, pattern_id: u32, input: ValidatedInput) -> GenerationRequest {
        match self.config.endpoint {
            EndpointShape::Simple { .. } => GenerationRequest::Simple(SimpleRequest {
                pattern_id,
                numbers: input.numbers,
                personal: input.personal,
            }),
            EndpointShape::Option { .. } => GenerationRequest::Option(OptionRequest {
                option_id: pattern_id,
                numbers: input.numbers,
                filter: input.option_filter.unwrap_or_default(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::{ConstraintStore, NumericRange};
    use crate::screen_config::PersonalGroup;
    use crate::validation::ConstraintValidator;
    use serde_json::json;

    fn build(config: &ScreenConfig, store: &ConstraintStore, pattern_id: u32) -> GenerationRequest {
        let input = ConstraintValidator::new(config)
            .validate(store, pattern_id)
            .unwrap();
        GenerationRequestBuilder::new(config).build(pattern_id, input)
    }

    #[test]
    fn simple_body_matches_wire_shape() {
        let config = ScreenConfig::simple("plain", [12]);
        let mut store = ConstraintStore::new(6);
        store.fill_fixed(&["33", "4"]);
        store.fill_excluded(&["45"]);
        let request = build(&config, &store, 12);
        assert_eq!(request.path(), "/api/generate");
        assert!(!request.carries_personal_data());
        assert_eq!(
            request.body().unwrap(),
            json!({
                "patterns": [12],
                "user_numbers": [4, 33],
                "user_excludes": [45],
            })
        );
    }

    #[test]
    fn simple_body_carries_personal_fields() {
        let config = ScreenConfig::simple("saju", [21]).with_personal(PersonalGroup::BirthAndName);
        let mut store = ConstraintStore::new(6);
        store.personal.birth_date = "19920311".to_string();
        store.personal.calendar_type = Some(CalendarType::Solar);
        store.personal.korean_name = "이영희".to_string();
        store.personal.english_name = "Lee Younghee".to_string();
        let request = build(&config, &store, 21);
        assert!(request.carries_personal_data());
        assert_eq!(
            request.body().unwrap(),
            json!({
                "patterns": [21],
                "user_numbers": [],
                "user_excludes": [],
                "birth_date": "19920311",
                "calendar_type": "solar",
                "name_korean": "이영희",
                "name_english": "Lee Younghee",
            })
        );
    }

    #[test]
    fn option_seven_sum_range_body() {
        let config = ScreenConfig::option(7);
        let mut store = ConstraintStore::new(4);
        store.personal.numeric_range = Some(NumericRange::new(120, 170));
        let request = build(&config, &store, 7);
        assert_eq!(request.path(), "/api/option-generate");
        assert!(request.is_option());
        let body = request.body().unwrap();
        assert_eq!(
            body,
            json!({
                "pattern_ids": [7],
                "filter_ids": [],
                "generator_ids": [],
                "user_numbers": [],
                "user_excludes": [],
                "filter_kwargs": { "7": { "sum_min": 120, "sum_max": 170 } },
            })
        );
    }

    #[test]
    fn option_without_selection_sends_empty_kwargs() {
        let config = ScreenConfig::option(5);
        let store = ConstraintStore::new(4);
        let body = build(&config, &store, 5).body().unwrap();
        assert_eq!(body["filter_kwargs"], json!({ "5": {} }));
    }

    #[test]
    fn user_arrays_equal_validated_sets() {
        let config = ScreenConfig::simple("plain", [1]);
        let mut store = ConstraintStore::new(6);
        store.fill_fixed(&["9", "1", "9", "x", "27"]);
        store.fill_excluded(&["45", "2", "0"]);
        let request = build(&config, &store, 1);
        let body = request.body().unwrap();
        let numbers = request.numbers();
        assert_eq!(body["user_numbers"], json!(numbers.fixed_vec()));
        assert_eq!(body["user_excludes"], json!(numbers.excluded_vec()));
        assert_eq!(body["user_numbers"], json!([1, 9, 27]));
        assert_eq!(body["user_excludes"], json!([2, 45]));
    }
}
