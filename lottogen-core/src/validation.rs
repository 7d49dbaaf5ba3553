//! Pure validation of a screen's constraint state before any request is built.
use chrono::NaiveDate;
use thiserror::Error;

use crate::alert::UserAlert;
use crate::constants::{
    BIRTH_DATE_FORMAT, BIRTH_DATE_LEN, LUNAR_MONTH_MAX_DAYS, MIN_ENGLISH_NAME_LETTERS, MIN_HANJA_NAME_CHARS,
    MIN_KOREAN_NAME_CHARS, MSG_OVERLAPPING, MSG_TOO_MANY_FIXED,
};
use crate::constraints::{CalendarType, ConstraintStore, NumberConstraintSet, PersonalFactor};
use crate::numbers::{format_numbers, parse_slots};
use crate::options::{OptionControl, OptionFilter, SelectionProblem, option_pattern};
use crate::request::{BirthFields, NameFields, PersonalPayload};
use crate::screen_config::{EndpointShape, PersonalGroup, RequiredField, ScreenConfig};

/// Reasons a generation attempt is aborted before any request is sent.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{count} fixed numbers entered (maximum 6)")]
    TooManyFixedNumbers { count: usize },
    #[error("numbers {numbers:?} are both fixed and excluded")]
    OverlappingConstraints { numbers: Vec<u8> },
    #[error("required field missing or malformed: {field:?}")]
    MissingRequiredField { field: RequiredField },
}

impl ValidationError {
    /// The one alert shown for this failure.
    #[must_use]
    pub fn alert(&self) -> UserAlert {
        match self {
            Self::TooManyFixedNumbers { .. } => UserAlert::notice(MSG_TOO_MANY_FIXED),
            Self::OverlappingConstraints { numbers } => {
                UserAlert::notice(format!("{MSG_OVERLAPPING} ({})", format_numbers(numbers)))
            }
            Self::MissingRequiredField { field } => {
                UserAlert::notice(format!("{}을(를) 확인해주세요.", field.label()))
            }
        }
    }
}

/// Output of a successful validation pass, ready for request building.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedInput {
    pub numbers: NumberConstraintSet,
    pub personal: PersonalPayload,
    pub option_filter: Option<OptionFilter>,
}

/// Validation rules parametrized by a screen configuration.
#[derive(Debug, Clone, Copy)]
pub struct ConstraintValidator<'a> {
    config: &'a ScreenConfig,
}

impl<'a> ConstraintValidator<'a> {
    #[must_use]
    pub const fn new(config: &'a ScreenConfig) -> Self {
        Self { config }
    }

    /// Validate the store for one pattern.
    ///
    /// Numbers are checked first (count, then overlap), then required fields
    /// in declaration order; the first failure wins.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] encountered.
    pub fn validate(
        &self,
        store: &ConstraintStore,
        pattern_id: u32,
    ) -> Result<ValidatedInput, ValidationError> {
        let numbers = validate_numbers(store.fixed_slots(), store.excluded_slots())?;
        match self.config.endpoint {
            EndpointShape::Simple { personal } => Ok(ValidatedInput {
                numbers,
                personal: validate_personal(personal, &store.personal)?,
                option_filter: None,
            }),
            EndpointShape::Option { require_selection } => Ok(ValidatedInput {
                numbers,
                personal: PersonalPayload::None,
                option_filter: validate_option(pattern_id, &store.personal, require_selection)?,
            }),
        }
    }
}

/// Parse and check fixed/excluded slots.
///
/// # Errors
///
/// Returns [`ValidationError::TooManyFixedNumbers`] or
/// [`ValidationError::OverlappingConstraints`].
pub fn validate_numbers<S: AsRef<str>>(
    fixed: &[S],
    excluded: &[S],
) -> Result<NumberConstraintSet, ValidationError> {
    NumberConstraintSet::new(parse_slots(fixed), parse_slots(excluded))
}

/// Check the personal fields a group requires and shape them for the request.
///
/// # Errors
///
/// Returns [`ValidationError::MissingRequiredField`] naming the first bad field.
pub fn validate_personal(
    group: PersonalGroup,
    personal: &PersonalFactor,
) -> Result<PersonalPayload, ValidationError> {
    let payload = match group {
        PersonalGroup::None => PersonalPayload::None,
        PersonalGroup::Birth => PersonalPayload::Birth(birth_fields(personal)?),
        PersonalGroup::KoreanName => PersonalPayload::Name(NameFields {
            korean: korean_name(personal)?,
            hanja: non_empty(&personal.hanja_name),
            english: non_empty(&personal.english_name),
        }),
        PersonalGroup::FullName => PersonalPayload::Name(NameFields {
            korean: korean_name(personal)?,
            hanja: Some(hanja_name(personal)?),
            english: Some(english_name(personal)?),
        }),
        PersonalGroup::BirthAndName => {
            let birth = birth_fields(personal)?;
            let name = NameFields {
                korean: korean_name(personal)?,
                hanja: non_empty(&personal.hanja_name),
                english: non_empty(&personal.english_name),
            };
            PersonalPayload::BirthAndName(birth, name)
        }
    };
    Ok(payload)
}

/// Translate an option selection, enforcing presence when the screen requires one.
///
/// # Errors
///
/// Returns [`ValidationError::MissingRequiredField`] for a missing required
/// selection or a selection that is not legal for the option's control.
pub fn validate_option(
    option_id: u32,
    personal: &PersonalFactor,
    require_selection: bool,
) -> Result<Option<OptionFilter>, ValidationError> {
    let Some(pattern) = option_pattern(option_id) else {
        return Ok(None);
    };
    let field = match pattern.control {
        OptionControl::Range { .. } => RequiredField::NumericRange,
        _ => RequiredField::DiscreteOption,
    };
    if require_selection && !pattern.has_selection(personal) {
        return Err(ValidationError::MissingRequiredField { field });
    }
    match pattern.filter_for(personal) {
        Ok(filter) => Ok(Some(filter)),
        Err(SelectionProblem::Malformed) => {
            Err(ValidationError::MissingRequiredField { field })
        }
    }
}

/// True when `raw` is exactly eight ASCII digits forming a date on the given
/// calendar. Solar dates must exist on the Gregorian calendar; lunar dates
/// only need month 1-12 and day 1-30.
#[must_use]
pub fn is_valid_birth_date(raw: &str, calendar: CalendarType) -> bool {
    if !is_birth_date_shaped(raw) {
        return false;
    }
    match calendar {
        CalendarType::Solar => NaiveDate::parse_from_str(raw, BIRTH_DATE_FORMAT).is_ok(),
        CalendarType::Lunar => {
            let (Ok(month), Ok(day)) = (raw[4..6].parse::<u32>(), raw[6..8].parse::<u32>())
            else {
                return false;
            };
            (1..=12).contains(&month) && (1..=LUNAR_MONTH_MAX_DAYS).contains(&day)
        }
    }
}

fn is_birth_date_shaped(raw: &str) -> bool {
    raw.len() == BIRTH_DATE_LEN && raw.bytes().all(|b| b.is_ascii_digit())
}

fn birth_fields(personal: &PersonalFactor) -> Result<BirthFields, ValidationError> {
    let birth_date = personal.birth_date.trim();
    let invalid_date = ValidationError::MissingRequiredField {
        field: RequiredField::BirthDate,
    };
    if !is_birth_date_shaped(birth_date) {
        return Err(invalid_date);
    }
    let calendar_type: CalendarType = personal.calendar_type.ok_or(
        ValidationError::MissingRequiredField {
            field: RequiredField::CalendarType,
        },
    )?;
    if !is_valid_birth_date(birth_date, calendar_type) {
        return Err(invalid_date);
    }
    Ok(BirthFields {
        birth_date: birth_date.to_string(),
        calendar_type,
    })
}

fn korean_name(personal: &PersonalFactor) -> Result<String, ValidationError> {
    name_with_min(
        &personal.korean_name,
        MIN_KOREAN_NAME_CHARS,
        |_| true,
        RequiredField::KoreanName,
    )
}

fn hanja_name(personal: &PersonalFactor) -> Result<String, ValidationError> {
    name_with_min(
        &personal.hanja_name,
        MIN_HANJA_NAME_CHARS,
        |_| true,
        RequiredField::HanjaName,
    )
}

fn english_name(personal: &PersonalFactor) -> Result<String, ValidationError> {
    name_with_min(
        &personal.english_name,
        MIN_ENGLISH_NAME_LETTERS,
        char::is_ascii_alphabetic,
        RequiredField::EnglishName,
    )
}

fn name_with_min(
    raw: &str,
    min: usize,
    counts: impl Fn(&char) -> bool,
    field: RequiredField,
) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.chars().filter(|c| counts(c)).count() < min {
        return Err(ValidationError::MissingRequiredField { field });
    }
    Ok(trimmed.to_string())
}

fn non_empty(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
