//! Per-screen configuration: which patterns a screen serves, how many slots
//! it shows, which personal fields it requires, and how its gates behave.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

use crate::ad_gate::AdGateConfig;
use crate::constants::{COMPACT_SLOT_COUNT, FULL_SLOT_COUNT, PATTERN_ID_MAX};
use crate::fallback::FallbackPolicy;
use crate::options::option_pattern;

/// Personal fields a simple-pattern screen collects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonalGroup {
    #[default]
    None,
    /// Birth date plus calendar type.
    Birth,
    /// Korean name; Hanja and English names are sent when filled in.
    KoreanName,
    /// Korean, Hanja and English names, all required.
    FullName,
    /// Birth data plus Korean name.
    BirthAndName,
}

impl PersonalGroup {
    #[must_use]
    pub const fn required_fields(self) -> &'static [RequiredField] {
        match self {
            Self::None => &[],
            Self::Birth => &[RequiredField::BirthDate, RequiredField::CalendarType],
            Self::KoreanName => &[RequiredField::KoreanName],
            Self::FullName => &[
                RequiredField::KoreanName,
                RequiredField::HanjaName,
                RequiredField::EnglishName,
            ],
            Self::BirthAndName => &[
                RequiredField::BirthDate,
                RequiredField::CalendarType,
                RequiredField::KoreanName,
            ],
        }
    }
}

/// Request shape and endpoint a screen uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum EndpointShape {
    /// `POST /api/generate`.
    Simple {
        #[serde(default)]
        personal: PersonalGroup,
    },
    /// `POST /api/option-generate`.
    Option {
        #[serde(default)]
        require_selection: bool,
    },
}

/// A field that must be filled in before a request is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequiredField {
    BirthDate,
    CalendarType,
    KoreanName,
    HanjaName,
    EnglishName,
    NumericRange,
    DiscreteOption,
}

impl RequiredField {
    /// Label shown in the user-facing alert.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::BirthDate => "생년월일(8자리)",
            Self::CalendarType => "양력/음력",
            Self::KoreanName => "한글 이름",
            Self::HanjaName => "한자 이름",
            Self::EnglishName => "영문 이름",
            Self::NumericRange => "범위",
            Self::DiscreteOption => "옵션",
        }
    }
}

impl fmt::Display for RequiredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Configuration invariants violated by a screen definition.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScreenConfigError {
    #[error("screen {screen} lists no patterns")]
    NoPatterns { screen: String },
    #[error("pattern id {id} is outside 1..={max}")]
    PatternOutOfRange { id: u32, max: u32 },
    #[error("option id {id} is not in the option catalog")]
    UnknownOption { id: u32 },
    #[error("slot count {count} is not supported (expected 4 or 6)")]
    SlotCount { count: usize },
    #[error("skip delay {skip_after_ms}ms exceeds ad duration {duration_ms}ms")]
    SkipAfterDuration { skip_after_ms: u64, duration_ms: u64 },
}

/// Everything that distinguishes one generation screen from another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenConfig {
    pub name: String,
    pub pattern_ids: Vec<u32>,
    pub endpoint: EndpointShape,
    #[serde(default = "ScreenConfig::default_slot_count")]
    pub slot_count: usize,
    #[serde(default)]
    pub ad_gate: AdGateConfig,
    #[serde(default)]
    pub fallback: FallbackPolicy,
    /// Static text shown for a pattern before (and after resetting) a result.
    #[serde(default)]
    pub descriptions: BTreeMap<u32, String>,
}

impl ScreenConfig {
    const fn default_slot_count() -> usize {
        FULL_SLOT_COUNT
    }

    /// A fixed-template screen serving one or more simple patterns.
    #[must_use]
    pub fn simple(name: impl Into<String>, pattern_ids: impl IntoIterator<Item = u32>) -> Self {
        Self {
            name: name.into(),
            pattern_ids: pattern_ids.into_iter().collect(),
            endpoint: EndpointShape::Simple {
                personal: PersonalGroup::None,
            },
            slot_count: FULL_SLOT_COUNT,
            ad_gate: AdGateConfig::default(),
            fallback: FallbackPolicy::default(),
            descriptions: BTreeMap::new(),
        }
    }

    /// An option screen for one catalog entry; descriptions come from the catalog.
    #[must_use]
    pub fn option(option_id: u32) -> Self {
        let (name, descriptions) = option_pattern(option_id).map_or_else(
            || (format!("option-{option_id}"), BTreeMap::new()),
            |pattern| {
                (
                    pattern.name.to_string(),
                    BTreeMap::from([(option_id, pattern.description.to_string())]),
                )
            },
        );
        Self {
            name,
            pattern_ids: vec![option_id],
            endpoint: EndpointShape::Option {
                require_selection: false,
            },
            slot_count: COMPACT_SLOT_COUNT,
            ad_gate: AdGateConfig::default(),
            fallback: FallbackPolicy::default(),
            descriptions,
        }
    }

    #[must_use]
    pub fn with_personal(mut self, group: PersonalGroup) -> Self {
        if let EndpointShape::Simple { personal } = &mut self.endpoint {
            *personal = group;
        }
        self
    }

    #[must_use]
    pub fn requiring_selection(mut self) -> Self {
        if let EndpointShape::Option { require_selection } = &mut self.endpoint {
            *require_selection = true;
        }
        self
    }

    #[must_use]
    pub fn with_slot_count(mut self, slot_count: usize) -> Self {
        self.slot_count = slot_count;
        self
    }

    #[must_use]
    pub fn with_ad_gate(mut self, ad_gate: AdGateConfig) -> Self {
        self.ad_gate = ad_gate;
        self
    }

    #[must_use]
    pub fn with_fallback(mut self, fallback: FallbackPolicy) -> Self {
        self.fallback = fallback;
        self
    }

    #[must_use]
    pub fn with_description(mut self, pattern_id: u32, text: impl Into<String>) -> Self {
        self.descriptions.insert(pattern_id, text.into());
        self
    }

    #[must_use]
    pub fn serves(&self, pattern_id: u32) -> bool {
        self.pattern_ids.contains(&pattern_id)
    }

    /// Fields that must be present before building a request.
    #[must_use]
    pub fn required_fields(&self) -> Vec<RequiredField> {
        match self.endpoint {
            EndpointShape::Simple { personal } => personal.required_fields().to_vec(),
            EndpointShape::Option { require_selection } => {
                if !require_selection {
                    return Vec::new();
                }
                self.pattern_ids
                    .iter()
                    .filter_map(|id| option_pattern(*id))
                    .map(|pattern| match pattern.control {
                        crate::options::OptionControl::Range { .. } => RequiredField::NumericRange,
                        _ => RequiredField::DiscreteOption,
                    })
                    .collect()
            }
        }
    }

    /// Description text for a pattern, falling back to a generic label.
    #[must_use]
    pub fn description(&self, pattern_id: u32) -> String {
        self.descriptions
            .get(&pattern_id)
            .cloned()
            .unwrap_or_else(|| format!("패턴 {pattern_id}"))
    }

    /// Check the definition before a screen mounts with it.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ScreenConfigError> {
        if self.pattern_ids.is_empty() {
            return Err(ScreenConfigError::NoPatterns {
                screen: self.name.clone(),
            });
        }
        if self.slot_count != COMPACT_SLOT_COUNT && self.slot_count != FULL_SLOT_COUNT {
            return Err(ScreenConfigError::SlotCount {
                count: self.slot_count,
            });
        }
        for &id in &self.pattern_ids {
            match self.endpoint {
                EndpointShape::Simple { .. } => {
                    if id == 0 || id > PATTERN_ID_MAX {
                        return Err(ScreenConfigError::PatternOutOfRange {
                            id,
                            max: PATTERN_ID_MAX,
                        });
                    }
                }
                EndpointShape::Option { .. } => {
                    if option_pattern(id).is_none() {
                        return Err(ScreenConfigError::UnknownOption { id });
                    }
                }
            }
        }
        if self.ad_gate.can_skip && self.ad_gate.skip_after_ms > self.ad_gate.duration_ms {
            return Err(ScreenConfigError::SkipAfterDuration {
                skip_after_ms: self.ad_gate.skip_after_ms,
                duration_ms: self.ad_gate.duration_ms,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_validate() {
        ScreenConfig::simple("saju", [12])
            .with_personal(PersonalGroup::Birth)
            .validate()
            .unwrap();
        for id in 1..=20 {
            ScreenConfig::option(id).validate().unwrap();
        }
    }

    #[test]
    fn validation_reports_bad_definitions() {
        assert_eq!(
            ScreenConfig::simple("empty", []).validate(),
            Err(ScreenConfigError::NoPatterns {
                screen: "empty".to_string()
            })
        );
        assert_eq!(
            ScreenConfig::simple("big", [56]).validate(),
            Err(ScreenConfigError::PatternOutOfRange { id: 56, max: 55 })
        );
        assert_eq!(
            ScreenConfig::option(21).validate(),
            Err(ScreenConfigError::UnknownOption { id: 21 })
        );
        assert_eq!(
            ScreenConfig::simple("odd", [1]).with_slot_count(5).validate(),
            Err(ScreenConfigError::SlotCount { count: 5 })
        );
        assert_eq!(
            ScreenConfig::simple("ad", [1])
                .with_ad_gate(AdGateConfig::interstitial_short().skippable_after(4_000))
                .validate(),
            Err(ScreenConfigError::SkipAfterDuration {
                skip_after_ms: 4_000,
                duration_ms: 3_000
            })
        );
    }

    #[test]
    fn required_fields_follow_group() {
        let birth = ScreenConfig::simple("birth", [3]).with_personal(PersonalGroup::Birth);
        assert_eq!(
            birth.required_fields(),
            vec![RequiredField::BirthDate, RequiredField::CalendarType]
        );
        assert!(ScreenConfig::option(7).required_fields().is_empty());
        assert_eq!(
            ScreenConfig::option(7).requiring_selection().required_fields(),
            vec![RequiredField::NumericRange]
        );
        assert_eq!(
            ScreenConfig::option(2).requiring_selection().required_fields(),
            vec![RequiredField::DiscreteOption]
        );
    }

    #[test]
    fn with_personal_ignores_option_screens() {
        let config = ScreenConfig::option(3).with_personal(PersonalGroup::Birth);
        assert!(matches!(config.endpoint, EndpointShape::Option { .. }));
    }

    #[test]
    fn descriptions_fall_back_to_label() {
        let config = ScreenConfig::simple("multi", [1, 2]).with_description(1, "균형 조합");
        assert_eq!(config.description(1), "균형 조합");
        assert_eq!(config.description(2), "패턴 2");
        assert!(ScreenConfig::option(7).description(7).contains("합계"));
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: ScreenConfig = serde_json::from_str(
            r#"{"name":"json","pattern_ids":[9],"endpoint":{"shape":"simple","personal":"korean_name"}}"#,
        )
        .unwrap();
        assert_eq!(config.slot_count, 6);
        assert_eq!(
            config.endpoint,
            EndpointShape::Simple {
                personal: PersonalGroup::KoreanName
            }
        );
        assert_eq!(config.fallback, FallbackPolicy::SurfaceError);
    }
}
