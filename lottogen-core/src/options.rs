//! Option-pattern catalog (ids 1-20) and translation of a user's selection
//! into `filter_kwargs` parameters.
use once_cell::sync::Lazy;
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;

use crate::constraints::{DiscreteOption, NumericRange, PersonalFactor};

/// The single control an option screen offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionControl {
    /// Pick one integer from a fixed menu; sent as `{ key: n }`.
    Count {
        key: &'static str,
        choices: &'static [i64],
    },
    /// Pick one `"a:b"` ratio string; sent verbatim as `{ key: "a:b" }`.
    Ratio {
        key: &'static str,
        choices: &'static [&'static str],
    },
    /// Pick one `"a:b"` pair; sent split as `{ first_key: a, second_key: b }`.
    Pair {
        first_key: &'static str,
        second_key: &'static str,
        choices: &'static [&'static str],
    },
    /// Enter inclusive bounds; sent as `{ min_key: start, max_key: end }`.
    Range {
        min_key: &'static str,
        max_key: &'static str,
        lowest: u32,
        highest: u32,
    },
}

/// One entry of the option-pattern menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionPattern {
    pub id: u32,
    pub name: &'static str,
    pub description: &'static str,
    pub control: OptionControl,
}

const RATIOS: &[&str] = &["0:6", "1:5", "2:4", "3:3", "4:2", "5:1", "6:0"];

const OPTION_PATTERNS: [OptionPattern; 20] = [
    OptionPattern {
        id: 1,
        name: "최근 출현수",
        description: "최근 회차에 나온 번호를 기준으로 조합합니다.",
        control: OptionControl::Count {
            key: "recent_count",
            choices: &[5, 10, 15, 20, 30],
        },
    },
    OptionPattern {
        id: 2,
        name: "연속번호",
        description: "연속된 번호 쌍의 개수를 지정합니다.",
        control: OptionControl::Count {
            key: "consecutive_count",
            choices: &[0, 1, 2],
        },
    },
    OptionPattern {
        id: 3,
        name: "동일 끝수",
        description: "끝자리가 같은 번호의 개수를 지정합니다.",
        control: OptionControl::Count {
            key: "same_ending_count",
            choices: &[0, 1, 2, 3],
        },
    },
    OptionPattern {
        id: 4,
        name: "고저 비율",
        description: "23 이상 높은 번호와 낮은 번호의 개수를 지정합니다.",
        control: OptionControl::Pair {
            first_key: "high_count",
            second_key: "low_count",
            choices: RATIOS,
        },
    },
    OptionPattern {
        id: 5,
        name: "홀짝 비율",
        description: "홀수와 짝수의 비율을 지정합니다.",
        control: OptionControl::Ratio {
            key: "odd_even_ratio",
            choices: RATIOS,
        },
    },
    OptionPattern {
        id: 6,
        name: "장기 미출현수",
        description: "오랫동안 나오지 않은 번호의 개수를 지정합니다.",
        control: OptionControl::Count {
            key: "cold_count",
            choices: &[0, 1, 2, 3],
        },
    },
    OptionPattern {
        id: 7,
        name: "총합 범위",
        description: "여섯 번호의 합계 범위를 지정합니다.",
        control: OptionControl::Range {
            min_key: "sum_min",
            max_key: "sum_max",
            lowest: 21,
            highest: 255,
        },
    },
    OptionPattern {
        id: 8,
        name: "AC값",
        description: "번호 간 차이의 다양성(AC값)을 지정합니다.",
        control: OptionControl::Count {
            key: "ac_value",
            choices: &[6, 7, 8, 9, 10],
        },
    },
    OptionPattern {
        id: 9,
        name: "구간 분포",
        description: "한 구간(10단위)에 들어갈 최대 번호 개수를 지정합니다.",
        control: OptionControl::Count {
            key: "max_per_section",
            choices: &[2, 3, 4],
        },
    },
    OptionPattern {
        id: 10,
        name: "소수",
        description: "소수 번호의 개수를 지정합니다.",
        control: OptionControl::Count {
            key: "prime_count",
            choices: &[0, 1, 2, 3],
        },
    },
    OptionPattern {
        id: 11,
        name: "합성수",
        description: "합성수 번호의 개수를 지정합니다.",
        control: OptionControl::Count {
            key: "composite_count",
            choices: &[1, 2, 3, 4],
        },
    },
    OptionPattern {
        id: 12,
        name: "3의 배수",
        description: "3의 배수 번호의 개수를 지정합니다.",
        control: OptionControl::Count {
            key: "multiple_of_three_count",
            choices: &[0, 1, 2, 3],
        },
    },
    OptionPattern {
        id: 13,
        name: "이월수",
        description: "직전 회차 번호가 다시 나올 개수를 지정합니다.",
        control: OptionControl::Count {
            key: "carry_over_count",
            choices: &[0, 1, 2],
        },
    },
    OptionPattern {
        id: 14,
        name: "이웃수",
        description: "직전 회차 번호의 ±1 번호 개수를 지정합니다.",
        control: OptionControl::Count {
            key: "neighbor_count",
            choices: &[0, 1, 2],
        },
    },
    OptionPattern {
        id: 15,
        name: "첫수 범위",
        description: "가장 작은 번호의 범위를 지정합니다.",
        control: OptionControl::Range {
            min_key: "first_min",
            max_key: "first_max",
            lowest: 1,
            highest: 40,
        },
    },
    OptionPattern {
        id: 16,
        name: "끝수 합",
        description: "여섯 번호 끝자리 합의 범위를 지정합니다.",
        control: OptionControl::Range {
            min_key: "ending_sum_min",
            max_key: "ending_sum_max",
            lowest: 0,
            highest: 54,
        },
    },
    OptionPattern {
        id: 17,
        name: "색상 분포",
        description: "공 색상 그룹이 몇 가지 나올지 지정합니다.",
        control: OptionControl::Count {
            key: "color_groups",
            choices: &[2, 3, 4, 5],
        },
    },
    OptionPattern {
        id: 18,
        name: "궁합수",
        description: "자주 함께 나온 번호 쌍의 개수를 지정합니다.",
        control: OptionControl::Count {
            key: "pair_count",
            choices: &[0, 1, 2],
        },
    },
    OptionPattern {
        id: 19,
        name: "최대 간격",
        description: "이웃한 두 번호 사이의 최대 간격을 지정합니다.",
        control: OptionControl::Count {
            key: "max_gap",
            choices: &[10, 15, 20],
        },
    },
    OptionPattern {
        id: 20,
        name: "미출현 기간",
        description: "최근 몇 회차 동안 나오지 않은 번호를 포함할지 지정합니다.",
        control: OptionControl::Count {
            key: "absent_weeks",
            choices: &[5, 10, 15],
        },
    },
];

static CATALOG: Lazy<BTreeMap<u32, OptionPattern>> = Lazy::new(|| {
    OPTION_PATTERNS
        .iter()
        .map(|pattern| (pattern.id, *pattern))
        .collect()
});

/// Look up an option pattern by id.
#[must_use]
pub fn option_pattern(id: u32) -> Option<&'static OptionPattern> {
    CATALOG.get(&id)
}

/// All option patterns in id order.
pub fn option_patterns() -> impl Iterator<Item = &'static OptionPattern> {
    CATALOG.values()
}

/// Validated `filter_kwargs` entry for one option pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionFilter {
    kwargs: Map<String, Value>,
}

impl OptionFilter {
    #[must_use]
    pub const fn kwargs(&self) -> &Map<String, Value> {
        &self.kwargs
    }

    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.kwargs)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kwargs.is_empty()
    }
}

/// Why a selection could not be translated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionProblem {
    /// The selection is not on the menu or the range is inverted/out of bounds.
    Malformed,
}

impl OptionPattern {
    /// True when the user has touched this pattern's control.
    #[must_use]
    pub const fn has_selection(&self, personal: &PersonalFactor) -> bool {
        match self.control {
            OptionControl::Range { .. } => personal.numeric_range.is_some(),
            _ => personal.discrete_option.is_some(),
        }
    }

    /// Translate the user's selection into kwargs.
    ///
    /// An untouched control yields an empty filter: no constraint is sent,
    /// never a default guess.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionProblem::Malformed`] when the selection is not a
    /// legal value for this control.
    pub fn filter_for(&self, personal: &PersonalFactor) -> Result<OptionFilter, SelectionProblem> {
        let mut kwargs = Map::new();
        match self.control {
            OptionControl::Count { key, choices } => {
                if let Some(option) = &personal.discrete_option {
                    let value = count_choice(option, choices)?;
                    kwargs.insert(key.to_string(), json!(value));
                }
            }
            OptionControl::Ratio { key, choices } => {
                if let Some(option) = &personal.discrete_option {
                    let ratio = ratio_choice(option, choices)?;
                    kwargs.insert(key.to_string(), json!(ratio));
                }
            }
            OptionControl::Pair {
                first_key,
                second_key,
                choices,
            } => {
                if let Some(option) = &personal.discrete_option {
                    let ratio = ratio_choice(option, choices)?;
                    let (first, second) = split_ratio(ratio).ok_or(SelectionProblem::Malformed)?;
                    kwargs.insert(first_key.to_string(), json!(first));
                    kwargs.insert(second_key.to_string(), json!(second));
                }
            }
            OptionControl::Range {
                min_key,
                max_key,
                lowest,
                highest,
            } => {
                if let Some(range) = personal.numeric_range {
                    check_range(range, lowest, highest)?;
                    kwargs.insert(min_key.to_string(), json!(range.start));
                    kwargs.insert(max_key.to_string(), json!(range.end));
                }
            }
        }
        Ok(OptionFilter { kwargs })
    }
}

fn count_choice(option: &DiscreteOption, choices: &[i64]) -> Result<i64, SelectionProblem> {
    let value = match option {
        DiscreteOption::Int(value) => *value,
        DiscreteOption::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| SelectionProblem::Malformed)?,
    };
    if choices.contains(&value) {
        Ok(value)
    } else {
        Err(SelectionProblem::Malformed)
    }
}

fn ratio_choice(
    option: &DiscreteOption,
    choices: &[&'static str],
) -> Result<&'static str, SelectionProblem> {
    let DiscreteOption::Text(text) = option else {
        return Err(SelectionProblem::Malformed);
    };
    let text = text.trim();
    choices
        .iter()
        .copied()
        .find(|choice| *choice == text)
        .ok_or(SelectionProblem::Malformed)
}

fn split_ratio(ratio: &str) -> Option<(u8, u8)> {
    let (first, second) = ratio.split_once(':')?;
    Some((first.parse().ok()?, second.parse().ok()?))
}

fn check_range(range: NumericRange, lowest: u32, highest: u32) -> Result<(), SelectionProblem> {
    if range.start > range.end || range.start < lowest || range.end > highest {
        return Err(SelectionProblem::Malformed);
    }
    Ok(())
}
