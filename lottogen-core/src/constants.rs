//! Centralized constants for the generation workflow.
//!
//! Number domain, timing, endpoint paths and user-facing copy live here so
//! every screen configuration draws from the same values.

// Number domain ------------------------------------------------------------
pub const NUMBER_MIN: u8 = 1;
pub const NUMBER_MAX: u8 = 45;
pub const PICK_SIZE: usize = 6;
pub const MAX_FIXED_NUMBERS: usize = 6;

/// Slots per side on compact screens.
pub const COMPACT_SLOT_COUNT: usize = 4;
/// Slots per side on full screens.
pub const FULL_SLOT_COUNT: usize = 6;

// Personal factor rules ----------------------------------------------------
pub const BIRTH_DATE_LEN: usize = 8;
pub const BIRTH_DATE_FORMAT: &str = "%Y%m%d";
/// Lunar months run 29 or 30 days.
pub const LUNAR_MONTH_MAX_DAYS: u32 = 30;
pub const MIN_KOREAN_NAME_CHARS: usize = 2;
pub const MIN_HANJA_NAME_CHARS: usize = 1;
pub const MIN_ENGLISH_NAME_LETTERS: usize = 2;

// Timing (milliseconds) ----------------------------------------------------
pub const PRIVACY_CLEAR_DELAY_MS: u64 = 2_000;
pub const REWARD_AD_DURATION_MS: u64 = 15_000;
pub const INTERSTITIAL_SHORT_MS: u64 = 3_000;
pub const INTERSTITIAL_LONG_MS: u64 = 5_000;
pub const DEFAULT_SKIP_AFTER_MS: u64 = 5_000;

// Endpoints ----------------------------------------------------------------
pub const GENERATE_PATH: &str = "/api/generate";
pub const OPTION_GENERATE_PATH: &str = "/api/option-generate";
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

// Option patterns ----------------------------------------------------------
pub const OPTION_ID_MIN: u32 = 1;
pub const OPTION_ID_MAX: u32 = 20;
pub const PATTERN_ID_MAX: u32 = 55;

// User-facing copy ---------------------------------------------------------
pub const ALERT_TITLE_ERROR: &str = "오류";
pub const ALERT_TITLE_NOTICE: &str = "알림";
pub const MSG_GENERATION_FAILED: &str = "번호 생성에 실패했습니다.";
pub const MSG_NETWORK_CHECK: &str = "네트워크 연결을 확인해주세요.";
pub const MSG_TOO_MANY_FIXED: &str = "고정수는 최대 6개까지 입력할 수 있습니다.";
pub const MSG_OVERLAPPING: &str = "고정수와 제외수에 같은 번호가 있습니다.";
pub const MSG_PRIVACY_DISCLOSURE: &str =
    "입력하신 개인정보는 번호 생성에만 사용되며 잠시 후 자동으로 삭제됩니다.";
