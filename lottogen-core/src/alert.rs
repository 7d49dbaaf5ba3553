//! The single user-facing surface for every failure path.
use serde::{Deserialize, Serialize};

use crate::constants::{ALERT_TITLE_ERROR, ALERT_TITLE_NOTICE};

/// A blocking modal alert with a title and one message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAlert {
    pub title: String,
    pub message: String,
}

impl UserAlert {
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            title: ALERT_TITLE_ERROR.to_string(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn notice(message: impl Into<String>) -> Self {
        Self {
            title: ALERT_TITLE_NOTICE.to_string(),
            message: message.into(),
        }
    }
}
