//! Transient, non-blocking user notifications.

use crate::error::{ErrorKind, OpsError};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    /// Turn a failure into what the user sees.
    ///
    /// Server messages are shown verbatim; transport problems get `fallback`.
    pub fn from_error(err: &OpsError, fallback: &str) -> Self {
        let message = match err {
            OpsError::Rejected { missing_fields, .. } if !missing_fields.is_empty() => {
                format!("Missing required fields: {}", missing_fields.join(", "))
            }
            OpsError::Rejected { message, .. } => message.clone(),
            OpsError::Validation { fields } => {
                format!("Please fill in all required fields: {}", fields.join(", "))
            }
            _ if err.kind() == ErrorKind::Transport => fallback.to_string(),
            other => other.to_string(),
        };
        Notice::error(message)
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

/// Capitalise the first letter: `admission request` becomes `Admission request`.
pub fn sentence_case(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
