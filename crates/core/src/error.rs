/// Which part of the error taxonomy an [`OpsError`] belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// No usable response arrived.
    Transport,
    /// The backend answered and refused the request.
    Rejection,
    /// A required field was blank; nothing was sent.
    Validation,
    /// The record moved to a status the action does not accept.
    Conflict,
    /// Local misuse or teardown rather than a backend outcome.
    Local,
}

#[derive(Debug, thiserror::Error)]
pub enum OpsError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("{message}")]
    Rejected {
        status: Option<u16>,
        message: String,
        missing_fields: Vec<String>,
    },
    #[error("failed to decode response: {0}")]
    Decode(String),
    #[error("missing required fields: {}", .fields.join(", "))]
    Validation { fields: Vec<String> },
    #[error("This {label} has already been {actual}")]
    StaleState {
        label: &'static str,
        expected: Vec<&'static str>,
        actual: &'static str,
    },
    #[error("{label} not found: {id}")]
    NotFound { label: &'static str, id: String },
    #[error("action {action} is not defined for {label}")]
    UnknownAction {
        label: &'static str,
        action: String,
    },
    #[error("operation cancelled")]
    Cancelled,
    #[error("failed to write export file: {0}")]
    FileWrite(std::io::Error),
}

impl OpsError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            OpsError::Transport(_) | OpsError::Decode(_) => ErrorKind::Transport,
            OpsError::Rejected { .. } | OpsError::NotFound { .. } => ErrorKind::Rejection,
            OpsError::Validation { .. } => ErrorKind::Validation,
            OpsError::StaleState { .. } => ErrorKind::Conflict,
            OpsError::InvalidInput(_)
            | OpsError::UnknownAction { .. }
            | OpsError::Cancelled
            | OpsError::FileWrite(_) => ErrorKind::Local,
        }
    }

    /// Shorthand for a rejection that carries only a message.
    pub fn rejected(status: Option<u16>, message: impl Into<String>) -> Self {
        OpsError::Rejected {
            status,
            message: message.into(),
            missing_fields: Vec::new(),
        }
    }
}

pub type OpsResult<T> = std::result::Result<T, OpsError>;
