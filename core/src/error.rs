use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShiftError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    #[error("Invalid roster: {reason}")]
    InvalidRoster { reason: String },

    #[error("Alert '{alert_id}' is already resolved")]
    AlertAlreadyResolved { alert_id: String },

    #[error("Notification failed: {reason}")]
    Notification { reason: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ShiftError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound { kind, id: id.into() }
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidRoster { reason: reason.into() }
    }
}

pub type ShiftResult<T> = Result<T, ShiftError>;
