use crate::model::source::SourceKind;
use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PresenceError {
    /// Missing upload, wrong extension, oversize body, malformed query
    #[error("Invalid request: {0}")]
    Validation(String),

    /// The spreadsheet could not be read
    #[error("Failed to process file: {0}")]
    Parse(String),

    /// Replacing one source's snapshot failed. When `snapshot_intact` is false
    /// the source may now be empty or partially written.
    #[error("Failed to store {dataset} records: {cause}")]
    Persistence {
        dataset: SourceKind,
        cause: String,
        snapshot_intact: bool,
    },

    /// Reading the snapshots or deriving summaries failed
    #[error("Failed to calculate presence: {0}")]
    Computation(String),
}

impl PresenceError {
    fn message(&self) -> &'static str {
        match self {
            PresenceError::Validation(_) => "Invalid request",
            PresenceError::Parse(_) => "Failed to process file",
            PresenceError::Persistence { .. } => "Failed to store records",
            PresenceError::Computation(_) => "Failed to calculate presence",
        }
    }
}

impl ResponseError for PresenceError {
    fn status_code(&self) -> StatusCode {
        match self {
            PresenceError::Validation(_) => StatusCode::BAD_REQUEST,
            PresenceError::Parse(_) => StatusCode::UNPROCESSABLE_ENTITY,
            PresenceError::Persistence { .. } | PresenceError::Computation(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            PresenceError::Validation(cause)
            | PresenceError::Parse(cause)
            | PresenceError::Computation(cause) => json!({
                "error": self.message(),
                "cause": cause,
            }),
            PresenceError::Persistence {
                dataset,
                cause,
                snapshot_intact,
            } => json!({
                "error": self.message(),
                "cause": cause,
                "source": dataset,
                "snapshotIntact": snapshot_intact,
            }),
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}
