use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Validation,
}

/// Error body returned by the status feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Why a single launch event record could not be turned into a `LaunchEvent`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("missing `status`")]
    MissingStatus,
    #[error("`status` must be a string, got {0}")]
    StatusNotString(String),
    #[error("missing `statusAt`")]
    MissingStatusAt,
    #[error("unparseable `statusAt` {0}")]
    InvalidStatusAt(String),
}
