//! Error types for pms
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad args, unknown role/view/task, invalid config)
//! - 3: Access denied by the role gate
//! - 4: Operation failed (I/O, terminal, serialization)

use serde_json::json;
use thiserror::Error;

/// Exit codes for the pms CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const ACCESS_DENIED: i32 = 3;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for pms operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("Unknown view: {0}")]
    UnknownView(String),

    #[error("Task not found: {0}")]
    TaskNotFound(u64),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Story not found: {0}")]
    StoryNotFound(u64),

    #[error("Phase not found: {0}")]
    PhaseNotFound(u32),

    #[error("Deliverable not found: {0}")]
    DeliverableNotFound(String),

    #[error("KPI not found: {0}")]
    KpiNotFound(String),

    #[error("Permission not found: {0}")]
    PermissionNotFound(String),

    // Role gate (exit code 3)
    #[error("Access denied: role {role} cannot {action}")]
    AccessDenied { role: String, action: String },

    // Operation failures (exit code 4)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {endpoint} returned status {status}")]
    Api { endpoint: String, status: u16 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            // User errors
            Error::InvalidConfig(_)
            | Error::InvalidArgument(_)
            | Error::UnknownRole(_)
            | Error::UnknownView(_)
            | Error::TaskNotFound(_)
            | Error::ColumnNotFound(_)
            | Error::StoryNotFound(_)
            | Error::PhaseNotFound(_)
            | Error::DeliverableNotFound(_)
            | Error::KpiNotFound(_)
            | Error::PermissionNotFound(_) => exit_codes::USER_ERROR,

            // Role gate
            Error::AccessDenied { .. } => exit_codes::ACCESS_DENIED,

            // Operation failures
            Error::Http(_)
            | Error::Api { .. }
            | Error::Io(_)
            | Error::Json(_)
            | Error::TomlParse(_)
            | Error::TomlSerialize(_)
            | Error::OperationFailed(_) => exit_codes::OPERATION_FAILED,
        }
    }

    /// Structured extras for JSON error output
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::AccessDenied { role, action } => Some(json!({
                "role": role,
                "action": action,
            })),
            Error::Api { endpoint, status } => Some(json!({
                "endpoint": endpoint,
                "status": status,
            })),
            Error::TaskNotFound(id) | Error::StoryNotFound(id) => Some(json!({ "id": id })),
            Error::PhaseNotFound(id) => Some(json!({ "id": id })),
            Error::ColumnNotFound(id)
            | Error::DeliverableNotFound(id)
            | Error::KpiNotFound(id)
            | Error::PermissionNotFound(id) => Some(json!({ "id": id })),
            Error::UnknownRole(value) | Error::UnknownView(value) => {
                Some(json!({ "value": value }))
            }
            Error::InvalidConfig(message) => Some(json!({ "message": message })),
            _ => None,
        }
    }

    pub(crate) fn access_denied(role: crate::role::Role, action: impl Into<String>) -> Self {
        Error::AccessDenied {
            role: role.as_str().to_string(),
            action: action.into(),
        }
    }
}

/// Result type alias for pms operations
pub type Result<T> = std::result::Result<T, Error>;

/// Wrapper for displaying errors in JSON format
#[derive(serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&Error> for JsonError {
    fn from(err: &Error) -> Self {
        JsonError {
            error: err.to_string(),
            code: err.exit_code(),
            details: err.details(),
        }
    }
}
