//! Error types for form rendering

use thiserror::Error;

/// Result type for form operations
pub type Result<T> = std::result::Result<T, FormsError>;

/// Errors raised at the registration boundaries of a form.
///
/// Rendering itself never fails: unregistered menus, absent defaults and
/// unmatched cascade keys all degrade to empty output.
#[derive(Debug, Error)]
pub enum FormsError {
    /// A loosely typed menu tree did not have the shape of a menu
    #[error("invalid menu for field '{field}': {reason}")]
    InvalidMenu { field: String, reason: String },

    /// Form configuration could not be parsed
    #[error("invalid form configuration: {0}")]
    InvalidConfig(#[from] serde_yaml_ng::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FormsError {
    pub(crate) fn invalid_menu(field: &str, reason: impl Into<String>) -> Self {
        FormsError::InvalidMenu {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}
