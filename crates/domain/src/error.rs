//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`InkSyncError`] via `#[from]`.

use std::fmt;

use crate::automation::ActionKind;

/// Top-level error shared by the domain, application and adapter layers.
#[derive(Debug, thiserror::Error)]
pub enum InkSyncError {
    /// A config or automation failed schema validation.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// A looked-up item does not exist.
    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// An action could not be carried out.
    #[error("action execution error")]
    Execution(#[from] ExecutionError),

    /// A suspended run was cancelled.
    #[error("cancelled")]
    Cancelled(#[from] CancelledError),

    /// A persistence adapter failed.
    #[error("storage error")]
    Storage(Box<dyn std::error::Error + Send + Sync>),
}

/// Invariant violations detected when validating automations or configs.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// A name field was blank.
    #[error("name must not be empty")]
    EmptyName,

    /// Two automations in one snapshot share an id.
    #[error("duplicate automation id {0}")]
    DuplicateId(String),

    /// A `pcOnly` action was placed in an autonomous automation.
    #[error("action {action} requires a PC and cannot run in an autonomous automation")]
    PcOnlyAction { action: ActionKind },

    /// A trigger or action config did not satisfy its schema.
    #[error("{subject}: {}", FieldErrors(.errors))]
    InvalidConfig {
        /// What was validated, e.g. `"trigger key_press"` or `"action #2 stop_if"`.
        subject: String,
        errors: Vec<FieldError>,
    },

    /// A calendar event was malformed.
    #[error("invalid calendar event: {0}")]
    InvalidCalendarEvent(&'static str),

    /// A device event referenced an unknown module, key or knob.
    #[error("invalid device event: {0}")]
    InvalidDeviceEvent(String),

    /// A path segment supplied by a client was unsafe or malformed.
    #[error("invalid identifier {0:?}")]
    InvalidIdentifier(String),
}

/// A single field-level schema violation.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct FieldError {
    pub field: String,
    pub reason: FieldErrorReason,
}

impl FieldError {
    #[must_use]
    pub fn new(field: impl Into<String>, reason: FieldErrorReason) -> Self {
        Self {
            field: field.into(),
            reason,
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.reason)
    }
}

/// Why a field failed validation.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldErrorReason {
    Missing,
    NotANumber,
    BelowMin { min: f64 },
    AboveMax { max: f64 },
    NotAnOption { options: Vec<String> },
    NotABoolean,
    InvalidUrl,
    InvalidJson,
    /// The value is well-typed but structurally wrong (e.g. a malformed mapping list).
    Malformed { detail: String },
}

impl fmt::Display for FieldErrorReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => f.write_str("is required"),
            Self::NotANumber => f.write_str("must be a number"),
            Self::BelowMin { min } => write!(f, "must be >= {min}"),
            Self::AboveMax { max } => write!(f, "must be <= {max}"),
            Self::NotAnOption { options } => write!(f, "must be one of {}", options.join(", ")),
            Self::NotABoolean => f.write_str("must be true or false"),
            Self::InvalidUrl => f.write_str("must be an http(s) URL"),
            Self::InvalidJson => f.write_str("must be valid JSON"),
            Self::Malformed { detail } => write!(f, "is malformed: {detail}"),
        }
    }
}

struct FieldErrors<'a>(&'a [FieldError]);

impl fmt::Display for FieldErrors<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, err) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str("; ")?;
            }
            err.fmt(f)?;
        }
        Ok(())
    }
}

/// A lookup that found nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// Failures raised while executing an action against an external collaborator.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExecutionError {
    /// The PC endpoint could not be reached.
    #[error("PC endpoint unreachable: {0}")]
    Unreachable(String),

    /// The PC endpoint refused the primitive.
    #[error("PC endpoint rejected the request: {0}")]
    Rejected(String),

    /// A shell command ran but failed.
    #[error("command exited with status {exit_code}: {stderr}")]
    CommandFailed { exit_code: i32, stderr: String },

    /// The outbound HTTP request failed at the transport level.
    #[error("HTTP request failed: {0}")]
    Transport(String),

    /// The outbound HTTP request timed out.
    #[error("HTTP request timed out after {0} ms")]
    Timeout(u64),

    /// The outbound HTTP request returned a non-success status.
    #[error("HTTP request returned status {status}")]
    HttpStatus { status: u16 },
}

/// A run was cancelled while suspended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cancelled")]
pub struct CancelledError;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_render_invalid_config_with_all_field_errors() {
        let err = ValidationError::InvalidConfig {
            subject: "action #1 stop_if".to_string(),
            errors: vec![
                FieldError::new("variable1", FieldErrorReason::Missing),
                FieldError::new("value", FieldErrorReason::AboveMax { max: 1.0 }),
            ],
        };
        assert_eq!(
            err.to_string(),
            "action #1 stop_if: variable1 is required; value must be <= 1"
        );
    }

    #[test]
    fn should_convert_typed_errors_into_inksync_error() {
        let err: InkSyncError = NotFoundError {
            entity: "Automation",
            id: "x".to_string(),
        }
        .into();
        assert!(matches!(err, InkSyncError::NotFound(_)));

        let err: InkSyncError = CancelledError.into();
        assert!(matches!(err, InkSyncError::Cancelled(_)));
    }

    #[test]
    fn should_display_not_found_error() {
        let err = NotFoundError {
            entity: "Module",
            id: "2".to_string(),
        };
        assert_eq!(err.to_string(), "Module 2 not found");
    }
}
