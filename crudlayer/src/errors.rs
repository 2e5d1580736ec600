//! # Error Handling for CRUD Layers
//!
//! Every layer of the crate (repository, converter, patch merge, validation,
//! listeners, services and the HTTP controller) reports failures through the
//! single [`CrudError`] type defined here.
//!
//! - Identifier-presence violations (`Create`, `Update`, `Patch`, `Delete`) map to 400
//! - Missing records and unregistered repositories map to 404
//! - Validation failures map to 422
//! - Conversion, database and internal failures map to 500
//!
//! Internal details (database errors, conversion errors) are logged through
//! `tracing` when the error is turned into a response, and never sent to clients.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use crudlayer::CrudError;
//!
//! fn check_owner(note: &Note, user: &str) -> Result<(), CrudError> {
//!     if note.owner.as_deref() != Some(user) {
//!         return Err(CrudError::custom(StatusCode::FORBIDDEN, "Not your note", None));
//!     }
//!     Ok(())
//! }
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;
use std::fmt;
use utoipa::ToSchema;

use crate::validation::ValidationErrors;

/// Error type shared by every CRUD layer.
#[derive(Debug)]
pub enum CrudError {
    /// 404 Not Found - record or repository doesn't exist
    NotFound {
        /// Resource type (e.g., "Note")
        resource: String,
        /// Optional ID that wasn't found
        id: Option<String>,
    },

    /// 400 Bad Request - identifier present on create
    Create {
        /// User-facing error message
        message: String,
    },

    /// 400 Bad Request - identifier absent on update
    Update {
        /// User-facing error message
        message: String,
    },

    /// 400 Bad Request - identifier absent on patch
    Patch {
        /// User-facing error message
        message: String,
    },

    /// 400 Bad Request - identifier absent on delete
    Delete {
        /// User-facing error message
        message: String,
    },

    /// 400 Bad Request - malformed input outside the body (path id, paging query)
    BadRequest {
        /// User-facing error message
        message: String,
    },

    /// 409 Conflict - unique constraint violation
    Conflict {
        /// User-facing error message
        message: String,
    },

    /// 422 Unprocessable Entity - validation failed
    ValidationFailed {
        /// User-facing validation errors
        errors: Vec<String>,
    },

    /// 500 Internal Server Error - DTO/entity mapping failed
    Convert {
        /// User-facing generic message
        message: String,
        /// Conversion failure details (logged, not sent to user)
        internal: Option<String>,
    },

    /// 500 Internal Server Error - database error (details logged, not exposed)
    Database {
        /// User-facing generic message
        message: String,
        /// Internal error (logged, not sent to user)
        internal: DbErr,
    },

    /// 500 Internal Server Error - generic internal error
    Internal {
        /// User-facing generic message
        message: String,
        /// Internal error details (logged, not sent to user)
        internal: Option<String>,
    },

    /// Custom error with specific status code, mostly raised by listeners
    Custom {
        /// HTTP status code
        status: StatusCode,
        /// User-facing message
        message: String,
        /// Internal error details (logged, not sent to user)
        internal: Option<String>,
    },
}

impl CrudError {
    // ============================================================================
    // Constructors
    // ============================================================================

    /// Create a 404 Not Found error
    pub fn not_found(resource: impl Into<String>, id: Option<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id,
        }
    }

    /// Create error raised when `create` receives an object that already has an id
    pub fn create(message: impl Into<String>) -> Self {
        Self::Create {
            message: message.into(),
        }
    }

    /// Create error raised when `update` receives an object without id
    pub fn update(message: impl Into<String>) -> Self {
        Self::Update {
            message: message.into(),
        }
    }

    /// Create error raised when `patch` receives an object without id
    pub fn patch(message: impl Into<String>) -> Self {
        Self::Patch {
            message: message.into(),
        }
    }

    /// Create error raised when `delete` receives an object without id
    pub fn delete(message: impl Into<String>) -> Self {
        Self::Delete {
            message: message.into(),
        }
    }

    /// Create a 400 Bad Request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Create a 409 Conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Create a 422 Validation Failed error
    pub fn validation_failed(errors: Vec<String>) -> Self {
        Self::ValidationFailed { errors }
    }

    /// Create a conversion error. The details are logged but NOT sent to the user.
    ///
    /// # Example
    /// ```rust,ignore
    /// serde_json::to_value(&dto).map_err(|e| CrudError::convert("NoteDto", "Note", e.to_string()))?;
    /// ```
    pub fn convert(from: &str, to: &str, details: impl Into<String>) -> Self {
        Self::Convert {
            message: "Failed to convert resource".to_string(),
            internal: Some(format!("{from} -> {to}: {}", details.into())),
        }
    }

    /// Create a 500 Internal Server Error from a database error
    pub fn database(err: DbErr) -> Self {
        Self::Database {
            message: "A database error occurred".to_string(),
            internal: err,
        }
    }

    /// Create a 500 Internal Server Error with optional details
    pub fn internal(message: impl Into<String>, internal: Option<String>) -> Self {
        Self::Internal {
            message: message.into(),
            internal,
        }
    }

    /// Create a custom error with specific status code
    ///
    /// # Example
    /// ```rust,ignore
    /// return Err(CrudError::custom(StatusCode::FORBIDDEN, "Archived notes are read-only", None));
    /// ```
    pub fn custom(
        status: StatusCode,
        message: impl Into<String>,
        internal: Option<String>,
    ) -> Self {
        Self::Custom {
            status,
            message: message.into(),
            internal,
        }
    }

    // ============================================================================
    // Accessors
    // ============================================================================

    /// HTTP status code this error maps to
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Create { .. }
            | Self::Update { .. }
            | Self::Patch { .. }
            | Self::Delete { .. }
            | Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::ValidationFailed { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Convert { .. } | Self::Database { .. } | Self::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Custom { status, .. } => *status,
        }
    }

    /// User-facing error message (sanitized)
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound { resource, id } => {
                if let Some(id) = id {
                    format!("{resource} with ID '{id}' not found")
                } else {
                    format!("{resource} not found")
                }
            }
            Self::ValidationFailed { errors } => {
                if errors.len() == 1 {
                    errors[0].clone()
                } else {
                    format!("Validation failed: {}", errors.join(", "))
                }
            }
            Self::Create { message }
            | Self::Update { message }
            | Self::Patch { message }
            | Self::Delete { message }
            | Self::BadRequest { message }
            | Self::Conflict { message }
            | Self::Convert { message, .. }
            | Self::Database { message, .. }
            | Self::Internal { message, .. }
            | Self::Custom { message, .. } => message.clone(),
        }
    }

    /// Log internal error details (not sent to user)
    fn log_internal(&self) {
        match self {
            Self::Database { internal, .. } => {
                tracing::error!(error = ?internal, "Database error occurred");
            }
            Self::Convert {
                internal: Some(details),
                ..
            } => {
                tracing::error!(details = %details, "Conversion error occurred");
            }
            Self::Internal {
                internal: Some(details),
                ..
            } => {
                tracing::error!(details = %details, "Internal error occurred");
            }
            Self::Custom {
                internal: Some(details),
                status,
                ..
            } => {
                tracing::error!(status = %status, details = %details, "Custom error occurred");
            }
            _ => {
                tracing::debug!(
                    error = %self.user_message(),
                    status = %self.status_code(),
                    "CRUD error"
                );
            }
        }
    }
}

/// Error response sent to users (sanitized)
#[serde_with::skip_serializing_none]
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Optional list of validation errors
    pub details: Option<Vec<String>>,
}

impl IntoResponse for CrudError {
    fn into_response(self) -> Response {
        self.log_internal();

        let status = self.status_code();
        let response = match &self {
            Self::ValidationFailed { errors } => ErrorResponse {
                error: "Validation failed".to_string(),
                details: Some(errors.clone()),
            },
            _ => ErrorResponse {
                error: self.user_message(),
                details: None,
            },
        };

        (status, Json(response)).into_response()
    }
}

impl fmt::Display for CrudError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.user_message())
    }
}

impl std::error::Error for CrudError {}

// ============================================================================
// Conversions
// ============================================================================

/// Convert SeaORM `DbErr` to `CrudError`
///
/// - `DbErr::RecordNotFound` and `DbErr::RecordNotUpdated` become 404
/// - unique constraint violations become 409
/// - every other variant becomes a 500 whose details are only logged
impl From<DbErr> for CrudError {
    fn from(err: DbErr) -> Self {
        match &err {
            DbErr::RecordNotFound(msg) => {
                let resource = msg.split_whitespace().next().unwrap_or("Resource");
                Self::NotFound {
                    resource: resource.to_string(),
                    id: None,
                }
            }
            DbErr::RecordNotUpdated => Self::NotFound {
                resource: "Resource".to_string(),
                id: None,
            },
            _ => {
                if let Some(SqlErr::UniqueConstraintViolation(detail)) = err.sql_err() {
                    tracing::debug!(detail = %detail, "Unique constraint violation");
                    Self::Conflict {
                        message: "Resource already exists".to_string(),
                    }
                } else {
                    Self::database(err)
                }
            }
        }
    }
}

impl From<ValidationErrors> for CrudError {
    fn from(errors: ValidationErrors) -> Self {
        Self::ValidationFailed {
            errors: errors.errors().iter().map(ToString::to_string).collect(),
        }
    }
}
