//! Validation Support
//!
//! The services never run validation rules themselves. They ask a [`Validator`]
//! to check an object under a [`ValidationProfile`]:
//!
//! - the controller validates request bodies with the profile of the HTTP verb
//!   (`Create` for POST, `Update` for PUT, `Patch` for PATCH, `Delete` for DELETE)
//! - `patch` re-validates the merged record with the `Update` profile before saving
//!
//! Types usually implement [`Validatable`] and are plugged in with [`SelfValidation`].
//!
//! # Example
//!
//! ```rust,ignore
//! use crudlayer::validation::{Validatable, ValidationErrors, ValidationProfile, validators};
//!
//! impl Validatable for Note {
//!     fn validate(&self, profile: ValidationProfile) -> Result<(), ValidationErrors> {
//!         let mut errors = ValidationErrors::new();
//!         if profile != ValidationProfile::Patch {
//!             if let Err(e) = validators::validate_required("title", self.title.as_deref().unwrap_or("")) {
//!                 errors.add(e);
//!             }
//!         }
//!         errors.result()
//!     }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;

/// Group of constraints to check, picked by the operation being performed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationProfile {
    Create,
    Update,
    Patch,
    Delete,
}

/// Validation error with field name and message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    /// The field that failed validation
    pub field: String,
    /// Human-readable error message
    pub message: String,
}

impl ValidationError {
    /// Create a new validation error
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Collection of validation errors
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    #[must_use]
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Record the error of a single check, if any
    pub fn check(&mut self, result: Result<(), ValidationError>) {
        if let Err(error) = result {
            self.add(error);
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    #[must_use]
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Convert to Result
    ///
    /// # Errors
    ///
    /// Returns `self` when at least one error was recorded.
    pub fn result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validation failed with {} error(s):", self.errors.len())?;
        for error in &self.errors {
            write!(f, "\n  - {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Trait for types that can validate themselves
pub trait Validatable {
    /// Validate the instance against the constraints of `profile`
    ///
    /// # Errors
    ///
    /// Returns every violated constraint.
    fn validate(&self, profile: ValidationProfile) -> Result<(), ValidationErrors>;
}

/// Validation collaborator consumed by services and controllers
pub trait Validator<T>: Send + Sync {
    /// # Errors
    ///
    /// Returns every violated constraint of `object` under `profile`.
    fn validate(&self, object: &T, profile: ValidationProfile) -> Result<(), ValidationErrors>;
}

/// Accepts everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoValidation;

impl<T> Validator<T> for NoValidation {
    fn validate(&self, _object: &T, _profile: ValidationProfile) -> Result<(), ValidationErrors> {
        Ok(())
    }
}

/// Delegates to the object's own [`Validatable`] impl
pub struct SelfValidation<T>(PhantomData<fn(&T)>);

impl<T> SelfValidation<T> {
    #[must_use]
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for SelfValidation<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Validatable> Validator<T> for SelfValidation<T> {
    fn validate(&self, object: &T, profile: ValidationProfile) -> Result<(), ValidationErrors> {
        object.validate(profile)
    }
}

/// Helper validators for common patterns
pub mod validators {
    use super::ValidationError;
    use std::fmt;

    /// Validate string length is within range
    ///
    /// # Errors
    ///
    /// Returns an error when the length is outside `min..=max`.
    pub fn validate_length(
        field: &str,
        value: &str,
        min: Option<usize>,
        max: Option<usize>,
    ) -> Result<(), ValidationError> {
        let len = value.chars().count();

        if let Some(min_len) = min {
            if len < min_len {
                return Err(ValidationError::new(
                    field,
                    format!("Must be at least {min_len} characters"),
                ));
            }
        }

        if let Some(max_len) = max {
            if len > max_len {
                return Err(ValidationError::new(
                    field,
                    format!("Must be at most {max_len} characters"),
                ));
            }
        }

        Ok(())
    }

    /// Validate number is within range
    ///
    /// # Errors
    ///
    /// Returns an error when `value` is outside `min..=max`.
    pub fn validate_range<T: PartialOrd + fmt::Display>(
        field: &str,
        value: T,
        min: Option<T>,
        max: Option<T>,
    ) -> Result<(), ValidationError> {
        if let Some(min_val) = min {
            if value < min_val {
                return Err(ValidationError::new(
                    field,
                    format!("Must be at least {min_val}"),
                ));
            }
        }

        if let Some(max_val) = max {
            if value > max_val {
                return Err(ValidationError::new(
                    field,
                    format!("Must be at most {max_val}"),
                ));
            }
        }

        Ok(())
    }

    /// Validate value is present and not blank
    ///
    /// # Errors
    ///
    /// Returns an error for `None` and whitespace-only strings.
    pub fn validate_required(field: &str, value: Option<&str>) -> Result<(), ValidationError> {
        match value {
            Some(v) if !v.trim().is_empty() => Ok(()),
            _ => Err(ValidationError::new(field, "This field is required")),
        }
    }

    /// Validate value is absent
    ///
    /// # Errors
    ///
    /// Returns an error for `Some(_)`.
    pub fn validate_absent<T>(field: &str, value: Option<&T>) -> Result<(), ValidationError> {
        if value.is_some() {
            return Err(ValidationError::new(field, "This field must not be set"));
        }
        Ok(())
    }
}
