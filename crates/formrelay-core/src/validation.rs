//! Validation results

use crate::path::FieldPath;
use crate::values::FormValues;
use serde::{Deserialize, Serialize};

/// Special field key for form-level (non-field-specific) errors.
///
/// [`FormValues::from_pairs`](crate::FormValues::from_pairs) refuses a
/// submitted top-level field of this name.
pub const FORM_LEVEL_KEY: &str = "_all";

/// One message attached to a field path, or to the whole form
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValidationError {
	/// Canonical field path, or [`FORM_LEVEL_KEY`]
	pub field: String,
	/// Human-readable message
	pub message: String,
}

impl ValidationError {
	/// Create an error targeting a field path
	///
	/// # Examples
	///
	/// ```
	/// use formrelay_core::{FieldPath, ValidationError};
	///
	/// let path = FieldPath::key("metadata").with_index(0).with_key("name");
	/// let error = ValidationError::new(&path, "Name is required");
	/// assert_eq!(error.field, "metadata[0].name");
	/// assert!(!error.is_form_level());
	/// ```
	pub fn new(path: &FieldPath, message: impl Into<String>) -> Self {
		Self {
			field: path.to_string(),
			message: message.into(),
		}
	}

	/// Create an error for the whole form
	pub fn form_level(message: impl Into<String>) -> Self {
		Self {
			field: FORM_LEVEL_KEY.to_string(),
			message: message.into(),
		}
	}

	/// Whether the error targets the form rather than a field
	pub fn is_form_level(&self) -> bool {
		self.field == FORM_LEVEL_KEY
	}

	/// Whether the error targets exactly `path`
	pub fn targets(&self, path: &FieldPath) -> bool {
		self.field == path.to_string()
	}
}

/// Result of running a validator over one submission
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationOutcome {
	/// Every rule passed; the accepted values are returned unchanged
	Valid(FormValues),
	/// At least one rule failed
	Invalid(Vec<ValidationError>),
}

impl ValidationOutcome {
	/// Build an outcome from aggregated errors
	///
	/// The outcome is `Invalid` iff `errors` is non-empty.
	///
	/// # Examples
	///
	/// ```
	/// use formrelay_core::{FormValues, ValidationError, ValidationOutcome};
	///
	/// let outcome = ValidationOutcome::from_errors(FormValues::new(), Vec::new());
	/// assert!(outcome.is_valid());
	///
	/// let outcome = ValidationOutcome::from_errors(
	///     FormValues::new(),
	///     vec![ValidationError::form_level("Nope")],
	/// );
	/// assert!(!outcome.is_valid());
	/// ```
	pub fn from_errors(values: FormValues, errors: Vec<ValidationError>) -> Self {
		if errors.is_empty() {
			Self::Valid(values)
		} else {
			Self::Invalid(errors)
		}
	}

	/// Whether the outcome is `Valid`
	pub fn is_valid(&self) -> bool {
		matches!(self, Self::Valid(_))
	}

	/// Errors of an `Invalid` outcome, empty otherwise
	pub fn errors(&self) -> &[ValidationError] {
		match self {
			Self::Valid(_) => &[],
			Self::Invalid(errors) => errors,
		}
	}
}
