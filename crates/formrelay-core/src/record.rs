//! Transient records
//!
//! A [`TransientRecord`] is what crosses the redirect: the outcome of one
//! submission, serialized as JSON under the session's store key.

use crate::exception::{Error, Result};
use crate::validation::{ValidationError, ValidationOutcome};
use crate::values::FormValues;
use serde::{Deserialize, Serialize};

/// Outcome of one submission, as persisted between POST and GET
///
/// # Examples
///
/// ```
/// use formrelay_core::{FormValues, TransientRecord};
/// use serde_json::json;
///
/// let mut values = FormValues::new();
/// values.insert("name", json!("Widget"));
///
/// let record = TransientRecord::Valid { values };
/// let payload = record.encode().unwrap();
/// assert_eq!(payload, r#"{"outcome":"valid","values":{"name":"Widget"}}"#);
/// assert_eq!(TransientRecord::decode(&payload).unwrap(), record);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TransientRecord {
	/// Accepted values
	Valid { values: FormValues },
	/// Errors, plus the rejected input when it could be kept
	Invalid {
		errors: Vec<ValidationError>,
		#[serde(default, skip_serializing_if = "Option::is_none")]
		values: Option<FormValues>,
	},
}

impl TransientRecord {
	/// Build a record from a validation outcome
	///
	/// `submitted` is the input that was validated; it is attached to
	/// `Invalid` records so the user does not lose what they typed.
	pub fn from_outcome(outcome: ValidationOutcome, submitted: Option<FormValues>) -> Self {
		match outcome {
			ValidationOutcome::Valid(values) => Self::Valid { values },
			ValidationOutcome::Invalid(errors) => Self::Invalid {
				errors,
				values: submitted,
			},
		}
	}

	/// Serialize to the JSON payload stored under the session key
	pub fn encode(&self) -> Result<String> {
		serde_json::to_string(self).map_err(|e| Error::Serialization(e.to_string()))
	}

	/// Parse a stored payload
	pub fn decode(payload: &str) -> Result<Self> {
		serde_json::from_str(payload).map_err(|e| Error::Deserialization(e.to_string()))
	}
}
