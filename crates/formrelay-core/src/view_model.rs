//! The value handed to rendering

use crate::path::FieldPath;
use crate::validation::ValidationError;
use crate::values::FormValues;
use serde::{Deserialize, Serialize};

/// Values plus errors, independent of how they were recovered
///
/// A render binder populates widgets from `values` and shows each entry of
/// `errors` next to the widget whose path equals the error's field.
///
/// # Examples
///
/// ```
/// use formrelay_core::{FieldPath, FormValues, ValidationError, ViewModel};
/// use serde_json::json;
///
/// let mut values = FormValues::new();
/// values.insert("name", json!(""));
/// let name = FieldPath::key("name");
///
/// let view = ViewModel::new(values, vec![ValidationError::new(&name, "Name is required")]);
/// assert!(view.has_errors());
/// assert_eq!(view.errors_for(&name), vec!["Name is required"]);
/// assert_eq!(view.value_at(&name), Some(&json!("")));
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ViewModel {
	pub values: FormValues,
	pub errors: Vec<ValidationError>,
}

impl ViewModel {
	pub fn new(values: FormValues, errors: Vec<ValidationError>) -> Self {
		Self { values, errors }
	}

	/// Values with no errors attached
	pub fn clean(values: FormValues) -> Self {
		Self::new(values, Vec::new())
	}

	pub fn has_errors(&self) -> bool {
		!self.errors.is_empty()
	}

	/// Messages for exactly `path`, in the order they were produced
	pub fn errors_for(&self, path: &FieldPath) -> Vec<&str> {
		let field = path.to_string();
		self.errors
			.iter()
			.filter(|e| e.field == field)
			.map(|e| e.message.as_str())
			.collect()
	}

	/// Form-level messages
	pub fn form_errors(&self) -> Vec<&str> {
		self.errors
			.iter()
			.filter(|e| e.is_form_level())
			.map(|e| e.message.as_str())
			.collect()
	}

	pub fn value_at(&self, path: &FieldPath) -> Option<&serde_json::Value> {
		self.values.get_path(path)
	}
}
