//! Server-side validation rules
//!
//! A [`FormValidator`] is a list of independent rules. Every rule runs on
//! every submission and the collected errors decide the outcome, so a user
//! sees all problems after one round trip.

use formrelay_core::exception::Result;
use formrelay_core::path::FieldPath;
use formrelay_core::validation::{ValidationError, ValidationOutcome};
use formrelay_core::values::FormValues;
use serde_json::Value;

/// Something that can judge a submission
///
/// `Err` is reserved for faults inside the validator itself. A submission
/// that breaks the rules is `Ok(ValidationOutcome::Invalid(..))`.
pub trait Validate: Send + Sync {
	fn validate(&self, values: FormValues) -> Result<ValidationOutcome>;
}

impl<F> Validate for F
where
	F: Fn(FormValues) -> Result<ValidationOutcome> + Send + Sync,
{
	fn validate(&self, values: FormValues) -> Result<ValidationOutcome> {
		self(values)
	}
}

type FieldRule = Box<dyn Fn(&Value) -> Option<String> + Send + Sync>;
type ItemRule = Box<dyn Fn(usize, &Value) -> Option<String> + Send + Sync>;
type FormRule = Box<dyn Fn(&FormValues) -> Option<ValidationError> + Send + Sync>;

enum Rule {
	Field {
		path: FieldPath,
		check: FieldRule,
	},
	Each {
		list: FieldPath,
		key: String,
		check: ItemRule,
	},
	Form(FormRule),
}

/// Rule engine keyed by field path
///
/// # Examples
///
/// ```
/// use formrelay_core::{FieldPath, FormValues, ValidationOutcome};
/// use formrelay_forms::{FormValidator, Validate, required};
/// use serde_json::json;
///
/// let validator = FormValidator::new()
///     .field(FieldPath::key("name"), required("Name is required"))
///     .each(FieldPath::key("tags"), "label", |idx, value| {
///         formrelay_forms::is_blank(value).then(|| format!("Tag {} needs a label", idx))
///     });
///
/// let mut values = FormValues::new();
/// values.insert("name", json!(""));
/// values.insert("tags", json!([{"label": "a"}, {"label": ""}]));
///
/// let outcome = validator.validate(values).unwrap();
/// let fields: Vec<_> = outcome.errors().iter().map(|e| e.field.as_str()).collect();
/// assert_eq!(fields, vec!["name", "tags[1].label"]);
/// ```
#[derive(Default)]
pub struct FormValidator {
	rules: Vec<Rule>,
}

impl FormValidator {
	pub fn new() -> Self {
		Self::default()
	}

	/// Add a rule for the value at `path`
	///
	/// An absent field is checked as `null`.
	pub fn field<F>(mut self, path: FieldPath, check: F) -> Self
	where
		F: Fn(&Value) -> Option<String> + Send + Sync + 'static,
	{
		self.rules.push(Rule::Field {
			path,
			check: Box::new(check),
		});
		self
	}

	/// Add a rule for `key` of every record in the list at `list`
	///
	/// The check receives the item index so messages can name the row.
	/// Errors target `list[idx].key`. A missing list has no items.
	pub fn each<F>(mut self, list: FieldPath, key: impl Into<String>, check: F) -> Self
	where
		F: Fn(usize, &Value) -> Option<String> + Send + Sync + 'static,
	{
		self.rules.push(Rule::Each {
			list,
			key: key.into(),
			check: Box::new(check),
		});
		self
	}

	/// Add a rule over the whole submission
	///
	/// Return [`ValidationError::form_level`] for errors that belong to no
	/// single field.
	pub fn form_rule<F>(mut self, check: F) -> Self
	where
		F: Fn(&FormValues) -> Option<ValidationError> + Send + Sync + 'static,
	{
		self.rules.push(Rule::Form(Box::new(check)));
		self
	}

	pub fn rule_count(&self) -> usize {
		self.rules.len()
	}

	/// Run every rule and collect the errors in registration order
	pub fn errors(&self, values: &FormValues) -> Vec<ValidationError> {
		let mut errors = Vec::new();

		for rule in &self.rules {
			match rule {
				Rule::Field { path, check } => {
					let value = values.get_path(path).unwrap_or(&Value::Null);
					if let Some(message) = check(value) {
						errors.push(ValidationError::new(path, message));
					}
				}
				Rule::Each { list, key, check } => {
					let Some(Value::Array(items)) = values.get_path(list) else {
						continue;
					};
					for (idx, item) in items.iter().enumerate() {
						let value = item.get(key.as_str()).unwrap_or(&Value::Null);
						if let Some(message) = check(idx, value) {
							let path = list.clone().with_index(idx).with_key(key.clone());
							errors.push(ValidationError::new(&path, message));
						}
					}
				}
				Rule::Form(check) => {
					if let Some(error) = check(values) {
						errors.push(error);
					}
				}
			}
		}

		errors
	}
}

impl Validate for FormValidator {
	fn validate(&self, values: FormValues) -> Result<ValidationOutcome> {
		let errors = self.errors(&values);
		Ok(ValidationOutcome::from_errors(values, errors))
	}
}

/// Whether a value counts as not filled in
///
/// # Examples
///
/// ```
/// use formrelay_forms::is_blank;
/// use serde_json::json;
///
/// assert!(is_blank(&json!(null)));
/// assert!(is_blank(&json!("")));
/// assert!(is_blank(&json!([])));
/// assert!(!is_blank(&json!(" ")));
/// assert!(!is_blank(&json!(0)));
/// ```
pub fn is_blank(value: &Value) -> bool {
	match value {
		Value::Null => true,
		Value::String(s) => s.is_empty(),
		Value::Array(items) => items.is_empty(),
		Value::Object(map) => map.is_empty(),
		Value::Bool(_) | Value::Number(_) => false,
	}
}

/// Fails when the value is blank
pub fn required(message: &str) -> impl Fn(&Value) -> Option<String> + Send + Sync + use<> {
	let message = message.to_string();
	move |value| is_blank(value).then(|| message.clone())
}

/// Fails when a string value is longer than `max` characters
///
/// Non-string values pass; pair it with [`required`] when presence matters.
pub fn max_length(
	max: usize,
	message: &str,
) -> impl Fn(&Value) -> Option<String> + Send + Sync + use<> {
	let message = message.to_string();
	move |value| match value {
		Value::String(s) if s.chars().count() > max => Some(message.clone()),
		_ => None,
	}
}
