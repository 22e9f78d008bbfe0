//! Product form used by the server-integration page
//!
//! A product has a name and any number of name/value metadata rows. Both the
//! name and every cell of every row are required.

use formrelay_conf::RelaySettings;
use formrelay_core::path::FieldPath;
use formrelay_core::values::FormValues;
use formrelay_forms::{FormValidator, is_blank, required};
use formrelay_store::TransientStore;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;

use crate::view::FormRelayView;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Product {
	pub name: String,
	pub metadata: Vec<Metadata>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Metadata {
	pub name: String,
	pub value: String,
}

/// Values of an empty product form
pub fn product_defaults() -> FormValues {
	let mut values = FormValues::new();
	values.insert("name", Value::String(String::new()));
	values.insert("metadata", json!([]));
	values
}

/// Server-side rules for the product form
///
/// # Examples
///
/// ```
/// use formrelay_core::FormValues;
/// use formrelay_forms::Validate;
/// use formrelay_views::product::product_validator;
/// use serde_json::json;
///
/// let mut values = FormValues::new();
/// values.insert("name", json!(""));
/// values.insert("metadata", json!([{"name": "", "value": "x"}]));
///
/// let outcome = product_validator().validate(values).unwrap();
/// let messages: Vec<_> = outcome.errors().iter().map(|e| e.message.as_str()).collect();
/// assert_eq!(
///     messages,
///     vec![
///         "Server validation: Name is required",
///         "Server validation: Metadata name 0 is required",
///     ]
/// );
/// ```
pub fn product_validator() -> FormValidator {
	let metadata = FieldPath::key("metadata");
	FormValidator::new()
		.field(
			FieldPath::key("name"),
			required("Server validation: Name is required"),
		)
		.each(metadata.clone(), "name", |idx, value| {
			is_blank(value).then(|| format!("Server validation: Metadata name {} is required", idx))
		})
		.each(metadata, "value", |idx, value| {
			is_blank(value).then(|| format!("Server validation: Metadata value {} is required", idx))
		})
}

/// The product form page, ready to mount at `settings.form_path`
pub fn product_view(settings: RelaySettings, store: Arc<dyn TransientStore>) -> FormRelayView {
	FormRelayView::new(
		settings,
		store,
		Arc::new(product_validator()),
		product_defaults(),
	)
}
