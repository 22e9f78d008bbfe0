use formrelay_core::{FieldPath, FormValues, ValidationOutcome};
use formrelay_forms::{FormValidator, Validate, is_blank, required};
use proptest::prelude::*;
use serde_json::{Value, json};

fn validator() -> FormValidator {
	FormValidator::new()
		.field(FieldPath::key("name"), required("Name is required"))
		.each(FieldPath::key("metadata"), "name", |idx, value| {
			is_blank(value).then(|| format!("Metadata name {} is required", idx))
		})
		.each(FieldPath::key("metadata"), "value", |idx, value| {
			is_blank(value).then(|| format!("Metadata value {} is required", idx))
		})
}

fn submission(name: String, metadata: Vec<(String, String)>) -> FormValues {
	let mut values = FormValues::new();
	values.insert("name", Value::String(name));
	values.insert(
		"metadata",
		Value::Array(
			metadata
				.into_iter()
				.map(|(name, value)| json!({"name": name, "value": value}))
				.collect(),
		),
	);
	values
}

proptest! {
	#[test]
	fn prop_valid_submission_is_returned_unchanged(
		name in "[a-zA-Z0-9 ]{1,24}",
		metadata in proptest::collection::vec(("[a-z]{1,8}", "[a-z0-9]{1,8}"), 0..6),
	) {
		let input = submission(name, metadata);

		let outcome = validator().validate(input.clone()).unwrap();

		prop_assert_eq!(outcome, ValidationOutcome::Valid(input));
	}

	#[test]
	fn prop_one_error_per_blank_item(
		blanks in proptest::collection::vec(any::<bool>(), 0..8),
	) {
		let metadata = blanks
			.iter()
			.map(|blank| {
				let name = if *blank { String::new() } else { "n".to_string() };
				(name, "v".to_string())
			})
			.collect();
		let input = submission("Widget".to_string(), metadata);

		let outcome = validator().validate(input).unwrap();

		let expected: Vec<String> = blanks
			.iter()
			.enumerate()
			.filter(|(_, blank)| **blank)
			.map(|(idx, _)| format!("metadata[{}].name", idx))
			.collect();
		let fields: Vec<String> = outcome.errors().iter().map(|e| e.field.clone()).collect();
		prop_assert_eq!(fields, expected);
	}
}
