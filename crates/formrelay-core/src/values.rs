//! Submitted form values
//!
//! [`FormValues`] is an insertion-ordered JSON object. Flat `(name, value)`
//! pairs from a request body are expanded into nested records and lists by
//! interpreting each name as a [`FieldPath`].

use crate::exception::Error;
use crate::path::{FieldPath, PathError, PathSegment};
use crate::validation::FORM_LEVEL_KEY;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Default upper bound for list indices accepted from a submission
pub const DEFAULT_MAX_LIST_INDEX: usize = 1000;

/// Errors raised while building [`FormValues`] from request pairs
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValuesError {
	#[error(transparent)]
	Path(#[from] PathError),
	#[error("field '{0}' is used both as a value and as a container")]
	Conflict(String),
	#[error("index {index} in field '{path}' exceeds the maximum of {max}")]
	IndexTooLarge {
		path: String,
		index: usize,
		max: usize,
	},
	#[error("field '{path}' leaves more than {max} empty list slots in the submission")]
	TooManyHoles { path: String, max: usize },
	#[error("field name '{0}' is reserved for form-level errors")]
	ReservedName(String),
}

impl From<ValuesError> for Error {
	fn from(err: ValuesError) -> Self {
		Error::MalformedInput(err.to_string())
	}
}

/// Ordered mapping from field name to value
///
/// # Examples
///
/// ```
/// use formrelay_core::{FieldPath, FormValues};
/// use serde_json::json;
///
/// let values = FormValues::from_pairs(
///     vec![
///         ("name".to_string(), "Widget".to_string()),
///         ("metadata[0].name".to_string(), "color".to_string()),
///         ("metadata[0].value".to_string(), "red".to_string()),
///     ],
///     100,
/// )
/// .unwrap();
///
/// assert_eq!(
///     serde_json::to_value(&values).unwrap(),
///     json!({"name": "Widget", "metadata": [{"name": "color", "value": "red"}]})
/// );
/// let path: FieldPath = "metadata[0].value".parse().unwrap();
/// assert_eq!(values.get_path(&path), Some(&json!("red")));
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormValues(Map<String, Value>);

impl FormValues {
	/// Create an empty set of values
	pub fn new() -> Self {
		Self(Map::new())
	}

	/// Wrap an existing JSON object
	pub fn from_map(map: Map<String, Value>) -> Self {
		Self(map)
	}

	/// Borrow the underlying JSON object
	pub fn as_map(&self) -> &Map<String, Value> {
		&self.0
	}

	/// Unwrap into the underlying JSON object
	pub fn into_map(self) -> Map<String, Value> {
		self.0
	}

	/// Number of top-level fields
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Whether no field is present
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Top-level field lookup
	pub fn get(&self, key: &str) -> Option<&Value> {
		self.0.get(key)
	}

	/// Set a top-level field, replacing any previous value
	pub fn insert(&mut self, key: impl Into<String>, value: Value) {
		self.0.insert(key.into(), value);
	}

	/// Iterate top-level fields in insertion order
	pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
		self.0.iter()
	}

	/// Build values from flat `(field name, value)` pairs
	///
	/// Later pairs for the same scalar path win. List indices above
	/// `max_list_index` are rejected, and list holes left by sparse indices
	/// are filled with empty records. The holes of all lists together may not
	/// exceed `max_list_index` either. A top-level field named
	/// [`FORM_LEVEL_KEY`] is rejected.
	pub fn from_pairs<I>(pairs: I, max_list_index: usize) -> Result<Self, ValuesError>
	where
		I: IntoIterator<Item = (String, String)>,
	{
		let mut values = Self::new();
		let mut holes_left = max_list_index;
		for (name, value) in pairs {
			let path = FieldPath::parse(&name)?;
			if matches!(path.segments().first(), Some(PathSegment::Key(key)) if key == FORM_LEVEL_KEY)
			{
				return Err(ValuesError::ReservedName(name));
			}
			values.assign_within(&path, Value::String(value), max_list_index, &mut holes_left)?;
		}
		for value in values.0.values_mut() {
			fill_holes(value);
		}
		Ok(values)
	}

	/// Assign `value` at `path`, creating intermediate records and lists
	pub fn set_path(
		&mut self,
		path: &FieldPath,
		value: Value,
		max_list_index: usize,
	) -> Result<(), ValuesError> {
		let mut holes_left = max_list_index;
		self.assign_within(path, value, max_list_index, &mut holes_left)
	}

	fn assign_within(
		&mut self,
		path: &FieldPath,
		value: Value,
		max_list_index: usize,
		holes_left: &mut usize,
	) -> Result<(), ValuesError> {
		let mut root = Value::Object(std::mem::take(&mut self.0));
		let limits = ListLimits {
			max_index: max_list_index,
			holes_left,
		};
		let result = assign(&mut root, path.segments(), value, limits, path);
		if let Value::Object(map) = root {
			self.0 = map;
		}
		result
	}

	/// Resolve a nested value
	pub fn get_path(&self, path: &FieldPath) -> Option<&Value> {
		let (first, rest) = path.segments().split_first()?;
		let mut current = match first {
			PathSegment::Key(key) => self.0.get(key)?,
			PathSegment::Index(_) => return None,
		};
		for segment in rest {
			current = match segment {
				PathSegment::Key(key) => current.get(key.as_str())?,
				PathSegment::Index(index) => current.get(*index)?,
			};
		}
		Some(current)
	}

	/// Return a copy where every top-level field of `overrides` replaces ours
	///
	/// # Examples
	///
	/// ```
	/// use formrelay_core::FormValues;
	/// use serde_json::json;
	///
	/// let mut defaults = FormValues::new();
	/// defaults.insert("name", json!(""));
	/// defaults.insert("metadata", json!([]));
	///
	/// let mut query = FormValues::new();
	/// query.insert("name", json!("Widget"));
	///
	/// let merged = defaults.overlaid_with(query);
	/// assert_eq!(merged.get("name"), Some(&json!("Widget")));
	/// assert_eq!(merged.get("metadata"), Some(&json!([])));
	/// ```
	pub fn overlaid_with(mut self, overrides: FormValues) -> Self {
		for (key, value) in overrides.0 {
			self.0.insert(key, value);
		}
		self
	}

	/// Serialize a typed form model into values
	pub fn from_typed<T: Serialize>(model: &T) -> crate::Result<Self> {
		match serde_json::to_value(model) {
			Ok(Value::Object(map)) => Ok(Self(map)),
			Ok(other) => Err(Error::Serialization(format!(
				"form model must serialize to an object, got {}",
				kind_of(&other)
			))),
			Err(e) => Err(Error::Serialization(e.to_string())),
		}
	}

	/// Deserialize values into a typed form model
	pub fn into_typed<T: DeserializeOwned>(self) -> crate::Result<T> {
		serde_json::from_value(Value::Object(self.0))
			.map_err(|e| Error::Deserialization(e.to_string()))
	}
}

impl From<Map<String, Value>> for FormValues {
	fn from(map: Map<String, Value>) -> Self {
		Self(map)
	}
}

struct ListLimits<'a> {
	max_index: usize,
	holes_left: &'a mut usize,
}

fn assign(
	target: &mut Value,
	segments: &[PathSegment],
	leaf: Value,
	limits: ListLimits<'_>,
	path: &FieldPath,
) -> Result<(), ValuesError> {
	let Some((head, tail)) = segments.split_first() else {
		if target.is_object() || target.is_array() {
			return Err(ValuesError::Conflict(path.to_string()));
		}
		*target = leaf;
		return Ok(());
	};

	match head {
		PathSegment::Key(key) => {
			if target.is_null() {
				*target = Value::Object(Map::new());
			}
			let Value::Object(map) = target else {
				return Err(ValuesError::Conflict(path.to_string()));
			};
			let child = map.entry(key.clone()).or_insert(Value::Null);
			assign(child, tail, leaf, limits, path)
		}
		PathSegment::Index(index) => {
			if *index > limits.max_index {
				return Err(ValuesError::IndexTooLarge {
					path: path.to_string(),
					index: *index,
					max: limits.max_index,
				});
			}
			if target.is_null() {
				*target = Value::Array(Vec::new());
			}
			let Value::Array(items) = target else {
				return Err(ValuesError::Conflict(path.to_string()));
			};
			if items.len() <= *index {
				let holes = *index - items.len();
				if holes > *limits.holes_left {
					return Err(ValuesError::TooManyHoles {
						path: path.to_string(),
						max: limits.max_index,
					});
				}
				*limits.holes_left -= holes;
				items.resize(*index + 1, Value::Null);
			}
			assign(&mut items[*index], tail, leaf, limits, path)
		}
	}
}

fn fill_holes(value: &mut Value) {
	match value {
		Value::Array(items) => {
			for item in items.iter_mut() {
				if item.is_null() {
					*item = Value::Object(Map::new());
				} else {
					fill_holes(item);
				}
			}
		}
		Value::Object(map) => {
			for child in map.values_mut() {
				fill_holes(child);
			}
		}
		_ => {}
	}
}

fn kind_of(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "a boolean",
		Value::Number(_) => "a number",
		Value::String(_) => "a string",
		Value::Array(_) => "an array",
		Value::Object(_) => "an object",
	}
}
