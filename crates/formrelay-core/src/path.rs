//! Field paths
//!
//! Form fields are named with a dotted/indexed convention so that nested
//! records and lists survive a flat `name=value` encoding:
//! `name`, `metadata[2].name`, `grid[0][1]`.

use std::fmt;
use std::str::FromStr;

/// One step of a [`FieldPath`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
	/// Named member of a record
	Key(String),
	/// Position within a list
	Index(usize),
}

/// Errors produced while parsing a field name into a [`FieldPath`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
	#[error("field path is empty")]
	Empty,
	#[error("empty key in field path '{0}'")]
	EmptyKey(String),
	#[error("unterminated index in field path '{0}'")]
	UnterminatedIndex(String),
	#[error("invalid index '{index}' in field path '{path}'")]
	InvalidIndex { path: String, index: String },
	#[error("unexpected character '{ch}' in field path '{path}'")]
	UnexpectedChar { path: String, ch: char },
}

/// Parsed field name
///
/// A path always starts with a key; indices may follow any key.
///
/// # Examples
///
/// ```
/// use formrelay_core::{FieldPath, PathSegment};
///
/// let path: FieldPath = "metadata[2].name".parse().unwrap();
/// assert_eq!(
///     path.segments(),
///     &[
///         PathSegment::Key("metadata".to_string()),
///         PathSegment::Index(2),
///         PathSegment::Key("name".to_string()),
///     ]
/// );
/// assert_eq!(path.to_string(), "metadata[2].name");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
	segments: Vec<PathSegment>,
}

impl FieldPath {
	/// Create a path consisting of a single key
	pub fn key(name: impl Into<String>) -> Self {
		Self {
			segments: vec![PathSegment::Key(name.into())],
		}
	}

	/// Append a key segment
	///
	/// # Examples
	///
	/// ```
	/// use formrelay_core::FieldPath;
	///
	/// let path = FieldPath::key("metadata").with_index(0).with_key("value");
	/// assert_eq!(path.to_string(), "metadata[0].value");
	/// ```
	pub fn with_key(mut self, name: impl Into<String>) -> Self {
		self.segments.push(PathSegment::Key(name.into()));
		self
	}

	/// Append an index segment
	pub fn with_index(mut self, index: usize) -> Self {
		self.segments.push(PathSegment::Index(index));
		self
	}

	/// Path segments in order
	pub fn segments(&self) -> &[PathSegment] {
		&self.segments
	}

	/// Parse a field name
	///
	/// # Examples
	///
	/// ```
	/// use formrelay_core::FieldPath;
	///
	/// assert!(FieldPath::parse("grid[0][1]").is_ok());
	/// assert!(FieldPath::parse("metadata[").is_err());
	/// assert!(FieldPath::parse("[0]").is_err());
	/// assert!(FieldPath::parse("a..b").is_err());
	/// ```
	pub fn parse(input: &str) -> Result<Self, PathError> {
		if input.is_empty() {
			return Err(PathError::Empty);
		}

		let mut segments = Vec::new();
		for part in input.split('.') {
			let (key, mut rest) = match part.find('[') {
				Some(pos) => (&part[..pos], &part[pos..]),
				None => (part, ""),
			};
			if key.is_empty() {
				return Err(PathError::EmptyKey(input.to_string()));
			}
			if key.contains(']') {
				return Err(PathError::UnexpectedChar {
					path: input.to_string(),
					ch: ']',
				});
			}
			segments.push(PathSegment::Key(key.to_string()));

			while !rest.is_empty() {
				let Some(inner) = rest.strip_prefix('[') else {
					let ch = rest.chars().next().unwrap_or(']');
					return Err(PathError::UnexpectedChar {
						path: input.to_string(),
						ch,
					});
				};
				let Some(end) = inner.find(']') else {
					return Err(PathError::UnterminatedIndex(input.to_string()));
				};
				let raw = &inner[..end];
				if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
					return Err(PathError::InvalidIndex {
						path: input.to_string(),
						index: raw.to_string(),
					});
				}
				let index = raw.parse::<usize>().map_err(|_| PathError::InvalidIndex {
					path: input.to_string(),
					index: raw.to_string(),
				})?;
				segments.push(PathSegment::Index(index));
				rest = &inner[end + 1..];
			}
		}

		Ok(Self { segments })
	}
}

impl fmt::Display for FieldPath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for (i, segment) in self.segments.iter().enumerate() {
			match segment {
				PathSegment::Key(key) if i == 0 => write!(f, "{}", key)?,
				PathSegment::Key(key) => write!(f, ".{}", key)?,
				PathSegment::Index(index) => write!(f, "[{}]", index)?,
			}
		}
		Ok(())
	}
}

impl FromStr for FieldPath {
	type Err = PathError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s)
	}
}
