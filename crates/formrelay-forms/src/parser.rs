//! Submission body parsing
//!
//! Turns an inbound POST (`application/x-www-form-urlencoded` or
//! `multipart/form-data`) into [`FormValues`]. Field names follow the path
//! convention (`metadata[0].name`) and are expanded into nested values.

use formrelay_core::exception::Error;
use formrelay_core::values::{DEFAULT_MAX_LIST_INDEX, FormValues, ValuesError};
use formrelay_http::Request;
use futures_util::{future::ready, stream::once};

/// Default maximum submission body size: 2 MiB
pub const DEFAULT_MAX_BODY_SIZE: usize = 2 * 1024 * 1024;

const URLENCODED: &str = "application/x-www-form-urlencoded";
const MULTIPART: &str = "multipart/form-data";

/// Reasons a submission cannot become form values
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
	#[error("Expected {URLENCODED} or {MULTIPART}, got '{0}'")]
	UnsupportedContentType(String),
	#[error("Form body size {size} bytes exceeds maximum allowed size of {max} bytes")]
	PayloadTooLarge { size: usize, max: usize },
	#[error("Form body is not valid UTF-8")]
	InvalidEncoding,
	#[error("Failed to decode form body: {0}")]
	Urlencoded(String),
	#[error("Failed to read multipart body: {0}")]
	Multipart(String),
	#[error(transparent)]
	Values(#[from] ValuesError),
}

impl From<ParseError> for Error {
	fn from(err: ParseError) -> Self {
		Error::MalformedInput(err.to_string())
	}
}

/// Parses request bodies and query strings into [`FormValues`]
///
/// # Examples
///
/// ```
/// use formrelay_forms::SubmissionParser;
/// use serde_json::json;
///
/// let parser = SubmissionParser::new();
/// let values = parser
///     .parse_urlencoded(b"name=Widget&metadata[0].name=color&metadata[0].value=red")
///     .unwrap();
///
/// assert_eq!(values.get("name"), Some(&json!("Widget")));
/// assert_eq!(
///     values.get("metadata"),
///     Some(&json!([{"name": "color", "value": "red"}]))
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionParser {
	max_list_index: usize,
	max_body_size: usize,
}

impl Default for SubmissionParser {
	fn default() -> Self {
		Self::new()
	}
}

impl SubmissionParser {
	pub fn new() -> Self {
		Self {
			max_list_index: DEFAULT_MAX_LIST_INDEX,
			max_body_size: DEFAULT_MAX_BODY_SIZE,
		}
	}

	pub fn with_max_list_index(mut self, max_list_index: usize) -> Self {
		self.max_list_index = max_list_index;
		self
	}

	pub fn with_max_body_size(mut self, max_body_size: usize) -> Self {
		self.max_body_size = max_body_size;
		self
	}

	pub fn max_list_index(&self) -> usize {
		self.max_list_index
	}

	pub fn max_body_size(&self) -> usize {
		self.max_body_size
	}

	/// Parse the body of a form submission
	///
	/// The content type decides the decoder; anything other than the two
	/// form encodings is rejected.
	pub async fn parse(&self, request: &Request) -> Result<FormValues, ParseError> {
		let content_type = request.content_type().unwrap_or("");

		if request.body.len() > self.max_body_size {
			return Err(ParseError::PayloadTooLarge {
				size: request.body.len(),
				max: self.max_body_size,
			});
		}

		match media_type(content_type).as_str() {
			URLENCODED => self.parse_urlencoded(&request.body),
			MULTIPART => self.parse_multipart(content_type, request.body.clone()).await,
			_ => Err(ParseError::UnsupportedContentType(content_type.to_string())),
		}
	}

	/// Parse a urlencoded body
	pub fn parse_urlencoded(&self, body: &[u8]) -> Result<FormValues, ParseError> {
		let body = std::str::from_utf8(body).map_err(|_| ParseError::InvalidEncoding)?;
		self.parse_pairs_str(body)
	}

	/// Parse a query string with the same path rules as a body
	///
	/// # Examples
	///
	/// ```
	/// use formrelay_forms::SubmissionParser;
	/// use serde_json::json;
	///
	/// let values = SubmissionParser::new().parse_query("name=Gadget%20Pro").unwrap();
	/// assert_eq!(values.get("name"), Some(&json!("Gadget Pro")));
	/// ```
	pub fn parse_query(&self, query: &str) -> Result<FormValues, ParseError> {
		self.parse_pairs_str(query)
	}

	fn parse_pairs_str(&self, input: &str) -> Result<FormValues, ParseError> {
		let pairs: Vec<(String, String)> = serde_urlencoded::from_str(input)
			.map_err(|e| ParseError::Urlencoded(e.to_string()))?;
		Ok(FormValues::from_pairs(pairs, self.max_list_index)?)
	}

	/// Parse a multipart body; only text fields are kept, file parts are skipped
	async fn parse_multipart(
		&self,
		content_type: &str,
		body: bytes::Bytes,
	) -> Result<FormValues, ParseError> {
		let boundary = multer::parse_boundary(content_type)
			.map_err(|e| ParseError::Multipart(format!("Failed to parse boundary: {}", e)))?;

		let stream = once(ready(Ok::<_, std::io::Error>(body)));
		let mut multipart = multer::Multipart::new(stream, boundary);

		let mut pairs = Vec::new();
		while let Some(field) = multipart
			.next_field()
			.await
			.map_err(|e| ParseError::Multipart(e.to_string()))?
		{
			let name = field
				.name()
				.ok_or_else(|| ParseError::Multipart("Field name missing".to_string()))?
				.to_string();

			if field.file_name().is_some() {
				tracing::debug!(field = %name, "skipping file part in form submission");
				continue;
			}

			let text = field
				.text()
				.await
				.map_err(|e| ParseError::Multipart(format!("Failed to read text field: {}", e)))?;
			pairs.push((name, text));
		}

		Ok(FormValues::from_pairs(pairs, self.max_list_index)?)
	}
}

/// Lowercased media type without parameters
fn media_type(content_type: &str) -> String {
	content_type
		.split(';')
		.next()
		.unwrap_or("")
		.trim()
		.to_ascii_lowercase()
}
