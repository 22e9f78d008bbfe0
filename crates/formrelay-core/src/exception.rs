//! Error taxonomy shared by every formrelay crate.
//!
//! Validation failures are deliberately absent from this enum: they travel as
//! [`ValidationOutcome::Invalid`](crate::ValidationOutcome::Invalid) and are
//! never surfaced as an `Err`.

/// Errors raised while relaying a form submission across a redirect
#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// The submission body could not be turned into form values
	#[error("Malformed input: {0}")]
	MalformedInput(String),
	/// The transient store could not be read or written
	#[error("Persistence error: {0}")]
	Persistence(String),
	/// A stored record exists but cannot be parsed
	#[error("Deserialization error: {0}")]
	Deserialization(String),
	/// Record or view-model serialization failed
	#[error("Serialization error: {0}")]
	Serialization(String),
	/// Settings could not be loaded or are inconsistent
	#[error("Configuration error: {0}")]
	Configuration(String),
	/// Anything else, e.g. a validator fault or an unbuildable header
	#[error("Internal error: {0}")]
	Internal(String),
}

impl Error {
	/// Short, stable name of the error class, used as a structured log field
	///
	/// # Examples
	///
	/// ```
	/// use formrelay_core::exception::Error;
	///
	/// let err = Error::MalformedInput("bad body".to_string());
	/// assert_eq!(err.kind(), "malformed_input");
	/// ```
	pub fn kind(&self) -> &'static str {
		match self {
			Self::MalformedInput(_) => "malformed_input",
			Self::Persistence(_) => "persistence",
			Self::Deserialization(_) => "deserialization",
			Self::Serialization(_) => "serialization",
			Self::Configuration(_) => "configuration",
			Self::Internal(_) => "internal",
		}
	}
}

/// Result alias used across the workspace
pub type Result<T> = std::result::Result<T, Error>;
