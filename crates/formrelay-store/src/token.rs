//! Session tokens naming transient records

use std::fmt;
use uuid::Uuid;

/// Longest token accepted from a client
pub const MAX_TOKEN_LEN: usize = 128;

/// Opaque key of one browser session's transient record
///
/// # Examples
///
/// ```
/// use formrelay_store::SessionToken;
///
/// let minted = SessionToken::generate();
/// assert_eq!(minted.as_str().len(), 36);
///
/// assert!(SessionToken::parse("abc_DEF-123").is_some());
/// assert!(SessionToken::parse("").is_none());
/// assert!(SessionToken::parse("no spaces").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionToken(String);

impl SessionToken {
	/// Mint a fresh random token
	pub fn generate() -> Self {
		Self(Uuid::new_v4().to_string())
	}

	/// Accept a client-supplied token if it is well-formed
	pub fn parse(raw: &str) -> Option<Self> {
		let well_formed = !raw.is_empty()
			&& raw.len() <= MAX_TOKEN_LEN
			&& raw
				.bytes()
				.all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
		well_formed.then(|| Self(raw.to_string()))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Short prefix for log lines
	pub fn redacted(&self) -> String {
		let prefix: String = self.0.chars().take(8).collect();
		format!("{}...", prefix)
	}
}

impl fmt::Display for SessionToken {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl AsRef<str> for SessionToken {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
