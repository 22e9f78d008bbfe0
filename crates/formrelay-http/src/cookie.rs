//! Cookie parsing and `Set-Cookie` construction

use std::fmt;
use std::time::{Duration, SystemTime};

/// Find a cookie value in a single `Cookie` header
///
/// # Examples
///
/// ```
/// use formrelay_http::cookie::find_cookie;
///
/// assert_eq!(find_cookie("a=1; b=2", "b"), Some("2".to_string()));
/// assert_eq!(find_cookie("a=1; b=2", "c"), None);
/// ```
pub fn find_cookie(header: &str, name: &str) -> Option<String> {
	header.split(';').find_map(|pair| {
		let (key, value) = pair.trim().split_once('=')?;
		(key.trim() == name).then(|| value.trim().trim_matches('"').to_string())
	})
}

/// `SameSite` cookie attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
	Strict,
	Lax,
	None,
}

impl SameSite {
	/// Parse a configured value, case-insensitively
	///
	/// # Examples
	///
	/// ```
	/// use formrelay_http::cookie::SameSite;
	///
	/// assert_eq!(SameSite::parse("lax"), Some(SameSite::Lax));
	/// assert_eq!(SameSite::parse("STRICT"), Some(SameSite::Strict));
	/// assert_eq!(SameSite::parse("sometimes"), None);
	/// ```
	pub fn parse(value: &str) -> Option<Self> {
		match value.to_ascii_lowercase().as_str() {
			"strict" => Some(Self::Strict),
			"lax" => Some(Self::Lax),
			"none" => Some(Self::None),
			_ => None,
		}
	}
}

impl fmt::Display for SameSite {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let value = match self {
			Self::Strict => "Strict",
			Self::Lax => "Lax",
			Self::None => "None",
		};
		f.write_str(value)
	}
}

/// A `Set-Cookie` header under construction
///
/// # Examples
///
/// ```
/// use formrelay_http::cookie::{SameSite, SetCookie};
/// use std::time::Duration;
///
/// let cookie = SetCookie::new("form-state", "abc")
///     .with_path("/")
///     .with_max_age(Duration::from_secs(300))
///     .with_same_site(SameSite::Lax);
///
/// assert_eq!(
///     cookie.to_string(),
///     "form-state=abc; Path=/; HttpOnly; SameSite=Lax; Max-Age=300"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCookie {
	name: String,
	value: String,
	path: String,
	domain: Option<String>,
	max_age: Option<Duration>,
	expires: Option<SystemTime>,
	secure: bool,
	same_site: Option<SameSite>,
}

impl SetCookie {
	/// Create an HttpOnly cookie scoped to `/`
	pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			value: value.into(),
			path: "/".to_string(),
			domain: None,
			max_age: None,
			expires: None,
			secure: false,
			same_site: None,
		}
	}

	/// Cookie that instructs the browser to drop `name`
	///
	/// # Examples
	///
	/// ```
	/// use formrelay_http::cookie::SetCookie;
	///
	/// let cookie = SetCookie::removal("form-state", "/");
	/// assert_eq!(
	///     cookie.to_string(),
	///     "form-state=; Path=/; HttpOnly; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT"
	/// );
	/// ```
	pub fn removal(name: impl Into<String>, path: impl Into<String>) -> Self {
		Self::new(name, "")
			.with_path(path)
			.with_max_age(Duration::ZERO)
			.with_expires(SystemTime::UNIX_EPOCH)
	}

	pub fn with_path(mut self, path: impl Into<String>) -> Self {
		self.path = path.into();
		self
	}

	pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
		self.domain = Some(domain.into());
		self
	}

	pub fn with_max_age(mut self, max_age: Duration) -> Self {
		self.max_age = Some(max_age);
		self
	}

	pub fn with_expires(mut self, expires: SystemTime) -> Self {
		self.expires = Some(expires);
		self
	}

	pub fn with_secure(mut self, secure: bool) -> Self {
		self.secure = secure;
		self
	}

	pub fn with_same_site(mut self, same_site: SameSite) -> Self {
		self.same_site = Some(same_site);
		self
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn value(&self) -> &str {
		&self.value
	}
}

impl fmt::Display for SetCookie {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut parts = vec![format!("{}={}", self.name, self.value)];

		parts.push(format!("Path={}", self.path));

		if let Some(domain) = &self.domain {
			parts.push(format!("Domain={}", domain));
		}

		parts.push("HttpOnly".to_string());

		if self.secure {
			parts.push("Secure".to_string());
		}

		if let Some(same_site) = &self.same_site {
			parts.push(format!("SameSite={}", same_site));
		}

		if let Some(max_age) = self.max_age {
			parts.push(format!("Max-Age={}", max_age.as_secs()));
		}

		if let Some(expires) = self.expires {
			parts.push(format!("Expires={}", httpdate::fmt_http_date(expires)));
		}

		f.write_str(&parts.join("; "))
	}
}
