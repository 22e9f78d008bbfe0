use bytes::Bytes;
use formrelay_core::exception::{Error, Result};
use hyper::header::{HeaderName, HeaderValue};
use hyper::{HeaderMap, StatusCode};
use serde::Serialize;

/// HTTP Response representation
#[derive(Debug, Clone)]
pub struct Response {
	pub status: StatusCode,
	pub headers: HeaderMap,
	pub body: Bytes,
}

impl Response {
	/// Create a new Response with the given status code
	///
	/// # Examples
	///
	/// ```
	/// use formrelay_http::Response;
	/// use hyper::StatusCode;
	///
	/// let response = Response::new(StatusCode::OK);
	/// assert_eq!(response.status, StatusCode::OK);
	/// assert!(response.body.is_empty());
	/// ```
	pub fn new(status: StatusCode) -> Self {
		Self {
			status,
			headers: HeaderMap::new(),
			body: Bytes::new(),
		}
	}

	pub fn ok() -> Self {
		Self::new(StatusCode::OK)
	}

	pub fn method_not_allowed() -> Self {
		Self::new(StatusCode::METHOD_NOT_ALLOWED)
	}

	/// Create a Response with HTTP 303 See Other
	///
	/// The browser follows a 303 with a GET regardless of the original
	/// method, which is what Post-Redirect-Get relies on.
	///
	/// # Examples
	///
	/// ```
	/// use formrelay_http::Response;
	/// use hyper::StatusCode;
	///
	/// let response = Response::see_other("/server-integration");
	/// assert_eq!(response.status, StatusCode::SEE_OTHER);
	/// assert_eq!(
	///     response.headers.get("location").unwrap().to_str().unwrap(),
	///     "/server-integration"
	/// );
	/// ```
	pub fn see_other(location: impl AsRef<str>) -> Self {
		Self::new(StatusCode::SEE_OTHER).with_location(location.as_ref())
	}

	pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
		self.body = body.into();
		self
	}

	/// Set a header, replacing previous values; invalid input is ignored
	pub fn with_header(mut self, name: &str, value: &str) -> Self {
		if let (Ok(name), Ok(value)) = (
			HeaderName::from_bytes(name.as_bytes()),
			HeaderValue::from_str(value),
		) {
			self.headers.insert(name, value);
		}
		self
	}

	pub fn with_location(mut self, location: &str) -> Self {
		if let Ok(value) = HeaderValue::from_str(location) {
			self.headers.insert(hyper::header::LOCATION, value);
		}
		self
	}

	/// Set the body to JSON and add the matching Content-Type
	///
	/// # Examples
	///
	/// ```
	/// use formrelay_http::Response;
	/// use serde_json::json;
	///
	/// let response = Response::ok().with_json(&json!({"ok": true})).unwrap();
	/// assert_eq!(
	///     response.headers.get("content-type").unwrap().to_str().unwrap(),
	///     "application/json"
	/// );
	/// assert_eq!(&response.body[..], br#"{"ok":true}"#);
	/// ```
	pub fn with_json<T: Serialize>(mut self, data: &T) -> Result<Self> {
		let body = serde_json::to_vec(data).map_err(|e| Error::Serialization(e.to_string()))?;
		self.headers.insert(
			hyper::header::CONTENT_TYPE,
			HeaderValue::from_static("application/json"),
		);
		self.body = Bytes::from(body);
		Ok(self)
	}

	/// All `Set-Cookie` values, in order
	pub fn set_cookies(&self) -> Vec<&str> {
		self.headers
			.get_all(hyper::header::SET_COOKIE)
			.iter()
			.filter_map(|v| v.to_str().ok())
			.collect()
	}
}
