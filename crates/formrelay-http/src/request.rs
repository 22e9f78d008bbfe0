use bytes::Bytes;
use formrelay_core::exception::{Error, Result};
use hyper::{HeaderMap, Method, Uri, Version};

use crate::cookie::find_cookie;

/// HTTP request as seen by the submission handler and the state loader
///
/// Request-scoped data is passed explicitly; nothing is read from
/// process-wide state.
#[derive(Debug, Clone)]
pub struct Request {
	pub method: Method,
	pub uri: Uri,
	pub version: Version,
	pub headers: HeaderMap,
	pub body: Bytes,
}

impl Request {
	/// Create a request from its parts
	pub fn new(method: Method, uri: Uri, version: Version, headers: HeaderMap, body: Bytes) -> Self {
		Self {
			method,
			uri,
			version,
			headers,
			body,
		}
	}

	/// Start building a request
	///
	/// # Examples
	///
	/// ```
	/// use formrelay_http::Request;
	/// use hyper::Method;
	///
	/// let request = Request::builder()
	///     .method(Method::POST)
	///     .uri("/server-integration?x=1")
	///     .header("content-type", "application/x-www-form-urlencoded")
	///     .body("name=Widget")
	///     .build()
	///     .unwrap();
	///
	/// assert_eq!(request.path(), "/server-integration");
	/// assert_eq!(request.query_string(), Some("x=1"));
	/// assert_eq!(request.content_type(), Some("application/x-www-form-urlencoded"));
	/// ```
	pub fn builder() -> RequestBuilder {
		RequestBuilder::default()
	}

	pub fn path(&self) -> &str {
		self.uri.path()
	}

	pub fn query_string(&self) -> Option<&str> {
		self.uri.query()
	}

	/// `Content-Type` header value, if present and valid ASCII
	pub fn content_type(&self) -> Option<&str> {
		self.headers
			.get(hyper::header::CONTENT_TYPE)
			.and_then(|v| v.to_str().ok())
	}

	/// Value of the named cookie from the `Cookie` header(s)
	///
	/// # Examples
	///
	/// ```
	/// use formrelay_http::Request;
	///
	/// let request = Request::builder()
	///     .uri("/")
	///     .header("cookie", "theme=dark; form-state=abc123")
	///     .build()
	///     .unwrap();
	///
	/// assert_eq!(request.cookie("form-state"), Some("abc123".to_string()));
	/// assert_eq!(request.cookie("missing"), None);
	/// ```
	pub fn cookie(&self, name: &str) -> Option<String> {
		self.headers
			.get_all(hyper::header::COOKIE)
			.iter()
			.filter_map(|v| v.to_str().ok())
			.find_map(|header| find_cookie(header, name))
	}
}

/// Builder for [`Request`]
#[derive(Debug)]
pub struct RequestBuilder {
	method: Method,
	uri: String,
	version: Version,
	headers: HeaderMap,
	body: Bytes,
	error: Option<String>,
}

impl Default for RequestBuilder {
	fn default() -> Self {
		Self {
			method: Method::GET,
			uri: "/".to_string(),
			version: Version::HTTP_11,
			headers: HeaderMap::new(),
			body: Bytes::new(),
			error: None,
		}
	}
}

impl RequestBuilder {
	pub fn method(mut self, method: Method) -> Self {
		self.method = method;
		self
	}

	pub fn uri(mut self, uri: impl Into<String>) -> Self {
		self.uri = uri.into();
		self
	}

	pub fn version(mut self, version: Version) -> Self {
		self.version = version;
		self
	}

	/// Replace all headers
	pub fn headers(mut self, headers: HeaderMap) -> Self {
		self.headers = headers;
		self
	}

	/// Append one header; an invalid name or value fails the final `build`
	pub fn header(mut self, name: &str, value: &str) -> Self {
		let name = hyper::header::HeaderName::from_bytes(name.as_bytes());
		let value = hyper::header::HeaderValue::from_str(value);
		match (name, value) {
			(Ok(name), Ok(value)) => {
				self.headers.append(name, value);
			}
			(Err(e), _) => self.error = Some(format!("invalid header name: {}", e)),
			(_, Err(e)) => self.error = Some(format!("invalid header value: {}", e)),
		}
		self
	}

	pub fn body(mut self, body: impl Into<Bytes>) -> Self {
		self.body = body.into();
		self
	}

	pub fn build(self) -> Result<Request> {
		if let Some(error) = self.error {
			return Err(Error::Internal(error));
		}
		let uri = self
			.uri
			.parse::<Uri>()
			.map_err(|e| Error::Internal(format!("invalid request URI '{}': {}", self.uri, e)))?;
		Ok(Request::new(
			self.method,
			uri,
			self.version,
			self.headers,
			self.body,
		))
	}
}
