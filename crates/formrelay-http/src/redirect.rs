//! Redirect instructions
//!
//! A submission handler never writes a response itself. It returns a
//! [`RedirectInstruction`] and the HTTP layer turns it into a response.

use formrelay_core::exception::{Error, Result};
use hyper::header::HeaderValue;
use hyper::{HeaderMap, StatusCode};

use crate::cookie::SetCookie;
use crate::response::Response;

/// Header reporting the submission outcome when it differs from the redirect
pub const SUBMISSION_STATUS_HEADER: &str = "x-submission-status";

/// Where to send the browser after a POST, and what to attach
///
/// `status` is always a GET-converting redirect. `submission_status` records
/// how the submission itself went: 303 for a handled submission (valid or
/// not), 400 for an unparsable body, 500 when the outcome could not be
/// persisted.
///
/// # Examples
///
/// ```
/// use formrelay_http::RedirectInstruction;
/// use formrelay_http::cookie::SetCookie;
/// use hyper::StatusCode;
///
/// let instruction = RedirectInstruction::see_other("/server-integration")
///     .with_cookie(&SetCookie::new("form-state", "token"))
///     .unwrap();
///
/// let response = instruction.into_response();
/// assert_eq!(response.status, StatusCode::SEE_OTHER);
/// assert_eq!(response.set_cookies(), vec!["form-state=token; Path=/; HttpOnly"]);
/// assert!(response.headers.get("x-submission-status").is_none());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RedirectInstruction {
	pub location: String,
	pub status: StatusCode,
	pub submission_status: StatusCode,
	pub headers: HeaderMap,
}

impl RedirectInstruction {
	/// 303 redirect to `location` with nothing attached
	pub fn see_other(location: impl Into<String>) -> Self {
		Self {
			location: location.into(),
			status: StatusCode::SEE_OTHER,
			submission_status: StatusCode::SEE_OTHER,
			headers: HeaderMap::new(),
		}
	}

	/// Record an elevated status for the submission
	pub fn with_submission_status(mut self, status: StatusCode) -> Self {
		self.submission_status = status;
		self
	}

	/// Attach a `Set-Cookie` header
	pub fn with_cookie(mut self, cookie: &SetCookie) -> Result<Self> {
		let value = HeaderValue::from_str(&cookie.to_string()).map_err(|e| {
			Error::Internal(format!("Failed to create cookie header: {}", e))
		})?;
		self.headers.append(hyper::header::SET_COOKIE, value);
		Ok(self)
	}

	/// Attached `Set-Cookie` values
	pub fn cookies(&self) -> Vec<&str> {
		self.headers
			.get_all(hyper::header::SET_COOKIE)
			.iter()
			.filter_map(|v| v.to_str().ok())
			.collect()
	}

	/// Build the redirect response
	///
	/// Only cookie headers are forwarded. An elevated submission status is
	/// reported in [`SUBMISSION_STATUS_HEADER`] since the response status has
	/// to stay a redirect for the browser to follow it.
	pub fn into_response(self) -> Response {
		let mut response = Response::new(self.status).with_location(&self.location);
		for value in self.headers.get_all(hyper::header::SET_COOKIE) {
			response
				.headers
				.append(hyper::header::SET_COOKIE, value.clone());
		}
		if self.submission_status != self.status {
			response = response.with_header(
				SUBMISSION_STATUS_HEADER,
				self.submission_status.as_str(),
			);
		}
		response
	}
}
