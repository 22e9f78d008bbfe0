//! HTTP module.
//!
//! Requests, responses, cookies and redirect instructions.

pub use formrelay_http::*;
