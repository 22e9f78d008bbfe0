//! HTTP plumbing for formrelay
//!
//! Request and response types built on `hyper`, cookie handling, the
//! [`RedirectInstruction`] returned by submission handlers and the
//! [`Handler`] trait the routing layer calls into.

pub mod cookie;
pub mod handler;
pub mod redirect;
pub mod request;
pub mod response;

pub use cookie::{SameSite, SetCookie};
pub use handler::Handler;
pub use redirect::{RedirectInstruction, SUBMISSION_STATUS_HEADER};
pub use request::{Request, RequestBuilder};
pub use response::Response;

// Re-exported so callers match the types used in public fields
pub use hyper::{HeaderMap, Method, StatusCode};
