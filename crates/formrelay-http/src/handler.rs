use std::sync::Arc;

use async_trait::async_trait;
use formrelay_core::exception::Result;

use crate::request::Request;
use crate::response::Response;

/// Request handler as seen by whatever owns routing
///
/// The routing layer maps a path to a `Handler`. Both the submission path and
/// the page load path of a form go through the same handler, dispatched on
/// the request method.
#[async_trait]
pub trait Handler: Send + Sync {
	/// Handles an HTTP request and produces a response.
	///
	/// # Errors
	///
	/// Returns an error if the request cannot be processed.
	async fn handle(&self, request: Request) -> Result<Response>;
}

/// Lets `Arc<dyn Handler>` be shared across tasks and still be called as one.
#[async_trait]
impl<T: Handler + ?Sized> Handler for Arc<T> {
	async fn handle(&self, request: Request) -> Result<Response> {
		(**self).handle(request).await
	}
}
