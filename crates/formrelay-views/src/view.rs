use async_trait::async_trait;
use formrelay_conf::RelaySettings;
use formrelay_core::exception::Result;
use formrelay_core::values::FormValues;
use formrelay_forms::Validate;
use formrelay_http::{Handler, Method, Request, Response};
use formrelay_store::TransientStore;
use std::sync::Arc;

use crate::loader::StateLoader;
use crate::submission::SubmissionHandler;

/// One form page: GET renders state, POST submits
///
/// Mount it at [`RelaySettings::form_path`]. GET and HEAD answer with the
/// JSON view-model; POST always answers with a redirect.
///
/// # Examples
///
/// ```
/// use formrelay_conf::RelaySettings;
/// use formrelay_core::FormValues;
/// use formrelay_forms::FormValidator;
/// use formrelay_http::{Handler, Request, StatusCode};
/// use formrelay_store::MemoryTransientStore;
/// use formrelay_views::FormRelayView;
/// use std::sync::Arc;
///
/// # #[tokio::main]
/// # async fn main() {
/// let view = FormRelayView::new(
///     RelaySettings::default(),
///     Arc::new(MemoryTransientStore::new()),
///     Arc::new(FormValidator::new()),
///     FormValues::new(),
/// );
///
/// let request = Request::builder().uri("/server-integration").build().unwrap();
/// let response = view.handle(request).await.unwrap();
/// assert_eq!(response.status, StatusCode::OK);
/// # }
/// ```
pub struct FormRelayView {
	submission: SubmissionHandler,
	loader: StateLoader,
}

impl FormRelayView {
	pub fn new(
		settings: RelaySettings,
		store: Arc<dyn TransientStore>,
		validator: Arc<dyn Validate>,
		defaults: FormValues,
	) -> Self {
		let settings = Arc::new(settings);
		Self {
			submission: SubmissionHandler::new(Arc::clone(&settings), Arc::clone(&store), validator),
			loader: StateLoader::new(settings, store, defaults),
		}
	}

	pub fn submission(&self) -> &SubmissionHandler {
		&self.submission
	}

	pub fn loader(&self) -> &StateLoader {
		&self.loader
	}
}

#[async_trait]
impl Handler for FormRelayView {
	async fn handle(&self, request: Request) -> Result<Response> {
		match request.method {
			Method::GET => self.loader.load(&request).await.into_response(),
			Method::HEAD => {
				let response = self.loader.load(&request).await.into_response()?;
				Ok(response.with_body(Vec::new()))
			}
			Method::POST => Ok(self.submission.handle(&request).await.into_response()),
			_ => Ok(Response::method_not_allowed().with_header("allow", "GET, HEAD, POST")),
		}
	}
}
