//! Submission handling
//!
//! Every POST ends in a redirect back to the form page. What differs is what
//! was stored for the following GET and which status the submission is
//! reported with:
//!
//! | outcome              | record written        | submission status |
//! |----------------------|-----------------------|-------------------|
//! | valid                | accepted values       | 303               |
//! | invalid              | errors + input        | 303               |
//! | malformed body       | none                  | 400               |
//! | validator/store fault| none                  | 500               |

use formrelay_conf::RelaySettings;
use formrelay_core::exception::Error;
use formrelay_core::record::TransientRecord;
use formrelay_forms::{SubmissionParser, Validate};
use formrelay_http::{RedirectInstruction, Request, StatusCode};
use formrelay_store::{SessionToken, TransientStore};
use std::sync::Arc;

use crate::cookies::{presented_token, token_cookie};

/// Turns one POST into one [`RedirectInstruction`]
pub struct SubmissionHandler {
	settings: Arc<RelaySettings>,
	store: Arc<dyn TransientStore>,
	validator: Arc<dyn Validate>,
	parser: SubmissionParser,
}

impl SubmissionHandler {
	pub fn new(
		settings: Arc<RelaySettings>,
		store: Arc<dyn TransientStore>,
		validator: Arc<dyn Validate>,
	) -> Self {
		let parser = SubmissionParser::new()
			.with_max_list_index(settings.max_list_index)
			.with_max_body_size(settings.max_body_size);
		Self {
			settings,
			store,
			validator,
			parser,
		}
	}

	pub fn settings(&self) -> &RelaySettings {
		&self.settings
	}

	/// Handle a submission
	///
	/// Never fails: every path, including internal faults, redirects to the
	/// form page.
	pub async fn handle(&self, request: &Request) -> RedirectInstruction {
		let token = presented_token(request, &self.settings)
			.and_then(|raw| SessionToken::parse(&raw))
			.unwrap_or_else(SessionToken::generate);
		tracing::debug!(token = %token.redacted(), "form submission received");

		let values = match self.parser.parse(request).await {
			Ok(values) => values,
			Err(e) => {
				tracing::warn!(token = %token.redacted(), error = %e, "malformed form submission");
				return self.redirect().with_submission_status(StatusCode::BAD_REQUEST);
			}
		};
		tracing::debug!(token = %token.redacted(), fields = values.len(), "submission parsed");

		let submitted = values.clone();
		let outcome = match self.validator.validate(values) {
			Ok(outcome) => outcome,
			Err(e) => return self.server_error(&token, &e),
		};
		tracing::debug!(
			token = %token.redacted(),
			valid = outcome.is_valid(),
			errors = outcome.errors().len(),
			"submission validated"
		);

		let record = TransientRecord::from_outcome(outcome, Some(submitted));
		if let Err(e) = self.persist(&token, &record).await {
			return self.server_error(&token, &e);
		}
		tracing::debug!(token = %token.redacted(), "submission outcome persisted");

		match self
			.redirect()
			.with_cookie(&token_cookie(&self.settings, &token))
		{
			Ok(instruction) => instruction,
			Err(e) => self.server_error(&token, &e),
		}
	}

	async fn persist(&self, token: &SessionToken, record: &TransientRecord) -> Result<(), Error> {
		let payload = record.encode()?;
		self.store
			.write(token, payload, self.settings.record_ttl())
			.await?;
		Ok(())
	}

	fn redirect(&self) -> RedirectInstruction {
		RedirectInstruction::see_other(self.settings.form_path.as_str())
	}

	fn server_error(&self, token: &SessionToken, error: &Error) -> RedirectInstruction {
		tracing::error!(
			token = %token.redacted(),
			kind = error.kind(),
			error = %error,
			"form submission failed; redirecting without a record"
		);
		self.redirect()
			.with_submission_status(StatusCode::INTERNAL_SERVER_ERROR)
	}
}
