//! Page load after the redirect
//!
//! The loader consumes whatever the preceding submission left in the store
//! and merges it with the raw data of the GET into a [`ViewModel`].

use formrelay_conf::RelaySettings;
use formrelay_core::exception::Result;
use formrelay_core::record::TransientRecord;
use formrelay_core::validation::ValidationError;
use formrelay_core::values::FormValues;
use formrelay_core::view_model::ViewModel;
use formrelay_forms::SubmissionParser;
use formrelay_http::{Request, Response, SetCookie};
use formrelay_store::{SessionToken, TransientStore};
use std::sync::Arc;

use crate::cookies::{clear_token_cookie, presented_token};

/// What was recovered from the store for this page load
#[derive(Debug, Clone, PartialEq)]
pub enum Recovered {
	/// The last submission was accepted
	Valid(FormValues),
	/// The last submission was rejected
	Invalid {
		errors: Vec<ValidationError>,
		values: Option<FormValues>,
	},
	/// A record existed but could not be decoded
	Unparseable,
	/// No token, no record, or the record expired
	Absent,
}

impl From<TransientRecord> for Recovered {
	fn from(record: TransientRecord) -> Self {
		match record {
			TransientRecord::Valid { values } => Self::Valid(values),
			TransientRecord::Invalid { errors, values } => Self::Invalid { errors, values },
		}
	}
}

/// Combine raw request data with recovered state
///
/// - `Valid`: the accepted values replace `raw` entirely
/// - `Invalid`: errors are attached; rejected input is laid over `raw` so
///   fields the user never sent keep their defaults
/// - `Unparseable` / `Absent`: `raw`, no errors
///
/// # Examples
///
/// ```
/// use formrelay_core::{FormValues, ValidationError};
/// use formrelay_views::{Recovered, merge};
/// use serde_json::json;
///
/// let mut raw = FormValues::new();
/// raw.insert("name", json!(""));
///
/// let view = merge(raw.clone(), Recovered::Absent);
/// assert_eq!(view.values, raw);
/// assert!(view.errors.is_empty());
///
/// let errors = vec![ValidationError::form_level("Try again")];
/// let view = merge(raw, Recovered::Invalid { errors: errors.clone(), values: None });
/// assert_eq!(view.errors, errors);
/// ```
pub fn merge(raw: FormValues, recovered: Recovered) -> ViewModel {
	match recovered {
		Recovered::Valid(values) => ViewModel::clean(values),
		Recovered::Invalid {
			errors,
			values: Some(values),
		} => ViewModel::new(raw.overlaid_with(values), errors),
		Recovered::Invalid { errors, values: None } => ViewModel::new(raw, errors),
		Recovered::Unparseable | Recovered::Absent => ViewModel::clean(raw),
	}
}

/// Result of one page load
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedState {
	pub view: ViewModel,
	/// Set when the request presented a token cookie
	pub clear_cookie: Option<SetCookie>,
}

impl LoadedState {
	/// JSON rendering of the view-model for an external render binder
	pub fn into_response(self) -> Result<Response> {
		let mut response = Response::ok().with_json(&self.view)?;
		if let Some(cookie) = &self.clear_cookie {
			response = response.with_header("set-cookie", &cookie.to_string());
		}
		Ok(response)
	}
}

/// Builds the view-model for every GET of the form page
pub struct StateLoader {
	settings: Arc<RelaySettings>,
	store: Arc<dyn TransientStore>,
	defaults: FormValues,
	parser: SubmissionParser,
}

impl StateLoader {
	pub fn new(
		settings: Arc<RelaySettings>,
		store: Arc<dyn TransientStore>,
		defaults: FormValues,
	) -> Self {
		let parser = SubmissionParser::new().with_max_list_index(settings.max_list_index);
		Self {
			settings,
			store,
			defaults,
			parser,
		}
	}

	pub fn defaults(&self) -> &FormValues {
		&self.defaults
	}

	/// Load the page state for `request`
	///
	/// Store and decoding failures degrade to the raw values; they never
	/// reach the caller.
	pub async fn load(&self, request: &Request) -> LoadedState {
		let raw = self.raw_values(request);

		let Some(presented) = presented_token(request, &self.settings) else {
			return LoadedState {
				view: merge(raw, Recovered::Absent),
				clear_cookie: None,
			};
		};

		let recovered = match SessionToken::parse(&presented) {
			Some(token) => self.recover(&token).await,
			None => {
				tracing::debug!("ignoring malformed session token cookie");
				Recovered::Absent
			}
		};

		LoadedState {
			view: merge(raw, recovered),
			clear_cookie: Some(clear_token_cookie(&self.settings)),
		}
	}

	/// Defaults overlaid with whatever the query string carries
	fn raw_values(&self, request: &Request) -> FormValues {
		let defaults = self.defaults.clone();
		let Some(query) = request.query_string() else {
			return defaults;
		};
		match self.parser.parse_query(query) {
			Ok(overrides) => defaults.overlaid_with(overrides),
			Err(e) => {
				tracing::warn!(error = %e, "ignoring unparsable query string");
				defaults
			}
		}
	}

	/// Take the record for `token`; the store entry is gone afterwards
	async fn recover(&self, token: &SessionToken) -> Recovered {
		let payload = match self.store.take(token).await {
			Ok(Some(payload)) => payload,
			Ok(None) => {
				tracing::debug!(token = %token.redacted(), "no transient record");
				return Recovered::Absent;
			}
			Err(e) => {
				tracing::error!(token = %token.redacted(), error = %e, "failed to read transient record");
				return Recovered::Absent;
			}
		};

		match TransientRecord::decode(&payload) {
			Ok(record) => {
				tracing::debug!(token = %token.redacted(), "transient record recovered");
				record.into()
			}
			Err(e) => {
				tracing::warn!(token = %token.redacted(), error = %e, "discarding unparsable transient record");
				Recovered::Unparseable
			}
		}
	}
}
