//! # formrelay
//!
//! Post-Redirect-Get for server-validated forms, with the validation outcome
//! handed across the redirect through a one-shot transient store.
//!
//! A POST is parsed and validated, its outcome is stored under the browser's
//! session token, and the browser is sent back to the form page with a
//! `303 See Other`. The following GET consumes the stored outcome and renders
//! the accepted values, or the rejected input with its errors. Refreshing the
//! page never resubmits, and errors are shown exactly once.
//!
//! ## Feature Flags
//!
//! ### Presets
//!
//! - `minimal` - Core types, HTTP plumbing, parsing/validation and stores
//! - `standard` - `minimal` plus settings and the handler/loader views
//! - `full` (default) - `standard` plus the Redis store
//!
//! ### Fine-grained Control
//!
//! - `core` - Form values, field paths, validation outcomes, records
//! - `http` - Request/response types, cookies, redirect instructions
//! - `forms` - Submission parsing and the rule engine
//! - `store` - Transient stores and the cleanup task
//! - `conf` - Layered settings
//! - `views` - Submission handler, state loader, form page view
//! - `redis-backend` - Redis transient store
//!
//! ## Example
//!
//! ```rust
//! # #[cfg(feature = "standard")]
//! # #[tokio::main]
//! # async fn main() {
//! use formrelay::conf::RelaySettings;
//! use formrelay::http::{Handler, Method, Request, StatusCode};
//! use formrelay::store::MemoryTransientStore;
//! use formrelay::views::product::product_view;
//! use std::sync::Arc;
//!
//! let view = product_view(RelaySettings::default(), Arc::new(MemoryTransientStore::new()));
//!
//! let submit = Request::builder()
//!     .method(Method::POST)
//!     .uri("/server-integration")
//!     .header("content-type", "application/x-www-form-urlencoded")
//!     .body("name=")
//!     .build()
//!     .unwrap();
//! let redirect = view.handle(submit).await.unwrap();
//! assert_eq!(redirect.status, StatusCode::SEE_OTHER);
//! # }
//! # #[cfg(not(feature = "standard"))]
//! # fn main() {}
//! ```

#[cfg(feature = "conf")]
pub mod conf;
#[cfg(feature = "core")]
pub mod core;
#[cfg(feature = "forms")]
pub mod forms;
#[cfg(feature = "http")]
pub mod http;
#[cfg(feature = "store")]
pub mod store;
#[cfg(feature = "views")]
pub mod views;

// Re-export core types
#[cfg(feature = "core")]
pub use formrelay_core::{
	FieldPath, FormValues, TransientRecord, ValidationError, ValidationOutcome, ViewModel,
	exception::{Error, Result},
};

// Re-export HTTP types
#[cfg(feature = "http")]
pub use formrelay_http::{Handler, RedirectInstruction, Request, Response};

// Re-export validation
#[cfg(feature = "forms")]
pub use formrelay_forms::{FormValidator, SubmissionParser, Validate};

// Re-export stores
#[cfg(feature = "store")]
pub use formrelay_store::{MemoryTransientStore, SessionToken, TransientStore};

#[cfg(feature = "redis-backend")]
pub use formrelay_store::RedisTransientStore;

// Re-export settings
#[cfg(feature = "conf")]
pub use formrelay_conf::RelaySettings;

// Re-export the handler/loader pair
#[cfg(feature = "views")]
pub use formrelay_views::{FormRelayView, StateLoader, SubmissionHandler};
