//! # formrelay-views
//!
//! Post-Redirect-Get for server-validated forms.
//!
//! - [`SubmissionHandler`] validates a POST, stores the outcome under the
//!   browser's session token and returns a [`RedirectInstruction`]
//! - [`StateLoader`] consumes that record on the following GET and merges it
//!   into a [`ViewModel`]
//! - [`FormRelayView`] puts both behind one [`Handler`]
//!
//! [`RedirectInstruction`]: formrelay_http::RedirectInstruction
//! [`ViewModel`]: formrelay_core::ViewModel
//! [`Handler`]: formrelay_http::Handler

pub mod backend;
pub mod cookies;
pub mod loader;
pub mod product;
pub mod submission;
pub mod view;

pub use backend::{StoreBackend, open_store};
pub use loader::{LoadedState, Recovered, StateLoader, merge};
pub use submission::SubmissionHandler;
pub use view::FormRelayView;
