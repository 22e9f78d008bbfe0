//! # formrelay-core
//!
//! Shared vocabulary for relaying a form submission across a
//! Post-Redirect-Get cycle:
//!
//! - [`FormValues`] / [`FieldPath`]: submitted data and the dotted/indexed
//!   names addressing it
//! - [`ValidationError`] / [`ValidationOutcome`]: what a validator produces
//! - [`TransientRecord`]: the one-shot payload persisted between POST and GET
//! - [`ViewModel`]: what rendering receives
//! - [`exception`]: the error taxonomy used by every crate in the workspace

pub mod exception;
pub mod path;
pub mod record;
pub mod validation;
pub mod values;
pub mod view_model;

pub use exception::{Error, Result};
pub use path::{FieldPath, PathError, PathSegment};
pub use record::TransientRecord;
pub use validation::{FORM_LEVEL_KEY, ValidationError, ValidationOutcome};
pub use values::{DEFAULT_MAX_LIST_INDEX, FormValues, ValuesError};
pub use view_model::ViewModel;
