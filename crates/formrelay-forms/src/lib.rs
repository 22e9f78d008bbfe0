//! Form handling for formrelay
//!
//! [`SubmissionParser`] decodes inbound submissions into
//! [`FormValues`](formrelay_core::FormValues) and [`FormValidator`] runs the
//! server-side rules over them.

pub mod parser;
pub mod validator;

pub use parser::{DEFAULT_MAX_BODY_SIZE, ParseError, SubmissionParser};
pub use validator::{FormValidator, Validate, is_blank, max_length, required};
