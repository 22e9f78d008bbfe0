//! Forms module.
//!
//! Submission parsing and server-side validation rules.
//!
//! # Examples
//!
//! ```rust
//! use formrelay::core::FieldPath;
//! use formrelay::forms::{FormValidator, required};
//!
//! let validator = FormValidator::new()
//!     .field(FieldPath::key("name"), required("Name is required"));
//! assert_eq!(validator.rule_count(), 1);
//! ```

pub use formrelay_forms::*;
