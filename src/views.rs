//! Views module.
//!
//! The submission handler, the state loader and the form page view that
//! combines them.

pub use formrelay_views::*;
