//! Transient store module.

pub use formrelay_store::*;
