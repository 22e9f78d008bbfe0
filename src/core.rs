//! Core types shared by every formrelay crate.

pub use formrelay_core::*;
