//! Settings module.
//!
//! Layered [`RelaySettings`]: defaults, TOML, then `FORMRELAY_*` variables.

pub use formrelay_conf::*;
