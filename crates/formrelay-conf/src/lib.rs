//! Configuration for formrelay
//!
//! See [`RelaySettings`] for the available keys and how sources are layered.

pub mod settings;

pub use settings::{ENV_PREFIX, RelaySettings, SettingsError};
