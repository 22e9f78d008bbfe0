//! Relay settings
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! `FORMRELAY_*` environment variables. The result is checked with
//! [`RelaySettings::validate`] before use.

use formrelay_core::exception::Error;
use formrelay_http::SameSite;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Prefix of environment variables read by [`RelaySettings::with_env_overrides`]
pub const ENV_PREFIX: &str = "FORMRELAY_";

/// Errors raised while loading settings
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	#[error("TOML error: {0}")]
	Toml(#[from] toml::de::Error),

	#[error("Invalid value for {key}: '{value}'")]
	Env { key: String, value: String },

	#[error("Invalid setting: {0}")]
	Invalid(String),
}

impl From<SettingsError> for Error {
	fn from(err: SettingsError) -> Self {
		Error::Configuration(err.to_string())
	}
}

/// Everything the handler, loader and stores need to know
///
/// # Examples
///
/// ```
/// use formrelay_conf::RelaySettings;
///
/// let settings = RelaySettings::from_toml_str(r#"
///     form_path = "/products/new"
///     record_ttl_secs = 120
/// "#).unwrap();
///
/// assert_eq!(settings.form_path, "/products/new");
/// assert_eq!(settings.record_ttl().as_secs(), 120);
/// assert_eq!(settings.cookie_name, "server-integration-success-form-state");
/// assert!(settings.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelaySettings {
	/// Route of the form page; submissions redirect here
	pub form_path: String,
	/// Cookie carrying the session token
	pub cookie_name: String,
	pub cookie_path: String,
	/// `Domain` attribute of the token cookie; host-only when unset
	pub cookie_domain: Option<String>,
	pub cookie_secure: bool,
	/// `Strict`, `Lax` or `None`
	pub cookie_same_site: String,
	/// Lifetime of a stored record, and of the token cookie
	pub record_ttl_secs: u64,
	/// Prepended to tokens to form store keys
	pub key_prefix: String,
	/// Largest list index accepted in a submitted field name
	pub max_list_index: usize,
	/// Largest accepted submission body, in bytes
	pub max_body_size: usize,
	/// How often the memory store is swept
	pub cleanup_interval_secs: u64,
	/// Use Redis instead of the memory store when set
	pub redis_url: Option<String>,
}

impl Default for RelaySettings {
	fn default() -> Self {
		Self {
			form_path: "/server-integration".to_string(),
			cookie_name: "server-integration-success-form-state".to_string(),
			cookie_path: "/".to_string(),
			cookie_domain: None,
			cookie_secure: false,
			cookie_same_site: "Lax".to_string(),
			record_ttl_secs: 300,
			key_prefix: "formrelay:".to_string(),
			max_list_index: 1000,
			max_body_size: 2 * 1024 * 1024,
			cleanup_interval_secs: 60,
			redis_url: None,
		}
	}
}

impl RelaySettings {
	/// Defaults overridden by the keys present in `content`
	pub fn from_toml_str(content: &str) -> Result<Self, SettingsError> {
		Ok(toml::from_str(content)?)
	}

	/// Defaults overridden by a TOML file; a missing file yields defaults
	pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
		let path = path.as_ref();
		if !path.exists() {
			tracing::debug!(path = %path.display(), "settings file not found, using defaults");
			return Ok(Self::default());
		}
		let content = fs::read_to_string(path)?;
		Self::from_toml_str(&content)
	}

	/// Full layering: defaults, optional file, process environment, then validation
	pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
		let settings = match path {
			Some(path) => Self::from_file(path)?,
			None => Self::default(),
		};
		let settings = settings.with_env_overrides()?;
		settings.validate()?;
		Ok(settings)
	}

	/// Apply `FORMRELAY_*` variables from the process environment
	pub fn with_env_overrides(self) -> Result<Self, SettingsError> {
		self.with_env_overrides_from(std::env::vars())
	}

	/// Apply `FORMRELAY_*` variables from `vars`
	///
	/// The remainder of each name, lowercased, is the field name. Unknown
	/// names are ignored.
	///
	/// # Examples
	///
	/// ```
	/// use formrelay_conf::RelaySettings;
	///
	/// let settings = RelaySettings::default()
	///     .with_env_overrides_from([
	///         ("FORMRELAY_COOKIE_SECURE".to_string(), "yes".to_string()),
	///         ("FORMRELAY_RECORD_TTL_SECS".to_string(), "30".to_string()),
	///         ("HOME".to_string(), "/root".to_string()),
	///     ])
	///     .unwrap();
	///
	/// assert!(settings.cookie_secure);
	/// assert_eq!(settings.record_ttl_secs, 30);
	/// ```
	pub fn with_env_overrides_from<I>(mut self, vars: I) -> Result<Self, SettingsError>
	where
		I: IntoIterator<Item = (String, String)>,
	{
		for (key, value) in vars {
			let Some(name) = key.strip_prefix(ENV_PREFIX) else {
				continue;
			};
			let invalid = || SettingsError::Env {
				key: key.clone(),
				value: value.clone(),
			};

			match name.to_lowercase().as_str() {
				"form_path" => self.form_path = value.clone(),
				"cookie_name" => self.cookie_name = value.clone(),
				"cookie_path" => self.cookie_path = value.clone(),
				"cookie_domain" => {
					self.cookie_domain = (!value.trim().is_empty()).then(|| value.trim().to_string())
				}
				"cookie_secure" => self.cookie_secure = parse_bool(&value).ok_or_else(invalid)?,
				"cookie_same_site" => self.cookie_same_site = value.clone(),
				"record_ttl_secs" => {
					self.record_ttl_secs = value.trim().parse().map_err(|_| invalid())?
				}
				"key_prefix" => self.key_prefix = value.clone(),
				"max_list_index" => {
					self.max_list_index = value.trim().parse().map_err(|_| invalid())?
				}
				"max_body_size" => {
					self.max_body_size = value.trim().parse().map_err(|_| invalid())?
				}
				"cleanup_interval_secs" => {
					self.cleanup_interval_secs = value.trim().parse().map_err(|_| invalid())?
				}
				"redis_url" => {
					self.redis_url = (!value.trim().is_empty()).then(|| value.clone())
				}
				other => tracing::warn!(variable = %key, name = other, "ignoring unknown setting"),
			}
		}
		Ok(self)
	}

	/// Reject settings the relay cannot run with
	pub fn validate(&self) -> Result<(), SettingsError> {
		if self.cookie_name.is_empty()
			|| !self
				.cookie_name
				.bytes()
				.all(|b| b.is_ascii_graphic() && !b"()<>@,;:\\\"/[]?={}".contains(&b))
		{
			return Err(SettingsError::Invalid(format!(
				"cookie_name '{}' is not a valid cookie name",
				self.cookie_name
			)));
		}
		if let Some(domain) = self.cookie_domain.as_deref().filter(|domain| {
			domain.is_empty() || domain.bytes().any(|b| !b.is_ascii_graphic() || b == b';')
		}) {
			return Err(SettingsError::Invalid(format!(
				"cookie_domain '{}' is not a valid domain",
				domain
			)));
		}
		for (name, path) in [("form_path", &self.form_path), ("cookie_path", &self.cookie_path)] {
			if !path.starts_with('/') {
				return Err(SettingsError::Invalid(format!(
					"{} must start with '/', got '{}'",
					name, path
				)));
			}
		}
		if self.record_ttl_secs == 0 {
			return Err(SettingsError::Invalid(
				"record_ttl_secs must be greater than zero".to_string(),
			));
		}
		if self.cleanup_interval_secs == 0 {
			return Err(SettingsError::Invalid(
				"cleanup_interval_secs must be greater than zero".to_string(),
			));
		}
		if self.max_body_size == 0 {
			return Err(SettingsError::Invalid(
				"max_body_size must be greater than zero".to_string(),
			));
		}
		match SameSite::parse(&self.cookie_same_site) {
			None => {
				return Err(SettingsError::Invalid(format!(
					"cookie_same_site must be Strict, Lax or None, got '{}'",
					self.cookie_same_site
				)));
			}
			Some(SameSite::None) if !self.cookie_secure => {
				return Err(SettingsError::Invalid(
					"cookie_same_site = None requires cookie_secure".to_string(),
				));
			}
			Some(_) => {}
		}
		Ok(())
	}

	pub fn record_ttl(&self) -> Duration {
		Duration::from_secs(self.record_ttl_secs)
	}

	pub fn cleanup_interval(&self) -> Duration {
		Duration::from_secs(self.cleanup_interval_secs)
	}

	/// Parsed `SameSite`; unvalidated garbage falls back to `Lax`
	pub fn same_site(&self) -> SameSite {
		SameSite::parse(&self.cookie_same_site).unwrap_or(SameSite::Lax)
	}
}

fn parse_bool(value: &str) -> Option<bool> {
	match value.trim().to_lowercase().as_str() {
		"true" | "1" | "yes" | "on" => Some(true),
		"false" | "0" | "no" | "off" => Some(false),
		_ => None,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serial_test::serial;

	fn env(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
		pairs
			.iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect()
	}

	#[rstest]
	fn test_defaults_are_valid() {
		let settings = RelaySettings::default();

		assert!(settings.validate().is_ok());
		assert_eq!(settings.record_ttl(), Duration::from_secs(300));
		assert_eq!(settings.same_site(), SameSite::Lax);
		assert_eq!(settings.redis_url, None);
	}

	#[rstest]
	fn test_unknown_toml_keys_are_ignored_and_missing_keys_default() {
		let settings = RelaySettings::from_toml_str("cookie_secure = true\nunrelated = 1").unwrap();

		assert!(settings.cookie_secure);
		assert_eq!(settings.form_path, "/server-integration");
	}

	#[rstest]
	fn test_toml_type_mismatch_is_an_error() {
		let result = RelaySettings::from_toml_str("record_ttl_secs = \"soon\"");
		assert!(matches!(result, Err(SettingsError::Toml(_))));
	}

	#[rstest]
	#[case("on", true)]
	#[case("0", false)]
	#[case(" TRUE ", true)]
	fn test_env_bool_forms(#[case] raw: &str, #[case] expected: bool) {
		let settings = RelaySettings::default()
			.with_env_overrides_from(env(&[("FORMRELAY_COOKIE_SECURE", raw)]))
			.unwrap();
		assert_eq!(settings.cookie_secure, expected);
	}

	#[rstest]
	#[case("FORMRELAY_COOKIE_SECURE", "maybe")]
	#[case("FORMRELAY_RECORD_TTL_SECS", "-5")]
	#[case("FORMRELAY_MAX_LIST_INDEX", "lots")]
	fn test_env_unparsable_values_are_rejected(#[case] key: &str, #[case] value: &str) {
		let result = RelaySettings::default().with_env_overrides_from(env(&[(key, value)]));
		assert!(matches!(result, Err(SettingsError::Env { .. })));
	}

	#[rstest]
	fn test_empty_redis_url_clears_it() {
		let settings = RelaySettings {
			redis_url: Some("redis://localhost/".to_string()),
			..Default::default()
		}
		.with_env_overrides_from(env(&[("FORMRELAY_REDIS_URL", "")]))
		.unwrap();

		assert_eq!(settings.redis_url, None);
	}

	#[rstest]
	fn test_env_sets_and_clears_cookie_domain() {
		// Arrange
		let settings = RelaySettings::default();

		// Act
		let scoped = settings
			.with_env_overrides_from(env(&[("FORMRELAY_COOKIE_DOMAIN", " example.com ")]))
			.unwrap();
		let cleared = scoped
			.clone()
			.with_env_overrides_from(env(&[("FORMRELAY_COOKIE_DOMAIN", "")]))
			.unwrap();

		// Assert
		assert_eq!(scoped.cookie_domain.as_deref(), Some("example.com"));
		assert!(scoped.validate().is_ok());
		assert_eq!(cleared.cookie_domain, None);
	}

	#[rstest]
	#[case::empty_cookie(RelaySettings { cookie_name: String::new(), ..Default::default() })]
	#[case::cookie_with_separator(RelaySettings { cookie_name: "a;b".to_string(), ..Default::default() })]
	#[case::relative_form_path(RelaySettings { form_path: "form".to_string(), ..Default::default() })]
	#[case::relative_cookie_path(RelaySettings { cookie_path: "x".to_string(), ..Default::default() })]
	#[case::blank_domain(RelaySettings { cookie_domain: Some(String::new()), ..Default::default() })]
	#[case::domain_with_separator(RelaySettings { cookie_domain: Some("a.com; Secure".to_string()), ..Default::default() })]
	#[case::zero_ttl(RelaySettings { record_ttl_secs: 0, ..Default::default() })]
	#[case::zero_cleanup(RelaySettings { cleanup_interval_secs: 0, ..Default::default() })]
	#[case::zero_body(RelaySettings { max_body_size: 0, ..Default::default() })]
	#[case::bad_same_site(RelaySettings { cookie_same_site: "Sometimes".to_string(), ..Default::default() })]
	#[case::insecure_none(RelaySettings { cookie_same_site: "None".to_string(), ..Default::default() })]
	fn test_validate_rejects(#[case] settings: RelaySettings) {
		assert!(matches!(settings.validate(), Err(SettingsError::Invalid(_))));
	}

	#[rstest]
	fn test_missing_file_yields_defaults() {
		let path = std::env::temp_dir().join("formrelay-settings-that-does-not-exist.toml");
		assert_eq!(RelaySettings::from_file(&path).unwrap(), RelaySettings::default());
	}

	#[rstest]
	fn test_from_file_reads_toml() {
		// Arrange
		let path = std::env::temp_dir().join(format!("formrelay-settings-{}.toml", std::process::id()));
		fs::write(&path, "cookie_name = \"relay\"\nmax_list_index = 10\n").unwrap();

		// Act
		let settings = RelaySettings::from_file(&path);
		fs::remove_file(&path).unwrap();

		// Assert
		let settings = settings.unwrap();
		assert_eq!(settings.cookie_name, "relay");
		assert_eq!(settings.max_list_index, 10);
	}

	#[rstest]
	#[serial(formrelay_env)]
	fn test_load_reads_process_environment() {
		// SAFETY: serialized with other environment-mutating tests
		unsafe { std::env::set_var("FORMRELAY_FORM_PATH", "/from-env") };

		let result = RelaySettings::load(None);

		unsafe { std::env::remove_var("FORMRELAY_FORM_PATH") };
		assert_eq!(result.unwrap().form_path, "/from-env");
	}

	#[rstest]
	fn test_settings_error_becomes_configuration_error() {
		let err: Error = SettingsError::Invalid("x".to_string()).into();
		assert!(matches!(err, Error::Configuration(_)));
	}
}
