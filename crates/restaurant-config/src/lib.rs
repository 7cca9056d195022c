//! Configuration module for the restaurant ordering service.
//!
//! Configuration is read from TOML. String values may reference environment
//! variables as `${NAME}` or `${NAME:-default}`; these are substituted before
//! parsing. A file may pull in other files with `include = ["a.toml"]`, as long
//! as every top-level section is defined exactly once across all of them.

#[cfg(any(test, feature = "testing"))]
pub mod builders;
mod loader;

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		ConfigError::Parse(err.message().to_string())
	}
}

/// Top-level service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Identity of this restaurant instance.
	pub restaurant: RestaurantConfig,
	/// Order persistence backends.
	pub storage: StorageConfig,
	/// Menu catalog sources.
	pub menu: MenuConfig,
	/// Order listing and lifecycle behavior.
	#[serde(default)]
	pub orders: OrdersConfig,
	/// HTTP API server. When absent the service runs without a listener.
	pub api: Option<ApiConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RestaurantConfig {
	/// Unique identifier, used in logs.
	pub id: String,
	/// Display name shown in health responses.
	#[serde(default = "default_restaurant_name")]
	pub name: String,
}

fn default_restaurant_name() -> String {
	"Restaurant".to_string()
}

/// Configuration for the storage backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of storage implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
}

/// Configuration for the menu catalog.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MenuConfig {
	/// Which catalog implementation to use.
	pub primary: String,
	/// Map of catalog implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OrdersConfig {
	/// Number of orders returned by list endpoints when no limit is given.
	#[serde(default = "default_list_limit")]
	pub default_limit: usize,
	/// Number of recent orders the estimator reads per call.
	#[serde(default = "default_history_limit")]
	pub history_limit: usize,
	/// Number of recommendations returned when no limit is given.
	#[serde(default = "default_recommendation_limit")]
	pub recommendation_limit: usize,
	/// Reject status changes that skip or reverse the lifecycle.
	#[serde(default)]
	pub enforce_transitions: bool,
}

impl Default for OrdersConfig {
	fn default() -> Self {
		Self {
			default_limit: default_list_limit(),
			history_limit: default_history_limit(),
			recommendation_limit: default_recommendation_limit(),
			enforce_transitions: false,
		}
	}
}

fn default_list_limit() -> usize {
	50
}

fn default_history_limit() -> usize {
	1000
}

fn default_recommendation_limit() -> usize {
	10
}

/// Configuration for the HTTP API server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
	/// Whether the API server is enabled.
	#[serde(default)]
	pub enabled: bool,
	/// Host address to bind the server to.
	#[serde(default = "default_api_host")]
	pub host: String,
	/// Port to bind the server to.
	#[serde(default = "default_api_port")]
	pub port: u16,
	/// CORS configuration. Any origin is allowed when absent.
	pub cors: Option<CorsConfig>,
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CorsConfig {
	/// Allowed origins for CORS.
	pub allowed_origins: Vec<String>,
	/// Allowed headers for CORS.
	#[serde(default)]
	pub allowed_headers: Vec<String>,
	/// Allowed methods for CORS.
	#[serde(default)]
	pub allowed_methods: Vec<String>,
}

fn default_api_host() -> String {
	"127.0.0.1".to_string()
}

fn default_api_port() -> u16 {
	3000
}

/// Resolves environment variables in a string.
///
/// Replaces `${VAR_NAME}` with the value of the environment variable, or with
/// the text after `:-` in `${VAR_NAME:-default}` when the variable is unset.
/// Inputs larger than 1MB are rejected.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024;
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut resolved = String::with_capacity(input.len());
	let mut last = 0;
	for cap in re.captures_iter(input) {
		let (Some(whole), Some(name)) = (cap.get(0), cap.get(1)) else {
			continue;
		};
		let value = match (std::env::var(name.as_str()), cap.get(2)) {
			(Ok(value), _) => value,
			(Err(_), Some(default)) => default.as_str().to_string(),
			(Err(_), None) => {
				return Err(ConfigError::Validation(format!(
					"Environment variable '{}' not found",
					name.as_str()
				)));
			},
		};
		resolved.push_str(&input[last..whole.start()]);
		resolved.push_str(&value);
		last = whole.end();
	}
	resolved.push_str(&input[last..]);

	Ok(resolved)
}

impl Config {
	/// Loads configuration from a file, following `include` directives.
	pub async fn from_file(path: &str) -> Result<Self, ConfigError> {
		let path_buf = Path::new(path);
		let base_dir = path_buf.parent().unwrap_or_else(|| Path::new("."));

		let mut loader = loader::ConfigLoader::new(base_dir);
		let file_name = path_buf
			.file_name()
			.ok_or_else(|| ConfigError::Validation(format!("Invalid path: {}", path)))?;
		loader.load_config(file_name).await
	}

	/// Checks cross-field constraints that serde cannot express.
	fn validate(&self) -> Result<(), ConfigError> {
		if self.restaurant.id.is_empty() {
			return Err(ConfigError::Validation(
				"Restaurant ID cannot be empty".into(),
			));
		}

		validate_primary("storage", &self.storage.primary, &self.storage.implementations)?;
		validate_primary("menu", &self.menu.primary, &self.menu.implementations)?;

		if self.orders.default_limit == 0 {
			return Err(ConfigError::Validation(
				"orders.default_limit must be greater than 0".into(),
			));
		}
		if self.orders.history_limit == 0 {
			return Err(ConfigError::Validation(
				"orders.history_limit must be greater than 0".into(),
			));
		}
		if self.orders.recommendation_limit == 0 {
			return Err(ConfigError::Validation(
				"orders.recommendation_limit must be greater than 0".into(),
			));
		}

		if let Some(api) = self.api.as_ref().filter(|api| api.enabled) {
			if api.host.is_empty() {
				return Err(ConfigError::Validation("API host cannot be empty".into()));
			}
			if let Some(cors) = &api.cors {
				if cors.allowed_origins.is_empty() {
					return Err(ConfigError::Validation(
						"api.cors.allowed_origins must list at least one origin".into(),
					));
				}
			}
		}

		Ok(())
	}
}

fn validate_primary(
	section: &str,
	primary: &str,
	implementations: &HashMap<String, toml::Value>,
) -> Result<(), ConfigError> {
	if implementations.is_empty() {
		return Err(ConfigError::Validation(format!(
			"At least one {} implementation must be configured",
			section
		)));
	}
	if primary.is_empty() {
		return Err(ConfigError::Validation(format!(
			"{} primary implementation cannot be empty",
			section
		)));
	}
	if !implementations.contains_key(primary) {
		return Err(ConfigError::Validation(format!(
			"Primary {} '{}' not found in implementations",
			section, primary
		)));
	}
	Ok(())
}

/// Parses a TOML string, resolving environment variables and validating the
/// result.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const MINIMAL: &str = r#"
[restaurant]
id = "main-street"

[storage]
primary = "memory"
[storage.implementations.memory]

[menu]
primary = "static"
[menu.implementations.static]
"#;

	#[test]
	fn test_env_var_resolution() {
		std::env::set_var("RESTAURANT_TEST_HOST", "localhost");
		std::env::set_var("RESTAURANT_TEST_PORT", "8080");

		let input = "host = \"${RESTAURANT_TEST_HOST}:${RESTAURANT_TEST_PORT}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "host = \"localhost:8080\"");

		std::env::remove_var("RESTAURANT_TEST_HOST");
		std::env::remove_var("RESTAURANT_TEST_PORT");
	}

	#[test]
	fn test_env_var_with_default() {
		let input = "value = \"${RESTAURANT_MISSING_VAR:-./data/orders}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "value = \"./data/orders\"");
	}

	#[test]
	fn test_missing_env_var_error() {
		let result = resolve_env_vars("value = \"${RESTAURANT_MISSING_VAR}\"");
		assert!(result.unwrap_err().to_string().contains("RESTAURANT_MISSING_VAR"));
	}

	#[test]
	fn test_minimal_config_uses_defaults() {
		let config: Config = MINIMAL.parse().unwrap();
		assert_eq!(config.restaurant.id, "main-street");
		assert_eq!(config.restaurant.name, "Restaurant");
		assert_eq!(config.orders.default_limit, 50);
		assert_eq!(config.orders.history_limit, 1000);
		assert_eq!(config.orders.recommendation_limit, 10);
		assert!(!config.orders.enforce_transitions);
		assert!(config.api.is_none());
	}

	#[test]
	fn test_api_defaults() {
		let config: Config = format!("{}\n[api]\nenabled = true\n", MINIMAL).parse().unwrap();
		let api = config.api.unwrap();
		assert_eq!(api.host, "127.0.0.1");
		assert_eq!(api.port, 3000);
		assert!(api.cors.is_none());
	}

	#[test]
	fn test_unknown_primary_rejected() {
		let config = MINIMAL.replace("primary = \"memory\"", "primary = \"file\"");
		let err = config.parse::<Config>().unwrap_err();
		assert!(err
			.to_string()
			.contains("Primary storage 'file' not found in implementations"));
	}

	#[test]
	fn test_empty_id_rejected() {
		let config = MINIMAL.replace("\"main-street\"", "\"\"");
		assert!(matches!(
			config.parse::<Config>(),
			Err(ConfigError::Validation(_))
		));
	}

	#[test]
	fn test_zero_limit_rejected() {
		let config = format!("{}\n[orders]\ndefault_limit = 0\n", MINIMAL);
		let err = config.parse::<Config>().unwrap_err();
		assert!(err.to_string().contains("default_limit"));
	}

	#[test]
	fn test_parse_error_is_reported_without_input_dump() {
		let err = "[restaurant".parse::<Config>().unwrap_err();
		assert!(matches!(err, ConfigError::Parse(_)));
	}
}
