//! Main entry point for the restaurant ordering service.
//!
//! Loads the configuration, wires the configured storage backend and menu
//! source into a [`RestaurantEngine`] and serves the HTTP API.

use clap::Parser;
use restaurant_config::Config;
use restaurant_core::{RestaurantBuilder, RestaurantEngine, RestaurantFactories};
use std::path::PathBuf;
use std::sync::Arc;

mod apis;
mod server;

use restaurant_menu::implementations::static_menu::create_menu as create_static_menu;
use restaurant_storage::implementations::file::create_storage as create_file_storage;
use restaurant_storage::implementations::memory::create_storage as create_memory_storage;

/// Command-line arguments for the restaurant service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config/restaurant.toml", env = "RESTAURANT_CONFIG")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	use tracing_subscriber::{fmt, EnvFilter};

	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

	fmt()
		.with_env_filter(env_filter)
		.with_thread_ids(true)
		.with_target(true)
		.init();

	tracing::info!("Started restaurant service");

	let config_path = args.config.to_string_lossy();
	let config = Config::from_file(&config_path).await?;
	tracing::info!("Loaded configuration [{}]", config.restaurant.id);

	let engine = Arc::new(build_engine(config.clone())?);
	engine.initialize().await?;

	match config.api.clone().filter(|api| api.enabled) {
		Some(api_config) => server::start_server(api_config, Arc::clone(&engine)).await?,
		None => {
			tracing::warn!("API server disabled; waiting for Ctrl+C");
			tokio::signal::ctrl_c().await?;
		},
	}

	engine.shutdown().await?;
	tracing::info!("Stopped restaurant service");
	Ok(())
}

/// Macro to create a factory HashMap with the appropriate type aliases
macro_rules! create_factory_map {
    ($interface:path, $error:path, $( $name:literal => $factory:expr ),* $(,)?) => {{
        let mut factories = std::collections::HashMap::new();
        $(
            factories.insert(
                $name.to_string(),
                $factory as fn(&toml::Value) -> Result<Box<dyn $interface>, $error>
            );
        )*
        factories
    }};
}

/// Wires the concrete storage backends and menu sources into the engine.
fn build_engine(config: Config) -> Result<RestaurantEngine, Box<dyn std::error::Error>> {
	let storage_factories = create_factory_map!(
		restaurant_storage::StorageInterface,
		restaurant_storage::StorageError,
		"file" => create_file_storage,
		"memory" => create_memory_storage,
	);

	let menu_factories = create_factory_map!(
		restaurant_menu::MenuInterface,
		restaurant_menu::MenuError,
		"static" => create_static_menu,
	);

	let factories = RestaurantFactories {
		storage_factories,
		menu_factories,
	};

	Ok(RestaurantBuilder::new(config).build(factories)?)
}

#[cfg(test)]
mod tests {
	use super::*;
	use restaurant_config::builders::ConfigBuilder;

	#[test]
	fn test_args_parse() {
		let args = Args::parse_from(["restaurant", "--config", "custom.toml", "-l", "debug"]);
		assert_eq!(args.config, PathBuf::from("custom.toml"));
		assert_eq!(args.log_level, "debug");
	}

	#[test]
	fn test_create_factory_map_multiple_entries() {
		use restaurant_storage::{StorageError, StorageInterface};

		let factories = create_factory_map!(
			StorageInterface,
			StorageError,
			"memory" => create_memory_storage,
			"file" => create_file_storage,
		);

		assert_eq!(factories.len(), 2);
		assert!(factories.contains_key("memory"));
		assert!(factories.contains_key("file"));
	}

	#[tokio::test]
	async fn test_build_engine_with_minimal_config() {
		let engine = build_engine(ConfigBuilder::new().restaurant_id("main-street").build())
			.expect("engine should build");
		assert_eq!(engine.config().restaurant.id, "main-street");
		engine.initialize().await.unwrap();
	}

	#[tokio::test]
	async fn test_build_engine_from_file() {
		let dir = tempfile::tempdir().unwrap();
		let data_dir = dir.path().join("data");
		let config_path = dir.path().join("restaurant.toml");
		let content = format!(
			r#"
[restaurant]
id = "file-test"

[storage]
primary = "file"
[storage.implementations.file]
storage_path = "{}"

[menu]
primary = "static"
[menu.implementations.static]
"#,
			data_dir.display()
		);
		std::fs::write(&config_path, content).unwrap();

		let config = Config::from_file(config_path.to_str().unwrap()).await.unwrap();
		let engine = build_engine(config).unwrap();
		assert_eq!(engine.storage_status().primary, "file");
		assert!(data_dir.exists());
	}
}
