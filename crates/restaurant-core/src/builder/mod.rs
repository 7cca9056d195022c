//! Builder pattern for constructing restaurant engines.
//!
//! Storage backends and menu sources are created through factory functions
//! keyed by implementation name, so the binary decides which
//! implementations exist and the configuration decides which one is used.

use crate::engine::RestaurantEngine;
use restaurant_config::Config;
use restaurant_menu::{MenuError, MenuInterface, MenuService};
use restaurant_storage::{StorageError, StorageInterface, StorageService};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur during engine construction.
#[derive(Debug, Error)]
pub enum BuilderError {
	#[error("Configuration error: {0}")]
	Config(String),
	#[error("Missing required component: {0}")]
	MissingComponent(String),
}

/// Factory functions for every pluggable component, keyed by name.
pub struct RestaurantFactories<SF, MF> {
	pub storage_factories: HashMap<String, SF>,
	pub menu_factories: HashMap<String, MF>,
}

pub struct RestaurantBuilder {
	config: Config,
}

impl RestaurantBuilder {
	pub fn new(config: Config) -> Self {
		Self { config }
	}

	/// Builds the engine, creating every configured implementation that has
	/// a factory and keeping the primary one of each kind.
	pub fn build<SF, MF>(
		self,
		factories: RestaurantFactories<SF, MF>,
	) -> Result<RestaurantEngine, BuilderError>
	where
		SF: Fn(&toml::Value) -> Result<Box<dyn StorageInterface>, StorageError>,
		MF: Fn(&toml::Value) -> Result<Box<dyn MenuInterface>, MenuError>,
	{
		let mut storage_impls = HashMap::new();
		for (name, config) in &self.config.storage.implementations {
			let Some(factory) = factories.storage_factories.get(name) else {
				tracing::warn!(component = "storage", implementation = %name, "No factory registered");
				continue;
			};
			match factory(config) {
				Ok(implementation) => {
					let is_primary = &self.config.storage.primary == name;
					tracing::info!(component = "storage", implementation = %name, enabled = %is_primary, "Loaded");
					storage_impls.insert(name.clone(), implementation);
				},
				Err(e) => {
					tracing::error!(
						component = "storage",
						implementation = %name,
						error = %e,
						"Failed to create storage implementation"
					);
					return Err(BuilderError::Config(format!(
						"Failed to create storage implementation '{}': {}",
						name, e
					)));
				},
			}
		}

		let primary_storage = &self.config.storage.primary;
		let storage_backend = storage_impls.remove(primary_storage).ok_or_else(|| {
			BuilderError::MissingComponent(format!("storage implementation '{}'", primary_storage))
		})?;
		let storage = Arc::new(StorageService::new(primary_storage.clone(), storage_backend));

		let mut menu_impls = HashMap::new();
		for (name, config) in &self.config.menu.implementations {
			let Some(factory) = factories.menu_factories.get(name) else {
				tracing::warn!(component = "menu", implementation = %name, "No factory registered");
				continue;
			};
			match factory(config) {
				Ok(implementation) => {
					let is_primary = &self.config.menu.primary == name;
					tracing::info!(component = "menu", implementation = %name, enabled = %is_primary, "Loaded");
					menu_impls.insert(name.clone(), implementation);
				},
				Err(e) => {
					tracing::error!(
						component = "menu",
						implementation = %name,
						error = %e,
						"Failed to create menu implementation"
					);
					return Err(BuilderError::Config(format!(
						"Failed to create menu implementation '{}': {}",
						name, e
					)));
				},
			}
		}

		let primary_menu = &self.config.menu.primary;
		let menu_source = menu_impls.remove(primary_menu).ok_or_else(|| {
			BuilderError::MissingComponent(format!("menu implementation '{}'", primary_menu))
		})?;
		let menu = Arc::new(MenuService::new(menu_source));

		Ok(RestaurantEngine::new(self.config, storage, menu))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use restaurant_config::builders::ConfigBuilder;
	use restaurant_menu::MenuFactory;
	use restaurant_storage::StorageFactory;
	use restaurant_types::StorageMode;

	fn all_factories() -> RestaurantFactories<StorageFactory, MenuFactory> {
		RestaurantFactories {
			storage_factories: restaurant_storage::get_all_implementations()
				.into_iter()
				.map(|(name, factory)| (name.to_string(), factory))
				.collect(),
			menu_factories: restaurant_menu::get_all_implementations()
				.into_iter()
				.map(|(name, factory)| (name.to_string(), factory))
				.collect(),
		}
	}

	#[tokio::test]
	async fn test_build_with_defaults() {
		let engine = RestaurantBuilder::new(ConfigBuilder::new().build())
			.build(all_factories())
			.unwrap();
		assert_eq!(engine.storage_status().mode, StorageMode::Durable);
		assert_eq!(engine.storage_status().primary, "memory");
		assert_eq!(engine.menu().item(1).await.unwrap().name, "Idli");
	}

	#[tokio::test]
	async fn test_build_with_file_storage() {
		let dir = tempfile::tempdir().unwrap();
		let mut settings = toml::Table::new();
		settings.insert(
			"storage_path".into(),
			toml::Value::String(dir.path().display().to_string()),
		);
		let config = ConfigBuilder::new()
			.storage("file", toml::Value::Table(settings))
			.build();

		let engine = RestaurantBuilder::new(config).build(all_factories()).unwrap();
		assert_eq!(engine.storage_status().primary, "file");
		assert!(engine.recent_orders(None).await.unwrap().is_empty());
	}

	#[test]
	fn test_missing_primary_factory() {
		let config = ConfigBuilder::new().build();
		let mut factories = all_factories();
		factories.menu_factories.clear();

		let err = RestaurantBuilder::new(config).build(factories).err().unwrap();
		assert!(matches!(err, BuilderError::MissingComponent(_)));
	}

	#[test]
	fn test_factory_failure_is_reported() {
		let mut settings = toml::Table::new();
		settings.insert("storage_path".into(), toml::Value::String(String::new()));
		let config = ConfigBuilder::new()
			.storage("file", toml::Value::Table(settings))
			.build();

		let err = RestaurantBuilder::new(config).build(all_factories()).err().unwrap();
		assert!(err.to_string().contains("file"));
	}
}
