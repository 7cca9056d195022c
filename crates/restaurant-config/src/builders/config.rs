//! Configuration builder for tests and local development.

use crate::{
	ApiConfig, Config, MenuConfig, OrdersConfig, RestaurantConfig, StorageConfig,
};
use std::collections::HashMap;

/// Builder for `Config` values with in-memory defaults.
///
/// The defaults select the `memory` storage backend and the `static` menu,
/// both with empty settings, so a built config works without any files.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
	restaurant_id: String,
	restaurant_name: String,
	storage_primary: String,
	storage_implementations: HashMap<String, toml::Value>,
	menu_primary: String,
	menu_implementations: HashMap<String, toml::Value>,
	orders: OrdersConfig,
	api: Option<ApiConfig>,
}

impl Default for ConfigBuilder {
	fn default() -> Self {
		Self::new()
	}
}

fn empty_table() -> toml::Value {
	toml::Value::Table(toml::Table::new())
}

impl ConfigBuilder {
	pub fn new() -> Self {
		Self {
			restaurant_id: "test-restaurant".to_string(),
			restaurant_name: "Test Kitchen".to_string(),
			storage_primary: "memory".to_string(),
			storage_implementations: HashMap::from([("memory".to_string(), empty_table())]),
			menu_primary: "static".to_string(),
			menu_implementations: HashMap::from([("static".to_string(), empty_table())]),
			orders: OrdersConfig::default(),
			api: None,
		}
	}

	pub fn restaurant_id(mut self, id: impl Into<String>) -> Self {
		self.restaurant_id = id.into();
		self
	}

	pub fn restaurant_name(mut self, name: impl Into<String>) -> Self {
		self.restaurant_name = name.into();
		self
	}

	/// Selects the primary storage backend and its settings.
	pub fn storage(mut self, primary: impl Into<String>, settings: toml::Value) -> Self {
		let primary = primary.into();
		self.storage_implementations
			.insert(primary.clone(), settings);
		self.storage_primary = primary;
		self
	}

	/// Selects the menu implementation and its settings.
	pub fn menu(mut self, primary: impl Into<String>, settings: toml::Value) -> Self {
		let primary = primary.into();
		self.menu_implementations.insert(primary.clone(), settings);
		self.menu_primary = primary;
		self
	}

	pub fn enforce_transitions(mut self, enforce: bool) -> Self {
		self.orders.enforce_transitions = enforce;
		self
	}

	pub fn default_limit(mut self, limit: usize) -> Self {
		self.orders.default_limit = limit;
		self
	}

	pub fn history_limit(mut self, limit: usize) -> Self {
		self.orders.history_limit = limit;
		self
	}

	pub fn api(mut self, api: Option<ApiConfig>) -> Self {
		self.api = api;
		self
	}

	pub fn build(self) -> Config {
		Config {
			restaurant: RestaurantConfig {
				id: self.restaurant_id,
				name: self.restaurant_name,
			},
			storage: StorageConfig {
				primary: self.storage_primary,
				implementations: self.storage_implementations,
			},
			menu: MenuConfig {
				primary: self.menu_primary,
				implementations: self.menu_implementations,
			},
			orders: self.orders,
			api: self.api,
		}
	}
}
