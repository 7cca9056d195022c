//! Menu catalog module for the restaurant ordering service.
//!
//! The catalog is consulted when an order is placed, to snapshot the name and
//! price of every requested item, and by the menu endpoints for browsing.
//! Catalog sources plug in through [`MenuInterface`] the same way storage
//! backends do.

use async_trait::async_trait;
use restaurant_types::{ConfigSchema, ImplementationRegistry, MenuItem};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod static_menu;
}

/// Errors that can occur during menu lookups.
#[derive(Debug, Error)]
pub enum MenuError {
	/// No menu item with this id exists.
	#[error("Menu item with ID {0} not found")]
	NotFound(u64),
	/// The catalog source failed.
	#[error("Menu source error: {0}")]
	Source(String),
	/// Error that occurs when configuration is invalid.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Interface implemented by every menu catalog source.
#[async_trait]
pub trait MenuInterface: Send + Sync {
	/// Returns the configuration schema for this catalog source.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;

	/// Looks up a single item, available or not.
	async fn get_item(&self, id: u64) -> Result<MenuItem, MenuError>;

	/// Returns every item in the catalog.
	async fn list_items(&self) -> Result<Vec<MenuItem>, MenuError>;
}

/// Type alias for menu factory functions.
pub type MenuFactory = fn(&toml::Value) -> Result<Box<dyn MenuInterface>, MenuError>;

/// Registry trait for menu implementations.
pub trait MenuRegistry: ImplementationRegistry<Factory = MenuFactory> {}

/// Get all registered menu implementations as (name, factory) pairs.
pub fn get_all_implementations() -> Vec<(&'static str, MenuFactory)> {
	use implementations::static_menu;

	vec![(static_menu::Registry::NAME, static_menu::Registry::factory())]
}

/// Read-only view over the configured catalog source.
pub struct MenuService {
	source: Box<dyn MenuInterface>,
}

impl MenuService {
	pub fn new(source: Box<dyn MenuInterface>) -> Self {
		Self { source }
	}

	/// Looks up an item by id.
	///
	/// Unavailable items are still returned; availability only affects
	/// browsing.
	pub async fn item(&self, id: u64) -> Result<MenuItem, MenuError> {
		self.source.get_item(id).await
	}

	/// Available items, optionally restricted to one category, ordered by
	/// category and then name.
	pub async fn list(&self, category: Option<&str>) -> Result<Vec<MenuItem>, MenuError> {
		let mut items: Vec<MenuItem> = self
			.source
			.list_items()
			.await?
			.into_iter()
			.filter(|item| item.is_available)
			.filter(|item| category.is_none_or(|c| item.category == c))
			.collect();
		items.sort_by(|a, b| a.category.cmp(&b.category).then_with(|| a.name.cmp(&b.name)));
		Ok(items)
	}

	/// Available items grouped by category.
	pub async fn grouped(&self) -> Result<BTreeMap<String, Vec<MenuItem>>, MenuError> {
		let mut groups: BTreeMap<String, Vec<MenuItem>> = BTreeMap::new();
		for item in self.list(None).await? {
			groups.entry(item.category.clone()).or_default().push(item);
		}
		Ok(groups)
	}

	/// Distinct categories that have at least one available item, sorted.
	pub async fn categories(&self) -> Result<Vec<String>, MenuError> {
		let categories: BTreeSet<String> = self
			.list(None)
			.await?
			.into_iter()
			.map(|item| item.category)
			.collect();
		Ok(categories.into_iter().collect())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use implementations::static_menu::StaticMenu;
	use rust_decimal::Decimal;

	fn item(id: u64, name: &str, category: &str, available: bool) -> MenuItem {
		MenuItem {
			id,
			name: name.to_string(),
			description: String::new(),
			price: Decimal::from(10),
			category: category.to_string(),
			is_available: available,
		}
	}

	fn service() -> MenuService {
		MenuService::new(Box::new(StaticMenu::new(vec![
			item(1, "Vada", "breakfast", true),
			item(2, "Idli", "breakfast", true),
			item(3, "Samosa", "snacks", false),
			item(4, "Lemonade", "beverages", true),
		])))
	}

	#[tokio::test]
	async fn test_list_hides_unavailable_and_sorts() {
		let names: Vec<String> = service()
			.list(None)
			.await
			.unwrap()
			.into_iter()
			.map(|item| item.name)
			.collect();
		assert_eq!(names, vec!["Lemonade", "Idli", "Vada"]);
	}

	#[tokio::test]
	async fn test_list_by_category() {
		let items = service().list(Some("breakfast")).await.unwrap();
		assert_eq!(items.len(), 2);
		assert!(service().list(Some("snacks")).await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn test_categories_only_include_available_items() {
		let categories = service().categories().await.unwrap();
		assert_eq!(categories, vec!["beverages", "breakfast"]);
	}

	#[tokio::test]
	async fn test_unavailable_item_is_still_resolvable() {
		let item = service().item(3).await.unwrap();
		assert_eq!(item.name, "Samosa");
		assert!(matches!(service().item(99).await, Err(MenuError::NotFound(99))));
	}

	#[tokio::test]
	async fn test_grouped_by_category() {
		let groups = service().grouped().await.unwrap();
		assert_eq!(groups.len(), 2);
		assert_eq!(groups["breakfast"].len(), 2);
	}
}
