//! Static menu catalog.
//!
//! Serves a fixed list of items held in memory. Without configuration it
//! serves the house menu; an `items` array in the implementation's settings
//! replaces it entirely.

use crate::{MenuError, MenuFactory, MenuInterface, MenuRegistry};
use async_trait::async_trait;
use restaurant_types::{
	ConfigSchema, Field, FieldType, ImplementationRegistry, MenuItem, Schema, SchemaError,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};

/// (name, description, price, category)
const HOUSE_MENU: &[(&str, &str, i64, &str)] = &[
	("Idli", "Steamed rice cakes served with sambar and chutney", 30, "breakfast"),
	("Dosa", "Crispy rice pancake served with sambar and chutney", 25, "breakfast"),
	("Poha", "Flattened rice dish with vegetables and spices", 40, "breakfast"),
	("Upma", "Semolina breakfast dish with vegetables", 30, "breakfast"),
	("Vada", "Deep fried lentil donuts served with chutney", 20, "breakfast"),
	("Puri", "Deep fried bread served with curry", 40, "breakfast"),
	("Meals", "Traditional South Indian meals with rice, curry, and sides", 100, "lunch"),
	("Egg Biryani", "Fragrant basmati rice cooked with eggs and spices", 125, "lunch"),
	("Chicken Biryani", "Aromatic chicken biryani with basmati rice", 150, "lunch"),
	("Egg Fried Rice", "Stir-fried rice with eggs and vegetables", 110, "lunch"),
	("Chicken Fried Rice", "Stir-fried rice with chicken and vegetables", 120, "lunch"),
	("Mushroom Biryani", "Vegetarian biryani with fresh mushrooms", 170, "lunch"),
	("Bhel Puri", "Puffed rice snack with chutneys and vegetables", 30, "snacks"),
	("Samosa", "Deep fried pastry filled with spiced potatoes", 25, "snacks"),
	("Pani Puri", "Water filled crispy shells with spiced water", 40, "snacks"),
	("Gobi Manchurian", "Indo-Chinese cauliflower dish in spicy sauce", 60, "dinner"),
	("Mattar Paneer", "Peas and cottage cheese curry with spices", 75, "dinner"),
	("Roti+Curry", "Flatbread served with vegetable curry", 85, "dinner"),
	("Butter Naan+Curry", "Butter naan bread with rich curry", 95, "dinner"),
	("Lemonade", "Fresh lemon drink with mint and sugar", 15, "beverages"),
	("Apple Juice", "Fresh apple juice without preservatives", 40, "beverages"),
	("Grape Juice", "Fresh grape juice with natural sweetness", 50, "beverages"),
	("Sprite", "Lemon-lime flavored carbonated soft drink", 20, "beverages"),
	("Chocolate Milkshake", "Rich chocolate milkshake with ice cream", 70, "beverages"),
	("Vanilla", "Classic vanilla ice cream with natural flavor", 20, "icecreams"),
	("Strawberry", "Fresh strawberry ice cream with fruit pieces", 40, "icecreams"),
	("Butter Scotch", "Butterscotch flavored ice cream with caramel", 30, "icecreams"),
	("Mint Chocolate Chip", "Mint ice cream with chocolate chips", 45, "icecreams"),
];

/// The house menu, numbered from 1 in listing order.
pub fn house_menu() -> Vec<MenuItem> {
	HOUSE_MENU
		.iter()
		.zip(1u64..)
		.map(|(&(name, description, price, category), id)| MenuItem {
			id,
			name: name.to_string(),
			description: description.to_string(),
			price: Decimal::from(price),
			category: category.to_string(),
			is_available: true,
		})
		.collect()
}

#[derive(Debug, Default, Deserialize)]
struct StaticMenuConfig {
	items: Option<Vec<MenuItem>>,
}

/// In-memory catalog keyed by item id.
pub struct StaticMenu {
	items: BTreeMap<u64, MenuItem>,
}

impl StaticMenu {
	pub fn new(items: Vec<MenuItem>) -> Self {
		Self {
			items: items.into_iter().map(|item| (item.id, item)).collect(),
		}
	}
}

impl Default for StaticMenu {
	fn default() -> Self {
		Self::new(house_menu())
	}
}

#[async_trait]
impl MenuInterface for StaticMenu {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(StaticMenuSchema)
	}

	async fn get_item(&self, id: u64) -> Result<MenuItem, MenuError> {
		self.items.get(&id).cloned().ok_or(MenuError::NotFound(id))
	}

	async fn list_items(&self) -> Result<Vec<MenuItem>, MenuError> {
		Ok(self.items.values().cloned().collect())
	}
}

/// Configuration schema for the static menu.
pub struct StaticMenuSchema;

impl ConfigSchema for StaticMenuSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), SchemaError> {
		Schema::new()
			.optional(
				Field::new("items", FieldType::Array(Box::new(FieldType::Table))).with_validator(
					|value| {
						let items = value.as_array().map(Vec::as_slice).unwrap_or_default();
						if items.is_empty() {
							return Err("must contain at least one item".to_string());
						}
						for item in items {
							for key in ["id", "name", "price", "category"] {
								if item.get(key).is_none() {
									return Err(format!("every item needs '{}'", key));
								}
							}
						}
						Ok(())
					},
				),
			)
			.validate(config)
	}
}

/// Factory function to create a static menu from configuration.
///
/// Configuration parameters:
/// - `items`: optional array of `{ id, name, description, price, category, is_available }`
///   tables replacing the house menu
pub fn create_menu(config: &toml::Value) -> Result<Box<dyn MenuInterface>, MenuError> {
	StaticMenuSchema
		.validate(config)
		.map_err(|e| MenuError::Configuration(e.to_string()))?;

	let parsed: StaticMenuConfig = config
		.clone()
		.try_into()
		.map_err(|e| MenuError::Configuration(format!("Invalid static menu config: {}", e)))?;

	let Some(items) = parsed.items else {
		return Ok(Box::new(StaticMenu::default()));
	};

	let mut seen = HashSet::new();
	for item in &items {
		if !seen.insert(item.id) {
			return Err(MenuError::Configuration(format!(
				"Duplicate menu item id {}",
				item.id
			)));
		}
		if item.price.is_sign_negative() {
			return Err(MenuError::Configuration(format!(
				"Menu item {} has a negative price",
				item.id
			)));
		}
	}

	tracing::debug!(
		implementation = "static",
		item_count = items.len(),
		"Loaded menu from configuration"
	);
	Ok(Box::new(StaticMenu::new(items)))
}

/// Registry for the static menu implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "static";
	type Factory = MenuFactory;

	fn factory() -> Self::Factory {
		create_menu
	}
}

impl MenuRegistry for Registry {}
