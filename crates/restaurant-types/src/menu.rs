//! Menu catalog types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A dish offered by the restaurant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
	pub id: u64,
	pub name: String,
	#[serde(default)]
	pub description: String,
	/// Current price; orders snapshot it at creation time.
	pub price: Decimal,
	pub category: String,
	#[serde(default = "default_available")]
	pub is_available: bool,
}

fn default_available() -> bool {
	true
}
