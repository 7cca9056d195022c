//! Coercion of order requests into typed drafts.
//!
//! Every requested item is resolved against the menu so line items carry
//! the catalog's name and price. Prices sent by the client are never used.

use crate::OrderError;
use restaurant_menu::MenuService;
use restaurant_types::{CreateOrderRequest, LineItem, NewOrder};
use rust_decimal::Decimal;
use std::str::FromStr;

const DEFAULT_CUSTOMER: &str = "Guest";
const DEFAULT_PAYMENT_MODE: &str = "cash";

/// Reads a monetary amount sent either as a JSON number or a numeric string.
///
/// `null` counts as absent.
pub fn parse_amount(
	field: &str,
	value: Option<&serde_json::Value>,
) -> Result<Option<Decimal>, OrderError> {
	let not_numeric = || OrderError::Validation(format!("{} must be a number", field));

	let text = match value {
		None | Some(serde_json::Value::Null) => return Ok(None),
		Some(serde_json::Value::Number(n)) => n.to_string(),
		Some(serde_json::Value::String(s)) => s.trim().to_string(),
		Some(_) => return Err(not_numeric()),
	};

	Decimal::from_str(&text)
		.or_else(|_| Decimal::from_scientific(&text))
		.map(Some)
		.map_err(|_| not_numeric())
}

/// Builds a draft order from a request body.
pub async fn draft_from_request(
	request: CreateOrderRequest,
	menu: &MenuService,
) -> Result<NewOrder, OrderError> {
	if request.items.is_empty() {
		return Err(OrderError::Validation(
			"Order must contain at least one item".into(),
		));
	}

	let total_amount = parse_amount("Total amount", request.total_amount.as_ref())?;
	let tax_amount = parse_amount("Tax", request.tax.as_ref())?.unwrap_or(Decimal::ZERO);

	let mut items = Vec::with_capacity(request.items.len());
	for requested in &request.items {
		let quantity = u32::try_from(requested.quantity)
			.ok()
			.filter(|q| *q > 0)
			.ok_or_else(|| {
				OrderError::Validation(format!(
					"Quantity for menu item {} must be a positive integer",
					requested.id
				))
			})?;
		let entry = menu.item(requested.id).await?;
		if entry.price.checked_mul(Decimal::from(quantity)).is_none() {
			return Err(OrderError::Validation(format!(
				"Line total for menu item {} is out of range",
				requested.id
			)));
		}
		items.push(LineItem::new(entry.id, entry.name, quantity, entry.price));
	}

	let customer = request.customer_info.unwrap_or_default();
	Ok(NewOrder {
		customer_name: customer
			.name
			.filter(|name| !name.trim().is_empty())
			.unwrap_or_else(|| DEFAULT_CUSTOMER.to_string()),
		customer_phone: customer.phone.unwrap_or_default(),
		payment_mode: request
			.payment_mode
			.filter(|mode| !mode.trim().is_empty())
			.unwrap_or_else(|| DEFAULT_PAYMENT_MODE.to_string()),
		items,
		total_amount,
		tax_amount,
	})
}
