//! Order types for the restaurant ordering system.
//!
//! This module defines the persisted order record, its line items and the
//! status enum that drives the order lifecycle.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a status string is not one of the defined statuses.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Invalid status '{0}'. Valid statuses: pending, confirmed, preparing, ready, delivered, cancelled")]
pub struct InvalidStatus(pub String);

/// Status of an order in the kitchen workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
	/// Order has been placed but not yet accepted by staff.
	Pending,
	/// Order has been accepted.
	Confirmed,
	/// Kitchen is working on the order.
	Preparing,
	/// Order is ready for pickup or delivery.
	Ready,
	/// Order has been handed to the customer.
	Delivered,
	/// Order was cancelled before completion.
	Cancelled,
}

impl OrderStatus {
	/// Every defined status, in workflow order with `Cancelled` last.
	pub const ALL: [OrderStatus; 6] = [
		OrderStatus::Pending,
		OrderStatus::Confirmed,
		OrderStatus::Preparing,
		OrderStatus::Ready,
		OrderStatus::Delivered,
		OrderStatus::Cancelled,
	];

	/// Returns the wire representation of the status.
	pub fn as_str(&self) -> &'static str {
		match self {
			OrderStatus::Pending => "pending",
			OrderStatus::Confirmed => "confirmed",
			OrderStatus::Preparing => "preparing",
			OrderStatus::Ready => "ready",
			OrderStatus::Delivered => "delivered",
			OrderStatus::Cancelled => "cancelled",
		}
	}
}

impl fmt::Display for OrderStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for OrderStatus {
	type Err = InvalidStatus;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		OrderStatus::ALL
			.into_iter()
			.find(|status| status.as_str() == s)
			.ok_or_else(|| InvalidStatus(s.to_string()))
	}
}

/// One menu entry within an order, with its price captured at order time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
	/// Menu entry this line refers to.
	pub menu_item_id: u64,
	/// Menu entry name at the time of ordering.
	pub name: String,
	/// Number of units ordered.
	pub quantity: u32,
	/// Unit price snapshot.
	pub price: Decimal,
	/// `price * quantity`.
	pub total: Decimal,
}

impl LineItem {
	/// Creates a line item and computes its total from the price snapshot.
	pub fn new(menu_item_id: u64, name: impl Into<String>, quantity: u32, price: Decimal) -> Self {
		Self {
			menu_item_id,
			name: name.into(),
			quantity,
			price,
			total: price * Decimal::from(quantity),
		}
	}
}

/// A placed order.
///
/// Line items and amounts are fixed at creation; only `status` and
/// `updated_at` change afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
	/// Sequential identifier.
	pub id: u64,
	pub customer_name: String,
	pub customer_phone: String,
	/// How the customer intends to pay (e.g. "cash").
	pub payment_mode: String,
	pub items: Vec<LineItem>,
	/// Sum of line totals.
	pub subtotal: Decimal,
	pub tax_amount: Decimal,
	/// `subtotal + tax_amount`.
	pub total_amount: Decimal,
	pub status: OrderStatus,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl Order {
	/// Total number of units across all lines.
	pub fn item_count(&self) -> u64 {
		self.items.iter().map(|item| u64::from(item.quantity)).sum()
	}

	/// Number of distinct lines.
	pub fn line_count(&self) -> usize {
		self.items.len()
	}
}

/// Input accepted by the order store when creating an order.
///
/// Line items already carry their price snapshots. `total_amount` is the
/// client-declared total and is checked against the computed one.
#[derive(Debug, Clone)]
pub struct NewOrder {
	pub customer_name: String,
	pub customer_phone: String,
	pub payment_mode: String,
	pub items: Vec<LineItem>,
	pub total_amount: Option<Decimal>,
	pub tax_amount: Decimal,
}

/// Sales figures for the current local day.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySales {
	pub count: usize,
	pub revenue: Decimal,
	pub avg_order_value: Decimal,
}

/// Sales figures for the current local month.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MonthlySales {
	pub count: usize,
	pub revenue: Decimal,
}

/// Aggregated sales report.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SalesStats {
	pub today: DailySales,
	pub month: MonthlySales,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_status_round_trips_through_strings() {
		for status in OrderStatus::ALL {
			assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
			assert_eq!(status.to_string(), status.as_str());
		}
	}

	#[test]
	fn test_unknown_status_is_rejected() {
		let err = "shipped".parse::<OrderStatus>().unwrap_err();
		assert_eq!(err, InvalidStatus("shipped".to_string()));
		assert!(err.to_string().contains("Valid statuses"));
		assert!("Pending".parse::<OrderStatus>().is_err());
	}

	#[test]
	fn test_status_serializes_lowercase() {
		let json = serde_json::to_string(&OrderStatus::Preparing).unwrap();
		assert_eq!(json, "\"preparing\"");
	}

	#[test]
	fn test_line_total_is_price_times_quantity() {
		let item = LineItem::new(1, "Idli", 3, Decimal::new(3050, 2));
		assert_eq!(item.total, Decimal::new(9150, 2));
	}

	#[test]
	fn test_item_and_line_counts() {
		let now = Utc::now();
		let order = Order {
			id: 1,
			customer_name: "Guest".into(),
			customer_phone: String::new(),
			payment_mode: "cash".into(),
			items: vec![
				LineItem::new(1, "Idli", 2, Decimal::from(30)),
				LineItem::new(2, "Dosa", 4, Decimal::from(25)),
			],
			subtotal: Decimal::from(160),
			tax_amount: Decimal::ZERO,
			total_amount: Decimal::from(160),
			status: OrderStatus::Pending,
			created_at: now,
			updated_at: now,
		};
		assert_eq!(order.item_count(), 6);
		assert_eq!(order.line_count(), 2);
	}
}
