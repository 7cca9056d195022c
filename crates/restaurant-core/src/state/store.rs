//! Persistent order store.
//!
//! Each order, line items included, is a single storage record under the
//! `orders` namespace, so a reader sees either the whole order or nothing.
//! Identifiers come from a counter record under `sequences`; assignment is
//! serialized by an async mutex that also remembers the highest id handed out
//! in this process, keeping ids monotonic even if storage falls back to an
//! empty in-memory store mid-run. The first assignment after startup also
//! looks at the stored order ids, so a lost or corrupt counter cannot cause
//! an existing order to be overwritten.

use crate::state::lifecycle;
use crate::OrderError;
use chrono::{DateTime, Datelike, Local, Utc};
use restaurant_storage::{StorageError, StorageService};
use restaurant_types::{
	round_money, NewOrder, Order, OrderStatus, SalesStats, StorageKey,
};
use rust_decimal::Decimal;
use std::cmp::Reverse;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Largest accepted difference between a client's declared total and the
/// computed one.
const TOTAL_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Counter record holding the last assigned order id.
const ORDER_SEQUENCE: &str = "orders";

pub struct OrderStore {
	storage: Arc<StorageService>,
	/// Highest id issued by this process.
	issued: Mutex<u64>,
	enforce_transitions: bool,
}

fn storage_error(e: StorageError) -> OrderError {
	OrderError::Storage(e.to_string())
}

impl OrderStore {
	pub fn new(storage: Arc<StorageService>, enforce_transitions: bool) -> Self {
		Self {
			storage,
			issued: Mutex::new(0),
			enforce_transitions,
		}
	}

	/// Validates a draft, assigns the next id and persists the order.
	pub async fn create(&self, draft: NewOrder) -> Result<Order, OrderError> {
		if draft.items.is_empty() {
			return Err(OrderError::Validation(
				"Order must contain at least one item".into(),
			));
		}
		let declared_total = draft
			.total_amount
			.ok_or_else(|| OrderError::Validation("Total amount is required".into()))?;
		if draft.tax_amount.is_sign_negative() {
			return Err(OrderError::Validation("Tax cannot be negative".into()));
		}
		if let Some(item) = draft.items.iter().find(|item| item.quantity == 0) {
			return Err(OrderError::Validation(format!(
				"Quantity for menu item {} must be a positive integer",
				item.menu_item_id
			)));
		}

		let out_of_range = || OrderError::Validation("Order amounts are out of range".into());
		let subtotal = draft
			.items
			.iter()
			.try_fold(Decimal::ZERO, |sum, item| sum.checked_add(item.total))
			.ok_or_else(out_of_range)?;
		let total_amount = subtotal
			.checked_add(draft.tax_amount)
			.ok_or_else(out_of_range)?;
		let difference = declared_total
			.checked_sub(total_amount)
			.ok_or_else(out_of_range)?;
		if difference.abs() > TOTAL_TOLERANCE {
			return Err(OrderError::Validation(format!(
				"Total amount {} does not match subtotal {} plus tax {}",
				declared_total, subtotal, draft.tax_amount
			)));
		}

		let mut issued = self.issued.lock().await;
		let stored: u64 = match self
			.storage
			.retrieve(StorageKey::Sequences.as_str(), ORDER_SEQUENCE)
			.await
		{
			Ok(value) => value,
			Err(StorageError::NotFound) => 0,
			Err(StorageError::Serialization(reason)) => {
				tracing::warn!(
					component = "order_store",
					error = %reason,
					"Order sequence unreadable, continuing from stored orders"
				);
				0
			},
			Err(e) => return Err(storage_error(e)),
		};
		let mut last = stored.max(*issued);
		// First id of this process: never reuse an id that is already on disk.
		if *issued == 0 {
			last = last.max(self.highest_stored_id().await?);
		}
		let id = last + 1;

		// Counter first: a failed order write leaves a gap, never a reused id.
		self.storage
			.store(StorageKey::Sequences.as_str(), ORDER_SEQUENCE, &id)
			.await
			.map_err(storage_error)?;

		let now = Utc::now();
		let order = Order {
			id,
			customer_name: draft.customer_name,
			customer_phone: draft.customer_phone,
			payment_mode: draft.payment_mode,
			items: draft.items,
			subtotal,
			tax_amount: draft.tax_amount,
			total_amount,
			status: OrderStatus::Pending,
			created_at: now,
			updated_at: now,
		};
		self.storage
			.store(StorageKey::Orders.as_str(), &id.to_string(), &order)
			.await
			.map_err(storage_error)?;
		*issued = id;

		tracing::info!(
			order_id = id,
			total = %order.total_amount,
			lines = order.line_count(),
			"Order created"
		);
		Ok(order)
	}

	/// Loads one order. A record that cannot be decoded is treated like a
	/// missing one, matching how listings skip it.
	pub async fn get(&self, id: u64) -> Result<Order, OrderError> {
		self.storage
			.retrieve(StorageKey::Orders.as_str(), &id.to_string())
			.await
			.map_err(|e| match e {
				StorageError::NotFound => OrderError::NotFound(id),
				StorageError::Serialization(reason) => {
					tracing::warn!(order_id = id, error = %reason, "Skipping undecodable order");
					OrderError::NotFound(id)
				},
				other => storage_error(other),
			})
	}

	/// Highest id among stored order records, readable or not.
	async fn highest_stored_id(&self) -> Result<u64, OrderError> {
		let ids = self
			.storage
			.ids(StorageKey::Orders.as_str())
			.await
			.map_err(storage_error)?;
		Ok(ids
			.iter()
			.filter_map(|id| id.parse::<u64>().ok())
			.max()
			.unwrap_or(0))
	}

	/// Sets a new status and stamps `updated_at`.
	///
	/// Concurrent updates to one order are last-write-wins.
	pub async fn update_status(&self, id: u64, status: OrderStatus) -> Result<Order, OrderError> {
		let mut order = self.get(id).await?;

		if self.enforce_transitions && !lifecycle::can_transition(order.status, status) {
			return Err(OrderError::InvalidTransition {
				from: order.status,
				to: status,
			});
		}

		let previous = order.status;
		order.status = status;
		order.updated_at = Utc::now();

		self.storage
			.update(StorageKey::Orders.as_str(), &id.to_string(), &order)
			.await
			.map_err(|e| match e {
				StorageError::NotFound => OrderError::NotFound(id),
				other => storage_error(other),
			})?;

		tracing::info!(order_id = id, from = %previous, status = %status, "Order status updated");
		Ok(order)
	}

	/// Every stored order, newest first.
	///
	/// Reads and decodes the whole `orders` namespace on each call, so list,
	/// stats and estimator requests cost O(stored orders).
	async fn all(&self) -> Result<Vec<Order>, OrderError> {
		let mut orders: Vec<Order> = self
			.storage
			.retrieve_all(StorageKey::Orders.as_str())
			.await
			.map_err(storage_error)?
			.into_iter()
			.map(|(_, order)| order)
			.collect();
		sort_newest_first(&mut orders);
		Ok(orders)
	}

	/// Most recent orders, bounded by `limit`.
	pub async fn list_recent(&self, limit: usize) -> Result<Vec<Order>, OrderError> {
		let mut orders = self.all().await?;
		orders.truncate(limit);
		Ok(orders)
	}

	pub async fn list_by_status(&self, status: OrderStatus) -> Result<Vec<Order>, OrderError> {
		let mut orders = self.all().await?;
		orders.retain(|order| order.status == status);
		Ok(orders)
	}

	/// Orders created on the current local calendar day.
	pub async fn list_today(&self) -> Result<Vec<Order>, OrderError> {
		let today = Local::now().date_naive();
		let mut orders = self.all().await?;
		orders.retain(|order| order.created_at.with_timezone(&Local).date_naive() == today);
		Ok(orders)
	}

	pub async fn sales_stats(&self) -> Result<SalesStats, OrderError> {
		let orders = self.all().await?;
		Ok(sales_stats_at(&orders, Local::now()))
	}
}

/// Creation time descending; ids break ties so the order is stable.
fn sort_newest_first(orders: &mut [Order]) {
	orders.sort_by_key(|order| Reverse((order.created_at, order.id)));
}

/// Sales figures for the local day and month containing `now`.
///
/// Every status counts, cancelled orders included.
pub fn sales_stats_at(orders: &[Order], now: DateTime<Local>) -> SalesStats {
	let today = now.date_naive();
	let mut stats = SalesStats::default();

	for order in orders {
		let created = order.created_at.with_timezone(&Local).date_naive();
		if created.year() != today.year() || created.month() != today.month() {
			continue;
		}
		stats.month.count += 1;
		stats.month.revenue += order.total_amount;
		if created == today {
			stats.today.count += 1;
			stats.today.revenue += order.total_amount;
		}
	}

	if stats.today.count > 0 {
		stats.today.avg_order_value =
			round_money(stats.today.revenue / Decimal::from(stats.today.count));
	}
	stats
}
