//! Order lifecycle rules.
//!
//! Orders move along `pending -> confirmed -> preparing -> ready -> delivered`.
//! Any non-terminal order may also be cancelled. `delivered` and `cancelled`
//! are terminal.
//!
//! These are pure lookups. Whether the store enforces [`can_transition`] is a
//! configuration choice (`orders.enforce_transitions`).

use once_cell::sync::Lazy;
use restaurant_types::OrderStatus;
use std::collections::{HashMap, HashSet};

/// The forward flow, without the cancellation branch.
pub const FLOW: [OrderStatus; 5] = [
	OrderStatus::Pending,
	OrderStatus::Confirmed,
	OrderStatus::Preparing,
	OrderStatus::Ready,
	OrderStatus::Delivered,
];

static TRANSITIONS: Lazy<HashMap<OrderStatus, HashSet<OrderStatus>>> = Lazy::new(|| {
	let mut table: HashMap<OrderStatus, HashSet<OrderStatus>> = FLOW
		.windows(2)
		.map(|pair| (pair[0], HashSet::from([pair[1], OrderStatus::Cancelled])))
		.collect();
	table.insert(OrderStatus::Delivered, HashSet::new());
	table.insert(OrderStatus::Cancelled, HashSet::new());
	table
});

/// Whether no further transition is possible.
pub fn is_terminal(status: OrderStatus) -> bool {
	matches!(status, OrderStatus::Delivered | OrderStatus::Cancelled)
}

/// Next status in the forward flow, or `None` for terminal statuses.
pub fn next(status: OrderStatus) -> Option<OrderStatus> {
	if is_terminal(status) {
		return None;
	}
	let index = FLOW.iter().position(|s| *s == status)?;
	FLOW.get(index + 1).copied()
}

/// Statuses still ahead of an order, through `delivered`.
///
/// Empty for terminal statuses.
pub fn remaining_after(status: OrderStatus) -> &'static [OrderStatus] {
	if is_terminal(status) {
		return &[];
	}
	match FLOW.iter().position(|s| *s == status) {
		Some(index) => &FLOW[index + 1..],
		None => &[],
	}
}

/// Whether `from -> to` is a legal move in the enforced lifecycle.
pub fn can_transition(from: OrderStatus, to: OrderStatus) -> bool {
	TRANSITIONS.get(&from).is_some_and(|allowed| allowed.contains(&to))
}
