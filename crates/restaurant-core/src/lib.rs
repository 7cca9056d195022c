//! Core ordering engine for the restaurant service.
//!
//! This crate ties the order store, the lifecycle rules, the heuristic
//! estimator and the query responder together behind [`RestaurantEngine`],
//! and provides the factory-driven builder that assembles an engine from
//! configuration.

use restaurant_menu::MenuError;
use restaurant_types::OrderStatus;
use thiserror::Error;

pub mod builder;
pub mod engine;
pub mod estimator;
pub mod intake;
pub mod responder;
pub mod state;

pub use builder::{BuilderError, RestaurantBuilder, RestaurantFactories};
pub use engine::{EngineError, RestaurantEngine};

/// Errors returned by order operations.
#[derive(Debug, Error)]
pub enum OrderError {
	/// Malformed or missing input.
	#[error("{0}")]
	Validation(String),
	/// No order with this id exists.
	#[error("Order not found: {0}")]
	NotFound(u64),
	/// An order referenced a menu item that does not exist.
	#[error("Menu item with ID {0} not found")]
	MenuItemNotFound(u64),
	/// The move is not allowed by the enforced lifecycle.
	#[error("Cannot move order from {from} to {to}")]
	InvalidTransition { from: OrderStatus, to: OrderStatus },
	/// The order is terminal, so there is nothing to apply.
	#[error("Order {0} has no pending recommendation")]
	NoRecommendation(u64),
	/// Storage failed even after falling back.
	#[error("Storage error: {0}")]
	Storage(String),
	/// The menu catalog failed.
	#[error("Menu error: {0}")]
	Menu(String),
}

impl From<MenuError> for OrderError {
	fn from(e: MenuError) -> Self {
		match e {
			MenuError::NotFound(id) => OrderError::MenuItemNotFound(id),
			other => OrderError::Menu(other.to_string()),
		}
	}
}
