//! Restaurant engine.
//!
//! [`RestaurantEngine`] is the single entry point used by the HTTP layer.
//! It owns the order store and the menu, and runs the estimator and the
//! query responder against fresh order history on every call.

pub mod lifecycle;

use crate::estimator::Estimator;
use crate::responder;
use crate::state::OrderStore;
use crate::{intake, OrderError};
use chrono::Utc;
use restaurant_config::Config;
use restaurant_menu::MenuService;
use restaurant_storage::StorageService;
use restaurant_types::{
	ChatResponse, CreateOrderRequest, Order, OrderInsights, OrderStatus, Recommendation,
	SalesStats, StatusPrediction, StorageStatus,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::instrument;

/// Errors raised while starting or stopping the engine.
#[derive(Debug, Error)]
pub enum EngineError {
	#[error("Service error: {0}")]
	Service(String),
}

#[derive(Clone)]
pub struct RestaurantEngine {
	pub(crate) config: Config,
	pub(crate) storage: Arc<StorageService>,
	pub(crate) orders: Arc<OrderStore>,
	pub(crate) menu: Arc<MenuService>,
}

impl RestaurantEngine {
	pub fn new(config: Config, storage: Arc<StorageService>, menu: Arc<MenuService>) -> Self {
		let orders = Arc::new(OrderStore::new(
			storage.clone(),
			config.orders.enforce_transitions,
		));
		Self {
			config,
			storage,
			orders,
			menu,
		}
	}

	pub fn config(&self) -> &Config {
		&self.config
	}

	pub fn menu(&self) -> &MenuService {
		&self.menu
	}

	/// Current storage mode and, after a fault, why and since when.
	pub fn storage_status(&self) -> StorageStatus {
		self.storage.status()
	}

	/// Places an order from a request body.
	#[instrument(skip_all, fields(lines = request.items.len()))]
	pub async fn place_order(&self, request: CreateOrderRequest) -> Result<Order, OrderError> {
		let draft = intake::draft_from_request(request, &self.menu).await?;
		self.orders.create(draft).await
	}

	pub async fn order(&self, id: u64) -> Result<Order, OrderError> {
		self.orders.get(id).await
	}

	/// Most recent orders; `None` uses the configured default limit.
	pub async fn recent_orders(&self, limit: Option<usize>) -> Result<Vec<Order>, OrderError> {
		let limit = limit.unwrap_or(self.config.orders.default_limit);
		self.orders.list_recent(limit).await
	}

	pub async fn orders_by_status(&self, status: &str) -> Result<Vec<Order>, OrderError> {
		let status = parse_status(status)?;
		self.orders.list_by_status(status).await
	}

	pub async fn todays_orders(&self) -> Result<Vec<Order>, OrderError> {
		self.orders.list_today().await
	}

	#[instrument(skip_all, fields(order_id = id, status = %status))]
	pub async fn update_status(&self, id: u64, status: &str) -> Result<Order, OrderError> {
		let status = parse_status(status)?;
		self.orders.update_status(id, status).await
	}

	pub async fn sales_stats(&self) -> Result<SalesStats, OrderError> {
		self.orders.sales_stats().await
	}

	async fn estimator(&self) -> Result<Estimator, OrderError> {
		let history = self
			.orders
			.list_recent(self.config.orders.history_limit)
			.await?;
		Ok(Estimator::from_history(&history))
	}

	#[instrument(skip_all, fields(order_id = id))]
	pub async fn order_insights(&self, id: u64) -> Result<OrderInsights, OrderError> {
		let order = self.orders.get(id).await?;
		let estimator = self.estimator().await?;
		Ok(estimator.order_insights(&order, Utc::now()))
	}

	/// The order's current status and, unless it is terminal, the
	/// suggested next one.
	#[instrument(skip_all, fields(order_id = id))]
	pub async fn predict(
		&self,
		id: u64,
	) -> Result<(OrderStatus, Option<StatusPrediction>), OrderError> {
		let order = self.orders.get(id).await?;
		let estimator = self.estimator().await?;
		Ok((order.status, estimator.predict_next_status(&order, Utc::now())))
	}

	/// Suggested moves for active orders; `None` uses the configured limit.
	#[instrument(skip_all)]
	pub async fn recommendations(
		&self,
		limit: Option<usize>,
	) -> Result<Vec<Recommendation>, OrderError> {
		let limit = limit.unwrap_or(self.config.orders.recommendation_limit);
		let history = self
			.orders
			.list_recent(self.config.orders.history_limit)
			.await?;
		let estimator = Estimator::from_history(&history);
		Ok(estimator.recommendations(&history, Utc::now(), limit))
	}

	/// Moves an order to its suggested next status.
	#[instrument(skip_all, fields(order_id = id))]
	pub async fn apply_recommendation(&self, id: u64) -> Result<Order, OrderError> {
		let (_, prediction) = self.predict(id).await?;
		let prediction = prediction.ok_or(OrderError::NoRecommendation(id))?;
		tracing::info!(
			suggested = %prediction.suggested_status,
			confidence = prediction.confidence,
			"Applying recommendation"
		);
		self.orders
			.update_status(id, prediction.suggested_status)
			.await
	}

	/// Answers a free-text question about an order.
	#[instrument(skip_all)]
	pub async fn chat(&self, query: &str, order_id: Option<u64>) -> Result<ChatResponse, OrderError> {
		let parsed = responder::parse_query(query, order_id);
		let now = Utc::now();

		let Some(id) = parsed.lookup_id() else {
			return Ok(responder::respond(&parsed, None, now));
		};
		let order = match self.orders.get(id).await {
			Ok(order) => order,
			Err(OrderError::NotFound(_)) => return Ok(responder::respond(&parsed, None, now)),
			Err(e) => return Err(e),
		};
		let insights = self.estimator().await?.order_insights(&order, now);
		Ok(responder::respond(&parsed, Some((&order, &insights)), now))
	}
}

fn parse_status(status: &str) -> Result<OrderStatus, OrderError> {
	status
		.parse()
		.map_err(|e: restaurant_types::InvalidStatus| OrderError::Validation(e.to_string()))
}
