//! Estimator output types.
//!
//! These are the values produced by the heuristic estimator and the query
//! responder. They are plain data; the rules that compute them live in
//! `restaurant-core`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Order, OrderStatus};

/// Summary of dwell times observed for one status, in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatusStats {
	pub avg: f64,
	pub min: f64,
	pub max: f64,
	pub count: usize,
}

/// Suggested next status for an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusPrediction {
	pub suggested_status: OrderStatus,
	/// Heuristic percentage between 50 and 95.
	pub confidence: u8,
	pub elapsed_minutes: i64,
	pub expected_minutes: i64,
	pub reason: String,
}

/// How much work an order represents for the kitchen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplexityLevel {
	Low,
	Normal,
	High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
	Warning,
	Info,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightPriority {
	High,
	Medium,
}

/// A single actionable note about an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
	#[serde(rename = "type")]
	pub kind: InsightKind,
	pub message: String,
	pub priority: InsightPriority,
}

/// Everything the estimator can say about one order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderInsights {
	pub order_id: u64,
	pub current_status: OrderStatus,
	pub elapsed_minutes: i64,
	pub prediction: Option<StatusPrediction>,
	pub estimated_delivery: Option<DateTime<Utc>>,
	pub complexity_level: ComplexityLevel,
	pub item_count: u64,
	pub insights: Vec<Insight>,
}

/// A suggested status change for an active order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
	pub order_id: u64,
	pub customer_name: String,
	pub current_status: OrderStatus,
	pub suggested_status: OrderStatus,
	pub recommended_action: String,
	pub confidence: u8,
	pub reason: String,
	pub elapsed_minutes: i64,
}

/// Reply produced by the query responder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
	pub response: String,
	pub needs_order_id: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub order_data: Option<Order>,
}

impl ChatResponse {
	/// Reply that carries no order payload.
	pub fn text(response: impl Into<String>, needs_order_id: bool) -> Self {
		Self {
			response: response.into(),
			needs_order_id,
			order_data: None,
		}
	}
}
