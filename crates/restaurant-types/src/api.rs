//! API types for the restaurant HTTP API.
//!
//! Request bodies are deserialized into these types at the HTTP boundary and
//! then coerced into strongly typed drafts before reaching the order store.
//! Field names follow the camelCase convention of the browser client.

use axum::{
	http::StatusCode,
	response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{
	ChatResponse, OrderInsights, Order, OrderStatus, Recommendation, StatusPrediction,
};

/// Customer contact details attached to an order request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerInfo {
	pub name: Option<String>,
	pub phone: Option<String>,
}

/// One requested menu entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemRequest {
	/// Menu item identifier.
	pub id: u64,
	/// Requested units; must be positive.
	pub quantity: i64,
}

/// Request for placing an order.
///
/// Amounts are kept as raw JSON values so that numeric strings sent by older
/// clients are accepted while anything non-numeric is rejected explicitly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
	#[serde(default)]
	pub items: Vec<OrderItemRequest>,
	pub customer_info: Option<CustomerInfo>,
	pub total_amount: Option<serde_json::Value>,
	pub tax: Option<serde_json::Value>,
	pub payment_mode: Option<String>,
}

/// Response returned after an order has been placed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
	pub success: bool,
	pub message: String,
	pub order_id: u64,
	pub order: Order,
}

/// Request for changing an order's status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
	pub status: String,
}

/// Response returned after a status change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusResponse {
	pub success: bool,
	pub message: String,
	pub order: Order,
}

/// Query parameters for list endpoints.
///
/// A `limit` that is not a non-negative integer is ignored, so the endpoint
/// falls back to its default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListQuery {
	#[serde(default, deserialize_with = "lenient_limit")]
	pub limit: Option<usize>,
}

fn lenient_limit<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
where
	D: serde::Deserializer<'de>,
{
	let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
	Ok(match raw {
		Some(serde_json::Value::String(text)) => text.trim().parse().ok(),
		Some(serde_json::Value::Number(n)) => n.as_u64().and_then(|n| usize::try_from(n).ok()),
		_ => None,
	})
}

/// Request for the chat endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatbotRequest {
	pub query: Option<String>,
	pub order_id: Option<u64>,
}

/// Response wrapper for the chat endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatbotResponse {
	pub success: bool,
	#[serde(flatten)]
	pub reply: ChatResponse,
}

/// Response for the insights endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightsResponse {
	pub success: bool,
	pub insights: OrderInsights,
}

/// Response for the prediction endpoint.
///
/// `prediction` is absent when the order is already in a terminal status.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResponse {
	pub success: bool,
	pub current_status: OrderStatus,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub prediction: Option<StatusPrediction>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub message: Option<String>,
}

/// Response for the recommendations endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationsResponse {
	pub success: bool,
	pub recommendations: Vec<Recommendation>,
	pub count: usize,
}

/// Response for the health endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
	pub status: String,
	pub message: String,
	pub timestamp: DateTime<Utc>,
}

/// API error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
	/// Machine-checkable error category.
	pub error: String,
	/// Human-readable description.
	pub message: String,
	/// Additional error context.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<serde_json::Value>,
}

/// Structured API error type with HTTP status mapping.
#[derive(Debug)]
pub enum APIError {
	/// Malformed or missing input (400).
	BadRequest {
		error_type: String,
		message: String,
		details: Option<serde_json::Value>,
	},
	/// Referenced resource does not exist (404).
	NotFound { error_type: String, message: String },
	/// Well-formed request the current state does not allow (422).
	UnprocessableEntity {
		error_type: String,
		message: String,
		details: Option<serde_json::Value>,
	},
	/// Internal server error (500).
	InternalServerError { error_type: String, message: String },
}

impl APIError {
	/// Get the HTTP status code for this error.
	pub fn status_code(&self) -> StatusCode {
		match self {
			APIError::BadRequest { .. } => StatusCode::BAD_REQUEST,
			APIError::NotFound { .. } => StatusCode::NOT_FOUND,
			APIError::UnprocessableEntity { .. } => StatusCode::UNPROCESSABLE_ENTITY,
			APIError::InternalServerError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	/// Convert to ErrorResponse for JSON serialization.
	pub fn to_error_response(&self) -> ErrorResponse {
		match self {
			APIError::BadRequest {
				error_type,
				message,
				details,
			}
			| APIError::UnprocessableEntity {
				error_type,
				message,
				details,
			} => ErrorResponse {
				error: error_type.clone(),
				message: message.clone(),
				details: details.clone(),
			},
			APIError::NotFound {
				error_type,
				message,
			}
			| APIError::InternalServerError {
				error_type,
				message,
			} => ErrorResponse {
				error: error_type.clone(),
				message: message.clone(),
				details: None,
			},
		}
	}
}

impl fmt::Display for APIError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			APIError::BadRequest { message, .. } => write!(f, "Bad Request: {}", message),
			APIError::NotFound { message, .. } => write!(f, "Not Found: {}", message),
			APIError::UnprocessableEntity { message, .. } => {
				write!(f, "Unprocessable Entity: {}", message)
			},
			APIError::InternalServerError { message, .. } => {
				write!(f, "Internal Server Error: {}", message)
			},
		}
	}
}

impl std::error::Error for APIError {}

impl IntoResponse for APIError {
	fn into_response(self) -> Response {
		(self.status_code(), Json(self.to_error_response())).into_response()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_list_query_ignores_unusable_limits() {
		let parse = |body: serde_json::Value| serde_json::from_value::<ListQuery>(body).unwrap().limit;
		assert_eq!(parse(serde_json::json!({"limit": "20"})), Some(20));
		assert_eq!(parse(serde_json::json!({"limit": 5})), Some(5));
		assert_eq!(parse(serde_json::json!({"limit": "abc"})), None);
		assert_eq!(parse(serde_json::json!({"limit": "-3"})), None);
		assert_eq!(parse(serde_json::json!({})), None);
	}

	#[test]
	fn test_create_order_request_accepts_client_shape() {
		let body = serde_json::json!({
			"items": [{"id": 1, "quantity": 2}, {"id": 2, "quantity": 1}],
			"customerInfo": {"name": "Asha", "phone": "555-0101"},
			"totalAmount": 97.75,
			"tax": "12.75"
		});
		let request: CreateOrderRequest = serde_json::from_value(body).unwrap();
		assert_eq!(request.items.len(), 2);
		assert_eq!(request.customer_info.unwrap().name.as_deref(), Some("Asha"));
		assert!(request.total_amount.unwrap().is_number());
		assert!(request.tax.unwrap().is_string());
	}

	#[test]
	fn test_error_status_mapping() {
		let err = APIError::NotFound {
			error_type: "ORDER_NOT_FOUND".into(),
			message: "Order not found: 9".into(),
		};
		assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
		let body = err.to_error_response();
		assert_eq!(body.error, "ORDER_NOT_FOUND");
		assert!(body.details.is_none());
	}

	#[test]
	fn test_chatbot_response_flattens_reply() {
		let response = ChatbotResponse {
			success: true,
			reply: ChatResponse::text("hello", true),
		};
		let json = serde_json::to_value(&response).unwrap();
		assert_eq!(json["success"], true);
		assert_eq!(json["needsOrderId"], true);
		assert!(json.get("orderData").is_none());
	}
}
