//! Estimator and chat endpoints.

use super::{order_error, ApiJson, ApiPath, ApiQuery};
use axum::{
	extract::State,
	response::Json,
};
use restaurant_types::{
	APIError, ChatbotRequest, ChatbotResponse, InsightsResponse, ListQuery, PredictionResponse,
	RecommendationsResponse, UpdateStatusResponse,
};

use crate::server::AppState;

/// GET /api/ai/orders/{id}/insights
pub async fn insights(
	State(state): State<AppState>,
	ApiPath(id): ApiPath<u64>,
) -> Result<Json<InsightsResponse>, APIError> {
	let insights = state.engine.order_insights(id).await.map_err(order_error)?;
	Ok(Json(InsightsResponse {
		success: true,
		insights,
	}))
}

/// GET /api/ai/orders/{id}/predict
pub async fn predict(
	State(state): State<AppState>,
	ApiPath(id): ApiPath<u64>,
) -> Result<Json<PredictionResponse>, APIError> {
	let (current_status, prediction) = state.engine.predict(id).await.map_err(order_error)?;
	let message = prediction
		.is_none()
		.then(|| "Order is already at final status".to_string());

	Ok(Json(PredictionResponse {
		success: true,
		current_status,
		prediction,
		message,
	}))
}

/// POST /api/ai/orders/{id}/apply
pub async fn apply(
	State(state): State<AppState>,
	ApiPath(id): ApiPath<u64>,
) -> Result<Json<UpdateStatusResponse>, APIError> {
	let order = state
		.engine
		.apply_recommendation(id)
		.await
		.map_err(order_error)?;

	Ok(Json(UpdateStatusResponse {
		success: true,
		message: format!("Order moved to {}", order.status),
		order,
	}))
}

/// GET /api/ai/recommendations
pub async fn recommendations(
	State(state): State<AppState>,
	ApiQuery(query): ApiQuery<ListQuery>,
) -> Result<Json<RecommendationsResponse>, APIError> {
	let limit = query.limit.filter(|limit| *limit > 0);
	let recommendations = state
		.engine
		.recommendations(limit)
		.await
		.map_err(order_error)?;

	Ok(Json(RecommendationsResponse {
		success: true,
		count: recommendations.len(),
		recommendations,
	}))
}

/// POST /api/ai/chatbot
pub async fn chatbot(
	State(state): State<AppState>,
	ApiJson(request): ApiJson<ChatbotRequest>,
) -> Result<Json<ChatbotResponse>, APIError> {
	let query = request
		.query
		.filter(|query| !query.trim().is_empty())
		.ok_or_else(|| APIError::BadRequest {
			error_type: "VALIDATION_ERROR".to_string(),
			message: "Query is required".to_string(),
			details: None,
		})?;

	let reply = state
		.engine
		.chat(&query, request.order_id)
		.await
		.map_err(order_error)?;

	Ok(Json(ChatbotResponse {
		success: true,
		reply,
	}))
}
