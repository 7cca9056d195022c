//! Order endpoints: placing, listing and updating orders, plus sales figures
//! and the storage indicator.

use super::{order_error, ApiJson, ApiPath, ApiQuery};
use axum::{
	extract::State,
	http::StatusCode,
	response::Json,
};
use restaurant_types::{
	APIError, CreateOrderRequest, CreateOrderResponse, ListQuery, Order, SalesStats,
	StorageStatus, UpdateStatusRequest, UpdateStatusResponse,
};

use crate::server::AppState;

/// GET /api/orders
pub async fn list_orders(
	State(state): State<AppState>,
	ApiQuery(query): ApiQuery<ListQuery>,
) -> Result<Json<Vec<Order>>, APIError> {
	let limit = query.limit.filter(|limit| *limit > 0);
	let orders = state.engine.recent_orders(limit).await.map_err(order_error)?;
	Ok(Json(orders))
}

/// POST /api/orders
pub async fn create_order(
	State(state): State<AppState>,
	ApiJson(request): ApiJson<CreateOrderRequest>,
) -> Result<(StatusCode, Json<CreateOrderResponse>), APIError> {
	let order = state.engine.place_order(request).await.map_err(|e| {
		tracing::warn!(error = %e, "Order rejected");
		order_error(e)
	})?;

	Ok((
		StatusCode::CREATED,
		Json(CreateOrderResponse {
			success: true,
			message: "Order created successfully".to_string(),
			order_id: order.id,
			order,
		}),
	))
}

/// GET /api/orders/{id}
pub async fn get_order(
	State(state): State<AppState>,
	ApiPath(id): ApiPath<u64>,
) -> Result<Json<Order>, APIError> {
	let order = state.engine.order(id).await.map_err(order_error)?;
	Ok(Json(order))
}

/// PUT /api/orders/{id}/status
pub async fn update_status(
	State(state): State<AppState>,
	ApiPath(id): ApiPath<u64>,
	ApiJson(request): ApiJson<UpdateStatusRequest>,
) -> Result<Json<UpdateStatusResponse>, APIError> {
	let order = state
		.engine
		.update_status(id, &request.status)
		.await
		.map_err(order_error)?;

	Ok(Json(UpdateStatusResponse {
		success: true,
		message: "Order status updated successfully".to_string(),
		order,
	}))
}

/// GET /api/orders/status/{status}
pub async fn orders_by_status(
	State(state): State<AppState>,
	ApiPath(status): ApiPath<String>,
) -> Result<Json<Vec<Order>>, APIError> {
	let orders = state
		.engine
		.orders_by_status(&status)
		.await
		.map_err(order_error)?;
	Ok(Json(orders))
}

/// GET /api/orders/today/list
pub async fn todays_orders(State(state): State<AppState>) -> Result<Json<Vec<Order>>, APIError> {
	let orders = state.engine.todays_orders().await.map_err(order_error)?;
	Ok(Json(orders))
}

/// GET /api/orders/stats/sales
pub async fn sales_stats(State(state): State<AppState>) -> Result<Json<SalesStats>, APIError> {
	let stats = state.engine.sales_stats().await.map_err(order_error)?;
	Ok(Json(stats))
}

/// GET /api/storage/status
pub async fn storage_status(State(state): State<AppState>) -> Json<StorageStatus> {
	Json(state.engine.storage_status())
}
