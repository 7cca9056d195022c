//! HTTP server for the restaurant API.
//!
//! Builds the axum router under `/api` and serves it until Ctrl+C.

use crate::apis::{ai, menu, order};
use axum::{
	http::{HeaderName, HeaderValue, Method},
	response::Json,
	routing::{get, post, put},
	Router,
};
use chrono::Utc;
use restaurant_config::{ApiConfig, CorsConfig};
use restaurant_core::RestaurantEngine;
use restaurant_types::HealthResponse;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared application state for the API server.
#[derive(Clone)]
pub struct AppState {
	pub engine: Arc<RestaurantEngine>,
}

/// Builds the CORS layer. Without configuration any origin is allowed.
///
/// Entries that are not valid header values are skipped with a warning.
fn cors_layer(cors: Option<&CorsConfig>) -> CorsLayer {
	let Some(cors) = cors else {
		return CorsLayer::permissive();
	};

	let origins: Vec<HeaderValue> = cors
		.allowed_origins
		.iter()
		.filter_map(|origin| match origin.parse() {
			Ok(value) => Some(value),
			Err(_) => {
				tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
				None
			},
		})
		.collect();
	let methods: Vec<Method> = cors
		.allowed_methods
		.iter()
		.filter_map(|method| method.parse().ok())
		.collect();
	let headers: Vec<HeaderName> = cors
		.allowed_headers
		.iter()
		.filter_map(|header| header.parse().ok())
		.collect();

	let mut layer = CorsLayer::new().allow_origin(origins);
	layer = if methods.is_empty() {
		layer.allow_methods(Any)
	} else {
		layer.allow_methods(methods)
	};
	if headers.is_empty() {
		layer.allow_headers(Any)
	} else {
		layer.allow_headers(headers)
	}
}

/// Builds the application router.
pub fn router(engine: Arc<RestaurantEngine>, cors: Option<&CorsConfig>) -> Router {
	let api = Router::new()
		.route("/health", get(health))
		.route("/menu", get(menu::grouped_menu))
		.route("/menu/categories", get(menu::categories))
		.route("/menu/category/{category}", get(menu::items_in_category))
		.route("/menu/{id}", get(menu::menu_item))
		.route("/orders", get(order::list_orders).post(order::create_order))
		.route("/orders/today/list", get(order::todays_orders))
		.route("/orders/stats/sales", get(order::sales_stats))
		.route("/orders/status/{status}", get(order::orders_by_status))
		.route("/orders/{id}", get(order::get_order))
		.route("/orders/{id}/status", put(order::update_status))
		.route("/storage/status", get(order::storage_status))
		.route("/ai/orders/{id}/insights", get(ai::insights))
		.route("/ai/orders/{id}/predict", get(ai::predict))
		.route("/ai/orders/{id}/apply", post(ai::apply))
		.route("/ai/recommendations", get(ai::recommendations))
		.route("/ai/chatbot", post(ai::chatbot));

	Router::new()
		.nest("/api", api)
		.layer(
			ServiceBuilder::new()
				.layer(TraceLayer::new_for_http())
				.layer(cors_layer(cors)),
		)
		.with_state(AppState { engine })
}

/// GET /api/health
async fn health() -> Json<HealthResponse> {
	Json(HealthResponse {
		status: "OK".to_string(),
		message: "Restaurant API is running".to_string(),
		timestamp: Utc::now(),
	})
}

/// Serves the API until Ctrl+C.
pub async fn start_server(
	api_config: ApiConfig,
	engine: Arc<RestaurantEngine>,
) -> Result<(), Box<dyn std::error::Error>> {
	let app = router(engine, api_config.cors.as_ref());

	let bind_address = format!("{}:{}", api_config.host, api_config.port);
	let listener = TcpListener::bind(&bind_address).await?;

	tracing::info!("Restaurant API server starting on {}", bind_address);

	axum::serve(listener, app)
		.with_graceful_shutdown(async {
			let _ = tokio::signal::ctrl_c().await;
		})
		.await?;

	Ok(())
}
