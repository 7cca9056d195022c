//! Menu browsing endpoints.

use super::{menu_error, ApiPath};
use axum::{
	extract::State,
	response::Json,
};
use restaurant_types::{APIError, MenuItem};
use std::collections::BTreeMap;

use crate::server::AppState;

/// GET /api/menu
///
/// Available items grouped by category.
pub async fn grouped_menu(
	State(state): State<AppState>,
) -> Result<Json<BTreeMap<String, Vec<MenuItem>>>, APIError> {
	let groups = state.engine.menu().grouped().await.map_err(menu_error)?;
	Ok(Json(groups))
}

/// GET /api/menu/categories
pub async fn categories(State(state): State<AppState>) -> Result<Json<Vec<String>>, APIError> {
	let categories = state.engine.menu().categories().await.map_err(menu_error)?;
	Ok(Json(categories))
}

/// GET /api/menu/category/{category}
pub async fn items_in_category(
	State(state): State<AppState>,
	ApiPath(category): ApiPath<String>,
) -> Result<Json<Vec<MenuItem>>, APIError> {
	let items = state
		.engine
		.menu()
		.list(Some(&category))
		.await
		.map_err(menu_error)?;
	Ok(Json(items))
}

/// GET /api/menu/{id}
pub async fn menu_item(
	State(state): State<AppState>,
	ApiPath(id): ApiPath<u64>,
) -> Result<Json<MenuItem>, APIError> {
	let item = state.engine.menu().item(id).await.map_err(menu_error)?;
	Ok(Json(item))
}
