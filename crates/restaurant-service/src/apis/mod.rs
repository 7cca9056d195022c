//! HTTP handlers, grouped by resource.
//!
//! Handlers translate engine errors into [`APIError`] values; the error
//! codes here are what clients match on.

pub mod ai;
pub mod menu;
pub mod order;

use axum::{
	extract::{
		rejection::{JsonRejection, PathRejection, QueryRejection},
		FromRequest, FromRequestParts, Path, Query, Request,
	},
	http::request::Parts,
	Json,
};
use restaurant_core::OrderError;
use restaurant_menu::MenuError;
use restaurant_types::APIError;

fn malformed(message: String) -> APIError {
	APIError::BadRequest {
		error_type: "VALIDATION_ERROR".to_string(),
		message,
		details: None,
	}
}

/// JSON body whose rejections are reported as `VALIDATION_ERROR`.
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
	Json<T>: FromRequest<S, Rejection = JsonRejection>,
	S: Send + Sync,
{
	type Rejection = APIError;

	async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
		let Json(value) = Json::<T>::from_request(req, state)
			.await
			.map_err(|rejection| malformed(rejection.body_text()))?;
		Ok(Self(value))
	}
}

/// Path parameters whose rejections are reported as `VALIDATION_ERROR`.
pub struct ApiPath<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiPath<T>
where
	Path<T>: FromRequestParts<S, Rejection = PathRejection>,
	S: Send + Sync,
{
	type Rejection = APIError;

	async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
		let Path(value) = Path::<T>::from_request_parts(parts, state)
			.await
			.map_err(|rejection| malformed(rejection.body_text()))?;
		Ok(Self(value))
	}
}

/// Query string whose rejections are reported as `VALIDATION_ERROR`.
pub struct ApiQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
	Query<T>: FromRequestParts<S, Rejection = QueryRejection>,
	S: Send + Sync,
{
	type Rejection = APIError;

	async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
		let Query(value) = Query::<T>::from_request_parts(parts, state)
			.await
			.map_err(|rejection| malformed(rejection.body_text()))?;
		Ok(Self(value))
	}
}

/// Maps an engine error onto its HTTP status and error code.
pub fn order_error(e: OrderError) -> APIError {
	match e {
		OrderError::Validation(message) => malformed(message),
		OrderError::NotFound(_) => APIError::NotFound {
			error_type: "ORDER_NOT_FOUND".to_string(),
			message: e.to_string(),
		},
		OrderError::MenuItemNotFound(_) => APIError::NotFound {
			error_type: "MENU_ITEM_NOT_FOUND".to_string(),
			message: e.to_string(),
		},
		OrderError::InvalidTransition { from, to } => APIError::UnprocessableEntity {
			error_type: "INVALID_TRANSITION".to_string(),
			message: e.to_string(),
			details: Some(serde_json::json!({ "from": from, "to": to })),
		},
		OrderError::NoRecommendation(_) => APIError::UnprocessableEntity {
			error_type: "NO_RECOMMENDATION".to_string(),
			message: e.to_string(),
			details: None,
		},
		OrderError::Storage(_) | OrderError::Menu(_) => {
			tracing::error!(error = %e, "Request failed");
			APIError::InternalServerError {
				error_type: "INTERNAL_ERROR".to_string(),
				message: e.to_string(),
			}
		},
	}
}

pub fn menu_error(e: MenuError) -> APIError {
	match e {
		MenuError::NotFound(_) => APIError::NotFound {
			error_type: "MENU_ITEM_NOT_FOUND".to_string(),
			message: e.to_string(),
		},
		MenuError::Source(_) | MenuError::Configuration(_) => {
			tracing::error!(error = %e, "Menu request failed");
			APIError::InternalServerError {
				error_type: "INTERNAL_ERROR".to_string(),
				message: e.to_string(),
			}
		},
	}
}
