//! Startup and shutdown hooks for the restaurant engine.

use super::{EngineError, RestaurantEngine};

impl RestaurantEngine {
	/// Checks that the menu is readable and logs what the engine serves.
	pub async fn initialize(&self) -> Result<(), EngineError> {
		let categories = self
			.menu
			.categories()
			.await
			.map_err(|e| EngineError::Service(e.to_string()))?;

		tracing::info!(
			restaurant = %self.config.restaurant.id,
			storage = %self.storage.status().primary,
			categories = categories.len(),
			enforce_transitions = self.config.orders.enforce_transitions,
			"Initializing restaurant engine"
		);
		Ok(())
	}

	pub async fn shutdown(&self) -> Result<(), EngineError> {
		let status = self.storage.status();
		tracing::info!(storage_mode = %status.mode, "Shutting down restaurant engine");
		if let Some(reason) = status.reason {
			tracing::warn!(
				reason = %reason,
				"Orders placed since the storage fault were held in memory only"
			);
		}
		Ok(())
	}
}
