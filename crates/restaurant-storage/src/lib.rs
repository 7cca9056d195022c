//! Storage module for the restaurant ordering service.
//!
//! Backends implement the byte-level [`StorageInterface`]; the
//! [`StorageService`] layers typed JSON helpers on top and owns the
//! in-memory fallback. The first backend fault switches the service to the
//! fallback for the rest of the process lifetime, and the failed operation is
//! replayed there so callers never observe the fault.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use restaurant_types::{ConfigSchema, ImplementationRegistry, StorageMode, StorageStatus};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::OnceLock;
use thiserror::Error;

use implementations::memory::MemoryStorage;

/// Re-export implementations
pub mod implementations {
	pub mod file;
	pub mod memory;
}

#[cfg(any(test, feature = "testing"))]
pub mod testing;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
	/// Error that occurs when a requested item is not found.
	#[error("Not found")]
	NotFound,
	/// Error that occurs during serialization/deserialization.
	#[error("Serialization error: {0}")]
	Serialization(String),
	/// Error that occurs in the storage backend.
	#[error("Backend error: {0}")]
	Backend(String),
	/// Error that occurs during configuration validation.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Low-level key-value interface implemented by every storage backend.
///
/// Keys have the form `namespace:id`.
#[async_trait]
pub trait StorageInterface: Send + Sync {
	/// Retrieves raw bytes for the given key.
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError>;

	/// Stores raw bytes, replacing any previous value.
	async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError>;

	/// Deletes the value associated with the given key.
	async fn delete(&self, key: &str) -> Result<(), StorageError>;

	/// Checks if a key exists in storage.
	async fn exists(&self, key: &str) -> Result<bool, StorageError>;

	/// Lists the ids stored under a namespace, in no particular order.
	async fn list_keys(&self, namespace: &str) -> Result<Vec<String>, StorageError>;

	/// Returns the configuration schema for validation.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;
}

/// Type alias for storage factory functions.
pub type StorageFactory = fn(&toml::Value) -> Result<Box<dyn StorageInterface>, StorageError>;

/// Registry trait for storage implementations.
pub trait StorageRegistry: ImplementationRegistry<Factory = StorageFactory> {}

/// Get all registered storage implementations as (name, factory) pairs.
pub fn get_all_implementations() -> Vec<(&'static str, StorageFactory)> {
	use implementations::{file, memory};

	vec![
		(file::Registry::NAME, file::Registry::factory()),
		(memory::Registry::NAME, memory::Registry::factory()),
	]
}

/// Why and when the service left the primary backend.
#[derive(Debug, Clone)]
struct Degraded {
	reason: String,
	since: DateTime<Utc>,
}

/// Runs a backend call against the primary, switching to the fallback on a
/// backend fault and replaying the call there.
macro_rules! with_fallback {
	($self:ident, $op:literal, $backend:ident => $call:expr) => {{
		let mut outcome = None;
		if $self.degraded.get().is_none() {
			let $backend: &dyn StorageInterface = $self.primary.as_ref();
			match $call {
				Err(StorageError::Backend(reason)) => $self.degrade($op, reason),
				result => outcome = Some(result),
			}
		}
		match outcome {
			Some(result) => result,
			None => {
				let $backend: &dyn StorageInterface = &$self.fallback;
				$call
			},
		}
	}};
}

/// Typed storage operations over a primary backend with in-memory fallback.
pub struct StorageService {
	/// Configured backend name, reported in the status indicator.
	primary_name: String,
	primary: Box<dyn StorageInterface>,
	/// Starts empty; only written after the switch.
	fallback: MemoryStorage,
	/// Set once, on the first backend fault.
	degraded: OnceLock<Degraded>,
}

impl StorageService {
	/// Creates a new StorageService in durable mode.
	pub fn new(primary_name: impl Into<String>, primary: Box<dyn StorageInterface>) -> Self {
		Self {
			primary_name: primary_name.into(),
			primary,
			fallback: MemoryStorage::new(),
			degraded: OnceLock::new(),
		}
	}

	/// Current storage mode.
	pub fn mode(&self) -> StorageMode {
		if self.degraded.get().is_some() {
			StorageMode::Fallback
		} else {
			StorageMode::Durable
		}
	}

	/// Operator-facing status indicator.
	pub fn status(&self) -> StorageStatus {
		let degraded = self.degraded.get();
		StorageStatus {
			mode: self.mode(),
			primary: self.primary_name.clone(),
			reason: degraded.map(|d| d.reason.clone()),
			since: degraded.map(|d| d.since),
		}
	}

	fn degrade(&self, op: &str, reason: String) {
		let first = self
			.degraded
			.set(Degraded {
				reason: reason.clone(),
				since: Utc::now(),
			})
			.is_ok();
		if first {
			tracing::warn!(
				component = "storage",
				implementation = %self.primary_name,
				operation = op,
				error = %reason,
				"Storage backend failed, switching to in-memory fallback for the rest of this process"
			);
		}
	}

	async fn get_raw(&self, key: &str) -> Result<Vec<u8>, StorageError> {
		with_fallback!(self, "get", backend => backend.get_bytes(key).await)
	}

	async fn set_raw(&self, key: &str, bytes: Vec<u8>) -> Result<(), StorageError> {
		with_fallback!(self, "set", backend => backend.set_bytes(key, bytes.clone()).await)
	}

	async fn exists_raw(&self, key: &str) -> Result<bool, StorageError> {
		with_fallback!(self, "exists", backend => backend.exists(key).await)
	}

	async fn list_raw(&self, namespace: &str) -> Result<Vec<String>, StorageError> {
		with_fallback!(self, "list", backend => backend.list_keys(namespace).await)
	}

	/// Stores a serializable value, creating or overwriting it.
	pub async fn store<T: Serialize>(
		&self,
		namespace: &str,
		id: &str,
		data: &T,
	) -> Result<(), StorageError> {
		let bytes =
			serde_json::to_vec(data).map_err(|e| StorageError::Serialization(e.to_string()))?;
		self.set_raw(&record_key(namespace, id), bytes).await
	}

	/// Retrieves and deserializes a value.
	///
	/// A record that exists but cannot be decoded is reported as
	/// [`StorageError::Serialization`], never as missing.
	pub async fn retrieve<T: DeserializeOwned>(
		&self,
		namespace: &str,
		id: &str,
	) -> Result<T, StorageError> {
		let key = record_key(namespace, id);
		let bytes = self.get_raw(&key).await?;
		serde_json::from_slice(&bytes)
			.map_err(|e| StorageError::Serialization(format!("{}: {}", key, e)))
	}

	/// Overwrites an existing value; fails with NotFound if it is absent.
	pub async fn update<T: Serialize>(
		&self,
		namespace: &str,
		id: &str,
		data: &T,
	) -> Result<(), StorageError> {
		let key = record_key(namespace, id);
		if !self.exists_raw(&key).await? {
			return Err(StorageError::NotFound);
		}

		let bytes =
			serde_json::to_vec(data).map_err(|e| StorageError::Serialization(e.to_string()))?;
		self.set_raw(&key, bytes).await
	}

	/// Checks if a value exists in storage.
	pub async fn exists(&self, namespace: &str, id: &str) -> Result<bool, StorageError> {
		self.exists_raw(&record_key(namespace, id)).await
	}

	/// Ids of every record in a namespace, including ones that fail to decode.
	pub async fn ids(&self, namespace: &str) -> Result<Vec<String>, StorageError> {
		self.list_raw(namespace).await
	}

	/// Loads every decodable record in a namespace as `(id, value)` pairs.
	///
	/// Records that vanish between listing and reading, or that fail to
	/// decode, are skipped.
	pub async fn retrieve_all<T: DeserializeOwned>(
		&self,
		namespace: &str,
	) -> Result<Vec<(String, T)>, StorageError> {
		let ids = self.list_raw(namespace).await?;
		let mut records = Vec::with_capacity(ids.len());
		for id in ids {
			let key = record_key(namespace, &id);
			match self.get_raw(&key).await {
				Ok(bytes) => {
					if let Some(value) = decode(&key, &bytes) {
						records.push((id, value));
					}
				},
				Err(StorageError::NotFound) => continue,
				Err(e) => return Err(e),
			}
		}
		Ok(records)
	}
}

fn record_key(namespace: &str, id: &str) -> String {
	format!("{}:{}", namespace, id)
}

fn decode<T: DeserializeOwned>(key: &str, bytes: &[u8]) -> Option<T> {
	match serde_json::from_slice(bytes) {
		Ok(value) => Some(value),
		Err(e) => {
			tracing::warn!(component = "storage", key, error = %e, "Skipping undecodable record");
			None
		},
	}
}
