//! Storage backends for exercising failure handling in tests.

use crate::implementations::memory::{MemoryStorage, MemoryStorageSchema};
use crate::{StorageError, StorageInterface};
use async_trait::async_trait;
use restaurant_types::ConfigSchema;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Memory-backed storage that returns backend errors while its switch is on.
pub struct FaultyStorage {
	inner: MemoryStorage,
	failing: Arc<AtomicBool>,
}

impl FaultyStorage {
	/// A backend that fails every operation.
	pub fn failing() -> Self {
		Self {
			inner: MemoryStorage::new(),
			failing: Arc::new(AtomicBool::new(true)),
		}
	}

	/// A backend that works until its switch is flipped.
	pub fn healthy() -> Self {
		Self {
			inner: MemoryStorage::new(),
			failing: Arc::new(AtomicBool::new(false)),
		}
	}

	/// Handle that toggles failures after the backend has been handed off.
	pub fn switch(&self) -> Arc<AtomicBool> {
		Arc::clone(&self.failing)
	}

	fn check(&self) -> Result<(), StorageError> {
		if self.failing.load(Ordering::SeqCst) {
			return Err(StorageError::Backend("disk unavailable".into()));
		}
		Ok(())
	}
}

#[async_trait]
impl StorageInterface for FaultyStorage {
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError> {
		self.check()?;
		self.inner.get_bytes(key).await
	}

	async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
		self.check()?;
		self.inner.set_bytes(key, value).await
	}

	async fn delete(&self, key: &str) -> Result<(), StorageError> {
		self.check()?;
		self.inner.delete(key).await
	}

	async fn exists(&self, key: &str) -> Result<bool, StorageError> {
		self.check()?;
		self.inner.exists(key).await
	}

	async fn list_keys(&self, namespace: &str) -> Result<Vec<String>, StorageError> {
		self.check()?;
		self.inner.list_keys(namespace).await
	}

	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(MemoryStorageSchema)
	}
}
