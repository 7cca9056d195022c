//! File-based storage backend.
//!
//! Each record is a JSON document at `<storage_path>/<namespace>/<id>.json`.
//! Writes go to a uniquely named temporary file in the same directory and are
//! renamed into place, so a record is either fully written or not at all.
//! The storage directory is held under an exclusive `fs2` lock for the
//! lifetime of the backend so two processes never share it.

use crate::{StorageError, StorageFactory, StorageInterface, StorageRegistry};
use async_trait::async_trait;
use fs2::FileExt;
use restaurant_types::{ConfigSchema, Field, FieldType, ImplementationRegistry, Schema, SchemaError};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;

const RECORD_EXTENSION: &str = "json";
const LOCK_FILE: &str = ".lock";
const DEFAULT_STORAGE_PATH: &str = "./data/storage";

/// Namespace used for keys without a `namespace:` prefix.
const DEFAULT_NAMESPACE: &str = "default";

fn backend_error(context: &str, path: &Path, err: std::io::Error) -> StorageError {
	StorageError::Backend(format!("{} {}: {}", context, path.display(), err))
}

/// Directory-per-namespace JSON file storage.
pub struct FileStorage {
	base_path: PathBuf,
	/// Held for the lifetime of the backend; the lock is released on drop.
	_lock: File,
	temp_counter: AtomicU64,
}

impl FileStorage {
	/// Opens (creating if needed) a storage directory and locks it.
	pub fn open(base_path: impl Into<PathBuf>) -> Result<Self, StorageError> {
		let base_path = base_path.into();
		std::fs::create_dir_all(&base_path)
			.map_err(|e| backend_error("Cannot create storage directory", &base_path, e))?;

		let lock_path = base_path.join(LOCK_FILE);
		let lock = std::fs::OpenOptions::new()
			.create(true)
			.truncate(false)
			.write(true)
			.open(&lock_path)
			.map_err(|e| backend_error("Cannot open lock file", &lock_path, e))?;
		lock.try_lock_exclusive().map_err(|_| {
			StorageError::Configuration(format!(
				"Storage directory {} is locked by another process",
				base_path.display()
			))
		})?;

		Ok(Self {
			base_path,
			_lock: lock,
			temp_counter: AtomicU64::new(0),
		})
	}

	/// Splits `namespace:id` and maps it to a file path.
	///
	/// Path separators in either part are replaced so a key can never
	/// escape the storage directory.
	fn record_path(&self, key: &str) -> PathBuf {
		let (namespace, id) = key.split_once(':').unwrap_or((DEFAULT_NAMESPACE, key));
		self.namespace_dir(namespace)
			.join(format!("{}.{}", sanitize(id), RECORD_EXTENSION))
	}

	fn namespace_dir(&self, namespace: &str) -> PathBuf {
		self.base_path.join(sanitize(namespace))
	}
}

fn sanitize(part: &str) -> String {
	let cleaned = part.replace(['/', '\\', ':'], "_");
	if cleaned.starts_with('.') {
		format!("_{}", cleaned)
	} else {
		cleaned
	}
}

#[async_trait]
impl StorageInterface for FileStorage {
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError> {
		let path = self.record_path(key);
		match fs::read(&path).await {
			Ok(data) => Ok(data),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StorageError::NotFound),
			Err(e) => Err(backend_error("Cannot read", &path, e)),
		}
	}

	async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
		let path = self.record_path(key);
		let Some(dir) = path.parent() else {
			return Err(StorageError::Backend(format!(
				"Record path {} has no parent directory",
				path.display()
			)));
		};
		fs::create_dir_all(dir)
			.await
			.map_err(|e| backend_error("Cannot create directory", dir, e))?;

		let seq = self.temp_counter.fetch_add(1, Ordering::Relaxed);
		let temp_path = path.with_extension(format!("{}.{}.tmp", RECORD_EXTENSION, seq));
		fs::write(&temp_path, value)
			.await
			.map_err(|e| backend_error("Cannot write", &temp_path, e))?;

		if let Err(e) = fs::rename(&temp_path, &path).await {
			let _ = fs::remove_file(&temp_path).await;
			return Err(backend_error("Cannot rename into", &path, e));
		}
		Ok(())
	}

	async fn delete(&self, key: &str) -> Result<(), StorageError> {
		let path = self.record_path(key);
		match fs::remove_file(&path).await {
			Ok(_) => Ok(()),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
			Err(e) => Err(backend_error("Cannot delete", &path, e)),
		}
	}

	async fn exists(&self, key: &str) -> Result<bool, StorageError> {
		let path = self.record_path(key);
		fs::try_exists(&path)
			.await
			.map_err(|e| backend_error("Cannot stat", &path, e))
	}

	async fn list_keys(&self, namespace: &str) -> Result<Vec<String>, StorageError> {
		let dir = self.namespace_dir(namespace);
		let mut entries = match fs::read_dir(&dir).await {
			Ok(entries) => entries,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
			Err(e) => return Err(backend_error("Cannot list", &dir, e)),
		};

		let mut ids = Vec::new();
		while let Some(entry) = entries
			.next_entry()
			.await
			.map_err(|e| backend_error("Cannot list", &dir, e))?
		{
			let path = entry.path();
			if path.extension().and_then(|ext| ext.to_str()) != Some(RECORD_EXTENSION) {
				continue;
			}
			if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
				ids.push(stem.to_string());
			}
		}
		Ok(ids)
	}

	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(FileStorageSchema)
	}
}

/// Configuration schema for FileStorage.
pub struct FileStorageSchema;

impl ConfigSchema for FileStorageSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), SchemaError> {
		Schema::new()
			.optional(
				Field::new("storage_path", FieldType::String).with_validator(|value| {
					match value.as_str() {
						Some(path) if path.trim().is_empty() => {
							Err("storage_path cannot be empty".to_string())
						},
						_ => Ok(()),
					}
				}),
			)
			.validate(config)
	}
}

/// Factory function to create a file storage backend from configuration.
///
/// Configuration parameters:
/// - `storage_path`: Base directory for records (default: "./data/storage")
pub fn create_storage(config: &toml::Value) -> Result<Box<dyn StorageInterface>, StorageError> {
	FileStorageSchema
		.validate(config)
		.map_err(|e| StorageError::Configuration(e.to_string()))?;

	let storage_path = config
		.get("storage_path")
		.and_then(|v| v.as_str())
		.unwrap_or(DEFAULT_STORAGE_PATH);

	Ok(Box::new(FileStorage::open(storage_path)?))
}

/// Registry for the file storage implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "file";
	type Factory = StorageFactory;

	fn factory() -> Self::Factory {
		create_storage
	}
}

impl StorageRegistry for Registry {}

#[cfg(test)]
mod tests {
	use super::*;
	use tempfile::TempDir;

	#[tokio::test]
	async fn test_records_live_under_namespace_directories() {
		let temp_dir = TempDir::new().unwrap();
		let storage = FileStorage::open(temp_dir.path()).unwrap();

		storage
			.set_bytes("orders:12", b"{\"id\":12}".to_vec())
			.await
			.unwrap();

		let on_disk = temp_dir.path().join("orders").join("12.json");
		assert!(on_disk.exists());
		assert_eq!(storage.get_bytes("orders:12").await.unwrap(), b"{\"id\":12}");
	}

	#[tokio::test]
	async fn test_overwrite_leaves_no_temp_files() {
		let temp_dir = TempDir::new().unwrap();
		let storage = FileStorage::open(temp_dir.path()).unwrap();

		storage.set_bytes("orders:1", b"one".to_vec()).await.unwrap();
		storage.set_bytes("orders:1", b"uno".to_vec()).await.unwrap();

		assert_eq!(storage.get_bytes("orders:1").await.unwrap(), b"uno");
		let names: Vec<_> = std::fs::read_dir(temp_dir.path().join("orders"))
			.unwrap()
			.map(|entry| entry.unwrap().file_name())
			.collect();
		assert_eq!(names.len(), 1);
	}

	#[tokio::test]
	async fn test_list_delete_and_exists() {
		let temp_dir = TempDir::new().unwrap();
		let storage = FileStorage::open(temp_dir.path()).unwrap();
		assert!(storage.list_keys("orders").await.unwrap().is_empty());

		storage.set_bytes("orders:1", vec![1]).await.unwrap();
		storage.set_bytes("orders:2", vec![2]).await.unwrap();
		storage.set_bytes("sequences:orders", vec![2]).await.unwrap();

		let mut ids = storage.list_keys("orders").await.unwrap();
		ids.sort();
		assert_eq!(ids, vec!["1", "2"]);

		storage.delete("orders:1").await.unwrap();
		storage.delete("orders:1").await.unwrap();
		assert!(!storage.exists("orders:1").await.unwrap());
		assert!(storage.exists("orders:2").await.unwrap());
		assert!(matches!(
			storage.get_bytes("orders:1").await,
			Err(StorageError::NotFound)
		));
	}

	#[tokio::test]
	async fn test_keys_cannot_escape_base_directory() {
		let temp_dir = TempDir::new().unwrap();
		let storage = FileStorage::open(temp_dir.path().join("store")).unwrap();

		storage.set_bytes("../outside:x", vec![1]).await.unwrap();
		assert!(!temp_dir.path().join("outside").exists());
		assert!(storage.exists("../outside:x").await.unwrap());
	}

	#[test]
	fn test_second_open_of_same_directory_fails() {
		let temp_dir = TempDir::new().unwrap();
		let _first = FileStorage::open(temp_dir.path()).unwrap();
		let second = FileStorage::open(temp_dir.path());
		assert!(matches!(second, Err(StorageError::Configuration(_))));
	}

	#[test]
	fn test_schema_rejects_wrong_type() {
		let config: toml::Value = toml::from_str("storage_path = 3").unwrap();
		assert!(FileStorageSchema.validate(&config).is_err());
		let config: toml::Value = toml::from_str("storage_path = \"\"").unwrap();
		assert!(FileStorageSchema.validate(&config).is_err());
	}
}
