//! Storage-related types for the restaurant ordering system.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Storage namespaces for the different record collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
	/// One record per order, line items embedded.
	Orders,
	/// Monotonic counters used for identifier assignment.
	Sequences,
}

impl StorageKey {
	/// Returns the string representation of the storage key.
	pub fn as_str(&self) -> &'static str {
		match self {
			StorageKey::Orders => "orders",
			StorageKey::Sequences => "sequences",
		}
	}

	/// Returns an iterator over all StorageKey variants.
	pub fn all() -> impl Iterator<Item = Self> {
		[Self::Orders, Self::Sequences].into_iter()
	}
}

impl FromStr for StorageKey {
	type Err = ();

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"orders" => Ok(Self::Orders),
			"sequences" => Ok(Self::Sequences),
			_ => Err(()),
		}
	}
}

/// Whether writes currently reach the configured backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageMode {
	/// The configured primary backend is in use.
	Durable,
	/// A backend fault occurred; data now lives in process memory only.
	Fallback,
}

impl fmt::Display for StorageMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			StorageMode::Durable => write!(f, "durable"),
			StorageMode::Fallback => write!(f, "fallback"),
		}
	}
}

/// Operator-facing storage indicator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageStatus {
	pub mode: StorageMode,
	/// Name of the configured primary backend.
	pub primary: String,
	/// Fault that caused the switch to fallback, if any.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub reason: Option<String>,
	/// When the switch happened.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub since: Option<DateTime<Utc>>,
}
