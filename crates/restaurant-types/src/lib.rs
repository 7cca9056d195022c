//! Common types module for the restaurant ordering system.
//!
//! This module defines the core data types shared by every crate in the
//! workspace: orders and their line items, menu entries, estimator outputs,
//! HTTP payloads and the configuration validation framework.

/// API types for HTTP endpoints and request/response structures.
pub mod api;
/// Estimator output types: predictions, insights and recommendations.
pub mod insights;
/// Menu catalog entries.
pub mod menu;
/// Orders, line items and the status enum.
pub mod order;
/// Registry trait for self-registering implementations.
pub mod registry;
/// Storage namespaces and the storage-mode indicator.
pub mod storage;
/// Small helpers shared across crates.
pub mod utils;
/// Configuration validation types for ensuring type-safe configurations.
pub mod validation;

pub use api::*;
pub use insights::*;
pub use menu::*;
pub use order::*;
pub use registry::*;
pub use storage::*;
pub use utils::{minutes_between, round_money};
pub use validation::*;
