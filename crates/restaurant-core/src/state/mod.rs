//! Order state: lifecycle rules and the persistent order store.

pub mod lifecycle;
pub mod store;

pub use store::OrderStore;
