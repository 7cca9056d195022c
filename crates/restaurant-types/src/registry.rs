//! Registry trait for self-registering implementations.
//!
//! Pluggable components (storage backends, menu catalogs) expose a `Registry`
//! struct that names the implementation and hands out its factory.

/// Base trait for implementation registries.
pub trait ImplementationRegistry {
	/// The name used in configuration files to reference this implementation,
	/// e.g. "file" for `storage.implementations.file`.
	const NAME: &'static str;

	/// The factory function type this implementation provides.
	type Factory;

	/// Get the factory function for this implementation.
	fn factory() -> Self::Factory;
}
