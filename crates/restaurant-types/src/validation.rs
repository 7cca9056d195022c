//! Configuration validation for pluggable implementations.
//!
//! Storage backends and menu catalogs receive their settings as raw TOML
//! tables. Each implementation declares a [`Schema`] describing the keys it
//! understands, and the schema is checked before the implementation is built.

use thiserror::Error;

/// Errors that can occur while checking an implementation's settings.
#[derive(Debug, Error, PartialEq)]
pub enum SchemaError {
	/// A required key is absent.
	#[error("Missing required field: {0}")]
	MissingField(String),
	/// A key has the right type but an unacceptable value.
	#[error("Invalid value for field '{field}': {message}")]
	InvalidValue { field: String, message: String },
	/// A key has the wrong TOML type.
	#[error("Type mismatch for field '{field}': expected {expected}, got {actual}")]
	TypeMismatch {
		field: String,
		expected: &'static str,
		actual: String,
	},
}

/// Expected TOML type of a configuration key.
#[derive(Debug)]
pub enum FieldType {
	String,
	/// Integer with optional inclusive bounds.
	Integer { min: Option<i64>, max: Option<i64> },
	Boolean,
	/// Array whose elements all have the inner type.
	Array(Box<FieldType>),
	/// Table whose contents are not inspected further.
	Table,
}

impl FieldType {
	fn name(&self) -> &'static str {
		match self {
			FieldType::String => "string",
			FieldType::Integer { .. } => "integer",
			FieldType::Boolean => "boolean",
			FieldType::Array(_) => "array",
			FieldType::Table => "table",
		}
	}

	fn check(&self, field: &str, value: &toml::Value) -> Result<(), SchemaError> {
		let mismatch = || SchemaError::TypeMismatch {
			field: field.to_string(),
			expected: self.name(),
			actual: value.type_str().to_string(),
		};

		match self {
			FieldType::String if value.is_str() => Ok(()),
			FieldType::Boolean if value.is_bool() => Ok(()),
			FieldType::Table if value.is_table() => Ok(()),
			FieldType::Integer { min, max } => {
				let int_val = value.as_integer().ok_or_else(mismatch)?;
				if min.is_some_and(|min| int_val < min) || max.is_some_and(|max| int_val > max) {
					return Err(SchemaError::InvalidValue {
						field: field.to_string(),
						message: format!("{} is outside the range {:?}..={:?}", int_val, min, max),
					});
				}
				Ok(())
			},
			FieldType::Array(inner) => {
				let items = value.as_array().ok_or_else(mismatch)?;
				items
					.iter()
					.enumerate()
					.try_for_each(|(i, item)| inner.check(&format!("{}[{}]", field, i), item))
			},
			_ => Err(mismatch()),
		}
	}
}

/// Custom check run after the type check passes.
pub type FieldValidator = Box<dyn Fn(&toml::Value) -> Result<(), String> + Send + Sync>;

/// A single key in a schema.
pub struct Field {
	pub name: String,
	pub field_type: FieldType,
	pub validator: Option<FieldValidator>,
}

impl std::fmt::Debug for Field {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Field")
			.field("name", &self.name)
			.field("field_type", &self.field_type)
			.field("validator", &self.validator.is_some())
			.finish()
	}
}

impl Field {
	pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
		Self {
			name: name.into(),
			field_type,
			validator: None,
		}
	}

	/// Adds a custom validator run after the type check.
	pub fn with_validator<F>(mut self, validator: F) -> Self
	where
		F: Fn(&toml::Value) -> Result<(), String> + Send + Sync + 'static,
	{
		self.validator = Some(Box::new(validator));
		self
	}

	fn check(&self, value: &toml::Value) -> Result<(), SchemaError> {
		self.field_type.check(&self.name, value)?;
		if let Some(validator) = &self.validator {
			validator(value).map_err(|message| SchemaError::InvalidValue {
				field: self.name.clone(),
				message,
			})?;
		}
		Ok(())
	}
}

/// Set of required and optional keys for one implementation.
#[derive(Debug, Default)]
pub struct Schema {
	required: Vec<Field>,
	optional: Vec<Field>,
}

impl Schema {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn required(mut self, field: Field) -> Self {
		self.required.push(field);
		self
	}

	pub fn optional(mut self, field: Field) -> Self {
		self.optional.push(field);
		self
	}

	/// Validates a TOML table against this schema.
	///
	/// Unknown keys are ignored so that shared settings can live next to
	/// implementation-specific ones.
	pub fn validate(&self, config: &toml::Value) -> Result<(), SchemaError> {
		let table = config.as_table().ok_or_else(|| SchemaError::TypeMismatch {
			field: "root".to_string(),
			expected: "table",
			actual: config.type_str().to_string(),
		})?;

		for field in &self.required {
			let value = table
				.get(&field.name)
				.ok_or_else(|| SchemaError::MissingField(field.name.clone()))?;
			field.check(value)?;
		}

		for field in &self.optional {
			if let Some(value) = table.get(&field.name) {
				field.check(value)?;
			}
		}

		Ok(())
	}
}

/// Trait implemented by every configurable implementation.
pub trait ConfigSchema: Send + Sync {
	fn validate(&self, config: &toml::Value) -> Result<(), SchemaError>;
}
