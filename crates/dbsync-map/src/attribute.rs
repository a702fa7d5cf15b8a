//! Column metadata

use crate::types::JdbcType;
use serde::{Deserialize, Serialize};

/// A table column.
///
/// `scale` is only meaningful for decimal-family types; the setters keep it
/// unset for every other type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DbAttribute {
	/// Column name, case preserved
	pub name: String,
	/// Portable column type
	pub jdbc_type: JdbcType,
	/// `NOT NULL` column
	#[serde(default)]
	pub mandatory: bool,
	/// Member of the table's primary key
	#[serde(default)]
	pub primary_key: bool,
	/// Auto-increment / identity column
	#[serde(default)]
	pub generated: bool,
	/// Maximum length for character and binary types, precision for decimals
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub max_length: Option<u32>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	scale: Option<u32>,
	/// Vendor type name as reported by the database
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub vendor_type: Option<String>,
}

impl DbAttribute {
	pub fn new(name: impl Into<String>, jdbc_type: JdbcType) -> Self {
		Self {
			name: name.into(),
			jdbc_type,
			mandatory: false,
			primary_key: false,
			generated: false,
			max_length: None,
			scale: None,
			vendor_type: None,
		}
	}

	pub fn mandatory(mut self, mandatory: bool) -> Self {
		self.mandatory = mandatory;
		self
	}

	/// Mark as primary key. Primary key columns are always mandatory.
	pub fn primary_key(mut self) -> Self {
		self.primary_key = true;
		self.mandatory = true;
		self
	}

	pub fn generated(mut self, generated: bool) -> Self {
		self.generated = generated;
		self
	}

	pub fn max_length(mut self, max_length: u32) -> Self {
		self.max_length = Some(max_length);
		self
	}

	pub fn scale(mut self, scale: u32) -> Self {
		self.set_scale(Some(scale));
		self
	}

	pub fn vendor_type(mut self, vendor_type: impl Into<String>) -> Self {
		self.vendor_type = Some(vendor_type.into());
		self
	}

	/// Decimal scale; always `None` for non-decimal types.
	pub fn get_scale(&self) -> Option<u32> {
		if self.jdbc_type.is_decimal() {
			self.scale
		} else {
			None
		}
	}

	/// Set the decimal scale. Ignored for non-decimal types.
	pub fn set_scale(&mut self, scale: Option<u32>) {
		self.scale = if self.jdbc_type.is_decimal() { scale } else { None };
	}

	/// Change the column type, dropping a scale the new type cannot carry.
	pub fn set_jdbc_type(&mut self, jdbc_type: JdbcType) {
		self.jdbc_type = jdbc_type;
		if !jdbc_type.is_decimal() {
			self.scale = None;
		}
	}
}
