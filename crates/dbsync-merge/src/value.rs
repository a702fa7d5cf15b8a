//! Literal values written into existing rows

use crate::dialect::Dialect;
use crate::quoting::string_literal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A literal used to fill `NULL`s before a column becomes mandatory.
///
/// Deserializes from plain TOML values: `true`, `0`, `1.5`, `"unknown"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnValue {
	Bool(bool),
	Integer(i64),
	Float(f64),
	Text(String),
}

impl ColumnValue {
	/// SQL literal in the dialect's syntax.
	pub fn to_sql(&self, dialect: &Dialect) -> String {
		match self {
			ColumnValue::Bool(true) => dialect.true_literal.to_string(),
			ColumnValue::Bool(false) => dialect.false_literal.to_string(),
			ColumnValue::Integer(v) => v.to_string(),
			ColumnValue::Float(v) => v.to_string(),
			ColumnValue::Text(v) => string_literal(v),
		}
	}
}

impl fmt::Display for ColumnValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ColumnValue::Bool(v) => write!(f, "{v}"),
			ColumnValue::Integer(v) => write!(f, "{v}"),
			ColumnValue::Float(v) => write!(f, "{v}"),
			ColumnValue::Text(v) => write!(f, "{v:?}"),
		}
	}
}

impl From<&str> for ColumnValue {
	fn from(value: &str) -> Self {
		ColumnValue::Text(value.to_string())
	}
}

impl From<i64> for ColumnValue {
	fn from(value: i64) -> Self {
		ColumnValue::Integer(value)
	}
}

impl From<bool> for ColumnValue {
	fn from(value: bool) -> Self {
		ColumnValue::Bool(value)
	}
}
