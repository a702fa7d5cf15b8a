//! JDBC type codes
//!
//! Column types are carried as the portable JDBC type codes reported by
//! database metadata (`java.sql.Types` numbering). Dialects translate them into
//! vendor type names when rendering DDL.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Portable column type, identified by its JDBC type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JdbcType {
	Bit,
	TinyInt,
	SmallInt,
	Integer,
	BigInt,
	Float,
	Real,
	Double,
	Numeric,
	Decimal,
	Char,
	VarChar,
	LongVarChar,
	NChar,
	NVarChar,
	LongNVarChar,
	Date,
	Time,
	Timestamp,
	Binary,
	VarBinary,
	LongVarBinary,
	Blob,
	Clob,
	NClob,
	Boolean,
	Null,
	Other,
}

impl JdbcType {
	/// Every known type, in code order of declaration.
	pub const ALL: [JdbcType; 28] = [
		JdbcType::Bit,
		JdbcType::TinyInt,
		JdbcType::SmallInt,
		JdbcType::Integer,
		JdbcType::BigInt,
		JdbcType::Float,
		JdbcType::Real,
		JdbcType::Double,
		JdbcType::Numeric,
		JdbcType::Decimal,
		JdbcType::Char,
		JdbcType::VarChar,
		JdbcType::LongVarChar,
		JdbcType::NChar,
		JdbcType::NVarChar,
		JdbcType::LongNVarChar,
		JdbcType::Date,
		JdbcType::Time,
		JdbcType::Timestamp,
		JdbcType::Binary,
		JdbcType::VarBinary,
		JdbcType::LongVarBinary,
		JdbcType::Blob,
		JdbcType::Clob,
		JdbcType::NClob,
		JdbcType::Boolean,
		JdbcType::Null,
		JdbcType::Other,
	];

	/// The numeric JDBC type code.
	pub fn code(self) -> i32 {
		match self {
			JdbcType::Bit => -7,
			JdbcType::TinyInt => -6,
			JdbcType::SmallInt => 5,
			JdbcType::Integer => 4,
			JdbcType::BigInt => -5,
			JdbcType::Float => 6,
			JdbcType::Real => 7,
			JdbcType::Double => 8,
			JdbcType::Numeric => 2,
			JdbcType::Decimal => 3,
			JdbcType::Char => 1,
			JdbcType::VarChar => 12,
			JdbcType::LongVarChar => -1,
			JdbcType::NChar => -15,
			JdbcType::NVarChar => -9,
			JdbcType::LongNVarChar => -16,
			JdbcType::Date => 91,
			JdbcType::Time => 92,
			JdbcType::Timestamp => 93,
			JdbcType::Binary => -2,
			JdbcType::VarBinary => -3,
			JdbcType::LongVarBinary => -4,
			JdbcType::Blob => 2004,
			JdbcType::Clob => 2005,
			JdbcType::NClob => 2011,
			JdbcType::Boolean => 16,
			JdbcType::Null => 0,
			JdbcType::Other => 1111,
		}
	}

	/// Resolve a JDBC type code. Unknown codes map to [`JdbcType::Other`].
	pub fn from_code(code: i32) -> Self {
		Self::ALL
			.iter()
			.copied()
			.find(|t| t.code() == code)
			.unwrap_or(JdbcType::Other)
	}

	/// Standard SQL name of the type, used by the ANSI dialect.
	pub fn sql_name(self) -> &'static str {
		match self {
			JdbcType::Bit => "BIT",
			JdbcType::TinyInt => "TINYINT",
			JdbcType::SmallInt => "SMALLINT",
			JdbcType::Integer => "INTEGER",
			JdbcType::BigInt => "BIGINT",
			JdbcType::Float => "FLOAT",
			JdbcType::Real => "REAL",
			JdbcType::Double => "DOUBLE PRECISION",
			JdbcType::Numeric => "NUMERIC",
			JdbcType::Decimal => "DECIMAL",
			JdbcType::Char => "CHAR",
			JdbcType::VarChar => "VARCHAR",
			JdbcType::LongVarChar => "LONGVARCHAR",
			JdbcType::NChar => "NCHAR",
			JdbcType::NVarChar => "NVARCHAR",
			JdbcType::LongNVarChar => "LONGNVARCHAR",
			JdbcType::Date => "DATE",
			JdbcType::Time => "TIME",
			JdbcType::Timestamp => "TIMESTAMP",
			JdbcType::Binary => "BINARY",
			JdbcType::VarBinary => "VARBINARY",
			JdbcType::LongVarBinary => "LONGVARBINARY",
			JdbcType::Blob => "BLOB",
			JdbcType::Clob => "CLOB",
			JdbcType::NClob => "NCLOB",
			JdbcType::Boolean => "BOOLEAN",
			JdbcType::Null => "NULL",
			JdbcType::Other => "OTHER",
		}
	}

	/// Decimal-family types carry a scale.
	pub fn is_decimal(self) -> bool {
		matches!(
			self,
			JdbcType::Decimal | JdbcType::Numeric | JdbcType::Float | JdbcType::Double | JdbcType::Real
		)
	}

	/// Character types (fixed or variable width).
	pub fn is_character(self) -> bool {
		matches!(
			self,
			JdbcType::Char
				| JdbcType::VarChar
				| JdbcType::LongVarChar
				| JdbcType::NChar
				| JdbcType::NVarChar
				| JdbcType::LongNVarChar
				| JdbcType::Clob
				| JdbcType::NClob
		)
	}

	/// Binary types (fixed or variable width).
	pub fn is_binary(self) -> bool {
		matches!(
			self,
			JdbcType::Binary | JdbcType::VarBinary | JdbcType::LongVarBinary | JdbcType::Blob
		)
	}

	/// Types whose DDL takes a length argument, e.g. `VARCHAR(255)`.
	pub fn supports_length(self) -> bool {
		matches!(
			self,
			JdbcType::Char
				| JdbcType::VarChar
				| JdbcType::NChar
				| JdbcType::NVarChar
				| JdbcType::Binary
				| JdbcType::VarBinary
				| JdbcType::Decimal
				| JdbcType::Numeric
		)
	}
}

impl fmt::Display for JdbcType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.sql_name())
	}
}
