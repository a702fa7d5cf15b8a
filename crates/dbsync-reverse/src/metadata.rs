//! Database metadata access
//!
//! A [`MetadataSource`] answers the catalog queries a reverse engineering run
//! needs, returning typed rows. Implementations wrap a live connection
//! ([`SqliteMetadata`]) or canned data ([`StaticMetadata`]); the loader never
//! opens or closes connections itself.

mod memory;
#[cfg(feature = "sqlite")]
mod sqlite;

pub use memory::{MetadataOperation, StaticMetadata};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteMetadata;

use crate::error::MetadataError;
use async_trait::async_trait;

/// Name pattern matching every object.
pub const WILDCARD: &str = "%";

/// One table or view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
	pub catalog: Option<String>,
	pub schema: Option<String>,
	pub name: String,
	/// Driver table type, e.g. `TABLE` or `VIEW`
	pub table_type: String,
}

impl TableRow {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			catalog: None,
			schema: None,
			name: name.into(),
			table_type: "TABLE".to_string(),
		}
	}
}

/// One column of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRow {
	pub catalog: Option<String>,
	pub schema: Option<String>,
	pub table: String,
	pub name: String,
	/// JDBC type code
	pub data_type: i32,
	pub type_name: String,
	pub column_size: Option<i32>,
	pub decimal_digits: Option<i32>,
	pub nullable: bool,
	pub auto_increment: bool,
}

impl ColumnRow {
	pub fn new(table: impl Into<String>, name: impl Into<String>, data_type: i32) -> Self {
		Self {
			catalog: None,
			schema: None,
			table: table.into(),
			name: name.into(),
			data_type,
			type_name: String::new(),
			column_size: None,
			decimal_digits: None,
			nullable: true,
			auto_increment: false,
		}
	}
}

/// One column of a table's primary key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryKeyRow {
	pub catalog: Option<String>,
	pub schema: Option<String>,
	pub table: String,
	pub column: String,
	pub key_seq: i16,
	pub pk_name: Option<String>,
}

/// One column pair of a foreign key, seen from the referenced table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedKeyRow {
	pub pk_catalog: Option<String>,
	pub pk_schema: Option<String>,
	pub pk_table: String,
	pub pk_column: String,
	pub fk_catalog: Option<String>,
	pub fk_schema: Option<String>,
	pub fk_table: String,
	pub fk_column: String,
	/// 1-based position within a composite key
	pub key_seq: i16,
	/// JDBC delete rule code
	pub delete_rule: i16,
	pub fk_name: Option<String>,
	pub pk_name: Option<String>,
}

impl ExportedKeyRow {
	pub fn new(
		pk_table: impl Into<String>,
		pk_column: impl Into<String>,
		fk_table: impl Into<String>,
		fk_column: impl Into<String>,
		key_seq: i16,
	) -> Self {
		Self {
			pk_catalog: None,
			pk_schema: None,
			pk_table: pk_table.into(),
			pk_column: pk_column.into(),
			fk_catalog: None,
			fk_schema: None,
			fk_table: fk_table.into(),
			fk_column: fk_column.into(),
			key_seq,
			delete_rule: 3,
			fk_name: None,
			pk_name: None,
		}
	}

	pub fn fk_name(mut self, fk_name: impl Into<String>) -> Self {
		self.fk_name = Some(fk_name.into());
		self
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcedureKind {
	Unknown,
	NoResult,
	ReturnsResult,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcedureRow {
	pub catalog: Option<String>,
	pub schema: Option<String>,
	pub name: String,
	pub kind: ProcedureKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcedureColumnKind {
	Unknown,
	In,
	InOut,
	Out,
	Return,
	/// A column of a returned result set
	Result,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcedureColumnRow {
	pub catalog: Option<String>,
	pub schema: Option<String>,
	pub procedure: String,
	pub name: Option<String>,
	pub kind: ProcedureColumnKind,
	pub data_type: i32,
	pub length: Option<i32>,
	pub scale: Option<i16>,
}

/// Catalog queries over an open connection.
///
/// `None` for catalog or schema means "any". Name patterns use SQL `LIKE`
/// syntax; [`WILDCARD`] matches everything.
#[async_trait]
pub trait MetadataSource: Send + Sync {
	async fn catalogs(&self) -> Result<Vec<String>, MetadataError>;

	async fn schemas(&self) -> Result<Vec<String>, MetadataError>;

	async fn tables(
		&self,
		catalog: Option<&str>,
		schema: Option<&str>,
		table_pattern: &str,
		types: &[String],
	) -> Result<Vec<TableRow>, MetadataError>;

	async fn columns(
		&self,
		catalog: Option<&str>,
		schema: Option<&str>,
		table_pattern: &str,
	) -> Result<Vec<ColumnRow>, MetadataError>;

	async fn primary_keys(
		&self,
		catalog: Option<&str>,
		schema: Option<&str>,
		table: &str,
	) -> Result<Vec<PrimaryKeyRow>, MetadataError>;

	/// Foreign keys referencing `table`, ordered by referencing table and
	/// key sequence.
	async fn exported_keys(
		&self,
		catalog: Option<&str>,
		schema: Option<&str>,
		table: &str,
	) -> Result<Vec<ExportedKeyRow>, MetadataError>;

	async fn procedures(
		&self,
		catalog: Option<&str>,
		schema: Option<&str>,
		procedure_pattern: &str,
	) -> Result<Vec<ProcedureRow>, MetadataError>;

	async fn procedure_columns(
		&self,
		catalog: Option<&str>,
		schema: Option<&str>,
		procedure_pattern: &str,
	) -> Result<Vec<ProcedureColumnRow>, MetadataError>;
}

/// SQL `LIKE` matching (`%` and `_`), ignoring ASCII case.
pub fn like_matches(pattern: &str, name: &str) -> bool {
	fn matches(pattern: &[u8], name: &[u8]) -> bool {
		match pattern.split_first() {
			None => name.is_empty(),
			Some((b'%', rest)) => (0..=name.len()).any(|i| matches(rest, &name[i..])),
			Some((b'_', rest)) => !name.is_empty() && matches(rest, &name[1..]),
			Some((c, rest)) => name
				.split_first()
				.is_some_and(|(n, tail)| n.eq_ignore_ascii_case(c) && matches(rest, tail)),
		}
	}
	matches(pattern.as_bytes(), name.as_bytes())
}
