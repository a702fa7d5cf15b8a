//! Identifier quoting

use dbsync_map::DbEntity;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Catalog, schema and name of a table, detached from its entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableName {
	pub catalog: Option<String>,
	pub schema: Option<String>,
	pub name: String,
}

impl TableName {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			catalog: None,
			schema: None,
			name: name.into(),
		}
	}
}

impl From<&DbEntity> for TableName {
	fn from(entity: &DbEntity) -> Self {
		Self {
			catalog: entity.catalog.clone(),
			schema: entity.schema.clone(),
			name: entity.name.clone(),
		}
	}
}

impl fmt::Display for TableName {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&dbsync_map::qualified_name(
			self.catalog.as_deref(),
			self.schema.as_deref(),
			&self.name,
		))
	}
}

/// Quotes identifiers with a dialect's delimiters when enabled.
///
/// Embedded closing delimiters are doubled, so `a"b` becomes `"a""b"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotingStrategy {
	pub start: &'static str,
	pub end: &'static str,
	pub enabled: bool,
}

impl QuotingStrategy {
	pub const fn new(start: &'static str, end: &'static str) -> Self {
		Self {
			start,
			end,
			enabled: false,
		}
	}

	pub fn quoted(&self, identifier: &str) -> String {
		if !self.enabled {
			return identifier.to_string();
		}
		let escaped = identifier.replace(self.end, &format!("{0}{0}", self.end));
		format!("{}{}{}", self.start, escaped, self.end)
	}

	/// `catalog.schema.name`, each present part quoted separately.
	pub fn quoted_table(&self, table: &TableName) -> String {
		[table.catalog.as_deref(), table.schema.as_deref(), Some(table.name.as_str())]
			.into_iter()
			.flatten()
			.filter(|part| !part.is_empty())
			.map(|part| self.quoted(part))
			.collect::<Vec<_>>()
			.join(".")
	}

	/// Comma separated quoted identifiers.
	pub fn quoted_list<'a>(&self, identifiers: impl IntoIterator<Item = &'a str>) -> String {
		identifiers
			.into_iter()
			.map(|i| self.quoted(i))
			.collect::<Vec<_>>()
			.join(", ")
	}
}

/// Single-quoted SQL string literal.
pub fn string_literal(value: &str) -> String {
	format!("'{}'", value.replace('\'', "''"))
}
