//! Table metadata

use crate::attribute::DbAttribute;
use crate::relationship::DbRelationship;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Kind of relation a table row describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TableType {
	#[default]
	Table,
	View,
}

impl TableType {
	/// Parse the `TABLE_TYPE` column of table metadata.
	pub fn parse(table_type: &str) -> Self {
		if table_type.to_ascii_uppercase().contains("VIEW") {
			TableType::View
		} else {
			TableType::Table
		}
	}
}

/// A database table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DbEntity {
	pub name: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub catalog: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub schema: Option<String>,
	#[serde(default)]
	pub table_type: TableType,
	/// Name of the primary key constraint, when read from a database
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub primary_key_name: Option<String>,
	#[serde(default)]
	attributes: IndexMap<String, DbAttribute>,
	#[serde(default)]
	relationships: IndexMap<String, DbRelationship>,
}

impl DbEntity {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			catalog: None,
			schema: None,
			table_type: TableType::Table,
			primary_key_name: None,
			attributes: IndexMap::new(),
			relationships: IndexMap::new(),
		}
	}

	pub fn with_catalog(mut self, catalog: impl Into<String>) -> Self {
		self.catalog = Some(catalog.into());
		self
	}

	pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
		self.schema = Some(schema.into());
		self
	}

	/// Builder form of [`add_attribute`](Self::add_attribute).
	pub fn attribute(mut self, attribute: DbAttribute) -> Self {
		self.add_attribute(attribute);
		self
	}

	/// Builder form of [`add_relationship`](Self::add_relationship).
	pub fn relationship(mut self, relationship: DbRelationship) -> Self {
		self.add_relationship(relationship);
		self
	}

	/// `catalog.schema.name`, skipping absent qualifiers.
	pub fn fully_qualified_name(&self) -> String {
		qualified_name(self.catalog.as_deref(), self.schema.as_deref(), &self.name)
	}

	/// Add a column, replacing (and returning) a column of the same name.
	pub fn add_attribute(&mut self, attribute: DbAttribute) -> Option<DbAttribute> {
		self.attributes.insert(attribute.name.clone(), attribute)
	}

	pub fn remove_attribute(&mut self, name: &str) -> Option<DbAttribute> {
		self.attributes.shift_remove(name)
	}

	pub fn get_attribute(&self, name: &str) -> Option<&DbAttribute> {
		self.attributes.get(name)
	}

	pub fn get_attribute_mut(&mut self, name: &str) -> Option<&mut DbAttribute> {
		self.attributes.get_mut(name)
	}

	/// Case-insensitive column lookup.
	pub fn find_attribute(&self, name: &str) -> Option<&DbAttribute> {
		self.attributes
			.get(name)
			.or_else(|| self.attributes.values().find(|a| a.name.eq_ignore_ascii_case(name)))
	}

	pub fn find_attribute_mut(&mut self, name: &str) -> Option<&mut DbAttribute> {
		let key = if self.attributes.contains_key(name) {
			name.to_string()
		} else {
			self.attributes
				.keys()
				.find(|k| k.eq_ignore_ascii_case(name))?
				.clone()
		};
		self.attributes.get_mut(&key)
	}

	pub fn attributes(&self) -> impl Iterator<Item = &DbAttribute> {
		self.attributes.values()
	}

	pub fn attributes_mut(&mut self) -> impl Iterator<Item = &mut DbAttribute> {
		self.attributes.values_mut()
	}

	pub fn attribute_count(&self) -> usize {
		self.attributes.len()
	}

	/// Primary key columns in declaration order.
	pub fn primary_keys(&self) -> impl Iterator<Item = &DbAttribute> {
		self.attributes.values().filter(|a| a.primary_key)
	}

	pub fn primary_key_names(&self) -> Vec<String> {
		self.primary_keys().map(|a| a.name.clone()).collect()
	}

	/// Add a relationship, replacing (and returning) one of the same name.
	pub fn add_relationship(&mut self, relationship: DbRelationship) -> Option<DbRelationship> {
		self.relationships
			.insert(relationship.name.clone(), relationship)
	}

	pub fn remove_relationship(&mut self, name: &str) -> Option<DbRelationship> {
		self.relationships.shift_remove(name)
	}

	pub fn get_relationship(&self, name: &str) -> Option<&DbRelationship> {
		self.relationships.get(name)
	}

	pub fn relationships(&self) -> impl Iterator<Item = &DbRelationship> {
		self.relationships.values()
	}

	/// Whether `name` is already used by a column or relationship.
	pub fn has_property(&self, name: &str) -> bool {
		self.attributes.contains_key(name) || self.relationships.contains_key(name)
	}
}

/// Join catalog, schema and object name with dots, skipping absent parts.
pub fn qualified_name(catalog: Option<&str>, schema: Option<&str>, name: &str) -> String {
	let mut parts: Vec<&str> = Vec::with_capacity(3);
	if let Some(catalog) = catalog.filter(|c| !c.is_empty()) {
		parts.push(catalog);
	}
	if let Some(schema) = schema.filter(|s| !s.is_empty()) {
		parts.push(schema);
	}
	parts.push(name);
	parts.join(".")
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::types::JdbcType;
	use rstest::rstest;

	#[rstest]
	fn test_readding_attribute_replaces_previous() {
		let mut entity = DbEntity::new("ARTIST");
		entity.add_attribute(DbAttribute::new("NAME", JdbcType::VarChar).max_length(10));
		let displaced =
			entity.add_attribute(DbAttribute::new("NAME", JdbcType::VarChar).max_length(200));

		assert_eq!(displaced.and_then(|a| a.max_length), Some(10));
		assert_eq!(entity.attribute_count(), 1);
		assert_eq!(
			entity.get_attribute("NAME").and_then(|a| a.max_length),
			Some(200)
		);
	}

	#[rstest]
	fn test_find_attribute_ignores_case() {
		let entity = DbEntity::new("ARTIST").attribute(DbAttribute::new("ARTIST_ID", JdbcType::BigInt));
		assert!(entity.find_attribute("artist_id").is_some());
		assert!(entity.get_attribute("artist_id").is_none());
	}

	#[rstest]
	#[case(None, None, "T")]
	#[case(Some("C"), None, "C.T")]
	#[case(None, Some("S"), "S.T")]
	#[case(Some("C"), Some("S"), "C.S.T")]
	#[case(Some(""), Some("S"), "S.T")]
	fn test_qualified_name(
		#[case] catalog: Option<&str>,
		#[case] schema: Option<&str>,
		#[case] expected: &str,
	) {
		assert_eq!(qualified_name(catalog, schema, "T"), expected);
	}

	#[rstest]
	fn test_primary_keys_in_declaration_order() {
		let entity = DbEntity::new("LINE")
			.attribute(DbAttribute::new("ORDER_ID", JdbcType::Integer).primary_key())
			.attribute(DbAttribute::new("NOTE", JdbcType::VarChar))
			.attribute(DbAttribute::new("LINE_NO", JdbcType::Integer).primary_key());

		assert_eq!(entity.primary_key_names(), vec!["ORDER_ID", "LINE_NO"]);
	}
}
