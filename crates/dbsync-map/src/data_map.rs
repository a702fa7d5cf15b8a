//! Schema container

use crate::entity::DbEntity;
use crate::error::{MapError, Result};
use crate::index::TableIndex;
use crate::procedure::Procedure;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A named collection of tables and procedures.
///
/// Entities keep the name they were added with; lookups try that exact name
/// first and then fall back to a case-insensitive match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataMap {
	pub name: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub default_catalog: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub default_schema: Option<String>,
	/// Quote identifiers when rendering DDL for this map
	#[serde(default)]
	pub quoting_sql_identifiers: bool,
	#[serde(default)]
	entities: IndexMap<String, DbEntity>,
	#[serde(default)]
	procedures: IndexMap<String, Procedure>,
}

impl DataMap {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			..Default::default()
		}
	}

	/// Build a map from tables collected in a [`TableIndex`].
	pub fn from_index(name: impl Into<String>, index: TableIndex) -> Self {
		let mut map = Self::new(name);
		for entity in index.into_entities() {
			map.add_entity(entity);
		}
		map
	}

	/// Builder form of [`add_entity`](Self::add_entity).
	pub fn entity(mut self, entity: DbEntity) -> Self {
		self.add_entity(entity);
		self
	}

	/// Add a table, replacing (and returning) a table with the exact same name.
	pub fn add_entity(&mut self, entity: DbEntity) -> Option<DbEntity> {
		self.entities.insert(entity.name.clone(), entity)
	}

	pub fn remove_entity(&mut self, name: &str) -> Option<DbEntity> {
		self.entities.shift_remove(name)
	}

	pub fn get_entity(&self, name: &str) -> Option<&DbEntity> {
		self.entities.get(name)
	}

	pub fn get_entity_mut(&mut self, name: &str) -> Option<&mut DbEntity> {
		self.entities.get_mut(name)
	}

	/// Exact match first, then the first case-insensitive match.
	pub fn find_entity(&self, name: &str) -> Option<&DbEntity> {
		self.entities
			.get(name)
			.or_else(|| self.entities.values().find(|e| e.name.eq_ignore_ascii_case(name)))
	}

	pub fn find_entity_mut(&mut self, name: &str) -> Option<&mut DbEntity> {
		let key = if self.entities.contains_key(name) {
			name.to_string()
		} else {
			self.entities
				.keys()
				.find(|k| k.eq_ignore_ascii_case(name))?
				.clone()
		};
		self.entities.get_mut(&key)
	}

	pub fn entities(&self) -> impl Iterator<Item = &DbEntity> {
		self.entities.values()
	}

	pub fn entities_mut(&mut self) -> impl Iterator<Item = &mut DbEntity> {
		self.entities.values_mut()
	}

	pub fn entity_count(&self) -> usize {
		self.entities.len()
	}

	/// Add a procedure keyed by its fully qualified name.
	pub fn add_procedure(&mut self, procedure: Procedure) -> Option<Procedure> {
		self.procedures
			.insert(procedure.fully_qualified_name(), procedure)
	}

	pub fn remove_procedure(&mut self, fully_qualified_name: &str) -> Option<Procedure> {
		self.procedures.shift_remove(fully_qualified_name)
	}

	pub fn get_procedure(&self, fully_qualified_name: &str) -> Option<&Procedure> {
		self.procedures.get(fully_qualified_name)
	}

	pub fn procedures(&self) -> impl Iterator<Item = &Procedure> {
		self.procedures.values()
	}

	/// Serialize the map as pretty-printed JSON.
	pub fn to_json(&self) -> Result<String> {
		Ok(serde_json::to_string_pretty(self)?)
	}

	pub fn from_json(json: &str) -> Result<Self> {
		Ok(serde_json::from_str(json)?)
	}

	/// Write the map as JSON to `path`.
	pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
		let path = path.as_ref();
		let json = self.to_json()?;
		std::fs::write(path, json).map_err(|source| MapError::Io {
			path: path.to_path_buf(),
			source,
		})
	}

	/// Read a map previously written with [`save`](Self::save).
	pub fn load(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let json = std::fs::read_to_string(path).map_err(|source| MapError::Io {
			path: path.to_path_buf(),
			source,
		})?;
		Self::from_json(&json)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::attribute::DbAttribute;
	use crate::relationship::DbRelationship;
	use crate::types::JdbcType;
	use rstest::{fixture, rstest};

	#[fixture]
	fn artist_map() -> DataMap {
		DataMap::new("gallery")
			.entity(
				DbEntity::new("ARTIST")
					.attribute(DbAttribute::new("ARTIST_ID", JdbcType::BigInt).primary_key())
					.attribute(DbAttribute::new("NAME", JdbcType::VarChar).max_length(254)),
			)
			.entity(
				DbEntity::new("PAINTING")
					.attribute(DbAttribute::new("PAINTING_ID", JdbcType::Integer).primary_key())
					.attribute(DbAttribute::new("ARTIST_ID", JdbcType::BigInt))
					.relationship(
						DbRelationship::new("artist", "PAINTING", "ARTIST").join("ARTIST_ID", "ARTIST_ID"),
					),
			)
	}

	#[rstest]
	fn test_entities_are_case_sensitive_but_findable(artist_map: DataMap) {
		assert!(artist_map.get_entity("artist").is_none());
		assert_eq!(
			artist_map.find_entity("artist").map(|e| e.name.as_str()),
			Some("ARTIST")
		);
	}

	#[rstest]
	fn test_same_name_in_different_case_coexists() {
		let map = DataMap::new("m")
			.entity(DbEntity::new("table1"))
			.entity(DbEntity::new("Table1"));
		assert_eq!(map.entity_count(), 2);
	}

	#[rstest]
	fn test_json_snapshot_survives_reload(artist_map: DataMap) {
		let json = artist_map.to_json().unwrap();
		let restored = DataMap::from_json(&json).unwrap();
		assert_eq!(restored, artist_map);
	}

	#[rstest]
	fn test_save_and_load(artist_map: DataMap) {
		let dir = tempfile::TempDir::new().unwrap();
		let path = dir.path().join("gallery.json");

		artist_map.save(&path).unwrap();
		let restored = DataMap::load(&path).unwrap();

		assert_eq!(restored.entity_count(), 2);
		assert!(restored.get_entity("PAINTING").unwrap().get_relationship("artist").is_some());
	}

	#[rstest]
	fn test_load_missing_file_reports_path() {
		let err = DataMap::load("/nonexistent/dbsync/map.json").unwrap_err();
		assert!(err.to_string().contains("/nonexistent/dbsync/map.json"));
	}
}
