//! Applying to-model tokens to a [`DataMap`].

use super::{Direction, MergerToken, SchemaChange};
use crate::error::{MergeError, Result};
use crate::quoting::TableName;
use dbsync_map::{DataMap, DbAttribute, DbEntity};
use dbsync_reverse::NameBuilder;

fn entity_mut<'m>(
	map: &'m mut DataMap,
	table: &TableName,
	token: &MergerToken,
) -> Result<&'m mut DbEntity> {
	map.find_entity_mut(&table.name)
		.ok_or_else(|| MergeError::structural(token, format!("no table {table} in the model")))
}

fn column_mut<'m>(
	map: &'m mut DataMap,
	table: &TableName,
	column: &str,
	token: &MergerToken,
) -> Result<&'m mut DbAttribute> {
	entity_mut(map, table, token)?
		.find_attribute_mut(column)
		.ok_or_else(|| {
			MergeError::structural(token, format!("no column {table}.{column} in the model"))
		})
}

impl MergerToken {
	/// Make the change in `map`.
	///
	/// Tables and columns are looked up ignoring case. A missing table or
	/// column fails with [`MergeError::Structural`] and leaves `map`
	/// untouched.
	pub fn apply_to_model(&self, map: &mut DataMap) -> Result<()> {
		if self.direction != Direction::ToModel {
			return Err(MergeError::structural(
				self,
				"to-db tokens change the database, not the model",
			));
		}

		match &self.change {
			SchemaChange::CreateTable { entity } => {
				map.add_entity(entity.clone());
			}
			SchemaChange::DropTable { entity } => {
				let name = map
					.find_entity(&entity.name)
					.map(|e| e.name.clone())
					.ok_or_else(|| {
						MergeError::structural(self, format!("no table {} in the model", entity.name))
					})?;
				map.remove_entity(&name);
				for other in map.entities_mut() {
					let dangling: Vec<String> = other
						.relationships()
						.filter(|r| r.target_entity.eq_ignore_ascii_case(&name))
						.map(|r| r.name.clone())
						.collect();
					for relationship in dangling {
						other.remove_relationship(&relationship);
					}
				}
			}
			SchemaChange::AddColumn { table, column } => {
				entity_mut(map, table, self)?.add_attribute(column.clone());
			}
			SchemaChange::DropColumn { table, column } => {
				let entity = entity_mut(map, table, self)?;
				let name = entity
					.find_attribute(&column.name)
					.map(|a| a.name.clone())
					.ok_or_else(|| {
						MergeError::structural(
							self,
							format!("no column {table}.{} in the model", column.name),
						)
					})?;
				entity.remove_attribute(&name);
				let joined: Vec<String> = entity
					.relationships()
					.filter(|r| r.source_columns().any(|c| c.eq_ignore_ascii_case(&name)))
					.map(|r| r.name.clone())
					.collect();
				for relationship in joined {
					entity.remove_relationship(&relationship);
				}
			}
			SchemaChange::SetNotNull { table, column } => {
				column_mut(map, table, &column.name, self)?.mandatory = true;
			}
			SchemaChange::SetAllowNull { table, column } => {
				column_mut(map, table, &column.name, self)?.mandatory = false;
			}
			SchemaChange::SetColumnType { table, to, .. } => {
				let column = column_mut(map, table, &to.name, self)?;
				column.set_jdbc_type(to.jdbc_type);
				column.max_length = to.max_length;
				column.set_scale(to.get_scale());
				column.vendor_type = to.vendor_type.clone();
			}
			SchemaChange::SetGeneratedFlag {
				table,
				column,
				generated,
			} => {
				column_mut(map, table, &column.name, self)?.generated = *generated;
			}
			SchemaChange::AddRelationship {
				table,
				relationship,
				..
			} => {
				let entity = entity_mut(map, table, self)?;
				let mut relationship = relationship.clone();
				relationship.source_entity = entity.name.clone();
				if entity.has_property(&relationship.name) {
					relationship.name = NameBuilder::new(entity)
						.base_name(relationship.name.clone())
						.name();
				}
				entity.add_relationship(relationship);
			}
			SchemaChange::DropRelationship {
				table,
				target,
				relationship,
			} => {
				let entity = entity_mut(map, table, self)?;
				let name = entity
					.relationships()
					.find(|r| {
						r.target_entity.eq_ignore_ascii_case(&target.name)
							&& r.joins_equal_ignore_case(relationship)
					})
					.map(|r| r.name.clone())
					.ok_or_else(|| {
						MergeError::structural(
							self,
							format!("no matching relationship on {table} in the model"),
						)
					})?;
				entity.remove_relationship(&name);
			}
			SchemaChange::SetPrimaryKey { table, next, .. } => {
				let entity = entity_mut(map, table, self)?;
				for column in entity.attributes_mut() {
					column.primary_key = next.iter().any(|k| k.eq_ignore_ascii_case(&column.name));
					if column.primary_key {
						column.mandatory = true;
					}
				}
			}
			// Rows only exist in the database
			SchemaChange::SetValueForNull { .. } => {}
			SchemaChange::AddProcedure { procedure } => {
				map.add_procedure(procedure.clone());
			}
			SchemaChange::DropProcedure { procedure } => {
				map.remove_procedure(&procedure.fully_qualified_name());
			}
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use dbsync_map::{DbRelationship, JdbcType};
	use rstest::{fixture, rstest};

	#[fixture]
	fn gallery() -> DataMap {
		DataMap::new("gallery")
			.entity(
				DbEntity::new("ARTIST")
					.attribute(DbAttribute::new("ARTIST_ID", JdbcType::BigInt).primary_key())
					.attribute(DbAttribute::new("NAME", JdbcType::VarChar).max_length(254)),
			)
			.entity(
				DbEntity::new("PAINTING")
					.attribute(DbAttribute::new("PAINTING_ID", JdbcType::BigInt).primary_key())
					.attribute(DbAttribute::new("ARTIST_ID", JdbcType::BigInt))
					.relationship(
						DbRelationship::new("artist", "PAINTING", "ARTIST")
							.join("ARTIST_ID", "ARTIST_ID"),
					),
			)
	}

	fn to_model(change: SchemaChange) -> MergerToken {
		MergerToken::new(Direction::ToModel, change)
	}

	#[rstest]
	fn test_set_allow_null_ignores_case(mut gallery: DataMap) {
		let token = to_model(SchemaChange::SetNotNull {
			table: TableName::new("artist"),
			column: DbAttribute::new("name", JdbcType::VarChar),
		});

		token.apply_to_model(&mut gallery).unwrap();

		let name = gallery.find_entity("ARTIST").unwrap().find_attribute("NAME").unwrap();
		assert!(name.mandatory);
	}

	#[rstest]
	fn test_drop_table_removes_incoming_relationships(mut gallery: DataMap) {
		let artist = gallery.find_entity("ARTIST").unwrap().clone();
		let token = to_model(SchemaChange::DropTable { entity: artist });

		token.apply_to_model(&mut gallery).unwrap();

		assert!(gallery.find_entity("ARTIST").is_none());
		assert_eq!(gallery.find_entity("PAINTING").unwrap().relationships().count(), 0);
	}

	#[rstest]
	fn test_drop_column_removes_joined_relationships(mut gallery: DataMap) {
		let token = to_model(SchemaChange::DropColumn {
			table: TableName::new("PAINTING"),
			column: DbAttribute::new("ARTIST_ID", JdbcType::BigInt),
		});

		token.apply_to_model(&mut gallery).unwrap();

		let painting = gallery.find_entity("PAINTING").unwrap();
		assert!(painting.find_attribute("ARTIST_ID").is_none());
		assert!(painting.get_relationship("artist").is_none());
	}

	#[rstest]
	fn test_add_relationship_renames_on_conflict(mut gallery: DataMap) {
		let token = to_model(SchemaChange::AddRelationship {
			table: TableName::new("PAINTING"),
			target: TableName::new("ARTIST"),
			relationship: DbRelationship::new("artist", "PAINTING", "ARTIST")
				.join("PAINTING_ID", "ARTIST_ID"),
		});

		token.apply_to_model(&mut gallery).unwrap();

		let painting = gallery.find_entity("PAINTING").unwrap();
		assert_eq!(painting.relationships().count(), 2);
		assert!(painting.get_relationship("artist1").is_some());
	}

	#[rstest]
	fn test_set_primary_key(mut gallery: DataMap) {
		let token = to_model(SchemaChange::SetPrimaryKey {
			table: TableName::new("ARTIST"),
			previous: vec!["ARTIST_ID".to_string()],
			next: vec!["name".to_string()],
			constraint: None,
		});

		token.apply_to_model(&mut gallery).unwrap();

		assert_eq!(
			gallery.find_entity("ARTIST").unwrap().primary_key_names(),
			vec!["NAME".to_string()]
		);
	}

	#[rstest]
	fn test_missing_table_is_structural(mut gallery: DataMap) {
		let before = gallery.clone();
		let token = to_model(SchemaChange::AddColumn {
			table: TableName::new("GALLERY"),
			column: DbAttribute::new("NAME", JdbcType::VarChar),
		});

		let err = token.apply_to_model(&mut gallery).unwrap_err();

		assert!(matches!(err, MergeError::Structural { .. }));
		assert_eq!(gallery, before);
	}

	#[rstest]
	fn test_to_db_token_is_rejected(mut gallery: DataMap) {
		let token = MergerToken::new(
			Direction::ToDb,
			SchemaChange::AddColumn {
				table: TableName::new("ARTIST"),
				column: DbAttribute::new("BIO", JdbcType::Clob),
			},
		);

		assert!(token.apply_to_model(&mut gallery).is_err());
	}
}
