//! Token construction bound to a dialect.

use crate::dialect::Dialect;
use crate::error::Result;
use crate::quoting::TableName;
use crate::token::{Direction, MergerToken, SchemaChange};
use crate::value::ColumnValue;
use dbsync_map::{DbAttribute, DbEntity, DbRelationship, Procedure};

/// Builds [`MergerToken`]s for one [`Dialect`] and renders them with it.
///
/// Building a token never fails, even when the dialect refuses the change;
/// the refusal comes from [`render`](Self::render).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergerTokenFactory {
	dialect: Dialect,
}

impl MergerTokenFactory {
	pub fn new(dialect: Dialect) -> Self {
		Self { dialect }
	}

	pub fn dialect(&self) -> &Dialect {
		&self.dialect
	}

	pub fn render(&self, token: &MergerToken) -> Result<Vec<String>> {
		token.create_sql(&self.dialect)
	}

	fn to_db(&self, change: SchemaChange) -> MergerToken {
		MergerToken::new(Direction::ToDb, change)
	}

	fn to_model(&self, change: SchemaChange) -> MergerToken {
		MergerToken::new(Direction::ToModel, change)
	}

	pub fn create_create_table_to_db(&self, entity: &DbEntity) -> MergerToken {
		self.to_db(SchemaChange::CreateTable {
			entity: entity.clone(),
		})
	}

	pub fn create_create_table_to_model(&self, entity: &DbEntity) -> MergerToken {
		self.to_model(SchemaChange::CreateTable {
			entity: entity.clone(),
		})
	}

	pub fn create_drop_table_to_db(&self, entity: &DbEntity) -> MergerToken {
		self.to_db(SchemaChange::DropTable {
			entity: entity.clone(),
		})
	}

	pub fn create_drop_table_to_model(&self, entity: &DbEntity) -> MergerToken {
		self.to_model(SchemaChange::DropTable {
			entity: entity.clone(),
		})
	}

	pub fn create_add_column_to_db(&self, entity: &DbEntity, column: &DbAttribute) -> MergerToken {
		self.to_db(SchemaChange::AddColumn {
			table: entity.into(),
			column: column.clone(),
		})
	}

	pub fn create_add_column_to_model(
		&self,
		entity: &DbEntity,
		column: &DbAttribute,
	) -> MergerToken {
		self.to_model(SchemaChange::AddColumn {
			table: entity.into(),
			column: column.clone(),
		})
	}

	pub fn create_drop_column_to_db(&self, entity: &DbEntity, column: &DbAttribute) -> MergerToken {
		self.to_db(SchemaChange::DropColumn {
			table: entity.into(),
			column: column.clone(),
		})
	}

	pub fn create_drop_column_to_model(
		&self,
		entity: &DbEntity,
		column: &DbAttribute,
	) -> MergerToken {
		self.to_model(SchemaChange::DropColumn {
			table: entity.into(),
			column: column.clone(),
		})
	}

	pub fn create_set_not_null_to_db(&self, entity: &DbEntity, column: &DbAttribute) -> MergerToken {
		self.to_db(SchemaChange::SetNotNull {
			table: entity.into(),
			column: column.clone(),
		})
	}

	pub fn create_set_not_null_to_model(
		&self,
		entity: &DbEntity,
		column: &DbAttribute,
	) -> MergerToken {
		self.to_model(SchemaChange::SetNotNull {
			table: entity.into(),
			column: column.clone(),
		})
	}

	pub fn create_set_allow_null_to_db(
		&self,
		entity: &DbEntity,
		column: &DbAttribute,
	) -> MergerToken {
		self.to_db(SchemaChange::SetAllowNull {
			table: entity.into(),
			column: column.clone(),
		})
	}

	pub fn create_set_allow_null_to_model(
		&self,
		entity: &DbEntity,
		column: &DbAttribute,
	) -> MergerToken {
		self.to_model(SchemaChange::SetAllowNull {
			table: entity.into(),
			column: column.clone(),
		})
	}

	/// Change the database column `current` to match the model column `wanted`.
	pub fn create_set_column_type_to_db(
		&self,
		entity: &DbEntity,
		current: &DbAttribute,
		wanted: &DbAttribute,
	) -> MergerToken {
		self.to_db(SchemaChange::SetColumnType {
			table: entity.into(),
			from: current.clone(),
			to: wanted.clone(),
		})
	}

	/// Change the model column `current` to match the database column `wanted`.
	pub fn create_set_column_type_to_model(
		&self,
		entity: &DbEntity,
		current: &DbAttribute,
		wanted: &DbAttribute,
	) -> MergerToken {
		self.to_model(SchemaChange::SetColumnType {
			table: entity.into(),
			from: current.clone(),
			to: wanted.clone(),
		})
	}

	pub fn create_set_generated_flag_to_db(
		&self,
		entity: &DbEntity,
		column: &DbAttribute,
		generated: bool,
	) -> MergerToken {
		self.to_db(SchemaChange::SetGeneratedFlag {
			table: entity.into(),
			column: column.clone(),
			generated,
		})
	}

	pub fn create_set_generated_flag_to_model(
		&self,
		entity: &DbEntity,
		column: &DbAttribute,
		generated: bool,
	) -> MergerToken {
		self.to_model(SchemaChange::SetGeneratedFlag {
			table: entity.into(),
			column: column.clone(),
			generated,
		})
	}

	fn relationship_tables(
		entity: &DbEntity,
		relationship: &DbRelationship,
	) -> (TableName, TableName) {
		let table = TableName::from(entity);
		// Relationships do not cross schemas
		let target = TableName {
			catalog: table.catalog.clone(),
			schema: table.schema.clone(),
			name: relationship.target_entity.clone(),
		};
		(table, target)
	}

	pub fn create_add_relationship_to_db(
		&self,
		entity: &DbEntity,
		relationship: &DbRelationship,
	) -> MergerToken {
		let (table, target) = Self::relationship_tables(entity, relationship);
		self.to_db(SchemaChange::AddRelationship {
			table,
			target,
			relationship: relationship.clone(),
		})
	}

	pub fn create_add_relationship_to_model(
		&self,
		entity: &DbEntity,
		relationship: &DbRelationship,
	) -> MergerToken {
		let (table, target) = Self::relationship_tables(entity, relationship);
		self.to_model(SchemaChange::AddRelationship {
			table,
			target,
			relationship: relationship.clone(),
		})
	}

	pub fn create_drop_relationship_to_db(
		&self,
		entity: &DbEntity,
		relationship: &DbRelationship,
	) -> MergerToken {
		let (table, target) = Self::relationship_tables(entity, relationship);
		self.to_db(SchemaChange::DropRelationship {
			table,
			target,
			relationship: relationship.clone(),
		})
	}

	pub fn create_drop_relationship_to_model(
		&self,
		entity: &DbEntity,
		relationship: &DbRelationship,
	) -> MergerToken {
		let (table, target) = Self::relationship_tables(entity, relationship);
		self.to_model(SchemaChange::DropRelationship {
			table,
			target,
			relationship: relationship.clone(),
		})
	}

	/// Replace the database key `previous` by `next`. `entity` is the
	/// database table, whose detected key constraint name is dropped.
	pub fn create_set_primary_key_to_db(
		&self,
		entity: &DbEntity,
		previous: &[String],
		next: &[String],
	) -> MergerToken {
		self.to_db(SchemaChange::SetPrimaryKey {
			table: entity.into(),
			previous: previous.to_vec(),
			next: next.to_vec(),
			constraint: entity.primary_key_name.clone(),
		})
	}

	pub fn create_set_primary_key_to_model(
		&self,
		entity: &DbEntity,
		previous: &[String],
		next: &[String],
	) -> MergerToken {
		self.to_model(SchemaChange::SetPrimaryKey {
			table: entity.into(),
			previous: previous.to_vec(),
			next: next.to_vec(),
			constraint: entity.primary_key_name.clone(),
		})
	}

	/// Fill `NULL`s of `column` with `value` before it becomes mandatory.
	pub fn create_set_value_for_null_to_db(
		&self,
		entity: &DbEntity,
		column: &DbAttribute,
		value: ColumnValue,
	) -> MergerToken {
		self.to_db(SchemaChange::SetValueForNull {
			table: entity.into(),
			column: column.clone(),
			value,
		})
	}

	pub fn create_add_procedure_to_db(&self, procedure: &Procedure) -> MergerToken {
		self.to_db(SchemaChange::AddProcedure {
			procedure: procedure.clone(),
		})
	}

	pub fn create_add_procedure_to_model(&self, procedure: &Procedure) -> MergerToken {
		self.to_model(SchemaChange::AddProcedure {
			procedure: procedure.clone(),
		})
	}

	pub fn create_drop_procedure_to_db(&self, procedure: &Procedure) -> MergerToken {
		self.to_db(SchemaChange::DropProcedure {
			procedure: procedure.clone(),
		})
	}

	pub fn create_drop_procedure_to_model(&self, procedure: &Procedure) -> MergerToken {
		self.to_model(SchemaChange::DropProcedure {
			procedure: procedure.clone(),
		})
	}
}
