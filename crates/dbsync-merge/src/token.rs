//! Merger tokens
//!
//! A [`MergerToken`] is one difference between a model and a database,
//! together with the side that should change. Tokens own snapshots of the
//! tables and columns they were built from and never change after
//! construction:
//!
//! - to-DB tokens render into statements with [`MergerToken::create_sql`],
//!   which has no side effects and may fail when the dialect cannot make the
//!   change
//! - to-model tokens update a [`DataMap`](dbsync_map::DataMap) with
//!   [`MergerToken::apply_to_model`]
//!
//! [`MergerToken::create_reverse`] turns one kind into the other.

mod model;

use crate::dialect::Dialect;
use crate::error::{MergeError, Result};
use crate::quoting::TableName;
use crate::value::ColumnValue;
use dbsync_map::{DbAttribute, DbEntity, DbRelationship, Procedure};
use std::fmt;

/// Which side of the comparison a token changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
	ToDb,
	ToModel,
}

impl Direction {
	pub fn reverse(self) -> Self {
		match self {
			Direction::ToDb => Direction::ToModel,
			Direction::ToModel => Direction::ToDb,
		}
	}
}

impl fmt::Display for Direction {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Direction::ToDb => f.write_str("To DB"),
			Direction::ToModel => f.write_str("To Model"),
		}
	}
}

/// A single schema difference.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaChange {
	CreateTable {
		entity: DbEntity,
	},
	DropTable {
		entity: DbEntity,
	},
	AddColumn {
		table: TableName,
		column: DbAttribute,
	},
	DropColumn {
		table: TableName,
		column: DbAttribute,
	},
	SetNotNull {
		table: TableName,
		column: DbAttribute,
	},
	SetAllowNull {
		table: TableName,
		column: DbAttribute,
	},
	/// Change `from` into `to`
	SetColumnType {
		table: TableName,
		from: DbAttribute,
		to: DbAttribute,
	},
	SetGeneratedFlag {
		table: TableName,
		column: DbAttribute,
		generated: bool,
	},
	AddRelationship {
		table: TableName,
		target: TableName,
		relationship: DbRelationship,
	},
	DropRelationship {
		table: TableName,
		target: TableName,
		relationship: DbRelationship,
	},
	/// Replace the `previous` key columns by `next`
	SetPrimaryKey {
		table: TableName,
		previous: Vec<String>,
		next: Vec<String>,
		/// Name of the `previous` key constraint, when known
		constraint: Option<String>,
	},
	SetValueForNull {
		table: TableName,
		column: DbAttribute,
		value: ColumnValue,
	},
	AddProcedure {
		procedure: Procedure,
	},
	DropProcedure {
		procedure: Procedure,
	},
}

impl SchemaChange {
	/// The opposite change: applying both leaves a schema as it was.
	pub fn inverse(&self) -> SchemaChange {
		use SchemaChange::*;
		match self.clone() {
			CreateTable { entity } => DropTable { entity },
			DropTable { entity } => CreateTable { entity },
			AddColumn { table, column } => DropColumn { table, column },
			DropColumn { table, column } => AddColumn { table, column },
			SetNotNull { table, column } => SetAllowNull { table, column },
			SetAllowNull { table, column } => SetNotNull { table, column },
			SetColumnType { table, from, to } => SetColumnType {
				table,
				from: to,
				to: from,
			},
			SetGeneratedFlag {
				table,
				column,
				generated,
			} => SetGeneratedFlag {
				table,
				column,
				generated: !generated,
			},
			AddRelationship {
				table,
				target,
				relationship,
			} => DropRelationship {
				table,
				target,
				relationship,
			},
			DropRelationship {
				table,
				target,
				relationship,
			} => AddRelationship {
				table,
				target,
				relationship,
			},
			SetPrimaryKey {
				table,
				previous,
				next,
				constraint,
			} => SetPrimaryKey {
				table,
				previous: next,
				next: previous,
				constraint,
			},
			change @ SetValueForNull { .. } => change,
			AddProcedure { procedure } => DropProcedure { procedure },
			DropProcedure { procedure } => AddProcedure { procedure },
		}
	}
}

/// A schema difference bound to the side that should change.
#[derive(Debug, Clone, PartialEq)]
pub struct MergerToken {
	direction: Direction,
	change: SchemaChange,
}

impl MergerToken {
	pub fn new(direction: Direction, change: SchemaChange) -> Self {
		Self { direction, change }
	}

	pub fn direction(&self) -> Direction {
		self.direction
	}

	pub fn change(&self) -> &SchemaChange {
		&self.change
	}

	pub fn is_to_db(&self) -> bool {
		self.direction == Direction::ToDb
	}

	pub fn name(&self) -> &'static str {
		match self.change {
			SchemaChange::CreateTable { .. } => "Create Table",
			SchemaChange::DropTable { .. } => "Drop Table",
			SchemaChange::AddColumn { .. } => "Add Column",
			SchemaChange::DropColumn { .. } => "Drop Column",
			SchemaChange::SetNotNull { .. } => "Set Not Null",
			SchemaChange::SetAllowNull { .. } => "Set Allow Null",
			SchemaChange::SetColumnType { .. } => "Set Column Type",
			SchemaChange::SetGeneratedFlag { .. } => "Set Generated Flag",
			SchemaChange::AddRelationship { .. } => "Add Relationship",
			SchemaChange::DropRelationship { .. } => "Drop Relationship",
			SchemaChange::SetPrimaryKey { .. } => "Set Primary Key",
			SchemaChange::SetValueForNull { .. } => "Set Value For Null",
			SchemaChange::AddProcedure { .. } => "Add Procedure",
			SchemaChange::DropProcedure { .. } => "Drop Procedure",
		}
	}

	/// What the token touches: a table, `TABLE.COLUMN`, `TABLE.relationship`
	/// or a procedure.
	pub fn target(&self) -> String {
		match &self.change {
			SchemaChange::CreateTable { entity } | SchemaChange::DropTable { entity } => {
				entity.fully_qualified_name()
			}
			SchemaChange::AddColumn { table, column }
			| SchemaChange::DropColumn { table, column }
			| SchemaChange::SetNotNull { table, column }
			| SchemaChange::SetAllowNull { table, column }
			| SchemaChange::SetGeneratedFlag { table, column, .. }
			| SchemaChange::SetValueForNull { table, column, .. } => {
				format!("{table}.{}", column.name)
			}
			SchemaChange::SetColumnType { table, to, .. } => format!("{table}.{}", to.name),
			SchemaChange::AddRelationship {
				table,
				target,
				relationship,
			}
			| SchemaChange::DropRelationship {
				table,
				target,
				relationship,
			} => format!("{table}.{} -> {target}", relationship.name),
			SchemaChange::SetPrimaryKey { table, .. } => table.to_string(),
			SchemaChange::AddProcedure { procedure } | SchemaChange::DropProcedure { procedure } => {
				procedure.fully_qualified_name()
			}
		}
	}

	/// Position in an ordered token list; lower runs first.
	///
	/// Drops come before creates. Rows are filled before a column turns
	/// `NOT NULL`, and foreign keys are added last.
	pub fn sort_weight(&self) -> u32 {
		match self.change {
			SchemaChange::DropRelationship { .. } => 10,
			SchemaChange::DropColumn { .. } => 20,
			SchemaChange::DropTable { .. } => 30,
			SchemaChange::CreateTable { .. } => 40,
			SchemaChange::AddColumn { .. } => 50,
			SchemaChange::SetValueForNull { .. } => 60,
			SchemaChange::SetColumnType { .. } => 70,
			SchemaChange::SetNotNull { .. } | SchemaChange::SetAllowNull { .. } => 80,
			SchemaChange::SetGeneratedFlag { .. } => 90,
			SchemaChange::SetPrimaryKey { .. } => 100,
			SchemaChange::AddRelationship { .. } => 110,
			SchemaChange::AddProcedure { .. } | SchemaChange::DropProcedure { .. } => 120,
		}
	}

	/// Statements making this change in `dialect`.
	///
	/// Pure: calling it any number of times returns the same statements and
	/// changes nothing. Fails when the dialect refuses the change, or when the
	/// token is a to-model token.
	pub fn create_sql(&self, dialect: &Dialect) -> Result<Vec<String>> {
		if self.direction != Direction::ToDb {
			return Err(MergeError::structural(
				self,
				"to-model tokens change the model, not the database",
			));
		}
		let ops = &dialect.ops;
		match &self.change {
			SchemaChange::CreateTable { entity } => (ops.create_table)(dialect, entity),
			SchemaChange::DropTable { entity } => (ops.drop_table)(dialect, entity),
			SchemaChange::AddColumn { table, column } => (ops.add_column)(dialect, table, column),
			SchemaChange::DropColumn { table, column } => (ops.drop_column)(dialect, table, column),
			SchemaChange::SetNotNull { table, column } => (ops.set_not_null)(dialect, table, column),
			SchemaChange::SetAllowNull { table, column } => {
				(ops.set_allow_null)(dialect, table, column)
			}
			SchemaChange::SetColumnType { table, from, to } => {
				(ops.set_column_type)(dialect, table, from, to)
			}
			SchemaChange::SetGeneratedFlag {
				table,
				column,
				generated,
			} => (ops.set_generated_flag)(dialect, table, column, *generated),
			SchemaChange::AddRelationship {
				table,
				target,
				relationship,
			} => (ops.add_relationship)(dialect, table, target, relationship),
			SchemaChange::DropRelationship {
				table,
				relationship,
				..
			} => (ops.drop_relationship)(dialect, table, relationship),
			SchemaChange::SetPrimaryKey {
				table,
				previous,
				next,
				constraint,
			} => (ops.set_primary_key)(dialect, table, previous, next, constraint.as_deref()),
			SchemaChange::SetValueForNull {
				table,
				column,
				value,
			} => (ops.set_value_for_null)(dialect, table, column, value),
			SchemaChange::AddProcedure { procedure } => Err(dialect.unsupported(
				"create a procedure",
				format!(
					"the body of {} is not part of the model; create it manually",
					procedure.fully_qualified_name()
				),
			)),
			SchemaChange::DropProcedure { procedure } => (ops.drop_procedure)(dialect, procedure),
		}
	}

	/// The token undoing this one on the other side.
	pub fn create_reverse(&self) -> MergerToken {
		MergerToken::new(self.direction.reverse(), self.change.inverse())
	}
}

impl fmt::Display for MergerToken {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} {} ({})", self.name(), self.target(), self.direction)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::dialect::{ANSI, MYSQL, SQLITE};
	use dbsync_map::JdbcType;
	use proptest::prelude::*;
	use rstest::rstest;

	fn column() -> DbAttribute {
		DbAttribute::new("NAME", JdbcType::VarChar).max_length(254)
	}

	fn to_db(change: SchemaChange) -> MergerToken {
		MergerToken::new(Direction::ToDb, change)
	}

	#[rstest]
	fn test_display() {
		let token = to_db(SchemaChange::SetNotNull {
			table: TableName::new("ARTIST"),
			column: column(),
		});

		assert_eq!(token.to_string(), "Set Not Null ARTIST.NAME (To DB)");
	}

	#[rstest]
	fn test_reverse_flips_direction_and_change() {
		let token = to_db(SchemaChange::SetNotNull {
			table: TableName::new("ARTIST"),
			column: column(),
		});

		let reverse = token.create_reverse();

		assert_eq!(reverse.direction(), Direction::ToModel);
		assert_eq!(reverse.name(), "Set Allow Null");
		assert_eq!(reverse.create_reverse(), token);
	}

	#[rstest]
	fn test_reverse_swaps_column_types() {
		let from = DbAttribute::new("FLAG", JdbcType::Bit);
		let to = DbAttribute::new("FLAG", JdbcType::Boolean);
		let token = to_db(SchemaChange::SetColumnType {
			table: TableName::new("T"),
			from: from.clone(),
			to: to.clone(),
		});

		let SchemaChange::SetColumnType {
			from: reversed_from,
			to: reversed_to,
			..
		} = token.create_reverse().change().clone()
		else {
			panic!("expected a column type change");
		};

		assert_eq!(reversed_from, to);
		assert_eq!(reversed_to, from);
	}

	#[rstest]
	fn test_to_model_token_has_no_sql() {
		let token = MergerToken::new(
			Direction::ToModel,
			SchemaChange::DropTable {
				entity: DbEntity::new("ARTIST"),
			},
		);

		let err = token.create_sql(&ANSI).unwrap_err();

		assert!(matches!(err, MergeError::Structural { .. }));
	}

	#[rstest]
	fn test_construction_never_renders() {
		// Refused by SQLite, yet building the token succeeds
		let token = to_db(SchemaChange::SetAllowNull {
			table: TableName::new("ARTIST"),
			column: column(),
		});

		assert!(token.create_sql(&SQLITE).is_err());
		assert!(token.create_sql(&MYSQL).is_ok());
	}

	#[rstest]
	fn test_add_procedure_is_refused() {
		let token = to_db(SchemaChange::AddProcedure {
			procedure: Procedure::new("cancel_order"),
		});

		let err = token.create_sql(&ANSI).unwrap_err();

		assert!(err.is_unsupported());
	}

	#[rstest]
	fn test_sort_weight_orders_dependencies() {
		let table = TableName::new("T");
		let fill = to_db(SchemaChange::SetValueForNull {
			table: table.clone(),
			column: column(),
			value: ColumnValue::from("n/a"),
		});
		let not_null = to_db(SchemaChange::SetNotNull {
			table: table.clone(),
			column: column(),
		});
		let add = to_db(SchemaChange::AddColumn {
			table,
			column: column(),
		});

		assert!(add.sort_weight() < fill.sort_weight());
		assert!(fill.sort_weight() < not_null.sort_weight());
	}

	fn arb_identifier() -> impl Strategy<Value = String> {
		"[A-Za-z][A-Za-z0-9_]{0,20}"
	}

	fn arb_type() -> impl Strategy<Value = JdbcType> {
		proptest::sample::select(JdbcType::ALL.to_vec())
	}

	fn arb_change() -> impl Strategy<Value = SchemaChange> {
		(arb_identifier(), arb_identifier(), arb_type(), arb_type(), any::<bool>(), 1u32..500)
			.prop_flat_map(|(table, name, a, b, flag, length)| {
				let table = TableName::new(table);
				let from = DbAttribute::new(name.clone(), a).max_length(length);
				let to = DbAttribute::new(name, b).mandatory(flag);
				let entity = DbEntity::new(table.name.clone())
					.attribute(to.clone().primary_key());
				prop_oneof![
					Just(SchemaChange::CreateTable { entity: entity.clone() }),
					Just(SchemaChange::DropTable { entity }),
					Just(SchemaChange::AddColumn { table: table.clone(), column: to.clone() }),
					Just(SchemaChange::SetNotNull { table: table.clone(), column: to.clone() }),
					Just(SchemaChange::SetColumnType {
						table: table.clone(),
						from,
						to: to.clone(),
					}),
					Just(SchemaChange::SetGeneratedFlag {
						table: table.clone(),
						column: to.clone(),
						generated: flag,
					}),
					Just(SchemaChange::SetPrimaryKey {
						table,
						previous: vec![],
						next: vec![to.name.clone()],
						constraint: None,
					}),
				]
			})
	}

	proptest! {
		#[test]
		fn test_create_sql_is_pure(change in arb_change()) {
			let token = to_db(change);
			let snapshot = token.clone();

			for dialect in Dialect::ALL {
				let first = token.create_sql(dialect).map_err(|e| e.to_string());
				let second = token.create_sql(dialect).map_err(|e| e.to_string());
				prop_assert_eq!(first, second);
			}
			prop_assert_eq!(token, snapshot);
		}
	}
}
