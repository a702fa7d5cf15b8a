//! SQLite.
//!
//! `ALTER TABLE` can only rename, add and drop columns. Every other change
//! needs the table rebuilt, which is left to the user: those operations are
//! refused no matter which table or column they target. Foreign keys are
//! declared inside `CREATE TABLE`.

use super::ansi::{ANSI, ANSI_OPS, foreign_key_clause, primary_key_clause, table_elements};
use super::{DdlOperations, Dialect, DialectKind, Statements};
use crate::error::MergeError;
use crate::quoting::{QuotingStrategy, TableName};
use dbsync_map::{DbAttribute, DbEntity, DbRelationship, JdbcType, Procedure};

pub const SQLITE: Dialect = Dialect {
	kind: DialectKind::Sqlite,
	name: "sqlite",
	quoting: QuotingStrategy::new("\"", "\""),
	equivalent_types: &[
		(JdbcType::BigInt, JdbcType::Integer),
		(JdbcType::NClob, JdbcType::VarChar),
		(JdbcType::LongNVarChar, JdbcType::VarChar),
		(JdbcType::Other, JdbcType::Numeric),
	],
	identity_clause: "",
	inline_foreign_keys: true,
	max_identifier_length: 1024,
	true_literal: "1",
	false_literal: "0",
	ops: DdlOperations {
		create_table,
		set_not_null,
		set_allow_null,
		set_column_type,
		set_generated_flag,
		add_relationship,
		drop_relationship,
		set_primary_key,
		drop_procedure,
		..ANSI_OPS
	},
	..ANSI
};

/// The key column of a single-column generated key.
fn rowid_alias(entity: &DbEntity) -> Option<&DbAttribute> {
	let mut keys = entity.primary_keys();
	match (keys.next(), keys.next()) {
		(Some(key), None) if key.generated => Some(key),
		_ => None,
	}
}

fn create_table(d: &Dialect, entity: &DbEntity) -> Statements {
	let alias = rowid_alias(entity).map(|a| a.name.as_str());
	let mut elements: Vec<String> = table_elements(d, entity)?
		.into_iter()
		.zip(entity.attributes())
		.map(|(definition, column)| {
			if Some(column.name.as_str()) == alias {
				format!("{} INTEGER PRIMARY KEY AUTOINCREMENT", d.quoting.quoted(&column.name))
			} else {
				definition
			}
		})
		.collect();
	if alias.is_none() {
		elements.extend(primary_key_clause(d, entity));
	}
	for relationship in entity.relationships().filter(|r| r.is_foreign_key()) {
		let target = TableName::new(relationship.target_entity.clone());
		elements.push(foreign_key_clause(d, &target, relationship));
	}

	Ok(vec![format!(
		"CREATE TABLE {} ({})",
		d.quoting.quoted_table(&TableName::from(entity)),
		elements.join(", ")
	)])
}

fn rebuild_required(d: &Dialect, operation: &'static str, target: String) -> MergeError {
	d.unsupported(
		operation,
		format!("ALTER TABLE cannot change {target}; rebuild the table manually"),
	)
}

fn set_not_null(d: &Dialect, table: &TableName, column: &DbAttribute) -> Statements {
	Err(rebuild_required(
		d,
		"set a column NOT NULL",
		format!("the nullability of {table}.{}", column.name),
	))
}

fn set_allow_null(d: &Dialect, table: &TableName, column: &DbAttribute) -> Statements {
	Err(rebuild_required(
		d,
		"allow NULL in a column",
		format!("the nullability of {table}.{}", column.name),
	))
}

fn set_column_type(
	d: &Dialect,
	table: &TableName,
	_current: &DbAttribute,
	wanted: &DbAttribute,
) -> Statements {
	Err(rebuild_required(
		d,
		"change a column type",
		format!("the type of {table}.{}", wanted.name),
	))
}

fn set_generated_flag(
	d: &Dialect,
	table: &TableName,
	column: &DbAttribute,
	_generated: bool,
) -> Statements {
	Err(rebuild_required(
		d,
		"change a generated column",
		format!("AUTOINCREMENT on {table}.{}", column.name),
	))
}

fn add_relationship(
	d: &Dialect,
	table: &TableName,
	_target: &TableName,
	relationship: &DbRelationship,
) -> Statements {
	Err(rebuild_required(
		d,
		"add a foreign key",
		format!("the foreign keys of {table} (adding {})", relationship.name),
	))
}

fn drop_relationship(d: &Dialect, table: &TableName, relationship: &DbRelationship) -> Statements {
	Err(rebuild_required(
		d,
		"drop a foreign key",
		format!("the foreign keys of {table} (dropping {})", relationship.name),
	))
}

fn set_primary_key(
	d: &Dialect,
	table: &TableName,
	_current: &[String],
	_wanted: &[String],
	_constraint: Option<&str>,
) -> Statements {
	Err(rebuild_required(
		d,
		"change a primary key",
		format!("the primary key of {table}"),
	))
}

fn drop_procedure(d: &Dialect, procedure: &Procedure) -> Statements {
	Err(d.unsupported(
		"drop a procedure",
		format!("there are no stored procedures to drop ({})", procedure.name),
	))
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_generated_key_becomes_rowid_alias() {
		let entity = DbEntity::new("ARTIST")
			.attribute(
				DbAttribute::new("ARTIST_ID", JdbcType::BigInt)
					.primary_key()
					.generated(true),
			)
			.attribute(
				DbAttribute::new("NAME", JdbcType::VarChar)
					.max_length(254)
					.mandatory(true),
			);

		let sql = (SQLITE.ops.create_table)(&SQLITE, &entity).unwrap();

		assert_eq!(
			sql,
			vec![
				"CREATE TABLE ARTIST (ARTIST_ID INTEGER PRIMARY KEY AUTOINCREMENT, \
				 NAME VARCHAR(254) NOT NULL)"
			]
		);
	}

	#[rstest]
	fn test_foreign_keys_are_inline() {
		let entity = DbEntity::new("PAINTING")
			.attribute(DbAttribute::new("PAINTING_ID", JdbcType::Integer).primary_key())
			.attribute(DbAttribute::new("ARTIST_ID", JdbcType::Integer))
			.relationship(
				DbRelationship::new("artist", "PAINTING", "ARTIST").join("ARTIST_ID", "ARTIST_ID"),
			)
			.relationship(
				DbRelationship::new("exhibits", "PAINTING", "EXHIBIT")
					.to_many(true)
					.join("PAINTING_ID", "PAINTING_ID"),
			);

		let sql = (SQLITE.ops.create_table)(&SQLITE, &entity).unwrap();

		assert_eq!(
			sql,
			vec![
				"CREATE TABLE PAINTING (PAINTING_ID INTEGER NOT NULL, ARTIST_ID INTEGER NULL, \
				 PRIMARY KEY (PAINTING_ID), FOREIGN KEY (ARTIST_ID) REFERENCES ARTIST (ARTIST_ID))"
			]
		);
	}

	#[rstest]
	fn test_columns_can_be_added_and_dropped() {
		let table = TableName::new("ARTIST");
		let column = DbAttribute::new("BIO", JdbcType::LongVarChar);

		assert_eq!(
			(SQLITE.ops.add_column)(&SQLITE, &table, &column).unwrap(),
			vec!["ALTER TABLE ARTIST ADD COLUMN BIO LONGVARCHAR"]
		);
		assert_eq!(
			(SQLITE.ops.drop_column)(&SQLITE, &table, &column).unwrap(),
			vec!["ALTER TABLE ARTIST DROP COLUMN BIO"]
		);
	}

	#[rstest]
	fn test_refusal_names_the_column() {
		let err = (SQLITE.ops.set_not_null)(
			&SQLITE,
			&TableName::new("ARTIST"),
			&DbAttribute::new("NAME", JdbcType::VarChar),
		)
		.unwrap_err();

		assert_eq!(
			err.to_string(),
			"sqlite cannot set a column NOT NULL: ALTER TABLE cannot change the nullability \
			 of ARTIST.NAME; rebuild the table manually"
		);
	}
}
