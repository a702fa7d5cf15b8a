//! Dialect-neutral DDL shared by every dialect.

use super::{DdlOperations, Dialect, DialectKind, PkGenerator, Statements};
use crate::error::MergeError;
use crate::quoting::{QuotingStrategy, TableName};
use crate::value::ColumnValue;
use dbsync_map::{DbAttribute, DbEntity, DbRelationship, DeleteRule, JdbcType, Procedure};

pub const ANSI_OPS: DdlOperations = DdlOperations {
	create_table,
	drop_table,
	add_column,
	drop_column,
	set_not_null,
	set_allow_null,
	set_column_type,
	set_generated_flag,
	add_relationship,
	drop_relationship,
	set_primary_key,
	set_value_for_null,
	drop_procedure,
};

pub const ANSI: Dialect = Dialect {
	kind: DialectKind::Ansi,
	name: "ansi",
	quoting: QuotingStrategy::new("\"", "\""),
	type_name: JdbcType::sql_name,
	equivalent_types: &[],
	supports_generated_keys: true,
	identity_clause: "GENERATED BY DEFAULT AS IDENTITY",
	explicit_null: true,
	inline_foreign_keys: false,
	max_identifier_length: 128,
	pk_generator: PkGenerator::Native,
	true_literal: "TRUE",
	false_literal: "FALSE",
	ops: ANSI_OPS,
};

/// `ALTER TABLE <table> ` prefix.
pub(crate) fn alter(d: &Dialect, table: &TableName) -> String {
	format!("ALTER TABLE {} ", d.quoting.quoted_table(table))
}

/// Column list of `CREATE TABLE`, including the primary key clause.
pub(crate) fn table_elements(d: &Dialect, entity: &DbEntity) -> Result<Vec<String>, MergeError> {
	if entity.attribute_count() == 0 {
		return Err(MergeError::structural(
			format!("Create Table {}", entity.fully_qualified_name()),
			"table has no columns",
		));
	}
	Ok(entity.attributes().map(|a| d.column_definition(a)).collect())
}

pub(crate) fn primary_key_clause(d: &Dialect, entity: &DbEntity) -> Option<String> {
	let keys = entity.primary_key_names();
	if keys.is_empty() {
		return None;
	}
	Some(format!(
		"PRIMARY KEY ({})",
		d.quoting.quoted_list(keys.iter().map(String::as_str))
	))
}

/// `FOREIGN KEY (...) REFERENCES <target> (...) [ON DELETE ...]`
pub(crate) fn foreign_key_clause(
	d: &Dialect,
	target: &TableName,
	relationship: &DbRelationship,
) -> String {
	let mut clause = format!(
		"FOREIGN KEY ({}) REFERENCES {} ({})",
		d.quoting.quoted_list(relationship.source_columns()),
		d.quoting.quoted_table(target),
		d.quoting.quoted_list(relationship.target_columns()),
	);
	if relationship.delete_rule != DeleteRule::NoAction {
		clause.push_str(" ON DELETE ");
		clause.push_str(relationship.delete_rule.as_sql());
	}
	clause
}

fn create_table(d: &Dialect, entity: &DbEntity) -> Statements {
	let mut elements = table_elements(d, entity)?;
	elements.extend(primary_key_clause(d, entity));

	let mut statements = vec![format!(
		"CREATE TABLE {} ({})",
		d.quoting.quoted_table(&TableName::from(entity)),
		elements.join(", ")
	)];
	statements.extend(d.pk_generator.create_statements(d, entity));
	Ok(statements)
}

pub(crate) fn drop_table(d: &Dialect, entity: &DbEntity) -> Statements {
	let mut statements = vec![format!(
		"DROP TABLE {}",
		d.quoting.quoted_table(&TableName::from(entity))
	)];
	statements.extend(d.pk_generator.drop_statements(d, entity));
	Ok(statements)
}

fn add_column(d: &Dialect, table: &TableName, column: &DbAttribute) -> Statements {
	Ok(vec![format!(
		"{}ADD COLUMN {} {}",
		alter(d, table),
		d.quoting.quoted(&column.name),
		d.column_type(column)
	)])
}

fn drop_column(d: &Dialect, table: &TableName, column: &DbAttribute) -> Statements {
	Ok(vec![format!(
		"{}DROP COLUMN {}",
		alter(d, table),
		d.quoting.quoted(&column.name)
	)])
}

fn set_not_null(d: &Dialect, table: &TableName, column: &DbAttribute) -> Statements {
	Ok(vec![format!(
		"{}ALTER COLUMN {} SET NOT NULL",
		alter(d, table),
		d.quoting.quoted(&column.name)
	)])
}

fn set_allow_null(d: &Dialect, table: &TableName, column: &DbAttribute) -> Statements {
	Ok(vec![format!(
		"{}ALTER COLUMN {} DROP NOT NULL",
		alter(d, table),
		d.quoting.quoted(&column.name)
	)])
}

fn set_column_type(
	d: &Dialect,
	table: &TableName,
	_current: &DbAttribute,
	wanted: &DbAttribute,
) -> Statements {
	Ok(vec![format!(
		"{}ALTER COLUMN {} SET DATA TYPE {}",
		alter(d, table),
		d.quoting.quoted(&wanted.name),
		d.column_type(wanted)
	)])
}

fn set_generated_flag(
	d: &Dialect,
	table: &TableName,
	column: &DbAttribute,
	generated: bool,
) -> Statements {
	if !d.supports_generated_keys {
		return Err(d.unsupported(
			"change a generated column",
			format!(
				"generated keys are not supported; update {}.{} by hand",
				table, column.name
			),
		));
	}
	let action = if generated {
		"ADD GENERATED BY DEFAULT AS IDENTITY"
	} else {
		"DROP IDENTITY"
	};
	Ok(vec![format!(
		"{}ALTER COLUMN {} {}",
		alter(d, table),
		d.quoting.quoted(&column.name),
		action
	)])
}

fn add_relationship(
	d: &Dialect,
	table: &TableName,
	target: &TableName,
	relationship: &DbRelationship,
) -> Statements {
	if !relationship.is_foreign_key() {
		return Ok(Vec::new());
	}
	Ok(vec![format!(
		"{}ADD CONSTRAINT {} {}",
		alter(d, table),
		d.quoting.quoted(&d.fk_constraint_name(relationship)),
		foreign_key_clause(d, target, relationship)
	)])
}

/// Detected constraint name of a foreign key about to be dropped.
pub(crate) fn existing_fk_name<'r>(
	table: &TableName,
	relationship: &'r DbRelationship,
) -> Result<&'r str, MergeError> {
	relationship.fk_name.as_deref().ok_or_else(|| {
		MergeError::structural(
			format!("Drop Relationship {}.{}", table, relationship.name),
			"the foreign key constraint name is unknown",
		)
	})
}

fn drop_relationship(d: &Dialect, table: &TableName, relationship: &DbRelationship) -> Statements {
	if !relationship.is_foreign_key() {
		return Ok(Vec::new());
	}
	let name = existing_fk_name(table, relationship)?;
	Ok(vec![format!(
		"{}DROP CONSTRAINT {}",
		alter(d, table),
		d.quoting.quoted(name)
	)])
}

pub(crate) fn add_primary_key(d: &Dialect, table: &TableName, keys: &[String]) -> Option<String> {
	if keys.is_empty() {
		return None;
	}
	Some(format!(
		"{}ADD PRIMARY KEY ({})",
		alter(d, table),
		d.quoting.quoted_list(keys.iter().map(String::as_str))
	))
}

fn set_primary_key(
	d: &Dialect,
	table: &TableName,
	current: &[String],
	wanted: &[String],
	constraint: Option<&str>,
) -> Statements {
	let mut statements = Vec::new();
	if !current.is_empty() {
		statements.push(match constraint {
			Some(name) => format!("{}DROP CONSTRAINT {}", alter(d, table), d.quoting.quoted(name)),
			None => format!("{}DROP PRIMARY KEY", alter(d, table)),
		});
	}
	statements.extend(add_primary_key(d, table, wanted));
	Ok(statements)
}

fn set_value_for_null(
	d: &Dialect,
	table: &TableName,
	column: &DbAttribute,
	value: &ColumnValue,
) -> Statements {
	let name = d.quoting.quoted(&column.name);
	Ok(vec![format!(
		"UPDATE {} SET {} = {} WHERE {} IS NULL",
		d.quoting.quoted_table(table),
		name,
		value.to_sql(d),
		name
	)])
}

fn drop_procedure(d: &Dialect, procedure: &Procedure) -> Statements {
	let name = TableName {
		catalog: procedure.catalog.clone(),
		schema: procedure.schema.clone(),
		name: procedure.name.clone(),
	};
	Ok(vec![format!("DROP PROCEDURE {}", d.quoting.quoted_table(&name))])
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::{fixture, rstest};

	#[fixture]
	fn artist() -> DbEntity {
		DbEntity::new("ARTIST")
			.attribute(DbAttribute::new("ARTIST_ID", JdbcType::BigInt).primary_key())
			.attribute(
				DbAttribute::new("NAME", JdbcType::VarChar)
					.max_length(254)
					.mandatory(true),
			)
			.attribute(DbAttribute::new("DATE_OF_BIRTH", JdbcType::Date))
	}

	#[rstest]
	fn test_create_table(artist: DbEntity) {
		let sql = (ANSI.ops.create_table)(&ANSI, &artist).unwrap();

		assert_eq!(
			sql,
			vec![
				"CREATE TABLE ARTIST (ARTIST_ID BIGINT NOT NULL, NAME VARCHAR(254) NOT NULL, \
				 DATE_OF_BIRTH DATE NULL, PRIMARY KEY (ARTIST_ID))"
			]
		);
	}

	#[rstest]
	fn test_create_table_quoted(artist: DbEntity) {
		let dialect = ANSI.with_quoting(true);

		let sql = (dialect.ops.create_table)(&dialect, &artist.with_schema("gallery")).unwrap();

		assert!(sql[0].starts_with("CREATE TABLE \"gallery\".\"ARTIST\" (\"ARTIST_ID\" BIGINT"));
		assert!(sql[0].ends_with("PRIMARY KEY (\"ARTIST_ID\"))"));
	}

	#[rstest]
	fn test_create_table_without_columns_is_structural() {
		let err = (ANSI.ops.create_table)(&ANSI, &DbEntity::new("EMPTY")).unwrap_err();

		assert!(matches!(err, MergeError::Structural { .. }));
	}

	#[rstest]
	fn test_add_relationship_with_delete_rule() {
		let mut relationship = DbRelationship::new("artist", "PAINTING", "ARTIST")
			.join("ARTIST_ID", "ARTIST_ID")
			.fk_name("FK_PAINTING_ARTIST");
		relationship.delete_rule = DeleteRule::Cascade;

		let sql = (ANSI.ops.add_relationship)(
			&ANSI,
			&TableName::new("PAINTING"),
			&TableName::new("ARTIST"),
			&relationship,
		)
		.unwrap();

		assert_eq!(
			sql,
			vec![
				"ALTER TABLE PAINTING ADD CONSTRAINT FK_PAINTING_ARTIST FOREIGN KEY (ARTIST_ID) \
				 REFERENCES ARTIST (ARTIST_ID) ON DELETE CASCADE"
			]
		);
	}

	#[rstest]
	fn test_to_many_relationship_renders_nothing() {
		let relationship = DbRelationship::new("paintings", "ARTIST", "PAINTING")
			.to_many(true)
			.join("ARTIST_ID", "ARTIST_ID");

		let table = TableName::new("ARTIST");
		let target = TableName::new("PAINTING");

		assert!((ANSI.ops.add_relationship)(&ANSI, &table, &target, &relationship)
			.unwrap()
			.is_empty());
		assert!((ANSI.ops.drop_relationship)(&ANSI, &table, &relationship)
			.unwrap()
			.is_empty());
	}

	#[rstest]
	fn test_drop_relationship_needs_constraint_name() {
		let relationship = DbRelationship::new("artist", "PAINTING", "ARTIST").join("ARTIST_ID", "ARTIST_ID");

		let err = (ANSI.ops.drop_relationship)(&ANSI, &TableName::new("PAINTING"), &relationship)
			.unwrap_err();

		assert!(matches!(err, MergeError::Structural { .. }));
	}

	#[rstest]
	#[case(&[], &["ID"], None, vec!["ALTER TABLE T ADD PRIMARY KEY (ID)"])]
	#[case(&["ID"], &["A", "B"], Some("T_PK"), vec![
		"ALTER TABLE T DROP CONSTRAINT T_PK",
		"ALTER TABLE T ADD PRIMARY KEY (A, B)",
	])]
	#[case(&["ID"], &[], None, vec!["ALTER TABLE T DROP PRIMARY KEY"])]
	fn test_set_primary_key(
		#[case] current: &[&str],
		#[case] wanted: &[&str],
		#[case] constraint: Option<&str>,
		#[case] expected: Vec<&str>,
	) {
		let current: Vec<String> = current.iter().map(|s| s.to_string()).collect();
		let wanted: Vec<String> = wanted.iter().map(|s| s.to_string()).collect();

		let sql =
			(ANSI.ops.set_primary_key)(&ANSI, &TableName::new("T"), &current, &wanted, constraint)
				.unwrap();

		assert_eq!(sql, expected);
	}

	#[rstest]
	fn test_set_value_for_null() {
		let column = DbAttribute::new("NAME", JdbcType::VarChar);

		let sql = (ANSI.ops.set_value_for_null)(
			&ANSI,
			&TableName::new("ARTIST"),
			&column,
			&ColumnValue::from("unknown"),
		)
		.unwrap();

		assert_eq!(sql, vec!["UPDATE ARTIST SET NAME = 'unknown' WHERE NAME IS NULL"]);
	}
}
