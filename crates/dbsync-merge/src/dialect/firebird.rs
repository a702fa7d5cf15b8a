//! Firebird.
//!
//! Firebird has no DDL for column nullability, so it is switched by writing
//! `RDB$NULL_FLAG` in the `RDB$RELATION_FIELDS` system table. Keys come from
//! generators.

use super::ansi::{ANSI, ANSI_OPS, alter};
use super::{DdlOperations, Dialect, DialectKind, PkGenerator, Statements};
use crate::quoting::{QuotingStrategy, TableName, string_literal};
use dbsync_map::{DbAttribute, JdbcType};

pub const FIREBIRD: Dialect = Dialect {
	kind: DialectKind::Firebird,
	name: "firebird",
	quoting: QuotingStrategy::new("\"", "\""),
	type_name,
	equivalent_types: &[
		(JdbcType::Bit, JdbcType::SmallInt),
		(JdbcType::Boolean, JdbcType::SmallInt),
		(JdbcType::TinyInt, JdbcType::SmallInt),
		(JdbcType::Clob, JdbcType::LongVarChar),
		(JdbcType::Blob, JdbcType::LongVarBinary),
	],
	supports_generated_keys: false,
	identity_clause: "",
	explicit_null: false,
	max_identifier_length: 31,
	pk_generator: PkGenerator::Sequence {
		create: "CREATE GENERATOR {name}",
		drop: "DROP GENERATOR {name}",
	},
	true_literal: "1",
	false_literal: "0",
	ops: DdlOperations {
		add_column,
		drop_column,
		set_not_null,
		set_allow_null,
		set_column_type,
		..ANSI_OPS
	},
	..ANSI
};

fn type_name(t: JdbcType) -> &'static str {
	match t {
		JdbcType::Bit | JdbcType::Boolean | JdbcType::TinyInt => "SMALLINT",
		JdbcType::LongVarChar | JdbcType::Clob | JdbcType::LongNVarChar | JdbcType::NClob => {
			"BLOB SUB_TYPE TEXT"
		}
		JdbcType::Binary | JdbcType::VarBinary | JdbcType::LongVarBinary => "BLOB",
		other => other.sql_name(),
	}
}

/// `UPDATE RDB$RELATION_FIELDS` for one column.
fn null_flag(table: &TableName, column: &DbAttribute, flag: &str) -> String {
	format!(
		"UPDATE RDB$RELATION_FIELDS SET RDB$NULL_FLAG = {flag} \
		 WHERE RDB$FIELD_NAME = {} AND RDB$RELATION_NAME = {}",
		string_literal(&column.name),
		string_literal(&table.name)
	)
}

fn add_column(d: &Dialect, table: &TableName, column: &DbAttribute) -> Statements {
	Ok(vec![format!(
		"{}ADD {} {}",
		alter(d, table),
		d.quoting.quoted(&column.name),
		d.column_type(column)
	)])
}

fn drop_column(d: &Dialect, table: &TableName, column: &DbAttribute) -> Statements {
	Ok(vec![format!(
		"{}DROP {}",
		alter(d, table),
		d.quoting.quoted(&column.name)
	)])
}

fn set_not_null(_d: &Dialect, table: &TableName, column: &DbAttribute) -> Statements {
	Ok(vec![null_flag(table, column, "1")])
}

fn set_allow_null(_d: &Dialect, table: &TableName, column: &DbAttribute) -> Statements {
	Ok(vec![null_flag(table, column, "NULL")])
}

fn set_column_type(
	d: &Dialect,
	table: &TableName,
	_current: &DbAttribute,
	wanted: &DbAttribute,
) -> Statements {
	Ok(vec![format!(
		"{}ALTER {} TYPE {}",
		alter(d, table),
		d.quoting.quoted(&wanted.name),
		d.column_type(wanted)
	)])
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::MergeError;
	use dbsync_map::DbEntity;
	use rstest::rstest;

	#[rstest]
	fn test_nullability_writes_system_table() {
		let column = DbAttribute::new("NAME", JdbcType::VarChar);
		let table = TableName::new("ARTIST");

		assert_eq!(
			(FIREBIRD.ops.set_not_null)(&FIREBIRD, &table, &column).unwrap(),
			vec![
				"UPDATE RDB$RELATION_FIELDS SET RDB$NULL_FLAG = 1 \
				 WHERE RDB$FIELD_NAME = 'NAME' AND RDB$RELATION_NAME = 'ARTIST'"
			]
		);
		assert_eq!(
			(FIREBIRD.ops.set_allow_null)(&FIREBIRD, &table, &column).unwrap(),
			vec![
				"UPDATE RDB$RELATION_FIELDS SET RDB$NULL_FLAG = NULL \
				 WHERE RDB$FIELD_NAME = 'NAME' AND RDB$RELATION_NAME = 'ARTIST'"
			]
		);
	}

	#[rstest]
	fn test_create_and_drop_table_manage_generator() {
		let entity = DbEntity::new("ARTIST")
			.attribute(DbAttribute::new("ARTIST_ID", JdbcType::BigInt).primary_key());

		let created = (FIREBIRD.ops.create_table)(&FIREBIRD, &entity).unwrap();
		let dropped = (FIREBIRD.ops.drop_table)(&FIREBIRD, &entity).unwrap();

		assert_eq!(
			created,
			vec![
				"CREATE TABLE ARTIST (ARTIST_ID BIGINT NOT NULL, PRIMARY KEY (ARTIST_ID))",
				"CREATE GENERATOR pk_artist",
			]
		);
		assert_eq!(dropped, vec!["DROP TABLE ARTIST", "DROP GENERATOR pk_artist"]);
	}

	#[rstest]
	fn test_generated_flag_unsupported() {
		let id = DbAttribute::new("ID", JdbcType::Integer).primary_key();

		let err = (FIREBIRD.ops.set_generated_flag)(&FIREBIRD, &TableName::new("T"), &id, true)
			.unwrap_err();

		assert!(matches!(err, MergeError::Unsupported { dialect: "firebird", .. }));
	}
}
