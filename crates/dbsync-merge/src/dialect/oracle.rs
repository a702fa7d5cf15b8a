//! Oracle.

use super::ansi::{ANSI, ANSI_OPS, alter};
use super::{DdlOperations, Dialect, DialectKind, PkGenerator, Statements};
use crate::quoting::{QuotingStrategy, TableName};
use dbsync_map::{DbAttribute, DbEntity, JdbcType};

pub const ORACLE: Dialect = Dialect {
	kind: DialectKind::Oracle,
	name: "oracle",
	quoting: QuotingStrategy::new("\"", "\""),
	type_name,
	equivalent_types: &[
		(JdbcType::Boolean, JdbcType::Decimal),
		(JdbcType::Bit, JdbcType::Decimal),
		(JdbcType::Integer, JdbcType::Decimal),
		(JdbcType::BigInt, JdbcType::Decimal),
		(JdbcType::SmallInt, JdbcType::Decimal),
		(JdbcType::Timestamp, JdbcType::Date),
		(JdbcType::LongVarChar, JdbcType::Clob),
		(JdbcType::LongVarBinary, JdbcType::Blob),
	],
	supports_generated_keys: false,
	identity_clause: "",
	max_identifier_length: 30,
	pk_generator: PkGenerator::Sequence {
		create: "CREATE SEQUENCE {name} START WITH 200 INCREMENT BY 20",
		drop: "DROP SEQUENCE {name}",
	},
	true_literal: "1",
	false_literal: "0",
	ops: DdlOperations {
		drop_table,
		add_column,
		set_not_null,
		set_allow_null,
		set_column_type,
		..ANSI_OPS
	},
	..ANSI
};

fn type_name(t: JdbcType) -> &'static str {
	match t {
		JdbcType::Bit | JdbcType::Boolean | JdbcType::TinyInt | JdbcType::SmallInt => "NUMBER",
		JdbcType::Integer | JdbcType::BigInt | JdbcType::Decimal | JdbcType::Numeric => "NUMBER",
		JdbcType::VarChar => "VARCHAR2",
		JdbcType::NVarChar => "NVARCHAR2",
		JdbcType::LongVarChar => "CLOB",
		JdbcType::LongNVarChar => "NCLOB",
		JdbcType::Binary | JdbcType::VarBinary => "RAW",
		JdbcType::LongVarBinary => "BLOB",
		other => other.sql_name(),
	}
}

/// `ALTER TABLE <table> MODIFY (<clause>)`
fn modify(d: &Dialect, table: &TableName, clause: String) -> String {
	format!("{}MODIFY ({})", alter(d, table), clause)
}

fn drop_table(d: &Dialect, entity: &DbEntity) -> Statements {
	let mut statements = vec![format!(
		"DROP TABLE {} CASCADE CONSTRAINTS",
		d.quoting.quoted_table(&TableName::from(entity))
	)];
	statements.extend(d.pk_generator.drop_statements(d, entity));
	Ok(statements)
}

fn add_column(d: &Dialect, table: &TableName, column: &DbAttribute) -> Statements {
	Ok(vec![format!(
		"{}ADD ({} {})",
		alter(d, table),
		d.quoting.quoted(&column.name),
		d.column_type(column)
	)])
}

fn set_not_null(d: &Dialect, table: &TableName, column: &DbAttribute) -> Statements {
	let clause = format!("{} NOT NULL", d.quoting.quoted(&column.name));
	Ok(vec![modify(d, table, clause)])
}

fn set_allow_null(d: &Dialect, table: &TableName, column: &DbAttribute) -> Statements {
	let clause = format!("{} NULL", d.quoting.quoted(&column.name));
	Ok(vec![modify(d, table, clause)])
}

fn set_column_type(
	d: &Dialect,
	table: &TableName,
	_current: &DbAttribute,
	wanted: &DbAttribute,
) -> Statements {
	let clause = format!("{} {}", d.quoting.quoted(&wanted.name), d.column_type(wanted));
	Ok(vec![modify(d, table, clause)])
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_oracle_modify() {
		let table = TableName::new("ARTIST");
		let column = DbAttribute::new("NAME", JdbcType::VarChar).max_length(80);

		assert_eq!(
			(ORACLE.ops.set_not_null)(&ORACLE, &table, &column).unwrap(),
			vec!["ALTER TABLE ARTIST MODIFY (NAME NOT NULL)"]
		);
		assert_eq!(
			(ORACLE.ops.set_column_type)(&ORACLE, &table, &column, &column).unwrap(),
			vec!["ALTER TABLE ARTIST MODIFY (NAME VARCHAR2(80))"]
		);
		assert_eq!(
			(ORACLE.ops.add_column)(&ORACLE, &table, &column).unwrap(),
			vec!["ALTER TABLE ARTIST ADD (NAME VARCHAR2(80))"]
		);
	}

	#[rstest]
	fn test_drop_table_cascades_and_drops_sequence() {
		let entity = DbEntity::new("ARTIST")
			.attribute(DbAttribute::new("ARTIST_ID", JdbcType::BigInt).primary_key());

		let sql = (ORACLE.ops.drop_table)(&ORACLE, &entity).unwrap();

		assert_eq!(sql, vec!["DROP TABLE ARTIST CASCADE CONSTRAINTS", "DROP SEQUENCE pk_artist"]);
	}
}
