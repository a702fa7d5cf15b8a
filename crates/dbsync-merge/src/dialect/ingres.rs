//! Ingres.

use super::ansi::{ANSI, ANSI_OPS, alter};
use super::{DdlOperations, Dialect, DialectKind, PkGenerator, Statements};
use crate::quoting::{QuotingStrategy, TableName};
use dbsync_map::{DbAttribute, JdbcType};

pub const INGRES: Dialect = Dialect {
	kind: DialectKind::Ingres,
	name: "ingres",
	quoting: QuotingStrategy::new("\"", "\""),
	type_name,
	equivalent_types: &[
		(JdbcType::Boolean, JdbcType::TinyInt),
		(JdbcType::Bit, JdbcType::TinyInt),
		(JdbcType::Clob, JdbcType::LongVarChar),
		(JdbcType::Blob, JdbcType::LongVarBinary),
	],
	supports_generated_keys: false,
	identity_clause: "",
	explicit_null: false,
	max_identifier_length: 32,
	pk_generator: PkGenerator::Sequence {
		create: "CREATE SEQUENCE {name} START WITH 200 INCREMENT BY 20",
		drop: "DROP SEQUENCE {name}",
	},
	true_literal: "1",
	false_literal: "0",
	ops: DdlOperations {
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
		JdbcType::Bit | JdbcType::Boolean => "TINYINT",
		JdbcType::Double => "FLOAT8",
		JdbcType::LongVarChar | JdbcType::Clob => "LONG VARCHAR",
		JdbcType::LongNVarChar | JdbcType::NClob => "LONG NVARCHAR",
		JdbcType::LongVarBinary | JdbcType::Blob => "LONG BYTE",
		JdbcType::Binary => "BYTE",
		JdbcType::VarBinary => "VARBYTE",
		other => other.sql_name(),
	}
}

fn alter_column(d: &Dialect, table: &TableName, column: &DbAttribute, nullability: &str) -> String {
	format!(
		"{}ALTER COLUMN {} {} {}",
		alter(d, table),
		d.quoting.quoted(&column.name),
		d.column_type(column),
		nullability
	)
}

fn drop_column(d: &Dialect, table: &TableName, column: &DbAttribute) -> Statements {
	Ok(vec![format!(
		"{}DROP COLUMN {} RESTRICT",
		alter(d, table),
		d.quoting.quoted(&column.name)
	)])
}

fn set_not_null(d: &Dialect, table: &TableName, column: &DbAttribute) -> Statements {
	Ok(vec![alter_column(d, table, column, "NOT NULL")])
}

fn set_allow_null(d: &Dialect, table: &TableName, column: &DbAttribute) -> Statements {
	Ok(vec![alter_column(d, table, column, "WITH NULL")])
}

fn set_column_type(
	d: &Dialect,
	table: &TableName,
	current: &DbAttribute,
	wanted: &DbAttribute,
) -> Statements {
	let nullability = if current.mandatory { "NOT NULL" } else { "WITH NULL" };
	Ok(vec![alter_column(d, table, wanted, nullability)])
}
