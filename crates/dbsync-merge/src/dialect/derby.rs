//! Apache Derby.

use super::ansi::{ANSI, ANSI_OPS, alter};
use super::{DdlOperations, Dialect, DialectKind, Statements};
use crate::quoting::{QuotingStrategy, TableName};
use dbsync_map::{DbAttribute, JdbcType};

pub const DERBY: Dialect = Dialect {
	kind: DialectKind::Derby,
	name: "derby",
	quoting: QuotingStrategy::new("\"", "\""),
	type_name,
	equivalent_types: &[
		(JdbcType::Bit, JdbcType::SmallInt),
		(JdbcType::TinyInt, JdbcType::SmallInt),
		(JdbcType::Float, JdbcType::Double),
	],
	explicit_null: false,
	ops: DdlOperations {
		set_not_null,
		set_allow_null,
		set_generated_flag,
		..ANSI_OPS
	},
	..ANSI
};

fn type_name(t: JdbcType) -> &'static str {
	match t {
		JdbcType::Bit | JdbcType::TinyInt => "SMALLINT",
		JdbcType::Double | JdbcType::Float => "DOUBLE",
		JdbcType::LongVarChar | JdbcType::LongNVarChar => "LONG VARCHAR",
		JdbcType::NChar => "CHAR",
		JdbcType::NVarChar => "VARCHAR",
		JdbcType::NClob => "CLOB",
		JdbcType::Binary => "CHAR FOR BIT DATA",
		JdbcType::VarBinary => "VARCHAR FOR BIT DATA",
		JdbcType::LongVarBinary => "LONG VARCHAR FOR BIT DATA",
		other => other.sql_name(),
	}
}

fn set_not_null(d: &Dialect, table: &TableName, column: &DbAttribute) -> Statements {
	Ok(vec![format!(
		"{}ALTER COLUMN {} NOT NULL",
		alter(d, table),
		d.quoting.quoted(&column.name)
	)])
}

fn set_allow_null(d: &Dialect, table: &TableName, column: &DbAttribute) -> Statements {
	Ok(vec![format!(
		"{}ALTER COLUMN {} NULL",
		alter(d, table),
		d.quoting.quoted(&column.name)
	)])
}

fn set_generated_flag(
	d: &Dialect,
	table: &TableName,
	column: &DbAttribute,
	generated: bool,
) -> Statements {
	let change = if generated {
		"turn on generation for"
	} else {
		"turn off generation for"
	};
	Err(d.unsupported(
		"change a generated column",
		format!(
			"cannot {change} column {table}.{}; alter the schema manually",
			column.name
		),
	))
}
