//! H2.

use super::ansi::{ANSI, ANSI_OPS, alter};
use super::{DdlOperations, Dialect, DialectKind, Statements};
use crate::quoting::{QuotingStrategy, TableName};
use dbsync_map::{DbAttribute, JdbcType};

pub const H2: Dialect = Dialect {
	kind: DialectKind::H2,
	name: "h2",
	quoting: QuotingStrategy::new("\"", "\""),
	equivalent_types: &[(JdbcType::Boolean, JdbcType::Bit)],
	identity_clause: "AUTO_INCREMENT",
	max_identifier_length: 256,
	ops: DdlOperations {
		set_allow_null,
		set_column_type,
		..ANSI_OPS
	},
	..ANSI
};

fn set_allow_null(d: &Dialect, table: &TableName, column: &DbAttribute) -> Statements {
	Ok(vec![format!(
		"{}ALTER COLUMN {} SET NULL",
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
		"{}ALTER COLUMN {} {}",
		alter(d, table),
		d.quoting.quoted(&wanted.name),
		d.column_type(wanted)
	)])
}
