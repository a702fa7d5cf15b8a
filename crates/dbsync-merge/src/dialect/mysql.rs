//! MySQL and MariaDB.
//!
//! Column changes restate the whole column with `MODIFY`; keys are dropped
//! with `DROP FOREIGN KEY` and `DROP PRIMARY KEY`.

use super::ansi::{ANSI, ANSI_OPS, add_primary_key, alter, existing_fk_name};
use super::{DdlOperations, Dialect, DialectKind, Statements};
use crate::quoting::{QuotingStrategy, TableName};
use dbsync_map::{DbAttribute, DbRelationship, JdbcType};

pub const MYSQL: Dialect = Dialect {
	kind: DialectKind::MySql,
	name: "mysql",
	quoting: QuotingStrategy::new("`", "`"),
	type_name,
	equivalent_types: &[
		(JdbcType::Boolean, JdbcType::Bit),
		(JdbcType::Boolean, JdbcType::TinyInt),
		(JdbcType::Blob, JdbcType::LongVarBinary),
		(JdbcType::Clob, JdbcType::LongVarChar),
		(JdbcType::NClob, JdbcType::LongNVarChar),
	],
	identity_clause: "AUTO_INCREMENT",
	max_identifier_length: 64,
	true_literal: "1",
	false_literal: "0",
	ops: DdlOperations {
		set_not_null,
		set_allow_null,
		set_column_type,
		set_generated_flag,
		drop_relationship,
		set_primary_key,
		..ANSI_OPS
	},
	..ANSI
};

fn type_name(t: JdbcType) -> &'static str {
	match t {
		JdbcType::Boolean => "BOOL",
		JdbcType::Double => "DOUBLE",
		JdbcType::Timestamp => "DATETIME",
		JdbcType::LongVarChar | JdbcType::Clob | JdbcType::NClob | JdbcType::LongNVarChar => {
			"LONGTEXT"
		}
		JdbcType::LongVarBinary | JdbcType::Blob => "LONGBLOB",
		other => other.sql_name(),
	}
}

/// `MODIFY <column> <type> [NOT NULL]` with the given nullability.
fn modify(d: &Dialect, table: &TableName, column: &DbAttribute, mandatory: bool) -> String {
	format!(
		"{}MODIFY {} {} {}",
		alter(d, table),
		d.quoting.quoted(&column.name),
		d.column_type(column),
		if mandatory { "NOT NULL" } else { "NULL" }
	)
}

fn set_not_null(d: &Dialect, table: &TableName, column: &DbAttribute) -> Statements {
	Ok(vec![modify(d, table, column, true)])
}

fn set_allow_null(d: &Dialect, table: &TableName, column: &DbAttribute) -> Statements {
	Ok(vec![modify(d, table, column, false)])
}

fn set_column_type(
	d: &Dialect,
	table: &TableName,
	current: &DbAttribute,
	wanted: &DbAttribute,
) -> Statements {
	Ok(vec![modify(d, table, wanted, current.mandatory)])
}

fn set_generated_flag(
	d: &Dialect,
	table: &TableName,
	column: &DbAttribute,
	generated: bool,
) -> Statements {
	let mut sql = modify(d, table, column, column.mandatory);
	if generated {
		sql.push(' ');
		sql.push_str(d.identity_clause);
	}
	Ok(vec![sql])
}

fn drop_relationship(d: &Dialect, table: &TableName, relationship: &DbRelationship) -> Statements {
	if !relationship.is_foreign_key() {
		return Ok(Vec::new());
	}
	let name = existing_fk_name(table, relationship)?;
	Ok(vec![format!(
		"{}DROP FOREIGN KEY {}",
		alter(d, table),
		d.quoting.quoted(name)
	)])
}

fn set_primary_key(
	d: &Dialect,
	table: &TableName,
	current: &[String],
	wanted: &[String],
	_constraint: Option<&str>,
) -> Statements {
	let mut statements = Vec::new();
	if !current.is_empty() {
		statements.push(format!("{}DROP PRIMARY KEY", alter(d, table)));
	}
	statements.extend(add_primary_key(d, table, wanted));
	Ok(statements)
}
