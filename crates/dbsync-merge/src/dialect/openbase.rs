//! OpenBase.
//!
//! Primary keys are declared by a separate `CREATE PRIMARY KEY` statement
//! after the table exists.

use super::ansi::{ANSI, ANSI_OPS, alter, table_elements};
use super::{DdlOperations, Dialect, DialectKind, Statements};
use crate::quoting::{QuotingStrategy, TableName};
use dbsync_map::{DbAttribute, DbEntity, JdbcType};

pub const OPENBASE: Dialect = Dialect {
	kind: DialectKind::OpenBase,
	name: "openbase",
	quoting: QuotingStrategy::new("\"", "\""),
	type_name,
	equivalent_types: &[
		(JdbcType::Boolean, JdbcType::Bit),
		(JdbcType::Blob, JdbcType::LongVarBinary),
		(JdbcType::Clob, JdbcType::LongVarChar),
	],
	supports_generated_keys: false,
	identity_clause: "",
	explicit_null: false,
	max_identifier_length: 32,
	true_literal: "1",
	false_literal: "0",
	ops: DdlOperations {
		create_table,
		set_not_null,
		set_allow_null,
		set_column_type,
		set_primary_key,
		..ANSI_OPS
	},
	..ANSI
};

fn type_name(t: JdbcType) -> &'static str {
	match t {
		JdbcType::Boolean => "BIT",
		JdbcType::LongVarChar | JdbcType::Clob | JdbcType::NClob | JdbcType::LongNVarChar => {
			"LONGVARCHAR"
		}
		JdbcType::LongVarBinary | JdbcType::Blob => "OBJECT",
		JdbcType::Timestamp => "DATETIME",
		other => other.sql_name(),
	}
}

fn create_primary_key(d: &Dialect, table: &TableName, keys: &[String]) -> Option<String> {
	if keys.is_empty() {
		return None;
	}
	Some(format!(
		"CREATE PRIMARY KEY {} ({})",
		d.quoting.quoted_table(table),
		d.quoting.quoted_list(keys.iter().map(String::as_str))
	))
}

fn create_table(d: &Dialect, entity: &DbEntity) -> Statements {
	let table = TableName::from(entity);
	let mut statements = vec![format!(
		"CREATE TABLE {} ({})",
		d.quoting.quoted_table(&table),
		table_elements(d, entity)?.join(", ")
	)];
	statements.extend(create_primary_key(d, &table, &entity.primary_key_names()));
	Ok(statements)
}

fn column_set(d: &Dialect, table: &TableName, column: &DbAttribute, what: &str) -> String {
	format!(
		"{}COLUMN {} SET {}",
		alter(d, table),
		d.quoting.quoted(&column.name),
		what
	)
}

fn set_not_null(d: &Dialect, table: &TableName, column: &DbAttribute) -> Statements {
	Ok(vec![column_set(d, table, column, "NOT NULL")])
}

fn set_allow_null(d: &Dialect, table: &TableName, column: &DbAttribute) -> Statements {
	Ok(vec![column_set(d, table, column, "NULL")])
}

fn set_column_type(
	d: &Dialect,
	table: &TableName,
	_current: &DbAttribute,
	wanted: &DbAttribute,
) -> Statements {
	Ok(vec![column_set(d, table, wanted, &format!("TYPE {}", d.column_type(wanted)))])
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
		statements.push(format!("DROP PRIMARY KEY {}", d.quoting.quoted_table(table)));
	}
	statements.extend(create_primary_key(d, table, wanted));
	Ok(statements)
}
