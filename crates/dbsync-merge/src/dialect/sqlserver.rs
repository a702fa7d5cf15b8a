//! Microsoft SQL Server.

use super::ansi::{ANSI, ANSI_OPS, alter};
use super::{DdlOperations, Dialect, DialectKind, Statements};
use crate::quoting::{QuotingStrategy, TableName};
use dbsync_map::{DbAttribute, JdbcType};

pub const SQLSERVER: Dialect = Dialect {
	kind: DialectKind::SqlServer,
	name: "sqlserver",
	quoting: QuotingStrategy::new("[", "]"),
	type_name,
	equivalent_types: &[
		(JdbcType::Boolean, JdbcType::Bit),
		(JdbcType::Blob, JdbcType::LongVarBinary),
		(JdbcType::Clob, JdbcType::LongVarChar),
		(JdbcType::NClob, JdbcType::LongNVarChar),
		(JdbcType::Double, JdbcType::Float),
	],
	identity_clause: "IDENTITY (1, 1)",
	true_literal: "1",
	false_literal: "0",
	ops: DdlOperations {
		add_column,
		set_not_null,
		set_allow_null,
		set_column_type,
		set_generated_flag,
		..ANSI_OPS
	},
	..ANSI
};

fn type_name(t: JdbcType) -> &'static str {
	match t {
		JdbcType::Boolean => "BIT",
		JdbcType::Double => "FLOAT",
		JdbcType::Timestamp => "DATETIME",
		JdbcType::LongVarChar | JdbcType::Clob => "TEXT",
		JdbcType::LongNVarChar | JdbcType::NClob => "NTEXT",
		JdbcType::LongVarBinary | JdbcType::Blob => "IMAGE",
		other => other.sql_name(),
	}
}

/// `ALTER COLUMN` restates the type and nullability together.
fn alter_column(d: &Dialect, table: &TableName, column: &DbAttribute, mandatory: bool) -> String {
	format!(
		"{}ALTER COLUMN {} {} {}",
		alter(d, table),
		d.quoting.quoted(&column.name),
		d.column_type(column),
		if mandatory { "NOT NULL" } else { "NULL" }
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

fn set_not_null(d: &Dialect, table: &TableName, column: &DbAttribute) -> Statements {
	Ok(vec![alter_column(d, table, column, true)])
}

fn set_allow_null(d: &Dialect, table: &TableName, column: &DbAttribute) -> Statements {
	Ok(vec![alter_column(d, table, column, false)])
}

fn set_column_type(
	d: &Dialect,
	table: &TableName,
	current: &DbAttribute,
	wanted: &DbAttribute,
) -> Statements {
	Ok(vec![alter_column(d, table, wanted, current.mandatory)])
}

fn set_generated_flag(
	d: &Dialect,
	table: &TableName,
	column: &DbAttribute,
	generated: bool,
) -> Statements {
	let action = if generated { "added to" } else { "removed from" };
	Err(d.unsupported(
		"change a generated column",
		format!(
			"IDENTITY cannot be {action} existing column {table}.{}; \
			 recreate the column manually",
			column.name
		),
	))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::MergeError;
	use rstest::rstest;

	#[rstest]
	fn test_nullability_restates_type() {
		let column = DbAttribute::new("NAME", JdbcType::NVarChar).max_length(50);
		let table = TableName::new("ARTIST");

		assert_eq!(
			(SQLSERVER.ops.set_not_null)(&SQLSERVER, &table, &column).unwrap(),
			vec!["ALTER TABLE ARTIST ALTER COLUMN NAME NVARCHAR(50) NOT NULL"]
		);
		assert_eq!(
			(SQLSERVER.ops.set_allow_null)(&SQLSERVER, &table, &column).unwrap(),
			vec!["ALTER TABLE ARTIST ALTER COLUMN NAME NVARCHAR(50) NULL"]
		);
	}

	#[rstest]
	fn test_add_column_without_keyword() {
		let dialect = SQLSERVER.with_quoting(true);
		let column = DbAttribute::new("PRICE", JdbcType::Decimal).max_length(10).scale(2);

		let sql = (dialect.ops.add_column)(&dialect, &TableName::new("PAINTING"), &column).unwrap();

		assert_eq!(sql, vec!["ALTER TABLE [PAINTING] ADD [PRICE] DECIMAL(10, 2)"]);
	}

	#[rstest]
	#[case(true)]
	#[case(false)]
	fn test_generated_flag_is_refused(#[case] generated: bool) {
		let id = DbAttribute::new("ID", JdbcType::Integer).primary_key();

		let err = (SQLSERVER.ops.set_generated_flag)(&SQLSERVER, &TableName::new("T"), &id, generated)
			.unwrap_err();

		assert!(matches!(err, MergeError::Unsupported { dialect: "sqlserver", .. }));
		assert!(err.to_string().contains("manually"));
	}
}
