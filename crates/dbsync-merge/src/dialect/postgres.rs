//! PostgreSQL.

use super::ansi::{ANSI, ANSI_OPS, alter};
use super::{DdlOperations, Dialect, DialectKind, PkGenerator, Statements};
use crate::quoting::{QuotingStrategy, TableName};
use dbsync_map::{DbAttribute, DbEntity, JdbcType};

pub const POSTGRES: Dialect = Dialect {
	kind: DialectKind::Postgres,
	name: "postgres",
	quoting: QuotingStrategy::new("\"", "\""),
	type_name,
	equivalent_types: &[
		(JdbcType::Boolean, JdbcType::Bit),
		(JdbcType::Blob, JdbcType::Binary),
		(JdbcType::Blob, JdbcType::LongVarBinary),
		(JdbcType::Clob, JdbcType::LongVarChar),
	],
	max_identifier_length: 63,
	pk_generator: PkGenerator::Sequence {
		create: "CREATE SEQUENCE {name} INCREMENT 20 START 200",
		drop: "DROP SEQUENCE {name}",
	},
	ops: DdlOperations {
		drop_table,
		set_column_type,
		..ANSI_OPS
	},
	..ANSI
};

fn type_name(t: JdbcType) -> &'static str {
	match t {
		JdbcType::Bit | JdbcType::Boolean => "BOOLEAN",
		JdbcType::TinyInt => "SMALLINT",
		JdbcType::Double => "DOUBLE PRECISION",
		JdbcType::LongVarChar | JdbcType::Clob | JdbcType::LongNVarChar | JdbcType::NClob => "TEXT",
		JdbcType::NChar => "CHAR",
		JdbcType::NVarChar => "VARCHAR",
		JdbcType::Binary | JdbcType::VarBinary | JdbcType::LongVarBinary | JdbcType::Blob => {
			"BYTEA"
		}
		other => other.sql_name(),
	}
}

fn drop_table(d: &Dialect, entity: &DbEntity) -> Statements {
	let mut statements = vec![format!(
		"DROP TABLE {} CASCADE",
		d.quoting.quoted_table(&TableName::from(entity))
	)];
	statements.extend(d.pk_generator.drop_statements(d, entity));
	Ok(statements)
}

fn set_column_type(
	d: &Dialect,
	table: &TableName,
	_current: &DbAttribute,
	wanted: &DbAttribute,
) -> Statements {
	Ok(vec![format!(
		"{}ALTER COLUMN {} TYPE {}",
		alter(d, table),
		d.quoting.quoted(&wanted.name),
		d.column_type(wanted)
	)])
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_create_table_with_sequence() {
		let entity = DbEntity::new("ARTIST")
			.attribute(DbAttribute::new("ARTIST_ID", JdbcType::BigInt).primary_key())
			.attribute(DbAttribute::new("BIO", JdbcType::Clob));

		let sql = (POSTGRES.ops.create_table)(&POSTGRES, &entity).unwrap();

		assert_eq!(
			sql,
			vec![
				"CREATE TABLE ARTIST (ARTIST_ID BIGINT NOT NULL, BIO TEXT NULL, PRIMARY KEY (ARTIST_ID))",
				"CREATE SEQUENCE pk_artist INCREMENT 20 START 200",
			]
		);
	}

	#[rstest]
	fn test_set_column_type() {
		let current = DbAttribute::new("NAME", JdbcType::VarChar).max_length(40);
		let wanted = DbAttribute::new("NAME", JdbcType::Clob);

		let sql = (POSTGRES.ops.set_column_type)(&POSTGRES, &TableName::new("ARTIST"), &current, &wanted)
			.unwrap();

		assert_eq!(sql, vec!["ALTER TABLE ARTIST ALTER COLUMN NAME TYPE TEXT"]);
	}
}
