//! SQLite metadata reader
//!
//! Reads `sqlite_master` and the `pragma_table_info` /
//! `pragma_foreign_key_list` table-valued functions. SQLite has neither
//! catalogs, schemas nor stored procedures, and foreign keys carry no
//! constraint names.

use super::{
	ColumnRow, ExportedKeyRow, MetadataSource, PrimaryKeyRow, ProcedureColumnRow, ProcedureRow,
	TableRow,
};
use crate::error::MetadataError;
use async_trait::async_trait;
use dbsync_map::JdbcType;
use sqlx::{Row, SqlitePool};

const TABLES_QUERY: &str = "SELECT name, type, sql FROM sqlite_master \
	WHERE type IN ('table', 'view') AND name NOT LIKE 'sqlite\\_%' ESCAPE '\\' AND name LIKE ?1 \
	ORDER BY name";

/// [`MetadataSource`] over a SQLite connection pool.
#[derive(Debug, Clone)]
pub struct SqliteMetadata {
	pool: SqlitePool,
}

struct MasterEntry {
	name: String,
	kind: String,
	sql: Option<String>,
}

struct PragmaColumn {
	name: String,
	declared_type: String,
	not_null: bool,
	pk: i64,
}

impl SqliteMetadata {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	pub fn pool(&self) -> &SqlitePool {
		&self.pool
	}

	async fn master_entries(&self, pattern: &str) -> Result<Vec<MasterEntry>, MetadataError> {
		let rows = sqlx::query(TABLES_QUERY)
			.bind(pattern)
			.fetch_all(&self.pool)
			.await?;

		rows.iter()
			.map(|row| -> Result<MasterEntry, MetadataError> {
				Ok(MasterEntry {
					name: row.try_get("name")?,
					kind: row.try_get("type")?,
					sql: row.try_get("sql")?,
				})
			})
			.collect()
	}

	async fn table_info(&self, table: &str) -> Result<Vec<PragmaColumn>, MetadataError> {
		let rows = sqlx::query(
			"SELECT name, type, \"notnull\" AS not_null, pk FROM pragma_table_info(?1) ORDER BY cid",
		)
		.bind(table)
		.fetch_all(&self.pool)
		.await?;

		rows.iter()
			.map(|row| -> Result<PragmaColumn, MetadataError> {
				Ok(PragmaColumn {
					name: row.try_get("name")?,
					declared_type: row.try_get("type")?,
					not_null: row.try_get::<i64, _>("not_null")? != 0,
					pk: row.try_get("pk")?,
				})
			})
			.collect()
	}
}

/// Map a declared column type to a JDBC type plus size and scale.
fn parse_declared_type(declared: &str) -> (JdbcType, Option<i32>, Option<i32>) {
	let upper = declared.trim().to_ascii_uppercase();
	let (base, args) = match upper.split_once('(') {
		Some((base, rest)) => (base.trim().to_string(), rest.trim_end_matches(')').to_string()),
		None => (upper.clone(), String::new()),
	};
	let mut numbers = args.split(',').filter_map(|n| n.trim().parse::<i32>().ok());
	let size = numbers.next();
	let scale = numbers.next();

	let jdbc_type = match base.as_str() {
		"INT" | "INTEGER" | "MEDIUMINT" => JdbcType::Integer,
		"BIGINT" => JdbcType::BigInt,
		"SMALLINT" => JdbcType::SmallInt,
		"TINYINT" => JdbcType::TinyInt,
		"BOOLEAN" | "BOOL" => JdbcType::Boolean,
		"BIT" => JdbcType::Bit,
		"CHAR" | "CHARACTER" => JdbcType::Char,
		"NCHAR" => JdbcType::NChar,
		"VARCHAR" | "CHARACTER VARYING" | "VARYING CHARACTER" => JdbcType::VarChar,
		"NVARCHAR" | "NATIVE CHARACTER" => JdbcType::NVarChar,
		"TEXT" | "LONGVARCHAR" => JdbcType::LongVarChar,
		"CLOB" => JdbcType::Clob,
		"REAL" => JdbcType::Real,
		"FLOAT" => JdbcType::Float,
		"DOUBLE" | "DOUBLE PRECISION" => JdbcType::Double,
		"NUMERIC" => JdbcType::Numeric,
		"DECIMAL" => JdbcType::Decimal,
		"DATE" => JdbcType::Date,
		"TIME" => JdbcType::Time,
		"TIMESTAMP" | "DATETIME" => JdbcType::Timestamp,
		"BLOB" => JdbcType::Blob,
		"BINARY" => JdbcType::Binary,
		"VARBINARY" => JdbcType::VarBinary,
		"LONGVARBINARY" => JdbcType::LongVarBinary,
		"" => JdbcType::Other,
		// Type affinity rules for everything else
		other if other.contains("INT") => JdbcType::Integer,
		other if other.contains("CHAR") || other.contains("CLOB") || other.contains("TEXT") => {
			JdbcType::VarChar
		}
		other if other.contains("BLOB") => JdbcType::Blob,
		other if other.contains("REAL") || other.contains("FLOA") || other.contains("DOUB") => {
			JdbcType::Double
		}
		_ => JdbcType::Numeric,
	};
	(jdbc_type, size, scale)
}

fn delete_rule_code(action: &str) -> i16 {
	match action.to_ascii_uppercase().as_str() {
		"CASCADE" => 0,
		"RESTRICT" => 1,
		"SET NULL" => 2,
		"SET DEFAULT" => 4,
		_ => 3,
	}
}

#[async_trait]
impl MetadataSource for SqliteMetadata {
	async fn catalogs(&self) -> Result<Vec<String>, MetadataError> {
		Ok(Vec::new())
	}

	async fn schemas(&self) -> Result<Vec<String>, MetadataError> {
		Ok(Vec::new())
	}

	async fn tables(
		&self,
		_catalog: Option<&str>,
		_schema: Option<&str>,
		table_pattern: &str,
		types: &[String],
	) -> Result<Vec<TableRow>, MetadataError> {
		let entries = self.master_entries(table_pattern).await?;
		Ok(entries
			.into_iter()
			.map(|e| TableRow {
				catalog: None,
				schema: None,
				name: e.name,
				table_type: e.kind.to_ascii_uppercase(),
			})
			.filter(|t| types.is_empty() || types.iter().any(|ty| ty.eq_ignore_ascii_case(&t.table_type)))
			.collect())
	}

	async fn columns(
		&self,
		_catalog: Option<&str>,
		_schema: Option<&str>,
		table_pattern: &str,
	) -> Result<Vec<ColumnRow>, MetadataError> {
		let mut result = Vec::new();
		for entry in self.master_entries(table_pattern).await? {
			let columns = self.table_info(&entry.name).await?;
			let pk_count = columns.iter().filter(|c| c.pk > 0).count();
			let autoincrement = entry
				.sql
				.as_deref()
				.is_some_and(|sql| sql.to_ascii_uppercase().contains("AUTOINCREMENT"));

			for column in columns {
				let (jdbc_type, column_size, decimal_digits) =
					parse_declared_type(&column.declared_type);
				let rowid_alias = column.pk > 0
					&& pk_count == 1
					&& column.declared_type.eq_ignore_ascii_case("INTEGER");
				result.push(ColumnRow {
					catalog: None,
					schema: None,
					table: entry.name.clone(),
					name: column.name,
					data_type: jdbc_type.code(),
					type_name: column.declared_type,
					column_size,
					decimal_digits,
					// A rowid alias never holds NULL whatever the pragma says
					nullable: !column.not_null && !rowid_alias,
					auto_increment: rowid_alias && autoincrement,
				});
			}
		}
		Ok(result)
	}

	async fn primary_keys(
		&self,
		_catalog: Option<&str>,
		_schema: Option<&str>,
		table: &str,
	) -> Result<Vec<PrimaryKeyRow>, MetadataError> {
		let mut columns = self.table_info(table).await?;
		columns.retain(|c| c.pk > 0);
		columns.sort_by_key(|c| c.pk);

		Ok(columns
			.into_iter()
			.map(|c| PrimaryKeyRow {
				catalog: None,
				schema: None,
				table: table.to_string(),
				column: c.name,
				key_seq: c.pk as i16,
				pk_name: None,
			})
			.collect())
	}

	async fn exported_keys(
		&self,
		_catalog: Option<&str>,
		_schema: Option<&str>,
		table: &str,
	) -> Result<Vec<ExportedKeyRow>, MetadataError> {
		let entries = self.master_entries("%").await?;
		let Some(pk_table) = entries
			.iter()
			.find(|e| e.name.eq_ignore_ascii_case(table))
			.map(|e| e.name.clone())
		else {
			return Ok(Vec::new());
		};
		let mut pk_columns: Vec<PragmaColumn> = self.table_info(&pk_table).await?;
		pk_columns.retain(|c| c.pk > 0);
		pk_columns.sort_by_key(|c| c.pk);

		let mut result = Vec::new();
		for entry in entries.iter().filter(|e| e.kind == "table") {
			let rows = sqlx::query(
				"SELECT id, seq, \"table\" AS ref_table, \"from\" AS from_col, \"to\" AS to_col, on_delete \
				 FROM pragma_foreign_key_list(?1) ORDER BY id, seq",
			)
			.bind(&entry.name)
			.fetch_all(&self.pool)
			.await?;

			for row in rows {
				let ref_table: String = row.try_get("ref_table")?;
				if !ref_table.eq_ignore_ascii_case(&pk_table) {
					continue;
				}
				let seq: i64 = row.try_get("seq")?;
				let to_col: Option<String> = row.try_get("to_col")?;
				// An omitted column list references the primary key
				let Some(pk_column) =
					to_col.or_else(|| pk_columns.get(seq as usize).map(|c| c.name.clone()))
				else {
					continue;
				};
				let on_delete: String = row.try_get("on_delete")?;

				let mut key = ExportedKeyRow::new(
					pk_table.clone(),
					pk_column,
					entry.name.clone(),
					row.try_get::<String, _>("from_col")?,
					seq as i16 + 1,
				);
				key.delete_rule = delete_rule_code(&on_delete);
				result.push(key);
			}
		}
		Ok(result)
	}

	async fn procedures(
		&self,
		_catalog: Option<&str>,
		_schema: Option<&str>,
		_procedure_pattern: &str,
	) -> Result<Vec<ProcedureRow>, MetadataError> {
		Ok(Vec::new())
	}

	async fn procedure_columns(
		&self,
		_catalog: Option<&str>,
		_schema: Option<&str>,
		_procedure_pattern: &str,
	) -> Result<Vec<ProcedureColumnRow>, MetadataError> {
		Ok(Vec::new())
	}
}
