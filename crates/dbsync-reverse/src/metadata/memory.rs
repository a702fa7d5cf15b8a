//! In-memory metadata source

use super::{
	ColumnRow, ExportedKeyRow, MetadataSource, PrimaryKeyRow, ProcedureColumnRow, ProcedureRow,
	TableRow, WILDCARD, like_matches,
};
use crate::error::MetadataError;
use async_trait::async_trait;
use parking_lot::Mutex;

/// Metadata queries a [`MetadataSource`] answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetadataOperation {
	Catalogs,
	Schemas,
	Tables,
	Columns,
	PrimaryKeys,
	ExportedKeys,
	Procedures,
	ProcedureColumns,
}

#[derive(Debug, Clone, Copy)]
enum FailureKind {
	Query,
	Unsupported,
	Connection,
}

#[derive(Debug)]
struct Failure {
	operation: MetadataOperation,
	target: Option<String>,
	kind: FailureKind,
}

/// A [`MetadataSource`] serving canned rows.
///
/// Failures can be injected per operation, optionally restricted to one
/// table or pattern argument, to exercise the loader's recovery paths.
#[derive(Debug, Default)]
pub struct StaticMetadata {
	catalogs: Vec<String>,
	schemas: Vec<String>,
	tables: Vec<TableRow>,
	columns: Vec<ColumnRow>,
	primary_keys: Vec<PrimaryKeyRow>,
	exported_keys: Vec<ExportedKeyRow>,
	procedures: Vec<ProcedureRow>,
	procedure_columns: Vec<ProcedureColumnRow>,
	hidden_from_bulk: Vec<String>,
	failures: Vec<Failure>,
	calls: Mutex<Vec<String>>,
}

fn in_scope(filter: Option<&str>, actual: &Option<String>) -> bool {
	match (filter, actual) {
		(None, _) => true,
		(Some(f), Some(a)) => f.eq_ignore_ascii_case(a),
		(Some(_), None) => false,
	}
}

impl StaticMetadata {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn catalog(mut self, name: impl Into<String>) -> Self {
		self.catalogs.push(name.into());
		self
	}

	pub fn schema(mut self, name: impl Into<String>) -> Self {
		self.schemas.push(name.into());
		self
	}

	pub fn table(mut self, row: TableRow) -> Self {
		self.tables.push(row);
		self
	}

	pub fn column(mut self, row: ColumnRow) -> Self {
		self.columns.push(row);
		self
	}

	/// Append `column` to the primary key of `table`.
	pub fn primary_key(mut self, table: &str, column: &str) -> Self {
		let key_seq = self
			.primary_keys
			.iter()
			.filter(|pk| pk.table == table)
			.count() as i16
			+ 1;
		let table_row = self.tables.iter().find(|t| t.name == table);
		self.primary_keys.push(PrimaryKeyRow {
			catalog: table_row.and_then(|t| t.catalog.clone()),
			schema: table_row.and_then(|t| t.schema.clone()),
			table: table.to_string(),
			column: column.to_string(),
			key_seq,
			pk_name: None,
		});
		self
	}

	pub fn exported_key(mut self, row: ExportedKeyRow) -> Self {
		self.exported_keys.push(row);
		self
	}

	pub fn procedure(mut self, row: ProcedureRow) -> Self {
		self.procedures.push(row);
		self
	}

	pub fn procedure_column(mut self, row: ProcedureColumnRow) -> Self {
		self.procedure_columns.push(row);
		self
	}

	/// Leave `table` out of wildcard column reads, as some drivers do.
	pub fn hide_from_bulk_columns(mut self, table: impl Into<String>) -> Self {
		self.hidden_from_bulk.push(table.into());
		self
	}

	/// Fail `operation` with a query error. `target` restricts the failure to
	/// calls whose table or pattern argument equals it.
	pub fn fail(self, operation: MetadataOperation, target: Option<&str>) -> Self {
		self.push_failure(operation, target, FailureKind::Query)
	}

	pub fn fail_unsupported(self, operation: MetadataOperation, target: Option<&str>) -> Self {
		self.push_failure(operation, target, FailureKind::Unsupported)
	}

	pub fn fail_connection(self, operation: MetadataOperation) -> Self {
		self.push_failure(operation, None, FailureKind::Connection)
	}

	fn push_failure(
		mut self,
		operation: MetadataOperation,
		target: Option<&str>,
		kind: FailureKind,
	) -> Self {
		self.failures.push(Failure {
			operation,
			target: target.map(str::to_string),
			kind,
		});
		self
	}

	/// Calls received so far, as `Operation(argument)`.
	pub fn calls(&self) -> Vec<String> {
		self.calls.lock().clone()
	}

	fn enter(&self, operation: MetadataOperation, argument: &str) -> Result<(), MetadataError> {
		self.calls.lock().push(format!("{:?}({})", operation, argument));

		let failure = self.failures.iter().find(|f| {
			f.operation == operation && f.target.as_deref().is_none_or(|t| t == argument)
		});
		match failure.map(|f| f.kind) {
			None => Ok(()),
			Some(FailureKind::Query) => Err(MetadataError::query(
				format!("{:?}", operation),
				format!("injected failure for {}", argument),
			)),
			Some(FailureKind::Unsupported) => Err(MetadataError::unsupported(
				format!("{:?}", operation),
				"not implemented by this driver",
			)),
			Some(FailureKind::Connection) => Err(MetadataError::Connection(
				"connection reset by peer".to_string(),
			)),
		}
	}
}

#[async_trait]
impl MetadataSource for StaticMetadata {
	async fn catalogs(&self) -> Result<Vec<String>, MetadataError> {
		self.enter(MetadataOperation::Catalogs, "")?;
		Ok(self.catalogs.clone())
	}

	async fn schemas(&self) -> Result<Vec<String>, MetadataError> {
		self.enter(MetadataOperation::Schemas, "")?;
		Ok(self.schemas.clone())
	}

	async fn tables(
		&self,
		catalog: Option<&str>,
		schema: Option<&str>,
		table_pattern: &str,
		types: &[String],
	) -> Result<Vec<TableRow>, MetadataError> {
		self.enter(MetadataOperation::Tables, table_pattern)?;
		Ok(self
			.tables
			.iter()
			.filter(|t| in_scope(catalog, &t.catalog) && in_scope(schema, &t.schema))
			.filter(|t| like_matches(table_pattern, &t.name))
			.filter(|t| types.is_empty() || types.iter().any(|ty| ty.eq_ignore_ascii_case(&t.table_type)))
			.cloned()
			.collect())
	}

	async fn columns(
		&self,
		catalog: Option<&str>,
		schema: Option<&str>,
		table_pattern: &str,
	) -> Result<Vec<ColumnRow>, MetadataError> {
		self.enter(MetadataOperation::Columns, table_pattern)?;
		let bulk = table_pattern == WILDCARD;
		Ok(self
			.columns
			.iter()
			.filter(|c| in_scope(catalog, &c.catalog) && in_scope(schema, &c.schema))
			.filter(|c| like_matches(table_pattern, &c.table))
			.filter(|c| !(bulk && self.hidden_from_bulk.contains(&c.table)))
			.cloned()
			.collect())
	}

	async fn primary_keys(
		&self,
		catalog: Option<&str>,
		schema: Option<&str>,
		table: &str,
	) -> Result<Vec<PrimaryKeyRow>, MetadataError> {
		self.enter(MetadataOperation::PrimaryKeys, table)?;
		Ok(self
			.primary_keys
			.iter()
			.filter(|pk| in_scope(catalog, &pk.catalog) && in_scope(schema, &pk.schema))
			.filter(|pk| pk.table.eq_ignore_ascii_case(table))
			.cloned()
			.collect())
	}

	async fn exported_keys(
		&self,
		catalog: Option<&str>,
		schema: Option<&str>,
		table: &str,
	) -> Result<Vec<ExportedKeyRow>, MetadataError> {
		self.enter(MetadataOperation::ExportedKeys, table)?;
		Ok(self
			.exported_keys
			.iter()
			.filter(|k| in_scope(catalog, &k.pk_catalog) && in_scope(schema, &k.pk_schema))
			.filter(|k| k.pk_table.eq_ignore_ascii_case(table))
			.cloned()
			.collect())
	}

	async fn procedures(
		&self,
		catalog: Option<&str>,
		schema: Option<&str>,
		procedure_pattern: &str,
	) -> Result<Vec<ProcedureRow>, MetadataError> {
		self.enter(MetadataOperation::Procedures, procedure_pattern)?;
		Ok(self
			.procedures
			.iter()
			.filter(|p| in_scope(catalog, &p.catalog) && in_scope(schema, &p.schema))
			.filter(|p| like_matches(procedure_pattern, &p.name))
			.cloned()
			.collect())
	}

	async fn procedure_columns(
		&self,
		catalog: Option<&str>,
		schema: Option<&str>,
		procedure_pattern: &str,
	) -> Result<Vec<ProcedureColumnRow>, MetadataError> {
		self.enter(MetadataOperation::ProcedureColumns, procedure_pattern)?;
		Ok(self
			.procedure_columns
			.iter()
			.filter(|p| in_scope(catalog, &p.catalog) && in_scope(schema, &p.schema))
			.filter(|p| like_matches(procedure_pattern, &p.procedure))
			.cloned()
			.collect())
	}
}
