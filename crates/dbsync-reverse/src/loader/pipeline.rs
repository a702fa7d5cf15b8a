//! Staged schema assembly.
//!
//! A [`PartialSchema`] moves through the load steps in a fixed order. Each
//! stage is a type parameter, so a step that needs columns or primary keys
//! can only be called on a schema that already has them.

use super::outcome::{LoadStep, ReadOutcome, Recovery, settle};
use super::relationships::RelationshipReconciler;
use crate::config::LoaderConfiguration;
use crate::delegate::DbLoaderDelegate;
use crate::error::Result;
use crate::exported_key::{ExportedKey, group_exported_keys};
use crate::metadata::{
	ColumnRow, MetadataSource, ProcedureColumnKind, ProcedureColumnRow, ProcedureKind, WILDCARD,
};
use crate::naming::ObjectNameGenerator;
use dbsync_map::{
	DbAttribute, DbEntity, JdbcType, ParameterDirection, Procedure, ProcedureParameter,
	TableIndex, TableType, qualified_name,
};
use indexmap::IndexMap;
use std::marker::PhantomData;
use tracing::{debug, info, warn};

/// Pipeline stages.
pub mod stage {
	#[derive(Debug)]
	pub struct Empty;
	#[derive(Debug)]
	pub struct EntitiesLoaded;
	#[derive(Debug)]
	pub struct AttributesLoaded;
	#[derive(Debug)]
	pub struct PrimaryKeysLoaded;
	#[derive(Debug)]
	pub struct RelationshipsLoaded;
	#[derive(Debug)]
	pub struct ProceduresLoaded;
}

use stage::*;

/// Collaborators shared by every step of one load.
pub struct LoadContext<'a> {
	pub source: &'a dyn MetadataSource,
	pub config: &'a LoaderConfiguration,
	pub delegate: &'a dyn DbLoaderDelegate,
	pub names: &'a dyn ObjectNameGenerator,
}

/// Schema under construction.
#[derive(Debug)]
pub struct PartialSchema<S> {
	tables: TableIndex,
	procedures: IndexMap<String, Procedure>,
	recoveries: Vec<Recovery>,
	_stage: PhantomData<S>,
}

fn scope_label(catalog: Option<&str>, schema: Option<&str>) -> String {
	qualified_name(catalog, schema, "*")
}

fn attribute_from_row(row: &ColumnRow) -> DbAttribute {
	let jdbc_type = JdbcType::from_code(row.data_type);
	let mut attribute = DbAttribute::new(row.name.clone(), jdbc_type)
		.mandatory(!row.nullable)
		.generated(row.auto_increment);
	if !row.type_name.is_empty() {
		attribute.vendor_type = Some(row.type_name.clone());
	}
	if jdbc_type.supports_length()
		&& let Some(size) = row.column_size.filter(|s| *s > 0)
	{
		attribute.max_length = Some(size as u32);
	}
	if let Some(digits) = row.decimal_digits.filter(|d| *d >= 0) {
		attribute.set_scale(Some(digits as u32));
	}
	attribute
}

fn parameter_from_row(row: &ProcedureColumnRow, name: String) -> ProcedureParameter {
	let jdbc_type = JdbcType::from_code(row.data_type);
	let mut parameter = ProcedureParameter::new(name, jdbc_type);
	parameter.direction = match row.kind {
		ProcedureColumnKind::In => Some(ParameterDirection::In),
		ProcedureColumnKind::InOut => Some(ParameterDirection::InOut),
		ProcedureColumnKind::Out => Some(ParameterDirection::Out),
		_ => None,
	};
	parameter.max_length = row.length.filter(|l| *l > 0).map(|l| l as u32);
	if jdbc_type.is_decimal() {
		parameter.scale = row.scale.filter(|s| *s >= 0).map(|s| s as u32);
	}
	parameter
}

impl<S> PartialSchema<S> {
	fn advance<N>(self) -> PartialSchema<N> {
		PartialSchema {
			tables: self.tables,
			procedures: self.procedures,
			recoveries: self.recoveries,
			_stage: PhantomData,
		}
	}

	pub fn tables(&self) -> &TableIndex {
		&self.tables
	}

	pub fn recoveries(&self) -> &[Recovery] {
		&self.recoveries
	}

	fn record(&mut self, recovery: Recovery) {
		self.recoveries.push(recovery);
	}
}

impl Default for PartialSchema<Empty> {
	fn default() -> Self {
		Self::new()
	}
}

impl PartialSchema<Empty> {
	pub fn new() -> Self {
		Self {
			tables: TableIndex::new(),
			procedures: IndexMap::new(),
			recoveries: Vec::new(),
			_stage: PhantomData,
		}
	}

	/// Read tables and views admitted by the table filters.
	pub async fn load_entities(mut self, ctx: &LoadContext<'_>) -> Result<PartialSchema<EntitiesLoaded>> {
		for (catalog, schema) in ctx.config.filters.schema_scopes() {
			let (catalog_name, schema_name) = (catalog.name.as_deref(), schema.name.as_deref());
			let scope = scope_label(catalog_name, schema_name);
			let read = ctx
				.source
				.tables(catalog_name, schema_name, WILDCARD, &ctx.config.table_types)
				.await;
			let rows = match settle(LoadStep::Entities, &scope, read)? {
				ReadOutcome::Complete(rows) => rows,
				ReadOutcome::Recovered(recovery) => {
					self.record(recovery);
					continue;
				}
			};

			for row in rows {
				if !schema.tables.is_included(&row.name) {
					debug!(table = %row.name, "Table excluded by filters");
					continue;
				}
				let mut entity = DbEntity::new(row.name);
				entity.catalog = row.catalog;
				entity.schema = row.schema;
				entity.table_type = TableType::parse(&row.table_type);
				let name = entity.name.clone();

				if let Some(displaced) = self.tables.insert(entity) {
					warn!(
						displaced = %displaced.fully_qualified_name(),
						table = %name,
						"Duplicate table name, replacing previously loaded table"
					);
					ctx.delegate.db_entity_removed(&displaced);
				}
				if let Some(added) = self.tables.get(&name) {
					ctx.delegate.db_entity_added(added);
				}
			}
		}

		info!(tables = self.tables.len(), "Tables loaded");
		Ok(self.advance())
	}
}

impl PartialSchema<EntitiesLoaded> {
	/// Read columns in bulk per schema, then per table for any table the bulk
	/// read left without columns.
	pub async fn load_attributes(mut self, ctx: &LoadContext<'_>) -> Result<PartialSchema<AttributesLoaded>> {
		for (catalog, schema) in ctx.config.filters.schema_scopes() {
			let (catalog_name, schema_name) = (catalog.name.as_deref(), schema.name.as_deref());
			let scope = scope_label(catalog_name, schema_name);
			let read = ctx.source.columns(catalog_name, schema_name, WILDCARD).await;
			match settle(LoadStep::Attributes, &scope, read)? {
				ReadOutcome::Complete(rows) => self.add_columns(ctx, rows),
				ReadOutcome::Recovered(recovery) => self.record(recovery),
			}
		}

		let empty: Vec<(Option<String>, Option<String>, String)> = self
			.tables
			.iter()
			.filter(|e| e.attribute_count() == 0)
			.map(|e| (e.catalog.clone(), e.schema.clone(), e.name.clone()))
			.collect();
		for (catalog, schema, name) in empty {
			info!(table = %name, "No columns from bulk read, loading table columns individually");
			let read = ctx
				.source
				.columns(catalog.as_deref(), schema.as_deref(), &name)
				.await;
			match settle(LoadStep::EntityAttributes, &name, read)? {
				ReadOutcome::Complete(rows) => {
					let rows = rows
						.into_iter()
						.filter(|r| r.table.eq_ignore_ascii_case(&name))
						.collect();
					self.add_columns(ctx, rows);
				}
				ReadOutcome::Recovered(recovery) => self.record(recovery),
			}
		}

		Ok(self.advance())
	}

	fn add_columns(&mut self, ctx: &LoadContext<'_>, rows: Vec<ColumnRow>) {
		for row in rows {
			let Some(entity) = self.tables.get_mut(&row.table) else {
				continue;
			};
			let included = ctx
				.config
				.filters
				.table_filter(entity.catalog.as_deref(), entity.schema.as_deref())
				.is_none_or(|f| f.is_column_included(&entity.name, &row.name));
			if !included {
				debug!(table = %entity.name, column = %row.name, "Column excluded by filters");
				continue;
			}
			entity.add_attribute(attribute_from_row(&row));
		}
	}
}

impl PartialSchema<AttributesLoaded> {
	/// Flag primary key columns, one read per table.
	pub async fn load_primary_keys(mut self, ctx: &LoadContext<'_>) -> Result<PartialSchema<PrimaryKeysLoaded>> {
		if ctx.config.skip_primary_keys_loading {
			return Ok(self.advance());
		}

		for name in self.tables.names() {
			let Some(entity) = self.tables.get(&name) else {
				continue;
			};
			let (catalog, schema) = (entity.catalog.clone(), entity.schema.clone());
			let read = ctx
				.source
				.primary_keys(catalog.as_deref(), schema.as_deref(), &name)
				.await;
			let rows = match settle(LoadStep::PrimaryKeys, &name, read)? {
				ReadOutcome::Complete(rows) => rows,
				ReadOutcome::Recovered(recovery) => {
					self.record(recovery);
					continue;
				}
			};

			let Some(entity) = self.tables.get_mut(&name) else {
				continue;
			};
			for row in rows {
				match entity.find_attribute_mut(&row.column) {
					Some(attribute) => attribute.primary_key = true,
					None => {
						info!(table = %name, column = %row.column, "Primary key column not loaded, skipping");
						continue;
					}
				}
				if row.pk_name.is_some() {
					entity.primary_key_name = row.pk_name;
				}
			}
		}

		Ok(self.advance())
	}
}

impl PartialSchema<PrimaryKeysLoaded> {
	/// Read exported keys for every table and reconcile them into
	/// relationships.
	pub async fn load_relationships(mut self, ctx: &LoadContext<'_>) -> Result<PartialSchema<RelationshipsLoaded>> {
		if ctx.config.skip_relationships_loading {
			return Ok(self.advance());
		}

		let mut keys: Vec<ExportedKey> = Vec::new();
		for name in self.tables.names() {
			let Some(entity) = self.tables.get(&name) else {
				continue;
			};
			if !ctx.delegate.db_relationship(entity) {
				continue;
			}
			let (catalog, schema) = (entity.catalog.clone(), entity.schema.clone());
			let read = ctx
				.source
				.exported_keys(catalog.as_deref(), schema.as_deref(), &name)
				.await;
			let rows = match settle(LoadStep::ExportedKeys, &name, read)? {
				ReadOutcome::Complete(rows) => rows,
				ReadOutcome::Recovered(recovery) => {
					self.record(recovery);
					continue;
				}
			};

			for row in rows {
				let Some(fk_entity) = self.tables.get(&row.fk_table) else {
					debug!(table = %row.fk_table, "Referencing table not loaded, skipping key");
					continue;
				};
				let included = ctx
					.config
					.filters
					.table_filter(fk_entity.catalog.as_deref(), fk_entity.schema.as_deref())
					.is_some_and(|f| f.is_included(&fk_entity.name));
				if !included {
					debug!(table = %row.fk_table, "Referencing table excluded by filters");
					continue;
				}
				keys.push(ExportedKey::from_row(row));
			}
		}

		let groups = group_exported_keys(keys);
		let reconciler = RelationshipReconciler::new(&ctx.config.filters, ctx.delegate, ctx.names);
		let attached = reconciler.reconcile(&mut self.tables, &groups);
		info!(constraints = groups.len(), relationships = attached, "Relationships loaded");

		Ok(self.advance())
	}
}

impl PartialSchema<RelationshipsLoaded> {
	/// Read procedures and their parameters for schemas whose procedure
	/// filter admits anything.
	pub async fn load_procedures(mut self, ctx: &LoadContext<'_>) -> Result<PartialSchema<ProceduresLoaded>> {
		for (catalog, schema) in ctx.config.filters.schema_scopes() {
			let filter = &schema.procedures;
			if filter.is_include_nothing() {
				continue;
			}
			let (catalog_name, schema_name) = (catalog.name.as_deref(), schema.name.as_deref());
			let scope = scope_label(catalog_name, schema_name);
			let read = ctx.source.procedures(catalog_name, schema_name, WILDCARD).await;
			let rows = match settle(LoadStep::Procedures, &scope, read)? {
				ReadOutcome::Complete(rows) => rows,
				ReadOutcome::Recovered(recovery) => {
					self.record(recovery);
					continue;
				}
			};

			for row in rows {
				if !filter.is_included(&row.name) {
					debug!(procedure = %row.name, "Procedure excluded by filters");
					continue;
				}
				let mut procedure = Procedure::new(row.name);
				procedure.catalog = row.catalog;
				procedure.schema = row.schema;
				procedure.returning_value = row.kind == ProcedureKind::ReturnsResult;
				self.procedures
					.insert(procedure.fully_qualified_name(), procedure);
			}

			let read = ctx
				.source
				.procedure_columns(catalog_name, schema_name, WILDCARD)
				.await;
			let rows = match settle(LoadStep::ProcedureColumns, &scope, read)? {
				ReadOutcome::Complete(rows) => rows,
				ReadOutcome::Recovered(recovery) => {
					self.record(recovery);
					continue;
				}
			};
			for row in rows {
				self.add_procedure_column(row);
			}
		}

		if !self.procedures.is_empty() {
			info!(procedures = self.procedures.len(), "Procedures loaded");
		}
		Ok(self.advance())
	}

	fn add_procedure_column(&mut self, row: ProcedureColumnRow) {
		let key = qualified_name(row.catalog.as_deref(), row.schema.as_deref(), &row.procedure);
		let Some(procedure) = self.procedures.get_mut(&key) else {
			return;
		};
		if row.kind == ProcedureColumnKind::Result {
			debug!(procedure = %key, "Skipping result set column");
			return;
		}
		let name = match (&row.name, row.kind) {
			(Some(name), _) => name.clone(),
			(None, ProcedureColumnKind::Return) => {
				procedure.returning_value = true;
				"_return_value".to_string()
			}
			(None, _) => {
				info!(procedure = %key, "Skipping unnamed procedure parameter");
				return;
			}
		};
		procedure.add_parameter(parameter_from_row(&row, name));
	}
}

impl PartialSchema<ProceduresLoaded> {
	pub fn into_parts(self) -> (TableIndex, Vec<Procedure>, Vec<Recovery>) {
		(
			self.tables,
			self.procedures.into_values().collect(),
			self.recoveries,
		)
	}
}
