//! Name filters applied while reading a database.
//!
//! Filters nest the way database objects do: a [`FiltersConfig`] holds
//! catalog filters, each catalog holds schema filters, and each schema
//! carries a [`TableFilter`] plus a procedure [`PatternFilter`]. A filter with
//! no name matches any catalog or schema.
//!
//! Patterns are regular expressions matched against the whole object name,
//! ignoring case.

use crate::error::ConfigError;
use regex::{Regex, RegexBuilder};

fn compile(pattern: &str) -> Result<Regex, ConfigError> {
	RegexBuilder::new(&format!("^(?:{})$", pattern))
		.case_insensitive(true)
		.build()
		.map_err(|_| ConfigError::InvalidPattern {
			pattern: pattern.to_string(),
		})
}

fn compile_all(patterns: &[String]) -> Result<Vec<Regex>, ConfigError> {
	patterns.iter().map(|p| compile(p)).collect()
}

/// Include/exclude pattern lists. Excludes win over includes; an empty
/// include list admits everything not excluded.
#[derive(Debug, Clone, Default)]
pub struct PatternFilter {
	includes: Vec<Regex>,
	excludes: Vec<Regex>,
	nothing: bool,
}

impl PatternFilter {
	pub fn include_everything() -> Self {
		Self::default()
	}

	pub fn include_nothing() -> Self {
		Self {
			nothing: true,
			..Self::default()
		}
	}

	pub fn new(includes: &[String], excludes: &[String]) -> Result<Self, ConfigError> {
		Ok(Self {
			includes: compile_all(includes)?,
			excludes: compile_all(excludes)?,
			nothing: false,
		})
	}

	pub fn is_included(&self, name: &str) -> bool {
		if self.nothing || self.excludes.iter().any(|re| re.is_match(name)) {
			return false;
		}
		self.includes.is_empty() || self.includes.iter().any(|re| re.is_match(name))
	}

	/// True for a filter built with [`include_nothing`](Self::include_nothing).
	pub fn is_include_nothing(&self) -> bool {
		self.nothing
	}
}

/// One table include rule with the column and relationship filters that
/// apply to the tables it admits.
#[derive(Debug, Clone, Default)]
pub struct IncludeTableFilter {
	pattern: Option<Regex>,
	pub columns: PatternFilter,
	pub relationships: PatternFilter,
}

impl IncludeTableFilter {
	/// Admits every table, every column and every relationship.
	pub fn all() -> Self {
		Self::default()
	}

	pub fn new(
		pattern: Option<&str>,
		columns: PatternFilter,
		relationships: PatternFilter,
	) -> Result<Self, ConfigError> {
		Ok(Self {
			pattern: pattern.map(compile).transpose()?,
			columns,
			relationships,
		})
	}

	fn matches(&self, table: &str) -> bool {
		self.pattern.as_ref().is_none_or(|re| re.is_match(table))
	}
}

#[derive(Debug, Clone, Default)]
pub struct TableFilter {
	includes: Vec<IncludeTableFilter>,
	excludes: Vec<Regex>,
}

impl TableFilter {
	pub fn everything() -> Self {
		Self {
			includes: vec![IncludeTableFilter::all()],
			excludes: Vec::new(),
		}
	}

	pub fn new(includes: Vec<IncludeTableFilter>, excludes: &[String]) -> Result<Self, ConfigError> {
		Ok(Self {
			includes,
			excludes: compile_all(excludes)?,
		})
	}

	/// The first include rule admitting `table`, unless an exclude matches.
	pub fn include_table(&self, table: &str) -> Option<&IncludeTableFilter> {
		if self.excludes.iter().any(|re| re.is_match(table)) {
			return None;
		}
		self.includes.iter().find(|f| f.matches(table))
	}

	pub fn is_included(&self, table: &str) -> bool {
		self.include_table(table).is_some()
	}

	pub fn is_column_included(&self, table: &str, column: &str) -> bool {
		self.include_table(table)
			.is_some_and(|f| f.columns.is_included(column))
	}

	pub fn is_relationship_included(&self, table: &str, relationship: &str) -> bool {
		self.include_table(table)
			.is_some_and(|f| f.relationships.is_included(relationship))
	}
}

#[derive(Debug, Clone)]
pub struct SchemaFilter {
	pub name: Option<String>,
	pub tables: TableFilter,
	pub procedures: PatternFilter,
}

impl SchemaFilter {
	pub fn new(name: Option<String>, tables: TableFilter, procedures: PatternFilter) -> Self {
		Self {
			name,
			tables,
			procedures,
		}
	}
}

#[derive(Debug, Clone)]
pub struct CatalogFilter {
	pub name: Option<String>,
	pub schemas: Vec<SchemaFilter>,
}

impl CatalogFilter {
	pub fn new(name: Option<String>, schemas: Vec<SchemaFilter>) -> Self {
		Self { name, schemas }
	}
}

fn name_matches(filter: Option<&str>, actual: Option<&str>) -> bool {
	match (filter, actual) {
		(None, _) => true,
		(Some(f), Some(a)) => f.eq_ignore_ascii_case(a),
		(Some(_), None) => false,
	}
}

/// Complete filter tree for one load.
#[derive(Debug, Clone)]
pub struct FiltersConfig {
	catalogs: Vec<CatalogFilter>,
}

impl Default for FiltersConfig {
	/// Every table of every schema; no procedures.
	fn default() -> Self {
		Self::new(vec![CatalogFilter::new(
			None,
			vec![SchemaFilter::new(
				None,
				TableFilter::everything(),
				PatternFilter::include_nothing(),
			)],
		)])
	}
}

impl FiltersConfig {
	pub fn new(catalogs: Vec<CatalogFilter>) -> Self {
		Self { catalogs }
	}

	pub fn catalogs(&self) -> &[CatalogFilter] {
		&self.catalogs
	}

	/// Every (catalog filter, schema filter) pair, in declaration order.
	pub fn schema_scopes(&self) -> impl Iterator<Item = (&CatalogFilter, &SchemaFilter)> {
		self.catalogs
			.iter()
			.flat_map(|c| c.schemas.iter().map(move |s| (c, s)))
	}

	fn schema_filter(&self, catalog: Option<&str>, schema: Option<&str>) -> Option<&SchemaFilter> {
		self.schema_scopes()
			.find(|(c, s)| {
				name_matches(c.name.as_deref(), catalog) && name_matches(s.name.as_deref(), schema)
			})
			.map(|(_, s)| s)
	}

	pub fn table_filter(&self, catalog: Option<&str>, schema: Option<&str>) -> Option<&TableFilter> {
		self.schema_filter(catalog, schema).map(|s| &s.tables)
	}

	pub fn procedure_filter(
		&self,
		catalog: Option<&str>,
		schema: Option<&str>,
	) -> Option<&PatternFilter> {
		self.schema_filter(catalog, schema).map(|s| &s.procedures)
	}

	/// Whether any schema filter admits at least one procedure.
	pub fn loads_procedures(&self) -> bool {
		self.schema_scopes()
			.any(|(_, s)| !s.procedures.is_include_nothing())
	}
}
