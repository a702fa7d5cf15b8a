//! Configuration for reverse engineering.
//!
//! Loaded from TOML and compiled into a [`LoaderConfiguration`] with
//! ready-to-use [`FiltersConfig`].
//!
//! ```toml
//! table_types = ["TABLE"]
//! skip_primary_keys_loading = false
//!
//! [[catalogs]]
//! [[catalogs.schemas]]
//! name = "public"
//! include_procedures = ["proc_.*"]
//! exclude_tables = ["tmp_.*"]
//!
//! [[catalogs.schemas.include_tables]]
//! pattern = "artist.*"
//! exclude_columns = ["secret_.*"]
//! ```
//!
//! Without `[[catalogs]]`, the top-level `[tables]` and `[procedures]`
//! sections apply to every catalog and schema.

use crate::error::ConfigError;
use crate::filters::{
	CatalogFilter, FiltersConfig, IncludeTableFilter, PatternFilter, SchemaFilter, TableFilter,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Reverse engineering configuration as written in TOML.
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReverseEngineeringConfig {
	/// Table types passed to the table reader
	pub table_types: Vec<String>,

	pub skip_relationships_loading: bool,

	pub skip_primary_keys_loading: bool,

	/// Filters for tables when no catalogs are listed
	pub tables: TablesConfig,

	/// Filters for procedures when no catalogs are listed
	pub procedures: PatternConfig,

	pub catalogs: Vec<CatalogConfig>,
}

impl Default for ReverseEngineeringConfig {
	fn default() -> Self {
		Self {
			table_types: default_table_types(),
			skip_relationships_loading: false,
			skip_primary_keys_loading: false,
			tables: TablesConfig::default(),
			procedures: PatternConfig::default(),
			catalogs: Vec::new(),
		}
	}
}

fn default_table_types() -> Vec<String> {
	vec!["TABLE".to_string(), "VIEW".to_string()]
}

impl ReverseEngineeringConfig {
	/// Load configuration from a TOML file.
	///
	/// # Errors
	///
	/// Returns error if file cannot be read or parsed.
	pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::IoError {
			path: path.as_ref().to_path_buf(),
			source: e,
		})?;

		Self::from_toml(&content)
	}

	/// Parse configuration from TOML string.
	pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
		toml::from_str(content).map_err(|e| ConfigError::ParseError {
			message: e.to_string(),
		})
	}

	/// Compile patterns into a [`LoaderConfiguration`].
	pub fn compile(&self) -> Result<LoaderConfiguration, ConfigError> {
		let catalogs = if self.catalogs.is_empty() {
			vec![CatalogFilter::new(
				None,
				vec![SchemaFilter::new(
					None,
					self.tables.compile()?,
					self.procedures.compile_procedures()?,
				)],
			)]
		} else {
			self.catalogs
				.iter()
				.map(CatalogConfig::compile)
				.collect::<Result<Vec<_>, _>>()?
		};

		Ok(LoaderConfiguration {
			filters: FiltersConfig::new(catalogs),
			table_types: self.table_types.clone(),
			skip_relationships_loading: self.skip_relationships_loading,
			skip_primary_keys_loading: self.skip_primary_keys_loading,
		})
	}
}

/// Include/exclude regex lists.
#[non_exhaustive]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
	pub include: Vec<String>,
	pub exclude: Vec<String>,
}

impl PatternConfig {
	pub fn new(include: Vec<String>, exclude: Vec<String>) -> Self {
		Self { include, exclude }
	}

	fn compile(&self) -> Result<PatternFilter, ConfigError> {
		PatternFilter::new(&self.include, &self.exclude)
	}

	// Procedures are opt-in: no include pattern loads none.
	fn compile_procedures(&self) -> Result<PatternFilter, ConfigError> {
		if self.include.is_empty() {
			Ok(PatternFilter::include_nothing())
		} else {
			self.compile()
		}
	}
}

/// Table filters for one schema.
#[non_exhaustive]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TablesConfig {
	/// Plain include patterns, each admitting all columns
	pub include: Vec<String>,
	pub exclude: Vec<String>,
	pub columns: PatternConfig,
	pub relationships: PatternConfig,
}

impl TablesConfig {
	fn compile(&self) -> Result<TableFilter, ConfigError> {
		let includes = if self.include.is_empty() {
			vec![IncludeTableFilter::new(
				None,
				self.columns.compile()?,
				self.relationships.compile()?,
			)?]
		} else {
			self.include
				.iter()
				.map(|p| {
					IncludeTableFilter::new(
						Some(p),
						self.columns.compile()?,
						self.relationships.compile()?,
					)
				})
				.collect::<Result<Vec<_>, _>>()?
		};
		TableFilter::new(includes, &self.exclude)
	}
}

#[non_exhaustive]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
	pub name: Option<String>,
	pub schemas: Vec<SchemaConfig>,
}

impl CatalogConfig {
	fn compile(&self) -> Result<CatalogFilter, ConfigError> {
		let schemas = if self.schemas.is_empty() {
			vec![SchemaConfig::default().compile()?]
		} else {
			self.schemas
				.iter()
				.map(SchemaConfig::compile)
				.collect::<Result<Vec<_>, _>>()?
		};
		Ok(CatalogFilter::new(self.name.clone(), schemas))
	}
}

#[non_exhaustive]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
	pub name: Option<String>,
	pub include_tables: Vec<IncludeTableConfig>,
	pub exclude_tables: Vec<String>,
	pub include_procedures: Vec<String>,
	pub exclude_procedures: Vec<String>,
}

impl SchemaConfig {
	fn compile(&self) -> Result<SchemaFilter, ConfigError> {
		let includes = if self.include_tables.is_empty() {
			vec![IncludeTableFilter::all()]
		} else {
			self.include_tables
				.iter()
				.map(IncludeTableConfig::compile)
				.collect::<Result<Vec<_>, _>>()?
		};
		let procedures = PatternConfig::new(
			self.include_procedures.clone(),
			self.exclude_procedures.clone(),
		)
		.compile_procedures()?;

		Ok(SchemaFilter::new(
			self.name.clone(),
			TableFilter::new(includes, &self.exclude_tables)?,
			procedures,
		))
	}
}

#[non_exhaustive]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IncludeTableConfig {
	/// Table name pattern; absent means every table
	pub pattern: Option<String>,
	pub include_columns: Vec<String>,
	pub exclude_columns: Vec<String>,
	pub include_relationships: Vec<String>,
	pub exclude_relationships: Vec<String>,
}

impl IncludeTableConfig {
	fn compile(&self) -> Result<IncludeTableFilter, ConfigError> {
		IncludeTableFilter::new(
			self.pattern.as_deref(),
			PatternFilter::new(&self.include_columns, &self.exclude_columns)?,
			PatternFilter::new(&self.include_relationships, &self.exclude_relationships)?,
		)
	}
}

/// Compiled settings consumed by [`DbLoader`](crate::loader::DbLoader).
#[derive(Debug, Clone)]
pub struct LoaderConfiguration {
	pub filters: FiltersConfig,
	pub table_types: Vec<String>,
	pub skip_relationships_loading: bool,
	pub skip_primary_keys_loading: bool,
}

impl Default for LoaderConfiguration {
	fn default() -> Self {
		Self {
			filters: FiltersConfig::default(),
			table_types: default_table_types(),
			skip_relationships_loading: false,
			skip_primary_keys_loading: false,
		}
	}
}

impl LoaderConfiguration {
	pub fn with_filters(mut self, filters: FiltersConfig) -> Self {
		self.filters = filters;
		self
	}

	pub fn skip_relationships(mut self) -> Self {
		self.skip_relationships_loading = true;
		self
	}

	pub fn skip_primary_keys(mut self) -> Self {
		self.skip_primary_keys_loading = true;
		self
	}
}
