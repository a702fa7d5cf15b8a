//! Schema loading
//!
//! [`DbLoader`] drives a [`PartialSchema`] through its stages against a
//! borrowed [`MetadataSource`]:
//!
//! 1. tables (filtered, case-insensitively indexed)
//! 2. columns, bulk per schema with a per-table fallback
//! 3. primary keys
//! 4. exported keys, reconciled into relationships
//! 5. procedures and their parameters
//!
//! Failed reads are handled per [`LoadStep`]: recoverable ones are logged
//! and reported in the [`LoadReport`], the rest abort the load.

mod outcome;
mod pipeline;
mod relationships;

pub use outcome::{Disposition, LoadStep, ReadOutcome, Recovery};
pub use pipeline::{LoadContext, PartialSchema, stage};
pub use relationships::RelationshipReconciler;

use crate::config::LoaderConfiguration;
use crate::delegate::{DbLoaderDelegate, LoggingDelegate};
use crate::error::Result;
use crate::metadata::MetadataSource;
use crate::naming::{DefaultObjectNameGenerator, ObjectNameGenerator};
use dbsync_map::DataMap;
use outcome::settle;

/// What a load recovered from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
	pub recoveries: Vec<Recovery>,
}

impl LoadReport {
	pub fn is_clean(&self) -> bool {
		self.recoveries.is_empty()
	}
}

/// Reverse engineers a database schema into a [`DataMap`].
///
/// ```rust,no_run
/// # async fn run(pool: sqlx::SqlitePool) -> Result<(), Box<dyn std::error::Error>> {
/// use dbsync_reverse::{DbLoader, LoaderConfiguration, SqliteMetadata};
///
/// let source = SqliteMetadata::new(pool);
/// let map = DbLoader::new(&source)
/// 	.load("gallery", &LoaderConfiguration::default())
/// 	.await?;
/// println!("{} tables", map.entity_count());
/// # Ok(())
/// # }
/// ```
pub struct DbLoader<'a> {
	source: &'a dyn MetadataSource,
	delegate: Box<dyn DbLoaderDelegate + 'a>,
	names: Box<dyn ObjectNameGenerator + 'a>,
}

impl<'a> DbLoader<'a> {
	pub fn new(source: &'a dyn MetadataSource) -> Self {
		Self {
			source,
			delegate: Box::new(LoggingDelegate),
			names: Box::new(DefaultObjectNameGenerator),
		}
	}

	pub fn with_delegate(mut self, delegate: impl DbLoaderDelegate + 'a) -> Self {
		self.delegate = Box::new(delegate);
		self
	}

	pub fn with_name_generator(mut self, names: impl ObjectNameGenerator + 'a) -> Self {
		self.names = Box::new(names);
		self
	}

	/// Load the schema into a new map named `name`.
	pub async fn load(&self, name: &str, config: &LoaderConfiguration) -> Result<DataMap> {
		let (map, _report) = self.load_with_report(name, config).await?;
		Ok(map)
	}

	/// Load the schema, also returning the reads that were recovered from.
	pub async fn load_with_report(
		&self,
		name: &str,
		config: &LoaderConfiguration,
	) -> Result<(DataMap, LoadReport)> {
		let ctx = LoadContext {
			source: self.source,
			config,
			delegate: self.delegate.as_ref(),
			names: self.names.as_ref(),
		};

		let schema = PartialSchema::new()
			.load_entities(&ctx)
			.await?
			.load_attributes(&ctx)
			.await?
			.load_primary_keys(&ctx)
			.await?
			.load_relationships(&ctx)
			.await?
			.load_procedures(&ctx)
			.await?;

		let (tables, procedures, recoveries) = schema.into_parts();
		let mut map = DataMap::from_index(name, tables);
		for procedure in procedures {
			map.add_procedure(procedure);
		}
		Ok((map, LoadReport { recoveries }))
	}

	/// Catalog names reported by the source.
	pub async fn load_catalogs(&self) -> Result<Vec<String>> {
		match settle(LoadStep::Catalogs, "*", self.source.catalogs().await)? {
			ReadOutcome::Complete(catalogs) => Ok(catalogs),
			ReadOutcome::Recovered(_) => Ok(Vec::new()),
		}
	}

	/// Schema names reported by the source.
	pub async fn load_schemas(&self) -> Result<Vec<String>> {
		match settle(LoadStep::Schemas, "*", self.source.schemas().await)? {
			ReadOutcome::Complete(schemas) => Ok(schemas),
			ReadOutcome::Recovered(_) => Ok(Vec::new()),
		}
	}
}
