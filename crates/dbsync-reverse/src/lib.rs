//! # dbsync-reverse
//!
//! Reverse engineering of a live database into a [`dbsync_map::DataMap`].
//!
//! - [`metadata`]: typed metadata rows and the [`MetadataSource`] trait,
//!   with SQLite (`sqlite` feature) and in-memory implementations
//! - [`filters`] and [`config`]: include/exclude patterns per catalog,
//!   schema, table, column and procedure
//! - [`loader`]: the staged [`DbLoader`] pipeline
//! - [`exported_key`]: grouping of foreign key rows into constraints
//! - [`naming`]: relationship naming strategies

pub mod config;
pub mod delegate;
pub mod error;
pub mod exported_key;
pub mod filters;
pub mod loader;
pub mod metadata;
pub mod naming;

pub use config::{LoaderConfiguration, ReverseEngineeringConfig};
pub use delegate::{DbLoaderDelegate, LoggingDelegate};
pub use error::{ConfigError, LoadError, MetadataError, Result};
pub use exported_key::{ExportedKey, KeyData, group_exported_keys};
pub use filters::{
	CatalogFilter, FiltersConfig, IncludeTableFilter, PatternFilter, SchemaFilter, TableFilter,
};
pub use loader::{DbLoader, LoadReport, LoadStep, Recovery};
#[cfg(feature = "sqlite")]
pub use metadata::SqliteMetadata;
pub use metadata::{MetadataOperation, MetadataSource, StaticMetadata};
pub use naming::{DefaultObjectNameGenerator, NameBuilder, ObjectNameGenerator};
