//! # dbsync
//!
//! Keeps a relational schema model and a live database in step.
//!
//! dbsync reads database metadata into a [`DataMap`], compares it with a
//! model and produces [`MergerToken`]s: small schema changes that render to
//! DDL for one of eleven SQL dialects, or apply back to the model. Changes a
//! dialect cannot express are refused with an explanation rather than
//! approximated.
//!
//! ## Crates
//!
//! - [`map`]: the schema model (`dbsync-map`)
//! - [`reverse`]: metadata readers and the database loader (`dbsync-reverse`)
//! - [`merge`]: dialects, tokens, the merger and execution (`dbsync-merge`)
//!
//! ## Feature Flags
//!
//! - `sqlite` (default) - SQLite metadata reader and `sqlx` statement executor
//!
//! ## Quick Example
//!
//! ```rust,no_run
//! use dbsync::prelude::*;
//!
//! # async fn sync(
//! #     source: &dyn MetadataSource,
//! #     executor: &dyn StatementExecutor,
//! #     mut model: DataMap,
//! # ) -> dbsync::merge::Result<()> {
//! let config = SyncConfig::from_file("dbsync.toml")?;
//!
//! let report = SchemaSync::new(source, executor, config).run(&mut model).await?;
//! for statement in &report.applied.statements {
//!     println!("{statement}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod map;
pub mod merge;
pub mod reverse;

// Re-export the schema model
pub use dbsync_map::{
	DataMap, DbAttribute, DbEntity, DbRelationship, DeleteRule, JdbcType, Procedure,
	ProcedureParameter,
};

// Re-export loading
pub use dbsync_reverse::{
	DbLoader, FiltersConfig, LoadReport, LoaderConfiguration, MetadataSource,
	ReverseEngineeringConfig, StaticMetadata,
};

#[cfg(feature = "sqlite")]
pub use dbsync_reverse::SqliteMetadata;

// Re-export merging
pub use dbsync_merge::{
	DbMerger, Dialect, Direction, MergeError, MergerToken, MergerTokenFactory, RecordingExecutor,
	SchemaChange, SchemaSync, StatementExecutor, SyncConfig, SyncPlan, SyncReport, TokenApplier,
};

#[cfg(feature = "sqlite")]
pub use dbsync_merge::SqlxExecutor;

pub mod prelude {
	pub use crate::{
		DataMap, DbAttribute, DbEntity, DbLoader, DbMerger, DbRelationship, Dialect, JdbcType,
		MergerToken, MergerTokenFactory, MetadataSource, RecordingExecutor, SchemaSync,
		StatementExecutor, SyncConfig, TokenApplier,
	};

	#[cfg(feature = "sqlite")]
	pub use crate::{SqliteMetadata, SqlxExecutor};
}
