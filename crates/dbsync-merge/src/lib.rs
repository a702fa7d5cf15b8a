//! # dbsync-merge
//!
//! Dialect-aware schema migration: compare a model with a database, turn the
//! differences into [`MergerToken`]s, render them as DDL and run them.
//!
//! - [`dialect`]: the [`Dialect`] values (ANSI, Derby, Firebird, H2, Ingres,
//!   MySQL, OpenBase, Oracle, PostgreSQL, SQLite, SQL Server)
//! - [`token`] and [`factory`]: schema changes and their construction
//! - [`merger`]: the model/database comparison
//! - [`executor`] and [`apply`]: transactional execution
//! - [`sync`]: load, compare and apply in one call
//!
//! ## Example
//!
//! ```rust
//! use dbsync_map::{DataMap, DbAttribute, DbEntity, JdbcType};
//! use dbsync_merge::{Dialect, DbMerger};
//!
//! let model = DataMap::new("gallery").entity(
//!     DbEntity::new("ARTIST")
//!         .attribute(DbAttribute::new("ARTIST_ID", JdbcType::BigInt).primary_key())
//!         .attribute(DbAttribute::new("NAME", JdbcType::VarChar).max_length(254)),
//! );
//! let database = DataMap::new("gallery");
//!
//! let dialect = Dialect::by_name("postgres").unwrap();
//! let factory = dialect.token_factory();
//! let tokens = DbMerger::new(factory).create_merge_tokens(&model, &database);
//!
//! assert_eq!(
//!     factory.render(&tokens[0]).unwrap(),
//!     vec![
//!         "CREATE TABLE ARTIST (ARTIST_ID BIGINT NOT NULL, NAME VARCHAR(254) NULL, \
//!          PRIMARY KEY (ARTIST_ID))",
//!         "CREATE SEQUENCE pk_artist INCREMENT 20 START 200",
//!     ]
//! );
//! ```

pub mod apply;
pub mod config;
pub mod dialect;
pub mod error;
pub mod executor;
pub mod factory;
pub mod merger;
pub mod quoting;
pub mod sync;
pub mod token;
pub mod value;
pub mod value_for_null;

pub use apply::{ApplyReport, TokenApplier};
pub use config::SyncConfig;
pub use dialect::{DdlOperations, Dialect, DialectKind, PkGenerator};
pub use error::{MergeError, Result};
#[cfg(feature = "sqlite")]
pub use executor::SqlxExecutor;
pub use executor::{RecordingExecutor, Statement, StatementExecutor, render_statements};
pub use factory::MergerTokenFactory;
pub use merger::DbMerger;
pub use quoting::{QuotingStrategy, TableName};
pub use sync::{SchemaSync, SyncPlan, SyncReport};
pub use token::{Direction, MergerToken, SchemaChange};
pub use value::ColumnValue;
pub use value_for_null::{ConfiguredValues, NoValueForNull, ValueForNullProvider};
