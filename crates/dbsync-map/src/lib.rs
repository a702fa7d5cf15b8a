//! # dbsync-map
//!
//! In-memory schema model shared by the reverse engineering loaders and the
//! migration token engine:
//!
//! - [`DataMap`]: a named collection of tables and procedures
//! - [`DbEntity`], [`DbAttribute`], [`DbRelationship`]: tables, columns and
//!   the joins between them
//! - [`TableIndex`]: case-insensitive table index used while reading a
//!   database
//! - [`JdbcType`]: portable column type codes
//!
//! ## Example
//!
//! ```rust
//! use dbsync_map::{DataMap, DbAttribute, DbEntity, JdbcType};
//!
//! let map = DataMap::new("gallery").entity(
//!     DbEntity::new("ARTIST")
//!         .attribute(DbAttribute::new("ARTIST_ID", JdbcType::BigInt).primary_key())
//!         .attribute(DbAttribute::new("NAME", JdbcType::VarChar).max_length(254)),
//! );
//!
//! assert_eq!(map.find_entity("artist").unwrap().primary_key_names(), vec!["ARTIST_ID"]);
//! ```

pub mod attribute;
pub mod data_map;
pub mod entity;
pub mod error;
pub mod index;
pub mod procedure;
pub mod relationship;
pub mod types;

pub use attribute::DbAttribute;
pub use data_map::DataMap;
pub use entity::{DbEntity, TableType, qualified_name};
pub use error::{MapError, Result};
pub use index::TableIndex;
pub use procedure::{ParameterDirection, Procedure, ProcedureParameter};
pub use relationship::{DbJoin, DbRelationship, DeleteRule};
pub use types::JdbcType;
