//! Schema model: tables, columns, relationships and procedures.
//!
//! # Examples
//!
//! ```rust
//! use dbsync::map::{DataMap, DbAttribute, DbEntity, JdbcType};
//!
//! let map = DataMap::new("gallery")
//!     .entity(DbEntity::new("ARTIST").attribute(DbAttribute::new("ID", JdbcType::Integer)));
//! assert!(map.find_entity("artist").is_some());
//! ```

pub use dbsync_map::*;
