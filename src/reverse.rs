//! Reading schema metadata from a database.

pub use dbsync_reverse::*;
