//! Dialect-aware comparison and DDL generation.
//!
//! # Examples
//!
//! ```rust
//! use dbsync::merge::dialect::SQLSERVER;
//!
//! assert_eq!(SQLSERVER.name, "sqlserver");
//! ```

pub use dbsync_merge::*;
