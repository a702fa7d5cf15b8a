//! Error types for metadata reading and schema loading.

use std::path::PathBuf;
use thiserror::Error;

/// Failure reported by a [`MetadataSource`](crate::metadata::MetadataSource).
#[derive(Error, Debug)]
pub enum MetadataError {
	/// The connection itself is unusable; nothing further can be read.
	#[error("Connection error: {0}")]
	Connection(String),

	/// The driver does not implement this metadata query.
	#[error("Unsupported metadata query {operation}: {message}")]
	Unsupported { operation: String, message: String },

	/// The metadata query ran and failed.
	#[error("Metadata query {operation} failed: {message}")]
	Query { operation: String, message: String },

	#[cfg(feature = "sqlite")]
	#[error("SQL error: {0}")]
	Sql(#[from] sqlx::Error),
}

impl MetadataError {
	pub fn unsupported(operation: impl Into<String>, message: impl Into<String>) -> Self {
		Self::Unsupported {
			operation: operation.into(),
			message: message.into(),
		}
	}

	pub fn query(operation: impl Into<String>, message: impl Into<String>) -> Self {
		Self::Query {
			operation: operation.into(),
			message: message.into(),
		}
	}

	/// Whether the error means the connection can no longer be used.
	pub fn is_connection_failure(&self) -> bool {
		match self {
			Self::Connection(_) => true,
			Self::Unsupported { .. } | Self::Query { .. } => false,
			#[cfg(feature = "sqlite")]
			Self::Sql(err) => matches!(
				err,
				sqlx::Error::Io(_)
					| sqlx::Error::Tls(_)
					| sqlx::Error::PoolTimedOut
					| sqlx::Error::PoolClosed
					| sqlx::Error::WorkerCrashed
			),
		}
	}
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("IO error reading {path}: {source}")]
	IoError {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to parse configuration: {message}")]
	ParseError { message: String },

	#[error("Invalid regex pattern: {pattern}")]
	InvalidPattern { pattern: String },
}

/// Fatal outcome of a schema load.
#[derive(Debug, Error)]
pub enum LoadError {
	#[error("{step} failed for {scope}: {source}")]
	Metadata {
		step: &'static str,
		scope: String,
		#[source]
		source: MetadataError,
	},

	#[error(transparent)]
	Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, LoadError>;
