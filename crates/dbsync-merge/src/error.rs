//! Error types for schema merging.

use dbsync_reverse::{ConfigError, LoadError};
use std::path::PathBuf;
use thiserror::Error;

/// Boxed driver error carried by [`MergeError::Execution`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum MergeError {
	/// The dialect cannot perform the operation; the schema must be changed
	/// by hand.
	#[error("{dialect} cannot {operation}: {message}")]
	Unsupported {
		dialect: &'static str,
		operation: &'static str,
		message: String,
	},

	/// A token does not fit the model it is rendered or applied against.
	#[error("{token}: {message}")]
	Structural { token: String, message: String },

	/// A statement failed; the transaction was rolled back.
	#[error("{token} failed executing `{sql}`: {source}")]
	Execution {
		token: String,
		sql: String,
		#[source]
		source: BoxError,
	},

	#[error("Unknown dialect: {0}")]
	UnknownDialect(String),

	#[error("Environment variable {name} referenced by {key} is not set")]
	MissingVariable { key: &'static str, name: String },

	#[error("IO error reading {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error(transparent)]
	Load(#[from] LoadError),

	#[error(transparent)]
	Config(#[from] ConfigError),
}

impl MergeError {
	pub(crate) fn unsupported(
		dialect: &'static str,
		operation: &'static str,
		message: impl Into<String>,
	) -> Self {
		Self::Unsupported {
			dialect,
			operation,
			message: message.into(),
		}
	}

	pub(crate) fn structural(token: impl ToString, message: impl Into<String>) -> Self {
		Self::Structural {
			token: token.to_string(),
			message: message.into(),
		}
	}

	/// Whether the error asks for manual schema changes rather than a retry.
	pub fn is_unsupported(&self) -> bool {
		matches!(self, Self::Unsupported { .. })
	}
}

pub type Result<T> = std::result::Result<T, MergeError>;
