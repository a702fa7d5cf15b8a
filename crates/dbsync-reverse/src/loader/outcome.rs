//! Recovery policy for metadata reads.
//!
//! Each [`LoadStep`] decides whether a failed read is recovered from (the
//! load continues and the failure is recorded as a [`Recovery`]) or aborts
//! the load. A broken connection always aborts.

use crate::error::{LoadError, MetadataError};
use std::fmt;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadStep {
	Catalogs,
	Schemas,
	Entities,
	/// Columns of every table in one wildcard read
	Attributes,
	/// Columns of a single table, after the wildcard read missed it
	EntityAttributes,
	PrimaryKeys,
	ExportedKeys,
	Procedures,
	ProcedureColumns,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
	Recover,
	Fatal,
}

impl LoadStep {
	pub fn name(self) -> &'static str {
		match self {
			LoadStep::Catalogs => "catalogs",
			LoadStep::Schemas => "schemas",
			LoadStep::Entities => "tables",
			LoadStep::Attributes => "columns",
			LoadStep::EntityAttributes => "table columns",
			LoadStep::PrimaryKeys => "primary keys",
			LoadStep::ExportedKeys => "exported keys",
			LoadStep::Procedures => "procedures",
			LoadStep::ProcedureColumns => "procedure columns",
		}
	}

	pub fn disposition(self, error: &MetadataError) -> Disposition {
		if error.is_connection_failure() {
			return Disposition::Fatal;
		}
		match self {
			LoadStep::Catalogs | LoadStep::Schemas | LoadStep::Entities => Disposition::Fatal,
			LoadStep::Attributes
			| LoadStep::EntityAttributes
			| LoadStep::PrimaryKeys
			| LoadStep::ExportedKeys => Disposition::Recover,
			LoadStep::Procedures | LoadStep::ProcedureColumns => match error {
				MetadataError::Unsupported { .. } => Disposition::Recover,
				_ => Disposition::Fatal,
			},
		}
	}
}

impl fmt::Display for LoadStep {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

/// A failed read the load continued past.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recovery {
	pub step: LoadStep,
	/// Table or schema the read was for
	pub scope: String,
	pub reason: String,
}

#[derive(Debug)]
pub enum ReadOutcome<T> {
	Complete(T),
	Recovered(Recovery),
}

/// Apply the step's policy to a read result.
pub(crate) fn settle<T>(
	step: LoadStep,
	scope: &str,
	result: Result<T, MetadataError>,
) -> Result<ReadOutcome<T>, LoadError> {
	let error = match result {
		Ok(value) => return Ok(ReadOutcome::Complete(value)),
		Err(error) => error,
	};

	match step.disposition(&error) {
		Disposition::Recover => {
			warn!(step = %step, scope = %scope, error = %error, "Metadata read failed, continuing");
			Ok(ReadOutcome::Recovered(Recovery {
				step,
				scope: scope.to_string(),
				reason: error.to_string(),
			}))
		}
		Disposition::Fatal => Err(LoadError::Metadata {
			step: step.name(),
			scope: scope.to_string(),
			source: error,
		}),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case(LoadStep::Entities, Disposition::Fatal)]
	#[case(LoadStep::Attributes, Disposition::Recover)]
	#[case(LoadStep::ExportedKeys, Disposition::Recover)]
	#[case(LoadStep::Procedures, Disposition::Fatal)]
	fn test_query_failure_disposition(#[case] step: LoadStep, #[case] expected: Disposition) {
		let error = MetadataError::query("q", "boom");
		assert_eq!(step.disposition(&error), expected);
	}

	#[rstest]
	fn test_unsupported_procedures_recover() {
		let error = MetadataError::unsupported("procedures", "no");
		assert_eq!(LoadStep::Procedures.disposition(&error), Disposition::Recover);
	}

	#[rstest]
	fn test_connection_failure_is_always_fatal() {
		let error = MetadataError::Connection("gone".to_string());
		assert_eq!(LoadStep::Attributes.disposition(&error), Disposition::Fatal);

		let result: Result<ReadOutcome<()>, _> = settle(LoadStep::Attributes, "main", Err(error));
		assert!(matches!(result, Err(LoadError::Metadata { step: "columns", .. })));
	}
}
