//! Statement execution
//!
//! Rendered statements run through a [`StatementExecutor`]. Every call to
//! [`StatementExecutor::execute_all`] is one unit: either all statements are
//! kept or none are. [`SqlxExecutor`] runs them in a database transaction;
//! [`RecordingExecutor`] only collects them, for dry runs and tests.

use crate::dialect::Dialect;
use crate::error::{MergeError, Result};
use crate::token::MergerToken;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::fmt;

/// One rendered SQL statement and the token it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
	pub token: String,
	pub sql: String,
}

impl fmt::Display for Statement {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.sql)
	}
}

/// Render every to-DB token, in order.
///
/// Fails on the first token the dialect refuses, before anything is
/// executed.
pub fn render_statements(tokens: &[MergerToken], dialect: &Dialect) -> Result<Vec<Statement>> {
	let mut statements = Vec::new();
	for token in tokens.iter().filter(|t| t.is_to_db()) {
		let label = token.to_string();
		for sql in token.create_sql(dialect)? {
			statements.push(Statement {
				token: label.clone(),
				sql,
			});
		}
	}
	Ok(statements)
}

#[async_trait]
pub trait StatementExecutor: Send + Sync {
	/// Run `statements` as one unit and return how many ran.
	///
	/// On failure nothing is kept, and the error names the failing token and
	/// statement.
	async fn execute_all(&self, statements: &[Statement]) -> Result<usize>;
}

/// Collects statements instead of running them.
#[derive(Debug, Default)]
pub struct RecordingExecutor {
	executed: Mutex<Vec<Statement>>,
	fail_at: Option<usize>,
}

impl RecordingExecutor {
	pub fn new() -> Self {
		Self::default()
	}

	/// Executor failing on the statement at `index` of each batch.
	pub fn failing_at(index: usize) -> Self {
		Self {
			executed: Mutex::new(Vec::new()),
			fail_at: Some(index),
		}
	}

	pub fn statements(&self) -> Vec<Statement> {
		self.executed.lock().clone()
	}

	pub fn sql(&self) -> Vec<String> {
		self.executed.lock().iter().map(|s| s.sql.clone()).collect()
	}
}

#[async_trait]
impl StatementExecutor for RecordingExecutor {
	async fn execute_all(&self, statements: &[Statement]) -> Result<usize> {
		if let Some(statement) = self.fail_at.and_then(|i| statements.get(i)) {
			return Err(MergeError::Execution {
				token: statement.token.clone(),
				sql: statement.sql.clone(),
				source: "statement rejected by recording executor".into(),
			});
		}
		self.executed.lock().extend_from_slice(statements);
		Ok(statements.len())
	}
}

#[cfg(feature = "sqlite")]
pub use sqlx_executor::SqlxExecutor;

#[cfg(feature = "sqlite")]
mod sqlx_executor {
	use super::{Statement, StatementExecutor};
	use crate::error::{MergeError, Result};
	use async_trait::async_trait;
	use sqlx::SqlitePool;
	use tracing::{debug, warn};

	/// Runs statements in one transaction on a borrowed pool.
	#[derive(Debug, Clone)]
	pub struct SqlxExecutor {
		pool: SqlitePool,
	}

	impl SqlxExecutor {
		pub fn new(pool: SqlitePool) -> Self {
			Self { pool }
		}

		pub fn pool(&self) -> &SqlitePool {
			&self.pool
		}
	}

	fn transaction_error(step: &str, source: sqlx::Error) -> MergeError {
		MergeError::Execution {
			token: "Transaction".to_string(),
			sql: step.to_string(),
			source: Box::new(source),
		}
	}

	#[async_trait]
	impl StatementExecutor for SqlxExecutor {
		async fn execute_all(&self, statements: &[Statement]) -> Result<usize> {
			let mut tx = self
				.pool
				.begin()
				.await
				.map_err(|e| transaction_error("BEGIN", e))?;

			for statement in statements {
				debug!(token = %statement.token, sql = %statement.sql, "executing statement");
				if let Err(e) = sqlx::query(&statement.sql).execute(&mut *tx).await {
					warn!(
						token = %statement.token,
						sql = %statement.sql,
						error = %e,
						"statement failed, rolling back"
					);
					if let Err(rollback) = tx.rollback().await {
						warn!(error = %rollback, "rollback failed");
					}
					return Err(MergeError::Execution {
						token: statement.token.clone(),
						sql: statement.sql.clone(),
						source: Box::new(e),
					});
				}
			}

			tx.commit().await.map_err(|e| transaction_error("COMMIT", e))?;
			Ok(statements.len())
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::dialect::{ANSI, SQLITE};
	use dbsync_map::{DbAttribute, DbEntity, JdbcType};
	use rstest::rstest;

	fn tokens() -> Vec<MergerToken> {
		let entity = DbEntity::new("ARTIST")
			.attribute(DbAttribute::new("ARTIST_ID", JdbcType::Integer).primary_key())
			.attribute(DbAttribute::new("NAME", JdbcType::VarChar).max_length(254));
		let factory = ANSI.token_factory();
		let name = entity.find_attribute("NAME").unwrap();
		vec![
			factory.create_create_table_to_db(&entity),
			factory.create_set_not_null_to_db(&entity, name),
			factory.create_drop_column_to_model(&entity, name),
		]
	}

	#[rstest]
	fn test_render_skips_to_model_tokens() {
		let statements = render_statements(&tokens(), &ANSI).unwrap();

		assert_eq!(statements.len(), 2);
		assert_eq!(statements[1].token, "Set Not Null ARTIST.NAME (To DB)");
		assert_eq!(statements[1].sql, "ALTER TABLE ARTIST ALTER COLUMN NAME SET NOT NULL");
	}

	#[rstest]
	fn test_render_fails_on_refusal() {
		let err = render_statements(&tokens(), &SQLITE).unwrap_err();

		assert!(err.is_unsupported());
	}

	#[rstest]
	#[tokio::test]
	async fn test_recording_executor_keeps_nothing_on_failure() {
		let statements = render_statements(&tokens(), &ANSI).unwrap();
		let executor = RecordingExecutor::failing_at(1);

		let err = executor.execute_all(&statements).await.unwrap_err();

		assert!(matches!(
			err,
			MergeError::Execution { ref sql, .. } if sql.starts_with("ALTER TABLE ARTIST")
		));
		assert!(executor.statements().is_empty());
	}

	#[cfg(feature = "sqlite")]
	#[rstest]
	#[tokio::test]
	async fn test_sqlx_executor_rolls_back() {
		use sqlx::sqlite::SqlitePoolOptions;

		let pool = SqlitePoolOptions::new()
			.max_connections(1)
			.connect("sqlite::memory:")
			.await
			.unwrap();
		let executor = SqlxExecutor::new(pool.clone());
		let statements = vec![
			Statement {
				token: "Create Table A (To DB)".to_string(),
				sql: "CREATE TABLE A (ID INTEGER)".to_string(),
			},
			Statement {
				token: "Create Table A (To DB)".to_string(),
				sql: "CREATE TABLE A (ID INTEGER)".to_string(),
			},
		];

		let err = executor.execute_all(&statements).await.unwrap_err();

		assert!(matches!(err, MergeError::Execution { .. }));
		let tables: Vec<(String,)> =
			sqlx::query_as("SELECT name FROM sqlite_master WHERE type = 'table'")
				.fetch_all(&pool)
				.await
				.unwrap();
		assert!(tables.is_empty());
	}
}
