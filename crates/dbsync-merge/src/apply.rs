//! Applying a token list to both sides.

use crate::dialect::Dialect;
use crate::error::Result;
use crate::executor::{Statement, StatementExecutor, render_statements};
use crate::token::MergerToken;
use dbsync_map::DataMap;
use tracing::info;

/// Outcome of [`TokenApplier::apply`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
	/// Statements sent to the executor, in order
	pub statements: Vec<Statement>,
	/// Number of to-model tokens applied to the model
	pub model_changes: usize,
}

/// Runs to-DB tokens through an executor and applies to-model tokens to a
/// [`DataMap`].
///
/// Everything is checked before anything changes: the statements are all
/// rendered and the model changes are made on a copy first. The model is
/// only updated once the database accepted every statement.
pub struct TokenApplier<'e> {
	dialect: Dialect,
	executor: &'e dyn StatementExecutor,
}

impl<'e> TokenApplier<'e> {
	pub fn new(dialect: Dialect, executor: &'e dyn StatementExecutor) -> Self {
		Self { dialect, executor }
	}

	pub async fn apply(&self, tokens: &[MergerToken], model: &mut DataMap) -> Result<ApplyReport> {
		let statements = render_statements(tokens, &self.dialect)?;

		let mut updated = model.clone();
		let mut model_changes = 0;
		for token in tokens.iter().filter(|t| !t.is_to_db()) {
			token.apply_to_model(&mut updated)?;
			model_changes += 1;
		}

		if !statements.is_empty() {
			self.executor.execute_all(&statements).await?;
		}
		*model = updated;

		info!(
			dialect = %self.dialect,
			statements = statements.len(),
			model_changes,
			"applied merge tokens"
		);
		Ok(ApplyReport {
			statements,
			model_changes,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::dialect::{ANSI, SQLITE};
	use crate::executor::RecordingExecutor;
	use dbsync_map::{DbAttribute, DbEntity, DbRelationship, JdbcType};
	use rstest::rstest;

	fn artist() -> DbEntity {
		DbEntity::new("ARTIST")
			.attribute(DbAttribute::new("ARTIST_ID", JdbcType::Integer).primary_key())
			.attribute(DbAttribute::new("NAME", JdbcType::VarChar).max_length(254))
	}

	fn mixed_tokens() -> Vec<MergerToken> {
		let factory = ANSI.token_factory();
		let entity = artist();
		let paintings = DbRelationship::new("paintings", "ARTIST", "PAINTING")
			.to_many(true)
			.join("ARTIST_ID", "ARTIST_ID");
		vec![
			factory.create_set_not_null_to_db(&entity, entity.find_attribute("NAME").unwrap()),
			factory.create_add_relationship_to_model(&entity, &paintings),
		]
	}

	#[rstest]
	#[tokio::test]
	async fn test_apply_updates_both_sides() {
		let executor = RecordingExecutor::new();
		let mut model = DataMap::new("m").entity(artist());

		let report = TokenApplier::new(ANSI, &executor)
			.apply(&mixed_tokens(), &mut model)
			.await
			.unwrap();

		assert_eq!(report.model_changes, 1);
		assert_eq!(executor.sql(), vec!["ALTER TABLE ARTIST ALTER COLUMN NAME SET NOT NULL"]);
		assert!(model.find_entity("ARTIST").unwrap().get_relationship("paintings").is_some());
	}

	#[rstest]
	#[tokio::test]
	async fn test_failure_leaves_model_untouched() {
		let executor = RecordingExecutor::failing_at(0);
		let mut model = DataMap::new("m").entity(artist());
		let before = model.clone();

		let result = TokenApplier::new(ANSI, &executor)
			.apply(&mixed_tokens(), &mut model)
			.await;

		assert!(result.is_err());
		assert_eq!(model, before);
	}

	#[rstest]
	#[tokio::test]
	async fn test_refusal_runs_nothing() {
		let executor = RecordingExecutor::new();
		let mut model = DataMap::new("m").entity(artist());

		let err = TokenApplier::new(SQLITE, &executor)
			.apply(&mixed_tokens(), &mut model)
			.await
			.unwrap_err();

		assert!(err.is_unsupported());
		assert!(executor.statements().is_empty());
	}
}
