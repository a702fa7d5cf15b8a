//! Database synchronization
//!
//! [`SchemaSync`] puts the pieces together: read the live schema, compare it
//! with a model, then run the resulting tokens (or only render them when
//! `dry_run` is set).

use crate::apply::{ApplyReport, TokenApplier};
use crate::config::SyncConfig;
use crate::error::Result;
use crate::executor::{RecordingExecutor, StatementExecutor};
use crate::merger::DbMerger;
use crate::token::MergerToken;
use dbsync_map::DataMap;
use dbsync_reverse::{DbLoader, LoadReport, MetadataSource};
use tracing::{info, warn};

/// What a synchronization would do.
#[derive(Debug, Clone)]
pub struct SyncPlan {
	/// The schema as read from the database
	pub database: DataMap,
	pub load_report: LoadReport,
	/// Ordered tokens turning the database into the model
	pub tokens: Vec<MergerToken>,
}

impl SyncPlan {
	pub fn is_empty(&self) -> bool {
		self.tokens.is_empty()
	}

	pub fn to_db_tokens(&self) -> impl Iterator<Item = &MergerToken> {
		self.tokens.iter().filter(|t| t.is_to_db())
	}

	pub fn to_model_tokens(&self) -> impl Iterator<Item = &MergerToken> {
		self.tokens.iter().filter(|t| !t.is_to_db())
	}
}

#[derive(Debug, Clone)]
pub struct SyncReport {
	pub plan: SyncPlan,
	pub applied: ApplyReport,
	/// Statements were rendered but not executed and the model kept as is
	pub dry_run: bool,
}

pub struct SchemaSync<'a> {
	source: &'a dyn MetadataSource,
	executor: &'a dyn StatementExecutor,
	config: SyncConfig,
}

impl<'a> SchemaSync<'a> {
	pub fn new(
		source: &'a dyn MetadataSource,
		executor: &'a dyn StatementExecutor,
		config: SyncConfig,
	) -> Self {
		Self {
			source,
			executor,
			config,
		}
	}

	pub fn config(&self) -> &SyncConfig {
		&self.config
	}

	/// Read the database and compare it with `model`.
	pub async fn plan(&self, model: &DataMap) -> Result<SyncPlan> {
		let dialect = self.config.dialect()?;
		let loader_config = self.config.reverse.compile()?;

		let (database, load_report) = DbLoader::new(self.source)
			.load_with_report(&model.name, &loader_config)
			.await?;
		if !load_report.is_clean() {
			warn!(
				recoveries = load_report.recoveries.len(),
				"database schema loaded with recovered failures"
			);
		}

		// Whatever was not loaded cannot be compared
		let tokens = DbMerger::new(dialect.token_factory())
			.with_filters(loader_config.filters.clone())
			.skip_relationships_tokens(
				self.config.skip_relationships_tokens || loader_config.skip_relationships_loading,
			)
			.skip_pk_tokens(self.config.skip_pk_tokens || loader_config.skip_primary_keys_loading)
			.with_value_for_null(self.config.value_for_null_provider())
			.create_merge_tokens(model, &database);

		Ok(SyncPlan {
			database,
			load_report,
			tokens,
		})
	}

	/// Bring the database and `model` in line.
	///
	/// Either every statement runs and `model` receives every to-model
	/// change, or neither side changes.
	pub async fn run(&self, model: &mut DataMap) -> Result<SyncReport> {
		let plan = self.plan(model).await?;
		let dialect = self.config.dialect()?;

		let applied = if self.config.dry_run {
			let recorder = RecordingExecutor::new();
			let mut scratch = model.clone();
			TokenApplier::new(dialect, &recorder)
				.apply(&plan.tokens, &mut scratch)
				.await?
		} else {
			TokenApplier::new(dialect, self.executor)
				.apply(&plan.tokens, model)
				.await?
		};

		info!(
			model = %model.name,
			statements = applied.statements.len(),
			dry_run = self.config.dry_run,
			"schema synchronized"
		);
		Ok(SyncReport {
			plan,
			applied,
			dry_run: self.config.dry_run,
		})
	}
}
