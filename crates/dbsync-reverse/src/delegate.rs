//! Callbacks observing and steering a schema load.

use dbsync_map::{DbEntity, DbRelationship};
use tracing::debug;

/// Hooks invoked by [`DbLoader`](crate::loader::DbLoader) as it builds the
/// schema. Every method has a permissive default.
pub trait DbLoaderDelegate: Send + Sync {
	fn db_entity_added(&self, _entity: &DbEntity) {}

	/// A table displaced by a later table of the same name.
	fn db_entity_removed(&self, _entity: &DbEntity) {}

	/// Whether to read foreign keys referencing `entity`.
	fn db_relationship(&self, _entity: &DbEntity) -> bool {
		true
	}

	/// Whether to attach `relationship` to `entity`.
	fn db_relationship_loaded(&self, _entity: &DbEntity, _relationship: &DbRelationship) -> bool {
		true
	}
}

/// Delegate that accepts everything and logs what it sees.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingDelegate;

impl DbLoaderDelegate for LoggingDelegate {
	fn db_entity_added(&self, entity: &DbEntity) {
		debug!(table = %entity.fully_qualified_name(), "Table added");
	}

	fn db_entity_removed(&self, entity: &DbEntity) {
		debug!(table = %entity.fully_qualified_name(), "Table removed");
	}

	fn db_relationship_loaded(&self, entity: &DbEntity, relationship: &DbRelationship) -> bool {
		debug!(
			table = %entity.name,
			relationship = %relationship.name,
			target = %relationship.target_entity,
			"Relationship loaded"
		);
		true
	}
}
