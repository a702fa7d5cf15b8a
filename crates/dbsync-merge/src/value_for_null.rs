//! Values written into `NULL` cells before a column becomes mandatory.

use crate::value::ColumnValue;
use dbsync_map::{DbAttribute, DbEntity};
use indexmap::IndexMap;

/// Supplies the value filling existing `NULL`s of a column that is about to
/// become `NOT NULL`.
pub trait ValueForNullProvider: Send + Sync {
	fn value_for(&self, entity: &DbEntity, column: &DbAttribute) -> Option<ColumnValue>;
}

/// Never fills anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoValueForNull;

impl ValueForNullProvider for NoValueForNull {
	fn value_for(&self, _entity: &DbEntity, _column: &DbAttribute) -> Option<ColumnValue> {
		None
	}
}

/// Values keyed by `TABLE.COLUMN`, matched ignoring case.
///
/// ```rust
/// use dbsync_map::{DbAttribute, DbEntity, JdbcType};
/// use dbsync_merge::value::ColumnValue;
/// use dbsync_merge::value_for_null::{ConfiguredValues, ValueForNullProvider};
///
/// let values = ConfiguredValues::default().with("artist.name", "unknown");
/// let artist = DbEntity::new("ARTIST");
/// let name = DbAttribute::new("NAME", JdbcType::VarChar);
///
/// assert_eq!(values.value_for(&artist, &name), Some(ColumnValue::from("unknown")));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfiguredValues {
	values: IndexMap<String, ColumnValue>,
}

impl ConfiguredValues {
	pub fn new(values: &IndexMap<String, ColumnValue>) -> Self {
		Self {
			values: values
				.iter()
				.map(|(k, v)| (k.to_uppercase(), v.clone()))
				.collect(),
		}
	}

	pub fn with(mut self, key: &str, value: impl Into<ColumnValue>) -> Self {
		self.values.insert(key.to_uppercase(), value.into());
		self
	}

	pub fn len(&self) -> usize {
		self.values.len()
	}

	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}
}

impl ValueForNullProvider for ConfiguredValues {
	fn value_for(&self, entity: &DbEntity, column: &DbAttribute) -> Option<ColumnValue> {
		let qualified = format!("{}.{}", entity.fully_qualified_name(), column.name).to_uppercase();
		let plain = format!("{}.{}", entity.name, column.name).to_uppercase();
		self.values
			.get(&qualified)
			.or_else(|| self.values.get(&plain))
			.cloned()
	}
}
