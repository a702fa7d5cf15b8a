//! Case-insensitive table index used while reading a database
//!
//! Databases report table names in whatever case they store them, and some
//! drivers return the same table more than once (differing case or
//! qualifiers). The index keeps the canonical, case-preserved name as the key
//! of an ordered primary map and resolves lookups through an uppercase
//! secondary map.

use crate::entity::DbEntity;
use indexmap::IndexMap;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct TableIndex {
	primary: IndexMap<String, DbEntity>,
	lookup: HashMap<String, String>,
}

impl TableIndex {
	pub fn new() -> Self {
		Self::default()
	}

	fn normalize(name: &str) -> String {
		name.to_uppercase()
	}

	/// Insert a table. A table whose name matches case-insensitively is
	/// replaced and returned.
	pub fn insert(&mut self, entity: DbEntity) -> Option<DbEntity> {
		let key = Self::normalize(&entity.name);
		let displaced = self
			.lookup
			.remove(&key)
			.and_then(|canonical| self.primary.shift_remove(&canonical));

		self.lookup.insert(key, entity.name.clone());
		self.primary.insert(entity.name.clone(), entity);
		displaced
	}

	pub fn get(&self, name: &str) -> Option<&DbEntity> {
		let canonical = self.lookup.get(&Self::normalize(name))?;
		self.primary.get(canonical)
	}

	pub fn get_mut(&mut self, name: &str) -> Option<&mut DbEntity> {
		let canonical = self.lookup.get(&Self::normalize(name))?;
		self.primary.get_mut(canonical)
	}

	/// Canonical (case-preserved) name stored for `name`.
	pub fn canonical_name(&self, name: &str) -> Option<&str> {
		self.lookup.get(&Self::normalize(name)).map(String::as_str)
	}

	pub fn remove(&mut self, name: &str) -> Option<DbEntity> {
		let canonical = self.lookup.remove(&Self::normalize(name))?;
		self.primary.shift_remove(&canonical)
	}

	pub fn contains(&self, name: &str) -> bool {
		self.lookup.contains_key(&Self::normalize(name))
	}

	pub fn len(&self) -> usize {
		self.primary.len()
	}

	pub fn is_empty(&self) -> bool {
		self.primary.is_empty()
	}

	/// Tables in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = &DbEntity> {
		self.primary.values()
	}

	pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut DbEntity> {
		self.primary.values_mut()
	}

	/// Canonical names in insertion order.
	pub fn names(&self) -> Vec<String> {
		self.primary.keys().cloned().collect()
	}

	pub fn into_entities(self) -> impl Iterator<Item = DbEntity> {
		self.primary.into_values()
	}
}
