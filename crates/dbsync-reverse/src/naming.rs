//! Relationship naming for reverse engineered schemas.
//!
//! Names are camelCase: a to-one relationship over a single `*_ID` column is
//! named after the column (`ARTIST_ID` -> `artist`), other to-one
//! relationships after their target table, and to-many relationships after
//! the pluralized target table (`PAINTING` -> `paintings`).

use dbsync_map::{DbEntity, DbRelationship};

/// Produces base names for relationships created by the loader.
pub trait ObjectNameGenerator: Send + Sync {
	/// Base name for `relationship`, before collision handling.
	fn relationship_name(&self, relationship: &DbRelationship) -> String;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultObjectNameGenerator;

impl ObjectNameGenerator for DefaultObjectNameGenerator {
	fn relationship_name(&self, relationship: &DbRelationship) -> String {
		if relationship.to_many {
			return pluralize(&to_camel_case(&relationship.target_entity));
		}

		if !relationship.to_dependent_pk
			&& let [join] = relationship.joins.as_slice()
			&& let Some(stem) = strip_id_suffix(&join.source)
		{
			return to_camel_case(stem);
		}

		to_camel_case(&relationship.target_entity)
	}
}

fn strip_id_suffix(column: &str) -> Option<&str> {
	let upper = column.to_ascii_uppercase();
	if upper.len() > 3 && upper.ends_with("_ID") {
		Some(&column[..column.len() - 3])
	} else {
		None
	}
}

/// Convert a database name to camelCase.
///
/// # Examples
///
/// ```rust
/// use dbsync_reverse::naming::to_camel_case;
///
/// assert_eq!(to_camel_case("ORDER_LINE"), "orderLine");
/// assert_eq!(to_camel_case("artist"), "artist");
/// assert_eq!(to_camel_case("OrderLine"), "orderLine");
/// ```
pub fn to_camel_case(s: &str) -> String {
	let pascal = to_pascal_case(s);
	let mut chars = pascal.chars();
	match chars.next() {
		Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
		None => String::new(),
	}
}

fn to_pascal_case(s: &str) -> String {
	let mut result = String::with_capacity(s.len());
	let mut capitalize_next = true;
	let mut prev_was_upper = false;

	for ch in s.chars() {
		if ch == '_' || ch == '-' || ch == ' ' {
			capitalize_next = true;
			prev_was_upper = false;
		} else if ch.is_ascii_uppercase() {
			if prev_was_upper && !capitalize_next {
				result.push(ch.to_ascii_lowercase());
			} else {
				result.push(ch);
			}
			capitalize_next = false;
			prev_was_upper = true;
		} else if capitalize_next {
			result.push(ch.to_ascii_uppercase());
			capitalize_next = false;
			prev_was_upper = false;
		} else {
			result.push(ch);
			prev_was_upper = false;
		}
	}

	result
}

/// English plural of a camelCase word.
pub fn pluralize(word: &str) -> String {
	let lower = word.to_ascii_lowercase();
	if lower.ends_with('y')
		&& !lower.ends_with("ay")
		&& !lower.ends_with("ey")
		&& !lower.ends_with("oy")
		&& !lower.ends_with("uy")
	{
		format!("{}ies", &word[..word.len() - 1])
	} else if ["s", "x", "z", "ch", "sh"].iter().any(|s| lower.ends_with(s)) {
		format!("{}es", word)
	} else {
		format!("{}s", word)
	}
}

/// Picks a property name not yet used on an entity by appending a counter.
///
/// ```rust
/// use dbsync_map::{DbAttribute, DbEntity, JdbcType};
/// use dbsync_reverse::naming::NameBuilder;
///
/// let entity = DbEntity::new("ARTIST").attribute(DbAttribute::new("paintings", JdbcType::Integer));
/// assert_eq!(NameBuilder::new(&entity).base_name("paintings").name(), "paintings1");
/// ```
pub struct NameBuilder<'a> {
	entity: &'a DbEntity,
	base_name: String,
}

impl<'a> NameBuilder<'a> {
	pub fn new(entity: &'a DbEntity) -> Self {
		Self {
			entity,
			base_name: String::new(),
		}
	}

	pub fn base_name(mut self, base_name: impl Into<String>) -> Self {
		self.base_name = base_name.into();
		self
	}

	pub fn name(&self) -> String {
		if !self.entity.has_property(&self.base_name) {
			return self.base_name.clone();
		}
		(1..)
			.map(|i| format!("{}{}", self.base_name, i))
			.find(|candidate| !self.entity.has_property(candidate))
			.unwrap_or_default()
	}
}
