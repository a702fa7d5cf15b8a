//! Relationships between tables

use serde::{Deserialize, Serialize};

/// One column pair of a relationship join.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DbJoin {
	/// Column on the relationship's source table
	pub source: String,
	/// Column on the relationship's target table
	pub target: String,
}

impl DbJoin {
	pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
		Self {
			source: source.into(),
			target: target.into(),
		}
	}

	/// The same pair seen from the other side.
	pub fn reversed(&self) -> Self {
		Self {
			source: self.target.clone(),
			target: self.source.clone(),
		}
	}

	/// Case-insensitive comparison of both column names.
	pub fn eq_ignore_case(&self, other: &DbJoin) -> bool {
		self.source.eq_ignore_ascii_case(&other.source)
			&& self.target.eq_ignore_ascii_case(&other.target)
	}
}

/// `ON DELETE` behaviour reported for a foreign key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteRule {
	Cascade,
	Restrict,
	SetNull,
	SetDefault,
	#[default]
	NoAction,
}

impl DeleteRule {
	/// Decode the `DELETE_RULE` column of exported key metadata.
	pub fn from_code(code: i16) -> Self {
		match code {
			0 => DeleteRule::Cascade,
			1 => DeleteRule::Restrict,
			2 => DeleteRule::SetNull,
			4 => DeleteRule::SetDefault,
			_ => DeleteRule::NoAction,
		}
	}

	/// Parse the textual form used by `pragma_foreign_key_list` and
	/// `information_schema`.
	pub fn parse(rule: &str) -> Self {
		match rule.trim().to_ascii_uppercase().as_str() {
			"CASCADE" => DeleteRule::Cascade,
			"RESTRICT" => DeleteRule::Restrict,
			"SET NULL" => DeleteRule::SetNull,
			"SET DEFAULT" => DeleteRule::SetDefault,
			_ => DeleteRule::NoAction,
		}
	}

	pub fn as_sql(self) -> &'static str {
		match self {
			DeleteRule::Cascade => "CASCADE",
			DeleteRule::Restrict => "RESTRICT",
			DeleteRule::SetNull => "SET NULL",
			DeleteRule::SetDefault => "SET DEFAULT",
			DeleteRule::NoAction => "NO ACTION",
		}
	}
}

/// Directional reference between two tables.
///
/// Entities are referenced by name; resolve them through the owning
/// [`DataMap`](crate::DataMap).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DbRelationship {
	pub name: String,
	pub source_entity: String,
	pub target_entity: String,
	#[serde(default)]
	pub to_many: bool,
	/// Every join targets a primary key column of the target table
	#[serde(default)]
	pub to_dependent_pk: bool,
	/// Name of the foreign key constraint this relationship was detected from
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub fk_name: Option<String>,
	#[serde(default)]
	pub delete_rule: DeleteRule,
	#[serde(default)]
	pub joins: Vec<DbJoin>,
}

impl DbRelationship {
	pub fn new(
		name: impl Into<String>,
		source_entity: impl Into<String>,
		target_entity: impl Into<String>,
	) -> Self {
		Self {
			name: name.into(),
			source_entity: source_entity.into(),
			target_entity: target_entity.into(),
			to_many: false,
			to_dependent_pk: false,
			fk_name: None,
			delete_rule: DeleteRule::NoAction,
			joins: Vec::new(),
		}
	}

	pub fn to_many(mut self, to_many: bool) -> Self {
		self.to_many = to_many;
		self
	}

	pub fn join(mut self, source: impl Into<String>, target: impl Into<String>) -> Self {
		self.joins.push(DbJoin::new(source, target));
		self
	}

	pub fn fk_name(mut self, fk_name: impl Into<String>) -> Self {
		self.fk_name = Some(fk_name.into());
		self
	}

	pub fn add_join(&mut self, join: DbJoin) {
		self.joins.push(join);
	}

	/// Source-side column names, in join order.
	pub fn source_columns(&self) -> impl Iterator<Item = &str> {
		self.joins.iter().map(|j| j.source.as_str())
	}

	/// Target-side column names, in join order.
	pub fn target_columns(&self) -> impl Iterator<Item = &str> {
		self.joins.iter().map(|j| j.target.as_str())
	}

	/// Joins swapped source/target, as seen from the reverse relationship.
	pub fn reversed_joins(&self) -> Vec<DbJoin> {
		self.joins.iter().map(DbJoin::reversed).collect()
	}

	/// Unordered, case-insensitive comparison of the join sets.
	pub fn joins_equal_ignore_case(&self, other: &DbRelationship) -> bool {
		self.joins.len() == other.joins.len()
			&& self
				.joins
				.iter()
				.all(|j| other.joins.iter().any(|o| j.eq_ignore_case(o)))
	}

	/// Whether this relationship can be expressed as a foreign key constraint
	/// on its source table: a to-one pointing at the target's key.
	pub fn is_foreign_key(&self) -> bool {
		!self.to_many && !self.to_dependent_pk && !self.joins.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_joins_compare_unordered_and_case_insensitive() {
		let a = DbRelationship::new("a", "T1", "T2")
			.join("X", "Y")
			.join("Z", "W");
		let b = DbRelationship::new("b", "t1", "t2")
			.join("z", "w")
			.join("x", "y");
		let c = DbRelationship::new("c", "T1", "T2").join("X", "Y");

		assert!(a.joins_equal_ignore_case(&b));
		assert!(!a.joins_equal_ignore_case(&c));
	}

	#[rstest]
	#[case(0, DeleteRule::Cascade)]
	#[case(2, DeleteRule::SetNull)]
	#[case(3, DeleteRule::NoAction)]
	fn test_delete_rule_codes(#[case] code: i16, #[case] rule: DeleteRule) {
		assert_eq!(DeleteRule::from_code(code), rule);
	}

	#[rstest]
	fn test_reversed_joins_swap_sides() {
		let rel = DbRelationship::new("r", "A", "B").join("ID", "A_ID");
		assert_eq!(rel.reversed_joins(), vec![DbJoin::new("A_ID", "ID")]);
	}
}
