//! Foreign key column pairs and their grouping into constraints.

use crate::metadata::ExportedKeyRow;
use dbsync_map::{DeleteRule, qualified_name};
use indexmap::IndexMap;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

/// One side of an [`ExportedKey`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyData {
	pub catalog: Option<String>,
	pub schema: Option<String>,
	pub table: String,
	pub column: String,
	/// Constraint name, when the driver reports one
	pub name: Option<String>,
}

impl KeyData {
	/// Case-insensitive identity of the table this side belongs to.
	pub fn table_id(&self) -> String {
		qualified_name(self.catalog.as_deref(), self.schema.as_deref(), &self.table).to_uppercase()
	}

	fn sort_key(&self) -> (&str, &str, Option<&str>) {
		(&self.table, &self.column, self.name.as_deref())
	}
}

/// One (primary key column, foreign key column) pair of a foreign key.
///
/// Keys order by their primary key side, then their foreign key side, then
/// their position within the constraint.
#[derive(Debug, Clone)]
pub struct ExportedKey {
	pub pk: KeyData,
	pub fk: KeyData,
	pub key_seq: i16,
	pub delete_rule: DeleteRule,
}

impl ExportedKey {
	pub fn from_row(row: ExportedKeyRow) -> Self {
		Self {
			pk: KeyData {
				catalog: row.pk_catalog,
				schema: row.pk_schema,
				table: row.pk_table,
				column: row.pk_column,
				name: row.pk_name,
			},
			fk: KeyData {
				catalog: row.fk_catalog,
				schema: row.fk_schema,
				table: row.fk_table,
				column: row.fk_column,
				name: row.fk_name,
			},
			key_seq: row.key_seq,
			delete_rule: DeleteRule::from_code(row.delete_rule),
		}
	}
}

impl PartialEq for ExportedKey {
	fn eq(&self, other: &Self) -> bool {
		self.cmp(other) == Ordering::Equal
	}
}

impl Eq for ExportedKey {}

impl PartialOrd for ExportedKey {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for ExportedKey {
	fn cmp(&self, other: &Self) -> Ordering {
		self.pk
			.sort_key()
			.cmp(&other.pk.sort_key())
			.then_with(|| self.fk.sort_key().cmp(&other.fk.sort_key()))
			.then_with(|| self.key_seq.cmp(&other.key_seq))
	}
}

/// Group key pairs into foreign key constraints, in first-seen order.
///
/// Named constraints group by (referenced table, referencing table, name).
/// Unnamed ones group by table pair: the n-th row carrying a given key
/// sequence belongs to the n-th constraint, whether the rows of different
/// constraints arrive one after the other or interleaved. The returned map is keyed by a
/// readable constraint label.
pub fn group_exported_keys<I>(keys: I) -> IndexMap<String, BTreeSet<ExportedKey>>
where
	I: IntoIterator<Item = ExportedKey>,
{
	let mut constraint_ids: IndexMap<String, BTreeSet<ExportedKey>> = IndexMap::new();
	// Per table pair: how often each key sequence was seen so far
	let mut unnamed: HashMap<String, HashMap<i16, usize>> = HashMap::new();

	for key in keys {
		let pair = format!("{} <- {}", key.pk.table_id(), key.fk.table_id());
		let id = match &key.fk.name {
			Some(name) => format!("{} [{}]", pair, name.to_uppercase()),
			None => {
				let seen = unnamed
					.entry(pair.clone())
					.or_default()
					.entry(key.key_seq)
					.or_insert(0);
				let ordinal = *seen;
				*seen += 1;
				format!("{} #{}", pair, ordinal)
			}
		};
		constraint_ids.entry(id).or_default().insert(key);
	}

	constraint_ids
		.into_values()
		.map(|group| (constraint_label(&group), group))
		.collect()
}

/// `PK_TABLE.(A, B) <- FK_TABLE.(X, Y)` plus the constraint name if known.
fn constraint_label(group: &BTreeSet<ExportedKey>) -> String {
	let Some(first) = group.first() else {
		return String::new();
	};
	let pk_columns: Vec<&str> = group.iter().map(|k| k.pk.column.as_str()).collect();
	let fk_columns: Vec<&str> = group.iter().map(|k| k.fk.column.as_str()).collect();
	let mut label = format!(
		"{}.({}) <- {}.({})",
		first.pk.table,
		pk_columns.join(", "),
		first.fk.table,
		fk_columns.join(", ")
	);
	if let Some(name) = &first.fk.name {
		label.push_str(&format!(" [{}]", name));
	}
	label
}
