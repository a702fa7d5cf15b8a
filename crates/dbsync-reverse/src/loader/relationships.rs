//! Relationship reconstruction from grouped foreign key rows.

use crate::delegate::DbLoaderDelegate;
use crate::exported_key::{ExportedKey, KeyData};
use crate::filters::FiltersConfig;
use crate::naming::{NameBuilder, ObjectNameGenerator};
use dbsync_map::{DbEntity, DbJoin, DbRelationship, TableIndex};
use indexmap::IndexMap;
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Builds a forward (referenced table to referencing table) and a reverse
/// relationship for every foreign key constraint and attaches them.
pub struct RelationshipReconciler<'a> {
	filters: &'a FiltersConfig,
	delegate: &'a dyn DbLoaderDelegate,
	names: &'a dyn ObjectNameGenerator,
}

fn same_scope(entity: &DbEntity, key: &KeyData) -> bool {
	fn eq(a: Option<&str>, b: Option<&str>) -> bool {
		match (a, b) {
			(Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
			(None, None) => true,
			_ => false,
		}
	}
	eq(entity.catalog.as_deref(), key.catalog.as_deref())
		&& eq(entity.schema.as_deref(), key.schema.as_deref())
}

impl<'a> RelationshipReconciler<'a> {
	pub fn new(
		filters: &'a FiltersConfig,
		delegate: &'a dyn DbLoaderDelegate,
		names: &'a dyn ObjectNameGenerator,
	) -> Self {
		Self {
			filters,
			delegate,
			names,
		}
	}

	/// Attach relationships for every constraint group. Returns the number of
	/// relationships attached.
	pub fn reconcile(
		&self,
		tables: &mut TableIndex,
		groups: &IndexMap<String, BTreeSet<ExportedKey>>,
	) -> usize {
		let mut attached = 0;
		for (label, group) in groups {
			let Some((forward, reverse)) = self.build_pair(tables, label, group) else {
				continue;
			};
			attached += usize::from(self.attach(tables, reverse));
			attached += usize::from(self.attach(tables, forward));
		}
		attached
	}

	/// Unnamed forward and reverse relationships for one constraint.
	fn build_pair(
		&self,
		tables: &TableIndex,
		label: &str,
		group: &BTreeSet<ExportedKey>,
	) -> Option<(DbRelationship, DbRelationship)> {
		let first = group.first()?;
		let Some(pk_entity) = tables.get(&first.pk.table) else {
			info!(constraint = %label, "Referenced table not loaded, skipping relationship");
			return None;
		};
		let Some(fk_entity) = tables.get(&first.fk.table) else {
			info!(constraint = %label, "Referencing table not loaded, skipping relationship");
			return None;
		};
		if !same_scope(pk_entity, &first.pk) || !same_scope(fk_entity, &first.fk) {
			info!(constraint = %label, "Relationship crosses catalog or schema, skipping");
			return None;
		}

		let mut forward = DbRelationship::new("", pk_entity.name.clone(), fk_entity.name.clone());
		let mut reverse = DbRelationship::new("", fk_entity.name.clone(), pk_entity.name.clone());
		reverse.fk_name = first.fk.name.clone();
		reverse.delete_rule = first.delete_rule;

		let mut pk_to_pk = true;
		for key in group {
			let Some(pk_attr) = pk_entity.find_attribute(&key.pk.column) else {
				info!(table = %pk_entity.name, column = %key.pk.column, "No column for declared primary key, skipping join");
				continue;
			};
			let Some(fk_attr) = fk_entity.find_attribute(&key.fk.column) else {
				info!(table = %fk_entity.name, column = %key.fk.column, "No column for declared foreign key, skipping join");
				continue;
			};
			pk_to_pk &= pk_attr.primary_key && fk_attr.primary_key;
			let join = DbJoin::new(pk_attr.name.clone(), fk_attr.name.clone());
			reverse.add_join(join.reversed());
			forward.add_join(join);
		}

		if forward.joins.is_empty() {
			info!(constraint = %label, "No joins survived, skipping relationship");
			return None;
		}

		let fk_pk_count = fk_entity.primary_keys().count();
		forward.to_dependent_pk = pk_to_pk;
		forward.to_many = !(pk_to_pk && forward.joins.len() == fk_pk_count);
		reverse.to_many = false;

		Some((forward, reverse))
	}

	/// Name, filter and offer `relationship` to the delegate, then attach it
	/// to its source table.
	fn attach(&self, tables: &mut TableIndex, mut relationship: DbRelationship) -> bool {
		let Some(entity) = tables.get(&relationship.source_entity) else {
			return false;
		};
		relationship.name = NameBuilder::new(entity)
			.base_name(self.names.relationship_name(&relationship))
			.name();

		if let Some(filter) = self
			.filters
			.table_filter(entity.catalog.as_deref(), entity.schema.as_deref())
		{
			let Some(include) = filter.include_table(&entity.name) else {
				debug!(table = %entity.name, relationship = %relationship.name, "Table excluded, dropping relationship");
				return false;
			};
			if !include.relationships.is_included(&relationship.name) {
				debug!(table = %entity.name, relationship = %relationship.name, "Relationship excluded by filters");
				return false;
			}
			relationship
				.joins
				.retain(|j| include.columns.is_included(&j.source));
			if relationship.joins.is_empty() {
				return false;
			}
		}

		if !self.delegate.db_relationship_loaded(entity, &relationship) {
			debug!(table = %entity.name, relationship = %relationship.name, "Relationship rejected by delegate");
			return false;
		}

		let source = relationship.source_entity.clone();
		match tables.get_mut(&source) {
			Some(entity) => {
				entity.add_relationship(relationship);
				true
			}
			None => false,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::delegate::LoggingDelegate;
	use crate::exported_key::group_exported_keys;
	use crate::metadata::ExportedKeyRow;
	use crate::naming::DefaultObjectNameGenerator;
	use dbsync_map::{DbAttribute, JdbcType};
	use proptest::prelude::*;
	use rstest::{fixture, rstest};

	fn key(pk: (&str, &str), fk: (&str, &str), seq: i16) -> ExportedKey {
		ExportedKey::from_row(ExportedKeyRow::new(pk.0, pk.1, fk.0, fk.1, seq))
	}

	fn reconcile(tables: &mut TableIndex, keys: Vec<ExportedKey>) -> usize {
		let filters = FiltersConfig::default();
		let reconciler = RelationshipReconciler::new(&filters, &LoggingDelegate, &DefaultObjectNameGenerator);
		reconciler.reconcile(tables, &group_exported_keys(keys))
	}

	#[fixture]
	fn customer_orders() -> TableIndex {
		let mut tables = TableIndex::new();
		tables.insert(DbEntity::new("CUSTOMER").attribute(DbAttribute::new("ID", JdbcType::Integer).primary_key()));
		tables.insert(
			DbEntity::new("ORDER")
				.attribute(DbAttribute::new("ID", JdbcType::Integer).primary_key())
				.attribute(DbAttribute::new("CUSTOMER_ID", JdbcType::Integer)),
		);
		tables
	}

	#[fixture]
	fn composite_tables() -> TableIndex {
		let mut tables = TableIndex::new();
		tables.insert(
			DbEntity::new("ORDER_HEADER")
				.attribute(DbAttribute::new("ORDER_NO", JdbcType::Integer).primary_key())
				.attribute(DbAttribute::new("REGION", JdbcType::Char).primary_key()),
		);
		tables.insert(
			DbEntity::new("ORDER_SUMMARY")
				.attribute(DbAttribute::new("ORDER_NO", JdbcType::Integer).primary_key())
				.attribute(DbAttribute::new("REGION", JdbcType::Char).primary_key()),
		);
		tables
	}

	#[rstest]
	fn test_simple_one_column_fk(mut customer_orders: TableIndex) {
		// Arrange
		let keys = vec![key(("CUSTOMER", "ID"), ("ORDER", "CUSTOMER_ID"), 0)];

		// Act
		let attached = reconcile(&mut customer_orders, keys);

		// Assert
		assert_eq!(attached, 2);
		let forward = customer_orders.get("CUSTOMER").unwrap().get_relationship("orders").unwrap();
		assert_eq!(forward.target_entity, "ORDER");
		assert!(forward.to_many);
		assert_eq!(forward.joins, vec![DbJoin::new("ID", "CUSTOMER_ID")]);
		assert!(!forward.is_foreign_key());

		let reverse = customer_orders.get("ORDER").unwrap().get_relationship("customer").unwrap();
		assert_eq!(reverse.target_entity, "CUSTOMER");
		assert!(!reverse.to_many);
		assert!(reverse.is_foreign_key());
	}

	#[rstest]
	fn test_composite_pk_fk_is_to_one(mut composite_tables: TableIndex) {
		let keys = vec![
			key(("ORDER_HEADER", "ORDER_NO"), ("ORDER_SUMMARY", "ORDER_NO"), 1),
			key(("ORDER_HEADER", "REGION"), ("ORDER_SUMMARY", "REGION"), 2),
		];

		reconcile(&mut composite_tables, keys);

		let forward = composite_tables
			.get("ORDER_HEADER")
			.unwrap()
			.get_relationship("orderSummary")
			.unwrap();
		assert!(!forward.to_many);
		assert!(forward.to_dependent_pk);
		assert_eq!(forward.joins.len(), 2);
	}

	#[rstest]
	fn test_composite_join_completeness(mut composite_tables: TableIndex) {
		let keys = vec![
			key(("ORDER_HEADER", "ORDER_NO"), ("ORDER_SUMMARY", "ORDER_NO"), 1),
			key(("ORDER_HEADER", "REGION"), ("ORDER_SUMMARY", "REGION"), 2),
		];

		reconcile(&mut composite_tables, keys);

		let forward = composite_tables.get("ORDER_HEADER").unwrap().relationships().next().unwrap().clone();
		let reverse = composite_tables.get("ORDER_SUMMARY").unwrap().relationships().next().unwrap().clone();
		assert_eq!(forward.reversed_joins(), reverse.joins);
	}

	#[rstest]
	fn test_two_roles_between_same_tables(mut customer_orders: TableIndex) {
		customer_orders
			.get_mut("ORDER")
			.unwrap()
			.add_attribute(DbAttribute::new("BILL_TO_ID", JdbcType::Integer));
		let keys = vec![
			key(("CUSTOMER", "ID"), ("ORDER", "CUSTOMER_ID"), 1),
			key(("CUSTOMER", "ID"), ("ORDER", "BILL_TO_ID"), 1),
		];

		reconcile(&mut customer_orders, keys);

		let customer = customer_orders.get("CUSTOMER").unwrap();
		let order = customer_orders.get("ORDER").unwrap();
		assert_eq!(customer.relationships().count(), 2);
		assert!(customer.get_relationship("orders1").is_some());
		assert!(order.get_relationship("customer").is_some());
		assert!(order.get_relationship("billTo").is_some());
	}

	#[rstest]
	fn test_dangling_column_skips_join(mut customer_orders: TableIndex) {
		let keys = vec![key(("CUSTOMER", "ID"), ("ORDER", "MISSING_ID"), 1)];

		let attached = reconcile(&mut customer_orders, keys);

		assert_eq!(attached, 0);
		assert_eq!(customer_orders.get("CUSTOMER").unwrap().relationships().count(), 0);
	}

	#[rstest]
	fn test_missing_table_is_skipped(mut customer_orders: TableIndex) {
		let keys = vec![key(("CUSTOMER", "ID"), ("INVOICE", "CUSTOMER_ID"), 1)];
		assert_eq!(reconcile(&mut customer_orders, keys), 0);
	}

	#[rstest]
	fn test_reconcile_is_idempotent(customer_orders: TableIndex) {
		let keys = vec![key(("CUSTOMER", "ID"), ("ORDER", "CUSTOMER_ID"), 1)];
		let mut first = customer_orders.clone();
		let mut second = customer_orders;

		reconcile(&mut first, keys.clone());
		reconcile(&mut second, keys);

		let a: Vec<_> = first.iter().flat_map(|e| e.relationships().cloned()).collect();
		let b: Vec<_> = second.iter().flat_map(|e| e.relationships().cloned()).collect();
		assert_eq!(a, b);
	}

	#[rstest]
	fn test_self_reference_gets_distinct_names() {
		let mut tables = TableIndex::new();
		tables.insert(
			DbEntity::new("EMPLOYEE")
				.attribute(DbAttribute::new("ID", JdbcType::Integer).primary_key())
				.attribute(DbAttribute::new("EMPLOYEE_ID", JdbcType::Integer)),
		);
		let keys = vec![key(("EMPLOYEE", "ID"), ("EMPLOYEE", "EMPLOYEE_ID"), 1)];

		reconcile(&mut tables, keys);

		let names: Vec<_> = tables
			.get("EMPLOYEE")
			.unwrap()
			.relationships()
			.map(|r| r.name.clone())
			.collect();
		assert_eq!(names, vec!["employee", "employees"]);
	}

	proptest! {
		#[rstest]
		fn prop_cardinality_invariant(
			pk_flags in proptest::collection::vec(any::<bool>(), 1..4),
			fk_pk_flags in proptest::collection::vec(any::<bool>(), 1..4),
		) {
			let width = pk_flags.len().min(fk_pk_flags.len());
			let mut parent = DbEntity::new("PARENT");
			let mut child = DbEntity::new("CHILD");
			let mut keys = Vec::new();
			for i in 0..width {
				let mut pk_attr = DbAttribute::new(format!("P{}", i), JdbcType::Integer);
				pk_attr.primary_key = pk_flags[i];
				let mut fk_attr = DbAttribute::new(format!("C{}", i), JdbcType::Integer);
				fk_attr.primary_key = fk_pk_flags[i];
				parent.add_attribute(pk_attr);
				child.add_attribute(fk_attr);
				keys.push(key(("PARENT", &format!("P{}", i)), ("CHILD", &format!("C{}", i)), i as i16 + 1));
			}
			for extra in width..fk_pk_flags.len() {
				if fk_pk_flags[extra] {
					child.add_attribute(DbAttribute::new(format!("X{}", extra), JdbcType::Integer).primary_key());
				}
			}
			let mut tables = TableIndex::new();
			tables.insert(parent);
			tables.insert(child);

			reconcile(&mut tables, keys);

			let parent = tables.get("PARENT").unwrap();
			let child = tables.get("CHILD").unwrap();
			let forward = parent.relationships().next().unwrap();
			let all_pk_pairs = forward.joins.iter().all(|j| {
				parent.get_attribute(&j.source).unwrap().primary_key
					&& child.get_attribute(&j.target).unwrap().primary_key
			});
			let expected_to_one = all_pk_pairs && forward.joins.len() == child.primary_keys().count();
			prop_assert_eq!(!forward.to_many, expected_to_one);
		}
	}
}
