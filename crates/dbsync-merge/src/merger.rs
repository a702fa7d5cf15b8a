//! Model versus database comparison
//!
//! [`DbMerger`] walks a model [`DataMap`] and a map loaded from the database
//! and produces the tokens that make the database match the model. Database
//! relationships the model cannot express as a foreign key (to-many and
//! dependent key sides) are returned as to-model tokens instead.
//!
//! Names are compared ignoring case on both sides. Views are never compared.

use crate::factory::MergerTokenFactory;
use crate::token::MergerToken;
use crate::value_for_null::{NoValueForNull, ValueForNullProvider};
use dbsync_map::{DataMap, DbAttribute, DbEntity, DbRelationship, Procedure, TableType};
use dbsync_reverse::FiltersConfig;
use std::collections::BTreeSet;
use tracing::{debug, info};

pub struct DbMerger {
	factory: MergerTokenFactory,
	filters: FiltersConfig,
	skip_relationships_tokens: bool,
	skip_pk_tokens: bool,
	value_for_null: Box<dyn ValueForNullProvider>,
}

impl DbMerger {
	pub fn new(factory: MergerTokenFactory) -> Self {
		Self {
			factory,
			filters: FiltersConfig::default(),
			skip_relationships_tokens: false,
			skip_pk_tokens: false,
			value_for_null: Box::new(NoValueForNull),
		}
	}

	/// Only compare tables, columns, relationships and procedures admitted by
	/// `filters`.
	pub fn with_filters(mut self, filters: FiltersConfig) -> Self {
		self.filters = filters;
		self
	}

	pub fn skip_relationships_tokens(mut self, skip: bool) -> Self {
		self.skip_relationships_tokens = skip;
		self
	}

	pub fn skip_pk_tokens(mut self, skip: bool) -> Self {
		self.skip_pk_tokens = skip;
		self
	}

	pub fn with_value_for_null(mut self, provider: impl ValueForNullProvider + 'static) -> Self {
		self.value_for_null = Box::new(provider);
		self
	}

	pub fn factory(&self) -> &MergerTokenFactory {
		&self.factory
	}

	fn table_included(&self, entity: &DbEntity) -> bool {
		entity.table_type != TableType::View
			&& self
				.filters
				.table_filter(entity.catalog.as_deref(), entity.schema.as_deref())
				.is_some_and(|f| f.is_included(&entity.name))
	}

	fn column_included(&self, entity: &DbEntity, column: &DbAttribute) -> bool {
		self.filters
			.table_filter(entity.catalog.as_deref(), entity.schema.as_deref())
			.is_some_and(|f| f.is_column_included(&entity.name, &column.name))
	}

	fn relationship_included(&self, entity: &DbEntity, relationship: &DbRelationship) -> bool {
		self.filters
			.table_filter(entity.catalog.as_deref(), entity.schema.as_deref())
			.is_some_and(|f| f.is_relationship_included(&entity.name, &relationship.name))
	}

	fn procedure_included(&self, procedure: &Procedure) -> bool {
		self.filters
			.procedure_filter(procedure.catalog.as_deref(), procedure.schema.as_deref())
			.is_some_and(|f| f.is_included(&procedure.name))
	}

	/// Tokens turning `db` into `model`, ordered by
	/// [`sort_weight`](MergerToken::sort_weight).
	pub fn create_merge_tokens(&self, model: &DataMap, db: &DataMap) -> Vec<MergerToken> {
		let mut tokens = Vec::new();

		for entity in model.entities().filter(|e| self.table_included(e)) {
			match db.find_entity(&entity.name) {
				Some(current) => self.compare_tables(entity, current, &mut tokens),
				None => {
					tokens.push(self.factory.create_create_table_to_db(entity));
					// Inline foreign keys are part of CREATE TABLE
					if !self.skip_relationships_tokens
						&& !self.factory.dialect().inline_foreign_keys
					{
						for relationship in entity.relationships() {
							if relationship.is_foreign_key()
								&& self.relationship_included(entity, relationship)
							{
								tokens.push(
									self.factory.create_add_relationship_to_db(entity, relationship),
								);
							}
						}
					}
				}
			}
		}

		for current in db.entities().filter(|e| self.table_included(e)) {
			if model.find_entity(&current.name).is_none() {
				tokens.push(self.factory.create_drop_table_to_db(current));
			}
		}

		if self.filters.loads_procedures() {
			self.compare_procedures(model, db, &mut tokens);
		}

		tokens.sort_by_key(MergerToken::sort_weight);
		for token in &tokens {
			debug!(token = %token, "merge token");
		}
		info!(
			tokens = tokens.len(),
			model = %model.name,
			"compared model with database"
		);
		tokens
	}

	fn compare_tables(&self, model: &DbEntity, db: &DbEntity, tokens: &mut Vec<MergerToken>) {
		self.compare_columns(model, db, tokens);
		if !self.skip_pk_tokens {
			self.compare_primary_keys(model, db, tokens);
		}
		if !self.skip_relationships_tokens {
			self.compare_relationships(model, db, tokens);
		}
	}

	fn compare_columns(&self, model: &DbEntity, db: &DbEntity, tokens: &mut Vec<MergerToken>) {
		let dialect = self.factory.dialect();

		for column in model.attributes().filter(|c| self.column_included(model, c)) {
			let Some(current) = db.find_attribute(&column.name) else {
				tokens.push(self.factory.create_add_column_to_db(model, column));
				if column.mandatory {
					self.push_set_not_null(model, column, tokens);
				}
				continue;
			};

			if dialect.column_type_changed(column, current) {
				tokens.push(self.factory.create_set_column_type_to_db(model, current, column));
			}
			match (column.mandatory, current.mandatory) {
				(true, false) => self.push_set_not_null(model, column, tokens),
				(false, true) => tokens.push(self.factory.create_set_allow_null_to_db(model, column)),
				_ => {}
			}
			if column.generated != current.generated {
				tokens.push(self.factory.create_set_generated_flag_to_db(
					model,
					column,
					column.generated,
				));
			}
		}

		for current in db.attributes().filter(|c| self.column_included(db, c)) {
			if model.find_attribute(&current.name).is_none() {
				tokens.push(self.factory.create_drop_column_to_db(db, current));
			}
		}
	}

	fn push_set_not_null(
		&self,
		entity: &DbEntity,
		column: &DbAttribute,
		tokens: &mut Vec<MergerToken>,
	) {
		if let Some(value) = self.value_for_null.value_for(entity, column) {
			tokens.push(self.factory.create_set_value_for_null_to_db(entity, column, value));
		}
		tokens.push(self.factory.create_set_not_null_to_db(entity, column));
	}

	fn compare_primary_keys(
		&self,
		model: &DbEntity,
		db: &DbEntity,
		tokens: &mut Vec<MergerToken>,
	) {
		let upper = |names: &[String]| -> BTreeSet<String> {
			names.iter().map(|n| n.to_uppercase()).collect()
		};
		let wanted = model.primary_key_names();
		let current = db.primary_key_names();
		if upper(&wanted) != upper(&current) {
			tokens.push(self.factory.create_set_primary_key_to_db(db, &current, &wanted));
		}
	}

	fn compare_relationships(
		&self,
		model: &DbEntity,
		db: &DbEntity,
		tokens: &mut Vec<MergerToken>,
	) {
		let matching = |relationship: &DbRelationship, other: &DbEntity| {
			other.relationships().any(|r| {
				r.target_entity.eq_ignore_ascii_case(&relationship.target_entity)
					&& r.joins_equal_ignore_case(relationship)
			})
		};

		for relationship in model.relationships() {
			if relationship.is_foreign_key()
				&& self.relationship_included(model, relationship)
				&& !matching(relationship, db)
			{
				tokens.push(self.factory.create_add_relationship_to_db(model, relationship));
			}
		}

		for relationship in db.relationships() {
			if !self.relationship_included(db, relationship) || matching(relationship, model) {
				continue;
			}
			if relationship.is_foreign_key() {
				tokens.push(self.factory.create_drop_relationship_to_db(db, relationship));
			} else {
				// No DDL removes the reverse side of a key; keep it in the model
				tokens.push(
					self.factory
						.create_drop_relationship_to_db(model, relationship)
						.create_reverse(),
				);
			}
		}
	}

	fn compare_procedures(&self, model: &DataMap, db: &DataMap, tokens: &mut Vec<MergerToken>) {
		let find = |map: &DataMap, procedure: &Procedure| {
			let name = procedure.fully_qualified_name();
			map.procedures()
				.any(|p| p.fully_qualified_name().eq_ignore_ascii_case(&name))
		};

		for procedure in db.procedures().filter(|p| self.procedure_included(p)) {
			if !find(model, procedure) {
				tokens.push(self.factory.create_add_procedure_to_model(procedure));
			}
		}
		for procedure in model.procedures().filter(|p| self.procedure_included(p)) {
			if !find(db, procedure) {
				tokens.push(self.factory.create_drop_procedure_to_model(procedure));
			}
		}
	}
}
