//! SQL dialects
//!
//! A [`Dialect`] is a plain value: quoting rules, type names, key generation
//! and a [`DdlOperations`] table with one function per schema change. Every
//! dialect starts from the [`ANSI`] table and replaces only the entries its
//! database spells differently (`ops: DdlOperations { set_not_null, ..ANSI_OPS }`).
//!
//! ```rust
//! use dbsync_map::{DbAttribute, JdbcType};
//! use dbsync_merge::dialect::{ANSI, MYSQL};
//! use dbsync_merge::quoting::TableName;
//!
//! let table = TableName::new("ARTIST");
//! let column = DbAttribute::new("NAME", JdbcType::VarChar).max_length(254);
//!
//! assert_eq!(
//!     (ANSI.ops.set_not_null)(&ANSI, &table, &column).unwrap(),
//!     vec!["ALTER TABLE ARTIST ALTER COLUMN NAME SET NOT NULL"]
//! );
//! assert_eq!(
//!     (MYSQL.ops.set_not_null)(&MYSQL, &table, &column).unwrap(),
//!     vec!["ALTER TABLE ARTIST MODIFY NAME VARCHAR(254) NOT NULL"]
//! );
//! ```
//!
//! Operations either return the statements to run, in order, or a
//! [`MergeError::Unsupported`] when the database cannot make the change
//! through DDL at all.

mod ansi;
mod derby;
mod firebird;
mod h2;
mod ingres;
mod mysql;
mod openbase;
mod oracle;
mod postgres;
mod sqlite;
mod sqlserver;

pub use ansi::{ANSI, ANSI_OPS};
pub use derby::DERBY;
pub use firebird::FIREBIRD;
pub use h2::H2;
pub use ingres::INGRES;
pub use mysql::MYSQL;
pub use openbase::OPENBASE;
pub use oracle::ORACLE;
pub use postgres::POSTGRES;
pub use sqlite::SQLITE;
pub use sqlserver::SQLSERVER;

use crate::error::{MergeError, Result};
use crate::factory::MergerTokenFactory;
use crate::quoting::{QuotingStrategy, TableName};
use crate::value::ColumnValue;
use dbsync_map::{DbAttribute, DbEntity, DbRelationship, JdbcType, Procedure};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// Hex digits of the digest appended to shortened identifiers
const DIGEST_SUFFIX: usize = 8;

/// Rendered statements of one operation.
pub type Statements = Result<Vec<String>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DialectKind {
	Ansi,
	Derby,
	Firebird,
	H2,
	Ingres,
	MySql,
	OpenBase,
	Oracle,
	Postgres,
	Sqlite,
	SqlServer,
}

/// DDL generation, one entry per schema change.
#[derive(Clone, Copy)]
pub struct DdlOperations {
	pub create_table: fn(&Dialect, &DbEntity) -> Statements,
	pub drop_table: fn(&Dialect, &DbEntity) -> Statements,
	pub add_column: fn(&Dialect, &TableName, &DbAttribute) -> Statements,
	pub drop_column: fn(&Dialect, &TableName, &DbAttribute) -> Statements,
	pub set_not_null: fn(&Dialect, &TableName, &DbAttribute) -> Statements,
	pub set_allow_null: fn(&Dialect, &TableName, &DbAttribute) -> Statements,
	/// `(table, current column, wanted column)`
	pub set_column_type: fn(&Dialect, &TableName, &DbAttribute, &DbAttribute) -> Statements,
	pub set_generated_flag: fn(&Dialect, &TableName, &DbAttribute, bool) -> Statements,
	/// `(source table, target table, relationship)`
	pub add_relationship: fn(&Dialect, &TableName, &TableName, &DbRelationship) -> Statements,
	pub drop_relationship: fn(&Dialect, &TableName, &DbRelationship) -> Statements,
	/// `(table, current key columns, wanted key columns, current constraint name)`
	pub set_primary_key: fn(&Dialect, &TableName, &[String], &[String], Option<&str>) -> Statements,
	pub set_value_for_null: fn(&Dialect, &TableName, &DbAttribute, &ColumnValue) -> Statements,
	pub drop_procedure: fn(&Dialect, &Procedure) -> Statements,
}

/// How primary key values are produced for tables without identity columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PkGenerator {
	/// Identity columns, or keys supplied by the application
	Native,
	/// One `pk_<table>` sequence per single-column key. `{name}` in the
	/// templates is replaced by the sequence name.
	Sequence {
		create: &'static str,
		drop: &'static str,
	},
}

impl PkGenerator {
	/// Sequence backing `entity`'s key, if this generator uses one.
	pub fn sequence_name(&self, dialect: &Dialect, entity: &DbEntity) -> Option<String> {
		let PkGenerator::Sequence { .. } = self else {
			return None;
		};
		let mut keys = entity.primary_keys();
		match (keys.next(), keys.next()) {
			(Some(key), None) if !key.generated => Some(dialect.truncate_identifier(&format!(
				"pk_{}",
				entity.name.to_lowercase()
			))),
			_ => None,
		}
	}

	pub fn create_statements(&self, dialect: &Dialect, entity: &DbEntity) -> Vec<String> {
		match (self, self.sequence_name(dialect, entity)) {
			(PkGenerator::Sequence { create, .. }, Some(name)) => {
				vec![create.replace("{name}", &dialect.quoting.quoted(&name))]
			}
			_ => Vec::new(),
		}
	}

	pub fn drop_statements(&self, dialect: &Dialect, entity: &DbEntity) -> Vec<String> {
		match (self, self.sequence_name(dialect, entity)) {
			(PkGenerator::Sequence { drop, .. }, Some(name)) => {
				vec![drop.replace("{name}", &dialect.quoting.quoted(&name))]
			}
			_ => Vec::new(),
		}
	}
}

/// A target database's DDL grammar and capabilities.
#[derive(Clone, Copy)]
pub struct Dialect {
	pub kind: DialectKind,
	pub name: &'static str,
	pub quoting: QuotingStrategy,
	/// Vendor type name for a portable type
	pub type_name: fn(JdbcType) -> &'static str,
	/// Type pairs this database reports interchangeably
	pub equivalent_types: &'static [(JdbcType, JdbcType)],
	pub supports_generated_keys: bool,
	/// Appended to generated columns in `CREATE TABLE`
	pub identity_clause: &'static str,
	/// Whether nullable columns are declared with an explicit `NULL`
	pub explicit_null: bool,
	/// Foreign keys are declared inside `CREATE TABLE` only
	pub inline_foreign_keys: bool,
	pub max_identifier_length: usize,
	pub pk_generator: PkGenerator,
	pub true_literal: &'static str,
	pub false_literal: &'static str,
	pub ops: DdlOperations,
}

impl Dialect {
	/// Every built-in dialect.
	pub const ALL: [&'static Dialect; 11] = [
		&ANSI, &DERBY, &FIREBIRD, &H2, &INGRES, &MYSQL, &OPENBASE, &ORACLE, &POSTGRES, &SQLITE,
		&SQLSERVER,
	];

	/// Look up a built-in dialect by name or common alias, ignoring case.
	pub fn by_name(name: &str) -> Result<&'static Dialect> {
		let normalized = name.trim().to_ascii_lowercase();
		let canonical = match normalized.as_str() {
			"" | "default" | "sql92" => "ansi",
			"mssql" | "sql_server" => "sqlserver",
			"postgresql" | "pg" => "postgres",
			"mariadb" => "mysql",
			other => other,
		};
		Self::ALL
			.into_iter()
			.find(|d| d.name == canonical)
			.ok_or_else(|| MergeError::UnknownDialect(name.to_string()))
	}

	/// Copy of this dialect with identifier quoting switched on or off.
	pub fn with_quoting(mut self, enabled: bool) -> Self {
		self.quoting.enabled = enabled;
		self
	}

	/// Token factory rendering with this dialect.
	pub fn token_factory(self) -> MergerTokenFactory {
		MergerTokenFactory::new(self)
	}

	/// Whether this database reports `a` and `b` interchangeably.
	pub fn types_equivalent(&self, a: JdbcType, b: JdbcType) -> bool {
		a == b
			|| self
				.equivalent_types
				.iter()
				.any(|&(x, y)| (x == a && y == b) || (x == b && y == a))
	}

	/// Whether changing a column from type `from` to type `to` needs DDL.
	pub fn need_update_specific_type(&self, from: JdbcType, to: JdbcType) -> bool {
		!self.types_equivalent(from, to)
	}

	/// Whether the database column `current` must be altered to match `wanted`.
	///
	/// Lengths and scales are compared only when `wanted` declares them and
	/// both sides have the same type.
	pub fn column_type_changed(&self, wanted: &DbAttribute, current: &DbAttribute) -> bool {
		if self.need_update_specific_type(current.jdbc_type, wanted.jdbc_type) {
			return true;
		}
		if wanted.jdbc_type != current.jdbc_type {
			return false;
		}
		let t = wanted.jdbc_type;
		let length_changed =
			t.supports_length() && wanted.max_length.is_some() && wanted.max_length != current.max_length;
		let scale_changed =
			wanted.get_scale().is_some() && wanted.get_scale() != current.get_scale();
		length_changed || scale_changed
	}

	/// Column type with length and scale, e.g. `VARCHAR(254)`.
	pub fn column_type(&self, column: &DbAttribute) -> String {
		let name = (self.type_name)(column.jdbc_type);
		let args = match (column.max_length, column.get_scale()) {
			(Some(length), Some(scale)) if column.jdbc_type.supports_length() => {
				format!("({length}, {scale})")
			}
			(Some(length), _) if column.jdbc_type.supports_length() => format!("({length})"),
			_ => return name.to_string(),
		};
		// CHAR(8) FOR BIT DATA
		match name.split_once(" FOR ") {
			Some((base, rest)) => format!("{base}{args} FOR {rest}"),
			None => format!("{name}{args}"),
		}
	}

	/// Column clause of `CREATE TABLE`.
	pub fn column_definition(&self, column: &DbAttribute) -> String {
		let mut definition = format!(
			"{} {}",
			self.quoting.quoted(&column.name),
			self.column_type(column)
		);
		if column.mandatory {
			definition.push_str(" NOT NULL");
		} else if self.explicit_null {
			definition.push_str(" NULL");
		}
		if column.generated && self.supports_generated_keys && !self.identity_clause.is_empty() {
			definition.push(' ');
			definition.push_str(self.identity_clause);
		}
		definition
	}

	/// Constraint name for a foreign key: the detected name, or
	/// `FK_<SOURCE>_<COLUMN>...` from the referencing columns, shortened to
	/// the identifier limit.
	pub fn fk_constraint_name(&self, relationship: &DbRelationship) -> String {
		if let Some(name) = &relationship.fk_name {
			return name.clone();
		}
		let mut parts = vec![relationship.source_entity.as_str()];
		parts.extend(relationship.source_columns());
		self.shorten_identifier(&format!("FK_{}", parts.join("_")).to_uppercase())
	}

	pub fn truncate_identifier(&self, identifier: &str) -> String {
		identifier.chars().take(self.max_identifier_length).collect()
	}

	/// `identifier` if it fits the limit, else a prefix of it followed by a
	/// digest of the whole name, so distinct long names stay distinct.
	pub fn shorten_identifier(&self, identifier: &str) -> String {
		if identifier.chars().count() <= self.max_identifier_length {
			return identifier.to_string();
		}
		let digest = format!("{:X}", Sha256::digest(identifier.as_bytes()));
		let prefix: String = identifier
			.chars()
			.take(self.max_identifier_length.saturating_sub(DIGEST_SUFFIX + 1))
			.collect();
		format!("{prefix}_{}", &digest[..DIGEST_SUFFIX])
	}

	/// Refusal for an operation this database cannot automate.
	pub fn unsupported(&self, operation: &'static str, message: impl Into<String>) -> MergeError {
		MergeError::unsupported(self.name, operation, message)
	}
}

impl fmt::Debug for Dialect {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Dialect")
			.field("name", &self.name)
			.field("quoting", &self.quoting)
			.field("supports_generated_keys", &self.supports_generated_keys)
			.finish_non_exhaustive()
	}
}

impl PartialEq for Dialect {
	fn eq(&self, other: &Self) -> bool {
		self.kind == other.kind && self.quoting == other.quoting
	}
}

impl FromStr for Dialect {
	type Err = MergeError;

	fn from_str(s: &str) -> Result<Self> {
		Dialect::by_name(s).copied()
	}
}

impl fmt::Display for Dialect {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name)
	}
}
