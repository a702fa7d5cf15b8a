//! Loader pipeline tests over an in-memory metadata source.

use dbsync_map::{DbEntity, DbRelationship, JdbcType, ParameterDirection, TableType};
use dbsync_reverse::metadata::{
	ColumnRow, ExportedKeyRow, ProcedureColumnKind, ProcedureColumnRow, ProcedureKind, ProcedureRow,
	TableRow, WILDCARD,
};
use dbsync_reverse::{
	DbLoader, DbLoaderDelegate, LoadError, LoadStep, LoaderConfiguration, MetadataOperation,
	ReverseEngineeringConfig, StaticMetadata,
};
use parking_lot::Mutex;
use rstest::{fixture, rstest};
use std::sync::Arc;

fn column(table: &str, name: &str, jdbc_type: JdbcType, nullable: bool) -> ColumnRow {
	let mut row = ColumnRow::new(table, name, jdbc_type.code());
	row.nullable = nullable;
	row
}

#[fixture]
fn gallery() -> StaticMetadata {
	let mut name = column("ARTIST", "NAME", JdbcType::VarChar, false);
	name.column_size = Some(254);
	let mut price = column("PAINTING", "PRICE", JdbcType::Decimal, true);
	price.column_size = Some(10);
	price.decimal_digits = Some(2);

	StaticMetadata::new()
		.table(TableRow::new("ARTIST"))
		.table(TableRow::new("PAINTING"))
		.column(column("ARTIST", "ARTIST_ID", JdbcType::BigInt, false))
		.column(name)
		.column(column("PAINTING", "PAINTING_ID", JdbcType::Integer, false))
		.column(column("PAINTING", "ARTIST_ID", JdbcType::BigInt, true))
		.column(price)
		.primary_key("ARTIST", "ARTIST_ID")
		.primary_key("PAINTING", "PAINTING_ID")
		.exported_key(ExportedKeyRow::new("ARTIST", "ARTIST_ID", "PAINTING", "ARTIST_ID", 1).fk_name("FK_PAINTING_ARTIST"))
}

#[rstest]
#[tokio::test]
async fn test_load_builds_tables_columns_and_relationships(gallery: StaticMetadata) {
	// Arrange
	let loader = DbLoader::new(&gallery);

	// Act
	let map = loader
		.load("gallery", &LoaderConfiguration::default())
		.await
		.unwrap();

	// Assert
	assert_eq!(map.entity_count(), 2);
	let artist = map.get_entity("ARTIST").unwrap();
	assert_eq!(artist.primary_key_names(), vec!["ARTIST_ID"]);
	let name = artist.get_attribute("NAME").unwrap();
	assert!(name.mandatory);
	assert_eq!(name.max_length, Some(254));

	let painting = map.get_entity("PAINTING").unwrap();
	assert_eq!(painting.get_attribute("PRICE").unwrap().get_scale(), Some(2));
	let to_artist = painting.get_relationship("artist").unwrap();
	assert!(to_artist.is_foreign_key());
	assert_eq!(to_artist.fk_name.as_deref(), Some("FK_PAINTING_ARTIST"));
	assert!(artist.get_relationship("paintings").unwrap().to_many);
}

#[rstest]
#[tokio::test]
async fn test_bulk_column_failure_falls_back_per_table(gallery: StaticMetadata) {
	// Arrange
	let source = gallery.fail(MetadataOperation::Columns, Some(WILDCARD));

	// Act
	let (map, report) = DbLoader::new(&source)
		.load_with_report("gallery", &LoaderConfiguration::default())
		.await
		.unwrap();

	// Assert
	assert_eq!(map.get_entity("ARTIST").unwrap().attribute_count(), 2);
	assert_eq!(map.get_entity("PAINTING").unwrap().attribute_count(), 3);
	assert_eq!(report.recoveries.len(), 1);
	assert_eq!(report.recoveries[0].step, LoadStep::Attributes);
	let calls = source.calls();
	assert!(calls.contains(&"Columns(ARTIST)".to_string()));
	assert!(calls.contains(&"Columns(PAINTING)".to_string()));
}

#[rstest]
#[tokio::test]
async fn test_table_omitted_from_bulk_read_is_loaded_individually(gallery: StaticMetadata) {
	let source = gallery.hide_from_bulk_columns("PAINTING");

	let (map, report) = DbLoader::new(&source)
		.load_with_report("gallery", &LoaderConfiguration::default())
		.await
		.unwrap();

	assert!(report.is_clean());
	assert_eq!(map.get_entity("PAINTING").unwrap().attribute_count(), 3);
	assert!(!source.calls().contains(&"Columns(ARTIST)".to_string()));
}

#[rstest]
#[tokio::test]
async fn test_dangling_primary_key_is_skipped(gallery: StaticMetadata) {
	let source = gallery.primary_key("ARTIST", "NOT_A_COLUMN");

	let map = DbLoader::new(&source)
		.load("gallery", &LoaderConfiguration::default())
		.await
		.unwrap();

	assert_eq!(map.get_entity("ARTIST").unwrap().primary_key_names(), vec!["ARTIST_ID"]);
}

#[rstest]
#[tokio::test]
async fn test_exported_key_failure_is_recovered(gallery: StaticMetadata) {
	let source = gallery.fail(MetadataOperation::ExportedKeys, Some("ARTIST"));

	let (map, report) = DbLoader::new(&source)
		.load_with_report("gallery", &LoaderConfiguration::default())
		.await
		.unwrap();

	assert_eq!(map.get_entity("ARTIST").unwrap().relationships().count(), 0);
	assert_eq!(report.recoveries[0].step, LoadStep::ExportedKeys);
	assert_eq!(report.recoveries[0].scope, "ARTIST");
}

#[rstest]
#[tokio::test]
async fn test_connection_failure_aborts_load(gallery: StaticMetadata) {
	let source = gallery.fail_connection(MetadataOperation::PrimaryKeys);

	let err = DbLoader::new(&source)
		.load("gallery", &LoaderConfiguration::default())
		.await
		.unwrap_err();

	assert!(matches!(err, LoadError::Metadata { step: "primary keys", .. }));
}

#[rstest]
#[tokio::test]
async fn test_table_read_failure_is_fatal(gallery: StaticMetadata) {
	let source = gallery.fail(MetadataOperation::Tables, None);

	let result = DbLoader::new(&source)
		.load("gallery", &LoaderConfiguration::default())
		.await;

	assert!(matches!(result, Err(LoadError::Metadata { step: "tables", .. })));
}

#[rstest]
#[tokio::test]
async fn test_skip_flags(gallery: StaticMetadata) {
	let config = LoaderConfiguration::default()
		.skip_primary_keys()
		.skip_relationships();

	let map = DbLoader::new(&gallery).load("gallery", &config).await.unwrap();

	let artist = map.get_entity("ARTIST").unwrap();
	assert!(artist.primary_key_names().is_empty());
	assert_eq!(artist.relationships().count(), 0);
	assert!(!gallery.calls().iter().any(|c| c.starts_with("ExportedKeys")));
}

#[rstest]
#[tokio::test]
async fn test_filters_exclude_tables_and_columns(gallery: StaticMetadata) {
	let config = ReverseEngineeringConfig::from_toml(
		r#"
[tables]
exclude = ["PAINT.*"]

[tables.columns]
exclude = ["NAME"]
"#,
	)
	.unwrap()
	.compile()
	.unwrap();

	let map = DbLoader::new(&gallery).load("gallery", &config).await.unwrap();

	assert_eq!(map.entity_count(), 1);
	let artist = map.get_entity("ARTIST").unwrap();
	assert!(artist.get_attribute("NAME").is_none());
	assert_eq!(artist.relationships().count(), 0);
}

#[rstest]
#[tokio::test]
async fn test_views_are_typed() {
	let mut view = TableRow::new("ARTIST_VIEW");
	view.table_type = "VIEW".to_string();
	let source = StaticMetadata::new()
		.table(view)
		.column(column("ARTIST_VIEW", "NAME", JdbcType::VarChar, true));

	let map = DbLoader::new(&source)
		.load("m", &LoaderConfiguration::default())
		.await
		.unwrap();

	assert_eq!(map.get_entity("ARTIST_VIEW").unwrap().table_type, TableType::View);
}

#[derive(Clone, Default)]
struct RecordingDelegate {
	events: Arc<Mutex<Vec<String>>>,
	reject: Option<String>,
}

impl DbLoaderDelegate for RecordingDelegate {
	fn db_entity_added(&self, entity: &DbEntity) {
		self.events.lock().push(format!("added {}", entity.fully_qualified_name()));
	}

	fn db_entity_removed(&self, entity: &DbEntity) {
		self.events.lock().push(format!("removed {}", entity.fully_qualified_name()));
	}

	fn db_relationship_loaded(&self, _entity: &DbEntity, relationship: &DbRelationship) -> bool {
		self.reject.as_deref() != Some(relationship.name.as_str())
	}
}

#[rstest]
#[tokio::test]
async fn test_delegate_can_reject_relationships(gallery: StaticMetadata) {
	let delegate = RecordingDelegate {
		reject: Some("paintings".to_string()),
		..Default::default()
	};

	let map = DbLoader::new(&gallery)
		.with_delegate(delegate)
		.load("gallery", &LoaderConfiguration::default())
		.await
		.unwrap();

	assert!(map.get_entity("ARTIST").unwrap().get_relationship("paintings").is_none());
	assert!(map.get_entity("PAINTING").unwrap().get_relationship("artist").is_some());
}

#[rstest]
#[tokio::test]
async fn test_duplicate_table_replaces_and_warns() {
	use tracing_subscriber::layer::SubscriberExt as _;
	use tracing_subscriber::util::SubscriberInitExt as _;

	// Arrange
	/// A tracing layer that captures log messages to a Vec<String>
	struct LogCapture {
		logs: Arc<Mutex<Vec<String>>>,
	}

	impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for LogCapture {
		fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
			struct MessageVisitor {
				message: String,
			}

			impl tracing::field::Visit for MessageVisitor {
				fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
					if field.name() == "message" {
						self.message = format!("{:?}", value);
					}
				}
			}

			let mut visitor = MessageVisitor {
				message: String::new(),
			};
			event.record(&mut visitor);
			self.logs
				.lock()
				.push(format!("[{}] {}", event.metadata().level(), visitor.message));
		}
	}

	let logs = Arc::new(Mutex::new(Vec::new()));
	let capture = LogCapture { logs: logs.clone() };
	let _guard = tracing_subscriber::registry().with(capture).set_default();

	let mut upper = TableRow::new("ARTIST");
	upper.schema = Some("PUBLIC".to_string());
	let mut lower = TableRow::new("artist");
	lower.schema = Some("public".to_string());
	let source = StaticMetadata::new()
		.table(upper)
		.table(lower)
		.column(column("artist", "ID", JdbcType::Integer, false));
	let delegate = RecordingDelegate::default();
	let events = delegate.events.clone();

	// Act
	let map = DbLoader::new(&source)
		.with_delegate(delegate)
		.load("m", &LoaderConfiguration::default())
		.await
		.unwrap();

	// Assert
	assert_eq!(map.entity_count(), 1);
	assert!(map.get_entity("artist").is_some());
	assert_eq!(
		*events.lock(),
		vec!["added PUBLIC.ARTIST", "removed PUBLIC.ARTIST", "added public.artist"]
	);
	let captured = logs.lock();
	assert!(
		captured
			.iter()
			.any(|log| log.contains("WARN") && log.contains("Duplicate table name")),
		"Expected duplicate table warning, but got: {:?}",
		*captured
	);
}

#[rstest]
#[tokio::test]
async fn test_procedures_load_when_included() {
	let mut proc_row = ProcedureRow {
		catalog: None,
		schema: None,
		name: "CALC_TOTAL".to_string(),
		kind: ProcedureKind::NoResult,
	};
	let other = ProcedureRow {
		name: "INTERNAL_CLEANUP".to_string(),
		..proc_row.clone()
	};
	proc_row.kind = ProcedureKind::Unknown;
	let parameter = |name: Option<&str>, kind, data_type: JdbcType| ProcedureColumnRow {
		catalog: None,
		schema: None,
		procedure: "CALC_TOTAL".to_string(),
		name: name.map(str::to_string),
		kind,
		data_type: data_type.code(),
		length: None,
		scale: Some(2),
	};
	let source = StaticMetadata::new()
		.procedure(proc_row)
		.procedure(other)
		.procedure_column(parameter(Some("ORDER_ID"), ProcedureColumnKind::In, JdbcType::Integer))
		.procedure_column(parameter(None, ProcedureColumnKind::Return, JdbcType::Decimal))
		.procedure_column(parameter(Some("ROW"), ProcedureColumnKind::Result, JdbcType::VarChar));
	let config = ReverseEngineeringConfig::from_toml("[procedures]\ninclude = [\"CALC_.*\"]\n")
		.unwrap()
		.compile()
		.unwrap();

	let map = DbLoader::new(&source).load("m", &config).await.unwrap();

	let procedures: Vec<_> = map.procedures().collect();
	assert_eq!(procedures.len(), 1);
	let calc = procedures[0];
	assert!(calc.returning_value);
	let names: Vec<_> = calc.parameters.iter().map(|p| p.name.as_str()).collect();
	assert_eq!(names, vec!["ORDER_ID", "_return_value"]);
	assert_eq!(calc.parameters[0].direction, Some(ParameterDirection::In));
	assert_eq!(calc.parameters[0].scale, None);
	assert_eq!(calc.parameters[1].scale, Some(2));
}

#[rstest]
#[tokio::test]
async fn test_unsupported_procedures_are_recovered() {
	let source = StaticMetadata::new().fail_unsupported(MetadataOperation::Procedures, None);
	let config = ReverseEngineeringConfig::from_toml("[procedures]\ninclude = [\".*\"]\n")
		.unwrap()
		.compile()
		.unwrap();

	let (map, report) = DbLoader::new(&source)
		.load_with_report("m", &config)
		.await
		.unwrap();

	assert_eq!(map.procedures().count(), 0);
	assert_eq!(report.recoveries[0].step, LoadStep::Procedures);
}

#[rstest]
#[tokio::test]
async fn test_load_catalogs_and_schemas() {
	let source = StaticMetadata::new().catalog("main").schema("public").schema("audit");
	let loader = DbLoader::new(&source);

	assert_eq!(loader.load_catalogs().await.unwrap(), vec!["main"]);
	assert_eq!(loader.load_schemas().await.unwrap(), vec!["public", "audit"]);
}
