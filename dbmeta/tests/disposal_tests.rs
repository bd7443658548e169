//! Disposed object graph tests
//!
//! Callers may keep schema, routine and type handles after the database that
//! produced them is gone. Anything that needs the backend must then fail with
//! `MetaError::Disposed`, while state captured at load time stays stable.

#[path = "testutils/mod.rs"]
mod testutils;

use dbmeta::{MetaError, MetaObject, ModelConfig, OverloadedObject, VoidProgressMonitor};
use testutils::catalog_fixture::{CatalogFixture, NUMERIC, PUBLIC};

#[test]
fn test_schema_lookups_fail_after_database_drop() {
    let fixture = CatalogFixture::new();
    let public = fixture.public();
    drop(fixture);

    let monitor = VoidProgressMonitor;
    assert!(matches!(
        public.get_procedure(&monitor, 50),
        Err(MetaError::Disposed(_))
    ));
    assert!(matches!(
        public.get_aggregates(&monitor),
        Err(MetaError::Disposed(_))
    ));
    assert!(matches!(
        public.description(&monitor),
        Err(MetaError::Disposed(_))
    ));
    assert!(public.database().is_err());
    assert_eq!(public.name(), "public");
}

#[test]
fn test_unloaded_descriptions_fail_after_database_drop() {
    let fixture = CatalogFixture::new();
    let monitor = VoidProgressMonitor;
    let procedure = fixture.procedure(PUBLIC, 42);
    let numeric = fixture.db.get_data_type(&monitor, NUMERIC).unwrap().unwrap();
    drop(fixture);

    assert!(!procedure.is_description_loaded());
    let err = procedure.description(&monitor).unwrap_err();
    assert!(matches!(err, MetaError::Disposed(_)));
    assert!(err.to_string().contains("avg"));
    assert!(matches!(
        numeric.description(&monitor),
        Err(MetaError::Disposed(_))
    ));
}

#[test]
fn test_loaded_description_survives_database_drop() {
    let fixture = CatalogFixture::new();
    let monitor = VoidProgressMonitor;
    let public = fixture.public();
    let procedure = fixture.procedure(PUBLIC, 42);
    let expected = procedure.description(&monitor).unwrap();
    assert!(expected.is_some());
    drop(fixture);

    assert_eq!(procedure.description(&monitor).unwrap(), expected);
    // the parent schema is alive, its database is not
    assert!(matches!(
        public.get_procedure(&monitor, 42),
        Err(MetaError::Disposed(_))
    ));
}

#[test]
fn test_overloaded_names_stable_after_database_drop() {
    let fixture = CatalogFixture::with_config(ModelConfig::fully_qualified());
    let aggregate = fixture.aggregate(PUBLIC, 43);
    let procedure = fixture.procedure(PUBLIC, 43);
    let aggregate_name = aggregate.overloaded_name();
    let procedure_name = procedure.overloaded_name();
    assert_eq!(aggregate_name, "public.avg(pg_catalog.int4)");
    assert_eq!(procedure_name, "public.avg(pg_catalog.int4)");
    drop(fixture);

    assert_eq!(aggregate.overloaded_name(), aggregate_name);
    assert_eq!(procedure.overloaded_name(), procedure_name);
    assert!(matches!(
        procedure.description(&VoidProgressMonitor),
        Err(MetaError::Disposed(_))
    ));
}
