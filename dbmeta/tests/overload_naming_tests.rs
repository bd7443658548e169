//! Overloaded name tests
//!
//! Signatures render input parameter types in declared order; the schema
//! qualification follows the configured `QualificationPolicy`.

#[path = "testutils/mod.rs"]
mod testutils;

use dbmeta::{
    MetaObject, ModelConfig, OverloadedNameOptions, OverloadedObject, ParameterMode,
    QualificationPolicy, VoidProgressMonitor,
};
use testutils::catalog_fixture::{procedure_row, sample_snapshot, CatalogFixture, INT4, PUBLIC};

#[test]
fn test_overloads_differ_by_argument_order() {
    let fixture = CatalogFixture::new();
    let text_first = fixture.procedure(PUBLIC, 51);
    let int_first = fixture.procedure(PUBLIC, 52);

    assert_eq!(text_first.name(), int_first.name());
    assert_eq!(text_first.overloaded_name(), "concat_pair(text,int4)");
    assert_eq!(int_first.overloaded_name(), "concat_pair(int4,text)");
}

#[test]
fn test_overloaded_name_is_deterministic() {
    let fixture = CatalogFixture::new();
    let add = fixture.procedure(PUBLIC, 50);
    assert_eq!(add.overloaded_name(), add.overloaded_name());
    assert_eq!(add.overloaded_name(), "add_numbers(int4,int4)");
}

#[test]
fn test_output_parameters_are_not_part_of_the_signature() {
    let fixture = CatalogFixture::new();
    let split = fixture.procedure(PUBLIC, 53);

    let modes: Vec<ParameterMode> = split.parameters().iter().map(|p| p.mode()).collect();
    assert_eq!(
        modes,
        vec![ParameterMode::In, ParameterMode::Out, ParameterMode::Out]
    );
    assert_eq!(split.input_parameters().len(), 1);
    assert_eq!(split.parameters()[2].name(), Some("fraction"));
    assert_eq!(split.parameters()[2].position(), 3);

    // money_amount lives in another, non-system schema
    assert_eq!(split.overloaded_name(), "split_amount(sales.money_amount)");
}

#[test]
fn test_procedure_without_result() {
    let fixture = CatalogFixture::new();
    let refresh = fixture.procedure(PUBLIC, 54);

    assert!(refresh.return_type().is_none());
    assert!(refresh.parameters().is_empty());
    assert_eq!(refresh.overloaded_name(), "refresh_stats()");
}

#[test]
fn test_qualification_policies() {
    let fixture = CatalogFixture::new();
    let split = fixture.procedure(PUBLIC, 53);
    let add = fixture.procedure(PUBLIC, 50);

    let with = |qualification| OverloadedNameOptions {
        qualification,
        ..OverloadedNameOptions::default()
    };

    assert_eq!(
        split.overloaded_name_with(&with(QualificationPolicy::Never)),
        "split_amount(money_amount)"
    );
    assert_eq!(
        split.overloaded_name_with(&with(QualificationPolicy::Always)),
        "public.split_amount(sales.money_amount)"
    );
    assert_eq!(
        add.overloaded_name_with(&with(QualificationPolicy::Always)),
        "public.add_numbers(pg_catalog.int4,pg_catalog.int4)"
    );
}

#[test]
fn test_configured_policy_applies_to_overloaded_name() {
    let fixture = CatalogFixture::with_config(ModelConfig::fully_qualified());
    let avg = fixture.aggregate(PUBLIC, 43);
    assert_eq!(avg.overloaded_name(), "public.avg(pg_catalog.int4)");

    let mut config = ModelConfig::default();
    config.naming.show_param_names = true;
    let fixture = CatalogFixture::with_config(config);
    assert_eq!(
        fixture.procedure(PUBLIC, 50).overloaded_name(),
        "add_numbers(a int4,b int4)"
    );
}

#[test]
fn test_identifiers_are_quoted() {
    let mut snapshot = sample_snapshot();
    snapshot
        .procedures
        .push(procedure_row(70, "Weird Name", PUBLIC, &[INT4], INT4));
    snapshot
        .procedures
        .push(procedure_row(71, "select", PUBLIC, &[], INT4));
    let fixture = CatalogFixture::with_snapshot(snapshot);

    assert_eq!(
        fixture.procedure(PUBLIC, 70).overloaded_name(),
        "\"Weird Name\"(int4)"
    );
    assert_eq!(fixture.procedure(PUBLIC, 71).overloaded_name(), "\"select\"()");
}

#[test]
fn test_lookup_by_name() {
    let fixture = CatalogFixture::new();
    let monitor = VoidProgressMonitor;
    let public = fixture.public();

    let overloads = public.get_procedures_by_name(&monitor, "avg").unwrap();
    assert_eq!(overloads.len(), 2);

    let found = public
        .find_procedure_by_overloaded_name(&monitor, "concat_pair(int4,text)")
        .unwrap()
        .unwrap();
    assert_eq!(found.object_id(), 52);

    assert!(public
        .find_procedure_by_overloaded_name(&monitor, "concat_pair(text,text)")
        .unwrap()
        .is_none());
}
