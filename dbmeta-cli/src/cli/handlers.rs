// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! CLI command handlers for dbmeta

use colored::Colorize;
use std::sync::Arc;

use super::commands::{Qualification, SnapshotArgs};
use super::output::{
    AggregateRow, DefaultsRow, ListingFormatter, ProcedureRow, SchemaRow, TableRow,
};
use dbmeta::{
    CatalogSnapshot, Database, MemoryCatalogGateway, MetaError, MetaObject, ModelConfig,
    OverloadedObject, ProgressMonitor, Schema, VoidProgressMonitor,
};

type HandlerResult = Result<(), Box<dyn std::error::Error>>;

/// Build the object model over the snapshot named on the command line
fn open_database(
    source: &SnapshotArgs,
    qualification: Option<Qualification>,
) -> Result<Arc<Database>, MetaError> {
    let snapshot = CatalogSnapshot::from_file(&source.snapshot)?;

    let mut config = match &source.config {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .map_err(|e| MetaError::Config(format!("{}: {}", path.display(), e)))?;
            ModelConfig::from_json_str(&content)?
        }
        None => ModelConfig::default(),
    };
    if let Some(qualification) = qualification {
        config.naming.qualification = qualification.into();
    }

    let name = snapshot.database.clone();
    let gateway = Arc::new(MemoryCatalogGateway::new(snapshot));
    Database::open(name, gateway, config)
}

fn find_schema(
    db: &Arc<Database>,
    monitor: &dyn ProgressMonitor,
    name: &str,
) -> Result<Arc<Schema>, Box<dyn std::error::Error>> {
    db.get_schema_by_name(monitor, name)?
        .ok_or_else(|| format!("Schema '{}' not found in database '{}'", name, db.name()).into())
}

fn print_listing<R: TableRow>(title: &str, rows: &[R], source: &SnapshotArgs) {
    print!("{}", ListingFormatter::format(title, rows, source.format));
}

/// Handle the schemas command
pub fn handle_schemas(source: SnapshotArgs) -> HandlerResult {
    let db = open_database(&source, None)?;
    let monitor = VoidProgressMonitor;

    let rows = db
        .get_schemas(&monitor)?
        .iter()
        .map(|schema| -> Result<SchemaRow, MetaError> {
            Ok(SchemaRow {
                id: schema.object_id(),
                name: schema.name().to_string(),
                system: schema.is_system(),
                description: schema.description(&monitor)?,
            })
        })
        .collect::<Result<Vec<_>, MetaError>>()?;

    print_listing("schemas", &rows, &source);
    Ok(())
}

/// Handle the procedures command
pub fn handle_procedures(source: SnapshotArgs, schema: String) -> HandlerResult {
    let db = open_database(&source, None)?;
    let monitor = VoidProgressMonitor;
    let schema = find_schema(&db, &monitor, &schema)?;

    let rows = schema
        .get_procedures(&monitor)?
        .iter()
        .map(|procedure| -> Result<ProcedureRow, MetaError> {
            Ok(ProcedureRow {
                id: procedure.object_id(),
                kind: procedure.procedure_kind().to_string(),
                signature: procedure.overloaded_name(),
                returns: procedure.return_type().map(|t| t.name().to_string()),
                description: procedure.description(&monitor)?,
            })
        })
        .collect::<Result<Vec<_>, MetaError>>()?;

    print_listing("procedures", &rows, &source);
    Ok(())
}

/// Handle the aggregates command
pub fn handle_aggregates(
    source: SnapshotArgs,
    schema: String,
    qualification: Option<Qualification>,
) -> HandlerResult {
    let db = open_database(&source, qualification)?;
    let monitor = VoidProgressMonitor;
    let schema = find_schema(&db, &monitor, &schema)?;

    let rows = schema
        .get_aggregates(&monitor)?
        .iter()
        .map(|aggregate| -> Result<AggregateRow, MetaError> {
            if aggregate.function().is_none() {
                log::warn!(
                    "Aggregate '{}' has no resolvable backing function",
                    aggregate.name()
                );
            }
            Ok(AggregateRow {
                id: aggregate.object_id(),
                name: aggregate.name().to_string(),
                signature: aggregate.overloaded_name(),
                input_types: aggregate.input_types().map(|types| {
                    types.iter().map(|t| t.name().to_string()).collect()
                }),
                output_type: aggregate.output_type().map(|t| t.name().to_string()),
                description: aggregate.description(&monitor)?,
            })
        })
        .collect::<Result<Vec<_>, MetaError>>()?;

    print_listing("aggregates", &rows, &source);
    Ok(())
}

/// Handle the defaults command
pub fn handle_defaults(source: SnapshotArgs, set_schema: Option<String>) -> HandlerResult {
    let db = open_database(&source, None)?;
    let monitor = VoidProgressMonitor;
    let defaults = db.defaults();

    if defaults.is_supported() {
        defaults.refresh_defaults(&monitor, true)?;
    }

    if let Some(schema) = set_schema {
        // status lines go to stderr so stdout stays a single listing
        match defaults.set_default_schema(&monitor, Some(&schema)) {
            Ok(()) => eprintln!("{}", format!("Default schema set to '{}'", schema).green()),
            Err(e @ MetaError::NotSupported(_)) => {
                eprintln!("{}", format!("{}", e).yellow());
            }
            Err(e) => return Err(e.into()),
        }
    }

    let rows = vec![DefaultsRow {
        supported: defaults.is_supported(),
        catalog_change: defaults.supports_catalog_change(),
        schema_change: defaults.supports_schema_change(),
        default_catalog: defaults.default_catalog(),
        default_schema: defaults.default_schema(),
    }];

    print_listing("defaults", &rows, &source);
    Ok(())
}
