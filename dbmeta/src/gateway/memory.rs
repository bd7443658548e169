// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! In-memory catalog gateway
//!
//! Answers every `CatalogQuery` from a `CatalogSnapshot`. Used by the CLI to
//! browse exported catalogs and by tests, which rely on its per-kind query
//! counters, offline switch and artificial latency.

use super::{CatalogQuery, CatalogQueryGateway, CatalogRow, GatewayError, GatewayResult};
use crate::error::MetaResult;
use crate::model::ObjectId;
use crate::monitor::ProgressMonitor;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Exported catalog tables of one database
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    /// Database (catalog) name
    pub database: String,

    /// Schema the execution context starts in
    #[serde(default)]
    pub current_schema: Option<String>,

    /// Rows with `oid`, `nspname`
    #[serde(default)]
    pub schemas: Vec<CatalogRow>,

    /// Rows with `oid`, `typname`, `typnamespace`, `typtype`
    #[serde(default)]
    pub data_types: Vec<CatalogRow>,

    /// Rows with `oid`, `proname`, `pronamespace`, `prokind`, `prorettype`,
    /// `proargtypes`, `proallargtypes`, `proargmodes`, `proargnames`
    #[serde(default)]
    pub procedures: Vec<CatalogRow>,

    /// Rows with `proc_oid`, `proc_name`, `pronamespace`
    #[serde(default)]
    pub aggregates: Vec<CatalogRow>,

    /// Object comments keyed by object id
    #[serde(default)]
    pub descriptions: BTreeMap<ObjectId, String>,
}

impl CatalogSnapshot {
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            ..Self::default()
        }
    }

    pub fn from_json_str(json: &str) -> MetaResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> MetaResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        log::debug!(
            "Loaded catalog snapshot from {} ({} bytes)",
            path.as_ref().display(),
            content.len()
        );
        Self::from_json_str(&content)
    }

    pub fn to_json_string(&self) -> MetaResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn schema_name(&self, schema_id: ObjectId) -> Option<String> {
        self.schemas
            .iter()
            .find(|row| has_id(row, "oid", schema_id))
            .and_then(|row| row.get_opt_string("nspname").ok().flatten())
    }

    fn has_schema_named(&self, name: &str) -> bool {
        self.schemas
            .iter()
            .any(|row| row.get_opt_string("nspname").ok().flatten().as_deref() == Some(name))
    }

    /// Data type rows carry the name of their schema, as a pg_namespace join would
    fn join_schema_name(&self, row: &CatalogRow) -> CatalogRow {
        let mut joined = row.clone();
        if let Ok(Some(schema_id)) = row.get_opt_id("typnamespace") {
            if let Some(name) = self.schema_name(schema_id) {
                joined.insert("nspname", name);
            }
        }
        joined
    }
}

fn has_id(row: &CatalogRow, column: &str, id: ObjectId) -> bool {
    matches!(row.get_opt_id(column), Ok(Some(value)) if value == id)
}

fn filter(rows: &[CatalogRow], column: &str, id: ObjectId) -> Vec<CatalogRow> {
    rows.iter()
        .filter(|row| has_id(row, column, id))
        .cloned()
        .collect()
}

/// Catalog gateway over an in-memory snapshot
pub struct MemoryCatalogGateway {
    snapshot: RwLock<CatalogSnapshot>,
    offline: AtomicBool,
    latency: Option<Duration>,
    counters: Mutex<HashMap<&'static str, usize>>,
}

impl MemoryCatalogGateway {
    pub fn new(snapshot: CatalogSnapshot) -> Self {
        Self {
            snapshot: RwLock::new(snapshot),
            offline: AtomicBool::new(false),
            latency: None,
            counters: Mutex::new(HashMap::new()),
        }
    }

    /// Delay every query, widening race windows in concurrency tests
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Simulate a lost connection; every query fails while offline
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of queries of the given kind issued so far
    pub fn query_count(&self, kind: &str) -> usize {
        self.counters.lock().get(kind).copied().unwrap_or(0)
    }

    pub fn total_queries(&self) -> usize {
        self.counters.lock().values().sum()
    }

    pub fn reset_counters(&self) {
        self.counters.lock().clear();
    }

    /// Replace the backing tables, as a DDL change on the server would
    pub fn update_snapshot<F: FnOnce(&mut CatalogSnapshot)>(&self, update: F) {
        update(&mut *self.snapshot.write());
    }

    fn answer(&self, query: &CatalogQuery) -> GatewayResult<Vec<CatalogRow>> {
        if let CatalogQuery::SwitchDefaults { catalog, schema } = query {
            return self.switch_defaults(catalog.as_deref(), schema.as_deref());
        }

        let snapshot = self.snapshot.read();
        let rows = match query {
            CatalogQuery::Schemas => snapshot.schemas.clone(),
            CatalogQuery::Schema { schema_id } => filter(&snapshot.schemas, "oid", *schema_id),
            CatalogQuery::DataTypes => snapshot
                .data_types
                .iter()
                .map(|row| snapshot.join_schema_name(row))
                .collect(),
            CatalogQuery::DataType { type_id } => filter(&snapshot.data_types, "oid", *type_id)
                .iter()
                .map(|row| snapshot.join_schema_name(row))
                .collect(),
            CatalogQuery::Procedures { schema_id } => {
                filter(&snapshot.procedures, "pronamespace", *schema_id)
            }
            CatalogQuery::Procedure {
                schema_id,
                procedure_id,
            } => filter(&snapshot.procedures, "pronamespace", *schema_id)
                .into_iter()
                .filter(|row| has_id(row, "oid", *procedure_id))
                .collect(),
            CatalogQuery::Aggregates { schema_id } => {
                filter(&snapshot.aggregates, "pronamespace", *schema_id)
            }
            CatalogQuery::Aggregate {
                schema_id,
                aggregate_id,
            } => filter(&snapshot.aggregates, "pronamespace", *schema_id)
                .into_iter()
                .filter(|row| has_id(row, "proc_oid", *aggregate_id))
                .collect(),
            CatalogQuery::Description { object_id } => snapshot
                .descriptions
                .get(object_id)
                .map(|text| vec![CatalogRow::new().with("description", text.as_str())])
                .unwrap_or_default(),
            CatalogQuery::CurrentDefaults => vec![CatalogRow::new()
                .with("current_catalog", snapshot.database.as_str())
                .with(
                    "current_schema",
                    snapshot
                        .current_schema
                        .clone()
                        .map(serde_json::Value::from)
                        .unwrap_or(serde_json::Value::Null),
                )],
            CatalogQuery::SwitchDefaults { .. } => Vec::new(),
        };
        Ok(rows)
    }

    fn switch_defaults(
        &self,
        catalog: Option<&str>,
        schema: Option<&str>,
    ) -> GatewayResult<Vec<CatalogRow>> {
        let mut snapshot = self.snapshot.write();
        if let Some(catalog) = catalog {
            if catalog != snapshot.database {
                return Err(GatewayError::Query(format!(
                    "database \"{}\" does not exist",
                    catalog
                )));
            }
        }
        if let Some(schema) = schema {
            if !snapshot.has_schema_named(schema) {
                return Err(GatewayError::Query(format!(
                    "schema \"{}\" does not exist",
                    schema
                )));
            }
            snapshot.current_schema = Some(schema.to_string());
        }
        Ok(Vec::new())
    }
}

impl CatalogQueryGateway for MemoryCatalogGateway {
    fn execute_catalog_query(
        &self,
        _monitor: &dyn ProgressMonitor,
        query: &CatalogQuery,
    ) -> GatewayResult<Vec<CatalogRow>> {
        *self.counters.lock().entry(query.kind()).or_insert(0) += 1;

        if self.offline.load(Ordering::SeqCst) {
            return Err(GatewayError::Connectivity(
                "connection to catalog backend lost".to_string(),
            ));
        }

        if let Some(latency) = self.latency {
            std::thread::sleep(latency);
        }

        let rows = self.answer(query)?;
        log::trace!("Memory gateway answered {} with {} rows", query, rows.len());
        Ok(rows)
    }

    fn backend_name(&self) -> &str {
        "memory"
    }
}
