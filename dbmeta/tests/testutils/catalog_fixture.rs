//! Catalog fixture for dbmeta integration tests
//!
//! Wraps a `MemoryCatalogGateway` loaded with `demos/sample_catalog.json` and
//! a `Database` opened on top of it. The gateway handle stays available for
//! query accounting and failure injection.

use dbmeta::{
    Aggregate, CatalogRow, CatalogSnapshot, Database, MemoryCatalogGateway, ModelConfig,
    Procedure, Schema, VoidProgressMonitor,
};
use std::sync::Arc;
use std::time::Duration;

pub const SAMPLE_CATALOG: &str = include_str!("../../../demos/sample_catalog.json");

pub const PG_CATALOG: u64 = 11;
pub const PUBLIC: u64 = 2200;
pub const SALES: u64 = 16384;

pub const NUMERIC: u64 = 1700;
pub const INT4: u64 = 23;
pub const MONEY_AMOUNT: u64 = 16400;

/// Sample catalog snapshot
pub fn sample_snapshot() -> CatalogSnapshot {
    CatalogSnapshot::from_json_str(SAMPLE_CATALOG).expect("sample catalog is valid JSON")
}

/// Procedure row in the sample catalog's column layout
pub fn procedure_row(oid: u64, name: &str, schema_id: u64, arg_types: &[u64], ret: u64) -> CatalogRow {
    CatalogRow::new()
        .with("oid", oid)
        .with("proname", name)
        .with("pronamespace", schema_id)
        .with("prokind", "f")
        .with("prorettype", ret)
        .with("proargtypes", arg_types.to_vec())
}

pub struct CatalogFixture {
    pub gateway: Arc<MemoryCatalogGateway>,
    pub db: Arc<Database>,
}

impl CatalogFixture {
    /// Sample catalog with the default configuration
    pub fn new() -> Self {
        Self::with_config(ModelConfig::default())
    }

    pub fn with_config(config: ModelConfig) -> Self {
        Self::build(MemoryCatalogGateway::new(sample_snapshot()), config)
    }

    pub fn with_snapshot(snapshot: CatalogSnapshot) -> Self {
        Self::build(MemoryCatalogGateway::new(snapshot), ModelConfig::default())
    }

    /// Every catalog query sleeps for `latency`
    pub fn with_latency(latency: Duration) -> Self {
        Self::build(
            MemoryCatalogGateway::new(sample_snapshot()).with_latency(latency),
            ModelConfig::default(),
        )
    }

    fn build(gateway: MemoryCatalogGateway, config: ModelConfig) -> Self {
        let gateway = Arc::new(gateway);
        let db = Database::open("demo", gateway.clone(), config)
            .expect("Failed to open catalog model");
        Self { gateway, db }
    }

    pub fn schema(&self, schema_id: u64) -> Arc<Schema> {
        self.db
            .get_schema(&VoidProgressMonitor, schema_id)
            .expect("schema lookup failed")
            .expect("schema not found")
    }

    pub fn public(&self) -> Arc<Schema> {
        self.schema(PUBLIC)
    }

    pub fn procedure(&self, schema_id: u64, procedure_id: u64) -> Arc<Procedure> {
        self.schema(schema_id)
            .get_procedure(&VoidProgressMonitor, procedure_id)
            .expect("procedure lookup failed")
            .expect("procedure not found")
    }

    pub fn aggregate(&self, schema_id: u64, aggregate_id: u64) -> Arc<Aggregate> {
        self.schema(schema_id)
            .get_aggregate(&VoidProgressMonitor, aggregate_id)
            .expect("aggregate lookup failed")
            .expect("aggregate not found")
    }
}
