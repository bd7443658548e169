// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Catalog query gateway
//!
//! The gateway is the boundary to the live backend. The object model never
//! builds SQL; it asks for one of the `CatalogQuery` shapes and reads the
//! returned `CatalogRow`s by column name.

pub mod memory;

pub use memory::{CatalogSnapshot, MemoryCatalogGateway};

use crate::error::{MetaError, MetaResult};
use crate::model::ObjectId;
use crate::monitor::ProgressMonitor;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

/// Failures raised by a gateway implementation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Connectivity error: {0}")]
    Connectivity(String),

    #[error("Query error: {0}")]
    Query(String),
}

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Catalog queries understood by every gateway
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CatalogQuery {
    /// All schemas of the database
    Schemas,
    /// One schema by id
    Schema { schema_id: ObjectId },
    /// All data types of the database
    DataTypes,
    /// One data type by id
    DataType { type_id: ObjectId },
    /// All procedures of a schema
    Procedures { schema_id: ObjectId },
    /// One procedure by id
    Procedure {
        schema_id: ObjectId,
        procedure_id: ObjectId,
    },
    /// All aggregates of a schema
    Aggregates { schema_id: ObjectId },
    /// One aggregate by the id of its backing function
    Aggregate {
        schema_id: ObjectId,
        aggregate_id: ObjectId,
    },
    /// Comment attached to any catalog object
    Description { object_id: ObjectId },
    /// Current catalog and schema of the execution context
    CurrentDefaults,
    /// Switch the execution context to another catalog and/or schema
    SwitchDefaults {
        catalog: Option<String>,
        schema: Option<String>,
    },
}

impl CatalogQuery {
    /// Short name of the query shape, used for logging and accounting
    pub fn kind(&self) -> &'static str {
        match self {
            CatalogQuery::Schemas => "schemas",
            CatalogQuery::Schema { .. } => "schema",
            CatalogQuery::DataTypes => "data_types",
            CatalogQuery::DataType { .. } => "data_type",
            CatalogQuery::Procedures { .. } => "procedures",
            CatalogQuery::Procedure { .. } => "procedure",
            CatalogQuery::Aggregates { .. } => "aggregates",
            CatalogQuery::Aggregate { .. } => "aggregate",
            CatalogQuery::Description { .. } => "description",
            CatalogQuery::CurrentDefaults => "current_defaults",
            CatalogQuery::SwitchDefaults { .. } => "switch_defaults",
        }
    }
}

impl fmt::Display for CatalogQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogQuery::Schema { schema_id } => write!(f, "schema({})", schema_id),
            CatalogQuery::DataType { type_id } => write!(f, "data_type({})", type_id),
            CatalogQuery::Procedures { schema_id } => write!(f, "procedures({})", schema_id),
            CatalogQuery::Procedure {
                schema_id,
                procedure_id,
            } => write!(f, "procedure({}/{})", schema_id, procedure_id),
            CatalogQuery::Aggregates { schema_id } => write!(f, "aggregates({})", schema_id),
            CatalogQuery::Aggregate {
                schema_id,
                aggregate_id,
            } => write!(f, "aggregate({}/{})", schema_id, aggregate_id),
            CatalogQuery::Description { object_id } => write!(f, "description({})", object_id),
            other => write!(f, "{}", other.kind()),
        }
    }
}

/// Executes catalog queries against a live backend
///
/// Implementations own connection handling and timeouts. They should poll the
/// monitor while reading long result sets, but the object model already polls
/// it before every query.
pub trait CatalogQueryGateway: Send + Sync {
    /// Run one catalog query and return its rows in backend order
    fn execute_catalog_query(
        &self,
        monitor: &dyn ProgressMonitor,
        query: &CatalogQuery,
    ) -> GatewayResult<Vec<CatalogRow>>;

    /// Human readable backend name
    fn backend_name(&self) -> &str {
        "unknown"
    }
}

/// One record of a catalog query result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CatalogRow {
    columns: Map<String, Value>,
}

impl CatalogRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style column setter
    pub fn with(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.columns.insert(column.to_string(), value.into());
        self
    }

    pub fn insert(&mut self, column: &str, value: impl Into<Value>) {
        self.columns.insert(column.to_string(), value.into());
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns.get(column).filter(|v| !v.is_null())
    }

    /// Required non-negative identifier column
    pub fn get_id(&self, column: &str) -> MetaResult<ObjectId> {
        self.get_opt_id(column)?
            .ok_or_else(|| missing(column))
    }

    /// Optional identifier column; null and absent both read as `None`
    pub fn get_opt_id(&self, column: &str) -> MetaResult<Option<ObjectId>> {
        match self.get(column) {
            None => Ok(None),
            Some(value) => as_id(column, value).map(Some),
        }
    }

    /// Required text column
    pub fn get_string(&self, column: &str) -> MetaResult<String> {
        self.get_opt_string(column)?
            .ok_or_else(|| missing(column))
    }

    pub fn get_opt_string(&self, column: &str) -> MetaResult<Option<String>> {
        match self.get(column) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(malformed(column, "text", other)),
        }
    }

    /// Identifier array column; absent reads as an empty list
    pub fn get_id_list(&self, column: &str) -> MetaResult<Vec<ObjectId>> {
        Ok(self.get_opt_id_list(column)?.unwrap_or_default())
    }

    pub fn get_opt_id_list(&self, column: &str) -> MetaResult<Option<Vec<ObjectId>>> {
        match self.get(column) {
            None => Ok(None),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| as_id(column, item))
                .collect::<MetaResult<Vec<_>>>()
                .map(Some),
            Some(other) => Err(malformed(column, "identifier array", other)),
        }
    }

    /// Text array column; null elements are kept as `None`
    pub fn get_opt_string_list(&self, column: &str) -> MetaResult<Option<Vec<Option<String>>>> {
        match self.get(column) {
            None => Ok(None),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    Value::Null => Ok(None),
                    Value::String(s) => Ok(Some(s.clone())),
                    other => Err(malformed(column, "text array", other)),
                })
                .collect::<MetaResult<Vec<_>>>()
                .map(Some),
            Some(other) => Err(malformed(column, "text array", other)),
        }
    }
}

impl From<Map<String, Value>> for CatalogRow {
    fn from(columns: Map<String, Value>) -> Self {
        Self { columns }
    }
}

fn as_id(column: &str, value: &Value) -> MetaResult<ObjectId> {
    value
        .as_u64()
        .ok_or_else(|| malformed(column, "non-negative integer", value))
}

fn missing(column: &str) -> MetaError {
    MetaError::data_integrity(
        format!("column '{}'", column),
        "required value is missing",
    )
}

fn malformed(column: &str, expected: &str, found: &Value) -> MetaError {
    MetaError::data_integrity(
        format!("column '{}'", column),
        format!("expected {}, found {}", expected, found),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_required_columns() {
        let row = CatalogRow::new()
            .with("proc_oid", 42)
            .with("proc_name", "avg");
        assert_eq!(row.get_id("proc_oid").unwrap(), 42);
        assert_eq!(row.get_string("proc_name").unwrap(), "avg");
    }

    #[test]
    fn test_missing_and_null_columns_are_integrity_errors() {
        let row = CatalogRow::new().with("proc_name", Value::Null);
        assert!(matches!(
            row.get_id("proc_oid"),
            Err(MetaError::DataIntegrity { .. })
        ));
        assert!(matches!(
            row.get_string("proc_name"),
            Err(MetaError::DataIntegrity { .. })
        ));
        assert_eq!(row.get_opt_string("proc_name").unwrap(), None);
    }

    #[test]
    fn test_malformed_identifier() {
        let row = CatalogRow::new().with("oid", "forty-two").with("neg", -1);
        assert!(row.get_id("oid").is_err());
        assert!(row.get_id("neg").is_err());
    }

    #[test]
    fn test_lists() {
        let row: CatalogRow = serde_json::from_value(json!({
            "proargtypes": [1700, 23],
            "proargnames": ["value", null]
        }))
        .unwrap();
        assert_eq!(row.get_id_list("proargtypes").unwrap(), vec![1700, 23]);
        assert_eq!(row.get_id_list("proallargtypes").unwrap(), Vec::<u64>::new());
        assert_eq!(
            row.get_opt_string_list("proargnames").unwrap(),
            Some(vec![Some("value".to_string()), None])
        );
    }

    #[test]
    fn test_query_display() {
        let query = CatalogQuery::Procedure {
            schema_id: 2200,
            procedure_id: 42,
        };
        assert_eq!(query.to_string(), "procedure(2200/42)");
        assert_eq!(CatalogQuery::CurrentDefaults.to_string(), "current_defaults");
    }
}
