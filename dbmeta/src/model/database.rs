// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Database, the root of the catalog object graph
//!
//! Owns the gateway handle, the configuration, the execution context defaults
//! and the database-wide schema and data type caches.

use super::{DataType, MetaObject, ObjectId, Schema};
use crate::cache::ObjectCache;
use crate::config::ModelConfig;
use crate::defaults::ExecutionContextDefaults;
use crate::error::{MetaError, MetaResult};
use crate::gateway::{CatalogQuery, CatalogQueryGateway, CatalogRow};
use crate::monitor::{check_cancelled, ProgressMonitor};
use crate::naming::OverloadedNameOptions;
use rayon::prelude::*;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Object counts after a full warm-up
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WarmUpReport {
    pub schemas: usize,
    pub data_types: usize,
    pub procedures: usize,
    pub aggregates: usize,
}

pub struct Database {
    name: String,
    gateway: Arc<dyn CatalogQueryGateway>,
    config: ModelConfig,
    name_options: Arc<OverloadedNameOptions>,
    defaults: ExecutionContextDefaults,
    schemas: ObjectCache<Schema>,
    data_types: ObjectCache<DataType>,
}

impl Database {
    /// Create the root of an object graph on top of `gateway`
    ///
    /// Nothing is read from the backend until the first access.
    pub fn open(
        name: impl Into<String>,
        gateway: Arc<dyn CatalogQueryGateway>,
        config: ModelConfig,
    ) -> MetaResult<Arc<Self>> {
        config.validate().map_err(MetaError::Config)?;
        let name = name.into();

        let defaults = ExecutionContextDefaults::for_backend(
            config.capabilities,
            gateway.clone(),
            config.bootstrap.clone(),
        );

        log::info!(
            "Opened catalog model for database '{}' on {} backend",
            name,
            gateway.backend_name()
        );

        Ok(Arc::new(Self {
            name,
            gateway,
            name_options: Arc::new(config.name_options()),
            config,
            defaults,
            schemas: ObjectCache::new("schema"),
            data_types: ObjectCache::new("data type"),
        }))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Formatter options shared by every object of this graph
    pub(crate) fn name_options(&self) -> &Arc<OverloadedNameOptions> {
        &self.name_options
    }

    /// Execution context defaults of this backend
    pub fn defaults(&self) -> &ExecutionContextDefaults {
        &self.defaults
    }

    pub fn gateway(&self) -> &Arc<dyn CatalogQueryGateway> {
        &self.gateway
    }

    /// Issue one catalog query, polling the monitor around it
    pub(crate) fn execute(
        &self,
        monitor: &dyn ProgressMonitor,
        query: &CatalogQuery,
    ) -> MetaResult<Vec<CatalogRow>> {
        check_cancelled(monitor)?;
        log::debug!("Catalog query {}", query);
        monitor.sub_task(query.kind());

        let rows = self.gateway.execute_catalog_query(monitor, query)?;
        check_cancelled(monitor)?;
        Ok(rows)
    }

    /// Comment of any object of this database
    pub(crate) fn load_description(
        &self,
        monitor: &dyn ProgressMonitor,
        object_id: ObjectId,
    ) -> MetaResult<Option<String>> {
        let rows = self.execute(monitor, &CatalogQuery::Description { object_id })?;
        match rows.first() {
            Some(row) => row.get_opt_string("description"),
            None => Ok(None),
        }
    }

    pub fn get_schemas(self: &Arc<Self>, monitor: &dyn ProgressMonitor) -> MetaResult<Vec<Arc<Schema>>> {
        self.schemas.load_all(
            monitor,
            "oid",
            |monitor| self.execute(monitor, &CatalogQuery::Schemas),
            |_, row| Schema::load(self, row),
        )
    }

    pub fn get_schema(
        self: &Arc<Self>,
        monitor: &dyn ProgressMonitor,
        schema_id: ObjectId,
    ) -> MetaResult<Option<Arc<Schema>>> {
        self.schemas.resolve(monitor, schema_id, |monitor| {
            let rows = self.execute(monitor, &CatalogQuery::Schema { schema_id })?;
            rows.first().map(|row| Schema::load(self, row)).transpose()
        })
    }

    pub fn get_schema_by_name(
        self: &Arc<Self>,
        monitor: &dyn ProgressMonitor,
        name: &str,
    ) -> MetaResult<Option<Arc<Schema>>> {
        Ok(self
            .get_schemas(monitor)?
            .into_iter()
            .find(|schema| schema.name() == name))
    }

    pub fn get_data_types(
        self: &Arc<Self>,
        monitor: &dyn ProgressMonitor,
    ) -> MetaResult<Vec<Arc<DataType>>> {
        self.data_types.load_all(
            monitor,
            "oid",
            |monitor| self.execute(monitor, &CatalogQuery::DataTypes),
            |_, row| DataType::load(self, row),
        )
    }

    pub fn get_data_type(
        self: &Arc<Self>,
        monitor: &dyn ProgressMonitor,
        type_id: ObjectId,
    ) -> MetaResult<Option<Arc<DataType>>> {
        self.data_types.resolve(monitor, type_id, |monitor| {
            let rows = self.execute(monitor, &CatalogQuery::DataType { type_id })?;
            rows.first().map(|row| DataType::load(self, row)).transpose()
        })
    }

    pub fn schema_cache(&self) -> &ObjectCache<Schema> {
        &self.schemas
    }

    pub fn data_type_cache(&self) -> &ObjectCache<DataType> {
        &self.data_types
    }

    /// Drop the whole materialized graph; children held by callers stay
    /// usable but are no longer shared with new lookups
    pub fn invalidate(&self) {
        self.schemas.invalidate();
        self.data_types.invalidate();
        log::info!("Invalidated catalog model of database '{}'", self.name);
    }

    /// Load schemas and types, then every schema's procedures and aggregates
    /// in parallel
    pub fn warm_up(self: &Arc<Self>, monitor: &dyn ProgressMonitor) -> MetaResult<WarmUpReport> {
        let data_types = self.get_data_types(monitor)?.len();
        let schemas = self.get_schemas(monitor)?;

        let populate = || {
            schemas
                .par_iter()
                .map(|schema| -> MetaResult<(usize, usize)> {
                    let procedures = schema.get_procedures(monitor)?.len();
                    let aggregates = schema.get_aggregates(monitor)?.len();
                    Ok((procedures, aggregates))
                })
                .collect::<MetaResult<Vec<_>>>()
        };

        let counts = if self.config.warm_up_threads > 0 {
            rayon::ThreadPoolBuilder::new()
                .num_threads(self.config.warm_up_threads)
                .build()
                .map_err(|e| MetaError::Config(format!("warm-up thread pool: {}", e)))?
                .install(populate)?
        } else {
            populate()?
        };

        let report = WarmUpReport {
            schemas: schemas.len(),
            data_types,
            procedures: counts.iter().map(|(p, _)| p).sum(),
            aggregates: counts.iter().map(|(_, a)| a).sum(),
        };
        log::info!("Warmed up database '{}': {:?}", self.name, report);
        Ok(report)
    }
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("name", &self.name)
            .field("backend", &self.gateway.backend_name())
            .field("defaults", &self.defaults)
            .finish()
    }
}
