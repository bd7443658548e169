// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Schemas
//!
//! A schema is the container of procedures and aggregates. Both are
//! materialized lazily: a single lookup by id goes through the identity cache,
//! a listing loads the whole container in one catalog query.

use super::{
    Aggregate, Database, LazyDescription, MetaObject, ObjectId, ObjectKind, OverloadedObject,
    Procedure,
};
use crate::cache::ObjectCache;
use crate::error::{MetaError, MetaResult};
use crate::gateway::{CatalogQuery, CatalogRow};
use crate::monitor::ProgressMonitor;
use crate::naming::OverloadedNameOptions;
use std::sync::{Arc, Weak};

#[derive(Debug)]
pub struct Schema {
    id: ObjectId,
    name: String,
    database: Weak<Database>,
    name_options: Arc<OverloadedNameOptions>,
    description: LazyDescription,
    persisted: bool,
    procedures: ObjectCache<Procedure>,
    aggregates: ObjectCache<Aggregate>,
}

impl Schema {
    /// Materialize a schema from a `schema(s)` catalog row
    pub(crate) fn load(database: &Arc<Database>, row: &CatalogRow) -> MetaResult<Self> {
        let id = row.get_id("oid")?;
        let name = row.get_string("nspname")?;

        Ok(Self {
            id,
            name,
            database: Arc::downgrade(database),
            name_options: database.name_options().clone(),
            description: LazyDescription::default(),
            persisted: true,
            procedures: ObjectCache::new("procedure"),
            aggregates: ObjectCache::new("aggregate"),
        })
    }

    pub fn database(&self) -> MetaResult<Arc<Database>> {
        self.database
            .upgrade()
            .ok_or_else(|| MetaError::Disposed(format!("database of schema '{}'", self.name)))
    }

    /// Naming options captured from the database when this schema was loaded
    pub(crate) fn name_options(&self) -> &Arc<OverloadedNameOptions> {
        &self.name_options
    }

    /// Whether this is the backend's system schema
    pub fn is_system(&self) -> bool {
        self.database
            .upgrade()
            .map(|db| db.config().system_schema == self.name)
            .unwrap_or(false)
    }

    /// Resolve a procedure of this schema by id
    pub fn get_procedure(
        self: &Arc<Self>,
        monitor: &dyn ProgressMonitor,
        procedure_id: ObjectId,
    ) -> MetaResult<Option<Arc<Procedure>>> {
        let database = self.database()?;
        self.procedures.resolve(monitor, procedure_id, |monitor| {
            let rows = database.execute(
                monitor,
                &CatalogQuery::Procedure {
                    schema_id: self.id,
                    procedure_id,
                },
            )?;
            rows.first()
                .map(|row| Procedure::load(monitor, self, row))
                .transpose()
        })
    }

    /// All procedures of this schema, in catalog order
    pub fn get_procedures(
        self: &Arc<Self>,
        monitor: &dyn ProgressMonitor,
    ) -> MetaResult<Vec<Arc<Procedure>>> {
        let database = self.database()?;
        self.procedures.load_all(
            monitor,
            "oid",
            |monitor| database.execute(monitor, &CatalogQuery::Procedures { schema_id: self.id }),
            |monitor, row| Procedure::load(monitor, self, row),
        )
    }

    /// Every overload sharing the simple name
    pub fn get_procedures_by_name(
        self: &Arc<Self>,
        monitor: &dyn ProgressMonitor,
        name: &str,
    ) -> MetaResult<Vec<Arc<Procedure>>> {
        Ok(self
            .get_procedures(monitor)?
            .into_iter()
            .filter(|procedure| procedure.name() == name)
            .collect())
    }

    /// Find the overload whose rendered signature matches `overloaded_name`
    pub fn find_procedure_by_overloaded_name(
        self: &Arc<Self>,
        monitor: &dyn ProgressMonitor,
        overloaded_name: &str,
    ) -> MetaResult<Option<Arc<Procedure>>> {
        Ok(self
            .get_procedures(monitor)?
            .into_iter()
            .find(|procedure| procedure.overloaded_name() == overloaded_name))
    }

    /// Resolve an aggregate by the id of its backing function
    pub fn get_aggregate(
        self: &Arc<Self>,
        monitor: &dyn ProgressMonitor,
        aggregate_id: ObjectId,
    ) -> MetaResult<Option<Arc<Aggregate>>> {
        let database = self.database()?;
        self.aggregates.resolve(monitor, aggregate_id, |monitor| {
            let rows = database.execute(
                monitor,
                &CatalogQuery::Aggregate {
                    schema_id: self.id,
                    aggregate_id,
                },
            )?;
            rows.first()
                .map(|row| Aggregate::load(monitor, self, row))
                .transpose()
        })
    }

    /// All aggregates of this schema, in catalog order
    pub fn get_aggregates(
        self: &Arc<Self>,
        monitor: &dyn ProgressMonitor,
    ) -> MetaResult<Vec<Arc<Aggregate>>> {
        let database = self.database()?;
        self.aggregates.load_all(
            monitor,
            "proc_oid",
            |monitor| database.execute(monitor, &CatalogQuery::Aggregates { schema_id: self.id }),
            |monitor, row| Aggregate::load(monitor, self, row),
        )
    }

    pub fn procedure_cache(&self) -> &ObjectCache<Procedure> {
        &self.procedures
    }

    pub fn aggregate_cache(&self) -> &ObjectCache<Aggregate> {
        &self.aggregates
    }

    /// Drop every materialized child; the next access reloads from the backend
    pub fn invalidate(&self) {
        self.aggregates.invalidate();
        self.procedures.invalidate();
    }
}

impl MetaObject for Schema {
    fn object_id(&self) -> ObjectId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ObjectKind {
        ObjectKind::Schema
    }

    fn is_persisted(&self) -> bool {
        self.persisted
    }

    fn description(&self, monitor: &dyn ProgressMonitor) -> MetaResult<Option<String>> {
        self.description
            .get_or_load(|| self.database()?.load_description(monitor, self.id))
    }
}
