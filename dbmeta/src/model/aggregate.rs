// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Aggregate functions
//!
//! An aggregate is a thin view over its backing function. The function is
//! resolved by id through the owning schema when the aggregate is loaded;
//! when it cannot be found the aggregate stays valid and every derived
//! attribute reports "no value".

use super::{DataType, MetaObject, ObjectId, ObjectKind, OverloadedObject, Procedure, Schema};
use crate::error::MetaResult;
use crate::gateway::CatalogRow;
use crate::monitor::ProgressMonitor;
use crate::naming::{self, OverloadedNameOptions};
use std::sync::{Arc, Weak};

#[derive(Debug)]
pub struct Aggregate {
    id: ObjectId,
    name: String,
    schema: Weak<Schema>,
    schema_name: String,
    function: Option<Arc<Procedure>>,
    name_options: Arc<OverloadedNameOptions>,
    persisted: bool,
}

impl Aggregate {
    /// Materialize an aggregate from an `aggregate(s)` catalog row
    pub(crate) fn load(
        monitor: &dyn ProgressMonitor,
        schema: &Arc<Schema>,
        row: &CatalogRow,
    ) -> MetaResult<Self> {
        let id = row.get_id("proc_oid")?;
        let name = row.get_string("proc_name")?;

        let function = schema.get_procedure(monitor, id)?;
        if function.is_none() {
            log::debug!(
                "Aggregate '{}.{}' ({}): backing function not found",
                schema.name(),
                name,
                id
            );
        }

        Ok(Self {
            id,
            name,
            schema: Arc::downgrade(schema),
            schema_name: schema.name().to_string(),
            function,
            name_options: schema.name_options().clone(),
            persisted: true,
        })
    }

    pub fn schema(&self) -> Option<Arc<Schema>> {
        self.schema.upgrade()
    }

    /// Backing function, if the backend could resolve it
    pub fn function(&self) -> Option<&Arc<Procedure>> {
        self.function.as_ref()
    }

    /// Types of the function's input parameters, in declared order
    pub fn input_types(&self) -> Option<Vec<Arc<DataType>>> {
        self.function.as_ref().map(|function| {
            function
                .input_parameters()
                .into_iter()
                .map(|param| param.parameter_type().clone())
                .collect()
        })
    }

    pub fn output_type(&self) -> Option<Arc<DataType>> {
        self.function
            .as_ref()
            .and_then(|function| function.return_type().cloned())
    }

    pub fn overloaded_name_with(&self, options: &OverloadedNameOptions) -> String {
        match &self.function {
            None => self.name.clone(),
            Some(function) => naming::make_overloaded_name(
                &self.schema_name,
                &self.name,
                function.parameters(),
                options,
            ),
        }
    }
}

impl MetaObject for Aggregate {
    fn object_id(&self) -> ObjectId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ObjectKind {
        ObjectKind::Aggregate
    }

    fn is_persisted(&self) -> bool {
        self.persisted
    }

    /// Delegates to the backing function, so it is free once the function's
    /// description has been loaded
    fn description(&self, monitor: &dyn ProgressMonitor) -> MetaResult<Option<String>> {
        match &self.function {
            None => Ok(None),
            Some(function) => function.description(monitor),
        }
    }
}

impl OverloadedObject for Aggregate {
    fn overloaded_name(&self) -> String {
        self.overloaded_name_with(&self.name_options)
    }
}
