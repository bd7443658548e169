// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Catalog object model
//!
//! Objects form a tree rooted at [`Database`]: schemas own procedures and
//! aggregates, procedures own their parameters, parameters point at data
//! types. Children keep weak back-references to their parent; parents own
//! their children through identity caches.

pub mod aggregate;
pub mod data_type;
pub mod database;
pub mod procedure;
pub mod schema;

pub use aggregate::Aggregate;
pub use data_type::{DataType, TypeKind};
pub use database::{Database, WarmUpReport};
pub use procedure::{ParameterMode, Procedure, ProcedureKind, ProcedureParameter};
pub use schema::Schema;

use crate::error::MetaResult;
use crate::monitor::ProgressMonitor;
use once_cell::sync::OnceCell;
use std::fmt;

/// Backend-assigned object identifier
pub type ObjectId = u64;

/// Object variants of the catalog graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Schema,
    Procedure,
    Aggregate,
    DataType,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ObjectKind::Schema => "schema",
            ObjectKind::Procedure => "procedure",
            ObjectKind::Aggregate => "aggregate",
            ObjectKind::DataType => "data type",
        };
        write!(f, "{}", s)
    }
}

/// Capabilities shared by every materialized catalog object
pub trait MetaObject: Send + Sync {
    /// Stable identifier, unique within the parent container
    fn object_id(&self) -> ObjectId;

    /// Simple name; not unique across overloads
    fn name(&self) -> &str;

    fn kind(&self) -> ObjectKind;

    /// True once the defining catalog query has been read
    fn is_persisted(&self) -> bool;

    /// Comment attached to the object, fetched on first access
    fn description(&self, monitor: &dyn ProgressMonitor) -> MetaResult<Option<String>>;
}

/// Objects whose display identity includes their parameter signature
pub trait OverloadedObject: MetaObject {
    fn overloaded_name(&self) -> String;
}

/// Description loaded on first access through a separate catalog query
///
/// Concurrent first accesses issue a single query. A failed or cancelled load
/// leaves the cell empty so the next access retries.
#[derive(Debug, Default)]
pub(crate) struct LazyDescription {
    cell: OnceCell<Option<String>>,
}

impl LazyDescription {
    pub(crate) fn get_or_load<F>(&self, load: F) -> MetaResult<Option<String>>
    where
        F: FnOnce() -> MetaResult<Option<String>>,
    {
        self.cell.get_or_try_init(load).cloned()
    }

    pub(crate) fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }
}
