// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Data types
//!
//! Types are cached database-wide because procedures of any schema may
//! reference types of any other schema.

use super::{Database, LazyDescription, MetaObject, ObjectId, ObjectKind};
use crate::error::{MetaError, MetaResult};
use crate::gateway::CatalogRow;
use crate::monitor::ProgressMonitor;
use std::fmt;
use std::sync::{Arc, Weak};

/// Kind of a data type, from the backend's one-letter type code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Base,
    Composite,
    Domain,
    Enum,
    Pseudo,
    Range,
    Multirange,
}

impl TypeKind {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "b" => Some(TypeKind::Base),
            "c" => Some(TypeKind::Composite),
            "d" => Some(TypeKind::Domain),
            "e" => Some(TypeKind::Enum),
            "p" => Some(TypeKind::Pseudo),
            "r" => Some(TypeKind::Range),
            "m" => Some(TypeKind::Multirange),
            _ => None,
        }
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TypeKind::Base => "base",
            TypeKind::Composite => "composite",
            TypeKind::Domain => "domain",
            TypeKind::Enum => "enum",
            TypeKind::Pseudo => "pseudo",
            TypeKind::Range => "range",
            TypeKind::Multirange => "multirange",
        };
        write!(f, "{}", s)
    }
}

/// A data type of the database
#[derive(Debug)]
pub struct DataType {
    id: ObjectId,
    name: String,
    schema_id: ObjectId,
    schema_name: Option<String>,
    type_kind: TypeKind,
    database: Weak<Database>,
    description: LazyDescription,
    persisted: bool,
}

impl DataType {
    /// Materialize a type from a `data_type(s)` catalog row
    pub(crate) fn load(database: &Arc<Database>, row: &CatalogRow) -> MetaResult<Self> {
        let id = row.get_id("oid")?;
        let name = row.get_string("typname")?;
        let schema_id = row.get_id("typnamespace")?;
        let schema_name = row.get_opt_string("nspname")?;

        let type_kind = match row.get_opt_string("typtype")? {
            None => TypeKind::Base,
            Some(code) => TypeKind::from_code(&code).ok_or_else(|| {
                MetaError::data_integrity(
                    format!("data type '{}'", name),
                    format!("unknown type kind '{}'", code),
                )
            })?,
        };

        Ok(Self {
            id,
            name,
            schema_id,
            schema_name,
            type_kind,
            database: Arc::downgrade(database),
            description: LazyDescription::default(),
            persisted: true,
        })
    }

    pub fn schema_id(&self) -> ObjectId {
        self.schema_id
    }

    /// Name of the owning schema, when the backend reported it
    pub fn schema_name(&self) -> Option<&str> {
        self.schema_name.as_deref()
    }

    pub fn type_kind(&self) -> TypeKind {
        self.type_kind
    }

    /// `schema.name`, or the bare name when the schema is unknown
    pub fn qualified_name(&self) -> String {
        match &self.schema_name {
            Some(schema) => format!("{}.{}", schema, self.name),
            None => self.name.clone(),
        }
    }

    pub fn database(&self) -> MetaResult<Arc<Database>> {
        self.database
            .upgrade()
            .ok_or_else(|| MetaError::Disposed(format!("database of data type '{}'", self.name)))
    }
}

impl MetaObject for DataType {
    fn object_id(&self) -> ObjectId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ObjectKind {
        ObjectKind::DataType
    }

    fn is_persisted(&self) -> bool {
        self.persisted
    }

    fn description(&self, monitor: &dyn ProgressMonitor) -> MetaResult<Option<String>> {
        self.description
            .get_or_load(|| self.database()?.load_description(monitor, self.id))
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
