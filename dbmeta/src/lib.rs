// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! dbmeta - A lazily resolved database catalog object model
//!
//! dbmeta exposes the schemas, procedures, aggregates and data types of a
//! relational backend as a graph of metadata objects. Objects are read from
//! the backend on first access through a [`CatalogQueryGateway`] and shared
//! through per-container identity caches afterwards.
//!
//! # Features
//!
//! - **Lazy resolution**: cross-object references (aggregate to function,
//!   parameter to type) are resolved on demand and never fail on "not found"
//! - **Identity caching**: one live object per (container, id), with a single
//!   catalog query per key even under concurrent access
//! - **Overloaded names**: `name(type1,type2)` signatures with a configurable
//!   schema qualification policy
//! - **Capability defaults**: backends that cannot switch catalog or schema
//!   degrade to an `Unsupported` variant instead of failing at runtime
//! - **Cooperative cancellation**: every load polls a [`ProgressMonitor`]
//!
//! # Usage
//!
//! ```ignore
//! use dbmeta::{CatalogSnapshot, Database, MemoryCatalogGateway, ModelConfig, VoidProgressMonitor};
//! use std::sync::Arc;
//!
//! let snapshot = CatalogSnapshot::from_file("catalog.json")?;
//! let gateway = Arc::new(MemoryCatalogGateway::new(snapshot));
//! let db = Database::open("demo", gateway, ModelConfig::default())?;
//!
//! let monitor = VoidProgressMonitor;
//! if let Some(public) = db.get_schema_by_name(&monitor, "public")? {
//!     for aggregate in public.get_aggregates(&monitor)? {
//!         println!("{}", aggregate.overloaded_name());
//!     }
//! }
//! ```

pub mod cache;
pub mod config;
pub mod defaults;
pub mod error;
pub mod gateway;
pub mod model;
pub mod monitor;
pub mod naming;

pub use cache::ObjectCache;
pub use config::{BackendCapabilities, BootstrapDefaults, ModelConfig, NamingConfig};
pub use defaults::{DefaultsState, ExecutionContextDefaults, SupportingDefaults};
pub use error::{MetaError, MetaResult};
pub use gateway::{
    CatalogQuery, CatalogQueryGateway, CatalogRow, CatalogSnapshot, GatewayError, GatewayResult,
    MemoryCatalogGateway,
};
pub use model::{
    Aggregate, DataType, Database, MetaObject, ObjectId, ObjectKind, OverloadedObject,
    ParameterMode, Procedure, ProcedureKind, ProcedureParameter, Schema, TypeKind, WarmUpReport,
};
pub use monitor::{CancellationMonitor, ProgressMonitor, VoidProgressMonitor};
pub use naming::{make_overloaded_name, quote_identifier, OverloadedNameOptions, QualificationPolicy};

/// dbmeta version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// dbmeta crate name
pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
