// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Execution context defaults
//!
//! The default catalog and schema of a connection, and whether they can be
//! changed. Backends without any switching capability get the `Unsupported`
//! variant: it answers every query with "no value" and rejects every change
//! with `MetaError::NotSupported`, whatever the arguments.

use crate::config::{BackendCapabilities, BootstrapDefaults};
use crate::error::{MetaError, MetaResult};
use crate::gateway::{CatalogQuery, CatalogQueryGateway};
use crate::monitor::{check_cancelled, ProgressMonitor};
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// The shared defaults of backends without switching capability
pub static UNSUPPORTED: ExecutionContextDefaults = ExecutionContextDefaults::Unsupported;

/// Current catalog/schema of an execution context
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefaultsState {
    pub catalog: Option<String>,
    pub schema: Option<String>,
}

/// Defaults of a backend that can switch catalog and/or schema
pub struct SupportingDefaults {
    capabilities: BackendCapabilities,
    gateway: Arc<dyn CatalogQueryGateway>,
    bootstrap: BootstrapDefaults,
    state: RwLock<DefaultsState>,
}

pub enum ExecutionContextDefaults {
    Supporting(SupportingDefaults),
    Unsupported,
}

impl ExecutionContextDefaults {
    /// Pick the variant for a backend capability profile
    pub fn for_backend(
        capabilities: BackendCapabilities,
        gateway: Arc<dyn CatalogQueryGateway>,
        bootstrap: BootstrapDefaults,
    ) -> Self {
        if !capabilities.supports_any() {
            log::debug!(
                "Backend '{}' cannot switch catalog or schema",
                gateway.backend_name()
            );
            return ExecutionContextDefaults::Unsupported;
        }
        ExecutionContextDefaults::Supporting(SupportingDefaults {
            capabilities,
            gateway,
            bootstrap,
            state: RwLock::new(DefaultsState::default()),
        })
    }

    pub fn unsupported() -> &'static Self {
        &UNSUPPORTED
    }

    pub fn is_supported(&self) -> bool {
        matches!(self, ExecutionContextDefaults::Supporting(_))
    }

    pub fn supports_catalog_change(&self) -> bool {
        match self {
            ExecutionContextDefaults::Supporting(s) => s.capabilities.catalog_change,
            ExecutionContextDefaults::Unsupported => false,
        }
    }

    pub fn supports_schema_change(&self) -> bool {
        match self {
            ExecutionContextDefaults::Supporting(s) => s.capabilities.schema_change,
            ExecutionContextDefaults::Unsupported => false,
        }
    }

    pub fn default_catalog(&self) -> Option<String> {
        match self {
            ExecutionContextDefaults::Supporting(s) => s.state.read().catalog.clone(),
            ExecutionContextDefaults::Unsupported => None,
        }
    }

    pub fn default_schema(&self) -> Option<String> {
        match self {
            ExecutionContextDefaults::Supporting(s) => s.state.read().schema.clone(),
            ExecutionContextDefaults::Unsupported => None,
        }
    }

    /// Switch the default catalog, and optionally the schema inside it
    pub fn set_default_catalog(
        &self,
        monitor: &dyn ProgressMonitor,
        catalog: Option<&str>,
        schema: Option<&str>,
    ) -> MetaResult<()> {
        match self {
            ExecutionContextDefaults::Supporting(s) => {
                if !s.capabilities.catalog_change {
                    return Err(MetaError::not_supported("catalog change"));
                }
                if schema.is_some() && !s.capabilities.schema_change {
                    return Err(MetaError::not_supported("schema change"));
                }
                let catalog = non_empty("catalog", catalog)?;
                let schema = schema.map(|name| non_empty("schema", Some(name))).transpose()?;
                s.switch(monitor, Some(catalog), schema)
            }
            ExecutionContextDefaults::Unsupported => {
                Err(MetaError::not_supported("catalog change"))
            }
        }
    }

    pub fn set_default_schema(
        &self,
        monitor: &dyn ProgressMonitor,
        schema: Option<&str>,
    ) -> MetaResult<()> {
        match self {
            ExecutionContextDefaults::Supporting(s) => {
                if !s.capabilities.schema_change {
                    return Err(MetaError::not_supported("schema change"));
                }
                let schema = non_empty("schema", schema)?;
                s.switch(monitor, None, Some(schema))
            }
            ExecutionContextDefaults::Unsupported => {
                Err(MetaError::not_supported("schema change"))
            }
        }
    }

    /// Re-read the defaults from the backend
    ///
    /// With `use_bootstrap_settings` the configured bootstrap catalog/schema
    /// are applied first. Returns whether the defaults changed.
    pub fn refresh_defaults(
        &self,
        monitor: &dyn ProgressMonitor,
        use_bootstrap_settings: bool,
    ) -> MetaResult<bool> {
        match self {
            ExecutionContextDefaults::Supporting(s) => s.refresh(monitor, use_bootstrap_settings),
            ExecutionContextDefaults::Unsupported => {
                Err(MetaError::not_supported("defaults refresh"))
            }
        }
    }
}

impl SupportingDefaults {
    fn switch(
        &self,
        monitor: &dyn ProgressMonitor,
        catalog: Option<&str>,
        schema: Option<&str>,
    ) -> MetaResult<()> {
        check_cancelled(monitor)?;
        let query = CatalogQuery::SwitchDefaults {
            catalog: catalog.map(str::to_string),
            schema: schema.map(str::to_string),
        };
        self.gateway.execute_catalog_query(monitor, &query)?;

        let mut state = self.state.write();
        if let Some(catalog) = catalog {
            state.catalog = Some(catalog.to_string());
        }
        if let Some(schema) = schema {
            state.schema = Some(schema.to_string());
        }
        log::info!(
            "Execution context defaults set to catalog={:?} schema={:?}",
            state.catalog,
            state.schema
        );
        Ok(())
    }

    fn refresh(&self, monitor: &dyn ProgressMonitor, use_bootstrap_settings: bool) -> MetaResult<bool> {
        if use_bootstrap_settings {
            let catalog = self
                .bootstrap
                .catalog
                .as_deref()
                .filter(|_| self.capabilities.catalog_change);
            let schema = self
                .bootstrap
                .schema
                .as_deref()
                .filter(|_| self.capabilities.schema_change);
            if catalog.is_some() || schema.is_some() {
                self.switch(monitor, catalog, schema)?;
            }
        }

        check_cancelled(monitor)?;
        let rows = self
            .gateway
            .execute_catalog_query(monitor, &CatalogQuery::CurrentDefaults)?;
        let current = match rows.first() {
            Some(row) => DefaultsState {
                catalog: row.get_opt_string("current_catalog")?,
                schema: row.get_opt_string("current_schema")?,
            },
            None => DefaultsState::default(),
        };

        let mut state = self.state.write();
        let changed = *state != current;
        if changed {
            log::debug!("Execution context defaults refreshed: {:?}", current);
            *state = current;
        }
        Ok(changed)
    }
}

fn non_empty<'a>(what: &str, name: Option<&'a str>) -> MetaResult<&'a str> {
    match name.map(str::trim) {
        Some(name) if !name.is_empty() => Ok(name),
        _ => Err(MetaError::InvalidArgument(format!(
            "{} name must not be empty",
            what
        ))),
    }
}

impl fmt::Debug for ExecutionContextDefaults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionContextDefaults::Supporting(s) => f
                .debug_struct("Supporting")
                .field("capabilities", &s.capabilities)
                .field("state", &*s.state.read())
                .finish(),
            ExecutionContextDefaults::Unsupported => f.write_str("Unsupported"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{CatalogRow, CatalogSnapshot, MemoryCatalogGateway};
    use crate::monitor::{CancellationMonitor, VoidProgressMonitor};

    fn gateway() -> Arc<MemoryCatalogGateway> {
        let mut snapshot = CatalogSnapshot::new("demo");
        snapshot.current_schema = Some("public".to_string());
        snapshot.schemas = vec![
            CatalogRow::new().with("oid", 11).with("nspname", "pg_catalog"),
            CatalogRow::new().with("oid", 2200).with("nspname", "public"),
        ];
        Arc::new(MemoryCatalogGateway::new(snapshot))
    }

    #[test]
    fn test_unsupported_rejects_everything() {
        let defaults = ExecutionContextDefaults::unsupported();
        let monitor = VoidProgressMonitor;

        assert!(!defaults.is_supported());
        assert!(!defaults.supports_catalog_change());
        assert!(!defaults.supports_schema_change());
        assert_eq!(defaults.default_catalog(), None);
        assert_eq!(defaults.default_schema(), None);

        for name in [None, Some(""), Some("public")] {
            let err = defaults.set_default_schema(&monitor, name).unwrap_err();
            assert!(matches!(err, MetaError::NotSupported(_)));
            let err = defaults.set_default_catalog(&monitor, name, name).unwrap_err();
            assert!(matches!(err, MetaError::NotSupported(_)));
        }
        for use_bootstrap in [true, false] {
            let err = defaults.refresh_defaults(&monitor, use_bootstrap).unwrap_err();
            assert!(matches!(err, MetaError::NotSupported(_)));
        }
    }

    #[test]
    fn test_no_capability_selects_unsupported() {
        let defaults = ExecutionContextDefaults::for_backend(
            BackendCapabilities::none(),
            gateway(),
            BootstrapDefaults::default(),
        );
        assert!(!defaults.is_supported());
    }

    #[test]
    fn test_supporting_refresh_and_switch() {
        let gateway = gateway();
        let defaults = ExecutionContextDefaults::for_backend(
            BackendCapabilities::schema_only(),
            gateway.clone(),
            BootstrapDefaults::default(),
        );
        let monitor = VoidProgressMonitor;

        assert_eq!(defaults.default_schema(), None);
        assert!(defaults.refresh_defaults(&monitor, false).unwrap());
        assert_eq!(defaults.default_catalog().as_deref(), Some("demo"));
        assert_eq!(defaults.default_schema().as_deref(), Some("public"));
        assert!(!defaults.refresh_defaults(&monitor, false).unwrap());

        defaults
            .set_default_schema(&monitor, Some("pg_catalog"))
            .unwrap();
        assert_eq!(defaults.default_schema().as_deref(), Some("pg_catalog"));
        assert_eq!(gateway.query_count("switch_defaults"), 1);

        // catalog switching is not part of this profile
        let err = defaults
            .set_default_catalog(&monitor, Some("demo"), None)
            .unwrap_err();
        assert!(matches!(err, MetaError::NotSupported(_)));
    }

    #[test]
    fn test_supporting_rejects_empty_and_unknown_names() {
        let defaults = ExecutionContextDefaults::for_backend(
            BackendCapabilities::full(),
            gateway(),
            BootstrapDefaults::default(),
        );
        let monitor = VoidProgressMonitor;

        let err = defaults.set_default_schema(&monitor, Some(" ")).unwrap_err();
        assert!(matches!(err, MetaError::InvalidArgument(_)));
        let err = defaults.set_default_catalog(&monitor, None, None).unwrap_err();
        assert!(matches!(err, MetaError::InvalidArgument(_)));

        let err = defaults
            .set_default_schema(&monitor, Some("missing"))
            .unwrap_err();
        assert!(matches!(err, MetaError::Query(_)));
        assert_eq!(defaults.default_schema(), None);
    }

    #[test]
    fn test_refresh_applies_bootstrap_settings() {
        let gateway = gateway();
        let defaults = ExecutionContextDefaults::for_backend(
            BackendCapabilities::schema_only(),
            gateway.clone(),
            BootstrapDefaults {
                catalog: None,
                schema: Some("pg_catalog".to_string()),
            },
        );

        defaults
            .refresh_defaults(&VoidProgressMonitor, true)
            .unwrap();
        assert_eq!(defaults.default_schema().as_deref(), Some("pg_catalog"));
        assert_eq!(gateway.query_count("switch_defaults"), 1);
        assert_eq!(gateway.query_count("current_defaults"), 1);
    }

    #[test]
    fn test_cancelled_switch_issues_no_query() {
        let gateway = gateway();
        let defaults = ExecutionContextDefaults::for_backend(
            BackendCapabilities::schema_only(),
            gateway.clone(),
            BootstrapDefaults::default(),
        );
        let monitor = CancellationMonitor::new();
        monitor.cancel();

        let err = defaults
            .set_default_schema(&monitor, Some("public"))
            .unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(gateway.total_queries(), 0);
    }
}
