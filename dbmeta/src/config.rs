// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Object model configuration and policies

use crate::error::{MetaError, MetaResult};
use crate::naming::{OverloadedNameOptions, QualificationPolicy};
use serde::{Deserialize, Serialize};

/// Configuration of a catalog object model instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Overloaded name rendering
    pub naming: NamingConfig,

    /// Schema whose types never need qualification
    pub system_schema: String,

    /// What the backend's execution context can do
    pub capabilities: BackendCapabilities,

    /// Defaults re-applied by `refresh_defaults(.., true)`
    pub bootstrap: BootstrapDefaults,

    /// Worker threads used by parallel warm-up (0 = rayon default)
    pub warm_up_threads: usize,
}

/// Overloaded name rendering settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    /// When schema prefixes are added to names and parameter types
    pub qualification: QualificationPolicy,

    /// Quote identifiers that would not survive unquoted
    pub quote_identifiers: bool,

    /// Render parameter names in front of their types
    pub show_param_names: bool,
}

/// Capability profile of a backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendCapabilities {
    /// The active catalog (database) can be switched on a live connection
    pub catalog_change: bool,

    /// The active schema can be switched on a live connection
    pub schema_change: bool,
}

impl BackendCapabilities {
    /// Backend without any execution context switching
    pub fn none() -> Self {
        Self::default()
    }

    /// Typical server that switches schemas but not databases
    pub fn schema_only() -> Self {
        Self {
            catalog_change: false,
            schema_change: true,
        }
    }

    pub fn full() -> Self {
        Self {
            catalog_change: true,
            schema_change: true,
        }
    }

    pub fn supports_any(&self) -> bool {
        self.catalog_change || self.schema_change
    }
}

/// Catalog/schema an execution context is reset to
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapDefaults {
    pub catalog: Option<String>,
    pub schema: Option<String>,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            qualification: QualificationPolicy::Minimal,
            quote_identifiers: true,
            show_param_names: false,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            naming: NamingConfig::default(),
            system_schema: "pg_catalog".to_string(),
            capabilities: BackendCapabilities::schema_only(),
            bootstrap: BootstrapDefaults::default(),
            warm_up_threads: 0,
        }
    }
}

impl ModelConfig {
    /// Configuration for drivers that cannot switch catalog or schema
    pub fn unsupported_backend() -> Self {
        Self {
            capabilities: BackendCapabilities::none(),
            ..Self::default()
        }
    }

    /// Configuration rendering fully qualified overloaded names
    pub fn fully_qualified() -> Self {
        let mut config = Self::default();
        config.naming.qualification = QualificationPolicy::Always;
        config
    }

    pub fn from_json_str(json: &str) -> MetaResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| MetaError::Config(e.to_string()))?;
        config.validate().map_err(MetaError::Config)?;
        Ok(config)
    }

    /// Formatter options derived from this configuration
    pub fn name_options(&self) -> OverloadedNameOptions {
        OverloadedNameOptions {
            qualification: self.naming.qualification,
            quote_identifiers: self.naming.quote_identifiers,
            show_param_names: self.naming.show_param_names,
            system_schema: self.system_schema.clone(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.system_schema.trim().is_empty() {
            return Err("system_schema must not be empty".to_string());
        }

        if self.bootstrap.catalog.is_some() && !self.capabilities.catalog_change {
            return Err(
                "bootstrap catalog requires a backend with catalog_change capability".to_string(),
            );
        }

        if self.bootstrap.schema.is_some() && !self.capabilities.schema_change {
            return Err(
                "bootstrap schema requires a backend with schema_change capability".to_string(),
            );
        }

        for name in [&self.bootstrap.catalog, &self.bootstrap.schema]
            .into_iter()
            .flatten()
        {
            if name.trim().is_empty() {
                return Err("bootstrap names must not be empty".to_string());
            }
        }

        Ok(())
    }
}
