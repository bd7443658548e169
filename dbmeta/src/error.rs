// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Error types for the catalog object model

use crate::gateway::GatewayError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MetaError {
    #[error("Data integrity error in {object}: {message}")]
    DataIntegrity { object: String, message: String },

    #[error("Connectivity error: {0}")]
    Connectivity(String),

    #[error("Catalog query failed: {0}")]
    Query(String),

    #[error("Feature not supported: {0}")]
    NotSupported(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Object disposed: {0}")]
    Disposed(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Snapshot error: {0}")]
    Snapshot(String),
}

impl MetaError {
    pub fn data_integrity(object: impl Into<String>, message: impl Into<String>) -> Self {
        MetaError::DataIntegrity {
            object: object.into(),
            message: message.into(),
        }
    }

    pub fn not_supported(feature: impl Into<String>) -> Self {
        MetaError::NotSupported(feature.into())
    }

    /// True when the failure is a cooperative abort rather than a real error
    pub fn is_cancelled(&self) -> bool {
        matches!(self, MetaError::Cancelled)
    }

    /// Failures that should surface as user-visible notifications
    pub fn is_user_visible(&self) -> bool {
        matches!(
            self,
            MetaError::DataIntegrity { .. }
                | MetaError::Connectivity(_)
                | MetaError::Query(_)
                | MetaError::NotSupported(_)
        )
    }
}

impl From<GatewayError> for MetaError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Connectivity(msg) => MetaError::Connectivity(msg),
            GatewayError::Query(msg) => MetaError::Query(msg),
        }
    }
}

impl From<serde_json::Error> for MetaError {
    fn from(err: serde_json::Error) -> Self {
        MetaError::Snapshot(err.to_string())
    }
}

impl From<std::io::Error> for MetaError {
    fn from(err: std::io::Error) -> Self {
        MetaError::Snapshot(err.to_string())
    }
}

pub type MetaResult<T> = Result<T, MetaError>;
