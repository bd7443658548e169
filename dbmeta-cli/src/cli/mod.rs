// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! CLI module for dbmeta
//!
//! Loads a catalog snapshot into the object model and prints schemas,
//! procedures, aggregates and execution context defaults.

pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{Cli, Commands};
pub use handlers::{handle_aggregates, handle_defaults, handle_procedures, handle_schemas};
