// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Command-line argument definitions

use clap::{Parser, Subcommand, ValueEnum};
use dbmeta::QualificationPolicy;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "dbmeta")]
#[command(about = "Browse database catalog snapshots", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log level (overridden by --verbose)
    #[arg(long, global = true, value_enum)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show version information
    Version,

    /// List the schemas of a catalog snapshot
    Schemas {
        #[command(flatten)]
        source: SnapshotArgs,
    },

    /// List the procedures of a schema
    Procedures {
        #[command(flatten)]
        source: SnapshotArgs,

        /// Schema name
        #[arg(short, long, default_value = "public")]
        schema: String,
    },

    /// List the aggregates of a schema with their signatures
    Aggregates {
        #[command(flatten)]
        source: SnapshotArgs,

        /// Schema name
        #[arg(short, long, default_value = "public")]
        schema: String,

        /// Schema qualification of overloaded names
        #[arg(short, long, value_enum)]
        qualification: Option<Qualification>,
    },

    /// Show the execution context defaults
    Defaults {
        #[command(flatten)]
        source: SnapshotArgs,

        /// Switch the default schema before showing the defaults
        #[arg(long)]
        set_schema: Option<String>,
    },
}

/// Arguments shared by every command reading a snapshot
#[derive(clap::Args, Debug, Clone)]
pub struct SnapshotArgs {
    /// Catalog snapshot file (JSON)
    #[arg(long)]
    pub snapshot: PathBuf,

    /// Model configuration file (JSON)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Qualification {
    Never,
    Minimal,
    Always,
}

impl From<Qualification> for QualificationPolicy {
    fn from(value: Qualification) -> Self {
        match value {
            Qualification::Never => QualificationPolicy::Never,
            Qualification::Minimal => QualificationPolicy::Minimal,
            Qualification::Always => QualificationPolicy::Always,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
    Off,
}

impl LogLevel {
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
            LogLevel::Off => log::LevelFilter::Off,
        }
    }
}
