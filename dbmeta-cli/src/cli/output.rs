// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Listing formatting for CLI output

use super::commands::OutputFormat;
use colored::*;
use comfy_table::{presets::UTF8_FULL, Cell, Color, Table};
use serde::Serialize;

/// A listing entry that can be rendered as a table row
pub trait TableRow: Serialize {
    fn headers() -> &'static [&'static str];
    fn cells(&self) -> Vec<String>;
}

#[derive(Debug, Serialize)]
pub struct SchemaRow {
    pub id: u64,
    pub name: String,
    pub system: bool,
    pub description: Option<String>,
}

impl TableRow for SchemaRow {
    fn headers() -> &'static [&'static str] {
        &["id", "name", "system", "description"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.system.to_string(),
            display_opt(&self.description),
        ]
    }
}

#[derive(Debug, Serialize)]
pub struct ProcedureRow {
    pub id: u64,
    pub kind: String,
    pub signature: String,
    pub returns: Option<String>,
    pub description: Option<String>,
}

impl TableRow for ProcedureRow {
    fn headers() -> &'static [&'static str] {
        &["id", "kind", "signature", "returns", "description"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.kind.clone(),
            self.signature.clone(),
            display_opt(&self.returns),
            display_opt(&self.description),
        ]
    }
}

#[derive(Debug, Serialize)]
pub struct AggregateRow {
    pub id: u64,
    pub name: String,
    pub signature: String,
    pub input_types: Option<Vec<String>>,
    pub output_type: Option<String>,
    pub description: Option<String>,
}

impl TableRow for AggregateRow {
    fn headers() -> &'static [&'static str] {
        &["id", "name", "signature", "inputs", "output", "description"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.signature.clone(),
            self.input_types
                .as_ref()
                .map(|types| types.join(", "))
                .unwrap_or_else(|| "NULL".to_string()),
            display_opt(&self.output_type),
            display_opt(&self.description),
        ]
    }
}

#[derive(Debug, Serialize)]
pub struct DefaultsRow {
    pub supported: bool,
    pub catalog_change: bool,
    pub schema_change: bool,
    pub default_catalog: Option<String>,
    pub default_schema: Option<String>,
}

impl TableRow for DefaultsRow {
    fn headers() -> &'static [&'static str] {
        &[
            "supported",
            "catalog change",
            "schema change",
            "catalog",
            "schema",
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.supported.to_string(),
            self.catalog_change.to_string(),
            self.schema_change.to_string(),
            display_opt(&self.default_catalog),
            display_opt(&self.default_schema),
        ]
    }
}

fn display_opt(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| "NULL".to_string())
}

/// Listing formatter for different output formats
pub struct ListingFormatter;

impl ListingFormatter {
    pub fn format<R: TableRow>(title: &str, rows: &[R], format: OutputFormat) -> String {
        match format {
            OutputFormat::Table => Self::format_table(title, rows),
            OutputFormat::Json => Self::format_json(title, rows),
        }
    }

    /// Format a listing as a table using comfy-table
    fn format_table<R: TableRow>(title: &str, rows: &[R]) -> String {
        if rows.is_empty() {
            return format!("{}\n", format!("No {} found", title).yellow());
        }

        let mut output = String::new();
        output.push_str(&format!("{}\n", title.bold().green()));
        output.push_str(&format!("Rows returned: {}\n\n", rows.len()));

        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(
            R::headers()
                .iter()
                .map(|header| Cell::new(header).fg(Color::Green))
                .collect::<Vec<_>>(),
        );
        for row in rows {
            table.add_row(row.cells());
        }

        output.push_str(&table.to_string());
        output.push('\n');
        output
    }

    fn format_json<R: TableRow>(title: &str, rows: &[R]) -> String {
        let json_result = serde_json::json!({
            "status": "success",
            "listing": title,
            "rows": rows,
            "count": rows.len(),
        });

        let mut output = serde_json::to_string_pretty(&json_result).unwrap_or_else(|_| {
            "{\"status\": \"error\", \"error\": \"Could not serialize listing to JSON\"}".to_string()
        });
        output.push('\n');
        output
    }
}
