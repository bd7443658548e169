// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Overloaded name formatting
//!
//! Routines may share a simple name and differ only by their input parameter
//! types. Their display identity is `name(type1,type2,...)`, built from the
//! input parameters in declared order. Output parameters and the return type
//! never take part in the signature.

use crate::config::ModelConfig;
use crate::model::{MetaObject, ProcedureParameter};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashSet;

/// When schema prefixes appear in overloaded names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum QualificationPolicy {
    /// Bare routine and type names
    Never,
    /// Only parameter types living outside the routine's schema and outside
    /// the system schema carry their schema
    #[default]
    Minimal,
    /// The routine name and every parameter type carry their schema
    Always,
}

/// Formatter settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverloadedNameOptions {
    pub qualification: QualificationPolicy,
    pub quote_identifiers: bool,
    pub show_param_names: bool,
    pub system_schema: String,
}

impl Default for OverloadedNameOptions {
    fn default() -> Self {
        ModelConfig::default().name_options()
    }
}

static PLAIN_IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z_][a-z0-9_$]*$").expect("valid identifier pattern"));

static RESERVED_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "all", "analyse", "analyze", "and", "any", "array", "as", "asc", "asymmetric", "both",
        "case", "cast", "check", "collate", "column", "constraint", "create", "current_catalog",
        "current_date", "current_role", "current_schema", "current_time", "current_timestamp",
        "current_user", "default", "deferrable", "desc", "distinct", "do", "else", "end",
        "except", "false", "fetch", "for", "foreign", "from", "grant", "group", "having", "in",
        "initially", "intersect", "into", "lateral", "leading", "limit", "localtime",
        "localtimestamp", "not", "null", "offset", "on", "only", "or", "order", "placing",
        "primary", "references", "returning", "select", "session_user", "some", "symmetric",
        "table", "then", "to", "trailing", "true", "union", "unique", "user", "using",
        "variadic", "when", "where", "window", "with",
    ]
    .into_iter()
    .collect()
});

/// Quote an identifier unless it is a plain lower-case, non-reserved name
pub fn quote_identifier(name: &str) -> Cow<'_, str> {
    if PLAIN_IDENTIFIER.is_match(name) && !RESERVED_WORDS.contains(name) {
        Cow::Borrowed(name)
    } else {
        Cow::Owned(format!("\"{}\"", name.replace('"', "\"\"")))
    }
}

fn identifier<'a>(name: &'a str, options: &OverloadedNameOptions) -> Cow<'a, str> {
    if options.quote_identifiers {
        quote_identifier(name)
    } else {
        Cow::Borrowed(name)
    }
}

/// Render `name(type,...)` for a routine of `schema_name`
///
/// Only input parameters (IN, INOUT, VARIADIC) are rendered, in declared
/// order, so two overloads differing in argument types or argument order get
/// different names.
pub fn make_overloaded_name(
    schema_name: &str,
    name: &str,
    parameters: &[ProcedureParameter],
    options: &OverloadedNameOptions,
) -> String {
    let mut signature = String::with_capacity(name.len() + 16 * parameters.len() + 2);

    if options.qualification == QualificationPolicy::Always {
        signature.push_str(&identifier(schema_name, options));
        signature.push('.');
    }
    signature.push_str(&identifier(name, options));

    signature.push('(');
    let inputs = parameters.iter().filter(|p| p.mode().is_input());
    for (index, param) in inputs.enumerate() {
        if index > 0 {
            signature.push(',');
        }
        if options.show_param_names {
            if let Some(param_name) = param.name() {
                signature.push_str(&identifier(param_name, options));
                signature.push(' ');
            }
        }
        signature.push_str(&type_reference(param, schema_name, options));
    }
    signature.push(')');
    signature
}

/// Parameter type as it appears in a signature
fn type_reference(
    param: &ProcedureParameter,
    routine_schema: &str,
    options: &OverloadedNameOptions,
) -> String {
    let data_type = param.parameter_type();
    let type_name = data_type.name();
    let type_schema = match data_type.schema_name() {
        Some(schema) => schema,
        None => return type_name.to_string(),
    };

    let qualify = match options.qualification {
        QualificationPolicy::Never => false,
        QualificationPolicy::Minimal => {
            type_schema != routine_schema && type_schema != options.system_schema
        }
        QualificationPolicy::Always => true,
    };

    if qualify {
        format!("{}.{}", identifier(type_schema, options), type_name)
    } else {
        type_name.to_string()
    }
}
