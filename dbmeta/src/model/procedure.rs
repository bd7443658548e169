// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Procedures and their parameters

use super::{
    Database, DataType, LazyDescription, MetaObject, ObjectId, ObjectKind, OverloadedObject,
    Schema,
};
use crate::error::{MetaError, MetaResult};
use crate::gateway::CatalogRow;
use crate::monitor::ProgressMonitor;
use crate::naming::{self, OverloadedNameOptions};
use std::fmt;
use std::sync::{Arc, Weak};

/// Routine kind, from the backend's one-letter kind code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcedureKind {
    Function,
    Procedure,
    Aggregate,
    Window,
}

impl ProcedureKind {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "f" => Some(ProcedureKind::Function),
            "p" => Some(ProcedureKind::Procedure),
            "a" => Some(ProcedureKind::Aggregate),
            "w" => Some(ProcedureKind::Window),
            _ => None,
        }
    }
}

impl fmt::Display for ProcedureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProcedureKind::Function => "function",
            ProcedureKind::Procedure => "procedure",
            ProcedureKind::Aggregate => "aggregate",
            ProcedureKind::Window => "window",
        };
        write!(f, "{}", s)
    }
}

/// Argument passing mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterMode {
    In,
    Out,
    InOut,
    Variadic,
    Table,
}

impl ParameterMode {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "i" => Some(ParameterMode::In),
            "o" => Some(ParameterMode::Out),
            "b" => Some(ParameterMode::InOut),
            "v" => Some(ParameterMode::Variadic),
            "t" => Some(ParameterMode::Table),
            _ => None,
        }
    }

    /// Parameters that are part of the call signature
    pub fn is_input(&self) -> bool {
        matches!(
            self,
            ParameterMode::In | ParameterMode::InOut | ParameterMode::Variadic
        )
    }
}

impl fmt::Display for ParameterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ParameterMode::In => "IN",
            ParameterMode::Out => "OUT",
            ParameterMode::InOut => "INOUT",
            ParameterMode::Variadic => "VARIADIC",
            ParameterMode::Table => "TABLE",
        };
        write!(f, "{}", s)
    }
}

/// One declared parameter of a procedure
#[derive(Debug, Clone)]
pub struct ProcedureParameter {
    name: Option<String>,
    position: usize,
    mode: ParameterMode,
    data_type: Arc<DataType>,
}

impl ProcedureParameter {
    pub fn new(
        name: Option<String>,
        position: usize,
        mode: ParameterMode,
        data_type: Arc<DataType>,
    ) -> Self {
        Self {
            name,
            position,
            mode,
            data_type,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// 1-based position in the full argument list
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn mode(&self) -> ParameterMode {
        self.mode
    }

    pub fn parameter_type(&self) -> &Arc<DataType> {
        &self.data_type
    }
}

/// A function, procedure, aggregate or window routine
#[derive(Debug)]
pub struct Procedure {
    id: ObjectId,
    name: String,
    schema: Weak<Schema>,
    schema_name: String,
    procedure_kind: ProcedureKind,
    return_type: Option<Arc<DataType>>,
    parameters: Vec<ProcedureParameter>,
    name_options: Arc<OverloadedNameOptions>,
    description: LazyDescription,
    persisted: bool,
}

impl Procedure {
    /// Materialize a procedure from a `procedure(s)` catalog row
    ///
    /// Return and parameter types are resolved through the database type
    /// cache. A type id the backend cannot resolve is a data integrity error.
    pub(crate) fn load(
        monitor: &dyn ProgressMonitor,
        schema: &Arc<Schema>,
        row: &CatalogRow,
    ) -> MetaResult<Self> {
        let id = row.get_id("oid")?;
        let name = row.get_string("proname")?;
        let database = schema.database()?;

        let procedure_kind = match row.get_opt_string("prokind")? {
            None => ProcedureKind::Function,
            Some(code) => ProcedureKind::from_code(&code).ok_or_else(|| {
                integrity(&name, format!("unknown procedure kind '{}'", code))
            })?,
        };

        let return_type = match row.get_opt_id("prorettype")? {
            None | Some(0) => None,
            Some(type_id) => Some(resolve_type(monitor, &database, &name, type_id)?),
        };

        let parameters = load_parameters(monitor, &database, &name, row)?;

        Ok(Self {
            id,
            name,
            schema: Arc::downgrade(schema),
            schema_name: schema.name().to_string(),
            procedure_kind,
            return_type,
            parameters,
            name_options: schema.name_options().clone(),
            description: LazyDescription::default(),
            persisted: true,
        })
    }

    pub fn schema(&self) -> Option<Arc<Schema>> {
        self.schema.upgrade()
    }

    pub fn schema_name(&self) -> &str {
        &self.schema_name
    }

    pub fn procedure_kind(&self) -> ProcedureKind {
        self.procedure_kind
    }

    /// Declared result type; `None` for routines without a result
    pub fn return_type(&self) -> Option<&Arc<DataType>> {
        self.return_type.as_ref()
    }

    /// All parameters in declared order
    pub fn parameters(&self) -> &[ProcedureParameter] {
        &self.parameters
    }

    /// Parameters forming the call signature, in declared order
    pub fn input_parameters(&self) -> Vec<&ProcedureParameter> {
        self.parameters
            .iter()
            .filter(|p| p.mode().is_input())
            .collect()
    }

    /// Overloaded name rendered with explicit options
    pub fn overloaded_name_with(&self, options: &OverloadedNameOptions) -> String {
        naming::make_overloaded_name(&self.schema_name, &self.name, &self.parameters, options)
    }

    /// True when the description has already been fetched
    pub fn is_description_loaded(&self) -> bool {
        self.description.is_loaded()
    }

    fn database(&self) -> MetaResult<Arc<Database>> {
        self.schema
            .upgrade()
            .ok_or_else(|| MetaError::Disposed(format!("schema of procedure '{}'", self.name)))?
            .database()
    }
}

impl MetaObject for Procedure {
    fn object_id(&self) -> ObjectId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ObjectKind {
        ObjectKind::Procedure
    }

    fn is_persisted(&self) -> bool {
        self.persisted
    }

    fn description(&self, monitor: &dyn ProgressMonitor) -> MetaResult<Option<String>> {
        self.description
            .get_or_load(|| self.database()?.load_description(monitor, self.id))
    }
}

impl OverloadedObject for Procedure {
    fn overloaded_name(&self) -> String {
        self.overloaded_name_with(&self.name_options)
    }
}

fn integrity(procedure: &str, message: impl Into<String>) -> MetaError {
    MetaError::data_integrity(format!("procedure '{}'", procedure), message)
}

fn resolve_type(
    monitor: &dyn ProgressMonitor,
    database: &Arc<Database>,
    procedure: &str,
    type_id: ObjectId,
) -> MetaResult<Arc<DataType>> {
    database
        .get_data_type(monitor, type_id)?
        .ok_or_else(|| integrity(procedure, format!("type {} does not exist", type_id)))
}

/// Build the parameter list
///
/// Without `proallargtypes` every entry of `proargtypes` is an IN parameter.
/// With it, `proargmodes` must describe each entry of the full list.
fn load_parameters(
    monitor: &dyn ProgressMonitor,
    database: &Arc<Database>,
    procedure: &str,
    row: &CatalogRow,
) -> MetaResult<Vec<ProcedureParameter>> {
    let input_types = row.get_id_list("proargtypes")?;
    let all_types = row.get_opt_id_list("proallargtypes")?;
    let mode_codes = row.get_opt_string_list("proargmodes")?;
    let names = row.get_opt_string_list("proargnames")?;

    let type_ids = all_types.unwrap_or(input_types);

    let modes = match mode_codes {
        None => vec![ParameterMode::In; type_ids.len()],
        Some(codes) => {
            if codes.len() != type_ids.len() {
                return Err(integrity(
                    procedure,
                    format!(
                        "{} argument modes for {} arguments",
                        codes.len(),
                        type_ids.len()
                    ),
                ));
            }
            codes
                .iter()
                .map(|code| {
                    code.as_deref()
                        .and_then(ParameterMode::from_code)
                        .ok_or_else(|| {
                            integrity(procedure, format!("invalid argument mode {:?}", code))
                        })
                })
                .collect::<MetaResult<Vec<_>>>()?
        }
    };

    if let Some(names) = &names {
        if names.len() != type_ids.len() {
            return Err(integrity(
                procedure,
                format!(
                    "{} argument names for {} arguments",
                    names.len(),
                    type_ids.len()
                ),
            ));
        }
    }

    let mut parameters = Vec::with_capacity(type_ids.len());
    for (index, (type_id, mode)) in type_ids.into_iter().zip(modes).enumerate() {
        let name = names
            .as_ref()
            .and_then(|names| names[index].clone())
            .filter(|name| !name.is_empty());
        let data_type = resolve_type(monitor, database, procedure, type_id)?;
        parameters.push(ProcedureParameter::new(name, index + 1, mode, data_type));
    }
    Ok(parameters)
}
