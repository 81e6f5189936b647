//! Persisted run records.
//!
//! A run record is the flat JSON document written next to every measurement:
//! a value tree (no descriptor wrappers) with a fixed top-level shape plus
//! whatever ad hoc keys external tools have attached. The record itself
//! stores plain values; the catalog re-attaches metadata on demand.

use std::fs;
use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use thiserror::Error;

use labrig_param_tree as param_tree;

use crate::catalog;
use crate::node::Node;

/// Version tag written into every record, bumped when the catalog shape
/// changes incompatibly. External reformatting scripts key off it.
pub const PARAMETERS_FORMAT_VERSION: i64 = 4;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("record io failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("record parse failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown procedure: {0}")]
    UnknownProcedure(String),
    #[error("format version {found} not supported (current is {current})")]
    FormatVersion { found: i64, current: i64 },
}

/// A saved experiment parameter record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    #[serde(rename = "runType")]
    pub run_type: String,
    #[serde(rename = "Identifiers")]
    pub identifiers: Value,
    #[serde(rename = "runConfigs")]
    pub run_configs: Value,
    #[serde(rename = "MeasurementSystem")]
    pub measurement_system: Value,
    #[serde(rename = "ParametersFormatVersion")]
    pub parameters_format_version: i64,
    /// Ad hoc top-level keys, preserved verbatim.
    #[serde(flatten)]
    pub extras: Map<String, Value>,
}

impl RunRecord {
    /// Builds a fresh record for one procedure, seeded from catalog
    /// defaults.
    pub fn new(run_type: &str) -> Result<RunRecord, RecordError> {
        if !catalog::procedure_names().iter().any(|name| name == run_type) {
            return Err(RecordError::UnknownProcedure(run_type.to_string()));
        }
        let defaults = catalog::defaults();
        let mut run_configs = Map::new();
        run_configs.insert(run_type.to_string(), defaults["runConfigs"][run_type].clone());
        Ok(RunRecord {
            run_type: run_type.to_string(),
            identifiers: defaults["Identifiers"].clone(),
            run_configs: Value::Object(run_configs),
            measurement_system: defaults["MeasurementSystem"].clone(),
            parameters_format_version: PARAMETERS_FORMAT_VERSION,
            extras: Map::new(),
        })
    }

    pub fn from_value(value: Value) -> Result<RunRecord, RecordError> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn from_json_str(raw: &str) -> Result<RunRecord, RecordError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Reads a record from disk. A stale format version loads fine (external
    /// scripts reformat on their own schedule) but is logged.
    pub fn load(path: impl AsRef<Path>) -> Result<RunRecord, RecordError> {
        let raw = fs::read_to_string(path)?;
        let record = RunRecord::from_json_str(&raw)?;
        if record.needs_reformat() {
            warn!(
                "run record has format version {}, current is {}",
                record.parameters_format_version, PARAMETERS_FORMAT_VERSION
            );
        }
        Ok(record)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), RecordError> {
        fs::write(path, self.to_json_string_pretty()?)?;
        Ok(())
    }

    /// The record as a plain value tree, extras included.
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("runType".to_string(), Value::String(self.run_type.clone()));
        map.insert("Identifiers".to_string(), self.identifiers.clone());
        map.insert("runConfigs".to_string(), self.run_configs.clone());
        map.insert(
            "MeasurementSystem".to_string(),
            self.measurement_system.clone(),
        );
        map.insert(
            "ParametersFormatVersion".to_string(),
            json!(self.parameters_format_version),
        );
        for (key, value) in &self.extras {
            map.insert(key.clone(), value.clone());
        }
        Value::Object(map)
    }

    pub fn to_json_string(&self) -> Result<String, RecordError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_string_pretty(&self) -> Result<String, RecordError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// True when the record was written under an older catalog shape.
    pub fn needs_reformat(&self) -> bool {
        self.parameters_format_version != PARAMETERS_FORMAT_VERSION
    }

    /// Checks the record against the catalog: the procedure must exist and
    /// the format version must be current.
    pub fn validate(&self) -> Result<(), RecordError> {
        if !catalog::procedure_names().iter().any(|name| name == &self.run_type) {
            return Err(RecordError::UnknownProcedure(self.run_type.clone()));
        }
        if self.needs_reformat() {
            return Err(RecordError::FormatVersion {
                found: self.parameters_format_version,
                current: PARAMETERS_FORMAT_VERSION,
            });
        }
        Ok(())
    }

    /// The full parameter set for this run: catalog defaults with the
    /// record's values merged on top.
    pub fn resolved_parameters(&self) -> Value {
        param_tree::merge_layers(vec![catalog::defaults(), self.to_value()])
    }

    /// Re-attaches catalog metadata around the record's values, shaped by
    /// the record (keys the record does not carry are absent).
    pub fn hydrated(&self) -> Node {
        catalog::canonical().hydrate(&self.to_value())
    }

    /// The whole catalog with the record's values written through to the
    /// matching descriptors' defaults.
    pub fn resolved_schema(&self) -> Node {
        catalog::canonical().merge_overrides(&self.to_value())
    }

    /// Dot-paths of essential parameters the record does not supply.
    ///
    /// Only the active procedure's parameters are considered; essentials of
    /// other procedures are not required for this run. The check is for key
    /// presence, so an empty string counts as supplied.
    pub fn missing_essentials(&self) -> Vec<String> {
        let record = self.to_value();
        let run_prefix = format!("runConfigs.{}.", self.run_type);
        let mut missing = Vec::new();
        for path in catalog::essentials().leaf_paths() {
            if path.starts_with("runConfigs.") && !path.starts_with(&run_prefix) {
                continue;
            }
            if lookup(&record, &path).is_none() {
                missing.push(path);
            }
        }
        missing
    }
}

fn lookup<'a>(tree: &'a Value, path: &str) -> Option<&'a Value> {
    let mut node = tree;
    for part in path.split('.') {
        node = node.as_object()?.get(part)?;
    }
    Some(node)
}
