//! Persisted network parameters: four named arrays plus a schema version.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParamsError {
    #[error("{array} has shape {actual:?}, expected {expected:?}")]
    ShapeMismatch {
        array: &'static str,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },
    #[error("flat weight vector has {actual} values, expected {expected}")]
    WeightCount { expected: usize, actual: usize },
    #[error("unsupported params schema version {found} (supported: {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },
    #[error("malformed params json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("params file i/o: {0}")]
    Io(#[from] std::io::Error),
}

fn default_schema_version() -> u32 {
    1
}

/// Deserialized network parameters. Shapes are not trusted until the network adopts them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NetworkParams {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub weights1: Vec<Vec<f64>>,
    pub weights2: Vec<Vec<f64>>,
    pub biases1: Vec<f64>,
    pub biases2: Vec<f64>,
}

impl NetworkParams {
    pub const SCHEMA_VERSION: u32 = 1;

    pub(crate) fn check_version(&self) -> Result<(), ParamsError> {
        if self.schema_version != Self::SCHEMA_VERSION {
            return Err(ParamsError::UnsupportedVersion {
                found: self.schema_version,
                supported: Self::SCHEMA_VERSION,
            });
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self, ParamsError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, ParamsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ParamsError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ParamsError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}
