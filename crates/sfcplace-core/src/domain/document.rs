//! Raw input document, as produced by the scenario generator.
//!
//! The document is deserialized as-is and only checked for schema
//! conformance here; range and reference checks happen when it is turned
//! into a [`Scenario`](super::Scenario).

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Serialized form of a placement problem.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioDocument {
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,
    #[serde(default)]
    pub edges: Vec<EdgeSpec>,
    #[serde(default)]
    pub vnfs: Vec<VnfSpec>,
    #[serde(default)]
    pub sfcs: Vec<SfcSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NodeSpec {
    pub id: String,
    pub compute: u64,
    pub memory: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EdgeSpec {
    pub a: String,
    pub b: String,
    pub latency: u64,
    pub bandwidth: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VnfSpec {
    pub id: String,
    pub compute: u64,
    pub memory: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SfcSpec {
    pub id: String,
    pub chain: Vec<String>,
    pub bandwidth: u64,
    pub latency_budget: u64,
    pub origin: String,
}

/// Input encodings accepted for scenario documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentFormat {
    #[default]
    Json,
    Yaml,
    Toml,
}

impl DocumentFormat {
    /// Picks the format from a file extension; unknown extensions read as JSON.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("yaml") | Some("yml") => DocumentFormat::Yaml,
            Some("toml") => DocumentFormat::Toml,
            _ => DocumentFormat::Json,
        }
    }
}

impl ScenarioDocument {
    /// Reads a document from disk, choosing the decoder by extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents, DocumentFormat::from_path(path))
    }

    pub fn parse(contents: &str, format: DocumentFormat) -> Result<Self> {
        match format {
            DocumentFormat::Json => Self::from_json_str(contents),
            DocumentFormat::Yaml => Self::from_yaml_str(contents),
            DocumentFormat::Toml => Self::from_toml_str(contents),
        }
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_yaml_str(s: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(s)?)
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Serializes the document as pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
