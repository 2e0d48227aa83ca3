use crate::error::{ExperimentError, ExperimentResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// How the research is conducted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    #[default]
    Traditional,
    Collective,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Traditional => write!(f, "traditional"),
            Method::Collective => write!(f, "collective"),
        }
    }
}

/// The header every experiment declares up front.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentMetadata {
    pub research_question: String,
    pub hypothesis: String,
    pub method: Method,
}

impl Default for ExperimentMetadata {
    fn default() -> Self {
        Self {
            research_question: "[Your question here]".to_string(),
            hypothesis: "[Your hypothesis]".to_string(),
            method: Method::default(),
        }
    }
}

impl ExperimentMetadata {
    pub fn new(research_question: impl Into<String>, hypothesis: impl Into<String>) -> Self {
        Self {
            research_question: research_question.into(),
            hypothesis: hypothesis.into(),
            method: Method::default(),
        }
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }
}

/// Initial conditions of a run. Two runs started from equal configs are
/// expected to produce equal metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub name: String,
    pub seed: u64,
    pub metadata: ExperimentMetadata,
    pub parameters: BTreeMap<String, f64>,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            name: "experiment-template".to_string(),
            seed: 0,
            metadata: ExperimentMetadata::default(),
            parameters: BTreeMap::new(),
        }
    }
}

impl ExperimentConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_metadata(mut self, metadata: ExperimentMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: f64) -> Self {
        self.parameters.insert(name.into(), value);
        self
    }

    pub fn parameter(&self, name: &str) -> Option<f64> {
        self.parameters.get(name).copied()
    }

    pub fn from_toml_str(source: &str) -> ExperimentResult<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> ExperimentResult<Self> {
        let path = path.as_ref();
        tracing::debug!("Loading experiment config from {}", path.display());
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> ExperimentResult<()> {
        if self.name.trim().is_empty() {
            return Err(ExperimentError::invalid_config(
                "Experiment name cannot be empty",
            ));
        }

        for (name, value) in &self.parameters {
            if name.trim().is_empty() {
                return Err(ExperimentError::invalid_config(
                    "Parameter names cannot be empty",
                ));
            }
            if !value.is_finite() {
                return Err(ExperimentError::invalid_config(format!(
                    "Parameter '{}' must be finite, got {}",
                    name, value
                )));
            }
        }

        Ok(())
    }
}
