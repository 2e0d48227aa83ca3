use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExperimentError {
    #[error("Setup failed: {message}")]
    Setup { message: String },

    #[error("Execution failed: {message}")]
    Execution { message: String },

    #[error("Metrics collection failed: {message}")]
    Collection { message: String },

    #[error("Analysis failed: {message}")]
    Analysis { message: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

pub type ExperimentResult<T> = Result<T, ExperimentError>;

impl ExperimentError {
    pub fn setup(message: impl Into<String>) -> Self {
        Self::Setup {
            message: message.into(),
        }
    }

    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution {
            message: message.into(),
        }
    }

    pub fn collection(message: impl Into<String>) -> Self {
        Self::Collection {
            message: message.into(),
        }
    }

    pub fn analysis(message: impl Into<String>) -> Self {
        Self::Analysis {
            message: message.into(),
        }
    }

    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}
