pub mod analysis;
pub mod config;
pub mod error;
pub mod experiment;
pub mod metrics;
pub mod template;

pub use analysis::{Analysis, Verdict};
pub use config::{ExperimentConfig, ExperimentMetadata, Method};
pub use error::{ExperimentError, ExperimentResult};
pub use experiment::{Experiment, ExperimentContext};
pub use metrics::{MetricDifference, Metrics};
pub use template::TemplateExperiment;

pub mod prelude {
    pub use crate::analysis::*;
    pub use crate::config::*;
    pub use crate::error::*;
    pub use crate::experiment::*;
    pub use crate::metrics::*;
    pub use crate::template::*;
}
