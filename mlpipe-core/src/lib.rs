//! # mlpipe-core — config-driven tabular regression pipeline
//!
//! Turns a zipped CSV behind a URL into a trained and evaluated elastic-net
//! regression model through five fixed stages: ingestion, validation,
//! transformation, training, evaluation.
//!
//! Three YAML documents (paths, hyperparameters, expected schema) resolve
//! into one immutable [`config`] record per stage. The orchestrator in
//! [`stage`] runs the sequence fail-fast: the first typed failure aborts the
//! run with the failing stage logged, and no later stage executes. Stages
//! exchange data only through path-addressed artifacts on disk; the
//! evaluation stage additionally reports metrics, parameters, and the model
//! to a local or remote tracking store via [`tracking`].

pub mod artifact;
pub mod config;
pub mod dataset;
pub mod error;
pub mod estimator;
pub mod metrics;
pub mod stage;
pub mod stages;
pub mod tracking;

pub use config::{ConfigPaths, ConfigResolver};
pub use error::PipelineError;
pub use stage::{Stage, run_pipeline};
pub use tracking::{TrackingConfig, TrackingReporter};

use stages::{
    EvaluationStage, IngestionStage, TrainingStage, TransformationStage, ValidationStage,
};

/// Build the fixed five-stage sequence, each stage bound to its resolved
/// configuration record.
pub fn build_stages(
    resolver: &ConfigResolver,
    tracking: TrackingConfig,
) -> Result<Vec<Box<dyn Stage>>, PipelineError> {
    Ok(vec![
        Box::new(IngestionStage::new(resolver.ingestion_config()?)),
        Box::new(ValidationStage::new(resolver.validation_config()?)),
        Box::new(TransformationStage::new(resolver.transformation_config()?)),
        Box::new(TrainingStage::new(resolver.training_config()?)),
        Box::new(EvaluationStage::new(
            resolver.evaluation_config()?,
            TrackingReporter::new(tracking),
        )),
    ])
}
