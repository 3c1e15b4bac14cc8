//! Model evaluation: score the held-out split and report to the tracking store.

use crate::artifact;
use crate::config::EvaluationConfig;
use crate::dataset::DataTable;
use crate::error::PipelineError;
use crate::estimator::ElasticNetModel;
use crate::metrics;
use crate::stage::Stage;
use crate::tracking::{RunReport, TrackingReporter};
use async_trait::async_trait;

pub struct EvaluationStage {
    config: EvaluationConfig,
    reporter: TrackingReporter,
}

impl EvaluationStage {
    pub fn new(config: EvaluationConfig, reporter: TrackingReporter) -> Self {
        Self { config, reporter }
    }

    fn load_model(&self) -> Result<ElasticNetModel, PipelineError> {
        let content = std::fs::read_to_string(&self.config.model_path).map_err(|e| {
            PipelineError::evaluation(format!(
                "cannot load model {}: {e}",
                self.config.model_path.display()
            ))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            PipelineError::evaluation(format!(
                "model {} is not deserializable: {e}",
                self.config.model_path.display()
            ))
        })
    }

    /// Score the model on the test artifact, save the metrics document, and
    /// delegate the full run to the tracking reporter.
    pub async fn evaluate_and_report(&self) -> Result<(), PipelineError> {
        let table = DataTable::read_csv(&self.config.test_path)?;
        let (features, actual, _) = table.split_features_target(&self.config.target_column)?;
        let model = self.load_model()?;
        let predicted = model.predict(&features)?;
        let report = metrics::evaluate(&actual, &predicted)?;

        if let Some(parent) = self.config.metrics_path.parent() {
            artifact::create_dir(parent)?;
        }
        artifact::atomic_write_json(&self.config.metrics_path, &report)?;
        tracing::info!(
            rmse = report.rmse,
            mae = report.mae,
            r2 = report.r2,
            "model scored on held-out split"
        );

        self.reporter
            .report(&RunReport {
                params: self.config.params.clone(),
                metrics: report,
                model,
            })
            .await
    }
}

#[async_trait]
impl Stage for EvaluationStage {
    fn name(&self) -> &'static str {
        "Model Evaluation"
    }

    async fn run(&self) -> Result<(), PipelineError> {
        self.evaluate_and_report().await
    }
}
