//! Model training: fit the elastic-net estimator and serialize the model.

use crate::artifact;
use crate::config::TrainingConfig;
use crate::dataset::DataTable;
use crate::error::PipelineError;
use crate::estimator::{ElasticNetModel, ElasticNetParams};
use crate::stage::Stage;
use async_trait::async_trait;

pub struct TrainingStage {
    config: TrainingConfig,
}

impl TrainingStage {
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    pub fn train(&self) -> Result<(), PipelineError> {
        let table = DataTable::read_csv(&self.config.train_path)?;
        let (features, targets, feature_names) =
            table.split_features_target(&self.config.target_column)?;

        let params = ElasticNetParams {
            alpha: self.config.alpha,
            l1_ratio: self.config.l1_ratio,
            max_iter: self.config.max_iter,
            tol: self.config.tol,
        };
        let model = ElasticNetModel::fit(&features, &targets, feature_names, params)?;

        if let Some(parent) = self.config.model_path.parent() {
            artifact::create_dir(parent)?;
        }
        artifact::atomic_write_json(&self.config.model_path, &model)?;
        tracing::info!(
            path = %self.config.model_path.display(),
            rows = targets.len(),
            features = model.coefficients.len(),
            "model trained and serialized"
        );
        Ok(())
    }
}

#[async_trait]
impl Stage for TrainingStage {
    fn name(&self) -> &'static str {
        "Model Training"
    }

    async fn run(&self) -> Result<(), PipelineError> {
        self.train()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_train_writes_model_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let train_path = dir.path().join("train.csv");
        let mut csv = String::from("x,quality\n");
        for i in 0..20 {
            csv.push_str(&format!("{i},{}\n", 2 * i + 1));
        }
        std::fs::write(&train_path, csv).unwrap();

        let stage = TrainingStage::new(TrainingConfig {
            root_dir: dir.path().to_path_buf(),
            train_path,
            model_path: dir.path().join("model.json"),
            target_column: "quality".to_string(),
            alpha: 1e-6,
            l1_ratio: 0.5,
            max_iter: 10_000,
            tol: 1e-10,
        });
        stage.train().unwrap();

        let content = std::fs::read_to_string(dir.path().join("model.json")).unwrap();
        let model: ElasticNetModel = serde_json::from_str(&content).unwrap();
        assert_eq!(model.feature_names, vec!["x"]);
        assert!((model.coefficients[0] - 2.0).abs() < 1e-3);
    }

    #[test]
    fn test_missing_train_artifact_fails_at_point_of_use() {
        let dir = tempfile::tempdir().unwrap();
        let stage = TrainingStage::new(TrainingConfig {
            root_dir: dir.path().to_path_buf(),
            train_path: dir.path().join("absent.csv"),
            model_path: dir.path().join("model.json"),
            target_column: "quality".to_string(),
            alpha: 0.1,
            l1_ratio: 0.5,
            max_iter: 100,
            tol: 1e-4,
        });
        let err = stage.train().unwrap_err();
        assert!(matches!(err, PipelineError::Dataset(_)), "got {err:?}");
    }
}
