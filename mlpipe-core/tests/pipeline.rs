//! Orchestrator-level tests: fail-fast ordering and a full local run.

use async_trait::async_trait;
use mlpipe_core::config::{ConfigPaths, ConfigResolver};
use mlpipe_core::error::PipelineError;
use mlpipe_core::stage::{Stage, run_pipeline};
use mlpipe_core::tracking::TrackingConfig;
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};

struct RecordingStage {
    name: &'static str,
    log: Arc<Mutex<Vec<&'static str>>>,
    fail: bool,
}

#[async_trait]
impl Stage for RecordingStage {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn run(&self) -> Result<(), PipelineError> {
        self.log.lock().unwrap().push(self.name);
        if self.fail {
            Err(PipelineError::schema("expected columns absent"))
        } else {
            Ok(())
        }
    }
}

#[tokio::test]
async fn failing_stage_halts_the_sequence() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let stage = |name, fail| -> Box<dyn Stage> {
        Box::new(RecordingStage {
            name,
            log: Arc::clone(&log),
            fail,
        })
    };
    let stages = vec![
        stage("ingestion", false),
        stage("validation", true),
        stage("transformation", false),
        stage("training", false),
    ];

    let err = run_pipeline(&stages).await.unwrap_err();
    assert!(matches!(err, PipelineError::Schema(_)), "got {err:?}");
    // Stages after the failure never execute.
    assert_eq!(*log.lock().unwrap(), vec!["ingestion", "validation"]);
}

#[tokio::test]
async fn all_stages_run_in_order_on_success() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let stages: Vec<Box<dyn Stage>> = ["a", "b", "c"]
        .iter()
        .map(|&name| -> Box<dyn Stage> {
            Box::new(RecordingStage {
                name,
                log: Arc::clone(&log),
                fail: false,
            })
        })
        .collect();

    run_pipeline(&stages).await.unwrap();
    assert_eq!(*log.lock().unwrap(), vec!["a", "b", "c"]);
}

/// Seed the workspace with configuration documents and a pre-downloaded
/// archive so the whole pipeline runs without touching the network.
fn seed_workspace(dir: &Path) -> ConfigPaths {
    let root = dir.join("artifacts");
    std::fs::create_dir_all(root.join("data_ingestion")).unwrap();

    let mut csv = String::from("x,quality\n");
    for i in 0..16 {
        csv.push_str(&format!("{i},{}\n", 2 * i + 1));
    }
    let zip_path = root.join("data_ingestion").join("data.zip");
    let file = std::fs::File::create(&zip_path).unwrap();
    let mut writer = zip::ZipWriter::new(file);
    writer
        .start_file("data.csv", zip::write::SimpleFileOptions::default())
        .unwrap();
    writer.write_all(csv.as_bytes()).unwrap();
    writer.finish().unwrap();

    let paths = ConfigPaths {
        config: dir.join("config.yaml"),
        params: dir.join("params.yaml"),
        schema: dir.join("schema.yaml"),
    };
    let root = root.display();
    std::fs::write(
        &paths.config,
        format!(
            r#"
artifacts_root: {root}
data_ingestion:
  root_dir: {root}/data_ingestion
  source_url: http://invalid.invalid/data.zip
  local_data_file: {root}/data_ingestion/data.zip
  unzip_dir: {root}/data_ingestion
data_validation:
  root_dir: {root}/data_validation
  data_file: {root}/data_ingestion/data.csv
  status_file: {root}/data_validation/status.txt
data_transformation:
  root_dir: {root}/data_transformation
  data_file: {root}/data_ingestion/data.csv
  train_path: {root}/data_transformation/train.csv
  test_path: {root}/data_transformation/test.csv
model_training:
  root_dir: {root}/model_training
  train_path: {root}/data_transformation/train.csv
  model_path: {root}/model_training/model.json
model_evaluation:
  root_dir: {root}/model_evaluation
  test_path: {root}/data_transformation/test.csv
  model_path: {root}/model_training/model.json
  metrics_path: {root}/model_evaluation/metrics.json
"#
        ),
    )
    .unwrap();
    std::fs::write(
        &paths.params,
        "elastic_net:\n  alpha: 0.000001\n  l1_ratio: 0.5\n  max_iter: 10000\n  tol: 0.0000000001\nsplit:\n  test_fraction: 0.25\n  seed: 42\n",
    )
    .unwrap();
    std::fs::write(
        &paths.schema,
        "columns:\n  x: float64\n  quality: int64\ntarget_column: quality\n",
    )
    .unwrap();
    paths
}

#[tokio::test]
async fn full_run_against_local_store() {
    let dir = tempfile::tempdir().unwrap();
    let paths = seed_workspace(dir.path());
    let tracking = TrackingConfig {
        uri: dir.path().join("mlruns").display().to_string(),
        username: None,
        password: None,
        experiment: "integration".to_string(),
        model_name: "elasticnet-regressor".to_string(),
    };

    let resolver = ConfigResolver::load(&paths).unwrap();
    let stages = mlpipe_core::build_stages(&resolver, tracking).unwrap();
    run_pipeline(&stages).await.unwrap();

    let artifacts = dir.path().join("artifacts");
    assert_eq!(
        std::fs::read_to_string(artifacts.join("data_validation").join("status.txt")).unwrap(),
        "Validation status: true\n"
    );
    assert!(artifacts.join("data_transformation").join("train.csv").exists());
    assert!(artifacts.join("model_training").join("model.json").exists());

    let metrics: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(artifacts.join("model_evaluation").join("metrics.json"))
            .unwrap(),
    )
    .unwrap();
    // Exactly linear data with near-zero regularization scores near-perfectly.
    assert!(metrics["r2"].as_f64().unwrap() > 0.99, "{metrics}");
    assert!(metrics["rmse"].as_f64().unwrap() < 0.5, "{metrics}");

    // One run recorded in the local store, no registration marker.
    let exp_dir = dir.path().join("mlruns").join("integration");
    let runs: Vec<_> = std::fs::read_dir(&exp_dir).unwrap().collect();
    assert_eq!(runs.len(), 1);
}

#[tokio::test]
async fn schema_mismatch_aborts_before_transformation() {
    let dir = tempfile::tempdir().unwrap();
    let paths = seed_workspace(dir.path());
    // Declare a column the table does not have.
    std::fs::write(
        &paths.schema,
        "columns:\n  x: float64\n  missing_col: float64\n  quality: int64\ntarget_column: quality\n",
    )
    .unwrap();
    let tracking = TrackingConfig {
        uri: dir.path().join("mlruns").display().to_string(),
        username: None,
        password: None,
        experiment: "integration".to_string(),
        model_name: "elasticnet-regressor".to_string(),
    };

    let resolver = ConfigResolver::load(&paths).unwrap();
    let stages = mlpipe_core::build_stages(&resolver, tracking).unwrap();
    let err = run_pipeline(&stages).await.unwrap_err();
    assert!(matches!(err, PipelineError::Schema(_)), "got {err:?}");

    let artifacts = dir.path().join("artifacts");
    assert_eq!(
        std::fs::read_to_string(artifacts.join("data_validation").join("status.txt")).unwrap(),
        "Validation status: false\n"
    );
    // Downstream artifacts never appear.
    assert!(!artifacts.join("data_transformation").join("train.csv").exists());
    assert!(!artifacts.join("model_training").join("model.json").exists());
}
