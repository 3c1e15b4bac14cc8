//! Experiment tracking: local file store or remote registry.
//!
//! The evaluation stage hands a finished run (hyperparameters, metrics,
//! serialized model) to a [`TrackingReporter`]. The destination scheme of the
//! tracking URI decides the path: a remote store gets the run over REST and
//! additionally registers the model under a fixed name; a local file store
//! records the run on disk without registry registration, since model
//! registries are only supported over network-addressed stores.

use crate::artifact;
use crate::error::PipelineError;
use crate::estimator::ElasticNetModel;
use crate::metrics::RegressionReport;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use url::Url;

/// Tracking endpoint settings.
///
/// Built exactly once at process startup (from environment variables, in the
/// binary) and passed in; the library never reads ambient process state.
#[derive(Debug, Clone)]
pub struct TrackingConfig {
    pub uri: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub experiment: String,
    /// Fixed name the model is registered under on remote stores.
    pub model_name: String,
}

/// Whether a tracking URI addresses a local file store or a remote registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreScheme {
    LocalFile,
    Remote,
}

/// Classify a tracking URI. Bare paths and `file://` URIs are local;
/// anything with a real scheme is remote.
pub fn store_scheme(uri: &str) -> StoreScheme {
    match Url::parse(uri) {
        Ok(url) if url.scheme() == "file" => StoreScheme::LocalFile,
        Ok(_) => StoreScheme::Remote,
        Err(_) => StoreScheme::LocalFile,
    }
}

/// Everything reported for one evaluation run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub params: BTreeMap<String, f64>,
    pub metrics: RegressionReport,
    pub model: ElasticNetModel,
}

/// Metadata sidecar written next to a locally recorded run.
#[derive(Debug, Clone, Serialize)]
struct RunMeta {
    run_id: String,
    experiment: String,
    recorded_at: DateTime<Utc>,
    registered_model: Option<String>,
}

/// Publishes run reports to the configured tracking store.
pub struct TrackingReporter {
    config: TrackingConfig,
    client: reqwest::Client,
}

impl TrackingReporter {
    pub fn new(config: TrackingConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// Persist and publish a run. Any I/O or network failure propagates;
    /// there is no fallback sink.
    pub async fn report(&self, run: &RunReport) -> Result<(), PipelineError> {
        match store_scheme(&self.config.uri) {
            StoreScheme::LocalFile => self.report_local(run),
            StoreScheme::Remote => self.report_remote(run).await,
        }
    }

    fn local_root(&self) -> PathBuf {
        match Url::parse(&self.config.uri) {
            Ok(url) if url.scheme() == "file" => url
                .to_file_path()
                .unwrap_or_else(|_| PathBuf::from(url.path())),
            _ => PathBuf::from(&self.config.uri),
        }
    }

    fn report_local(&self, run: &RunReport) -> Result<(), PipelineError> {
        let run_id = uuid::Uuid::new_v4().to_string();
        let run_dir = self
            .local_root()
            .join(&self.config.experiment)
            .join(&run_id);
        artifact::create_dir(&run_dir)?;
        artifact::atomic_write_json(&run_dir.join("params.json"), &run.params)?;
        artifact::atomic_write_json(&run_dir.join("metrics.json"), &run.metrics)?;
        artifact::atomic_write_json(&run_dir.join("model.json"), &run.model)?;

        let meta = RunMeta {
            run_id,
            experiment: self.config.experiment.clone(),
            recorded_at: Utc::now(),
            registered_model: None,
        };
        artifact::atomic_write_json(&run_dir.join("run.json"), &meta)?;
        tracing::info!(run_id = %meta.run_id, dir = %run_dir.display(), "run recorded in local file store");
        Ok(())
    }

    async fn report_remote(&self, run: &RunReport) -> Result<(), PipelineError> {
        let run_id = uuid::Uuid::new_v4().to_string();
        self.post(
            "runs/create",
            &serde_json::json!({
                "run_id": run_id,
                "experiment": self.config.experiment,
                "started_at": Utc::now().to_rfc3339(),
            }),
        )
        .await?;

        for (key, value) in &run.params {
            self.post(
                "runs/log-parameter",
                &serde_json::json!({ "run_id": run_id, "key": key, "value": value }),
            )
            .await?;
        }
        for (key, value) in [
            ("rmse", run.metrics.rmse),
            ("mae", run.metrics.mae),
            ("r2", run.metrics.r2),
        ] {
            self.post(
                "runs/log-metric",
                &serde_json::json!({ "run_id": run_id, "key": key, "value": value }),
            )
            .await?;
        }
        self.post(
            "runs/log-model",
            &serde_json::json!({ "run_id": run_id, "model": run.model }),
        )
        .await?;
        self.post(
            "model-versions/create",
            &serde_json::json!({ "name": self.config.model_name, "run_id": run_id }),
        )
        .await?;

        tracing::info!(
            run_id,
            model = %self.config.model_name,
            "run published and model registered on remote store"
        );
        Ok(())
    }

    async fn post(&self, endpoint: &str, body: &serde_json::Value) -> Result<(), PipelineError> {
        let url = format!(
            "{}/api/2.0/{endpoint}",
            self.config.uri.trim_end_matches('/')
        );
        let mut request = self.client.post(&url).json(body);
        if let Some(username) = &self.config.username {
            request = request.basic_auth(username, self.config.password.as_deref());
        }
        request.send().await?.error_for_status()?;
        Ok(())
    }
}
