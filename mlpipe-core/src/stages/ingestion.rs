//! Data ingestion: idempotent fetch plus archive extraction.

use crate::artifact;
use crate::config::IngestionConfig;
use crate::error::PipelineError;
use crate::stage::Stage;
use async_trait::async_trait;
use std::fs::File;

pub struct IngestionStage {
    config: IngestionConfig,
}

impl IngestionStage {
    pub fn new(config: IngestionConfig) -> Self {
        Self { config }
    }

    /// Fetch the source archive unless it is already on disk.
    ///
    /// Re-running the pipeline never re-downloads an existing file.
    pub async fn download(&self) -> Result<(), PipelineError> {
        if self.config.local_data_file.exists() {
            tracing::info!(
                path = %self.config.local_data_file.display(),
                "archive already present, skipping download"
            );
            return Ok(());
        }

        let response = reqwest::get(&self.config.source_url)
            .await?
            .error_for_status()?;
        let bytes = response.bytes().await?;
        if let Some(parent) = self.config.local_data_file.parent() {
            artifact::create_dir(parent)?;
        }
        std::fs::write(&self.config.local_data_file, &bytes)?;
        tracing::info!(
            url = %self.config.source_url,
            path = %self.config.local_data_file.display(),
            bytes = bytes.len(),
            "archive downloaded"
        );
        Ok(())
    }

    /// Extract the downloaded archive into the unzip directory, creating it
    /// if absent.
    pub fn extract(&self) -> Result<(), PipelineError> {
        artifact::create_dir(&self.config.unzip_dir)?;
        let file = File::open(&self.config.local_data_file).map_err(|e| {
            PipelineError::archive(format!(
                "cannot open {}: {e}",
                self.config.local_data_file.display()
            ))
        })?;
        let mut archive = zip::ZipArchive::new(file).map_err(|e| {
            PipelineError::archive(format!(
                "{} is not a readable zip archive: {e}",
                self.config.local_data_file.display()
            ))
        })?;
        archive.extract(&self.config.unzip_dir).map_err(|e| {
            PipelineError::archive(format!(
                "extraction into {} failed: {e}",
                self.config.unzip_dir.display()
            ))
        })?;
        tracing::info!(
            dir = %self.config.unzip_dir.display(),
            entries = archive.len(),
            "archive extracted"
        );
        Ok(())
    }
}

#[async_trait]
impl Stage for IngestionStage {
    fn name(&self) -> &'static str {
        "Data Ingestion"
    }

    async fn run(&self) -> Result<(), PipelineError> {
        self.download().await?;
        self.extract()
    }
}
