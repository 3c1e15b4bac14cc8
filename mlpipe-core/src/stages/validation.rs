//! Schema validation of the ingested table.

use crate::artifact;
use crate::config::ValidationConfig;
use crate::dataset;
use crate::error::PipelineError;
use crate::stage::Stage;
use async_trait::async_trait;
use std::collections::BTreeSet;

pub struct ValidationStage {
    config: ValidationConfig,
}

impl ValidationStage {
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Check the table header against the expected schema: every declared
    /// column present, nothing extra, target column included. The outcome is
    /// written to the status file before any error propagates.
    pub fn validate_columns(&self) -> Result<(), PipelineError> {
        let actual = dataset::read_columns(&self.config.data_file)?;
        let actual_set: BTreeSet<&str> = actual.iter().map(String::as_str).collect();
        let expected_set: BTreeSet<&str> = self
            .config
            .expected_columns
            .keys()
            .map(String::as_str)
            .collect();

        let missing: Vec<&&str> = expected_set.difference(&actual_set).collect();
        let unexpected: Vec<&&str> = actual_set.difference(&expected_set).collect();
        let target_present = actual_set.contains(self.config.target_column.as_str());

        let ok = missing.is_empty() && unexpected.is_empty() && target_present;
        self.write_status(ok)?;
        if !ok {
            return Err(PipelineError::schema(format!(
                "column mismatch in {}: missing {missing:?}, unexpected {unexpected:?}, target `{}` present: {target_present}",
                self.config.data_file.display(),
                self.config.target_column,
            )));
        }

        tracing::info!(
            columns = actual.len(),
            "table matches the expected schema"
        );
        Ok(())
    }

    fn write_status(&self, ok: bool) -> Result<(), PipelineError> {
        if let Some(parent) = self.config.status_file.parent() {
            artifact::create_dir(parent)?;
        }
        std::fs::write(
            &self.config.status_file,
            format!("Validation status: {ok}\n"),
        )?;
        Ok(())
    }
}

#[async_trait]
impl Stage for ValidationStage {
    fn name(&self) -> &'static str {
        "Data Validation"
    }

    async fn run(&self) -> Result<(), PipelineError> {
        self.validate_columns()
    }
}
