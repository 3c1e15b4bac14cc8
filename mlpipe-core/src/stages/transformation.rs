//! Data transformation: split the validated table into train and test artifacts.

use crate::artifact;
use crate::config::TransformationConfig;
use crate::dataset::DataTable;
use crate::error::PipelineError;
use crate::stage::Stage;
use async_trait::async_trait;

pub struct TransformationStage {
    config: TransformationConfig,
}

impl TransformationStage {
    pub fn new(config: TransformationConfig) -> Self {
        Self { config }
    }

    pub fn split(&self) -> Result<(), PipelineError> {
        let table = DataTable::read_csv(&self.config.data_file)?;
        let total = table.row_count();
        let (train, test) =
            table.train_test_split(self.config.test_fraction, self.config.seed)?;

        for path in [&self.config.train_path, &self.config.test_path] {
            if let Some(parent) = path.parent() {
                artifact::create_dir(parent)?;
            }
        }
        train.write_csv(&self.config.train_path)?;
        test.write_csv(&self.config.test_path)?;
        tracing::info!(
            total,
            train_rows = train.row_count(),
            test_rows = test.row_count(),
            "table split into train and test artifacts"
        );
        Ok(())
    }
}

#[async_trait]
impl Stage for TransformationStage {
    fn name(&self) -> &'static str {
        "Data Transformation"
    }

    async fn run(&self) -> Result<(), PipelineError> {
        self.split()
    }
}
