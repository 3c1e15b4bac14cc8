//! Stage contract and the fail-fast orchestrator loop.

use crate::error::PipelineError;
use async_trait::async_trait;

/// A unit of pipeline work bound to one configuration record.
///
/// Stages take no parameters beyond the configuration they were built with
/// and either succeed or return a typed failure.
#[async_trait]
pub trait Stage: Send + Sync {
    /// Stage name used in the start/completion log markers.
    fn name(&self) -> &'static str;

    /// Execute the stage against its bound configuration.
    async fn run(&self) -> Result<(), PipelineError>;
}

/// Run stages in their fixed order with fail-fast semantics.
///
/// Every stage gets identical handling: a start marker, the entry operation,
/// a completion marker. The first failure is logged with its stage name and
/// returned unchanged; later stages never run. There is no retry, no skip,
/// and no partial continuation.
pub async fn run_pipeline(stages: &[Box<dyn Stage>]) -> Result<(), PipelineError> {
    for stage in stages {
        let name = stage.name();
        tracing::info!(stage = name, ">>>>> stage {name} started <<<<<");
        if let Err(err) = stage.run().await {
            tracing::error!(stage = name, error = %err, "stage {name} failed, aborting run");
            return Err(err);
        }
        tracing::info!(stage = name, ">>>>> stage {name} completed <<<<<");
    }
    Ok(())
}
