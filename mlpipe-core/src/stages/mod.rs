//! The five pipeline stage implementations, in execution order.

pub mod ingestion;
pub mod validation;
pub mod transformation;
pub mod training;
pub mod evaluation;

pub use evaluation::EvaluationStage;
pub use ingestion::IngestionStage;
pub use training::TrainingStage;
pub use transformation::TransformationStage;
pub use validation::ValidationStage;
