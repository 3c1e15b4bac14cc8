//! Configuration resolution into per-stage records.
//!
//! Three YAML documents (paths, hyperparameters, expected schema) are merged
//! into one immutable record per stage. Fields are resolved by name lookup;
//! a required field absent after the merge is a [`PipelineError::MissingKey`]
//! at resolution time, not at first access.

use crate::artifact;
use crate::error::PipelineError;
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Locations of the three configuration documents.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub config: PathBuf,
    pub params: PathBuf,
    pub schema: PathBuf,
}

impl Default for ConfigPaths {
    fn default() -> Self {
        Self {
            config: PathBuf::from("config/config.yaml"),
            params: PathBuf::from("config/params.yaml"),
            schema: PathBuf::from("config/schema.yaml"),
        }
    }
}

/// Resolved settings for the ingestion stage.
#[derive(Debug, Clone)]
pub struct IngestionConfig {
    pub root_dir: PathBuf,
    pub source_url: String,
    pub local_data_file: PathBuf,
    pub unzip_dir: PathBuf,
}

/// Resolved settings for the validation stage.
#[derive(Debug, Clone)]
pub struct ValidationConfig {
    pub root_dir: PathBuf,
    pub data_file: PathBuf,
    pub status_file: PathBuf,
    pub expected_columns: BTreeMap<String, String>,
    pub target_column: String,
}

/// Resolved settings for the transformation stage.
#[derive(Debug, Clone)]
pub struct TransformationConfig {
    pub root_dir: PathBuf,
    pub data_file: PathBuf,
    pub train_path: PathBuf,
    pub test_path: PathBuf,
    pub test_fraction: f64,
    pub seed: u64,
}

/// Resolved settings for the training stage.
#[derive(Debug, Clone)]
pub struct TrainingConfig {
    pub root_dir: PathBuf,
    pub train_path: PathBuf,
    pub model_path: PathBuf,
    pub target_column: String,
    pub alpha: f64,
    pub l1_ratio: f64,
    pub max_iter: usize,
    pub tol: f64,
}

/// Resolved settings for the evaluation stage.
#[derive(Debug, Clone)]
pub struct EvaluationConfig {
    pub root_dir: PathBuf,
    pub test_path: PathBuf,
    pub model_path: PathBuf,
    pub metrics_path: PathBuf,
    pub target_column: String,
    /// Hyperparameters reported to the tracking registry alongside metrics.
    pub params: BTreeMap<String, f64>,
}

/// Loads the three configuration documents and resolves stage records.
///
/// Each getter also creates the stage's artifact root directory so a fresh
/// checkout can run without manual setup.
#[derive(Debug)]
pub struct ConfigResolver {
    config: Document,
    params: Document,
    schema: Document,
}

impl ConfigResolver {
    /// Load all three documents, failing on a missing, unparseable, or empty
    /// one. Also creates the top-level artifacts root named in `config.yaml`.
    pub fn load(paths: &ConfigPaths) -> Result<Self, PipelineError> {
        let resolver = Self {
            config: Document::load(&paths.config)?,
            params: Document::load(&paths.params)?,
            schema: Document::load(&paths.schema)?,
        };
        artifact::create_dir(&resolver.config.path("artifacts_root")?)?;
        Ok(resolver)
    }

    pub fn ingestion_config(&self) -> Result<IngestionConfig, PipelineError> {
        let section = self.config.section("data_ingestion")?;
        let record = IngestionConfig {
            root_dir: section.path("root_dir")?,
            source_url: section.str("source_url")?,
            local_data_file: section.path("local_data_file")?,
            unzip_dir: section.path("unzip_dir")?,
        };
        artifact::create_dir(&record.root_dir)?;
        Ok(record)
    }

    pub fn validation_config(&self) -> Result<ValidationConfig, PipelineError> {
        let section = self.config.section("data_validation")?;
        let record = ValidationConfig {
            root_dir: section.path("root_dir")?,
            data_file: section.path("data_file")?,
            status_file: section.path("status_file")?,
            expected_columns: self.schema.string_map("columns")?,
            target_column: self.schema.str("target_column")?,
        };
        artifact::create_dir(&record.root_dir)?;
        Ok(record)
    }

    pub fn transformation_config(&self) -> Result<TransformationConfig, PipelineError> {
        let section = self.config.section("data_transformation")?;
        let split = self.params.section("split")?;
        let record = TransformationConfig {
            root_dir: section.path("root_dir")?,
            data_file: section.path("data_file")?,
            train_path: section.path("train_path")?,
            test_path: section.path("test_path")?,
            test_fraction: split.f64("test_fraction")?,
            seed: split.u64("seed")?,
        };
        artifact::create_dir(&record.root_dir)?;
        Ok(record)
    }

    pub fn training_config(&self) -> Result<TrainingConfig, PipelineError> {
        let section = self.config.section("model_training")?;
        let params = self.params.section("elastic_net")?;
        let record = TrainingConfig {
            root_dir: section.path("root_dir")?,
            train_path: section.path("train_path")?,
            model_path: section.path("model_path")?,
            target_column: self.schema.str("target_column")?,
            alpha: params.f64("alpha")?,
            l1_ratio: params.f64("l1_ratio")?,
            max_iter: params.u64("max_iter")? as usize,
            tol: params.f64("tol")?,
        };
        artifact::create_dir(&record.root_dir)?;
        Ok(record)
    }

    pub fn evaluation_config(&self) -> Result<EvaluationConfig, PipelineError> {
        let section = self.config.section("model_evaluation")?;
        let record = EvaluationConfig {
            root_dir: section.path("root_dir")?,
            test_path: section.path("test_path")?,
            model_path: section.path("model_path")?,
            metrics_path: section.path("metrics_path")?,
            target_column: self.schema.str("target_column")?,
            params: self.params.section("elastic_net")?.numeric_entries(),
        };
        artifact::create_dir(&record.root_dir)?;
        Ok(record)
    }
}

// ---------------------------------------------------------------------------
// Document / Section lookup helpers
// ---------------------------------------------------------------------------

/// One loaded YAML document with name-based field lookup.
#[derive(Debug)]
struct Document {
    name: String,
    mapping: Mapping,
}

impl Document {
    fn load(path: &Path) -> Result<Self, PipelineError> {
        let name = path.display().to_string();
        let content = std::fs::read_to_string(path)
            .map_err(|e| PipelineError::config(format!("cannot read {name}: {e}")))?;
        let value: Value = serde_yaml::from_str(&content)
            .map_err(|e| PipelineError::config(format!("cannot parse {name}: {e}")))?;
        let mapping = match value {
            Value::Mapping(m) if !m.is_empty() => m,
            Value::Mapping(_) | Value::Null => {
                return Err(PipelineError::config(format!("{name} is empty")));
            }
            _ => {
                return Err(PipelineError::config(format!(
                    "{name} is not a key-value mapping"
                )));
            }
        };
        tracing::info!(document = %name, "configuration document loaded");
        Ok(Self { name, mapping })
    }

    fn get(&self, key: &str) -> Result<&Value, PipelineError> {
        self.mapping
            .get(key)
            .ok_or_else(|| PipelineError::missing_key(key, &self.name))
    }

    fn str(&self, key: &str) -> Result<String, PipelineError> {
        value_str(self.get(key)?, key, &self.name)
    }

    fn path(&self, key: &str) -> Result<PathBuf, PipelineError> {
        Ok(PathBuf::from(self.str(key)?))
    }

    fn section<'a>(&'a self, key: &'a str) -> Result<Section<'a>, PipelineError> {
        match self.get(key)? {
            Value::Mapping(m) => Ok(Section {
                document: &self.name,
                name: key,
                mapping: m,
            }),
            _ => Err(PipelineError::config(format!(
                "`{key}` in {} is not a mapping",
                self.name
            ))),
        }
    }

    /// Resolve a key whose value is a mapping of string to string
    /// (the expected-schema column table).
    fn string_map(&self, key: &str) -> Result<BTreeMap<String, String>, PipelineError> {
        let section = self.section(key)?;
        let mut map = BTreeMap::new();
        for (k, v) in section.mapping {
            let (Some(k), Some(v)) = (k.as_str(), v.as_str()) else {
                return Err(PipelineError::config(format!(
                    "`{key}` in {} must map column names to type names",
                    self.name
                )));
            };
            map.insert(k.to_string(), v.to_string());
        }
        Ok(map)
    }
}

/// A named sub-mapping of a document.
struct Section<'a> {
    document: &'a str,
    name: &'a str,
    mapping: &'a Mapping,
}

impl Section<'_> {
    fn get(&self, key: &str) -> Result<&Value, PipelineError> {
        self.mapping.get(key).ok_or_else(|| {
            PipelineError::missing_key(format!("{}.{key}", self.name), self.document)
        })
    }

    fn str(&self, key: &str) -> Result<String, PipelineError> {
        value_str(self.get(key)?, key, self.document)
    }

    fn path(&self, key: &str) -> Result<PathBuf, PipelineError> {
        Ok(PathBuf::from(self.str(key)?))
    }

    fn f64(&self, key: &str) -> Result<f64, PipelineError> {
        self.get(key)?.as_f64().ok_or_else(|| {
            PipelineError::config(format!(
                "`{}.{key}` in {} is not a number",
                self.name, self.document
            ))
        })
    }

    fn u64(&self, key: &str) -> Result<u64, PipelineError> {
        self.get(key)?.as_u64().ok_or_else(|| {
            PipelineError::config(format!(
                "`{}.{key}` in {} is not an unsigned integer",
                self.name, self.document
            ))
        })
    }

    /// All numeric entries of this section, for parameter reporting.
    fn numeric_entries(&self) -> BTreeMap<String, f64> {
        self.mapping
            .iter()
            .filter_map(|(k, v)| Some((k.as_str()?.to_string(), v.as_f64()?)))
            .collect()
    }
}

fn value_str(value: &Value, key: &str, document: &str) -> Result<String, PipelineError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| PipelineError::config(format!("`{key}` in {document} is not a string")))
}
