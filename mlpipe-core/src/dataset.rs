//! CSV-backed tabular dataset.
//!
//! Tables move between stages as CSV artifacts: a header row followed by
//! numeric body rows. Parsing is strict — a ragged or non-numeric row is a
//! dataset error, never silently skipped.

use crate::error::PipelineError;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::path::Path;

/// An in-memory numeric table read from a CSV artifact.
#[derive(Debug, Clone, PartialEq)]
pub struct DataTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

impl DataTable {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Read a comma-separated file with a header row; every body cell must
    /// parse as a number.
    pub fn read_csv(path: &Path) -> Result<Self, PipelineError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| PipelineError::dataset(format!("cannot read {}: {e}", path.display())))?;
        let mut lines = content.lines();
        let columns = parse_header(
            lines
                .next()
                .ok_or_else(|| PipelineError::dataset(format!("{} is empty", path.display())))?,
        );

        let mut rows = Vec::new();
        for (line_no, line) in lines.enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let row = line
                .split(',')
                .map(|cell| {
                    cell.trim().trim_matches('"').parse::<f64>().map_err(|_| {
                        PipelineError::dataset(format!(
                            "non-numeric cell `{}` at line {} of {}",
                            cell.trim(),
                            line_no + 2,
                            path.display()
                        ))
                    })
                })
                .collect::<Result<Vec<f64>, _>>()?;
            if row.len() != columns.len() {
                return Err(PipelineError::dataset(format!(
                    "line {} of {} has {} cells, expected {}",
                    line_no + 2,
                    path.display(),
                    row.len(),
                    columns.len()
                )));
            }
            rows.push(row);
        }

        Ok(Self { columns, rows })
    }

    /// Write the table back out as a CSV artifact.
    pub fn write_csv(&self, path: &Path) -> Result<(), PipelineError> {
        let mut out = String::new();
        out.push_str(&self.columns.join(","));
        out.push('\n');
        for row in &self.rows {
            let cells: Vec<String> = row.iter().map(|v| v.to_string()).collect();
            out.push_str(&cells.join(","));
            out.push('\n');
        }
        std::fs::write(path, out)?;
        tracing::info!(path = %path.display(), rows = self.row_count(), "csv artifact saved");
        Ok(())
    }

    /// Split into a feature matrix, a target vector, and the feature names.
    pub fn split_features_target(
        &self,
        target: &str,
    ) -> Result<(Vec<Vec<f64>>, Vec<f64>, Vec<String>), PipelineError> {
        let target_idx = self
            .columns
            .iter()
            .position(|c| c == target)
            .ok_or_else(|| {
                PipelineError::dataset(format!("target column `{target}` not in table"))
            })?;

        let feature_names: Vec<String> = self
            .columns
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != target_idx)
            .map(|(_, c)| c.clone())
            .collect();
        let mut features = Vec::with_capacity(self.rows.len());
        let mut targets = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            let mut feature_row = row.clone();
            targets.push(feature_row.remove(target_idx));
            features.push(feature_row);
        }
        Ok((features, targets, feature_names))
    }

    /// Deterministic shuffled split into train and test tables.
    pub fn train_test_split(
        self,
        test_fraction: f64,
        seed: u64,
    ) -> Result<(DataTable, DataTable), PipelineError> {
        if !(0.0..1.0).contains(&test_fraction) || test_fraction == 0.0 {
            return Err(PipelineError::dataset(format!(
                "test_fraction must be in (0, 1), got {test_fraction}"
            )));
        }
        if self.rows.len() < 2 {
            return Err(PipelineError::dataset(
                "at least two rows are required to split",
            ));
        }

        let mut indices: Vec<usize> = (0..self.rows.len()).collect();
        let mut rng = StdRng::seed_from_u64(seed);
        indices.shuffle(&mut rng);

        let test_count = ((self.rows.len() as f64 * test_fraction).ceil() as usize)
            .clamp(1, self.rows.len() - 1);
        let (test_idx, train_idx) = indices.split_at(test_count);

        let pick = |idx: &[usize]| DataTable {
            columns: self.columns.clone(),
            rows: idx.iter().map(|&i| self.rows[i].clone()).collect(),
        };
        Ok((pick(train_idx), pick(test_idx)))
    }
}

/// Read only the header row of a CSV artifact.
pub fn read_columns(path: &Path) -> Result<Vec<String>, PipelineError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| PipelineError::dataset(format!("cannot read {}: {e}", path.display())))?;
    let header = content
        .lines()
        .next()
        .ok_or_else(|| PipelineError::dataset(format!("{} is empty", path.display())))?;
    Ok(parse_header(header))
}

fn parse_header(line: &str) -> Vec<String> {
    line.split(',')
        .map(|s| s.trim().trim_matches('"').to_string())
        .collect()
}
