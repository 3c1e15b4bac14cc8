//! Regression quality metrics.

use crate::error::PipelineError;
use serde::{Deserialize, Serialize};

/// Metrics computed on a held-out split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionReport {
    pub rmse: f64,
    pub mae: f64,
    pub r2: f64,
}

/// Compute RMSE, MAE, and R² with the standard formulas.
///
/// R² is not clamped and may be negative for poor fits. Zero residuals score
/// R² = 1 even for a constant target; nonzero residuals on a constant target
/// score 0.
pub fn evaluate(actual: &[f64], predicted: &[f64]) -> Result<RegressionReport, PipelineError> {
    if actual.is_empty() || actual.len() != predicted.len() {
        return Err(PipelineError::evaluation(format!(
            "actual and predicted must be equal-length and non-empty ({} vs {})",
            actual.len(),
            predicted.len()
        )));
    }

    let n = actual.len() as f64;
    let ss_res: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum();
    let rmse = (ss_res / n).sqrt();
    let mae = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).abs())
        .sum::<f64>()
        / n;

    let mean = actual.iter().sum::<f64>() / n;
    let ss_tot: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();
    let r2 = if ss_res == 0.0 {
        1.0
    } else if ss_tot == 0.0 {
        0.0
    } else {
        1.0 - ss_res / ss_tot
    };

    Ok(RegressionReport { rmse, mae, r2 })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_fit() {
        let values = [1.0, 2.0, 3.0];
        let report = evaluate(&values, &values).unwrap();
        assert_eq!(report.rmse, 0.0);
        assert_eq!(report.mae, 0.0);
        assert_eq!(report.r2, 1.0);
    }

    #[test]
    fn test_unit_offset() {
        let actual = [1.0, 2.0, 3.0];
        let predicted = [2.0, 3.0, 4.0];
        let report = evaluate(&actual, &predicted).unwrap();
        assert_eq!(report.rmse, 1.0);
        assert_eq!(report.mae, 1.0);
        // ss_res = 3, ss_tot = 2
        assert!((report.r2 - (-0.5)).abs() < 1e-12);
    }

    #[test]
    fn test_r2_negative_for_poor_fit() {
        let actual = [1.0, 2.0, 3.0];
        let predicted = [10.0, -10.0, 5.0];
        let report = evaluate(&actual, &predicted).unwrap();
        assert!(report.r2 < 0.0);
    }

    #[test]
    fn test_mismatched_lengths_rejected() {
        let err = evaluate(&[1.0], &[1.0, 2.0]).unwrap_err();
        assert!(matches!(err, PipelineError::Evaluation(_)), "got {err:?}");
        assert!(evaluate(&[], &[]).is_err());
    }
}
