//! Elastic-net linear regression fit by coordinate descent.
//!
//! The estimator is a substitutable collaborator of the training stage: any
//! regressor that fits a feature matrix against a target vector and predicts
//! from rows would do. This one minimizes
//! `1/(2n)·||y − Xw||² + α·r·||w||₁ + α·(1−r)/2·||w||²`
//! on standardized features, the sklearn ElasticNet parametrization.

use crate::error::PipelineError;
use serde::{Deserialize, Serialize};

/// Elastic-net hyperparameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElasticNetParams {
    pub alpha: f64,
    pub l1_ratio: f64,
    pub max_iter: usize,
    pub tol: f64,
}

impl Default for ElasticNetParams {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            l1_ratio: 0.5,
            max_iter: 1000,
            tol: 1e-4,
        }
    }
}

/// A fitted elastic-net model, serializable as a JSON artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElasticNetModel {
    pub feature_names: Vec<String>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    pub params: ElasticNetParams,
}

impl ElasticNetModel {
    /// Fit on a feature matrix and target vector.
    ///
    /// Reaching `max_iter` without convergence is not an error; degenerate
    /// input (empty, ragged, or non-finite) is.
    pub fn fit(
        features: &[Vec<f64>],
        targets: &[f64],
        feature_names: Vec<String>,
        params: ElasticNetParams,
    ) -> Result<Self, PipelineError> {
        let n = features.len();
        if n == 0 {
            return Err(PipelineError::training("no training rows"));
        }
        if targets.len() != n {
            return Err(PipelineError::training(format!(
                "{n} feature rows but {} targets",
                targets.len()
            )));
        }
        let d = features[0].len();
        if d == 0 || feature_names.len() != d {
            return Err(PipelineError::training(
                "feature matrix and feature names disagree",
            ));
        }
        for row in features {
            if row.len() != d {
                return Err(PipelineError::training("ragged feature matrix"));
            }
        }
        if features.iter().flatten().chain(targets).any(|v| !v.is_finite()) {
            return Err(PipelineError::training("non-finite value in training data"));
        }

        // Standardize features and center the target; coefficients are mapped
        // back to the original scale after the descent.
        let nf = n as f64;
        let mut means = vec![0.0; d];
        for row in features {
            for (m, x) in means.iter_mut().zip(row) {
                *m += x / nf;
            }
        }
        let mut stds = vec![0.0; d];
        for row in features {
            for j in 0..d {
                stds[j] += (row[j] - means[j]).powi(2) / nf;
            }
        }
        for s in &mut stds {
            *s = s.sqrt();
            if *s == 0.0 {
                // Constant column: standardized values are zero, so its
                // coefficient stays zero; avoid dividing by zero below.
                *s = 1.0;
            }
        }
        let xs: Vec<Vec<f64>> = features
            .iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .map(|(j, x)| (x - means[j]) / stds[j])
                    .collect()
            })
            .collect();
        let y_mean = targets.iter().sum::<f64>() / nf;
        let yc: Vec<f64> = targets.iter().map(|y| y - y_mean).collect();

        // Per-column mean square, the coordinate update denominator.
        let mut z = vec![0.0; d];
        for row in &xs {
            for j in 0..d {
                z[j] += row[j] * row[j] / nf;
            }
        }

        let l1 = params.alpha * params.l1_ratio;
        let l2 = params.alpha * (1.0 - params.l1_ratio);
        let mut w = vec![0.0; d];
        let mut residual = yc.clone();

        for _ in 0..params.max_iter {
            let mut max_delta: f64 = 0.0;
            for j in 0..d {
                if z[j] == 0.0 {
                    continue;
                }
                let old = w[j];
                let rho = xs
                    .iter()
                    .zip(&residual)
                    .map(|(row, r)| row[j] * (r + old * row[j]))
                    .sum::<f64>()
                    / nf;
                let new = soft_threshold(rho, l1) / (z[j] + l2);
                if new != old {
                    let delta = new - old;
                    for (r, row) in residual.iter_mut().zip(&xs) {
                        *r -= delta * row[j];
                    }
                    w[j] = new;
                }
                max_delta = max_delta.max((new - old).abs());
            }
            if max_delta < params.tol {
                break;
            }
        }

        // Map coefficients back to the original feature scale.
        let coefficients: Vec<f64> = w.iter().zip(&stds).map(|(wj, s)| wj / s).collect();
        let intercept = y_mean
            - coefficients
                .iter()
                .zip(&means)
                .map(|(c, m)| c * m)
                .sum::<f64>();

        Ok(Self {
            feature_names,
            coefficients,
            intercept,
            params,
        })
    }

    /// Predict targets for a feature matrix.
    pub fn predict(&self, features: &[Vec<f64>]) -> Result<Vec<f64>, PipelineError> {
        let d = self.coefficients.len();
        features
            .iter()
            .map(|row| {
                if row.len() != d {
                    return Err(PipelineError::evaluation(format!(
                        "model expects {d} features, row has {}",
                        row.len()
                    )));
                }
                Ok(self.intercept
                    + row
                        .iter()
                        .zip(&self.coefficients)
                        .map(|(x, c)| x * c)
                        .sum::<f64>())
            })
            .collect()
    }
}

fn soft_threshold(x: f64, threshold: f64) -> f64 {
    if x > threshold {
        x - threshold
    } else if x < -threshold {
        x + threshold
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear_data() -> (Vec<Vec<f64>>, Vec<f64>) {
        // y = 2x + 1
        let features: Vec<Vec<f64>> = (0..20).map(|i| vec![i as f64]).collect();
        let targets: Vec<f64> = features.iter().map(|row| 2.0 * row[0] + 1.0).collect();
        (features, targets)
    }

    #[test]
    fn test_fit_recovers_linear_relation() {
        let (features, targets) = linear_data();
        let params = ElasticNetParams {
            alpha: 1e-6,
            l1_ratio: 0.5,
            max_iter: 10_000,
            tol: 1e-10,
        };
        let model =
            ElasticNetModel::fit(&features, &targets, vec!["x".into()], params).unwrap();
        assert!((model.coefficients[0] - 2.0).abs() < 1e-3, "{model:?}");
        assert!((model.intercept - 1.0).abs() < 1e-2, "{model:?}");

        let predicted = model.predict(&features).unwrap();
        for (p, a) in predicted.iter().zip(&targets) {
            assert!((p - a).abs() < 1e-2);
        }
    }

    #[test]
    fn test_heavy_regularization_shrinks_to_mean() {
        let (features, targets) = linear_data();
        let params = ElasticNetParams {
            alpha: 1e6,
            ..ElasticNetParams::default()
        };
        let model =
            ElasticNetModel::fit(&features, &targets, vec!["x".into()], params).unwrap();
        assert_eq!(model.coefficients[0], 0.0);
        let mean = targets.iter().sum::<f64>() / targets.len() as f64;
        assert!((model.intercept - mean).abs() < 1e-9);
    }

    #[test]
    fn test_constant_column_gets_zero_coefficient() {
        let features: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64, 3.0]).collect();
        let targets: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let params = ElasticNetParams {
            alpha: 1e-6,
            ..ElasticNetParams::default()
        };
        let model = ElasticNetModel::fit(
            &features,
            &targets,
            vec!["x".into(), "c".into()],
            params,
        )
        .unwrap();
        assert_eq!(model.coefficients[1], 0.0);
    }

    #[test]
    fn test_fit_rejects_degenerate_input() {
        let params = ElasticNetParams::default();
        assert!(ElasticNetModel::fit(&[], &[], vec![], params.clone()).is_err());
        assert!(
            ElasticNetModel::fit(&[vec![1.0]], &[f64::NAN], vec!["x".into()], params.clone())
                .is_err()
        );
        assert!(
            ElasticNetModel::fit(&[vec![1.0], vec![1.0, 2.0]], &[1.0, 2.0], vec!["x".into()], params)
                .is_err()
        );
    }

    #[test]
    fn test_model_serde_roundtrip() {
        let (features, targets) = linear_data();
        let model = ElasticNetModel::fit(
            &features,
            &targets,
            vec!["x".into()],
            ElasticNetParams::default(),
        )
        .unwrap();
        let json = serde_json::to_string(&model).unwrap();
        let back: ElasticNetModel = serde_json::from_str(&json).unwrap();
        assert_eq!(back.coefficients, model.coefficients);
        assert_eq!(back.intercept, model.intercept);
    }
}
