//! Trained waste classifier: the interface the pipeline consumes and the
//! logistic implementation shipped with it.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A trained binary classifier over the fixed 4-feature vector
/// `[quantity, days_to_expire, avg_usage_per_day, risk]`.
///
/// The model object is loaded once and treated as read-only for the life
/// of the process; retraining replaces the file wholesale and is
/// sequenced externally with respect to in-flight predictions.
pub trait WasteModel {
    /// Positive-class (waste) probability per row, each in [0, 1].
    fn predict_positive_probability(&self, rows: &[[f64; 4]]) -> Vec<f64>;
}

/// Logistic regression over standardized features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    pub weights: [f64; 4],
    pub bias: f64,
    /// Per-feature mean used for standardization at train time.
    pub feature_means: [f64; 4],
    /// Per-feature standard deviation; never zero (clamped at train time).
    pub feature_scales: [f64; 4],
}

impl LogisticModel {
    /// Load a model file, failing with a remediation hint when absent.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).with_context(|| {
            format!(
                "model not available at {}; run `lotwatch train` first",
                path.display()
            )
        })?;
        serde_json::from_str(&raw)
            .with_context(|| format!("model file {} is not a valid model", path.display()))
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }

    fn standardize(&self, row: &[f64; 4]) -> [f64; 4] {
        let mut out = [0.0; 4];
        for i in 0..4 {
            out[i] = (row[i] - self.feature_means[i]) / self.feature_scales[i];
        }
        out
    }
}

impl WasteModel for LogisticModel {
    fn predict_positive_probability(&self, rows: &[[f64; 4]]) -> Vec<f64> {
        rows.iter()
            .map(|row| {
                let z = self.standardize(row);
                let logit: f64 = self.bias
                    + z.iter()
                        .zip(self.weights.iter())
                        .map(|(x, w)| x * w)
                        .sum::<f64>();
                1.0 / (1.0 + (-logit).exp())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A model that only looks at days_to_expire: fewer days, more waste.
    fn days_only_model() -> LogisticModel {
        LogisticModel {
            weights: [0.0, -3.0, 0.0, 0.0],
            bias: 0.0,
            feature_means: [0.0, 10.0, 0.0, 0.0],
            feature_scales: [1.0, 10.0, 1.0, 1.0],
        }
    }

    #[test]
    fn test_probabilities_bounded_and_monotone_in_days() {
        let model = days_only_model();
        let rows: Vec<[f64; 4]> = (-10..40).map(|d| [100.0, d as f64, 5.0, 50.0]).collect();
        let probs = model.predict_positive_probability(&rows);
        for pair in probs.windows(2) {
            assert!(pair[1] <= pair[0], "waste prob rose with more days left");
        }
        assert!(probs.iter().all(|p| (0.0..=1.0).contains(p)));
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        let model = days_only_model();
        model.save(&path).unwrap();
        assert_eq!(LogisticModel::load(&path).unwrap(), model);
    }

    #[test]
    fn test_missing_model_has_remediation_hint() {
        let err = LogisticModel::load("/nonexistent/model.json").unwrap_err();
        assert!(err.to_string().contains("lotwatch train"));
    }

    #[test]
    fn test_empty_input_yields_empty_output() {
        assert!(days_only_model()
            .predict_positive_probability(&[])
            .is_empty());
    }
}
