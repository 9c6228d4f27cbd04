//! Train the logistic waste model from labeled history.

use anyhow::{bail, Context, Result};
use chrono::Utc;
use rand::seq::SliceRandom;
use rand::Rng;
use std::io::Write;
use std::path::Path;

use crate::history::HistoryRow;
use crate::model::LogisticModel;

const TEST_FRACTION: f64 = 0.25;
const EPOCHS: usize = 300;
const LEARNING_RATE: f64 = 0.5;

/// Held-out evaluation of a training run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainReport {
    pub train_accuracy: f64,
    pub test_accuracy: f64,
    pub n_train: usize,
    pub n_test: usize,
}

/// Fit a logistic model on `rows` with a seeded shuffle and a 75/25
/// train/test split. Features are standardized on the training portion;
/// the standardization parameters travel with the model.
pub fn train_model<R: Rng>(rows: &[HistoryRow], rng: &mut R) -> Result<(LogisticModel, TrainReport)> {
    if rows.len() < 8 {
        bail!("need at least 8 history rows to train, got {}", rows.len());
    }

    let mut shuffled: Vec<&HistoryRow> = rows.iter().collect();
    shuffled.shuffle(rng);

    let n_test = ((rows.len() as f64) * TEST_FRACTION).round() as usize;
    let n_test = n_test.clamp(1, rows.len() - 1);
    let (test, train) = shuffled.split_at(n_test);

    let x_train: Vec<[f64; 4]> = train.iter().map(|r| r.features()).collect();
    let y_train: Vec<f64> = train.iter().map(|r| r.waste_label as f64).collect();

    let (means, scales) = standardization(&x_train);
    let z_train: Vec<[f64; 4]> = x_train
        .iter()
        .map(|row| standardize(row, &means, &scales))
        .collect();

    // Full-batch gradient descent on the logistic loss.
    let mut weights = [0.0_f64; 4];
    let mut bias = 0.0_f64;
    let m = z_train.len() as f64;
    for _ in 0..EPOCHS {
        let mut grad_w = [0.0_f64; 4];
        let mut grad_b = 0.0_f64;
        for (z, y) in z_train.iter().zip(&y_train) {
            let logit: f64 =
                bias + z.iter().zip(&weights).map(|(x, w)| x * w).sum::<f64>();
            let err = 1.0 / (1.0 + (-logit).exp()) - y;
            for i in 0..4 {
                grad_w[i] += err * z[i];
            }
            grad_b += err;
        }
        for i in 0..4 {
            weights[i] -= LEARNING_RATE * grad_w[i] / m;
        }
        bias -= LEARNING_RATE * grad_b / m;
    }

    let model = LogisticModel {
        weights,
        bias,
        feature_means: means,
        feature_scales: scales,
    };

    let report = TrainReport {
        train_accuracy: accuracy(&model, train),
        test_accuracy: accuracy(&model, test),
        n_train: train.len(),
        n_test: test.len(),
    };
    Ok((model, report))
}

/// Append a timestamped retrain entry to the model log file.
pub fn append_report(log_path: impl AsRef<Path>, report: &TrainReport) -> Result<()> {
    let log_path = log_path.as_ref();
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .with_context(|| format!("opening {}", log_path.display()))?;
    writeln!(
        file,
        "\n[{}] model retrained\ntrain accuracy: {:.3} ({} rows)\ntest accuracy:  {:.3} ({} rows)",
        Utc::now().format("%Y-%m-%d %H:%M:%S"),
        report.train_accuracy,
        report.n_train,
        report.test_accuracy,
        report.n_test,
    )?;
    Ok(())
}

fn standardization(rows: &[[f64; 4]]) -> ([f64; 4], [f64; 4]) {
    let m = rows.len() as f64;
    let mut means = [0.0; 4];
    for row in rows {
        for i in 0..4 {
            means[i] += row[i];
        }
    }
    for mean in &mut means {
        *mean /= m;
    }

    let mut scales = [0.0; 4];
    for row in rows {
        for i in 0..4 {
            scales[i] += (row[i] - means[i]).powi(2);
        }
    }
    for scale in &mut scales {
        // Constant features get scale 1 so standardization is a no-op.
        *scale = (*scale / m).sqrt().max(1e-9);
        if *scale < 1e-6 {
            *scale = 1.0;
        }
    }
    (means, scales)
}

fn standardize(row: &[f64; 4], means: &[f64; 4], scales: &[f64; 4]) -> [f64; 4] {
    let mut out = [0.0; 4];
    for i in 0..4 {
        out[i] = (row[i] - means[i]) / scales[i];
    }
    out
}

fn accuracy(model: &LogisticModel, rows: &[&HistoryRow]) -> f64 {
    use crate::model::WasteModel;
    if rows.is_empty() {
        return 0.0;
    }
    let features: Vec<[f64; 4]> = rows.iter().map(|r| r.features()).collect();
    let probs = model.predict_positive_probability(&features);
    let correct = probs
        .iter()
        .zip(rows)
        .filter(|(p, r)| (**p > 0.5) == (r.waste_label == 1))
        .count();
    correct as f64 / rows.len() as f64
}
