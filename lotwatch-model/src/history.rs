//! Waste training history: the labeled dataset the classifier learns from.
//!
//! Ships a synthetic generator so a fresh checkout can train end to end
//! without real warehouse history. Distributions and the label rule match
//! the production retrain job's mock generator.

use anyhow::{bail, Context, Result};
use rand::seq::SliceRandom;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use std::path::Path;

/// Columns a history file must carry.
pub const HISTORY_COLUMNS: [&str; 5] = [
    "Quantity",
    "Days_to_Expire",
    "Avg_Usage_per_Day",
    "Risk",
    "Waste_Label",
];

const PRODUCT_POOL: &[&str] = &["MLK003", "BIS007", "FRU009", "SAL008", "SNK001", "CHS010"];

/// One labeled training example.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRow {
    pub product_id: String,
    pub quantity: i64,
    pub days_to_expire: i64,
    pub avg_usage_per_day: f64,
    pub risk: f64,
    pub waste_label: u8,
}

impl HistoryRow {
    pub fn features(&self) -> [f64; 4] {
        [
            self.quantity as f64,
            self.days_to_expire as f64,
            self.avg_usage_per_day,
            self.risk,
        ]
    }
}

/// Generate `n` labeled rows from the caller's rng.
///
/// Base risk is `clamp(100 - days*usage / (quantity/10 + 1), 0, 100)`.
/// Label rule: waste when already expired, or when fewer than 5 days
/// remain and stock exceeds 5 days of usage. With `noisy` set, Gaussian
/// noise (sigma 5) is added to risk and labels are re-drawn imperfectly
/// from the noisy risk, so the trained model never sees a perfectly
/// separable dataset.
pub fn generate_history<R: Rng>(n: usize, noisy: bool, rng: &mut R) -> Vec<HistoryRow> {
    let noise = Normal::new(0.0, 5.0).unwrap();

    (0..n)
        .map(|_| {
            let quantity = rng.gen_range(50..800);
            let days = rng.gen_range(-10..30);
            let usage = rng.gen_range(1.0..15.0);

            let base_risk = (100.0
                - (days as f64 * usage) / ((quantity as f64 / 10.0) + 1.0))
                .clamp(0.0, 100.0);

            let (risk, label) = if noisy {
                let noisy_risk =
                    ((base_risk + noise.sample(rng)).clamp(0.0, 100.0) * 100.0).round() / 100.0;
                let prob = noisy_risk / 100.0 * 0.8 + rng.gen_range(0.0..0.2);
                (noisy_risk, u8::from(prob > 0.6))
            } else {
                let label =
                    u8::from(days < 0 || (days < 5 && quantity as f64 > usage * 5.0));
                (base_risk, label)
            };

            HistoryRow {
                product_id: PRODUCT_POOL.choose(rng).unwrap().to_string(),
                quantity,
                days_to_expire: days,
                avg_usage_per_day: usage,
                risk,
                waste_label: label,
            }
        })
        .collect()
}

/// Load a history CSV, erroring with every missing column named.
pub fn read_history(path: impl AsRef<Path>) -> Result<Vec<HistoryRow>> {
    let path = path.as_ref();
    let display = path.display().to_string();
    let mut rdr = csv::Reader::from_path(path).with_context(|| format!("opening {display}"))?;

    let headers = rdr.headers()?.clone();
    let col = |name: &str| headers.iter().position(|h| h == name);
    let missing: Vec<&str> = HISTORY_COLUMNS
        .iter()
        .filter(|name| col(name).is_none())
        .copied()
        .collect();
    if !missing.is_empty() {
        bail!("{display} is missing required columns: {}", missing.join(", "));
    }

    let product = col("Product_ID");
    let qty = col("Quantity").unwrap();
    let days = col("Days_to_Expire").unwrap();
    let usage = col("Avg_Usage_per_Day").unwrap();
    let risk = col("Risk").unwrap();
    let label = col("Waste_Label").unwrap();

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result.with_context(|| format!("reading {display}"))?;
        let field = |i: usize| record.get(i).unwrap_or("").trim();
        rows.push(HistoryRow {
            product_id: product.map(field).unwrap_or("").to_string(),
            quantity: field(qty).parse().unwrap_or(0),
            days_to_expire: field(days).parse().unwrap_or(0),
            avg_usage_per_day: field(usage).parse().unwrap_or(0.0),
            risk: field(risk).parse().unwrap_or(0.0),
            waste_label: field(label).parse().unwrap_or(0),
        });
    }
    Ok(rows)
}

/// Persist history rows (e.g. a freshly generated synthetic set).
pub fn write_history(path: impl AsRef<Path>, rows: &[HistoryRow]) -> Result<()> {
    let path = path.as_ref();
    let mut wtr =
        csv::Writer::from_path(path).with_context(|| format!("writing {}", path.display()))?;
    wtr.write_record([
        "Product_ID",
        "Quantity",
        "Days_to_Expire",
        "Avg_Usage_per_Day",
        "Risk",
        "Waste_Label",
    ])?;
    for row in rows {
        wtr.write_record(&[
            row.product_id.clone(),
            row.quantity.to_string(),
            row.days_to_expire.to_string(),
            format!("{:.4}", row.avg_usage_per_day),
            format!("{:.2}", row.risk),
            row.waste_label.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}
