//! Per-lot waste probability from the trained classifier.

use lotwatch_core::scenario::current_features;
use lotwatch_core::Snapshot;

use crate::model::WasteModel;

/// Waste probability per lot, in percent, rounded to 2 decimals.
///
/// Output order matches `snapshot.lots`; an empty snapshot yields an
/// empty vector. Values are guaranteed in [0, 100] given a conforming
/// model ([`WasteModel`] contract is [0, 1]).
pub fn predict_probabilities(snapshot: &Snapshot, model: &dyn WasteModel) -> Vec<f64> {
    let rows: Vec<[f64; 4]> = snapshot.lots.iter().map(current_features).collect();
    model
        .predict_positive_probability(&rows)
        .into_iter()
        .map(|p| (p * 100.0 * 100.0).round() / 100.0)
        .collect()
}
