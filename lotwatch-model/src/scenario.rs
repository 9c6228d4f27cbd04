//! Scenario simulator: compare predicted waste under a counterfactual
//! delay/consumption perturbation against the current prediction.

use lotwatch_core::scenario::{adjust_features, current_features, ScenarioParams};
use lotwatch_core::Snapshot;

use crate::model::WasteModel;

/// One lot's current-vs-simulated comparison. Ephemeral: exists for one
/// request/response cycle, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioRow {
    pub product_id: String,
    pub product_name: String,
    pub lot_number: String,
    /// Percent, unrounded.
    pub prob_current: f64,
    pub prob_simulated: f64,
    /// `prob_simulated - prob_current`; exactly zero under the identity
    /// perturbation.
    pub delta_signed: f64,
}

/// Run the classifier on current and perturbed features for every lot.
///
/// Out-of-range parameters (negative adjusted days, extreme factors) are
/// the UI layer's concern; here they just flow through the math.
pub fn simulate_scenario(
    snapshot: &Snapshot,
    params: ScenarioParams,
    model: &dyn WasteModel,
) -> Vec<ScenarioRow> {
    let current: Vec<[f64; 4]> = snapshot.lots.iter().map(current_features).collect();
    let adjusted: Vec<[f64; 4]> = snapshot
        .lots
        .iter()
        .map(|lot| adjust_features(lot, params))
        .collect();

    let prob_current = model.predict_positive_probability(&current);
    let prob_simulated = model.predict_positive_probability(&adjusted);

    snapshot
        .lots
        .iter()
        .zip(prob_current)
        .zip(prob_simulated)
        .map(|((lot, cur), sim)| {
            // Delta is derived from the percent values after scaling so it
            // is bit-identical to prob_simulated - prob_current.
            let prob_current = cur * 100.0;
            let prob_simulated = sim * 100.0;
            ScenarioRow {
                product_id: lot.product_id.clone(),
                product_name: lot.product_name.clone(),
                lot_number: lot.lot_number.clone(),
                prob_current,
                prob_simulated,
                delta_signed: prob_simulated - prob_current,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LogisticModel;
    use chrono::NaiveDate;
    use lotwatch_core::{Lot, LotStatus};

    fn model() -> LogisticModel {
        LogisticModel {
            weights: [0.2, -3.0, 1.1, 0.5],
            bias: -0.1,
            feature_means: [150.0, 10.0, 5.0, 50.0],
            feature_scales: [80.0, 10.0, 3.0, 25.0],
        }
    }

    fn lot(days: i64, usage: f64) -> Lot {
        Lot {
            product_id: "SNK001".into(),
            product_name: "Snack Box".into(),
            weight_or_volume: "100g".into(),
            lot_number: "LOT-200".into(),
            expiry_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            quantity: 200,
            days_to_expire: days,
            status: LotStatus::Active,
            risk_score: 80.0,
            avg_usage_per_day: usage,
        }
    }

    #[test]
    fn test_identity_perturbation_zero_delta() {
        let snap = Snapshot::new(vec![lot(2, 5.0), lot(14, 1.5), lot(-1, 3.0)]);
        let rows = simulate_scenario(&snap, ScenarioParams::identity(), &model());
        for row in rows {
            assert_eq!(row.prob_current, row.prob_simulated);
            assert_eq!(row.delta_signed, 0.0);
        }
    }

    #[test]
    fn test_delay_raises_waste_probability() {
        let snap = Snapshot::new(vec![lot(5, 5.0)]);
        let rows = simulate_scenario(
            &snap,
            ScenarioParams {
                delay_hours: 48.0,
                consumption_factor: 1.0,
            },
            &model(),
        );
        assert!(rows[0].delta_signed > 0.0);
        assert_eq!(
            rows[0].delta_signed,
            rows[0].prob_simulated - rows[0].prob_current
        );
    }

    #[test]
    fn test_delta_equals_percent_difference_exactly() {
        // delta_signed must be bit-identical to the difference of the two
        // percent columns, across lots whose probabilities land all over
        // the sigmoid curve.
        let lots: Vec<Lot> = (-10..40)
            .flat_map(|days| (1..20).map(move |u| lot(days, u as f64)))
            .collect();
        let snap = Snapshot::new(lots);
        let rows = simulate_scenario(
            &snap,
            ScenarioParams {
                delay_hours: 30.0,
                consumption_factor: 1.4,
            },
            &model(),
        );
        for row in rows {
            assert_eq!(
                row.delta_signed,
                row.prob_simulated - row.prob_current,
                "days/usage lot {} drifted",
                row.lot_number
            );
        }
    }

    #[test]
    fn test_extreme_inputs_do_not_panic() {
        let snap = Snapshot::new(vec![lot(1, 5.0)]);
        let rows = simulate_scenario(
            &snap,
            ScenarioParams {
                delay_hours: 500.0,
                consumption_factor: 0.0,
            },
            &model(),
        );
        assert!(rows[0].prob_simulated.is_finite());
    }

    #[test]
    fn test_empty_snapshot() {
        assert!(
            simulate_scenario(&Snapshot::default(), ScenarioParams::identity(), &model())
                .is_empty()
        );
    }
}
