//! Counterfactual feature math for what-if scenarios.
//!
//! Only the pure feature perturbation lives here; running the perturbed
//! features through a trained model is the model crate's job.

use crate::lot::Lot;

/// Fixed model feature order.
pub const FEATURE_NAMES: [&str; 4] = ["Quantity", "Days_to_Expire", "Avg_Usage_per_Day", "Risk"];

/// A counterfactual perturbation: delay before usage plus a consumption
/// speed multiplier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScenarioParams {
    /// Hours of delay before the product can be used; >= 0 expected.
    pub delay_hours: f64,
    /// Consumption speed multiplier; 1.0 = unchanged, > 0 expected.
    pub consumption_factor: f64,
}

impl ScenarioParams {
    pub fn identity() -> Self {
        Self {
            delay_hours: 0.0,
            consumption_factor: 1.0,
        }
    }
}

/// Current feature vector for one lot, in [`FEATURE_NAMES`] order.
pub fn current_features(lot: &Lot) -> [f64; 4] {
    [
        lot.quantity as f64,
        lot.days_to_expire as f64,
        lot.avg_usage_per_day,
        lot.risk_score,
    ]
}

/// Perturbed feature vector: the delay eats into days-to-expire
/// (fractional days allowed, may go negative) and the factor scales
/// usage. Quantity and risk are held constant; only time and usage move.
pub fn adjust_features(lot: &Lot, params: ScenarioParams) -> [f64; 4] {
    [
        lot.quantity as f64,
        lot.days_to_expire as f64 - params.delay_hours / 24.0,
        lot.avg_usage_per_day * params.consumption_factor,
        lot.risk_score,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lot::LotStatus;
    use chrono::NaiveDate;

    fn lot() -> Lot {
        Lot {
            product_id: "SNK001".into(),
            product_name: "Snack Box".into(),
            weight_or_volume: "100g".into(),
            lot_number: "LOT-200".into(),
            expiry_date: NaiveDate::from_ymd_opt(2026, 8, 17).unwrap(),
            quantity: 200,
            days_to_expire: 2,
            status: LotStatus::Critical,
            risk_score: 80.0,
            avg_usage_per_day: 5.0,
        }
    }

    #[test]
    fn test_identity_perturbation_is_a_fixed_point() {
        let lot = lot();
        assert_eq!(
            adjust_features(&lot, ScenarioParams::identity()),
            current_features(&lot)
        );
    }

    #[test]
    fn test_worked_example_24h_delay() {
        // [200, 2, 5, 80] with a 24h delay becomes [200, 1, 5, 80].
        let adjusted = adjust_features(
            &lot(),
            ScenarioParams {
                delay_hours: 24.0,
                consumption_factor: 1.0,
            },
        );
        assert_eq!(adjusted, [200.0, 1.0, 5.0, 80.0]);
    }

    #[test]
    fn test_out_of_range_inputs_stay_consistent() {
        // 96h on a 2-day lot pushes days negative; that is valid output.
        let adjusted = adjust_features(
            &lot(),
            ScenarioParams {
                delay_hours: 96.0,
                consumption_factor: 3.0,
            },
        );
        assert_eq!(adjusted[1], -2.0);
        assert_eq!(adjusted[2], 15.0);
    }
}
