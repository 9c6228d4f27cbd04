//! Rule-based expiry risk classifier.
//!
//! Pure functions of `days_to_expire`; the simulator and the refresh pass
//! both go through these so the tiers and the score can never drift apart.

use crate::lot::LotStatus;

/// Map days-to-expire to a discrete status tier.
///
/// Boundaries are inclusive: 0..=2 Critical, 3..=7 Medium.
pub fn classify(days_to_expire: i64) -> LotStatus {
    if days_to_expire < 0 {
        LotStatus::Expired
    } else if days_to_expire <= 2 {
        LotStatus::Critical
    } else if days_to_expire <= 7 {
        LotStatus::Medium
    } else {
        LotStatus::Active
    }
}

/// Linear risk decay, saturating at both ends: `clamp(100 - 10d, 0, 100)`.
///
/// Constant 100 for every `d <= 0`, so "just expired" and "expired long
/// ago" score identically. Known limitation, fine for this domain.
pub fn risk_score(days_to_expire: i64) -> f64 {
    (100.0 - 10.0 * days_to_expire as f64).clamp(0.0, 100.0)
}

/// Status and score together.
pub fn assess(days_to_expire: i64) -> (LotStatus, f64) {
    (classify(days_to_expire), risk_score(days_to_expire))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_boundaries() {
        assert_eq!(classify(-1), LotStatus::Expired);
        assert_eq!(classify(0), LotStatus::Critical);
        assert_eq!(classify(2), LotStatus::Critical);
        assert_eq!(classify(3), LotStatus::Medium);
        assert_eq!(classify(7), LotStatus::Medium);
        assert_eq!(classify(8), LotStatus::Active);
    }

    #[test]
    fn test_risk_score_formula_and_clamps() {
        assert_eq!(risk_score(0), 100.0);
        assert_eq!(risk_score(3), 70.0);
        assert_eq!(risk_score(10), 0.0);
        assert_eq!(risk_score(45), 0.0);
        // Degenerate below zero: all expired lots score 100.
        assert_eq!(risk_score(-5), 100.0);
        assert_eq!(risk_score(-500), 100.0);
    }

    #[test]
    fn test_risk_score_monotonically_non_increasing() {
        let mut prev = f64::INFINITY;
        for d in -15..60 {
            let r = risk_score(d);
            assert!(r <= prev, "risk rose at d={d}: {r} > {prev}");
            assert!((0.0..=100.0).contains(&r));
            prev = r;
        }
    }

    #[test]
    fn test_assess_idempotent() {
        for d in [-5, 0, 2, 3, 7, 8, 30] {
            assert_eq!(assess(d), assess(d));
        }
    }

    #[test]
    fn test_expired_lot_example() {
        let (status, risk) = assess(-5);
        assert_eq!(status, LotStatus::Expired);
        assert_eq!(risk, 100.0);
    }
}
