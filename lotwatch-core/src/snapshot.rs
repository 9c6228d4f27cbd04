//! Warehouse snapshot: an ordered collection of lots sharing one schema.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::lot::Lot;

/// The full warehouse state at one instant.
///
/// Not append-only: the simulator mutates it each tick and the result is
/// persisted as the next canonical snapshot. Lots are never deleted;
/// expired ones stay, tagged `Expired`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub lots: Vec<Lot>,
}

impl Snapshot {
    pub fn new(lots: Vec<Lot>) -> Self {
        Self { lots }
    }

    pub fn len(&self) -> usize {
        self.lots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lots.is_empty()
    }

    /// Recompute every derived column against one evaluation date.
    ///
    /// A single `today` for the whole batch: lots within one pass are
    /// never compared against different "now" instants. Safe to apply to
    /// an already-current snapshot (idempotent for a fixed date).
    pub fn recalc(&mut self, today: NaiveDate) {
        for lot in &mut self.lots {
            lot.recalc(today);
        }
    }

    /// Lots the waste page cares about: strictly positive days to expire.
    pub fn retain_unexpired(&mut self) {
        self.lots.retain(|l| l.days_to_expire > 0);
    }

    /// Lots eligible for scenario simulation: not yet expired.
    pub fn retain_non_negative(&mut self) {
        self.lots.retain(|l| l.days_to_expire >= 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lot::LotStatus;

    fn lot(days_offset: i64, today: NaiveDate) -> Lot {
        Lot {
            product_id: format!("P{days_offset}"),
            product_name: "Test".into(),
            weight_or_volume: "100g".into(),
            lot_number: "LOT-001".into(),
            expiry_date: today + chrono::Duration::days(days_offset),
            quantity: 10,
            days_to_expire: 0,
            status: LotStatus::Fresh,
            risk_score: 0.0,
            avg_usage_per_day: 1.0,
        }
    }

    #[test]
    fn test_recalc_is_idempotent_for_fixed_date() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 15).unwrap();
        let mut snap = Snapshot::new(vec![lot(-3, today), lot(0, today), lot(12, today)]);
        snap.recalc(today);
        let once = snap.clone();
        snap.recalc(today);
        assert_eq!(snap, once);
        assert_eq!(snap.lots[0].status, LotStatus::Expired);
        assert_eq!(snap.lots[1].status, LotStatus::Critical);
        assert_eq!(snap.lots[2].status, LotStatus::Active);
    }

    #[test]
    fn test_filters() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 15).unwrap();
        let mut snap = Snapshot::new(vec![lot(-3, today), lot(0, today), lot(12, today)]);
        snap.recalc(today);

        let mut unexpired = snap.clone();
        unexpired.retain_unexpired();
        assert_eq!(unexpired.len(), 1);

        let mut non_negative = snap.clone();
        non_negative.retain_non_negative();
        assert_eq!(non_negative.len(), 2);
    }
}
