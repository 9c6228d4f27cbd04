//! Lot record types shared across the pipeline.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Discrete expiry tier of a lot.
///
/// `Expired`/`Critical`/`Medium`/`Active` are pure functions of
/// `days_to_expire` (see [`crate::risk::classify`]). `Fresh` is the
/// distinct literal the simulator stamps on newly injected lots; it is
/// replaced by a classified tier on the next full recalc pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LotStatus {
    Expired,
    Critical,
    Medium,
    Active,
    Fresh,
}

impl LotStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LotStatus::Expired => "Expired",
            LotStatus::Critical => "Critical",
            LotStatus::Medium => "Medium",
            LotStatus::Active => "Active",
            LotStatus::Fresh => "Fresh",
        }
    }

    /// Lenient parse for status values found in persisted snapshots.
    ///
    /// Accepts the legacy "OK"/"Vigente" spellings older exports used for
    /// the active and fresh tiers. Returns `None` for anything unknown so
    /// the loader can fall back to reclassifying from `days_to_expire`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "Expired" | "Expirado" => Some(LotStatus::Expired),
            "Critical" | "Crítico" => Some(LotStatus::Critical),
            "Medium" | "Medio" => Some(LotStatus::Medium),
            "Active" | "OK" => Some(LotStatus::Active),
            "Fresh" | "Vigente" => Some(LotStatus::Fresh),
            _ => None,
        }
    }
}

impl std::fmt::Display for LotStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One perishable inventory lot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lot {
    pub product_id: String,
    pub product_name: String,
    pub weight_or_volume: String,
    /// Uppercased, whitespace-normalized lot identifier.
    pub lot_number: String,
    /// Canonical expiry date; defaults to the evaluation date when the
    /// source value was unparseable (see [`crate::expiry::parse_expiry`]).
    pub expiry_date: NaiveDate,
    /// Units on hand; clamped at 0 on every mutation.
    pub quantity: i64,
    /// Signed whole days until expiry; negative means already expired.
    pub days_to_expire: i64,
    pub status: LotStatus,
    /// Bounded [0, 100] decay metric derived from `days_to_expire`.
    pub risk_score: f64,
    /// Estimated consumption rate, units per day.
    pub avg_usage_per_day: f64,
}

impl Lot {
    /// Recompute the derived fields against `today`, leaving identity and
    /// quantity untouched. Idempotent for a fixed `today`.
    pub fn recalc(&mut self, today: NaiveDate) {
        self.days_to_expire = crate::expiry::days_to_expire(self.expiry_date, today);
        let (status, risk) = crate::risk::assess(self.days_to_expire);
        self.status = status;
        self.risk_score = risk;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_legacy_spellings() {
        assert_eq!(LotStatus::parse("OK"), Some(LotStatus::Active));
        assert_eq!(LotStatus::parse("Vigente"), Some(LotStatus::Fresh));
        assert_eq!(LotStatus::parse(" Expired "), Some(LotStatus::Expired));
        assert_eq!(LotStatus::parse("???"), None);
    }

    #[test]
    fn test_recalc_derives_all_fields() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 1).unwrap();
        let mut lot = Lot {
            product_id: "MLK003".into(),
            product_name: "Whole Milk".into(),
            weight_or_volume: "1L".into(),
            lot_number: "LOT-101".into(),
            expiry_date: NaiveDate::from_ymd_opt(2026, 8, 3).unwrap(),
            quantity: 40,
            days_to_expire: 999,
            status: LotStatus::Fresh,
            risk_score: -1.0,
            avg_usage_per_day: 4.0,
        };
        lot.recalc(today);
        assert_eq!(lot.days_to_expire, 2);
        assert_eq!(lot.status, LotStatus::Critical);
        assert_eq!(lot.risk_score, 80.0);
    }
}
