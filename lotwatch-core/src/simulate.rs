//! Warehouse state simulator: advance a snapshot by one refresh tick.
//!
//! A tick models one interval of warehouse activity: a random subset of
//! lots gets consumed and decays, and one new delivery arrives. All
//! randomness flows through the caller's `Rng`, so ticks are reproducible
//! under a seeded generator.

use chrono::{Duration, NaiveDate};
use rand::seq::index::sample;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::lot::{Lot, LotStatus};
use crate::risk;
use crate::snapshot::Snapshot;

/// Fraction of existing lots touched per tick.
const MUTATION_FRACTION: f64 = 0.30;

/// Name pool for injected lots.
const NEW_PRODUCT_NAMES: &[&str] = &["Snack Box", "Juice Pack", "Salad Bowl", "Cheese Portion"];
const NEW_WEIGHTS: &[&str] = &["100g", "250ml", "180g"];

/// Advance `snapshot` by one tick.
///
/// Mutates a 30% sample of lots (consumption in [5,20] units clamped at
/// zero, elapsed-time decay of 0 or 1 days, derived fields recomputed)
/// and appends exactly one synthetic fresh lot. An empty snapshot is a
/// no-op: nothing to consume, and no delivery is injected either.
pub fn tick<R: Rng>(snapshot: &Snapshot, today: NaiveDate, rng: &mut R) -> Snapshot {
    if snapshot.is_empty() {
        return snapshot.clone();
    }

    let mut lots = snapshot.lots.clone();
    let n = lots.len();
    let sample_size = ((n as f64 * MUTATION_FRACTION) as usize).max(1);

    for idx in sample(rng, n, sample_size) {
        let lot = &mut lots[idx];
        lot.quantity = (lot.quantity - rng.gen_range(5..=20)).max(0);
        // Stochastic elapsed-time tick, not wall-clock time.
        lot.days_to_expire -= rng.gen_range(0..=1);
        let (status, score) = risk::assess(lot.days_to_expire);
        lot.status = status;
        lot.risk_score = score;
    }

    lots.push(synthesize_lot(today, rng));
    Snapshot::new(lots)
}

/// Build the one brand-new lot injected each tick.
fn synthesize_lot<R: Rng>(today: NaiveDate, rng: &mut R) -> Lot {
    let offset_days: i64 = rng.gen_range(3..=45);
    let expiry = today + Duration::days(offset_days);
    let quantity = rng.gen_range(50..=300);
    let avg_usage = (rng.gen_range(1.0..=8.0_f64) * 100.0).round() / 100.0;

    Lot {
        product_id: format!("NEW{}", rng.gen_range(100..=999)),
        product_name: NEW_PRODUCT_NAMES.choose(rng).unwrap().to_string(),
        weight_or_volume: NEW_WEIGHTS.choose(rng).unwrap().to_string(),
        lot_number: format!("LOT-{}", rng.gen_range(100..=999)),
        expiry_date: expiry,
        quantity,
        days_to_expire: offset_days,
        status: LotStatus::Fresh,
        risk_score: risk::risk_score(offset_days),
        avg_usage_per_day: avg_usage,
    }
}
