//! Batch preparation: raw export -> clean snapshot + quality log.
//!
//! Simple batch normalization, deliberately not a general validation
//! framework: normalize text, parse expiry, divert rows with missing
//! required fields, deduplicate by lot key, derive the computed columns.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::path::Path;

use lotwatch_core::{expiry, Lot, LotStatus, Snapshot};

use crate::schema::{column_index, require_columns, IDENTITY_COLUMNS};
use crate::text::{normalize_lot_number, normalize_text};

/// A row diverted by the quality gate.
#[derive(Debug, Clone, PartialEq)]
pub struct QualityRecord {
    pub product_id: String,
    pub product_name: String,
    pub lot_number: String,
    pub expiry_raw: String,
    pub issue: &'static str,
}

/// Result of one preparation pass.
#[derive(Debug)]
pub struct PrepareOutcome {
    pub snapshot: Snapshot,
    pub quality_log: Vec<QualityRecord>,
}

/// Clean one raw CSV export into a canonical snapshot.
///
/// Rows missing `Product_ID`, `Product_Name`, or any expiry value at all
/// go to the quality log tagged `MISSING_REQUIRED` instead of the
/// snapshot. A *present but unparseable* expiry is not a quality failure:
/// it takes the default-to-today policy of the temporal normalizer.
/// Surviving rows are deduplicated by (product id, lot number, expiry),
/// quantities summed, first row wins for the other columns, then derived
/// columns are computed against `today` and the result is sorted by
/// (days to expire asc, quantity desc).
pub fn prepare_batch(path: impl AsRef<Path>, today: NaiveDate) -> Result<PrepareOutcome> {
    let path = path.as_ref();
    let display = path.display().to_string();
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("opening {display}"))?;

    let headers = rdr.headers()?.clone();
    require_columns(&headers, &IDENTITY_COLUMNS, &display)?;

    let id = column_index(&headers, "Product_ID").unwrap();
    let name = column_index(&headers, "Product_Name").unwrap();
    let weight = column_index(&headers, "Weight_or_Volume").unwrap();
    let lot_no = column_index(&headers, "LOT_Number").unwrap();
    let expiry_col = column_index(&headers, "Expiry_Date").unwrap();
    let qty = column_index(&headers, "Quantity").unwrap();

    let mut quality_log = Vec::new();
    // BTreeMap keeps dedup output deterministic.
    let mut by_key: BTreeMap<(String, String, NaiveDate), Lot> = BTreeMap::new();

    for result in rdr.records() {
        let record = result.with_context(|| format!("reading {display}"))?;
        let field = |i: usize| record.get(i).unwrap_or("").trim();

        let product_id = normalize_text(field(id));
        let product_name = normalize_text(field(name));
        let lot_number = normalize_lot_number(field(lot_no));
        let expiry_raw = field(expiry_col).to_string();

        if product_id.is_empty() || product_name.is_empty() || expiry_raw.is_empty() {
            quality_log.push(QualityRecord {
                product_id,
                product_name,
                lot_number,
                expiry_raw,
                issue: "MISSING_REQUIRED",
            });
            continue;
        }

        let expiry_date = expiry::parse_expiry(&expiry_raw, today);
        let quantity = field(qty).parse::<i64>().unwrap_or(0).max(0);

        let key = (product_id.clone(), lot_number.clone(), expiry_date);
        by_key
            .entry(key)
            .and_modify(|lot| lot.quantity += quantity)
            .or_insert(Lot {
                product_id,
                product_name,
                weight_or_volume: normalize_text(field(weight)),
                lot_number,
                expiry_date,
                quantity,
                days_to_expire: 0,
                status: LotStatus::Fresh,
                risk_score: 0.0,
                avg_usage_per_day: 0.0,
            });
    }

    let mut lots: Vec<Lot> = by_key.into_values().collect();
    for lot in &mut lots {
        lot.recalc(today);
        // Default consumption estimate: drain the lot evenly over its
        // remaining (at least one) days.
        let horizon = lot.days_to_expire.max(1) as f64;
        lot.avg_usage_per_day = (lot.quantity as f64 / horizon * 100.0).round() / 100.0;
    }
    lots.sort_by(|a, b| {
        a.days_to_expire
            .cmp(&b.days_to_expire)
            .then(b.quantity.cmp(&a.quantity))
    });

    Ok(PrepareOutcome {
        snapshot: Snapshot::new(lots),
        quality_log,
    })
}

/// Write the quality log CSV. Always produces a file, headed even when
/// there were no bad rows, so downstream jobs can rely on its existence.
pub fn write_quality_log(path: impl AsRef<Path>, log: &[QualityRecord]) -> Result<()> {
    let path = path.as_ref();
    let mut wtr =
        csv::Writer::from_path(path).with_context(|| format!("writing {}", path.display()))?;
    wtr.write_record([
        "Product_ID",
        "Product_Name",
        "LOT_Number",
        "Expiry_Date",
        "quality_issue",
    ])?;
    for rec in log {
        wtr.write_record([
            rec.product_id.as_str(),
            rec.product_name.as_str(),
            rec.lot_number.as_str(),
            rec.expiry_raw.as_str(),
            rec.issue,
        ])?;
    }
    wtr.flush()?;
    Ok(())
}
