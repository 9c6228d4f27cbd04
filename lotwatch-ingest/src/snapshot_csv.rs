//! Read and write warehouse snapshots as CSV.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::path::Path;

use lotwatch_core::{expiry, risk, Lot, LotStatus, Snapshot};

use crate::schema::{
    column_index, require_columns, RiskColumn, IDENTITY_COLUMNS, SNAPSHOT_HEADER,
};

/// Load a snapshot file into typed lots.
///
/// Requires the identity columns plus `Avg_Usage_per_Day` and one of the
/// two risk column spellings; missing columns produce one error naming
/// them all. `Days_to_Expire` and `Status` are optional — when absent or
/// unreadable they are rederived from the expiry date against `today`.
/// Stored values are otherwise taken as-is; callers that need derived
/// columns consistent with `today` follow up with [`Snapshot::recalc`].
pub fn read_snapshot(path: impl AsRef<Path>, today: NaiveDate) -> Result<Snapshot> {
    let path = path.as_ref();
    let display = path.display().to_string();
    let mut rdr = csv::Reader::from_path(path).with_context(|| format!("opening {display}"))?;

    let headers = rdr.headers()?.clone();
    let mut required: Vec<&str> = IDENTITY_COLUMNS.to_vec();
    required.push("Avg_Usage_per_Day");
    require_columns(&headers, &required, &display)?;
    let risk_col = RiskColumn::detect(&headers).with_context(|| {
        format!("{display} is missing required columns: Risk_Score (or Risk)")
    })?;

    let col = |name: &str| column_index(&headers, name);
    let id = col("Product_ID").unwrap();
    let name = col("Product_Name").unwrap();
    let weight = col("Weight_or_Volume").unwrap();
    let lot_no = col("LOT_Number").unwrap();
    let expiry_col = col("Expiry_Date").unwrap();
    let qty = col("Quantity").unwrap();
    let usage = col("Avg_Usage_per_Day").unwrap();
    let risk_idx = col(risk_col.as_str()).unwrap();
    let days = col("Days_to_Expire");
    let status = col("Status");

    let mut lots = Vec::new();
    for result in rdr.records() {
        let record = result.with_context(|| format!("reading {display}"))?;
        let field = |i: usize| record.get(i).unwrap_or("").trim();

        let expiry_date = expiry::parse_expiry(field(expiry_col), today);
        let days_to_expire = days
            .and_then(|i| field(i).parse::<i64>().ok())
            .unwrap_or_else(|| expiry::days_to_expire(expiry_date, today));
        let status = status
            .and_then(|i| LotStatus::parse(field(i)))
            .unwrap_or_else(|| risk::classify(days_to_expire));
        let risk_score = field(risk_idx)
            .parse::<f64>()
            .unwrap_or_else(|_| risk::risk_score(days_to_expire));

        lots.push(Lot {
            product_id: field(id).to_string(),
            product_name: field(name).to_string(),
            weight_or_volume: field(weight).to_string(),
            lot_number: field(lot_no).to_string(),
            expiry_date,
            quantity: field(qty).parse::<i64>().unwrap_or(0).max(0),
            days_to_expire,
            status,
            risk_score,
            avg_usage_per_day: field(usage).parse().unwrap_or(0.0),
        });
    }

    Ok(Snapshot::new(lots))
}

/// Persist a snapshot in the canonical column order.
///
/// The expiry date is written as ISO text so repeated load/tick/save
/// cycles never drift the schema.
pub fn write_snapshot(path: impl AsRef<Path>, snapshot: &Snapshot) -> Result<()> {
    let path = path.as_ref();
    let mut wtr =
        csv::Writer::from_path(path).with_context(|| format!("writing {}", path.display()))?;

    wtr.write_record(SNAPSHOT_HEADER)?;
    for lot in &snapshot.lots {
        wtr.write_record(&[
            lot.product_id.clone(),
            lot.product_name.clone(),
            lot.weight_or_volume.clone(),
            lot.lot_number.clone(),
            lot.expiry_date.to_string(),
            lot.quantity.to_string(),
            lot.days_to_expire.to_string(),
            lot.status.to_string(),
            format!("{:.2}", lot.avg_usage_per_day),
            format!("{:.2}", lot.risk_score),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}
