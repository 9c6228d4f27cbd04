//! Snapshot column contract.

use anyhow::{bail, Result};
use csv::StringRecord;

/// Identity columns every input file must carry.
pub const IDENTITY_COLUMNS: [&str; 6] = [
    "Product_ID",
    "Product_Name",
    "Weight_or_Volume",
    "LOT_Number",
    "Expiry_Date",
    "Quantity",
];

/// Canonical column order for persisted snapshots.
pub const SNAPSHOT_HEADER: [&str; 10] = [
    "Product_ID",
    "Product_Name",
    "Weight_or_Volume",
    "LOT_Number",
    "Expiry_Date",
    "Quantity",
    "Days_to_Expire",
    "Status",
    "Avg_Usage_per_Day",
    "Risk_Score",
];

/// Which of the two accepted risk column spellings a file uses.
///
/// Upstream exports drifted between `Risk_Score` and `Risk`; the name is
/// resolved exactly once per file, here, never by scattered checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskColumn {
    RiskScore,
    Risk,
}

impl RiskColumn {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskColumn::RiskScore => "Risk_Score",
            RiskColumn::Risk => "Risk",
        }
    }

    /// Detect the risk column from a header row, preferring `Risk_Score`.
    pub fn detect(headers: &StringRecord) -> Option<Self> {
        if headers.iter().any(|h| h == "Risk_Score") {
            Some(RiskColumn::RiskScore)
        } else if headers.iter().any(|h| h == "Risk") {
            Some(RiskColumn::Risk)
        } else {
            None
        }
    }
}

/// Index of `name` in the header row.
pub fn column_index(headers: &StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h == name)
}

/// Fail with one message naming every missing column, not just the first.
pub fn require_columns(headers: &StringRecord, required: &[&str], path: &str) -> Result<()> {
    let missing: Vec<&str> = required
        .iter()
        .filter(|name| column_index(headers, name).is_none())
        .copied()
        .collect();
    if !missing.is_empty() {
        bail!("{path} is missing required columns: {}", missing.join(", "));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_column_detection() {
        let both = StringRecord::from(vec!["Quantity", "Risk", "Risk_Score"]);
        assert_eq!(RiskColumn::detect(&both), Some(RiskColumn::RiskScore));

        let legacy = StringRecord::from(vec!["Quantity", "Risk"]);
        assert_eq!(RiskColumn::detect(&legacy), Some(RiskColumn::Risk));

        let neither = StringRecord::from(vec!["Quantity"]);
        assert_eq!(RiskColumn::detect(&neither), None);
    }

    #[test]
    fn test_require_columns_lists_all_missing() {
        let headers = StringRecord::from(vec!["Product_ID", "Quantity"]);
        let err = require_columns(&headers, &["Product_ID", "Expiry_Date", "Status"], "x.csv")
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Expiry_Date"));
        assert!(msg.contains("Status"));
        assert!(!msg.contains("Product_ID,"));
    }
}
