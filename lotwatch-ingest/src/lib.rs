//! lotwatch-ingest: tabular snapshot I/O and batch preparation.
//!
//! Everything that touches CSV lives here; the core crates only ever see
//! typed [`lotwatch_core::Snapshot`] values.

pub mod prepare;
pub mod schema;
pub mod snapshot_csv;
pub mod text;

pub use prepare::{prepare_batch, write_quality_log, PrepareOutcome, QualityRecord};
pub use schema::{RiskColumn, IDENTITY_COLUMNS, SNAPSHOT_HEADER};
pub use snapshot_csv::{read_snapshot, write_snapshot};
pub use text::normalize_text;
