//! lotwatch-core: domain types and computation kernel for perishable-lot tracking

pub mod expiry;
pub mod lot;
pub mod risk;
pub mod scenario;
pub mod simulate;
pub mod snapshot;

pub use expiry::{days_to_expire, parse_expiry, EXCEL_EPOCH};
pub use lot::{Lot, LotStatus};
pub use risk::{assess, classify, risk_score};
pub use scenario::{adjust_features, ScenarioParams};
pub use simulate::tick;
pub use snapshot::Snapshot;
