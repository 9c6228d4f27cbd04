//! lotwatch-model: waste classifier interface, a trainable logistic model,
//! and the prediction/scenario layers built on top of it.

pub mod history;
pub mod model;
pub mod predict;
pub mod scenario;
pub mod train;

pub use history::{generate_history, read_history, write_history, HistoryRow};
pub use model::{LogisticModel, WasteModel};
pub use predict::predict_probabilities;
pub use scenario::{simulate_scenario, ScenarioRow};
pub use train::{append_report, train_model, TrainReport};
