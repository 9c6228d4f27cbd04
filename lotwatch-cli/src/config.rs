use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File locations the commands default to. Overridable one by one from
/// an optional `lotwatch.toml` next to the working directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub paths: PathsSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsSection {
    /// Cleaned snapshot written by `prepare`, read as the cold-start state.
    pub processed_snapshot: PathBuf,
    /// Rolling warehouse state advanced by `tick`.
    pub live_snapshot: PathBuf,
    pub model: PathBuf,
    pub model_log: PathBuf,
    pub quality_log: PathBuf,
    pub training_history: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            paths: PathsSection {
                processed_snapshot: PathBuf::from("data/expirations_processed.csv"),
                live_snapshot: PathBuf::from("data/live_warehouse_state.csv"),
                model: PathBuf::from("data/waste_model.json"),
                model_log: PathBuf::from("data/model_log.txt"),
                quality_log: PathBuf::from("data/quality_log.csv"),
                training_history: PathBuf::from("data/waste_training_history.csv"),
            },
        }
    }
}

pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = path.unwrap_or(Path::new("lotwatch.toml"));
    if !path.exists() {
        return Ok(Config::default());
    }
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("parse {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_no_file() {
        let cfg = load_config(Some(Path::new("/nonexistent/lotwatch.toml"))).unwrap();
        assert_eq!(
            cfg.paths.model,
            PathBuf::from("data/waste_model.json")
        );
    }

    #[test]
    fn test_partial_override_is_an_error_free_full_section() {
        // A config file replaces the whole [paths] section.
        let toml = r#"
[paths]
processed_snapshot = "x/processed.csv"
live_snapshot = "x/live.csv"
model = "x/model.json"
model_log = "x/log.txt"
quality_log = "x/quality.csv"
training_history = "x/history.csv"
"#;
        let cfg: Config = toml::from_str(toml).unwrap();
        assert_eq!(cfg.paths.live_snapshot, PathBuf::from("x/live.csv"));
    }
}
