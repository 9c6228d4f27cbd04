use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};

use lotwatch_core::scenario::ScenarioParams;
use lotwatch_core::{tick, Snapshot};
use lotwatch_ingest::{prepare_batch, read_snapshot, write_quality_log, write_snapshot};
use lotwatch_model::{
    append_report, generate_history, predict_probabilities, read_history, simulate_scenario,
    train_model, write_history, LogisticModel,
};

mod config;

use config::{load_config, Config};

#[derive(Parser, Debug)]
#[command(name = "lotwatch", version, about = "Perishable-lot risk tracking and waste prediction")]
struct Cli {
    /// Path to a lotwatch.toml overriding the default data paths
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Evaluation date for every derived value this run (default: local today)
    #[arg(long, global = true)]
    today: Option<NaiveDate>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Clean a raw inventory export into the processed snapshot
    Prepare {
        /// Raw CSV export to clean
        input: PathBuf,

        /// Output snapshot path (default: configured processed snapshot)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Quality log path (default: configured quality log)
        #[arg(long)]
        quality_log: Option<PathBuf>,
    },

    /// Renormalize dates and reclassify risk in a snapshot, in place
    Refresh {
        /// Snapshot to refresh (default: configured processed snapshot)
        #[arg(long)]
        snapshot: Option<PathBuf>,
    },

    /// Advance the live warehouse state by simulated activity ticks
    Tick {
        /// Snapshot to advance (default: live state, falling back to processed)
        #[arg(long)]
        snapshot: Option<PathBuf>,

        /// Number of ticks to run
        #[arg(long, default_value_t = 1)]
        count: usize,

        /// Seed for reproducible ticks (default: entropy)
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Predict per-lot waste probability with the trained model
    Predict {
        /// Snapshot to score (default: live state, falling back to processed)
        #[arg(long)]
        snapshot: Option<PathBuf>,

        /// Model file (default: configured model path)
        #[arg(long)]
        model: Option<PathBuf>,

        /// Also write the scored snapshot to this CSV
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Compare predictions under a delay/consumption counterfactual
    Scenario {
        /// Delay before usage, in hours
        #[arg(long, default_value_t = 0.0)]
        delay_hours: f64,

        /// Consumption speed multiplier (1.0 = unchanged)
        #[arg(long, default_value_t = 1.0)]
        consumption_factor: f64,

        #[arg(long)]
        snapshot: Option<PathBuf>,

        #[arg(long)]
        model: Option<PathBuf>,

        /// Rows to print (sorted by |delta|, largest first)
        #[arg(long, default_value_t = 15)]
        limit: usize,
    },

    /// Train the waste model from labeled history
    Train {
        /// History CSV (default: configured path; generated if absent)
        #[arg(long)]
        history: Option<PathBuf>,

        /// Where to write the trained model
        #[arg(long)]
        model: Option<PathBuf>,

        /// Rows to generate when no history file exists
        #[arg(long, default_value_t = 500)]
        rows: usize,

        /// Seed for generation and the train/test shuffle
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = load_config(cli.config.as_deref())?;
    // One evaluation date for the whole run: every derived column in a
    // single invocation is computed against the same "today".
    let today = cli.today.unwrap_or_else(|| Local::now().date_naive());

    match cli.command {
        Command::Prepare {
            input,
            output,
            quality_log,
        } => cmd_prepare(&cfg, &input, output, quality_log, today),
        Command::Refresh { snapshot } => cmd_refresh(&cfg, snapshot, today),
        Command::Tick {
            snapshot,
            count,
            seed,
        } => cmd_tick(&cfg, snapshot, count, seed, today),
        Command::Predict {
            snapshot,
            model,
            out,
        } => cmd_predict(&cfg, snapshot, model, out, today),
        Command::Scenario {
            delay_hours,
            consumption_factor,
            snapshot,
            model,
            limit,
        } => cmd_scenario(&cfg, delay_hours, consumption_factor, snapshot, model, limit, today),
        Command::Train {
            history,
            model,
            rows,
            seed,
        } => cmd_train(&cfg, history, model, rows, seed),
    }
}

fn cmd_prepare(
    cfg: &Config,
    input: &Path,
    output: Option<PathBuf>,
    quality_log: Option<PathBuf>,
    today: NaiveDate,
) -> Result<()> {
    let output = output.unwrap_or_else(|| cfg.paths.processed_snapshot.clone());
    let quality_log = quality_log.unwrap_or_else(|| cfg.paths.quality_log.clone());

    let outcome = prepare_batch(input, today)?;
    ensure_parent(&output)?;
    write_snapshot(&output, &outcome.snapshot)?;
    ensure_parent(&quality_log)?;
    write_quality_log(&quality_log, &outcome.quality_log)?;

    println!(
        "Prepared {} lots -> {} ({} rows diverted to {})",
        outcome.snapshot.len(),
        output.display(),
        outcome.quality_log.len(),
        quality_log.display()
    );
    Ok(())
}

fn cmd_refresh(cfg: &Config, snapshot: Option<PathBuf>, today: NaiveDate) -> Result<()> {
    let path = snapshot.unwrap_or_else(|| cfg.paths.processed_snapshot.clone());
    let mut snap = read_snapshot(&path, today)?;
    snap.recalc(today);
    write_snapshot(&path, &snap)?;

    let expired = snap
        .lots
        .iter()
        .filter(|l| l.days_to_expire < 0)
        .count();
    println!(
        "Refreshed {} lots against {today} ({expired} expired) -> {}",
        snap.len(),
        path.display()
    );
    Ok(())
}

fn cmd_tick(
    cfg: &Config,
    snapshot: Option<PathBuf>,
    count: usize,
    seed: Option<u64>,
    today: NaiveDate,
) -> Result<()> {
    let (source, dest) = match snapshot {
        Some(p) => (p.clone(), p),
        None => (
            live_or_processed(cfg),
            cfg.paths.live_snapshot.clone(),
        ),
    };

    let mut snap = read_snapshot(&source, today)?;
    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };
    for _ in 0..count {
        snap = tick(&snap, today, &mut rng);
    }

    ensure_parent(&dest)?;
    write_snapshot(&dest, &snap)?;
    println!(
        "Advanced {} tick(s): {} lots -> {}",
        count,
        snap.len(),
        dest.display()
    );
    Ok(())
}

fn cmd_predict(
    cfg: &Config,
    snapshot: Option<PathBuf>,
    model: Option<PathBuf>,
    out: Option<PathBuf>,
    today: NaiveDate,
) -> Result<()> {
    let snapshot_path = snapshot.unwrap_or_else(|| live_or_processed(cfg));
    let model_path = model.unwrap_or_else(|| cfg.paths.model.clone());
    let model = LogisticModel::load(&model_path)?;

    let mut snap = read_snapshot(&snapshot_path, today)?;
    // Waste view only scores lots still in play.
    snap.retain_unexpired();
    if snap.is_empty() {
        println!("No lots with positive days to expire in {}", snapshot_path.display());
        return Ok(());
    }

    let probs = predict_probabilities(&snap, &model);

    let mut ranked: Vec<(usize, f64)> = probs.iter().copied().enumerate().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    println!("{:<10} {:<20} {:>5} {:>6} {:>10}", "Product", "Name", "Days", "Qty", "Prob %");
    for (i, prob) in ranked.iter().take(15) {
        let lot = &snap.lots[*i];
        println!(
            "{:<10} {:<20} {:>5} {:>6} {:>10.2}",
            lot.product_id, lot.product_name, lot.days_to_expire, lot.quantity, prob
        );
    }

    if let Some(out) = out {
        ensure_parent(&out)?;
        write_scored_snapshot(&out, &snap, &probs)?;
        println!("Scored snapshot written to {}", out.display());
    }
    Ok(())
}

fn cmd_scenario(
    cfg: &Config,
    delay_hours: f64,
    consumption_factor: f64,
    snapshot: Option<PathBuf>,
    model: Option<PathBuf>,
    limit: usize,
    today: NaiveDate,
) -> Result<()> {
    let snapshot_path = snapshot.unwrap_or_else(|| live_or_processed(cfg));
    let model_path = model.unwrap_or_else(|| cfg.paths.model.clone());
    let model = LogisticModel::load(&model_path)?;

    let mut snap = read_snapshot(&snapshot_path, today)?;
    // Already-expired lots have nothing left to lose to a delay.
    snap.retain_non_negative();
    if snap.is_empty() {
        println!("No valid lots to simulate; all are expired.");
        return Ok(());
    }

    let params = ScenarioParams {
        delay_hours,
        consumption_factor,
    };
    let mut rows = simulate_scenario(&snap, params, &model);
    rows.sort_by(|a, b| b.delta_signed.abs().total_cmp(&a.delta_signed.abs()));

    println!(
        "Scenario: delay {delay_hours}h, consumption x{consumption_factor} ({} lots)",
        rows.len()
    );
    println!(
        "{:<10} {:<20} {:>10} {:>10} {:>8}",
        "Product", "Name", "Current %", "Simul. %", "Delta"
    );
    for row in rows.iter().take(limit) {
        println!(
            "{:<10} {:<20} {:>10.2} {:>10.2} {:>+8.2}",
            row.product_id, row.product_name, row.prob_current, row.prob_simulated, row.delta_signed
        );
    }
    Ok(())
}

fn cmd_train(
    cfg: &Config,
    history: Option<PathBuf>,
    model: Option<PathBuf>,
    rows: usize,
    seed: u64,
) -> Result<()> {
    let history_path = history.unwrap_or_else(|| cfg.paths.training_history.clone());
    let model_path = model.unwrap_or_else(|| cfg.paths.model.clone());

    let mut rng = StdRng::seed_from_u64(seed);
    let rows = if history_path.exists() {
        read_history(&history_path)?
    } else {
        println!(
            "No history at {}; generating {} synthetic rows",
            history_path.display(),
            rows
        );
        let generated = generate_history(rows, true, &mut rng);
        ensure_parent(&history_path)?;
        write_history(&history_path, &generated)?;
        generated
    };

    let (trained, report) = train_model(&rows, &mut rng)?;
    ensure_parent(&model_path)?;
    trained.save(&model_path)?;
    append_report(&cfg.paths.model_log, &report)?;

    println!("Model trained on {} rows -> {}", report.n_train, model_path.display());
    println!(
        "Accuracy: train {:.3} / test {:.3} ({} held out)",
        report.train_accuracy, report.test_accuracy, report.n_test
    );
    Ok(())
}

/// Live state when it exists, otherwise the processed cold-start snapshot.
fn live_or_processed(cfg: &Config) -> PathBuf {
    if cfg.paths.live_snapshot.exists() {
        cfg.paths.live_snapshot.clone()
    } else {
        cfg.paths.processed_snapshot.clone()
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create {}", parent.display()))?;
        }
    }
    Ok(())
}

/// Snapshot columns plus the probability column, for downstream pages.
fn write_scored_snapshot(path: &Path, snap: &Snapshot, probs: &[f64]) -> Result<()> {
    let mut wtr =
        csv::Writer::from_path(path).with_context(|| format!("writing {}", path.display()))?;
    let mut header: Vec<&str> = lotwatch_ingest::SNAPSHOT_HEADER.to_vec();
    header.push("Probability_of_Expiration");
    wtr.write_record(&header)?;
    for (lot, prob) in snap.lots.iter().zip(probs) {
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
            format!("{prob:.2}"),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}
