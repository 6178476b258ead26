// Command-line options and the single-run driver behind the binary.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use hoopcast_basketball::pipeline::{run_analysis, AnalysisReport};
use hoopcast_core::config::{load_config, EngineConfig};
use tracing::info;

use crate::report::render_text;
use crate::source::{default_snapshot_path, FileSnapshotSource, SnapshotSource};

/// Rank waiver pickups and suggest FAAB bids from a league snapshot.
#[derive(Debug, Clone, Default, PartialEq, Parser)]
#[command(name = "hoopcast", version)]
pub struct CliOptions {
    /// League snapshot JSON (default: data/snapshot.json under the base dir)
    #[arg(long)]
    pub snapshot: Option<PathBuf>,

    /// Season stats CSV, replaces the snapshot's players
    #[arg(long = "stats", value_name = "PATH")]
    pub stats_csv: Option<PathBuf>,

    /// Bid history CSV, replaces the snapshot's bids
    #[arg(long = "bids", value_name = "PATH")]
    pub bids_csv: Option<PathBuf>,

    /// Directory holding config/ and defaults/
    #[arg(long)]
    pub base_dir: Option<PathBuf>,

    /// Punt a category (repeatable, e.g. --punt FG% --punt TO)
    #[arg(long = "punt", value_name = "CAT")]
    pub punts: Vec<String>,

    /// Rows in the ranked table
    #[arg(long = "top", value_name = "N")]
    pub top_n: Option<usize>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Where config/ and defaults/ live: the explicit directory, else the
/// current directory when it has either, else the per-user data directory.
pub fn resolve_base_dir(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir.to_path_buf());
    }
    let cwd = std::env::current_dir().context("failed to read current directory")?;
    if cwd.join("defaults").is_dir() || cwd.join("config").is_dir() {
        return Ok(cwd);
    }
    match directories::ProjectDirs::from("", "", "hoopcast") {
        Some(dirs) => Ok(dirs.data_dir().to_path_buf()),
        None => Ok(cwd),
    }
}

/// Engine config from the files under `base_dir` with command-line punts
/// applied. League auto-detection happens later, once the snapshot is in.
pub fn load_run_config(base_dir: &Path, punts: &[String]) -> Result<EngineConfig> {
    let config = load_config(base_dir)
        .with_context(|| format!("failed to load configuration from {}", base_dir.display()))?;
    if punts.is_empty() {
        return Ok(config);
    }
    config.with_punts(punts).context("invalid --punt")
}

/// Load, analyse and render. Returns the text to print.
pub async fn run(opts: &CliOptions) -> Result<String> {
    let base_dir = resolve_base_dir(opts.base_dir.as_deref())?;
    let config = load_run_config(&base_dir, &opts.punts)?;
    info!(
        "config loaded from {}: {} ({} categories)",
        base_dir.display(),
        config.league_name,
        config.active_categories().count()
    );

    let mut source = FileSnapshotSource::new(
        opts.snapshot
            .clone()
            .unwrap_or_else(|| default_snapshot_path(&base_dir)),
    );
    if let Some(path) = &opts.stats_csv {
        source = source.with_season_stats(path);
    }
    if let Some(path) = &opts.bids_csv {
        source = source.with_bids(path);
    }

    let report = analyse(&source, &config).await?;
    if opts.json {
        return serde_json::to_string_pretty(&report).context("failed to serialize report");
    }
    let top_n = opts.top_n.unwrap_or(config.report.top_n);
    Ok(render_text(&report, top_n))
}

/// Snapshot from `source`, league auto-detection, then the pipeline.
pub async fn analyse(source: &dyn SnapshotSource, config: &EngineConfig) -> Result<AnalysisReport> {
    info!("loading snapshot from {}", source.describe());
    let snapshot = source.load().await?;
    let config = config.from_league_settings(&snapshot.settings);
    let report = run_analysis(&snapshot, &config).context("analysis failed")?;
    info!(
        "analysis complete: {} ranked, {} bid suggestions",
        report.recommendations.len(),
        report.bid_suggestions.len()
    );
    Ok(report)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
