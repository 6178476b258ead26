// Snapshot sources: where a run's `LeagueSnapshot` comes from.
//
// The engine only ever sees the finished snapshot. Provider adapters sit
// behind `SnapshotSource`; the file-backed source reads a snapshot JSON and
// can overlay season stats and bid history from CSV exports.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use hoopcast_core::loader::{load_bid_history, load_season_stats, load_snapshot};
use hoopcast_core::records::LeagueSnapshot;
use tracing::info;

#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Short description for logs.
    fn describe(&self) -> String;

    async fn load(&self) -> Result<LeagueSnapshot>;
}

/// Snapshot JSON on disk plus optional CSV overlays.
#[derive(Debug, Clone)]
pub struct FileSnapshotSource {
    pub snapshot_path: PathBuf,
    /// Replaces `players` when set.
    pub season_stats_csv: Option<PathBuf>,
    /// Replaces `bids` when set.
    pub bids_csv: Option<PathBuf>,
}

impl FileSnapshotSource {
    pub fn new(snapshot_path: impl Into<PathBuf>) -> Self {
        FileSnapshotSource {
            snapshot_path: snapshot_path.into(),
            season_stats_csv: None,
            bids_csv: None,
        }
    }

    pub fn with_season_stats(mut self, path: impl Into<PathBuf>) -> Self {
        self.season_stats_csv = Some(path.into());
        self
    }

    pub fn with_bids(mut self, path: impl Into<PathBuf>) -> Self {
        self.bids_csv = Some(path.into());
        self
    }

    fn load_blocking(&self) -> Result<LeagueSnapshot> {
        let mut snapshot = load_snapshot(&self.snapshot_path)
            .with_context(|| format!("failed to load snapshot {}", self.snapshot_path.display()))?;

        if let Some(path) = &self.season_stats_csv {
            snapshot.players = load_season_stats(path)
                .with_context(|| format!("failed to load season stats {}", path.display()))?;
            info!("season stats overlaid from {}", path.display());
        }
        if let Some(path) = &self.bids_csv {
            snapshot.bids = load_bid_history(path)
                .with_context(|| format!("failed to load bid history {}", path.display()))?;
            info!("bid history overlaid from {}", path.display());
        }
        Ok(snapshot)
    }
}

#[async_trait]
impl SnapshotSource for FileSnapshotSource {
    fn describe(&self) -> String {
        format!("file {}", self.snapshot_path.display())
    }

    async fn load(&self) -> Result<LeagueSnapshot> {
        let source = self.clone();
        let snapshot = tokio::task::spawn_blocking(move || source.load_blocking())
            .await
            .context("snapshot loading task panicked")??;
        info!(
            "loaded snapshot as of {}: {} players, {} bids, {} roster",
            snapshot.as_of,
            snapshot.players.len(),
            snapshot.bids.len(),
            snapshot.my_roster.len()
        );
        Ok(snapshot)
    }
}

/// Default snapshot location under `base_dir`.
pub fn default_snapshot_path(base_dir: &Path) -> PathBuf {
    base_dir.join("data").join("snapshot.json")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
