//! Reading snapshots from disk.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use blockfill_core::Pool;
use serde::Serialize;
use tracing::{info, instrument};

use crate::error::PoolError;
use crate::json::{RecordedStats, parse_json};
use crate::text::parse_text;

/// On-disk snapshot format, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotFormat {
    Json,
    Text,
}

impl SnapshotFormat {
    /// `.json` is JSON; `.mempool` and `.txt` are text.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "json" => Some(Self::Json),
            "mempool" | "txt" => Some(Self::Text),
            _ => None,
        }
    }
}

/// A loaded pool and where it came from.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub path: PathBuf,
    pub format: SnapshotFormat,
    pub pool: Pool,
    /// Node-recorded package statistics; empty for text snapshots.
    pub recorded: HashMap<String, RecordedStats>,
}

impl Snapshot {
    /// File stem up to the first `_`, used as a short label in reports.
    #[must_use]
    pub fn label(&self) -> String {
        snapshot_label(&self.path)
    }

    #[must_use]
    pub fn agg_weight(&self) -> u64 {
        self.pool.values().map(|tx| tx.weight).sum()
    }
}

/// File stem of `path` up to the first `_`.
#[must_use]
pub fn snapshot_label(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    stem.split('_').next().unwrap_or_default().to_string()
}

/// Load a snapshot, picking the parser from the file extension.
///
/// # Errors
///
/// - [`PoolError::Unsupported`] for an unknown extension.
/// - [`PoolError::Io`] if the file cannot be read.
/// - Any parse error of the chosen format.
#[instrument]
pub fn load_pool(path: &Path) -> Result<Snapshot, PoolError> {
    let format = SnapshotFormat::from_path(path).ok_or_else(|| PoolError::Unsupported {
        path: path.to_path_buf(),
    })?;
    let input = fs::read_to_string(path).map_err(|source| PoolError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let (pool, recorded) = match format {
        SnapshotFormat::Json => {
            let parsed = parse_json(&input)?;
            (parsed.pool, parsed.recorded)
        }
        SnapshotFormat::Text => (parse_text(&input)?, HashMap::new()),
    };

    let snapshot = Snapshot {
        path: path.to_path_buf(),
        format,
        pool,
        recorded,
    };
    info!(
        txs = snapshot.pool.len(),
        agg_weight = snapshot.agg_weight(),
        "snapshot loaded"
    );
    Ok(snapshot)
}
