use std::path::PathBuf;

use blockfill_core::ErrorCode;

/// Errors raised while reading or writing pool snapshots.
#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    #[error("line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("{tx} depends on {parent}, which is not in the snapshot")]
    UnknownParent { tx: String, parent: String },

    #[error("{tx} has neither `{field}` nor a fallback for it")]
    MissingField { tx: String, field: &'static str },

    #[error("{tx} has zero weight")]
    ZeroWeight { tx: String },

    #[error("unsupported snapshot '{}' (expected .json, .mempool or .txt)", path.display())]
    Unsupported { path: PathBuf },

    #[error("failed to access {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON snapshot: {0}")]
    Json(#[from] serde_json::Error),
}

impl PoolError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Malformed { .. } | Self::MissingField { .. } | Self::Json(_) => {
                ErrorCode::MalformedSnapshot
            }
            Self::UnknownParent { .. } => ErrorCode::UnknownDependency,
            Self::ZeroWeight { .. } => ErrorCode::ZeroWeight,
            Self::Unsupported { .. } => ErrorCode::UnsupportedSnapshot,
            Self::Io { .. } => ErrorCode::SnapshotIo,
        }
    }

    pub(crate) fn malformed(line: usize, reason: impl Into<String>) -> Self {
        Self::Malformed {
            line,
            reason: reason.into(),
        }
    }
}
