use std::fmt;

/// Machine-readable error codes surfaced by the CLI and the evaluation harness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    DependencyCycle,
    MissingEntry,
    UnknownDependency,
    AsymmetricLink,
    ResidualEntry,
    ZeroWeight,
    DuplicateTx,
    HeapDesync,
    LimitDecreased,
    MalformedSnapshot,
    UnsupportedSnapshot,
    SnapshotIo,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::DependencyCycle => "E2001",
            Self::MissingEntry => "E2002",
            Self::UnknownDependency => "E2003",
            Self::AsymmetricLink => "E2004",
            Self::ResidualEntry => "E2005",
            Self::ZeroWeight => "E2006",
            Self::DuplicateTx => "E2007",
            Self::HeapDesync => "E3001",
            Self::LimitDecreased => "E4001",
            Self::MalformedSnapshot => "E5001",
            Self::UnsupportedSnapshot => "E5002",
            Self::SnapshotIo => "E5003",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::DependencyCycle => "Dependency cycle in transaction pool",
            Self::MissingEntry => "Graph entry missing",
            Self::UnknownDependency => "Dependency not present in pool",
            Self::AsymmetricLink => "Depends/spent-by links are not inverses",
            Self::ResidualEntry => "Removed transaction still referenced",
            Self::ZeroWeight => "Transaction weight is zero",
            Self::DuplicateTx => "Transaction id appears twice",
            Self::HeapDesync => "Priority heap out of sync with graph",
            Self::LimitDecreased => "Weight limit below consumed weight",
            Self::MalformedSnapshot => "Malformed pool snapshot",
            Self::UnsupportedSnapshot => "Unsupported pool snapshot format",
            Self::SnapshotIo => "Pool snapshot could not be read",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::DependencyCycle => Some("Run `bf stats` to list the cycle members and fix the snapshot."),
            Self::UnknownDependency | Self::AsymmetricLink => {
                Some("Regenerate the snapshot; every parent must be present and list its children.")
            }
            Self::MissingEntry | Self::ResidualEntry | Self::HeapDesync => {
                Some("This is a bug in incremental maintenance. Report it with the snapshot.")
            }
            Self::ZeroWeight => Some("Every transaction needs a positive weight (or vsize)."),
            Self::DuplicateTx => Some("Drop the repeated entry from the snapshot."),
            Self::LimitDecreased => Some("Request weight limits in non-decreasing order."),
            Self::MalformedSnapshot => Some("Check the offending line: `id fee weight [depends...]`."),
            Self::UnsupportedSnapshot => Some("Use a `.json`, `.mempool` or `.txt` snapshot."),
            Self::SnapshotIo => Some("Check the path and read permissions."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors raised by closure and graph maintenance.
///
/// [`GraphError::UnknownDependency`], [`GraphError::AsymmetricLink`],
/// [`GraphError::ZeroWeight`] and [`GraphError::DuplicateTx`] reject bad input
/// at construction time. The rest signal a broken internal invariant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    #[error("dependency cycle through {id}")]
    Cycle { id: String },

    #[error("no graph entry for {id}")]
    MissingEntry { id: String },

    #[error("{tx} depends on {missing}, which is not in the pool")]
    UnknownDependency { tx: String, missing: String },

    #[error("{child} depends on {parent}, but {parent} does not list {child} as spent-by")]
    AsymmetricLink { parent: String, child: String },

    #[error("removed entry {id} still referenced by {holder}")]
    Residual { id: String, holder: String },

    #[error("transaction {id} has zero weight")]
    ZeroWeight { id: String },

    #[error("transaction {id} appears more than once")]
    DuplicateTx { id: String },
}

impl GraphError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Cycle { .. } => ErrorCode::DependencyCycle,
            Self::MissingEntry { .. } => ErrorCode::MissingEntry,
            Self::UnknownDependency { .. } => ErrorCode::UnknownDependency,
            Self::AsymmetricLink { .. } => ErrorCode::AsymmetricLink,
            Self::Residual { .. } => ErrorCode::ResidualEntry,
            Self::ZeroWeight { .. } => ErrorCode::ZeroWeight,
            Self::DuplicateTx { .. } => ErrorCode::DuplicateTx,
        }
    }
}

/// Errors raised by the ancestor-set selection engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuilderError {
    #[error("priority heap and graph disagree about {id}")]
    HeapDesync { id: String },

    #[error(transparent)]
    Graph(#[from] GraphError),
}

impl BuilderError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::HeapDesync { .. } => ErrorCode::HeapDesync,
            Self::Graph(e) => e.code(),
        }
    }
}

/// Errors raised while collecting blocks at increasing weight limits.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollectError {
    #[error("weight limit {limit} is below the {consumed} weight already consumed")]
    LimitDecreased { limit: u64, consumed: u64 },

    #[error(transparent)]
    Builder(#[from] BuilderError),
}

impl CollectError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::LimitDecreased { .. } => ErrorCode::LimitDecreased,
            Self::Builder(e) => e.code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn all_codes_are_unique() {
        let all = [
            ErrorCode::DependencyCycle,
            ErrorCode::MissingEntry,
            ErrorCode::UnknownDependency,
            ErrorCode::AsymmetricLink,
            ErrorCode::ResidualEntry,
            ErrorCode::ZeroWeight,
            ErrorCode::DuplicateTx,
            ErrorCode::HeapDesync,
            ErrorCode::LimitDecreased,
            ErrorCode::MalformedSnapshot,
            ErrorCode::UnsupportedSnapshot,
            ErrorCode::SnapshotIo,
        ];

        let mut seen = HashSet::new();
        for code in all {
            assert!(seen.insert(code.code()), "duplicate code {}", code.code());
        }
    }

    #[test]
    fn code_format_is_machine_friendly() {
        let code = ErrorCode::HeapDesync.code();
        assert_eq!(code.len(), 5);
        assert!(code.starts_with('E'));
        assert!(code.chars().skip(1).all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn nested_errors_keep_their_code() {
        let err = CollectError::from(BuilderError::from(GraphError::Cycle {
            id: "a".to_string(),
        }));
        assert_eq!(err.code(), ErrorCode::DependencyCycle);
        assert_eq!(err.to_string(), "dependency cycle through a");
    }
}
