//! `blockfill.toml` loading.
//!
//! Two optional files are read: the user file at
//! `<config_dir>/blockfill/config.toml` and the project file (`blockfill.toml`
//! in the working directory, or the `--config` path). Keys set in the project
//! file win; anything unset in both falls back to the built-in default.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use blockfill_core::{CONSENSUS_WEIGHT_LIMIT, MAX_CONSECUTIVE_FAILURES};
use blockfill_eval::Sweep;
use serde::Deserialize;

use crate::output::OutputMode;

pub const PROJECT_FILE: &str = "blockfill.toml";

/// One config file as written. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub builder: BuilderSection,
    #[serde(default)]
    pub sweep: SweepSection,
    #[serde(default)]
    pub output: OutputSection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuilderSection {
    pub max_weight: Option<u64>,
    pub max_consecutive_failures: Option<usize>,
    pub comparator: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SweepSection {
    pub start: Option<u64>,
    pub step: Option<u64>,
    pub count: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputSection {
    pub format: Option<String>,
}

impl ConfigFile {
    /// Keys from `self`, falling back to `lower`.
    #[must_use]
    pub fn over(self, lower: Self) -> Self {
        Self {
            builder: BuilderSection {
                max_weight: self.builder.max_weight.or(lower.builder.max_weight),
                max_consecutive_failures: self
                    .builder
                    .max_consecutive_failures
                    .or(lower.builder.max_consecutive_failures),
                comparator: self.builder.comparator.or(lower.builder.comparator),
            },
            sweep: SweepSection {
                start: self.sweep.start.or(lower.sweep.start),
                step: self.sweep.step.or(lower.sweep.step),
                count: self.sweep.count.or(lower.sweep.count),
            },
            output: OutputSection {
                format: self.output.format.or(lower.output.format),
            },
        }
    }
}

/// Settings after merging both files with the defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub max_weight: u64,
    pub max_consecutive_failures: usize,
    pub comparator: String,
    pub sweep: Sweep,
    pub output: Option<OutputMode>,
}

impl Default for Config {
    fn default() -> Self {
        Self::from(ConfigFile::default())
    }
}

impl From<ConfigFile> for Config {
    fn from(file: ConfigFile) -> Self {
        let sweep = Sweep::default();
        Self {
            max_weight: file.builder.max_weight.unwrap_or(CONSENSUS_WEIGHT_LIMIT),
            max_consecutive_failures: file
                .builder
                .max_consecutive_failures
                .unwrap_or(MAX_CONSECUTIVE_FAILURES),
            comparator: file
                .builder
                .comparator
                .unwrap_or_else(|| "fee-rate-and-fee".to_string()),
            sweep: Sweep {
                start: file.sweep.start.unwrap_or(sweep.start),
                step: file.sweep.step.unwrap_or(sweep.step),
                count: file.sweep.count.unwrap_or(sweep.count),
            },
            output: file.output.format.as_deref().and_then(OutputMode::parse),
        }
    }
}

/// Parse one file; a missing file is an empty config.
///
/// # Errors
///
/// Fails if the file exists but cannot be read or parsed.
pub fn read_config_file(path: &Path) -> Result<ConfigFile> {
    if !path.exists() {
        return Ok(ConfigFile::default());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    toml::from_str::<ConfigFile>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("blockfill/config.toml"))
}

/// Load and merge the user and project files.
///
/// An explicit `--config` path must exist.
///
/// # Errors
///
/// Fails if an explicit path is missing or any present file is invalid.
pub fn load_config(explicit: Option<&Path>, cwd: &Path) -> Result<Config> {
    let project = match explicit {
        Some(path) => {
            anyhow::ensure!(path.exists(), "config file {} not found", path.display());
            read_config_file(path)?
        }
        None => read_config_file(&cwd.join(PROJECT_FILE))?,
    };
    let user = match user_config_path() {
        Some(path) => read_config_file(&path)?,
        None => ConfigFile::default(),
    };
    Ok(Config::from(project.over(user)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> ConfigFile {
        toml::from_str(raw).expect("valid toml")
    }

    #[test]
    fn defaults_match_the_builder_constants() {
        let config = Config::default();
        assert_eq!(config.max_weight, 3_992_820);
        assert_eq!(config.max_consecutive_failures, 1000);
        assert_eq!(config.comparator, "fee-rate-and-fee");
        assert_eq!(config.sweep, Sweep::default());
        assert_eq!(config.output, None);
    }

    #[test]
    fn project_keys_win_over_user_keys() {
        let project = parse("[builder]\nmax_weight = 1000\n[sweep]\ncount = 5\n");
        let user = parse(
            "[builder]\nmax_weight = 2000\ncomparator = \"fee-rate\"\n[output]\nformat = \"json\"\n",
        );
        let config = Config::from(project.over(user));
        assert_eq!(config.max_weight, 1000);
        assert_eq!(config.comparator, "fee-rate");
        assert_eq!(config.sweep.count, 5);
        assert_eq!(config.sweep.start, 3_000_000);
        assert_eq!(config.output, Some(OutputMode::Json));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(toml::from_str::<ConfigFile>("[builder]\nmax_wieght = 1\n").is_err());
    }

    #[test]
    fn missing_project_file_is_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = read_config_file(&dir.path().join(PROJECT_FILE)).expect("read");
        assert_eq!(file, ConfigFile::default());
    }

    #[test]
    fn explicit_path_must_exist() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("nope.toml");
        assert!(load_config(Some(&missing), dir.path()).is_err());
    }
}
