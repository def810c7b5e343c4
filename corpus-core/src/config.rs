//! Coordinator configuration: a typed struct loaded from a single JSON
//! file, with defaults for every tunable and overridable per-axis
//! target shares. CLI-flag overlay lives in the `corpus-api` binary,
//! which owns argument parsing; this crate only owns the shape of the
//! merged configuration and its JSON loading.

use crate::axes::AxisId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Target share (a fraction, not a count) for one bucket within one
/// axis. Stored as `BTreeMap<AxisId, BTreeMap<String, f64>>` so the
/// config file can override a handful of buckets without repeating the
/// whole table, and so the scheduler can look up shares without a
/// match statement per axis.
pub type AxisShares = BTreeMap<AxisId, BTreeMap<String, f64>>;

/// Errors raised while loading or validating configuration. Fatal:
/// these abort startup per the error-handling taxonomy in the spec.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("axis {axis:?} target shares must sum to at most 1.0, got {sum}")]
    SharesExceedOne { axis: AxisId, sum: f64 },
    #[error("axis {axis:?} has an override for unknown bucket '{bucket}'")]
    UnknownBucket { axis: AxisId, bucket: String },
}

/// Coordinator configuration, the merge of the JSON config file and any
/// CLI flag overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub state_dir: PathBuf,
    pub host: String,
    pub port: u16,
    pub master_schema_path: PathBuf,
    pub seed_corpus_path: Option<PathBuf>,
    pub target_total: u64,
    /// Defaults to `target_total - seed_count` at startup once the seed
    /// corpus has been counted; `None` here means "compute it".
    pub generation_target: Option<u64>,
    #[serde(default = "default_axis_shares")]
    pub axis_shares: AxisShares,
    pub max_generation_attempts: u32,
    pub signature_fifo_size: usize,
    pub codec_timeout_ms: u64,
    pub codec_command: Vec<String>,
    pub similarity_window: usize,
    pub similarity_threshold: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            state_dir: PathBuf::from("./state"),
            host: "127.0.0.1".to_string(),
            port: 8080,
            master_schema_path: PathBuf::from("./schema/master_schema.json"),
            seed_corpus_path: None,
            target_total: 2000,
            generation_target: None,
            axis_shares: default_axis_shares(),
            max_generation_attempts: 50,
            signature_fifo_size: 32,
            codec_timeout_ms: 5_000,
            codec_command: vec!["toon-cli".to_string()],
            similarity_window: 50,
            similarity_threshold: 0.9,
        }
    }
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Applies a sparse override table on top of this config's axis
    /// shares, leaving un-mentioned axes/buckets untouched.
    pub fn apply_share_overrides(&mut self, overrides: AxisShares) -> Result<(), ConfigError> {
        for (axis, buckets) in overrides {
            let known = axis.bucket_strs();
            for (bucket, share) in buckets {
                if !known.contains(&bucket.as_str()) {
                    return Err(ConfigError::UnknownBucket { axis, bucket });
                }
                self.axis_shares.entry(axis).or_default().insert(bucket, share);
            }
        }
        self.validate()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (axis, buckets) in &self.axis_shares {
            let sum: f64 = buckets.values().sum();
            if sum > 1.0 + 1e-9 {
                return Err(ConfigError::SharesExceedOne { axis: *axis, sum });
            }
        }
        Ok(())
    }

    pub fn generation_target_given_seed_count(&self, seed_count: u64) -> u64 {
        self.generation_target
            .unwrap_or_else(|| self.target_total.saturating_sub(seed_count))
    }
}

/// Equal-weight default shares for every axis: each bucket gets
/// `1.0 / bucket_count`. `secondary_topic` and the two hard-negative
/// axes are only ever drawn for a subset of instructions (per the
/// compatibility rules), so their shares are weights *within that
/// subset*, not a fraction of every instruction — the scheduler
/// normalizes against the applicable count, not `issued`.
pub fn default_axis_shares() -> AxisShares {
    let mut shares = AxisShares::new();
    for axis in AxisId::ALL {
        let buckets = axis.bucket_strs();
        let even = 1.0 / buckets.len() as f64;
        shares.insert(axis, buckets.into_iter().map(|b| (b.to_string(), even)).collect());
    }
    shares
}
