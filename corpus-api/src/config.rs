//! CLI flags, parsed with `clap` the way the teacher's binaries parse
//! flags, overlaid on top of the JSON config file. Any flag present on
//! the command line wins; everything else falls through to the file
//! (or its defaults).

use clap::Parser;
use corpus_core::{Config, ConfigError};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "corpus-api", about = "Synthetic corpus generation coordinator")]
pub struct Cli {
    /// Path to the JSON configuration file.
    #[arg(long, default_value = "./config.json")]
    pub config: PathBuf,

    #[arg(long)]
    pub state_dir: Option<PathBuf>,

    #[arg(long)]
    pub host: Option<String>,

    #[arg(long)]
    pub port: Option<u16>,

    #[arg(long)]
    pub master_schema_path: Option<PathBuf>,

    #[arg(long)]
    pub seed_corpus_path: Option<PathBuf>,

    #[arg(long)]
    pub target_total: Option<u64>,

    #[arg(long)]
    pub generation_target: Option<u64>,

    #[arg(long)]
    pub max_generation_attempts: Option<u32>,

    #[arg(long)]
    pub signature_fifo_size: Option<usize>,

    #[arg(long)]
    pub codec_timeout_ms: Option<u64>,

    #[arg(long)]
    pub similarity_window: Option<usize>,

    #[arg(long)]
    pub similarity_threshold: Option<f64>,
}

impl Cli {
    /// Loads the JSON config file (or falls back to `Config::default()`
    /// if the file is missing) and overlays any flags the caller set.
    pub fn resolve(&self) -> Result<Config, ConfigError> {
        let mut config = if self.config.exists() {
            Config::from_file(&self.config)?
        } else {
            Config::default()
        };

        if let Some(v) = &self.state_dir {
            config.state_dir = v.clone();
        }
        if let Some(v) = &self.host {
            config.host = v.clone();
        }
        if let Some(v) = self.port {
            config.port = v;
        }
        if let Some(v) = &self.master_schema_path {
            config.master_schema_path = v.clone();
        }
        if let Some(v) = &self.seed_corpus_path {
            config.seed_corpus_path = Some(v.clone());
        }
        if let Some(v) = self.target_total {
            config.target_total = v;
        }
        if let Some(v) = self.generation_target {
            config.generation_target = Some(v);
        }
        if let Some(v) = self.max_generation_attempts {
            config.max_generation_attempts = v;
        }
        if let Some(v) = self.signature_fifo_size {
            config.signature_fifo_size = v;
        }
        if let Some(v) = self.codec_timeout_ms {
            config.codec_timeout_ms = v;
        }
        if let Some(v) = self.similarity_window {
            config.similarity_window = v;
        }
        if let Some(v) = self.similarity_threshold {
            config.similarity_threshold = v;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli_with_port(port: Option<u16>) -> Cli {
        Cli {
            config: PathBuf::from("/nonexistent-corpus-api-config.json"),
            state_dir: None,
            host: None,
            port,
            master_schema_path: None,
            seed_corpus_path: None,
            target_total: None,
            generation_target: None,
            max_generation_attempts: None,
            signature_fifo_size: None,
            codec_timeout_ms: None,
            similarity_window: None,
            similarity_threshold: None,
        }
    }

    #[test]
    fn missing_config_file_falls_back_to_defaults() {
        let resolved = cli_with_port(None).resolve().unwrap();
        assert_eq!(resolved.port, Config::default().port);
    }

    proptest::proptest! {
        #[test]
        fn a_port_flag_always_overrides_the_file_default(port: u16) {
            let resolved = cli_with_port(Some(port)).resolve().unwrap();
            prop_assert_eq!(resolved.port, port);
        }
    }
}
