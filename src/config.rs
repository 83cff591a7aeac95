//! Server configuration
//!
//! Resolution order: built-in defaults, then an optional YAML file named by
//! `PROTGRAPH_CONFIG`, then individual `PROTGRAPH_*` environment variables.

use crate::graph::LpaConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

/// Environment variable naming a YAML configuration file
pub const CONFIG_ENV: &str = "PROTGRAPH_CONFIG";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid YAML configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Which job a labeling click runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelingMode {
    /// Wait, then report a canned success
    #[default]
    Simulated,
    /// Label propagation and majority-vote EC prediction on the graph
    Community,
    /// POST to `labeling_endpoint`
    Remote,
}

impl std::str::FromStr for LabelingMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "simulated" => Ok(LabelingMode::Simulated),
            "community" => Ok(LabelingMode::Community),
            "remote" => Ok(LabelingMode::Remote),
            _ => Err(()),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address
    pub address: String,
    /// Port
    pub port: u16,
    /// UniProt TSV export loaded into the catalog at startup
    pub catalog_path: Option<PathBuf>,
    /// Similarity edge list loaded into the graph at startup
    pub similarity_path: Option<PathBuf>,
    /// Upper bound for one statistics fetch by the dashboard renderer
    pub stats_timeout_ms: u64,
    /// Delay of the simulated labeling job
    pub labeling_delay_ms: u64,
    /// Job started by a labeling click
    pub labeling_mode: LabelingMode,
    /// Endpoint of the remote labeling job
    pub labeling_endpoint: Option<String>,
    /// Parameters of the community labeling job
    pub community: LpaConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "0.0.0.0".to_string(),
            port: 5000,
            catalog_path: None,
            similarity_path: None,
            stats_timeout_ms: 10_000,
            labeling_delay_ms: 2_000,
            labeling_mode: LabelingMode::Simulated,
            labeling_endpoint: None,
            community: LpaConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Parse a YAML document; missing keys keep their defaults
    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    /// Load from `PROTGRAPH_CONFIG` (if set) and the process environment
    pub fn load() -> ConfigResult<Self> {
        let mut config = match std::env::var_os(CONFIG_ENV) {
            Some(path) => {
                info!("Reading configuration from {}", Path::new(&path).display());
                Self::from_yaml_file(path)?
            }
            None => Self::default(),
        };
        config.apply_env(std::env::vars())?;
        Ok(config)
    }

    /// Apply `PROTGRAPH_*` overrides from a key/value source
    pub fn apply_env<I>(&mut self, vars: I) -> ConfigResult<()>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            match key.as_str() {
                "PROTGRAPH_ADDRESS" => self.address = value,
                "PROTGRAPH_PORT" => self.port = parse_value(&key, &value)?,
                "PROTGRAPH_CATALOG" => self.catalog_path = Some(PathBuf::from(value)),
                "PROTGRAPH_SIMILARITIES" => self.similarity_path = Some(PathBuf::from(value)),
                "PROTGRAPH_STATS_TIMEOUT_MS" => self.stats_timeout_ms = parse_value(&key, &value)?,
                "PROTGRAPH_LABELING_DELAY_MS" => {
                    self.labeling_delay_ms = parse_value(&key, &value)?
                }
                "PROTGRAPH_LABELING_MODE" => self.labeling_mode = parse_value(&key, &value)?,
                "PROTGRAPH_LABELING_ENDPOINT" => self.labeling_endpoint = Some(value),
                "PROTGRAPH_COMMUNITY_MAX_ITERATIONS" => {
                    self.community.max_iterations = parse_value(&key, &value)?
                }
                "PROTGRAPH_COMMUNITY_MIN_JACCARD" => {
                    self.community.min_jaccard = parse_value(&key, &value)?
                }
                "PROTGRAPH_COMMUNITY_MIN_SIZE" => {
                    self.community.min_community_size = parse_value(&key, &value)?
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// `address:port` string for binding
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }

    pub fn stats_timeout(&self) -> Duration {
        Duration::from_millis(self.stats_timeout_ms)
    }

    pub fn labeling_delay(&self) -> Duration {
        Duration::from_millis(self.labeling_delay_ms)
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> ConfigResult<T> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}
