//! Layered run configuration.
//!
//! Settings are merged, lowest priority first, from:
//!
//! 1. Built-in defaults
//! 2. Environment variables prefixed with `DUPSCAN_` (e.g. `DUPSCAN_HASH_CONCURRENCY=8`)
//! 3. CLI flags
//!
//! No configuration file is read.

use figment::providers::{Env, Serialized};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::cli::Cli;
use crate::duplicates::{CoordinatorConfig, DEFAULT_HASH_CONCURRENCY, DEFAULT_SCAN_CONCURRENCY};
use crate::scanner::{HashAlgorithm, Hasher, DEFAULT_BUFFER_SIZE};

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "DUPSCAN_";

/// Scan tuning settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Maximum directory listings in flight.
    #[serde(default = "default_scan_concurrency")]
    pub scan_concurrency: usize,
    /// Maximum file hashes in flight.
    #[serde(default = "default_hash_concurrency")]
    pub hash_concurrency: usize,
    /// Content digest algorithm.
    #[serde(default)]
    pub algorithm: HashAlgorithm,
    /// Read buffer size in bytes.
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
}

fn default_scan_concurrency() -> usize {
    DEFAULT_SCAN_CONCURRENCY
}

fn default_hash_concurrency() -> usize {
    DEFAULT_HASH_CONCURRENCY
}

fn default_buffer_size() -> usize {
    DEFAULT_BUFFER_SIZE
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scan_concurrency: DEFAULT_SCAN_CONCURRENCY,
            hash_concurrency: DEFAULT_HASH_CONCURRENCY,
            algorithm: HashAlgorithm::default(),
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

/// CLI values that were actually given; absent flags leave lower layers alone.
#[derive(Debug, Default, Serialize)]
struct CliOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    scan_concurrency: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hash_concurrency: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    algorithm: Option<HashAlgorithm>,
    #[serde(skip_serializing_if = "Option::is_none")]
    buffer_size: Option<usize>,
}

impl From<&Cli> for CliOverrides {
    fn from(cli: &Cli) -> Self {
        Self {
            scan_concurrency: cli.scan_threads,
            hash_concurrency: cli.hash_threads,
            algorithm: cli.algorithm,
            buffer_size: cli.buffer_size,
        }
    }
}

impl Config {
    /// Load defaults, `DUPSCAN_*` environment variables and CLI flags.
    ///
    /// # Errors
    ///
    /// Returns an error if an environment variable holds an invalid value.
    pub fn load(cli: &Cli) -> Result<Self, figment::Error> {
        Self::figment(Env::prefixed(ENV_PREFIX), cli)
            .extract::<Self>()
            .map(Self::normalized)
    }

    /// Build the layered figment with the given environment provider.
    #[must_use]
    pub fn figment(env: Env, cli: &Cli) -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(env)
            .merge(Serialized::defaults(CliOverrides::from(cli)))
    }

    /// Raise zero concurrency values to one.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.scan_concurrency = self.scan_concurrency.max(1);
        self.hash_concurrency = self.hash_concurrency.max(1);
        self
    }

    /// Coordinator settings derived from this configuration.
    #[must_use]
    pub fn coordinator_config(&self) -> CoordinatorConfig {
        CoordinatorConfig::default()
            .with_scan_concurrency(self.scan_concurrency)
            .with_hash_concurrency(self.hash_concurrency)
            .with_hasher(
                Hasher::new()
                    .with_algorithm(self.algorithm)
                    .with_buffer_size(self.buffer_size),
            )
    }
}
