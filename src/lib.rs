//! Notes Client
//!
//! An optimistic note list view-model kept in sync with a remote note store:
//! - Pure reducer over a closed action set
//! - Optimistic create/delete/toggle with fire-and-forget remote sync
//! - Real-time "note created" feed with echo suppression and reconnect
//! - HTTP + NATS adapter for the remote store, in-memory mock for tests

pub mod events;
pub mod notes;
pub mod session;
pub mod store;
pub mod view;

use anyhow::Result;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use view::{ReconnectPolicy, RetryPolicy, SyncPolicy};

// ============================================================================
// YAML config structs (deserialization targets)
// ============================================================================

/// Top-level YAML configuration file structure
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub store: StoreYamlConfig,
    pub sync: SyncYamlConfig,
}

/// Remote note store section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreYamlConfig {
    pub url: String,
    /// NATS server for "note created" events; real-time updates are off without it
    pub nats_url: Option<String>,
    pub subject_prefix: String,
    pub request_timeout_secs: u64,
}

impl Default for StoreYamlConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:4000".into(),
            nats_url: None,
            subject_prefix: events::nats::DEFAULT_SUBJECT_PREFIX.into(),
            request_timeout_secs: 10,
        }
    }
}

/// Synchronization section. Defaults keep plain fire-and-forget behavior.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SyncYamlConfig {
    pub rollback_on_failure: bool,
    pub fetch_attempts: u32,
    pub fetch_backoff_ms: u64,
    pub resubscribe_backoff_ms: u64,
    pub max_resubscribe_backoff_ms: u64,
}

impl Default for SyncYamlConfig {
    fn default() -> Self {
        Self {
            rollback_on_failure: false,
            fetch_attempts: 1,
            fetch_backoff_ms: 250,
            resubscribe_backoff_ms: 500,
            max_resubscribe_backoff_ms: 30_000,
        }
    }
}

// ============================================================================
// Runtime config (what the application actually uses)
// ============================================================================

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub store_url: String,
    pub nats_url: Option<String>,
    pub subject_prefix: String,
    pub request_timeout: Duration,
    pub sync: SyncYamlConfig,
}

impl Config {
    /// Load configuration from an optional YAML file, then override with env vars.
    ///
    /// Priority: env var > YAML > default. A request timeout of 0 is raised
    /// to one second.
    ///
    /// If `yaml_path` is None, tries "notes.yaml" in CWD. If the file doesn't
    /// exist, falls back to pure env var / defaults.
    pub fn from_yaml_and_env(yaml_path: Option<&Path>) -> Result<Self> {
        let yaml = Self::load_yaml(yaml_path);

        let request_timeout_secs = match std::env::var("NOTES_REQUEST_TIMEOUT_SECS") {
            Ok(s) => s.parse().map_err(|e| {
                anyhow::anyhow!("Invalid NOTES_REQUEST_TIMEOUT_SECS {:?}: {}", s, e)
            })?,
            Err(_) => yaml.store.request_timeout_secs,
        };

        Ok(Self {
            store_url: std::env::var("NOTES_STORE_URL").unwrap_or(yaml.store.url),
            nats_url: std::env::var("NOTES_NATS_URL").ok().or(yaml.store.nats_url),
            subject_prefix: std::env::var("NOTES_SUBJECT_PREFIX")
                .unwrap_or(yaml.store.subject_prefix),
            request_timeout: Duration::from_secs(request_timeout_secs.max(1)),
            sync: yaml.sync,
        })
    }

    /// Build the view-model's synchronization policy
    pub fn sync_policy(&self) -> SyncPolicy {
        SyncPolicy {
            rollback: self.sync.rollback_on_failure,
            fetch_retry: RetryPolicy {
                max_attempts: self.sync.fetch_attempts.max(1),
                initial_backoff: Duration::from_millis(self.sync.fetch_backoff_ms),
            },
            reconnect: ReconnectPolicy {
                initial_backoff: Duration::from_millis(self.sync.resubscribe_backoff_ms),
                max_backoff: Duration::from_millis(
                    self.sync
                        .max_resubscribe_backoff_ms
                        .max(self.sync.resubscribe_backoff_ms),
                ),
            },
        }
    }

    /// Try to load and parse a YAML config file. Returns defaults on any failure.
    fn load_yaml(yaml_path: Option<&Path>) -> YamlConfig {
        let default_path = Path::new("notes.yaml");
        let path = yaml_path.unwrap_or(default_path);

        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_yaml::from_str(&contents) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                    YamlConfig::default()
                }
            },
            Err(_) => {
                tracing::debug!(
                    "No config file at {}, using env vars / defaults",
                    path.display()
                );
                YamlConfig::default()
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
