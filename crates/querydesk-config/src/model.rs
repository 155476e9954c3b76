// SPDX-FileCopyrightText: 2026 Querydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Querydesk engine.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup. Per-channel settings (IMAP hosts, bot tokens)
//! are NOT configured here -- those live in the persisted channel records
//! owned by the administrative layer.

use serde::{Deserialize, Serialize};

/// Top-level Querydesk configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct QuerydeskConfig {
    /// Process identity and logging.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// External classification service settings.
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Connector polling and shutdown settings.
    #[serde(default)]
    pub ingest: IngestConfig,
}

/// Process identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Display name used in outbound replies and logs.
    #[serde(default = "default_engine_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            name: default_engine_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_engine_name() -> String {
    "querydesk".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

fn default_database_path() -> String {
    "querydesk.db".to_string()
}

/// External classification service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ClassifierConfig {
    /// Base URL of the classification service.
    #[serde(default = "default_classifier_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds. The classifier falls back to a
    /// neutral result once this elapses; it never blocks ingestion longer.
    #[serde(default = "default_classifier_timeout_secs")]
    pub timeout_secs: u64,

    /// Disable the classification call entirely (heuristics only).
    #[serde(default)]
    pub disabled: bool,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            base_url: default_classifier_base_url(),
            timeout_secs: default_classifier_timeout_secs(),
            disabled: false,
        }
    }
}

fn default_classifier_base_url() -> String {
    "http://127.0.0.1:8001".to_string()
}

fn default_classifier_timeout_secs() -> u64 {
    5
}

/// Connector polling and shutdown configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct IngestConfig {
    /// Default seconds between poll passes for poll-based connectors.
    /// Individual channels may override via their `poll_interval` key.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Overall grace period for `stop_all` at shutdown; connectors still
    /// running after this are abandoned with a log.
    #[serde(default = "default_shutdown_grace_secs")]
    pub shutdown_grace_secs: u64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            shutdown_grace_secs: default_shutdown_grace_secs(),
        }
    }
}

fn default_poll_interval_secs() -> u64 {
    60
}

fn default_shutdown_grace_secs() -> u64 {
    10
}
