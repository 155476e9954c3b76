// SPDX-FileCopyrightText: 2026 Querydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./querydesk.toml` > `~/.config/querydesk/querydesk.toml`
//! > `/etc/querydesk/querydesk.toml`, with environment variable overrides
//! via the `QUERYDESK_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::QuerydeskConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/querydesk/querydesk.toml` (system-wide)
/// 3. `~/.config/querydesk/querydesk.toml` (user XDG config)
/// 4. `./querydesk.toml` (local directory)
/// 5. `QUERYDESK_*` environment variables
pub fn load_config() -> Result<QuerydeskConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(QuerydeskConfig::default()))
        .merge(Toml::file("/etc/querydesk/querydesk.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("querydesk/querydesk.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("querydesk.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no file or env lookup).
///
/// Used for testing and explicit inline configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<QuerydeskConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(QuerydeskConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<QuerydeskConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(QuerydeskConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` so underscore-containing
/// key names stay unambiguous: `QUERYDESK_CLASSIFIER_BASE_URL` must map to
/// `classifier.base_url`, not `classifier.base.url`.
fn env_provider() -> Env {
    Env::prefixed("QUERYDESK_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("engine_", "engine.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("classifier_", "classifier.", 1)
            .replacen("ingest_", "ingest.", 1);
        mapped.into()
    })
}
