// SPDX-FileCopyrightText: 2026 Querydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration for the Querydesk engine.
//!
//! TOML files merged through the XDG hierarchy with `QUERYDESK_` env var
//! overrides, strict unknown-key rejection, and semantic validation.

pub mod loader;
pub mod model;
pub mod validation;

pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{
    ClassifierConfig, EngineConfig, IngestConfig, QuerydeskConfig, StorageConfig,
};
pub use validation::{ValidationError, validate_config};
