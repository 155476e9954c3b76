// SPDX-FileCopyrightText: 2026 Querydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-channel chat configuration.

use std::time::Duration;

use querydesk_core::{Channel, ChannelType, DeskError};

const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Validated chat channel settings.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub bot_token: String,
    /// Override for tests and self-hosted bot API servers.
    pub api_base: String,
    pub poll_interval: Option<Duration>,
}

impl ChatConfig {
    pub fn from_channel(channel: &Channel) -> Result<Self, DeskError> {
        let Some(bot_token) = channel.config.get("bot_token") else {
            return Err(DeskError::missing_keys(ChannelType::Chat, &["bot_token"]));
        };
        let poll_interval = match channel.config.get("poll_interval") {
            None => None,
            Some(raw) => {
                let secs: u64 = raw
                    .parse()
                    .map_err(|_| DeskError::Config(format!("invalid poll_interval: {raw}")))?;
                if secs == 0 {
                    return Err(DeskError::Config("poll_interval must be at least 1".into()));
                }
                Some(Duration::from_secs(secs))
            }
        };
        Ok(Self {
            bot_token: bot_token.clone(),
            api_base: channel
                .config
                .get("api_base")
                .cloned()
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            poll_interval,
        })
    }
}
