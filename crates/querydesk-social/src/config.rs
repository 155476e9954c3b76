// SPDX-FileCopyrightText: 2026 Querydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-channel social configuration.

use std::time::Duration;

use querydesk_core::{Channel, ChannelType, DeskError};

/// Validated social channel settings.
#[derive(Debug, Clone)]
pub struct SocialConfig {
    /// REST API root of the provider.
    pub api_base: String,
    pub access_token: String,
    pub poll_interval: Option<Duration>,
}

impl SocialConfig {
    pub fn from_channel(channel: &Channel) -> Result<Self, DeskError> {
        const REQUIRED: &[&str] = &["api_base", "access_token"];
        let missing: Vec<&str> = REQUIRED
            .iter()
            .copied()
            .filter(|k| !channel.config.contains_key(*k))
            .collect();
        if !missing.is_empty() {
            return Err(DeskError::missing_keys(ChannelType::Social, &missing));
        }
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
            api_base: channel.config["api_base"].clone(),
            access_token: channel.config["access_token"].clone(),
            poll_interval,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn channel(pairs: &[(&str, &str)]) -> Channel {
        Channel {
            id: Uuid::new_v4(),
            name: "mentions".into(),
            channel_type: ChannelType::Social,
            active: true,
            config: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn both_keys_required() {
        let err = SocialConfig::from_channel(&channel(&[])).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("api_base"));
        assert!(msg.contains("access_token"));
    }

    #[test]
    fn zero_poll_interval_rejected() {
        let err = SocialConfig::from_channel(&channel(&[
            ("api_base", "https://api.example.com"),
            ("access_token", "t"),
            ("poll_interval", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, DeskError::Config(_)));
    }
}
