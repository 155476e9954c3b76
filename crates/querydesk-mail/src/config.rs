// SPDX-FileCopyrightText: 2026 Querydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-channel mail configuration, parsed from the channel record.

use std::time::Duration;

use querydesk_core::{Channel, ChannelType, DeskError};

const DEFAULT_IMAP_PORT: u16 = 993;
const DEFAULT_SMTP_PORT: u16 = 465;
const DEFAULT_FOLDER: &str = "INBOX";

/// Validated mail channel settings.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub imap_host: String,
    pub imap_port: u16,
    pub username: String,
    pub password: String,
    pub folder: String,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub from_address: String,
    pub poll_interval: Option<Duration>,
}

impl MailConfig {
    /// All required keys are checked before any value is parsed, so one
    /// error names every missing key at once.
    pub fn from_channel(channel: &Channel) -> Result<Self, DeskError> {
        const REQUIRED: &[&str] = &["imap_host", "imap_username", "imap_password", "smtp_host"];
        let missing: Vec<&str> = REQUIRED
            .iter()
            .copied()
            .filter(|k| !channel.config.contains_key(*k))
            .collect();
        if !missing.is_empty() {
            return Err(DeskError::missing_keys(ChannelType::Mail, &missing));
        }

        let get = |k: &str| channel.config.get(k).cloned().unwrap_or_default();
        let username = get("imap_username");
        Ok(Self {
            imap_host: get("imap_host"),
            imap_port: parse_port(channel, "imap_port", DEFAULT_IMAP_PORT)?,
            password: get("imap_password"),
            folder: channel
                .config
                .get("imap_folder")
                .cloned()
                .unwrap_or_else(|| DEFAULT_FOLDER.to_string()),
            smtp_host: get("smtp_host"),
            smtp_port: parse_port(channel, "smtp_port", DEFAULT_SMTP_PORT)?,
            from_address: channel
                .config
                .get("from_address")
                .cloned()
                .unwrap_or_else(|| username.clone()),
            poll_interval: parse_interval(channel)?,
            username,
        })
    }
}

fn parse_port(channel: &Channel, key: &str, default: u16) -> Result<u16, DeskError> {
    match channel.config.get(key) {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|_| DeskError::Config(format!("invalid {key}: {raw}"))),
    }
}

fn parse_interval(channel: &Channel) -> Result<Option<Duration>, DeskError> {
    match channel.config.get("poll_interval") {
        None => Ok(None),
        Some(raw) => {
            let secs: u64 = raw
                .parse()
                .map_err(|_| DeskError::Config(format!("invalid poll_interval: {raw}")))?;
            if secs == 0 {
                return Err(DeskError::Config("poll_interval must be at least 1".into()));
            }
            Ok(Some(Duration::from_secs(secs)))
        }
    }
}
