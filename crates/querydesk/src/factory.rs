// SPDX-FileCopyrightText: 2026 Querydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The production connector factory.

use std::time::Duration;

use querydesk_chat::ChatConnector;
use querydesk_core::{Channel, ChannelType, Connector, ConnectorFactory, DeskError};
use querydesk_lifecycle::QueryLifecycle;
use querydesk_mail::MailConnector;
use querydesk_social::SocialConnector;

/// Builds the real protocol connectors. Channel types without an adapter
/// (currently SMS) are rejected here, which is what surfaces them as
/// unsupported through the supervisor.
pub struct BuiltinFactory {
    lifecycle: QueryLifecycle,
    poll_interval: Duration,
    shutdown_grace: Duration,
}

impl BuiltinFactory {
    pub fn new(
        lifecycle: QueryLifecycle,
        poll_interval: Duration,
        shutdown_grace: Duration,
    ) -> Self {
        Self {
            lifecycle,
            poll_interval,
            shutdown_grace,
        }
    }
}

impl ConnectorFactory for BuiltinFactory {
    fn build(&self, channel: &Channel) -> Result<Box<dyn Connector>, DeskError> {
        match channel.channel_type {
            ChannelType::Mail => Ok(Box::new(MailConnector::new(
                channel.clone(),
                self.lifecycle.clone(),
                self.poll_interval,
                self.shutdown_grace,
            ))),
            ChannelType::Chat => Ok(Box::new(ChatConnector::new(
                channel.clone(),
                self.lifecycle.clone(),
                self.poll_interval,
                self.shutdown_grace,
            ))),
            ChannelType::Social => Ok(Box::new(SocialConnector::new(
                channel.clone(),
                self.lifecycle.clone(),
                self.poll_interval,
                self.shutdown_grace,
            ))),
            ChannelType::Sms => Err(DeskError::UnsupportedChannel(
                ChannelType::Sms.to_string(),
            )),
        }
    }
}
