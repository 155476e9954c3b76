// SPDX-FileCopyrightText: 2026 Querydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! RFC822 to normalized event conversion.

use std::collections::HashMap;

use mail_parser::{MessageParser, MimeHeaders};
use querydesk_core::{Attachment, InboundEvent};

use crate::gateway::RawMail;

/// Parse one raw message into an event. Returns `None` when the message
/// has no usable sender; such messages are logged and skipped upstream.
pub fn to_event(raw: &RawMail) -> Option<InboundEvent> {
    let message = MessageParser::default().parse(&raw.body)?;

    let from = message.from().and_then(|a| a.first())?;
    let sender_address = from.address()?.to_string();
    let sender_name = from.name().map(str::to_string);

    // Message-ID is the dedup key; servers that omit it fall back to a
    // UID-scoped synthetic key.
    let external_key = message
        .message_id()
        .map(|id| format!("<{id}>"))
        .unwrap_or_else(|| format!("uid-{}", raw.uid));

    let thread_key = message
        .in_reply_to()
        .as_text()
        .map(|id| format!("<{id}>"));

    let content = message
        .body_text(0)
        .map(|t| t.trim().to_string())
        .unwrap_or_default();

    let attachments: Vec<Attachment> = message
        .attachments()
        .map(|part| Attachment {
            file_name: part
                .attachment_name()
                .unwrap_or("attachment")
                .to_string(),
            content_type: part
                .content_type()
                .map(|ct| match ct.subtype() {
                    Some(sub) => format!("{}/{sub}", ct.ctype()),
                    None => ct.ctype().to_string(),
                }),
            url: None,
        })
        .collect();

    let mut metadata = HashMap::new();
    let reply_to = message
        .reply_to()
        .and_then(|a| a.first())
        .and_then(|m| m.address())
        .map(str::to_string)
        .unwrap_or_else(|| sender_address.clone());
    metadata.insert("reply_to".to_string(), reply_to);

    Some(InboundEvent {
        content,
        subject: message.subject().map(str::to_string),
        sender_name,
        sender_address,
        external_key,
        thread_key,
        attachments,
        metadata,
    })
}
