// SPDX-FileCopyrightText: 2026 Querydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Protocol access behind a trait so the connector is testable without a
//! live mail server.
//!
//! The IMAP side opens a fresh session per pass rather than holding a
//! long-lived one; mail servers drop idle connections aggressively and a
//! poll-cycle connect keeps reconnection logic out of the loop.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use querydesk_core::DeskError;
use rustls_pki_types::ServerName;
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tokio_rustls::client::TlsStream;
use tracing::debug;

use crate::config::MailConfig;

const DEFAULT_IO_TIMEOUT: Duration = Duration::from_secs(30);

/// One unparsed message pulled from the mailbox.
#[derive(Debug, Clone)]
pub struct RawMail {
    pub uid: u32,
    pub body: Vec<u8>,
}

/// An outbound reply ready for SMTP submission.
#[derive(Debug, Clone)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub body: String,
    /// Message-ID of the message being answered, for threading.
    pub in_reply_to: Option<String>,
}

/// Mailbox I/O as the connector sees it.
#[async_trait]
pub trait MailGateway: Send + Sync {
    /// Fetch all unseen messages, marking them seen.
    async fn fetch_unseen(&self) -> Result<Vec<RawMail>, DeskError>;

    /// Authenticated probe; returns a human-readable summary.
    async fn check(&self) -> Result<String, DeskError>;

    async fn send(&self, mail: OutgoingMail) -> Result<(), DeskError>;
}

/// Production gateway: IMAP over TLS for ingestion, SMTP for replies.
///
/// Every protocol operation runs under one I/O deadline; an unresponsive
/// server surfaces as `DeskError::Timeout` instead of wedging the poll
/// loop.
pub struct ImapSmtpGateway {
    config: MailConfig,
    smtp: AsyncSmtpTransport<Tokio1Executor>,
    io_timeout: Duration,
}

impl ImapSmtpGateway {
    pub fn new(config: MailConfig) -> Result<Self, DeskError> {
        let smtp = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            .map_err(|e| DeskError::Config(format!("invalid SMTP relay: {e}")))?
            .port(config.smtp_port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();
        Ok(Self {
            config,
            smtp,
            io_timeout: DEFAULT_IO_TIMEOUT,
        })
    }

    /// Override the per-operation I/O deadline.
    pub fn with_io_timeout(mut self, timeout: Duration) -> Self {
        self.io_timeout = timeout;
        self
    }

    async fn bounded<T>(
        &self,
        op: impl Future<Output = Result<T, DeskError>>,
    ) -> Result<T, DeskError> {
        tokio::time::timeout(self.io_timeout, op)
            .await
            .map_err(|_| DeskError::Timeout {
                duration: self.io_timeout,
            })?
    }

    async fn open_session(
        &self,
    ) -> Result<async_imap::Session<TlsStream<TcpStream>>, DeskError> {
        let tcp = TcpStream::connect((self.config.imap_host.as_str(), self.config.imap_port))
            .await
            .map_err(|e| DeskError::Connection {
                message: format!("IMAP connect to {} failed", self.config.imap_host),
                source: Some(Box::new(e)),
            })?;

        let mut roots = rustls::RootCertStore::empty();
        roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
        let tls_config = rustls::ClientConfig::builder()
            .with_root_certificates(roots)
            .with_no_client_auth();
        let server_name = ServerName::try_from(self.config.imap_host.clone())
            .map_err(|e| DeskError::Config(format!("invalid IMAP host name: {e}")))?;
        let tls = TlsConnector::from(Arc::new(tls_config))
            .connect(server_name, tcp)
            .await
            .map_err(|e| DeskError::Connection {
                message: "IMAP TLS handshake failed".into(),
                source: Some(Box::new(e)),
            })?;

        let client = async_imap::Client::new(tls);
        let session = client
            .login(&self.config.username, &self.config.password)
            .await
            .map_err(|(e, _)| DeskError::Connection {
                message: "IMAP login rejected".into(),
                source: Some(Box::new(e)),
            })?;
        Ok(session)
    }
}

fn imap_err(e: async_imap::error::Error) -> DeskError {
    DeskError::Connection {
        message: "IMAP command failed".into(),
        source: Some(Box::new(e)),
    }
}

#[async_trait]
impl MailGateway for ImapSmtpGateway {
    async fn fetch_unseen(&self) -> Result<Vec<RawMail>, DeskError> {
        self.bounded(self.fetch_unseen_inner()).await
    }

    async fn check(&self) -> Result<String, DeskError> {
        self.bounded(self.check_inner()).await
    }

    async fn send(&self, mail: OutgoingMail) -> Result<(), DeskError> {
        self.bounded(self.send_inner(mail)).await
    }
}

impl ImapSmtpGateway {
    async fn fetch_unseen_inner(&self) -> Result<Vec<RawMail>, DeskError> {
        let mut session = self.open_session().await?;
        session
            .select(&self.config.folder)
            .await
            .map_err(imap_err)?;

        let mut uids: Vec<u32> = session
            .uid_search("UNSEEN")
            .await
            .map_err(imap_err)?
            .into_iter()
            .collect();
        uids.sort_unstable();

        let mut out = Vec::new();
        if !uids.is_empty() {
            let set = uids
                .iter()
                .map(u32::to_string)
                .collect::<Vec<_>>()
                .join(",");
            let mut stream = session.uid_fetch(&set, "RFC822").await.map_err(imap_err)?;
            while let Some(fetch) = stream.next().await {
                let fetch = fetch.map_err(imap_err)?;
                if let (Some(uid), Some(body)) = (fetch.uid, fetch.body()) {
                    out.push(RawMail {
                        uid,
                        body: body.to_vec(),
                    });
                }
            }
        }
        debug!(count = out.len(), folder = %self.config.folder, "fetched unseen mail");
        let _ = session.logout().await;
        Ok(out)
    }

    async fn check_inner(&self) -> Result<String, DeskError> {
        let mut session = self.open_session().await?;
        let mailbox = session
            .select(&self.config.folder)
            .await
            .map_err(imap_err)?;
        let summary = format!(
            "authenticated as {}, {} messages in {}",
            self.config.username, mailbox.exists, self.config.folder
        );
        let _ = session.logout().await;
        Ok(summary)
    }

    async fn send_inner(&self, mail: OutgoingMail) -> Result<(), DeskError> {
        let send_err = |message: String, source| DeskError::Send {
            message,
            source: Some(source),
        };

        let from: Mailbox = self
            .config
            .from_address
            .parse()
            .map_err(|e| send_err("invalid from address".into(), Box::new(e) as _))?;
        let to: Mailbox = mail
            .to
            .parse()
            .map_err(|e| send_err(format!("invalid recipient {}", mail.to), Box::new(e) as _))?;

        let mut builder = Message::builder().from(from).to(to).subject(&mail.subject);
        if let Some(in_reply_to) = mail.in_reply_to {
            builder = builder.in_reply_to(in_reply_to);
        }
        let message = builder
            .body(mail.body)
            .map_err(|e| send_err("failed to build message".into(), Box::new(e) as _))?;

        self.smtp
            .send(message)
            .await
            .map_err(|e| send_err("SMTP submission failed".into(), Box::new(e) as _))?;
        Ok(())
    }
}
