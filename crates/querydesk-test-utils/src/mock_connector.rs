// SPDX-FileCopyrightText: 2026 Querydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! An in-memory connector for supervisor and lifecycle tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use querydesk_core::{
    Attachment, Channel, ChannelType, ConnectionTest, Connector, ConnectorFactory,
    ConnectorStatus, DeskError, QueryResponse, RuntimeState,
};
use uuid::Uuid;

/// Shared observation handle for a [`MockConnector`]. Tests keep a clone
/// to inspect call counts and toggle failures after the connector has
/// been boxed away into the supervisor.
#[derive(Debug, Default)]
pub struct MockHandle {
    pub initialize_calls: AtomicUsize,
    pub start_calls: AtomicUsize,
    pub stop_calls: AtomicUsize,
    pub fail_initialize: AtomicBool,
    pub fail_start: AtomicBool,
    pub fail_stop: AtomicBool,
    pub fail_connection_test: AtomicBool,
}

impl MockHandle {
    pub fn initialize_calls(&self) -> usize {
        self.initialize_calls.load(Ordering::SeqCst)
    }

    pub fn start_calls(&self) -> usize {
        self.start_calls.load(Ordering::SeqCst)
    }

    pub fn stop_calls(&self) -> usize {
        self.stop_calls.load(Ordering::SeqCst)
    }

    pub fn fail_initialize(&self, fail: bool) {
        self.fail_initialize.store(fail, Ordering::SeqCst);
    }

    pub fn fail_start(&self, fail: bool) {
        self.fail_start.store(fail, Ordering::SeqCst);
    }

    pub fn fail_stop(&self, fail: bool) {
        self.fail_stop.store(fail, Ordering::SeqCst);
    }

    pub fn fail_connection_test(&self, fail: bool) {
        self.fail_connection_test.store(fail, Ordering::SeqCst);
    }
}

/// A connector that records lifecycle calls and fails on demand.
pub struct MockConnector {
    state: RuntimeState,
    handle: Arc<MockHandle>,
}

impl MockConnector {
    pub fn new(channel: &Channel) -> (Self, Arc<MockHandle>) {
        let handle = Arc::new(MockHandle::default());
        (
            Self {
                state: RuntimeState::for_channel(channel),
                handle: Arc::clone(&handle),
            },
            handle,
        )
    }

    fn with_handle(channel: &Channel, handle: Arc<MockHandle>) -> Self {
        Self {
            state: RuntimeState::for_channel(channel),
            handle,
        }
    }
}

#[async_trait]
impl Connector for MockConnector {
    fn channel_id(&self) -> Uuid {
        self.state.channel_id()
    }

    fn channel_type(&self) -> ChannelType {
        self.state.channel_type()
    }

    async fn initialize(&mut self) -> Result<(), DeskError> {
        self.handle.initialize_calls.fetch_add(1, Ordering::SeqCst);
        if self.handle.fail_initialize.load(Ordering::SeqCst) {
            return Err(DeskError::Config("mock initialize failure".into()));
        }
        Ok(())
    }

    async fn start(&mut self) -> Result<(), DeskError> {
        self.handle.start_calls.fetch_add(1, Ordering::SeqCst);
        if self.handle.fail_start.load(Ordering::SeqCst) {
            return Err(DeskError::Connection {
                message: "mock start failure".into(),
                source: None,
            });
        }
        self.state.set_running(true);
        self.state.record_poll();
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), DeskError> {
        self.handle.stop_calls.fetch_add(1, Ordering::SeqCst);
        self.state.set_running(false);
        if self.handle.fail_stop.load(Ordering::SeqCst) {
            return Err(DeskError::Connection {
                message: "mock stop failure".into(),
                source: None,
            });
        }
        Ok(())
    }

    async fn test_connection(&self) -> ConnectionTest {
        if self.handle.fail_connection_test.load(Ordering::SeqCst) {
            ConnectionTest::failed("mock credentials rejected")
        } else {
            ConnectionTest::ok("mock connection ok")
        }
    }

    async fn send_reply(
        &self,
        query_id: Uuid,
        user_id: Uuid,
        content: &str,
        _attachments: &[Attachment],
    ) -> Result<QueryResponse, DeskError> {
        Ok(QueryResponse {
            id: Uuid::new_v4(),
            query_id,
            user_id,
            content: content.to_string(),
            is_internal: false,
            sent_at: Utc::now(),
        })
    }

    fn status(&self) -> ConnectorStatus {
        self.state.snapshot()
    }
}

/// Factory producing [`MockConnector`]s for every channel type except
/// those listed as unsupported. Handles are shared across rebuilds of the
/// same channel so reload counts accumulate.
#[derive(Default)]
pub struct MockFactory {
    handles: std::sync::Mutex<std::collections::HashMap<Uuid, Arc<MockHandle>>>,
    unsupported: Vec<ChannelType>,
}

impl MockFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting(unsupported: Vec<ChannelType>) -> Self {
        Self {
            handles: std::sync::Mutex::new(std::collections::HashMap::new()),
            unsupported,
        }
    }

    /// The observation handle for a channel, created on first build.
    pub fn handle(&self, channel_id: Uuid) -> Arc<MockHandle> {
        let mut handles = self.handles.lock().unwrap();
        Arc::clone(handles.entry(channel_id).or_default())
    }
}

impl ConnectorFactory for MockFactory {
    fn build(&self, channel: &Channel) -> Result<Box<dyn Connector>, DeskError> {
        if self.unsupported.contains(&channel.channel_type) {
            return Err(DeskError::UnsupportedChannel(
                channel.channel_type.to_string(),
            ));
        }
        let handle = self.handle(channel.id);
        Ok(Box::new(MockConnector::with_handle(channel, handle)))
    }
}
