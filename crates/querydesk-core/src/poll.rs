// SPDX-FileCopyrightText: 2026 Querydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The shared polling loop behind every poll-based connector.
//!
//! One task per channel. Items within a channel are processed strictly
//! in order by the pass closure; cancellation lets an in-flight pass
//! finish and never schedules another.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::runtime::RuntimeState;

/// Handle to a running poll task. Dropping it without `shutdown` aborts
/// nothing; the task keeps running until its token is cancelled.
pub struct PollTask {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl PollTask {
    /// Spawns the recurring poll loop. The caller is expected to have run
    /// one synchronous pass already; the first tick fires a full period
    /// after spawn.
    pub fn spawn<F, Fut>(state: Arc<RuntimeState>, period: Duration, mut pass: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send,
    {
        let token = CancellationToken::new();
        let task_token = token.clone();
        state.set_running(true);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // Consume the immediate first tick.
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = task_token.cancelled() => break,
                    _ = ticker.tick() => {
                        pass().await;
                        state.record_poll();
                    }
                }
            }
            state.set_running(false);
            debug!(channel_id = %state.channel_id(), "poll loop exited");
        });
        Self { token, handle }
    }

    /// Cancel the loop and wait for it to wind down, bounded by `grace`.
    pub async fn shutdown(self, grace: Duration) -> Result<(), crate::error::DeskError> {
        self.token.cancel();
        match tokio::time::timeout(grace, self.handle).await {
            Ok(_) => Ok(()),
            Err(_) => Err(crate::error::DeskError::Timeout { duration: grace }),
        }
    }
}
