use std::{sync::Arc, time::Duration};

use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::gateway::{ChatCommandEvent, CommandGateway};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("transport failed to connect: {0}")]
    Connect(String),
    #[error("transport read failed: {0}")]
    Receive(String),
    #[error("transport disconnect failed: {0}")]
    Disconnect(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self { max_retries: 5, base_delay_ms: 250, max_delay_ms: 5_000 }
    }
}

impl ReconnectPolicy {
    fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.min(16);
        let multiplier = 1_u64 << exponent;
        let delay_ms = self.base_delay_ms.saturating_mul(multiplier).min(self.max_delay_ms);
        Duration::from_millis(delay_ms)
    }
}

/// Where command mentions come from. Implementations own the wire protocol
/// (including any envelope acking) and yield events already stripped down to
/// what the gateway needs. `Ok(None)` means the stream closed cleanly.
#[async_trait]
pub trait EventSource: Send + Sync {
    async fn connect(&self) -> Result<(), TransportError>;
    async fn next_event(&self) -> Result<Option<ChatCommandEvent>, TransportError>;
    async fn disconnect(&self) -> Result<(), TransportError>;
}

#[derive(Default)]
pub struct NoopEventSource;

#[async_trait]
impl EventSource for NoopEventSource {
    async fn connect(&self) -> Result<(), TransportError> {
        Ok(())
    }

    async fn next_event(&self) -> Result<Option<ChatCommandEvent>, TransportError> {
        Ok(None)
    }

    async fn disconnect(&self) -> Result<(), TransportError> {
        Ok(())
    }
}

pub struct EventLoop {
    source: Arc<dyn EventSource>,
    gateway: Arc<CommandGateway>,
    reconnect_policy: ReconnectPolicy,
}

impl EventLoop {
    pub fn new(
        source: Arc<dyn EventSource>,
        gateway: Arc<CommandGateway>,
        reconnect_policy: ReconnectPolicy,
    ) -> Self {
        Self { source, gateway, reconnect_policy }
    }

    pub async fn start(&self) -> Result<()> {
        for attempt in 0..=self.reconnect_policy.max_retries {
            match self.connect_and_pump(attempt).await {
                Ok(()) => return Ok(()),
                Err(transport_error) => {
                    warn!(
                        attempt,
                        max_retries = self.reconnect_policy.max_retries,
                        error = %transport_error,
                        "chat transport failed"
                    );

                    if attempt >= self.reconnect_policy.max_retries {
                        warn!(
                            max_retries = self.reconnect_policy.max_retries,
                            "chat transport retries exhausted; continuing process without crash"
                        );
                        return Ok(());
                    }

                    let delay = self.reconnect_policy.backoff(attempt);
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        Ok(())
    }

    async fn connect_and_pump(&self, attempt: u32) -> Result<(), TransportError> {
        info!(attempt, "opening chat transport connection");
        self.source.connect().await?;
        info!(attempt, "chat transport connected");

        loop {
            let Some(event) = self.source.next_event().await? else {
                info!(attempt, "chat transport stream closed");
                self.source.disconnect().await?;
                return Ok(());
            };

            info!(
                event_name = "ingress.chat.event_received",
                channel = %event.channel_id,
                user = %event.user_id,
                thread_ts = %event.thread_ts,
                "received command mention"
            );

            let disposition = self.gateway.handle_event(event).await;
            debug!(disposition = ?disposition, "event handled");
        }
    }
}
