//! One handler per executable command keyword. Each turns resolved options
//! into a deployment API request or a chat reply, and relays the outcome to
//! the requesting thread. Handlers never retry and post at most one
//! follow-up message per invocation.

pub(crate) mod admin;
pub(crate) mod deploy;
pub(crate) mod inventory;
pub(crate) mod release;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use bosun_deploy::{ApiError, ApiOutcome, DeploymentApi};
use bosun_slack::provider::{escalate_to_monitoring, ChatProvider};

/// Everything a handler needs, shared across all of them.
pub(crate) struct HandlerContext {
    pub api: Arc<dyn DeploymentApi>,
    pub provider: Arc<dyn ChatProvider>,
    pub api_timeout: Duration,
    pub monitoring_channel: String,
    pub allowed_channels: Vec<String>,
}

impl HandlerContext {
    /// Display name of the invoking operator, for the audit trail. A failed
    /// lookup is logged and escalated but never blocks the command; the raw
    /// id stands in.
    pub(crate) async fn requester(&self, user_id: &str) -> String {
        match self.provider.get_user(user_id).await {
            Ok(user) => user.display_name,
            Err(chat_error) => {
                warn!(
                    event_name = "chat.user_lookup_failed",
                    user = %user_id,
                    error = %chat_error,
                    "user lookup failed; using the raw id"
                );
                escalate_to_monitoring(
                    self.provider.as_ref(),
                    &self.monitoring_channel,
                    &format!("user lookup failed for {user_id}: {chat_error}"),
                )
                .await;
                user_id.to_owned()
            }
        }
    }

    /// Runs one deployment API call under the configured timeout. An elapsed
    /// timer is an ordinary API failure.
    pub(crate) async fn call_api<T>(
        &self,
        call: impl Future<Output = Result<T, ApiError>> + Send,
    ) -> Result<T, ApiError> {
        match tokio::time::timeout(self.api_timeout, call).await {
            Ok(result) => result,
            Err(_elapsed) => Err(ApiError::TimedOut { seconds: self.api_timeout.as_secs() }),
        }
    }

    /// Relays an API outcome to the requesting thread. Success messages and
    /// error text travel the same deployment notification seam, verbatim; an
    /// empty message list posts nothing.
    pub(crate) async fn relay_outcome(
        &self,
        outcome: Result<ApiOutcome, ApiError>,
        channel_id: &str,
        thread_ts: &str,
    ) {
        let text = match outcome {
            Ok(outcome) => outcome.messages.join("\n"),
            Err(api_error) => api_error.to_string(),
        };
        if text.is_empty() {
            return;
        }

        if let Err(chat_error) =
            self.provider.deployment_notification_thread(&text, channel_id, thread_ts).await
        {
            warn!(
                event_name = "chat.notify_failed",
                channel = %channel_id,
                error = %chat_error,
                "could not relay the deployment outcome"
            );
            escalate_to_monitoring(
                self.provider.as_ref(),
                &self.monitoring_channel,
                &format!("failed to relay a deployment outcome in <#{channel_id}>: {chat_error}"),
            )
            .await;
        }
    }
}
