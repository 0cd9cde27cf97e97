use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use bosun_core::auth::AuthPolicy;
use bosun_core::command::ack;
use bosun_core::command::resolver;
use bosun_core::command::{ChatContext, Command};

use crate::provider::{escalate_to_monitoring, ChatProvider};

/// One inbound command mention, as the transport delivers it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChatCommandEvent {
    /// Raw message text, bot mention included.
    pub text: String,
    pub channel_id: String,
    pub user_id: String,
    /// Timestamp of the triggering message; replies thread under it.
    pub thread_ts: String,
}

/// Carries out an authorized command after the acknowledgement went out.
///
/// Implementations report their own outcomes through chat; the gateway only
/// supervises the task for crashes.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// `ack_ts` anchors follow-up messages to the acknowledgement's thread.
    async fn run(&self, command: Command, ack_ts: String);
}

/// Drops every command on the floor. Wiring default and test stand-in.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopCommandRunner;

#[async_trait]
impl CommandRunner for NoopCommandRunner {
    async fn run(&self, _command: Command, _ack_ts: String) {}
}

/// What the gateway did with an event, for logs and tests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Disposition {
    /// Acknowledged and handed to the runner.
    Dispatched,
    /// Fully answered by the acknowledgement; nothing to execute.
    AnsweredInline,
    /// Refused by the authorization policy.
    Denied,
}

/// The inbound glue: resolve, authorize, acknowledge, then hand off.
///
/// Everything up to the acknowledgement runs synchronously on the event's
/// task, so the user always sees the ack before any side effect. Execution
/// itself is spawned un-awaited and supervised for panics.
pub struct CommandGateway {
    provider: Arc<dyn ChatProvider>,
    runner: Arc<dyn CommandRunner>,
    policy: AuthPolicy,
    monitoring_channel: String,
}

impl CommandGateway {
    pub fn new(
        provider: Arc<dyn ChatProvider>,
        runner: Arc<dyn CommandRunner>,
        policy: AuthPolicy,
        monitoring_channel: impl Into<String>,
    ) -> Self {
        Self { provider, runner, policy, monitoring_channel: monitoring_channel.into() }
    }

    pub async fn handle_event(&self, event: ChatCommandEvent) -> Disposition {
        let correlation_id = Uuid::new_v4().to_string();
        let context = ChatContext::new(event.user_id.clone(), event.channel_id.clone());
        let command = resolver::resolve(&event.text, context);

        info!(
            event_name = "command.resolved",
            correlation_id = %correlation_id,
            command = command.name(),
            channel = %event.channel_id,
            user = %event.user_id,
            tokens = command.tokens().len(),
            "resolved inbound command"
        );

        // First pass without a channel name; the lookup is only worth a chat
        // call when the channel grant is the command's last chance.
        let mut decision = self.policy.authorize(&command, None);
        if !decision.allowed() {
            let channel_name = self.channel_name(&event, &correlation_id).await;
            decision = self.policy.authorize(&command, channel_name.as_deref());
        }

        if !decision.allowed() {
            info!(
                event_name = "command.denied",
                correlation_id = %correlation_id,
                command = command.name(),
                channel = %event.channel_id,
                user = %event.user_id,
                "command denied by policy"
            );
            self.notify_denied(&event, &command, &correlation_id).await;
            return Disposition::Denied;
        }

        let ack = ack::acknowledge(&command);
        let ack_ts = match self
            .provider
            .post_message_thread(&ack.text, &event.channel_id, &event.thread_ts)
            .await
        {
            Ok(ts) => ts,
            Err(chat_error) => {
                // the user misses the ack but the work still happens
                warn!(
                    event_name = "command.ack_failed",
                    correlation_id = %correlation_id,
                    command = command.name(),
                    channel = %event.channel_id,
                    error = %chat_error,
                    "could not post the acknowledgement"
                );
                escalate_to_monitoring(
                    self.provider.as_ref(),
                    &self.monitoring_channel,
                    &format!(
                        "failed to acknowledge `{}` in <#{}>: {chat_error}",
                        command.name(),
                        event.channel_id
                    ),
                )
                .await;
                event.thread_ts.clone()
            }
        };

        if !ack.proceed {
            debug!(
                event_name = "command.answered_inline",
                correlation_id = %correlation_id,
                command = command.name(),
                "acknowledgement fully answered the command"
            );
            return Disposition::AnsweredInline;
        }

        info!(
            event_name = "command.dispatched",
            correlation_id = %correlation_id,
            command = command.name(),
            grant = decision.as_str(),
            "handing command to the runner"
        );
        self.spawn_supervised(command, ack_ts, correlation_id);
        Disposition::Dispatched
    }

    async fn channel_name(&self, event: &ChatCommandEvent, correlation_id: &str) -> Option<String> {
        match self.provider.get_channel_info(&event.channel_id).await {
            Ok(info) => Some(info.name),
            Err(chat_error) => {
                warn!(
                    event_name = "chat.channel_lookup_failed",
                    correlation_id = %correlation_id,
                    channel = %event.channel_id,
                    error = %chat_error,
                    "channel lookup failed; channel grant unavailable"
                );
                escalate_to_monitoring(
                    self.provider.as_ref(),
                    &self.monitoring_channel,
                    &format!("channel lookup failed for {}: {chat_error}", event.channel_id),
                )
                .await;
                None
            }
        }
    }

    async fn notify_denied(&self, event: &ChatCommandEvent, command: &Command, correlation_id: &str) {
        let environment = command.options().str_value("environment");
        let text = if environment.is_empty() {
            format!("Sorry, I can't run `{}` from this channel.", command.name())
        } else {
            format!(
                "Sorry, I can't run `{}` against `{environment}` from this channel.",
                command.name()
            )
        };

        if let Err(chat_error) = self
            .provider
            .user_notification_thread(&text, &event.channel_id, &event.thread_ts)
            .await
        {
            warn!(
                event_name = "chat.notify_failed",
                correlation_id = %correlation_id,
                channel = %event.channel_id,
                error = %chat_error,
                "could not post the denial"
            );
            escalate_to_monitoring(
                self.provider.as_ref(),
                &self.monitoring_channel,
                &format!("failed to post a denial in <#{}>: {chat_error}", event.channel_id),
            )
            .await;
        }
    }

    /// Fire-and-forget with a supervisor: the runner task is spawned
    /// un-awaited so the event path never blocks, and a watcher joins it to
    /// turn a panic into a reported dispatch failure instead of silence.
    fn spawn_supervised(&self, command: Command, ack_ts: String, correlation_id: String) {
        let name = command.name();
        let channel_id = command.context().channel_id.clone();
        let thread_ts = ack_ts.clone();
        let runner = Arc::clone(&self.runner);
        let provider = Arc::clone(&self.provider);
        let monitoring = self.monitoring_channel.clone();

        let work = tokio::spawn(async move { runner.run(command, ack_ts).await });

        tokio::spawn(async move {
            let Err(join_error) = work.await else { return };
            if join_error.is_panic() {
                error!(
                    event_name = "dispatch.handler_panicked",
                    correlation_id = %correlation_id,
                    command = name,
                    channel = %channel_id,
                    "command handler panicked"
                );
                let text = format!(
                    ":rotating_light: The `{name}` handler crashed before finishing; the command may not have completed."
                );
                if let Err(chat_error) =
                    provider.error_notification_thread(&text, &channel_id, &thread_ts).await
                {
                    warn!(
                        event_name = "chat.notify_failed",
                        correlation_id = %correlation_id,
                        error = %chat_error,
                        "could not post the dispatch failure"
                    );
                }
                escalate_to_monitoring(provider.as_ref(), &monitoring, &text).await;
            } else {
                error!(
                    event_name = "dispatch.handler_aborted",
                    correlation_id = %correlation_id,
                    command = name,
                    "command handler task was cancelled"
                );
            }
        });
    }
}
