use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ChatError {
    #[error("chat post failed: {0}")]
    Post(String),
    #[error("chat lookup failed: {0}")]
    Lookup(String),
}

/// A chat-side user, as much of one as the bot needs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChatUser {
    pub id: String,
    pub display_name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChannelInfo {
    pub id: String,
    /// Display name without the leading `#`.
    pub name: String,
}

/// The chat service as the bot sees it. The network client implementing it
/// against the real Slack API lives outside this workspace.
///
/// The three notification methods carry intent, not mechanism: operator
/// diagnostics, user-facing notices, and relayed deployment output. A client
/// may render them differently; the Noop treats them alike.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Posts into a thread and returns the new message's timestamp. An empty
    /// `thread_ts` posts to the channel top level.
    async fn post_message_thread(
        &self,
        text: &str,
        channel_id: &str,
        thread_ts: &str,
    ) -> Result<String, ChatError>;

    async fn get_user(&self, user_id: &str) -> Result<ChatUser, ChatError>;

    async fn get_channel_info(&self, channel_id: &str) -> Result<ChannelInfo, ChatError>;

    /// Operator diagnostics: dispatch failures, crashed handlers.
    async fn error_notification_thread(
        &self,
        text: &str,
        channel_id: &str,
        thread_ts: &str,
    ) -> Result<(), ChatError>;

    /// User-facing notices that are not deployment output, such as denials.
    async fn user_notification_thread(
        &self,
        text: &str,
        channel_id: &str,
        thread_ts: &str,
    ) -> Result<(), ChatError>;

    /// Deployment outcomes relayed from the external API, word for word.
    async fn deployment_notification_thread(
        &self,
        text: &str,
        channel_id: &str,
        thread_ts: &str,
    ) -> Result<(), ChatError>;
}

/// Swallows every message. Stands in wherever a real client is not wired
/// up, including most tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopChatProvider;

#[async_trait]
impl ChatProvider for NoopChatProvider {
    async fn post_message_thread(
        &self,
        _text: &str,
        _channel_id: &str,
        _thread_ts: &str,
    ) -> Result<String, ChatError> {
        Ok(String::new())
    }

    async fn get_user(&self, user_id: &str) -> Result<ChatUser, ChatError> {
        Ok(ChatUser { id: user_id.to_owned(), display_name: user_id.to_owned() })
    }

    async fn get_channel_info(&self, channel_id: &str) -> Result<ChannelInfo, ChatError> {
        Ok(ChannelInfo { id: channel_id.to_owned(), name: String::new() })
    }

    async fn error_notification_thread(
        &self,
        _text: &str,
        _channel_id: &str,
        _thread_ts: &str,
    ) -> Result<(), ChatError> {
        Ok(())
    }

    async fn user_notification_thread(
        &self,
        _text: &str,
        _channel_id: &str,
        _thread_ts: &str,
    ) -> Result<(), ChatError> {
        Ok(())
    }

    async fn deployment_notification_thread(
        &self,
        _text: &str,
        _channel_id: &str,
        _thread_ts: &str,
    ) -> Result<(), ChatError> {
        Ok(())
    }
}

/// Best-effort escalation to the DevOps monitoring channel. A failure here
/// is logged and dropped; escalation must never take down the path that
/// triggered it.
pub async fn escalate_to_monitoring(provider: &dyn ChatProvider, channel: &str, text: &str) {
    if let Err(error) = provider.post_message_thread(text, channel, "").await {
        warn!(
            event_name = "chat.escalation_failed",
            channel,
            error = %error,
            "could not reach the monitoring channel"
        );
    }
}
