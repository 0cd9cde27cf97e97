//! Workspace housekeeping: `set metadata`, `delete`, and the `auth` report.

use tracing::warn;

use bosun_core::auth::OPEN_ENVIRONMENTS;
use bosun_core::command::Command;
use bosun_deploy::MetadataUpdate;
use bosun_slack::provider::escalate_to_monitoring;

use super::HandlerContext;

/// `set metadata for <service> in <namespace> <environment> k=v...`: pass
/// the operator's pairs through untouched; the service owns the vocabulary.
pub(crate) async fn set_metadata(context: &HandlerContext, command: &Command, thread_ts: &str) {
    let options = command.options();
    let update = MetadataUpdate {
        service: options.str_value("service").to_owned(),
        namespace: options.str_value("namespace").to_owned(),
        environment: options.str_value("environment").to_owned(),
        entries: options.list_value("metadata").to_vec(),
        requested_by: context.requester(&command.context().user_id).await,
    };
    let outcome = context.call_api(context.api.set_metadata(update)).await;
    context.relay_outcome(outcome, &command.context().channel_id, thread_ts).await;
}

/// `delete <namespace> in <environment>`: remove the namespace outright.
pub(crate) async fn delete(context: &HandlerContext, command: &Command, thread_ts: &str) {
    let options = command.options();
    let requested_by = context.requester(&command.context().user_id).await;
    let outcome = context
        .call_api(context.api.delete_namespace(
            options.str_value("namespace"),
            options.str_value("environment"),
            &requested_by,
        ))
        .await;
    context.relay_outcome(outcome, &command.context().channel_id, thread_ts).await;
}

/// `auth`: tell the invoker where commands are accepted from. Chat-only, no
/// API call; the reply goes to the user notification seam.
pub(crate) async fn auth(context: &HandlerContext, command: &Command, thread_ts: &str) {
    let channels = context
        .allowed_channels
        .iter()
        .map(|name| format!("#{name}"))
        .collect::<Vec<_>>()
        .join(", ");
    let environments = OPEN_ENVIRONMENTS
        .iter()
        .map(|environment| format!("`{environment}`"))
        .collect::<Vec<_>>()
        .join(", ");

    let text = if channels.is_empty() {
        format!(
            "No channel is on the allowed list right now. Commands against the open environments ({environments}) still work from anywhere."
        )
    } else {
        format!(
            "I take commands from {channels}. Commands against the open environments ({environments}) work from any channel."
        )
    };

    let channel_id = &command.context().channel_id;
    if let Err(chat_error) =
        context.provider.user_notification_thread(&text, channel_id, thread_ts).await
    {
        warn!(
            event_name = "chat.notify_failed",
            channel = %channel_id,
            error = %chat_error,
            "could not post the auth report"
        );
        escalate_to_monitoring(
            context.provider.as_ref(),
            &context.monitoring_channel,
            &format!("failed to post an auth report in <#{channel_id}>: {chat_error}"),
        )
        .await;
    }
}
