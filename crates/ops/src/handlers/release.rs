//! `release artifact <name[:version]> from <feed> to <feed>`: promote one
//! artifact between feeds.

use bosun_core::command::Command;
use bosun_deploy::{ArtifactSpec, ReleaseRequest};

use super::HandlerContext;

pub(crate) async fn release(context: &HandlerContext, command: &Command, thread_ts: &str) {
    let options = command.options();
    let artifact = options
        .artifact_value("artifact")
        .first()
        .map(|entry| ArtifactSpec::new(entry.name.as_str(), entry.version.as_str()))
        .unwrap_or_default();
    let request = ReleaseRequest {
        artifact,
        from_feed: options.str_value("from").to_owned(),
        to_feed: options.str_value("to").to_owned(),
        requested_by: context.requester(&command.context().user_id).await,
    };
    let outcome = context.call_api(context.api.release(request)).await;
    context.relay_outcome(outcome, &command.context().channel_id, thread_ts).await;
}
