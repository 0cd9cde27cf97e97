//! The four commands that end in a deployment request: `deploy`, `migrate`,
//! `restart`, and `run`. One request shape serves all of them; `kind` and
//! the artifact list carry the difference.

use bosun_core::command::Command;
use bosun_core::ArtifactRef;
use bosun_deploy::{ArtifactSpec, DeployKind, DeployRequest};

use super::HandlerContext;

fn artifact_specs(refs: &[ArtifactRef]) -> Vec<ArtifactSpec> {
    refs.iter().map(|entry| ArtifactSpec::new(entry.name.as_str(), entry.version.as_str())).collect()
}

/// `deploy <namespace> in <environment>`: roll the namespace (or the
/// `services=` subset) forward.
pub(crate) async fn deploy(context: &HandlerContext, command: &Command, thread_ts: &str) {
    let options = command.options();
    let request = DeployRequest {
        kind: DeployKind::Application,
        namespace: options.str_value("namespace").to_owned(),
        environment: options.str_value("environment").to_owned(),
        artifacts: artifact_specs(options.artifact_value("services")),
        dry_run: options.flag_value("dryrun"),
        force: options.flag_value("force"),
        requested_by: context.requester(&command.context().user_id).await,
    };
    let outcome = context.call_api(context.api.deploy(request)).await;
    context.relay_outcome(outcome, &command.context().channel_id, thread_ts).await;
}

/// `migrate <namespace> in <environment>`: same request, migration workload,
/// `databases=` as the subset.
pub(crate) async fn migrate(context: &HandlerContext, command: &Command, thread_ts: &str) {
    let options = command.options();
    let request = DeployRequest {
        kind: DeployKind::Migration,
        namespace: options.str_value("namespace").to_owned(),
        environment: options.str_value("environment").to_owned(),
        artifacts: artifact_specs(options.artifact_value("databases")),
        dry_run: options.flag_value("dryrun"),
        force: options.flag_value("force"),
        requested_by: context.requester(&command.context().user_id).await,
    };
    let outcome = context.call_api(context.api.deploy(request)).await;
    context.relay_outcome(outcome, &command.context().channel_id, thread_ts).await;
}

/// `restart <service> in <namespace> <environment>`: a forced redeploy of
/// one service at its current version.
pub(crate) async fn restart(context: &HandlerContext, command: &Command, thread_ts: &str) {
    let options = command.options();
    let request = DeployRequest {
        kind: DeployKind::Application,
        namespace: options.str_value("namespace").to_owned(),
        environment: options.str_value("environment").to_owned(),
        artifacts: vec![ArtifactSpec::new(options.str_value("service"), "")],
        dry_run: false,
        force: true,
        requested_by: context.requester(&command.context().user_id).await,
    };
    let outcome = context.call_api(context.api.deploy(request)).await;
    context.relay_outcome(outcome, &command.context().channel_id, thread_ts).await;
}

/// `run <job> in <namespace> <environment>`: a one-off job workload.
pub(crate) async fn run(context: &HandlerContext, command: &Command, thread_ts: &str) {
    let options = command.options();
    let request = DeployRequest {
        kind: DeployKind::Job,
        namespace: options.str_value("namespace").to_owned(),
        environment: options.str_value("environment").to_owned(),
        artifacts: vec![ArtifactSpec::new(options.str_value("job"), "")],
        dry_run: options.flag_value("dryrun"),
        force: options.flag_value("force"),
        requested_by: context.requester(&command.context().user_id).await,
    };
    let outcome = context.call_api(context.api.deploy(request)).await;
    context.relay_outcome(outcome, &command.context().channel_id, thread_ts).await;
}
