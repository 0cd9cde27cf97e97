//! `show <environments|namespaces|services>`: read-only lookups against the
//! deployment service, rendered as one chat line.

use tracing::error;

use bosun_core::command::Command;
use bosun_deploy::ApiOutcome;

use super::HandlerContext;

pub(crate) async fn show(context: &HandlerContext, command: &Command, thread_ts: &str) {
    let options = command.options();
    let subject = options.str_value("subject");

    let outcome = match subject {
        "environments" => context
            .call_api(context.api.environments())
            .await
            .map(|items| listing("environments", String::new(), &items)),
        "namespaces" => {
            let environment = options.str_value("environment");
            context
                .call_api(context.api.namespaces(environment))
                .await
                .map(|items| listing("namespaces", format!("`{environment}`"), &items))
        }
        "services" => {
            let namespace = options.str_value("namespace");
            let environment = options.str_value("environment");
            context
                .call_api(context.api.services(namespace, environment))
                .await
                .map(|items| listing("services", format!("`{namespace}` on `{environment}`"), &items))
        }
        other => {
            // resolution flags unknown subjects before the ack; reaching
            // this arm means the dispatch path let one through
            error!(
                event_name = "dispatch.unknown_show_subject",
                subject = other,
                "show dispatched with an unresolved subject"
            );
            return;
        }
    };

    let outcome = outcome.map(|text| ApiOutcome::with_messages(vec![text]));
    context.relay_outcome(outcome, &command.context().channel_id, thread_ts).await;
}

fn listing(noun: &str, scope: String, items: &[String]) -> String {
    let suffix = if scope.is_empty() { String::new() } else { format!(" in {scope}") };
    if items.is_empty() {
        return format!("I found no {noun}{suffix}.");
    }
    let rendered =
        items.iter().map(|item| format!("`{item}`")).collect::<Vec<_>>().join(", ");
    let mut heading = noun.to_owned();
    if let Some(first) = heading.get_mut(0..1) {
        first.make_ascii_uppercase();
    }
    format!("{heading}{suffix}: {rendered}")
}
