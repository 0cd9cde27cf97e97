//! Offline command resolution: the same pipeline the gateway runs on a chat
//! mention, minus the chat. Useful for checking grammar before typing a
//! command into a channel where everyone can watch it bounce.
//!
//! Exit code 0 means the bot would act on the text or answer it with help;
//! 1 means it would bounce (unknown command, wrong shape, bad values).

use bosun_core::{acknowledge, resolve, Acknowledgement, ChatContext, Command, OptionValue};
use serde::Serialize;

use super::CommandResult;

/// Stands in for the bot mention; the resolver discards the first token of
/// any message as the mention regardless of its content.
const MENTION: &str = "<@bosun>";

#[derive(Debug, Serialize)]
struct ResolutionReport<'a> {
    command: &'static str,
    executable: bool,
    help_request: bool,
    valid_length: bool,
    tokens: &'a [String],
    options: &'a bosun_core::CommandOptions,
    errors: Vec<String>,
    reply: &'a str,
    proceed: bool,
}

pub fn run(text: &str, json: bool) -> CommandResult {
    let context = ChatContext::new("cli", "cli");
    let command = resolve(&format!("{MENTION} {text}"), context);
    let ack = acknowledge(&command);

    let exit_code = if ack.proceed || command.is_help_request() { 0 } else { 1 };

    let output = if json {
        let report = ResolutionReport {
            command: command.name(),
            executable: command.is_executable(),
            help_request: command.is_help_request(),
            valid_length: command.valid_input_length(),
            tokens: command.tokens(),
            options: command.options(),
            errors: command.errors().iter().map(ToString::to_string).collect(),
            reply: &ack.text,
            proceed: ack.proceed,
        };
        serde_json::to_string_pretty(&report)
            .unwrap_or_else(|error| format!("serialization failed: {error}"))
    } else {
        render_human(&command, &ack)
    };

    CommandResult { exit_code, output }
}

fn render_human(command: &Command, ack: &Acknowledgement) -> String {
    let mut lines = vec![format!("command: {}", command.name())];

    if !command.options().is_empty() {
        lines.push("options:".to_string());
        for (key, value) in command.options().iter() {
            lines.push(format!("  {key} = {}", render_value(value)));
        }
    }
    for error in command.errors() {
        lines.push(format!("error: {error}"));
    }

    lines.push(format!("proceeds: {}", if ack.proceed { "yes" } else { "no" }));
    lines.push("reply:".to_string());
    for reply_line in ack.text.lines() {
        lines.push(format!("  {reply_line}"));
    }

    lines.join("\n")
}

fn render_value(value: &OptionValue) -> String {
    match value {
        OptionValue::Str(text) => text.clone(),
        OptionValue::Flag(flag) => flag.to_string(),
        OptionValue::List(items) => items.join(", "),
        OptionValue::Artifacts(artifacts) => {
            artifacts.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
        }
    }
}
