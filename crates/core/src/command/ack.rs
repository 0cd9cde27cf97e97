//! The synchronous acknowledgement: the one reply every command gets before
//! any work starts.

use serde::Serialize;

use super::registry::{self, CommandEntry};
use super::Command;

/// What the bot says immediately, and whether the command goes on to a
/// handler afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Acknowledgement {
    pub text: String,
    pub proceed: bool,
}

impl Acknowledgement {
    fn stop(text: String) -> Self {
        Self { text, proceed: false }
    }
}

/// Formats the immediate reply for a resolved command.
///
/// The checks run in a fixed order: help requests answer first, then
/// unrecognized commands, then token-count problems, then resolution
/// errors. Only a clean command proceeds to execution.
pub fn acknowledge(command: &Command) -> Acknowledgement {
    if command.is_help_request() {
        return Acknowledgement::stop(render_help(command));
    }
    if let Command::Invalid(_) = command {
        return Acknowledgement::stop(
            "I don't know how to do that. Say `help` to see what I can do.".to_owned(),
        );
    }
    if !command.valid_input_length() {
        return Acknowledgement::stop(render_length_problem(command));
    }
    if !command.errors().is_empty() {
        return Acknowledgement::stop(render_errors(command));
    }
    Acknowledgement { text: "Sure, I'll get right on that.".to_owned(), proceed: true }
}

fn render_help(command: &Command) -> String {
    match command {
        Command::Help(body) => match body.tokens().get(1) {
            Some(topic) => topic_help(topic),
            None => overview(),
        },
        Command::Root(_) | Command::Invalid(_) => overview(),
        other => match registry::find(other.name()) {
            Some(entry) => entry_help(entry),
            None => overview(),
        },
    }
}

fn topic_help(topic: &str) -> String {
    match registry::find(topic) {
        Some(entry) => entry_help(entry),
        None => format!("I don't have a command called `{topic}`.\n\n{}", overview()),
    }
}

fn overview() -> String {
    let mut text = String::from("Here's what I can do:\n");
    for entry in registry::COMMANDS {
        text.push_str("• `");
        text.push_str(entry.keyword);
        text.push_str("` - ");
        text.push_str(entry.summary);
        text.push('\n');
    }
    text.push_str("\nSay `help <command>` for details.");
    text
}

fn entry_help(entry: &CommandEntry) -> String {
    let mut text = format!("{}\n\nUsage: `{}`", entry.summary, entry.usage);
    for param in entry.positionals {
        text.push_str(&format!("\n`<{}>` - {}", param.name, param.description));
    }
    for arg in entry.named {
        text.push_str(&format!("\n`{}=` - {}", arg.key, arg.description));
    }
    text
}

fn render_length_problem(command: &Command) -> String {
    match registry::find(command.name()) {
        Some(entry) => format!("That doesn't look right. Usage: `{}`", entry.usage),
        None => overview(),
    }
}

fn render_errors(command: &Command) -> String {
    let mut text = String::from("I couldn't make sense of that:\n");
    for error in command.errors() {
        text.push_str(&format!("• {error}\n"));
    }
    match registry::find(command.name()) {
        Some(entry) => text.push_str(&format!("\nUsage: `{}`", entry.usage)),
        None => text.push_str("\nSay `help` to see what I can do."),
    }
    text
}

#[cfg(test)]
mod tests {
    use super::acknowledge;
    use crate::command::{resolver, ChatContext};

    fn ack_for(text: &str) -> super::Acknowledgement {
        acknowledge(&resolver::resolve(text, ChatContext::new("U1", "C1")))
    }

    #[test]
    fn clean_command_proceeds_with_working_ack() {
        let ack = ack_for("<@UBOT> deploy current in qa");
        assert!(ack.proceed);
        assert_eq!(ack.text, "Sure, I'll get right on that.");
    }

    #[test]
    fn help_outranks_a_length_problem() {
        // two tokens is below deploy's minimum, but the trailing `help` wins
        let ack = ack_for("<@UBOT> deploy help");
        assert!(!ack.proceed);
        assert!(ack.text.contains("deploy <namespace> in <environment>"));
        assert!(!ack.text.contains("That doesn't look right"));
    }

    #[test]
    fn length_problem_renders_usage() {
        let ack = ack_for("<@UBOT> auth now please");
        assert!(!ack.proceed);
        assert_eq!(ack.text, "That doesn't look right. Usage: `auth`");
    }

    #[test]
    fn resolution_errors_are_listed() {
        let ack = ack_for("<@UBOT> deploy current in qa colour=blue dryrun=maybe");
        assert!(!ack.proceed);
        assert!(ack.text.contains("unknown argument `colour`"));
        assert!(ack.text.contains("invalid value `maybe` for `dryrun`"));
        assert!(ack.text.contains("Usage:"));
    }

    #[test]
    fn misspelled_command_is_reported_as_not_understood() {
        let ack = ack_for("<@UBOT> deployy current in qa");
        assert!(!ack.proceed);
        assert_eq!(ack.text, "I don't know how to do that. Say `help` to see what I can do.");
    }

    #[test]
    fn bare_mention_gets_the_overview() {
        let ack = ack_for("<@UBOT>");
        assert!(!ack.proceed);
        assert!(ack.text.starts_with("Here's what I can do:"));
        assert!(ack.text.contains("`deploy`"));
        assert!(ack.text.contains("`auth`"));
    }

    #[test]
    fn help_topic_renders_that_command() {
        let ack = ack_for("<@UBOT> help migrate");
        assert!(!ack.proceed);
        assert!(ack.text.contains("migrate <namespace> in <environment>"));
        assert!(ack.text.contains("`databases=`"));
    }

    #[test]
    fn unknown_help_topic_falls_back_to_the_overview() {
        let ack = ack_for("<@UBOT> help teleport");
        assert!(!ack.proceed);
        assert!(ack.text.contains("I don't have a command called `teleport`"));
        assert!(ack.text.contains("Here's what I can do:"));
    }

    #[test]
    fn bare_keyword_asks_for_help_not_execution() {
        let ack = ack_for("<@UBOT> migrate");
        assert!(!ack.proceed);
        assert!(ack.text.contains("Usage: `migrate"));
    }
}
