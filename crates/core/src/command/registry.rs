//! The command registration table.
//!
//! One row per keyword carries everything derived elsewhere: the constructor
//! the resolver calls, the usage line and vocabulary the help output renders.
//! Handler wiring is the exhaustive match over [`Command`], so a row without
//! a handler cannot slip through at runtime.

use super::args::{NamedArg, PositionalParam};
use super::{args, ChatContext, Command};

pub type Constructor = fn(Vec<String>, ChatContext) -> Command;

/// One row of the table: everything the bot knows about a keyword.
pub struct CommandEntry {
    pub keyword: &'static str,
    pub summary: &'static str,
    pub usage: &'static str,
    pub positionals: &'static [&'static PositionalParam],
    pub named: &'static [&'static NamedArg],
    pub construct: Constructor,
}

/// Every command the bot understands, in help-listing order.
pub const COMMANDS: &[CommandEntry] = &[
    CommandEntry {
        keyword: "deploy",
        summary: "deploy a namespace's services to an environment",
        usage: "deploy <namespace> in <environment> [services=a:1.0,b] [dryrun=true] [force=true]",
        positionals: &[&args::NAMESPACE, &args::ENVIRONMENT],
        named: args::DEPLOY_ARGS,
        construct: Command::deploy,
    },
    CommandEntry {
        keyword: "migrate",
        summary: "run database migrations for a namespace in an environment",
        usage: "migrate <namespace> in <environment> [databases=db1:1.0,db2] [dryrun=true] [force=true]",
        positionals: &[&args::NAMESPACE, &args::ENVIRONMENT],
        named: args::MIGRATE_ARGS,
        construct: Command::migrate,
    },
    CommandEntry {
        keyword: "run",
        summary: "run a one-off job in a namespace and environment",
        usage: "run <job> in <namespace> <environment> [dryrun=true] [force=true]",
        positionals: &[&args::JOB, &args::NAMESPACE, &args::ENVIRONMENT],
        named: args::RUN_ARGS,
        construct: Command::run,
    },
    CommandEntry {
        keyword: "restart",
        summary: "restart a service by redeploying its running version",
        usage: "restart <service> in <namespace> <environment>",
        positionals: &[&args::SERVICE, &args::NAMESPACE, &args::ENVIRONMENT],
        named: args::NO_ARGS,
        construct: Command::restart,
    },
    CommandEntry {
        keyword: "release",
        summary: "promote an artifact from one feed to another",
        usage: "release artifact <name[:version]> from <feed> to <feed>",
        positionals: &[&args::ARTIFACT, &args::FROM_FEED, &args::TO_FEED],
        named: args::NO_ARGS,
        construct: Command::release,
    },
    CommandEntry {
        keyword: "show",
        summary: "list environments, namespaces, or services",
        usage: "show <environments|namespaces|services> [in <namespace>] [<environment>]",
        positionals: &[&args::SUBJECT],
        named: args::NO_ARGS,
        construct: Command::show,
    },
    CommandEntry {
        keyword: "set",
        summary: "set metadata on a service",
        usage: "set metadata for <service> in <namespace> <environment> <key=value>...",
        positionals: &[&args::SERVICE, &args::NAMESPACE, &args::ENVIRONMENT],
        named: args::NO_ARGS,
        construct: Command::set,
    },
    CommandEntry {
        keyword: "delete",
        summary: "delete a namespace from an environment",
        usage: "delete <namespace> in <environment>",
        positionals: &[&args::NAMESPACE, &args::ENVIRONMENT],
        named: args::NO_ARGS,
        construct: Command::delete,
    },
    CommandEntry {
        keyword: "auth",
        summary: "report what this channel is authorized to do",
        usage: "auth",
        positionals: &[],
        named: args::NO_ARGS,
        construct: Command::auth,
    },
    CommandEntry {
        keyword: "help",
        summary: "describe the available commands",
        usage: "help [command]",
        positionals: &[&args::TOPIC],
        named: args::NO_ARGS,
        construct: Command::help,
    },
];

/// Case-insensitive keyword lookup.
pub fn find(keyword: &str) -> Option<&'static CommandEntry> {
    COMMANDS.iter().find(|entry| entry.keyword.eq_ignore_ascii_case(keyword))
}

#[cfg(test)]
mod tests {
    use super::{find, COMMANDS};
    use crate::command::{ChatContext, Command};

    #[test]
    fn lookup_is_case_insensitive() {
        assert!(find("DEPLOY").is_some());
        assert!(find("Deploy").is_some());
        assert!(find("deployy").is_none());
    }

    #[test]
    fn keywords_are_unique() {
        for (index, entry) in COMMANDS.iter().enumerate() {
            let duplicate = COMMANDS
                .iter()
                .skip(index + 1)
                .any(|other| other.keyword.eq_ignore_ascii_case(entry.keyword));
            assert!(!duplicate, "duplicate keyword `{}`", entry.keyword);
        }
    }

    #[test]
    fn constructors_build_their_own_variant() {
        let entry = find("deploy").expect("deploy is registered");
        let command = (entry.construct)(
            vec!["deploy".to_owned(), "current".to_owned(), "in".to_owned(), "qa".to_owned()],
            ChatContext::new("U1", "C1"),
        );
        assert!(matches!(command, Command::Deploy(_)));
        assert_eq!(command.name(), entry.keyword);
    }

    #[test]
    fn every_entry_name_matches_its_constructed_command() {
        for entry in COMMANDS {
            let command = (entry.construct)(
                vec![entry.keyword.to_owned()],
                ChatContext::new("U1", "C1"),
            );
            assert_eq!(command.name(), entry.keyword);
        }
    }
}
