//! The fixed vocabulary of named arguments and positional parameters.
//!
//! Commands declare which subset of the catalogue they accept; resolution
//! scans `key=value` tokens against that subset. Keys match
//! case-insensitively, values parse according to the argument's kind.

use crate::errors::ResolveError;

use super::options::{ArtifactRef, OptionValue};

/// How a named argument's raw value text is parsed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ArgKind {
    /// `true` / `false`, case-insensitive.
    Flag,
    /// Comma-separated `name[:version]` entries.
    Artifacts,
}

/// A named `key=value` argument the bot understands.
#[derive(Debug)]
pub struct NamedArg {
    pub key: &'static str,
    pub description: &'static str,
    kind: ArgKind,
}

impl NamedArg {
    pub fn matches(&self, key: &str) -> bool {
        self.key.eq_ignore_ascii_case(key)
    }

    pub(crate) fn parse(&self, raw: &str) -> Result<OptionValue, ResolveError> {
        match self.kind {
            ArgKind::Flag => match parse_flag(raw) {
                Some(value) => Ok(OptionValue::Flag(value)),
                None => Err(ResolveError::InvalidValue {
                    key: self.key.to_owned(),
                    value: raw.to_owned(),
                    expected: "true or false",
                }),
            },
            ArgKind::Artifacts => Ok(OptionValue::Artifacts(parse_artifact_list(raw))),
        }
    }
}

/// A parameter read from a fixed token position, described for help output.
#[derive(Debug)]
pub struct PositionalParam {
    pub name: &'static str,
    pub description: &'static str,
}

pub const DRYRUN: NamedArg = NamedArg {
    key: "dryrun",
    description: "validate and report without changing anything",
    kind: ArgKind::Flag,
};

pub const FORCE: NamedArg = NamedArg {
    key: "force",
    description: "proceed even when the requested version is already running",
    kind: ArgKind::Flag,
};

pub const SERVICES: NamedArg = NamedArg {
    key: "services",
    description: "comma-separated services to include, each as name[:version]",
    kind: ArgKind::Artifacts,
};

pub const DATABASES: NamedArg = NamedArg {
    key: "databases",
    description: "comma-separated databases to migrate, each as name[:version]",
    kind: ArgKind::Artifacts,
};

pub const NAMESPACE: PositionalParam =
    PositionalParam { name: "namespace", description: "the namespace the command targets" };

pub const ENVIRONMENT: PositionalParam =
    PositionalParam { name: "environment", description: "the environment the command targets" };

pub const SERVICE: PositionalParam =
    PositionalParam { name: "service", description: "the service the command targets" };

pub const JOB: PositionalParam =
    PositionalParam { name: "job", description: "the job definition to run" };

pub const ARTIFACT: PositionalParam =
    PositionalParam { name: "artifact", description: "the artifact to promote, as name[:version]" };

pub const FROM_FEED: PositionalParam =
    PositionalParam { name: "from-feed", description: "the feed the artifact is promoted from" };

pub const TO_FEED: PositionalParam =
    PositionalParam { name: "to-feed", description: "the feed the artifact is promoted to" };

pub const SUBJECT: PositionalParam = PositionalParam {
    name: "subject",
    description: "what to list: environments, namespaces, or services",
};

pub const TOPIC: PositionalParam =
    PositionalParam { name: "command", description: "the command to describe" };

/// Named arguments accepted per command.
pub const DEPLOY_ARGS: &[&NamedArg] = &[&SERVICES, &DRYRUN, &FORCE];
pub const MIGRATE_ARGS: &[&NamedArg] = &[&DATABASES, &DRYRUN, &FORCE];
pub const RUN_ARGS: &[&NamedArg] = &[&DRYRUN, &FORCE];
pub const NO_ARGS: &[&NamedArg] = &[];

/// Case-insensitive `true` / `false`.
fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// Splits a comma-separated artifact list. Blank entries are dropped; a
/// missing `:version` suffix leaves the version empty.
pub fn parse_artifact_list(raw: &str) -> Vec<ArtifactRef> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(ArtifactRef::parse)
        .collect()
}
