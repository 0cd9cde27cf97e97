//! The command model: raw chat text resolved into a closed set of typed
//! commands.
//!
//! Each variant owns its token-count bounds and its option-resolution logic.
//! Construction performs all validation up front; after that a command is
//! frozen. Parsing problems are recorded on the body rather than returned,
//! so resolution as a whole never fails.

pub mod ack;
pub mod args;
pub mod options;
pub mod registry;
pub mod resolver;

use crate::errors::ResolveError;

use self::options::{ArtifactRef, CommandOptions, OptionValue};

/// Chat-side provenance attached to every command.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChatContext {
    pub user_id: String,
    pub channel_id: String,
}

impl ChatContext {
    pub fn new(user_id: impl Into<String>, channel_id: impl Into<String>) -> Self {
        Self { user_id: user_id.into(), channel_id: channel_id.into() }
    }
}

/// Inclusive token-count bounds for a command's input, the leading keyword
/// included. `max: None` means unbounded above.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InputBounds {
    pub min: usize,
    pub max: Option<usize>,
}

impl InputBounds {
    pub const fn at_least(min: usize) -> Self {
        Self { min, max: None }
    }

    pub const fn between(min: usize, max: usize) -> Self {
        Self { min, max: Some(max) }
    }

    pub fn contains(&self, len: usize) -> bool {
        len >= self.min && self.max.map_or(true, |max| len <= max)
    }
}

const DEPLOY_BOUNDS: InputBounds = InputBounds::at_least(4);
const MIGRATE_BOUNDS: InputBounds = InputBounds::at_least(4);
const SHOW_BOUNDS: InputBounds = InputBounds::between(2, 5);
const SET_BOUNDS: InputBounds = InputBounds::at_least(8);
const DELETE_BOUNDS: InputBounds = InputBounds::between(4, 4);
const RELEASE_BOUNDS: InputBounds = InputBounds::between(7, 7);
const RESTART_BOUNDS: InputBounds = InputBounds::between(5, 5);
const RUN_BOUNDS: InputBounds = InputBounds::at_least(5);
const HELP_BOUNDS: InputBounds = InputBounds::between(1, 2);
const AUTH_BOUNDS: InputBounds = InputBounds::between(1, 1);
const OPEN_BOUNDS: InputBounds = InputBounds::at_least(0);

/// State shared by every command variant: the post-mention tokens, the chat
/// provenance, the options resolved at construction, and any resolution
/// errors collected along the way.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandBody {
    tokens: Vec<String>,
    context: ChatContext,
    options: CommandOptions,
    errors: Vec<ResolveError>,
}

impl CommandBody {
    fn new(tokens: Vec<String>, context: ChatContext) -> Self {
        Self { tokens, context, options: CommandOptions::default(), errors: Vec::new() }
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn context(&self) -> &ChatContext {
        &self.context
    }

    pub fn options(&self) -> &CommandOptions {
        &self.options
    }

    pub fn errors(&self) -> &[ResolveError] {
        &self.errors
    }

    /// Help requests and length-invalid input skip option resolution; the
    /// acknowledgement answers those before options would ever be read.
    fn ready_to_resolve(&self, keyword: &str, bounds: InputBounds) -> bool {
        !help_requested(&self.tokens, keyword) && bounds.contains(self.tokens.len())
    }

    /// Stores the token at `index` as a string option, when present.
    fn capture(&mut self, key: &'static str, index: usize) {
        if let Some(value) = self.tokens.get(index).cloned() {
            self.options.insert(key, OptionValue::Str(value));
        }
    }

    /// Scans `key=value` tokens from `start` against the accepted named
    /// arguments. Unknown keys and unparseable values become resolution
    /// errors; tokens without `=` in this region are ignored.
    fn resolve_named(&mut self, accepted: &[&'static args::NamedArg], start: usize) {
        let mut resolved: Vec<(&'static str, OptionValue)> = Vec::new();
        let mut failures: Vec<ResolveError> = Vec::new();

        for token in self.tokens.iter().skip(start) {
            let Some((key, value)) = token.split_once('=') else { continue };
            let key = key.trim();
            match accepted.iter().find(|arg| arg.matches(key)) {
                Some(arg) => match arg.parse(value) {
                    Ok(parsed) => resolved.push((arg.key, parsed)),
                    Err(err) => failures.push(err),
                },
                None => failures.push(ResolveError::UnknownArgument { key: key.to_owned() }),
            }
        }

        for (key, value) in resolved {
            self.options.insert(key, value);
        }
        self.errors.extend(failures);
    }

    /// Collects every `key=value` token from `start` onward into a string
    /// list, verbatim. Used by `set`, whose metadata keys are operator-chosen
    /// rather than catalogue entries.
    fn collect_pairs(&mut self, key: &'static str, start: usize) {
        let pairs: Vec<String> =
            self.tokens.iter().skip(start).filter(|token| token.contains('=')).cloned().collect();
        self.options.insert(key, OptionValue::List(pairs));
    }
}

/// The shared help-request rule: empty input, a leading or trailing `help`
/// token, or the bare command keyword on its own.
fn help_requested(tokens: &[String], keyword: &str) -> bool {
    match tokens {
        [] => true,
        [only] => only.eq_ignore_ascii_case("help") || only.eq_ignore_ascii_case(keyword),
        [first, .., last] => {
            first.eq_ignore_ascii_case("help") || last.eq_ignore_ascii_case("help")
        }
    }
}

/// Every command the bot understands, resolved from chat text.
///
/// The set is closed: handler dispatch is an exhaustive match, so adding a
/// variant without wiring a handler fails to compile.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Deploy(CommandBody),
    Migrate(CommandBody),
    Show(CommandBody),
    Set(CommandBody),
    Delete(CommandBody),
    Release(CommandBody),
    Restart(CommandBody),
    Run(CommandBody),
    Help(CommandBody),
    Auth(CommandBody),
    /// A bare mention with no command text.
    Root(CommandBody),
    /// Anything whose first token matched no registered keyword.
    Invalid(CommandBody),
}

impl Command {
    pub fn deploy(tokens: Vec<String>, context: ChatContext) -> Command {
        let mut body = CommandBody::new(tokens, context);
        if body.ready_to_resolve("deploy", DEPLOY_BOUNDS) {
            body.capture("namespace", 1);
            body.capture("environment", 3);
            body.resolve_named(args::DEPLOY_ARGS, 4);
        }
        Command::Deploy(body)
    }

    pub fn migrate(tokens: Vec<String>, context: ChatContext) -> Command {
        let mut body = CommandBody::new(tokens, context);
        if body.ready_to_resolve("migrate", MIGRATE_BOUNDS) {
            body.capture("namespace", 1);
            body.capture("environment", 3);
            body.resolve_named(args::MIGRATE_ARGS, 4);
        }
        Command::Migrate(body)
    }

    pub fn show(tokens: Vec<String>, context: ChatContext) -> Command {
        let mut body = CommandBody::new(tokens, context);
        if body.ready_to_resolve("show", SHOW_BOUNDS) {
            let subject = body.tokens[1].to_ascii_lowercase();
            match subject.as_str() {
                "environments" => {
                    body.options.insert("subject", OptionValue::Str(subject));
                }
                "namespaces" => {
                    body.options.insert("subject", OptionValue::Str(subject));
                    body.capture("environment", 3);
                }
                "services" => {
                    body.options.insert("subject", OptionValue::Str(subject));
                    body.capture("namespace", 3);
                    body.capture("environment", 4);
                }
                _ => body.errors.push(ResolveError::InvalidValue {
                    key: "subject".to_owned(),
                    value: subject,
                    expected: "environments, namespaces, or services",
                }),
            }
        }
        Command::Show(body)
    }

    pub fn set(tokens: Vec<String>, context: ChatContext) -> Command {
        let mut body = CommandBody::new(tokens, context);
        if body.ready_to_resolve("set", SET_BOUNDS) {
            body.capture("service", 3);
            body.capture("namespace", 5);
            body.capture("environment", 6);
            body.collect_pairs("metadata", 7);
        }
        Command::Set(body)
    }

    pub fn delete(tokens: Vec<String>, context: ChatContext) -> Command {
        let mut body = CommandBody::new(tokens, context);
        if body.ready_to_resolve("delete", DELETE_BOUNDS) {
            body.capture("namespace", 1);
            body.capture("environment", 3);
        }
        Command::Delete(body)
    }

    pub fn release(tokens: Vec<String>, context: ChatContext) -> Command {
        let mut body = CommandBody::new(tokens, context);
        if body.ready_to_resolve("release", RELEASE_BOUNDS) {
            let artifact = ArtifactRef::parse(&body.tokens[2]);
            body.options.insert("artifact", OptionValue::Artifacts(vec![artifact]));
            body.capture("from", 4);
            body.capture("to", 6);
        }
        Command::Release(body)
    }

    pub fn restart(tokens: Vec<String>, context: ChatContext) -> Command {
        let mut body = CommandBody::new(tokens, context);
        if body.ready_to_resolve("restart", RESTART_BOUNDS) {
            body.capture("service", 1);
            body.capture("namespace", 3);
            body.capture("environment", 4);
        }
        Command::Restart(body)
    }

    pub fn run(tokens: Vec<String>, context: ChatContext) -> Command {
        let mut body = CommandBody::new(tokens, context);
        if body.ready_to_resolve("run", RUN_BOUNDS) {
            body.capture("job", 1);
            body.capture("namespace", 3);
            body.capture("environment", 4);
            body.resolve_named(args::RUN_ARGS, 5);
        }
        Command::Run(body)
    }

    pub fn help(tokens: Vec<String>, context: ChatContext) -> Command {
        Command::Help(CommandBody::new(tokens, context))
    }

    pub fn auth(tokens: Vec<String>, context: ChatContext) -> Command {
        Command::Auth(CommandBody::new(tokens, context))
    }

    pub fn root(context: ChatContext) -> Command {
        Command::Root(CommandBody::new(Vec::new(), context))
    }

    pub fn invalid(tokens: Vec<String>, context: ChatContext) -> Command {
        let mut body = CommandBody::new(tokens, context);
        let word = body.tokens.first().cloned().unwrap_or_default();
        body.errors.push(ResolveError::UnknownCommand { word });
        Command::Invalid(body)
    }

    pub fn body(&self) -> &CommandBody {
        match self {
            Command::Deploy(body)
            | Command::Migrate(body)
            | Command::Show(body)
            | Command::Set(body)
            | Command::Delete(body)
            | Command::Release(body)
            | Command::Restart(body)
            | Command::Run(body)
            | Command::Help(body)
            | Command::Auth(body)
            | Command::Root(body)
            | Command::Invalid(body) => body,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::Deploy(_) => "deploy",
            Command::Migrate(_) => "migrate",
            Command::Show(_) => "show",
            Command::Set(_) => "set",
            Command::Delete(_) => "delete",
            Command::Release(_) => "release",
            Command::Restart(_) => "restart",
            Command::Run(_) => "run",
            Command::Help(_) => "help",
            Command::Auth(_) => "auth",
            Command::Root(_) => "root",
            Command::Invalid(_) => "invalid",
        }
    }

    pub fn bounds(&self) -> InputBounds {
        match self {
            Command::Deploy(_) => DEPLOY_BOUNDS,
            Command::Migrate(_) => MIGRATE_BOUNDS,
            Command::Show(_) => SHOW_BOUNDS,
            Command::Set(_) => SET_BOUNDS,
            Command::Delete(_) => DELETE_BOUNDS,
            Command::Release(_) => RELEASE_BOUNDS,
            Command::Restart(_) => RESTART_BOUNDS,
            Command::Run(_) => RUN_BOUNDS,
            Command::Help(_) => HELP_BOUNDS,
            Command::Auth(_) => AUTH_BOUNDS,
            Command::Root(_) | Command::Invalid(_) => OPEN_BOUNDS,
        }
    }

    pub fn tokens(&self) -> &[String] {
        self.body().tokens()
    }

    pub fn context(&self) -> &ChatContext {
        self.body().context()
    }

    pub fn options(&self) -> &CommandOptions {
        self.body().options()
    }

    pub fn errors(&self) -> &[ResolveError] {
        self.body().errors()
    }

    /// Whether this invocation is asking for usage rather than execution.
    pub fn is_help_request(&self) -> bool {
        let tokens = self.body().tokens();
        match self {
            // `auth` is complete as a bare keyword, so only an explicit
            // `help` token turns it into a help request
            Command::Auth(_) => match tokens {
                [] => true,
                [only] => only.eq_ignore_ascii_case("help"),
                [first, .., last] => {
                    first.eq_ignore_ascii_case("help") || last.eq_ignore_ascii_case("help")
                }
            },
            _ => help_requested(tokens, self.name()),
        }
    }

    pub fn valid_input_length(&self) -> bool {
        self.bounds().contains(self.body().tokens().len())
    }

    /// Variants that carry work for a handler. Help, bare mentions, and
    /// unrecognized input are answered entirely by the acknowledgement.
    pub fn is_executable(&self) -> bool {
        !matches!(self, Command::Help(_) | Command::Root(_) | Command::Invalid(_))
    }
}

#[cfg(test)]
mod tests {
    use super::{ChatContext, Command, InputBounds};
    use crate::errors::ResolveError;

    fn tokens(words: &[&str]) -> Vec<String> {
        words.iter().map(|word| (*word).to_owned()).collect()
    }

    fn ctx() -> ChatContext {
        ChatContext::new("U100", "C200")
    }

    #[test]
    fn bounds_contains_is_inclusive_and_open_ended() {
        let bounded = InputBounds::between(2, 5);
        assert!(!bounded.contains(1));
        assert!(bounded.contains(2));
        assert!(bounded.contains(5));
        assert!(!bounded.contains(6));

        let open = InputBounds::at_least(4);
        assert!(!open.contains(3));
        assert!(open.contains(4));
        assert!(open.contains(400));
    }

    #[test]
    fn deploy_captures_positionals_and_named_args() {
        let command = Command::deploy(
            tokens(&["deploy", "current", "in", "qa", "services=mysvc:2.0", "dryrun=true"]),
            ctx(),
        );

        assert!(command.valid_input_length());
        assert!(!command.is_help_request());
        assert!(command.errors().is_empty());
        assert_eq!(command.options().str_value("namespace"), "current");
        assert_eq!(command.options().str_value("environment"), "qa");
        assert!(command.options().flag_value("dryrun"));
        assert!(!command.options().flag_value("force"));

        let services = command.options().artifact_value("services");
        assert_eq!(services.len(), 1);
        assert_eq!((services[0].name.as_str(), services[0].version.as_str()), ("mysvc", "2.0"));
    }

    #[test]
    fn deploy_below_minimum_skips_resolution() {
        let command = Command::deploy(tokens(&["deploy", "current", "in"]), ctx());
        assert!(!command.valid_input_length());
        assert!(command.options().is_empty());
        assert!(command.errors().is_empty());
    }

    #[test]
    fn unbounded_commands_accept_long_input() {
        let mut words = vec!["deploy", "current", "in", "qa"];
        words.extend(["dryrun=true"; 10]);
        let command = Command::deploy(tokens(&words), ctx());
        assert!(command.valid_input_length());
    }

    #[test]
    fn bounded_commands_reject_excess_tokens() {
        let command =
            Command::show(tokens(&["show", "services", "in", "myns", "qa", "extra"]), ctx());
        assert!(!command.valid_input_length());
        assert!(command.options().is_empty());
    }

    #[test]
    fn unknown_named_arg_is_recorded_and_absent() {
        let command =
            Command::deploy(tokens(&["deploy", "current", "in", "qa", "colour=blue"]), ctx());

        assert_eq!(
            command.errors(),
            [ResolveError::UnknownArgument { key: "colour".to_owned() }]
        );
        assert!(!command.options().contains("colour"));
        // the positionals before the bad token still resolved
        assert_eq!(command.options().str_value("namespace"), "current");
    }

    #[test]
    fn unparseable_flag_value_is_recorded_and_absent() {
        let command =
            Command::deploy(tokens(&["deploy", "current", "in", "qa", "dryrun=maybe"]), ctx());

        assert_eq!(command.errors().len(), 1);
        assert!(matches!(&command.errors()[0], ResolveError::InvalidValue { key, .. } if key == "dryrun"));
        assert!(!command.options().contains("dryrun"));
    }

    #[test]
    fn bare_tokens_after_positionals_are_ignored() {
        let command =
            Command::deploy(tokens(&["deploy", "current", "in", "qa", "please"]), ctx());
        assert!(command.errors().is_empty());
        assert_eq!(command.options().len(), 2);
    }

    #[test]
    fn help_request_shapes() {
        // bare keyword
        assert!(Command::deploy(tokens(&["deploy"]), ctx()).is_help_request());
        // trailing help
        assert!(Command::deploy(tokens(&["deploy", "current", "help"]), ctx()).is_help_request());
        // normal invocation
        assert!(!Command::deploy(tokens(&["deploy", "current", "in", "qa"]), ctx())
            .is_help_request());
        // empty input
        assert!(Command::root(ctx()).is_help_request());
    }

    #[test]
    fn bare_auth_keyword_is_an_invocation_not_a_help_request() {
        let command = Command::auth(tokens(&["auth"]), ctx());
        assert!(!command.is_help_request());
        assert!(command.valid_input_length());

        assert!(Command::auth(tokens(&["auth", "help"]), ctx()).is_help_request());
    }

    #[test]
    fn migrate_accepts_database_lists() {
        let command = Command::migrate(
            tokens(&["migrate", "current", "in", "qa", "databases=db1:1.0,db2"]),
            ctx(),
        );

        let databases = command.options().artifact_value("databases");
        assert_eq!(databases.len(), 2);
        assert_eq!((databases[0].name.as_str(), databases[0].version.as_str()), ("db1", "1.0"));
        assert_eq!((databases[1].name.as_str(), databases[1].version.as_str()), ("db2", ""));
    }

    #[test]
    fn show_scopes_options_by_subject() {
        let environments = Command::show(tokens(&["show", "environments"]), ctx());
        assert_eq!(environments.options().str_value("subject"), "environments");
        assert!(!environments.options().contains("environment"));

        let namespaces = Command::show(tokens(&["show", "namespaces", "in", "qa"]), ctx());
        assert_eq!(namespaces.options().str_value("subject"), "namespaces");
        assert_eq!(namespaces.options().str_value("environment"), "qa");

        let services = Command::show(tokens(&["show", "services", "in", "myns", "qa"]), ctx());
        assert_eq!(services.options().str_value("namespace"), "myns");
        assert_eq!(services.options().str_value("environment"), "qa");
    }

    #[test]
    fn show_rejects_unknown_subjects() {
        let command = Command::show(tokens(&["show", "widgets"]), ctx());
        assert_eq!(command.errors().len(), 1);
        assert!(matches!(&command.errors()[0], ResolveError::InvalidValue { key, .. } if key == "subject"));
    }

    #[test]
    fn set_collects_verbatim_metadata_pairs() {
        let command = Command::set(
            tokens(&["set", "metadata", "for", "mysvc", "in", "myns", "qa", "owner=payments", "tier=1"]),
            ctx(),
        );

        assert!(command.errors().is_empty());
        assert_eq!(command.options().str_value("service"), "mysvc");
        assert_eq!(command.options().str_value("namespace"), "myns");
        assert_eq!(command.options().str_value("environment"), "qa");
        assert_eq!(
            command.options().list_value("metadata"),
            ["owner=payments".to_owned(), "tier=1".to_owned()]
        );
    }

    #[test]
    fn release_parses_artifact_and_feeds() {
        let command = Command::release(
            tokens(&["release", "artifact", "web:1.4.2", "from", "staging", "to", "stable"]),
            ctx(),
        );

        assert!(command.errors().is_empty());
        let artifact = command.options().artifact_value("artifact");
        assert_eq!((artifact[0].name.as_str(), artifact[0].version.as_str()), ("web", "1.4.2"));
        assert_eq!(command.options().str_value("from"), "staging");
        assert_eq!(command.options().str_value("to"), "stable");
    }

    #[test]
    fn restart_and_run_capture_their_positionals() {
        let restart = Command::restart(tokens(&["restart", "mysvc", "in", "myns", "qa"]), ctx());
        assert_eq!(restart.options().str_value("service"), "mysvc");
        assert_eq!(restart.options().str_value("namespace"), "myns");
        assert_eq!(restart.options().str_value("environment"), "qa");

        let run = Command::run(
            tokens(&["run", "reindex", "in", "myns", "qa", "force=true"]),
            ctx(),
        );
        assert_eq!(run.options().str_value("job"), "reindex");
        assert_eq!(run.options().str_value("environment"), "qa");
        assert!(run.options().flag_value("force"));
    }

    #[test]
    fn invalid_carries_the_unknown_word() {
        let command = Command::invalid(tokens(&["deployy", "current"]), ctx());
        assert!(!command.is_executable());
        assert_eq!(
            command.errors(),
            [ResolveError::UnknownCommand { word: "deployy".to_owned() }]
        );
    }

    #[test]
    fn executability_follows_the_variant() {
        assert!(Command::deploy(tokens(&["deploy", "a", "in", "qa"]), ctx()).is_executable());
        assert!(Command::auth(tokens(&["auth"]), ctx()).is_executable());
        assert!(!Command::help(tokens(&["help"]), ctx()).is_executable());
        assert!(!Command::root(ctx()).is_executable());
        assert!(!Command::invalid(tokens(&["nope"]), ctx()).is_executable());
    }
}
