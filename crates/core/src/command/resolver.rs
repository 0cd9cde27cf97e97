//! Raw chat text in, typed command out.
//!
//! Resolution is total: unrecognized input becomes the Invalid variant and
//! an empty mention becomes Root. Callers never see an error here.

use super::{registry, ChatContext, Command};

/// Splits on whitespace and drops the first token, which is the bot mention
/// in every inbound message. An empty result is a valid bare mention.
pub fn tokenize(raw: &str) -> Vec<String> {
    raw.split_whitespace().skip(1).map(str::to_owned).collect()
}

/// Resolves one chat message into a command. The keyword is matched
/// case-insensitively; everything after that is the variant's own business.
pub fn resolve(raw: &str, context: ChatContext) -> Command {
    let tokens = tokenize(raw);
    if tokens.is_empty() {
        return Command::root(context);
    }

    match registry::find(&tokens[0]) {
        Some(entry) => (entry.construct)(tokens, context),
        None => Command::invalid(tokens, context),
    }
}

#[cfg(test)]
mod tests {
    use super::{resolve, tokenize};
    use crate::command::{ChatContext, Command};

    fn ctx() -> ChatContext {
        ChatContext::new("U100", "C200")
    }

    #[test]
    fn tokenize_drops_the_mention() {
        assert_eq!(
            tokenize("<@UBOT> deploy current in qa"),
            ["deploy", "current", "in", "qa"].map(str::to_owned)
        );
        assert!(tokenize("<@UBOT>").is_empty());
        assert!(tokenize("").is_empty());
        // collapsed whitespace
        assert_eq!(tokenize("<@UBOT>   show   environments"), ["show", "environments"].map(str::to_owned));
    }

    #[test]
    fn empty_mention_resolves_to_root() {
        let command = resolve("<@UBOT>", ctx());
        assert!(matches!(command, Command::Root(_)));
        assert!(command.is_help_request());
    }

    #[test]
    fn known_keyword_resolves_to_its_variant() {
        let command = resolve("<@UBOT> deploy current in qa services=mysvc:2.0 dryrun=true", ctx());
        assert!(matches!(command, Command::Deploy(_)));
        assert!(command.errors().is_empty());
        assert_eq!(command.options().str_value("namespace"), "current");
        assert_eq!(command.options().str_value("environment"), "qa");
        assert_eq!(command.options().artifact_value("services")[0].name, "mysvc");
        assert!(command.options().flag_value("dryrun"));
        assert_eq!(command.context().user_id, "U100");
        assert_eq!(command.context().channel_id, "C200");
    }

    #[test]
    fn keyword_matching_is_case_insensitive() {
        let command = resolve("<@UBOT> DEPLOY current in qa", ctx());
        assert!(matches!(command, Command::Deploy(_)));
    }

    #[test]
    fn misspelled_keyword_resolves_to_invalid() {
        let command = resolve("<@UBOT> deployy current in qa", ctx());
        assert!(matches!(command, Command::Invalid(_)));
        assert!(!command.is_executable());
        assert!(!command.errors().is_empty());
    }

    #[test]
    fn separator_words_are_positional_not_validated() {
        // `in` is read by position only; any word there parses identically
        let canonical = resolve("<@UBOT> deploy current in qa", ctx());
        let odd = resolve("<@UBOT> deploy current XYZ qa", ctx());
        assert_eq!(canonical.options(), odd.options());
        assert_eq!(odd.options().str_value("environment"), "qa");
    }

    #[test]
    fn resolving_twice_yields_equal_commands() {
        let text = "<@UBOT> migrate current in qa databases=db1:1.0,db2 force=true";
        let first = resolve(text, ctx());
        let second = resolve(text, ctx());
        assert_eq!(first, second);
    }

    #[test]
    fn resolution_never_reorders_or_rewrites_tokens() {
        let command = resolve("<@UBOT> deploy Current in QA", ctx());
        assert_eq!(command.tokens(), ["deploy", "Current", "in", "QA"].map(str::to_owned));
        // captured values keep their original case
        assert_eq!(command.options().str_value("namespace"), "Current");
        assert_eq!(command.options().str_value("environment"), "QA");
    }
}
