//! Channel authorization: a pure decision over the resolved command and the
//! invoking channel's display name.
//!
//! Two grants are OR'd together. A channel on the allowed list may run
//! anything; any channel may run commands whose target environment is a
//! non-production one. Help requests and the variants that never execute
//! are exempt. The async channel-name lookup lives with the gateway; this
//! module never does IO.

use serde::Serialize;

use crate::command::Command;

/// Environment-name substrings that mark a target as non-production.
pub const OPEN_ENVIRONMENTS: &[&str] = &["int", "qa", "dev"];

/// The outcome of an authorization check, with the grant that carried it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthDecision {
    /// Help requests and non-executable variants are always allowed.
    Exempt,
    /// The invoking channel is on the allowed list.
    ChannelGranted,
    /// The target environment is non-production.
    EnvironmentGranted,
    Denied,
}

impl AuthDecision {
    pub fn allowed(&self) -> bool {
        !matches!(self, AuthDecision::Denied)
    }

    /// Short name for log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthDecision::Exempt => "exempt",
            AuthDecision::ChannelGranted => "channel_granted",
            AuthDecision::EnvironmentGranted => "environment_granted",
            AuthDecision::Denied => "denied",
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct AuthPolicy {
    allowed_channels: Vec<String>,
}

impl AuthPolicy {
    pub fn new(allowed_channels: Vec<String>) -> Self {
        Self { allowed_channels }
    }

    /// Decides whether `command` may execute from the named channel.
    ///
    /// `channel_name` is `None` when the gateway could not look the channel
    /// up; that quietly forfeits the channel grant and the environment grant
    /// decides alone.
    pub fn authorize(&self, command: &Command, channel_name: Option<&str>) -> AuthDecision {
        if !command.is_executable() || command.is_help_request() {
            return AuthDecision::Exempt;
        }

        if let Some(name) = channel_name {
            if self.allowed_channels.iter().any(|allowed| allowed.eq_ignore_ascii_case(name)) {
                return AuthDecision::ChannelGranted;
            }
        }

        let environment = command.options().str_value("environment").to_ascii_lowercase();
        if OPEN_ENVIRONMENTS.iter().any(|marker| environment.contains(marker)) {
            return AuthDecision::EnvironmentGranted;
        }

        AuthDecision::Denied
    }
}

#[cfg(test)]
mod tests {
    use super::{AuthDecision, AuthPolicy};
    use crate::command::{resolver, ChatContext};

    fn policy() -> AuthPolicy {
        AuthPolicy::new(vec!["deployments".to_owned()])
    }

    fn command(text: &str) -> crate::command::Command {
        resolver::resolve(text, ChatContext::new("U1", "C1"))
    }

    #[test]
    fn allowed_channel_may_run_anything() {
        let decision =
            policy().authorize(&command("<@UBOT> deploy current in production"), Some("deployments"));
        assert_eq!(decision, AuthDecision::ChannelGranted);
        assert!(decision.allowed());
    }

    #[test]
    fn channel_names_match_case_insensitively() {
        let decision =
            policy().authorize(&command("<@UBOT> deploy current in production"), Some("Deployments"));
        assert_eq!(decision, AuthDecision::ChannelGranted);
    }

    #[test]
    fn open_environment_is_granted_anywhere() {
        for environment in ["qa", "qa-2", "integration", "devel"] {
            let text = format!("<@UBOT> deploy current in {environment}");
            let decision = policy().authorize(&command(&text), Some("random"));
            assert_eq!(decision, AuthDecision::EnvironmentGranted, "environment {environment}");
        }
    }

    #[test]
    fn production_from_unlisted_channel_is_denied() {
        let decision =
            policy().authorize(&command("<@UBOT> deploy current in production"), Some("random"));
        assert_eq!(decision, AuthDecision::Denied);
        assert!(!decision.allowed());
    }

    #[test]
    fn failed_channel_lookup_forfeits_only_the_channel_grant() {
        let denied = policy().authorize(&command("<@UBOT> deploy current in production"), None);
        assert_eq!(denied, AuthDecision::Denied);

        let granted = policy().authorize(&command("<@UBOT> deploy current in qa"), None);
        assert_eq!(granted, AuthDecision::EnvironmentGranted);
    }

    #[test]
    fn help_requests_and_non_executable_variants_are_exempt() {
        assert_eq!(policy().authorize(&command("<@UBOT> help"), None), AuthDecision::Exempt);
        assert_eq!(policy().authorize(&command("<@UBOT>"), None), AuthDecision::Exempt);
        assert_eq!(policy().authorize(&command("<@UBOT> blargh"), None), AuthDecision::Exempt);
        assert_eq!(
            policy().authorize(&command("<@UBOT> deploy help"), None),
            AuthDecision::Exempt
        );
    }

    #[test]
    fn release_has_no_environment_so_needs_the_channel_grant() {
        let text = "<@UBOT> release artifact web:1.0 from staging to stable";
        assert_eq!(policy().authorize(&command(text), Some("deployments")), AuthDecision::ChannelGranted);
        assert_eq!(policy().authorize(&command(text), Some("random")), AuthDecision::Denied);
    }
}
