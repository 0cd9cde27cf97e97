pub mod auth;
pub mod command;
pub mod config;
pub mod errors;

pub use auth::{AuthDecision, AuthPolicy};
pub use command::ack::{acknowledge, Acknowledgement};
pub use command::options::{ArtifactRef, CommandOptions, OptionValue};
pub use command::registry::{CommandEntry, Constructor};
pub use command::resolver::{resolve, tokenize};
pub use command::{ChatContext, Command, CommandBody, InputBounds};
pub use config::{
    AppConfig, AuthConfig, ConfigError, ConfigOverrides, DeployConfig, LoadOptions, LogFormat,
    LoggingConfig, PoolConfig, SlackConfig,
};
pub use errors::ResolveError;
