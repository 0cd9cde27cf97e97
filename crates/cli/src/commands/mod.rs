pub mod config;
pub mod resolve;

/// What a subcommand hands back to `run`: the text to print and the process
/// exit code. Exit codes are part of the CLI contract - scripts branch on
/// them - so subcommands choose theirs deliberately rather than bubbling
/// errors up as panics.
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}
