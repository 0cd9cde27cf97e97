pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "bosun",
    about = "Bosun operator CLI",
    long_about = "Dry-run chat command resolution and inspect effective configuration, without a Slack connection.",
    after_help = "Examples:\n  bosun resolve deploy billing in qa services=api:1.4.2\n  bosun resolve --json show services in billing qa\n  bosun config"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(
        about = "Resolve a chat command offline and show the reply the bot would give",
        long_about = "Runs the same resolution pipeline the bot runs on a mention. The text is \
                      taken as it would appear after the mention, so `bosun resolve deploy billing \
                      in qa` matches `@bosun deploy billing in qa` in chat."
    )]
    Resolve {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
        #[arg(required = true, help = "Command text, without the leading bot mention")]
        text: Vec<String>,
    },
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Resolve { json, text } => commands::resolve::run(&text.join(" "), json),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
