use std::process::ExitCode;

fn main() -> ExitCode {
    bosun_cli::run()
}
