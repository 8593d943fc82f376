use std::process::ExitCode;

fn main() -> ExitCode {
    springconf_cli::run()
}
