use std::process::ExitCode;

fn main() -> ExitCode {
    contrata_cli::run()
}
