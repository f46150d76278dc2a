//! Pre-commit hook: type check the staged .jac files

use std::process::ExitCode;

fn main() -> ExitCode {
    jac_cli::logging::init(None);
    let args: Vec<String> = std::env::args().skip(1).collect();
    jac_cli::run_check_hook(&args)
}
