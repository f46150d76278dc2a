//! Pre-commit hook: format the staged .jac files in place

use std::process::ExitCode;

fn main() -> ExitCode {
    jac_cli::logging::init(None);
    let args: Vec<String> = std::env::args().skip(1).collect();
    jac_cli::run_format_hook(&args)
}
