//! Jac CLI - command implementations shared by `jac`, `jac-check` and
//! `jac-format`

pub mod commands;
pub mod files;
pub mod logging;
pub mod report;

pub use commands::{
    build_program, check_files, format_files, parse_file, run_check_hook, run_format_hook,
    CheckSummary, FormatSummary,
};
