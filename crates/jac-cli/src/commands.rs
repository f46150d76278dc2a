//! The `check`, `format` and `parse` commands and the pre-commit hooks

use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use jac_compiler::{CompileReport, Config, ConfigError, Program, SessionError, SourceUnit};
use jac_diagnostics::Diagnostics;
use tracing::{info, warn};

use crate::files::hook_inputs;
use crate::report::eprint_diagnostics;

/// Build the program from `--config` or the nearest `jacfmt.toml`
pub fn build_program(config: Option<&Path>, jobs: Option<usize>) -> Result<Program, ConfigError> {
    let config = match config {
        Some(path) => Config::load(path)?,
        None => {
            let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            Config::discover(cwd)?
        }
    };
    let program = Program::new(config);
    Ok(match jobs {
        Some(jobs) => program.with_jobs(jobs),
        None => program,
    })
}

/// Read every input once. Unreadable files are reported and counted.
fn load_units(paths: &[PathBuf], action: &str) -> (Vec<SourceUnit>, usize) {
    let mut units = Vec::with_capacity(paths.len());
    let mut failed = 0;
    for path in paths {
        match SourceUnit::read(path) {
            Ok(unit) => units.push(unit),
            Err(err) => {
                warn!(target: "pipeline", stage = "cli.read", path = %path.display(), error = %err);
                eprintln!("Error {} '{}': {}", action, path.display(), err);
                failed += 1;
            }
        }
    }
    (units, failed)
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CheckSummary {
    pub files_checked: usize,
    pub errors: usize,
    pub warnings: usize,
}

impl CheckSummary {
    pub fn passed(&self) -> bool {
        self.errors == 0
    }

    /// Print the closing line; nothing when no file was checked
    pub fn print(&self) {
        if self.files_checked == 0 {
            return;
        }
        if self.passed() {
            println!("Type check passed: {} file(s) checked", self.files_checked);
        } else {
            eprintln!(
                "\nType check failed: {} error(s) in {} file(s)",
                self.errors, self.files_checked
            );
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        if self.passed() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }
}

/// Compile every file and report its diagnostics. Warnings are only shown
/// for files without errors. With `json` the reports go to stdout instead.
pub fn check_files(program: &Program, paths: &[PathBuf], json: bool) -> CheckSummary {
    let (units, unreadable) = load_units(paths, "checking");
    let results = program.compile_units(&units);

    let mut summary = CheckSummary {
        files_checked: paths.len(),
        errors: unreadable,
        warnings: 0,
    };
    let mut reports = Vec::with_capacity(results.len());
    for (unit, result) in units.iter().zip(results) {
        let report = match result {
            Ok(report) => report,
            Err(err) => {
                eprintln!("Error checking '{}': {}", unit.path().display(), err);
                summary.errors += 1;
                continue;
            }
        };
        summary.errors += report.errors.len();
        summary.warnings += report.warnings.len();
        if !json {
            if report.has_errors() {
                eprint_diagnostics(unit.path(), unit.text(), &report.errors);
            } else if !report.warnings.is_empty() {
                eprint_diagnostics(unit.path(), unit.text(), &report.warnings);
            }
        }
        reports.push(report);
    }

    if json {
        print_json(&reports);
    }
    info!(
        target: "pipeline",
        stage = "cli.check.done",
        files = summary.files_checked,
        errors = summary.errors,
        warnings = summary.warnings
    );
    summary
}

fn print_json(reports: &[CompileReport]) {
    match serde_json::to_string_pretty(reports) {
        Ok(json) => println!("{}", json),
        Err(err) => eprintln!("Error serializing reports: {}", err),
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FormatSummary {
    pub files: usize,
    /// Files whose canonical text differs from their contents
    pub modified: Vec<PathBuf>,
    /// Files that could not be read, formatted or written
    pub failed: usize,
}

/// Format every file. Modified files are rewritten unless `check_only`.
pub fn format_files(program: &Program, paths: &[PathBuf], check_only: bool) -> FormatSummary {
    let (units, unreadable) = load_units(paths, "formatting");
    let results = program.format_units(&units);

    let mut summary = FormatSummary {
        files: paths.len(),
        modified: Vec::new(),
        failed: unreadable,
    };
    for (unit, result) in units.iter().zip(results) {
        let path = unit.path();
        match result {
            Ok(output) if output.modified => {
                if check_only {
                    println!("Would format: {}", path.display());
                } else if let Err(err) = output.write_if_modified(path) {
                    eprintln!("Error formatting '{}': {}", path.display(), err);
                    summary.failed += 1;
                    continue;
                } else {
                    println!("Formatted: {}", path.display());
                }
                summary.modified.push(path.to_path_buf());
            }
            Ok(_) => {}
            Err(err) => {
                eprintln!("Error formatting '{}': {}", path.display(), err);
                if let SessionError::FormatBlocked { diagnostics } = &err {
                    eprint_diagnostics(path, unit.text(), diagnostics);
                }
                summary.failed += 1;
            }
        }
    }

    info!(
        target: "pipeline",
        stage = "cli.format.done",
        files = summary.files,
        modified = summary.modified.len(),
        failed = summary.failed
    );
    summary
}

/// Print the AST of one file as JSON. Syntax errors are rendered instead.
pub fn parse_file(path: &Path, pretty: bool) -> ExitCode {
    let unit = match SourceUnit::read(path) {
        Ok(unit) => unit,
        Err(err) => {
            eprintln!("Error reading '{}': {}", path.display(), err);
            return ExitCode::FAILURE;
        }
    };

    let mut diagnostics = Diagnostics::new();
    let module = jac_parser::parse_into(unit.text(), &mut diagnostics);
    if diagnostics.has_errors() {
        eprint_diagnostics(unit.path(), unit.text(), diagnostics.all());
        return ExitCode::FAILURE;
    }

    let json = if pretty {
        serde_json::to_string_pretty(&module)
    } else {
        serde_json::to_string(&module)
    };
    match json {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Error serializing AST: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn hook_program() -> Option<Program> {
    match build_program(None, None) {
        Ok(program) => Some(program),
        Err(err) => {
            eprintln!("Error: {}", err);
            None
        }
    }
}

/// `jac-check`: exit 1 when any checked file has errors
pub fn run_check_hook(args: &[String]) -> ExitCode {
    if args.is_empty() {
        eprintln!("Usage: jac-check <file.jac> [file2.jac ...]");
        return ExitCode::SUCCESS;
    }
    let paths = hook_inputs(args);
    if paths.is_empty() {
        return ExitCode::SUCCESS;
    }
    let Some(program) = hook_program() else {
        return ExitCode::FAILURE;
    };
    let summary = check_files(&program, &paths, false);
    summary.print();
    summary.exit_code()
}

/// `jac-format`: exit 1 when any file was rewritten so the commit is
/// re-staged
pub fn run_format_hook(args: &[String]) -> ExitCode {
    if args.is_empty() {
        eprintln!("Usage: jac-format <file.jac> [file2.jac ...]");
        return ExitCode::SUCCESS;
    }
    let paths = hook_inputs(args);
    if paths.is_empty() {
        return ExitCode::SUCCESS;
    }
    let Some(program) = hook_program() else {
        return ExitCode::FAILURE;
    };
    let summary = format_files(&program, &paths, false);
    if summary.modified.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
