//! Jac CLI - Command line interface for the Jac compiler core

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::{Parser, Subcommand};

use jac_cli::files::collect_inputs;
use jac_cli::{build_program, check_files, format_files, logging, parse_file};

#[derive(Parser)]
#[command(name = "jac")]
#[command(about = "Jac type checker and formatter", long_about = None)]
struct Cli {
    /// Log level (error, warn, info, debug, trace); overrides JAC_LOG
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Formatter configuration file; defaults to the nearest jacfmt.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Number of worker threads
    #[arg(short, long, global = true)]
    jobs: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Type check files or directories
    Check {
        /// Input files or directories
        paths: Vec<PathBuf>,
        /// Print the reports as JSON
        #[arg(long)]
        json: bool,
    },
    /// Rewrite files in canonical form
    Format {
        /// Input files or directories
        paths: Vec<PathBuf>,
        /// Only report files that would change
        #[arg(long)]
        check: bool,
    },
    /// Parse a file and output the AST as JSON
    Parse {
        /// Input file
        file: PathBuf,
        /// Pretty print the output
        #[arg(short, long)]
        pretty: bool,
    },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Check { .. } => "check",
            Commands::Format { .. } => "format",
            Commands::Parse { .. } => "parse",
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.log_level.as_deref());

    let command = cli.command.name();
    let started = Instant::now();
    tracing::info!(target: "pipeline", stage = "cli.run.start", command);

    let code = run(cli);

    tracing::info!(
        target: "pipeline",
        stage = "cli.run.footer",
        command,
        elapsed_ms = started.elapsed().as_millis() as u64
    );
    code
}

fn run(cli: Cli) -> ExitCode {
    if let Commands::Parse { file, pretty } = &cli.command {
        return parse_file(file, *pretty);
    }

    let program = match build_program(cli.config.as_deref(), cli.jobs) {
        Ok(program) => program,
        Err(err) => {
            eprintln!("Error: {}", err);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Check { paths, json } => {
            let summary = check_files(&program, &collect_inputs(&paths), json);
            if !json {
                summary.print();
            }
            summary.exit_code()
        }
        Commands::Format { paths, check } => {
            let summary = format_files(&program, &collect_inputs(&paths), check);
            if summary.modified.is_empty() && summary.failed == 0 {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Commands::Parse { .. } => ExitCode::SUCCESS,
    }
}
