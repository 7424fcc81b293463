//! Binary entry point for the rectify CLI.
//!
//! ## Usage
//!
//! ```bash
//! # Preview the configured rules as a unified diff
//! rectify process src/
//!
//! # Apply them in place and print a JSON summary
//! rectify process --write --format json src/
//!
//! # Document every built-in rule
//! rectify describe
//! ```

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use rectify::cli::{exit_code, run_describe, run_process, OutputFormat, ProcessOptions};
use rectify::config::CliOverrides;
use rectify::error::EngineError;
use rectify::output::{emit_response, ErrorResponse};

// ============================================================================
// CLI Structure
// ============================================================================

/// Rule-driven rewriting of PHP syntax trees.
#[derive(Parser, Debug)]
#[command(name = "rectify", version, about = "Rule-driven rewriting of PHP syntax trees")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

/// Global arguments shared by all subcommands.
#[derive(Parser, Debug)]
struct GlobalArgs {
    /// Workspace root directory (default: current directory).
    #[arg(long, global = true)]
    workspace: Option<PathBuf>,

    /// Config file (default: rectify.toml in the workspace).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level for tracing output.
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,

    /// Emit log events as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,
}

/// Log level for tracing output.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Output format for the process command.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum ProcessFormat {
    /// Unified diff per changed file (default).
    #[default]
    Diff,
    /// Full JSON response.
    Json,
    /// Markdown report grouped by rule category.
    Report,
}

impl From<ProcessFormat> for OutputFormat {
    fn from(format: ProcessFormat) -> Self {
        match format {
            ProcessFormat::Diff => OutputFormat::Diff,
            ProcessFormat::Json => OutputFormat::Json,
            ProcessFormat::Report => OutputFormat::Report,
        }
    }
}

/// CLI subcommands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Run the configured rules over files and directories.
    Process {
        /// Files or directories (default: the workspace).
        paths: Vec<PathBuf>,
        /// Output format.
        #[arg(long, value_enum, default_value = "diff")]
        format: ProcessFormat,
        /// Rewrite changed files in place.
        #[arg(long)]
        write: bool,
        /// Maximum passes per file before giving up on convergence.
        #[arg(long)]
        max_passes: Option<usize>,
        /// Maximum tree depth.
        #[arg(long)]
        max_depth: Option<usize>,
        /// Worker threads (0 = one per core).
        #[arg(long)]
        workers: Option<usize>,
    },
    /// Print rule documentation as markdown.
    Describe {
        /// Only the rules enabled in the config file.
        #[arg(long)]
        configured: bool,
    },
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.global.log_level, cli.global.log_json);

    match execute(cli) {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            let response = ErrorResponse::from_error(&err);
            // Errors go to stdout as JSON, like every other response
            let _ = emit_response(&response, &mut io::stdout());
            let _ = io::stdout().flush();
            ExitCode::from(err.error_code().code())
        }
    }
}

/// Initialize tracing subscriber.
fn init_tracing(level: LogLevel, json: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Execute the CLI command, returning the process exit code.
fn execute(cli: Cli) -> Result<u8, EngineError> {
    let workspace = match cli.global.workspace {
        Some(workspace) => workspace,
        None => std::env::current_dir()?,
    };
    let mut stdout = io::stdout().lock();

    match cli.command {
        Command::Process {
            paths,
            format,
            write,
            max_passes,
            max_depth,
            workers,
        } => {
            let options = ProcessOptions {
                paths,
                config: cli.global.config,
                overrides: CliOverrides {
                    max_passes,
                    max_depth,
                    workers,
                },
                format: format.into(),
                write,
            };
            let report = run_process(&workspace, &options, &mut stdout)?;
            stdout.flush()?;
            Ok(exit_code(&report))
        }
        Command::Describe { configured } => {
            run_describe(
                &workspace,
                cli.global.config.as_deref(),
                configured,
                &mut stdout,
            )?;
            stdout.flush()?;
            Ok(0)
        }
    }
}
