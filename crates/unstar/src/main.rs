//! Binary entry point for the unstar CLI.
//!
//! ## Usage
//!
//! ```bash
//! # Rewrite every wildcard import under a package directory
//! unstar path/to/pkg
//!
//! # Preview the changes as a unified diff
//! unstar path/to/pkg --dry-run
//!
//! # Machine-readable report, no formatter
//! unstar path/to/pkg --no-format --format json
//! ```

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};

use unstar::cli::{run_unstar, RunRequest};
use unstar::splash::show_splash;
use unstar_core::error::{OutputErrorCode, UnstarError};
use unstar_core::output::{emit_response, ErrorResponse};

// ============================================================================
// CLI Structure
// ============================================================================

/// Rewrite Python wildcard imports into explicit import lists.
///
/// Every `from module import *` under PATH is replaced by an explicit list
/// of the names it binds, taken from the module's `__all__`, inferred from
/// its own imports, or narrowed to the names the file actually uses.
#[derive(Parser, Debug)]
#[command(name = "unstar", version, about = "Rewrite Python wildcard imports into explicit import lists")]
struct Cli {
    /// Directory to process.
    path: PathBuf,

    /// Dotted package name of PATH (default: the directory name).
    #[arg(short = 'm', long)]
    module: Option<String>,

    /// Don't write changes to disk. Instead, print a diff.
    #[arg(short = 'd', long)]
    dry_run: bool,

    /// Don't infer export lists from a module's imports when it has no `__all__`.
    #[arg(long)]
    no_infer_imports: bool,

    /// Also infer public top-level definitions of modules without `__all__`.
    #[arg(long)]
    infer_definitions: bool,

    /// Never run the Python interpreter to introspect compiled libraries.
    #[arg(long)]
    no_introspect: bool,

    /// Don't run the formatter after processing.
    #[arg(long)]
    no_format: bool,

    /// Python interpreter to use for library lookup.
    #[arg(long)]
    python: Option<PathBuf>,

    /// Report format.
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Log level for tracing output.
    #[arg(long, value_enum, default_value = "warn")]
    log_level: LogLevel,

    /// Don't print the banner.
    #[arg(short = 'q', long)]
    quiet: bool,
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

/// Output format for the final report.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Short human-readable summary.
    #[default]
    Text,
    /// JSON run report.
    Json,
}

impl Cli {
    fn request(&self) -> RunRequest {
        RunRequest {
            path: self.path.clone(),
            module: self.module.clone(),
            dry_run: self.dry_run,
            no_infer_imports: self.no_infer_imports,
            infer_definitions: self.infer_definitions,
            no_introspect: self.no_introspect,
            no_format: self.no_format,
            python: self.python.clone(),
        }
    }
}

// ============================================================================
// Main
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.log_level);

    if !cli.quiet && cli.format == OutputFormat::Text {
        show_splash();
    }

    match execute(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let error_code = OutputErrorCode::from(&err);
            match cli.format {
                OutputFormat::Json => {
                    let _ = emit_response(&ErrorResponse::new(&err), &mut io::stdout());
                    let _ = io::stdout().flush();
                }
                OutputFormat::Text => {
                    eprintln!("error: {}", err);
                }
            }
            ExitCode::from(error_code.code())
        }
    }
}

/// Initialize tracing subscriber.
fn init_tracing(level: LogLevel) {
    use tracing_subscriber::fmt::format::FmtSpan;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Run and print the report.
fn execute(cli: &Cli) -> Result<(), UnstarError> {
    let request = cli.request();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let report = match cli.format {
        OutputFormat::Text => run_unstar(&request, &mut out)?,
        // Keep stdout pure JSON; diffs go to stderr.
        OutputFormat::Json => run_unstar(&request, &mut io::stderr())?,
    };

    let written = match cli.format {
        OutputFormat::Text => report.render_text(&mut out),
        OutputFormat::Json => emit_response(&report, &mut out),
    };
    written
        .and_then(|_| out.flush())
        .map_err(|e| UnstarError::internal(format!("failed to write report: {}", e)))
}
