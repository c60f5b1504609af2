use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use dynarepo_core::{KeySchema, KeySchemaProvider, PlannerConfig};
use tracing::info;

mod commands;
mod display;
mod error;
mod executor;

use display::OutputMode;
use error::ConsoleError;
use executor::{CommandResult, Context};

/// DynaRepo Console: show how condition sets resolve to store requests.
#[derive(Parser, Debug)]
#[command(name = "dynarepo-console", version)]
struct Cli {
    /// Key schema JSON file.
    #[arg(short, long)]
    schema: PathBuf,

    /// Planner configuration JSON file (defaults apply when omitted).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Execute a command non-interactively (can be repeated).
    #[arg(short, long = "exec")]
    exec: Vec<String>,

    /// Output results as machine-parseable JSON.
    #[arg(short, long)]
    json: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let ctx = match load_context(&cli.schema, cli.config.as_deref()) {
        Ok(ctx) => ctx,
        Err(e) => {
            display::print_error(&e);
            process::exit(1);
        }
    };
    info!(
        schema = %cli.schema.display(),
        indexes = ctx.schema.indexes().len(),
        "loaded key schema"
    );

    let mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Pretty
    };
    let code = if !cli.exec.is_empty() {
        run_exec_mode(&ctx, &cli.exec, &mode)
    } else {
        run_pipe_mode(&ctx, std::io::stdin().lock(), &mode)
    };
    process::exit(code);
}

/// Load the key schema and planner configuration.
fn load_context(schema: &Path, config: Option<&Path>) -> Result<Context, ConsoleError> {
    let bytes = std::fs::read(schema)?;
    let schema: KeySchema = serde_json::from_slice(&bytes)?;
    let config = match config {
        Some(path) => PlannerConfig::from_json_file(path)?,
        None => PlannerConfig::default(),
    };
    Ok(Context { schema, config })
}

/// Execute one or more commands non-interactively (--exec mode).
///
/// Returns exit code: 0 = all succeeded, 1 = first error stops execution.
fn run_exec_mode(ctx: &Context, commands: &[String], mode: &OutputMode) -> i32 {
    for cmd_str in commands {
        match run_one(ctx, cmd_str) {
            Ok(result) => {
                if !display::render(&result, mode) {
                    return 0;
                }
            }
            Err(e) => {
                display::render_error(&e, mode);
                return 1;
            }
        }
    }
    0
}

/// Read commands line by line (pipe mode).
///
/// Returns exit code: 0 = all succeeded, 1 = first error.
fn run_pipe_mode(ctx: &Context, input: impl BufRead, mode: &OutputMode) -> i32 {
    for line in input.lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                display::render_error(&e, mode);
                return 1;
            }
        };

        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        match run_one(ctx, trimmed) {
            Ok(result) => {
                if !display::render(&result, mode) {
                    return 0; // EXIT command
                }
            }
            Err(e) => {
                display::render_error(&e, mode);
                return 1;
            }
        }
    }
    0
}

fn run_one(ctx: &Context, input: &str) -> Result<CommandResult, ConsoleError> {
    let cmd = commands::parse(input)?;
    executor::execute(ctx, cmd)
}
