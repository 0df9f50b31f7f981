#![forbid(unsafe_code)]

use std::error::Error;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use rayon::prelude::{IntoParallelRefIterator, ParallelIterator};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use rustle_config::ToolchainConfig;
use rustle_engine::{
    coverage, load_unit, ninja, templates_from_config, BuildAction, CrateActions,
};
use rustle_rustc::{CrateKind, RuleTemplates};

type CliResult = Result<(), Box<dyn Error>>;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "RUSTLE_LOG";

#[derive(Debug, Parser)]
#[command(name = "rustle", about = "Synthesize build actions for Rust compilation units")]
#[command(version)]
struct Cli {
    /// Log action synthesis at debug level
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Build actions for one or more unit manifests
    Plan {
        /// Paths to rustle.toml unit manifests
        #[arg(required = true)]
        manifests: Vec<PathBuf>,
        /// Toolchain config (defaults apply when omitted)
        #[arg(long)]
        toolchain: Option<PathBuf>,
        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Ninja)]
        format: Format,
        /// Archive every unit's coverage notes into BASE.zip
        #[arg(long, value_name = "BASE")]
        coverage_zip: Option<String>,
        /// Write to this file instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },
    /// Emit the archive action for a set of coverage notes
    Archive {
        /// Archive base name; `.zip` is appended
        #[arg(long)]
        base: String,
        /// Coverage notes files to archive
        #[arg(required = true)]
        notes: Vec<PathBuf>,
        /// Toolchain config (defaults apply when omitted)
        #[arg(long)]
        toolchain: Option<PathBuf>,
        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Ninja)]
        format: Format,
    },
    /// List crate kinds and whether each is built with LTO
    Kinds,
    /// Print the host target triple
    Host,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// A ninja build file
    Ninja,
    /// A JSON array of actions with their commands and digests
    Json,
    /// The command line of each action
    Commands,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Command::Plan {
            manifests,
            toolchain,
            format,
            coverage_zip,
            output,
        } => cmd_plan(
            &manifests,
            toolchain.as_deref(),
            format,
            coverage_zip.as_deref(),
            output.as_deref(),
        ),
        Command::Archive {
            base,
            notes,
            toolchain,
            format,
        } => cmd_archive(&base, &notes, toolchain.as_deref(), format),
        Command::Kinds => {
            cmd_kinds();
            Ok(())
        }
        Command::Host => cmd_host(),
    };

    if let Err(msg) = result {
        eprintln!("error: {msg}");
        process::exit(1);
    }
}

/// `--verbose` wins over `RUSTLE_LOG`; otherwise the filter defaults to `warn`.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn cmd_plan(
    manifests: &[PathBuf],
    toolchain: Option<&Path>,
    format: Format,
    coverage_zip: Option<&str>,
    output: Option<&Path>,
) -> CliResult {
    let config = ToolchainConfig::load(toolchain)?;
    let templates = templates_from_config(&config);

    let units: Vec<CrateActions> = manifests
        .par_iter()
        .map(|path| load_unit(path, &config).map(|unit| unit.build(&templates)))
        .collect::<Result<_, _>>()?;
    for unit in &units {
        tracing::debug!(
            output = %unit.output.output_file.display(),
            coverage = unit.output.coverage.is_some(),
            "planned unit"
        );
    }

    let notes: Vec<PathBuf> = units
        .iter()
        .filter_map(|u| u.output.coverage.as_ref())
        .map(|c| c.notes.clone())
        .collect();
    let mut actions: Vec<BuildAction> = units
        .into_iter()
        .flat_map(CrateActions::into_actions)
        .collect();
    if let Some(base) = coverage_zip {
        match coverage::archive(&notes, base) {
            Some(archive) => actions.push(archive),
            None => tracing::warn!("no unit enables coverage; {base}.zip not planned"),
        }
    }

    let text = render(&templates, &actions, format)?;
    match output {
        Some(path) => {
            rustle_util::fs::write_atomic(path, &text)?;
            eprintln!("    Wrote {} actions to {}", actions.len(), path.display());
        }
        None => print!("{text}"),
    }
    Ok(())
}

fn cmd_archive(
    base: &str,
    notes: &[PathBuf],
    toolchain: Option<&Path>,
    format: Format,
) -> CliResult {
    let config = ToolchainConfig::load(toolchain)?;
    let templates = templates_from_config(&config);
    let archive = coverage::archive(notes, base).ok_or("no coverage notes given")?;
    print!("{}", render(&templates, &[archive], format)?);
    Ok(())
}

fn cmd_kinds() {
    for kind in CrateKind::ALL {
        let lto = if kind.wants_lto() { "lto" } else { "-" };
        println!("{:<12} {:<12} {lto}", kind.name(), kind.rustc_crate_type());
    }
}

fn cmd_host() -> CliResult {
    println!("{}", rustle_targets::host_target()?);
    Ok(())
}

/// An action as printed by `--format json`.
#[derive(Debug, Serialize)]
struct PlannedAction<'a> {
    #[serde(flatten)]
    action: &'a BuildAction,
    command: String,
    digest: String,
}

fn render(
    templates: &RuleTemplates,
    actions: &[BuildAction],
    format: Format,
) -> Result<String, Box<dyn Error>> {
    let text = match format {
        Format::Ninja => ninja::write_graph(templates, actions),
        Format::Commands => actions
            .iter()
            .map(|a| format!("{}\n", a.command(templates)))
            .collect(),
        Format::Json => {
            let planned: Vec<PlannedAction<'_>> = actions
                .iter()
                .map(|action| PlannedAction {
                    action,
                    command: action.command(templates),
                    digest: action.digest(),
                })
                .collect();
            let mut json = serde_json::to_string_pretty(&planned)?;
            json.push('\n');
            json
        }
    };
    Ok(text)
}
