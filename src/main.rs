//! vistrack - replay a scripted page session through the tracker

use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;
use vistrack::model::AppError;

/// Replay a scripted page session and print every content capture as JSON
#[derive(Parser, Debug)]
#[command(name = "vistrack")]
#[command(version)]
#[command(about = "Replay a scripted page session through the viewport visibility tracker")]
pub struct Args {
    /// Path to the JSON scenario file
    pub scenario: PathBuf,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Interaction-free time before a capture, in milliseconds
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub quiet_period_ms: Option<u64>,

    /// Minimum intersection ratio for an element to count as visible
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Print each capture on a single line
    #[arg(long)]
    pub compact: bool,
}

fn main() -> Result<(), AppError> {
    let args = Args::parse();

    // Defaults → Config File → Env Vars → CLI Args
    let config = {
        let config_file = vistrack::config::load_config_with_precedence(args.config.clone())?;
        let merged = vistrack::config::merge_config(config_file);
        let with_env = vistrack::config::apply_env_overrides(merged);
        vistrack::config::apply_cli_overrides(with_env, args.threshold, args.quiet_period_ms)
    };
    config.tracker.validate()?;

    vistrack::logging::init(&config.log_file_path)?;
    info!(config = ?config, "Configuration loaded and resolved");

    let scenario = vistrack::replay::Scenario::load(&args.scenario)?;
    let captures = vistrack::replay::run(&scenario, &config.tracker)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for capture in &captures {
        let rendered = if args.compact {
            serde_json::to_string(capture)
        } else {
            serde_json::to_string_pretty(capture)
        }
        .map_err(std::io::Error::other)?;
        writeln!(out, "{rendered}")?;
    }

    Ok(())
}
