use crate::config::load_config;
use crate::ir::ContentDocument;
use crate::layout::{LayoutStrategy, compute_layout};
use crate::layout_dump::write_layout_dump;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::Level;

#[derive(Parser, Debug)]
#[command(name = "mmlayout", version, about = "Radial and force-directed mind-map layout")]
pub struct Args {
    /// Input tree (.json) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file for the layout JSON. Defaults to stdout.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Layout engine
    #[arg(short = 's', long = "strategy", value_enum, default_value = "radial")]
    pub strategy: StrategyArg,

    /// Config file (JSON or JSON5); missing keys keep their defaults
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Log pipeline stages to stderr
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyArg {
    Radial,
    Force,
}

impl From<StrategyArg> for LayoutStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Radial => LayoutStrategy::Radial,
            StrategyArg::Force => LayoutStrategy::ForceDirected,
        }
    }
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = load_config(args.config.as_deref())?;
    let input = read_input(args.input.as_deref())?;
    let document = ContentDocument::from_json(&input).context("input is not a content tree")?;

    let layout = compute_layout(
        &document.root,
        &document.cross_links,
        args.strategy.into(),
        &config,
    )?;
    if let Some(convergence) = layout.diagnostics.convergence
        && !convergence.converged
    {
        tracing::warn!(
            max_force = convergence.max_force,
            "layout written from an unconverged simulation"
        );
    }
    write_layout_dump(args.output.as_deref(), &layout)
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    // A subscriber may already be installed when embedded; keep that one.
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .try_init();
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path
        && path != Path::new("-")
    {
        return std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()));
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}
