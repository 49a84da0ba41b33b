// src/main.rs
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use tessera::Fixture;
use tessera_layout::{Config, Direction, Errata, ExperimentalFeatures, UNDEFINED};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the layout fixture
    #[arg(value_name = "FILE")]
    fixture: PathBuf,

    /// Available width for the root (unbounded when omitted)
    #[arg(long)]
    width: Option<f32>,

    /// Available height for the root (unbounded when omitted)
    #[arg(long)]
    height: Option<f32>,

    /// Direction the root inherits
    #[arg(long, default_value = "ltr")]
    direction: Direction,

    /// Physical pixels per layout point, 0 disables rounding
    #[arg(long, default_value = "1")]
    point_scale_factor: f32,

    /// Use web defaults (row direction, shrink 1, content-box alignment)
    #[arg(long)]
    web_defaults: bool,

    /// Compatibility errata: none, classic, all or a single erratum name
    #[arg(long, default_value = "none")]
    errata: Errata,

    /// Resolve flex basis the way browsers do
    #[arg(long)]
    web_flex_basis: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    if !args.fixture.exists() {
        bail!("Fixture not found: {}", args.fixture.display());
    }
    let source = fs::read_to_string(&args.fixture)
        .with_context(|| format!("Failed to read fixture {}", args.fixture.display()))?;

    let config = Rc::new(Config::new());
    config
        .set_point_scale_factor(args.point_scale_factor)
        .context("Invalid point scale factor")?;
    config.set_use_web_defaults(args.web_defaults)?;
    config.set_errata(args.errata);
    config.set_experimental_feature_enabled(ExperimentalFeatures::WEB_FLEX_BASIS, args.web_flex_basis);

    let mut fixture = Fixture::parse(&source, config)
        .with_context(|| format!("Failed to parse fixture {}", args.fixture.display()))?;
    info!("Loaded {} nodes from {}", fixture.tree.len(), args.fixture.display());

    let root = fixture.root;
    fixture
        .tree
        .calculate_layout(
            root,
            args.width.unwrap_or(UNDEFINED),
            args.height.unwrap_or(UNDEFINED),
            args.direction,
        )
        .context("Layout failed")?;

    let stats = fixture.tree.last_layout_stats();
    debug!(
        "Layout stats: {} layouts, {} measures, {} cache hits, {} measure callbacks",
        stats.layouts,
        stats.measures,
        stats.cached_layouts + stats.cached_measures,
        stats.measure_callbacks
    );

    print!("{}", fixture.render());
    Ok(())
}
