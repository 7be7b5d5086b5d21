use anyhow::{Context, bail};
use clap::Parser;
use fleetgrid::{
    Config, Grid, Loader, PositionRecord, ResolvedVehicle, SearchMode, SearchRequest,
    VehicleRegistry, search_all,
};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant, UNIX_EPOCH};

/// Find the vehicle closest to each search location in a binary position feed.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Binary input file of 30-byte position records
    #[arg(short, long, default_value = "./data/VehiclePositions.dat")]
    input: PathBuf,

    /// JSON file with the list of locations to search
    #[arg(short, long, default_value = "./search1.json")]
    search: PathBuf,

    /// Maximum number of records to read (0 = whole file)
    #[arg(short, long, default_value_t = 0)]
    limit: usize,

    /// Configuration file (JSON, or TOML with the `toml` feature)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Group records per vehicle and search their positions at this unix time
    #[arg(long, conflicts_with = "latest")]
    at: Option<u64>,

    /// Group records per vehicle and search their latest positions
    #[arg(long)]
    latest: bool,

    /// Fail on a truncated input file instead of ignoring the tail
    #[arg(long)]
    strict: bool,

    /// Exhaustive search instead of the fast approximate one
    #[arg(long)]
    exact: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::from_path(path)
            .with_context(|| format!("cannot load --config={}", path.display()))?,
        None => Config::default(),
    };
    if args.limit > 0 {
        config.load.limit = args.limit;
    }
    config.load.strict |= args.strict;

    let requests = read_requests(&args)?;
    let mode = if args.exact {
        SearchMode::Exact
    } else {
        SearchMode::Approximate
    };
    let loader = Loader::new(config.load.clone());

    let started = Instant::now();
    let output = if args.at.is_some() || args.latest {
        let mut registry = VehicleRegistry::new();
        loader
            .load_tracks(&args.input, &mut registry)
            .with_context(|| format!("cannot load --input={}", args.input.display()))?;

        let (mut grid, stats) = match args.at {
            Some(secs) => registry
                .grid_at_with_config(UNIX_EPOCH + Duration::from_secs(secs), config.grid)?,
            None => registry.grid_latest_with_config(config.grid)?,
        };
        log::info!(
            "Load and grid took {:?} ({} placed, {} skipped)",
            started.elapsed(),
            stats.inserted,
            stats.skipped
        );
        run(&mut grid, &requests, mode, |entry| ResolvedVehicle::from(entry))?
    } else {
        let mut grid: Grid<PositionRecord> = Grid::with_config(config.grid);
        loader
            .load_direct(&args.input, &mut grid)
            .with_context(|| format!("cannot load --input={}", args.input.display()))?;
        log::info!("Load and grid took {:?}", started.elapsed());
        run(&mut grid, &requests, mode, |entry| entry.payload.clone())?
    };

    println!("{}", output);
    Ok(())
}

fn read_requests(args: &Args) -> anyhow::Result<Vec<SearchRequest>> {
    let json = fs::read_to_string(&args.search)
        .with_context(|| format!("cannot open --search={}", args.search.display()))?;
    let requests: Vec<SearchRequest> = serde_json::from_str(&json)
        .with_context(|| format!("cannot read JSON from --search={}", args.search.display()))?;
    if requests.is_empty() {
        bail!("no locations to search inside --search={}", args.search.display());
    }
    Ok(requests)
}

fn run<T, V, F>(
    grid: &mut Grid<T>,
    requests: &[SearchRequest],
    mode: SearchMode,
    project: F,
) -> anyhow::Result<String>
where
    V: Serialize,
    F: FnMut(&fleetgrid::Entry<T>) -> V,
{
    let started = Instant::now();
    let results = search_all(grid, requests, mode, project);
    log::info!("Search took {:?}", started.elapsed());
    Ok(serde_json::to_string(&results)?)
}
