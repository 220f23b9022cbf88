use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use canopy::{
    engine::{Engine, EngineSettings},
    scenario::ScenarioLoader,
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Spatial plant community simulator")]
struct Cli {
    /// Path to the scenario YAML file
    #[arg(long, default_value = "scenarios/baseline.yaml")]
    scenario: PathBuf,

    /// Override tick count (uses scenario default when omitted)
    #[arg(long)]
    ticks: Option<u64>,

    /// Override the random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Directory for snapshots
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Worker threads (defaults to available parallelism)
    #[arg(long)]
    threads: Option<usize>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let loader = ScenarioLoader::new(".");
    let mut scenario = loader.load(&cli.scenario)?;
    if let Some(seed) = cli.seed {
        scenario.seed = seed;
    }
    if let Some(dir) = cli.output_dir {
        scenario.output_dir = dir;
    }

    let mut board = scenario.build_board(loader.base_dir())?;
    let ticks = scenario.ticks(cli.ticks);
    println!(
        "Board created: {}x{} tiles, {} species. Starting iterations...",
        board.side(),
        board.side(),
        board.registry().len()
    );

    let settings = EngineSettings {
        scenario_name: scenario.name.clone(),
        census_interval_ticks: scenario.census_interval_ticks,
        grid_interval_ticks: scenario.grid_interval_ticks,
        output_dir: scenario.output_dir.clone(),
        threads: cli.threads,
    };
    let mut engine = Engine::new(settings)?;
    let summary = engine.run(&mut board, ticks)?;

    println!(
        "Scenario '{}' completed for {} ticks. Final population: {} adults, {} juveniles ({} snapshots written)",
        scenario.name,
        summary.ticks,
        summary.adults,
        summary.juveniles,
        summary.snapshots.len()
    );
    Ok(())
}
