//! Tick scheduler: a persistent worker pool driving the board's two-phase
//! tick, with periodic snapshot export.

use std::path::PathBuf;

use anyhow::Result;

use crate::board::Board;
use crate::export::SnapshotWriter;

pub struct EngineSettings {
    pub scenario_name: String,
    pub census_interval_ticks: u64,
    pub grid_interval_ticks: u64,
    pub output_dir: PathBuf,
    /// Worker threads for the compute/commit phases; `None` sizes the pool to
    /// available hardware parallelism.
    pub threads: Option<usize>,
}

pub struct Engine {
    pool: rayon::ThreadPool,
    snapshot_writer: SnapshotWriter,
    settings: EngineSettings,
}

#[derive(Clone, Debug)]
pub struct RunSummary {
    pub ticks: u64,
    pub adults: u64,
    pub juveniles: u64,
    pub snapshots: Vec<PathBuf>,
}

impl Engine {
    pub fn new(settings: EngineSettings) -> Result<Self> {
        // One pool for the whole run; each par_iter pass inside a tick joins
        // fully before the next phase starts.
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(settings.threads.unwrap_or(0))
            .build()?;
        let snapshot_writer = SnapshotWriter::new(
            &settings.output_dir,
            settings.census_interval_ticks,
            settings.grid_interval_ticks,
        );
        Ok(Self {
            pool,
            snapshot_writer,
            settings,
        })
    }

    pub fn scenario_name(&self) -> &str {
        &self.settings.scenario_name
    }

    /// Run the board for `ticks` ticks. Any export failure aborts the run;
    /// the last committed board state remains observable on `board`.
    pub fn run(&mut self, board: &mut Board, ticks: u64) -> Result<RunSummary> {
        let mut snapshots = Vec::new();
        for _ in 0..ticks {
            self.pool.install(|| board.step());
            let written = self.snapshot_writer.maybe_write(board.tick(), board)?;
            snapshots.extend(written);
        }

        let census = board.census();
        Ok(RunSummary {
            ticks,
            adults: census.values().map(|c| u64::from(c.adults)).sum(),
            juveniles: census.values().map(|c| u64::from(c.juveniles)).sum(),
            snapshots,
        })
    }
}
