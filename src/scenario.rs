//! Run configuration loaded from a YAML scenario file.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;
use thiserror::Error;

use crate::board::Board;
use crate::dispersal::DispersalTable;
use crate::rng::master_stream;
use crate::species::SpeciesTable;

fn default_capacity() -> usize {
    50
}

fn default_census_interval_ticks() -> u64 {
    100
}

fn default_grid_interval_ticks() -> u64 {
    1000
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("snapshots")
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub seed: u64,
    pub species_table: PathBuf,
    pub dispersal_table: PathBuf,
    /// Stdev key selecting one dispersal-table row for the whole run.
    pub dispersal_stdev: u32,
    pub board_length: usize,
    /// Competition radius excluding self; 1 is a Moore neighborhood.
    pub competition_radius: usize,
    /// Initial plants per species.
    pub initial_count: usize,
    /// Seed resident adults instead of juveniles.
    #[serde(default)]
    pub seed_adults: bool,
    /// Occupant-list capacity per tile.
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    #[serde(default)]
    pub ticks: Option<u64>,
    #[serde(default = "default_census_interval_ticks")]
    pub census_interval_ticks: u64,
    #[serde(default = "default_grid_interval_ticks")]
    pub grid_interval_ticks: u64,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("scenario validation error: {0}")]
    Validation(String),
}

pub struct ScenarioLoader {
    base_dir: PathBuf,
}

impl ScenarioLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Scenario> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        let scenario: Scenario = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}

impl Scenario {
    pub fn validate(&self) -> Result<(), ScenarioError> {
        if self.board_length == 0 {
            return Err(ScenarioError::Validation(
                "board_length must be greater than zero".into(),
            ));
        }
        if self.capacity == 0 {
            return Err(ScenarioError::Validation(
                "capacity must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// Load both tables, select the dispersal kernel and seed the initial
    /// population. Table paths are resolved against `base_dir`.
    pub fn build_board(&self, base_dir: impl AsRef<Path>) -> Result<Board> {
        let base_dir = base_dir.as_ref();
        let species_path = base_dir.join(&self.species_table);
        let registry = SpeciesTable::load(&species_path)
            .with_context(|| format!("Failed to load species table {}", species_path.display()))?;

        let dispersal_path = base_dir.join(&self.dispersal_table);
        let table = DispersalTable::load(&dispersal_path).with_context(|| {
            format!("Failed to load dispersal table {}", dispersal_path.display())
        })?;
        let kernel = table.select(self.dispersal_stdev)?;

        let tile_count = self.board_length * self.board_length;
        let slots = if self.seed_adults {
            tile_count
        } else {
            tile_count * self.capacity
        };
        if registry.len() * self.initial_count > slots {
            return Err(ScenarioError::Validation(format!(
                "initial population ({} species x {}) exceeds available slots ({slots})",
                registry.len(),
                self.initial_count
            ))
            .into());
        }

        let mut board = Board::new(
            registry,
            kernel,
            self.board_length,
            self.competition_radius,
            self.capacity,
            self.seed,
        );
        let mut rng = master_stream(self.seed);
        if self.seed_adults {
            board.seed_adults(self.initial_count, &mut rng);
        } else {
            board.seed_juveniles(self.initial_count, &mut rng);
        }
        Ok(board)
    }

    pub fn ticks(&self, override_ticks: Option<u64>) -> u64 {
        override_ticks.or(self.ticks).unwrap_or(1000)
    }
}
