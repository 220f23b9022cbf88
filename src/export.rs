//! Periodic delimited-text snapshots of the board.
//!
//! The census snapshot reuses the species table's own column layout: every
//! raw row is re-emitted with the adult count, juvenile count and a
//! `#`-joined list of resident-adult ages written into dedicated columns.
//! The grid snapshot is one row per board row, one field per tile, holding
//! the resident adult's species id or `-1`.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::board::Board;

/// Columns of the census layout overwritten per export.
const ADULT_COLUMN: usize = 10;
const JUVENILE_COLUMN: usize = 11;
const AGES_COLUMN: usize = 12;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("snapshot io error: {0}")]
    Io(#[from] std::io::Error),
}

pub struct SnapshotWriter {
    output_dir: PathBuf,
    census_interval_ticks: u64,
    grid_interval_ticks: u64,
}

impl SnapshotWriter {
    pub fn new(
        output_dir: impl AsRef<Path>,
        census_interval_ticks: u64,
        grid_interval_ticks: u64,
    ) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            census_interval_ticks,
            grid_interval_ticks,
        }
    }

    /// Write whichever snapshots are due at `tick`. An interval of zero
    /// disables that snapshot kind.
    pub fn maybe_write(&self, tick: u64, board: &Board) -> Result<Vec<PathBuf>, ExportError> {
        let mut written = Vec::new();
        if self.census_interval_ticks != 0 && tick % self.census_interval_ticks == 0 {
            written.push(self.write_census(tick, board)?);
        }
        if self.grid_interval_ticks != 0 && tick % self.grid_interval_ticks == 0 {
            written.push(self.write_grid(tick, board)?);
        }
        Ok(written)
    }

    pub fn write_census(&self, tick: u64, board: &Board) -> Result<PathBuf, ExportError> {
        fs::create_dir_all(&self.output_dir)?;
        let census = board.census();

        let mut out = String::new();
        out.push_str(board.registry().header());
        out.push('\n');
        for (id, raw) in board.registry().raw_rows() {
            let mut fields: Vec<String> = raw.split(',').map(str::to_string).collect();
            while fields.len() <= AGES_COLUMN {
                fields.push(String::new());
            }
            match census.get(id) {
                Some(entry) => {
                    fields[ADULT_COLUMN] = entry.adults.to_string();
                    fields[JUVENILE_COLUMN] = entry.juveniles.to_string();
                    fields[AGES_COLUMN] = entry
                        .adult_ages
                        .iter()
                        .map(u32::to_string)
                        .collect::<Vec<_>>()
                        .join("#");
                }
                None => {
                    fields[ADULT_COLUMN] = "0".to_string();
                    fields[JUVENILE_COLUMN] = "0".to_string();
                    fields[AGES_COLUMN] = String::new();
                }
            }
            out.push_str(&fields.join(","));
            out.push('\n');
        }

        let path = self.output_dir.join(format!("census_{tick:06}.csv"));
        fs::write(&path, out)?;
        Ok(path)
    }

    pub fn write_grid(&self, tick: u64, board: &Board) -> Result<PathBuf, ExportError> {
        fs::create_dir_all(&self.output_dir)?;
        let mut out = String::new();
        for row in board.occupancy_rows() {
            let line: Vec<String> = row.iter().map(i32::to_string).collect();
            out.push_str(&line.join(","));
            out.push('\n');
        }
        let path = self.output_dir.join(format!("grid_{tick:06}.csv"));
        fs::write(&path, out)?;
        Ok(path)
    }
}
