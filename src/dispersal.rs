//! Dispersal profile table and the weight vector selected for a run.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::species::SpeciesId;

#[derive(Debug, Error)]
pub enum DispersalTableError {
    #[error("failed to read dispersal table: {0}")]
    Io(#[from] std::io::Error),
    #[error("dispersal table is missing a header line")]
    MissingHeader,
    #[error("dispersal table line {line}: expected mean, stdev and at least one weight")]
    ColumnCount { line: usize },
    #[error("dispersal table line {line}: unable to parse '{value}' as {kind}")]
    BadValue {
        line: usize,
        value: String,
        kind: &'static str,
    },
    #[error("dispersal table line {line}: negative weight {value}")]
    NegativeWeight { line: usize, value: f64 },
    #[error("dispersal table has no row for stdev {0}")]
    UnknownStdev(u32),
}

/// One row of the dispersal table: the distance-bucket weights for a single
/// spread width. Bucket 0 is the source tile itself.
#[derive(Debug, Clone, PartialEq)]
pub struct DispersalKernel {
    weights: Vec<f64>,
}

impl DispersalKernel {
    pub fn new(weights: Vec<f64>) -> Self {
        Self { weights }
    }

    /// Dispersal radius excluding self.
    pub fn radius(&self) -> usize {
        self.weights.len() - 1
    }

    pub fn weight(&self, distance: usize) -> f64 {
        self.weights[distance]
    }
}

/// All rows keyed by stdev; exactly one row is selected per run.
#[derive(Debug, Clone)]
pub struct DispersalTable {
    rows: HashMap<u32, Vec<f64>>,
}

impl DispersalTable {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DispersalTableError> {
        let text = fs::read_to_string(path)?;
        Self::from_str(&text)
    }

    pub fn from_str(text: &str) -> Result<Self, DispersalTableError> {
        let mut lines = text.lines().enumerate();
        lines.next().ok_or(DispersalTableError::MissingHeader)?;

        let mut rows = HashMap::new();
        for (index, line) in lines {
            if line.trim().is_empty() {
                continue;
            }
            let line_no = index + 1;
            let fields: Vec<&str> = line.split(',').collect();
            if fields.len() < 3 {
                return Err(DispersalTableError::ColumnCount { line: line_no });
            }
            // Column 0 is the mean, kept only as a row label.
            let stdev = fields[1].trim().parse::<u32>().map_err(|_| {
                DispersalTableError::BadValue {
                    line: line_no,
                    value: fields[1].to_string(),
                    kind: "integer",
                }
            })?;
            let mut weights = Vec::with_capacity(fields.len() - 2);
            for field in &fields[2..] {
                let weight =
                    field
                        .trim()
                        .parse::<f64>()
                        .map_err(|_| DispersalTableError::BadValue {
                            line: line_no,
                            value: field.to_string(),
                            kind: "float",
                        })?;
                if weight < 0.0 {
                    return Err(DispersalTableError::NegativeWeight {
                        line: line_no,
                        value: weight,
                    });
                }
                weights.push(weight);
            }
            rows.insert(stdev, weights);
        }

        Ok(Self { rows })
    }

    pub fn select(&self, stdev: u32) -> Result<DispersalKernel, DispersalTableError> {
        self.rows
            .get(&stdev)
            .cloned()
            .map(DispersalKernel::new)
            .ok_or(DispersalTableError::UnknownStdev(stdev))
    }
}

/// Cumulative probability table for inverse-CDF species sampling, built from
/// per-species dispersal weights normalized by their grand total.
pub fn cumulative_table(weights: &[(SpeciesId, f64)], total: f64) -> Vec<(f64, SpeciesId)> {
    let mut table = Vec::with_capacity(weights.len());
    let mut cumulative = 0.0;
    for &(id, weight) in weights {
        cumulative += weight;
        table.push((cumulative / total, id));
    }
    table
}

/// Select the species whose cumulative bucket is the smallest one ≥ `draw`.
pub fn sample_species(table: &[(f64, SpeciesId)], draw: f64) -> SpeciesId {
    let index = table.partition_point(|&(bound, _)| bound < draw);
    // Rounding can leave the final bound a hair under 1.0.
    table[index.min(table.len() - 1)].1
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "\
mean,stdev,d0,d1,d2
0,1,0.6,0.3,0.1
0,5,0.2,0.3,0.5
";

    #[test]
    fn selects_row_by_stdev() {
        let table = DispersalTable::from_str(TABLE).unwrap();
        let kernel = table.select(5).unwrap();
        assert_eq!(kernel.radius(), 2);
        assert!((kernel.weight(0) - 0.2).abs() < 1e-12);
        assert!((kernel.weight(2) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn unknown_stdev_is_an_error() {
        let table = DispersalTable::from_str(TABLE).unwrap();
        assert!(matches!(
            table.select(9).unwrap_err(),
            DispersalTableError::UnknownStdev(9)
        ));
    }

    #[test]
    fn rejects_negative_weights() {
        let bad = "mean,stdev,d0\n0,1,-0.5\n";
        assert!(matches!(
            DispersalTable::from_str(bad).unwrap_err(),
            DispersalTableError::NegativeWeight { .. }
        ));
    }

    #[test]
    fn sampling_picks_matching_bucket() {
        let table = cumulative_table(&[(1, 0.3), (2, 0.7)], 1.0);
        assert_eq!(sample_species(&table, 0.0), 1);
        assert_eq!(sample_species(&table, 0.29), 1);
        assert_eq!(sample_species(&table, 0.31), 2);
        assert_eq!(sample_species(&table, 0.999), 2);
    }

    #[test]
    fn sampling_clamps_rounding_overshoot() {
        // Bounds that sum to slightly under 1.0 must still map the top of the
        // unit interval to the last species.
        let table = vec![(0.3, 1), (0.9999999999999999, 2)];
        assert_eq!(sample_species(&table, 0.99999999999999999), 2);
    }
}
