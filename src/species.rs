//! Species registry parsed from the delimited species table.
//!
//! The raw header and rows are retained verbatim because the census export
//! reuses the table's column layout.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use thiserror::Error;

pub type SpeciesId = i32;

/// Immutable per-species parameters. `parent_id` is carried in raw form for
/// export only and never consulted by the simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct Species {
    pub id: SpeciesId,
    /// Juvenile maturation age threshold.
    pub t1: u32,
    /// Juvenile survival/establishment rate.
    pub p1: f64,
    pub seed_per_tick: f64,
    /// Adult-related threshold, carried through but unused by survival logic.
    pub t2: u32,
    /// Adult baseline survival rate.
    pub p2: f64,
    pub adult_per_tick: f64,
    pub con_ndd: f64,
    pub het_ndd: f64,
}

#[derive(Debug, Error)]
pub enum SpeciesTableError {
    #[error("failed to read species table: {0}")]
    Io(#[from] std::io::Error),
    #[error("species table is missing a header line")]
    MissingHeader,
    #[error("species table defines no species")]
    Empty,
    #[error("species table line {line}: expected at least {expected} columns, found {found}")]
    ColumnCount {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("species table line {line}: unable to parse '{value}' as {kind}")]
    BadValue {
        line: usize,
        value: String,
        kind: &'static str,
    },
    #[error("species table line {line}: duplicate species id {id}")]
    DuplicateId { line: usize, id: SpeciesId },
}

/// The parsed registry plus the verbatim text it came from.
#[derive(Debug, Clone)]
pub struct SpeciesTable {
    species: HashMap<SpeciesId, Species>,
    header: String,
    raw_rows: Vec<(SpeciesId, String)>,
}

const MIN_COLUMNS: usize = 10;

impl SpeciesTable {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SpeciesTableError> {
        let text = fs::read_to_string(path)?;
        Self::from_str(&text)
    }

    pub fn from_str(text: &str) -> Result<Self, SpeciesTableError> {
        let mut lines = text.lines().enumerate();
        let header = lines
            .next()
            .map(|(_, line)| line.to_string())
            .ok_or(SpeciesTableError::MissingHeader)?;

        let mut species = HashMap::new();
        let mut raw_rows = Vec::new();
        for (index, line) in lines {
            if line.trim().is_empty() {
                continue;
            }
            let parsed = parse_row(line, index + 1)?;
            if species.contains_key(&parsed.id) {
                return Err(SpeciesTableError::DuplicateId {
                    line: index + 1,
                    id: parsed.id,
                });
            }
            raw_rows.push((parsed.id, line.to_string()));
            species.insert(parsed.id, parsed);
        }

        if species.is_empty() {
            return Err(SpeciesTableError::Empty);
        }

        Ok(Self {
            species,
            header,
            raw_rows,
        })
    }

    pub fn get(&self, id: SpeciesId) -> Option<&Species> {
        self.species.get(&id)
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }

    /// Species ids in ascending order. Iteration over the registry must be
    /// deterministic wherever it feeds random draws.
    pub fn ids(&self) -> Vec<SpeciesId> {
        let mut ids: Vec<_> = self.species.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    /// Raw rows in file order, each paired with its species id.
    pub fn raw_rows(&self) -> &[(SpeciesId, String)] {
        &self.raw_rows
    }
}

fn parse_row(line: &str, line_no: usize) -> Result<Species, SpeciesTableError> {
    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() < MIN_COLUMNS {
        return Err(SpeciesTableError::ColumnCount {
            line: line_no,
            expected: MIN_COLUMNS,
            found: fields.len(),
        });
    }

    let int = |value: &str| -> Result<i64, SpeciesTableError> {
        value
            .trim()
            .parse::<i64>()
            .map_err(|_| SpeciesTableError::BadValue {
                line: line_no,
                value: value.to_string(),
                kind: "integer",
            })
    };
    let float = |value: &str| -> Result<f64, SpeciesTableError> {
        value
            .trim()
            .parse::<f64>()
            .map_err(|_| SpeciesTableError::BadValue {
                line: line_no,
                value: value.to_string(),
                kind: "float",
            })
    };

    // Column order: speciesId, parentId, t1, p1, seedPerTick, t2, p2,
    // adultPerTick, conNDD, hetNDD. parentId stays in the raw row only.
    let id = int(fields[0])? as SpeciesId;
    int(fields[1])?;
    let t1 = int(fields[2])?.max(0) as u32;
    let p1 = float(fields[3])?;
    let seed_per_tick = float(fields[4])?;
    let t2 = int(fields[5])?.max(0) as u32;
    let p2 = float(fields[6])?;
    let adult_per_tick = float(fields[7])?;
    let con_ndd = float(fields[8])?;
    let het_ndd = float(fields[9])?;

    Ok(Species {
        id,
        t1,
        p1,
        seed_per_tick,
        t2,
        p2,
        adult_per_tick,
        con_ndd,
        het_ndd,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "\
speciesID,parentID,t1,p1,seedPerTick,t2,p2,adultPerTick,CNDD,HNDD,Adult,Juvenile,Ages
1,0,3,0.9,0.5,10,0.95,0.2,0.01,0.005,0,0,
2,0,4,0.8,0.4,12,0.9,0.3,0.02,0.004,0,0,
";

    #[test]
    fn parses_all_rows() {
        let table = SpeciesTable::from_str(TABLE).unwrap();
        assert_eq!(table.len(), 2);
        let one = table.get(1).unwrap();
        assert_eq!(one.t1, 3);
        assert!((one.p1 - 0.9).abs() < 1e-12);
        assert!((one.het_ndd - 0.005).abs() < 1e-12);
        assert_eq!(table.ids(), vec![1, 2]);
    }

    #[test]
    fn retains_raw_layout() {
        let table = SpeciesTable::from_str(TABLE).unwrap();
        assert!(table.header().starts_with("speciesID,parentID"));
        assert_eq!(table.raw_rows().len(), 2);
        assert_eq!(table.raw_rows()[0].0, 1);
        assert!(table.raw_rows()[1].1.starts_with("2,0,4"));
    }

    #[test]
    fn rejects_short_rows() {
        let err = SpeciesTable::from_str("header\n1,0,3\n").unwrap_err();
        assert!(matches!(err, SpeciesTableError::ColumnCount { line: 2, .. }));
    }

    #[test]
    fn rejects_bad_numbers() {
        let bad = "header\n1,0,three,0.9,0.5,10,0.95,0.2,0.01,0.005\n";
        let err = SpeciesTable::from_str(bad).unwrap_err();
        assert!(matches!(err, SpeciesTableError::BadValue { .. }));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let dup = "header\n\
1,0,3,0.9,0.5,10,0.95,0.2,0.01,0.005\n\
1,0,4,0.8,0.4,12,0.9,0.3,0.02,0.004\n";
        let err = SpeciesTable::from_str(dup).unwrap_err();
        assert!(matches!(err, SpeciesTableError::DuplicateId { id: 1, .. }));
    }

    #[test]
    fn rejects_empty_table() {
        assert!(matches!(
            SpeciesTable::from_str("header only\n").unwrap_err(),
            SpeciesTableError::Empty
        ));
    }
}
