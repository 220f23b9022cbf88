//! Per-tile double-buffered state and the per-tick compute step.
//!
//! During the compute phase a tile reads only its neighbors' previous-tick
//! state and writes only its own next-tick state; the board commits all tiles
//! after a full barrier. That discipline is the sole concurrency-correctness
//! mechanism, so nothing here takes a lock.

use std::collections::{BTreeMap, HashMap};

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::dispersal::{cumulative_table, sample_species, DispersalKernel};
use crate::plant::Plant;
use crate::species::{SpeciesId, SpeciesTable};
use crate::topology::Topology;

/// Per-species occupancy tally for one tile: at most one resident adult plus
/// a juvenile count. Restricted to plants physically present on the tile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub adult: bool,
    pub juveniles: u32,
}

impl Tally {
    pub fn total(&self) -> u32 {
        self.juveniles + u32::from(self.adult)
    }
}

/// One buffer of a tile's mutable state. Every tile owns two: the committed
/// previous-tick buffer that neighbors read, and the private next-tick buffer
/// the compute phase writes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TileState {
    pub plants: Vec<Plant>,
    pub resident: Option<Plant>,
    pub tally: HashMap<SpeciesId, Tally>,
}

impl TileState {
    pub fn occupancy(&self) -> usize {
        self.plants.len()
    }

    pub fn tally_total(&self) -> u32 {
        self.tally.values().map(Tally::total).sum()
    }

    pub fn push_juvenile(&mut self, plant: Plant) {
        debug_assert!(!plant.is_adult());
        self.tally.entry(plant.species()).or_default().juveniles += 1;
        self.plants.push(plant);
    }

    pub fn set_resident(&mut self, adult: Plant) {
        debug_assert!(adult.is_adult());
        debug_assert!(self.resident.is_none());
        self.tally.entry(adult.species()).or_default().adult = true;
        self.plants.push(adult);
        self.resident = Some(adult);
    }

    pub fn clear(&mut self) {
        self.plants.clear();
        self.resident = None;
        self.tally.clear();
    }
}

/// Sum of neighbors' previous-tick tallies over the competition set.
/// A species absent from a neighbor's tally counts as zero.
pub fn competition_pressure(
    tile: usize,
    topology: &Topology,
    prev: &[TileState],
) -> (HashMap<SpeciesId, u32>, u32) {
    let mut counts: HashMap<SpeciesId, u32> = HashMap::new();
    let mut grand_total = 0;
    for &neighbor in topology.competition(tile) {
        for (&id, tally) in &prev[neighbor].tally {
            let sum = tally.total();
            *counts.entry(id).or_insert(0) += sum;
            grand_total += sum;
        }
    }
    (counts, grand_total)
}

/// Distance-weighted seed pressure from every resident adult in the tile's
/// dispersal neighborhood. A zero grand total is a valid outcome meaning no
/// germination this tick. Ordered by species id so downstream sampling is
/// deterministic.
pub fn dispersal_pressure(
    tile: usize,
    topology: &Topology,
    kernel: &DispersalKernel,
    prev: &[TileState],
) -> (BTreeMap<SpeciesId, f64>, f64) {
    let mut weights: BTreeMap<SpeciesId, f64> = BTreeMap::new();
    let mut grand_total = 0.0;
    for (distance, bucket) in topology.dispersal(tile).iter().enumerate() {
        for &neighbor in bucket {
            if let Some(resident) = &prev[neighbor].resident {
                let weight = kernel.weight(distance);
                *weights.entry(resident.species()).or_insert(0.0) += weight;
                grand_total += weight;
            }
        }
    }
    (weights, grand_total)
}

/// Compute one tile's next-tick state from the committed previous-tick state
/// of the whole board. `next` must be cleared (it is after every commit).
pub fn compute_next(
    tile: usize,
    topology: &Topology,
    kernel: &DispersalKernel,
    registry: &SpeciesTable,
    prev: &[TileState],
    capacity: usize,
    rng: &mut ChaCha8Rng,
    next: &mut TileState,
) {
    let (counts, grand_total) = competition_pressure(tile, topology, prev);
    let current = &prev[tile];

    let mut incumbent: Option<Plant> = None;
    let mut candidates: Vec<Plant> = Vec::new();

    for plant in &current.plants {
        let species = registry
            .get(plant.species())
            .expect("occupants always carry a registered species id");
        // The plant counts itself in its own tile's tally, so both
        // subtractions stay non-negative.
        let con = counts[&plant.species()] - 1;
        let het = grand_total - con - 1;
        let draw = rng.gen::<f64>();
        match plant.step(species, f64::from(con), f64::from(het), draw) {
            None => {}
            Some(survivor) if survivor.is_adult() => {
                if current.resident.as_ref() == Some(plant) {
                    incumbent = Some(survivor);
                } else {
                    candidates.push(survivor);
                }
            }
            Some(survivor) => next.push_juvenile(survivor),
        }
    }

    // Site pre-emption: a surviving incumbent keeps the canopy; otherwise one
    // candidate (same-tick promotions included) is drawn uniformly at random.
    // Every other candidate adult dies.
    let resident = incumbent.or_else(|| {
        if candidates.is_empty() {
            None
        } else {
            Some(candidates[rng.gen_range(0..candidates.len())])
        }
    });
    if let Some(adult) = resident {
        next.set_resident(adult);
    }

    let needed = capacity.saturating_sub(next.occupancy());
    if needed == 0 {
        return;
    }
    let (weights, total) = dispersal_pressure(tile, topology, kernel, prev);
    if total == 0.0 {
        return;
    }
    let ordered: Vec<(SpeciesId, f64)> = weights.into_iter().collect();
    let table = cumulative_table(&ordered, total);
    for _ in 0..needed {
        let species = sample_species(&table, rng.gen::<f64>());
        next.push_juvenile(Plant::Juvenile { species, age: 0 });
    }
}
