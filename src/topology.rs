//! Static neighborhood structure for the board.
//!
//! Each tile gets two precomputed neighbor sets: the competition set (all
//! tiles within the competition radius, self included) and the dispersal sets
//! (tiles bucketed by exact Chebyshev distance, self at distance 0). Offsets
//! falling off the board are clipped, never wrapped, so edge and corner tiles
//! have smaller sets.

pub struct Topology {
    side: usize,
    competition: Vec<Vec<usize>>,
    dispersal: Vec<Vec<Vec<usize>>>,
}

impl Topology {
    pub fn build(side: usize, competition_radius: usize, dispersal_radius: usize) -> Self {
        let tile_count = side * side;
        let mut competition = Vec::with_capacity(tile_count);
        let mut dispersal = Vec::with_capacity(tile_count);

        for index in 0..tile_count {
            let (row, col) = (index / side, index % side);
            competition.push(neighbors_within(side, row, col, competition_radius));

            let mut buckets = vec![Vec::new(); dispersal_radius + 1];
            for neighbor in neighbors_within(side, row, col, dispersal_radius) {
                let (nr, nc) = (neighbor / side, neighbor % side);
                let distance = row.abs_diff(nr).max(col.abs_diff(nc));
                buckets[distance].push(neighbor);
            }
            dispersal.push(buckets);
        }

        Self {
            side,
            competition,
            dispersal,
        }
    }

    pub fn side(&self) -> usize {
        self.side
    }

    pub fn tile_count(&self) -> usize {
        self.side * self.side
    }

    pub fn competition(&self, tile: usize) -> &[usize] {
        &self.competition[tile]
    }

    /// Dispersal neighbors of `tile`, indexed by Chebyshev distance.
    pub fn dispersal(&self, tile: usize) -> &[Vec<usize>] {
        &self.dispersal[tile]
    }

    pub fn index(&self, row: usize, col: usize) -> usize {
        row * self.side + col
    }
}

fn neighbors_within(side: usize, row: usize, col: usize, radius: usize) -> Vec<usize> {
    let radius = radius as isize;
    let mut neighbors = Vec::new();
    for dr in -radius..=radius {
        for dc in -radius..=radius {
            let (nr, nc) = (row as isize + dr, col as isize + dc);
            if nr >= 0 && nr < side as isize && nc >= 0 && nc < side as isize {
                neighbors.push(nr as usize * side + nc as usize);
            }
        }
    }
    neighbors
}
