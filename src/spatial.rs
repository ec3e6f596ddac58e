//! Uniform grid for finding close particle pairs
//!
//! Cells are as wide as the search distance, so any pair closer than it lies
//! in the same cell or in directly neighbouring ones.

use std::collections::HashMap;

use glam::{DVec2, IVec2};

use crate::config::PairScan;

/// Forward half of the 3x3 neighbourhood, each neighbouring cell pair is visited once
const FORWARD_NEIGHBOURS: [IVec2; 4] = [
    IVec2::new(1, 0),
    IVec2::new(-1, 1),
    IVec2::new(0, 1),
    IVec2::new(1, 1),
];

pub struct SpatialGrid {
    cell_size: f64,
    cells: HashMap<IVec2, Vec<usize>>,
}

impl SpatialGrid {
    pub fn build(positions: &[DVec2], cell_size: f64) -> Self {
        let mut cells: HashMap<IVec2, Vec<usize>> = HashMap::new();
        for (i, &position) in positions.iter().enumerate() {
            cells
                .entry(cell_of(position, cell_size))
                .or_default()
                .push(i);
        }

        Self { cell_size, cells }
    }

    /// Calls `f(i, j, distance)` for every pair closer than `max_distance`,
    /// `max_distance` must not exceed the cell size
    pub fn for_each_pair_within<F>(&self, positions: &[DVec2], max_distance: f64, mut f: F)
    where
        F: FnMut(usize, usize, f64),
    {
        debug_assert!(max_distance <= self.cell_size);

        let mut visit = |a: usize, b: usize| {
            let distance = positions[a].distance(positions[b]);
            if distance < max_distance {
                let (i, j) = if a < b { (a, b) } else { (b, a) };
                f(i, j, distance);
            }
        };

        for (cell, members) in &self.cells {
            for (n, &a) in members.iter().enumerate() {
                for &b in &members[n + 1..] {
                    visit(a, b);
                }
            }

            for offset in FORWARD_NEIGHBOURS {
                let Some(neighbours) = self.cells.get(&(*cell + offset)) else {
                    continue;
                };

                for &a in members {
                    for &b in neighbours {
                        visit(a, b);
                    }
                }
            }
        }
    }
}

fn cell_of(position: DVec2, cell_size: f64) -> IVec2 {
    let cell = (position / cell_size).floor();
    IVec2::new(cell.x as i32, cell.y as i32)
}

/// Every pair `i < j` closer than `max_distance`, using the chosen strategy
pub fn for_each_pair_within<F>(scan: PairScan, positions: &[DVec2], max_distance: f64, mut f: F)
where
    F: FnMut(usize, usize, f64),
{
    if max_distance <= 0.0 {
        return;
    }

    match scan {
        PairScan::Brute => {
            for (i, p1) in positions.iter().enumerate() {
                for (j, p2) in positions.iter().enumerate().skip(i + 1) {
                    let distance = p1.distance(*p2);
                    if distance < max_distance {
                        f(i, j, distance);
                    }
                }
            }
        }
        PairScan::Grid => {
            SpatialGrid::build(positions, max_distance).for_each_pair_within(
                positions,
                max_distance,
                f,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn pairs(scan: PairScan, positions: &[DVec2], max_distance: f64) -> Vec<(usize, usize)> {
        let mut found = Vec::new();
        for_each_pair_within(scan, positions, max_distance, |i, j, _| found.push((i, j)));
        found.sort_unstable();
        found
    }

    #[test]
    fn grid_matches_brute_force() {
        let mut rng = StdRng::seed_from_u64(3);
        let positions: Vec<_> = (0..400)
            .map(|_| DVec2::new(rng.gen_range(0.0..1280.0), rng.gen_range(0.0..720.0)))
            .collect();

        let brute = pairs(PairScan::Brute, &positions, 100.0);
        let grid = pairs(PairScan::Grid, &positions, 100.0);
        assert!(!brute.is_empty());
        assert_eq!(brute, grid);
    }

    #[test]
    fn threshold_is_exclusive() {
        let positions = [DVec2::ZERO, DVec2::new(100.0, 0.0), DVec2::new(0.0, 99.0)];
        for scan in [PairScan::Brute, PairScan::Grid] {
            assert_eq!(pairs(scan, &positions, 100.0), vec![(0, 2)]);
        }
    }

    #[test]
    fn pairs_are_ordered_and_unique() {
        let positions = [
            DVec2::new(10.0, 10.0),
            DVec2::new(12.0, 10.0),
            DVec2::new(10.0, 12.0),
            DVec2::new(99.0, 99.0),
            DVec2::new(101.0, 101.0),
        ];
        let grid = pairs(PairScan::Grid, &positions, 10.0);
        assert_eq!(grid, vec![(0, 1), (0, 2), (1, 2), (3, 4)]);
    }

    #[test]
    fn reports_distance() {
        let positions = [DVec2::ZERO, DVec2::new(30.0, 40.0)];
        let mut seen = None;
        for_each_pair_within(PairScan::Grid, &positions, 100.0, |i, j, d| {
            seen = Some((i, j, d))
        });
        assert_eq!(seen, Some((0, 1, 50.0)));
    }

    #[test]
    fn cells_bucket_by_size() {
        let positions = [DVec2::new(5.0, 5.0), DVec2::new(95.0, 5.0), DVec2::new(105.0, 5.0)];
        let grid = SpatialGrid::build(&positions, 100.0);
        assert_eq!(grid.cells.len(), 2);
        assert_eq!(grid.cells[&IVec2::new(0, 0)], vec![0, 1]);
        assert_eq!(cell_of(DVec2::new(-0.5, 250.0), 100.0), IVec2::new(-1, 2));
    }
}
