//! Sensor coverage grids.
//!
//! One counter per cell: every sensor circle covering a cell increments
//! it, so removing a sensor is exact and overlapping sensors need no
//! bookkeeping. Point lookups are a single index.

use serde::{Serialize, Deserialize};

use crate::core::fixed::{Fixed, SQUARE_SIZE, fixed_floor_int, fixed_mul, from_int};
use crate::core::vec3::FixedVec3;

/// Counter grid over the map at `SQUARE_SIZE << mip` resolution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageGrid {
    cell_size: i64,
    size_x: usize,
    size_z: usize,
    counts: Vec<u16>,
}

impl CoverageGrid {
    /// Grid for a map of `width` x `depth` squares.
    pub fn new(width: usize, depth: usize, mip: u32) -> Self {
        let cell_size = SQUARE_SIZE << mip.min(16);
        let elmos_x = width as i64 * SQUARE_SIZE;
        let elmos_z = depth as i64 * SQUARE_SIZE;
        let size_x = ((elmos_x + cell_size - 1) / cell_size).max(1) as usize;
        let size_z = ((elmos_z + cell_size - 1) / cell_size).max(1) as usize;
        Self { cell_size, size_x, size_z, counts: vec![0; size_x * size_z] }
    }

    /// Cell edge in elmos.
    pub fn cell_size(&self) -> i64 {
        self.cell_size
    }

    fn cell_of(&self, x: Fixed, z: Fixed) -> Option<usize> {
        let cx = fixed_floor_int(x).div_euclid(self.cell_size);
        let cz = fixed_floor_int(z).div_euclid(self.cell_size);
        if cx < 0 || cz < 0 || cx as usize >= self.size_x || cz as usize >= self.size_z {
            return None;
        }
        Some(cz as usize * self.size_x + cx as usize)
    }

    /// Any sensor covers the point. Off-map points are never covered.
    #[inline]
    pub fn covers(&self, pos: FixedVec3) -> bool {
        self.cell_of(pos.x, pos.z).is_some_and(|i| self.counts[i] > 0)
    }

    /// Number of sensors covering the point.
    pub fn count_at(&self, pos: FixedVec3) -> u16 {
        self.cell_of(pos.x, pos.z).map_or(0, |i| self.counts[i])
    }

    /// Add a sensor circle.
    pub fn add_circle(&mut self, centre: FixedVec3, radius: Fixed) {
        self.for_each_cell_in(centre, radius, |count| *count = count.saturating_add(1));
    }

    /// Remove a sensor circle added earlier with the same arguments.
    pub fn remove_circle(&mut self, centre: FixedVec3, radius: Fixed) {
        self.for_each_cell_in(centre, radius, |count| *count = count.saturating_sub(1));
    }

    /// Drop all coverage.
    pub fn clear(&mut self) {
        self.counts.iter_mut().for_each(|c| *c = 0);
    }

    fn for_each_cell_in<F: FnMut(&mut u16)>(&mut self, centre: FixedVec3, radius: Fixed, mut apply: F) {
        if radius <= 0 {
            return;
        }
        let cell = self.cell_size;
        let r_cells = fixed_floor_int(radius) / cell + 1;
        let ccx = fixed_floor_int(centre.x).div_euclid(cell);
        let ccz = fixed_floor_int(centre.z).div_euclid(cell);
        let r_sq = fixed_mul(radius, radius);
        let half = from_int(cell) / 2;

        for cz in (ccz - r_cells)..=(ccz + r_cells) {
            if cz < 0 || cz as usize >= self.size_z {
                continue;
            }
            for cx in (ccx - r_cells)..=(ccx + r_cells) {
                if cx < 0 || cx as usize >= self.size_x {
                    continue;
                }
                // Cell centre inside the circle
                let px = from_int(cx * cell) + half;
                let pz = from_int(cz * cell) + half;
                let dx = px - centre.x;
                let dz = pz - centre.z;
                if fixed_mul(dx, dx) + fixed_mul(dz, dz) <= r_sq {
                    apply(&mut self.counts[cz as usize * self.size_x + cx as usize]);
                }
            }
        }
    }
}
