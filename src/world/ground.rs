//! Ground
//!
//! Height map, terrain-type map, metal map and the blocking map of solid
//! objects. Heights are stored per square corner; terrain types and
//! metal per `2 * SQUARE_SIZE` cell.
//!
//! ```text
//!   corner (x, z) ──── corner (x+1, z)
//!        │   square (x, z)   │          one square = SQUARE_SIZE elmos
//!   corner (x, z+1) ── corner (x+1, z+1)
//! ```

use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};

use crate::core::fixed::{
    Fixed, FIXED_ONE, SQUARE_SIZE, fixed_clamp, fixed_floor_int, fixed_lerp, from_int,
};
use crate::core::vec3::FixedVec3;
use super::{UnitId, FeatureId};

/// Size of the terrain-type table.
pub const NUM_TERRAIN_TYPES: usize = 256;

/// Movement and appearance properties of a terrain type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerrainType {
    /// Display name
    pub name: String,
    /// Resistance to cratering
    pub hardness: Fixed,
    /// Speed multiplier for tanks
    pub tank_speed: Fixed,
    /// Speed multiplier for kbots
    pub kbot_speed: Fixed,
    /// Speed multiplier for hovercraft
    pub hover_speed: Fixed,
    /// Speed multiplier for ships
    pub ship_speed: Fixed,
    /// Units leave tracks
    pub receive_tracks: bool,
}

impl Default for TerrainType {
    fn default() -> Self {
        Self {
            name: "Default".to_string(),
            hardness: FIXED_ONE,
            tank_speed: FIXED_ONE,
            kbot_speed: FIXED_ONE,
            hover_speed: FIXED_ONE,
            ship_speed: FIXED_ONE,
            receive_tracks: true,
        }
    }
}

/// A solid object occupying a ground square.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockingObject {
    /// A unit
    Unit(UnitId),
    /// A feature
    Feature(FeatureId),
}

/// Lowest and highest heights.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeightExtremes {
    /// Lowest height
    pub min: Fixed,
    /// Highest height
    pub max: Fixed,
}

/// Ground information sampled at a point.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroundInfo<'a> {
    /// Terrain cell x
    pub ix: i64,
    /// Terrain cell z
    pub iz: i64,
    /// Terrain type index
    pub type_index: usize,
    /// Terrain type
    pub terrain: &'a TerrainType,
    /// Metal in the cell
    pub metal: Fixed,
}

/// The map surface.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ground {
    width: usize,
    depth: usize,
    heights: Vec<Fixed>,
    orig_heights: Vec<Fixed>,
    type_map: Vec<u8>,
    metal_map: Vec<Fixed>,
    terrain_types: Vec<TerrainType>,
    blocking: BTreeMap<(usize, usize), BlockingObject>,
    init_extremes: HeightExtremes,
    curr_extremes: HeightExtremes,
}

impl Ground {
    /// Flat map of `width` x `depth` squares at `height`.
    pub fn flat(width: usize, depth: usize, height: Fixed) -> Self {
        let width = width.max(2);
        let depth = depth.max(2);
        let heights = vec![height; (width + 1) * (depth + 1)];
        let cells = (width / 2) * (depth / 2);
        let extremes = HeightExtremes { min: height, max: height };
        Self {
            width,
            depth,
            orig_heights: heights.clone(),
            heights,
            type_map: vec![0; cells],
            metal_map: vec![0; cells],
            terrain_types: vec![TerrainType::default(); NUM_TERRAIN_TYPES],
            blocking: BTreeMap::new(),
            init_extremes: extremes,
            curr_extremes: extremes,
        }
    }

    /// Map from corner heights in row-major order; `heights` must hold
    /// `(width + 1) * (depth + 1)` values, missing ones read as zero.
    pub fn from_heights(width: usize, depth: usize, mut heights: Vec<Fixed>) -> Self {
        let mut ground = Self::flat(width, depth, 0);
        heights.resize((ground.width + 1) * (ground.depth + 1), 0);
        let extremes = extremes_of(&heights);
        ground.orig_heights = heights.clone();
        ground.heights = heights;
        ground.init_extremes = extremes;
        ground.curr_extremes = extremes;
        ground
    }

    /// Map width in squares.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Map depth in squares.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Largest x coordinate in elmos.
    pub fn max_x(&self) -> Fixed {
        from_int(self.width as i64 * SQUARE_SIZE)
    }

    /// Largest z coordinate in elmos.
    pub fn max_z(&self) -> Fixed {
        from_int(self.depth as i64 * SQUARE_SIZE)
    }

    /// Whether a point lies on the map.
    pub fn in_bounds(&self, x: Fixed, z: Fixed) -> bool {
        x >= 0 && z >= 0 && x <= self.max_x() && z <= self.max_z()
    }

    // =========================================================================
    // HEIGHTS
    // =========================================================================

    /// Set one corner height (terraforming) and update the current extremes.
    pub fn set_corner_height(&mut self, cx: usize, cz: usize, height: Fixed) {
        if cx > self.width || cz > self.depth {
            return;
        }
        let idx = cz * (self.width + 1) + cx;
        self.heights[idx] = height;
        self.curr_extremes = extremes_of(&self.heights);
    }

    fn corner(map: &[Fixed], width: usize, cx: usize, cz: usize) -> Fixed {
        map.get(cz * (width + 1) + cx).copied().unwrap_or(0)
    }

    fn sample(&self, map: &[Fixed], x: Fixed, z: Fixed) -> Fixed {
        let x = fixed_clamp(x, 0, self.max_x());
        let z = fixed_clamp(z, 0, self.max_z());
        let sx = x / SQUARE_SIZE;
        let sz = z / SQUARE_SIZE;
        let cx = (fixed_floor_int(sx) as usize).min(self.width - 1);
        let cz = (fixed_floor_int(sz) as usize).min(self.depth - 1);
        let fx = sx - from_int(cx as i64);
        let fz = sz - from_int(cz as i64);

        let h00 = Self::corner(map, self.width, cx, cz);
        let h10 = Self::corner(map, self.width, cx + 1, cz);
        let h01 = Self::corner(map, self.width, cx, cz + 1);
        let h11 = Self::corner(map, self.width, cx + 1, cz + 1);

        let near = fixed_lerp(h00, h10, fx);
        let far = fixed_lerp(h01, h11, fx);
        fixed_lerp(near, far, fz)
    }

    /// Current height at a point, bilinear between corners.
    pub fn height_at(&self, x: Fixed, z: Fixed) -> Fixed {
        self.sample(&self.heights, x, z)
    }

    /// Height before any terraforming.
    pub fn orig_height_at(&self, x: Fixed, z: Fixed) -> Fixed {
        self.sample(&self.orig_heights, x, z)
    }

    fn normal_with_step(&self, x: Fixed, z: Fixed, step: Fixed) -> FixedVec3 {
        let x = fixed_clamp(x, 0, self.max_x());
        let z = fixed_clamp(z, 0, self.max_z());
        let dx = self.height_at(x - step, z) - self.height_at(x + step, z);
        let dz = self.height_at(x, z - step) - self.height_at(x, z + step);
        FixedVec3::new(dx, step * 2, dz).normalize()
    }

    /// Surface normal at a point.
    pub fn normal_at(&self, x: Fixed, z: Fixed) -> FixedVec3 {
        self.normal_with_step(x, z, from_int(SQUARE_SIZE))
    }

    /// Normal averaged over a wider neighbourhood.
    pub fn smooth_normal_at(&self, x: Fixed, z: Fixed) -> FixedVec3 {
        self.normal_with_step(x, z, from_int(SQUARE_SIZE * 4))
    }

    /// Slope at a point: 0 flat, 1 vertical.
    pub fn slope_at(&self, x: Fixed, z: Fixed) -> Fixed {
        FIXED_ONE - self.normal_at(x, z).y
    }

    /// Heights at load time.
    pub fn init_extremes(&self) -> HeightExtremes {
        self.init_extremes
    }

    /// Heights now.
    pub fn curr_extremes(&self) -> HeightExtremes {
        self.curr_extremes
    }

    // =========================================================================
    // TERRAIN TYPES AND METAL
    // =========================================================================

    fn cell_index(&self, x: Fixed, z: Fixed) -> (i64, i64, usize) {
        let cell = SQUARE_SIZE * 2;
        let cells_x = (self.width / 2).max(1);
        let cells_z = (self.depth / 2).max(1);
        let ix = fixed_floor_int(fixed_clamp(x, 0, self.max_x())) / cell;
        let iz = fixed_floor_int(fixed_clamp(z, 0, self.max_z())) / cell;
        let ix = ix.clamp(0, cells_x as i64 - 1);
        let iz = iz.clamp(0, cells_z as i64 - 1);
        let idx = (iz as usize * cells_x + ix as usize).min(self.type_map.len().saturating_sub(1));
        (ix, iz, idx)
    }

    /// Assign a terrain type to the cell containing a point.
    pub fn set_terrain_type(&mut self, x: Fixed, z: Fixed, type_index: u8) {
        let (_, _, idx) = self.cell_index(x, z);
        if let Some(slot) = self.type_map.get_mut(idx) {
            *slot = type_index;
        }
    }

    /// Replace an entry of the terrain-type table.
    pub fn set_terrain_type_data(&mut self, index: usize, terrain: TerrainType) {
        if let Some(slot) = self.terrain_types.get_mut(index) {
            *slot = terrain;
        }
    }

    /// Terrain-type table entry.
    pub fn terrain_type(&self, index: usize) -> Option<&TerrainType> {
        self.terrain_types.get(index)
    }

    /// Set the metal of the cell containing a point.
    pub fn set_metal(&mut self, x: Fixed, z: Fixed, metal: Fixed) {
        let (_, _, idx) = self.cell_index(x, z);
        if let Some(slot) = self.metal_map.get_mut(idx) {
            *slot = metal;
        }
    }

    /// Terrain cell, type and metal at a point.
    pub fn info_at(&self, x: Fixed, z: Fixed) -> GroundInfo<'_> {
        let (ix, iz, idx) = self.cell_index(x, z);
        let type_index = self.type_map.get(idx).copied().unwrap_or(0) as usize;
        GroundInfo {
            ix,
            iz,
            type_index,
            terrain: &self.terrain_types[type_index],
            metal: self.metal_map.get(idx).copied().unwrap_or(0),
        }
    }

    // =========================================================================
    // BLOCKING MAP
    // =========================================================================

    /// Square containing a coordinate, clamped to the map.
    pub fn square_of(&self, x: Fixed, z: Fixed) -> (usize, usize) {
        let sx = (fixed_floor_int(x) / SQUARE_SIZE).clamp(0, self.width as i64 - 1);
        let sz = (fixed_floor_int(z) / SQUARE_SIZE).clamp(0, self.depth as i64 - 1);
        (sx as usize, sz as usize)
    }

    /// Mark the footprint centred on `pos` as occupied.
    pub fn block_footprint(&mut self, pos: FixedVec3, footprint_x: u32, footprint_z: u32, object: BlockingObject) {
        for square in self.footprint_squares(pos, footprint_x, footprint_z) {
            self.blocking.insert(square, object);
        }
    }

    /// Clear every square occupied by `object`.
    pub fn unblock(&mut self, object: BlockingObject) {
        self.blocking.retain(|_, occupant| *occupant != object);
    }

    fn footprint_squares(&self, pos: FixedVec3, footprint_x: u32, footprint_z: u32) -> Vec<(usize, usize)> {
        let (cx, cz) = self.square_of(pos.x, pos.z);
        let half_x = footprint_x as usize / 2;
        let half_z = footprint_z as usize / 2;
        let x0 = cx.saturating_sub(half_x);
        let z0 = cz.saturating_sub(half_z);
        let x1 = (x0 + footprint_x.max(1) as usize).min(self.width);
        let z1 = (z0 + footprint_z.max(1) as usize).min(self.depth);
        (z0..z1).flat_map(|z| (x0..x1).map(move |x| (x, z))).collect()
    }

    /// Object occupying a square.
    pub fn blocked_at(&self, sx: usize, sz: usize) -> Option<BlockingObject> {
        self.blocking.get(&(sx, sz)).copied()
    }
}

fn extremes_of(heights: &[Fixed]) -> HeightExtremes {
    let min = heights.iter().copied().min().unwrap_or(0);
    let max = heights.iter().copied().max().unwrap_or(0);
    HeightExtremes { min, max }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixed::FIXED_HALF;

    #[test]
    fn test_bilinear_height() {
        // 2x2 squares, corners rise along x: 0, 8, 16
        let heights = vec![
            from_int(0), from_int(8), from_int(16),
            from_int(0), from_int(8), from_int(16),
            from_int(0), from_int(8), from_int(16),
        ];
        let ground = Ground::from_heights(2, 2, heights);
        assert_eq!(ground.height_at(from_int(4), from_int(4)), from_int(4));
        assert_eq!(ground.height_at(from_int(12), 0), from_int(12));
        // Clamped outside the map
        assert_eq!(ground.height_at(from_int(-50), 0), 0);
        assert_eq!(ground.init_extremes(), HeightExtremes { min: 0, max: from_int(16) });
    }

    #[test]
    fn test_flat_normal_points_up() {
        let ground = Ground::flat(8, 8, from_int(10));
        let n = ground.normal_at(from_int(32), from_int(32));
        assert_eq!(n, FixedVec3::UP);
        assert_eq!(ground.slope_at(from_int(32), from_int(32)), 0);
    }

    #[test]
    fn test_terraform_tracks_current_extremes() {
        let mut ground = Ground::flat(4, 4, 0);
        ground.set_corner_height(2, 2, from_int(30));
        assert_eq!(ground.curr_extremes().max, from_int(30));
        assert_eq!(ground.init_extremes().max, 0);
        assert_eq!(ground.orig_height_at(from_int(16), from_int(16)), 0);
        assert_eq!(ground.height_at(from_int(16), from_int(16)), from_int(30));
    }

    #[test]
    fn test_terrain_and_metal_cells() {
        let mut ground = Ground::flat(8, 8, 0);
        ground.set_terrain_type(from_int(20), from_int(40), 3);
        ground.set_metal(from_int(20), from_int(40), FIXED_HALF);

        let info = ground.info_at(from_int(17), from_int(33));
        assert_eq!((info.ix, info.iz), (1, 2));
        assert_eq!(info.type_index, 3);
        assert_eq!(info.metal, FIXED_HALF);
        assert_eq!(ground.info_at(0, 0).type_index, 0);
    }

    #[test]
    fn test_blocking_footprint() {
        let mut ground = Ground::flat(16, 16, 0);
        ground.block_footprint(FixedVec3::from_ints(40, 0, 40), 2, 2, BlockingObject::Unit(7));
        assert_eq!(ground.blocked_at(5, 5), Some(BlockingObject::Unit(7)));
        assert_eq!(ground.blocked_at(4, 4), Some(BlockingObject::Unit(7)));
        assert_eq!(ground.blocked_at(6, 6), None);

        ground.unblock(BlockingObject::Unit(7));
        assert_eq!(ground.blocked_at(5, 5), None);
    }
}
