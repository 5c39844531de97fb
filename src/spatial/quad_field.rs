//! Quad Field
//!
//! Uniform grid of square buckets over the map. Units and features are
//! filed in every bucket their bounding circle touches, projectiles in the
//! single bucket holding their position. Region queries gather candidates
//! bucket by bucket in row-major order and drop duplicates, so the result
//! order is the bucket scan order and stable between identical states.

use std::collections::{BTreeMap, BTreeSet};
use serde::{Serialize, Deserialize};
use tracing::trace;

use crate::core::fixed::{Fixed, SQUARE_SIZE, fixed_floor_int};
use crate::core::vec3::FixedVec3;
use crate::world::{UnitId, FeatureId, ProjectileId};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
struct Quad {
    units: Vec<UnitId>,
    features: Vec<FeatureId>,
    projectiles: Vec<ProjectileId>,
}

/// Axis-aligned rectangle on the ground plane.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    /// Minimum x
    pub xmin: Fixed,
    /// Minimum z
    pub zmin: Fixed,
    /// Maximum x
    pub xmax: Fixed,
    /// Maximum z
    pub zmax: Fixed,
}

impl Rect {
    /// Rectangle from corners in any order.
    pub fn new(x1: Fixed, z1: Fixed, x2: Fixed, z2: Fixed) -> Self {
        Self { xmin: x1.min(x2), zmin: z1.min(z2), xmax: x1.max(x2), zmax: z1.max(z2) }
    }

    /// Square of half-edge `radius` around a point. Edges saturate.
    pub fn around(x: Fixed, z: Fixed, radius: Fixed) -> Self {
        let r = radius.max(0);
        Self {
            xmin: x.saturating_sub(r),
            zmin: z.saturating_sub(r),
            xmax: x.saturating_add(r),
            zmax: z.saturating_add(r),
        }
    }

    /// Point inside, edges included.
    #[inline]
    pub fn contains(&self, x: Fixed, z: Fixed) -> bool {
        x >= self.xmin && x <= self.xmax && z >= self.zmin && z <= self.zmax
    }
}

/// The bucket grid.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuadField {
    quad_size: i64,
    num_x: usize,
    num_z: usize,
    quads: Vec<Quad>,
    unit_quads: BTreeMap<UnitId, Vec<usize>>,
    feature_quads: BTreeMap<FeatureId, Vec<usize>>,
    projectile_quads: BTreeMap<ProjectileId, usize>,
}

impl QuadField {
    /// Grid over a map of `width` x `depth` squares with `quad_size`-elmo buckets.
    pub fn new(width: usize, depth: usize, quad_size: u32) -> Self {
        let quad_size = i64::from(quad_size.max(1));
        let num_x = ((width as i64 * SQUARE_SIZE + quad_size - 1) / quad_size).max(1) as usize;
        let num_z = ((depth as i64 * SQUARE_SIZE + quad_size - 1) / quad_size).max(1) as usize;
        Self {
            quad_size,
            num_x,
            num_z,
            quads: vec![Quad::default(); num_x * num_z],
            unit_quads: BTreeMap::new(),
            feature_quads: BTreeMap::new(),
            projectile_quads: BTreeMap::new(),
        }
    }

    /// Bucket edge in elmos.
    pub fn quad_size(&self) -> i64 {
        self.quad_size
    }

    /// Number of buckets.
    pub fn num_quads(&self) -> usize {
        self.quads.len()
    }

    fn column(&self, x: Fixed) -> usize {
        (fixed_floor_int(x).div_euclid(self.quad_size)).clamp(0, self.num_x as i64 - 1) as usize
    }

    fn row(&self, z: Fixed) -> usize {
        (fixed_floor_int(z).div_euclid(self.quad_size)).clamp(0, self.num_z as i64 - 1) as usize
    }

    /// Bucket holding a point; off-map points clamp to the edge.
    pub fn quad_at(&self, x: Fixed, z: Fixed) -> usize {
        self.row(z) * self.num_x + self.column(x)
    }

    /// Buckets overlapping a rectangle, row-major.
    pub fn quads_in_rect(&self, rect: Rect) -> Vec<usize> {
        let (x0, x1) = (self.column(rect.xmin), self.column(rect.xmax));
        let (z0, z1) = (self.row(rect.zmin), self.row(rect.zmax));
        (z0..=z1)
            .flat_map(|z| (x0..=x1).map(move |x| z * self.num_x + x))
            .collect()
    }

    // =========================================================================
    // MAINTENANCE (simulation side)
    // =========================================================================

    /// File a unit by its bounding circle.
    pub fn insert_unit(&mut self, id: UnitId, pos: FixedVec3, radius: Fixed) {
        self.remove_unit(id);
        let quads = self.quads_in_rect(Rect::around(pos.x, pos.z, radius));
        for &q in &quads {
            self.quads[q].units.push(id);
        }
        self.unit_quads.insert(id, quads);
    }

    /// Drop a unit from every bucket.
    pub fn remove_unit(&mut self, id: UnitId) {
        if let Some(quads) = self.unit_quads.remove(&id) {
            for q in quads {
                self.quads[q].units.retain(|&u| u != id);
            }
        }
    }

    /// File a feature by its bounding circle.
    pub fn insert_feature(&mut self, id: FeatureId, pos: FixedVec3, radius: Fixed) {
        self.remove_feature(id);
        let quads = self.quads_in_rect(Rect::around(pos.x, pos.z, radius));
        for &q in &quads {
            self.quads[q].features.push(id);
        }
        self.feature_quads.insert(id, quads);
    }

    /// Drop a feature from every bucket.
    pub fn remove_feature(&mut self, id: FeatureId) {
        if let Some(quads) = self.feature_quads.remove(&id) {
            for q in quads {
                self.quads[q].features.retain(|&f| f != id);
            }
        }
    }

    /// File a projectile at its position.
    pub fn insert_projectile(&mut self, id: ProjectileId, pos: FixedVec3) {
        self.remove_projectile(id);
        let q = self.quad_at(pos.x, pos.z);
        self.quads[q].projectiles.push(id);
        self.projectile_quads.insert(id, q);
    }

    /// Drop a projectile.
    pub fn remove_projectile(&mut self, id: ProjectileId) {
        if let Some(q) = self.projectile_quads.remove(&id) {
            self.quads[q].projectiles.retain(|&p| p != id);
        }
    }

    // =========================================================================
    // CANDIDATE GATHERING
    // =========================================================================

    /// Units filed in any bucket overlapping `rect`, first-seen order.
    pub fn units_in_rect(&self, rect: Rect) -> Vec<UnitId> {
        gather(self.quads_in_rect(rect).into_iter().map(|q| &self.quads[q].units))
    }

    /// Features filed in any bucket overlapping `rect`, first-seen order.
    pub fn features_in_rect(&self, rect: Rect) -> Vec<FeatureId> {
        gather(self.quads_in_rect(rect).into_iter().map(|q| &self.quads[q].features))
    }

    /// Projectiles filed in any bucket overlapping `rect`, scan order.
    pub fn projectiles_in_rect(&self, rect: Rect) -> Vec<ProjectileId> {
        let quads = self.quads_in_rect(rect);
        trace!(quads = quads.len(), "projectile candidate scan");
        gather(quads.into_iter().map(|q| &self.quads[q].projectiles))
    }
}

fn gather<'a, I>(lists: I) -> Vec<u32>
where
    I: Iterator<Item = &'a Vec<u32>>,
{
    let mut seen = BTreeSet::new();
    let mut out = Vec::new();
    for list in lists {
        for &id in list {
            if seen.insert(id) {
                out.push(id);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixed::from_int;

    fn field() -> QuadField {
        // 64x64 squares = 512 elmos, 4x4 buckets of 128
        QuadField::new(64, 64, 128)
    }

    #[test]
    fn test_grid_shape() {
        let qf = field();
        assert_eq!(qf.num_quads(), 16);
        assert_eq!(qf.quad_at(from_int(130), from_int(10)), 1);
        assert_eq!(qf.quad_at(from_int(-50), from_int(9999)), 12);
    }

    #[test]
    fn test_spanning_unit_reported_once() {
        let mut qf = field();
        // Straddles four buckets
        qf.insert_unit(7, FixedVec3::from_ints(128, 0, 128), from_int(20));
        qf.insert_unit(8, FixedVec3::from_ints(10, 0, 10), from_int(5));
        let all = qf.units_in_rect(Rect::new(0, 0, from_int(511), from_int(511)));
        assert_eq!(all.iter().filter(|&&u| u == 7).count(), 1);
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn test_remove_and_reinsert() {
        let mut qf = field();
        qf.insert_unit(1, FixedVec3::from_ints(20, 0, 20), from_int(4));
        qf.insert_unit(1, FixedVec3::from_ints(400, 0, 400), from_int(4));
        assert!(qf.units_in_rect(Rect::new(0, 0, from_int(100), from_int(100))).is_empty());
        assert_eq!(qf.units_in_rect(Rect::around(from_int(400), from_int(400), from_int(10))), vec![1]);

        qf.remove_unit(1);
        assert!(qf.units_in_rect(Rect::new(0, 0, from_int(511), from_int(511))).is_empty());
    }

    #[test]
    fn test_projectiles_and_features() {
        let mut qf = field();
        qf.insert_projectile(3, FixedVec3::from_ints(300, 50, 40));
        qf.insert_feature(4, FixedVec3::from_ints(300, 0, 40), from_int(8));
        let rect = Rect::new(from_int(256), 0, from_int(383), from_int(127));
        assert_eq!(qf.projectiles_in_rect(rect), vec![3]);
        assert_eq!(qf.features_in_rect(rect), vec![4]);
        qf.remove_projectile(3);
        qf.remove_feature(4);
        assert!(qf.projectiles_in_rect(rect).is_empty());
        assert!(qf.features_in_rect(rect).is_empty());
    }

    #[test]
    fn test_huge_radius_saturates() {
        let mut qf = field();
        qf.insert_unit(9, FixedVec3::from_ints(100, 0, 100), from_int(4));
        let rect = Rect::around(from_int(100), from_int(100), i64::MAX);
        assert_eq!((rect.xmin, rect.xmax), (i64::MIN, i64::MAX));
        assert_eq!(qf.units_in_rect(rect), vec![9]);
        assert_eq!(Rect::around(i64::MIN, 0, from_int(5)).xmin, i64::MIN);
    }
}
