//! Region Queries
//!
//! One generic containment query parameterised by a shape and an
//! allegiance predicate. The quad field supplies candidates from the
//! shape's bounding rectangle; the shape then applies its exact test.

use serde::{Serialize, Deserialize};

use crate::core::fixed::Fixed;
use crate::core::vec3::FixedVec3;
use crate::world::feature::Feature;
use crate::world::projectile::Projectile;
use crate::world::unit::Unit;
use crate::world::{World, UnitId, FeatureId, ProjectileId};
use super::quad_field::Rect;

/// Half-space `n . p + d <= 0`; the normal points into accepted space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plane {
    /// Plane normal
    pub normal: FixedVec3,
    /// Offset
    pub d: Fixed,
}

/// Containment region.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Shape {
    /// Ground rectangle, tested on base positions
    Rectangle(Rect),
    /// Ground rectangle plus a height band on the mid position
    Box {
        /// Ground footprint
        rect: Rect,
        /// Minimum height
        ymin: Fixed,
        /// Maximum height
        ymax: Fixed,
    },
    /// Vertical cylinder, tested on the mid position
    Cylinder {
        /// Centre x
        x: Fixed,
        /// Centre z
        z: Fixed,
        /// Radius
        radius: Fixed,
    },
    /// Sphere, tested on the mid position
    Sphere {
        /// Centre
        centre: FixedVec3,
        /// Radius
        radius: Fixed,
    },
    /// Intersection of half-spaces, each widened by the unit radius
    Planes(Vec<Plane>),
}

impl Shape {
    /// Bounding rectangle for candidate gathering; planes are unbounded.
    pub fn bounds(&self) -> Option<Rect> {
        match self {
            Shape::Rectangle(rect) | Shape::Box { rect, .. } => Some(*rect),
            Shape::Cylinder { x, z, radius } => Some(Rect::around(*x, *z, *radius)),
            Shape::Sphere { centre, radius } => Some(Rect::around(centre.x, centre.z, *radius)),
            Shape::Planes(_) => None,
        }
    }

    /// Exact unit test.
    pub fn contains_unit(&self, unit: &Unit) -> bool {
        let in_bounds = self.bounds().map_or(true, |r| r.contains(unit.pos.x, unit.pos.z));
        if !in_bounds {
            return false;
        }
        let mid = unit.mid_pos;
        match self {
            Shape::Rectangle(_) => true,
            Shape::Box { ymin, ymax, .. } => mid.y >= *ymin && mid.y <= *ymax,
            Shape::Cylinder { x, z, radius } => within(&[mid.x, mid.z], &[*x, *z], *radius),
            Shape::Sphere { centre, radius } => within(&[mid.x, mid.y, mid.z], &[centre.x, centre.y, centre.z], *radius),
            Shape::Planes(planes) => planes
                .iter()
                .all(|p| p.normal.dot(mid) + p.d - unit.radius <= 0),
        }
    }

    /// Exact feature test on the base position.
    pub fn contains_feature(&self, feature: &Feature) -> bool {
        let pos = feature.pos;
        match self {
            Shape::Rectangle(rect) => rect.contains(pos.x, pos.z),
            Shape::Box { rect, ymin, ymax } => rect.contains(pos.x, pos.z) && pos.y >= *ymin && pos.y <= *ymax,
            Shape::Cylinder { x, z, radius } => within(&[pos.x, pos.z], &[*x, *z], *radius),
            Shape::Sphere { centre, radius } => within(&[pos.x, pos.y, pos.z], &[centre.x, centre.y, centre.z], *radius),
            Shape::Planes(planes) => planes.iter().all(|p| p.normal.dot(pos) + p.d - feature.radius <= 0),
        }
    }
}

/// Distance between `a` and `b` is at most `radius`.
///
/// Squares are summed in raw fixed units as `u128`, so no radius or
/// coordinate wraps; a negative radius only admits the centre itself.
fn within(a: &[Fixed], b: &[Fixed], radius: Fixed) -> bool {
    let sq = |v: i64| u128::from(v.unsigned_abs()).pow(2);
    let dist: u128 = a.iter().zip(b).map(|(p, q)| sq(p.saturating_sub(*q))).sum();
    dist <= sq(radius.max(0))
}

/// Units inside `shape` accepted by `allegiance`, in bucket scan order.
///
/// Unbounded shapes walk the teams in id order instead.
pub fn units_in_region<F>(world: &World, shape: &Shape, allegiance: F) -> Vec<UnitId>
where
    F: Fn(&Unit) -> bool,
{
    let candidates: Vec<UnitId> = match shape.bounds() {
        Some(rect) => world.quad_field.units_in_rect(rect),
        None => (0..world.teams.num_teams())
            .flat_map(|team| world.units.team_units(team))
            .collect(),
    };
    candidates
        .into_iter()
        .filter_map(|id| world.units.get(id))
        .filter(|unit| shape.contains_unit(unit) && allegiance(unit))
        .map(|unit| unit.id)
        .collect()
}

/// Features inside `shape` accepted by `visible`.
pub fn features_in_region<F>(world: &World, shape: &Shape, visible: F) -> Vec<FeatureId>
where
    F: Fn(&Feature) -> bool,
{
    let candidates: Vec<FeatureId> = match shape.bounds() {
        Some(rect) => world.quad_field.features_in_rect(rect),
        None => world.features.iter().map(|f| f.id).collect(),
    };
    candidates
        .into_iter()
        .filter_map(|id| world.features.get(id))
        .filter(|feature| shape.contains_feature(feature) && visible(feature))
        .map(|feature| feature.id)
        .collect()
}

/// Projectiles inside a rectangle accepted by `keep`.
pub fn projectiles_in_rect<F>(world: &World, rect: Rect, keep: F) -> Vec<ProjectileId>
where
    F: Fn(&Projectile) -> bool,
{
    world
        .quad_field
        .projectiles_in_rect(rect)
        .into_iter()
        .filter_map(|id| world.projectiles.get(id))
        .filter(|p| rect.contains(p.pos.x, p.pos.z) && keep(p))
        .map(|p| p.id)
        .collect()
}

/// Closest unit accepted by `accept` within `range` of `origin`, excluding
/// `exclude`. Ties go to the lower id.
pub fn nearest_unit<F>(world: &World, origin: FixedVec3, range: Fixed, exclude: UnitId, accept: F) -> Option<UnitId>
where
    F: Fn(&Unit) -> bool,
{
    let mut best: Option<(Fixed, UnitId)> = None;
    for id in world.quad_field.units_in_rect(Rect::around(origin.x, origin.z, range)) {
        let Some(unit) = world.units.get(id) else { continue };
        if unit.id == exclude || !accept(unit) {
            continue;
        }
        if !within(&[unit.pos.x, unit.pos.y, unit.pos.z], &[origin.x, origin.y, origin.z], range) {
            continue;
        }
        let dist = unit.pos.distance_squared(origin);
        match best {
            Some((d, best_id)) if d < dist || (d == dist && best_id < unit.id) => {}
            _ => best = Some((dist, unit.id)),
        }
    }
    best.map(|(_, id)| id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixed::{from_int, FIXED_ONE};
    use crate::world::defs::UnitDef;

    fn unit_at(x: i64, y: i64, z: i64) -> Unit {
        let mut def = UnitDef::new(1, "box", from_int(10));
        def.model.radius = from_int(10);
        Unit::new(1, &def, 0, 0, FixedVec3::from_ints(x, y, z))
    }

    #[test]
    fn test_shapes_on_unit() {
        let unit = unit_at(100, 20, 100);
        let rect = Rect::new(from_int(90), from_int(90), from_int(110), from_int(110));
        assert!(Shape::Rectangle(rect).contains_unit(&unit));
        assert!(!Shape::Box { rect, ymin: from_int(30), ymax: from_int(40) }.contains_unit(&unit));
        assert!(Shape::Box { rect, ymin: from_int(0), ymax: from_int(40) }.contains_unit(&unit));
        assert!(Shape::Cylinder { x: from_int(103), z: from_int(104), radius: from_int(5) }.contains_unit(&unit));
        assert!(!Shape::Sphere { centre: FixedVec3::from_ints(100, 80, 100), radius: from_int(50) }.contains_unit(&unit));
    }

    #[test]
    fn test_planes_widened_by_radius() {
        let unit = unit_at(100, 0, 100);
        // x <= 95, but the unit radius (10) reaches across
        let plane = Plane { normal: FixedVec3::new(FIXED_ONE, 0, 0), d: from_int(-95) };
        assert!(Shape::Planes(vec![plane]).contains_unit(&unit));
        let plane = Plane { normal: FixedVec3::new(FIXED_ONE, 0, 0), d: from_int(-85) };
        assert!(!Shape::Planes(vec![plane]).contains_unit(&unit));
        assert!(Shape::Planes(vec![]).contains_unit(&unit));
    }

    #[test]
    fn test_huge_radii_do_not_wrap() {
        let unit = unit_at(100, 20, 100);
        let far = i64::MAX / 2;
        assert!(Shape::Cylinder { x: 0, z: 0, radius: from_int(20_000_000) }.contains_unit(&unit));
        assert!(Shape::Sphere { centre: FixedVec3::new(0, 0, 0), radius: i64::MAX }.contains_unit(&unit));
        assert!(!Shape::Sphere { centre: FixedVec3::new(far, 0, far), radius: from_int(10) }.contains_unit(&unit));
        assert!(!Shape::Cylinder { x: 0, z: 0, radius: -from_int(5) }.contains_unit(&unit));
    }
}
