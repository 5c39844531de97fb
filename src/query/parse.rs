//! Object-id arguments resolved against the caller's view.
//!
//! A non-numeric id aborts the call. An unknown, dead or unseen id
//! resolves to `None`, which handlers turn into an empty result.

use crate::access::resolver::{
    is_ally_unit, is_feature_visible, is_projectile_visible, is_unit_in_los, is_unit_typed,
    is_unit_visible,
};
use crate::access::AccessContext;
use crate::error::QueryError;
use crate::world::{Feature, Projectile, Unit, World};
use super::Args;

type Parsed<'w, T> = Result<Option<&'w T>, QueryError>;

fn unit_at<'w>(world: &'w World, args: &Args<'_>, pos: usize) -> Parsed<'w, Unit> {
    let id = args.check_id(pos, "unitID")?;
    Ok(world.units.get_raw(id))
}

/// Unit in LOS or on radar.
pub(crate) fn unit<'w>(world: &'w World, ctx: &AccessContext, args: &Args<'_>, pos: usize) -> Parsed<'w, Unit> {
    Ok(unit_at(world, args, pos)?.filter(|u| is_unit_visible(world, ctx, u)))
}

/// Unit on the caller's ally team.
pub(crate) fn ally_unit<'w>(world: &'w World, ctx: &AccessContext, args: &Args<'_>, pos: usize) -> Parsed<'w, Unit> {
    Ok(unit_at(world, args, pos)?.filter(|u| is_ally_unit(ctx, u)))
}

/// Unit in LOS.
pub(crate) fn in_los_unit<'w>(world: &'w World, ctx: &AccessContext, args: &Args<'_>, pos: usize) -> Parsed<'w, Unit> {
    Ok(unit_at(world, args, pos)?.filter(|u| is_unit_in_los(world, ctx, u)))
}

/// Identified unit.
pub(crate) fn typed_unit<'w>(world: &'w World, ctx: &AccessContext, args: &Args<'_>, pos: usize) -> Parsed<'w, Unit> {
    Ok(unit_at(world, args, pos)?.filter(|u| is_unit_typed(world, ctx, u)))
}

/// Feature the caller can see.
pub(crate) fn feature<'w>(world: &'w World, ctx: &AccessContext, args: &Args<'_>, pos: usize) -> Parsed<'w, Feature> {
    let id = args.check_id(pos, "featureID")?;
    Ok(world.features.get_raw(id).filter(|f| is_feature_visible(world, ctx, f)))
}

/// Projectile the caller can see.
pub(crate) fn projectile<'w>(world: &'w World, ctx: &AccessContext, args: &Args<'_>, pos: usize) -> Parsed<'w, Projectile> {
    let id = args.check_id(pos, "projectileID")?;
    Ok(world.projectiles.get_raw(id).filter(|p| is_projectile_visible(world, ctx, p)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::fixture::*;
    use super::super::Value;
    use crate::core::vec3::FixedVec3;
    use crate::sensor::LosStatus;

    #[test]
    fn test_unit_tiers() {
        let mut world = world();
        let id = world.spawn_unit(42, 1, FixedVec3::from_ints(300, 0, 300)).unwrap();
        world.ledger.set_status(id, 0, LosStatus::radar_blip());
        let ctx = AccessContext::as_team(&world, 0);
        let values = [n(id)];
        let args = Args::new("Test", &values);
        assert!(unit(&world, &ctx, &args, 1).unwrap().is_some());
        assert!(in_los_unit(&world, &ctx, &args, 1).unwrap().is_none());
        assert!(typed_unit(&world, &ctx, &args, 1).unwrap().is_none());
        assert!(ally_unit(&world, &ctx, &args, 1).unwrap().is_none());
    }

    #[test]
    fn test_non_numeric_id_is_error() {
        let world = world();
        let values = [Value::from("tank")];
        let args = Args::new("GetUnitHealth", &values);
        let err = unit(&world, &AccessContext::synced(), &args, 1).unwrap_err();
        assert_eq!(err, QueryError::IdNotANumber { func: "GetUnitHealth", arg: 1, what: "unitID" });
        let values = [n(-5)];
        let args = Args::new("GetUnitHealth", &values);
        assert!(unit(&world, &AccessContext::synced(), &args, 1).unwrap().is_none());
    }
}
