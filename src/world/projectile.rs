//! Projectiles
//!
//! Only synced projectiles live here. Visual-only projectiles never enter
//! the synced world, so every id a query sees is a synced id.

use serde::{Serialize, Deserialize};

use crate::core::fixed::Fixed;
use crate::core::vec3::FixedVec3;
use super::{ProjectileId, UnitId, FeatureId, TeamId, AllyTeamId, WeaponDefId};

/// What a weapon projectile is flying at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectileTarget {
    /// A ground position
    Ground(FixedVec3),
    /// A unit
    Unit(UnitId),
    /// A feature
    Feature(FeatureId),
    /// Another projectile (interception)
    Projectile(ProjectileId),
}

impl ProjectileTarget {
    /// Target type code as scripts see it (`'g'`, `'u'`, `'f'`, `'p'`).
    pub fn code(&self) -> u8 {
        match self {
            ProjectileTarget::Ground(_) => b'g',
            ProjectileTarget::Unit(_) => b'u',
            ProjectileTarget::Feature(_) => b'f',
            ProjectileTarget::Projectile(_) => b'p',
        }
    }
}

/// Projectile class and its class-specific state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectileKind {
    /// Fired by a weapon
    Weapon {
        /// Weapon definition
        def_id: WeaponDefId,
        /// Current target
        target: ProjectileTarget,
        /// An interceptor is tracking this projectile
        intercepted: bool,
        /// Frames left before expiry
        ttl: i32,
    },
    /// Debris thrown off a dying unit
    Piece {
        /// Explosion flag bits
        explosion_flags: u32,
    },
}

/// A live synced projectile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Projectile {
    /// Stable id
    pub id: ProjectileId,
    /// Firing unit, if still known
    pub owner: Option<UnitId>,
    /// Team of the owner
    pub team: TeamId,
    /// Ally team of the owner
    pub ally_team: AllyTeamId,
    /// Position
    pub pos: FixedVec3,
    /// Unit direction
    pub dir: FixedVec3,
    /// Velocity per frame
    pub velocity: FixedVec3,
    /// Gravity applied each frame
    pub gravity: Fixed,
    /// Class data
    pub kind: ProjectileKind,
}

impl Projectile {
    /// True for weapon projectiles.
    #[inline]
    pub fn is_weapon(&self) -> bool {
        matches!(self.kind, ProjectileKind::Weapon { .. })
    }

    /// True for piece projectiles.
    #[inline]
    pub fn is_piece(&self) -> bool {
        matches!(self.kind, ProjectileKind::Piece { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_codes() {
        assert_eq!(ProjectileTarget::Ground(FixedVec3::ZERO).code(), b'g');
        assert_eq!(ProjectileTarget::Unit(1).code(), b'u');
        assert_eq!(ProjectileTarget::Feature(1).code(), b'f');
        assert_eq!(ProjectileTarget::Projectile(1).code(), b'p');
    }
}
