//! Radar position error.
//!
//! Every unit carries one error vector that walks toward a fresh random
//! target on a fixed cadence. Observers that only see the unit on radar
//! get its position displaced by `vector * ally-team error size`. The walk
//! runs from the simulation step, never from queries.

use serde::{Serialize, Deserialize};

use crate::core::fixed::{Fixed, fixed_mul, to_fixed};
use crate::core::rng::DeterministicRng;
use crate::core::vec3::FixedVec3;

/// Vertical error is damped relative to the ground plane.
const VERTICAL_DAMPING: Fixed = to_fixed(0.2);

/// Error state of one unit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RadarError {
    /// Current error vector (unit-sphere scale)
    pub vector: FixedVec3,
    /// Per-frame change of the vector
    pub delta: FixedVec3,
    /// Frames until the next target is drawn
    pub next_update: u32,
    /// Ally teams the error applies to, one bit each
    pub mask: u64,
}

impl Default for RadarError {
    fn default() -> Self {
        Self { vector: FixedVec3::ZERO, delta: FixedVec3::ZERO, next_update: 0, mask: u64::MAX }
    }
}

impl RadarError {
    /// Whether the error applies to an ally team.
    #[inline]
    pub fn applies_to(&self, ally_team: usize) -> bool {
        ally_team < 64 && self.mask & (1 << ally_team) != 0
    }

    /// Toggle the error for an ally team.
    pub fn set_applies_to(&mut self, ally_team: usize, on: bool) {
        if ally_team >= 64 {
            return;
        }
        if on {
            self.mask |= 1 << ally_team;
        } else {
            self.mask &= !(1 << ally_team);
        }
    }

    /// Advance one frame.
    ///
    /// When the countdown expires a new target is drawn; the delta is set
    /// so the vector reaches it exactly when the next countdown expires.
    pub fn step(&mut self, rng: &mut DeterministicRng, interval: u32) {
        let interval = interval.max(1);
        if self.next_update == 0 {
            let mut target = rng.next_vector();
            target.y = fixed_mul(target.y, VERTICAL_DAMPING);
            // Keep walking roughly the same way instead of jittering
            if self.vector.dot(target) < 0 {
                target = target.neg();
            }
            self.delta = target.sub(self.vector).div_int(interval as i64);
            self.next_update = interval;
        }
        self.vector = self.vector.add(self.delta);
        self.next_update -= 1;
    }
}
