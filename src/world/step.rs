//! Frame Bookkeeping
//!
//! The slice of the simulation step this crate owns: advancing the frame
//! counter, walking radar errors and sampling team statistics. Queries
//! never call into here.
//!
//! # Determinism
//!
//! - Radar errors are walked in unit id order from the caller's RNG
//! - Statistics sampling depends only on the frame number

use tracing::trace;

use crate::core::rng::DeterministicRng;
use super::state::World;

/// What happened during one frame.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StepResult {
    /// Frame number after the step
    pub frame: u32,
    /// Team statistics were sampled this frame
    pub stats_recorded: bool,
}

impl World {
    /// Advance the world by one frame.
    pub fn advance_frame(&mut self, rng: &mut DeterministicRng) -> StepResult {
        self.frame = self.frame.wrapping_add(1);
        self.ledger.walk_errors(rng, self.config.pos_error_update_interval);

        let interval = self.config.stats_frame_interval.max(1);
        let stats_recorded = self.frame % interval == 0;
        if stats_recorded {
            let frame = self.frame;
            for team in self.teams.teams_mut() {
                team.record_stats(frame);
            }
            trace!(frame, "team statistics sampled");
        }

        StepResult { frame: self.frame, stats_recorded }
    }
}
