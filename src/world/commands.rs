//! Orders
//!
//! Pending order queues and the command buttons a unit offers. The
//! command AI executes them; this side only stores what it reads.

use std::collections::VecDeque;
use serde::{Serialize, Deserialize};

use crate::core::fixed::Fixed;
use super::UnitDefId;

/// Option bit: meta key held
pub const OPT_META: u8 = 1 << 2;
/// Option bit: order generated by the engine
pub const OPT_INTERNAL: u8 = 1 << 3;
/// Option bit: issued with the right mouse button
pub const OPT_RIGHT: u8 = 1 << 4;
/// Option bit: shift held (queue)
pub const OPT_SHIFT: u8 = 1 << 5;
/// Option bit: control held
pub const OPT_CTRL: u8 = 1 << 6;
/// Option bit: alt held
pub const OPT_ALT: u8 = 1 << 7;

/// Stop command id
pub const CMD_STOP: i32 = 0;
/// Move command id
pub const CMD_MOVE: i32 = 10;
/// Patrol command id
pub const CMD_PATROL: i32 = 15;
/// Attack command id
pub const CMD_ATTACK: i32 = 20;
/// Repair command id
pub const CMD_REPAIR: i32 = 40;

/// A queued order. Negative ids are build orders for def `-id`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    /// Command id
    pub id: i32,
    /// Option bits
    pub options: u8,
    /// Sequence tag
    pub tag: u32,
    /// Parameters
    pub params: Vec<Fixed>,
}

impl Command {
    /// Order with no options.
    pub fn new(id: i32, tag: u32, params: Vec<Fixed>) -> Self {
        Self { id, options: 0, tag, params }
    }

    /// Build order for a unit definition.
    pub fn build(def: UnitDefId, tag: u32) -> Self {
        Self::new(-(def as i32), tag, Vec::new())
    }

    /// Definition this build order produces.
    pub fn build_def(&self) -> Option<UnitDefId> {
        if self.id < 0 {
            Some(self.id.unsigned_abs())
        } else {
            None
        }
    }
}

/// Ordered pending commands, front first.
pub type CommandQueue = VecDeque<Command>;

/// A command button offered by a unit.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandDescription {
    /// Command id issued by the button
    pub id: i32,
    /// Button type code
    pub kind: i32,
    /// Caption
    pub name: String,
    /// Bound action name
    pub action: String,
    /// Hover text
    pub tooltip: String,
    /// Not shown in menus
    pub hidden: bool,
    /// Greyed out
    pub disabled: bool,
    /// Shown once for a multi-unit selection
    pub show_unique: bool,
    /// Extra parameters
    pub params: Vec<String>,
}

/// Run-length encode consecutive equal values.
pub fn run_lengths<I>(items: I) -> Vec<(i64, u32)>
where
    I: IntoIterator<Item = i64>,
{
    let mut runs: Vec<(i64, u32)> = Vec::new();
    for item in items {
        match runs.last_mut() {
            Some((value, count)) if *value == item => *count += 1,
            _ => runs.push((item, 1)),
        }
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_def() {
        assert_eq!(Command::build(42, 1).build_def(), Some(42));
        assert_eq!(Command::new(CMD_MOVE, 1, vec![]).build_def(), None);
    }

    #[test]
    fn test_run_lengths() {
        let runs = run_lengths(vec![5, 5, 7, 5, 5, 5]);
        assert_eq!(runs, vec![(5, 2), (7, 1), (5, 3)]);
        assert!(run_lengths(Vec::<i64>::new()).is_empty());
    }
}
