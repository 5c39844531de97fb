//! Per-(unit, ally team) visibility status.
//!
//! ```text
//!   bit  0  IN_LOS       currently in line of sight
//!   bit  1  IN_RADAR     currently on radar
//!   bit  2  PREV_LOS     has been in LOS at some point
//!   bit  3  CONT_RADAR   on radar without a gap since last in LOS
//!   bits 8-11            mask bits: freeze the matching status bit
//! ```

use std::fmt;
use serde::{Serialize, Deserialize};

/// Currently in line of sight.
pub const LOS_INLOS: u16 = 1 << 0;
/// Currently on radar.
pub const LOS_INRADAR: u16 = 1 << 1;
/// Previously in line of sight.
pub const LOS_PREVLOS: u16 = 1 << 2;
/// Continuously on radar since last seen.
pub const LOS_CONTRADAR: u16 = 1 << 3;

/// All four status bits.
pub const LOS_ALL_BITS: u16 = LOS_INLOS | LOS_INRADAR | LOS_PREVLOS | LOS_CONTRADAR;
/// All four mask bits.
pub const LOS_ALL_MASK_BITS: u16 = LOS_ALL_BITS << 8;

/// Status bits an observer may always see.
pub const LOS_CURR_BITS: u16 = LOS_INLOS | LOS_INRADAR;
/// Status bits that together mean "typed".
pub const LOS_TYPED_BITS: u16 = LOS_PREVLOS | LOS_CONTRADAR;

/// Visibility bitmask of one unit for one ally team.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LosStatus(u16);

impl LosStatus {
    /// Nothing known.
    pub const NONE: Self = Self(0);

    /// Every status and mask bit set.
    pub const FULL: Self = Self(LOS_ALL_BITS | LOS_ALL_MASK_BITS);

    /// From raw bits.
    #[inline]
    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    /// Raw bits.
    #[inline]
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Seen right now: in LOS and therefore also previously seen and on
    /// continuous radar.
    #[inline]
    pub const fn seen() -> Self {
        Self(LOS_INLOS | LOS_INRADAR | LOS_PREVLOS | LOS_CONTRADAR)
    }

    /// A fresh radar contact that was never seen.
    #[inline]
    pub const fn radar_blip() -> Self {
        Self(LOS_INRADAR)
    }

    /// Add bits.
    #[inline]
    pub const fn with(self, bits: u16) -> Self {
        Self(self.0 | bits)
    }

    /// Remove bits.
    #[inline]
    pub const fn without(self, bits: u16) -> Self {
        Self(self.0 & !bits)
    }

    /// All of `bits` are set.
    #[inline]
    pub const fn has(self, bits: u16) -> bool {
        self.0 & bits == bits
    }

    /// In LOS.
    #[inline]
    pub const fn in_los(self) -> bool {
        self.has(LOS_INLOS)
    }

    /// On radar.
    #[inline]
    pub const fn in_radar(self) -> bool {
        self.has(LOS_INRADAR)
    }

    /// Previously seen and continuously tracked since.
    #[inline]
    pub const fn is_typed(self) -> bool {
        self.has(LOS_TYPED_BITS)
    }

    /// Apply one sensor pass.
    ///
    /// Mask bits freeze the status bits they cover. In LOS sets every
    /// status bit; otherwise LOS drops, and losing radar also ends the
    /// continuous-radar streak.
    pub fn updated(self, in_los: bool, in_radar: bool) -> Self {
        if self.0 & LOS_ALL_MASK_BITS == LOS_ALL_MASK_BITS {
            return self;
        }
        let update_mask = !(self.0 >> 8) & LOS_ALL_BITS;
        let mut bits = self.0;
        if in_los {
            bits |= update_mask & LOS_ALL_BITS;
        } else {
            bits &= !(update_mask & LOS_INLOS);
            if in_radar {
                bits |= update_mask & LOS_INRADAR;
            } else {
                bits &= !(update_mask & (LOS_INRADAR | LOS_CONTRADAR));
            }
        }
        Self(bits)
    }

    /// What a caller without full read may see of the raw bits: the
    /// current bits always, the history bits only when both are set.
    pub fn redacted(self) -> Self {
        let history = if self.is_typed() { LOS_TYPED_BITS } else { 0 };
        Self(self.0 & (history | LOS_CURR_BITS))
    }
}

impl fmt::Debug for LosStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LosStatus({:#06x})", self.0)
    }
}
