//! Fixed-Point 3D Vector
//!
//! World-space positions, velocities and orientation vectors.
//! `y` is height; the ground plane is `x`/`z`.

use std::fmt;
use serde::{Serialize, Deserialize};

use super::fixed::{
    Fixed, FIXED_ONE, fixed_mul, fixed_div, fixed_sqrt, from_int, to_f64,
};

/// 3D vector with fixed-point components.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FixedVec3 {
    /// X component
    pub x: Fixed,
    /// Y component (height)
    pub y: Fixed,
    /// Z component
    pub z: Fixed,
}

impl FixedVec3 {
    /// Zero vector
    pub const ZERO: Self = Self { x: 0, y: 0, z: 0 };

    /// Unit vector pointing up (+Y)
    pub const UP: Self = Self { x: 0, y: FIXED_ONE, z: 0 };

    /// Unit vector pointing along +Z (default unit facing)
    pub const FORWARD: Self = Self { x: 0, y: 0, z: FIXED_ONE };

    /// Unit vector pointing along -X (right-hand side of a +Z facing unit)
    pub const RIGHT: Self = Self { x: -FIXED_ONE, y: 0, z: 0 };

    /// Create from fixed-point components.
    #[inline]
    pub const fn new(x: Fixed, y: Fixed, z: Fixed) -> Self {
        Self { x, y, z }
    }

    /// Create from integer components.
    #[inline]
    pub const fn from_ints(x: i64, y: i64, z: i64) -> Self {
        Self { x: from_int(x), y: from_int(y), z: from_int(z) }
    }

    /// Component-wise sum.
    #[inline]
    pub fn add(self, other: Self) -> Self {
        Self {
            x: self.x.wrapping_add(other.x),
            y: self.y.wrapping_add(other.y),
            z: self.z.wrapping_add(other.z),
        }
    }

    /// Component-wise difference.
    #[inline]
    pub fn sub(self, other: Self) -> Self {
        Self {
            x: self.x.wrapping_sub(other.x),
            y: self.y.wrapping_sub(other.y),
            z: self.z.wrapping_sub(other.z),
        }
    }

    /// Scale by a fixed-point scalar.
    #[inline]
    pub fn scale(self, scalar: Fixed) -> Self {
        Self {
            x: fixed_mul(self.x, scalar),
            y: fixed_mul(self.y, scalar),
            z: fixed_mul(self.z, scalar),
        }
    }

    /// Divide by an integer (used for per-frame deltas).
    #[inline]
    pub fn div_int(self, divisor: i64) -> Self {
        if divisor == 0 {
            return Self::ZERO;
        }
        Self { x: self.x / divisor, y: self.y / divisor, z: self.z / divisor }
    }

    /// Negated vector.
    #[inline]
    pub fn neg(self) -> Self {
        Self { x: -self.x, y: -self.y, z: -self.z }
    }

    /// Dot product.
    #[inline]
    pub fn dot(self, other: Self) -> Fixed {
        fixed_mul(self.x, other.x)
            .wrapping_add(fixed_mul(self.y, other.y))
            .wrapping_add(fixed_mul(self.z, other.z))
    }

    /// Squared length.
    #[inline]
    pub fn length_squared(self) -> Fixed {
        self.dot(self)
    }

    /// Length (magnitude).
    #[inline]
    pub fn length(self) -> Fixed {
        fixed_sqrt(self.length_squared())
    }

    /// Length of the ground-plane projection.
    #[inline]
    pub fn length_2d(self) -> Fixed {
        fixed_sqrt(fixed_mul(self.x, self.x).wrapping_add(fixed_mul(self.z, self.z)))
    }

    /// Squared distance to another point.
    #[inline]
    pub fn distance_squared(self, other: Self) -> Fixed {
        self.sub(other).length_squared()
    }

    /// Squared distance on the ground plane (ignores height).
    #[inline]
    pub fn distance_squared_2d(self, other: Self) -> Fixed {
        let dx = self.x.wrapping_sub(other.x);
        let dz = self.z.wrapping_sub(other.z);
        fixed_mul(dx, dx).wrapping_add(fixed_mul(dz, dz))
    }

    /// Distance to another point.
    #[inline]
    pub fn distance(self, other: Self) -> Fixed {
        fixed_sqrt(self.distance_squared(other))
    }

    /// Ground-plane distance to another point.
    #[inline]
    pub fn distance_2d(self, other: Self) -> Fixed {
        fixed_sqrt(self.distance_squared_2d(other))
    }

    /// Unit-length copy; the zero vector stays zero.
    pub fn normalize(self) -> Self {
        let len = self.length();
        if len == 0 {
            return Self::ZERO;
        }
        Self {
            x: fixed_div(self.x, len),
            y: fixed_div(self.y, len),
            z: fixed_div(self.z, len),
        }
    }

    /// Components as script numbers.
    pub fn to_f64s(self) -> (f64, f64, f64) {
        (to_f64(self.x), to_f64(self.y), to_f64(self.z))
    }
}

impl fmt::Debug for FixedVec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (x, y, z) = self.to_f64s();
        write!(f, "Vec3({:.3}, {:.3}, {:.3})", x, y, z)
    }
}
