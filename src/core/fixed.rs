//! Q48.16 Fixed-Point Arithmetic
//!
//! Deterministic fixed-point math for the synced world state.
//! Every simulation quantity (positions, health, resources, radii) is an
//! integer; floats only exist at the script boundary.
//!
//! ## Format: Q48.16
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Bit Layout: Q48.16 (64-bit signed integer)                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │  [S][I x 47 ........................][FFFFFFFFFFFFFFFF]     │
//! │   │  └──────────── 47 bits ─────────┘└──── 16 bits ───┘     │
//! │   └─ Sign bit                                               │
//! │                                                             │
//! │  Precision: 1/65536 ≈ 0.000015 elmos                        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Maps are tens of thousands of elmos across, so squared distances
//! need far more headroom than a 32-bit word gives. Products widen to
//! i128 before shifting back.

/// Q48.16 fixed-point number stored as i64.
pub type Fixed = i64;

/// Number of fractional bits (16)
pub const FIXED_SCALE: u32 = 16;

/// 1.0 in fixed-point (65536)
pub const FIXED_ONE: Fixed = 1 << FIXED_SCALE;

/// 0.5 in fixed-point (32768)
pub const FIXED_HALF: Fixed = FIXED_ONE >> 1;

// =============================================================================
// ENGINE CONSTANTS
// =============================================================================

/// Simulation frames per game second.
pub const GAME_SPEED: u32 = 30;

/// Edge of one height-map square in elmos.
pub const SQUARE_SIZE: i64 = 8;

/// Frames between slow-update passes (radar error walk cadence).
pub const UNIT_SLOWUPDATE_RATE: u32 = GAME_SPEED / 2;

/// Heading units per full turn.
pub const HEADING_FULL_TURN: i64 = 65536;

// =============================================================================
// CORE OPERATIONS
// =============================================================================

/// Convert a compile-time float to fixed-point.
///
/// Only use for constants and test fixtures.
#[inline]
pub const fn to_fixed(f: f64) -> Fixed {
    (f * (FIXED_ONE as f64)) as Fixed
}

/// Convert an integer to fixed-point.
#[inline]
pub const fn from_int(i: i64) -> Fixed {
    i << FIXED_SCALE
}

/// Convert fixed-point to a script number.
///
/// The conversion is exact for every value below 2^37 in magnitude.
#[inline]
pub fn to_f64(f: Fixed) -> f64 {
    f as f64 / FIXED_ONE as f64
}

/// Convert a script-supplied number into fixed-point.
///
/// Truncates toward zero; NaN maps to 0 and infinities saturate.
#[inline]
pub fn from_f64(f: f64) -> Fixed {
    if f.is_nan() {
        return 0;
    }
    let scaled = f * FIXED_ONE as f64;
    if scaled >= i64::MAX as f64 {
        i64::MAX
    } else if scaled <= i64::MIN as f64 {
        i64::MIN
    } else {
        scaled as Fixed
    }
}

/// Multiply two fixed-point numbers through an i128 intermediate.
#[inline]
pub fn fixed_mul(a: Fixed, b: Fixed) -> Fixed {
    let wide = (a as i128) * (b as i128);
    (wide >> FIXED_SCALE) as Fixed
}

/// Divide two fixed-point numbers.
///
/// Returns 0 on divide-by-zero instead of panicking.
#[inline]
pub fn fixed_div(a: Fixed, b: Fixed) -> Fixed {
    if b == 0 {
        return 0;
    }
    let wide = (a as i128) << FIXED_SCALE;
    (wide / b as i128) as Fixed
}

/// Square root, exact to the last fractional bit (floor).
///
/// Returns 0 for non-positive inputs. Uses integer Newton iteration on
/// the widened value, which converges to the same result on every target.
pub fn fixed_sqrt(x: Fixed) -> Fixed {
    if x <= 0 {
        return 0;
    }
    isqrt((x as u128) << FIXED_SCALE) as Fixed
}

fn isqrt(n: u128) -> u128 {
    if n < 2 {
        return n;
    }
    let mut x = n;
    let mut y = (x + 1) >> 1;
    while y < x {
        x = y;
        y = (x + n / x) >> 1;
    }
    x
}

/// Absolute value of a fixed-point number.
#[inline]
pub fn fixed_abs(x: Fixed) -> Fixed {
    x.wrapping_abs()
}

/// Clamp a fixed-point number to a range.
#[inline]
pub fn fixed_clamp(value: Fixed, min: Fixed, max: Fixed) -> Fixed {
    value.max(min).min(max)
}

/// Linear interpolation: a + (b - a) * t, with t in [0, FIXED_ONE].
#[inline]
pub fn fixed_lerp(a: Fixed, b: Fixed, t: Fixed) -> Fixed {
    a.wrapping_add(fixed_mul(b.wrapping_sub(a), t))
}

/// Truncate to the integer part (toward negative infinity).
#[inline]
pub fn fixed_floor_int(x: Fixed) -> i64 {
    x >> FIXED_SCALE
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_constants() {
        assert_eq!(FIXED_ONE, 65536);
        assert_eq!(FIXED_HALF, 32768);
        assert_eq!(from_int(3), 3 * FIXED_ONE);
    }

    #[test]
    fn test_to_fixed_and_back() {
        assert_eq!(to_fixed(1.0), FIXED_ONE);
        assert_eq!(to_fixed(-2.5), -(FIXED_ONE * 5 / 2));
        assert_eq!(to_f64(to_fixed(100.0)), 100.0);
        assert_eq!(from_f64(0.25), FIXED_ONE / 4);
        assert_eq!(from_f64(f64::NAN), 0);
        assert_eq!(from_f64(f64::INFINITY), i64::MAX);
    }

    #[test]
    fn test_fixed_mul_large_map_coordinates() {
        // 12000 elmos squared would overflow a 32-bit representation.
        let d = from_int(12_000);
        assert_eq!(fixed_mul(d, d), from_int(144_000_000));
        assert_eq!(fixed_mul(FIXED_HALF, FIXED_HALF), FIXED_ONE / 4);
        assert_eq!(fixed_mul(from_int(-2), from_int(3)), from_int(-6));
    }

    #[test]
    fn test_fixed_div() {
        assert_eq!(fixed_div(from_int(6), from_int(2)), from_int(3));
        assert_eq!(fixed_div(from_int(50), from_int(100)), FIXED_HALF);
        assert_eq!(fixed_div(FIXED_ONE, 0), 0);
    }

    #[test]
    fn test_fixed_sqrt() {
        assert_eq!(fixed_sqrt(from_int(4)), from_int(2));
        assert_eq!(fixed_sqrt(from_int(144_000_000)), from_int(12_000));
        assert_eq!(fixed_sqrt(0), 0);
        assert_eq!(fixed_sqrt(-FIXED_ONE), 0);
        let two = fixed_sqrt(from_int(2));
        assert!((to_f64(two) - std::f64::consts::SQRT_2).abs() < 0.0001);
    }

    #[test]
    fn test_fixed_lerp_and_clamp() {
        assert_eq!(fixed_lerp(0, from_int(10), FIXED_HALF), from_int(5));
        assert_eq!(fixed_clamp(from_int(20), 0, from_int(10)), from_int(10));
        assert_eq!(fixed_floor_int(to_fixed(-0.5)), -1);
    }
}
