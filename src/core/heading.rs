//! Integer Headings
//!
//! Unit facings are 16-bit headings (65536 per turn, 0 = +Z). Conversions
//! use CORDIC on fixed-point values so they are identical everywhere.

use super::fixed::{Fixed, HEADING_FULL_TURN};

/// atan(2^-i) in heading units.
const ATAN_TABLE: [i64; 16] = [
    8192, 4836, 2555, 1297, 651, 326, 163, 81, 41, 20, 10, 5, 3, 1, 1, 0,
];

/// CORDIC gain compensation (0.60725 in Q16)
const CORDIC_GAIN: Fixed = 39797;

const HALF_TURN: i64 = HEADING_FULL_TURN / 2;
const QUARTER_TURN: i64 = HEADING_FULL_TURN / 4;

/// Wrap any heading into [-32768, 32767].
pub fn wrap_heading(h: i64) -> i64 {
    (h.rem_euclid(HEADING_FULL_TURN) + HALF_TURN).rem_euclid(HEADING_FULL_TURN) - HALF_TURN
}

/// Heading of the ground-plane vector (x, z).
///
/// A zero vector yields heading 0.
pub fn heading_from_vector(x: Fixed, z: Fixed) -> i64 {
    if x == 0 && z == 0 {
        return 0;
    }
    // Only the direction matters; shrink so the rotations cannot overflow
    let mag = x.unsigned_abs().max(z.unsigned_abs());
    let excess = (u64::BITS - mag.leading_zeros()).saturating_sub(40);
    let (x, z) = (x >> excess, z >> excess);

    // cx runs along +Z (heading 0), cy along +X (heading +quarter turn)
    let (mut cx, mut cy, mut angle) = if z < 0 {
        (-z, -x, HALF_TURN)
    } else {
        (z, x, 0)
    };

    for (i, step) in ATAN_TABLE.iter().enumerate() {
        let (dx, dy) = (cx >> i, cy >> i);
        if cy > 0 {
            cx += dy;
            cy -= dx;
            angle += step;
        } else {
            cx -= dy;
            cy += dx;
            angle -= step;
        }
    }

    wrap_heading(angle)
}

/// Unit ground-plane vector (x, z) for a heading.
pub fn vector_from_heading(heading: i64) -> (Fixed, Fixed) {
    let mut h = wrap_heading(heading);
    let mut flip = false;
    if h > QUARTER_TURN {
        h -= HALF_TURN;
        flip = true;
    } else if h < -QUARTER_TURN {
        h += HALF_TURN;
        flip = true;
    }

    let (mut cos, mut sin) = (CORDIC_GAIN, 0);
    for (i, step) in ATAN_TABLE.iter().enumerate() {
        let (dc, ds) = (cos >> i, sin >> i);
        if h > 0 {
            cos -= ds;
            sin += dc;
            h -= step;
        } else {
            cos += ds;
            sin -= dc;
            h += step;
        }
    }

    if flip {
        (-sin, -cos)
    } else {
        (sin, cos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixed::{FIXED_ONE, from_int};

    fn close(a: i64, b: i64, tol: i64) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn test_cardinal_headings() {
        assert!(close(heading_from_vector(0, FIXED_ONE), 0, 8));
        assert!(close(heading_from_vector(FIXED_ONE, 0), 16384, 8));
        assert!(close(heading_from_vector(-FIXED_ONE, 0), -16384, 8));
        assert!(close(heading_from_vector(from_int(5), from_int(5)), 8192, 8));
        let back = heading_from_vector(0, -FIXED_ONE);
        assert!(close(back.abs(), 32768, 8));
    }

    #[test]
    fn test_vector_from_heading() {
        let (x, z) = vector_from_heading(0);
        assert!(close(x, 0, 64) && close(z, FIXED_ONE, 64));
        let (x, z) = vector_from_heading(16384);
        assert!(close(x, FIXED_ONE, 64) && close(z, 0, 64));
        let (x, z) = vector_from_heading(-32768);
        assert!(close(x, 0, 64) && close(z, -FIXED_ONE, 64));
    }

    #[test]
    fn test_heading_round_trip_is_stable() {
        for h in [-30000, -12000, -1, 0, 777, 16000, 25000] {
            let (x, z) = vector_from_heading(h);
            assert!(close(heading_from_vector(x, z), h, 16), "heading {}", h);
        }
    }

    #[test]
    fn test_wrap_heading() {
        assert_eq!(wrap_heading(32768), -32768);
        assert_eq!(wrap_heading(65536 + 5), 5);
        assert_eq!(wrap_heading(-32769), 32767);
        assert_eq!(wrap_heading(i64::MAX), wrap_heading(i64::MAX % 65536));
        assert!((-32768..32768).contains(&wrap_heading(i64::MIN)));
    }

    #[test]
    fn test_extreme_vectors() {
        assert!(close(heading_from_vector(i64::MAX, 0), 16384, 8));
        assert!(close(heading_from_vector(0, i64::MIN).abs(), 32768, 8));
        assert!(close(heading_from_vector(i64::MIN, i64::MIN), -24576, 8));
    }
}
