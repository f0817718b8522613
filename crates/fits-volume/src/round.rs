//! Nearest-integer rounding shared by every voxel conversion.
//!
//! Ties go to the even neighbour, so `0.5 -> 0`, `1.5 -> 2`, `2.5 -> 2` and
//! `-0.5 -> 0`. A half-voxel box edge therefore lands on the same voxel no
//! matter which side of the origin it sits on.

/// Round `v` to the nearest integer, ties to even.
///
/// Values beyond the `i64` range saturate; NaN maps to 0. Callers reject
/// non-finite input before getting here.
pub fn round_half_even(v: f64) -> i64 {
    libm::rint(v) as i64
}
