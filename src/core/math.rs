//! Angle arithmetic for drivetrain control.
//!
//! Module steering angles are handled in degrees on the half-open range
//! (-180°, 180°] (the actuator-native convention), while chassis headings
//! are handled in radians on [-π, π]. Both families wrap, so every
//! comparison goes through the shortest-path helpers here rather than
//! naive subtraction.

use std::f32::consts::PI;

/// Normalize a radian angle to [-π, π].
///
/// # Example
/// ```
/// use chakra_drive::core::math::normalize_angle;
/// use std::f32::consts::PI;
///
/// assert!((normalize_angle(3.0 * PI) - PI).abs() < 1e-6);
/// assert!((normalize_angle(-3.0 * PI) - (-PI)).abs() < 1e-6);
/// ```
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    let mut a = angle % (2.0 * PI);
    if a > PI {
        a -= 2.0 * PI;
    } else if a < -PI {
        a += 2.0 * PI;
    }
    a
}

/// Shortest signed radian difference from angle `a` to angle `b`.
#[inline]
pub fn angle_diff(a: f32, b: f32) -> f32 {
    normalize_angle(b - a)
}

/// Wrap a degree angle into (-180°, 180°].
///
/// Exactly -180° maps to +180°, matching the steering convention where
/// the two names for the half-turn collapse onto one.
///
/// # Example
/// ```
/// use chakra_drive::core::math::wrap_degrees;
///
/// assert_eq!(wrap_degrees(270.0), -90.0);
/// assert_eq!(wrap_degrees(-180.0), 180.0);
/// ```
#[inline]
pub fn wrap_degrees(angle: f32) -> f32 {
    let mut a = angle % 360.0;
    if a > 180.0 {
        a -= 360.0;
    } else if a <= -180.0 {
        a += 360.0;
    }
    a
}

/// Shortest signed degree rotation from angle `from` to angle `to`.
///
/// Returns a value in (-180°, 180°]; crossing the ±180° seam takes the
/// short way around.
#[inline]
pub fn degrees_diff(from: f32, to: f32) -> f32 {
    wrap_degrees(to - from)
}
