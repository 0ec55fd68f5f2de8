//! Unit conversions between actuator-native and mechanical units.
//!
//! Motor controllers report rotations and rotations/sec at the motor
//! shaft; the rest of the crate works in degrees, meters and meters/sec at
//! the mechanism. Every conversion here is a pure linear scaling by the
//! gear ratio and wheel circumference, and each pair is an exact inverse
//! up to f32 rounding.
//!
//! The logical/physical angle pair corrects the fixed 90° offset between
//! the "forward = 0°" convention used by the kinematics and the steering
//! hardware's physical zero.

use crate::core::math::wrap_degrees;

/// Convert motor-shaft rotations to mechanism degrees.
#[inline]
pub fn rotations_to_degrees(rotations: f32, gear_ratio: f32) -> f32 {
    rotations * (360.0 / gear_ratio)
}

/// Convert mechanism degrees to motor-shaft rotations.
#[inline]
pub fn degrees_to_rotations(degrees: f32, gear_ratio: f32) -> f32 {
    degrees / (360.0 / gear_ratio)
}

/// Convert motor rotations/sec to mechanism RPM.
#[inline]
pub fn rotations_per_sec_to_rpm(rps: f32, gear_ratio: f32) -> f32 {
    rps * 60.0 / gear_ratio
}

/// Convert mechanism RPM to motor rotations/sec.
#[inline]
pub fn rpm_to_rotations_per_sec(rpm: f32, gear_ratio: f32) -> f32 {
    rpm * gear_ratio / 60.0
}

/// Convert motor rotations/sec to wheel surface speed (m/s).
#[inline]
pub fn rotations_per_sec_to_mps(rps: f32, circumference_m: f32, gear_ratio: f32) -> f32 {
    (rps / gear_ratio) * circumference_m
}

/// Convert wheel surface speed (m/s) to motor rotations/sec.
#[inline]
pub fn mps_to_rotations_per_sec(mps: f32, circumference_m: f32, gear_ratio: f32) -> f32 {
    (mps / circumference_m) * gear_ratio
}

/// Convert cumulative motor rotations to wheel travel distance (meters).
#[inline]
pub fn rotations_to_meters(rotations: f32, circumference_m: f32, gear_ratio: f32) -> f32 {
    rotations * (circumference_m / gear_ratio)
}

/// Convert wheel travel distance (meters) to cumulative motor rotations.
#[inline]
pub fn meters_to_rotations(meters: f32, circumference_m: f32, gear_ratio: f32) -> f32 {
    meters / (circumference_m / gear_ratio)
}

/// Map a logical steering angle ("forward = 0°") onto the physical zero,
/// which sits 90° clockwise of it. Result wrapped to (-180°, 180°].
#[inline]
pub fn logical_to_physical_angle(degrees: f32) -> f32 {
    wrap_degrees(degrees - 90.0)
}

/// Map a physical steering angle back into the logical "forward = 0°"
/// convention. Result wrapped to (-180°, 180°].
#[inline]
pub fn physical_to_logical_angle(degrees: f32) -> f32 {
    wrap_degrees(degrees + 90.0)
}
