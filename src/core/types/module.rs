//! Per-module state, position and geometry types.

use crate::core::math::{degrees_diff, wrap_degrees};
use serde::{Deserialize, Serialize};

/// Fixed 2D offset of a module's wheel contact point from the robot's
/// rotation center, in meters (x forward, y left).
///
/// Set once at construction; the kinematics matrices derive from these
/// and are never recomputed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModuleGeometry {
    /// Forward offset from rotation center (meters)
    pub x: f32,
    /// Leftward offset from rotation center (meters)
    pub y: f32,
}

impl ModuleGeometry {
    /// Create a module offset.
    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// One module's wheel state: steering angle and drive speed.
///
/// Used both as a command (desired state) and as a measurement. The angle
/// lives on (-180°, 180°]; speed is signed, so the same physical motion has
/// two representations 180° apart with opposite speed sign.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModuleState {
    /// Steering angle in degrees, wrapped to (-180°, 180°]
    pub angle_deg: f32,
    /// Signed wheel speed (m/s)
    pub speed_mps: f32,
}

impl ModuleState {
    /// Create a module state with the angle wrapped into range.
    #[inline]
    pub fn new(angle_deg: f32, speed_mps: f32) -> Self {
        Self {
            angle_deg: wrap_degrees(angle_deg),
            speed_mps,
        }
    }

    /// The equivalent state pointing the other way: angle flipped by 180°
    /// and speed negated. Describes the same wheel motion.
    #[inline]
    pub fn reversed(&self) -> ModuleState {
        ModuleState::new(self.angle_deg + 180.0, -self.speed_mps)
    }

    /// Steering rotation needed to reach this state's angle from
    /// `current_deg`, taking the short way around.
    #[inline]
    pub fn rotation_from(&self, current_deg: f32) -> f32 {
        degrees_diff(current_deg, self.angle_deg)
    }
}

impl Default for ModuleState {
    fn default() -> Self {
        Self {
            angle_deg: 0.0,
            speed_mps: 0.0,
        }
    }
}

/// One module's odometry sample: steering angle plus cumulative drive
/// distance.
///
/// Distance is the integral of signed wheel travel since startup, distinct
/// from the instantaneous speed in [`ModuleState`]. Odometry consumes
/// deltas between consecutive samples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModulePosition {
    /// Steering angle in degrees, wrapped to (-180°, 180°]
    pub angle_deg: f32,
    /// Cumulative signed drive distance (meters)
    pub distance_m: f32,
}

impl ModulePosition {
    /// Create a module position sample with the angle wrapped into range.
    #[inline]
    pub fn new(angle_deg: f32, distance_m: f32) -> Self {
        Self {
            angle_deg: wrap_degrees(angle_deg),
            distance_m,
        }
    }
}

impl Default for ModulePosition {
    fn default() -> Self {
        Self {
            angle_deg: 0.0,
            distance_m: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_module_state_wraps_angle() {
        let state = ModuleState::new(270.0, 1.0);
        assert_relative_eq!(state.angle_deg, -90.0);
    }

    #[test]
    fn test_reversed_flips_angle_and_speed() {
        let state = ModuleState::new(30.0, 2.0);
        let rev = state.reversed();
        assert_relative_eq!(rev.angle_deg, -150.0);
        assert_relative_eq!(rev.speed_mps, -2.0);
    }

    #[test]
    fn test_reversed_is_involution() {
        let state = ModuleState::new(-135.0, -1.5);
        let back = state.reversed().reversed();
        assert_relative_eq!(back.angle_deg, state.angle_deg, epsilon = 1e-5);
        assert_relative_eq!(back.speed_mps, state.speed_mps);
    }

    #[test]
    fn test_rotation_from_takes_short_way() {
        let state = ModuleState::new(-170.0, 1.0);
        assert_relative_eq!(state.rotation_from(170.0), 20.0, epsilon = 1e-5);
    }

    #[test]
    fn test_position_wraps_angle() {
        let pos = ModulePosition::new(-190.0, 4.2);
        assert_relative_eq!(pos.angle_deg, 170.0);
        assert_relative_eq!(pos.distance_m, 4.2);
    }
}
