//! Rigid-body chassis velocity command.

use serde::{Deserialize, Serialize};

/// Planar rigid-body velocity of the chassis.
///
/// Components are expressed in the robot frame: `vx` forward, `vy` left,
/// `omega` CCW about the rotation center. A field-relative command must be
/// rotated into the robot frame with [`ChassisVelocity::from_field_relative`]
/// before it reaches the kinematics.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ChassisVelocity {
    /// Forward velocity (m/s)
    pub vx: f32,
    /// Leftward velocity (m/s)
    pub vy: f32,
    /// Angular velocity (rad/s, positive CCW)
    pub omega: f32,
}

impl ChassisVelocity {
    /// Create a robot-relative velocity command.
    #[inline]
    pub fn new(vx: f32, vy: f32, omega: f32) -> Self {
        Self { vx, vy, omega }
    }

    /// Convert a field-relative command into the robot frame.
    ///
    /// `heading_rad` is the robot's current heading on the field. The
    /// linear components are rotated by -heading; omega is frame-invariant.
    pub fn from_field_relative(vx: f32, vy: f32, omega: f32, heading_rad: f32) -> Self {
        let (sin_h, cos_h) = heading_rad.sin_cos();
        Self {
            vx: vx * cos_h + vy * sin_h,
            vy: -vx * sin_h + vy * cos_h,
            omega,
        }
    }

    /// Check whether this command is effectively zero motion.
    #[inline]
    pub fn is_stationary(&self) -> bool {
        self.vx.abs() < 1e-6 && self.vy.abs() < 1e-6 && self.omega.abs() < 1e-6
    }
}
