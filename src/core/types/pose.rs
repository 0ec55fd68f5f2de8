//! Pose and displacement types for planar odometry.

use serde::{Deserialize, Serialize};

/// Robot pose on the field plane.
///
/// Represents position (x, y) in meters and heading (theta) in radians.
/// Theta is normalized to [-π, π].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose2D {
    /// X position in meters
    pub x: f32,
    /// Y position in meters
    pub y: f32,
    /// Heading in radians, normalized to [-π, π]
    pub theta: f32,
}

impl Pose2D {
    /// Create a new pose with theta normalized to [-π, π].
    #[inline]
    pub fn new(x: f32, y: f32, theta: f32) -> Self {
        Self {
            x,
            y,
            theta: crate::core::math::normalize_angle(theta),
        }
    }

    /// Identity pose at origin with zero heading.
    #[inline]
    pub fn identity() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            theta: 0.0,
        }
    }

    /// Compose two poses: self ⊕ other.
    ///
    /// Applies `other` as a transform expressed in `self`'s frame.
    #[inline]
    pub fn compose(&self, other: &Pose2D) -> Pose2D {
        let (sin_t, cos_t) = self.theta.sin_cos();
        Pose2D::new(
            self.x + other.x * cos_t - other.y * sin_t,
            self.y + other.x * sin_t + other.y * cos_t,
            self.theta + other.theta,
        )
    }

    /// Inverse of this pose: the transform that undoes it.
    #[inline]
    pub fn inverse(&self) -> Pose2D {
        let (sin_t, cos_t) = self.theta.sin_cos();
        Pose2D::new(
            -self.x * cos_t - self.y * sin_t,
            self.x * sin_t - self.y * cos_t,
            -self.theta,
        )
    }

    /// Integrate a body-frame displacement twist into this pose.
    ///
    /// Uses the constant-curvature (arc) model: the twist is taken as
    /// motion along a circular arc over the interval, which keeps straight
    /// segments exact and removes the heading-order error of naive Euler
    /// integration. Falls back to the straight-line form when the rotation
    /// is below numerical resolution.
    pub fn exp(&self, twist: &Twist2D) -> Pose2D {
        const STRAIGHT_THRESHOLD: f32 = 1e-6;

        let local = if twist.dtheta.abs() < STRAIGHT_THRESHOLD {
            Pose2D::new(twist.dx, twist.dy, twist.dtheta)
        } else {
            let s = twist.dtheta.sin() / twist.dtheta;
            let c = (1.0 - twist.dtheta.cos()) / twist.dtheta;
            Pose2D::new(
                twist.dx * s - twist.dy * c,
                twist.dx * c + twist.dy * s,
                twist.dtheta,
            )
        };
        self.compose(&local)
    }
}

impl Default for Pose2D {
    fn default() -> Self {
        Self::identity()
    }
}

/// Body-frame chassis displacement over one control interval.
///
/// Produced by forward kinematics from module position deltas; consumed
/// by [`Pose2D::exp`]. Distinct from a velocity: these are meters and
/// radians, not meters/sec.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Twist2D {
    /// Displacement along the robot's forward axis (meters)
    pub dx: f32,
    /// Displacement along the robot's left axis (meters)
    pub dy: f32,
    /// Rotation (radians, positive CCW)
    pub dtheta: f32,
}

impl Twist2D {
    /// Create a new displacement twist.
    #[inline]
    pub fn new(dx: f32, dy: f32, dtheta: f32) -> Self {
        Self { dx, dy, dtheta }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_pose_compose_identity() {
        let p = Pose2D::new(1.0, 2.0, 0.5);
        let result = p.compose(&Pose2D::identity());
        assert_relative_eq!(result.x, p.x);
        assert_relative_eq!(result.y, p.y);
        assert_relative_eq!(result.theta, p.theta);
    }

    #[test]
    fn test_pose_inverse_roundtrip() {
        let p = Pose2D::new(1.0, 2.0, 0.5);
        let result = p.compose(&p.inverse());
        assert_relative_eq!(result.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(result.y, 0.0, epsilon = 1e-6);
        assert_relative_eq!(result.theta, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_pose_composition_order() {
        let move_forward = Pose2D::new(1.0, 0.0, 0.0);
        let rotate = Pose2D::new(0.0, 0.0, FRAC_PI_2);

        let result = rotate.compose(&move_forward);
        assert_relative_eq!(result.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(result.y, 1.0, epsilon = 1e-6);
        assert_relative_eq!(result.theta, FRAC_PI_2, epsilon = 1e-6);
    }

    #[test]
    fn test_exp_straight_line() {
        let pose = Pose2D::identity();
        let result = pose.exp(&Twist2D::new(1.0, 0.0, 0.0));
        assert_relative_eq!(result.x, 1.0, epsilon = 1e-6);
        assert_relative_eq!(result.y, 0.0, epsilon = 1e-6);
        assert_relative_eq!(result.theta, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_exp_straight_respects_heading() {
        let pose = Pose2D::new(0.0, 0.0, FRAC_PI_2);
        let result = pose.exp(&Twist2D::new(1.0, 0.0, 0.0));
        assert_relative_eq!(result.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(result.y, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_exp_quarter_arc() {
        // Forward 1m of arc length while rotating 90° traces a quarter
        // circle of radius 2/π: ends at (r, r) with heading 90°.
        let pose = Pose2D::identity();
        let result = pose.exp(&Twist2D::new(1.0, 0.0, FRAC_PI_2));
        let radius = 1.0 / FRAC_PI_2;
        assert_relative_eq!(result.x, radius, epsilon = 1e-5);
        assert_relative_eq!(result.y, radius * (1.0 - FRAC_PI_2.cos()), epsilon = 1e-5);
        assert_relative_eq!(result.theta, FRAC_PI_2, epsilon = 1e-6);
    }

    #[test]
    fn test_exp_pure_rotation() {
        let pose = Pose2D::new(3.0, 4.0, 0.0);
        let result = pose.exp(&Twist2D::new(0.0, 0.0, PI / 3.0));
        assert_relative_eq!(result.x, 3.0, epsilon = 1e-6);
        assert_relative_eq!(result.y, 4.0, epsilon = 1e-6);
        assert_relative_eq!(result.theta, PI / 3.0, epsilon = 1e-6);
    }

    #[test]
    fn test_exp_full_turn_returns_to_start() {
        // Closing the circle: arc length equal to one full turn of any
        // radius must come back to the starting point.
        let pose = Pose2D::identity();
        let mut current = pose;
        let steps = 8;
        for _ in 0..steps {
            current = current.exp(&Twist2D::new(1.0, 0.0, 2.0 * PI / steps as f32));
        }
        assert_relative_eq!(current.x, 0.0, epsilon = 1e-4);
        assert_relative_eq!(current.y, 0.0, epsilon = 1e-4);
    }

    #[test]
    fn test_default_is_identity() {
        let pose = Pose2D::default();
        assert_eq!(pose, Pose2D::identity());
    }
}
