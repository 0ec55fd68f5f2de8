//! Swerve drive kinematics.
//!
//! Bidirectional transform between a rigid-body chassis velocity and four
//! independent wheel (angle, speed) states, parameterized by the fixed
//! module offsets from the rotation center.
//!
//! # Model
//!
//! Each module i at offset (x_i, y_i) must realize the wheel velocity
//!
//! ```text
//! w_i = (vx - ω·y_i,  vy + ω·x_i)
//! ```
//!
//! Inverse kinematics converts that vector to (angle, speed). Forward
//! kinematics solves the overdetermined 8×3 system in the least-squares
//! sense through the normal equations; the 3×3 inverse is computed once at
//! construction because the geometry never changes.

use crate::core::math::wrap_degrees;
use crate::core::types::{ChassisVelocity, ModuleGeometry, ModulePosition, ModuleState, Twist2D};
use crate::error::{Error, Result};

/// Number of modules on the drivetrain.
pub const MODULE_COUNT: usize = 4;

/// Speed magnitude below which a wheel vector is treated as zero and the
/// previous commanded angle is held (m/s).
const ZERO_SPEED_THRESHOLD: f32 = 1e-6;

/// Stateless-math swerve kinematics with one piece of memory: the last
/// commanded angle per module, held when the commanded vector is zero so a
/// stationary robot never spins its steering.
#[derive(Debug, Clone)]
pub struct SwerveKinematics {
    geometry: [ModuleGeometry; MODULE_COUNT],
    /// Inverse of the normal matrix AᵀA for the least-squares solve.
    normal_inv: [[f32; 3]; 3],
    /// Last commanded angle per module, for the zero-vector hold.
    last_angles_deg: [f32; MODULE_COUNT],
}

impl SwerveKinematics {
    /// Build kinematics from the four module offsets.
    ///
    /// Fails if two modules share an offset or the geometry is degenerate
    /// (e.g. every module at the rotation center), which would make the
    /// forward solve singular. This is the construction-time fatal check;
    /// nothing on the per-cycle path can fail.
    pub fn new(geometry: [ModuleGeometry; MODULE_COUNT]) -> Result<Self> {
        for i in 0..MODULE_COUNT {
            for j in (i + 1)..MODULE_COUNT {
                if geometry[i] == geometry[j] {
                    return Err(Error::InvalidGeometry(format!(
                        "modules {i} and {j} share offset ({}, {})",
                        geometry[i].x, geometry[i].y
                    )));
                }
            }
        }

        let normal_inv = Self::invert_normal_matrix(&geometry)?;

        Ok(Self {
            geometry,
            normal_inv,
            last_angles_deg: [0.0; MODULE_COUNT],
        })
    }

    /// Module offsets this kinematics was built from.
    pub fn geometry(&self) -> &[ModuleGeometry; MODULE_COUNT] {
        &self.geometry
    }

    /// Inverse kinematics: chassis velocity to four module states.
    ///
    /// A module whose required wheel vector is zero keeps its previous
    /// commanded angle with zero speed.
    pub fn to_module_states(&mut self, v: ChassisVelocity) -> [ModuleState; MODULE_COUNT] {
        let mut states = [ModuleState::default(); MODULE_COUNT];

        for (i, geo) in self.geometry.iter().enumerate() {
            let wx = v.vx - v.omega * geo.y;
            let wy = v.vy + v.omega * geo.x;
            let speed = (wx * wx + wy * wy).sqrt();

            let angle_deg = if speed < ZERO_SPEED_THRESHOLD {
                self.last_angles_deg[i]
            } else {
                wrap_degrees(wy.atan2(wx).to_degrees())
            };

            self.last_angles_deg[i] = angle_deg;
            states[i] = ModuleState {
                angle_deg,
                speed_mps: if speed < ZERO_SPEED_THRESHOLD { 0.0 } else { speed },
            };
        }

        states
    }

    /// Uniformly scale module speeds down so none exceeds `max_speed_mps`.
    ///
    /// Angles are untouched and speed ratios between modules are
    /// preserved, so the chassis motion keeps its direction and curvature
    /// even when the requested speed is physically unattainable.
    pub fn desaturate(states: &mut [ModuleState; MODULE_COUNT], max_speed_mps: f32) {
        let max_commanded = states
            .iter()
            .map(|s| s.speed_mps.abs())
            .fold(0.0f32, f32::max);

        if max_commanded > max_speed_mps && max_commanded > 0.0 {
            let scale = max_speed_mps / max_commanded;
            for state in states.iter_mut() {
                state.speed_mps *= scale;
            }
        }
    }

    /// Forward kinematics: best-fit chassis velocity from measured module
    /// states (least-squares over all four wheel vectors).
    pub fn to_chassis_velocity(&self, states: &[ModuleState; MODULE_COUNT]) -> ChassisVelocity {
        let mut vectors = [(0.0f32, 0.0f32); MODULE_COUNT];
        for (i, state) in states.iter().enumerate() {
            let (sin_a, cos_a) = state.angle_deg.to_radians().sin_cos();
            vectors[i] = (state.speed_mps * cos_a, state.speed_mps * sin_a);
        }
        let (vx, vy, omega) = self.solve(&vectors);
        ChassisVelocity { vx, vy, omega }
    }

    /// Forward kinematics for odometry: best-fit chassis displacement from
    /// per-module (distance delta, angle) samples over one interval.
    pub fn deltas_to_twist(&self, deltas: &[ModulePosition; MODULE_COUNT]) -> Twist2D {
        let mut vectors = [(0.0f32, 0.0f32); MODULE_COUNT];
        for (i, delta) in deltas.iter().enumerate() {
            let (sin_a, cos_a) = delta.angle_deg.to_radians().sin_cos();
            vectors[i] = (delta.distance_m * cos_a, delta.distance_m * sin_a);
        }
        let (dx, dy, dtheta) = self.solve(&vectors);
        Twist2D { dx, dy, dtheta }
    }

    /// Least-squares solve of the 8×3 geometry system for four wheel
    /// vectors, via the precomputed normal-matrix inverse.
    fn solve(&self, vectors: &[(f32, f32); MODULE_COUNT]) -> (f32, f32, f32) {
        let mut rhs = [0.0f32; 3];
        for (geo, &(wx, wy)) in self.geometry.iter().zip(vectors.iter()) {
            rhs[0] += wx;
            rhs[1] += wy;
            rhs[2] += geo.x * wy - geo.y * wx;
        }

        let m = &self.normal_inv;
        (
            m[0][0] * rhs[0] + m[0][1] * rhs[1] + m[0][2] * rhs[2],
            m[1][0] * rhs[0] + m[1][1] * rhs[1] + m[1][2] * rhs[2],
            m[2][0] * rhs[0] + m[2][1] * rhs[1] + m[2][2] * rhs[2],
        )
    }

    /// Invert AᵀA for the module geometry.
    ///
    /// ```text
    /// AᵀA = | n     0    -Σy  |
    ///       | 0     n     Σx  |
    ///       | -Σy   Σx    Σr² |
    /// ```
    fn invert_normal_matrix(geometry: &[ModuleGeometry; MODULE_COUNT]) -> Result<[[f32; 3]; 3]> {
        let n = MODULE_COUNT as f32;
        let sum_x: f32 = geometry.iter().map(|g| g.x).sum();
        let sum_y: f32 = geometry.iter().map(|g| g.y).sum();
        let sum_r2: f32 = geometry.iter().map(|g| g.x * g.x + g.y * g.y).sum();

        let a = [
            [n, 0.0, -sum_y],
            [0.0, n, sum_x],
            [-sum_y, sum_x, sum_r2],
        ];

        let det = a[0][0] * (a[1][1] * a[2][2] - a[1][2] * a[2][1])
            - a[0][1] * (a[1][0] * a[2][2] - a[1][2] * a[2][0])
            + a[0][2] * (a[1][0] * a[2][1] - a[1][1] * a[2][0]);

        if det.abs() < 1e-9 {
            return Err(Error::InvalidGeometry(
                "module offsets give a singular kinematics matrix".to_string(),
            ));
        }

        let inv_det = 1.0 / det;
        let mut inv = [[0.0f32; 3]; 3];
        inv[0][0] = (a[1][1] * a[2][2] - a[1][2] * a[2][1]) * inv_det;
        inv[0][1] = (a[0][2] * a[2][1] - a[0][1] * a[2][2]) * inv_det;
        inv[0][2] = (a[0][1] * a[1][2] - a[0][2] * a[1][1]) * inv_det;
        inv[1][0] = (a[1][2] * a[2][0] - a[1][0] * a[2][2]) * inv_det;
        inv[1][1] = (a[0][0] * a[2][2] - a[0][2] * a[2][0]) * inv_det;
        inv[1][2] = (a[0][2] * a[1][0] - a[0][0] * a[1][2]) * inv_det;
        inv[2][0] = (a[1][0] * a[2][1] - a[1][1] * a[2][0]) * inv_det;
        inv[2][1] = (a[0][1] * a[2][0] - a[0][0] * a[2][1]) * inv_det;
        inv[2][2] = (a[0][0] * a[1][1] - a[0][1] * a[1][0]) * inv_det;

        Ok(inv)
    }
}
