//! Hardware capability traits.
//!
//! The control and estimation layers never touch vendor motor-controller or
//! sensor APIs directly; they talk to these traits. Concrete drivers own the
//! conversion between actuator-native units (motor rotations, rotations/sec)
//! and the mechanical units used here (degrees, meters, m/s) via
//! [`crate::core::units`], so everything crossing this boundary is already
//! mechanical.
//!
//! All reads are non-blocking polls of the driver's latest cached value;
//! none of these calls may block on I/O.

mod mock;

pub use mock::{MockHeadingSensor, MockModuleDriver};

/// One swerve module's actuator pair plus its angle sensors.
///
/// The steering closed loop and the drive velocity closed loop run inside
/// the driver (vendor firmware or a software loop); this trait carries
/// setpoints down and measurements up.
pub trait ModuleDriver: Send {
    /// Command the steering closed loop to `angle_deg` (logical degrees,
    /// (-180°, 180°]).
    fn set_steer_angle(&mut self, angle_deg: f32);

    /// Command the drive velocity closed loop to `speed_mps`, with a
    /// feed-forward term in volts computed by the caller.
    fn set_drive_velocity(&mut self, speed_mps: f32, feedforward_volts: f32);

    /// Current steering angle from the relative sensor (logical degrees).
    fn steer_angle(&self) -> f32;

    /// Current drive velocity (m/s, signed).
    fn drive_velocity(&self) -> f32;

    /// Cumulative signed drive distance since startup (meters).
    fn drive_distance(&self) -> f32;

    /// Current reading of the absolute steering sensor (logical degrees).
    ///
    /// Noisier and slower than the relative sensor; used only to re-seed
    /// the relative sensor, never for the closed loop.
    fn absolute_angle(&self) -> f32;

    /// Overwrite the relative steering sensor's reading.
    ///
    /// Called once at startup/recovery because the relative sensor loses
    /// its absolute reference on power cycle.
    fn seed_steer_angle(&mut self, angle_deg: f32);

    /// Switch the drive motor between brake and coast on zero output.
    fn set_brake(&mut self, brake: bool);
}

/// Inertial heading source.
///
/// Yaw is continuous (accumulates past ±180°) and drifts; drift is
/// corrected only through vision fusion, never by the sensor itself.
pub trait HeadingSensor: Send {
    /// Continuous yaw angle in degrees (CCW positive, not wrapped).
    fn yaw_degrees(&self) -> f32;

    /// Whether the sensor currently reports a valid, calibrated heading.
    fn is_calibrated(&self) -> bool;

    /// Re-zero the yaw so the current facing reads 0°.
    fn zero_yaw(&mut self);

    /// Pitch in degrees. Read-only telemetry, not used by estimation.
    fn pitch_degrees(&self) -> f32;

    /// Roll in degrees. Read-only telemetry, not used by estimation.
    fn roll_degrees(&self) -> f32;
}
