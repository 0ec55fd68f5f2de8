//! In-process simulated hardware for tests and hardware-free development.
//!
//! The mock module driver keeps its internal state in actuator-native
//! units (motor rotations, rotations/sec) and converts at the trait
//! boundary with [`crate::core::units`], the same way a real driver wraps
//! a motor controller. Closed loops are ideal: setpoints are reached
//! immediately, and [`MockModuleDriver::step`] advances the simulated
//! clock so distance accumulates.
//!
//! Both mocks are cheaply cloneable handles over shared state, so a test
//! can keep one handle while the drivetrain owns the other.

use super::{HeadingSensor, ModuleDriver};
use crate::core::units::{
    degrees_to_rotations, logical_to_physical_angle, mps_to_rotations_per_sec,
    physical_to_logical_angle, rotations_per_sec_to_mps, rotations_to_degrees,
    rotations_to_meters,
};
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Default)]
struct ModuleSim {
    /// Relative steering sensor, in steer-motor rotations
    steer_rotations: f32,
    /// Drive closed-loop setpoint, in drive-motor rotations/sec
    drive_rps: f32,
    /// Cumulative drive-motor rotations
    drive_rotations: f32,
    /// Absolute sensor reading, logical degrees
    absolute_deg: f32,
    /// Last feed-forward handed down (volts)
    feedforward_volts: f32,
    brake: bool,
}

/// Simulated swerve module driver.
#[derive(Debug, Clone)]
pub struct MockModuleDriver {
    sim: Arc<Mutex<ModuleSim>>,
    wheel_circumference_m: f32,
    drive_gear_ratio: f32,
    steer_gear_ratio: f32,
}

impl MockModuleDriver {
    /// Create an idle module simulation with the given mechanical
    /// parameters.
    pub fn new(wheel_circumference_m: f32, drive_gear_ratio: f32, steer_gear_ratio: f32) -> Self {
        Self {
            sim: Arc::new(Mutex::new(ModuleSim::default())),
            wheel_circumference_m,
            drive_gear_ratio,
            steer_gear_ratio,
        }
    }

    /// Advance the simulation by `dt` seconds: distance accumulates at the
    /// commanded velocity.
    pub fn step(&self, dt_s: f32) {
        let mut sim = self.sim.lock();
        sim.drive_rotations += sim.drive_rps * dt_s;
    }

    /// Set what the absolute sensor reads (logical degrees).
    pub fn set_absolute_angle(&self, angle_deg: f32) {
        self.sim.lock().absolute_deg = angle_deg;
    }

    /// Last feed-forward term handed to the drive loop (volts).
    pub fn feedforward_volts(&self) -> f32 {
        self.sim.lock().feedforward_volts
    }

    /// Whether the drive motor is in brake mode.
    pub fn is_brake(&self) -> bool {
        self.sim.lock().brake
    }
}

impl ModuleDriver for MockModuleDriver {
    fn set_steer_angle(&mut self, angle_deg: f32) {
        // Ideal closed loop: the relative sensor lands on the setpoint.
        let physical = logical_to_physical_angle(angle_deg);
        self.sim.lock().steer_rotations = degrees_to_rotations(physical, self.steer_gear_ratio);
    }

    fn set_drive_velocity(&mut self, speed_mps: f32, feedforward_volts: f32) {
        let mut sim = self.sim.lock();
        sim.drive_rps =
            mps_to_rotations_per_sec(speed_mps, self.wheel_circumference_m, self.drive_gear_ratio);
        sim.feedforward_volts = feedforward_volts;
    }

    fn steer_angle(&self) -> f32 {
        let physical = rotations_to_degrees(self.sim.lock().steer_rotations, self.steer_gear_ratio);
        physical_to_logical_angle(physical)
    }

    fn drive_velocity(&self) -> f32 {
        rotations_per_sec_to_mps(
            self.sim.lock().drive_rps,
            self.wheel_circumference_m,
            self.drive_gear_ratio,
        )
    }

    fn drive_distance(&self) -> f32 {
        rotations_to_meters(
            self.sim.lock().drive_rotations,
            self.wheel_circumference_m,
            self.drive_gear_ratio,
        )
    }

    fn absolute_angle(&self) -> f32 {
        self.sim.lock().absolute_deg
    }

    fn seed_steer_angle(&mut self, angle_deg: f32) {
        let physical = logical_to_physical_angle(angle_deg);
        self.sim.lock().steer_rotations = degrees_to_rotations(physical, self.steer_gear_ratio);
    }

    fn set_brake(&mut self, brake: bool) {
        self.sim.lock().brake = brake;
    }
}

#[derive(Debug)]
struct HeadingSim {
    yaw_deg: f32,
    yaw_offset_deg: f32,
    calibrated: bool,
    pitch_deg: f32,
    roll_deg: f32,
}

impl Default for HeadingSim {
    fn default() -> Self {
        Self {
            yaw_deg: 0.0,
            yaw_offset_deg: 0.0,
            calibrated: true,
            pitch_deg: 0.0,
            roll_deg: 0.0,
        }
    }
}

/// Simulated inertial heading sensor with settable yaw and validity.
#[derive(Debug, Clone, Default)]
pub struct MockHeadingSensor {
    sim: Arc<Mutex<HeadingSim>>,
}

impl MockHeadingSensor {
    /// Create a calibrated sensor reading 0°.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the raw continuous yaw (test input).
    pub fn set_yaw(&self, yaw_deg: f32) {
        self.sim.lock().yaw_deg = yaw_deg;
    }

    /// Set whether the sensor reports as calibrated.
    pub fn set_calibrated(&self, calibrated: bool) {
        self.sim.lock().calibrated = calibrated;
    }

    /// Set auxiliary pitch/roll telemetry.
    pub fn set_attitude(&self, pitch_deg: f32, roll_deg: f32) {
        let mut sim = self.sim.lock();
        sim.pitch_deg = pitch_deg;
        sim.roll_deg = roll_deg;
    }
}

impl HeadingSensor for MockHeadingSensor {
    fn yaw_degrees(&self) -> f32 {
        let sim = self.sim.lock();
        sim.yaw_deg - sim.yaw_offset_deg
    }

    fn is_calibrated(&self) -> bool {
        self.sim.lock().calibrated
    }

    fn zero_yaw(&mut self) {
        let mut sim = self.sim.lock();
        sim.yaw_offset_deg = sim.yaw_deg;
    }

    fn pitch_degrees(&self) -> f32 {
        self.sim.lock().pitch_deg
    }

    fn roll_degrees(&self) -> f32 {
        self.sim.lock().roll_deg
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_steer_setpoint_roundtrip() {
        let mut driver = MockModuleDriver::new(0.319, 6.75, 12.8);
        driver.set_steer_angle(37.0);
        assert_relative_eq!(driver.steer_angle(), 37.0, epsilon = 1e-4);
    }

    #[test]
    fn test_drive_velocity_roundtrip() {
        let mut driver = MockModuleDriver::new(0.319, 6.75, 12.8);
        driver.set_drive_velocity(3.5, 0.0);
        assert_relative_eq!(driver.drive_velocity(), 3.5, epsilon = 1e-4);
    }

    #[test]
    fn test_distance_accumulates_with_step() {
        let mut driver = MockModuleDriver::new(0.319, 6.75, 12.8);
        driver.set_drive_velocity(2.0, 0.0);
        for _ in 0..50 {
            driver.step(0.02);
        }
        assert_relative_eq!(driver.drive_distance(), 2.0, epsilon = 1e-3);
    }

    #[test]
    fn test_seed_overwrites_relative_sensor() {
        let mut driver = MockModuleDriver::new(0.319, 6.75, 12.8);
        driver.set_steer_angle(45.0);
        driver.seed_steer_angle(-120.0);
        assert_relative_eq!(driver.steer_angle(), -120.0, epsilon = 1e-4);
    }

    #[test]
    fn test_clone_shares_state() {
        let mut driver = MockModuleDriver::new(0.319, 6.75, 12.8);
        let handle = driver.clone();
        driver.set_drive_velocity(1.0, 0.0);
        handle.step(1.0);
        assert_relative_eq!(driver.drive_distance(), 1.0, epsilon = 1e-4);
    }

    #[test]
    fn test_heading_zero_yaw() {
        let mut sensor = MockHeadingSensor::new();
        sensor.set_yaw(73.0);
        sensor.zero_yaw();
        assert_relative_eq!(sensor.yaw_degrees(), 0.0);

        sensor.set_yaw(83.0);
        assert_relative_eq!(sensor.yaw_degrees(), 10.0);
    }

    #[test]
    fn test_heading_continuous_past_half_turn() {
        let sensor = MockHeadingSensor::new();
        sensor.set_yaw(450.0);
        // Continuous convention: no wrap at ±180°
        assert_relative_eq!(sensor.yaw_degrees(), 450.0);
    }
}
