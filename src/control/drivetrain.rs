//! Drivetrain orchestration: one control cycle end to end.
//!
//! The drivetrain owns the four modules, the heading sensor and the shared
//! pose estimator, and wires them together once per tick:
//!
//! ```text
//! command ──► inverse kinematics ──► desaturate ──► 4× set_desired_state
//!                                                         │
//! vision ──► estimator (async)  ◄── heading + positions ◄─┘  (next tick)
//! ```
//!
//! `tick` is an explicit function of (pending command, timestamp) returning
//! a plain snapshot, so the whole cycle runs under test without any
//! scheduler. The estimator sits behind a mutex because vision observations
//! arrive from a different timing domain; the lock is held only for the
//! update itself.

use parking_lot::Mutex;
use std::sync::Arc;

use super::module::{SwerveModule, SwerveModuleConfig};
use crate::config::DriveConfig;
use crate::core::types::{ChassisVelocity, ModulePosition, ModuleState, Pose2D};
use crate::estimation::PoseEstimator;
use crate::hardware::{HeadingSensor, ModuleDriver};
use crate::kinematics::{MODULE_COUNT, SwerveKinematics};
use crate::error::Result;

/// Operator-style drive command in joystick fractions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriveCommand {
    /// Forward/backward fraction in [-1, 1]
    pub x_percent: f32,
    /// Left/right fraction in [-1, 1]
    pub y_percent: f32,
    /// Rotation fraction in [-1, 1]; full scale is one turn per second
    pub rot_percent: f32,
    /// Interpret the linear components in the field frame
    pub field_relative: bool,
}

/// Plain state snapshot produced by each tick, for telemetry and tests.
#[derive(Debug, Clone, Copy)]
pub struct TickSnapshot {
    /// Estimated pose after this cycle's odometry update
    pub pose: Pose2D,
    /// Desired module states actually dispatched (post-desaturation,
    /// post-optimization)
    pub desired_states: [ModuleState; MODULE_COUNT],
    /// Measured module states at dispatch time
    pub measured_states: [ModuleState; MODULE_COUNT],
}

/// Four-module swerve drivetrain with pose estimation.
pub struct Drivetrain {
    config: DriveConfig,
    kinematics: SwerveKinematics,
    modules: [SwerveModule; MODULE_COUNT],
    heading: Box<dyn HeadingSensor>,
    estimator: Arc<Mutex<PoseEstimator>>,
    /// States computed by the most recent command, dispatched next tick.
    pending: [ModuleState; MODULE_COUNT],
    park_mode: bool,
}

impl Drivetrain {
    /// Build a drivetrain from validated configuration and injected
    /// hardware. Fails on invalid geometry or parameters; per-cycle calls
    /// cannot fail after this.
    pub fn new(
        config: DriveConfig,
        drivers: [Box<dyn ModuleDriver>; MODULE_COUNT],
        heading: Box<dyn HeadingSensor>,
    ) -> Result<Self> {
        config.validate()?;
        let kinematics = SwerveKinematics::new(config.geometry())?;
        let estimator = Arc::new(Mutex::new(PoseEstimator::new(
            kinematics.clone(),
            Pose2D::identity(),
            config.estimator,
        )));

        let module_config = |i: usize| SwerveModuleConfig {
            absolute_offset_deg: config.modules[i].absolute_offset_deg,
            speed_deadband_mps: config.speed_deadband_mps(),
            feedforward: config.drive_feedforward(),
        };
        let [d0, d1, d2, d3] = drivers;
        let modules = [
            SwerveModule::new(0, d0, module_config(0)),
            SwerveModule::new(1, d1, module_config(1)),
            SwerveModule::new(2, d2, module_config(2)),
            SwerveModule::new(3, d3, module_config(3)),
        ];

        log::info!(
            "drivetrain up: max speed {:.2} m/s, estimator horizon {:.1}s",
            config.limits.max_speed_mps,
            config.estimator.history_horizon_s
        );

        Ok(Self {
            config,
            kinematics,
            modules,
            heading,
            estimator,
            pending: [ModuleState::default(); MODULE_COUNT],
            park_mode: false,
        })
    }

    /// Apply an operator drive command.
    ///
    /// Commands inside the joystick deadzones park the wheels in the
    /// X formation instead of commanding zero speed at the last angle.
    pub fn drive(&mut self, cmd: DriveCommand) {
        let limits = self.config.limits;
        let active = cmd.x_percent.abs() > limits.linear_deadzone
            || cmd.y_percent.abs() > limits.linear_deadzone
            || cmd.rot_percent.abs() > limits.rotation_deadzone;

        if !active {
            self.stop_locked();
            return;
        }

        let vx = cmd.x_percent * limits.max_speed_mps;
        let vy = cmd.y_percent * limits.max_speed_mps;
        let omega = (cmd.rot_percent * 360.0).to_radians();

        let velocity = if cmd.field_relative {
            ChassisVelocity::from_field_relative(
                vx,
                vy,
                omega,
                self.heading.yaw_degrees().to_radians(),
            )
        } else {
            ChassisVelocity::new(vx, vy, omega)
        };
        self.set_chassis_velocity(velocity);
    }

    /// Command a robot-relative chassis velocity directly (the entry point
    /// a path follower uses).
    pub fn set_chassis_velocity(&mut self, velocity: ChassisVelocity) {
        self.park_mode = false;
        self.pending = self.kinematics.to_module_states(velocity);
    }

    /// Stop and turn the wheels into an X so the robot resists pushing.
    pub fn stop_locked(&mut self) {
        self.park_mode = true;
        self.pending = [
            ModuleState::new(45.0, 0.0),   // front left
            ModuleState::new(-45.0, 0.0),  // front right
            ModuleState::new(-45.0, 0.0),  // back left
            ModuleState::new(45.0, 0.0),   // back right
        ];
    }

    /// Run one control cycle: desaturate and dispatch the pending module
    /// states, then advance the pose estimator with fresh measurements.
    pub fn tick(&mut self, timestamp_us: u64) -> TickSnapshot {
        let mut states = self.pending;
        SwerveKinematics::desaturate(&mut states, self.config.limits.max_speed_mps);

        let mut measured = [ModuleState::default(); MODULE_COUNT];
        let mut desired = [ModuleState::default(); MODULE_COUNT];
        let mut positions = [ModulePosition::default(); MODULE_COUNT];
        for (i, module) in self.modules.iter_mut().enumerate() {
            measured[i] = module.state();
            module.set_desired_state(states[i], true, self.park_mode);
            desired[i] = module.desired_state();
            positions[i] = module.position();
        }

        let heading = self.heading_sample();
        let pose = self.estimator.lock().update(timestamp_us, heading, &positions);

        TickSnapshot {
            pose,
            desired_states: desired,
            measured_states: measured,
        }
    }

    /// Re-seed every module's relative steering sensor from its absolute
    /// sensor. Done once after power-up, before the first drive command.
    pub fn reset_all_to_absolute(&mut self) {
        log::info!("zeroing steering encoders from absolute sensors");
        for module in &mut self.modules {
            module.reset_to_absolute();
        }
    }

    /// Re-zero the heading sensor so the current facing becomes 0°, and
    /// drop the estimator's heading anchor so the discontinuity is not
    /// integrated as rotation.
    pub fn zero_heading(&mut self) {
        self.heading.zero_yaw();
        self.estimator.lock().reset_heading_anchor();
    }

    /// Re-anchor odometry at a known pose.
    pub fn reset_odometry(&mut self, timestamp_us: u64, pose: Pose2D) {
        let mut positions = [ModulePosition::default(); MODULE_COUNT];
        for (i, module) in self.modules.iter().enumerate() {
            positions[i] = module.position();
        }
        let heading = self.heading_sample();
        self.estimator
            .lock()
            .reset_to(timestamp_us, pose, heading, &positions);
    }

    /// Switch all drive motors between brake and coast.
    pub fn set_neutral_mode(&mut self, brake: bool) {
        for module in &mut self.modules {
            module.set_brake(brake);
        }
    }

    /// Current estimated pose.
    pub fn pose(&self) -> Pose2D {
        self.estimator.lock().pose()
    }

    /// Shared estimator handle for the vision pipeline; lock it to call
    /// `add_vision_measurement` from another thread.
    pub fn estimator_handle(&self) -> Arc<Mutex<PoseEstimator>> {
        Arc::clone(&self.estimator)
    }

    /// Measured states of all modules.
    pub fn module_states(&self) -> [ModuleState; MODULE_COUNT] {
        let mut states = [ModuleState::default(); MODULE_COUNT];
        for (i, module) in self.modules.iter().enumerate() {
            states[i] = module.state();
        }
        states
    }

    /// Auxiliary attitude telemetry from the heading sensor.
    pub fn attitude_degrees(&self) -> (f32, f32) {
        (self.heading.pitch_degrees(), self.heading.roll_degrees())
    }

    fn heading_sample(&self) -> Option<f32> {
        if self.heading.is_calibrated() {
            Some(self.heading.yaw_degrees())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::{MockHeadingSensor, MockModuleDriver};
    use approx::assert_relative_eq;

    fn test_drivetrain() -> (Drivetrain, [MockModuleDriver; 4], MockHeadingSensor) {
        let config = DriveConfig::square_chassis_defaults();
        let wheel = config.wheel;
        let make = || {
            MockModuleDriver::new(
                wheel.circumference_m,
                wheel.drive_gear_ratio,
                wheel.steer_gear_ratio,
            )
        };
        let drivers = [make(), make(), make(), make()];
        let handles = drivers.clone();
        let sensor = MockHeadingSensor::new();
        let drivetrain = Drivetrain::new(
            config,
            drivers.map(|d| Box::new(d) as Box<dyn ModuleDriver>),
            Box::new(sensor.clone()),
        )
        .unwrap();
        (drivetrain, handles, sensor)
    }

    #[test]
    fn test_duplicate_geometry_fails_construction() {
        let mut config = DriveConfig::square_chassis_defaults();
        config.modules[1].x = config.modules[0].x;
        config.modules[1].y = config.modules[0].y;
        let make = || {
            Box::new(MockModuleDriver::new(0.319, 6.75, 12.8)) as Box<dyn ModuleDriver>
        };
        let result = Drivetrain::new(
            config,
            [make(), make(), make(), make()],
            Box::new(MockHeadingSensor::new()),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_forward_command_drives_all_modules_forward() {
        let (mut drivetrain, _, _) = test_drivetrain();
        drivetrain.drive(DriveCommand {
            x_percent: 0.5,
            y_percent: 0.0,
            rot_percent: 0.0,
            field_relative: false,
        });
        let snapshot = drivetrain.tick(20_000);

        for state in &snapshot.desired_states {
            assert_relative_eq!(state.angle_deg, 0.0, epsilon = 1e-4);
            assert_relative_eq!(state.speed_mps, 0.5 * 4.5, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_idle_command_parks_in_x() {
        let (mut drivetrain, _, _) = test_drivetrain();
        drivetrain.drive(DriveCommand {
            x_percent: 0.0,
            y_percent: 0.01,
            rot_percent: 0.0,
            field_relative: false,
        });
        let snapshot = drivetrain.tick(20_000);

        let angles: Vec<f32> = snapshot
            .desired_states
            .iter()
            .map(|s| s.angle_deg)
            .collect();
        assert_relative_eq!(angles[0], 45.0, epsilon = 1e-4);
        assert_relative_eq!(angles[1], -45.0, epsilon = 1e-4);
        assert_relative_eq!(angles[2], -45.0, epsilon = 1e-4);
        assert_relative_eq!(angles[3], 45.0, epsilon = 1e-4);
        for state in &snapshot.desired_states {
            assert_eq!(state.speed_mps, 0.0);
        }
    }

    #[test]
    fn test_tick_desaturates_overspeed_command() {
        let (mut drivetrain, _, _) = test_drivetrain();
        // Full translation + full spin exceeds any single wheel's cap
        drivetrain.set_chassis_velocity(ChassisVelocity::new(4.5, 0.0, 8.0));
        let snapshot = drivetrain.tick(20_000);

        let max = snapshot
            .desired_states
            .iter()
            .map(|s| s.speed_mps.abs())
            .fold(0.0f32, f32::max);
        assert_relative_eq!(max, 4.5, epsilon = 1e-3);
    }

    #[test]
    fn test_field_relative_uses_heading() {
        let (mut drivetrain, _, sensor) = test_drivetrain();
        sensor.set_yaw(90.0);
        drivetrain.drive(DriveCommand {
            x_percent: 0.5,
            y_percent: 0.0,
            rot_percent: 0.0,
            field_relative: true,
        });
        let snapshot = drivetrain.tick(20_000);

        // Field-forward while facing +90° means robot-right (-90°);
        // reverse optimization may express that as +90° with negative speed.
        let state = snapshot.desired_states[0];
        let forward_component =
            state.speed_mps * state.angle_deg.to_radians().cos();
        assert_relative_eq!(forward_component, 0.0, epsilon = 1e-3);
        let left_component = state.speed_mps * state.angle_deg.to_radians().sin();
        assert_relative_eq!(left_component, -0.5 * 4.5, epsilon = 1e-3);
    }

    #[test]
    fn test_odometry_through_ticks() {
        let (mut drivetrain, handles, _) = test_drivetrain();
        drivetrain.set_chassis_velocity(ChassisVelocity::new(1.0, 0.0, 0.0));

        // 1 second of cycles at 50 Hz; step the simulated hardware between
        for i in 1..=50u64 {
            drivetrain.tick(i * 20_000);
            for handle in &handles {
                handle.step(0.02);
            }
        }
        let snapshot = drivetrain.tick(51 * 20_000);
        assert_relative_eq!(snapshot.pose.x, 1.0, epsilon = 1e-2);
        assert_relative_eq!(snapshot.pose.y, 0.0, epsilon = 1e-3);
    }

    #[test]
    fn test_zero_heading_does_not_fake_rotation() {
        let (mut drivetrain, _, sensor) = test_drivetrain();
        sensor.set_yaw(135.0);
        drivetrain.tick(20_000);
        drivetrain.zero_heading();
        let snapshot = drivetrain.tick(40_000);
        assert_relative_eq!(snapshot.pose.theta, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_reset_odometry_reanchors_pose() {
        let (mut drivetrain, _, _) = test_drivetrain();
        drivetrain.tick(20_000);
        drivetrain.reset_odometry(40_000, Pose2D::new(3.0, 2.0, 0.0));
        assert_relative_eq!(drivetrain.pose().x, 3.0);
        assert_relative_eq!(drivetrain.pose().y, 2.0);
    }

    #[test]
    fn test_neutral_mode_reaches_drivers() {
        let (mut drivetrain, handles, _) = test_drivetrain();
        drivetrain.set_neutral_mode(true);
        for handle in &handles {
            assert!(handle.is_brake());
        }
    }
}
