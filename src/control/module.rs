//! Per-module closed-loop control policy.
//!
//! A swerve module is symmetric: steering 180° away and driving backward
//! produces the same wheel motion. The policy here exploits that to bound
//! every steering excursion to 90°, holds the last angle through the
//! near-zero-speed deadband so the steering never chatters, and re-seeds
//! the relative angle sensor from the absolute one after power-up.

use super::feedforward::DriveFeedforward;
use crate::core::math::wrap_degrees;
use crate::core::types::{ModulePosition, ModuleState};
use crate::hardware::ModuleDriver;

/// Per-module configuration.
#[derive(Debug, Clone, Copy)]
pub struct SwerveModuleConfig {
    /// Calibrated offset between the absolute sensor's zero and the
    /// wheel's true forward, in degrees.
    pub absolute_offset_deg: f32,
    /// Speed magnitude below which a new steering command is suppressed
    /// (m/s), unless park mode wants the angle regardless.
    pub speed_deadband_mps: f32,
    /// Drive feed-forward gains.
    pub feedforward: DriveFeedforward,
}

/// One independently steered, independently driven wheel assembly.
pub struct SwerveModule {
    id: usize,
    driver: Box<dyn ModuleDriver>,
    config: SwerveModuleConfig,
    /// Last angle actually commanded; held through the deadband and used
    /// as the reference for reverse optimization.
    last_angle_deg: f32,
    /// Last full desired state, exposed for telemetry.
    desired: ModuleState,
}

impl SwerveModule {
    /// Wrap a driver into a controlled module.
    pub fn new(id: usize, driver: Box<dyn ModuleDriver>, config: SwerveModuleConfig) -> Self {
        Self {
            id,
            driver,
            config,
            last_angle_deg: 0.0,
            desired: ModuleState::default(),
        }
    }

    /// Module index on the drivetrain (0..4).
    pub fn id(&self) -> usize {
        self.id
    }

    /// Current measured state (angle from the relative sensor, velocity
    /// from the drive loop).
    pub fn state(&self) -> ModuleState {
        ModuleState::new(self.driver.steer_angle(), self.driver.drive_velocity())
    }

    /// Current odometry sample (angle plus cumulative drive distance).
    pub fn position(&self) -> ModulePosition {
        ModulePosition::new(self.driver.steer_angle(), self.driver.drive_distance())
    }

    /// Last commanded desired state, for telemetry.
    pub fn desired_state(&self) -> ModuleState {
        self.desired
    }

    /// Apply a desired state through the control policy.
    ///
    /// With `allow_reverse_optimization`, a target more than 90° of
    /// steering away is replaced by its 180°-flipped twin with negated
    /// speed, so the wheel never turns further than a quarter turn.
    /// Below the speed deadband the previous angle is held unless
    /// `park_mode` is forcing a park formation.
    pub fn set_desired_state(
        &mut self,
        target: ModuleState,
        allow_reverse_optimization: bool,
        park_mode: bool,
    ) {
        let mut state = target;

        if allow_reverse_optimization {
            let reversed = state.reversed();
            if reversed.rotation_from(self.last_angle_deg).abs()
                < state.rotation_from(self.last_angle_deg).abs()
            {
                state = reversed;
            }
        }

        let angle_deg = if !park_mode && state.speed_mps.abs() < self.config.speed_deadband_mps {
            self.last_angle_deg
        } else {
            state.angle_deg
        };

        self.last_angle_deg = angle_deg;
        self.desired = ModuleState {
            angle_deg,
            speed_mps: state.speed_mps,
        };

        self.driver.set_steer_angle(angle_deg);
        self.driver
            .set_drive_velocity(state.speed_mps, self.config.feedforward.volts(state.speed_mps));
    }

    /// Re-seed the relative steering sensor from the absolute sensor.
    ///
    /// The relative sensor loses its reference on power cycle; the
    /// absolute sensor keeps it but is too noisy for the closed loop, so
    /// its reading (minus the calibrated offset) is copied over once.
    pub fn reset_to_absolute(&mut self) {
        let seeded = wrap_degrees(self.driver.absolute_angle() - self.config.absolute_offset_deg);
        log::debug!("module {}: seeding steer angle to {:.2}°", self.id, seeded);
        self.driver.seed_steer_angle(seeded);
        self.last_angle_deg = seeded;
    }

    /// Switch the drive motor between brake and coast.
    pub fn set_brake(&mut self, brake: bool) {
        self.driver.set_brake(brake);
    }
}
