//! Drivetrain configuration.
//!
//! Loads from a TOML file with one section per concern plus one table per
//! module. Geometry and gains are fixed for the robot's lifetime;
//! [`DriveConfig::validate`] performs the construction-time fatal checks so
//! nothing on the control path has to.

use crate::control::DriveFeedforward;
use crate::core::types::ModuleGeometry;
use crate::error::{Error, Result};
use crate::estimation::PoseEstimatorConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Top-level drivetrain configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DriveConfig {
    pub limits: LimitsConfig,
    pub wheel: WheelConfig,
    pub control: ControlConfig,
    pub estimator: PoseEstimatorConfig,
    /// Exactly four modules: FL, FR, BL, BR.
    pub modules: [ModuleConfig; 4],
}

/// Speed limits and command deadzones.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct LimitsConfig {
    /// Maximum linear wheel speed (m/s); desaturation cap.
    pub max_speed_mps: f32,
    /// Joystick fraction below which a linear command counts as idle.
    pub linear_deadzone: f32,
    /// Joystick fraction below which a rotation command counts as idle.
    pub rotation_deadzone: f32,
}

/// Wheel and gearing parameters shared by all modules.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct WheelConfig {
    /// Wheel circumference (meters).
    pub circumference_m: f32,
    /// Motor rotations per wheel rotation on the drive stage.
    pub drive_gear_ratio: f32,
    /// Motor rotations per steering rotation.
    pub steer_gear_ratio: f32,
}

/// Module control-policy parameters.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct ControlConfig {
    /// Fraction of max speed under which a steering command is suppressed
    /// (anti-jitter deadband).
    pub speed_deadband_fraction: f32,
    /// Drive feed-forward static gain (volts).
    pub drive_ks: f32,
    /// Drive feed-forward velocity gain (volts per m/s).
    pub drive_kv: f32,
}

/// One module's placement and calibration.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct ModuleConfig {
    /// Forward offset from the rotation center (meters).
    pub x: f32,
    /// Leftward offset from the rotation center (meters).
    pub y: f32,
    /// Calibrated absolute-sensor offset (degrees).
    pub absolute_offset_deg: f32,
}

impl DriveConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: DriveConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Defaults for a square 0.6 m chassis on 4-inch wheels with the
    /// common 6.75:1 drive / 12.8:1 steering reductions. Suitable for
    /// simulation and tests; real robots load a calibrated file.
    pub fn square_chassis_defaults() -> Self {
        Self {
            limits: LimitsConfig {
                max_speed_mps: 4.5,
                linear_deadzone: 0.02,
                rotation_deadzone: 0.1,
            },
            wheel: WheelConfig {
                circumference_m: 0.319,
                drive_gear_ratio: 6.75,
                steer_gear_ratio: 12.8,
            },
            control: ControlConfig {
                speed_deadband_fraction: 0.01,
                drive_ks: 0.25,
                drive_kv: 2.44,
            },
            estimator: PoseEstimatorConfig::default(),
            modules: [
                ModuleConfig {
                    x: 0.3,
                    y: 0.3,
                    absolute_offset_deg: 0.0,
                },
                ModuleConfig {
                    x: 0.3,
                    y: -0.3,
                    absolute_offset_deg: 0.0,
                },
                ModuleConfig {
                    x: -0.3,
                    y: 0.3,
                    absolute_offset_deg: 0.0,
                },
                ModuleConfig {
                    x: -0.3,
                    y: -0.3,
                    absolute_offset_deg: 0.0,
                },
            ],
        }
    }

    /// Construction-time sanity checks. Detected once at startup, never
    /// per cycle.
    pub fn validate(&self) -> Result<()> {
        if !(self.wheel.circumference_m > 0.0) {
            return Err(Error::InvalidParameter(
                "wheel circumference must be positive".to_string(),
            ));
        }
        if !(self.wheel.drive_gear_ratio > 0.0) || !(self.wheel.steer_gear_ratio > 0.0) {
            return Err(Error::InvalidParameter(
                "gear ratios must be positive".to_string(),
            ));
        }
        if !(self.limits.max_speed_mps > 0.0) {
            return Err(Error::InvalidParameter(
                "max speed must be positive".to_string(),
            ));
        }
        if !(self.estimator.history_horizon_s > 0.0) {
            return Err(Error::InvalidParameter(
                "estimator history horizon must be positive".to_string(),
            ));
        }
        for i in 0..self.modules.len() {
            for j in (i + 1)..self.modules.len() {
                if self.modules[i].x == self.modules[j].x
                    && self.modules[i].y == self.modules[j].y
                {
                    return Err(Error::InvalidGeometry(format!(
                        "modules {i} and {j} share offset ({}, {})",
                        self.modules[i].x, self.modules[i].y
                    )));
                }
            }
        }
        Ok(())
    }

    /// Module offsets in kinematics form.
    pub fn geometry(&self) -> [ModuleGeometry; 4] {
        [
            ModuleGeometry::new(self.modules[0].x, self.modules[0].y),
            ModuleGeometry::new(self.modules[1].x, self.modules[1].y),
            ModuleGeometry::new(self.modules[2].x, self.modules[2].y),
            ModuleGeometry::new(self.modules[3].x, self.modules[3].y),
        ]
    }

    /// Steering deadband in m/s.
    pub fn speed_deadband_mps(&self) -> f32 {
        self.control.speed_deadband_fraction * self.limits.max_speed_mps
    }

    /// Drive feed-forward model from the configured gains.
    pub fn drive_feedforward(&self) -> DriveFeedforward {
        DriveFeedforward::new(self.control.drive_ks, self.control.drive_kv)
    }
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self::square_chassis_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(DriveConfig::square_chassis_defaults().validate().is_ok());
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = DriveConfig::square_chassis_defaults();
        let toml_string = toml::to_string_pretty(&config).unwrap();

        assert!(toml_string.contains("[limits]"));
        assert!(toml_string.contains("[wheel]"));
        assert!(toml_string.contains("[control]"));
        assert!(toml_string.contains("[estimator]"));
        assert!(toml_string.contains("[[modules]]"));

        let parsed: DriveConfig = toml::from_str(&toml_string).unwrap();
        assert_eq!(parsed.limits.max_speed_mps, config.limits.max_speed_mps);
        assert_eq!(parsed.modules[3].y, config.modules[3].y);
    }

    #[test]
    fn test_zero_circumference_rejected() {
        let mut config = DriveConfig::square_chassis_defaults();
        config.wheel.circumference_m = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_duplicate_module_offsets_rejected() {
        let mut config = DriveConfig::square_chassis_defaults();
        config.modules[1].x = config.modules[0].x;
        config.modules[1].y = config.modules[0].y;
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidGeometry(_))
        ));
    }

    #[test]
    fn test_negative_gear_ratio_rejected() {
        let mut config = DriveConfig::square_chassis_defaults();
        config.wheel.steer_gear_ratio = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_speed_deadband_scales_with_max_speed() {
        let config = DriveConfig::square_chassis_defaults();
        let expected = 0.01 * 4.5;
        assert!((config.speed_deadband_mps() - expected).abs() < 1e-6);
    }
}
