//! Module control policy and drivetrain orchestration.

mod drivetrain;
mod feedforward;
mod module;

pub use drivetrain::{DriveCommand, Drivetrain, TickSnapshot};
pub use feedforward::DriveFeedforward;
pub use module::{SwerveModule, SwerveModuleConfig};
