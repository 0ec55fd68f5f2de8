//! Core data types for drivetrain control and estimation.
//!
//! - [`Pose2D`], [`Twist2D`]: field pose and body-frame displacement
//! - [`Timestamped<T>`]: generic timestamp wrapper
//! - [`ChassisVelocity`]: rigid-body velocity command
//! - [`ModuleGeometry`], [`ModuleState`], [`ModulePosition`]: per-wheel types

mod chassis;
mod module;
mod pose;
mod timestamped;

pub use chassis::ChassisVelocity;
pub use module::{ModuleGeometry, ModulePosition, ModuleState};
pub use pose::{Pose2D, Twist2D};
pub use timestamped::Timestamped;
