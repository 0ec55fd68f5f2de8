//! chakra-drive - swerve drivetrain control and pose estimation
//!
//! Converts rigid-body motion commands into per-wheel (angle, speed)
//! targets for a four-module swerve drivetrain, and fuses wheel odometry,
//! inertial heading and asynchronous vision observations into a continuous
//! field-pose estimate.
//!
//! # Architecture
//!
//! The crate is organized into 5 logical layers:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                   control/                          │  ← Orchestration
//! │        (module policy, drivetrain tick)             │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                  estimation/                        │  ← Pose estimation
//! │          (odometry + vision fusion)                 │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                  kinematics/                        │  ← Core math
//! │      (inverse/forward transform, desaturation)      │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                   hardware/                         │  ← Capability traits
//! │            (module driver, heading)                 │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                     core/                           │  ← Foundation
//! │              (types, math, units)                   │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! The control loop calls [`Drivetrain::tick`] at a fixed rate; everything
//! in that path is synchronous and non-blocking. The only cross-thread
//! entry point is [`PoseEstimator::add_vision_measurement`] through the
//! handle returned by [`Drivetrain::estimator_handle`].

// ============================================================================
// Layer 1: Core foundation (no internal deps)
// ============================================================================
pub mod core;

// ============================================================================
// Layer 2: Hardware capability traits (depends on core)
// ============================================================================
pub mod hardware;

// ============================================================================
// Layer 3: Kinematics (depends on core)
// ============================================================================
pub mod kinematics;

// ============================================================================
// Layer 4: Estimation (depends on core, kinematics)
// ============================================================================
pub mod estimation;

// ============================================================================
// Layer 5: Control (depends on all layers)
// ============================================================================
pub mod control;

pub mod config;
pub mod error;

// ============================================================================
// Convenience re-exports (flat namespace for common use)
// ============================================================================

// Core types
pub use crate::core::math;
pub use crate::core::types::{ChassisVelocity, ModuleGeometry, ModulePosition, ModuleState};
pub use crate::core::types::{Pose2D, Timestamped, Twist2D};
pub use crate::core::units;

// Hardware
pub use hardware::{HeadingSensor, MockHeadingSensor, MockModuleDriver, ModuleDriver};

// Kinematics
pub use kinematics::{MODULE_COUNT, SwerveKinematics};

// Estimation
pub use estimation::{PoseEstimator, PoseEstimatorConfig, VisionObservation};

// Control
pub use control::{
    DriveCommand, DriveFeedforward, Drivetrain, SwerveModule, SwerveModuleConfig, TickSnapshot,
};

// Configuration and errors
pub use config::{ControlConfig, DriveConfig, LimitsConfig, ModuleConfig, WheelConfig};
pub use error::{Error, Result};
