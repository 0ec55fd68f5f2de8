//! Drivetrain pose estimation with asynchronous vision fusion.
//!
//! # Problem
//!
//! Wheel odometry runs every control cycle and drifts without bound;
//! vision pose candidates are absolute but arrive late, out of order, at a
//! low rate, or not at all. Applying a late observation as if it described
//! "now" would snap the estimate backward in time.
//!
//! # Solution
//!
//! The estimator keeps two pieces of state:
//! - a **pure-odometry pose chain**, integrated every cycle from module
//!   position deltas and the inertial heading, with a bounded history of
//!   timestamped snapshots;
//! - a **field-frame correction offset**, accumulated from vision.
//!
//! The published pose is always `odometry ⊞ correction`. A vision
//! observation is reconciled against the odometry snapshot at (or
//! immediately preceding) its own timestamp: the weighted residual folds
//! into the correction, so the fix carries forward over everything the
//! wheels measured since — no backward snap, and reconciliation cost is
//! bounded by the history horizon.

use std::collections::VecDeque;

use crate::core::math::{angle_diff, normalize_angle};
use crate::core::types::{ModulePosition, Pose2D, Timestamped, Twist2D};
use crate::kinematics::{MODULE_COUNT, SwerveKinematics};
use serde::{Deserialize, Serialize};

/// An absolute pose candidate from the vision subsystem.
///
/// Timestamps are on the control loop's clock; `trust_weight` in [0, 1]
/// scales how much of the residual is absorbed (1 = take the full
/// correction, 0 = ignore).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VisionObservation {
    /// Candidate field pose
    pub pose: Pose2D,
    /// Capture timestamp in microseconds
    pub timestamp_us: u64,
    /// Blend weight in [0, 1]
    pub trust_weight: f32,
}

/// Configuration for the pose estimator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PoseEstimatorConfig {
    /// How much odometry history to retain for reconciling late vision
    /// observations (seconds). Observations older than this are discarded.
    pub history_horizon_s: f32,
}

impl Default for PoseEstimatorConfig {
    fn default() -> Self {
        Self {
            history_horizon_s: 1.5,
        }
    }
}

/// Field-frame correction accumulated from vision observations.
#[derive(Debug, Clone, Copy, Default)]
struct Correction {
    x: f32,
    y: f32,
    theta: f32,
}

/// Stateful pose integrator over wheel odometry, inertial heading and
/// asynchronous vision corrections.
///
/// The pose is defined for all time after construction. `update` is called
/// once per control cycle from the control loop; `add_vision_measurement`
/// may be called from a different timing domain — wrap the estimator in a
/// mutex when both threads touch it (see `Drivetrain::estimator_handle`).
#[derive(Debug)]
pub struct PoseEstimator {
    kinematics: SwerveKinematics,
    config: PoseEstimatorConfig,
    /// Pure-odometry pose chain, uncorrected by vision.
    odom_pose: Pose2D,
    /// Vision correction applied on top of the odometry chain.
    correction: Correction,
    /// Odometry-only snapshots for late-observation reconciliation.
    history: VecDeque<Timestamped<Pose2D>>,
    last_positions: Option<[ModulePosition; MODULE_COUNT]>,
    /// Last valid continuous heading (radians); None until the sensor has
    /// produced a valid sample, and cleared whenever it drops out.
    last_heading_rad: Option<f32>,
    stale_rejects: u64,
}

impl PoseEstimator {
    /// Create an estimator starting at `initial_pose`.
    pub fn new(
        kinematics: SwerveKinematics,
        initial_pose: Pose2D,
        config: PoseEstimatorConfig,
    ) -> Self {
        Self {
            kinematics,
            config,
            odom_pose: initial_pose,
            correction: Correction::default(),
            history: VecDeque::new(),
            last_positions: None,
            last_heading_rad: None,
            stale_rejects: 0,
        }
    }

    /// Current best pose estimate (odometry chain plus vision correction).
    pub fn pose(&self) -> Pose2D {
        self.corrected(self.odom_pose)
    }

    /// Number of vision observations discarded as unreconcilable.
    pub fn stale_rejects(&self) -> u64 {
        self.stale_rejects
    }

    /// Advance odometry by one control cycle.
    ///
    /// `heading_deg` is the continuous inertial yaw, or `None` when the
    /// sensor reports invalid/uncalibrated — in that case the kinematic
    /// rotation estimate stands in for this cycle only. The first call
    /// (no previous module positions) integrates zero displacement.
    pub fn update(
        &mut self,
        timestamp_us: u64,
        heading_deg: Option<f32>,
        positions: &[ModulePosition; MODULE_COUNT],
    ) -> Pose2D {
        let twist = match &self.last_positions {
            Some(prev) => {
                let mut deltas = [ModulePosition::default(); MODULE_COUNT];
                for i in 0..MODULE_COUNT {
                    deltas[i] = ModulePosition {
                        angle_deg: positions[i].angle_deg,
                        distance_m: positions[i].distance_m - prev[i].distance_m,
                    };
                }
                self.kinematics.deltas_to_twist(&deltas)
            }
            None => Twist2D::default(),
        };

        // Gyro bias drift is smaller than wheel-slip rotational error, so a
        // valid heading sample replaces the kinematic rotation estimate.
        let dtheta = match heading_deg {
            Some(yaw_deg) => {
                let yaw_rad = yaw_deg.to_radians();
                let d = match self.last_heading_rad {
                    Some(prev) => yaw_rad - prev,
                    None => twist.dtheta,
                };
                self.last_heading_rad = Some(yaw_rad);
                d
            }
            None => {
                self.last_heading_rad = None;
                twist.dtheta
            }
        };

        self.odom_pose = self.odom_pose.exp(&Twist2D {
            dx: twist.dx,
            dy: twist.dy,
            dtheta,
        });
        self.last_positions = Some(*positions);

        self.history
            .push_back(Timestamped::new(self.odom_pose, timestamp_us));
        self.evict_history(timestamp_us);

        self.pose()
    }

    /// Fold an asynchronous vision observation into the estimate.
    ///
    /// Observations older than the retained history cannot be reconciled
    /// and are discarded (counted, never an error). Otherwise the residual
    /// between the candidate and the estimate as of the observation's
    /// timestamp is weighted by `trust_weight` and folded into the
    /// correction, moving the *current* pose while preserving all odometry
    /// accumulated since the snapshot.
    pub fn add_vision_measurement(&mut self, observation: VisionObservation) {
        let Some(oldest) = self.history.front() else {
            self.stale_rejects += 1;
            log::debug!("vision observation before any odometry history, discarded");
            return;
        };
        if observation.timestamp_us < oldest.timestamp_us {
            self.stale_rejects += 1;
            log::debug!(
                "vision observation at {}us predates history horizon, discarded",
                observation.timestamp_us
            );
            return;
        }

        // Snapshot at or immediately preceding the observation. The
        // horizon check above guarantees one exists.
        let Some(snapshot) = self
            .history
            .iter()
            .rev()
            .find(|s| s.timestamp_us <= observation.timestamp_us)
        else {
            return;
        };

        let estimate_then = self.corrected(snapshot.data);
        let w = observation.trust_weight.clamp(0.0, 1.0);

        self.correction.x += w * (observation.pose.x - estimate_then.x);
        self.correction.y += w * (observation.pose.y - estimate_then.y);
        self.correction.theta = normalize_angle(
            self.correction.theta + w * angle_diff(estimate_then.theta, observation.pose.theta),
        );
    }

    /// Re-anchor the estimator at a known pose.
    ///
    /// Clears accumulated vision corrections and the history buffer, and
    /// re-references the module distances and heading so the next cycle
    /// integrates from zero.
    pub fn reset_to(
        &mut self,
        timestamp_us: u64,
        pose: Pose2D,
        heading_deg: Option<f32>,
        positions: &[ModulePosition; MODULE_COUNT],
    ) {
        self.odom_pose = pose;
        self.correction = Correction::default();
        self.history.clear();
        self.history.push_back(Timestamped::new(pose, timestamp_us));
        self.last_positions = Some(*positions);
        self.last_heading_rad = heading_deg.map(f32::to_radians);
    }

    /// Drop the heading anchor so the next valid sample re-references
    /// instead of producing a spurious delta. Called after the heading
    /// sensor is re-zeroed.
    pub fn reset_heading_anchor(&mut self) {
        self.last_heading_rad = None;
    }

    fn corrected(&self, pose: Pose2D) -> Pose2D {
        Pose2D::new(
            pose.x + self.correction.x,
            pose.y + self.correction.y,
            pose.theta + self.correction.theta,
        )
    }

    fn evict_history(&mut self, now_us: u64) {
        let horizon_us = (self.config.history_horizon_s * 1_000_000.0) as u64;
        while self.history.len() > 1 {
            let Some(front) = self.history.front() else {
                break;
            };
            if front.timestamp_us + horizon_us < now_us {
                self.history.pop_front();
            } else {
                break;
            }
        }
    }
}
