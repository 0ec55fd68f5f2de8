//! Pose estimation: odometry integration and vision fusion.

mod estimator;

pub use estimator::{PoseEstimator, PoseEstimatorConfig, VisionObservation};
