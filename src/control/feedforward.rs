//! Drive motor feed-forward model.

use serde::{Deserialize, Serialize};

/// Static + velocity feed-forward gains for the drive motor.
///
/// `volts = ks·sign(v) + kv·v`. The PID loop in the motor controller only
/// has to correct the residual, which keeps velocity tracking tight at the
/// low speeds where pure feedback is sluggish.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DriveFeedforward {
    /// Static friction voltage (volts)
    pub ks: f32,
    /// Velocity gain (volts per m/s)
    pub kv: f32,
}

impl DriveFeedforward {
    /// Create a feed-forward model from gains.
    pub fn new(ks: f32, kv: f32) -> Self {
        Self { ks, kv }
    }

    /// Feed-forward voltage for a velocity setpoint.
    ///
    /// Exactly zero velocity gets zero volts so a parked wheel is not held
    /// against static friction.
    #[inline]
    pub fn volts(&self, velocity_mps: f32) -> f32 {
        if velocity_mps == 0.0 {
            0.0
        } else {
            self.ks * velocity_mps.signum() + self.kv * velocity_mps
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_zero_velocity_zero_volts() {
        let ff = DriveFeedforward::new(0.3, 2.5);
        assert_eq!(ff.volts(0.0), 0.0);
    }

    #[test]
    fn test_forward_and_reverse_symmetric() {
        let ff = DriveFeedforward::new(0.3, 2.5);
        assert_relative_eq!(ff.volts(2.0), 0.3 + 5.0);
        assert_relative_eq!(ff.volts(-2.0), -(0.3 + 5.0));
    }

    #[test]
    fn test_static_term_dominates_at_low_speed() {
        let ff = DriveFeedforward::new(0.5, 1.0);
        assert_relative_eq!(ff.volts(0.01), 0.51, epsilon = 1e-6);
    }
}
