use crate::common::{Landmark, LegLandmarks};
use crate::pipeline::domain::angle::joint_angle;

/// One frame's left-leg landmarks plus the knee angle derived from them.
///
/// Fields are private so a record cannot change after it is accumulated.
#[derive(Debug, Clone, PartialEq)]
pub struct KeypointRecord {
    frame_index: u64,
    hip: Landmark,
    knee: Landmark,
    ankle: Landmark,
    angle: f64,
}

impl KeypointRecord {
    pub fn from_leg(frame_index: u64, leg: LegLandmarks) -> Self {
        Self {
            frame_index,
            hip: leg.hip,
            knee: leg.knee,
            ankle: leg.ankle,
            angle: joint_angle(&leg.hip, &leg.knee, &leg.ankle),
        }
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    pub fn hip(&self) -> &Landmark {
        &self.hip
    }

    pub fn knee(&self) -> &Landmark {
        &self.knee
    }

    pub fn ankle(&self) -> &Landmark {
        &self.ankle
    }

    /// Knee angle in radians.
    pub fn angle(&self) -> f64 {
        self.angle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn angle_is_measured_at_the_knee() {
        let leg = LegLandmarks {
            hip: Landmark::new(0.5, 0.2),
            knee: Landmark::new(0.5, 0.5),
            ankle: Landmark::new(0.8, 0.5),
        };
        let record = KeypointRecord::from_leg(4, leg);
        assert_eq!(record.frame_index(), 4);
        assert!((record.angle() - FRAC_PI_2).abs() < 1e-12);
    }
}
