use serde::{Deserialize, Serialize};

/// BlazePose topology indices for the left leg.
pub const LEFT_HIP: usize = 23;
pub const LEFT_KNEE: usize = 25;
pub const LEFT_ANKLE: usize = 27;

/// Number of points in a full BlazePose body.
pub const POSE_LANDMARK_COUNT: usize = 33;

/// A body keypoint normalized to [0, 1] of the frame width and height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<f64>,
}

impl Landmark {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            visibility: None,
        }
    }

    /// Pixel position on a surface of the given size.
    pub fn denormalize(&self, width: u32, height: u32) -> (f32, f32) {
        ((self.x * width as f64) as f32, (self.y * height as f64) as f32)
    }
}

/// Everything the detector reports for one person in one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseLandmarks {
    #[serde(default)]
    pub score: Option<f64>,
    pub landmarks: Vec<Landmark>,
}

impl PoseLandmarks {
    pub fn new(landmarks: Vec<Landmark>) -> Self {
        Self {
            score: None,
            landmarks,
        }
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }

    /// The hip/knee/ankle triple, or `None` if the detector returned a truncated body.
    pub fn left_leg(&self) -> Option<LegLandmarks> {
        Some(LegLandmarks {
            hip: *self.landmarks.get(LEFT_HIP)?,
            knee: *self.landmarks.get(LEFT_KNEE)?,
            ankle: *self.landmarks.get(LEFT_ANKLE)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegLandmarks {
    pub hip: Landmark,
    pub knee: Landmark,
    pub ankle: Landmark,
}

#[cfg(test)]
pub(crate) fn body_with_leg(hip: (f64, f64), knee: (f64, f64), ankle: (f64, f64)) -> PoseLandmarks {
    let mut landmarks = vec![Landmark::new(0.0, 0.0); POSE_LANDMARK_COUNT];
    landmarks[LEFT_HIP] = Landmark::new(hip.0, hip.1);
    landmarks[LEFT_KNEE] = Landmark::new(knee.0, knee.1);
    landmarks[LEFT_ANKLE] = Landmark::new(ankle.0, ankle.1);
    PoseLandmarks::new(landmarks)
}
