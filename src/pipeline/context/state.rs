use crate::common::PoseLandmarks;

// Markers to track the state of a frame as it moves through the scheduler
pub struct CapturedState;
pub struct DetectedState {
    pub(super) pose: Option<PoseLandmarks>,
}

pub trait ProcessingState: 'static {
    fn state_name() -> &'static str;
}

impl ProcessingState for CapturedState {
    fn state_name() -> &'static str {
        "Captured"
    }
}

impl ProcessingState for DetectedState {
    fn state_name() -> &'static str {
        "Detected"
    }
}
