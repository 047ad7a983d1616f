use crate::common::{Frame, PoseLandmarks};
use crate::pipeline::context::metrics::FrameMetrics;
use crate::pipeline::context::state::{CapturedState, DetectedState, ProcessingState};
use std::sync::Arc;
use std::time::{Duration, Instant};

// FrameContext with compile-time state tracking: a frame can only be turned
// into a keypoint record after the detector has answered for it.
pub struct FrameContext<S> {
    frame: Arc<Frame>,
    metrics: FrameMetrics,
    processing_start: Instant,
    state: S,
}

impl<S: ProcessingState> FrameContext<S> {
    pub fn state_name(&self) -> &'static str {
        S::state_name()
    }
}

impl<S> FrameContext<S> {
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn metrics(&self) -> &FrameMetrics {
        &self.metrics
    }

    pub fn metrics_mut(&mut self) -> &mut FrameMetrics {
        &mut self.metrics
    }

    pub fn elapsed(&self) -> Duration {
        self.processing_start.elapsed()
    }
}

impl FrameContext<CapturedState> {
    pub fn new(frame: Frame) -> Self {
        Self {
            frame: Arc::new(frame),
            metrics: FrameMetrics::new(),
            processing_start: Instant::now(),
            state: CapturedState,
        }
    }

    pub fn shared_frame(&self) -> Arc<Frame> {
        Arc::clone(&self.frame)
    }

    pub fn into_detected(mut self, pose: Option<PoseLandmarks>) -> FrameContext<DetectedState> {
        self.metrics.record("detect", self.elapsed());
        FrameContext::<DetectedState> {
            frame: self.frame,
            metrics: self.metrics,
            processing_start: self.processing_start,
            state: DetectedState { pose },
        }
    }
}

impl FrameContext<DetectedState> {
    pub fn pose(&self) -> Option<&PoseLandmarks> {
        self.state.pose.as_ref()
    }
}
