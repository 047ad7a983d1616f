pub mod replay;
pub mod service;

pub use replay::ReplayDetector;
pub use service::{DetectorBuilder, DetectorHandle, DetectorService};

use crate::common::{Frame, PoseLandmarks};
use crate::error::AppError;
use async_trait::async_trait;

/// A per-frame pose-landmark detector.
///
/// Returns `Ok(None)` when nobody is in the frame.
#[async_trait]
pub trait LandmarkDetector: Send + Sync {
    async fn detect(&self, frame: &Frame) -> Result<Option<PoseLandmarks>, AppError>;

    fn name(&self) -> &'static str;
}
