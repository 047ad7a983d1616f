use std::time::Instant;

use crate::common::PoseLandmarks;
use crate::detector::DetectorHandle;
use crate::error::AppError;
use crate::pipeline::accumulator::KeypointAccumulator;
use crate::pipeline::context::{DetectedState, FrameContext};
use crate::pipeline::domain::KeypointRecord;
use crate::pipeline::overlay::{OverlayRenderer, OverlaySurface};
use crate::video::VideoSource;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

/// Why the scheduler loop stopped without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerExit {
    Ended,
    Cancelled,
}

/// Progress after one scheduler iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepReport {
    pub frames_seen: u64,
    pub records: usize,
    pub position_secs: f64,
    pub detected: bool,
}

/// Walks a video source one fixed time step at a time.
///
/// Each iteration awaits exactly one detector call, then finishes the angle,
/// the append and the overlay before seeking forward and yielding to the
/// runtime. The next detector call is never issued before all of that is done.
pub struct FrameScheduler {
    detector: DetectorHandle,
    frame_step: f64,
    renderer: OverlayRenderer,
    surface: Option<Box<dyn OverlaySurface>>,
}

impl FrameScheduler {
    pub fn new(detector: DetectorHandle, frame_step: f64) -> Self {
        Self {
            detector,
            frame_step,
            renderer: OverlayRenderer::default(),
            surface: None,
        }
    }

    pub fn with_overlay(mut self, renderer: OverlayRenderer, surface: Box<dyn OverlaySurface>) -> Self {
        self.renderer = renderer;
        self.surface = Some(surface);
        self
    }

    pub fn frame_step(&self) -> f64 {
        self.frame_step
    }

    #[instrument(skip_all, fields(source = %source.name(), detector = self.detector.name()))]
    pub async fn run<F>(
        &mut self,
        source: &mut dyn VideoSource,
        accumulator: &mut KeypointAccumulator,
        cancel_token: &CancellationToken,
        mut on_step: F,
    ) -> Result<SchedulerExit, AppError>
    where
        F: FnMut(&StepReport) + Send,
    {
        let mut frames_seen = 0u64;
        loop {
            if cancel_token.is_cancelled() {
                info!("Run cancelled after {} frames", frames_seen);
                return Ok(SchedulerExit::Cancelled);
            }
            if source.ended() {
                info!(
                    "Source ended after {} frames, {} with a detection",
                    frames_seen,
                    accumulator.len()
                );
                return Ok(SchedulerExit::Ended);
            }

            let context = FrameContext::new(source.current_frame()?);
            let pose = self.detector.detect(context.shared_frame()).await?;
            let mut context = context.into_detected(pose);
            frames_seen += 1;

            let detected = self.complete_frame(&mut context, accumulator)?;
            let timings: Vec<String> = context
                .metrics()
                .steps()
                .map(|(step, duration)| format!("{}={}us", step, duration.as_micros()))
                .collect();
            debug!(
                frame_id = %context.frame().frame_id(),
                "Frame {} at {:.3}s took {}us [{}]",
                context.frame().sequence(),
                context.frame().position_secs(),
                context.metrics().total().as_micros(),
                timings.join(" ")
            );

            let next_position = source.position() + self.frame_step;
            source.seek(next_position)?;
            on_step(&StepReport {
                frames_seen,
                records: accumulator.len(),
                position_secs: source.position(),
                detected,
            });

            tokio::task::yield_now().await;
        }
    }

    /// Angle, append and overlay for one detected frame. Returns whether a record was added.
    fn complete_frame(
        &mut self,
        context: &mut FrameContext<DetectedState>,
        accumulator: &mut KeypointAccumulator,
    ) -> Result<bool, AppError> {
        let Some(leg) = context.pose().and_then(PoseLandmarks::left_leg) else {
            debug!("No person in frame {}", context.frame().sequence());
            return Ok(false);
        };

        let start = Instant::now();
        let record = KeypointRecord::from_leg(accumulator.next_index(), leg);
        accumulator.append(record.clone())?;
        context.metrics_mut().record("accumulate", start.elapsed());

        if let Some(surface) = self.surface.as_deref_mut() {
            let start = Instant::now();
            self.renderer.render(surface, context.frame().image(), &record)?;
            context.metrics_mut().record("render", start.elapsed());
        }
        Ok(true)
    }
}
