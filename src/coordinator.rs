use std::sync::Arc;

use crate::{
    config::Settings,
    detector::{DetectorBuilder, LandmarkDetector},
    error::AppError,
    pipeline::{
        export::{CompletionNotifier, CsvExporter, LogNotifier},
        overlay::{OverlayRenderer, OverlayStyle, OverlaySurface},
        run::{self, ProcessingRun, RunOutcome, RunSnapshot, RunStatus},
        scheduler::FrameScheduler,
    },
    video::VideoSource,
};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

struct ActiveRun {
    run_id: Uuid,
    cancel_token: CancellationToken,
    task: JoinHandle<Result<RunOutcome, AppError>>,
}

/// Accepts video submissions and drives at most one run at a time.
///
/// Submitting while a run is active discards that run: its task is cancelled
/// and aborted, and nothing it accumulated is exported.
pub struct Coordinator {
    settings: Settings,
    detector: Arc<dyn LandmarkDetector>,
    notifier: Arc<dyn CompletionNotifier>,
    snapshot_tx: watch::Sender<RunSnapshot>,
    active: Option<ActiveRun>,
}

impl Coordinator {
    fn new(
        settings: Settings,
        detector: Arc<dyn LandmarkDetector>,
        notifier: Arc<dyn CompletionNotifier>,
    ) -> Self {
        let (snapshot_tx, _) = watch::channel(RunSnapshot::default());
        Self {
            settings,
            detector,
            notifier,
            snapshot_tx,
            active: None,
        }
    }

    pub fn submit(&mut self, source: Box<dyn VideoSource>) -> Uuid {
        self.start(source, None)
    }

    pub fn submit_with_overlay(
        &mut self,
        source: Box<dyn VideoSource>,
        surface: Box<dyn OverlaySurface>,
    ) -> Uuid {
        self.start(source, Some(surface))
    }

    fn start(&mut self, source: Box<dyn VideoSource>, surface: Option<Box<dyn OverlaySurface>>) -> Uuid {
        self.discard_active();

        let detector = DetectorBuilder::new(Arc::clone(&self.detector))
            .timeout(self.settings.scheduler.detector_timeout())
            .build();
        let mut scheduler = FrameScheduler::new(detector, self.settings.scheduler.frame_step());
        if let Some(surface) = surface.filter(|_| self.settings.overlay.enabled) {
            let renderer = OverlayRenderer::new(OverlayStyle::from(&self.settings.overlay));
            scheduler = scheduler.with_overlay(renderer, surface);
        }

        let run = ProcessingRun::new(
            source,
            scheduler,
            CsvExporter::new(self.settings.export.angle_unit),
            Arc::clone(&self.notifier),
            self.snapshot_tx.clone(),
        )
        .with_output_dir(self.settings.export.output_dir.clone());

        let run_id = run.id();
        let cancel_token = CancellationToken::new();
        let task = tokio::spawn(run.execute(cancel_token.clone()));
        tracing::info!("Submitted run {}", run_id);

        self.active = Some(ActiveRun {
            run_id,
            cancel_token,
            task,
        });
        run_id
    }

    /// Awaits the current run and hands back its outcome.
    pub async fn wait(&mut self) -> Result<RunOutcome, AppError> {
        let active = self
            .active
            .take()
            .ok_or(AppError::Pipeline("No run submitted".to_string()))?;
        active
            .task
            .await
            .map_err(|e| AppError::Pipeline(format!("Run {} did not finish: {}", active.run_id, e)))?
    }

    pub fn subscribe(&self) -> watch::Receiver<RunSnapshot> {
        self.snapshot_tx.subscribe()
    }

    pub fn snapshot(&self) -> RunSnapshot {
        self.snapshot_tx.borrow().clone()
    }

    pub fn active_run(&self) -> Option<Uuid> {
        self.active.as_ref().map(|active| active.run_id)
    }

    pub fn stop(&mut self) {
        self.discard_active();
    }

    fn discard_active(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };
        active.cancel_token.cancel();
        active.task.abort();
        run::finish(&self.snapshot_tx, active.run_id, RunStatus::Cancelled, None);
        tracing::info!("Discarded run {}", active.run_id);
    }
}

impl Drop for Coordinator {
    fn drop(&mut self) {
        self.stop();
    }
}

pub struct CoordinatorBuilder {
    settings: Settings,
    detector: Option<Arc<dyn LandmarkDetector>>,
    notifier: Option<Arc<dyn CompletionNotifier>>,
}

impl CoordinatorBuilder {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            detector: None,
            notifier: None,
        }
    }

    pub fn detector(mut self, detector: Arc<dyn LandmarkDetector>) -> Self {
        self.detector = Some(detector);
        self
    }

    // Replaces the default log notifier.
    pub fn notifier(mut self, notifier: Arc<dyn CompletionNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn build(self) -> Result<Coordinator, AppError> {
        self.settings.validate()?;
        let detector = self
            .detector
            .ok_or(AppError::Pipeline("Detector not set".to_string()))?;
        let notifier = self
            .notifier
            .unwrap_or_else(|| Arc::new(LogNotifier::new(self.settings.export.bell)));
        Ok(Coordinator::new(self.settings, detector, notifier))
    }
}
