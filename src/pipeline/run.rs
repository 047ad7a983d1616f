use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::AppError;
use crate::pipeline::accumulator::KeypointAccumulator;
use crate::pipeline::domain::KeypointRecord;
use crate::pipeline::export::{CompletionNotifier, CsvExport, CsvExporter};
use crate::pipeline::scheduler::{FrameScheduler, SchedulerExit, StepReport};
use crate::video::VideoSource;
use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RunStatus {
    #[default]
    Idle,
    Running,
    Completed,
    Failed(String),
    Cancelled,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::Idle => write!(f, "idle"),
            RunStatus::Running => write!(f, "running"),
            RunStatus::Completed => write!(f, "completed"),
            RunStatus::Failed(reason) => write!(f, "failed: {reason}"),
            RunStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Read-only view of the current run for presentation layers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSnapshot {
    pub run_id: Option<Uuid>,
    pub source_name: String,
    pub status: RunStatus,
    pub frames_seen: u64,
    pub records: usize,
    pub position_secs: f64,
    /// Whether the most recent frame produced a record.
    pub last_frame_detected: bool,
    pub export_file: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

/// What a finished run leaves behind.
#[derive(Debug)]
pub struct RunOutcome {
    pub run_id: Uuid,
    pub status: RunStatus,
    pub records: Vec<KeypointRecord>,
    pub export: Option<CsvExport>,
    pub export_path: Option<PathBuf>,
    pub frames_seen: u64,
}

/// One pass over one submitted video, from `Running` to a terminal status.
pub struct ProcessingRun {
    id: Uuid,
    source: Box<dyn VideoSource>,
    scheduler: FrameScheduler,
    accumulator: KeypointAccumulator,
    exporter: CsvExporter,
    notifier: Arc<dyn CompletionNotifier>,
    output_dir: Option<PathBuf>,
    snapshot_tx: watch::Sender<RunSnapshot>,
}

impl ProcessingRun {
    pub fn new(
        source: Box<dyn VideoSource>,
        scheduler: FrameScheduler,
        exporter: CsvExporter,
        notifier: Arc<dyn CompletionNotifier>,
        snapshot_tx: watch::Sender<RunSnapshot>,
    ) -> Self {
        let id = Uuid::new_v4();
        // claimed before the task starts; a superseded run can no longer publish
        snapshot_tx.send_replace(RunSnapshot {
            run_id: Some(id),
            source_name: source.name().to_string(),
            status: RunStatus::Running,
            started_at: Some(Utc::now()),
            ..RunSnapshot::default()
        });
        Self {
            id,
            source,
            scheduler,
            accumulator: KeypointAccumulator::new(),
            exporter,
            notifier,
            output_dir: None,
            snapshot_tx,
        }
    }

    pub fn with_output_dir(mut self, output_dir: Option<PathBuf>) -> Self {
        self.output_dir = output_dir;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    #[instrument(skip_all, fields(run_id = %self.id))]
    pub async fn execute(self, cancel_token: CancellationToken) -> Result<RunOutcome, AppError> {
        let ProcessingRun {
            id,
            mut source,
            mut scheduler,
            mut accumulator,
            exporter,
            notifier,
            output_dir,
            snapshot_tx,
        } = self;

        accumulator.clear();
        let source_name = source.name().to_string();
        info!("Processing '{}', please wait...", source_name);

        let mut frames_seen = 0;
        let exit = scheduler
            .run(source.as_mut(), &mut accumulator, &cancel_token, |step: &StepReport| {
                frames_seen = step.frames_seen;
                publish(&snapshot_tx, id, |snapshot| {
                    snapshot.frames_seen = step.frames_seen;
                    snapshot.records = step.records;
                    snapshot.position_secs = step.position_secs;
                    snapshot.last_frame_detected = step.detected;
                });
            })
            .await;

        match exit {
            Err(e) => {
                error!("Run aborted: {}", e);
                finish(&snapshot_tx, id, RunStatus::Failed(e.to_string()), None);
                Err(e)
            }
            Ok(SchedulerExit::Cancelled) => Ok(discard(&snapshot_tx, id, frames_seen)),
            Ok(SchedulerExit::Ended) => {
                // write phase is over; everything below only reads the records
                let records = accumulator.into_records();
                let export = exporter.export(&source_name, &records);

                let mut export_path = None;
                match &export {
                    Some(export) => {
                        // a superseded run may still reach this point before its abort lands
                        if cancel_token.is_cancelled() {
                            return Ok(discard(&snapshot_tx, id, frames_seen));
                        }
                        if let Some(dir) = &output_dir {
                            match export.write_to(dir).await {
                                Ok(path) => export_path = Some(path),
                                Err(e) => {
                                    error!("Export failed: {}", e);
                                    finish(&snapshot_tx, id, RunStatus::Failed(e.to_string()), None);
                                    return Err(e);
                                }
                            }
                        }
                        if cancel_token.is_cancelled() {
                            return Ok(discard(&snapshot_tx, id, frames_seen));
                        }
                        notifier.notify();
                    }
                    None => info!("No person detected in '{}', nothing to export", source_name),
                }

                finish(
                    &snapshot_tx,
                    id,
                    RunStatus::Completed,
                    export.as_ref().map(|e| e.file_name.clone()),
                );
                info!(
                    "Processing complete: {} records from {} frames",
                    records.len(),
                    frames_seen
                );
                Ok(RunOutcome {
                    run_id: id,
                    status: RunStatus::Completed,
                    records,
                    export,
                    export_path,
                    frames_seen,
                })
            }
        }
    }
}

fn discard(snapshot_tx: &watch::Sender<RunSnapshot>, run_id: Uuid, frames_seen: u64) -> RunOutcome {
    info!("Run cancelled, discarding its records");
    finish(snapshot_tx, run_id, RunStatus::Cancelled, None);
    RunOutcome {
        run_id,
        status: RunStatus::Cancelled,
        records: Vec::new(),
        export: None,
        export_path: None,
        frames_seen,
    }
}

/// Applies `update` only while the snapshot still belongs to `run_id`, so a
/// superseded run can never overwrite its successor's state.
fn publish<F>(snapshot_tx: &watch::Sender<RunSnapshot>, run_id: Uuid, update: F)
where
    F: FnOnce(&mut RunSnapshot),
{
    snapshot_tx.send_if_modified(|snapshot| {
        if snapshot.run_id != Some(run_id) {
            return false;
        }
        update(snapshot);
        true
    });
}

pub(crate) fn finish(
    snapshot_tx: &watch::Sender<RunSnapshot>,
    run_id: Uuid,
    status: RunStatus,
    export_file: Option<String>,
) {
    publish(snapshot_tx, run_id, |snapshot| {
        snapshot.status = status;
        snapshot.export_file = export_file;
        snapshot.finished_at = Some(Utc::now());
    });
}
