pub mod accumulator;
pub mod context;
pub mod domain;
pub mod export;
pub mod overlay;
pub mod run;
pub mod scheduler;

#[cfg(test)]
mod testing;

pub use accumulator::KeypointAccumulator;
pub use domain::{KeypointRecord, joint_angle};
pub use export::{ChannelNotifier, CompletionNotifier, CsvExport, CsvExporter, LogNotifier};
pub use overlay::{ImageSurface, OverlayRenderer, OverlayStyle, OverlaySurface};
pub use run::{ProcessingRun, RunOutcome, RunSnapshot, RunStatus};
pub use scheduler::{FrameScheduler, SchedulerExit, StepReport};
