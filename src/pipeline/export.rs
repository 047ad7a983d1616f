use std::fmt::Write as _;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use crate::common::Landmark;
use crate::config::AngleUnit;
use crate::error::AppError;
use crate::pipeline::domain::{KeypointRecord, to_degrees};
use tokio::sync::mpsc;
use tracing::info;

pub const CSV_HEADER: &str =
    "ID do Frame,Quadril Esquerdo,Joelho Esquerdo,Tornozelo Esquerdo,Ângulo";
pub const FILE_SUFFIX: &str = "_pose_data.csv";
const NAME_PREFIX_CHARS: usize = 5;

/// The tabular artifact produced at the end of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvExport {
    pub file_name: String,
    pub contents: String,
}

impl CsvExport {
    pub async fn write_to(&self, dir: &Path) -> Result<PathBuf, AppError> {
        let path = dir.join(&self.file_name);
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| AppError::Export(e, dir.to_path_buf()))?;
        tokio::fs::write(&path, self.contents.as_bytes())
            .await
            .map_err(|e| AppError::Export(e, path.clone()))?;
        info!("Wrote {} rows to {}", self.rows(), path.display());
        Ok(path)
    }

    pub fn rows(&self) -> usize {
        self.contents.lines().count().saturating_sub(1)
    }
}

pub fn export_file_name(source_name: &str) -> String {
    let prefix: String = source_name.chars().take(NAME_PREFIX_CHARS).collect();
    format!("{prefix}{FILE_SUFFIX}")
}

#[derive(Debug, Clone, Copy)]
pub struct CsvExporter {
    angle_unit: AngleUnit,
}

impl Default for CsvExporter {
    fn default() -> Self {
        Self::new(AngleUnit::Radians)
    }
}

impl CsvExporter {
    pub fn new(angle_unit: AngleUnit) -> Self {
        Self { angle_unit }
    }

    /// Builds the CSV for a finished run, or `None` when nothing was detected.
    pub fn export(&self, source_name: &str, records: &[KeypointRecord]) -> Option<CsvExport> {
        if records.is_empty() {
            return None;
        }

        let mut contents = String::from(CSV_HEADER);
        for record in records {
            let angle = match self.angle_unit {
                AngleUnit::Radians => record.angle(),
                AngleUnit::Degrees => to_degrees(record.angle()),
            };
            // writing into a String cannot fail
            let _ = write!(
                contents,
                "\n{},{},{},{},{}",
                record.frame_index(),
                pair(record.hip()),
                pair(record.knee()),
                pair(record.ankle()),
                angle
            );
        }

        Some(CsvExport {
            file_name: export_file_name(source_name),
            contents,
        })
    }
}

fn pair(landmark: &Landmark) -> String {
    format!("{};{}", landmark.x, landmark.y)
}

/// One-shot "run complete" signal.
pub trait CompletionNotifier: Send + Sync {
    fn notify(&self);
}

/// Logs completion and optionally rings the terminal bell.
#[derive(Debug, Default)]
pub struct LogNotifier {
    bell: bool,
}

impl LogNotifier {
    pub fn new(bell: bool) -> Self {
        Self { bell }
    }
}

impl CompletionNotifier for LogNotifier {
    fn notify(&self) {
        info!("Processing complete");
        if self.bell {
            let mut stderr = std::io::stderr();
            let _ = stderr.write_all(b"\x07").and_then(|_| stderr.flush());
        }
    }
}

/// Forwards completion onto a channel for embedding applications.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<()>,
}

impl ChannelNotifier {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl CompletionNotifier for ChannelNotifier {
    fn notify(&self) {
        if self.tx.send(()).is_err() {
            tracing::debug!("Completion receiver dropped");
        }
    }
}
