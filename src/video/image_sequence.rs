use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::common::Frame;
use crate::error::SourceError;
use crate::video::{VideoSource, frame_slot, validate_frame_rate, validate_seek};
use image::DynamicImage;
use tracing::{debug, info};

const FRAME_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "webp"];

/// A video stored as a directory of still frames, sorted by file name.
pub struct ImageSequenceSource {
    name: String,
    paths: Vec<PathBuf>,
    fps: f64,
    position: f64,
    cached: Option<(usize, Arc<DynamicImage>)>,
}

impl ImageSequenceSource {
    pub fn open(dir: &Path, fps: f64) -> Result<Self, SourceError> {
        validate_frame_rate(fps)?;
        let entries =
            std::fs::read_dir(dir).map_err(|e| SourceError::Open(e, dir.to_path_buf()))?;

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|e| SourceError::Open(e, dir.to_path_buf()))?
                .path();
            let is_frame = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| FRAME_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
                .unwrap_or(false);
            if is_frame {
                paths.push(path);
            }
        }
        if paths.is_empty() {
            return Err(SourceError::Empty(dir.to_path_buf()));
        }
        paths.sort();

        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        info!(
            "Opened image sequence '{}' with {} frames at {} fps",
            name,
            paths.len(),
            fps
        );

        Ok(Self {
            name,
            paths,
            fps,
            position: 0.0,
            cached: None,
        })
    }

    /// Overrides the name the export file is derived from.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn frame_count(&self) -> usize {
        self.paths.len()
    }

    fn slot(&self) -> usize {
        frame_slot(self.position, self.fps)
    }
}

impl VideoSource for ImageSequenceSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn position(&self) -> f64 {
        self.position
    }

    fn seek(&mut self, position_secs: f64) -> Result<(), SourceError> {
        validate_seek(position_secs)?;
        self.position = position_secs;
        Ok(())
    }

    fn ended(&self) -> bool {
        self.slot() >= self.paths.len()
    }

    fn current_frame(&mut self) -> Result<Frame, SourceError> {
        let slot = self.slot();
        if let Some((cached_slot, image)) = &self.cached {
            if *cached_slot == slot {
                return Ok(Frame::from_shared(slot as u64, self.position, Arc::clone(image)));
            }
        }

        let path = self.paths.get(slot).ok_or(SourceError::Ended)?;
        debug!("Decoding frame {} from {}", slot, path.display());
        let image = Arc::new(image::open(path).map_err(|e| SourceError::Decode(e, path.clone()))?);
        self.cached = Some((slot, Arc::clone(&image)));
        Ok(Frame::from_shared(slot as u64, self.position, image))
    }
}
