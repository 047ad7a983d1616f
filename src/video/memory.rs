use std::sync::Arc;

use crate::common::Frame;
use crate::error::SourceError;
use crate::video::{VideoSource, frame_slot, validate_frame_rate, validate_seek};
use image::DynamicImage;

/// Already-decoded frames held in memory, played back at a fixed rate.
pub struct MemorySource {
    name: String,
    frames: Vec<Arc<DynamicImage>>,
    fps: f64,
    position: f64,
}

impl MemorySource {
    pub fn new(name: impl Into<String>, frames: Vec<DynamicImage>, fps: f64) -> Result<Self, SourceError> {
        validate_frame_rate(fps)?;
        Ok(Self {
            name: name.into(),
            frames: frames.into_iter().map(Arc::new).collect(),
            fps,
            position: 0.0,
        })
    }

    /// `count` blank frames of the given size.
    pub fn blank(
        name: impl Into<String>,
        count: usize,
        width: u32,
        height: u32,
        fps: f64,
    ) -> Result<Self, SourceError> {
        Self::new(
            name,
            (0..count).map(|_| DynamicImage::new_rgb8(width, height)).collect(),
            fps,
        )
    }

    fn slot(&self) -> usize {
        frame_slot(self.position, self.fps)
    }
}

impl VideoSource for MemorySource {
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
        self.slot() >= self.frames.len()
    }

    fn current_frame(&mut self) -> Result<Frame, SourceError> {
        let slot = self.slot();
        let image = self.frames.get(slot).ok_or(SourceError::Ended)?;
        Ok(Frame::from_shared(slot as u64, self.position, Arc::clone(image)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plays_through_and_ends() {
        let mut source = MemorySource::blank("clip.mp4", 2, 4, 4, 30.0).unwrap();
        assert!(!source.ended());
        assert_eq!(source.current_frame().unwrap().sequence(), 0);
        source.seek(1.0 / 30.0).unwrap();
        assert_eq!(source.current_frame().unwrap().sequence(), 1);
        source.seek(2.0 / 30.0).unwrap();
        assert!(source.ended());
        assert!(matches!(source.current_frame(), Err(SourceError::Ended)));
    }

    #[test]
    fn slower_source_repeats_frames_at_thirty_fps_steps() {
        let mut source = MemorySource::blank("clip.mp4", 2, 4, 4, 15.0).unwrap();
        let mut seen = Vec::new();
        while !source.ended() {
            seen.push(source.current_frame().unwrap().sequence());
            let next = source.position() + 1.0 / 30.0;
            source.seek(next).unwrap();
        }
        assert_eq!(seen, vec![0, 0, 1, 1]);
    }

    #[test]
    fn zero_frame_rate_is_rejected() {
        assert!(matches!(
            MemorySource::blank("clip.mp4", 2, 4, 4, 0.0),
            Err(SourceError::InvalidFrameRate(_))
        ));
    }
}
