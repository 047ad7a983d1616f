pub mod image_sequence;
pub mod memory;

pub use image_sequence::ImageSequenceSource;
pub use memory::MemorySource;

use crate::common::Frame;
use crate::error::SourceError;

/// A pull-based video addressed by playback time.
pub trait VideoSource: Send {
    /// File name of the submitted video; the export file name is derived from it.
    fn name(&self) -> &str;

    /// Current playback position in seconds.
    fn position(&self) -> f64;

    fn seek(&mut self, position_secs: f64) -> Result<(), SourceError>;

    fn ended(&self) -> bool;

    fn current_frame(&mut self) -> Result<Frame, SourceError>;
}

/// Maps a playback position onto a frame slot at the given rate.
///
/// The epsilon absorbs the drift of repeatedly adding `1/30` in floating point.
pub(crate) fn frame_slot(position_secs: f64, fps: f64) -> usize {
    (position_secs * fps + 1e-6).floor() as usize
}

pub(crate) fn validate_frame_rate(fps: f64) -> Result<(), SourceError> {
    if fps.is_finite() && fps > 0.0 {
        Ok(())
    } else {
        Err(SourceError::InvalidFrameRate(fps))
    }
}

pub(crate) fn validate_seek(position_secs: f64) -> Result<(), SourceError> {
    if position_secs.is_finite() && position_secs >= 0.0 {
        Ok(())
    } else {
        Err(SourceError::InvalidSeek(position_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulated_thirtieths_land_on_whole_frames() {
        let mut position = 0.0;
        for expected in 0..300 {
            assert_eq!(frame_slot(position, 30.0), expected);
            position += 1.0 / 30.0;
        }
    }

    #[test]
    fn rejects_negative_and_nan_seeks() {
        assert!(validate_seek(-0.1).is_err());
        assert!(validate_seek(f64::NAN).is_err());
        assert!(validate_seek(0.0).is_ok());
    }

    #[test]
    fn rejects_rates_that_would_pin_every_position_to_slot_zero() {
        for fps in [0.0, -30.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(validate_frame_rate(fps), Err(SourceError::InvalidFrameRate(_))));
        }
        assert!(validate_frame_rate(29.97).is_ok());
    }
}
