use std::path::Path;

use crate::common::{Frame, PoseLandmarks};
use crate::detector::LandmarkDetector;
use crate::error::AppError;
use async_trait::async_trait;
use tracing::{debug, info};

/// Replays landmarks recorded by an external pose model.
///
/// The file holds one JSON value per source frame: `null` when nobody was
/// detected, otherwise a `PoseLandmarks` object. Frames past the end of the
/// file are treated as empty.
pub struct ReplayDetector {
    poses: Vec<Option<PoseLandmarks>>,
    min_detection_confidence: f64,
}

impl ReplayDetector {
    pub async fn load(path: &Path, min_detection_confidence: f64) -> Result<Self, AppError> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| AppError::Detector(format!("failed to read {}: {}", path.display(), e)))?;
        let detector = Self::parse(&contents, min_detection_confidence)?;
        info!(
            "Loaded {} recorded frames from {}",
            detector.poses.len(),
            path.display()
        );
        Ok(detector)
    }

    pub fn parse(contents: &str, min_detection_confidence: f64) -> Result<Self, AppError> {
        // one line per source frame; a blank line is a frame without a person
        let poses = contents
            .lines()
            .enumerate()
            .map(|(line_no, line)| {
                if line.trim().is_empty() {
                    return Ok(None);
                }
                serde_json::from_str::<Option<PoseLandmarks>>(line).map_err(|e| {
                    AppError::Detector(format!("invalid landmarks on line {}: {}", line_no + 1, e))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            poses,
            min_detection_confidence,
        })
    }

    pub fn len(&self) -> usize {
        self.poses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }
}

#[async_trait]
impl LandmarkDetector for ReplayDetector {
    async fn detect(&self, frame: &Frame) -> Result<Option<PoseLandmarks>, AppError> {
        let Some(Some(pose)) = self.poses.get(frame.sequence() as usize) else {
            return Ok(None);
        };
        match pose.score {
            Some(score) if score < self.min_detection_confidence => {
                debug!(
                    "Frame {} pose score {} below {}",
                    frame.sequence(),
                    score,
                    self.min_detection_confidence
                );
                Ok(None)
            }
            _ => Ok(Some(pose.clone())),
        }
    }

    fn name(&self) -> &'static str {
        "ReplayDetector"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::landmark::body_with_leg;
    use image::DynamicImage;

    fn line(pose: &PoseLandmarks) -> String {
        serde_json::to_string(pose).unwrap()
    }

    fn frame(sequence: u64) -> Frame {
        Frame::new(sequence, sequence as f64 / 30.0, DynamicImage::new_rgb8(2, 2))
    }

    #[tokio::test]
    async fn replays_by_source_frame() {
        let pose = body_with_leg((0.5, 0.3), (0.5, 0.5), (0.5, 0.7));
        let contents = format!("{}\nnull\n{}\n", line(&pose), line(&pose));
        let detector = ReplayDetector::parse(&contents, 0.5).unwrap();
        assert_eq!(detector.len(), 3);
        assert_eq!(detector.detect(&frame(0)).await.unwrap(), Some(pose.clone()));
        assert_eq!(detector.detect(&frame(1)).await.unwrap(), None);
        assert_eq!(detector.detect(&frame(2)).await.unwrap(), Some(pose));
        assert_eq!(detector.detect(&frame(9)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn low_confidence_poses_count_as_no_detection() {
        let weak = body_with_leg((0.5, 0.3), (0.5, 0.5), (0.5, 0.7)).with_score(0.2);
        let strong = weak.clone().with_score(0.9);
        let contents = format!("{}\n{}", line(&weak), line(&strong));
        let detector = ReplayDetector::parse(&contents, 0.5).unwrap();
        assert_eq!(detector.detect(&frame(0)).await.unwrap(), None);
        assert_eq!(detector.detect(&frame(1)).await.unwrap(), Some(strong));
    }

    #[tokio::test]
    async fn blank_line_keeps_later_poses_on_their_own_frame() {
        let first = body_with_leg((0.5, 0.3), (0.5, 0.5), (0.5, 0.7));
        let third = body_with_leg((0.4, 0.3), (0.5, 0.5), (0.6, 0.7));
        let contents = format!("{}\n\n{}\n", line(&first), line(&third));
        let detector = ReplayDetector::parse(&contents, 0.5).unwrap();
        assert_eq!(detector.len(), 3);
        assert_eq!(detector.detect(&frame(0)).await.unwrap(), Some(first));
        assert_eq!(detector.detect(&frame(1)).await.unwrap(), None);
        assert_eq!(detector.detect(&frame(2)).await.unwrap(), Some(third));
    }

    #[test]
    fn reports_the_bad_line() {
        let err = ReplayDetector::parse("null\n{oops}\n", 0.5).err().unwrap();
        assert!(err.to_string().contains("line 2"));
    }
}
