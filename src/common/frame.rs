use image::DynamicImage;
use std::sync::Arc;
use uuid::Uuid;

/// One decoded video frame, addressed by its position in the source.
///
/// `frame_id` tells apart repeated reads of the same source slot.
#[derive(Clone, Debug)]
pub struct Frame {
    sequence: u64,
    position_secs: f64,
    image: Arc<DynamicImage>,
    frame_id: Uuid,
}

impl Frame {
    pub fn new(sequence: u64, position_secs: f64, image: DynamicImage) -> Self {
        Self::from_shared(sequence, position_secs, Arc::new(image))
    }

    pub fn from_shared(sequence: u64, position_secs: f64, image: Arc<DynamicImage>) -> Self {
        Self {
            sequence,
            position_secs,
            image,
            frame_id: Uuid::new_v4(),
        }
    }

    /// Index of the underlying source frame (not the keypoint frame index).
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn position_secs(&self) -> f64 {
        self.position_secs
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn frame_id(&self) -> Uuid {
        self.frame_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    #[test]
    fn cloning_frame_shares_image_buffer() {
        let img: DynamicImage = DynamicImage::ImageRgb8(
            ImageBuffer::<Rgb<u8>, Vec<u8>>::from_pixel(16, 16, Rgb([1, 2, 3])),
        );
        let f1 = Frame::new(0, 0.0, img);
        let f2 = f1.clone();
        assert!(Arc::ptr_eq(&f1.image, &f2.image));
        assert_eq!(f1.frame_id(), f2.frame_id());
    }

    #[test]
    fn frame_reports_image_dimensions() {
        let img = DynamicImage::new_rgb8(64, 48);
        let frame = Frame::new(3, 0.1, img);
        assert_eq!((frame.width(), frame.height()), (64, 48));
        assert_eq!(frame.sequence(), 3);
    }
}
