use std::path::PathBuf;

use crate::config::OverlaySettings;
use crate::error::AppError;
use crate::pipeline::domain::KeypointRecord;
use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut};

/// Something the overlay can be drawn onto.
pub trait OverlaySurface: Send {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn clear(&mut self);
    fn draw_frame(&mut self, image: &DynamicImage);
    fn fill_circle(&mut self, center: (f32, f32), radius: i32, color: Rgba<u8>);
    fn stroke_line(&mut self, from: (f32, f32), to: (f32, f32), width: u32, color: Rgba<u8>);

    /// Called once the overlay for a frame is complete.
    fn present(&mut self, _frame_index: u64) -> Result<(), AppError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayStyle {
    pub point_radius: i32,
    pub line_width: u32,
    pub point_color: Rgba<u8>,
    pub line_color: Rgba<u8>,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self::from(&OverlaySettings::default())
    }
}

impl From<&OverlaySettings> for OverlayStyle {
    fn from(settings: &OverlaySettings) -> Self {
        Self {
            point_radius: settings.point_radius,
            line_width: settings.line_width,
            point_color: Rgba(settings.point_color),
            line_color: Rgba(settings.line_color),
        }
    }
}

/// Draws the hip, knee and ankle of one record over its frame.
///
/// Each call starts from a cleared surface, so nothing from earlier frames survives.
#[derive(Debug, Clone, Default)]
pub struct OverlayRenderer {
    style: OverlayStyle,
}

impl OverlayRenderer {
    pub fn new(style: OverlayStyle) -> Self {
        Self { style }
    }

    pub fn render(
        &self,
        surface: &mut dyn OverlaySurface,
        frame: &DynamicImage,
        record: &KeypointRecord,
    ) -> Result<(), AppError> {
        let (width, height) = (surface.width(), surface.height());
        let hip = record.hip().denormalize(width, height);
        let knee = record.knee().denormalize(width, height);
        let ankle = record.ankle().denormalize(width, height);

        surface.clear();
        surface.draw_frame(frame);
        for point in [hip, knee, ankle] {
            surface.fill_circle(point, self.style.point_radius, self.style.point_color);
        }
        surface.stroke_line(hip, knee, self.style.line_width, self.style.line_color);
        surface.stroke_line(knee, ankle, self.style.line_width, self.style.line_color);
        surface.present(record.frame_index())
    }
}

/// An in-memory RGBA canvas, optionally saving every presented overlay as PNG.
pub struct ImageSurface {
    canvas: RgbaImage,
    output_dir: Option<PathBuf>,
}

impl ImageSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            canvas: RgbaImage::new(width, height),
            output_dir: None,
        }
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn canvas(&self) -> &RgbaImage {
        &self.canvas
    }
}

impl OverlaySurface for ImageSurface {
    fn width(&self) -> u32 {
        self.canvas.width()
    }

    fn height(&self) -> u32 {
        self.canvas.height()
    }

    fn clear(&mut self) {
        self.canvas.pixels_mut().for_each(|p| *p = Rgba([0, 0, 0, 0]));
    }

    fn draw_frame(&mut self, image: &DynamicImage) {
        let rgba = image.to_rgba8();
        if rgba.dimensions() == self.canvas.dimensions() {
            self.canvas = rgba;
        } else {
            self.canvas = imageops::resize(&rgba, self.width(), self.height(), FilterType::Triangle);
        }
    }

    fn fill_circle(&mut self, center: (f32, f32), radius: i32, color: Rgba<u8>) {
        let center = (center.0.round() as i32, center.1.round() as i32);
        draw_filled_circle_mut(&mut self.canvas, center, radius, color);
    }

    fn stroke_line(&mut self, from: (f32, f32), to: (f32, f32), width: u32, color: Rgba<u8>) {
        // imageproc segments are one pixel wide; thicken by offsetting copies
        let half = width as i32 / 2;
        for offset in -half..(width as i32 - half) {
            let o = offset as f32;
            draw_line_segment_mut(&mut self.canvas, (from.0 + o, from.1), (to.0 + o, to.1), color);
            draw_line_segment_mut(&mut self.canvas, (from.0, from.1 + o), (to.0, to.1 + o), color);
        }
    }

    fn present(&mut self, frame_index: u64) -> Result<(), AppError> {
        let Some(dir) = &self.output_dir else {
            return Ok(());
        };
        let path = dir.join(format!("overlay_{frame_index:06}.png"));
        self.canvas
            .save(&path)
            .map_err(|e| AppError::Overlay(format!("failed to save {}: {}", path.display(), e)))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::common::{Landmark, LegLandmarks};
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, PartialEq)]
    pub(crate) enum SurfaceOp {
        Clear,
        Frame,
        Circle((f32, f32)),
        Line((f32, f32), (f32, f32)),
        Present(u64),
    }

    /// Records draw calls instead of rasterizing them.
    pub(crate) struct RecordingSurface {
        pub(crate) width: u32,
        pub(crate) height: u32,
        pub(crate) ops: Arc<Mutex<Vec<SurfaceOp>>>,
    }

    impl OverlaySurface for RecordingSurface {
        fn width(&self) -> u32 {
            self.width
        }
        fn height(&self) -> u32 {
            self.height
        }
        fn clear(&mut self) {
            self.ops.lock().unwrap().push(SurfaceOp::Clear);
        }
        fn draw_frame(&mut self, _image: &DynamicImage) {
            self.ops.lock().unwrap().push(SurfaceOp::Frame);
        }
        fn fill_circle(&mut self, center: (f32, f32), _radius: i32, _color: Rgba<u8>) {
            self.ops.lock().unwrap().push(SurfaceOp::Circle(center));
        }
        fn stroke_line(&mut self, from: (f32, f32), to: (f32, f32), _width: u32, _color: Rgba<u8>) {
            self.ops.lock().unwrap().push(SurfaceOp::Line(from, to));
        }
        fn present(&mut self, frame_index: u64) -> Result<(), AppError> {
            self.ops.lock().unwrap().push(SurfaceOp::Present(frame_index));
            Ok(())
        }
    }

    fn record() -> KeypointRecord {
        KeypointRecord::from_leg(
            7,
            LegLandmarks {
                hip: Landmark::new(0.5, 0.25),
                knee: Landmark::new(0.5, 0.5),
                ankle: Landmark::new(0.75, 0.75),
            },
        )
    }

    #[test]
    fn draws_three_points_and_two_segments_on_a_fresh_surface() {
        let ops = Arc::new(Mutex::new(Vec::new()));
        let mut surface = RecordingSurface {
            width: 200,
            height: 100,
            ops: Arc::clone(&ops),
        };
        OverlayRenderer::default()
            .render(&mut surface, &DynamicImage::new_rgb8(200, 100), &record())
            .unwrap();

        let ops = ops.lock().unwrap();
        assert_eq!(
            *ops,
            vec![
                SurfaceOp::Clear,
                SurfaceOp::Frame,
                SurfaceOp::Circle((100.0, 25.0)),
                SurfaceOp::Circle((100.0, 50.0)),
                SurfaceOp::Circle((150.0, 75.0)),
                SurfaceOp::Line((100.0, 25.0), (100.0, 50.0)),
                SurfaceOp::Line((100.0, 50.0), (150.0, 75.0)),
                SurfaceOp::Present(7),
            ]
        );
    }

    #[test]
    fn image_surface_rasterizes_over_the_frame() {
        let mut surface = ImageSurface::new(100, 100);
        let frame = DynamicImage::ImageRgba8(RgbaImage::from_pixel(50, 50, Rgba([0, 255, 0, 255])));
        OverlayRenderer::default().render(&mut surface, &frame, &record()).unwrap();

        let canvas = surface.canvas();
        // inside the knee circle, clear of both segments
        assert_eq!(canvas.get_pixel(53, 50), &Rgba([255, 0, 0, 255]));
        // segment between hip (50, 25) and knee (50, 50), away from both points
        assert_eq!(canvas.get_pixel(50, 37), &Rgba([0, 0, 255, 255]));
        // frame is scaled up underneath
        assert_eq!(canvas.get_pixel(5, 95), &Rgba([0, 255, 0, 255]));
    }

    #[test]
    fn stale_points_do_not_survive_the_next_frame() {
        let mut surface = ImageSurface::new(100, 100);
        let frame = DynamicImage::new_rgba8(100, 100);
        let renderer = OverlayRenderer::default();
        renderer.render(&mut surface, &frame, &record()).unwrap();
        let moved = KeypointRecord::from_leg(
            8,
            LegLandmarks {
                hip: Landmark::new(0.1, 0.1),
                knee: Landmark::new(0.1, 0.2),
                ankle: Landmark::new(0.1, 0.3),
            },
        );
        renderer.render(&mut surface, &frame, &moved).unwrap();
        assert_eq!(surface.canvas().get_pixel(53, 50), &Rgba([0, 0, 0, 0]));
    }
}
