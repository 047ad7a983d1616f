use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::AppError;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

pub const ENV_PREFIX: &str = "POSE";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub scheduler: SchedulerSettings,
    pub detector: DetectorSettings,
    pub overlay: OverlaySettings,
    pub export: ExportSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerSettings {
    /// Rate used to step the playback position, independent of the source's real frame rate.
    pub seek_fps: f64,
    /// Abort the run when one inference takes longer than this. Unset waits forever.
    pub detector_timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorSettings {
    pub min_detection_confidence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlaySettings {
    pub enabled: bool,
    pub point_radius: i32,
    pub line_width: u32,
    pub point_color: [u8; 4],
    pub line_color: [u8; 4],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AngleUnit {
    Radians,
    Degrees,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    pub output_dir: Option<PathBuf>,
    pub angle_unit: AngleUnit,
    /// Ring the terminal bell when a run finishes.
    pub bell: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            seek_fps: 30.0,
            detector_timeout_ms: None,
        }
    }
}

impl Default for DetectorSettings {
    fn default() -> Self {
        Self {
            min_detection_confidence: 0.5,
        }
    }
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            enabled: true,
            point_radius: 5,
            line_width: 2,
            point_color: [255, 0, 0, 255],
            line_color: [0, 0, 255, 255],
        }
    }
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            output_dir: None,
            angle_unit: AngleUnit::Radians,
            bell: false,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl SchedulerSettings {
    pub fn frame_step(&self) -> f64 {
        1.0 / self.seek_fps
    }

    pub fn detector_timeout(&self) -> Option<Duration> {
        self.detector_timeout_ms.map(Duration::from_millis)
    }
}

impl Settings {
    /// Layers defaults, an optional config file, then `POSE__SECTION__KEY` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let mut builder = Config::builder().add_source(Config::try_from(&Settings::default())?);
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }
        let settings: Settings = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if !(self.scheduler.seek_fps.is_finite() && self.scheduler.seek_fps > 0.0) {
            return Err(AppError::Pipeline(format!(
                "scheduler.seek_fps must be positive, got {}",
                self.scheduler.seek_fps
            )));
        }
        if !(0.0..=1.0).contains(&self.detector.min_detection_confidence) {
            return Err(AppError::Pipeline(format!(
                "detector.min_detection_confidence must be within [0, 1], got {}",
                self.detector.min_detection_confidence
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_behavior() {
        let settings = Settings::default();
        assert!((settings.scheduler.frame_step() - 1.0 / 30.0).abs() < 1e-15);
        assert_eq!(settings.scheduler.detector_timeout(), None);
        assert_eq!(settings.export.angle_unit, AngleUnit::Radians);
        assert_eq!(settings.overlay.point_radius, 5);
    }

    #[test]
    fn file_overrides_defaults() {
        let path = std::env::temp_dir().join(format!("pose-settings-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(
            &path,
            "[scheduler]\ndetector_timeout_ms = 250\n\n[export]\nangle_unit = \"degrees\"\n",
        )
        .unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.scheduler.detector_timeout(), Some(Duration::from_millis(250)));
        assert_eq!(settings.scheduler.seek_fps, 30.0);
        assert_eq!(settings.export.angle_unit, AngleUnit::Degrees);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn environment_overrides_defaults() {
        std::env::set_var("POSE__LOGGING__LEVEL", "debug");
        let settings = Settings::load(None).unwrap();
        std::env::remove_var("POSE__LOGGING__LEVEL");
        assert_eq!(settings.logging.level, "debug");
    }

    #[test]
    fn rejects_non_positive_seek_rate() {
        let mut settings = Settings::default();
        settings.scheduler.seek_fps = 0.0;
        assert!(settings.validate().is_err());
    }
}
