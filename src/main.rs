mod cli;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use cli::Cli;
use pose_kinematics::config::Settings;
use pose_kinematics::coordinator::CoordinatorBuilder;
use pose_kinematics::detector::ReplayDetector;
use pose_kinematics::error::AppError;
use pose_kinematics::pipeline::{ImageSurface, RunStatus};
use pose_kinematics::video::{ImageSequenceSource, VideoSource};
use tracing::Level;

fn init_logging(settings: &Settings, verbose: bool) {
    let level = if verbose {
        Level::DEBUG
    } else {
        settings.logging.level.parse().unwrap_or(Level::INFO)
    };
    tracing_subscriber::fmt().with_max_level(level).init();
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let cli = Cli::parse();
    let mut settings = Settings::load(cli.config.as_deref())?;
    init_logging(&settings, cli.verbose);

    settings.export.output_dir = cli
        .output_dir
        .or(settings.export.output_dir)
        .or_else(|| Some(PathBuf::from(".")));

    let fps = cli.fps.unwrap_or(settings.scheduler.seek_fps);
    let mut source = ImageSequenceSource::open(&cli.frames_dir, fps)?;
    if let Some(name) = cli.name {
        source = source.with_name(name);
    }
    let detector =
        ReplayDetector::load(&cli.landmarks, settings.detector.min_detection_confidence).await?;
    if detector.len() < source.frame_count() {
        tracing::warn!(
            "{} frames but only {} landmark lines; the rest count as empty",
            source.frame_count(),
            detector.len()
        );
    }

    let mut coordinator = CoordinatorBuilder::new(settings)
        .detector(Arc::new(detector))
        .build()?;

    match cli.overlay_dir {
        Some(dir) => {
            tokio::fs::create_dir_all(&dir)
                .await
                .map_err(|e| AppError::Overlay(format!("failed to create {}: {}", dir.display(), e)))?;
            let first = source.current_frame()?;
            let surface = ImageSurface::new(first.width(), first.height()).with_output_dir(dir);
            coordinator.submit_with_overlay(Box::new(source), Box::new(surface));
        }
        None => {
            coordinator.submit(Box::new(source));
        }
    }

    let outcome = coordinator.wait().await?;
    match (outcome.status, outcome.export_path) {
        (RunStatus::Completed, Some(path)) => println!("{}", path.display()),
        (RunStatus::Completed, None) => tracing::info!("No person detected, nothing written"),
        (status, _) => tracing::warn!("Run ended as {}", status),
    }
    Ok(())
}
