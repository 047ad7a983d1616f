//! Command-line interface

use clap::Parser;
use std::path::PathBuf;

/// Measure the left-knee angle across a video and export it as CSV
#[derive(Parser, Debug)]
#[command(name = "pose-kinematics")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory of frame images, played in file-name order
    pub frames_dir: PathBuf,

    /// JSON-lines file with one detected pose (or null) per frame
    #[arg(short, long)]
    pub landmarks: PathBuf,

    /// Name the export file is derived from (defaults to the directory name)
    #[arg(short, long)]
    pub name: Option<String>,

    /// Frame rate the image sequence was captured at
    #[arg(long)]
    pub fps: Option<f64>,

    /// Where to write the CSV (defaults to the current directory)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Save a PNG overlay for every frame with a detection
    #[arg(long)]
    pub overlay_dir: Option<PathBuf>,

    /// Config file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}
