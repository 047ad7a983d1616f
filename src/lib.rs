pub mod common;
pub mod config;
pub mod coordinator;
pub mod detector;
pub mod error;
pub mod pipeline;
pub mod video;

pub use crate::config::Settings;
pub use crate::coordinator::{Coordinator, CoordinatorBuilder};
pub use crate::error::{AccumulatorError, AppError, SourceError};
