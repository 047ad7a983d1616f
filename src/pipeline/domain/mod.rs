pub mod angle;
pub mod keypoint;

pub use angle::{joint_angle, to_degrees};
pub use keypoint::KeypointRecord;
