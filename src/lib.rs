//! Scoring of pose similarity and a standing/squatting repetition counter driven by a
//! stream of body keypoints.

pub mod error;
pub mod geometry;
pub mod joints;
pub mod normalize;
pub mod pose;
pub mod reps;
pub mod session;
pub mod similarity;
pub mod squat;

#[cfg(test)]
mod fixtures;

pub use error::Error;
pub use pose::{Keypoint, KeypointKind, Pose, DEFAULT_CONFIDENCE};
pub use reps::{validate_reps, SquatLogEntry};
pub use session::Session;
pub use similarity::{combine, CombineOptions, SimilarityStrategy, WeightedStrategy};
pub use squat::{Detector, Feedback, SquatPhase, StateMachine, Tick};
