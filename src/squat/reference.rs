use crate::{
    error::Error,
    joints::JointAngles,
    pose::Pose,
    similarity::{combine, CombineOptions},
    squat::{threshold::is_standing, Assessment, Cue, PhaseDetector},
};
use tracing::trace;

/// Similarity below which the pose is reported as far from the reference.
pub const LARGE_DEVIATION_BELOW: f32 = 0.5;

/// Correction for a pose that did not reach the similarity threshold.
pub fn similarity_cue(similarity: f32) -> Cue {
    if similarity < LARGE_DEVIATION_BELOW {
        Cue::LargeDeviation
    } else {
        Cue::CloseToReference
    }
}

/// Recognises standing with the fixed thresholds and squatting by similarity to a
/// reference squat pose.
#[derive(Debug, Clone)]
pub struct ReferenceDetector {
    reference: Pose,
    similarity_threshold: f32,
    options: CombineOptions,
}

impl ReferenceDetector {
    /// Fails if the threshold lies outside `[0, 1]` or if the reference itself cannot be
    /// scored under `options`.
    pub fn new(
        reference: Pose,
        similarity_threshold: f32,
        options: CombineOptions,
    ) -> Result<Self, Error> {
        if !(0.0..=1.0).contains(&similarity_threshold) {
            return Err(Error::InvalidThreshold(similarity_threshold));
        }
        combine(&reference, &reference, &options)?;
        Ok(Self {
            reference,
            similarity_threshold,
            options,
        })
    }

    pub fn similarity_threshold(&self) -> f32 {
        self.similarity_threshold
    }

    /// Combined similarity of `pose` to the reference squat.
    pub fn similarity(&self, pose: &Pose) -> Result<f32, Error> {
        combine(pose, &self.reference, &self.options)
    }
}

impl PhaseDetector for ReferenceDetector {
    fn assess(&self, pose: &Pose, angles: &JointAngles) -> Result<Assessment, Error> {
        let similarity = self.similarity(pose)?;
        trace!(message = "similarity to reference squat", similarity);

        Ok(Assessment {
            standing: is_standing(angles),
            squatting: similarity >= self.similarity_threshold,
            correction: similarity_cue(similarity),
        })
    }
}
