use crate::{
    error::Error,
    joints::{JointAngles, Joints},
    pose::Pose,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

mod reference;
pub use reference::{similarity_cue, ReferenceDetector, LARGE_DEVIATION_BELOW};

mod threshold;
pub use threshold::{form_correction, is_squatting, is_standing, ThresholdDetector};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SquatPhase {
    Standing,
    Squatting,
}

impl Default for SquatPhase {
    fn default() -> Self {
        Self::Standing
    }
}

/// Every message the state machine can show.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Cue {
    NotInFrame,
    SquatCorrect,
    StraightenArms,
    AdjustArms,
    LowerHips,
    AlignKnees,
    TooLow,
    GoodForm,
    LargeDeviation,
    CloseToReference,
}

impl Cue {
    pub fn message(self) -> &'static str {
        match self {
            Self::NotInFrame => "Make sure your full body is in the camera frame",
            Self::SquatCorrect => "Squat form is correct!",
            Self::StraightenArms => "Keep your arms straighter",
            Self::AdjustArms => "Adjust your arm position",
            Self::LowerHips => "Lower your hips more",
            Self::AlignKnees => "Keep your knees aligned",
            Self::TooLow => "Don't go too low, protect your knees",
            Self::GoodForm => "Good squat form!",
            Self::LargeDeviation => "Large deviation from the reference pose, follow the demonstration",
            Self::CloseToReference => "Close to the reference pose, keep adjusting",
        }
    }

    pub fn is_correct(self) -> bool {
        matches!(self, Self::SquatCorrect | Self::GoodForm)
    }
}

/// Snapshot of the latest evaluation outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub is_correct: bool,
    pub message: String,
}

impl From<Cue> for Feedback {
    fn from(cue: Cue) -> Self {
        Self {
            is_correct: cue.is_correct(),
            message: cue.message().to_owned(),
        }
    }
}

/// How one visible pose relates to the two target configurations.
///
/// `correction` is only consulted when neither configuration is recognised.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Assessment {
    pub standing: bool,
    pub squatting: bool,
    pub correction: Cue,
}

pub trait PhaseDetector {
    /// Classify a pose whose required joints already passed the confidence gate.
    fn assess(&self, pose: &Pose, angles: &JointAngles) -> Result<Assessment, Error>;
}

/// Outcome of feeding one pose to the state machine.
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    /// The phase to carry into the next tick.
    pub phase: SquatPhase,
    /// Set when the phase just held was confirmed complete.
    pub completed: Option<SquatPhase>,
    /// `None` leaves the previously shown feedback in place.
    pub feedback: Option<Feedback>,
}

impl Tick {
    fn unchanged(phase: SquatPhase, feedback: Option<Feedback>) -> Self {
        Self {
            phase,
            completed: None,
            feedback,
        }
    }
}

/// The two-state standing/squatting machine. It holds no phase of its own: each
/// [`tick`](StateMachine::tick) takes the current phase and returns the next.
#[derive(Debug, Clone)]
pub struct StateMachine<D> {
    detector: D,
    confidence: f32,
}

impl<D> StateMachine<D>
where
    D: PhaseDetector,
{
    pub fn new(detector: D, confidence: f32) -> Self {
        Self {
            detector,
            confidence,
        }
    }

    pub fn detector(&self) -> &D {
        &self.detector
    }

    pub fn tick(&self, phase: SquatPhase, pose: &Pose) -> Result<Tick, Error> {
        let angles = match Joints::resolve(pose, self.confidence)
            .and_then(|joints| JointAngles::measure(&joints))
        {
            Ok(angles) => angles,
            Err(e) if e.is_unusable_pose() => {
                debug!(message = "pose not usable this tick", error = %e);
                return Ok(Tick::unchanged(phase, Some(Cue::NotInFrame.into())));
            }
            Err(e) => return Err(e),
        };

        let assessment = match self.detector.assess(pose, &angles) {
            Ok(assessment) => assessment,
            Err(e) if e.is_unusable_pose() => {
                debug!(message = "pose not usable this tick", error = %e);
                return Ok(Tick::unchanged(phase, Some(Cue::NotInFrame.into())));
            }
            Err(e) => return Err(e),
        };

        let tick = match phase {
            SquatPhase::Standing if assessment.standing => Tick {
                phase: SquatPhase::Squatting,
                completed: Some(SquatPhase::Standing),
                feedback: None,
            },
            SquatPhase::Squatting if assessment.squatting => Tick {
                phase: SquatPhase::Standing,
                completed: Some(SquatPhase::Squatting),
                feedback: Some(Cue::SquatCorrect.into()),
            },
            _ if !assessment.standing && !assessment.squatting => {
                Tick::unchanged(phase, Some(assessment.correction.into()))
            }
            _ => Tick::unchanged(phase, None),
        };

        if let Some(completed) = tick.completed {
            debug!(message = "phase complete", ?completed, next = ?tick.phase);
        }
        Ok(tick)
    }
}

/// Either detector, chosen at run time.
#[derive(Debug, Clone)]
pub enum Detector {
    Threshold(ThresholdDetector),
    Reference(ReferenceDetector),
}

impl PhaseDetector for Detector {
    fn assess(&self, pose: &Pose, angles: &JointAngles) -> Result<Assessment, Error> {
        match self {
            Self::Threshold(d) => d.assess(pose, angles),
            Self::Reference(d) => d.assess(pose, angles),
        }
    }
}
