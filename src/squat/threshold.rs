use crate::{
    error::Error,
    joints::{Joint, JointAngles, Side},
    pose::Pose,
    squat::{Assessment, Cue, PhaseDetector},
};

const STANDING_MIN_HIP: f32 = 160.0;
const STANDING_MIN_KNEE: f32 = 160.0;
const STANDING_MIN_ELBOW: f32 = 160.0;
const STANDING_MAX_SHOULDER: f32 = 20.0;

const SQUATTING_MAX_HIP: f32 = 170.0;
const SQUATTING_MAX_KNEE: f32 = 170.0;
const SQUATTING_MIN_ELBOW: f32 = 130.0;
const SQUATTING_MIN_SHOULDER: f32 = 30.0;
const SQUATTING_MAX_SHOULDER: f32 = 90.0;

const FORM_MAX_BENT_ELBOW: f32 = 130.0;
const FORM_MIN_SHOULDER: f32 = 30.0;
const FORM_MAX_SHOULDER: f32 = 120.0;
const FORM_MIN_HIP_TOO_HIGH: f32 = 130.0;
const FORM_MAX_KNEE_SPREAD: f32 = 15.0;
const FORM_MIN_KNEE: f32 = 60.0;

/// Upright with straight arms held along the body.
pub fn is_standing(angles: &JointAngles) -> bool {
    angles.both(Joint::Hip, |a| a > STANDING_MIN_HIP)
        && angles.both(Joint::Knee, |a| a > STANDING_MIN_KNEE)
        && angles.both(Joint::Elbow, |a| a > STANDING_MIN_ELBOW)
        && angles.both(Joint::Shoulder, |a| a < STANDING_MAX_SHOULDER)
}

/// Hips and knees bent with straight arms raised in front.
pub fn is_squatting(angles: &JointAngles) -> bool {
    angles.both(Joint::Hip, |a| a < SQUATTING_MAX_HIP)
        && angles.both(Joint::Knee, |a| a < SQUATTING_MAX_KNEE)
        && angles.both(Joint::Elbow, |a| a > SQUATTING_MIN_ELBOW)
        && angles.both(Joint::Shoulder, |a| {
            a > SQUATTING_MIN_SHOULDER && a < SQUATTING_MAX_SHOULDER
        })
}

/// First matching form rule for a pose that is neither standing nor squatting.
/// Rules are checked in order, so an earlier problem hides later ones.
pub fn form_correction(angles: &JointAngles) -> Cue {
    let knee_spread =
        (angles.side(Side::Left, Joint::Knee) - angles.side(Side::Right, Joint::Knee)).abs();

    if angles.either(Joint::Elbow, |a| a <= FORM_MAX_BENT_ELBOW) {
        Cue::StraightenArms
    } else if angles.either(Joint::Shoulder, |a| {
        a <= FORM_MIN_SHOULDER || a >= FORM_MAX_SHOULDER
    }) {
        Cue::AdjustArms
    } else if angles.either(Joint::Hip, |a| a >= FORM_MIN_HIP_TOO_HIGH) {
        Cue::LowerHips
    } else if knee_spread > FORM_MAX_KNEE_SPREAD {
        Cue::AlignKnees
    } else if angles.either(Joint::Knee, |a| a < FORM_MIN_KNEE) {
        Cue::TooLow
    } else {
        Cue::GoodForm
    }
}

/// Classifies both phases with fixed joint-angle thresholds.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThresholdDetector;

impl PhaseDetector for ThresholdDetector {
    fn assess(&self, _pose: &Pose, angles: &JointAngles) -> Result<Assessment, Error> {
        Ok(Assessment {
            standing: is_standing(angles),
            squatting: is_squatting(angles),
            correction: form_correction(angles),
        })
    }
}
