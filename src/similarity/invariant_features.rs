use crate::{
    error::Error,
    joints::{JointAngles, Joints},
    pose::{KeypointKind, KeypointKind::*, Pose},
    similarity::angle_agreement,
};
use ndarray::{Array1, Zip};

/// Segments measured relative to the mean torso length.
const LIMBS: [(KeypointKind, KeypointKind); 10] = [
    (LeftShoulder, LeftElbow),
    (LeftElbow, LeftWrist),
    (LeftHip, LeftKnee),
    (LeftKnee, LeftAnkle),
    (RightShoulder, RightElbow),
    (RightElbow, RightWrist),
    (RightHip, RightKnee),
    (RightKnee, RightAnkle),
    (LeftShoulder, RightShoulder),
    (LeftHip, RightHip),
];

const TORSO: [(KeypointKind, KeypointKind); 2] = [(LeftShoulder, LeftHip), (RightShoulder, RightHip)];

const MIN_TORSO_LENGTH: f32 = 1e-6;

struct Features {
    ratios: Array1<f32>,
    angles: Array1<f32>,
}

impl Features {
    fn extract(joints: &Joints) -> Result<Self, Error> {
        let torso = (joints.length(TORSO[0])? + joints.length(TORSO[1])?) / 2.0;
        if torso < MIN_TORSO_LENGTH {
            return Err(Error::DegenerateGeometry);
        }

        let ratios = LIMBS
            .iter()
            .map(|&limb| Ok(joints.length(limb)? / torso))
            .collect::<Result<Vec<_>, Error>>()?;
        let angles = JointAngles::measure(joints)?
            .iter()
            .map(|(_, degrees)| degrees)
            .collect::<Vec<_>>();

        Ok(Self {
            ratios: Array1::from(ratios),
            angles: Array1::from(angles),
        })
    }
}

/// 1 for equal lengths, falling toward 0 as one dwarfs the other.
fn ratio_agreement(a: f32, b: f32) -> f32 {
    let longer = a.max(b);
    if longer <= 0.0 {
        1.0
    } else {
        a.min(b) / longer
    }
}

/// Equal-weight blend of length-ratio agreement and joint-angle agreement.
pub(super) fn similarity(a: &Pose, b: &Pose, confidence: f32) -> Result<f32, Error> {
    let features_a = Features::extract(&Joints::resolve(a, confidence)?)?;
    let features_b = Features::extract(&Joints::resolve(b, confidence)?)?;

    let ratio_score = Zip::from(&features_a.ratios)
        .and(&features_b.ratios)
        .map_collect(|&x, &y| ratio_agreement(x, y))
        .mean()
        .unwrap_or(0.0);
    let angle_score = Zip::from(&features_a.angles)
        .and(&features_b.angles)
        .map_collect(|&x, &y| angle_agreement(x, y))
        .mean()
        .unwrap_or(0.0);

    Ok(0.5 * ratio_score + 0.5 * angle_score)
}
