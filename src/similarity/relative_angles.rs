use crate::{
    error::Error,
    geometry,
    joints::Joints,
    pose::{KeypointKind, KeypointKind::*, Pose},
    similarity::angle_agreement,
};
use itertools::Itertools;
use num_traits::ToPrimitive;

/// Directed body segments whose pairwise angles describe the pose.
const SEGMENTS: [(KeypointKind, KeypointKind); 12] = [
    (LeftShoulder, LeftElbow),
    (LeftElbow, LeftWrist),
    (LeftShoulder, LeftHip),
    (LeftHip, LeftKnee),
    (LeftKnee, LeftAnkle),
    (RightShoulder, RightElbow),
    (RightElbow, RightWrist),
    (RightShoulder, RightHip),
    (RightHip, RightKnee),
    (RightKnee, RightAnkle),
    (LeftShoulder, RightShoulder),
    (LeftHip, RightHip),
];

fn segment_angles(joints: &Joints) -> Result<Vec<f32>, Error> {
    let segments = SEGMENTS
        .iter()
        .map(|&segment| joints.segment(segment))
        .collect::<Result<Vec<_>, _>>()?;
    segments
        .iter()
        .tuple_combinations()
        .map(|(&u, &v)| geometry::angle_between(u, v))
        .collect()
}

/// Mean agreement of the angles between every pair of segments. These do not depend
/// on position, scale or in-plane rotation, so normalizing first changes nothing.
pub(super) fn similarity(a: &Pose, b: &Pose, confidence: f32) -> Result<f32, Error> {
    let angles_a = segment_angles(&Joints::resolve(a, confidence)?)?;
    let angles_b = segment_angles(&Joints::resolve(b, confidence)?)?;

    let total = angles_a
        .iter()
        .zip(&angles_b)
        .map(|(&x, &y)| angle_agreement(x, y))
        .sum::<f32>();
    Ok(total / angles_a.len().to_f32().ok_or(Error::ConvertToF32)?)
}
