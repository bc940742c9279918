use crate::{
    error::Error,
    joints::{JointAngle, Joints},
    pose::Pose,
    similarity::angle_agreement,
};
use num_traits::ToPrimitive;

/// Mean agreement of the `selected` joint angles. Selecting nothing scores 0.
pub(super) fn similarity(
    a: &Pose,
    b: &Pose,
    selected: &[JointAngle],
    confidence: f32,
) -> Result<f32, Error> {
    let joints_a = Joints::resolve(a, confidence)?;
    let joints_b = Joints::resolve(b, confidence)?;

    if selected.is_empty() {
        return Ok(0.0);
    }

    let total = selected.iter().try_fold(0.0, |total, angle| {
        Ok::<_, Error>(total + angle_agreement(angle.measure(&joints_a)?, angle.measure(&joints_b)?))
    })?;
    Ok(total / selected.len().to_f32().ok_or(Error::ConvertToF32)?)
}
