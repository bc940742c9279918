//! Synthetic poses shared by unit tests, in image coordinates (y grows downward).

use crate::pose::{Keypoint, Pose};

fn pose(points: &[(&str, f32, f32)]) -> Pose {
    Pose::new(
        points
            .iter()
            .map(|&(name, x, y)| Keypoint::new(name, x, y, 0.9))
            .collect(),
    )
    .unwrap()
}

/// Upright, arms hanging straight along the torso.
pub(crate) fn standing_pose() -> Pose {
    pose(&[
        ("nose", 150.0, 60.0),
        ("left_shoulder", 100.0, 100.0),
        ("left_elbow", 102.0, 150.0),
        ("left_wrist", 104.0, 200.0),
        ("left_hip", 100.0, 200.0),
        ("left_knee", 100.0, 300.0),
        ("left_ankle", 100.0, 400.0),
        ("right_shoulder", 200.0, 100.0),
        ("right_elbow", 198.0, 150.0),
        ("right_wrist", 196.0, 200.0),
        ("right_hip", 200.0, 200.0),
        ("right_knee", 200.0, 300.0),
        ("right_ankle", 200.0, 400.0),
    ])
}

/// Knees and hips bent near 120 degrees, straight arms raised 60 degrees from the torso.
pub(crate) fn squat_pose() -> Pose {
    pose(&[
        ("nose", 150.0, 60.0),
        ("left_shoulder", 100.0, 100.0),
        ("left_elbow", 56.7, 125.0),
        ("left_wrist", 13.4, 150.0),
        ("left_hip", 100.0, 200.0),
        ("left_knee", 160.0, 240.0),
        ("left_ankle", 150.0, 340.0),
        ("right_shoulder", 200.0, 100.0),
        ("right_elbow", 243.3, 125.0),
        ("right_wrist", 286.6, 150.0),
        ("right_hip", 200.0, 200.0),
        ("right_knee", 140.0, 240.0),
        ("right_ankle", 150.0, 340.0),
    ])
}

/// Standing, except the left forearm is bent to roughly 90 degrees.
pub(crate) fn bent_arm_pose() -> Pose {
    moved(&standing_pose(), "left_wrist", 150.0, 150.0)
}

pub(crate) fn with_score(pose: &Pose, name: &str, score: f32) -> Pose {
    rebuild(pose, |kp| {
        if kp.name == name {
            Some(Keypoint {
                score: Some(score),
                ..kp.clone()
            })
        } else {
            Some(kp.clone())
        }
    })
}

/// Every keypoint rescored to `score`.
pub(crate) fn rescored(pose: &Pose, score: f32) -> Pose {
    rebuild(pose, |kp| {
        Some(Keypoint {
            score: Some(score),
            ..kp.clone()
        })
    })
}

/// Standing, except the left forearm folds back toward the shoulder (elbow near 16 degrees).
pub(crate) fn folded_arm_pose() -> Pose {
    moved(&standing_pose(), "left_wrist", 112.0, 110.0)
}

pub(crate) fn without(pose: &Pose, name: &str) -> Pose {
    rebuild(pose, |kp| if kp.name == name { None } else { Some(kp.clone()) })
}

pub(crate) fn moved(pose: &Pose, name: &str, x: f32, y: f32) -> Pose {
    rebuild(pose, |kp| {
        if kp.name == name {
            Some(Keypoint { x, y, ..kp.clone() })
        } else {
            Some(kp.clone())
        }
    })
}

/// Rotate by `radians` about the origin, scale, then translate.
pub(crate) fn transformed(pose: &Pose, radians: f32, scale: f32, dx: f32, dy: f32) -> Pose {
    let (sin, cos) = radians.sin_cos();
    pose.map_points(|x, y| {
        (
            scale * (x * cos - y * sin) + dx,
            scale * (x * sin + y * cos) + dy,
        )
    })
}

fn rebuild<F>(pose: &Pose, f: F) -> Pose
where
    F: FnMut(&Keypoint) -> Option<Keypoint>,
{
    Pose::new(pose.keypoints().iter().filter_map(f).collect()).unwrap()
}
