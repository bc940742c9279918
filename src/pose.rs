use crate::error::Error;
use num_traits::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, convert::TryFrom};

/// Minimum keypoint score trusted by every computation unless the caller overrides it.
pub const DEFAULT_CONFIDENCE: f32 = 0.3;

#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Hash, num_derive::FromPrimitive, num_derive::ToPrimitive,
)]
pub enum KeypointKind {
    Nose,
    LeftEye,
    RightEye,
    LeftEar,
    RightEar,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
}

pub const NUM_KEYPOINTS: usize = 17;

impl KeypointKind {
    pub fn idx(self) -> Result<usize, Error> {
        self.to_usize().ok_or(Error::KeypointVariantToUSize(self))
    }

    pub fn from_idx(index: usize) -> Result<Self, Error> {
        Self::from_usize(index).ok_or(Error::ConvertUSizeToKeypointKind(index))
    }

    /// The name a pose detector gives this keypoint.
    pub fn name(self) -> &'static str {
        match self {
            Self::Nose => "nose",
            Self::LeftEye => "left_eye",
            Self::RightEye => "right_eye",
            Self::LeftEar => "left_ear",
            Self::RightEar => "right_ear",
            Self::LeftShoulder => "left_shoulder",
            Self::RightShoulder => "right_shoulder",
            Self::LeftElbow => "left_elbow",
            Self::RightElbow => "right_elbow",
            Self::LeftWrist => "left_wrist",
            Self::RightWrist => "right_wrist",
            Self::LeftHip => "left_hip",
            Self::RightHip => "right_hip",
            Self::LeftKnee => "left_knee",
            Self::RightKnee => "right_knee",
            Self::LeftAnkle => "left_ankle",
            Self::RightAnkle => "right_ankle",
        }
    }
}

impl std::str::FromStr for KeypointKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        (0..NUM_KEYPOINTS)
            .filter_map(Self::from_usize)
            .find(|kind| kind.name() == s)
            .ok_or_else(|| Error::UnknownKeypoint(s.to_owned()))
    }
}

pub mod constants {
    use crate::pose::KeypointKind::{self, *};

    /// Keypoints every downstream computation depends on.
    pub const REQUIRED_KEYPOINTS: [KeypointKind; 12] = [
        LeftShoulder,
        LeftElbow,
        LeftWrist,
        LeftHip,
        LeftKnee,
        LeftAnkle,
        RightShoulder,
        RightElbow,
        RightWrist,
        RightHip,
        RightKnee,
        RightAnkle,
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    pub name: String,
    pub x: f32,
    pub y: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

impl Keypoint {
    pub fn new(name: impl Into<String>, x: f32, y: f32, score: f32) -> Self {
        Self {
            name: name.into(),
            x,
            y,
            score: Some(score),
        }
    }

    /// Detection confidence, with an absent score counting as zero.
    #[inline]
    pub fn confidence(&self) -> f32 {
        self.score.unwrap_or(0.0)
    }
}

/// One skeleton snapshot. Keypoint names are unique within a pose.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPose")]
pub struct Pose {
    keypoints: Vec<Keypoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    score: Option<f32>,
}

#[derive(Deserialize)]
struct RawPose {
    keypoints: Vec<Keypoint>,
    #[serde(default)]
    score: Option<f32>,
}

impl TryFrom<RawPose> for Pose {
    type Error = Error;

    fn try_from(RawPose { keypoints, score }: RawPose) -> Result<Self, Self::Error> {
        let mut pose = Self::new(keypoints)?;
        pose.score = score;
        Ok(pose)
    }
}

impl Pose {
    pub fn new(keypoints: Vec<Keypoint>) -> Result<Self, Error> {
        let mut seen = HashSet::with_capacity(keypoints.len());
        if let Some(duplicate) = keypoints.iter().find(|kp| !seen.insert(kp.name.as_str())) {
            return Err(Error::DuplicateKeypoint(duplicate.name.clone()));
        }
        Ok(Self {
            keypoints,
            score: None,
        })
    }

    pub fn keypoints(&self) -> &[Keypoint] {
        &self.keypoints
    }

    pub fn score(&self) -> Option<f32> {
        self.score
    }

    pub fn get(&self, name: &str) -> Option<&Keypoint> {
        self.keypoints.iter().find(|kp| kp.name == name)
    }

    /// Apply `f` to every keypoint position, keeping names and scores.
    pub(crate) fn map_points<F>(&self, mut f: F) -> Self
    where
        F: FnMut(f32, f32) -> (f32, f32),
    {
        Self {
            keypoints: self
                .keypoints
                .iter()
                .map(|kp| {
                    let (x, y) = f(kp.x, kp.y);
                    Keypoint { x, y, ..kp.clone() }
                })
                .collect(),
            score: self.score,
        }
    }

    /// Look up every name in `names`, in order.
    ///
    /// Fails closed: if any keypoint is absent or scores below `confidence`, no partial
    /// result is returned and the error lists every offending name.
    pub fn resolve<'a, S>(&'a self, names: &[S], confidence: f32) -> Result<Vec<&'a Keypoint>, Error>
    where
        S: AsRef<str>,
    {
        let mut found = Vec::with_capacity(names.len());
        let mut missing = Vec::new();

        for name in names {
            let name = name.as_ref();
            match self.get(name) {
                Some(kp) if kp.confidence() >= confidence => found.push(kp),
                _ => missing.push(name.to_owned()),
            }
        }

        if missing.is_empty() {
            Ok(found)
        } else {
            Err(Error::InsufficientVisibility { missing })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{constants::REQUIRED_KEYPOINTS, Keypoint, KeypointKind, Pose, DEFAULT_CONFIDENCE};
    use crate::{error::Error, fixtures};

    mod keypoint_kind_tests {
        use super::*;

        #[test]
        fn names_round_trip_through_from_str() {
            for &kind in REQUIRED_KEYPOINTS.iter() {
                assert_eq!(kind.name().parse::<KeypointKind>().unwrap(), kind);
            }
        }

        #[test]
        fn unknown_name() {
            assert!(matches!(
                "left_toe".parse::<KeypointKind>(),
                Err(Error::UnknownKeypoint(name)) if name == "left_toe"
            ));
        }

        #[test]
        fn idx_matches_declaration_order() {
            assert_eq!(KeypointKind::Nose.idx().unwrap(), 0);
            assert_eq!(KeypointKind::RightAnkle.idx().unwrap(), 16);
            assert_eq!(KeypointKind::from_idx(5).unwrap(), KeypointKind::LeftShoulder);
        }
    }

    mod pose_tests {
        use super::*;

        #[test]
        fn duplicate_names_are_rejected() {
            let result = Pose::new(vec![
                Keypoint::new("left_knee", 0.0, 0.0, 0.9),
                Keypoint::new("left_knee", 1.0, 1.0, 0.9),
            ]);
            assert!(matches!(result, Err(Error::DuplicateKeypoint(name)) if name == "left_knee"));
        }

        #[test]
        fn duplicate_names_are_rejected_when_deserializing() {
            let json = r#"{"keypoints":[
                {"name":"nose","x":0,"y":0,"score":0.9},
                {"name":"nose","x":1,"y":1}
            ]}"#;
            assert!(serde_json::from_str::<Pose>(json).is_err());
        }

        #[test]
        fn missing_score_counts_as_zero() {
            let pose: Pose =
                serde_json::from_str(r#"{"keypoints":[{"name":"nose","x":3,"y":4}]}"#).unwrap();
            assert_eq!(pose.get("nose").unwrap().confidence(), 0.0);
            assert!(pose.resolve(&["nose"], 0.0).is_ok());
            assert!(pose.resolve(&["nose"], DEFAULT_CONFIDENCE).is_err());
        }
    }

    mod resolve_tests {
        use super::*;

        fn names() -> Vec<&'static str> {
            REQUIRED_KEYPOINTS.iter().map(|kind| kind.name()).collect()
        }

        #[test]
        fn resolves_in_requested_order() {
            let pose = fixtures::standing_pose();
            let found = pose.resolve(&names(), DEFAULT_CONFIDENCE).unwrap();
            let found_names = found.iter().map(|kp| kp.name.as_str()).collect::<Vec<_>>();
            assert_eq!(found_names, names());
        }

        #[test]
        fn score_just_under_threshold_fails() {
            let pose = fixtures::with_score(&fixtures::standing_pose(), "right_wrist", 0.29);
            match pose.resolve(&names(), DEFAULT_CONFIDENCE) {
                Err(Error::InsufficientVisibility { missing }) => {
                    assert_eq!(missing, vec!["right_wrist".to_owned()])
                }
                other => panic!("expected insufficient visibility, got {:?}", other),
            }
        }

        #[test]
        fn score_at_threshold_passes() {
            let pose = fixtures::with_score(&fixtures::standing_pose(), "right_wrist", 0.30);
            assert!(pose.resolve(&names(), DEFAULT_CONFIDENCE).is_ok());
        }

        #[test]
        fn absent_keypoint_fails() {
            let pose = fixtures::without(&fixtures::standing_pose(), "left_ankle");
            assert!(matches!(
                pose.resolve(&names(), DEFAULT_CONFIDENCE),
                Err(Error::InsufficientVisibility { missing }) if missing == vec!["left_ankle".to_owned()]
            ));
        }

        #[test]
        fn confidence_is_caller_overridable() {
            let pose = fixtures::with_score(&fixtures::standing_pose(), "left_hip", 0.5);
            assert!(pose.resolve(&names(), 0.6).is_err());
            assert!(pose.resolve(&names(), 0.5).is_ok());
        }
    }
}
