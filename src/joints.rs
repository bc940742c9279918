use crate::{
    error::Error,
    geometry::{self, Point},
    pose::{
        constants::REQUIRED_KEYPOINTS,
        KeypointKind::{self, *},
        Pose, NUM_KEYPOINTS,
    },
};
use num_traits::FromPrimitive;
use std::convert::TryFrom;

/// Positions of the required keypoints of one pose, all of which passed the confidence gate.
#[derive(Debug, Clone, Copy)]
pub struct Joints {
    points: [Option<Point>; NUM_KEYPOINTS],
}

impl Joints {
    pub fn resolve(pose: &Pose, confidence: f32) -> Result<Self, Error> {
        let names = REQUIRED_KEYPOINTS
            .iter()
            .map(|kind| kind.name())
            .collect::<Vec<_>>();
        let found = pose.resolve(&names, confidence)?;

        let mut points = [None; NUM_KEYPOINTS];
        for (kind, kp) in REQUIRED_KEYPOINTS.iter().zip(found) {
            points[kind.idx()?] = Some(Point::try_from(kp)?);
        }
        Ok(Self { points })
    }

    pub fn get(&self, kind: KeypointKind) -> Result<Point, Error> {
        self.points[kind.idx()?].ok_or_else(|| Error::InsufficientVisibility {
            missing: vec![kind.name().to_owned()],
        })
    }

    /// The vector from `from` to `to`.
    pub fn segment(&self, (from, to): (KeypointKind, KeypointKind)) -> Result<Point, Error> {
        self.get(from)?.ray_to(self.get(to)?)
    }

    pub fn length(&self, (from, to): (KeypointKind, KeypointKind)) -> Result<f32, Error> {
        Ok(self.get(from)?.distance(self.get(to)?))
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Joint {
    Elbow,
    Shoulder,
    Hip,
    Knee,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, num_derive::FromPrimitive)]
pub enum JointAngle {
    LeftElbow,
    LeftShoulder,
    LeftHip,
    LeftKnee,
    RightElbow,
    RightShoulder,
    RightHip,
    RightKnee,
}

pub const NUM_JOINT_ANGLES: usize = 8;

impl JointAngle {
    pub const ALL: [JointAngle; NUM_JOINT_ANGLES] = [
        Self::LeftElbow,
        Self::LeftShoulder,
        Self::LeftHip,
        Self::LeftKnee,
        Self::RightElbow,
        Self::RightShoulder,
        Self::RightHip,
        Self::RightKnee,
    ];

    pub fn new(side: Side, joint: Joint) -> Self {
        match (side, joint) {
            (Side::Left, Joint::Elbow) => Self::LeftElbow,
            (Side::Left, Joint::Shoulder) => Self::LeftShoulder,
            (Side::Left, Joint::Hip) => Self::LeftHip,
            (Side::Left, Joint::Knee) => Self::LeftKnee,
            (Side::Right, Joint::Elbow) => Self::RightElbow,
            (Side::Right, Joint::Shoulder) => Self::RightShoulder,
            (Side::Right, Joint::Hip) => Self::RightHip,
            (Side::Right, Joint::Knee) => Self::RightKnee,
        }
    }

    /// Position in [`JointAngle::ALL`] and in the storage of [`JointAngles`], which both
    /// follow declaration order.
    fn idx(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::LeftElbow => "leftElbowAngle",
            Self::LeftShoulder => "leftShoulderAngle",
            Self::LeftHip => "leftHipAngle",
            Self::LeftKnee => "leftKneeAngle",
            Self::RightElbow => "rightElbowAngle",
            Self::RightShoulder => "rightShoulderAngle",
            Self::RightHip => "rightHipAngle",
            Self::RightKnee => "rightKneeAngle",
        }
    }

    /// The three keypoints whose middle one is the vertex of this angle.
    pub fn vertices(self) -> (KeypointKind, KeypointKind, KeypointKind) {
        match self {
            Self::LeftElbow => (LeftShoulder, LeftElbow, LeftWrist),
            Self::LeftShoulder => (LeftElbow, LeftShoulder, LeftHip),
            Self::LeftHip => (LeftShoulder, LeftHip, LeftKnee),
            Self::LeftKnee => (LeftHip, LeftKnee, LeftAnkle),
            Self::RightElbow => (RightShoulder, RightElbow, RightWrist),
            Self::RightShoulder => (RightElbow, RightShoulder, RightHip),
            Self::RightHip => (RightShoulder, RightHip, RightKnee),
            Self::RightKnee => (RightHip, RightKnee, RightAnkle),
        }
    }

    pub fn measure(self, joints: &Joints) -> Result<f32, Error> {
        let (a, b, c) = self.vertices();
        geometry::angle(joints.get(a)?, joints.get(b)?, joints.get(c)?)
    }
}

impl std::str::FromStr for JointAngle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        (0..NUM_JOINT_ANGLES)
            .filter_map(Self::from_usize)
            .find(|angle| angle.name() == s)
            .ok_or_else(|| Error::UnknownAngle(s.to_owned()))
    }
}

impl std::fmt::Display for JointAngle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// All eight joint angles of one pose, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointAngles([f32; NUM_JOINT_ANGLES]);

impl JointAngles {
    pub fn measure(joints: &Joints) -> Result<Self, Error> {
        let mut degrees = [0.0; NUM_JOINT_ANGLES];
        for &angle in JointAngle::ALL.iter() {
            degrees[angle.idx()] = angle.measure(joints)?;
        }
        Ok(Self(degrees))
    }

    #[cfg(test)]
    pub(crate) fn from_degrees(degrees: [f32; NUM_JOINT_ANGLES]) -> Self {
        Self(degrees)
    }

    #[inline]
    pub fn get(&self, angle: JointAngle) -> f32 {
        self.0[angle.idx()]
    }

    #[inline]
    pub fn side(&self, side: Side, joint: Joint) -> f32 {
        self.get(JointAngle::new(side, joint))
    }

    /// Whether `predicate` holds for `joint` on both sides of the body.
    pub fn both<P>(&self, joint: Joint, predicate: P) -> bool
    where
        P: Fn(f32) -> bool,
    {
        predicate(self.side(Side::Left, joint)) && predicate(self.side(Side::Right, joint))
    }

    /// Whether `predicate` holds for `joint` on at least one side.
    pub fn either<P>(&self, joint: Joint, predicate: P) -> bool
    where
        P: Fn(f32) -> bool,
    {
        predicate(self.side(Side::Left, joint)) || predicate(self.side(Side::Right, joint))
    }

    pub fn iter(&self) -> impl Iterator<Item = (JointAngle, f32)> + '_ {
        JointAngle::ALL.iter().map(move |&angle| (angle, self.get(angle)))
    }
}
