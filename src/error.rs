use crate::pose::KeypointKind;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("required keypoints missing or below confidence threshold: {missing:?}")]
    InsufficientVisibility { missing: Vec<String> },

    #[error("zero-length ray or segment: keypoints coincide")]
    DegenerateGeometry,

    #[error("failed to construct NotNan from f32: {1}")]
    ConstructNotNan(#[source] ordered_float::FloatIsNan, f32),

    #[error("unknown similarity strategy: {0}")]
    UnknownStrategy(String),

    #[error("unknown joint angle: {0}")]
    UnknownAngle(String),

    #[error("unknown keypoint name: {0}")]
    UnknownKeypoint(String),

    #[error("strategy weight must be a finite non-negative number, got {0}")]
    InvalidWeight(f32),

    #[error("failed to parse strategy weight: {1:?}")]
    ParseWeight(#[source] std::num::ParseFloatError, String),

    #[error("threshold must lie in [0, 1], got {0}")]
    InvalidThreshold(f32),

    #[error("pose contains more than one keypoint named {0}")]
    DuplicateKeypoint(String),

    #[error("cannot normalize a pose with no confident keypoints")]
    EmptyPose,

    #[error("failed to construct coordinate array")]
    ConstructArray(#[source] ndarray::ShapeError),

    #[error("failed to convert keypoint variant to usize: {0:?}")]
    KeypointVariantToUSize(KeypointKind),

    #[error("failed to convert usize value to keypoint kind: {0}")]
    ConvertUSizeToKeypointKind(usize),

    #[error("failed to convert value to f32")]
    ConvertToF32,

    #[error("failed to convert value to u64")]
    ConvertToU64,
}

impl Error {
    /// Whether the error means this tick's pose cannot be trusted, as opposed to a caller bug.
    pub fn is_unusable_pose(&self) -> bool {
        matches!(
            self,
            Self::InsufficientVisibility { .. }
                | Self::DegenerateGeometry
                | Self::EmptyPose
                | Self::ConstructNotNan(..)
        )
    }
}
