use crate::{
    error::Error,
    pose::{Pose, DEFAULT_CONFIDENCE},
};
use ndarray::{Array2, Axis};

/// Maps a raw pose into a position- and scale-invariant frame before comparison.
pub trait Normalize {
    fn normalize(&self, pose: &Pose) -> Result<Pose, Error>;
}

/// Moves the centroid of the confident keypoints to the origin and divides every
/// coordinate by their root-mean-square distance from it.
///
/// Keypoints below `min_score` still get transformed but do not influence the transform.
#[derive(Debug, Clone, Copy)]
pub struct CentroidScale {
    pub min_score: f32,
}

impl Default for CentroidScale {
    fn default() -> Self {
        Self {
            min_score: DEFAULT_CONFIDENCE,
        }
    }
}

const MIN_SPREAD: f32 = 1e-6;

impl Normalize for CentroidScale {
    fn normalize(&self, pose: &Pose) -> Result<Pose, Error> {
        let anchors = pose
            .keypoints()
            .iter()
            .filter(|kp| kp.confidence() >= self.min_score)
            .flat_map(|kp| vec![kp.x, kp.y])
            .collect::<Vec<_>>();
        let coords = Array2::from_shape_vec((anchors.len() / 2, 2), anchors)
            .map_err(Error::ConstructArray)?;

        let centroid = coords.mean_axis(Axis(0)).ok_or(Error::EmptyPose)?;
        let spread = (&coords - &centroid)
            .fold_axis(Axis(1), 0.0, |&total, &value| total + value.powi(2))
            .mean()
            .ok_or(Error::EmptyPose)?
            .sqrt();
        if !(spread > MIN_SPREAD) {
            return Err(Error::DegenerateGeometry);
        }

        let (cx, cy) = (centroid[0], centroid[1]);
        Ok(pose.map_points(|x, y| ((x - cx) / spread, (y - cy) / spread)))
    }
}

/// Leaves poses untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl Normalize for Identity {
    fn normalize(&self, pose: &Pose) -> Result<Pose, Error> {
        Ok(pose.clone())
    }
}
