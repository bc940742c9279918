use crate::{error::Error, pose::Keypoint};
use ordered_float::NotNan;
use std::ops::Sub;

/// Squared length below which a ray or segment is treated as having no direction.
pub(crate) const MIN_SQUARED_LENGTH: f32 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Point {
    x: f32,
    y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Result<Self, Error> {
        Ok(Self {
            x: NotNan::new(x)
                .map_err(|e| Error::ConstructNotNan(e, x))?
                .into_inner(),
            y: NotNan::new(y)
                .map_err(|e| Error::ConstructNotNan(e, y))?
                .into_inner(),
        })
    }

    pub fn squared_distance(self, other: Self) -> f32 {
        let delta = other - self;
        delta.dot(delta)
    }

    pub fn distance(self, other: Self) -> f32 {
        self.squared_distance(other).sqrt()
    }

    #[inline]
    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y
    }

    #[inline]
    pub fn cross(self, other: Self) -> f32 {
        self.x * other.y - self.y * other.x
    }

    /// Polar angle in radians.
    #[inline]
    pub fn heading(self) -> f32 {
        self.y.atan2(self.x)
    }

    /// The vector from `self` to `other`, or `DegenerateGeometry` if the two coincide.
    pub(crate) fn ray_to(self, other: Self) -> Result<Self, Error> {
        let ray = other - self;
        if ray.dot(ray) < MIN_SQUARED_LENGTH {
            Err(Error::DegenerateGeometry)
        } else {
            Ok(ray)
        }
    }
}

impl std::convert::TryFrom<&Keypoint> for Point {
    type Error = Error;

    fn try_from(kp: &Keypoint) -> Result<Self, Self::Error> {
        Self::new(kp.x, kp.y)
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::Output {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}
