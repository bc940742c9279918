use crate::{error::Error, geometry::point::MIN_SQUARED_LENGTH, geometry::Point};

/// Unsigned interior angle at vertex `b` between the rays `b→a` and `b→c`, in degrees.
///
/// Computed from the difference of the two rays' polar angles and folded into
/// `[0, 180]`. Coincident points leave a ray without direction and yield
/// `DegenerateGeometry`.
pub fn angle(a: Point, b: Point, c: Point) -> Result<f32, Error> {
    let to_a = b.ray_to(a)?;
    let to_c = b.ray_to(c)?;
    let degrees = (to_c.heading() - to_a.heading()).to_degrees().abs();
    let folded = if degrees > 180.0 {
        360.0 - degrees
    } else {
        degrees
    };
    Ok(folded.clamp(0.0, 180.0))
}

/// Unsigned angle between two direction vectors, in degrees.
pub fn angle_between(u: Point, v: Point) -> Result<f32, Error> {
    if u.dot(u) < MIN_SQUARED_LENGTH || v.dot(v) < MIN_SQUARED_LENGTH {
        return Err(Error::DegenerateGeometry);
    }
    Ok(u.cross(v).abs().atan2(u.dot(v)).to_degrees().clamp(0.0, 180.0))
}
