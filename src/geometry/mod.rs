mod angle;
pub use angle::{angle, angle_between};

mod point;
pub use point::Point;
