pub mod contour;
pub mod polyline;
pub mod spline;

pub use contour::{Contour, ContourId};
pub use polyline::ClosedPolyline;
pub use spline::PeriodicSpline;
