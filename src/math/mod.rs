pub mod distance_2d;
pub mod polygon_2d;

/// 2D point type (millimeters).
pub type Point2 = nalgebra::Point2<f64>;

/// 2D vector type.
pub type Vector2 = nalgebra::Vector2<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Guard added to products of edge lengths before dividing by them.
pub const LENGTH_EPSILON: f64 = 1e-8;

/// Floor for squared segment lengths and cumulative-weight intervals.
pub const WEIGHT_FLOOR: f64 = 1e-12;
