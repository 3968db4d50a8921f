mod area;
mod curvature;
mod hausdorff;

pub use area::relative_area_error;
pub use curvature::Curvature;
pub use hausdorff::{directed_hausdorff, HausdorffDistance, DEFAULT_BATCH_SIZE};
