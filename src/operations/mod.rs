pub mod budget;
pub mod fit;
pub mod query;
pub mod resample;
