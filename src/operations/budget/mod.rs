mod config;
mod result;
mod search;

pub use config::{BudgetConfig, SearchPolicy, MAX_CHAIKIN_ITERATIONS};
pub use result::{BudgetResult, Evaluation, Metrics};
pub use search::{BudgetSearch, Reconstruction};

pub use crate::operations::fit::FitMode;
