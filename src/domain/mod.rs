mod budget;
mod evaluator;
mod expense;
mod money;
mod summary;
mod validation;

pub use budget::*;
pub use evaluator::*;
pub use expense::*;
pub use money::*;
pub use summary::*;
pub use validation::*;
