pub mod conditional_swap;
pub mod crank_market;
pub mod positions;

pub use conditional_swap::*;
pub use crank_market::*;
pub use positions::*;
