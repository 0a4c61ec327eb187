//! Account state for the futarchy engine

pub mod admission_queue;
pub mod conditional_market;
pub mod dao;
pub mod position;
pub mod proposal;
pub mod spot_pool;

pub use admission_queue::*;
pub use conditional_market::*;
pub use dao::*;
pub use position::*;
pub use proposal::*;
pub use spot_pool::*;
