//! Instruction handlers for the futarchy engine
//!
//! Grouped by the part of the system they drive:
//! - `dao` - DAO setup, parameters, quotas and treasury funding
//! - `liquidity` - spot pool liquidity and spot swaps
//! - `queue` - proposal submission, eviction, premarket and activation
//! - `proposal` - review, trading start, finalization and payouts
//! - `trading` - conditional positions and swaps
//! - `execution` - handing the winning action to the dispatcher

pub mod dao;
pub mod execution;
pub mod liquidity;
pub mod proposal;
pub mod queue;
pub mod shared;
pub mod trading;

pub use dao::*;
pub use execution::*;
pub use liquidity::*;
pub use proposal::*;
pub use queue::*;
pub use trading::*;
