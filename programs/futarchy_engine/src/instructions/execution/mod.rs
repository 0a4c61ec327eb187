pub mod abandon_execution;
pub mod execute_proposal;
pub mod expire_proposal;

pub use abandon_execution::*;
pub use execute_proposal::*;
pub use expire_proposal::*;
