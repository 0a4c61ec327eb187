pub mod activate_proposal;
pub mod evict_proposal;
pub mod reserve_premarket;
pub mod submit_proposal;

pub use activate_proposal::*;
pub use evict_proposal::*;
pub use reserve_premarket::*;
pub use submit_proposal::*;
