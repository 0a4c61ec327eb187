pub mod add_outcome;
pub mod begin_trading;
pub mod claim_payout;
pub mod finalize_proposal;
pub mod initialize_conditional_market;
pub mod resolve_early;

pub use add_outcome::*;
pub use begin_trading::*;
pub use claim_payout::*;
pub use finalize_proposal::*;
pub use initialize_conditional_market::*;
pub use resolve_early::*;
