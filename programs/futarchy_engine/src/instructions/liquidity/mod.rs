pub mod manage_liquidity;
pub mod spot_swap;

pub use manage_liquidity::*;
pub use spot_swap::*;
