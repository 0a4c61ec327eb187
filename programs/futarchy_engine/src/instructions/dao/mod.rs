pub mod fund_treasury;
pub mod grant_quota;
pub mod initialize_dao;
pub mod update_dao;

pub use fund_treasury::*;
pub use grant_quota::*;
pub use initialize_dao::*;
pub use update_dao::*;
