//! # Decision Engine
//!
//! Pure logic over account state. Nothing here reads the clock or touches
//! tokens; instructions pass in the current time and move tokens after the
//! engine has decided what happens.

pub mod early_resolution;
pub mod fees;
pub mod finalize;
pub mod outcome;
pub mod quantum;

pub use early_resolution::*;
pub use fees::*;
pub use finalize::*;
pub use outcome::*;
pub use quantum::*;
