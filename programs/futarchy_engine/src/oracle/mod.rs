//! # Price Oracle
//!
//! Every pool in the engine, spot and conditional alike, carries one
//! [`TwapOracle`]. Conditional oracles decide the winning outcome; the spot
//! oracle seeds new conditional markets and is stitched back together from
//! the winner's history after each proposal.

pub mod twap;

pub use twap::*;
