//! # Automated Market Maker (AMM) Module
//!
//! Both the DAO's spot pool and every conditional market price the asset
//! against the stable coin with the same constant-product curve:
//!
//! ```text
//!            k = asset × stable
//!
//!   stable ▲
//!          │╲
//!          │ ╲
//!          │  ╲__        k = constant
//!          │     ╲___
//!          │         ╲______
//!          └─────────────────▶ asset
//!
//!   price = stable / asset   (scaled by PRICE_SCALE)
//! ```
//!
//! Fees are charged on the input side and stay in the pool, so `k` only
//! ever grows.

pub mod constant_product;

pub use constant_product::*;
