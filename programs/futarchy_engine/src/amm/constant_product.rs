//! # Constant-Product Pool
//!
//! ## Swap Formula
//!
//! For an input `dx` on one side of the pool and a fee of `f` basis points:
//!
//! ```text
//! dx' = dx × (10_000 − f)
//! dy  = (dx' × y) / (x × 10_000 + dx')
//! ```
//!
//! The full `dx` is added to the input reserve and `dy` leaves the output
//! reserve. Because the fee portion is never paid out, `x × y` after the swap
//! is at least `x × y` before it. That is asserted on every swap.
//!
//! ## Prices
//!
//! A price is the number of stable units per asset unit multiplied by
//! [`PRICE_SCALE`]. UI prices must still adjust for mint decimals.

use anchor_lang::prelude::*;

use crate::{MAX_BPS, PRICE_SCALE};

/// Errors specific to pool math
#[error_code(offset = 6500)]
pub enum AmmError {
    #[msg("Swap input must be greater than zero")]
    ZeroInput,
    #[msg("Pool has no liquidity on one side")]
    EmptyReserves,
    #[msg("Arithmetic overflow")]
    Overflow,
    #[msg("Swap would return nothing")]
    NoOutput,
    #[msg("Slippage tolerance exceeded")]
    SlippageExceeded,
    #[msg("Constant-product invariant decreased")]
    InvariantViolated,
    #[msg("Not enough reserves to withdraw")]
    InsufficientReserves,
    #[msg("Fee must be below 100%")]
    InvalidFee,
}

/// Which side of the pool the trader pays into
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub enum SwapDirection {
    /// Pay stable, receive asset
    Buy,
    /// Pay asset, receive stable
    Sell,
}

/// Asset / stable reserve pair of a pool
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, InitSpace, Debug, Default)]
pub struct Reserves {
    pub asset: u64,
    pub stable: u64,
}

impl Reserves {
    pub fn new(asset: u64, stable: u64) -> Self {
        Self { asset, stable }
    }

    /// True when either side is empty and the pool cannot quote a price
    pub fn is_empty(&self) -> bool {
        self.asset == 0 || self.stable == 0
    }

    pub fn is_zero(&self) -> bool {
        self.asset == 0 && self.stable == 0
    }

    pub fn k(&self) -> u128 {
        (self.asset as u128) * (self.stable as u128)
    }

    /// Spot price of the pool, stable per asset scaled by `PRICE_SCALE`
    pub fn price(&self) -> Result<u128> {
        require!(!self.is_empty(), AmmError::EmptyReserves);

        let price = (self.stable as u128)
            .checked_mul(PRICE_SCALE)
            .ok_or(AmmError::Overflow)?
            / self.asset as u128;

        Ok(price)
    }

    /// Output amount for a swap without touching the reserves
    pub fn quote(&self, amount_in: u64, direction: SwapDirection, fee_bps: u16) -> Result<u64> {
        require!(amount_in > 0, AmmError::ZeroInput);
        require!(fee_bps < MAX_BPS, AmmError::InvalidFee);
        require!(!self.is_empty(), AmmError::EmptyReserves);

        let (input_reserve, output_reserve) = match direction {
            SwapDirection::Buy => (self.stable, self.asset),
            SwapDirection::Sell => (self.asset, self.stable),
        };

        let input_with_fee = (amount_in as u128)
            .checked_mul((MAX_BPS - fee_bps) as u128)
            .ok_or(AmmError::Overflow)?;

        let numerator = input_with_fee
            .checked_mul(output_reserve as u128)
            .ok_or(AmmError::Overflow)?;

        let denominator = (input_reserve as u128)
            .checked_mul(MAX_BPS as u128)
            .and_then(|scaled| scaled.checked_add(input_with_fee))
            .ok_or(AmmError::Overflow)?;

        let output = u64::try_from(numerator / denominator).map_err(|_| AmmError::Overflow)?;
        require!(output > 0, AmmError::NoOutput);

        Ok(output)
    }

    /// Execute a swap against the reserves and return the output amount
    pub fn swap(&mut self, amount_in: u64, direction: SwapDirection, fee_bps: u16) -> Result<u64> {
        let k_before = self.k();
        let output = self.quote(amount_in, direction, fee_bps)?;

        match direction {
            SwapDirection::Buy => {
                self.stable = self.stable.checked_add(amount_in).ok_or(AmmError::Overflow)?;
                self.asset = self.asset.checked_sub(output).ok_or(AmmError::Overflow)?;
            }
            SwapDirection::Sell => {
                self.asset = self.asset.checked_add(amount_in).ok_or(AmmError::Overflow)?;
                self.stable = self.stable.checked_sub(output).ok_or(AmmError::Overflow)?;
            }
        }

        require!(self.k() >= k_before, AmmError::InvariantViolated);

        Ok(output)
    }

    pub fn add(&mut self, other: Reserves) -> Result<()> {
        self.asset = self.asset.checked_add(other.asset).ok_or(AmmError::Overflow)?;
        self.stable = self.stable.checked_add(other.stable).ok_or(AmmError::Overflow)?;
        Ok(())
    }

    pub fn remove(&mut self, other: Reserves) -> Result<()> {
        require!(
            self.asset >= other.asset && self.stable >= other.stable,
            AmmError::InsufficientReserves
        );
        self.asset -= other.asset;
        self.stable -= other.stable;
        Ok(())
    }

    /// The share of both sides given by `bps` out of 10,000
    pub fn fraction(&self, bps: u16) -> Reserves {
        let share = |amount: u64| ((amount as u128 * bps.min(MAX_BPS) as u128) / MAX_BPS as u128) as u64;
        Reserves {
            asset: share(self.asset),
            stable: share(self.stable),
        }
    }

    /// Empty the pair, returning what it held
    pub fn take(&mut self) -> Reserves {
        std::mem::take(self)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use anchor_lang::error::Error;

    #[test]
    fn test_price_is_stable_per_asset() {
        let pool = Reserves::new(1_000, 100_000);
        assert_eq!(pool.price().unwrap(), 100 * PRICE_SCALE);
    }

    #[test]
    fn test_buy_raises_price_and_keeps_k() {
        let mut pool = Reserves::new(1_000_000, 100_000_000);
        let price_before = pool.price().unwrap();
        let k_before = pool.k();

        let out = pool.swap(1_000_000, SwapDirection::Buy, 30).unwrap();

        assert!(out > 0);
        assert!(pool.price().unwrap() > price_before);
        assert!(pool.k() >= k_before);
        assert_eq!(pool.stable, 101_000_000);
    }

    #[test]
    fn test_sell_lowers_price() {
        let mut pool = Reserves::new(1_000_000, 100_000_000);
        let price_before = pool.price().unwrap();

        pool.swap(10_000, SwapDirection::Sell, 30).unwrap();

        assert!(pool.price().unwrap() < price_before);
    }

    #[test]
    fn test_fee_reduces_output() {
        let pool = Reserves::new(1_000_000, 1_000_000);
        let no_fee = pool.quote(10_000, SwapDirection::Buy, 0).unwrap();
        let with_fee = pool.quote(10_000, SwapDirection::Buy, 100).unwrap();
        // 10_000 * 1_000_000 / 1_010_000
        assert_eq!(no_fee, 9_900);
        assert!(with_fee < no_fee);
    }

    #[test]
    fn test_rejects_zero_and_empty() {
        let pool = Reserves::new(1_000, 1_000);
        assert_eq!(
            pool.quote(0, SwapDirection::Buy, 0).unwrap_err(),
            Error::from(AmmError::ZeroInput)
        );

        let empty = Reserves::new(0, 1_000);
        assert_eq!(
            empty.quote(10, SwapDirection::Sell, 0).unwrap_err(),
            Error::from(AmmError::EmptyReserves)
        );
    }

    #[test]
    fn test_dust_swap_returns_nothing() {
        let pool = Reserves::new(10, 1_000_000_000);
        assert_eq!(
            pool.quote(1, SwapDirection::Buy, 0).unwrap_err(),
            Error::from(AmmError::NoOutput)
        );
    }

    #[test]
    fn test_fraction_and_remove() {
        let mut pool = Reserves::new(1_000, 5_000);
        let half = pool.fraction(5_000);
        assert_eq!(half, Reserves::new(500, 2_500));

        pool.remove(half).unwrap();
        assert_eq!(pool, Reserves::new(500, 2_500));
        assert!(pool.remove(Reserves::new(501, 0)).is_err());
    }
}
