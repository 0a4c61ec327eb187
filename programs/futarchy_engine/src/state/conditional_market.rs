//! Conditional Market State
//!
//! One pool per proposal outcome. Its reserves are conditional claims: they
//! are only worth anything if this outcome wins. Each market prices the
//! asset under the assumption that its outcome is executed, and its own
//! TWAP oracle is what the proposal is decided on.

use anchor_lang::prelude::*;

use crate::amm::{Reserves, SwapDirection};
use crate::error::FutarchyError;
use crate::oracle::{TwapConfig, TwapOracle};

/// Seeds: ["conditional_market", proposal, [outcome_index]]
#[account]
#[derive(InitSpace)]
pub struct ConditionalMarket {
    pub dao: Pubkey,

    pub proposal: Pubkey,

    pub outcome_index: u8,

    pub status: MarketStatus,

    pub reserves: Reserves,

    pub fee_bps: u16,

    pub oracle: TwapOracle,

    /// PDA bump seed
    pub bump: u8,
}

/// Market lifecycle status
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, InitSpace, Debug, Default)]
pub enum MarketStatus {
    /// Created during review, no liquidity yet
    #[default]
    Pending,
    /// Seeded and open for swaps
    Trading,
    /// Reserves were returned to the liquidity source
    Winner,
    /// Reserves were destroyed; positions here redeem for nothing
    Discarded,
}

impl ConditionalMarket {
    pub const SEED: &'static [u8] = b"conditional_market";

    /// Attach liquidity and start the oracle at `seed_price`
    pub fn seed(
        &mut self,
        now: i64,
        reserves: Reserves,
        seed_price: u128,
        oracle: TwapConfig,
    ) -> Result<()> {
        require!(self.status == MarketStatus::Pending, FutarchyError::InvalidState);
        require!(!reserves.is_empty(), FutarchyError::InsufficientLiquidity);

        self.reserves = reserves;
        self.oracle = TwapOracle::new(now, seed_price, oracle);
        self.status = MarketStatus::Trading;

        Ok(())
    }

    /// Swap against the pool, returning `(output, observation)`
    pub fn swap(
        &mut self,
        now: i64,
        amount_in: u64,
        direction: SwapDirection,
    ) -> Result<(u64, u128)> {
        require!(self.status == MarketStatus::Trading, FutarchyError::MarketNotTrading);

        self.oracle.accumulate(now)?;
        let output = self.reserves.swap(amount_in, direction, self.fee_bps)?;
        let observation = self.oracle.record(now, self.reserves.price()?)?;

        Ok((output, observation))
    }

    /// Feed the current pool price to the oracle without trading
    pub fn crank(&mut self, now: i64) -> Result<u128> {
        require!(self.status == MarketStatus::Trading, FutarchyError::MarketNotTrading);
        self.oracle.record(now, self.reserves.price()?)
    }

    /// TWAP over everything since the market started integrating
    pub fn twap(&mut self, now: i64) -> Result<u128> {
        self.oracle.average_since_start(now)
    }

    /// Hand the reserves back to the liquidity source
    pub fn settle_winner(&mut self) -> Result<Reserves> {
        require!(self.status == MarketStatus::Trading, FutarchyError::MarketNotTrading);
        self.status = MarketStatus::Winner;
        Ok(self.reserves.take())
    }

    /// Destroy the reserves of a losing outcome
    pub fn discard(&mut self) -> Result<()> {
        require!(self.status == MarketStatus::Trading, FutarchyError::MarketNotTrading);
        self.status = MarketStatus::Discarded;
        self.reserves = Reserves::default();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::pending_market;
    use crate::PRICE_SCALE;

    fn oracle(max_change_bps: u16) -> TwapConfig {
        TwapConfig {
            max_change_bps,
            min_update_interval_secs: 60,
            start_delay_secs: 0,
        }
    }

    #[test]
    fn test_seed_once() {
        let mut market = pending_market(0);
        market
            .seed(100, Reserves::new(1_000, 100_000), 100 * PRICE_SCALE, oracle(1_000))
            .unwrap();

        assert_eq!(market.status, MarketStatus::Trading);
        assert_eq!(market.oracle.started_at, 100);
        assert!(market
            .seed(100, Reserves::new(1_000, 100_000), 100 * PRICE_SCALE, oracle(1_000))
            .is_err());
    }

    #[test]
    fn test_pending_market_cannot_trade() {
        let mut market = pending_market(1);
        assert!(market.swap(10, 100, SwapDirection::Buy).is_err());
        assert!(market.crank(10).is_err());
    }

    #[test]
    fn test_swap_feeds_clamped_observation() {
        let mut market = pending_market(1);
        market
            .seed(0, Reserves::new(1_000_000, 100_000_000), 100 * PRICE_SCALE, oracle(100))
            .unwrap();

        // a huge buy moves the pool far more than 1%
        let (_, observation) = market.swap(60, 100_000_000, SwapDirection::Buy).unwrap();

        assert_eq!(observation, 101 * PRICE_SCALE);
        assert!(market.reserves.price().unwrap() > observation);
    }

    #[test]
    fn test_repeated_cranks_cannot_compound_the_clamp() {
        let mut market = pending_market(1);
        market
            .seed(0, Reserves::new(1_000_000, 100_000_000), 100 * PRICE_SCALE, oracle(100))
            .unwrap();
        market.swap(60, 100_000_000, SwapDirection::Buy).unwrap();

        for _ in 0..100 {
            assert_eq!(market.crank(60).unwrap(), 101 * PRICE_SCALE);
        }
        assert_eq!(market.oracle.last_price, 101 * PRICE_SCALE);

        // a further 1% once the interval has passed
        let next = market.crank(120).unwrap();
        assert_eq!(next, 101 * PRICE_SCALE + 101 * PRICE_SCALE / 100);
        assert!(next <= 10_201 * PRICE_SCALE / 100);
    }

    #[test]
    fn test_discard_zeroes_reserves() {
        let mut market = pending_market(0);
        market
            .seed(0, Reserves::new(1_000, 100_000), 100 * PRICE_SCALE, oracle(1_000))
            .unwrap();

        market.discard().unwrap();

        assert_eq!(market.status, MarketStatus::Discarded);
        assert!(market.reserves.is_empty());
        assert!(market.settle_winner().is_err());
    }
}
