//! Spot Market State
//!
//! The DAO's baseline pool. Outside of proposals anyone can trade against
//! it. When a proposal that shares liquidity starts trading, part of its
//! reserves is split into the proposal's conditional markets and the pool is
//! locked to that proposal until the winner's reserves are recombined.

use anchor_lang::prelude::*;

use crate::amm::{Reserves, SwapDirection};
use crate::error::FutarchyError;
use crate::oracle::TwapOracle;

/// Record of an unreconciled split
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, InitSpace, Debug)]
pub struct SplitMarker {
    pub proposal: Pubkey,
    pub split_at: i64,
    /// Reserves taken out of the pool; each market was seeded with all of it
    pub withdrawn: Reserves,
    pub outcome_count: u8,
}

/// Seeds: ["spot_pool", dao]
#[account]
#[derive(InitSpace)]
pub struct SpotPool {
    pub dao: Pubkey,

    pub reserves: Reserves,

    pub fee_bps: u16,

    pub oracle: TwapOracle,

    /// Proposal currently holding part of the reserves
    pub locked_to: Option<Pubkey>,

    /// Share of reserves moved out by the current split
    pub locked_fraction_bps: u16,

    /// Must be cleared before another split may begin
    pub pending_split: Option<SplitMarker>,

    /// PDA bump seed
    pub bump: u8,
}

impl SpotPool {
    pub const SEED: &'static [u8] = b"spot_pool";

    pub fn is_locked(&self) -> bool {
        self.locked_to.is_some()
    }

    pub fn ensure_unlocked(&self) -> Result<()> {
        require!(!self.is_locked(), FutarchyError::SpotLiquidityLocked);
        Ok(())
    }

    pub fn swap(&mut self, now: i64, amount_in: u64, direction: SwapDirection) -> Result<u64> {
        self.ensure_unlocked()?;

        self.oracle.accumulate(now)?;
        let output = self.reserves.swap(amount_in, direction, self.fee_bps)?;
        self.oracle.record(now, self.reserves.price()?)?;

        Ok(output)
    }

    pub fn deposit(&mut self, now: i64, amount: Reserves) -> Result<()> {
        self.ensure_unlocked()?;

        self.reserves.add(amount)?;
        self.observe(now)
    }

    pub fn withdraw(&mut self, now: i64, amount: Reserves) -> Result<()> {
        self.ensure_unlocked()?;

        self.reserves.remove(amount)?;
        self.observe(now)
    }

    pub fn twap(&mut self, now: i64, window: i64) -> Result<u128> {
        self.oracle.twap(now, window)
    }

    fn observe(&mut self, now: i64) -> Result<()> {
        if self.reserves.is_empty() {
            return self.oracle.accumulate(now);
        }
        self.oracle.record(now, self.reserves.price()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::spot_pool;

    #[test]
    fn test_swap_records_observation() {
        let mut spot = spot_pool(0);
        let before = spot.oracle.checkpoints.len();

        spot.swap(100, 1_000_000, SwapDirection::Buy).unwrap();

        assert!(spot.oracle.observed);
        assert_eq!(spot.oracle.last_updated, 100);
        assert!(spot.oracle.checkpoints.len() > before);
    }

    #[test]
    fn test_locked_pool_rejects_everything() {
        let mut spot = spot_pool(0);
        spot.locked_to = Some(Pubkey::new_unique());

        assert!(spot.swap(10, 1_000, SwapDirection::Sell).is_err());
        assert!(spot.deposit(10, Reserves::new(1, 1)).is_err());
        assert!(spot.withdraw(10, Reserves::new(1, 1)).is_err());
    }

    #[test]
    fn test_withdraw_everything_keeps_oracle_running() {
        let mut spot = spot_pool(0);
        let all = spot.reserves;

        spot.withdraw(50, all).unwrap();

        assert!(spot.reserves.is_empty());
        assert_eq!(spot.oracle.last_updated, 50);
    }
}
