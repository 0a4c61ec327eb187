//! Conditional Position State
//!
//! A trader's conditional balances in one proposal. Splitting real
//! collateral credits the same amount in every outcome; merging burns one
//! unit of every outcome per real unit returned. After finalization only
//! the winning outcome's balances redeem for real tokens.

use anchor_lang::prelude::*;

use crate::amm::{Reserves, SwapDirection};
use crate::error::FutarchyError;

/// Seeds: ["position", proposal, owner]
#[account]
#[derive(InitSpace)]
pub struct ConditionalPosition {
    pub proposal: Pubkey,
    pub owner: Pubkey,

    /// Conditional asset balance per outcome
    #[max_len(5)]
    pub asset: Vec<u64>,

    /// Conditional stable balance per outcome
    #[max_len(5)]
    pub stable: Vec<u64>,

    /// PDA bump seed
    pub bump: u8,
}

impl ConditionalPosition {
    pub const SEED: &'static [u8] = b"position";

    /// Size the balance vectors on first use
    pub fn ensure_outcomes(&mut self, outcome_count: usize) {
        if self.asset.len() < outcome_count {
            self.asset.resize(outcome_count, 0);
            self.stable.resize(outcome_count, 0);
        }
    }

    pub fn split(&mut self, amount: Reserves) -> Result<()> {
        for (asset, stable) in self.asset.iter_mut().zip(self.stable.iter_mut()) {
            *asset = asset.checked_add(amount.asset).ok_or(FutarchyError::MathOverflow)?;
            *stable = stable.checked_add(amount.stable).ok_or(FutarchyError::MathOverflow)?;
        }
        Ok(())
    }

    pub fn merge(&mut self, amount: Reserves) -> Result<()> {
        require!(
            self.asset.iter().all(|b| *b >= amount.asset)
                && self.stable.iter().all(|b| *b >= amount.stable),
            FutarchyError::InsufficientBalance
        );

        for (asset, stable) in self.asset.iter_mut().zip(self.stable.iter_mut()) {
            *asset -= amount.asset;
            *stable -= amount.stable;
        }
        Ok(())
    }

    /// Take the input side of a swap out of one outcome's balances
    pub fn debit_swap_input(&mut self, outcome: u8, direction: SwapDirection, amount: u64) -> Result<()> {
        let balance = self.side_mut(outcome, direction, true)?;
        *balance = balance
            .checked_sub(amount)
            .ok_or(FutarchyError::InsufficientBalance)?;
        Ok(())
    }

    pub fn credit_swap_output(&mut self, outcome: u8, direction: SwapDirection, amount: u64) -> Result<()> {
        let balance = self.side_mut(outcome, direction, false)?;
        *balance = balance.checked_add(amount).ok_or(FutarchyError::MathOverflow)?;
        Ok(())
    }

    /// Zero every balance and return what the winning outcome was worth
    pub fn redeem(&mut self, winner: u8) -> Result<Reserves> {
        let index = winner as usize;
        require!(index < self.asset.len(), FutarchyError::NothingToClaim);

        let payout = Reserves::new(self.asset[index], self.stable[index]);
        self.asset.iter_mut().for_each(|b| *b = 0);
        self.stable.iter_mut().for_each(|b| *b = 0);

        Ok(payout)
    }

    fn side_mut(&mut self, outcome: u8, direction: SwapDirection, input: bool) -> Result<&mut u64> {
        // Buy pays stable and receives asset; Sell is the reverse
        let stable_side = matches!(direction, SwapDirection::Buy) == input;
        let balances = if stable_side { &mut self.stable } else { &mut self.asset };

        balances
            .get_mut(outcome as usize)
            .ok_or(FutarchyError::InvalidOutcome.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(outcomes: usize) -> ConditionalPosition {
        let mut position = ConditionalPosition {
            proposal: Pubkey::new_unique(),
            owner: Pubkey::new_unique(),
            asset: vec![],
            stable: vec![],
            bump: 0,
        };
        position.ensure_outcomes(outcomes);
        position
    }

    #[test]
    fn test_split_credits_every_outcome() {
        let mut p = position(3);
        p.split(Reserves::new(10, 500)).unwrap();

        assert_eq!(p.asset, vec![10, 10, 10]);
        assert_eq!(p.stable, vec![500, 500, 500]);
    }

    #[test]
    fn test_merge_needs_every_outcome() {
        let mut p = position(2);
        p.split(Reserves::new(0, 100)).unwrap();
        p.debit_swap_input(1, SwapDirection::Buy, 60).unwrap();

        assert!(p.merge(Reserves::new(0, 50)).is_err());
        p.merge(Reserves::new(0, 40)).unwrap();
        assert_eq!(p.stable, vec![60, 0]);
    }

    #[test]
    fn test_swap_moves_between_sides() {
        let mut p = position(2);
        p.split(Reserves::new(0, 100)).unwrap();

        p.debit_swap_input(0, SwapDirection::Buy, 100).unwrap();
        p.credit_swap_output(0, SwapDirection::Buy, 7).unwrap();

        assert_eq!(p.stable, vec![0, 100]);
        assert_eq!(p.asset, vec![7, 0]);
        assert!(p.debit_swap_input(0, SwapDirection::Buy, 1).is_err());
    }

    #[test]
    fn test_redeem_pays_only_winner() {
        let mut p = position(2);
        p.split(Reserves::new(5, 100)).unwrap();
        p.debit_swap_input(1, SwapDirection::Sell, 5).unwrap();
        p.credit_swap_output(1, SwapDirection::Sell, 90).unwrap();

        assert_eq!(p.redeem(1).unwrap(), Reserves::new(0, 190));
        assert_eq!(p.redeem(1).unwrap(), Reserves::default());
    }
}
