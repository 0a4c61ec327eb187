//! Conditional trading
//!
//! Trades one outcome's position balances against that outcome's market.
//! No tokens move; the swap only shifts conditional balances. Each trade
//! updates the outcome's latest observation on the proposal, which drives
//! leader tracking for early resolution.

use anchor_lang::prelude::*;

use crate::amm::{AmmError, SwapDirection};
use crate::error::FutarchyError;
use crate::state::{ConditionalMarket, ConditionalPosition, Proposal};

#[event]
pub struct ConditionalSwapped {
    pub proposal: Pubkey,
    pub outcome_index: u8,
    pub trader: Pubkey,
    pub direction: SwapDirection,
    pub amount_in: u64,
    pub amount_out: u64,
    pub observation: u128,
    pub leader: Option<u8>,
}

#[derive(Accounts)]
pub struct ConditionalSwap<'info> {
    pub trader: Signer<'info>,

    #[account(mut)]
    pub proposal: Box<Account<'info, Proposal>>,

    #[account(
        mut,
        has_one = proposal @ FutarchyError::MarketMismatch,
        seeds = [ConditionalMarket::SEED, proposal.key().as_ref(), &[market.outcome_index]],
        bump = market.bump,
    )]
    pub market: Box<Account<'info, ConditionalMarket>>,

    #[account(
        mut,
        seeds = [ConditionalPosition::SEED, proposal.key().as_ref(), trader.key().as_ref()],
        bump = position.bump,
    )]
    pub position: Box<Account<'info, ConditionalPosition>>,
}

impl<'info> ConditionalSwap<'info> {
    pub fn conditional_swap(
        &mut self,
        amount_in: u64,
        direction: SwapDirection,
        min_amount_out: u64,
    ) -> Result<u64> {
        let now = Clock::get()?.unix_timestamp;
        require!(self.proposal.is_trading_open(now), FutarchyError::TradingClosed);
        let outcome_index = self.market.outcome_index;

        self.position
            .debit_swap_input(outcome_index, direction, amount_in)?;
        let (amount_out, observation) = self.market.swap(now, amount_in, direction)?;
        require_gte!(amount_out, min_amount_out, AmmError::SlippageExceeded);
        self.position
            .credit_swap_output(outcome_index, direction, amount_out)?;

        self.proposal
            .record_observation(now, outcome_index, observation)?;

        emit!(ConditionalSwapped {
            proposal: self.proposal.key(),
            outcome_index,
            trader: self.trader.key(),
            direction,
            amount_in,
            amount_out,
            observation,
            leader: self.proposal.leader,
        });

        Ok(amount_out)
    }
}
