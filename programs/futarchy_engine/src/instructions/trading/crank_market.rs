//! Oracle crank
//!
//! Feeds a market's current pool price to its oracle without trading. The
//! clamped observation only closes on the pool price one step per update,
//! so quiet markets need cranking to keep their TWAP honest.

use anchor_lang::prelude::*;

use crate::error::FutarchyError;
use crate::state::{ConditionalMarket, Proposal};

#[event]
pub struct MarketCranked {
    pub proposal: Pubkey,
    pub outcome_index: u8,
    pub observation: u128,
    pub leader: Option<u8>,
}

#[derive(Accounts)]
pub struct CrankMarket<'info> {
    #[account(mut)]
    pub proposal: Box<Account<'info, Proposal>>,

    #[account(
        mut,
        has_one = proposal @ FutarchyError::MarketMismatch,
        seeds = [ConditionalMarket::SEED, proposal.key().as_ref(), &[market.outcome_index]],
        bump = market.bump,
    )]
    pub market: Box<Account<'info, ConditionalMarket>>,
}

impl<'info> CrankMarket<'info> {
    pub fn crank_market(&mut self) -> Result<u128> {
        let now = Clock::get()?.unix_timestamp;
        require!(self.proposal.is_trading_open(now), FutarchyError::TradingClosed);

        let outcome_index = self.market.outcome_index;
        let observation = self.market.crank(now)?;
        self.proposal
            .record_observation(now, outcome_index, observation)?;

        emit!(MarketCranked {
            proposal: self.proposal.key(),
            outcome_index,
            observation,
            leader: self.proposal.leader,
        });

        Ok(observation)
    }
}
