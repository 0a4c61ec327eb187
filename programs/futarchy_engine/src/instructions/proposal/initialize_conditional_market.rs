//! Conditional market creation
//!
//! One permissionless call per outcome while the proposal is in review.
//! Markets start empty; liquidity is attached when trading begins.

use anchor_lang::prelude::*;

use crate::amm::Reserves;
use crate::error::FutarchyError;
use crate::oracle::TwapOracle;
use crate::state::{ConditionalMarket, Dao, MarketStatus, Proposal, ProposalState};

#[derive(Accounts)]
#[instruction(outcome_index: u8)]
pub struct InitializeConditionalMarket<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,

    pub dao: Box<Account<'info, Dao>>,

    #[account(has_one = dao)]
    pub proposal: Box<Account<'info, Proposal>>,

    #[account(
        init,
        payer = payer,
        space = 8 + ConditionalMarket::INIT_SPACE,
        seeds = [ConditionalMarket::SEED, proposal.key().as_ref(), &[outcome_index]],
        bump,
    )]
    pub market: Box<Account<'info, ConditionalMarket>>,

    pub system_program: Program<'info, System>,
}

impl<'info> InitializeConditionalMarket<'info> {
    pub fn initialize_conditional_market(
        &mut self,
        outcome_index: u8,
        bumps: &InitializeConditionalMarketBumps,
    ) -> Result<()> {
        self.proposal.require_state(ProposalState::Review)?;
        require!(
            (outcome_index as usize) < self.proposal.outcome_count(),
            FutarchyError::InvalidOutcome
        );

        self.market.set_inner(ConditionalMarket {
            dao: self.dao.key(),
            proposal: self.proposal.key(),
            outcome_index,
            status: MarketStatus::Pending,
            reserves: Reserves::default(),
            fee_bps: self.dao.params.conditional_fee_bps,
            oracle: TwapOracle::default(),
            bump: bumps.market,
        });

        msg!(
            "Market for outcome {} of proposal {} created",
            outcome_index,
            self.proposal.number
        );

        Ok(())
    }
}
