//! Bond refunds and winner bonuses
//!
//! Settled at finalization as per-outcome payouts; each creator pulls
//! theirs from the fee vault once.

use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

use crate::instructions::shared::transfer_out;
use crate::state::{Dao, Proposal};

#[event]
pub struct PayoutClaimed {
    pub proposal: Pubkey,
    pub outcome_index: u8,
    pub creator: Pubkey,
    pub amount: u64,
}

#[derive(Accounts)]
pub struct ClaimPayout<'info> {
    pub creator: Signer<'info>,

    #[account(has_one = stable_mint, has_one = fee_vault)]
    pub dao: Box<Account<'info, Dao>>,

    #[account(mut, has_one = dao)]
    pub proposal: Box<Account<'info, Proposal>>,

    pub stable_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(mut, token::mint = stable_mint, token::authority = creator)]
    pub creator_stable: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(mut)]
    pub fee_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    pub token_program: Interface<'info, TokenInterface>,
}

impl<'info> ClaimPayout<'info> {
    pub fn claim_payout(&mut self, outcome_index: u8) -> Result<u64> {
        let creator = self.creator.key();
        let amount = self.proposal.claim_payout(outcome_index, &creator)?;

        transfer_out(
            &self.token_program,
            &self.stable_mint,
            &self.fee_vault,
            &self.creator_stable,
            &self.dao,
            amount,
        )?;

        emit!(PayoutClaimed {
            proposal: self.proposal.key(),
            outcome_index,
            creator,
            amount,
        });

        Ok(amount)
    }
}
