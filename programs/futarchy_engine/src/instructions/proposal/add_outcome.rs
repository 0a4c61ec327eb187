//! Outcome challenges during review
//!
//! Anyone may add a competing outcome while the proposal is in review by
//! paying the DAO's outcome bond. The bond is refunded if any challenger
//! beats the default outcome.

use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

use crate::instructions::shared::transfer_in;
use crate::state::{Dao, OutcomeSpec, Proposal};

#[event]
pub struct OutcomeAdded {
    pub proposal: Pubkey,
    pub outcome_index: u8,
    pub creator: Pubkey,
    pub bond: u64,
}

#[derive(Accounts)]
pub struct AddOutcome<'info> {
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

impl<'info> AddOutcome<'info> {
    pub fn add_outcome(&mut self, description: String, action_bundle: Pubkey) -> Result<u8> {
        let now = Clock::get()?.unix_timestamp;
        let bond = self.dao.params.outcome_bond;

        let outcome_index = self.proposal.add_outcome(
            now,
            OutcomeSpec {
                description,
                action_bundle,
            },
            self.creator.key(),
            bond,
        )?;

        transfer_in(
            &self.token_program,
            &self.stable_mint,
            &self.creator_stable,
            &self.fee_vault,
            &self.creator,
            bond,
        )?;

        emit!(OutcomeAdded {
            proposal: self.proposal.key(),
            outcome_index,
            creator: self.creator.key(),
            bond,
        });

        Ok(outcome_index)
    }
}
