//! Queue Eviction
//!
//! Anyone may evict a waiting proposal once its grace period has passed.
//! The bond goes back to whoever submitted it and the queued record is
//! closed to them. A proposal reserved into the premarket slot cannot be
//! evicted.

use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

use crate::instructions::shared::transfer_out;
use crate::state::{AdmissionQueue, Dao, QueuedProposal};

#[event]
pub struct ProposalEvicted {
    pub dao: Pubkey,
    pub queued_proposal: Pubkey,
    pub proposer: Pubkey,
    pub refunded: u64,
    pub evicted_by: Pubkey,
}

#[derive(Accounts)]
pub struct EvictProposal<'info> {
    pub caller: Signer<'info>,

    #[account(has_one = stable_mint, has_one = fee_vault)]
    pub dao: Box<Account<'info, Dao>>,

    #[account(
        mut,
        seeds = [AdmissionQueue::SEED, dao.key().as_ref()],
        bump = admission_queue.bump,
    )]
    pub admission_queue: Box<Account<'info, AdmissionQueue>>,

    #[account(
        mut,
        has_one = dao,
        has_one = proposer,
        close = proposer,
    )]
    pub queued_proposal: Box<Account<'info, QueuedProposal>>,

    /// CHECK: original submitter, matched against the queued record
    #[account(mut)]
    pub proposer: UncheckedAccount<'info>,

    pub stable_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(mut, token::mint = stable_mint, token::authority = proposer)]
    pub proposer_stable: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(mut)]
    pub fee_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    pub token_program: Interface<'info, TokenInterface>,
}

impl<'info> EvictProposal<'info> {
    pub fn evict_proposal(&mut self) -> Result<()> {
        let now = Clock::get()?.unix_timestamp;
        let key = self.queued_proposal.key();

        let entry = self.admission_queue.evict(
            &key,
            now,
            self.dao.params.eviction_grace_secs,
        )?;

        let refund = self.queued_proposal.bond;
        transfer_out(
            &self.token_program,
            &self.stable_mint,
            &self.fee_vault,
            &self.proposer_stable,
            &self.dao,
            refund,
        )?;

        emit!(ProposalEvicted {
            dao: self.dao.key(),
            queued_proposal: key,
            proposer: entry.proposer,
            refunded: refund,
            evicted_by: self.caller.key(),
        });

        msg!("Evicted queued proposal {} (seq {})", key, entry.seq);

        Ok(())
    }
}
