//! Proposal Submission
//!
//! A proposal enters the admission queue with a bond paid into the fee
//! vault. Members holding a quota grant may submit without a bond; their
//! entry is then ranked as if it carried the minimum bond.

use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

use crate::error::FutarchyError;
use crate::instructions::shared::transfer_in;
use crate::state::{AdmissionQueue, Dao, OutcomeSpec, ProposalState, QueuedProposal, QuotaGrant};

#[event]
pub struct ProposalQueued {
    pub dao: Pubkey,
    pub queued_proposal: Pubkey,
    pub proposer: Pubkey,
    pub seq: u64,
    pub bond: u64,
    pub used_quota: bool,
    pub queue_len: u8,
}

#[derive(Accounts)]
pub struct SubmitProposal<'info> {
    #[account(mut)]
    pub proposer: Signer<'info>,

    #[account(mut, has_one = stable_mint, has_one = fee_vault)]
    pub dao: Box<Account<'info, Dao>>,

    #[account(
        mut,
        seeds = [AdmissionQueue::SEED, dao.key().as_ref()],
        bump = admission_queue.bump,
    )]
    pub admission_queue: Box<Account<'info, AdmissionQueue>>,

    #[account(
        init,
        payer = proposer,
        space = 8 + QueuedProposal::INIT_SPACE,
        seeds = [
            QueuedProposal::SEED,
            dao.key().as_ref(),
            dao.queued_count.to_le_bytes().as_ref(),
        ],
        bump,
    )]
    pub queued_proposal: Box<Account<'info, QueuedProposal>>,

    /// Present only for a fee-free submission
    #[account(
        mut,
        seeds = [QuotaGrant::SEED, dao.key().as_ref(), proposer.key().as_ref()],
        bump = quota.bump,
    )]
    pub quota: Option<Account<'info, QuotaGrant>>,

    pub stable_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(mut, token::mint = stable_mint, token::authority = proposer)]
    pub proposer_stable: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(mut)]
    pub fee_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    pub token_program: Interface<'info, TokenInterface>,
    pub system_program: Program<'info, System>,
}

impl<'info> SubmitProposal<'info> {
    pub fn submit_proposal(
        &mut self,
        title: String,
        outcomes: Vec<OutcomeSpec>,
        bond: u64,
        uses_shared_liquidity: bool,
        bumps: &SubmitProposalBumps,
    ) -> Result<()> {
        QueuedProposal::validate_submission(&title, &outcomes)?;
        let now = Clock::get()?.unix_timestamp;
        let min_bond = self.dao.params.proposal_bond;

        let (bond, priority, used_quota) = match self.quota.as_mut() {
            Some(quota) => {
                quota.consume()?;
                (0, min_bond, true)
            }
            None => {
                require_gte!(bond, min_bond, FutarchyError::BondTooSmall);
                (bond, bond, false)
            }
        };

        let seq = self.dao.queued_count;
        self.queued_proposal.set_inner(QueuedProposal {
            dao: self.dao.key(),
            proposer: self.proposer.key(),
            seq,
            state: ProposalState::Pending,
            title,
            outcomes,
            bond,
            uses_shared_liquidity,
            used_quota,
            submitted_at: now,
            bump: bumps.queued_proposal,
        });

        let entry = self.queued_proposal.entry(self.queued_proposal.key(), priority);
        self.admission_queue
            .enqueue(entry, self.dao.params.max_queue_len)?;
        self.dao.queued_count = seq.checked_add(1).ok_or(FutarchyError::MathOverflow)?;

        transfer_in(
            &self.token_program,
            &self.stable_mint,
            &self.proposer_stable,
            &self.fee_vault,
            &self.proposer,
            bond,
        )?;

        emit!(ProposalQueued {
            dao: self.dao.key(),
            queued_proposal: self.queued_proposal.key(),
            proposer: self.proposer.key(),
            seq,
            bond,
            used_quota,
            queue_len: self.admission_queue.len() as u8,
        });

        Ok(())
    }
}
