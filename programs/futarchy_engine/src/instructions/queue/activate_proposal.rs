//! Proposal Activation
//!
//! Takes the next queued proposal (the premarket reservation if there is
//! one, else the head of the queue) and opens it for review. Timing and
//! threshold values are copied from the DAO so later parameter changes never
//! affect a live proposal.

use anchor_lang::prelude::*;

use crate::amm::Reserves;
use crate::error::FutarchyError;
use crate::state::{AdmissionQueue, Dao, Proposal, ProposalState, QueuedProposal};

#[event]
pub struct ProposalActivated {
    pub dao: Pubkey,
    pub proposal: Pubkey,
    pub number: u64,
    pub proposer: Pubkey,
    pub outcome_count: u8,
    pub review_ends_at: i64,
}

#[derive(Accounts)]
pub struct ActivateProposal<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,

    #[account(mut)]
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

    /// CHECK: receives the queued record's rent, matched by `has_one`
    #[account(mut)]
    pub proposer: UncheckedAccount<'info>,

    #[account(
        init,
        payer = payer,
        space = 8 + Proposal::INIT_SPACE,
        seeds = [
            Proposal::SEED,
            dao.key().as_ref(),
            dao.proposal_count.to_le_bytes().as_ref(),
        ],
        bump,
    )]
    pub proposal: Box<Account<'info, Proposal>>,

    pub system_program: Program<'info, System>,
}

impl<'info> ActivateProposal<'info> {
    pub fn activate_proposal(&mut self, bumps: &ActivateProposalBumps) -> Result<()> {
        let now = Clock::get()?.unix_timestamp;
        let params = &self.dao.params;

        require!(
            self.dao.active_proposals < params.max_active_proposals,
            FutarchyError::ActiveProposalLimit
        );

        let queued_key = self.queued_proposal.key();
        let next = self.admission_queue.next().map(|e| e.queued_proposal);
        require!(next == Some(queued_key), FutarchyError::NotNextInLine);
        self.admission_queue.take_next()?;

        let outcomes = self.queued_proposal.activate()?;
        let queued = &self.queued_proposal;
        let number = self.dao.proposal_count;

        self.proposal.set_inner(Proposal {
            dao: self.dao.key(),
            number,
            proposer: queued.proposer,
            title: queued.title.clone(),
            state: ProposalState::Review,
            outcomes,
            created_at: queued.submitted_at,
            activated_at: now,
            trading_started_at: 0,
            finalized_at: 0,
            review_period_secs: params.review_period_secs,
            trading_period_secs: params.trading_period_secs,
            execution_window_secs: params.execution_window_secs,
            pass_threshold_bps: params.pass_threshold_bps,
            winning_outcome: None,
            final_twaps: Vec::new(),
            fee_escrow: queued.bond,
            uses_shared_liquidity: queued.uses_shared_liquidity,
            used_quota: queued.used_quota,
            standalone_liquidity: Reserves::default(),
            collateral: Reserves::default(),
            leader: None,
            flip_log: Vec::new(),
            bump: bumps.proposal,
        });

        self.dao.proposal_count = number.checked_add(1).ok_or(FutarchyError::MathOverflow)?;
        self.dao.active_proposals += 1;

        emit!(ProposalActivated {
            dao: self.dao.key(),
            proposal: self.proposal.key(),
            number,
            proposer: self.proposal.proposer,
            outcome_count: self.proposal.outcome_count() as u8,
            review_ends_at: self.proposal.review_ends_at(),
        });

        msg!(
            "Proposal {} activated from queue seq {}",
            number,
            self.queued_proposal.seq
        );

        Ok(())
    }
}
