//! Premarket Reservation
//!
//! Close to the end of a live proposal's trading period, the head of the
//! queue may be moved into the single premarket slot. It activates ahead of
//! every other entry but has no liquidity attached until it starts trading.

use anchor_lang::prelude::*;

use crate::error::FutarchyError;
use crate::state::{AdmissionQueue, Dao, Proposal, ProposalState, QueuedProposal};

#[event]
pub struct ProposalReserved {
    pub dao: Pubkey,
    pub queued_proposal: Pubkey,
    pub trading_proposal: Pubkey,
    pub reserved_at: i64,
}

#[derive(Accounts)]
pub struct ReservePremarket<'info> {
    pub caller: Signer<'info>,

    pub dao: Box<Account<'info, Dao>>,

    #[account(
        mut,
        seeds = [AdmissionQueue::SEED, dao.key().as_ref()],
        bump = admission_queue.bump,
    )]
    pub admission_queue: Box<Account<'info, AdmissionQueue>>,

    #[account(mut, has_one = dao)]
    pub queued_proposal: Box<Account<'info, QueuedProposal>>,

    /// Live proposal whose deadline is approaching
    #[account(has_one = dao)]
    pub trading_proposal: Box<Account<'info, Proposal>>,
}

impl<'info> ReservePremarket<'info> {
    pub fn reserve_premarket(&mut self) -> Result<()> {
        let now = Clock::get()?.unix_timestamp;

        self.trading_proposal.require_state(ProposalState::Trading)?;
        let opens_at = self
            .trading_proposal
            .trading_ends_at()
            .saturating_sub(self.dao.params.premarket_lead_secs);
        require_gte!(now, opens_at, FutarchyError::PremarketTooEarly);

        require!(
            self.admission_queue.premarket.is_none(),
            FutarchyError::PremarketSlotTaken
        );
        let key = self.queued_proposal.key();
        let head = self
            .admission_queue
            .entries
            .first()
            .map(|e| e.queued_proposal);
        require!(head == Some(key), FutarchyError::NotNextInLine);

        self.admission_queue.reserve_next()?;
        self.queued_proposal.reserve()?;

        emit!(ProposalReserved {
            dao: self.dao.key(),
            queued_proposal: key,
            trading_proposal: self.trading_proposal.key(),
            reserved_at: now,
        });

        Ok(())
    }
}
