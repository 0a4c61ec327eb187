//! Admin abandonment of a winning action
//!
//! Lets the DAO admin give up on an action that cannot be dispatched, for
//! example because the dispatcher keeps rejecting it. The proposal moves to
//! EXPIRED and the winning outcome's action is invalidated.

use anchor_lang::prelude::*;

use crate::error::FutarchyError;
use crate::state::{Dao, Proposal};

#[event]
pub struct ExecutionAbandoned {
    pub proposal: Pubkey,
    pub outcome_index: u8,
    pub abandoned_by: Pubkey,
}

#[derive(Accounts)]
pub struct AbandonExecution<'info> {
    pub admin: Signer<'info>,

    #[account(has_one = admin @ FutarchyError::Unauthorized)]
    pub dao: Box<Account<'info, Dao>>,

    #[account(mut, has_one = dao)]
    pub proposal: Box<Account<'info, Proposal>>,
}

impl<'info> AbandonExecution<'info> {
    pub fn abandon_execution(&mut self) -> Result<()> {
        let now = Clock::get()?.unix_timestamp;
        let key = self.proposal.key();

        let ticket = self.proposal.begin_execution(key, now)?;
        let outcome_index = ticket.outcome_index();
        self.proposal.abandon_execution(ticket)?;

        emit!(ExecutionAbandoned {
            proposal: key,
            outcome_index,
            abandoned_by: self.admin.key(),
        });

        Ok(())
    }
}
