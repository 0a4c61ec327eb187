//! Permissionless expiry of unexecuted proposals

use anchor_lang::prelude::*;

use crate::state::Proposal;

#[event]
pub struct ProposalExpired {
    pub proposal: Pubkey,
    pub winning_outcome: Option<u8>,
    pub expired_at: i64,
}

#[derive(Accounts)]
pub struct ExpireProposal<'info> {
    #[account(mut)]
    pub proposal: Box<Account<'info, Proposal>>,
}

impl<'info> ExpireProposal<'info> {
    pub fn expire_proposal(&mut self) -> Result<()> {
        let now = Clock::get()?.unix_timestamp;

        if !self.proposal.expire(now)? {
            msg!(
                "Proposal {} still executable until {}",
                self.proposal.number,
                self.proposal.execution_ends_at()
            );
            return Ok(());
        }

        emit!(ProposalExpired {
            proposal: self.proposal.key(),
            winning_outcome: self.proposal.winning_outcome,
            expired_at: now,
        });

        Ok(())
    }
}
