//! Scheduled Finalization
//!
//! After the trading deadline anyone may finalize. Results are computed over
//! the full trading window and frozen; calling again fails instead of
//! recomputing. Called early, this is a no-op.

use anchor_lang::prelude::*;

use crate::engine::{finalize_scheduled, Settlement};
use crate::instructions::shared::{load_markets, persist_markets};
use crate::state::{Dao, Proposal, SpotPool};

#[event]
pub struct ProposalFinalized {
    pub proposal: Pubkey,
    pub winning_outcome: u8,
    pub final_twaps: Vec<u128>,
    pub finalized_at: i64,
    pub returned_asset: u64,
    pub returned_stable: u64,
    pub to_treasury: u64,
    pub refunded: u64,
    pub winner_bonus: u64,
    pub early: bool,
}

impl ProposalFinalized {
    pub fn new(proposal: &Proposal, key: Pubkey, settlement: &Settlement, early: bool) -> Self {
        Self {
            proposal: key,
            winning_outcome: settlement.winner,
            final_twaps: settlement.final_twaps.clone(),
            finalized_at: proposal.finalized_at,
            returned_asset: settlement.returned.asset,
            returned_stable: settlement.returned.stable,
            to_treasury: settlement.fees.to_treasury,
            refunded: settlement.fees.refunded,
            winner_bonus: settlement.fees.bonus,
            early,
        }
    }
}

#[derive(Accounts)]
pub struct FinalizeProposal<'info> {
    pub caller: Signer<'info>,

    #[account(mut)]
    pub dao: Box<Account<'info, Dao>>,

    #[account(mut, has_one = dao)]
    pub proposal: Box<Account<'info, Proposal>>,

    #[account(
        mut,
        seeds = [SpotPool::SEED, dao.key().as_ref()],
        bump = spot_pool.bump,
    )]
    pub spot_pool: Box<Account<'info, SpotPool>>,
}

impl<'info> FinalizeProposal<'info> {
    pub fn finalize_proposal(&mut self, remaining: &'info [AccountInfo<'info>]) -> Result<()> {
        let now = Clock::get()?.unix_timestamp;
        let key = self.proposal.key();
        let mut markets = load_markets(remaining, key, self.proposal.outcome_count())?;

        let Some(settlement) = finalize_scheduled(
            key,
            &mut self.proposal,
            &mut self.dao,
            &mut self.spot_pool,
            &mut markets,
            now,
        )?
        else {
            msg!(
                "Proposal {} trades until {}",
                self.proposal.number,
                self.proposal.trading_ends_at()
            );
            return Ok(());
        };

        persist_markets(&markets)?;

        msg!(
            "Proposal {} finalized: outcome {} wins, TWAPs {:?}",
            self.proposal.number,
            settlement.winner,
            settlement.final_twaps
        );
        emit!(ProposalFinalized::new(&self.proposal, key, &settlement, false));

        Ok(())
    }
}
