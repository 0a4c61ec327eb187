//! Early Resolution
//!
//! A keeper may end trading before the deadline when the leader is far
//! enough ahead and has been stable. The keeper is paid from the treasury,
//! up to whatever it holds.

use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

use crate::engine::resolve_early;
use crate::instructions::proposal::ProposalFinalized;
use crate::instructions::shared::{load_markets, persist_markets, transfer_out};
use crate::state::{Dao, Proposal, SpotPool};

#[event]
pub struct ResolvedEarly {
    pub proposal: Pubkey,
    pub keeper: Pubkey,
    pub leader: u8,
    pub spread_bps: u64,
    pub flips: u32,
    pub allowed_flips: u32,
    pub keeper_reward: u64,
}

#[derive(Accounts)]
pub struct ResolveEarly<'info> {
    pub keeper: Signer<'info>,

    #[account(mut, has_one = stable_mint, has_one = fee_vault)]
    pub dao: Box<Account<'info, Dao>>,

    #[account(mut, has_one = dao)]
    pub proposal: Box<Account<'info, Proposal>>,

    #[account(
        mut,
        seeds = [SpotPool::SEED, dao.key().as_ref()],
        bump = spot_pool.bump,
    )]
    pub spot_pool: Box<Account<'info, SpotPool>>,

    pub stable_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(mut, token::mint = stable_mint, token::authority = keeper)]
    pub keeper_stable: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(mut)]
    pub fee_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    pub token_program: Interface<'info, TokenInterface>,
}

impl<'info> ResolveEarly<'info> {
    pub fn resolve_early(&mut self, remaining: &'info [AccountInfo<'info>]) -> Result<()> {
        let now = Clock::get()?.unix_timestamp;
        let key = self.proposal.key();
        let mut markets = load_markets(remaining, key, self.proposal.outcome_count())?;

        let resolution = resolve_early(
            key,
            &mut self.proposal,
            &mut self.dao,
            &mut self.spot_pool,
            &mut markets,
            now,
        )?;
        persist_markets(&markets)?;

        transfer_out(
            &self.token_program,
            &self.stable_mint,
            &self.fee_vault,
            &self.keeper_stable,
            &self.dao,
            resolution.keeper_reward,
        )?;

        let check = resolution.check;

        msg!(
            "Proposal {} resolved early: outcome {} leads by {} bps ({} of {} flips)",
            self.proposal.number,
            check.leader,
            check.spread_bps,
            check.flips,
            check.allowed_flips
        );
        emit!(ProposalFinalized::new(&self.proposal, key, &resolution.settlement, true));
        emit!(ResolvedEarly {
            proposal: key,
            keeper: self.keeper.key(),
            leader: check.leader,
            spread_bps: check.spread_bps,
            flips: check.flips,
            allowed_flips: check.allowed_flips,
            keeper_reward: resolution.keeper_reward,
        });

        Ok(())
    }
}
