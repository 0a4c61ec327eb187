//! Start of trading
//!
//! Once review is over, every outcome market is seeded and the proposal
//! moves to TRADING. Markets are passed as remaining accounts in outcome
//! order.
//!
//! - Shared liquidity: part of the spot pool is split into the markets and
//!   the pool stays locked until finalization.
//! - Standalone: the markets are seeded from the DAO's idle reserves at the
//!   current spot TWAP.

use anchor_lang::prelude::*;

use crate::engine::{seed_standalone, split};
use crate::instructions::shared::{load_markets, persist_markets};
use crate::state::{Dao, Proposal, ProposalState, SpotPool};

#[event]
pub struct TradingBegun {
    pub proposal: Pubkey,
    pub outcome_count: u8,
    pub shared_liquidity: bool,
    pub seed_price: u128,
    pub asset_per_market: u64,
    pub stable_per_market: u64,
    pub trading_ends_at: i64,
}

#[derive(Accounts)]
pub struct BeginTrading<'info> {
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

impl<'info> BeginTrading<'info> {
    pub fn begin_trading(&mut self, remaining: &'info [AccountInfo<'info>]) -> Result<()> {
        let now = Clock::get()?.unix_timestamp;
        self.proposal.require_state(ProposalState::Review)?;

        if now < self.proposal.review_ends_at() {
            msg!(
                "Proposal {} stays in review until {}",
                self.proposal.number,
                self.proposal.review_ends_at()
            );
            return Ok(());
        }

        let key = self.proposal.key();
        let mut markets = load_markets(remaining, key, self.proposal.outcome_count())?;
        let params = self.dao.params.clone();

        let receipt = if self.proposal.uses_shared_liquidity {
            split(
                &mut self.spot_pool,
                key,
                &mut markets,
                params.shared_liquidity_bps,
                params.twap_seed_window_secs,
                params.market_oracle(),
                now,
            )?
        } else {
            let seed_price = self.spot_pool.twap(now, params.twap_seed_window_secs)?;
            let receipt = seed_standalone(
                &mut self.dao.idle_reserves,
                &mut markets,
                params.standalone_stable_liquidity,
                seed_price,
                params.market_oracle(),
                now,
            )?;
            self.proposal.standalone_liquidity = receipt.per_market;
            receipt
        };

        self.proposal.start_trading(now, receipt.seed_price)?;
        persist_markets(&markets)?;

        emit!(TradingBegun {
            proposal: key,
            outcome_count: markets.len() as u8,
            shared_liquidity: self.proposal.uses_shared_liquidity,
            seed_price: receipt.seed_price,
            asset_per_market: receipt.per_market.asset,
            stable_per_market: receipt.per_market.stable,
            trading_ends_at: self.proposal.trading_ends_at(),
        });

        Ok(())
    }
}
