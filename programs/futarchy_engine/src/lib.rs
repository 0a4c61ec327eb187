//! # Futarchy Engine: Decision Markets for DAOs
//!
//! A DAO governed by markets instead of votes. Every proposal comes with a
//! set of mutually exclusive outcomes, and each outcome gets its own
//! conditional market trading the DAO's asset against a stable coin. The
//! outcome whose market prices the asset highest, measured by a
//! manipulation-resistant TWAP, wins and its action bundle is executed.
//!
//! ## Lifecycle
//!
//! ```text
//! submit ─▶ queue ─▶ (premarket) ─▶ REVIEW ─▶ TRADING ─▶ FINALIZED ─▶ EXECUTED
//!                                                            └──────▶ EXPIRED
//! ```
//!
//! - Proposals wait in a bounded, bond-ordered admission queue.
//! - During review anyone may add competing outcomes by posting a bond.
//! - Trading starts by splitting the spot pool's liquidity into every
//!   outcome's market; finalization recombines it.
//! - A clear, stable leader may end trading early.

use anchor_lang::prelude::*;

pub mod amm;
pub mod engine;
pub mod error;
pub mod instructions;
pub mod oracle;
pub mod state;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use instructions::*;

use crate::amm::SwapDirection;
use crate::state::{DaoParams, OutcomeSpec};

/// Fixed-point scale of every price and TWAP (1.0 == `PRICE_SCALE`)
pub const PRICE_SCALE: u128 = 1_000_000_000_000;

/// Denominator of every basis-point parameter
pub const MAX_BPS: u16 = 10_000;

/// Hard upper bound on the admission queue's capacity
pub const MAX_QUEUE_CAPACITY: usize = 16;

// Replace with your deployed program ID
declare_id!("7bt2Qb91mSWMQLEgeu8LrYV1L3FaQuTupiDZMqNa8Toh");

/// Main futarchy program
#[program]
pub mod futarchy_engine {
    use super::*;

    // ------------------------------------------------------------------
    // DAO administration
    // ------------------------------------------------------------------

    /// Create the DAO, its spot pool and admission queue (Step 1)
    pub fn initialize_dao(
        ctx: Context<InitializeDao>,
        nonce: u64,
        params: DaoParams,
        action_dispatcher: Pubkey,
    ) -> Result<()> {
        ctx.accounts
            .initialize_dao(nonce, params, action_dispatcher, &ctx.bumps)
    }

    /// Create the DAO's token vaults (Step 2)
    pub fn initialize_dao_vaults(ctx: Context<InitializeDaoVaults>) -> Result<()> {
        ctx.accounts.initialize_dao_vaults()
    }

    pub fn update_dao(
        ctx: Context<UpdateDao>,
        params: DaoParams,
        new_admin: Option<Pubkey>,
        action_dispatcher: Option<Pubkey>,
    ) -> Result<()> {
        ctx.accounts.update_dao(params, new_admin, action_dispatcher)
    }

    /// Let a member submit proposals without a bond
    pub fn grant_quota(ctx: Context<GrantQuota>, member: Pubkey, count: u32) -> Result<()> {
        ctx.accounts.grant_quota(member, count, &ctx.bumps)
    }

    pub fn fund_treasury(ctx: Context<FundTreasury>, amount: u64) -> Result<()> {
        ctx.accounts.fund_treasury(amount)
    }

    // ------------------------------------------------------------------
    // Spot liquidity
    // ------------------------------------------------------------------

    pub fn deposit_liquidity(
        ctx: Context<ManageLiquidity>,
        bucket: LiquidityBucket,
        asset_amount: u64,
        stable_amount: u64,
    ) -> Result<()> {
        ctx.accounts
            .deposit_liquidity(bucket, asset_amount, stable_amount)
    }

    pub fn withdraw_liquidity(
        ctx: Context<ManageLiquidity>,
        bucket: LiquidityBucket,
        asset_amount: u64,
        stable_amount: u64,
    ) -> Result<()> {
        ctx.accounts
            .withdraw_liquidity(bucket, asset_amount, stable_amount)
    }

    /// Swap against the spot pool
    pub fn spot_swap(
        ctx: Context<SpotSwap>,
        amount_in: u64,
        direction: SwapDirection,
        min_amount_out: u64,
    ) -> Result<u64> {
        ctx.accounts.spot_swap(amount_in, direction, min_amount_out)
    }

    // ------------------------------------------------------------------
    // Admission queue
    // ------------------------------------------------------------------

    pub fn submit_proposal(
        ctx: Context<SubmitProposal>,
        title: String,
        outcomes: Vec<OutcomeSpec>,
        bond: u64,
        uses_shared_liquidity: bool,
    ) -> Result<()> {
        ctx.accounts.submit_proposal(
            title,
            outcomes,
            bond,
            uses_shared_liquidity,
            &ctx.bumps,
        )
    }

    /// Drop a queued proposal that no longer fits the queue
    pub fn evict_proposal(ctx: Context<EvictProposal>) -> Result<()> {
        ctx.accounts.evict_proposal()
    }

    /// Claim the premarket slot for the head of the queue
    pub fn reserve_premarket(ctx: Context<ReservePremarket>) -> Result<()> {
        ctx.accounts.reserve_premarket()
    }

    pub fn activate_proposal(ctx: Context<ActivateProposal>) -> Result<()> {
        ctx.accounts.activate_proposal(&ctx.bumps)
    }

    // ------------------------------------------------------------------
    // Proposal lifecycle
    // ------------------------------------------------------------------

    /// Add a competing outcome during review (bond required)
    pub fn add_outcome(
        ctx: Context<AddOutcome>,
        description: String,
        action_bundle: Pubkey,
    ) -> Result<u8> {
        ctx.accounts.add_outcome(description, action_bundle)
    }

    pub fn initialize_conditional_market(
        ctx: Context<InitializeConditionalMarket>,
        outcome_index: u8,
    ) -> Result<()> {
        ctx.accounts
            .initialize_conditional_market(outcome_index, &ctx.bumps)
    }

    /// REVIEW → TRADING; markets are passed as remaining accounts
    pub fn begin_trading<'c: 'info, 'info>(
        ctx: Context<'_, '_, 'c, 'info, BeginTrading<'info>>,
    ) -> Result<()> {
        ctx.accounts.begin_trading(ctx.remaining_accounts)
    }

    /// TRADING → FINALIZED after the trading window
    pub fn finalize_proposal<'c: 'info, 'info>(
        ctx: Context<'_, '_, 'c, 'info, FinalizeProposal<'info>>,
    ) -> Result<()> {
        ctx.accounts.finalize_proposal(ctx.remaining_accounts)
    }

    /// TRADING → FINALIZED early when the leader is clear and stable
    pub fn resolve_early<'c: 'info, 'info>(
        ctx: Context<'_, '_, 'c, 'info, ResolveEarly<'info>>,
    ) -> Result<()> {
        ctx.accounts.resolve_early(ctx.remaining_accounts)
    }

    pub fn claim_payout(ctx: Context<ClaimPayout>, outcome_index: u8) -> Result<u64> {
        ctx.accounts.claim_payout(outcome_index)
    }

    // ------------------------------------------------------------------
    // Conditional trading
    // ------------------------------------------------------------------

    pub fn split_position(
        ctx: Context<SplitPosition>,
        asset_amount: u64,
        stable_amount: u64,
    ) -> Result<()> {
        ctx.accounts
            .split_position(asset_amount, stable_amount, &ctx.bumps)
    }

    pub fn merge_position(
        ctx: Context<SettlePosition>,
        asset_amount: u64,
        stable_amount: u64,
    ) -> Result<()> {
        ctx.accounts.merge_position(asset_amount, stable_amount)
    }

    /// Redeem the winning outcome's balances for collateral
    pub fn redeem_position(ctx: Context<SettlePosition>) -> Result<amm::Reserves> {
        ctx.accounts.redeem_position()
    }

    pub fn conditional_swap(
        ctx: Context<ConditionalSwap>,
        amount_in: u64,
        direction: SwapDirection,
        min_amount_out: u64,
    ) -> Result<u64> {
        ctx.accounts
            .conditional_swap(amount_in, direction, min_amount_out)
    }

    /// Push a market's price into its oracle without trading
    pub fn crank_market(ctx: Context<CrankMarket>) -> Result<u128> {
        ctx.accounts.crank_market()
    }

    // ------------------------------------------------------------------
    // Execution
    // ------------------------------------------------------------------

    /// Run the winning action bundle through the DAO's dispatcher
    pub fn execute_proposal<'c: 'info, 'info>(
        ctx: Context<'_, '_, 'c, 'info, ExecuteProposal<'info>>,
    ) -> Result<()> {
        ctx.accounts.execute_proposal(ctx.remaining_accounts)
    }

    pub fn abandon_execution(ctx: Context<AbandonExecution>) -> Result<()> {
        ctx.accounts.abandon_execution()
    }

    pub fn expire_proposal(ctx: Context<ExpireProposal>) -> Result<()> {
        ctx.accounts.expire_proposal()
    }
}
