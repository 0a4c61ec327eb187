//! # Early Resolution
//!
//! Trading may end before its deadline when all three hold:
//!
//! ```text
//! elapsed            ≥ min_elapsed_secs
//! spread_bps         ≥ min_spread_bps
//! flips_in_window    ≤ max_flips + (spread_bps − min_spread_bps) / spread_per_extra_flip_bps
//! ```
//!
//! `spread_bps` is the leader's TWAP over the runner-up's, in basis points
//! of the runner-up. A wider lead tolerates a noisier history, but never
//! more flips than the proposal's flip log can hold: a full log means the
//! true count is unknown and always fails. Early resolution then runs the
//! normal finalization path at the current time and pays the keeper.

use std::ops::DerefMut;

use anchor_lang::prelude::*;

use crate::engine::finalize::{outcome_twaps, settle_proposal, Settlement};
use crate::engine::outcome::leader_and_runner_up;
use crate::error::FutarchyError;
use crate::state::{
    ConditionalMarket, Dao, EarlyResolutionConfig, Proposal, ProposalState, SpotPool, MAX_FLIP_LOG,
};
use crate::MAX_BPS;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct EarlyResolutionCheck {
    pub leader: u8,
    pub spread_bps: u64,
    pub flips: u32,
    pub allowed_flips: u32,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct EarlyResolution {
    pub check: EarlyResolutionCheck,
    pub settlement: Settlement,
    /// Drawn from the treasury for the caller, capped by its balance
    pub keeper_reward: u64,
}

/// Lead of `leader` over `runner_up` in basis points of `runner_up`
pub fn spread_bps(leader: u128, runner_up: u128) -> u64 {
    if runner_up == 0 {
        return if leader > 0 { u64::MAX } else { 0 };
    }

    let lead = leader.saturating_sub(runner_up);
    let spread = lead.saturating_mul(MAX_BPS as u128) / runner_up;
    u64::try_from(spread).unwrap_or(u64::MAX)
}

/// Flips tolerated at `spread_bps`, kept below what the flip log can count
pub fn effective_max_flips(config: &EarlyResolutionConfig, spread_bps: u64) -> u32 {
    let surplus = spread_bps.saturating_sub(config.min_spread_bps as u64);
    let extra = surplus / (config.spread_per_extra_flip_bps.max(1) as u64);

    (config.max_flips as u64)
        .saturating_add(extra)
        .min(MAX_FLIP_LOG as u64 - 1) as u32
}

pub fn evaluate(
    config: &EarlyResolutionConfig,
    elapsed: i64,
    twaps: &[u128],
    flips: u32,
) -> Result<EarlyResolutionCheck> {
    require!(config.enabled, FutarchyError::EarlyResolutionDisabled);
    require!(elapsed >= config.min_elapsed_secs, FutarchyError::ResolutionTooEarly);

    let (leader, runner_up) = leader_and_runner_up(twaps)?;
    let spread = spread_bps(twaps[leader], twaps[runner_up]);
    require!(
        spread >= config.min_spread_bps as u64,
        FutarchyError::InsufficientSpread
    );

    let allowed_flips = effective_max_flips(config, spread);
    require!(flips <= allowed_flips, FutarchyError::TooManyFlips);

    Ok(EarlyResolutionCheck {
        leader: leader as u8,
        spread_bps: spread,
        flips,
        allowed_flips,
    })
}

/// Check the early-resolution conditions at `now`, finalize if they hold
/// and draw the keeper's reward
pub fn resolve_early<M: DerefMut<Target = ConditionalMarket>>(
    proposal_key: Pubkey,
    proposal: &mut Proposal,
    dao: &mut Dao,
    spot: &mut SpotPool,
    markets: &mut [M],
    now: i64,
) -> Result<EarlyResolution> {
    require!(!proposal.is_settled(), FutarchyError::AlreadyFinalized);
    proposal.require_state(ProposalState::Trading)?;
    require!(now < proposal.trading_ends_at(), FutarchyError::TradingClosed);

    let config = dao.params.early_resolution;
    let elapsed = now - proposal.trading_started_at;
    let twaps = outcome_twaps(proposal, markets, now)?;
    let flips = proposal.flips_since(now.saturating_sub(config.flip_window_secs));

    let check = evaluate(&config, elapsed, &twaps, flips)?;
    let settlement = settle_proposal(proposal_key, proposal, dao, spot, markets, now)?;
    // after fee settlement, so a winner bonus is paid first
    let keeper_reward = dao.draw_treasury(config.keeper_reward);

    Ok(EarlyResolution {
        check,
        settlement,
        keeper_reward,
    })
}

// ============================================================================
// TESTS
// ============================================================================
