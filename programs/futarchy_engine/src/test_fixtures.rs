//! Shared account fixtures for unit tests

use anchor_lang::prelude::*;

use crate::amm::Reserves;
use crate::engine::quantum::{seed_standalone, split};
use crate::oracle::TwapOracle;
use crate::state::*;
use crate::PRICE_SCALE;

pub const P100: u128 = 100 * PRICE_SCALE;

pub fn params() -> DaoParams {
    DaoParams {
        review_period_secs: 3_600,
        trading_period_secs: 86_400,
        execution_window_secs: 7 * 86_400,
        pass_threshold_bps: 5_000,
        max_active_proposals: 2,
        max_queue_len: 8,
        eviction_grace_secs: 7 * 86_400,
        premarket_lead_secs: 3_600,
        proposal_bond: 1_000,
        outcome_bond: 500,
        winner_bonus: 250,
        conditional_fee_bps: 30,
        spot_fee_bps: 30,
        shared_liquidity_bps: 5_000,
        standalone_stable_liquidity: 100_000_000,
        twap_max_change_bps: 10_000,
        twap_min_update_interval_secs: 60,
        twap_start_delay_secs: 0,
        twap_seed_window_secs: 3_600,
        twap_initial_price: P100,
        early_resolution: EarlyResolutionConfig {
            enabled: true,
            min_elapsed_secs: 3_600,
            min_spread_bps: 2_000,
            flip_window_secs: 3_600,
            max_flips: 1,
            spread_per_extra_flip_bps: 1_000,
            keeper_reward: 100,
        },
    }
}

pub fn dao() -> Dao {
    Dao {
        creator: Pubkey::new_unique(),
        nonce: 0,
        admin: Pubkey::new_unique(),
        asset_mint: Pubkey::new_unique(),
        stable_mint: Pubkey::new_unique(),
        asset_vault: Pubkey::new_unique(),
        stable_vault: Pubkey::new_unique(),
        fee_vault: Pubkey::new_unique(),
        action_dispatcher: Pubkey::new_unique(),
        params: params(),
        proposal_count: 0,
        queued_count: 0,
        active_proposals: 0,
        treasury_balance: 0,
        idle_reserves: Reserves::default(),
        bump: 255,
    }
}

/// Spot pool priced at 100 with an observed oracle
pub fn spot_pool(now: i64) -> SpotPool {
    let mut oracle = TwapOracle::new(now, P100, params().spot_oracle());
    oracle.record(now, P100).unwrap();

    SpotPool {
        dao: Pubkey::default(),
        reserves: Reserves::new(10_000_000, 1_000_000_000),
        fee_bps: 30,
        oracle,
        locked_to: None,
        locked_fraction_bps: 0,
        pending_split: None,
        bump: 255,
    }
}

pub fn pending_market(outcome_index: u8) -> ConditionalMarket {
    ConditionalMarket {
        dao: Pubkey::default(),
        proposal: Pubkey::default(),
        outcome_index,
        status: MarketStatus::Pending,
        reserves: Reserves::default(),
        fee_bps: 30,
        oracle: TwapOracle::default(),
        bump: 255,
    }
}

pub fn pending_markets(count: u8) -> Vec<ConditionalMarket> {
    (0..count).map(pending_market).collect()
}

pub fn market_refs(markets: &mut [ConditionalMarket]) -> Vec<&mut ConditionalMarket> {
    markets.iter_mut().collect()
}

/// Proposal in review with `outcome_count` outcomes.
///
/// Outcome 1 belongs to the proposer and carries the 1_000 proposal bond.
pub fn proposal(outcome_count: u8) -> Proposal {
    let params = params();
    let proposer = Pubkey::new_unique();

    let outcomes = (0..outcome_count)
        .map(|index| Outcome {
            description: format!("Outcome {index}"),
            action_bundle: if index == 0 {
                Pubkey::default()
            } else {
                Pubkey::new_unique()
            },
            creator: proposer,
            bond: if index == 1 { params.proposal_bond } else { 0 },
            action_status: ActionStatus::Pending,
            latest_observation: 0,
            payout: 0,
            payout_claimed: false,
        })
        .collect();

    Proposal {
        dao: Pubkey::new_unique(),
        number: 0,
        proposer,
        title: "Adjust treasury policy".to_string(),
        state: ProposalState::Review,
        outcomes,
        created_at: 0,
        activated_at: 0,
        trading_started_at: 0,
        finalized_at: 0,
        review_period_secs: params.review_period_secs,
        trading_period_secs: params.trading_period_secs,
        execution_window_secs: params.execution_window_secs,
        pass_threshold_bps: params.pass_threshold_bps,
        winning_outcome: None,
        final_twaps: vec![],
        fee_escrow: params.proposal_bond,
        uses_shared_liquidity: true,
        used_quota: false,
        standalone_liquidity: Reserves::default(),
        collateral: Reserves::default(),
        leader: None,
        flip_log: vec![],
        bump: 255,
    }
}

pub fn trading_proposal(outcome_count: u8, start: i64) -> Proposal {
    let mut proposal = proposal(outcome_count);
    proposal.start_trading(start, P100).unwrap();
    proposal
}

pub fn finalized_proposal(winner: u8, at: i64) -> Proposal {
    let mut proposal = trading_proposal(2, 0);
    proposal.finalize(at, vec![100, 200], winner).unwrap();
    proposal
}

/// One proposal trading against its markets, with the accounts it touches
pub struct Scenario {
    pub key: Pubkey,
    pub proposal: Proposal,
    pub dao: Dao,
    pub spot: SpotPool,
    pub markets: Vec<ConditionalMarket>,
}

fn unseeded(outcome_count: u8, shared: bool) -> Scenario {
    let key = Pubkey::new_unique();
    let mut dao = dao();
    dao.active_proposals = 1;

    let mut proposal = proposal(outcome_count);
    proposal.uses_shared_liquidity = shared;

    let mut markets = pending_markets(outcome_count);
    for market in markets.iter_mut() {
        market.proposal = key;
    }

    Scenario {
        key,
        proposal,
        dao,
        spot: spot_pool(0),
        markets,
    }
}

/// Trading proposal seeded by splitting the spot pool at `start`
pub fn scenario(outcome_count: u8, start: i64) -> Scenario {
    scenario_with(params(), outcome_count, start)
}

pub fn scenario_with(params: DaoParams, outcome_count: u8, start: i64) -> Scenario {
    let mut s = unseeded(outcome_count, true);
    s.dao.params = params.clone();

    let receipt = split(
        &mut s.spot,
        s.key,
        &mut market_refs(&mut s.markets),
        params.shared_liquidity_bps,
        params.twap_seed_window_secs,
        params.market_oracle(),
        start,
    )
    .unwrap();
    s.proposal.start_trading(start, receipt.seed_price).unwrap();

    s
}

/// Trading proposal seeded from idle treasury reserves at `start`
pub fn standalone_scenario(outcome_count: u8, start: i64) -> Scenario {
    let mut s = unseeded(outcome_count, false);
    let params = s.dao.params.clone();
    s.dao.idle_reserves = Reserves::new(10_000_000, 1_000_000_000);

    let seed_price = s.spot.twap(start, params.twap_seed_window_secs).unwrap();
    let receipt = seed_standalone(
        &mut s.dao.idle_reserves,
        &mut market_refs(&mut s.markets),
        params.standalone_stable_liquidity,
        seed_price,
        params.market_oracle(),
        start,
    )
    .unwrap();
    s.proposal.standalone_liquidity = receipt.per_market;
    s.proposal.start_trading(start, receipt.seed_price).unwrap();

    s
}
