//! Proposal finalization
//!
//! Scheduled finalization and early resolution both end in
//! [`settle_proposal`]: TWAPs are frozen, the winner is chosen, liquidity
//! is recombined, bonds are settled and the DAO's active slot is freed.

use std::ops::DerefMut;

use anchor_lang::prelude::*;

use crate::amm::Reserves;
use crate::engine::fees::{settle_fees, FeeSettlement};
use crate::engine::outcome::select_winner;
use crate::engine::quantum::{collapse, recombine};
use crate::error::FutarchyError;
use crate::state::{ConditionalMarket, Dao, Proposal, ProposalState, SpotPool};

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Settlement {
    pub winner: u8,
    pub final_twaps: Vec<u128>,
    /// Reserves handed back to the liquidity source
    pub returned: Reserves,
    pub fees: FeeSettlement,
}

/// Each outcome's TWAP from the start of trading (after the oracle's start
/// delay) up to `at`
pub fn outcome_twaps<M: DerefMut<Target = ConditionalMarket>>(
    proposal: &Proposal,
    markets: &mut [M],
    at: i64,
) -> Result<Vec<u128>> {
    require_eq!(
        markets.len(),
        proposal.outcome_count(),
        FutarchyError::MissingMarkets
    );

    markets
        .iter_mut()
        .enumerate()
        .map(|(index, market)| {
            require_eq!(
                market.outcome_index as usize,
                index,
                FutarchyError::MissingMarkets
            );
            market.twap(at)
        })
        .collect()
}

/// Freeze results as of `end` and settle everything that depends on them
pub fn settle_proposal<M: DerefMut<Target = ConditionalMarket>>(
    proposal_key: Pubkey,
    proposal: &mut Proposal,
    dao: &mut Dao,
    spot: &mut SpotPool,
    markets: &mut [M],
    end: i64,
) -> Result<Settlement> {
    require!(!proposal.is_settled(), FutarchyError::AlreadyFinalized);
    proposal.require_state(ProposalState::Trading)?;

    let final_twaps = outcome_twaps(proposal, markets, end)?;
    let winner = select_winner(&final_twaps, proposal.pass_threshold_bps)?;
    proposal.finalize(end, final_twaps.clone(), winner)?;

    let returned = if proposal.uses_shared_liquidity {
        recombine(spot, proposal_key, markets, winner, end)?
    } else {
        let settled = collapse(markets, winner)?;
        dao.idle_reserves.add(settled.returned)?;
        settled.returned
    };

    let fees = settle_fees(proposal, dao)?;
    dao.release_active_slot();

    Ok(Settlement {
        winner,
        final_twaps,
        returned,
        fees,
    })
}

/// Finalize once the trading deadline has passed.
///
/// Returns `None` and changes nothing when called early.
pub fn finalize_scheduled<M: DerefMut<Target = ConditionalMarket>>(
    proposal_key: Pubkey,
    proposal: &mut Proposal,
    dao: &mut Dao,
    spot: &mut SpotPool,
    markets: &mut [M],
    now: i64,
) -> Result<Option<Settlement>> {
    require!(!proposal.is_settled(), FutarchyError::AlreadyFinalized);
    proposal.require_state(ProposalState::Trading)?;

    let end = proposal.trading_ends_at();
    if now < end {
        return Ok(None);
    }

    settle_proposal(proposal_key, proposal, dao, spot, markets, end).map(Some)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{ActionStatus, MarketStatus};
    use crate::oracle::MAX_CHECKPOINTS;
    use crate::test_fixtures::{market_refs, params, scenario, scenario_with, standalone_scenario};
    use crate::PRICE_SCALE;
    use anchor_lang::error::Error;

    const START: i64 = 10_000;

    #[test]
    fn test_scenario_a_challenger_wins() {
        let mut s = scenario(2, START);
        s.markets[0].oracle.record(START, 100 * PRICE_SCALE).unwrap();
        s.markets[1].oracle.record(START, 170 * PRICE_SCALE).unwrap();
        let challenger_reserves = s.markets[1].reserves;
        let spot_before = s.spot.reserves;
        let end = s.proposal.trading_ends_at();

        let settlement = finalize_scheduled(
            s.key,
            &mut s.proposal,
            &mut s.dao,
            &mut s.spot,
            &mut market_refs(&mut s.markets),
            end,
        )
        .unwrap()
        .unwrap();

        assert_eq!(settlement.winner, 1);
        assert_eq!(settlement.final_twaps, vec![100 * PRICE_SCALE, 170 * PRICE_SCALE]);
        assert_eq!(s.spot.reserves.stable, spot_before.stable + challenger_reserves.stable);
        assert_eq!(s.spot.reserves.asset, spot_before.asset + challenger_reserves.asset);
        assert_eq!(s.markets[0].status, MarketStatus::Discarded);
        assert_eq!(s.markets[1].status, MarketStatus::Winner);
        assert_eq!(s.proposal.outcomes[0].action_status, ActionStatus::Invalidated);
        assert_eq!(s.proposal.outcomes[1].action_status, ActionStatus::Selected);
        // proposer's bond comes back as a claimable refund
        assert_eq!(s.proposal.outcomes[1].payout, 1_000);
        assert_eq!(s.dao.active_proposals, 0);
    }

    #[test]
    fn test_scenario_b_default_wins_and_keeps_bond() {
        let mut s = scenario(2, START);
        s.markets[0].oracle.record(START, 100 * PRICE_SCALE).unwrap();
        s.markets[1].oracle.record(START, 120 * PRICE_SCALE).unwrap();
        let default_reserves = s.markets[0].reserves;
        let spot_before = s.spot.reserves;
        let end = s.proposal.trading_ends_at();

        let settlement = finalize_scheduled(
            s.key,
            &mut s.proposal,
            &mut s.dao,
            &mut s.spot,
            &mut market_refs(&mut s.markets),
            end + 50,
        )
        .unwrap()
        .unwrap();

        assert_eq!(settlement.winner, 0);
        assert_eq!(settlement.fees.to_treasury, 1_000);
        assert_eq!(s.dao.treasury_balance, 1_000);
        assert!(s.proposal.outcomes.iter().all(|o| o.payout == 0));
        assert_eq!(s.spot.reserves.stable, spot_before.stable + default_reserves.stable);
        assert_eq!(s.markets[1].status, MarketStatus::Discarded);
        // results are frozen at the trading deadline, not the call time
        assert_eq!(s.proposal.finalized_at, end);
    }

    #[test]
    fn test_final_twap_covers_the_whole_window() {
        let mut s = scenario(2, START);
        let end = s.proposal.trading_ends_at();
        s.markets[1].oracle.record(START, 200 * PRICE_SCALE).unwrap();

        // churn near the deadline rolls the early history out of the checkpoints
        let churn = MAX_CHECKPOINTS as i64 + 10;
        for i in 0..churn {
            let price = if i % 2 == 0 { 100 * PRICE_SCALE } else { 101 * PRICE_SCALE };
            s.markets[1].oracle.record(end - (churn - i) * 60, price).unwrap();
        }
        assert_eq!(s.markets[1].oracle.checkpoints.len(), MAX_CHECKPOINTS);

        let settlement = finalize_scheduled(
            s.key,
            &mut s.proposal,
            &mut s.dao,
            &mut s.spot,
            &mut market_refs(&mut s.markets),
            end,
        )
        .unwrap()
        .unwrap();

        assert_eq!(settlement.winner, 1);
        assert_eq!(settlement.final_twaps[0], 100 * PRICE_SCALE);
        assert!(settlement.final_twaps[1] > 190 * PRICE_SCALE);
    }

    #[test]
    fn test_start_delay_ignores_opening_prices() {
        let mut params = params();
        params.twap_start_delay_secs = 3_600;
        let mut s = scenario_with(params, 2, START);
        let end = s.proposal.trading_ends_at();

        // an opening spike that is unwound before the delay ends
        s.markets[1].oracle.record(START, 200 * PRICE_SCALE).unwrap();
        s.markets[1].oracle.record(START + 3_600, 100 * PRICE_SCALE).unwrap();

        let settlement = finalize_scheduled(
            s.key,
            &mut s.proposal,
            &mut s.dao,
            &mut s.spot,
            &mut market_refs(&mut s.markets),
            end,
        )
        .unwrap()
        .unwrap();

        assert_eq!(settlement.final_twaps, vec![100 * PRICE_SCALE, 100 * PRICE_SCALE]);
        assert_eq!(settlement.winner, 0);
        // the spot integral still spans the whole split, delay included
        assert_eq!(
            s.spot.oracle.cumulative - s.spot.oracle.cumulative_at(START).unwrap(),
            100 * PRICE_SCALE * (end - START) as u128
        );
    }

    #[test]
    fn test_finalize_before_deadline_is_a_no_op() {
        let mut s = scenario(2, START);
        let end = s.proposal.trading_ends_at();

        let result = finalize_scheduled(
            s.key,
            &mut s.proposal,
            &mut s.dao,
            &mut s.spot,
            &mut market_refs(&mut s.markets),
            end - 1,
        )
        .unwrap();

        assert!(result.is_none());
        assert_eq!(s.proposal.state, ProposalState::Trading);
        assert!(s.proposal.final_twaps.is_empty());
        assert!(s.spot.is_locked());
    }

    #[test]
    fn test_second_finalization_fails() {
        let mut s = scenario(3, START);
        let end = s.proposal.trading_ends_at();
        finalize_scheduled(
            s.key,
            &mut s.proposal,
            &mut s.dao,
            &mut s.spot,
            &mut market_refs(&mut s.markets),
            end,
        )
        .unwrap();
        let winner = s.proposal.winning_outcome;

        let again = finalize_scheduled(
            s.key,
            &mut s.proposal,
            &mut s.dao,
            &mut s.spot,
            &mut market_refs(&mut s.markets),
            end + 100,
        );

        assert_eq!(again.unwrap_err(), Error::from(FutarchyError::AlreadyFinalized));
        assert_eq!(s.proposal.winning_outcome, winner);
    }

    #[test]
    fn test_exactly_one_market_returned() {
        let mut s = scenario(4, START);
        s.markets[3].oracle.record(START, 200 * PRICE_SCALE).unwrap();
        let end = s.proposal.trading_ends_at();

        finalize_scheduled(
            s.key,
            &mut s.proposal,
            &mut s.dao,
            &mut s.spot,
            &mut market_refs(&mut s.markets),
            end,
        )
        .unwrap();

        let winners = s.markets.iter().filter(|m| m.status == MarketStatus::Winner).count();
        let discarded = s
            .markets
            .iter()
            .filter(|m| m.status == MarketStatus::Discarded && m.reserves.is_empty())
            .count();
        assert_eq!((winners, discarded), (1, 3));
    }

    #[test]
    fn test_standalone_winner_returns_to_treasury() {
        let mut s = standalone_scenario(2, START);
        let idle_before = s.dao.idle_reserves;
        let seeded = s.markets[0].reserves;
        let end = s.proposal.trading_ends_at();

        finalize_scheduled(
            s.key,
            &mut s.proposal,
            &mut s.dao,
            &mut s.spot,
            &mut market_refs(&mut s.markets),
            end,
        )
        .unwrap();

        assert_eq!(s.dao.idle_reserves.stable, idle_before.stable + seeded.stable);
        assert!(!s.spot.is_locked());
    }

    #[test]
    fn test_markets_must_be_in_outcome_order() {
        let mut s = scenario(2, START);
        s.markets.swap(0, 1);
        let end = s.proposal.trading_ends_at();

        let result = finalize_scheduled(
            s.key,
            &mut s.proposal,
            &mut s.dao,
            &mut s.spot,
            &mut market_refs(&mut s.markets),
            end,
        );

        assert_eq!(result.unwrap_err(), Error::from(FutarchyError::MissingMarkets));
    }
}
