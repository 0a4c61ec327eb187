//! # Quantum Liquidity Manager
//!
//! ## Split
//!
//! When a proposal starts trading, a share of the spot reserves is
//! withdrawn and **every** conditional market is seeded with the whole
//! withdrawn amount:
//!
//! ```text
//!               spot reserves
//!                     │ withdraw W
//!        ┌────────────┼────────────┐
//!        ▼            ▼            ▼
//!   market 0 = W  market 1 = W  market 2 = W     Σ seeded = N × W
//! ```
//!
//! Only one outcome will ever be executed, so a unit of collateral can back
//! one claim in each outcome at the same time.
//!
//! ## Recombine
//!
//! At finalization the winning market's reserves flow back 1:1, the losers
//! are destroyed, and the spot oracle is rewound to the split instant and
//! backfilled from the winner's price history so its integral has no gap.

use std::ops::DerefMut;

use anchor_lang::prelude::*;

use crate::amm::Reserves;
use crate::error::FutarchyError;
use crate::oracle::{TwapConfig, TwapOracle};
use crate::state::{ConditionalMarket, SplitMarker, SpotPool};
use crate::PRICE_SCALE;

/// Liquidity and opening price given to each market
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct SeedReceipt {
    /// Amount seeded into *each* market
    pub per_market: Reserves,
    pub seed_price: u128,
}

/// Seed every market from the shared spot pool and lock it to `proposal`
pub fn split<M: DerefMut<Target = ConditionalMarket>>(
    spot: &mut SpotPool,
    proposal: Pubkey,
    markets: &mut [M],
    fraction_bps: u16,
    seed_window_secs: i64,
    oracle: TwapConfig,
    now: i64,
) -> Result<SeedReceipt> {
    require!(spot.pending_split.is_none(), FutarchyError::SplitPending);
    spot.ensure_unlocked()?;
    require!(markets.len() >= 2, FutarchyError::TooFewOutcomes);

    let seed_price = spot.twap(now, seed_window_secs)?;
    let withdrawn = spot.reserves.fraction(fraction_bps);
    require!(!withdrawn.is_empty(), FutarchyError::InsufficientLiquidity);

    spot.reserves.remove(withdrawn)?;
    // boundary the oracle is rewound to at recombination
    spot.oracle.checkpoint(now)?;

    for market in markets.iter_mut() {
        market.seed(now, withdrawn, seed_price, oracle)?;
    }

    spot.locked_to = Some(proposal);
    spot.locked_fraction_bps = fraction_bps;
    spot.pending_split = Some(SplitMarker {
        proposal,
        split_at: now,
        withdrawn,
        outcome_count: markets.len() as u8,
    });

    Ok(SeedReceipt {
        per_market: withdrawn,
        seed_price,
    })
}

/// Seed every market from idle treasury reserves instead of the spot pool
pub fn seed_standalone<M: DerefMut<Target = ConditionalMarket>>(
    idle: &mut Reserves,
    markets: &mut [M],
    stable_amount: u64,
    seed_price: u128,
    oracle: TwapConfig,
    now: i64,
) -> Result<SeedReceipt> {
    require!(markets.len() >= 2, FutarchyError::TooFewOutcomes);
    require!(seed_price > 0, FutarchyError::InvalidPrice);

    let asset_amount = (stable_amount as u128)
        .checked_mul(PRICE_SCALE)
        .ok_or(FutarchyError::MathOverflow)?
        / seed_price;
    let pair = Reserves::new(
        u64::try_from(asset_amount).map_err(|_| FutarchyError::MathOverflow)?,
        stable_amount,
    );
    require!(!pair.is_empty(), FutarchyError::InsufficientLiquidity);
    require!(
        idle.asset >= pair.asset && idle.stable >= pair.stable,
        FutarchyError::InsufficientLiquidity
    );
    idle.remove(pair)?;

    for market in markets.iter_mut() {
        market.seed(now, pair, seed_price, oracle)?;
    }

    Ok(SeedReceipt {
        per_market: pair,
        seed_price,
    })
}

/// The winner's reserves and price history after the losers are destroyed
pub struct Collapse {
    pub returned: Reserves,
    pub winner_oracle: TwapOracle,
}

/// Settle the winning market and discard every other one
pub fn collapse<M: DerefMut<Target = ConditionalMarket>>(
    markets: &mut [M],
    winner: u8,
) -> Result<Collapse> {
    let mut settled = None;

    for market in markets.iter_mut() {
        if market.outcome_index == winner {
            let returned = market.settle_winner()?;
            settled = Some(Collapse {
                returned,
                winner_oracle: market.oracle.clone(),
            });
        } else {
            market.discard()?;
        }
    }

    settled.ok_or(FutarchyError::MissingMarkets.into())
}

/// Return the winner's reserves to the spot pool and stitch its oracle
/// history across the trading period
pub fn recombine<M: DerefMut<Target = ConditionalMarket>>(
    spot: &mut SpotPool,
    proposal: Pubkey,
    markets: &mut [M],
    winner: u8,
    end: i64,
) -> Result<Reserves> {
    let marker = spot.pending_split.ok_or(FutarchyError::SplitMismatch)?;
    require_keys_eq!(marker.proposal, proposal, FutarchyError::SplitMismatch);
    require_eq!(
        markets.len(),
        marker.outcome_count as usize,
        FutarchyError::MissingMarkets
    );

    let Collapse {
        returned,
        winner_oracle,
    } = collapse(markets, winner)?;

    spot.reserves.add(returned)?;
    spot.oracle.rewind(marker.split_at)?;
    spot.oracle.backfill(&winner_oracle, end.max(marker.split_at))?;

    spot.locked_to = None;
    spot.locked_fraction_bps = 0;
    spot.pending_split = None;

    Ok(returned)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::MarketStatus;
    use crate::test_fixtures::{params, pending_markets, spot_pool};
    use anchor_lang::error::Error;

    #[test]
    fn test_split_seeds_full_amount_everywhere() {
        let mut spot = spot_pool(0);
        let before = spot.reserves;
        let mut markets = pending_markets(3);
        let mut refs: Vec<&mut ConditionalMarket> = markets.iter_mut().collect();

        let receipt = split(
            &mut spot,
            Pubkey::new_unique(),
            &mut refs,
            5_000,
            3_600,
            params().market_oracle(),
            100,
        )
        .unwrap();

        let seeded_stable: u64 = markets.iter().map(|m| m.reserves.stable).sum();
        let seeded_asset: u64 = markets.iter().map(|m| m.reserves.asset).sum();
        assert_eq!(seeded_stable, 3 * receipt.per_market.stable);
        assert_eq!(seeded_asset, 3 * receipt.per_market.asset);
        assert_eq!(receipt.per_market.stable, before.stable / 2);
        assert_eq!(spot.reserves.stable, before.stable - receipt.per_market.stable);
        assert!(markets.iter().all(|m| m.status == MarketStatus::Trading));
    }

    #[test]
    fn test_second_split_waits_for_recombine() {
        let mut spot = spot_pool(0);
        let mut first = pending_markets(2);
        let mut refs: Vec<&mut ConditionalMarket> = first.iter_mut().collect();
        split(&mut spot, Pubkey::new_unique(), &mut refs, 2_000, 3_600, params().market_oracle(), 100).unwrap();

        let mut second = pending_markets(2);
        let mut refs: Vec<&mut ConditionalMarket> = second.iter_mut().collect();
        assert_eq!(
            split(&mut spot, Pubkey::new_unique(), &mut refs, 2_000, 3_600, params().market_oracle(), 200).unwrap_err(),
            Error::from(FutarchyError::SplitPending)
        );
        assert!(second.iter().all(|m| m.status == MarketStatus::Pending));
    }

    #[test]
    fn test_recombine_returns_only_winner() {
        let proposal = Pubkey::new_unique();
        let mut spot = spot_pool(0);
        let mut markets = pending_markets(3);
        {
            let mut refs: Vec<&mut ConditionalMarket> = markets.iter_mut().collect();
            split(&mut spot, proposal, &mut refs, 5_000, 3_600, params().market_oracle(), 100).unwrap();
        }
        let after_split = spot.reserves;

        markets[2].reserves.stable += 1_000;
        let winner_reserves = markets[2].reserves;

        let mut refs: Vec<&mut ConditionalMarket> = markets.iter_mut().collect();
        let returned = recombine(&mut spot, proposal, &mut refs, 2, 500).unwrap();

        assert_eq!(returned, winner_reserves);
        assert_eq!(spot.reserves.stable, after_split.stable + winner_reserves.stable);
        assert!(!spot.is_locked());
        assert!(spot.pending_split.is_none());

        let winners = markets.iter().filter(|m| m.status == MarketStatus::Winner).count();
        let discarded = markets
            .iter()
            .filter(|m| m.status == MarketStatus::Discarded && m.reserves.is_empty())
            .count();
        assert_eq!((winners, discarded), (1, 2));
    }

    #[test]
    fn test_recombine_keeps_spot_integral_continuous() {
        let proposal = Pubkey::new_unique();
        let mut spot = spot_pool(0);
        let mut markets = pending_markets(2);
        {
            let mut refs: Vec<&mut ConditionalMarket> = markets.iter_mut().collect();
            split(&mut spot, proposal, &mut refs, 5_000, 3_600, params().market_oracle(), 1_000).unwrap();
        }
        let at_split = spot.oracle.cumulative_at(1_000).unwrap();

        // reads during the lock extend the spot oracle with a stale price
        spot.twap(1_500, 600).unwrap();

        let doubled = 2 * markets[1].oracle.last_price;
        markets[1].oracle.record(1_200, doubled).unwrap();
        markets[1].oracle.accumulate(2_000).unwrap();
        let winner_integral = markets[1].oracle.cumulative;

        let mut refs: Vec<&mut ConditionalMarket> = markets.iter_mut().collect();
        recombine(&mut spot, proposal, &mut refs, 1, 2_000).unwrap();

        assert_eq!(spot.oracle.cumulative_at(1_000).unwrap(), at_split);
        assert_eq!(spot.oracle.cumulative, at_split + winner_integral);
        assert_eq!(spot.oracle.last_updated, 2_000);
    }

    #[test]
    fn test_recombine_rejects_foreign_proposal() {
        let mut spot = spot_pool(0);
        let mut markets = pending_markets(2);
        let mut refs: Vec<&mut ConditionalMarket> = markets.iter_mut().collect();
        split(&mut spot, Pubkey::new_unique(), &mut refs, 5_000, 3_600, params().market_oracle(), 100).unwrap();

        assert_eq!(
            recombine(&mut spot, Pubkey::new_unique(), &mut refs, 0, 200).unwrap_err(),
            Error::from(FutarchyError::SplitMismatch)
        );
    }

    #[test]
    fn test_standalone_seeding_uses_idle_reserves() {
        let mut idle = Reserves::new(1_000_000, 1_000_000_000);
        let mut markets = pending_markets(2);
        let mut refs: Vec<&mut ConditionalMarket> = markets.iter_mut().collect();

        let oracle = params().market_oracle();
        let receipt =
            seed_standalone(&mut idle, &mut refs, 100_000_000, 100 * PRICE_SCALE, oracle, 10).unwrap();

        assert_eq!(receipt.per_market, Reserves::new(1_000_000, 100_000_000));
        assert_eq!(idle, Reserves::new(0, 900_000_000));

        let mut more = pending_markets(2);
        let mut refs: Vec<&mut ConditionalMarket> = more.iter_mut().collect();
        assert!(seed_standalone(&mut idle, &mut refs, 100_000_000, 100 * PRICE_SCALE, oracle, 10).is_err());
    }
}
