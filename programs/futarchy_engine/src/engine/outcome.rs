//! Winner selection
//!
//! Outcome 0 is the baseline. A challenger wins only if its TWAP is
//! strictly above `baseline × (10_000 + threshold_bps) / 10_000`. When
//! several challengers clear that bar, the highest TWAP wins and ties go to
//! the lowest index.

use anchor_lang::prelude::*;

use crate::error::FutarchyError;
use crate::state::DEFAULT_OUTCOME;
use crate::MAX_BPS;

/// TWAP a challenger must exceed to beat the default outcome
pub fn pass_threshold(baseline_twap: u128, threshold_bps: u16) -> Result<u128> {
    let multiplier = MAX_BPS as u128 + threshold_bps as u128;
    let required = baseline_twap
        .checked_mul(multiplier)
        .ok_or(FutarchyError::MathOverflow)?
        / MAX_BPS as u128;

    Ok(required)
}

pub fn select_winner(twaps: &[u128], threshold_bps: u16) -> Result<u8> {
    require!(twaps.len() >= 2, FutarchyError::TooFewOutcomes);

    let required = pass_threshold(twaps[DEFAULT_OUTCOME as usize], threshold_bps)?;

    let mut winner = DEFAULT_OUTCOME;
    let mut best = required;
    for (index, twap) in twaps.iter().enumerate().skip(1) {
        if *twap > best {
            winner = index as u8;
            best = *twap;
        }
    }

    Ok(winner)
}

/// Indices of the highest and second-highest TWAPs, lowest index on ties
pub fn leader_and_runner_up(twaps: &[u128]) -> Result<(usize, usize)> {
    require!(twaps.len() >= 2, FutarchyError::TooFewOutcomes);

    let mut order: Vec<usize> = (0..twaps.len()).collect();
    // stable sort keeps lower indices first among equal TWAPs
    order.sort_by(|a, b| twaps[*b].cmp(&twaps[*a]));

    Ok((order[0], order[1]))
}
