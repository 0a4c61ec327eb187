//! Bond settlement at finalization
//!
//! - Default outcome wins: the treasury keeps the whole escrow.
//! - A challenger wins: every non-default bond is refunded to its own
//!   creator, and the winning creator also earns the DAO's winner bonus
//!   (capped by the treasury) unless the proposal was submitted on a
//!   fee-free quota.
//!
//! Refunds and bonuses are recorded as claimable payouts on the outcomes;
//! the tokens stay in the fee vault until claimed.

use anchor_lang::prelude::*;

use crate::error::FutarchyError;
use crate::state::{Dao, Proposal, DEFAULT_OUTCOME};

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct FeeSettlement {
    pub to_treasury: u64,
    pub refunded: u64,
    pub bonus: u64,
}

pub fn settle_fees(proposal: &mut Proposal, dao: &mut Dao) -> Result<FeeSettlement> {
    let winner = proposal.winner()?;
    let escrow = std::mem::take(&mut proposal.fee_escrow);

    if winner == DEFAULT_OUTCOME {
        dao.credit_treasury(escrow)?;
        return Ok(FeeSettlement {
            to_treasury: escrow,
            ..Default::default()
        });
    }

    let mut refunded: u64 = 0;
    for outcome in proposal.outcomes.iter_mut().skip(1) {
        outcome.payout = outcome
            .payout
            .checked_add(outcome.bond)
            .ok_or(FutarchyError::MathOverflow)?;
        refunded = refunded
            .checked_add(outcome.bond)
            .ok_or(FutarchyError::MathOverflow)?;
    }

    // the default outcome carries no bond, so anything left is dust
    let leftover = escrow.saturating_sub(refunded);
    dao.credit_treasury(leftover)?;

    let bonus = if proposal.used_quota {
        0
    } else {
        dao.draw_treasury(dao.params.winner_bonus)
    };
    let winning = &mut proposal.outcomes[winner as usize];
    winning.payout = winning
        .payout
        .checked_add(bonus)
        .ok_or(FutarchyError::MathOverflow)?;

    Ok(FeeSettlement {
        to_treasury: leftover,
        refunded,
        bonus,
    })
}
