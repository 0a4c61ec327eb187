//! Proposal State
//!
//! ## Lifecycle
//!
//! ```text
//!  PENDING ──▶ (PREMARKET) ──▶ REVIEW ──▶ TRADING ──▶ FINALIZED ──┬──▶ EXECUTED
//!  (queued)                                                       └──▶ EXPIRED
//! ```
//!
//! `PENDING` and `PREMARKET` belong to the queued record; the `Proposal`
//! account itself is created in `REVIEW` at activation. No state is ever
//! revisited and the winning outcome is written exactly once.
//!
//! Outcome 0 is always the default "no change" outcome.

use anchor_lang::prelude::*;

use crate::amm::Reserves;
use crate::error::FutarchyError;

pub const MAX_OUTCOMES: usize = 5;
pub const MAX_FLIP_LOG: usize = 32;
pub const MAX_TITLE_LEN: usize = 64;
pub const MAX_DESCRIPTION_LEN: usize = 96;

/// Default / "no change" outcome
pub const DEFAULT_OUTCOME: u8 = 0;

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, InitSpace, Debug, Default)]
pub enum ProposalState {
    #[default]
    Pending,
    Premarket,
    Review,
    Trading,
    Finalized,
    Executed,
    Expired,
}

impl ProposalState {
    /// The only legal moves; everything else is rejected
    pub fn can_transition_to(self, next: ProposalState) -> bool {
        use ProposalState::*;

        matches!(
            (self, next),
            (Pending, Premarket)
                | (Pending, Review)
                | (Premarket, Review)
                | (Review, Trading)
                | (Trading, Finalized)
                | (Finalized, Executed)
                | (Finalized, Expired)
        )
    }
}

/// What may still happen to an outcome's action bundle
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, InitSpace, Debug, Default)]
pub enum ActionStatus {
    #[default]
    Pending,
    /// Winner; may be executed once
    Selected,
    /// Lost, or the execution window passed
    Invalidated,
    Executed,
}

/// Outcome as submitted with a proposal
#[derive(AnchorSerialize, AnchorDeserialize, Clone, PartialEq, Eq, InitSpace, Debug)]
pub struct OutcomeSpec {
    #[max_len(96)]
    pub description: String,
    /// Reference handed to the action dispatcher if this outcome wins
    pub action_bundle: Pubkey,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, PartialEq, Eq, InitSpace, Debug)]
pub struct Outcome {
    #[max_len(96)]
    pub description: String,
    pub action_bundle: Pubkey,
    pub creator: Pubkey,
    /// Bond this outcome's creator put up
    pub bond: u64,
    pub action_status: ActionStatus,
    /// Most recent oracle observation of this outcome's market
    pub latest_observation: u128,
    /// Refund and/or bonus owed to `creator` after finalization
    pub payout: u64,
    pub payout_claimed: bool,
}

impl Outcome {
    pub fn new(spec: OutcomeSpec, creator: Pubkey, bond: u64) -> Result<Self> {
        require!(
            spec.description.len() <= MAX_DESCRIPTION_LEN,
            FutarchyError::TextTooLong
        );

        Ok(Self {
            description: spec.description,
            action_bundle: spec.action_bundle,
            creator,
            bond,
            action_status: ActionStatus::Pending,
            latest_observation: 0,
            payout: 0,
            payout_claimed: false,
        })
    }
}

/// A live decision
///
/// Seeds: ["proposal", dao, number.to_le_bytes()]
#[account]
#[derive(InitSpace)]
pub struct Proposal {
    pub dao: Pubkey,
    pub number: u64,
    pub proposer: Pubkey,

    #[max_len(64)]
    pub title: String,

    pub state: ProposalState,

    #[max_len(5)]
    pub outcomes: Vec<Outcome>,

    /// Submission time of the queued record
    pub created_at: i64,
    pub activated_at: i64,
    pub trading_started_at: i64,
    pub finalized_at: i64,

    // Snapshotted from the DAO at activation
    pub review_period_secs: i64,
    pub trading_period_secs: i64,
    pub execution_window_secs: i64,
    pub pass_threshold_bps: u16,

    /// Set once at finalization, never changed afterwards
    pub winning_outcome: Option<u8>,

    /// Per-outcome TWAPs over the full trading window, frozen at finalization
    #[max_len(5)]
    pub final_twaps: Vec<u128>,

    /// Bonds held for this proposal in the fee vault
    pub fee_escrow: u64,

    pub uses_shared_liquidity: bool,
    pub used_quota: bool,

    /// Pair seeded into every market from idle treasury reserves
    pub standalone_liquidity: Reserves,

    /// Total collateral traders have split into positions
    pub collateral: Reserves,

    /// Outcome with the highest latest observation
    pub leader: Option<u8>,

    /// Timestamps at which the leader changed
    #[max_len(32)]
    pub flip_log: Vec<i64>,

    /// PDA bump seed
    pub bump: u8,
}

impl Proposal {
    pub const SEED: &'static [u8] = b"proposal";

    pub fn review_ends_at(&self) -> i64 {
        self.activated_at.saturating_add(self.review_period_secs)
    }

    pub fn trading_ends_at(&self) -> i64 {
        self.trading_started_at.saturating_add(self.trading_period_secs)
    }

    pub fn execution_ends_at(&self) -> i64 {
        self.finalized_at.saturating_add(self.execution_window_secs)
    }

    pub fn outcome_count(&self) -> usize {
        self.outcomes.len()
    }

    pub fn transition(&mut self, next: ProposalState) -> Result<()> {
        require!(
            self.state.can_transition_to(next),
            FutarchyError::IllegalTransition
        );
        self.state = next;
        Ok(())
    }

    pub fn require_state(&self, state: ProposalState) -> Result<()> {
        require!(self.state == state, FutarchyError::InvalidState);
        Ok(())
    }

    pub fn is_settled(&self) -> bool {
        matches!(
            self.state,
            ProposalState::Finalized | ProposalState::Executed | ProposalState::Expired
        )
    }

    pub fn is_trading_open(&self, now: i64) -> bool {
        self.state == ProposalState::Trading && now < self.trading_ends_at()
    }

    /// Add a challenger outcome during review
    pub fn add_outcome(&mut self, now: i64, spec: OutcomeSpec, creator: Pubkey, bond: u64) -> Result<u8> {
        require!(
            self.state == ProposalState::Review && now < self.review_ends_at(),
            FutarchyError::OutcomeWindowClosed
        );
        require!(
            self.outcomes.len() < MAX_OUTCOMES,
            FutarchyError::TooManyOutcomes
        );

        self.outcomes.push(Outcome::new(spec, creator, bond)?);
        self.fee_escrow = self
            .fee_escrow
            .checked_add(bond)
            .ok_or(FutarchyError::MathOverflow)?;

        Ok((self.outcomes.len() - 1) as u8)
    }

    /// REVIEW → TRADING; every outcome starts level at the seed price
    pub fn start_trading(&mut self, now: i64, seed_price: u128) -> Result<()> {
        self.transition(ProposalState::Trading)?;
        self.trading_started_at = now;

        for outcome in self.outcomes.iter_mut() {
            outcome.latest_observation = seed_price;
        }
        self.leader = Some(DEFAULT_OUTCOME);
        self.flip_log.clear();

        Ok(())
    }

    /// Track the leading outcome and log a flip whenever it changes
    pub fn record_observation(&mut self, now: i64, outcome_index: u8, observation: u128) -> Result<()> {
        let outcome = self
            .outcomes
            .get_mut(outcome_index as usize)
            .ok_or(FutarchyError::InvalidOutcome)?;
        outcome.latest_observation = observation;

        let leader = self.current_leader();
        if self.leader.is_some() && self.leader != leader {
            if self.flip_log.len() == MAX_FLIP_LOG {
                self.flip_log.remove(0);
            }
            self.flip_log.push(now);
        }
        self.leader = leader;

        Ok(())
    }

    /// Leader changes at or after `since`
    pub fn flips_since(&self, since: i64) -> u32 {
        self.flip_log.iter().filter(|t| **t >= since).count() as u32
    }

    fn current_leader(&self) -> Option<u8> {
        let mut leader: Option<(usize, u128)> = None;
        for (index, outcome) in self.outcomes.iter().enumerate() {
            // strict `>` keeps the lowest index on ties
            if leader.map_or(true, |(_, best)| outcome.latest_observation > best) {
                leader = Some((index, outcome.latest_observation));
            }
        }
        leader.map(|(index, _)| index as u8)
    }

    /// TRADING → FINALIZED with the frozen TWAPs and chosen winner.
    ///
    /// Every action bundle except the winner's is invalidated.
    pub fn finalize(&mut self, now: i64, final_twaps: Vec<u128>, winner: u8) -> Result<()> {
        require!(!self.is_settled(), FutarchyError::AlreadyFinalized);
        require!(self.winning_outcome.is_none(), FutarchyError::WinnerAlreadySet);
        require!(self.final_twaps.is_empty(), FutarchyError::AlreadyFinalized);
        require_eq!(final_twaps.len(), self.outcomes.len(), FutarchyError::MissingMarkets);
        require!(
            (winner as usize) < self.outcomes.len(),
            FutarchyError::InvalidOutcome
        );

        self.transition(ProposalState::Finalized)?;
        self.final_twaps = final_twaps;
        self.winning_outcome = Some(winner);
        self.finalized_at = now;

        for (index, outcome) in self.outcomes.iter_mut().enumerate() {
            outcome.action_status = if index == winner as usize {
                ActionStatus::Selected
            } else {
                ActionStatus::Invalidated
            };
        }

        Ok(())
    }

    /// Mark an outcome creator's refund and bonus as paid, returning the amount
    pub fn claim_payout(&mut self, outcome_index: u8, claimant: &Pubkey) -> Result<u64> {
        require!(self.is_settled(), FutarchyError::NotFinalized);

        let outcome = self
            .outcomes
            .get_mut(outcome_index as usize)
            .ok_or(FutarchyError::InvalidOutcome)?;
        require_keys_eq!(outcome.creator, *claimant, FutarchyError::Unauthorized);
        require!(!outcome.payout_claimed, FutarchyError::PayoutAlreadyClaimed);
        require!(outcome.payout > 0, FutarchyError::NothingToClaim);

        outcome.payout_claimed = true;
        Ok(outcome.payout)
    }

    pub fn winner(&self) -> Result<u8> {
        self.winning_outcome.ok_or(FutarchyError::NotFinalized.into())
    }

    /// First half of the execution handoff.
    ///
    /// The returned ticket must be passed to [`Proposal::complete_execution`]
    /// or [`Proposal::abandon_execution`] before it goes out of scope.
    pub fn begin_execution(&self, proposal: Pubkey, now: i64) -> Result<ExecutionTicket> {
        self.require_state(ProposalState::Finalized)?;
        require!(now < self.execution_ends_at(), FutarchyError::ExecutionWindowClosed);

        let winner = self.winner()?;
        let outcome = &self.outcomes[winner as usize];
        require!(
            outcome.action_status == ActionStatus::Selected,
            FutarchyError::ActionNotExecutable
        );

        Ok(ExecutionTicket {
            proposal,
            outcome_index: winner,
            action_bundle: outcome.action_bundle,
            settled: false,
        })
    }

    pub fn complete_execution(&mut self, mut ticket: ExecutionTicket) -> Result<()> {
        self.settle_ticket(&mut ticket, ActionStatus::Executed, ProposalState::Executed)
    }

    pub fn abandon_execution(&mut self, mut ticket: ExecutionTicket) -> Result<()> {
        self.settle_ticket(&mut ticket, ActionStatus::Invalidated, ProposalState::Expired)
    }

    fn settle_ticket(
        &mut self,
        ticket: &mut ExecutionTicket,
        action: ActionStatus,
        state: ProposalState,
    ) -> Result<()> {
        // Mark first so a failed check below still drops quietly; the error
        // aborts the instruction either way.
        ticket.settled = true;

        require!(
            self.winning_outcome == Some(ticket.outcome_index),
            FutarchyError::TicketMismatch
        );
        self.transition(state)?;
        self.outcomes[ticket.outcome_index as usize].action_status = action;

        Ok(())
    }

    /// FINALIZED → EXPIRED once the execution window has passed.
    ///
    /// Returns `false` without changing anything before the deadline.
    pub fn expire(&mut self, now: i64) -> Result<bool> {
        self.require_state(ProposalState::Finalized)?;
        if now < self.execution_ends_at() {
            return Ok(false);
        }

        self.transition(ProposalState::Expired)?;
        let winner = self.winner()?;
        self.outcomes[winner as usize].action_status = ActionStatus::Invalidated;

        Ok(true)
    }
}

/// Single-use permission to run the winning action bundle.
///
/// Not `Clone`; it is consumed by value when completed or abandoned, and
/// dropping one unsettled panics, which aborts the transaction.
#[must_use = "an execution ticket must be completed or abandoned"]
#[derive(Debug)]
pub struct ExecutionTicket {
    proposal: Pubkey,
    outcome_index: u8,
    action_bundle: Pubkey,
    settled: bool,
}

impl ExecutionTicket {
    pub fn proposal(&self) -> Pubkey {
        self.proposal
    }

    pub fn outcome_index(&self) -> u8 {
        self.outcome_index
    }

    pub fn action_bundle(&self) -> Pubkey {
        self.action_bundle
    }
}

impl Drop for ExecutionTicket {
    fn drop(&mut self) {
        if !self.settled {
            panic!(
                "execution ticket for outcome {} of {} dropped unsettled",
                self.outcome_index, self.proposal
            );
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{finalized_proposal, proposal, trading_proposal};
    use anchor_lang::error::Error;

    #[test]
    fn test_transitions_are_monotonic() {
        use ProposalState::*;

        assert!(Pending.can_transition_to(Premarket));
        assert!(Premarket.can_transition_to(Review));
        assert!(Review.can_transition_to(Trading));
        assert!(Finalized.can_transition_to(Expired));

        assert!(!Trading.can_transition_to(Review));
        assert!(!Finalized.can_transition_to(Trading));
        assert!(!Executed.can_transition_to(Expired));
        assert!(!Finalized.can_transition_to(Finalized));
    }

    #[test]
    fn test_add_outcome_only_during_review() {
        let mut p = proposal(2);
        let spec = OutcomeSpec {
            description: "Buy back tokens".to_string(),
            action_bundle: Pubkey::new_unique(),
        };

        let index = p.add_outcome(10, spec.clone(), Pubkey::new_unique(), 500).unwrap();
        assert_eq!(index, 2);
        assert_eq!(p.fee_escrow, 1_000 + 500);

        let late = p.review_ends_at();
        assert_eq!(
            p.add_outcome(late, spec, Pubkey::new_unique(), 500).unwrap_err(),
            Error::from(FutarchyError::OutcomeWindowClosed)
        );
    }

    #[test]
    fn test_flip_log_tracks_leader_changes() {
        let mut p = trading_proposal(3, 1_000);
        assert_eq!(p.leader, Some(0));

        p.record_observation(1_010, 1, u128::MAX / 2).unwrap();
        assert_eq!(p.leader, Some(1));

        // same leader, no flip
        p.record_observation(1_020, 1, u128::MAX / 2 + 1).unwrap();
        p.record_observation(1_030, 2, u128::MAX).unwrap();
        assert_eq!(p.leader, Some(2));

        assert_eq!(p.flip_log, vec![1_010, 1_030]);
        assert_eq!(p.flips_since(1_020), 1);
    }

    #[test]
    fn test_finalize_sets_winner_once() {
        let mut p = trading_proposal(2, 0);
        p.finalize(500, vec![100, 200], 1).unwrap();

        assert_eq!(p.winning_outcome, Some(1));
        assert_eq!(p.outcomes[0].action_status, ActionStatus::Invalidated);
        assert_eq!(p.outcomes[1].action_status, ActionStatus::Selected);

        assert_eq!(
            p.finalize(600, vec![300, 100], 0).unwrap_err(),
            Error::from(FutarchyError::AlreadyFinalized)
        );
        assert_eq!(p.winning_outcome, Some(1));
        assert_eq!(p.final_twaps, vec![100, 200]);
    }

    #[test]
    fn test_payout_claimed_once_by_creator() {
        let mut p = finalized_proposal(1, 1_000);
        p.outcomes[1].payout = 1_250;
        let creator = p.outcomes[1].creator;

        assert_eq!(
            p.claim_payout(1, &Pubkey::new_unique()).unwrap_err(),
            Error::from(FutarchyError::Unauthorized)
        );
        assert_eq!(p.claim_payout(1, &creator).unwrap(), 1_250);
        assert_eq!(
            p.claim_payout(1, &creator).unwrap_err(),
            Error::from(FutarchyError::PayoutAlreadyClaimed)
        );
        assert_eq!(
            p.claim_payout(0, &creator).unwrap_err(),
            Error::from(FutarchyError::NothingToClaim)
        );
    }

    #[test]
    fn test_no_claims_before_finalization() {
        let mut p = trading_proposal(2, 0);
        let creator = p.outcomes[1].creator;
        assert_eq!(
            p.claim_payout(1, &creator).unwrap_err(),
            Error::from(FutarchyError::NotFinalized)
        );
    }

    #[test]
    fn test_execution_ticket_round_trip() {
        let key = Pubkey::new_unique();
        let mut p = finalized_proposal(1, 1_000);

        let ticket = p.begin_execution(key, 1_001).unwrap();
        assert_eq!(ticket.proposal(), key);
        assert_eq!(ticket.outcome_index(), 1);
        p.complete_execution(ticket).unwrap();

        assert_eq!(p.state, ProposalState::Executed);
        assert_eq!(p.outcomes[1].action_status, ActionStatus::Executed);
        assert!(p.begin_execution(key, 1_002).is_err());
    }

    #[test]
    fn test_abandoned_ticket_expires_proposal() {
        let mut p = finalized_proposal(1, 1_000);

        let ticket = p.begin_execution(Pubkey::new_unique(), 1_001).unwrap();
        p.abandon_execution(ticket).unwrap();

        assert_eq!(p.state, ProposalState::Expired);
        assert_eq!(p.outcomes[1].action_status, ActionStatus::Invalidated);
    }

    #[test]
    #[should_panic(expected = "dropped unsettled")]
    fn test_dropping_ticket_panics() {
        let p = finalized_proposal(1, 1_000);
        let ticket = p.begin_execution(Pubkey::new_unique(), 1_001).unwrap();
        drop(ticket);
    }

    #[test]
    fn test_execution_window() {
        let mut p = finalized_proposal(1, 1_000);
        let deadline = p.execution_ends_at();

        assert!(!p.expire(deadline - 1).unwrap());
        assert_eq!(p.state, ProposalState::Finalized);
        assert!(p.begin_execution(Pubkey::new_unique(), deadline).is_err());

        assert!(p.expire(deadline).unwrap());
        assert_eq!(p.state, ProposalState::Expired);
    }
}
