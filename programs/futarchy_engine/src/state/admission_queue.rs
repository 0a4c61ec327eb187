//! Admission Queue State
//!
//! Proposals wait here, bonded, until a trading slot opens. Entries are
//! kept sorted by bond (highest first) and then by submission order, so the
//! head is always the next proposal to activate.
//!
//! ```text
//!  submit ──▶ [ e0 ≥ e1 ≥ e2 ≥ … ]  ──── activate (head) ────▶ REVIEW
//!                 │                          ▲
//!                 └── reserve ──▶ [premarket]┘
//!
//!  any entry older than the grace period ──▶ evict (bond refunded)
//! ```

use anchor_lang::prelude::*;

use crate::error::FutarchyError;
use crate::state::{
    Outcome, OutcomeSpec, ProposalState, MAX_DESCRIPTION_LEN, MAX_OUTCOMES, MAX_TITLE_LEN,
};
use crate::MAX_QUEUE_CAPACITY;

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, InitSpace, Debug)]
pub struct QueueEntry {
    pub queued_proposal: Pubkey,
    pub proposer: Pubkey,
    /// Ordering key; the bond, or the minimum bond for quota submissions
    pub priority: u64,
    pub seq: u64,
    pub submitted_at: i64,
}

impl QueueEntry {
    fn ranks_before(&self, other: &QueueEntry) -> bool {
        self.priority > other.priority || (self.priority == other.priority && self.seq < other.seq)
    }
}

/// Seeds: ["admission_queue", dao]
#[account]
#[derive(InitSpace, Default)]
pub struct AdmissionQueue {
    pub dao: Pubkey,

    #[max_len(16)]
    pub entries: Vec<QueueEntry>,

    /// Entry reserved to activate next, without liquidity attached
    pub premarket: Option<QueueEntry>,

    /// PDA bump seed
    pub bump: u8,
}

impl AdmissionQueue {
    pub const SEED: &'static [u8] = b"admission_queue";

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.premarket.is_none()
    }

    pub fn enqueue(&mut self, entry: QueueEntry, max_len: u8) -> Result<()> {
        let capacity = (max_len as usize).min(MAX_QUEUE_CAPACITY);
        require!(self.entries.len() < capacity, FutarchyError::QueueFull);

        let position = self.entries.partition_point(|e| e.ranks_before(&entry));
        self.entries.insert(position, entry);

        Ok(())
    }

    /// Remove a waiting entry whose grace period has passed
    pub fn evict(&mut self, queued_proposal: &Pubkey, now: i64, grace_secs: i64) -> Result<QueueEntry> {
        let position = self
            .entries
            .iter()
            .position(|e| e.queued_proposal == *queued_proposal)
            .ok_or(FutarchyError::QueueEntryNotFound)?;

        let entry = &self.entries[position];
        require!(
            now >= entry.submitted_at.saturating_add(grace_secs),
            FutarchyError::NotEvictable
        );

        Ok(self.entries.remove(position))
    }

    /// Move the head entry into the premarket slot
    pub fn reserve_next(&mut self) -> Result<QueueEntry> {
        require!(self.premarket.is_none(), FutarchyError::PremarketSlotTaken);
        require!(!self.entries.is_empty(), FutarchyError::QueueEmpty);

        let entry = self.entries.remove(0);
        self.premarket = Some(entry);

        Ok(entry)
    }

    /// The entry to activate: the premarket reservation if any, else the head
    pub fn next(&self) -> Option<&QueueEntry> {
        self.premarket.as_ref().or(self.entries.first())
    }

    pub fn take_next(&mut self) -> Result<QueueEntry> {
        if let Some(entry) = self.premarket.take() {
            return Ok(entry);
        }
        require!(!self.entries.is_empty(), FutarchyError::QueueEmpty);
        Ok(self.entries.remove(0))
    }
}

/// A submitted proposal waiting for activation
///
/// Seeds: ["queued_proposal", dao, seq.to_le_bytes()]
#[account]
#[derive(InitSpace)]
pub struct QueuedProposal {
    pub dao: Pubkey,

    pub proposer: Pubkey,

    pub seq: u64,

    /// `Pending` or `Premarket`
    pub state: ProposalState,

    #[max_len(64)]
    pub title: String,

    /// Outcome 0 is the default "no change" outcome
    #[max_len(5)]
    pub outcomes: Vec<OutcomeSpec>,

    /// Paid into the fee vault; zero for quota submissions
    pub bond: u64,

    /// Split the spot pool instead of seeding from idle treasury reserves
    pub uses_shared_liquidity: bool,

    pub used_quota: bool,

    pub submitted_at: i64,

    /// PDA bump seed
    pub bump: u8,
}

impl QueuedProposal {
    pub const SEED: &'static [u8] = b"queued_proposal";

    pub fn validate_submission(title: &str, outcomes: &[OutcomeSpec]) -> Result<()> {
        require!(title.len() <= MAX_TITLE_LEN, FutarchyError::TextTooLong);
        require!(outcomes.len() >= 2, FutarchyError::TooFewOutcomes);
        require!(outcomes.len() <= MAX_OUTCOMES, FutarchyError::TooManyOutcomes);
        require!(
            outcomes
                .iter()
                .all(|o| o.description.len() <= MAX_DESCRIPTION_LEN),
            FutarchyError::TextTooLong
        );
        Ok(())
    }

    pub fn entry(&self, key: Pubkey, priority: u64) -> QueueEntry {
        QueueEntry {
            queued_proposal: key,
            proposer: self.proposer,
            priority,
            seq: self.seq,
            submitted_at: self.submitted_at,
        }
    }

    pub fn reserve(&mut self) -> Result<()> {
        require!(
            self.state.can_transition_to(ProposalState::Premarket),
            FutarchyError::IllegalTransition
        );
        self.state = ProposalState::Premarket;
        Ok(())
    }

    /// Outcomes for the activated proposal.
    ///
    /// Every outcome is credited to the proposer; the submission bond is
    /// carried by the proposer's own outcome (index 1).
    pub fn activate(&mut self) -> Result<Vec<Outcome>> {
        require!(
            self.state.can_transition_to(ProposalState::Review),
            FutarchyError::IllegalTransition
        );
        self.state = ProposalState::Review;

        self.outcomes
            .iter()
            .enumerate()
            .map(|(index, spec)| {
                let bond = if index == 1 { self.bond } else { 0 };
                Outcome::new(spec.clone(), self.proposer, bond)
            })
            .collect()
    }
}
