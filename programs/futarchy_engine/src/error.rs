//! Program error codes
//!
//! Every rejected call aborts the whole instruction, so none of these leave
//! partial state behind. Pool math failures live in [`crate::amm::AmmError`].

use anchor_lang::prelude::*;

#[error_code]
pub enum FutarchyError {
    // --- configuration & authority ---
    #[msg("DAO parameters are invalid")]
    InvalidParams,
    #[msg("Signer is not authorized for this action")]
    Unauthorized,
    #[msg("Text field exceeds its maximum length")]
    TextTooLong,

    // --- lifecycle ---
    #[msg("Proposal is not in the required state")]
    InvalidState,
    #[msg("Proposal state transition is not allowed")]
    IllegalTransition,
    #[msg("Proposal has already been finalized")]
    AlreadyFinalized,
    #[msg("Winning outcome is already set")]
    WinnerAlreadySet,
    #[msg("Proposal has not been finalized")]
    NotFinalized,
    #[msg("A proposal needs at least two outcomes")]
    TooFewOutcomes,
    #[msg("Proposal has the maximum number of outcomes")]
    TooManyOutcomes,
    #[msg("Outcomes can only be added during review")]
    OutcomeWindowClosed,
    #[msg("Outcome index is out of range")]
    InvalidOutcome,

    // --- admission queue ---
    #[msg("Admission queue is full")]
    QueueFull,
    #[msg("Admission queue is empty")]
    QueueEmpty,
    #[msg("Queued proposal is not in the admission queue")]
    QueueEntryNotFound,
    #[msg("Queued proposal is not next in line")]
    NotNextInLine,
    #[msg("The premarket slot is already reserved")]
    PremarketSlotTaken,
    #[msg("Premarket reservation opens closer to the trading deadline")]
    PremarketTooEarly,
    #[msg("Eviction grace period has not elapsed")]
    NotEvictable,
    #[msg("Maximum number of active proposals reached")]
    ActiveProposalLimit,
    #[msg("Bond is below the required minimum")]
    BondTooSmall,
    #[msg("No fee-free submissions remain for this member")]
    QuotaExhausted,

    // --- liquidity ---
    #[msg("Spot liquidity is locked to an active proposal")]
    SpotLiquidityLocked,
    #[msg("A previous split has not been reconciled")]
    SplitPending,
    #[msg("Split marker does not belong to this proposal")]
    SplitMismatch,
    #[msg("Not enough liquidity")]
    InsufficientLiquidity,
    #[msg("Treasury balance is too low")]
    InsufficientTreasury,

    // --- markets & positions ---
    #[msg("Conditional market is not trading")]
    MarketNotTrading,
    #[msg("Conditional market does not belong to this proposal")]
    MarketMismatch,
    #[msg("Every outcome market must be supplied in outcome order")]
    MissingMarkets,
    #[msg("Market account must be writable")]
    MarketNotWritable,
    #[msg("Trading period is closed")]
    TradingClosed,
    #[msg("Position balance is too low")]
    InsufficientBalance,
    #[msg("Amount must be greater than zero")]
    ZeroAmount,

    // --- execution & payouts ---
    #[msg("Execution window has closed")]
    ExecutionWindowClosed,
    #[msg("Winning action bundle is not executable")]
    ActionNotExecutable,
    #[msg("Execution ticket does not match this proposal")]
    TicketMismatch,
    #[msg("Nothing to claim")]
    NothingToClaim,
    #[msg("Payout has already been claimed")]
    PayoutAlreadyClaimed,

    // --- early resolution ---
    #[msg("Early resolution is disabled for this DAO")]
    EarlyResolutionDisabled,
    #[msg("Not enough trading time has elapsed")]
    ResolutionTooEarly,
    #[msg("Leading spread is below the configured minimum")]
    InsufficientSpread,
    #[msg("Leader changed too often within the flip window")]
    TooManyFlips,

    // --- oracle ---
    #[msg("Timestamp is earlier than the last oracle update")]
    TimestampRegression,
    #[msg("Requested time is outside the retained oracle history")]
    OracleHistoryUnavailable,
    #[msg("Price must be greater than zero")]
    InvalidPrice,

    #[msg("Arithmetic overflow")]
    MathOverflow,
}
