//! DAO Configuration & Treasury
//!
//! One `Dao` account per futarchic organisation. It owns the token vaults,
//! carries every tunable parameter and tracks the treasury's share of the
//! fee vault.

use anchor_lang::prelude::*;

use crate::amm::Reserves;
use crate::error::FutarchyError;
use crate::oracle::{TwapConfig, MAX_CHECKPOINTS};
use crate::{MAX_BPS, MAX_QUEUE_CAPACITY};

/// Signer seeds for a DAO PDA.
///
/// ```ignore
/// let seeds = dao_seeds!(self.dao);
/// let signer = &[&seeds[..]];
/// ```
#[macro_export]
macro_rules! dao_seeds {
    ($dao:expr) => {
        &[
            $crate::state::Dao::SEED,
            $dao.creator.as_ref(),
            &$dao.nonce.to_le_bytes(),
            &[$dao.bump],
        ]
    };
}

/// A futarchic organisation
///
/// Seeds: ["dao", creator, nonce.to_le_bytes()]
#[account]
#[derive(InitSpace)]
pub struct Dao {
    /// Wallet that created the DAO (part of the PDA seeds)
    pub creator: Pubkey,

    /// Lets one creator run several DAOs
    pub nonce: u64,

    /// May change parameters, grant quotas, manage liquidity and abandon
    /// execution of a winning action
    pub admin: Pubkey,

    /// Governance token priced by every market
    pub asset_mint: Pubkey,

    /// Quote token; bonds and rewards are also paid in it
    pub stable_mint: Pubkey,

    /// Holds asset liquidity and trader collateral
    pub asset_vault: Pubkey,

    /// Holds stable liquidity and trader collateral
    pub stable_vault: Pubkey,

    /// Holds bonds, unclaimed payouts and the treasury balance
    pub fee_vault: Pubkey,

    /// Program that runs a winning action bundle
    pub action_dispatcher: Pubkey,

    pub params: DaoParams,

    /// Proposals activated so far (next proposal number)
    pub proposal_count: u64,

    /// Proposals submitted so far (next queue sequence number)
    pub queued_count: u64,

    /// Proposals between activation and finalization
    pub active_proposals: u8,

    /// Part of the fee vault owned by the DAO itself
    pub treasury_balance: u64,

    /// Treasury liquidity used to seed proposals that do not share the spot pool
    pub idle_reserves: Reserves,

    /// PDA bump seed
    pub bump: u8,
}

impl Dao {
    pub const SEED: &'static [u8] = b"dao";
    pub const ASSET_VAULT_SEED: &'static [u8] = b"asset_vault";
    pub const STABLE_VAULT_SEED: &'static [u8] = b"stable_vault";
    pub const FEE_VAULT_SEED: &'static [u8] = b"fee_vault";

    /// Take up to `amount` from the treasury, returning what was taken
    pub fn draw_treasury(&mut self, amount: u64) -> u64 {
        let paid = amount.min(self.treasury_balance);
        self.treasury_balance -= paid;
        paid
    }

    pub fn credit_treasury(&mut self, amount: u64) -> Result<()> {
        self.treasury_balance = self
            .treasury_balance
            .checked_add(amount)
            .ok_or(FutarchyError::MathOverflow)?;
        Ok(())
    }

    pub fn release_active_slot(&mut self) {
        self.active_proposals = self.active_proposals.saturating_sub(1);
    }
}

/// Tunable parameters, validated on every write
#[derive(AnchorSerialize, AnchorDeserialize, Clone, PartialEq, Eq, InitSpace, Debug)]
pub struct DaoParams {
    /// Time between activation and the start of trading
    pub review_period_secs: i64,
    pub trading_period_secs: i64,
    /// How long a winning action stays executable after finalization
    pub execution_window_secs: i64,

    /// How far a challenger must beat the default outcome, e.g. 5_000 = 1.5×
    pub pass_threshold_bps: u16,

    pub max_active_proposals: u8,
    pub max_queue_len: u8,
    /// Age after which a queued proposal may be evicted by anyone
    pub eviction_grace_secs: i64,
    /// How long before an active proposal's trading deadline the next one
    /// may be reserved into the premarket slot
    pub premarket_lead_secs: i64,

    /// Minimum bond to submit a proposal
    pub proposal_bond: u64,
    /// Bond to add an outcome during review
    pub outcome_bond: u64,
    /// Paid from the treasury to a winning challenger's creator
    pub winner_bonus: u64,

    pub conditional_fee_bps: u16,
    pub spot_fee_bps: u16,

    /// Share of spot reserves split into conditional markets
    pub shared_liquidity_bps: u16,
    /// Stable side seeded from idle treasury reserves for non-shared proposals
    pub standalone_stable_liquidity: u64,

    pub twap_max_change_bps: u16,
    /// Shortest gap between two observation updates of any oracle
    pub twap_min_update_interval_secs: i64,
    /// How long after trading starts a conditional market's TWAP begins
    pub twap_start_delay_secs: i64,
    /// Trailing spot window read as the seed price of new markets
    pub twap_seed_window_secs: i64,
    /// Seed price of the spot oracle before its first observation
    pub twap_initial_price: u128,

    pub early_resolution: EarlyResolutionConfig,
}

/// Conditions under which trading may end before its deadline
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, InitSpace, Debug, Default)]
pub struct EarlyResolutionConfig {
    pub enabled: bool,
    pub min_elapsed_secs: i64,
    /// Leader over runner-up, in basis points of the runner-up
    pub min_spread_bps: u32,
    pub flip_window_secs: i64,
    /// Leader changes tolerated at exactly `min_spread_bps`
    pub max_flips: u8,
    /// Every further multiple of this spread tolerates one more flip
    pub spread_per_extra_flip_bps: u32,
    /// Paid from the treasury to whoever triggers early resolution
    pub keeper_reward: u64,
}

impl DaoParams {
    pub fn validate(&self) -> Result<()> {
        require!(self.review_period_secs >= 0, FutarchyError::InvalidParams);
        require!(self.trading_period_secs > 0, FutarchyError::InvalidParams);
        require!(self.execution_window_secs > 0, FutarchyError::InvalidParams);

        require!(self.max_active_proposals >= 1, FutarchyError::InvalidParams);
        require!(
            self.max_queue_len >= 1 && self.max_queue_len as usize <= MAX_QUEUE_CAPACITY,
            FutarchyError::InvalidParams
        );
        require!(self.eviction_grace_secs > 0, FutarchyError::InvalidParams);
        require!(
            self.premarket_lead_secs >= 0 && self.premarket_lead_secs < self.trading_period_secs,
            FutarchyError::InvalidParams
        );

        require!(self.conditional_fee_bps < MAX_BPS, FutarchyError::InvalidParams);
        require!(self.spot_fee_bps < MAX_BPS, FutarchyError::InvalidParams);
        require!(
            self.shared_liquidity_bps > 0 && self.shared_liquidity_bps <= MAX_BPS,
            FutarchyError::InvalidParams
        );

        require!(
            self.twap_max_change_bps > 0 && self.twap_max_change_bps <= MAX_BPS,
            FutarchyError::InvalidParams
        );
        require!(self.twap_min_update_interval_secs > 0, FutarchyError::InvalidParams);
        require!(
            self.twap_start_delay_secs >= 0 && self.twap_start_delay_secs < self.trading_period_secs,
            FutarchyError::InvalidParams
        );
        // the seed window must fit in the spot oracle's retained history
        require!(
            self.twap_seed_window_secs > 0
                && self.twap_seed_window_secs
                    <= self
                        .twap_min_update_interval_secs
                        .saturating_mul(MAX_CHECKPOINTS as i64 - 2),
            FutarchyError::InvalidParams
        );
        require!(self.twap_initial_price > 0, FutarchyError::InvalidParams);

        let early = &self.early_resolution;
        if early.enabled {
            require!(
                early.min_elapsed_secs > 0 && early.min_elapsed_secs < self.trading_period_secs,
                FutarchyError::InvalidParams
            );
            require!(early.flip_window_secs > 0, FutarchyError::InvalidParams);
            require!(early.spread_per_extra_flip_bps > 0, FutarchyError::InvalidParams);
        }

        Ok(())
    }

    /// Oracle settings of a freshly seeded conditional market
    pub fn market_oracle(&self) -> TwapConfig {
        TwapConfig {
            max_change_bps: self.twap_max_change_bps,
            min_update_interval_secs: self.twap_min_update_interval_secs,
            start_delay_secs: self.twap_start_delay_secs,
        }
    }

    /// The spot oracle never waits: its integral is continuous across splits
    pub fn spot_oracle(&self) -> TwapConfig {
        TwapConfig {
            start_delay_secs: 0,
            ..self.market_oracle()
        }
    }
}

/// Fee-free submissions granted to a member by the admin
///
/// Seeds: ["quota", dao, member]
#[account]
#[derive(InitSpace)]
pub struct QuotaGrant {
    pub dao: Pubkey,
    pub member: Pubkey,
    pub remaining: u32,
    pub bump: u8,
}

impl QuotaGrant {
    pub const SEED: &'static [u8] = b"quota";

    pub fn consume(&mut self) -> Result<()> {
        require!(self.remaining > 0, FutarchyError::QuotaExhausted);
        self.remaining -= 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::params;
    use anchor_lang::error::Error;

    #[test]
    fn test_default_fixture_is_valid() {
        assert!(params().validate().is_ok());
    }

    #[test]
    fn test_rejects_oversized_queue() {
        let mut p = params();
        p.max_queue_len = (MAX_QUEUE_CAPACITY + 1) as u8;
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_rejects_lead_longer_than_trading() {
        let mut p = params();
        p.premarket_lead_secs = p.trading_period_secs;
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_rejects_unthrottled_oracle() {
        let mut p = params();
        p.twap_min_update_interval_secs = 0;
        assert_eq!(
            p.validate().unwrap_err(),
            Error::from(FutarchyError::InvalidParams)
        );
    }

    #[test]
    fn test_seed_window_fits_retained_history() {
        let mut p = params();
        p.twap_seed_window_secs = p.twap_min_update_interval_secs * MAX_CHECKPOINTS as i64;
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_start_delay_bounded_by_trading_period() {
        let mut p = params();
        p.twap_start_delay_secs = p.trading_period_secs;
        assert!(p.validate().is_err());

        p.twap_start_delay_secs = -1;
        assert!(p.validate().is_err());

        p.twap_start_delay_secs = 600;
        assert!(p.validate().is_ok());
        assert_eq!(p.market_oracle().start_delay_secs, 600);
        assert_eq!(p.spot_oracle().start_delay_secs, 0);
    }

    #[test]
    fn test_early_resolution_checked_only_when_enabled() {
        let mut p = params();
        p.early_resolution.spread_per_extra_flip_bps = 0;
        assert!(p.validate().is_err());

        p.early_resolution.enabled = false;
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_quota_runs_out() {
        let mut grant = QuotaGrant {
            dao: Pubkey::default(),
            member: Pubkey::default(),
            remaining: 1,
            bump: 0,
        };
        grant.consume().unwrap();
        assert!(grant.consume().is_err());
    }

    #[test]
    fn test_treasury_draw_is_bounded() {
        let mut dao = crate::test_fixtures::dao();
        dao.treasury_balance = 40;
        assert_eq!(dao.draw_treasury(100), 40);
        assert_eq!(dao.treasury_balance, 0);
    }
}
