//! # Write-through TWAP Oracle
//!
//! Each market keeps a running integral of its *observation* over time:
//!
//! ```text
//! cumulative(t) = Σ observation_i × (t_{i+1} − t_i)
//!
//! twap(now, window) = (cumulative(now) − cumulative(now − window)) / window
//! ```
//!
//! ## Write-through
//!
//! Before any read or write the integral is first extended to the current
//! time with the *previous* observation. A reader therefore never sees a
//! value that is stale with respect to elapsed time, even if nobody traded.
//!
//! ## Clamped observations
//!
//! A raw pool price could be pushed far away by a single large trade. The
//! observation may only move `max_change_bps` of its previous value per
//! update, and updates are at least `min_update_interval_secs` apart, so an
//! attacker has to hold the price for many intervals to drag the average.
//! Prices recorded inside the interval only extend the integral. Clamping
//! never rejects the trade that produced the price.
//!
//! ## Start delay
//!
//! The integral starts `start_delay_secs` after the oracle is created. The
//! observation keeps following the pool during the delay, so the opening
//! burst of a market moves the price it starts integrating from but never
//! enters the average.
//!
//! ## Checkpoints
//!
//! Every observation change is checkpointed as `(timestamp, cumulative,
//! observation)`. Between checkpoints the observation is constant, so the
//! integral at any retained time can be rebuilt exactly. Checkpoints allow
//! windowed reads, a rewind to an earlier instant, and backfilling one
//! oracle's history from another. The full-lifetime average never needs
//! them: `cumulative` is zero at creation.

use anchor_lang::prelude::*;

use crate::error::FutarchyError;
use crate::MAX_BPS;

/// Number of observation changes retained per oracle
pub const MAX_CHECKPOINTS: usize = 64;

/// How an oracle turns raw prices into observations
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, InitSpace, Debug, Default)]
pub struct TwapConfig {
    /// Largest move of an observation per update, in basis points
    pub max_change_bps: u16,
    /// Shortest gap between two observation updates
    pub min_update_interval_secs: i64,
    /// Seconds after creation before the integral starts
    pub start_delay_secs: i64,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, InitSpace, Debug, Default)]
pub struct Checkpoint {
    pub timestamp: i64,
    /// Integral value at `timestamp`
    pub cumulative: u128,
    /// Observation in force from `timestamp` onward
    pub price: u128,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, PartialEq, Eq, InitSpace, Debug, Default)]
pub struct TwapOracle {
    /// Observation × seconds since `accumulates_from()`
    pub cumulative: u128,
    pub started_at: i64,
    pub last_updated: i64,
    /// When the observation last changed
    pub last_observed_at: i64,
    /// Latest clamped observation
    pub last_price: u128,
    /// Returned by `twap` until the first real observation
    pub seed_price: u128,
    pub config: TwapConfig,
    /// Whether a real price has ever been recorded
    pub observed: bool,
    #[max_len(64)]
    pub checkpoints: Vec<Checkpoint>,
}

impl TwapOracle {
    pub fn new(now: i64, seed_price: u128, config: TwapConfig) -> Self {
        Self {
            cumulative: 0,
            started_at: now,
            last_updated: now,
            last_observed_at: now,
            last_price: seed_price,
            seed_price,
            config,
            observed: false,
            checkpoints: vec![Checkpoint {
                timestamp: now,
                cumulative: 0,
                price: seed_price,
            }],
        }
    }

    /// First instant that counts towards the integral
    pub fn accumulates_from(&self) -> i64 {
        self.started_at.saturating_add(self.config.start_delay_secs)
    }

    /// Extend the integral to `now` using the previous observation
    pub fn accumulate(&mut self, now: i64) -> Result<()> {
        require_gte!(now, self.last_updated, FutarchyError::TimestampRegression);

        let from = self.last_updated.max(self.accumulates_from());
        let elapsed = (now - from).max(0) as u128;
        let weighted = self
            .last_price
            .checked_mul(elapsed)
            .ok_or(FutarchyError::MathOverflow)?;
        self.cumulative = self
            .cumulative
            .checked_add(weighted)
            .ok_or(FutarchyError::MathOverflow)?;
        self.last_updated = now;

        Ok(())
    }

    /// Record a raw price, clamped against the previous observation.
    ///
    /// The first observation is taken immediately; later ones only once
    /// `min_update_interval_secs` has passed since the last change. Returns
    /// the observation in force after the call.
    pub fn record(&mut self, now: i64, raw_price: u128) -> Result<u128> {
        require!(raw_price > 0, FutarchyError::InvalidPrice);
        self.accumulate(now)?;

        let interval = self.config.min_update_interval_secs.max(1);
        if self.observed && now < self.last_observed_at.saturating_add(interval) {
            return Ok(self.last_price);
        }

        let observation = self.clamp(raw_price);
        self.set_observation(now, observation);
        self.last_observed_at = now;

        Ok(observation)
    }

    /// Checkpoint the current observation at `now` without changing it
    pub fn checkpoint(&mut self, now: i64) -> Result<()> {
        self.accumulate(now)?;
        self.push_checkpoint(Checkpoint {
            timestamp: now,
            cumulative: self.cumulative,
            price: self.last_price,
        });
        Ok(())
    }

    /// Time-weighted average over the trailing `window` seconds.
    ///
    /// The window is clipped to the retained history and to the start of
    /// the integral. Before the first observation the seed price is returned.
    pub fn twap(&mut self, now: i64, window: i64) -> Result<u128> {
        self.accumulate(now)?;

        if !self.observed {
            return Ok(self.seed_price);
        }

        let start = now
            .saturating_sub(window.max(0))
            .max(self.oldest_timestamp())
            .max(self.accumulates_from())
            .min(now);
        let elapsed = now - start;
        if elapsed == 0 {
            return Ok(self.last_price);
        }

        let delta = self
            .cumulative
            .checked_sub(self.cumulative_at(start)?)
            .ok_or(FutarchyError::MathOverflow)?;

        Ok(delta / elapsed as u128)
    }

    /// Average over the oracle's whole integrated lifetime, independent of
    /// how many checkpoints are retained.
    ///
    /// Still inside the start delay the current observation is returned.
    pub fn average_since_start(&mut self, now: i64) -> Result<u128> {
        self.accumulate(now)?;

        let from = self.accumulates_from();
        if now <= from {
            return Ok(self.last_price);
        }

        Ok(self.cumulative / (now - from) as u128)
    }

    /// Integral value at `t`, rebuilt from checkpoints.
    ///
    /// Times before the oldest checkpoint read as the oldest checkpoint.
    pub fn cumulative_at(&self, t: i64) -> Result<u128> {
        require_gte!(self.last_updated, t, FutarchyError::OracleHistoryUnavailable);

        let Some(checkpoint) = self.checkpoint_at(t) else {
            return Ok(self.checkpoints.first().map_or(0, |c| c.cumulative));
        };

        let elapsed = (t - checkpoint.timestamp.max(self.accumulates_from())).max(0) as u128;
        checkpoint
            .price
            .checked_mul(elapsed)
            .and_then(|weighted| checkpoint.cumulative.checked_add(weighted))
            .ok_or(FutarchyError::MathOverflow.into())
    }

    /// Observation in force at `t`
    pub fn price_at(&self, t: i64) -> u128 {
        self.checkpoint_at(t)
            .or(self.checkpoints.first())
            .map_or(self.last_price, |c| c.price)
    }

    /// Restore the oracle to the instant `t`, discarding every later
    /// extension and checkpoint.
    pub fn rewind(&mut self, t: i64) -> Result<()> {
        require_gte!(t, self.oldest_timestamp(), FutarchyError::OracleHistoryUnavailable);

        let cumulative = self.cumulative_at(t)?;
        let price = self.price_at(t);

        self.checkpoints.retain(|c| c.timestamp <= t);
        self.cumulative = cumulative;
        self.last_price = price;
        self.last_updated = t;
        self.last_observed_at = self.last_observed_at.min(t);

        Ok(())
    }

    /// Extend this oracle from its last update to `to` with the whole
    /// integral of `source`, an oracle created at that same instant.
    ///
    /// The integral grows by exactly what `source` accumulated, plus its
    /// seed price over any start delay, so it is continuous at the
    /// hand-over point no matter how much of `source`'s history was pruned.
    /// Reads inside the gap see its average.
    pub fn backfill(&mut self, source: &TwapOracle, to: i64) -> Result<()> {
        let from = self.last_updated;
        require_gte!(to, from, FutarchyError::TimestampRegression);
        require_eq!(source.started_at, from, FutarchyError::OracleHistoryUnavailable);
        require_gte!(to, source.last_updated, FutarchyError::TimestampRegression);
        if to == from {
            return Ok(());
        }

        let mut source = source.clone();
        source.accumulate(to)?;

        let delayed = (source.accumulates_from().min(to) - from).max(0) as u128;
        let integral = source
            .seed_price
            .checked_mul(delayed)
            .and_then(|seeded| seeded.checked_add(source.cumulative))
            .ok_or(FutarchyError::MathOverflow)?;

        self.push_checkpoint(Checkpoint {
            timestamp: from,
            cumulative: self.cumulative,
            price: integral / (to - from) as u128,
        });
        self.cumulative = self
            .cumulative
            .checked_add(integral)
            .ok_or(FutarchyError::MathOverflow)?;
        self.last_updated = to;
        self.last_observed_at = to;
        self.set_observation(to, source.last_price);

        Ok(())
    }

    fn clamp(&self, raw_price: u128) -> u128 {
        let last = self.last_price;
        let max_delta = (last.saturating_mul(self.config.max_change_bps as u128) / MAX_BPS as u128).max(1);

        if raw_price > last {
            raw_price.min(last.saturating_add(max_delta))
        } else {
            raw_price.max(last.saturating_sub(max_delta))
        }
    }

    fn set_observation(&mut self, now: i64, observation: u128) {
        self.last_price = observation;
        self.observed = true;
        self.push_checkpoint(Checkpoint {
            timestamp: now,
            cumulative: self.cumulative,
            price: observation,
        });
    }

    fn push_checkpoint(&mut self, checkpoint: Checkpoint) {
        match self.checkpoints.last_mut() {
            Some(last) if last.timestamp == checkpoint.timestamp => *last = checkpoint,
            _ => {
                if self.checkpoints.len() == MAX_CHECKPOINTS {
                    self.checkpoints.remove(0);
                }
                self.checkpoints.push(checkpoint);
            }
        }
    }

    fn checkpoint_at(&self, t: i64) -> Option<&Checkpoint> {
        self.checkpoints.iter().rev().find(|c| c.timestamp <= t)
    }

    fn oldest_timestamp(&self) -> i64 {
        self.checkpoints.first().map_or(self.started_at, |c| c.timestamp)
    }
}

// ============================================================================
// TESTS
// ============================================================================
