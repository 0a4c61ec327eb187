//! Admin parameter updates
//!
//! Live proposals keep the timing and threshold values snapshotted at their
//! activation; only later proposals see the new values.

use anchor_lang::prelude::*;

use crate::error::FutarchyError;
use crate::state::{Dao, DaoParams, SpotPool};

#[event]
pub struct DaoUpdated {
    pub dao: Pubkey,
    pub admin: Pubkey,
    pub action_dispatcher: Pubkey,
}

#[derive(Accounts)]
pub struct UpdateDao<'info> {
    pub admin: Signer<'info>,

    #[account(mut, has_one = admin @ FutarchyError::Unauthorized)]
    pub dao: Box<Account<'info, Dao>>,

    #[account(
        mut,
        seeds = [SpotPool::SEED, dao.key().as_ref()],
        bump = spot_pool.bump,
    )]
    pub spot_pool: Box<Account<'info, SpotPool>>,
}

impl<'info> UpdateDao<'info> {
    pub fn update_dao(
        &mut self,
        params: DaoParams,
        new_admin: Option<Pubkey>,
        action_dispatcher: Option<Pubkey>,
    ) -> Result<()> {
        params.validate()?;

        self.spot_pool.fee_bps = params.spot_fee_bps;
        self.spot_pool.oracle.config = params.spot_oracle();

        self.dao.params = params;
        if let Some(admin) = new_admin {
            self.dao.admin = admin;
        }
        if let Some(dispatcher) = action_dispatcher {
            self.dao.action_dispatcher = dispatcher;
        }

        emit!(DaoUpdated {
            dao: self.dao.key(),
            admin: self.dao.admin,
            action_dispatcher: self.dao.action_dispatcher,
        });

        Ok(())
    }
}
