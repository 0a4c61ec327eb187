//! Fee-free submission quotas
//!
//! A grant replaces whatever the member had left.

use anchor_lang::prelude::*;

use crate::error::FutarchyError;
use crate::state::{Dao, QuotaGrant};

#[event]
pub struct QuotaGranted {
    pub dao: Pubkey,
    pub member: Pubkey,
    pub remaining: u32,
}

#[derive(Accounts)]
#[instruction(member: Pubkey)]
pub struct GrantQuota<'info> {
    #[account(mut)]
    pub admin: Signer<'info>,

    #[account(has_one = admin @ FutarchyError::Unauthorized)]
    pub dao: Box<Account<'info, Dao>>,

    #[account(
        init_if_needed,
        payer = admin,
        space = 8 + QuotaGrant::INIT_SPACE,
        seeds = [QuotaGrant::SEED, dao.key().as_ref(), member.as_ref()],
        bump,
    )]
    pub quota: Account<'info, QuotaGrant>,

    pub system_program: Program<'info, System>,
}

impl<'info> GrantQuota<'info> {
    pub fn grant_quota(&mut self, member: Pubkey, count: u32, bumps: &GrantQuotaBumps) -> Result<()> {
        self.quota.set_inner(QuotaGrant {
            dao: self.dao.key(),
            member,
            remaining: count,
            bump: bumps.quota,
        });

        emit!(QuotaGranted {
            dao: self.dao.key(),
            member,
            remaining: count,
        });

        Ok(())
    }
}
