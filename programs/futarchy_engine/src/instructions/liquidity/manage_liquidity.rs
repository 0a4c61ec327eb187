//! Admin liquidity management
//!
//! The DAO admin is the only liquidity provider. Tokens always sit in the
//! DAO's asset and stable vaults; the bucket decides which ledger they are
//! booked against:
//!
//! - `Spot`: the spot pool's reserves (rejected while a split is pending)
//! - `Treasury`: idle reserves that seed proposals not sharing the spot pool

use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

use crate::amm::Reserves;
use crate::error::FutarchyError;
use crate::instructions::shared::{transfer_in, transfer_out};
use crate::state::{Dao, SpotPool};

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub enum LiquidityBucket {
    Spot,
    Treasury,
}

#[event]
pub struct LiquidityDeposited {
    pub dao: Pubkey,
    pub bucket: LiquidityBucket,
    pub asset_amount: u64,
    pub stable_amount: u64,
}

#[event]
pub struct LiquidityWithdrawn {
    pub dao: Pubkey,
    pub bucket: LiquidityBucket,
    pub asset_amount: u64,
    pub stable_amount: u64,
}

#[derive(Accounts)]
pub struct ManageLiquidity<'info> {
    pub admin: Signer<'info>,

    #[account(
        mut,
        has_one = admin @ FutarchyError::Unauthorized,
        has_one = asset_mint,
        has_one = stable_mint,
        has_one = asset_vault,
        has_one = stable_vault,
    )]
    pub dao: Box<Account<'info, Dao>>,

    #[account(
        mut,
        seeds = [SpotPool::SEED, dao.key().as_ref()],
        bump = spot_pool.bump,
    )]
    pub spot_pool: Box<Account<'info, SpotPool>>,

    pub asset_mint: Box<InterfaceAccount<'info, Mint>>,
    pub stable_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(mut, token::mint = asset_mint, token::authority = admin)]
    pub admin_asset: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(mut, token::mint = stable_mint, token::authority = admin)]
    pub admin_stable: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(mut)]
    pub asset_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(mut)]
    pub stable_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    pub token_program: Interface<'info, TokenInterface>,
}

impl<'info> ManageLiquidity<'info> {
    pub fn deposit_liquidity(
        &mut self,
        bucket: LiquidityBucket,
        asset_amount: u64,
        stable_amount: u64,
    ) -> Result<()> {
        let amount = Reserves::new(asset_amount, stable_amount);
        require!(!amount.is_zero(), FutarchyError::ZeroAmount);
        let now = Clock::get()?.unix_timestamp;

        match bucket {
            LiquidityBucket::Spot => self.spot_pool.deposit(now, amount)?,
            LiquidityBucket::Treasury => self.dao.idle_reserves.add(amount)?,
        }

        transfer_in(
            &self.token_program,
            &self.asset_mint,
            &self.admin_asset,
            &self.asset_vault,
            &self.admin,
            asset_amount,
        )?;
        transfer_in(
            &self.token_program,
            &self.stable_mint,
            &self.admin_stable,
            &self.stable_vault,
            &self.admin,
            stable_amount,
        )?;

        emit!(LiquidityDeposited {
            dao: self.dao.key(),
            bucket,
            asset_amount,
            stable_amount,
        });

        Ok(())
    }

    pub fn withdraw_liquidity(
        &mut self,
        bucket: LiquidityBucket,
        asset_amount: u64,
        stable_amount: u64,
    ) -> Result<()> {
        let amount = Reserves::new(asset_amount, stable_amount);
        require!(!amount.is_zero(), FutarchyError::ZeroAmount);
        let now = Clock::get()?.unix_timestamp;

        match bucket {
            LiquidityBucket::Spot => self.spot_pool.withdraw(now, amount)?,
            LiquidityBucket::Treasury => self.dao.idle_reserves.remove(amount)?,
        }

        transfer_out(
            &self.token_program,
            &self.asset_mint,
            &self.asset_vault,
            &self.admin_asset,
            &self.dao,
            asset_amount,
        )?;
        transfer_out(
            &self.token_program,
            &self.stable_mint,
            &self.stable_vault,
            &self.admin_stable,
            &self.dao,
            stable_amount,
        )?;

        emit!(LiquidityWithdrawn {
            dao: self.dao.key(),
            bucket,
            asset_amount,
            stable_amount,
        });

        Ok(())
    }
}
