//! Spot market trading
//!
//! Swaps real tokens against the DAO's spot pool. Every swap feeds the
//! post-trade price into the spot oracle. Trading is frozen while part of
//! the pool is split into a proposal's conditional markets.

use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

use crate::amm::{AmmError, SwapDirection};
use crate::instructions::shared::{transfer_in, transfer_out};
use crate::state::{Dao, SpotPool};

#[event]
pub struct SpotSwapped {
    pub dao: Pubkey,
    pub trader: Pubkey,
    pub direction: SwapDirection,
    pub amount_in: u64,
    pub amount_out: u64,
    pub observation: u128,
}

#[derive(Accounts)]
pub struct SpotSwap<'info> {
    pub trader: Signer<'info>,

    #[account(
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

    #[account(mut, token::mint = asset_mint, token::authority = trader)]
    pub trader_asset: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(mut, token::mint = stable_mint, token::authority = trader)]
    pub trader_stable: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(mut)]
    pub asset_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(mut)]
    pub stable_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    pub token_program: Interface<'info, TokenInterface>,
}

impl<'info> SpotSwap<'info> {
    pub fn spot_swap(
        &mut self,
        amount_in: u64,
        direction: SwapDirection,
        min_amount_out: u64,
    ) -> Result<u64> {
        let now = Clock::get()?.unix_timestamp;

        let amount_out = self.spot_pool.swap(now, amount_in, direction)?;
        require_gte!(amount_out, min_amount_out, AmmError::SlippageExceeded);

        match direction {
            SwapDirection::Buy => {
                transfer_in(
                    &self.token_program,
                    &self.stable_mint,
                    &self.trader_stable,
                    &self.stable_vault,
                    &self.trader,
                    amount_in,
                )?;
                transfer_out(
                    &self.token_program,
                    &self.asset_mint,
                    &self.asset_vault,
                    &self.trader_asset,
                    &self.dao,
                    amount_out,
                )?;
            }
            SwapDirection::Sell => {
                transfer_in(
                    &self.token_program,
                    &self.asset_mint,
                    &self.trader_asset,
                    &self.asset_vault,
                    &self.trader,
                    amount_in,
                )?;
                transfer_out(
                    &self.token_program,
                    &self.stable_mint,
                    &self.stable_vault,
                    &self.trader_stable,
                    &self.dao,
                    amount_out,
                )?;
            }
        }

        emit!(SpotSwapped {
            dao: self.dao.key(),
            trader: self.trader.key(),
            direction,
            amount_in,
            amount_out,
            observation: self.spot_pool.oracle.last_price,
        });

        Ok(amount_out)
    }
}
