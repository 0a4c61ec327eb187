//! Treasury funding
//!
//! The treasury pays winner bonuses and keeper rewards. Anyone may top it up.

use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

use crate::error::FutarchyError;
use crate::instructions::shared::transfer_in;
use crate::state::Dao;

#[event]
pub struct TreasuryFunded {
    pub dao: Pubkey,
    pub funder: Pubkey,
    pub amount: u64,
    pub treasury_balance: u64,
}

#[derive(Accounts)]
pub struct FundTreasury<'info> {
    pub funder: Signer<'info>,

    #[account(mut, has_one = stable_mint, has_one = fee_vault)]
    pub dao: Box<Account<'info, Dao>>,

    pub stable_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(
        mut,
        token::mint = stable_mint,
        token::authority = funder,
    )]
    pub funder_stable: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(mut)]
    pub fee_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    pub token_program: Interface<'info, TokenInterface>,
}

impl<'info> FundTreasury<'info> {
    pub fn fund_treasury(&mut self, amount: u64) -> Result<()> {
        require!(amount > 0, FutarchyError::ZeroAmount);

        transfer_in(
            &self.token_program,
            &self.stable_mint,
            &self.funder_stable,
            &self.fee_vault,
            &self.funder,
            amount,
        )?;
        self.dao.credit_treasury(amount)?;

        emit!(TreasuryFunded {
            dao: self.dao.key(),
            funder: self.funder.key(),
            amount,
            treasury_balance: self.dao.treasury_balance,
        });

        Ok(())
    }
}
