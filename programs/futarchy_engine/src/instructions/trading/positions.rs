//! Conditional positions
//!
//! Real collateral enters and leaves a proposal only through positions:
//!
//! - `split_position` locks tokens and credits the same amount in every
//!   outcome.
//! - `merge_position` burns one unit of every outcome per unit returned.
//! - `redeem_position` pays out the winning outcome's balances after
//!   finalization; every other balance is worthless.

use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

use crate::amm::Reserves;
use crate::error::FutarchyError;
use crate::instructions::shared::{transfer_in, transfer_out};
use crate::state::{ConditionalPosition, Dao, Proposal, ProposalState};

#[event]
pub struct PositionSplit {
    pub proposal: Pubkey,
    pub owner: Pubkey,
    pub asset_amount: u64,
    pub stable_amount: u64,
}

#[event]
pub struct PositionMerged {
    pub proposal: Pubkey,
    pub owner: Pubkey,
    pub asset_amount: u64,
    pub stable_amount: u64,
}

#[event]
pub struct PositionRedeemed {
    pub proposal: Pubkey,
    pub owner: Pubkey,
    pub winning_outcome: u8,
    pub asset_amount: u64,
    pub stable_amount: u64,
}

#[derive(Accounts)]
pub struct SplitPosition<'info> {
    #[account(mut)]
    pub owner: Signer<'info>,

    #[account(
        has_one = asset_mint,
        has_one = stable_mint,
        has_one = asset_vault,
        has_one = stable_vault,
    )]
    pub dao: Box<Account<'info, Dao>>,

    #[account(mut, has_one = dao)]
    pub proposal: Box<Account<'info, Proposal>>,

    #[account(
        init_if_needed,
        payer = owner,
        space = 8 + ConditionalPosition::INIT_SPACE,
        seeds = [ConditionalPosition::SEED, proposal.key().as_ref(), owner.key().as_ref()],
        bump,
    )]
    pub position: Box<Account<'info, ConditionalPosition>>,

    pub asset_mint: Box<InterfaceAccount<'info, Mint>>,
    pub stable_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(mut, token::mint = asset_mint, token::authority = owner)]
    pub owner_asset: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(mut, token::mint = stable_mint, token::authority = owner)]
    pub owner_stable: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(mut)]
    pub asset_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(mut)]
    pub stable_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    pub token_program: Interface<'info, TokenInterface>,
    pub system_program: Program<'info, System>,
}

impl<'info> SplitPosition<'info> {
    pub fn split_position(
        &mut self,
        asset_amount: u64,
        stable_amount: u64,
        bumps: &SplitPositionBumps,
    ) -> Result<()> {
        let amount = Reserves::new(asset_amount, stable_amount);
        require!(!amount.is_zero(), FutarchyError::ZeroAmount);
        let now = Clock::get()?.unix_timestamp;
        require!(self.proposal.is_trading_open(now), FutarchyError::TradingClosed);

        if self.position.owner == Pubkey::default() {
            self.position.proposal = self.proposal.key();
            self.position.owner = self.owner.key();
            self.position.bump = bumps.position;
        }
        self.position.ensure_outcomes(self.proposal.outcome_count());
        self.position.split(amount)?;
        self.proposal.collateral.add(amount)?;

        transfer_in(
            &self.token_program,
            &self.asset_mint,
            &self.owner_asset,
            &self.asset_vault,
            &self.owner,
            asset_amount,
        )?;
        transfer_in(
            &self.token_program,
            &self.stable_mint,
            &self.owner_stable,
            &self.stable_vault,
            &self.owner,
            stable_amount,
        )?;

        emit!(PositionSplit {
            proposal: self.proposal.key(),
            owner: self.owner.key(),
            asset_amount,
            stable_amount,
        });

        Ok(())
    }
}

#[derive(Accounts)]
pub struct SettlePosition<'info> {
    pub owner: Signer<'info>,

    #[account(
        has_one = asset_mint,
        has_one = stable_mint,
        has_one = asset_vault,
        has_one = stable_vault,
    )]
    pub dao: Box<Account<'info, Dao>>,

    #[account(has_one = dao)]
    pub proposal: Box<Account<'info, Proposal>>,

    #[account(
        mut,
        has_one = owner,
        has_one = proposal,
        seeds = [ConditionalPosition::SEED, proposal.key().as_ref(), owner.key().as_ref()],
        bump = position.bump,
    )]
    pub position: Box<Account<'info, ConditionalPosition>>,

    pub asset_mint: Box<InterfaceAccount<'info, Mint>>,
    pub stable_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(mut, token::mint = asset_mint, token::authority = owner)]
    pub owner_asset: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(mut, token::mint = stable_mint, token::authority = owner)]
    pub owner_stable: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(mut)]
    pub asset_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(mut)]
    pub stable_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    pub token_program: Interface<'info, TokenInterface>,
}

impl<'info> SettlePosition<'info> {
    /// Return collateral while the proposal is still undecided
    pub fn merge_position(&mut self, asset_amount: u64, stable_amount: u64) -> Result<()> {
        let amount = Reserves::new(asset_amount, stable_amount);
        require!(!amount.is_zero(), FutarchyError::ZeroAmount);
        self.proposal.require_state(ProposalState::Trading)?;

        self.position.merge(amount)?;
        self.pay_out(amount)?;

        emit!(PositionMerged {
            proposal: self.proposal.key(),
            owner: self.owner.key(),
            asset_amount,
            stable_amount,
        });

        Ok(())
    }

    pub fn redeem_position(&mut self) -> Result<Reserves> {
        require!(self.proposal.is_settled(), FutarchyError::NotFinalized);
        let winner = self.proposal.winner()?;

        let payout = self.position.redeem(winner)?;
        require!(!payout.is_zero(), FutarchyError::NothingToClaim);
        self.pay_out(payout)?;

        emit!(PositionRedeemed {
            proposal: self.proposal.key(),
            owner: self.owner.key(),
            winning_outcome: winner,
            asset_amount: payout.asset,
            stable_amount: payout.stable,
        });

        Ok(payout)
    }

    fn pay_out(&self, amount: Reserves) -> Result<()> {
        transfer_out(
            &self.token_program,
            &self.asset_mint,
            &self.asset_vault,
            &self.owner_asset,
            &self.dao,
            amount.asset,
        )?;
        transfer_out(
            &self.token_program,
            &self.stable_mint,
            &self.stable_vault,
            &self.owner_stable,
            &self.dao,
            amount.stable,
        )
    }
}
