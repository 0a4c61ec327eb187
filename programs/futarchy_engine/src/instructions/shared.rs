//! Helpers shared by instruction handlers
//!
//! Token movement between users and the DAO vaults, and loading the
//! per-outcome market accounts that finalization-style instructions take as
//! remaining accounts.

use anchor_lang::prelude::*;
use anchor_spl::token_interface::{
    transfer_checked, Mint, TokenAccount, TokenInterface, TransferChecked,
};

use crate::dao_seeds;
use crate::error::FutarchyError;
use crate::state::{ConditionalMarket, Dao};

/// Move `amount` from a user's token account into a DAO vault
pub fn transfer_in<'info>(
    token_program: &Interface<'info, TokenInterface>,
    mint: &InterfaceAccount<'info, Mint>,
    from: &InterfaceAccount<'info, TokenAccount>,
    to: &InterfaceAccount<'info, TokenAccount>,
    authority: &Signer<'info>,
    amount: u64,
) -> Result<()> {
    if amount == 0 {
        return Ok(());
    }

    transfer_checked(
        CpiContext::new(
            token_program.to_account_info(),
            TransferChecked {
                from: from.to_account_info(),
                mint: mint.to_account_info(),
                to: to.to_account_info(),
                authority: authority.to_account_info(),
            },
        ),
        amount,
        mint.decimals,
    )
}

/// Move `amount` out of a DAO vault, signed by the DAO PDA
pub fn transfer_out<'info>(
    token_program: &Interface<'info, TokenInterface>,
    mint: &InterfaceAccount<'info, Mint>,
    vault: &InterfaceAccount<'info, TokenAccount>,
    to: &InterfaceAccount<'info, TokenAccount>,
    dao: &Account<'info, Dao>,
    amount: u64,
) -> Result<()> {
    if amount == 0 {
        return Ok(());
    }

    let seeds = dao_seeds!(dao);
    let signer = &[&seeds[..]];

    transfer_checked(
        CpiContext::new_with_signer(
            token_program.to_account_info(),
            TransferChecked {
                from: vault.to_account_info(),
                mint: mint.to_account_info(),
                to: to.to_account_info(),
                authority: dao.to_account_info(),
            },
            signer,
        ),
        amount,
        mint.decimals,
    )
}

/// Deserialize every outcome market of `proposal` from the remaining
/// accounts. They must be writable and passed in outcome order.
pub fn load_markets<'info>(
    accounts: &'info [AccountInfo<'info>],
    proposal: Pubkey,
    outcome_count: usize,
) -> Result<Vec<Account<'info, ConditionalMarket>>> {
    require_eq!(accounts.len(), outcome_count, FutarchyError::MissingMarkets);

    accounts
        .iter()
        .map(|info| {
            require!(info.is_writable, FutarchyError::MarketNotWritable);
            let market = Account::<ConditionalMarket>::try_from(info)?;
            require_keys_eq!(market.proposal, proposal, FutarchyError::MarketMismatch);
            Ok(market)
        })
        .collect()
}

/// Write market state back; remaining accounts are not exited by Anchor
pub fn persist_markets(markets: &[Account<'_, ConditionalMarket>]) -> Result<()> {
    for market in markets {
        market.exit(&crate::ID)?;
    }
    Ok(())
}
