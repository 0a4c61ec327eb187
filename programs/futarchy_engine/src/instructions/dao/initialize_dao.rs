//! DAO Creation
//!
//! Split into two steps to stay inside the BPF stack frame:
//!
//! Step 1: InitializeDao - DAO account, spot pool and admission queue.
//! Step 2: InitializeDaoVaults - asset, stable and fee vaults owned by the DAO.

use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

use crate::amm::Reserves;
use crate::oracle::TwapOracle;
use crate::state::{AdmissionQueue, Dao, DaoParams, SpotPool};

// =============================================================================
// STEP 1: DAO STATE
// =============================================================================

#[event]
pub struct DaoInitialized {
    pub dao: Pubkey,
    pub creator: Pubkey,
    pub asset_mint: Pubkey,
    pub stable_mint: Pubkey,
    pub action_dispatcher: Pubkey,
}

#[derive(Accounts)]
#[instruction(nonce: u64)]
pub struct InitializeDao<'info> {
    #[account(mut)]
    pub creator: Signer<'info>,

    #[account(
        init,
        payer = creator,
        space = 8 + Dao::INIT_SPACE,
        seeds = [Dao::SEED, creator.key().as_ref(), nonce.to_le_bytes().as_ref()],
        bump,
    )]
    pub dao: Box<Account<'info, Dao>>,

    #[account(
        init,
        payer = creator,
        space = 8 + SpotPool::INIT_SPACE,
        seeds = [SpotPool::SEED, dao.key().as_ref()],
        bump,
    )]
    pub spot_pool: Box<Account<'info, SpotPool>>,

    #[account(
        init,
        payer = creator,
        space = 8 + AdmissionQueue::INIT_SPACE,
        seeds = [AdmissionQueue::SEED, dao.key().as_ref()],
        bump,
    )]
    pub admission_queue: Box<Account<'info, AdmissionQueue>>,

    pub asset_mint: Box<InterfaceAccount<'info, Mint>>,

    pub stable_mint: Box<InterfaceAccount<'info, Mint>>,

    pub system_program: Program<'info, System>,
}

impl<'info> InitializeDao<'info> {
    pub fn initialize_dao(
        &mut self,
        nonce: u64,
        params: DaoParams,
        action_dispatcher: Pubkey,
        bumps: &InitializeDaoBumps,
    ) -> Result<()> {
        params.validate()?;
        let now = Clock::get()?.unix_timestamp;
        let dao_key = self.dao.key();

        self.spot_pool.set_inner(SpotPool {
            dao: dao_key,
            reserves: Reserves::default(),
            fee_bps: params.spot_fee_bps,
            oracle: TwapOracle::new(now, params.twap_initial_price, params.spot_oracle()),
            locked_to: None,
            locked_fraction_bps: 0,
            pending_split: None,
            bump: bumps.spot_pool,
        });

        self.admission_queue.set_inner(AdmissionQueue {
            dao: dao_key,
            entries: Vec::new(),
            premarket: None,
            bump: bumps.admission_queue,
        });

        self.dao.set_inner(Dao {
            creator: self.creator.key(),
            nonce,
            admin: self.creator.key(),
            asset_mint: self.asset_mint.key(),
            stable_mint: self.stable_mint.key(),
            asset_vault: Pubkey::default(),
            stable_vault: Pubkey::default(),
            fee_vault: Pubkey::default(),
            action_dispatcher,
            params,
            proposal_count: 0,
            queued_count: 0,
            active_proposals: 0,
            treasury_balance: 0,
            idle_reserves: Reserves::default(),
            bump: bumps.dao,
        });

        emit!(DaoInitialized {
            dao: dao_key,
            creator: self.creator.key(),
            asset_mint: self.asset_mint.key(),
            stable_mint: self.stable_mint.key(),
            action_dispatcher,
        });

        msg!("DAO {} initialized (nonce {})", dao_key, nonce);

        Ok(())
    }
}

// =============================================================================
// STEP 2: DAO VAULTS
// =============================================================================

#[derive(Accounts)]
pub struct InitializeDaoVaults<'info> {
    #[account(mut)]
    pub creator: Signer<'info>,

    #[account(
        mut,
        has_one = creator,
        has_one = asset_mint,
        has_one = stable_mint,
        constraint = dao.asset_vault == Pubkey::default(),
    )]
    pub dao: Box<Account<'info, Dao>>,

    pub asset_mint: Box<InterfaceAccount<'info, Mint>>,

    pub stable_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(
        init,
        payer = creator,
        seeds = [Dao::ASSET_VAULT_SEED, dao.key().as_ref()],
        bump,
        token::mint = asset_mint,
        token::authority = dao,
        token::token_program = token_program,
    )]
    pub asset_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        init,
        payer = creator,
        seeds = [Dao::STABLE_VAULT_SEED, dao.key().as_ref()],
        bump,
        token::mint = stable_mint,
        token::authority = dao,
        token::token_program = token_program,
    )]
    pub stable_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    /// Bonds, unclaimed payouts and the treasury balance, in the stable token
    #[account(
        init,
        payer = creator,
        seeds = [Dao::FEE_VAULT_SEED, dao.key().as_ref()],
        bump,
        token::mint = stable_mint,
        token::authority = dao,
        token::token_program = token_program,
    )]
    pub fee_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    pub token_program: Interface<'info, TokenInterface>,
    pub system_program: Program<'info, System>,
}

impl<'info> InitializeDaoVaults<'info> {
    pub fn initialize_dao_vaults(&mut self) -> Result<()> {
        self.dao.asset_vault = self.asset_vault.key();
        self.dao.stable_vault = self.stable_vault.key();
        self.dao.fee_vault = self.fee_vault.key();

        msg!("DAO {} vaults created", self.dao.key());

        Ok(())
    }
}
