//! Execution handoff
//!
//! The winning action bundle is run by the DAO's dispatcher program inside
//! the same instruction that consumes the execution ticket:
//!
//! ```text
//! begin_execution ──▶ complete_execution ──▶ CPI dispatcher (DAO signs)
//! ```
//!
//! The ticket is settled before the CPI so no error path can drop it
//! unsettled. A failing dispatch fails the whole instruction, which reverts
//! the settlement: the proposal stays FINALIZED and may be retried until
//! the window closes or the admin abandons it. A winning outcome without an
//! action bundle completes without a CPI.

use anchor_lang::prelude::*;
use anchor_lang::solana_program::{
    hash::hash,
    instruction::{AccountMeta, Instruction},
    program::invoke_signed,
};

use crate::dao_seeds;
use crate::error::FutarchyError;
use crate::state::{Dao, Proposal};

#[event]
pub struct ProposalExecuted {
    pub proposal: Pubkey,
    pub outcome_index: u8,
    pub action_bundle: Pubkey,
    pub executed_by: Pubkey,
}

/// Arguments of the dispatcher's `execute_action_bundle` instruction
#[derive(AnchorSerialize, Clone, Copy, PartialEq, Eq, Debug)]
struct ExecuteActionBundle {
    proposal: Pubkey,
    outcome_index: u8,
    action_bundle: Pubkey,
}

/// Take and settle the execution ticket, returning what to dispatch
fn settle_for_dispatch(
    proposal: &mut Proposal,
    key: Pubkey,
    now: i64,
) -> Result<ExecuteActionBundle> {
    let ticket = proposal.begin_execution(key, now)?;
    let call = ExecuteActionBundle {
        proposal: ticket.proposal(),
        outcome_index: ticket.outcome_index(),
        action_bundle: ticket.action_bundle(),
    };
    proposal.complete_execution(ticket)?;

    Ok(call)
}

#[derive(Accounts)]
pub struct ExecuteProposal<'info> {
    pub caller: Signer<'info>,

    #[account(has_one = action_dispatcher)]
    pub dao: Box<Account<'info, Dao>>,

    #[account(mut, has_one = dao)]
    pub proposal: Box<Account<'info, Proposal>>,

    /// CHECK: matched against the DAO's dispatcher
    pub action_dispatcher: UncheckedAccount<'info>,

    /// CHECK: matched against the winning outcome's bundle before dispatch
    pub action_bundle: UncheckedAccount<'info>,
}

impl<'info> ExecuteProposal<'info> {
    pub fn execute_proposal(&mut self, remaining: &[AccountInfo<'info>]) -> Result<()> {
        let now = Clock::get()?.unix_timestamp;
        let key = self.proposal.key();

        let call = settle_for_dispatch(&mut self.proposal, key, now)?;
        self.dispatch(&call, remaining)?;

        emit!(ProposalExecuted {
            proposal: key,
            outcome_index: call.outcome_index,
            action_bundle: call.action_bundle,
            executed_by: self.caller.key(),
        });

        msg!(
            "Proposal {} executed outcome {}",
            self.proposal.number,
            call.outcome_index
        );

        Ok(())
    }

    fn dispatch(
        &self,
        call: &ExecuteActionBundle,
        remaining: &[AccountInfo<'info>],
    ) -> Result<()> {
        if call.action_bundle == Pubkey::default() {
            return Ok(());
        }
        require_keys_eq!(
            self.action_bundle.key(),
            call.action_bundle,
            FutarchyError::ActionNotExecutable
        );

        let mut data = hash(b"global:execute_action_bundle").to_bytes()[..8].to_vec();
        call.serialize(&mut data)
            .map_err(|_| error!(anchor_lang::error::ErrorCode::InstructionDidNotSerialize))?;

        let mut accounts = vec![
            AccountMeta::new_readonly(self.dao.key(), true),
            AccountMeta::new_readonly(self.action_bundle.key(), false),
        ];
        accounts.extend(remaining.iter().map(|info| {
            if info.is_writable {
                AccountMeta::new(*info.key, info.is_signer)
            } else {
                AccountMeta::new_readonly(*info.key, info.is_signer)
            }
        }));

        let ix = Instruction {
            program_id: self.action_dispatcher.key(),
            accounts,
            data,
        };

        let mut infos = vec![
            self.dao.to_account_info(),
            self.action_bundle.to_account_info(),
            self.action_dispatcher.to_account_info(),
        ];
        infos.extend_from_slice(remaining);

        let seeds = dao_seeds!(self.dao);
        invoke_signed(&ix, &infos, &[&seeds[..]])?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{ActionStatus, ProposalState};
    use crate::test_fixtures::finalized_proposal;
    use anchor_lang::error::Error;

    #[test]
    fn test_ticket_settled_before_dispatch() {
        let mut p = finalized_proposal(1, 1_000);
        let key = Pubkey::new_unique();
        let bundle = p.outcomes[1].action_bundle;

        let call = settle_for_dispatch(&mut p, key, 1_001).unwrap();

        assert_eq!(
            call,
            ExecuteActionBundle {
                proposal: key,
                outcome_index: 1,
                action_bundle: bundle,
            }
        );
        assert_eq!(p.state, ProposalState::Executed);
        assert_eq!(p.outcomes[1].action_status, ActionStatus::Executed);
    }

    #[test]
    fn test_closed_window_leaves_proposal_finalized() {
        let mut p = finalized_proposal(1, 1_000);
        let closed = p.execution_ends_at();

        assert_eq!(
            settle_for_dispatch(&mut p, Pubkey::new_unique(), closed).unwrap_err(),
            Error::from(FutarchyError::ExecutionWindowClosed)
        );
        assert_eq!(p.state, ProposalState::Finalized);
        assert_eq!(p.outcomes[1].action_status, ActionStatus::Selected);
    }
}
