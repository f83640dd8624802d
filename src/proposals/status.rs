//! Proposal status state machine.
//!
//! ```text
//! Active(stake?) ──► Finalized(Canceled | Vetoed | Rejected | Slashed | Expired)
//!        │
//!        └─────────► Finalized(Approved(PendingExecution)) ──► Approved(Executed)
//!                                                          └─► Approved(ExecutionFailed(error))
//! ```
//!
//! The codec can represent any tag combination; these transitions are the only
//! way application code should move between them. `finalized_at` is stamped
//! once, on finalization, and survives the execution step.

use super::types::{
    ActiveStake, ApprovedProposalStatus, BlockNumber, ExecutionFailed, FinalizationData,
    Proposal, ProposalDecisionStatus, ProposalStatus,
};
use thiserror::Error;

/// Rejected status transitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    /// Finalizing a proposal that already has a decision.
    #[error("proposal already finalized at block {finalized_at}")]
    AlreadyFinalized { finalized_at: BlockNumber },

    /// Decision cannot be reached directly from `Active`.
    #[error("decision {0:?} is not reachable from an active proposal")]
    InvalidDecision(ProposalDecisionStatus),

    /// Execution outcome recorded for a proposal not awaiting execution.
    #[error("proposal is not pending execution (status: {0:?})")]
    NotPendingExecution(ProposalStatus),
}

impl ProposalStatus {
    /// Initial state of every proposal.
    pub fn new_active(stake: Option<ActiveStake>) -> Self {
        Self::Active(stake)
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active(_))
    }

    pub fn is_finalized(&self) -> bool {
        matches!(self, Self::Finalized(_))
    }

    /// Stake held by an active proposal.
    pub fn active_stake(&self) -> Option<&ActiveStake> {
        match self {
            Self::Active(stake) => stake.as_ref(),
            Self::Finalized(_) => None,
        }
    }

    /// Finalization record, once finalized.
    pub fn finalization(&self) -> Option<&FinalizationData> {
        match self {
            Self::Active(_) => None,
            Self::Finalized(data) => Some(data),
        }
    }

    /// Whether an approved proposal is waiting for execution.
    pub fn is_pending_execution(&self) -> bool {
        matches!(
            self,
            Self::Finalized(FinalizationData {
                proposal_status: ProposalDecisionStatus::Approved(
                    ApprovedProposalStatus::PendingExecution
                ),
                ..
            })
        )
    }

    /// Move an active proposal to its decision.
    ///
    /// # Errors
    ///
    /// - `AlreadyFinalized` if the proposal is not active
    /// - `InvalidDecision` for `Approved(Executed)` / `Approved(ExecutionFailed)`,
    ///   which are only reachable through `PendingExecution`
    pub fn finalize(
        &self,
        decision: ProposalDecisionStatus,
        finalized_at: BlockNumber,
    ) -> Result<Self, TransitionError> {
        self.finalize_inner(decision, finalized_at, None, None)
    }

    /// Like [`finalize`](Self::finalize), recording why unstaking failed.
    pub fn finalize_with_unstaking_error(
        &self,
        decision: ProposalDecisionStatus,
        finalized_at: BlockNumber,
        encoded_error: Vec<u8>,
        stake: Option<ActiveStake>,
    ) -> Result<Self, TransitionError> {
        self.finalize_inner(decision, finalized_at, Some(encoded_error), stake)
    }

    fn finalize_inner(
        &self,
        decision: ProposalDecisionStatus,
        finalized_at: BlockNumber,
        encoded_error: Option<Vec<u8>>,
        stake: Option<ActiveStake>,
    ) -> Result<Self, TransitionError> {
        if let Self::Finalized(data) = self {
            return Err(TransitionError::AlreadyFinalized {
                finalized_at: data.finalized_at,
            });
        }
        if !decision.is_initial_decision() {
            return Err(TransitionError::InvalidDecision(decision));
        }

        Ok(Self::Finalized(FinalizationData {
            proposal_status: decision,
            finalized_at,
            encoded_unstaking_error_due_to_broken_runtime: encoded_error,
            stake_data_after_unstaking_error: stake,
        }))
    }

    /// `PendingExecution -> Executed`.
    pub fn mark_executed(&self) -> Result<Self, TransitionError> {
        self.resolve_execution(ApprovedProposalStatus::Executed)
    }

    /// `PendingExecution -> ExecutionFailed(error)`.
    pub fn mark_execution_failed(&self, error: Vec<u8>) -> Result<Self, TransitionError> {
        self.resolve_execution(ApprovedProposalStatus::ExecutionFailed(ExecutionFailed {
            error,
        }))
    }

    fn resolve_execution(&self, outcome: ApprovedProposalStatus) -> Result<Self, TransitionError> {
        if !self.is_pending_execution() {
            return Err(TransitionError::NotPendingExecution(self.clone()));
        }

        let mut next = self.clone();
        if let Self::Finalized(data) = &mut next {
            data.proposal_status = ProposalDecisionStatus::Approved(outcome);
        }
        Ok(next)
    }
}

impl Proposal {
    /// Finalize in place. Only `status` changes.
    pub fn finalize(
        &mut self,
        decision: ProposalDecisionStatus,
        finalized_at: BlockNumber,
    ) -> Result<(), TransitionError> {
        self.status = self.status.finalize(decision, finalized_at)?;
        Ok(())
    }

    pub fn mark_executed(&mut self) -> Result<(), TransitionError> {
        self.status = self.status.mark_executed()?;
        Ok(())
    }

    pub fn mark_execution_failed(&mut self, error: Vec<u8>) -> Result<(), TransitionError> {
        self.status = self.status.mark_execution_failed(error)?;
        Ok(())
    }
}
