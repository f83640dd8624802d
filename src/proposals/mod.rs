//! Proposals pallet type model.
//!
//! - `types`: entities and their SCALE layout
//! - `status`: the Active -> Finalized -> (Executed | ExecutionFailed) state machine
//! - `voting`: ballot tallying and quorum/threshold evaluation
//! - `schemas`: registry shapes and `register_proposal_types`

pub mod schemas;
pub mod status;
pub mod types;
pub mod voting;

#[cfg(test)]
mod proptests;

pub use schemas::{register_proposal_types, PRIMITIVE_ALIASES};
pub use status::TransitionError;
pub use types::{
    AccountId, ActiveStake, ApprovedProposalStatus, Balance, BlockNumber, ExecutionFailed,
    FinalizationData, MemberId, PercentageOutOfRange, Proposal, ProposalDecisionStatus,
    ProposalId, ProposalParameters, ProposalStatus, ProposalVotes, StakeId, VoteKind,
    VotingResults,
};
pub use voting::tally;
