//! Proposals pallet entities.
//!
//! All entities are plain values. Cross-entity relationships use identifiers
//! (`MemberId`, `StakeId`, `AccountId`) rather than embedded objects.
//! Field and variant declaration order is the wire order; do not reorder.

use codec::{Decode, Encode};
use std::fmt;

/// Position in the chain's ledger.
pub type BlockNumber = u32;

/// Token amount.
pub type Balance = u64;

/// Governance participant key.
pub type MemberId = u64;

/// Locked deposit key.
pub type StakeId = u32;

/// Uniquely keys a [`Proposal`].
pub type ProposalId = u32;

/// Wallet address (32 raw bytes on the wire, no length prefix).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Encode, Decode)]
pub struct AccountId(pub [u8; 32]);

impl AccountId {
    /// Get bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for AccountId {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId({})", self)
    }
}

/// Voting policy a proposal was created with.
#[derive(Debug, Clone, PartialEq, Eq, Default, Encode, Decode)]
pub struct ProposalParameters {
    /// During this period, votes can be accepted
    pub voting_period: BlockNumber,

    /// Pause before execution of an approved proposal (zero executes immediately)
    pub grace_period: BlockNumber,

    /// Quorum percentage of approving voters required to pass the proposal
    pub approval_quorum_percentage: u32,

    /// Approval votes percentage threshold to pass the proposal
    pub approval_threshold_percentage: u32,

    /// Quorum percentage of voters required to slash the proposal
    pub slashing_quorum_percentage: u32,

    /// Slashing votes percentage threshold to slash the proposal
    pub slashing_threshold_percentage: u32,

    /// Proposal stake
    pub required_stake: Option<Balance>,
}

/// Percentage field outside 0-100.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field} is {value}%, expected 0-100")]
pub struct PercentageOutOfRange {
    pub field: &'static str,
    pub value: u32,
}

impl ProposalParameters {
    /// Check every percentage is in 0-100.
    ///
    /// The type itself never enforces this; callers that build parameters
    /// from user input validate here.
    pub fn validate(&self) -> Result<(), PercentageOutOfRange> {
        let fields = [
            ("approval_quorum_percentage", self.approval_quorum_percentage),
            (
                "approval_threshold_percentage",
                self.approval_threshold_percentage,
            ),
            ("slashing_quorum_percentage", self.slashing_quorum_percentage),
            (
                "slashing_threshold_percentage",
                self.slashing_threshold_percentage,
            ),
        ];

        for (field, value) in fields {
            if value > 100 {
                return Err(PercentageOutOfRange { field, value });
            }
        }
        Ok(())
    }
}

/// Vote counters. Only ever increase while a proposal is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Encode, Decode)]
pub struct VotingResults {
    pub abstensions: u32,
    pub approvals: u32,
    pub rejections: u32,
    pub slashes: u32,
}

/// Stake placed against an active proposal.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct ActiveStake {
    pub stake_id: StakeId,
    pub source_account_id: AccountId,
}

/// Diagnostic payload from a failed automated execution.
#[derive(Debug, Clone, PartialEq, Eq, Default, Encode, Decode)]
pub struct ExecutionFailed {
    pub error: Vec<u8>,
}

/// Sub-states of an approved proposal.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum ApprovedProposalStatus {
    PendingExecution,
    Executed,
    ExecutionFailed(ExecutionFailed),
}

/// Terminal outcome of voting.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum ProposalDecisionStatus {
    Canceled,
    Vetoed,
    Rejected,
    Slashed,
    Expired,
    Approved(ApprovedProposalStatus),
}

impl ProposalDecisionStatus {
    /// Whether this decision is a valid target for finalizing an active
    /// proposal: any non-approved outcome, or approval awaiting execution.
    pub fn is_initial_decision(&self) -> bool {
        match self {
            Self::Canceled | Self::Vetoed | Self::Rejected | Self::Slashed | Self::Expired => true,
            Self::Approved(ApprovedProposalStatus::PendingExecution) => true,
            Self::Approved(ApprovedProposalStatus::Executed)
            | Self::Approved(ApprovedProposalStatus::ExecutionFailed(_)) => false,
        }
    }
}

/// Record written once a proposal's lifecycle concludes.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct FinalizationData {
    pub proposal_status: ProposalDecisionStatus,
    pub finalized_at: BlockNumber,

    /// Set only when unstaking failed during finalization
    pub encoded_unstaking_error_due_to_broken_runtime: Option<Vec<u8>>,

    /// Set only when unstaking failed during finalization
    pub stake_data_after_unstaking_error: Option<ActiveStake>,
}

/// Top-level lifecycle phase of a proposal.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum ProposalStatus {
    Active(Option<ActiveStake>),
    Finalized(FinalizationData),
}

/// A submitted proposal. Only `status` changes after creation.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct Proposal {
    pub parameters: ProposalParameters,
    pub proposer_id: MemberId,
    pub title: String,
    pub description: String,
    pub created_at: BlockNumber,
    pub status: ProposalStatus,
    pub voting_results: VotingResults,
}

impl Proposal {
    /// Create a freshly submitted proposal: active, no votes.
    pub fn new(
        parameters: ProposalParameters,
        proposer_id: MemberId,
        title: impl Into<String>,
        description: impl Into<String>,
        created_at: BlockNumber,
        stake: Option<ActiveStake>,
    ) -> Self {
        Self {
            parameters,
            proposer_id,
            title: title.into(),
            description: description.into(),
            created_at,
            status: ProposalStatus::new_active(stake),
            voting_results: VotingResults::default(),
        }
    }
}

/// One member's vote choice on one proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Encode, Decode)]
pub enum VoteKind {
    Approve,
    Reject,
    Slash,
    Abstain,
}

/// Full ballot for a proposal, in recording order.
pub type ProposalVotes = Vec<(MemberId, VoteKind)>;
