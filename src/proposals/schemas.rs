//! Registry shapes for the proposals pallet.
//!
//! Each shape mirrors the derived codec of the matching type in
//! [`types`](super::types); the property tests decode typed encodings
//! dynamically to keep the two in step.

use super::types::{
    ActiveStake, ApprovedProposalStatus, ExecutionFailed, FinalizationData, MemberId, Proposal,
    ProposalDecisionStatus, ProposalParameters, ProposalStatus, VoteKind, VotingResults,
};
use crate::registry::{Schema, SchemaError, SchemaRegistry, Shape};

/// Primitive aliases used by the proposal shapes.
pub const PRIMITIVE_ALIASES: &[(&str, &str)] = &[
    ("BlockNumber", "u32"),
    ("Balance", "u64"),
    ("MemberId", "u64"),
    ("StakeId", "u32"),
    ("ProposalId", "u32"),
    ("AccountId", "AccountId"),
];

impl Schema for ProposalParameters {
    const NAME: &'static str = "ProposalParameters";

    fn shape() -> Shape {
        Shape::structure([
            ("voting_period", Shape::named("BlockNumber")),
            ("grace_period", Shape::named("BlockNumber")),
            ("approval_quorum_percentage", Shape::U32),
            ("approval_threshold_percentage", Shape::U32),
            ("slashing_quorum_percentage", Shape::U32),
            ("slashing_threshold_percentage", Shape::U32),
            ("required_stake", Shape::option(Shape::named("Balance"))),
        ])
    }
}

impl Schema for VotingResults {
    const NAME: &'static str = "VotingResults";

    fn shape() -> Shape {
        Shape::structure([
            ("abstensions", Shape::U32),
            ("approvals", Shape::U32),
            ("rejections", Shape::U32),
            ("slashes", Shape::U32),
        ])
    }
}

impl Schema for ActiveStake {
    const NAME: &'static str = "ActiveStake";

    fn shape() -> Shape {
        Shape::structure([
            ("stake_id", Shape::named("StakeId")),
            ("source_account_id", Shape::AccountId),
        ])
    }
}

impl Schema for ExecutionFailed {
    const NAME: &'static str = "ExecutionFailed";

    fn shape() -> Shape {
        Shape::structure([("error", Shape::vec(Shape::U8))])
    }
}

impl Schema for ApprovedProposalStatus {
    const NAME: &'static str = "ApprovedProposalStatus";

    fn shape() -> Shape {
        Shape::enumeration([
            ("PendingExecution", Shape::Null),
            ("Executed", Shape::Null),
            ("ExecutionFailed", Shape::named("ExecutionFailed")),
        ])
    }
}

impl Schema for ProposalDecisionStatus {
    const NAME: &'static str = "ProposalDecisionStatus";

    fn shape() -> Shape {
        Shape::enumeration([
            ("Canceled", Shape::Null),
            ("Vetoed", Shape::Null),
            ("Rejected", Shape::Null),
            ("Slashed", Shape::Null),
            ("Expired", Shape::Null),
            ("Approved", Shape::named("ApprovedProposalStatus")),
        ])
    }
}

impl Schema for FinalizationData {
    const NAME: &'static str = "FinalizationData";

    fn shape() -> Shape {
        Shape::structure([
            ("proposal_status", Shape::named("ProposalDecisionStatus")),
            ("finalized_at", Shape::named("BlockNumber")),
            (
                "encoded_unstaking_error_due_to_broken_runtime",
                Shape::option(Shape::vec(Shape::U8)),
            ),
            (
                "stake_data_after_unstaking_error",
                Shape::option(Shape::named("ActiveStake")),
            ),
        ])
    }
}

impl Schema for ProposalStatus {
    const NAME: &'static str = "ProposalStatus";

    fn shape() -> Shape {
        Shape::enumeration([
            ("Active", Shape::option(Shape::named("ActiveStake"))),
            ("Finalized", Shape::named("FinalizationData")),
        ])
    }
}

/// Registered as `ProposalOf`, the name chain metadata uses for the stored proposal.
impl Schema for Proposal {
    const NAME: &'static str = "ProposalOf";

    fn shape() -> Shape {
        Shape::structure([
            ("parameters", Shape::named("ProposalParameters")),
            ("proposer_id", Shape::named("MemberId")),
            ("title", Shape::Text),
            ("description", Shape::Text),
            ("created_at", Shape::named("BlockNumber")),
            ("status", Shape::named("ProposalStatus")),
            ("voting_results", Shape::named("VotingResults")),
        ])
    }
}

impl Schema for VoteKind {
    const NAME: &'static str = "VoteKind";

    fn shape() -> Shape {
        Shape::unit_enum(["Approve", "Reject", "Slash", "Abstain"])
    }
}

impl Schema for Vec<(MemberId, VoteKind)> {
    const NAME: &'static str = "ProposalVotes";

    fn shape() -> Shape {
        Shape::vec(Shape::Tuple(vec![
            Shape::named("MemberId"),
            Shape::named("VoteKind"),
        ]))
    }
}

/// Register every proposals pallet type.
///
/// Stops at the first failure and returns it; callers treat that as fatal
/// for start-up. Registering into a registry that already holds identical
/// shapes succeeds.
pub fn register_proposal_types(registry: &mut SchemaRegistry) -> Result<(), SchemaError> {
    for (name, expr) in PRIMITIVE_ALIASES {
        registry.register_expr(*name, expr)?;
    }

    registry.register_type::<ProposalParameters>()?;
    registry.register_type::<VotingResults>()?;
    registry.register_type::<ActiveStake>()?;
    registry.register_type::<ExecutionFailed>()?;
    registry.register_type::<ApprovedProposalStatus>()?;
    registry.register_type::<ProposalDecisionStatus>()?;
    registry.register_type::<FinalizationData>()?;
    registry.register_type::<ProposalStatus>()?;
    registry.register_type::<Proposal>()?;
    registry.register_type::<VoteKind>()?;
    registry.register_type::<Vec<(MemberId, VoteKind)>>()?;
    registry.register("Proposal", Shape::named(Proposal::NAME))?;

    tracing::info!(schemas = registry.len(), "registered proposal types");
    Ok(())
}
