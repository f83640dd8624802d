//! Property-based tests for the proposals codec
//!
//! Tests for:
//! - Roundtrip: typed decode(encode(v)) == v for every entity
//! - Registry agreement: dynamic decode consumes exactly the typed encoding
//!   and re-encodes to the same bytes
//! - Truncation: every strict prefix fails to decode
//! - Variant bounds: out-of-range tags are rejected

use super::schemas::register_proposal_types;
use super::types::*;
use crate::registry::{Schema, SchemaRegistry};
use crate::serialization::{decode, decode_all, encode};
use proptest::prelude::*;

// ============================================================================
// STRATEGIES
// ============================================================================

fn account_id() -> impl Strategy<Value = AccountId> {
    any::<[u8; 32]>().prop_map(AccountId)
}

fn active_stake() -> impl Strategy<Value = ActiveStake> {
    (any::<u32>(), account_id()).prop_map(|(stake_id, source_account_id)| ActiveStake {
        stake_id,
        source_account_id,
    })
}

fn parameters() -> impl Strategy<Value = ProposalParameters> {
    (
        any::<u32>(),
        any::<u32>(),
        0u32..=100,
        0u32..=100,
        0u32..=100,
        0u32..=100,
        any::<Option<u64>>(),
    )
        .prop_map(
            |(voting, grace, aq, at, sq, st, required_stake)| ProposalParameters {
                voting_period: voting,
                grace_period: grace,
                approval_quorum_percentage: aq,
                approval_threshold_percentage: at,
                slashing_quorum_percentage: sq,
                slashing_threshold_percentage: st,
                required_stake,
            },
        )
}

fn voting_results() -> impl Strategy<Value = VotingResults> {
    any::<(u32, u32, u32, u32)>().prop_map(|(abstensions, approvals, rejections, slashes)| {
        VotingResults {
            abstensions,
            approvals,
            rejections,
            slashes,
        }
    })
}

fn approved_status() -> impl Strategy<Value = ApprovedProposalStatus> {
    prop_oneof![
        Just(ApprovedProposalStatus::PendingExecution),
        Just(ApprovedProposalStatus::Executed),
        prop::collection::vec(any::<u8>(), 0..64)
            .prop_map(|error| ApprovedProposalStatus::ExecutionFailed(ExecutionFailed { error })),
    ]
}

fn decision_status() -> impl Strategy<Value = ProposalDecisionStatus> {
    prop_oneof![
        Just(ProposalDecisionStatus::Canceled),
        Just(ProposalDecisionStatus::Vetoed),
        Just(ProposalDecisionStatus::Rejected),
        Just(ProposalDecisionStatus::Slashed),
        Just(ProposalDecisionStatus::Expired),
        approved_status().prop_map(ProposalDecisionStatus::Approved),
    ]
}

fn proposal_status() -> impl Strategy<Value = ProposalStatus> {
    prop_oneof![
        proptest::option::of(active_stake()).prop_map(ProposalStatus::Active),
        (
            decision_status(),
            any::<u32>(),
            proptest::option::of(prop::collection::vec(any::<u8>(), 0..32)),
            proptest::option::of(active_stake()),
        )
            .prop_map(|(proposal_status, finalized_at, error, stake)| {
                ProposalStatus::Finalized(FinalizationData {
                    proposal_status,
                    finalized_at,
                    encoded_unstaking_error_due_to_broken_runtime: error,
                    stake_data_after_unstaking_error: stake,
                })
            }),
    ]
}

fn proposal() -> impl Strategy<Value = Proposal> {
    (
        parameters(),
        any::<u64>(),
        ".{0,40}",
        ".{0,200}",
        any::<u32>(),
        proposal_status(),
        voting_results(),
    )
        .prop_map(
            |(parameters, proposer_id, title, description, created_at, status, voting_results)| {
                Proposal {
                    parameters,
                    proposer_id,
                    title,
                    description,
                    created_at,
                    status,
                    voting_results,
                }
            },
        )
}

fn vote_kind() -> impl Strategy<Value = VoteKind> {
    prop_oneof![
        Just(VoteKind::Approve),
        Just(VoteKind::Reject),
        Just(VoteKind::Slash),
        Just(VoteKind::Abstain),
    ]
}

fn proposal_votes() -> impl Strategy<Value = ProposalVotes> {
    prop::collection::vec((any::<u64>(), vote_kind()), 0..20)
}

fn registry() -> SchemaRegistry {
    let mut registry = SchemaRegistry::new();
    register_proposal_types(&mut registry).unwrap();
    registry
}

/// Typed roundtrip, registry agreement and prefix rejection for one value.
fn check_codec<T>(value: &T) -> Result<(), TestCaseError>
where
    T: Schema + PartialEq + std::fmt::Debug,
{
    let bytes = encode(value);

    let decoded: T = decode_all(&bytes).map_err(|e| TestCaseError::fail(e.to_string()))?;
    prop_assert_eq!(&decoded, value, "Roundtrip should preserve the value");

    let registry = registry();
    let dynamic = registry
        .decode_all(T::NAME, &bytes)
        .map_err(|e| TestCaseError::fail(e.to_string()))?;
    let reencoded = registry
        .encode(T::NAME, &dynamic)
        .map_err(|e| TestCaseError::fail(e.to_string()))?;
    prop_assert_eq!(&reencoded, &bytes, "Registry shape must match the derived codec");

    for len in 0..bytes.len() {
        prop_assert!(
            decode::<T>(&bytes[..len]).is_err(),
            "Typed decode of a {}-byte prefix must fail",
            len
        );
        prop_assert!(
            registry.decode(T::NAME, &bytes[..len]).is_err(),
            "Dynamic decode of a {}-byte prefix must fail",
            len
        );
    }
    Ok(())
}

// ============================================================================
// CODEC PROPERTY TESTS
// ============================================================================

proptest! {
    /// Property: ProposalParameters roundtrip and registry agreement
    #[test]
    fn parameters_codec(value in parameters()) {
        check_codec(&value)?;
    }

    /// Property: VotingResults roundtrip and registry agreement
    #[test]
    fn voting_results_codec(value in voting_results()) {
        check_codec(&value)?;
    }

    /// Property: ProposalStatus roundtrip across every reachable tag combination
    #[test]
    fn proposal_status_codec(value in proposal_status()) {
        check_codec(&value)?;
    }

    /// Property: Proposal roundtrip including UTF-8 text
    #[test]
    fn proposal_codec(value in proposal()) {
        check_codec(&value)?;
    }

    /// Property: ballots roundtrip
    #[test]
    fn proposal_votes_codec(value in proposal_votes()) {
        check_codec(&value)?;
    }

    /// Property: Option fields roundtrip for both None and Some
    #[test]
    fn option_roundtrip(stake in any::<Option<u64>>()) {
        let bytes = encode(&stake);
        prop_assert_eq!(bytes[0], u8::from(stake.is_some()));
        prop_assert_eq!(decode_all::<Option<u64>>(&bytes).unwrap(), stake);
    }

    /// Property: decision tags past the last arm never decode
    #[test]
    fn decision_tag_out_of_range(tag in 6u8..=255) {
        prop_assert!(decode::<ProposalDecisionStatus>(&[tag]).is_err());
        prop_assert!(registry().decode("ProposalDecisionStatus", &[tag]).is_err());
    }

    /// Property: vote kind tags past the last arm never decode
    #[test]
    fn vote_kind_tag_out_of_range(tag in 4u8..=255) {
        prop_assert!(decode::<VoteKind>(&[tag]).is_err());
        prop_assert!(registry().decode("VoteKind", &[tag]).is_err());
    }

    /// Property: status tags past the last arm never decode
    #[test]
    fn status_tag_out_of_range(tag in 2u8..=255, tail in prop::collection::vec(any::<u8>(), 0..64)) {
        let mut bytes = vec![tag];
        bytes.extend(tail);
        prop_assert!(decode::<ProposalStatus>(&bytes).is_err());
        prop_assert!(registry().decode("ProposalStatus", &bytes).is_err());
    }

    /// Property: dynamic decoding never panics on arbitrary input
    #[test]
    fn arbitrary_bytes_do_not_panic(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        let registry = registry();
        for name in ["ProposalOf", "ProposalStatus", "ProposalVotes", "FinalizationData"] {
            let _ = registry.decode(name, &bytes);
        }
        let _ = decode::<Proposal>(&bytes);
    }
}
