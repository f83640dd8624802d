//! Vote tallying and quorum/threshold evaluation.
//!
//! Quorum is the share of eligible voters who voted; threshold is the share
//! of cast votes in favour of an outcome. Both are compared as integer
//! percentages (cross-multiplied in `u128`, no rounding).

use super::types::{
    ApprovedProposalStatus, MemberId, ProposalDecisionStatus, ProposalParameters, ProposalVotes,
    VoteKind, VotingResults,
};
use std::collections::HashMap;

impl VotingResults {
    /// Count one vote. Counters saturate at `u32::MAX`.
    pub fn record(&mut self, vote: VoteKind) {
        let counter = match vote {
            VoteKind::Approve => &mut self.approvals,
            VoteKind::Reject => &mut self.rejections,
            VoteKind::Slash => &mut self.slashes,
            VoteKind::Abstain => &mut self.abstensions,
        };
        *counter = counter.saturating_add(1);
    }

    /// Total votes cast, abstentions included.
    pub fn votes_count(&self) -> u64 {
        u64::from(self.abstensions)
            + u64::from(self.approvals)
            + u64::from(self.rejections)
            + u64::from(self.slashes)
    }

    /// Decide the outcome of voting, if one is reached.
    ///
    /// Order of checks:
    /// 1. approval quorum and threshold -> `Approved(PendingExecution)`
    /// 2. slashing quorum and threshold -> `Slashed`
    /// 3. every voter has voted -> `Rejected`
    /// 4. voting period over -> `Rejected` with approval quorum, else `Expired`
    ///
    /// Returns `None` while voting should continue.
    pub fn evaluate(
        &self,
        parameters: &ProposalParameters,
        total_voters: u32,
        voting_period_elapsed: bool,
    ) -> Option<ProposalDecisionStatus> {
        let votes = self.votes_count();
        let total = u64::from(total_voters);

        let approval_quorum = percentage_reached(votes, total, parameters.approval_quorum_percentage);
        let approval_threshold = percentage_reached(
            u64::from(self.approvals),
            votes,
            parameters.approval_threshold_percentage,
        );
        if approval_quorum && approval_threshold {
            return Some(ProposalDecisionStatus::Approved(
                ApprovedProposalStatus::PendingExecution,
            ));
        }

        let slashing_quorum = percentage_reached(votes, total, parameters.slashing_quorum_percentage);
        let slashing_threshold = percentage_reached(
            u64::from(self.slashes),
            votes,
            parameters.slashing_threshold_percentage,
        );
        if slashing_quorum && slashing_threshold {
            return Some(ProposalDecisionStatus::Slashed);
        }

        if total > 0 && votes >= total {
            return Some(ProposalDecisionStatus::Rejected);
        }

        if voting_period_elapsed {
            return Some(if approval_quorum {
                ProposalDecisionStatus::Rejected
            } else {
                ProposalDecisionStatus::Expired
            });
        }

        None
    }
}

/// `part / whole >= percentage / 100`, false when nothing was counted.
fn percentage_reached(part: u64, whole: u64, percentage: u32) -> bool {
    whole > 0 && u128::from(part) * 100 >= u128::from(whole) * u128::from(percentage)
}

/// Tally a ballot. When a member appears more than once, their last vote counts.
pub fn tally(votes: &ProposalVotes) -> VotingResults {
    let mut latest: HashMap<MemberId, VoteKind> = HashMap::new();
    for (member, vote) in votes {
        latest.insert(*member, *vote);
    }

    let mut results = VotingResults::default();
    for vote in latest.into_values() {
        results.record(vote);
    }
    results
}
