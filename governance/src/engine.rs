//! Core governance engine: proposals through vote, timelock and execution.

use crate::action::ActionExecutor;
use crate::error::GovernanceError;
use crate::params::GovernableParam;
use crate::proposal::{
    Proposal, ProposalDraft, ProposalId, ProposalStatus, SnapshotId, VoteChoice, VoteRecord,
};
use crate::voting::quadratic_weight;
use crate::ProposalAction;
use std::collections::{BTreeMap, BTreeSet};
use vigil_ledger::Ledger;
use vigil_types::{apply_bps, AccountId, GovernanceParams, Timestamp};

/// Where voting balances come from.
pub trait BalanceSource {
    fn balance_of(&self, account: &AccountId) -> u128;
    fn total_supply(&self) -> u128;
}

impl BalanceSource for Ledger {
    fn balance_of(&self, account: &AccountId) -> u128 {
        Ledger::balance_of(self, account)
    }

    fn total_supply(&self) -> u128 {
        Ledger::total_supply(self)
    }
}

/// Outcome of a single guardian veto.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VetoOutcome {
    /// Distinct guardians that have vetoed so far.
    pub vetoes: u32,
    /// The proposal reached the threshold with this veto.
    pub vetoed: bool,
}

/// Proposal registry, vote ledger, snapshot memo and veto sets.
#[derive(Clone, Debug)]
pub struct GovernanceEngine {
    params: GovernanceParams,
    proposals: BTreeMap<ProposalId, Proposal>,
    next_id: ProposalId,
    next_snapshot: SnapshotId,
    votes: BTreeMap<(ProposalId, AccountId), VoteRecord>,
    /// (snapshot, account) → balance seen at first interaction.
    snapshot_memo: BTreeMap<(SnapshotId, AccountId), u128>,
    vetoes: BTreeMap<ProposalId, BTreeSet<AccountId>>,
    last_proposal_at: BTreeMap<AccountId, Timestamp>,
}

impl GovernanceEngine {
    pub fn new(params: GovernanceParams) -> Self {
        Self {
            params,
            proposals: BTreeMap::new(),
            next_id: 1,
            next_snapshot: 1,
            votes: BTreeMap::new(),
            snapshot_memo: BTreeMap::new(),
            vetoes: BTreeMap::new(),
            last_proposal_at: BTreeMap::new(),
        }
    }

    pub fn params(&self) -> &GovernanceParams {
        &self.params
    }

    pub fn proposal(&self, id: ProposalId) -> Option<&Proposal> {
        self.proposals.get(&id)
    }

    pub fn proposals(&self) -> impl Iterator<Item = &Proposal> {
        self.proposals.values()
    }

    pub fn vote_of(&self, id: ProposalId, voter: &AccountId) -> Option<&VoteRecord> {
        self.votes.get(&(id, voter.clone()))
    }

    pub fn votes(&self) -> impl Iterator<Item = &VoteRecord> {
        self.votes.values()
    }

    pub fn vetoes_on(&self, id: ProposalId) -> usize {
        self.vetoes.get(&id).map_or(0, |v| v.len())
    }

    /// Replace the parameter set after range-checking the fields that
    /// would break voting if zero or unsafe.
    pub fn set_params(&mut self, params: GovernanceParams) -> Result<(), GovernanceError> {
        GovernableParam::VetoThreshold.validate(params.veto_threshold as u128)?;
        GovernableParam::WeightScale.validate(params.weight_scale)?;
        GovernableParam::QuorumBps.validate(params.quorum_bps as u128)?;
        GovernableParam::VotingPeriodSecs.validate(params.voting_period_secs as u128)?;
        self.params = params;
        Ok(())
    }

    /// Quadratic weight of `balance` under the current parameters.
    pub fn weight(&self, balance: u128) -> Result<u128, GovernanceError> {
        quadratic_weight(
            balance,
            self.params.quadratic_multiplier,
            self.params.weight_scale,
        )
        .ok_or(GovernanceError::InvalidParameter {
            param: GovernableParam::WeightScale.name(),
            value: 0,
            reason: "must be positive",
        })
    }

    /// Open a proposal for voting.
    pub fn propose(
        &mut self,
        proposer: &AccountId,
        draft: ProposalDraft,
        balances: &impl BalanceSource,
        now: Timestamp,
    ) -> Result<Proposal, GovernanceError> {
        if draft.title.trim().is_empty() {
            return Err(GovernanceError::EmptyTitle);
        }
        if draft.kind != draft.action.kind() {
            return Err(GovernanceError::KindMismatch {
                kind: format!("{:?}", draft.kind),
                action: draft.action.describe(),
            });
        }
        if let ProposalAction::SetParameter(param) = &draft.action {
            param.validate(draft.value)?;
        }

        let balance = balances.balance_of(proposer);
        if balance < self.params.proposal_threshold {
            return Err(GovernanceError::InsufficientBalance {
                have: balance,
                need: self.params.proposal_threshold,
            });
        }
        if let Some(last) = self.last_proposal_at.get(proposer) {
            if !last.has_expired(self.params.proposal_cooldown_secs, now) {
                return Err(GovernanceError::ProposerCooldown {
                    proposer: proposer.to_string(),
                    retry_at: last.plus_secs(self.params.proposal_cooldown_secs),
                });
            }
        }

        let id = self.next_id;
        self.next_id += 1;
        let snapshot_id = self.next_snapshot;
        self.next_snapshot += 1;

        let proposal = Proposal {
            id,
            proposer: proposer.clone(),
            kind: draft.kind,
            title: draft.title,
            description: draft.description,
            action: draft.action,
            value: draft.value,
            votes_for: 0,
            votes_against: 0,
            votes_abstain: 0,
            status: ProposalStatus::Active,
            snapshot_id,
            total_supply_at_snapshot: balances.total_supply(),
            created_at: now,
            voting_ends_at: now.plus_secs(self.params.voting_period_secs),
            queued_at: None,
            executed: false,
            last_failure: None,
        };
        self.last_proposal_at.insert(proposer.clone(), now);
        tracing::info!(
            id,
            proposer = %proposer,
            action = %proposal.action.describe(),
            value = proposal.value,
            ends_at = %proposal.voting_ends_at,
            "proposal created"
        );
        self.proposals.insert(id, proposal.clone());
        Ok(proposal)
    }

    /// Voting weight of `voter` on a proposal, memoizing their balance in
    /// the proposal's snapshot on first call.
    pub fn voting_power(
        &mut self,
        id: ProposalId,
        voter: &AccountId,
        balances: &impl BalanceSource,
    ) -> Result<u128, GovernanceError> {
        let snapshot = self.get(id)?.snapshot_id;
        let balance = *self
            .snapshot_memo
            .entry((snapshot, voter.clone()))
            .or_insert_with(|| balances.balance_of(voter));
        self.weight(balance)
    }

    /// Record a vote. One per account per proposal, before the deadline.
    pub fn cast_vote(
        &mut self,
        id: ProposalId,
        voter: &AccountId,
        choice: VoteChoice,
        balances: &impl BalanceSource,
        now: Timestamp,
    ) -> Result<VoteRecord, GovernanceError> {
        let proposal = self.get(id)?;
        if proposal.status != ProposalStatus::Active || now >= proposal.voting_ends_at {
            return Err(GovernanceError::VotingClosed(id));
        }
        if self.votes.contains_key(&(id, voter.clone())) {
            return Err(GovernanceError::AlreadyVoted {
                id,
                voter: voter.to_string(),
            });
        }

        let weight = self.voting_power(id, voter, balances)?;
        if weight == 0 {
            return Err(GovernanceError::ZeroWeight {
                id,
                voter: voter.to_string(),
            });
        }

        let proposal = self.get_mut(id)?;
        let tally = match choice {
            VoteChoice::For => &mut proposal.votes_for,
            VoteChoice::Against => &mut proposal.votes_against,
            VoteChoice::Abstain => &mut proposal.votes_abstain,
        };
        *tally = tally.checked_add(weight).ok_or(GovernanceError::Overflow)?;

        let record = VoteRecord {
            proposal: id,
            voter: voter.clone(),
            choice,
            weight,
            cast_at: now,
        };
        self.votes.insert((id, voter.clone()), record.clone());
        tracing::debug!(id, voter = %voter, ?choice, weight, "vote cast");
        Ok(record)
    }

    /// Tally an expired proposal: `Defeated`, or `Queued` with the timelock
    /// starting now.
    pub fn finalize_proposal(
        &mut self,
        id: ProposalId,
        now: Timestamp,
    ) -> Result<ProposalStatus, GovernanceError> {
        let proposal = self.get(id)?;
        if proposal.status != ProposalStatus::Active {
            return Err(GovernanceError::AlreadyFinalized {
                id,
                status: proposal.status,
            });
        }
        if now < proposal.voting_ends_at {
            return Err(GovernanceError::VotingOpen {
                id,
                ends_at: proposal.voting_ends_at,
            });
        }

        let quorum_base = apply_bps(proposal.total_supply_at_snapshot, self.params.quorum_bps)
            .ok_or(GovernanceError::Overflow)?;
        let quorum = self.weight(quorum_base)?;
        let participation = proposal.participation();
        let passed = participation >= quorum && proposal.votes_for > proposal.votes_against;

        let proposal = self.get_mut(id)?;
        if passed {
            // Succeeded is never observable: the timelock starts immediately.
            proposal.status = ProposalStatus::Queued;
            proposal.queued_at = Some(now);
        } else {
            proposal.status = ProposalStatus::Defeated;
        }
        tracing::info!(
            id,
            status = ?proposal.status,
            participation,
            quorum,
            votes_for = proposal.votes_for,
            votes_against = proposal.votes_against,
            "proposal finalized"
        );
        Ok(proposal.status)
    }

    /// Run a queued proposal's action once its timelock has passed.
    ///
    /// On failure the proposal stays `Queued` with the reason recorded, so it
    /// can be retried or vetoed.
    pub fn execute_proposal(
        &mut self,
        id: ProposalId,
        executor: &mut impl ActionExecutor,
        now: Timestamp,
    ) -> Result<(), GovernanceError> {
        let proposal = self.get(id)?;
        if proposal.status != ProposalStatus::Queued {
            return Err(GovernanceError::NotQueued {
                id,
                status: proposal.status,
            });
        }
        let queued_at = proposal.queued_at.unwrap_or(proposal.voting_ends_at);
        if !queued_at.has_expired(self.params.timelock_delay_secs, now) {
            return Err(GovernanceError::TimelockActive {
                id,
                ready_at: queued_at.plus_secs(self.params.timelock_delay_secs),
            });
        }

        let (action, value) = (proposal.action.clone(), proposal.value);
        let dispatched = executor
            .validate(&action, value)
            .and_then(|()| executor.execute(&action, value));
        if let Err(reason) = dispatched {
            self.record_execution_failure(id, &reason)?;
            return Err(GovernanceError::ExecutionFailed { id, reason });
        }

        let proposal = self.get_mut(id)?;
        proposal.status = ProposalStatus::Executed;
        proposal.executed = true;
        proposal.last_failure = None;
        tracing::info!(id, action = %action.describe(), value, "proposal executed");
        Ok(())
    }

    /// Note a failed execution attempt on a queued proposal.
    pub fn record_execution_failure(
        &mut self,
        id: ProposalId,
        reason: &str,
    ) -> Result<(), GovernanceError> {
        let proposal = self.get_mut(id)?;
        proposal.last_failure = Some(reason.to_string());
        tracing::warn!(id, reason, "proposal execution failed");
        Ok(())
    }

    /// Register a guardian's veto. The proposal becomes `Vetoed` once the
    /// number of distinct vetoes reaches the threshold.
    pub fn veto_proposal(
        &mut self,
        id: ProposalId,
        guardian: &AccountId,
    ) -> Result<VetoOutcome, GovernanceError> {
        let proposal = self.get(id)?;
        if !matches!(proposal.status, ProposalStatus::Active | ProposalStatus::Queued) {
            return Err(GovernanceError::NotVetoable {
                id,
                status: proposal.status,
            });
        }
        let threshold = self.params.veto_threshold;
        let set = self.vetoes.entry(id).or_default();
        if !set.insert(guardian.clone()) {
            return Err(GovernanceError::AlreadyVetoed {
                id,
                guardian: guardian.to_string(),
            });
        }
        let vetoes = u32::try_from(set.len()).map_err(|_| GovernanceError::Overflow)?;
        let vetoed = vetoes >= threshold;
        if vetoed {
            self.get_mut(id)?.status = ProposalStatus::Vetoed;
            tracing::warn!(id, vetoes, threshold, "proposal vetoed");
        } else {
            tracing::info!(id, guardian = %guardian, vetoes, threshold, "veto recorded");
        }
        Ok(VetoOutcome { vetoes, vetoed })
    }

    fn get(&self, id: ProposalId) -> Result<&Proposal, GovernanceError> {
        self.proposals
            .get(&id)
            .ok_or(GovernanceError::ProposalNotFound(id))
    }

    fn get_mut(&mut self, id: ProposalId) -> Result<&mut Proposal, GovernanceError> {
        self.proposals
            .get_mut(&id)
            .ok_or(GovernanceError::ProposalNotFound(id))
    }
}
