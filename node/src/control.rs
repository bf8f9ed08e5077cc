//! The control plane: the single authoritative handle over every engine.
//!
//! Each mutating operation authorizes the caller, reads the clock once and
//! runs inside [`ControlPlane::transact`], which either commits the whole
//! operation (state change plus its events on the log) or restores the
//! pre-operation state.

use std::fmt::Display;

use vigil_governance::{
    GovernanceEngine, GovernanceError, Proposal, ProposalDraft, ProposalId, ProposalStatus,
    VetoOutcome, VoteChoice, VoteRecord,
};
use vigil_ledger::Ledger;
use vigil_oracle::{Alert, AlertId, AlertSubmission, OracleEngine};
use vigil_staking::{BurnSummary, Stake, StakingEngine};
use vigil_store::{Event, EventRecord, EventStore, GENESIS_HASH};
use vigil_types::{AccountId, Clock, EconomyParams, Role, Timestamp};

use crate::access::{AccessControl, Capability};
use crate::config::NodeConfig;
use crate::error::NodeError;
use crate::executor::{changed_params, EconomyExecutor};
use crate::projection::Projection;

/// Everything a transaction may touch. Cloned as the rollback snapshot.
#[derive(Clone, Debug)]
struct State<A> {
    ledger: Ledger,
    staking: StakingEngine,
    oracle: OracleEngine,
    governance: GovernanceEngine,
    access: A,
    params: EconomyParams,
}

/// Result of submitting or confirming an alert.
///
/// The burn and the reward commit separately: a reward failure leaves the
/// burn in place and is reported in `reward_error`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlertOutcome {
    pub alert: Alert,
    /// `Some` when the alert met the confidence threshold and executed.
    pub burn: Option<BurnSummary>,
    pub reward: Option<u128>,
    pub reward_error: Option<String>,
}

pub struct ControlPlane<C: Clock, S: EventStore, A: AccessControl + Clone> {
    clock: C,
    store: S,
    state: State<A>,
    /// Sequence number of the next record.
    next_seq: u64,
    head_hash: [u8; 32],
    last_now: Option<Timestamp>,
}

impl<C: Clock, S: EventStore, A: AccessControl + Clone> ControlPlane<C, S, A> {
    /// Build a control plane on an empty event log.
    ///
    /// The configured roles are granted in a genesis transaction so the log
    /// alone reproduces the role set.
    pub fn new(config: &NodeConfig, clock: C, store: S, access: A) -> Result<Self, NodeError> {
        config.validate()?;
        let existing = store.load()?;
        if !existing.is_empty() {
            return Err(NodeError::Replay(format!(
                "event log already holds {} records",
                existing.len()
            )));
        }

        let params = config.params.clone();
        let mut plane = Self {
            clock,
            store,
            state: State {
                ledger: Ledger::new(),
                staking: StakingEngine::new(params.staking.clone()),
                oracle: OracleEngine::new(params.oracle.clone()),
                governance: GovernanceEngine::new(params.governance.clone()),
                access,
                params,
            },
            next_seq: 0,
            head_hash: GENESIS_HASH,
            last_now: None,
        };

        let grants = config.roles.clone();
        plane.transact("genesis", |state, _now, events| {
            for grant in &grants {
                if state.access.grant(&grant.account, grant.role) {
                    events.push(Event::RoleGranted {
                        account: grant.account.clone(),
                        role: grant.role,
                    });
                }
            }
            Ok(())
        })?;
        tracing::info!(roles = grants.len(), "control plane started");
        Ok(plane)
    }

    // ── Queries ────────────────────────────────────────────────────────

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn access(&self) -> &A {
        &self.state.access
    }

    pub fn params(&self) -> &EconomyParams {
        &self.state.params
    }

    pub fn ledger(&self) -> &Ledger {
        &self.state.ledger
    }

    pub fn staking(&self) -> &StakingEngine {
        &self.state.staking
    }

    pub fn oracle(&self) -> &OracleEngine {
        &self.state.oracle
    }

    pub fn governance(&self) -> &GovernanceEngine {
        &self.state.governance
    }

    pub fn balance_of(&self, account: &AccountId) -> u128 {
        self.state.ledger.balance_of(account)
    }

    pub fn stake_of(&self, owner: &AccountId) -> Option<&Stake> {
        self.state.staking.stake_of(owner)
    }

    pub fn alert(&self, id: AlertId) -> Option<&Alert> {
        self.state.oracle.alert(id)
    }

    pub fn proposal(&self, id: ProposalId) -> Option<&Proposal> {
        self.state.governance.proposal(id)
    }

    pub fn pending_reward(&self, operator: &AccountId) -> u128 {
        self.state.oracle.pending_reward(operator)
    }

    /// Number of records committed to the log.
    pub fn event_count(&self) -> u64 {
        self.next_seq
    }

    pub fn head_hash(&self) -> [u8; 32] {
        self.head_hash
    }

    // ── Funds movement ─────────────────────────────────────────────────

    /// External inflow. Escrow and the reward pool are never credited directly.
    pub fn credit(
        &mut self,
        caller: &AccountId,
        account: &AccountId,
        amount: u128,
    ) -> Result<(), NodeError> {
        self.require(caller, Capability::Administer)?;
        guard_engine_account(account)?;
        self.transact("credit", |state, _now, events| {
            state.ledger.credit(account, amount)?;
            events.push(Event::Credited {
                account: account.clone(),
                amount,
            });
            Ok(())
        })
    }

    /// External outflow.
    pub fn debit(
        &mut self,
        caller: &AccountId,
        account: &AccountId,
        amount: u128,
    ) -> Result<(), NodeError> {
        self.require(caller, Capability::Administer)?;
        guard_engine_account(account)?;
        self.transact("debit", |state, _now, events| {
            state.ledger.debit(account, amount)?;
            events.push(Event::Debited {
                account: account.clone(),
                amount,
            });
            Ok(())
        })
    }

    pub fn transfer(
        &mut self,
        caller: &AccountId,
        to: &AccountId,
        amount: u128,
    ) -> Result<(), NodeError> {
        guard_user(caller)?;
        guard_engine_account(to)?;
        self.transact("transfer", |state, _now, events| {
            state.ledger.transfer(caller, to, amount)?;
            events.push(Event::Transferred {
                from: caller.clone(),
                to: to.clone(),
                amount,
            });
            Ok(())
        })
    }

    /// Authorize `amount` to move into escrow on the caller's behalf.
    pub fn approve_escrow(&mut self, caller: &AccountId, amount: u128) -> Result<(), NodeError> {
        guard_user(caller)?;
        self.transact("approve_escrow", |state, _now, events| {
            state.ledger.approve_escrow(caller, amount)?;
            events.push(Event::EscrowApproved {
                owner: caller.clone(),
                amount,
            });
            Ok(())
        })
    }

    // ── Staking ────────────────────────────────────────────────────────

    pub fn stake(&mut self, caller: &AccountId, amount: u128) -> Result<Stake, NodeError> {
        guard_user(caller)?;
        self.transact("stake", |state, now, events| {
            let stake = state
                .staking
                .stake(&mut state.ledger, caller, amount, now)?;
            events.push(Event::Staked {
                owner: caller.clone(),
                amount,
            });
            Ok(stake)
        })
    }

    pub fn unstake(&mut self, caller: &AccountId) -> Result<u128, NodeError> {
        guard_user(caller)?;
        self.transact("unstake", |state, _now, events| {
            let amount = state.staking.unstake(&mut state.ledger, caller)?;
            events.push(Event::Unstaked {
                owner: caller.clone(),
                amount,
            });
            Ok(amount)
        })
    }

    // ── Oracle ─────────────────────────────────────────────────────────

    /// Record an alert and, if it meets the confidence threshold, burn and
    /// reward in two separate transactions.
    pub fn submit_alert(
        &mut self,
        caller: &AccountId,
        submission: AlertSubmission,
    ) -> Result<AlertOutcome, NodeError> {
        self.require(caller, Capability::SubmitAlert)?;
        let (id, burn) = self.transact("submit_alert", |state, now, events| {
            let max_recipients = state.staking.params().max_recipients_per_call;
            let alert =
                state
                    .oracle
                    .submit_alert(caller, submission.clone(), max_recipients, now)?;
            events.push(Event::AlertSubmitted {
                alert_id: alert.id,
                operator: caller.clone(),
                submission,
            });
            let burn = execute_if_ready(state, alert.id, now, events)?;
            Ok((alert.id, burn))
        })?;
        self.finish_alert(id, burn)
    }

    /// Raise a pending alert's confidence; executes it once the threshold
    /// is met.
    pub fn confirm_alert(
        &mut self,
        caller: &AccountId,
        id: AlertId,
        confidence: u8,
    ) -> Result<AlertOutcome, NodeError> {
        self.require(caller, Capability::SubmitAlert)?;
        let burn = self.transact("confirm_alert", |state, now, events| {
            state.oracle.confirm_alert(id, confidence)?;
            events.push(Event::AlertConfirmed {
                alert_id: id,
                confidence,
            });
            execute_if_ready(state, id, now, events)
        })?;
        self.finish_alert(id, burn)
    }

    /// Block a pending alert.
    pub fn emergency_override(
        &mut self,
        caller: &AccountId,
        id: AlertId,
        reason: &str,
    ) -> Result<(), NodeError> {
        self.require(caller, Capability::Guardian)?;
        self.transact("emergency_override", |state, _now, events| {
            state.oracle.emergency_override(id, reason)?;
            events.push(Event::AlertBlocked {
                alert_id: id,
                guardian: caller.clone(),
                reason: reason.to_string(),
            });
            Ok(())
        })
    }

    /// Move the caller's funds into the reward pool.
    pub fn fund_reward_pool(&mut self, caller: &AccountId, amount: u128) -> Result<(), NodeError> {
        guard_user(caller)?;
        self.transact("fund_reward_pool", |state, _now, events| {
            state.oracle.fund_pool(&mut state.ledger, caller, amount)?;
            events.push(Event::PoolFunded {
                funder: caller.clone(),
                amount,
            });
            Ok(())
        })
    }

    pub fn claim_rewards(&mut self, caller: &AccountId) -> Result<u128, NodeError> {
        guard_user(caller)?;
        self.transact("claim_rewards", |state, _now, events| {
            let amount = state.oracle.claim_rewards(&mut state.ledger, caller)?;
            events.push(Event::RewardsClaimed {
                operator: caller.clone(),
                amount,
            });
            Ok(amount)
        })
    }

    // ── Governance ─────────────────────────────────────────────────────

    pub fn propose(
        &mut self,
        caller: &AccountId,
        draft: ProposalDraft,
    ) -> Result<Proposal, NodeError> {
        guard_user(caller)?;
        self.transact("propose", |state, now, events| {
            let proposal =
                state
                    .governance
                    .propose(caller, draft.clone(), &state.ledger, now)?;
            events.push(Event::ProposalCreated {
                proposal_id: proposal.id,
                proposer: caller.clone(),
                draft,
            });
            Ok(proposal)
        })
    }

    pub fn cast_vote(
        &mut self,
        caller: &AccountId,
        id: ProposalId,
        choice: VoteChoice,
    ) -> Result<VoteRecord, NodeError> {
        guard_user(caller)?;
        self.transact("cast_vote", |state, now, events| {
            let record = state
                .governance
                .cast_vote(id, caller, choice, &state.ledger, now)?;
            events.push(Event::VoteCast {
                proposal_id: id,
                voter: caller.clone(),
                choice,
                weight: record.weight,
            });
            Ok(record)
        })
    }

    /// Weight `voter` would carry on proposal `id`.
    ///
    /// Fixes the voter's balance in the proposal's snapshot on first call,
    /// so this goes through a transaction even though it logs nothing.
    pub fn voting_power(&mut self, voter: &AccountId, id: ProposalId) -> Result<u128, NodeError> {
        guard_user(voter)?;
        self.transact("voting_power", |state, _now, _events| {
            Ok(state.governance.voting_power(id, voter, &state.ledger)?)
        })
    }

    pub fn finalize_proposal(&mut self, id: ProposalId) -> Result<ProposalStatus, NodeError> {
        self.transact("finalize_proposal", |state, now, events| {
            let status = state.governance.finalize_proposal(id, now)?;
            events.push(Event::ProposalFinalized {
                proposal_id: id,
                status,
            });
            Ok(status)
        })
    }

    /// Run a queued proposal whose timelock has passed.
    ///
    /// A failed action rolls back entirely; the failure reason is then
    /// recorded on the proposal in its own transaction so it stays visible.
    pub fn execute_proposal(&mut self, id: ProposalId) -> Result<(), NodeError> {
        let result = self.transact("execute_proposal", |state, now, events| {
            let State {
                ledger,
                oracle,
                governance,
                access,
                params,
                ..
            } = &mut *state;
            let mut executor = EconomyExecutor {
                ledger,
                oracle,
                access,
                params: params.clone(),
                events: Vec::new(),
            };
            governance.execute_proposal(id, &mut executor, now)?;
            let EconomyExecutor {
                params: updated,
                events: produced,
                ..
            } = executor;
            events.extend(produced);
            events.push(Event::ProposalExecuted { proposal_id: id });
            push_params(state, updated)
        });

        if let Err(NodeError::Governance(GovernanceError::ExecutionFailed { reason, .. })) =
            &result
        {
            let reason = reason.clone();
            self.transact("record_execution_failure", |state, _now, events| {
                state.governance.record_execution_failure(id, &reason)?;
                events.push(Event::ProposalExecutionFailed {
                    proposal_id: id,
                    reason,
                });
                Ok(())
            })?;
        }
        result
    }

    pub fn veto_proposal(
        &mut self,
        caller: &AccountId,
        id: ProposalId,
    ) -> Result<VetoOutcome, NodeError> {
        self.require(caller, Capability::Guardian)?;
        self.transact("veto_proposal", |state, _now, events| {
            let outcome = state.governance.veto_proposal(id, caller)?;
            events.push(Event::VetoCast {
                proposal_id: id,
                guardian: caller.clone(),
                vetoed: outcome.vetoed,
            });
            Ok(outcome)
        })
    }

    // ── Access control ─────────────────────────────────────────────────

    /// Returns false if the account already held the role.
    pub fn grant_role(
        &mut self,
        caller: &AccountId,
        account: &AccountId,
        role: Role,
    ) -> Result<bool, NodeError> {
        self.require(caller, Capability::Administer)?;
        guard_user(account)?;
        self.transact("grant_role", |state, _now, events| {
            let granted = state.access.grant(account, role);
            if granted {
                events.push(Event::RoleGranted {
                    account: account.clone(),
                    role,
                });
            }
            Ok(granted)
        })
    }

    /// Returns false if the account did not hold the role.
    pub fn revoke_role(
        &mut self,
        caller: &AccountId,
        account: &AccountId,
        role: Role,
    ) -> Result<bool, NodeError> {
        self.require(caller, Capability::Administer)?;
        self.transact("revoke_role", |state, _now, events| {
            let revoked = state.access.revoke(account, role);
            if revoked {
                events.push(Event::RoleRevoked {
                    account: account.clone(),
                    role,
                });
            }
            Ok(revoked)
        })
    }

    // ── Integrity ──────────────────────────────────────────────────────

    /// Check every cross-engine invariant against the ledger.
    pub fn audit(&self) -> Result<(), NodeError> {
        let state = &self.state;
        state.ledger.audit_supply().map_err(violation)?;
        state.staking.audit(&state.ledger).map_err(violation)?;
        state.oracle.audit(&state.ledger).map_err(violation)?;
        let escrow = state.ledger.balance_of(&AccountId::escrow());
        if escrow > state.ledger.total_supply() {
            return Err(violation(format!(
                "escrow holds {escrow}, above total supply {}",
                state.ledger.total_supply()
            )));
        }
        Ok(())
    }

    /// Rebuild state from the log and compare it with the live engines.
    pub fn verify_replay(&self) -> Result<Projection, NodeError> {
        let records = self.store.load()?;
        let projection = Projection::replay(&records)?;
        if projection.head_hash() != self.head_hash {
            return Err(NodeError::Replay(
                "log head does not match the last committed record".into(),
            ));
        }
        projection.check_against(
            &self.state.ledger,
            &self.state.staking,
            &self.state.oracle,
            &self.state.governance,
            &self.state.access,
        )?;
        Ok(projection)
    }

    // ── Internals ──────────────────────────────────────────────────────

    fn require(&self, caller: &AccountId, capability: Capability) -> Result<(), NodeError> {
        if self.state.access.authorize(caller, capability) {
            return Ok(());
        }
        tracing::warn!(caller = %caller, %capability, "unauthorized call rejected");
        Err(NodeError::Unauthorized {
            caller: caller.to_string(),
            capability: capability.to_string(),
        })
    }

    fn now(&mut self) -> Result<Timestamp, NodeError> {
        let now = self.clock.now();
        if let Some(last) = self.last_now {
            if now < last {
                tracing::error!(%now, %last, "clock moved backwards");
                return Err(NodeError::ClockRegression { now, last });
            }
        }
        self.last_now = Some(now);
        Ok(now)
    }

    /// Run `op` all-or-nothing: on any error, including a failed audit or
    /// log append, the state is restored and nothing is written.
    fn transact<T>(
        &mut self,
        label: &'static str,
        op: impl FnOnce(&mut State<A>, Timestamp, &mut Vec<Event>) -> Result<T, NodeError>,
    ) -> Result<T, NodeError> {
        let now = self.now()?;
        let backup = self.state.clone();
        let mut events = Vec::new();

        let result = match op(&mut self.state, now, &mut events) {
            Ok(value) => self
                .audit()
                .and_then(|()| self.commit(now, events))
                .map(|()| value),
            Err(e) => Err(e),
        };

        if let Err(e) = &result {
            self.state = backup;
            if matches!(e, NodeError::InvariantViolation(_)) {
                tracing::error!(op = label, error = %e, "transaction rolled back");
            } else {
                tracing::warn!(op = label, error = %e, kind = ?e.kind(), "operation rejected");
            }
        }
        result
    }

    fn commit(&mut self, now: Timestamp, events: Vec<Event>) -> Result<(), NodeError> {
        if events.is_empty() {
            return Ok(());
        }
        let mut seq = self.next_seq;
        let mut prev = self.head_hash;
        let mut records = Vec::with_capacity(events.len());
        for event in events {
            let record = EventRecord::seal(seq, now, event, prev)?;
            prev = record.hash;
            seq += 1;
            records.push(record);
        }
        self.store.append(&records)?;
        for record in &records {
            tracing::debug!(seq = record.seq, event = record.event.label(), "event committed");
        }
        self.next_seq = seq;
        self.head_hash = prev;
        Ok(())
    }

    fn finish_alert(
        &mut self,
        id: AlertId,
        burn: Option<BurnSummary>,
    ) -> Result<AlertOutcome, NodeError> {
        let (reward, reward_error) = if burn.is_some() {
            match self.issue_reward(id) {
                Ok(amount) => (Some(amount), None),
                Err(e) => {
                    tracing::warn!(id, error = %e, "reward step failed; burn stands");
                    (None, Some(e.to_string()))
                }
            }
        } else {
            (None, None)
        };
        let alert = self
            .state
            .oracle
            .alert(id)
            .cloned()
            .ok_or(vigil_oracle::OracleError::AlertNotFound(id))?;
        Ok(AlertOutcome {
            alert,
            burn,
            reward,
            reward_error,
        })
    }

    fn issue_reward(&mut self, id: AlertId) -> Result<u128, NodeError> {
        self.transact("issue_reward", |state, now, events| {
            let amount = state.oracle.issue_reward(id, now)?;
            let operator = state
                .oracle
                .alert(id)
                .map(|a| a.operator.clone())
                .ok_or(vigil_oracle::OracleError::AlertNotFound(id))?;
            events.push(Event::RewardIssued {
                alert_id: id,
                operator,
                amount,
            });
            Ok(amount)
        })
    }
}

fn execute_if_ready<A>(
    state: &mut State<A>,
    id: AlertId,
    now: Timestamp,
    events: &mut Vec<Event>,
) -> Result<Option<BurnSummary>, NodeError> {
    if !state.oracle.should_execute(id) {
        return Ok(None);
    }
    let summary = state
        .oracle
        .execute_alert(id, &mut state.staking, &mut state.ledger, now)?;
    events.push(Event::AlertExecuted {
        alert_id: id,
        burns: summary
            .burns
            .iter()
            .map(|b| (b.owner.clone(), b.burned))
            .collect(),
    });
    Ok(Some(summary))
}

/// Push governed parameter changes into the engines that consume them.
fn push_params<A>(state: &mut State<A>, updated: EconomyParams) -> Result<(), NodeError> {
    let changed = changed_params(&state.params, &updated);
    if changed.is_empty() {
        return Ok(());
    }
    if updated.staking != state.params.staking {
        let flipped = state.staking.set_min_stake(updated.staking.min_stake);
        state.staking.set_burn_rate_bps(updated.staking.burn_rate_bps)?;
        state
            .staking
            .set_max_recipients_per_call(updated.staking.max_recipients_per_call);
        if !flipped.is_empty() {
            tracing::info!(count = flipped.len(), "stake activity re-derived");
        }
    }
    if updated.oracle != state.params.oracle {
        state.oracle.set_params(updated.oracle.clone())?;
    }
    if updated.governance != state.params.governance {
        state.governance.set_params(updated.governance.clone())?;
    }
    for param in changed {
        tracing::info!(%param, value = param.read(&updated), "parameter changed");
    }
    state.params = updated;
    Ok(())
}

/// Reject user-facing movements into accounts only an engine may fund.
fn guard_engine_account(account: &AccountId) -> Result<(), NodeError> {
    if *account == AccountId::escrow() || *account == AccountId::reward_pool() {
        return Err(NodeError::InvalidAccount(account.to_string()));
    }
    Ok(())
}

fn guard_user(account: &AccountId) -> Result<(), NodeError> {
    if !account.is_valid() || account.is_system() {
        return Err(NodeError::InvalidAccount(account.to_string()));
    }
    Ok(())
}

fn violation(detail: impl Display) -> NodeError {
    tracing::error!(%detail, "invariant violation");
    NodeError::InvariantViolation(detail.to_string())
}
