//! Read model rebuilt purely from the event log.
//!
//! Replay never runs engine logic: each event already carries its outcome,
//! so folding the log reproduces balances, stakes, alerts, rewards and
//! proposal state. [`Projection::check_against`] compares the result with
//! live engines.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use vigil_governance::{GovernanceEngine, ProposalId, ProposalStatus, VoteChoice};
use vigil_ledger::Ledger;
use vigil_oracle::{AlertId, AlertStatus, OracleEngine};
use vigil_staking::StakingEngine;
use vigil_store::{verify_chain, Event, EventRecord};
use vigil_types::{AccountId, Role};

use crate::access::AccessControl;
use crate::error::NodeError;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StakeView {
    pub amount: u128,
    pub total_burned: u128,
    pub alerts_received: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AlertView {
    pub operator: AccountId,
    pub status: AlertStatus,
    pub confidence: u8,
    pub burned: u128,
    pub reward: Option<u128>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProposalView {
    pub proposer: AccountId,
    pub status: ProposalStatus,
    pub votes_for: u128,
    pub votes_against: u128,
    pub votes_abstain: u128,
    pub failures: u32,
}

#[derive(Clone, Debug, Default)]
pub struct Projection {
    records: u64,
    head_hash: [u8; 32],
    balances: BTreeMap<AccountId, u128>,
    allowances: BTreeMap<AccountId, u128>,
    total_supply: u128,
    total_burned: u128,
    stakes: BTreeMap<AccountId, StakeView>,
    alerts: BTreeMap<AlertId, AlertView>,
    pool_available: u128,
    pending: BTreeMap<AccountId, u128>,
    proposals: BTreeMap<ProposalId, ProposalView>,
    votes: BTreeMap<(ProposalId, AccountId), (VoteChoice, u128)>,
    vetoes: BTreeMap<ProposalId, BTreeSet<AccountId>>,
    roles: BTreeMap<AccountId, BTreeSet<Role>>,
    parameters: BTreeMap<String, u128>,
}

/// JSON-friendly digest of a projection.
#[derive(Clone, Debug, Serialize)]
pub struct ProjectionSummary {
    pub records: u64,
    pub head_hash: String,
    pub total_supply: u128,
    pub total_burned: u128,
    pub escrow: u128,
    pub pool_available: u128,
    pub pending_rewards: u128,
    pub accounts: usize,
    pub stakes: BTreeMap<AccountId, StakeView>,
    pub alerts: BTreeMap<AlertId, AlertView>,
    pub proposals: BTreeMap<ProposalId, ProposalView>,
    pub roles: BTreeMap<AccountId, BTreeSet<Role>>,
    pub parameters: BTreeMap<String, u128>,
}

type FoldResult = Result<(), String>;

impl Projection {
    /// Verify the hash chain, then fold every record in order.
    pub fn replay(records: &[EventRecord]) -> Result<Self, NodeError> {
        let head_hash = verify_chain(records)?;
        let mut projection = Self {
            head_hash,
            ..Self::default()
        };
        for record in records {
            projection
                .apply(&record.event)
                .map_err(|e| NodeError::Replay(format!("record {}: {e}", record.seq)))?;
            projection.records += 1;
        }
        Ok(projection)
    }

    pub fn records(&self) -> u64 {
        self.records
    }

    pub fn head_hash(&self) -> [u8; 32] {
        self.head_hash
    }

    pub fn balance_of(&self, account: &AccountId) -> u128 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    pub fn total_supply(&self) -> u128 {
        self.total_supply
    }

    pub fn total_burned(&self) -> u128 {
        self.total_burned
    }

    pub fn stake(&self, owner: &AccountId) -> Option<&StakeView> {
        self.stakes.get(owner)
    }

    pub fn alert(&self, id: AlertId) -> Option<&AlertView> {
        self.alerts.get(&id)
    }

    pub fn proposal(&self, id: ProposalId) -> Option<&ProposalView> {
        self.proposals.get(&id)
    }

    pub fn vote(&self, id: ProposalId, voter: &AccountId) -> Option<(VoteChoice, u128)> {
        self.votes.get(&(id, voter.clone())).copied()
    }

    pub fn vetoes_on(&self, id: ProposalId) -> usize {
        self.vetoes.get(&id).map_or(0, |v| v.len())
    }

    pub fn pending_reward(&self, operator: &AccountId) -> u128 {
        self.pending.get(operator).copied().unwrap_or(0)
    }

    pub fn parameter(&self, name: &str) -> Option<u128> {
        self.parameters.get(name).copied()
    }

    pub fn summary(&self) -> ProjectionSummary {
        ProjectionSummary {
            records: self.records,
            head_hash: hex::encode(self.head_hash),
            total_supply: self.total_supply,
            total_burned: self.total_burned,
            escrow: self.balance_of(&AccountId::escrow()),
            pool_available: self.pool_available,
            pending_rewards: self.pending.values().sum(),
            accounts: self.balances.len(),
            stakes: self.stakes.clone(),
            alerts: self.alerts.clone(),
            proposals: self.proposals.clone(),
            roles: self.roles.clone(),
            parameters: self.parameters.clone(),
        }
    }

    fn apply(&mut self, event: &Event) -> FoldResult {
        match event {
            Event::Credited { account, amount } => {
                self.add(account, *amount)?;
                self.total_supply = checked_add(self.total_supply, *amount)?;
            }
            Event::Debited { account, amount } => {
                self.sub(account, *amount)?;
                self.total_supply = checked_sub(self.total_supply, *amount)?;
            }
            Event::Transferred { from, to, amount } => self.shift(from, to, *amount)?,
            Event::EscrowApproved { owner, amount } => {
                if *amount == 0 {
                    self.allowances.remove(owner);
                } else {
                    self.allowances.insert(owner.clone(), *amount);
                }
            }
            Event::Staked { owner, amount } => {
                let allowance = self.allowances.get(owner).copied().unwrap_or(0);
                let left = checked_sub(allowance, *amount)?;
                if left == 0 {
                    self.allowances.remove(owner);
                } else {
                    self.allowances.insert(owner.clone(), left);
                }
                self.shift(owner, &AccountId::escrow(), *amount)?;
                let stake = self.stakes.entry(owner.clone()).or_default();
                stake.amount = checked_add(stake.amount, *amount)?;
            }
            Event::Unstaked { owner, amount } => {
                self.shift(&AccountId::escrow(), owner, *amount)?;
                let stake = self
                    .stakes
                    .get_mut(owner)
                    .ok_or_else(|| format!("unstake by {owner} without a stake"))?;
                stake.amount = checked_sub(stake.amount, *amount)?;
            }
            Event::ParameterChanged { name, value } => {
                self.parameters.insert(name.clone(), *value);
            }
            Event::AlertSubmitted {
                alert_id,
                operator,
                submission,
            } => {
                self.alerts.insert(
                    *alert_id,
                    AlertView {
                        operator: operator.clone(),
                        status: AlertStatus::Pending,
                        confidence: submission.confidence,
                        burned: 0,
                        reward: None,
                    },
                );
            }
            Event::AlertConfirmed {
                alert_id,
                confidence,
            } => self.alert_mut(*alert_id)?.confidence = *confidence,
            Event::AlertExecuted { alert_id, burns } => {
                let mut total: u128 = 0;
                for (owner, burned) in burns {
                    let stake = self
                        .stakes
                        .get_mut(owner)
                        .ok_or_else(|| format!("burn on {owner} without a stake"))?;
                    stake.amount = checked_sub(stake.amount, *burned)?;
                    stake.total_burned = checked_add(stake.total_burned, *burned)?;
                    stake.alerts_received += 1;
                    total = checked_add(total, *burned)?;
                }
                if total > 0 {
                    self.sub(&AccountId::escrow(), total)?;
                    self.total_supply = checked_sub(self.total_supply, total)?;
                    self.total_burned = checked_add(self.total_burned, total)?;
                }
                let alert = self.alert_mut(*alert_id)?;
                alert.status = AlertStatus::Executed;
                alert.burned = total;
            }
            Event::RewardIssued {
                alert_id,
                operator,
                amount,
            } => {
                self.alert_mut(*alert_id)?.reward = Some(*amount);
                self.pool_available = checked_sub(self.pool_available, *amount)?;
                let pending = self.pending.entry(operator.clone()).or_insert(0);
                *pending = checked_add(*pending, *amount)?;
                if *pending == 0 {
                    self.pending.remove(operator);
                }
            }
            Event::AlertBlocked { alert_id, .. } => {
                self.alert_mut(*alert_id)?.status = AlertStatus::Blocked;
            }
            Event::PoolFunded { funder, amount } => {
                self.shift(funder, &AccountId::reward_pool(), *amount)?;
                self.pool_available = checked_add(self.pool_available, *amount)?;
            }
            Event::RewardsClaimed { operator, amount } => {
                self.shift(&AccountId::reward_pool(), operator, *amount)?;
                let pending = self.pending.remove(operator).unwrap_or(0);
                if pending != *amount {
                    return Err(format!(
                        "{operator} claimed {amount} with {pending} pending"
                    ));
                }
            }
            Event::ProposalCreated {
                proposal_id,
                proposer,
                ..
            } => {
                self.proposals.insert(
                    *proposal_id,
                    ProposalView {
                        proposer: proposer.clone(),
                        status: ProposalStatus::Active,
                        votes_for: 0,
                        votes_against: 0,
                        votes_abstain: 0,
                        failures: 0,
                    },
                );
            }
            Event::VoteCast {
                proposal_id,
                voter,
                choice,
                weight,
            } => {
                let proposal = self.proposal_mut(*proposal_id)?;
                let tally = match choice {
                    VoteChoice::For => &mut proposal.votes_for,
                    VoteChoice::Against => &mut proposal.votes_against,
                    VoteChoice::Abstain => &mut proposal.votes_abstain,
                };
                *tally = checked_add(*tally, *weight)?;
                self.votes
                    .insert((*proposal_id, voter.clone()), (*choice, *weight));
            }
            Event::ProposalFinalized {
                proposal_id,
                status,
            } => self.proposal_mut(*proposal_id)?.status = *status,
            Event::ProposalExecuted { proposal_id } => {
                self.proposal_mut(*proposal_id)?.status = ProposalStatus::Executed;
            }
            Event::ProposalExecutionFailed { proposal_id, .. } => {
                self.proposal_mut(*proposal_id)?.failures += 1;
            }
            Event::VetoCast {
                proposal_id,
                guardian,
                vetoed,
            } => {
                self.vetoes
                    .entry(*proposal_id)
                    .or_default()
                    .insert(guardian.clone());
                if *vetoed {
                    self.proposal_mut(*proposal_id)?.status = ProposalStatus::Vetoed;
                }
            }
            Event::RoleGranted { account, role } => {
                self.roles.entry(account.clone()).or_default().insert(*role);
            }
            Event::RoleRevoked { account, role } => {
                if let Some(set) = self.roles.get_mut(account) {
                    set.remove(role);
                    if set.is_empty() {
                        self.roles.remove(account);
                    }
                }
            }
        }
        Ok(())
    }

    /// Compare against live engines; the first divergence is an error.
    pub fn check_against(
        &self,
        ledger: &Ledger,
        staking: &StakingEngine,
        oracle: &OracleEngine,
        governance: &GovernanceEngine,
        access: &impl AccessControl,
    ) -> Result<(), NodeError> {
        let diverged = |what: String| Err(NodeError::Replay(format!("replay diverges: {what}")));

        if self.total_supply != ledger.total_supply() || self.total_burned != ledger.total_burned()
        {
            return diverged(format!(
                "supply {}/{} burned {}/{} (log/live)",
                self.total_supply,
                ledger.total_supply(),
                self.total_burned,
                ledger.total_burned()
            ));
        }
        let live_balances: BTreeMap<&AccountId, u128> =
            ledger.accounts().filter(|(_, b)| *b > 0).collect();
        let logged_balances: BTreeMap<&AccountId, u128> = self
            .balances
            .iter()
            .filter(|(_, b)| **b > 0)
            .map(|(a, b)| (a, *b))
            .collect();
        if live_balances != logged_balances {
            return diverged("account balances".into());
        }
        for (owner, _) in ledger.accounts() {
            if self.allowances.get(owner).copied().unwrap_or(0) != ledger.allowance(owner) {
                return diverged(format!("escrow allowance of {owner}"));
            }
        }

        let live_stakes: BTreeMap<&AccountId, StakeView> = staking
            .stakes()
            .map(|s| {
                (
                    &s.owner,
                    StakeView {
                        amount: s.amount,
                        total_burned: s.total_burned,
                        alerts_received: s.alerts_received,
                    },
                )
            })
            .collect();
        let logged_stakes: BTreeMap<&AccountId, StakeView> =
            self.stakes.iter().map(|(a, v)| (a, v.clone())).collect();
        if live_stakes != logged_stakes {
            return diverged("stake records".into());
        }

        if oracle.alerts().count() != self.alerts.len() {
            return diverged("alert count".into());
        }
        for alert in oracle.alerts() {
            let matches = self.alerts.get(&alert.id).is_some_and(|view| {
                view.status == alert.status
                    && view.confidence == alert.confidence
                    && view.burned == alert.burned
                    && view.reward == alert.reward
                    && view.operator == alert.operator
            });
            if !matches {
                return diverged(format!("alert {}", alert.id));
            }
        }
        if self.pool_available != oracle.pool_available()
            || self.pending.values().sum::<u128>() != oracle.pool().total_pending()
        {
            return diverged("reward pool".into());
        }
        for (operator, amount) in &self.pending {
            if oracle.pending_reward(operator) != *amount {
                return diverged(format!("pending reward of {operator}"));
            }
        }

        if governance.proposals().count() != self.proposals.len() {
            return diverged("proposal count".into());
        }
        for proposal in governance.proposals() {
            let matches = self.proposals.get(&proposal.id).is_some_and(|view| {
                view.status == proposal.status
                    && view.votes_for == proposal.votes_for
                    && view.votes_against == proposal.votes_against
                    && view.votes_abstain == proposal.votes_abstain
            });
            if !matches || self.vetoes_on(proposal.id) != governance.vetoes_on(proposal.id) {
                return diverged(format!("proposal {}", proposal.id));
            }
        }
        if governance.votes().count() != self.votes.len() {
            return diverged("vote count".into());
        }

        for role in [Role::Oracle, Role::Guardian, Role::Admin] {
            let logged: Vec<AccountId> = self
                .roles
                .iter()
                .filter(|(_, r)| r.contains(&role))
                .map(|(a, _)| a.clone())
                .collect();
            let mut live = access.holders(role);
            live.sort();
            if logged != live {
                return diverged(format!("{role} holders"));
            }
        }
        Ok(())
    }

    fn add(&mut self, account: &AccountId, amount: u128) -> FoldResult {
        let balance = self.balances.entry(account.clone()).or_insert(0);
        *balance = checked_add(*balance, amount)?;
        Ok(())
    }

    fn sub(&mut self, account: &AccountId, amount: u128) -> FoldResult {
        let balance = self.balances.entry(account.clone()).or_insert(0);
        let held = *balance;
        *balance = held
            .checked_sub(amount)
            .ok_or_else(|| format!("{account} holds {held}, event removes {amount}"))?;
        Ok(())
    }

    fn shift(&mut self, from: &AccountId, to: &AccountId, amount: u128) -> FoldResult {
        self.sub(from, amount)?;
        self.add(to, amount)
    }

    fn alert_mut(&mut self, id: AlertId) -> Result<&mut AlertView, String> {
        self.alerts
            .get_mut(&id)
            .ok_or_else(|| format!("unknown alert {id}"))
    }

    fn proposal_mut(&mut self, id: ProposalId) -> Result<&mut ProposalView, String> {
        self.proposals
            .get_mut(&id)
            .ok_or_else(|| format!("unknown proposal {id}"))
    }
}

fn checked_add(a: u128, b: u128) -> Result<u128, String> {
    a.checked_add(b).ok_or_else(|| "amount overflow".to_string())
}

fn checked_sub(a: u128, b: u128) -> Result<u128, String> {
    a.checked_sub(b)
        .ok_or_else(|| format!("{a} minus {b} underflows"))
}
