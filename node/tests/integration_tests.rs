//! Integration tests exercising the full control plane:
//! authorization → transaction → engines → event log → replay.
//!
//! These wire the engines together the way a host would, with nullable time
//! and storage, and check that the log alone reproduces live state.

use vigil_governance::{
    GovernableParam, GovernanceError, ProposalAction, ProposalDraft, ProposalKind,
    ProposalStatus, VoteChoice,
};
use vigil_node::{ControlPlane, NodeConfig, NodeError, Projection, RoleGrant, RoleRegistry};
use vigil_nullables::{NullClock, NullEventStore};
use vigil_oracle::{AlertStatus, AlertSubmission, OracleError};
use vigil_store::{Event, EventStore, FileEventStore, StoreError};
use vigil_types::{tokens, AccountId, AlertType, ErrorKind, RegionId, Role, SECS_PER_DAY};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

type Plane = ControlPlane<NullClock, NullEventStore, RoleRegistry>;

const START: u64 = 10 * SECS_PER_DAY;

fn acct(name: &str) -> AccountId {
    AccountId::new(name)
}

fn config() -> NodeConfig {
    let grant = |name: &str, role| RoleGrant {
        account: acct(name),
        role,
    };
    NodeConfig {
        roles: vec![
            grant("admin", Role::Admin),
            grant("op", Role::Oracle),
            grant("g1", Role::Guardian),
            grant("g2", Role::Guardian),
            grant("g3", Role::Guardian),
        ],
        ..NodeConfig::default()
    }
}

fn new_plane() -> Plane {
    ControlPlane::new(
        &config(),
        NullClock::new(START),
        NullEventStore::new(),
        RoleRegistry::new(),
    )
    .expect("fresh control plane")
}

fn fund(plane: &mut Plane, who: &str, amount: u128) {
    plane.credit(&acct("admin"), &acct(who), amount).unwrap();
}

fn stake(plane: &mut Plane, who: &str, amount: u128) {
    fund(plane, who, amount);
    plane.approve_escrow(&acct(who), amount).unwrap();
    plane.stake(&acct(who), amount).unwrap();
}

fn alert(alert_type: AlertType, confidence: u8, recipients: &[&str]) -> AlertSubmission {
    AlertSubmission {
        alert_type,
        region: RegionId::new("delta"),
        confidence,
        severity: 4,
        source: "river-gauge".into(),
        recipients: recipients.iter().map(|r| acct(r)).collect(),
    }
}

fn draft(action: ProposalAction, value: u128) -> ProposalDraft {
    ProposalDraft {
        kind: action.kind(),
        title: action.describe(),
        description: String::new(),
        action,
        value,
    }
}

/// Vote the proposal through and wait out voting and the timelock.
fn pass(plane: &mut Plane, id: u64, voter: &str) {
    plane.cast_vote(&acct(voter), id, VoteChoice::For).unwrap();
    let params = plane.params().governance.clone();
    plane.clock().advance(params.voting_period_secs);
    assert_eq!(plane.finalize_proposal(id).unwrap(), ProposalStatus::Queued);
    plane.clock().advance(params.timelock_delay_secs);
}

// ---------------------------------------------------------------------------
// Alerts, burns and rewards
// ---------------------------------------------------------------------------

#[test]
fn alert_burns_stake_and_reward_is_claimable() {
    let mut plane = new_plane();
    for holder in ["alice", "bob", "carol"] {
        stake(&mut plane, holder, tokens(1_000));
    }
    fund(&mut plane, "donor", tokens(50_000));
    plane.fund_reward_pool(&acct("donor"), tokens(50_000)).unwrap();

    let outcome = plane
        .submit_alert(
            &acct("op"),
            alert(AlertType::Flood, 90, &["alice", "bob", "carol", "dave"]),
        )
        .unwrap();
    let burn = outcome.burn.expect("alert executed");
    assert_eq!(burn.total_burned, tokens(300));
    assert_eq!(burn.affected, 3);
    assert_eq!(burn.skipped, 1);
    assert_eq!(outcome.reward, Some(tokens(15)));
    assert_eq!(outcome.alert.status, AlertStatus::Executed);

    assert_eq!(plane.stake_of(&acct("alice")).map(|s| s.amount), Some(tokens(900)));
    assert_eq!(plane.ledger().total_burned(), tokens(300));
    assert_eq!(plane.pending_reward(&acct("op")), tokens(15));
    assert_eq!(plane.oracle().pool_available(), tokens(49_985));

    assert_eq!(plane.claim_rewards(&acct("op")).unwrap(), tokens(15));
    assert_eq!(plane.balance_of(&acct("op")), tokens(15));
    assert_eq!(plane.balance_of(&AccountId::reward_pool()), tokens(49_985));
    assert!(matches!(
        plane.claim_rewards(&acct("op")),
        Err(NodeError::Oracle(OracleError::NothingToClaim(_)))
    ));

    plane.audit().unwrap();
    let projection = plane.verify_replay().unwrap();
    assert_eq!(projection.total_burned(), tokens(300));
    assert_eq!(projection.pending_reward(&acct("op")), 0);
}

#[test]
fn low_confidence_alert_has_no_ledger_effect_until_confirmed() {
    let mut plane = new_plane();
    stake(&mut plane, "alice", tokens(1_000));
    let supply = plane.ledger().total_supply();

    let outcome = plane
        .submit_alert(&acct("op"), alert(AlertType::Wildfire, 50, &["alice"]))
        .unwrap();
    assert!(outcome.burn.is_none());
    assert_eq!(outcome.alert.status, AlertStatus::Pending);
    assert_eq!(plane.ledger().total_supply(), supply);
    assert_eq!(plane.stake_of(&acct("alice")).map(|s| s.amount), Some(tokens(1_000)));

    let confirmed = plane
        .confirm_alert(&acct("op"), outcome.alert.id, 80)
        .unwrap();
    assert_eq!(confirmed.burn.map(|b| b.total_burned), Some(tokens(100)));
    assert_eq!(confirmed.alert.status, AlertStatus::Executed);
    plane.verify_replay().unwrap();
}

#[test]
fn guardian_override_blocks_pending_alert() {
    let mut plane = new_plane();
    stake(&mut plane, "alice", tokens(1_000));
    let pending = plane
        .submit_alert(&acct("op"), alert(AlertType::Cyclone, 30, &["alice"]))
        .unwrap();

    assert!(matches!(
        plane.emergency_override(&acct("op"), pending.alert.id, "false positive"),
        Err(NodeError::Unauthorized { .. })
    ));
    plane
        .emergency_override(&acct("g1"), pending.alert.id, "false positive")
        .unwrap();
    assert_eq!(
        plane.alert(pending.alert.id).map(|a| a.status),
        Some(AlertStatus::Blocked)
    );

    let err = plane
        .confirm_alert(&acct("op"), pending.alert.id, 99)
        .unwrap_err();
    assert!(matches!(err, NodeError::Oracle(OracleError::Blocked(_))));
    assert_eq!(err.kind(), ErrorKind::Idempotency);
    assert_eq!(plane.stake_of(&acct("alice")).map(|s| s.amount), Some(tokens(1_000)));
    plane.verify_replay().unwrap();
}

#[test]
fn eleventh_alert_in_a_region_day_is_rate_limited() {
    let mut plane = new_plane();
    for alert_type in AlertType::ALL {
        plane
            .submit_alert(&acct("op"), alert(alert_type, 10, &[]))
            .unwrap();
    }
    let err = plane
        .submit_alert(&acct("op"), alert(AlertType::Flood, 10, &[]))
        .unwrap_err();
    assert!(matches!(
        err,
        NodeError::Oracle(OracleError::DailyCapReached { .. })
    ));
    assert_eq!(err.kind(), ErrorKind::RateLimited);

    plane.clock().advance(SECS_PER_DAY);
    plane
        .submit_alert(&acct("op"), alert(AlertType::Flood, 10, &[]))
        .unwrap();
}

// ---------------------------------------------------------------------------
// Authorization, time and atomicity
// ---------------------------------------------------------------------------

#[test]
fn unauthorized_calls_change_nothing() {
    let mut plane = new_plane();
    let before = plane.event_count();

    let err = plane
        .submit_alert(&acct("mallory"), alert(AlertType::Flood, 99, &[]))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert!(plane
        .credit(&acct("mallory"), &acct("mallory"), tokens(1))
        .is_err());
    assert!(plane
        .grant_role(&acct("mallory"), &acct("mallory"), Role::Admin)
        .is_err());

    assert_eq!(plane.event_count(), before);
    assert_eq!(plane.balance_of(&acct("mallory")), 0);
}

#[test]
fn role_changes_are_logged() {
    let mut plane = new_plane();
    assert!(plane
        .grant_role(&acct("admin"), &acct("op2"), Role::Oracle)
        .unwrap());
    assert!(!plane
        .grant_role(&acct("admin"), &acct("op2"), Role::Oracle)
        .unwrap());
    plane
        .submit_alert(&acct("op2"), alert(AlertType::Drought, 10, &[]))
        .unwrap();
    assert!(plane
        .revoke_role(&acct("admin"), &acct("op2"), Role::Oracle)
        .unwrap());
    assert!(plane
        .submit_alert(&acct("op2"), alert(AlertType::Heatwave, 10, &[]))
        .is_err());
    assert!(matches!(
        plane.grant_role(&acct("admin"), &AccountId::treasury(), Role::Admin),
        Err(NodeError::InvalidAccount(_))
    ));
    plane.verify_replay().unwrap();
}

#[test]
fn clock_regression_is_rejected() {
    let mut plane = new_plane();
    plane.clock().set(START - 1);
    let err = plane
        .credit(&acct("admin"), &acct("alice"), tokens(1))
        .unwrap_err();
    assert!(matches!(err, NodeError::ClockRegression { .. }));
    assert_eq!(err.kind(), ErrorKind::Internal);

    plane.clock().set(START + 5);
    plane.credit(&acct("admin"), &acct("alice"), tokens(1)).unwrap();
}

#[test]
fn failed_append_rolls_back_the_operation() {
    let mut plane = new_plane();
    stake(&mut plane, "alice", tokens(1_000));
    let before = plane.event_count();

    plane.store().fail_next_append("disk full");
    assert!(matches!(
        plane.unstake(&acct("alice")),
        Err(NodeError::Store(StoreError::Backend(_)))
    ));
    assert_eq!(plane.event_count(), before);
    assert_eq!(plane.stake_of(&acct("alice")).map(|s| s.amount), Some(tokens(1_000)));
    assert_eq!(plane.balance_of(&acct("alice")), 0);

    assert_eq!(plane.unstake(&acct("alice")).unwrap(), tokens(1_000));
    assert_eq!(plane.balance_of(&acct("alice")), tokens(1_000));
    plane.verify_replay().unwrap();
}

#[test]
fn engine_accounts_cannot_be_targeted_directly() {
    let mut plane = new_plane();
    fund(&mut plane, "alice", tokens(10));
    for target in [AccountId::escrow(), AccountId::reward_pool()] {
        assert!(matches!(
            plane.transfer(&acct("alice"), &target, tokens(1)),
            Err(NodeError::InvalidAccount(_))
        ));
        assert!(matches!(
            plane.credit(&acct("admin"), &target, tokens(1)),
            Err(NodeError::InvalidAccount(_))
        ));
    }
    plane
        .transfer(&acct("alice"), &AccountId::treasury(), tokens(4))
        .unwrap();
    assert_eq!(plane.balance_of(&AccountId::treasury()), tokens(4));
}

#[test]
fn system_accounts_cannot_vote_or_withdraw() {
    let mut plane = new_plane();
    stake(&mut plane, "alice", tokens(2_000));
    fund(&mut plane, "dora", tokens(10_000));
    let proposal = plane
        .propose(&acct("dora"), draft(ProposalAction::Signal, 0))
        .unwrap();

    let before = plane.event_count();
    assert!(matches!(
        plane.cast_vote(&AccountId::escrow(), proposal.id, VoteChoice::Against),
        Err(NodeError::InvalidAccount(_))
    ));
    assert!(matches!(
        plane.voting_power(&AccountId::escrow(), proposal.id),
        Err(NodeError::InvalidAccount(_))
    ));
    assert!(matches!(
        plane.unstake(&AccountId::escrow()),
        Err(NodeError::InvalidAccount(_))
    ));
    assert!(matches!(
        plane.claim_rewards(&AccountId::reward_pool()),
        Err(NodeError::InvalidAccount(_))
    ));
    assert_eq!(plane.event_count(), before);
    assert_eq!(plane.proposal(proposal.id).map(|p| p.votes_against), Some(0));
    assert_eq!(plane.balance_of(&AccountId::escrow()), tokens(2_000));
}

// ---------------------------------------------------------------------------
// Governance
// ---------------------------------------------------------------------------

#[test]
fn parameter_proposal_respects_timelock_then_applies() {
    let mut plane = new_plane();
    fund(&mut plane, "alice", tokens(10_000));
    fund(&mut plane, "bob", tokens(4_000));
    fund(&mut plane, "treasury-donor", tokens(5_000));

    let proposal = plane
        .propose(
            &acct("alice"),
            draft(ProposalAction::SetParameter(GovernableParam::BurnRateBps), 2_000),
        )
        .unwrap();
    assert!(matches!(
        plane.propose(&acct("alice"), draft(ProposalAction::Signal, 0)),
        Err(NodeError::Governance(GovernanceError::ProposerCooldown { .. }))
    ));

    assert_eq!(plane.voting_power(&acct("alice"), proposal.id).unwrap(), 100_000);
    plane
        .cast_vote(&acct("alice"), proposal.id, VoteChoice::For)
        .unwrap();
    let against = plane
        .cast_vote(&acct("bob"), proposal.id, VoteChoice::Against)
        .unwrap();
    assert_eq!(against.weight, 63_245);
    assert!(matches!(
        plane.finalize_proposal(proposal.id),
        Err(NodeError::Governance(GovernanceError::VotingOpen { .. }))
    ));

    let params = plane.params().governance.clone();
    plane.clock().advance(params.voting_period_secs);
    assert_eq!(
        plane.finalize_proposal(proposal.id).unwrap(),
        ProposalStatus::Queued
    );

    plane.clock().advance(params.timelock_delay_secs - 1);
    let err = plane.execute_proposal(proposal.id).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RateLimited);

    plane.clock().advance(1);
    plane.execute_proposal(proposal.id).unwrap();
    assert_eq!(
        plane.proposal(proposal.id).map(|p| p.status),
        Some(ProposalStatus::Executed)
    );
    assert_eq!(plane.params().staking.burn_rate_bps, 2_000);
    assert_eq!(plane.staking().params().burn_rate_bps, 2_000);

    let projection = plane.verify_replay().unwrap();
    assert_eq!(projection.parameter("burn_rate_bps"), Some(2_000));
}

#[test]
fn failed_treasury_grant_stays_queued_and_can_be_retried() {
    let mut plane = new_plane();
    fund(&mut plane, "alice", tokens(10_000));
    plane
        .credit(&acct("admin"), &AccountId::treasury(), tokens(5_000))
        .unwrap();

    let proposal = plane
        .propose(
            &acct("alice"),
            draft(ProposalAction::TreasuryGrant(acct("school")), tokens(8_000)),
        )
        .unwrap();
    assert_eq!(proposal.kind, ProposalKind::Treasury);
    pass(&mut plane, proposal.id, "alice");

    let before = plane.event_count();
    let err = plane.execute_proposal(proposal.id).unwrap_err();
    assert!(matches!(
        err,
        NodeError::Governance(GovernanceError::ExecutionFailed { .. })
    ));
    assert_eq!(err.kind(), ErrorKind::ExecutionFailure);
    assert_eq!(plane.event_count(), before + 1);
    let queued = plane.proposal(proposal.id).cloned().unwrap();
    assert_eq!(queued.status, ProposalStatus::Queued);
    assert!(queued.last_failure.is_some());
    assert_eq!(plane.balance_of(&acct("school")), 0);

    plane
        .credit(&acct("admin"), &AccountId::treasury(), tokens(5_000))
        .unwrap();
    plane.execute_proposal(proposal.id).unwrap();
    assert_eq!(plane.balance_of(&acct("school")), tokens(8_000));
    assert_eq!(plane.balance_of(&AccountId::treasury()), tokens(2_000));

    let projection = plane.verify_replay().unwrap();
    assert_eq!(projection.proposal(proposal.id).map(|p| p.failures), Some(1));
}

#[test]
fn treasury_can_fund_reward_pool_and_add_guardian() {
    let mut plane = new_plane();
    fund(&mut plane, "alice", tokens(10_000));
    fund(&mut plane, "bob", tokens(10_000));
    plane
        .credit(&acct("admin"), &AccountId::treasury(), tokens(3_000))
        .unwrap();

    let funding = plane
        .propose(&acct("alice"), draft(ProposalAction::FundRewardPool, tokens(3_000)))
        .unwrap();
    let guardian = plane
        .propose(&acct("bob"), draft(ProposalAction::AddGuardian(acct("g4")), 0))
        .unwrap();
    plane
        .cast_vote(&acct("alice"), funding.id, VoteChoice::For)
        .unwrap();
    plane
        .cast_vote(&acct("bob"), guardian.id, VoteChoice::For)
        .unwrap();

    let params = plane.params().governance.clone();
    plane.clock().advance(params.voting_period_secs);
    for id in [funding.id, guardian.id] {
        assert_eq!(plane.finalize_proposal(id).unwrap(), ProposalStatus::Queued);
    }
    plane.clock().advance(params.timelock_delay_secs);

    plane.execute_proposal(funding.id).unwrap();
    plane.execute_proposal(guardian.id).unwrap();
    assert_eq!(plane.oracle().pool_available(), tokens(3_000));
    assert!(plane.access().has_role(&acct("g4"), Role::Guardian));
    plane.audit().unwrap();
    plane.verify_replay().unwrap();
}

#[test]
fn lowering_daily_reward_cap_after_issuance_applies() {
    let mut plane = new_plane();
    for holder in ["alice", "bob", "carol"] {
        stake(&mut plane, holder, tokens(1_000));
    }
    fund(&mut plane, "donor", tokens(500));
    plane.fund_reward_pool(&acct("donor"), tokens(500)).unwrap();
    fund(&mut plane, "dora", tokens(10_000));

    let first = plane
        .submit_alert(&acct("op"), alert(AlertType::Flood, 90, &["alice", "bob", "carol"]))
        .unwrap();
    assert_eq!(first.reward, Some(tokens(15)));

    let proposal = plane
        .propose(
            &acct("dora"),
            draft(ProposalAction::SetParameter(GovernableParam::DailyRewardCap), tokens(10)),
        )
        .unwrap();
    pass(&mut plane, proposal.id, "dora");
    plane.execute_proposal(proposal.id).unwrap();
    assert_eq!(
        plane.proposal(proposal.id).map(|p| p.status),
        Some(ProposalStatus::Executed)
    );
    assert_eq!(plane.oracle().params().daily_reward_cap, tokens(10));
    plane.audit().unwrap();

    // 10% of 900 from each holder is 270 burned; 5% of that exceeds the new cap.
    let second = plane
        .submit_alert(&acct("op"), alert(AlertType::Drought, 90, &["alice", "bob", "carol"]))
        .unwrap();
    assert_eq!(second.burn.map(|b| b.total_burned), Some(tokens(270)));
    assert_eq!(second.reward, Some(tokens(10)));
    plane.verify_replay().unwrap();
}

#[test]
fn pending_alert_executes_after_recipient_cap_is_lowered() {
    let mut plane = new_plane();
    for holder in ["alice", "bob", "carol"] {
        stake(&mut plane, holder, tokens(1_000));
    }
    fund(&mut plane, "dora", tokens(10_000));

    let pending = plane
        .submit_alert(&acct("op"), alert(AlertType::Flood, 50, &["alice", "bob", "carol"]))
        .unwrap();
    assert!(pending.burn.is_none());

    let proposal = plane
        .propose(
            &acct("dora"),
            draft(ProposalAction::SetParameter(GovernableParam::MaxRecipientsPerCall), 1),
        )
        .unwrap();
    pass(&mut plane, proposal.id, "dora");
    plane.execute_proposal(proposal.id).unwrap();
    assert_eq!(plane.staking().params().max_recipients_per_call, 1);

    let outcome = plane
        .confirm_alert(&acct("op"), pending.alert.id, 90)
        .unwrap();
    let burn = outcome.burn.expect("alert executed");
    assert_eq!(burn.affected, 3);
    assert_eq!(burn.total_burned, tokens(300));
    assert_eq!(outcome.alert.status, AlertStatus::Executed);

    // New submissions are held to the lowered cap.
    assert!(plane
        .submit_alert(&acct("op"), alert(AlertType::Drought, 90, &["alice", "bob"]))
        .is_err());
    plane.audit().unwrap();
    plane.verify_replay().unwrap();
}

#[test]
fn guardian_threshold_vetoes_proposal() {
    let mut plane = new_plane();
    fund(&mut plane, "alice", tokens(10_000));
    let proposal = plane
        .propose(&acct("alice"), draft(ProposalAction::Signal, 0))
        .unwrap();

    assert!(matches!(
        plane.veto_proposal(&acct("alice"), proposal.id),
        Err(NodeError::Unauthorized { .. })
    ));
    let first = plane.veto_proposal(&acct("g1"), proposal.id).unwrap();
    assert_eq!((first.vetoes, first.vetoed), (1, false));
    assert!(matches!(
        plane.veto_proposal(&acct("g1"), proposal.id),
        Err(NodeError::Governance(GovernanceError::AlreadyVetoed { .. }))
    ));
    assert!(!plane.veto_proposal(&acct("g2"), proposal.id).unwrap().vetoed);
    let last = plane.veto_proposal(&acct("g3"), proposal.id).unwrap();
    assert_eq!((last.vetoes, last.vetoed), (3, true));

    assert_eq!(
        plane.proposal(proposal.id).map(|p| p.status),
        Some(ProposalStatus::Vetoed)
    );
    assert!(matches!(
        plane.cast_vote(&acct("alice"), proposal.id, VoteChoice::For),
        Err(NodeError::Governance(GovernanceError::VotingClosed(_)))
    ));
    let projection = plane.verify_replay().unwrap();
    assert_eq!(projection.vetoes_on(proposal.id), 3);
}

// ---------------------------------------------------------------------------
// Event log
// ---------------------------------------------------------------------------

#[test]
fn tampered_record_breaks_replay() {
    let mut plane = new_plane();
    fund(&mut plane, "alice", tokens(10));
    let seq = plane.event_count() as usize - 1;
    plane.store().tamper(seq, |record| {
        record.event = Event::Credited {
            account: acct("alice"),
            amount: tokens(10_000),
        };
    });
    assert!(matches!(
        plane.verify_replay(),
        Err(NodeError::Store(StoreError::ChainBroken { .. }))
    ));
}

#[test]
fn file_log_replays_after_restart() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("events.log");
    {
        let mut plane = ControlPlane::new(
            &config(),
            NullClock::new(START),
            FileEventStore::open(&path),
            RoleRegistry::new(),
        )
        .unwrap();
        plane
            .credit(&acct("admin"), &acct("alice"), tokens(1_000))
            .unwrap();
        plane.approve_escrow(&acct("alice"), tokens(400)).unwrap();
        plane.stake(&acct("alice"), tokens(400)).unwrap();
        plane.verify_replay().unwrap();
    }

    let store = FileEventStore::open(&path);
    let projection = Projection::replay(&store.load().unwrap()).unwrap();
    assert_eq!(projection.balance_of(&acct("alice")), tokens(600));
    assert_eq!(projection.stake(&acct("alice")).map(|s| s.amount), Some(tokens(400)));
    assert_eq!(projection.total_supply(), tokens(1_000));

    let reopened = ControlPlane::new(
        &config(),
        NullClock::new(START),
        FileEventStore::open(&path),
        RoleRegistry::new(),
    );
    assert!(matches!(reopened, Err(NodeError::Replay(_))));
}
