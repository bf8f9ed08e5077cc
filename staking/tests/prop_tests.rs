use proptest::prelude::*;

use vigil_ledger::Ledger;
use vigil_staking::StakingEngine;
use vigil_types::{AccountId, AlertType, RegionId, StakingParams, Timestamp};

fn engine(min_stake: u128, burn_rate_bps: u32) -> StakingEngine {
    StakingEngine::new(StakingParams {
        min_stake,
        burn_rate_bps,
        max_recipients_per_call: 100,
    })
}

fn staked(engine: &mut StakingEngine, ledger: &mut Ledger, name: &str, amount: u128) -> AccountId {
    let id = AccountId::new(name);
    ledger.credit(&id, amount).unwrap();
    ledger.approve_escrow(&id, amount).unwrap();
    engine.stake(ledger, &id, amount, Timestamp::new(0)).unwrap();
    id
}

proptest! {
    /// Every burn removes exactly floor(amount * rate / 10_000).
    #[test]
    fn burn_amount_is_floor_of_rate(
        amount in 100u128..1_000_000_000_000,
        rate in 0u32..=10_000,
    ) {
        let mut engine = engine(100, rate);
        let mut ledger = Ledger::new();
        let alice = staked(&mut engine, &mut ledger, "alice", amount);

        engine
            .apply_alert_burn(&mut ledger, AlertType::Flood, &RegionId::new("R1"), &[alice.clone()])
            .unwrap();
        let after = engine.stake_of(&alice).unwrap().amount;
        prop_assert_eq!(after, amount - amount * rate as u128 / 10_000);
    }

    /// `active == amount >= min_stake` after any sequence of burns.
    #[test]
    fn active_flag_tracks_minimum(
        amounts in prop::collection::vec(100u128..100_000, 1..8),
        rate in 1u32..5_000,
        rounds in 1usize..40,
    ) {
        let mut engine = engine(100, rate);
        let mut ledger = Ledger::new();
        let owners: Vec<AccountId> = amounts
            .iter()
            .enumerate()
            .map(|(i, a)| staked(&mut engine, &mut ledger, &format!("acct{i}"), *a))
            .collect();

        for _ in 0..rounds {
            engine
                .apply_alert_burn(&mut ledger, AlertType::Cyclone, &RegionId::new("R1"), &owners)
                .unwrap();
            for stake in engine.stakes() {
                prop_assert_eq!(stake.active, stake.amount >= 100);
            }
        }
        engine.audit(&ledger).unwrap();
    }

    /// Per-stake burn totals always sum to the global counter and to the
    /// ledger's burned value.
    #[test]
    fn burn_totals_are_consistent(
        amounts in prop::collection::vec(100u128..1_000_000, 1..10),
        rate in 1u32..10_000,
        rounds in 1usize..10,
    ) {
        let mut engine = engine(100, rate);
        let mut ledger = Ledger::new();
        let owners: Vec<AccountId> = amounts
            .iter()
            .enumerate()
            .map(|(i, a)| staked(&mut engine, &mut ledger, &format!("acct{i}"), *a))
            .collect();

        for _ in 0..rounds {
            engine
                .apply_alert_burn(&mut ledger, AlertType::Drought, &RegionId::new("R2"), &owners)
                .unwrap();
        }
        let per_stake: u128 = engine.stakes().map(|s| s.total_burned).sum();
        prop_assert_eq!(per_stake, engine.total_burned());
        prop_assert_eq!(engine.total_burned(), ledger.total_burned());
        prop_assert!(engine.total_staked() <= ledger.total_supply());
    }

    /// Staking then unstaking restores the owner's balance when no burns happen.
    #[test]
    fn stake_unstake_restores_balance(amount in 100u128..1_000_000_000) {
        let mut engine = engine(100, 1000);
        let mut ledger = Ledger::new();
        let alice = staked(&mut engine, &mut ledger, "alice", amount);
        prop_assert_eq!(ledger.balance_of(&alice), 0);
        let returned = engine.unstake(&mut ledger, &alice).unwrap();
        prop_assert_eq!(returned, amount);
        prop_assert_eq!(ledger.balance_of(&alice), amount);
        prop_assert_eq!(ledger.balance_of(&AccountId::escrow()), 0);
    }
}
