//! Oracle alert engine.

use crate::alert::{Alert, AlertId, AlertStatus, AlertSubmission};
use crate::error::OracleError;
use crate::rate_limit::RateLimiter;
use crate::reward_pool::RewardPool;
use std::collections::BTreeMap;
use vigil_ledger::Ledger;
use vigil_staking::{BurnSummary, StakingEngine};
use vigil_types::{apply_bps, AccountId, OracleParams, RegionId, Timestamp};

const MAX_CONFIDENCE: u8 = 100;
const MIN_SEVERITY: u8 = 1;
const MAX_SEVERITY: u8 = 5;

/// Alert registry, rate limiter and reward pool.
///
/// Submission, burn and reward are separate calls so the caller can commit
/// each as its own transaction:
///
/// 1. [`submit_alert`](Self::submit_alert) validates, rate-limits and records.
/// 2. [`execute_alert`](Self::execute_alert) burns recipient stake.
/// 3. [`issue_reward`](Self::issue_reward) reserves the operator's reward.
#[derive(Clone, Debug)]
pub struct OracleEngine {
    params: OracleParams,
    alerts: BTreeMap<AlertId, Alert>,
    next_id: AlertId,
    rate_limiter: RateLimiter,
    pool: RewardPool,
}

impl OracleEngine {
    pub fn new(params: OracleParams) -> Self {
        Self {
            params,
            alerts: BTreeMap::new(),
            next_id: 1,
            rate_limiter: RateLimiter::new(),
            pool: RewardPool::new(),
        }
    }

    pub fn params(&self) -> &OracleParams {
        &self.params
    }

    pub fn alert(&self, id: AlertId) -> Option<&Alert> {
        self.alerts.get(&id)
    }

    pub fn alerts(&self) -> impl Iterator<Item = &Alert> {
        self.alerts.values()
    }

    pub fn pool(&self) -> &RewardPool {
        &self.pool
    }

    pub fn pool_available(&self) -> u128 {
        self.pool.available()
    }

    pub fn pending_reward(&self, operator: &AccountId) -> u128 {
        self.pool.pending_for(operator)
    }

    pub fn remaining_daily_budget(&self, now: Timestamp) -> u128 {
        self.pool
            .remaining_daily_budget(now.day(), self.params.daily_reward_cap)
    }

    pub fn alerts_today(&self, region: &RegionId, now: Timestamp) -> u32 {
        self.rate_limiter.alerts_on(region, now)
    }

    /// Whether a recorded alert would execute now.
    pub fn should_execute(&self, id: AlertId) -> bool {
        self.alerts.get(&id).is_some_and(|a| {
            a.status == AlertStatus::Pending && a.confidence >= self.params.min_confidence
        })
    }

    /// Validate, rate-limit and record an alert as `Pending`.
    ///
    /// Range checks run before the rate limiter, so malformed submissions
    /// never consume the region's daily quota.
    pub fn submit_alert(
        &mut self,
        operator: &AccountId,
        submission: AlertSubmission,
        max_recipients: usize,
        now: Timestamp,
    ) -> Result<Alert, OracleError> {
        validate_submission(&submission, max_recipients)?;

        if let Err(e) = self.rate_limiter.check_and_record(
            &submission.region,
            submission.alert_type,
            now,
            self.params.max_alerts_per_region_per_day,
            self.params.alert_cooldown_secs,
        ) {
            tracing::warn!(region = %submission.region, error = %e, "alert rate-limited");
            return Err(e);
        }

        let id = self.next_id;
        self.next_id += 1;
        let alert = Alert {
            id,
            alert_type: submission.alert_type,
            region: submission.region,
            confidence: submission.confidence,
            severity: submission.severity,
            source: submission.source,
            recipients: submission.recipients,
            operator: operator.clone(),
            submitted_at: now,
            status: AlertStatus::Pending,
            burned: 0,
            affected: 0,
            executed_at: None,
            reward: None,
            override_reason: None,
        };
        tracing::info!(
            id,
            alert_type = alert.alert_type.label(),
            region = %alert.region,
            confidence = alert.confidence,
            operator = %operator,
            "alert recorded"
        );
        self.alerts.insert(id, alert.clone());
        Ok(alert)
    }

    /// Raise the confidence of a `Pending` alert.
    ///
    /// Returns whether the alert now meets the execution threshold.
    pub fn confirm_alert(&mut self, id: AlertId, confidence: u8) -> Result<bool, OracleError> {
        if confidence > MAX_CONFIDENCE {
            return Err(OracleError::InvalidConfidence(confidence));
        }
        let min_confidence = self.params.min_confidence;
        let alert = self.pending_mut(id)?;
        if confidence < alert.confidence {
            return Err(OracleError::InvalidConfidence(confidence));
        }
        alert.confidence = confidence;
        tracing::info!(id, confidence, "alert confidence raised");
        Ok(confidence >= min_confidence)
    }

    /// Burn recipient stake for a `Pending` alert that meets the threshold.
    pub fn execute_alert(
        &mut self,
        id: AlertId,
        staking: &mut StakingEngine,
        ledger: &mut Ledger,
        now: Timestamp,
    ) -> Result<BurnSummary, OracleError> {
        let min_confidence = self.params.min_confidence;
        let alert = self.pending_mut(id)?;
        if alert.confidence < min_confidence {
            return Err(OracleError::BelowConfidence {
                id,
                confidence: alert.confidence,
                minimum: min_confidence,
            });
        }

        // The recipient list was bounded at submission.
        let summary =
            staking.apply_admitted_burn(ledger, alert.alert_type, &alert.region, &alert.recipients)?;
        alert.status = AlertStatus::Executed;
        alert.burned = summary.total_burned;
        alert.affected = summary.affected;
        alert.executed_at = Some(now);
        Ok(summary)
    }

    /// Reserve the operator's reward for an executed alert.
    ///
    /// `reward = min(burn × rate, max_per_alert, daily budget left, pool available)`.
    /// The reward may be zero; the alert is marked rewarded either way.
    pub fn issue_reward(&mut self, id: AlertId, now: Timestamp) -> Result<u128, OracleError> {
        let alert = self.alerts.get(&id).ok_or(OracleError::AlertNotFound(id))?;
        if alert.status != AlertStatus::Executed {
            return Err(OracleError::NotExecuted(id));
        }
        if alert.reward.is_some() {
            return Err(OracleError::RewardAlreadyIssued(id));
        }

        let day = now.day();
        let cap = self.params.daily_reward_cap;
        let reward = apply_bps(alert.burned, self.params.reward_rate_bps)
            .ok_or(OracleError::Overflow)?
            .min(self.params.max_reward_per_alert)
            .min(self.pool.remaining_daily_budget(day, cap))
            .min(self.pool.available());

        let operator = alert.operator.clone();
        if reward > 0 {
            self.pool.reserve(&operator, reward, day, cap)?;
        }
        if let Some(alert) = self.alerts.get_mut(&id) {
            alert.reward = Some(reward);
        }
        tracing::info!(id, operator = %operator, reward, "alert reward reserved");
        Ok(reward)
    }

    /// Block a `Pending` alert permanently.
    pub fn emergency_override(&mut self, id: AlertId, reason: &str) -> Result<(), OracleError> {
        let alert = self.pending_mut(id)?;
        alert.status = AlertStatus::Blocked;
        alert.override_reason = Some(reason.to_string());
        tracing::warn!(id, reason, "alert blocked by override");
        Ok(())
    }

    /// Move `amount` from `funder` into the reward pool account.
    pub fn fund_pool(
        &mut self,
        ledger: &mut Ledger,
        funder: &AccountId,
        amount: u128,
    ) -> Result<(), OracleError> {
        if amount == 0 {
            return Err(OracleError::ZeroAmount);
        }
        self.pool.available().checked_add(amount).ok_or(OracleError::Overflow)?;
        ledger.transfer(funder, &AccountId::reward_pool(), amount)?;
        self.pool.fund(amount)?;
        tracing::info!(funder = %funder, amount, available = self.pool.available(), "reward pool funded");
        Ok(())
    }

    /// Pay out everything pending for `operator`.
    pub fn claim_rewards(
        &mut self,
        ledger: &mut Ledger,
        operator: &AccountId,
    ) -> Result<u128, OracleError> {
        let pending = self.pool.pending_for(operator);
        if pending == 0 {
            return Err(OracleError::NothingToClaim(operator.to_string()));
        }
        let held = ledger.balance_of(&AccountId::reward_pool());
        if held < pending {
            return Err(OracleError::InsufficientPool {
                needed: pending,
                available: held,
            });
        }
        ledger.transfer(&AccountId::reward_pool(), operator, pending)?;
        self.pool.take_pending(operator);
        tracing::info!(operator = %operator, amount = pending, "rewards claimed");
        Ok(pending)
    }

    /// Replace the parameter set. Rate-limit state is kept.
    pub fn set_params(&mut self, params: OracleParams) -> Result<(), OracleError> {
        if params.min_confidence > MAX_CONFIDENCE {
            return Err(OracleError::InvalidConfidence(params.min_confidence));
        }
        if params.reward_rate_bps > 10_000 {
            return Err(OracleError::InvariantViolation(format!(
                "reward rate {} bps above 10000",
                params.reward_rate_bps
            )));
        }
        self.params = params;
        Ok(())
    }

    /// Check pool accounting and daily caps against the ledger.
    ///
    /// Each day is held to the cap it was issued under, not the current one.
    pub fn audit(&self, ledger: &Ledger) -> Result<(), OracleError> {
        let held = ledger.balance_of(&AccountId::reward_pool());
        let accounted = self
            .pool
            .available()
            .checked_add(self.pool.total_pending())
            .ok_or(OracleError::Overflow)?;
        if held != accounted {
            return Err(OracleError::InvariantViolation(format!(
                "reward pool account holds {held}, pool accounts for {accounted}"
            )));
        }
        for (day, entry) in self.pool.daily_issuance() {
            if entry.issued > entry.cap {
                return Err(OracleError::InvariantViolation(format!(
                    "day {} issued {}, above cap {}",
                    day.as_u64(),
                    entry.issued,
                    entry.cap
                )));
            }
        }
        Ok(())
    }

    fn pending_mut(&mut self, id: AlertId) -> Result<&mut Alert, OracleError> {
        let alert = self.alerts.get_mut(&id).ok_or(OracleError::AlertNotFound(id))?;
        match alert.status {
            AlertStatus::Pending => Ok(alert),
            AlertStatus::Executed => Err(OracleError::AlreadyExecuted(id)),
            AlertStatus::Blocked => Err(OracleError::Blocked(id)),
        }
    }
}

fn validate_submission(s: &AlertSubmission, max_recipients: usize) -> Result<(), OracleError> {
    if s.confidence > MAX_CONFIDENCE {
        return Err(OracleError::InvalidConfidence(s.confidence));
    }
    if !(MIN_SEVERITY..=MAX_SEVERITY).contains(&s.severity) {
        return Err(OracleError::InvalidSeverity(s.severity));
    }
    if s.region.is_empty() {
        return Err(OracleError::EmptyRegion);
    }
    if s.source.trim().is_empty() {
        return Err(OracleError::EmptySource);
    }
    if s.recipients.len() > max_recipients {
        return Err(OracleError::TooManyRecipients {
            count: s.recipients.len(),
            max: max_recipients,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_types::{tokens, AlertType, StakingParams, SECS_PER_DAY};

    struct Fixture {
        oracle: OracleEngine,
        staking: StakingEngine,
        ledger: Ledger,
        operator: AccountId,
        holders: Vec<AccountId>,
    }

    fn fixture() -> Fixture {
        let mut ledger = Ledger::new();
        let mut staking = StakingEngine::new(StakingParams::default());
        let mut holders = Vec::new();
        for name in ["alice", "bob", "carol"] {
            let id = AccountId::new(name);
            ledger.credit(&id, tokens(1_000)).unwrap();
            ledger.approve_escrow(&id, tokens(1_000)).unwrap();
            staking.stake(&mut ledger, &id, tokens(1_000), Timestamp::new(0)).unwrap();
            holders.push(id);
        }
        let funder = AccountId::new("funder");
        ledger.credit(&funder, tokens(50_000)).unwrap();
        let mut oracle = OracleEngine::new(OracleParams::default());
        oracle.fund_pool(&mut ledger, &funder, tokens(50_000)).unwrap();
        Fixture {
            oracle,
            staking,
            ledger,
            operator: AccountId::new("operator"),
            holders,
        }
    }

    fn submission(confidence: u8, recipients: Vec<AccountId>) -> AlertSubmission {
        AlertSubmission {
            alert_type: AlertType::Flood,
            region: RegionId::new("KE-30"),
            confidence,
            severity: 3,
            source: "gauge-feed".into(),
            recipients,
        }
    }

    #[test]
    fn test_high_confidence_alert_burns_and_rewards() {
        let mut f = fixture();
        let now = Timestamp::new(1000);
        let alert = f
            .oracle
            .submit_alert(&f.operator, submission(90, f.holders.clone()), 100, now)
            .unwrap();
        assert!(f.oracle.should_execute(alert.id));

        let summary = f
            .oracle
            .execute_alert(alert.id, &mut f.staking, &mut f.ledger, now)
            .unwrap();
        assert_eq!(summary.total_burned, tokens(300));
        assert_eq!(summary.affected, 3);

        let reward = f.oracle.issue_reward(alert.id, now).unwrap();
        // 5% of 300 tokens.
        assert_eq!(reward, tokens(15));
        assert_eq!(f.oracle.pending_reward(&f.operator), tokens(15));
        assert_eq!(f.oracle.pool_available(), tokens(50_000) - tokens(15));
        assert_eq!(f.oracle.remaining_daily_budget(now), tokens(10_000) - tokens(15));
        f.oracle.audit(&f.ledger).unwrap();

        let stored = f.oracle.alert(alert.id).unwrap();
        assert!(stored.is_executed());
        assert_eq!(stored.reward, Some(tokens(15)));
    }

    #[test]
    fn test_low_confidence_alert_has_no_ledger_effects() {
        let mut f = fixture();
        let before = f.ledger.clone();
        let alert = f
            .oracle
            .submit_alert(&f.operator, submission(69, f.holders.clone()), 100, Timestamp::new(5))
            .unwrap();
        assert_eq!(alert.status, AlertStatus::Pending);
        assert!(!f.oracle.should_execute(alert.id));
        assert!(matches!(
            f.oracle
                .execute_alert(alert.id, &mut f.staking, &mut f.ledger, Timestamp::new(5)),
            Err(OracleError::BelowConfidence { .. })
        ));
        assert_eq!(f.ledger.total_supply(), before.total_supply());
        assert_eq!(f.ledger.total_burned(), 0);
        assert_eq!(f.oracle.pending_reward(&f.operator), 0);
    }

    #[test]
    fn test_confirm_raises_pending_alert_to_threshold() {
        let mut f = fixture();
        let alert = f
            .oracle
            .submit_alert(&f.operator, submission(50, f.holders.clone()), 100, Timestamp::new(5))
            .unwrap();
        assert!(matches!(
            f.oracle.confirm_alert(alert.id, 40),
            Err(OracleError::InvalidConfidence(40))
        ));
        assert!(!f.oracle.confirm_alert(alert.id, 60).unwrap());
        assert!(f.oracle.confirm_alert(alert.id, 80).unwrap());
        f.oracle
            .execute_alert(alert.id, &mut f.staking, &mut f.ledger, Timestamp::new(6))
            .unwrap();
        assert!(matches!(
            f.oracle.confirm_alert(alert.id, 90),
            Err(OracleError::AlreadyExecuted(_))
        ));
    }

    #[test]
    fn test_override_blocks_pending_alert_forever() {
        let mut f = fixture();
        let alert = f
            .oracle
            .submit_alert(&f.operator, submission(10, f.holders.clone()), 100, Timestamp::new(5))
            .unwrap();
        f.oracle.emergency_override(alert.id, "spoofed feed").unwrap();
        assert!(matches!(
            f.oracle.confirm_alert(alert.id, 100),
            Err(OracleError::Blocked(_))
        ));
        assert!(matches!(
            f.oracle
                .execute_alert(alert.id, &mut f.staking, &mut f.ledger, Timestamp::new(6)),
            Err(OracleError::Blocked(_))
        ));
        assert_eq!(
            f.oracle.alert(alert.id).unwrap().override_reason.as_deref(),
            Some("spoofed feed")
        );
    }

    #[test]
    fn test_override_rejects_executed_alert() {
        let mut f = fixture();
        let alert = f
            .oracle
            .submit_alert(&f.operator, submission(95, f.holders.clone()), 100, Timestamp::new(5))
            .unwrap();
        f.oracle
            .execute_alert(alert.id, &mut f.staking, &mut f.ledger, Timestamp::new(5))
            .unwrap();
        assert!(matches!(
            f.oracle.emergency_override(alert.id, "late"),
            Err(OracleError::AlreadyExecuted(_))
        ));
    }

    #[test]
    fn test_validation_runs_before_rate_limit() {
        let mut f = fixture();
        let mut bad = submission(101, vec![]);
        assert!(matches!(
            f.oracle.submit_alert(&f.operator, bad.clone(), 100, Timestamp::new(5)),
            Err(OracleError::InvalidConfidence(101))
        ));
        bad.confidence = 80;
        bad.severity = 0;
        assert!(matches!(
            f.oracle.submit_alert(&f.operator, bad.clone(), 100, Timestamp::new(5)),
            Err(OracleError::InvalidSeverity(0))
        ));
        bad.severity = 6;
        assert!(f.oracle.submit_alert(&f.operator, bad.clone(), 100, Timestamp::new(5)).is_err());
        bad.severity = 5;
        bad.region = RegionId::new("  ");
        assert!(matches!(
            f.oracle.submit_alert(&f.operator, bad.clone(), 100, Timestamp::new(5)),
            Err(OracleError::EmptyRegion)
        ));
        bad.region = RegionId::new("KE-30");
        bad.source = String::new();
        assert!(matches!(
            f.oracle.submit_alert(&f.operator, bad, 100, Timestamp::new(5)),
            Err(OracleError::EmptySource)
        ));
        assert_eq!(f.oracle.alerts_today(&RegionId::new("KE-30"), Timestamp::new(5)), 0);

        let crowd: Vec<AccountId> = (0..3).map(|i| AccountId::new(format!("r{i}"))).collect();
        assert!(matches!(
            f.oracle.submit_alert(&f.operator, submission(80, crowd), 2, Timestamp::new(5)),
            Err(OracleError::TooManyRecipients { count: 3, max: 2 })
        ));
    }

    #[test]
    fn test_reward_capped_per_alert() {
        let mut f = fixture();
        let mut params = OracleParams::default();
        params.max_reward_per_alert = tokens(5);
        f.oracle.set_params(params).unwrap();

        let alert = f
            .oracle
            .submit_alert(&f.operator, submission(90, f.holders.clone()), 100, Timestamp::new(5))
            .unwrap();
        f.oracle
            .execute_alert(alert.id, &mut f.staking, &mut f.ledger, Timestamp::new(5))
            .unwrap();
        assert_eq!(f.oracle.issue_reward(alert.id, Timestamp::new(5)).unwrap(), tokens(5));
        assert!(matches!(
            f.oracle.issue_reward(alert.id, Timestamp::new(5)),
            Err(OracleError::RewardAlreadyIssued(_))
        ));
    }

    #[test]
    fn test_reward_capped_by_daily_budget_and_pool() {
        let mut ledger = Ledger::new();
        let mut staking = StakingEngine::new(StakingParams::default());
        let holder = AccountId::new("holder");
        ledger.credit(&holder, tokens(10_000)).unwrap();
        ledger.approve_escrow(&holder, tokens(10_000)).unwrap();
        staking.stake(&mut ledger, &holder, tokens(10_000), Timestamp::new(0)).unwrap();

        let funder = AccountId::new("funder");
        ledger.credit(&funder, tokens(30)).unwrap();
        let mut oracle = OracleEngine::new(OracleParams {
            daily_reward_cap: tokens(40),
            alert_cooldown_secs: 0,
            ..OracleParams::default()
        });
        oracle.fund_pool(&mut ledger, &funder, tokens(30)).unwrap();

        let op = AccountId::new("op");
        let day = Timestamp::new(2 * SECS_PER_DAY);
        // First burn: 1000 tokens, 5% = 50, capped by the pool at 30.
        let a = oracle
            .submit_alert(&op, submission(90, vec![holder.clone()]), 100, day)
            .unwrap();
        oracle.execute_alert(a.id, &mut staking, &mut ledger, day).unwrap();
        assert_eq!(oracle.issue_reward(a.id, day).unwrap(), tokens(30));
        assert_eq!(oracle.pool_available(), 0);

        // Pool empty: the next alert still burns but earns nothing.
        let b = oracle
            .submit_alert(&op, submission(90, vec![holder.clone()]), 100, day)
            .unwrap();
        oracle.execute_alert(b.id, &mut staking, &mut ledger, day).unwrap();
        assert_eq!(oracle.issue_reward(b.id, day).unwrap(), 0);
        assert_eq!(oracle.alert(b.id).unwrap().reward, Some(0));

        ledger.credit(&funder, tokens(100)).unwrap();
        oracle.fund_pool(&mut ledger, &funder, tokens(100)).unwrap();
        // Daily budget left: 40 - 30 = 10.
        let c = oracle
            .submit_alert(&op, submission(90, vec![holder.clone()]), 100, day)
            .unwrap();
        oracle.execute_alert(c.id, &mut staking, &mut ledger, day).unwrap();
        assert_eq!(oracle.issue_reward(c.id, day).unwrap(), tokens(10));
        assert_eq!(oracle.remaining_daily_budget(day), 0);
        oracle.audit(&ledger).unwrap();
    }

    #[test]
    fn test_lowering_daily_cap_keeps_past_issuance_valid() {
        let mut f = fixture();
        let now = Timestamp::new(10 * SECS_PER_DAY);
        let alert = f
            .oracle
            .submit_alert(&f.operator, submission(90, f.holders.clone()), 100, now)
            .unwrap();
        f.oracle
            .execute_alert(alert.id, &mut f.staking, &mut f.ledger, now)
            .unwrap();
        assert_eq!(f.oracle.issue_reward(alert.id, now).unwrap(), tokens(15));

        let mut params = OracleParams::default();
        params.daily_reward_cap = tokens(10);
        f.oracle.set_params(params).unwrap();
        f.oracle.audit(&f.ledger).unwrap();
        assert_eq!(f.oracle.remaining_daily_budget(now), 0);
    }

    #[test]
    fn test_confirm_executes_after_recipient_cap_lowered() {
        let mut f = fixture();
        let alert = f
            .oracle
            .submit_alert(&f.operator, submission(40, f.holders.clone()), 100, Timestamp::new(5))
            .unwrap();
        f.staking.set_max_recipients_per_call(1);

        assert!(f.oracle.confirm_alert(alert.id, 90).unwrap());
        let summary = f
            .oracle
            .execute_alert(alert.id, &mut f.staking, &mut f.ledger, Timestamp::new(6))
            .unwrap();
        assert_eq!(summary.affected, 3);
        assert_eq!(summary.total_burned, tokens(300));
        f.staking.audit(&f.ledger).unwrap();
    }

    #[test]
    fn test_claim_pays_from_pool_account() {
        let mut f = fixture();
        assert!(matches!(
            f.oracle.claim_rewards(&mut f.ledger, &f.operator),
            Err(OracleError::NothingToClaim(_))
        ));

        let alert = f
            .oracle
            .submit_alert(&f.operator, submission(90, f.holders.clone()), 100, Timestamp::new(5))
            .unwrap();
        f.oracle
            .execute_alert(alert.id, &mut f.staking, &mut f.ledger, Timestamp::new(5))
            .unwrap();
        let reward = f.oracle.issue_reward(alert.id, Timestamp::new(5)).unwrap();
        let pool_before = f.ledger.balance_of(&AccountId::reward_pool());

        assert_eq!(f.oracle.claim_rewards(&mut f.ledger, &f.operator).unwrap(), reward);
        assert_eq!(f.ledger.balance_of(&f.operator), reward);
        assert_eq!(f.ledger.balance_of(&AccountId::reward_pool()), pool_before - reward);
        assert_eq!(f.oracle.pending_reward(&f.operator), 0);
        f.oracle.audit(&f.ledger).unwrap();
    }

    #[test]
    fn test_claim_fails_when_pool_account_short() {
        let mut f = fixture();
        let alert = f
            .oracle
            .submit_alert(&f.operator, submission(90, f.holders.clone()), 100, Timestamp::new(5))
            .unwrap();
        f.oracle
            .execute_alert(alert.id, &mut f.staking, &mut f.ledger, Timestamp::new(5))
            .unwrap();
        f.oracle.issue_reward(alert.id, Timestamp::new(5)).unwrap();

        // Drain the pool account behind the engine's back.
        let held = f.ledger.balance_of(&AccountId::reward_pool());
        f.ledger.debit(&AccountId::reward_pool(), held).unwrap();
        assert!(matches!(
            f.oracle.claim_rewards(&mut f.ledger, &f.operator),
            Err(OracleError::InsufficientPool { .. })
        ));
        assert_eq!(f.oracle.pending_reward(&f.operator), tokens(15));
        assert!(f.oracle.audit(&f.ledger).is_err());
    }

    #[test]
    fn test_issue_reward_requires_execution() {
        let mut f = fixture();
        let alert = f
            .oracle
            .submit_alert(&f.operator, submission(90, vec![]), 100, Timestamp::new(5))
            .unwrap();
        assert!(matches!(
            f.oracle.issue_reward(alert.id, Timestamp::new(5)),
            Err(OracleError::NotExecuted(_))
        ));
        assert!(matches!(
            f.oracle.issue_reward(999, Timestamp::new(5)),
            Err(OracleError::AlertNotFound(999))
        ));
    }

    #[test]
    fn test_fund_pool_rejects_zero_and_missing_funds() {
        let mut f = fixture();
        let poor = AccountId::new("poor");
        assert!(matches!(
            f.oracle.fund_pool(&mut f.ledger, &poor, 0),
            Err(OracleError::ZeroAmount)
        ));
        assert!(matches!(
            f.oracle.fund_pool(&mut f.ledger, &poor, 1),
            Err(OracleError::Ledger(_))
        ));
        assert_eq!(f.oracle.pool_available(), tokens(50_000));
    }

    #[test]
    fn test_set_params_rejects_out_of_range() {
        let mut oracle = OracleEngine::new(OracleParams::default());
        let mut params = OracleParams::default();
        params.min_confidence = 101;
        assert!(oracle.set_params(params).is_err());
        let mut params = OracleParams::default();
        params.reward_rate_bps = 10_001;
        assert!(oracle.set_params(params).is_err());
        assert_eq!(oracle.params(), &OracleParams::default());
    }
}
