//! All governable economy parameters.
//!
//! Every field of [`EconomyParams`] can be changed by a `SetParameter`
//! proposal, including the governance parameters themselves. Ranges are
//! checked twice: when the proposal is created and again before execution.

use crate::error::GovernanceError;
use serde::{Deserialize, Serialize};
use vigil_types::{EconomyParams, BPS_DENOMINATOR};

/// Enum of all parameters that can be changed by governance vote.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GovernableParam {
    // Staking
    MinStake,
    BurnRateBps,
    MaxRecipientsPerCall,

    // Oracle
    MinConfidence,
    MaxAlertsPerRegionPerDay,
    AlertCooldownSecs,
    RewardRateBps,
    MaxRewardPerAlert,
    DailyRewardCap,

    // Governance (self-governing)
    ProposalThreshold,
    ProposalCooldownSecs,
    VotingPeriodSecs,
    TimelockDelaySecs,
    QuorumBps,
    QuadraticMultiplier,
    WeightScale,
    VetoThreshold,
}

/// Engine section a parameter belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamSection {
    Staking,
    Oracle,
    Governance,
}

impl GovernableParam {
    pub const ALL: [GovernableParam; 17] = [
        Self::MinStake,
        Self::BurnRateBps,
        Self::MaxRecipientsPerCall,
        Self::MinConfidence,
        Self::MaxAlertsPerRegionPerDay,
        Self::AlertCooldownSecs,
        Self::RewardRateBps,
        Self::MaxRewardPerAlert,
        Self::DailyRewardCap,
        Self::ProposalThreshold,
        Self::ProposalCooldownSecs,
        Self::VotingPeriodSecs,
        Self::TimelockDelaySecs,
        Self::QuorumBps,
        Self::QuadraticMultiplier,
        Self::WeightScale,
        Self::VetoThreshold,
    ];

    /// Human-readable name of this parameter.
    pub fn name(&self) -> &'static str {
        match self {
            Self::MinStake => "min_stake",
            Self::BurnRateBps => "burn_rate_bps",
            Self::MaxRecipientsPerCall => "max_recipients_per_call",
            Self::MinConfidence => "min_confidence",
            Self::MaxAlertsPerRegionPerDay => "max_alerts_per_region_per_day",
            Self::AlertCooldownSecs => "alert_cooldown_secs",
            Self::RewardRateBps => "reward_rate_bps",
            Self::MaxRewardPerAlert => "max_reward_per_alert",
            Self::DailyRewardCap => "daily_reward_cap",
            Self::ProposalThreshold => "proposal_threshold",
            Self::ProposalCooldownSecs => "proposal_cooldown_secs",
            Self::VotingPeriodSecs => "voting_period_secs",
            Self::TimelockDelaySecs => "timelock_delay_secs",
            Self::QuorumBps => "quorum_bps",
            Self::QuadraticMultiplier => "quadratic_multiplier",
            Self::WeightScale => "weight_scale",
            Self::VetoThreshold => "veto_threshold",
        }
    }

    pub fn section(&self) -> ParamSection {
        match self {
            Self::MinStake | Self::BurnRateBps | Self::MaxRecipientsPerCall => ParamSection::Staking,
            Self::MinConfidence
            | Self::MaxAlertsPerRegionPerDay
            | Self::AlertCooldownSecs
            | Self::RewardRateBps
            | Self::MaxRewardPerAlert
            | Self::DailyRewardCap => ParamSection::Oracle,
            _ => ParamSection::Governance,
        }
    }

    /// Check `value` against this parameter's allowed range.
    pub fn validate(&self, value: u128) -> Result<(), GovernanceError> {
        let fail = |reason| {
            Err(GovernanceError::InvalidParameter {
                param: self.name(),
                value,
                reason,
            })
        };
        match self {
            Self::BurnRateBps | Self::RewardRateBps | Self::QuorumBps => {
                if value > BPS_DENOMINATOR {
                    return fail("basis points above 10000");
                }
            }
            Self::MinConfidence => {
                if value > 100 {
                    return fail("confidence above 100");
                }
            }
            Self::VetoThreshold => {
                if value < 2 {
                    return fail("veto threshold below 2");
                }
            }
            Self::MinStake
            | Self::MaxRecipientsPerCall
            | Self::MaxAlertsPerRegionPerDay
            | Self::QuadraticMultiplier
            | Self::WeightScale => {
                if value == 0 {
                    return fail("must be positive");
                }
            }
            Self::AlertCooldownSecs
            | Self::ProposalCooldownSecs
            | Self::VotingPeriodSecs
            | Self::TimelockDelaySecs => {
                if value == 0 {
                    return fail("duration must be positive");
                }
            }
            Self::MaxRewardPerAlert | Self::DailyRewardCap | Self::ProposalThreshold => {}
        }
        let ceiling = match self {
            Self::MaxRecipientsPerCall | Self::MaxAlertsPerRegionPerDay | Self::VetoThreshold => {
                u32::MAX as u128
            }
            _ => u64::MAX as u128,
        };
        if value > ceiling {
            return fail("out of range");
        }
        Ok(())
    }

    /// Current value of this parameter in `params`.
    pub fn read(&self, params: &EconomyParams) -> u128 {
        let (s, o, g) = (&params.staking, &params.oracle, &params.governance);
        match self {
            Self::MinStake => s.min_stake,
            Self::BurnRateBps => s.burn_rate_bps as u128,
            Self::MaxRecipientsPerCall => s.max_recipients_per_call as u128,
            Self::MinConfidence => o.min_confidence as u128,
            Self::MaxAlertsPerRegionPerDay => o.max_alerts_per_region_per_day as u128,
            Self::AlertCooldownSecs => o.alert_cooldown_secs as u128,
            Self::RewardRateBps => o.reward_rate_bps as u128,
            Self::MaxRewardPerAlert => o.max_reward_per_alert,
            Self::DailyRewardCap => o.daily_reward_cap,
            Self::ProposalThreshold => g.proposal_threshold,
            Self::ProposalCooldownSecs => g.proposal_cooldown_secs as u128,
            Self::VotingPeriodSecs => g.voting_period_secs as u128,
            Self::TimelockDelaySecs => g.timelock_delay_secs as u128,
            Self::QuorumBps => g.quorum_bps as u128,
            Self::QuadraticMultiplier => g.quadratic_multiplier,
            Self::WeightScale => g.weight_scale,
            Self::VetoThreshold => g.veto_threshold as u128,
        }
    }

    /// Validate `value` and write it into `params`.
    pub fn apply(&self, params: &mut EconomyParams, value: u128) -> Result<(), GovernanceError> {
        self.validate(value)?;
        let (s, o, g) = (
            &mut params.staking,
            &mut params.oracle,
            &mut params.governance,
        );
        // validate() has bounded every narrowing conversion below.
        match self {
            Self::MinStake => s.min_stake = value,
            Self::BurnRateBps => s.burn_rate_bps = value as u32,
            Self::MaxRecipientsPerCall => s.max_recipients_per_call = value as usize,
            Self::MinConfidence => o.min_confidence = value as u8,
            Self::MaxAlertsPerRegionPerDay => o.max_alerts_per_region_per_day = value as u32,
            Self::AlertCooldownSecs => o.alert_cooldown_secs = value as u64,
            Self::RewardRateBps => o.reward_rate_bps = value as u32,
            Self::MaxRewardPerAlert => o.max_reward_per_alert = value,
            Self::DailyRewardCap => o.daily_reward_cap = value,
            Self::ProposalThreshold => g.proposal_threshold = value,
            Self::ProposalCooldownSecs => g.proposal_cooldown_secs = value as u64,
            Self::VotingPeriodSecs => g.voting_period_secs = value as u64,
            Self::TimelockDelaySecs => g.timelock_delay_secs = value as u64,
            Self::QuorumBps => g.quorum_bps = value as u32,
            Self::QuadraticMultiplier => g.quadratic_multiplier = value,
            Self::WeightScale => g.weight_scale = value,
            Self::VetoThreshold => g.veto_threshold = value as u32,
        }
        Ok(())
    }
}

impl std::fmt::Display for GovernableParam {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
