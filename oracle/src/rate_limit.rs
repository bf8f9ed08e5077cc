//! Per-region alert rate limiting.
//!
//! Two windows guard every region:
//! - a daily cap on accepted alerts, bucketed by UTC calendar day
//! - a cooldown between two alerts of the same type
//!
//! Both are checked and recorded in one call, so no caller can observe an
//! "allowed" state that another caller has already consumed.

use crate::error::OracleError;
use std::collections::BTreeMap;
use vigil_types::{AlertType, DayIndex, RegionId, Timestamp};

#[derive(Clone, Debug, Default)]
pub struct RateLimiter {
    /// (region, day) → alerts accepted that day.
    daily_counts: BTreeMap<(RegionId, DayIndex), u32>,
    /// (region, type) → time of the last accepted alert.
    last_alert: BTreeMap<(RegionId, AlertType), Timestamp>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit one alert or reject it without recording anything.
    ///
    /// The daily cap is checked before the cooldown.
    pub fn check_and_record(
        &mut self,
        region: &RegionId,
        alert_type: AlertType,
        now: Timestamp,
        max_per_day: u32,
        cooldown_secs: u64,
    ) -> Result<(), OracleError> {
        let day = now.day();
        let day_key = (region.clone(), day);
        let count = self.daily_counts.get(&day_key).copied().unwrap_or(0);
        if count >= max_per_day {
            return Err(OracleError::DailyCapReached {
                region: region.to_string(),
                cap: max_per_day,
                retry_at: day.next_start(),
            });
        }

        let type_key = (region.clone(), alert_type);
        if let Some(last) = self.last_alert.get(&type_key) {
            if !last.has_expired(cooldown_secs, now) {
                return Err(OracleError::CooldownActive {
                    region: region.to_string(),
                    alert_type: alert_type.label().to_string(),
                    retry_at: last.plus_secs(cooldown_secs),
                });
            }
        }

        self.daily_counts.insert(day_key, count + 1);
        self.prune(day, now, cooldown_secs);
        self.last_alert.insert(type_key, now);
        Ok(())
    }

    /// Alerts accepted for `region` on the day containing `now`.
    pub fn alerts_on(&self, region: &RegionId, now: Timestamp) -> u32 {
        self.daily_counts
            .get(&(region.clone(), now.day()))
            .copied()
            .unwrap_or(0)
    }

    /// Drop day buckets older than `day` and cooldowns that have run out.
    ///
    /// A cooldown raised later does not revive an entry dropped here.
    fn prune(&mut self, day: DayIndex, now: Timestamp, cooldown_secs: u64) {
        self.daily_counts.retain(|(_, d), _| *d >= day);
        self.last_alert
            .retain(|_, last| !last.has_expired(cooldown_secs, now));
    }
}
