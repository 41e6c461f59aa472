//! Workshop configuration: risk model constants, shift window, rotation
//! length and notification channel.
//!
//! RULE: every tunable number lives here. Components receive a config
//! reference; they never hardcode ceilings, weights or thresholds.

use crate::{clock::wall_time, risk::RiskLevel};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Reference ceilings, weights and tier boundaries for the burnout model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    /// Hours in the trailing 7-day window that map to a full 10 sub-score.
    pub hours_ceiling: f64,
    /// Consecutive working days that map to a full 10 sub-score.
    pub days_ceiling: f64,
    /// Station stress level that maps to a full 10 sub-score.
    pub stress_ceiling: f64,
    /// Breaks taken today beyond which further breaks give no extra relief.
    pub breaks_ceiling: f64,
    pub weights: RiskWeights,
    pub thresholds: TierThresholds,
    /// Stress assumed when no candidate station is given (roster reads).
    pub baseline_stress: f64,
    /// Lowest tier that raises a burnout alert.
    pub alert_threshold: RiskLevel,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            hours_ceiling: 60.0,
            days_ceiling: 10.0,
            stress_ceiling: 10.0,
            breaks_ceiling: 4.0,
            weights: RiskWeights::default(),
            thresholds: TierThresholds::default(),
            baseline_stress: 5.0,
            alert_threshold: RiskLevel::Medium,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskWeights {
    pub recent_hours: f64,
    pub consecutive_days: f64,
    pub task_stress: f64,
    pub breaks_taken: f64,
    pub preference_match: f64,
}

impl RiskWeights {
    /// Combined weight of the load terms. A weighted sum equal to this
    /// times 10 is the worst case and rescales to a score of 10.
    ///
    /// Dividing by this departs from the plain weighted sum, whose ceiling
    /// is 7.5 with the default weights and so never reaches critical. The
    /// long-week example (42h, 8 days, 1 break, stress 8) scores 7.1 here
    /// rather than about 8.2; both are in the high tier.
    pub fn load_sum(&self) -> f64 {
        self.recent_hours + self.consecutive_days + self.task_stress
    }
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self {
            recent_hours: 0.30,
            consecutive_days: 0.25,
            task_stress: 0.20,
            breaks_taken: 0.15,
            preference_match: 0.10,
        }
    }
}

/// Upper (inclusive) score bound of each tier below critical.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TierThresholds {
    pub low_max: f64,
    pub medium_max: f64,
    pub high_max: f64,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            low_max: 3.0,
            medium_max: 6.0,
            high_max: 9.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Fixed target date. `None` means "today" according to the clock.
    pub shift_date: Option<NaiveDate>,
    #[serde(with = "wall_time")]
    pub default_start: NaiveTime,
    #[serde(with = "wall_time")]
    pub default_end: NaiveTime,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            shift_date: None,
            default_start: NaiveTime::from_hms_opt(8, 0, 0).unwrap_or_default(),
            default_end: NaiveTime::from_hms_opt(16, 0, 0).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationConfig {
    pub duration_mins: u32,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self { duration_mins: 30 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    /// Incoming-webhook URL. `None` degrades to local acknowledgement.
    pub webhook_url: Option<String>,
    pub timeout_ms: u64,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            timeout_ms: 2_500,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ShiftConfig {
    pub risk: RiskConfig,
    pub schedule: ScheduleConfig,
    pub rotation: RotationConfig,
    pub notify: NotifyConfig,
}

impl ShiftConfig {
    /// Load from the data/ directory.
    /// In tests, use ShiftConfig::default().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/config/elfshift.json");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: ShiftConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let r = &self.risk;
        for (name, ceiling) in [
            ("hours_ceiling", r.hours_ceiling),
            ("days_ceiling", r.days_ceiling),
            ("stress_ceiling", r.stress_ceiling),
            ("breaks_ceiling", r.breaks_ceiling),
        ] {
            if !(ceiling.is_finite() && ceiling > 0.0) {
                anyhow::bail!("risk.{name} must be positive, got {ceiling}");
            }
        }
        if r.weights.load_sum() <= 0.0 {
            anyhow::bail!("risk weights for hours, days and stress must not all be zero");
        }
        let t = &r.thresholds;
        if !(0.0 <= t.low_max && t.low_max < t.medium_max && t.medium_max < t.high_max && t.high_max <= 10.0) {
            anyhow::bail!(
                "risk thresholds must ascend within 0..=10, got {}/{}/{}",
                t.low_max, t.medium_max, t.high_max
            );
        }
        if r.alert_threshold == RiskLevel::Low {
            anyhow::bail!("risk.alert_threshold must be medium or above");
        }
        if self.schedule.default_start >= self.schedule.default_end {
            anyhow::bail!("schedule.default_start must be before schedule.default_end");
        }
        Ok(())
    }
}
