//! Burnout risk estimator.
//!
//! Risk is a weighted combination of five sub-scores, each normalized to
//! 0–10 against a reference ceiling from `RiskConfig`:
//!
//!   weighted = 0.30 * hours + 0.25 * days + 0.20 * stress
//!            - 0.15 * breaks - 0.10 * preference
//!
//! The weighted sum is rescaled by the combined load weight (hours + days +
//! stress) so that an elf at every load ceiling with no relief scores 10,
//! then clamped to [0, 10] and rounded to two decimals. The tier is always
//! derived from the rounded score, so a score and its tier cannot disagree.
//!
//! Pure: no state, safe to call from any thread.

use crate::{
    config::{RiskConfig, TierThresholds},
    roster::{Elf, Station},
};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Fixed step function: `[0, low_max]` low, `(low_max, medium_max]`
    /// medium, `(medium_max, high_max]` high, above that critical.
    pub fn from_score(score: f64, thresholds: &TierThresholds) -> Self {
        if score <= thresholds.low_max {
            Self::Low
        } else if score <= thresholds.medium_max {
            Self::Medium
        } else if score <= thresholds.high_max {
            Self::High
        } else {
            Self::Critical
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A risk score together with the tier derived from it.
///
/// Only `RiskEstimator` constructs these; there is no `Deserialize`.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct RiskAssessment {
    #[serde(rename = "burnout_risk")]
    score: f64,
    #[serde(rename = "risk_level")]
    level: RiskLevel,
}

impl RiskAssessment {
    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn level(&self) -> RiskLevel {
        self.level
    }
}

/// Normalized 0–10 sub-scores, before weighting.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct RiskComponents {
    pub recent_hours: f64,
    pub consecutive_days: f64,
    pub task_stress: f64,
    pub breaks_taken: f64,
    pub preference_match: f64,
}

#[derive(Debug, Clone)]
pub struct RiskEstimator {
    config: RiskConfig,
}

impl RiskEstimator {
    pub fn new(config: RiskConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RiskConfig {
        &self.config
    }

    pub fn components(&self, elf: &Elf, task_stress: f64, preference_match: bool) -> RiskComponents {
        let c = &self.config;
        RiskComponents {
            recent_hours: normalize(elf.recent_hours, c.hours_ceiling),
            consecutive_days: normalize(f64::from(elf.consecutive_days), c.days_ceiling),
            task_stress: normalize(task_stress, c.stress_ceiling),
            breaks_taken: normalize(f64::from(elf.breaks_taken_today), c.breaks_ceiling),
            preference_match: if preference_match { 10.0 } else { 0.0 },
        }
    }

    pub fn assess(&self, elf: &Elf, task_stress: f64, preference_match: bool) -> RiskAssessment {
        let w = &self.config.weights;
        let p = self.components(elf, task_stress, preference_match);
        let weighted = w.recent_hours * p.recent_hours
            + w.consecutive_days * p.consecutive_days
            + w.task_stress * p.task_stress
            - w.breaks_taken * p.breaks_taken
            - w.preference_match * p.preference_match;
        let score = round2((weighted / w.load_sum()).clamp(0.0, 10.0));
        RiskAssessment {
            score,
            level: self.level_for(score),
        }
    }

    /// Risk of this elf working this station.
    pub fn assess_for_station(&self, elf: &Elf, station: &Station) -> RiskAssessment {
        self.assess(elf, f64::from(station.stress_level), elf.prefers(station))
    }

    /// Station-independent risk at the configured baseline stress.
    pub fn assess_baseline(&self, elf: &Elf) -> RiskAssessment {
        self.assess(elf, self.config.baseline_stress, false)
    }

    pub fn level_for(&self, score: f64) -> RiskLevel {
        RiskLevel::from_score(score, &self.config.thresholds)
    }

    pub fn should_alert(&self, level: RiskLevel) -> bool {
        level >= self.config.alert_threshold
    }
}

fn normalize(value: f64, ceiling: f64) -> f64 {
    (value / ceiling).clamp(0.0, 1.0) * 10.0
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
