//! Burnout alerts.
//!
//! One alert per at-risk assignment, at most one unresolved alert per elf.
//! Alerts are never deleted; `resolved` only ever goes false → true.

use crate::{
    risk::{RiskAssessment, RiskLevel},
    scheduler::ShiftAssignment,
    types::{AlertId, AssignmentId, ElfId, StationId},
};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BurnoutAlert {
    pub id: AlertId,
    pub elf_id: ElfId,
    pub elf_name: String,
    /// Assignment that triggered the alert.
    pub assignment_id: AssignmentId,
    pub station_id: StationId,
    #[serde(flatten)]
    pub risk: RiskAssessment,
    pub message: String,
    pub suggested_action: String,
    pub created_at: DateTime<Utc>,
    resolved: bool,
    resolved_at: Option<DateTime<Utc>>,
}

impl BurnoutAlert {
    /// Raise an alert for an at-risk assignment. `prior_alerts` is how many
    /// alerts this elf has had earlier in the session.
    pub fn raise(
        assignment: &ShiftAssignment,
        prior_alerts: usize,
        created_at: DateTime<Utc>,
        rotation_mins: u32,
    ) -> Self {
        let (message, suggested_action) =
            alert_text(&assignment.elf_name, assignment.risk.level(), rotation_mins);
        Self {
            id: alert_id(&assignment.elf_id, prior_alerts),
            elf_id: assignment.elf_id.clone(),
            elf_name: assignment.elf_name.clone(),
            assignment_id: assignment.id.clone(),
            station_id: assignment.station_id.clone(),
            risk: assignment.risk,
            message,
            suggested_action,
            created_at,
            resolved: false,
            resolved_at: None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    pub fn resolved_at(&self) -> Option<DateTime<Utc>> {
        self.resolved_at
    }

    pub fn level(&self) -> RiskLevel {
        self.risk.level()
    }

    /// Mark resolved. Returns false if it already was.
    pub(crate) fn mark_resolved(&mut self, at: DateTime<Utc>) -> bool {
        if self.resolved {
            return false;
        }
        self.resolved = true;
        self.resolved_at = Some(at);
        true
    }

    /// One-line text for the notification channel.
    pub fn notice_text(&self) -> String {
        format!("Burnout alert: {}. Suggested: {}", self.message, self.suggested_action)
    }
}

/// `alert-E010` for an elf's first alert, `alert-E010-2` for the second.
/// `Roster::new` keeps '-' out of elf ids, so alert ids of different elves never collide.
pub fn alert_id(elf_id: &str, prior_alerts: usize) -> AlertId {
    if prior_alerts == 0 {
        format!("alert-{elf_id}")
    } else {
        format!("alert-{elf_id}-{}", prior_alerts + 1)
    }
}

fn alert_text(name: &str, level: RiskLevel, rotation_mins: u32) -> (String, String) {
    match level {
        RiskLevel::Critical => (
            format!("{name} is at critical burnout risk and must be rotated out now"),
            "Rotate immediately and schedule an extended break".to_string(),
        ),
        RiskLevel::High => (
            format!("{name} will burn out within 2 hours unless rotated"),
            format!("Rotate with a lower-risk elf for {rotation_mins} minutes"),
        ),
        RiskLevel::Medium | RiskLevel::Low => (
            format!("{name} is showing early signs of fatigue"),
            "Schedule a 15-minute break and monitor".to_string(),
        ),
    }
}
