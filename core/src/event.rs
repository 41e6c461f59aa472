//! Audit events: everything the workshop did, in order.
//!
//! Variants are appended, never removed or reordered.

use crate::{
    risk::RiskLevel,
    types::{AlertId, ElfId, Generation, SessionId, StationId},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShiftEvent {
    // ── Session ────────────────────────────────────
    SessionStarted {
        session_id: SessionId,
        elves: usize,
        stations: usize,
        orders: usize,
    },

    // ── Scheduling ─────────────────────────────────
    ScheduleGenerated {
        generation: Generation,
        date: NaiveDate,
        assignments: usize,
        alerts: usize,
        unassigned: usize,
    },
    StationUnderstaffed {
        generation: Generation,
        station_id: StationId,
        needed: u32,
        filled: u32,
    },
    AlertRaised {
        alert_id: AlertId,
        elf_id: ElfId,
        risk_score: f64,
        risk_level: RiskLevel,
    },

    // ── Rotation ───────────────────────────────────
    RotationApplied {
        alert_id: AlertId,
        elf_out: ElfId,
        elf_in: ElfId,
        station_id: StationId,
        duration_mins: u32,
    },
    RotationFailed {
        alert_id: AlertId,
        elf_id: ElfId,
        reason: String,
    },
    AlertResolved {
        alert_id: AlertId,
        elf_id: ElfId,
    },

    // ── Notification ───────────────────────────────
    NotificationDelivered {
        alert_id: AlertId,
        channel: String,
    },
    NotificationAcknowledgedLocally {
        alert_id: AlertId,
    },
    NotificationFailed {
        alert_id: AlertId,
        channel: String,
        reason: String,
    },
}

impl ShiftEvent {
    /// Stable name for the event_type column.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::SessionStarted { .. } => "session_started",
            Self::ScheduleGenerated { .. } => "schedule_generated",
            Self::StationUnderstaffed { .. } => "station_understaffed",
            Self::AlertRaised { .. } => "alert_raised",
            Self::RotationApplied { .. } => "rotation_applied",
            Self::RotationFailed { .. } => "rotation_failed",
            Self::AlertResolved { .. } => "alert_resolved",
            Self::NotificationDelivered { .. } => "notification_delivered",
            Self::NotificationAcknowledgedLocally { .. } => "notification_acknowledged_locally",
            Self::NotificationFailed { .. } => "notification_failed",
        }
    }
}

/// The event log entry as persisted to SQLite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub id: Option<i64>,
    pub session_id: SessionId,
    pub generation: Generation,
    pub source: String,
    pub event_type: String,
    pub payload: String, // JSON-serialized ShiftEvent
}
