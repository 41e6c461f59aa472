//! The workshop: single owner of roster, current schedule and alert
//! history for one session.
//!
//! MUTATION ENTRY POINTS (the only two):
//!   - `regenerate`   : full replace of the schedule, alerts appended
//!   - `resolve_alert`: one alert plus the assignments it swaps
//!
//! Everything else is a read. `SharedWorkshop` serializes the two entry
//! points; this type itself assumes exclusive `&mut` access.
//!
//! Audit writes are best-effort: a failing store is logged and never
//! rolls back or fails a scheduling operation.

use crate::{
    alert::BurnoutAlert,
    clock::WorkshopClock,
    config::ShiftConfig,
    error::{ShiftError, ShiftResult},
    event::{EventLogEntry, ShiftEvent},
    notify::NotificationStatus,
    risk::{RiskAssessment, RiskEstimator},
    roster::{Elf, Order, Roster, Station},
    rotation::{RotationOutcome, RotationResolver},
    scheduler::{ScheduleRun, Scheduler, ShiftAssignment},
    snapshot::WorkshopSnapshot,
    store::ShiftStore,
    types::{Generation, SessionId},
};
use chrono::{NaiveDate, TimeZone, Utc};
use serde::Serialize;

/// An elf with their station-independent live risk.
#[derive(Debug, Clone, Serialize)]
pub struct ElfView {
    #[serde(flatten)]
    pub elf: Elf,
    #[serde(flatten)]
    pub risk: RiskAssessment,
}

/// A station with its assigned headcount in the current schedule.
#[derive(Debug, Clone, Serialize)]
pub struct StationView {
    #[serde(flatten)]
    pub station: Station,
    pub current_staff: u32,
}

pub struct Workshop {
    session_id: SessionId,
    config: ShiftConfig,
    clock: WorkshopClock,
    roster: Roster,
    estimator: RiskEstimator,
    assignments: Vec<ShiftAssignment>,
    alerts: Vec<BurnoutAlert>,
    schedule_date: Option<NaiveDate>,
    generation: Generation,
    store: ShiftStore,
}

impl Workshop {
    /// Build a workshop around an already validated roster. Migrates the
    /// store and opens a session row in it.
    pub fn new(
        session_id: SessionId,
        config: ShiftConfig,
        roster: Roster,
        clock: WorkshopClock,
        store: ShiftStore,
    ) -> ShiftResult<Self> {
        store.migrate()?;
        store.insert_session(&session_id, env!("CARGO_PKG_VERSION"), clock.now())?;

        let workshop = Self {
            estimator: RiskEstimator::new(config.risk.clone()),
            session_id: session_id.clone(),
            config,
            clock,
            roster,
            assignments: Vec::new(),
            alerts: Vec::new(),
            schedule_date: None,
            generation: 0,
            store,
        };
        workshop.record(
            "workshop",
            ShiftEvent::SessionStarted {
                session_id,
                elves: workshop.roster.elves().len(),
                stations: workshop.roster.stations().len(),
                orders: workshop.roster.orders().len(),
            },
        );
        Ok(workshop)
    }

    /// Default config, in-memory store, clock frozen at 2024-12-14 08:00 UTC.
    pub fn build_test(session_id: &str, roster: Roster) -> ShiftResult<Self> {
        let at = Utc
            .with_ymd_and_hms(2024, 12, 14, 8, 0, 0)
            .single()
            .ok_or_else(|| anyhow::anyhow!("invalid test clock"))?;
        Self::new(
            session_id.to_string(),
            ShiftConfig::default(),
            roster,
            WorkshopClock::fixed(at),
            ShiftStore::in_memory()?,
        )
    }

    // ── Reads ──────────────────────────────────────────────────

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn config(&self) -> &ShiftConfig {
        &self.config
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn estimator(&self) -> &RiskEstimator {
        &self.estimator
    }

    pub fn store(&self) -> &ShiftStore {
        &self.store
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn schedule_date(&self) -> Option<NaiveDate> {
        self.schedule_date
    }

    pub fn elves(&self) -> Vec<ElfView> {
        self.roster.elves().iter().map(|e| self.elf_view(e)).collect()
    }

    pub fn elf(&self, id: &str) -> ShiftResult<ElfView> {
        self.roster.elf(id).map(|e| self.elf_view(e))
    }

    fn elf_view(&self, elf: &Elf) -> ElfView {
        ElfView {
            elf: elf.clone(),
            risk: self.estimator.assess_baseline(elf),
        }
    }

    pub fn stations(&self) -> Vec<StationView> {
        self.roster
            .stations()
            .iter()
            .map(|s| StationView {
                station: s.clone(),
                current_staff: self
                    .assignments
                    .iter()
                    .filter(|a| a.station_id == s.id)
                    .count() as u32,
            })
            .collect()
    }

    pub fn orders(&self) -> &[Order] {
        self.roster.orders()
    }

    pub fn schedule(&self) -> &[ShiftAssignment] {
        &self.assignments
    }

    /// Full alert history for the session, resolved and unresolved.
    pub fn alerts(&self) -> &[BurnoutAlert] {
        &self.alerts
    }

    pub fn alert(&self, id: &str) -> ShiftResult<&BurnoutAlert> {
        self.alerts
            .iter()
            .find(|a| a.id == id)
            .ok_or_else(|| ShiftError::not_found("Alert", id))
    }

    pub fn unresolved_alerts(&self) -> impl Iterator<Item = &BurnoutAlert> {
        self.alerts.iter().filter(|a| !a.is_resolved())
    }

    // ── Mutations ──────────────────────────────────────────────

    /// Discard the current schedule and build a new one from the roster.
    pub fn regenerate(&mut self) -> ScheduleRun {
        let date = self
            .config
            .schedule
            .shift_date
            .unwrap_or_else(|| self.clock.today());
        let scheduler = Scheduler::new(
            &self.estimator,
            &self.config.schedule,
            self.config.rotation.duration_mins,
        );
        let run = scheduler.generate(&self.roster, date, &self.alerts, self.clock.now());

        self.generation += 1;
        self.assignments = run.assignments.clone();
        self.schedule_date = Some(date);

        let mut raised = Vec::new();
        for alert in &run.alerts {
            if !self.alerts.iter().any(|a| a.id == alert.id) {
                self.alerts.push(alert.clone());
                raised.push(alert);
            }
        }

        self.record(
            "scheduler",
            ShiftEvent::ScheduleGenerated {
                generation: self.generation,
                date,
                assignments: run.assignments.len(),
                alerts: run.alerts.len(),
                unassigned: run.unassigned_elves.len(),
            },
        );
        for shortfall in &run.shortfalls {
            self.record(
                "scheduler",
                ShiftEvent::StationUnderstaffed {
                    generation: self.generation,
                    station_id: shortfall.station_id.clone(),
                    needed: shortfall.needed,
                    filled: shortfall.filled,
                },
            );
        }
        for alert in raised {
            self.record(
                "scheduler",
                ShiftEvent::AlertRaised {
                    alert_id: alert.id.clone(),
                    elf_id: alert.elf_id.clone(),
                    risk_score: alert.risk.score(),
                    risk_level: alert.level(),
                },
            );
        }
        self.take_snapshot();

        log::info!("generation={} {}", self.generation, run.summary);
        run
    }

    /// Rotate the alert's elf out of their shift. Only the local state
    /// changes here; notification is the caller's concern.
    pub fn resolve_alert(&mut self, alert_id: &str) -> ShiftResult<RotationOutcome> {
        let idx = self
            .alerts
            .iter()
            .position(|a| a.id == alert_id)
            .ok_or_else(|| ShiftError::not_found("Alert", alert_id))?;
        if self.alerts[idx].is_resolved() {
            return Err(ShiftError::AlertAlreadyResolved {
                alert_id: alert_id.to_string(),
            });
        }

        let resolver = RotationResolver::new(
            &self.estimator,
            &self.config.schedule,
            self.config.rotation.duration_mins,
        );
        let outcome = resolver.resolve(&self.alerts[idx], &mut self.assignments, &self.roster)?;

        match &outcome {
            RotationOutcome::Rotated { rotation } => {
                let now = self.clock.now();
                self.alerts[idx].mark_resolved(now);
                self.record(
                    "rotation",
                    ShiftEvent::RotationApplied {
                        alert_id: rotation.alert_id.clone(),
                        elf_out: rotation.elf_out.id.clone(),
                        elf_in: rotation.elf_in.id.clone(),
                        station_id: rotation.station_id.clone(),
                        duration_mins: rotation.duration_mins,
                    },
                );
                self.record(
                    "rotation",
                    ShiftEvent::AlertResolved {
                        alert_id: alert_id.to_string(),
                        elf_id: rotation.elf_out.id.clone(),
                    },
                );
            }
            RotationOutcome::NoPartnerAvailable { elf_id, reason, .. } => {
                self.record(
                    "rotation",
                    ShiftEvent::RotationFailed {
                        alert_id: alert_id.to_string(),
                        elf_id: elf_id.clone(),
                        reason: reason.clone(),
                    },
                );
            }
            RotationOutcome::NotOnSchedule { elf_id, .. } => {
                log::warn!("rotation: {alert_id} skipped, {elf_id} is not on the schedule");
                self.record(
                    "rotation",
                    ShiftEvent::RotationFailed {
                        alert_id: alert_id.to_string(),
                        elf_id: elf_id.clone(),
                        reason: outcome.message(),
                    },
                );
            }
        }
        Ok(outcome)
    }

    /// Log how a rotation notice fared.
    pub fn record_notification(&self, alert_id: &str, status: &NotificationStatus) {
        let event = match status {
            NotificationStatus::Delivered { channel } => ShiftEvent::NotificationDelivered {
                alert_id: alert_id.to_string(),
                channel: channel.clone(),
            },
            NotificationStatus::AcknowledgedLocally => ShiftEvent::NotificationAcknowledgedLocally {
                alert_id: alert_id.to_string(),
            },
            NotificationStatus::Failed { channel, reason } => ShiftEvent::NotificationFailed {
                alert_id: alert_id.to_string(),
                channel: channel.clone(),
                reason: reason.clone(),
            },
        };
        self.record("notify", event);
    }

    // ── Audit ──────────────────────────────────────────────────

    fn record(&self, source: &str, event: ShiftEvent) {
        let payload = match serde_json::to_string(&event) {
            Ok(p) => p,
            Err(e) => {
                log::warn!("audit: cannot serialize {}: {e}", event.type_name());
                return;
            }
        };
        let entry = EventLogEntry {
            id: None,
            session_id: self.session_id.clone(),
            generation: self.generation,
            source: source.to_string(),
            event_type: event.type_name().to_string(),
            payload,
        };
        if let Err(e) = self.store.append_event(&entry) {
            log::warn!("audit: dropped {} event: {e}", entry.event_type);
        }
    }

    fn take_snapshot(&self) {
        let snapshot = WorkshopSnapshot {
            session_id: &self.session_id,
            generation: self.generation,
            date: self.schedule_date,
            taken_at: self.clock.now(),
            assignments: &self.assignments,
            alerts: &self.alerts,
        };
        let saved = serde_json::to_string(&snapshot)
            .map_err(ShiftError::from)
            .and_then(|json| self.store.save_snapshot(&self.session_id, self.generation, &json));
        match saved {
            Ok(()) => log::debug!("Snapshot saved at generation {}", self.generation),
            Err(e) => log::warn!("audit: snapshot at generation {} failed: {e}", self.generation),
        }
    }
}
