//! Rotation resolver: swaps an at-risk elf out of their shift.
//!
//! Candidates for the alert's station must be qualified, not already
//! working that station, and strictly below the alert's risk tier at that
//! station. They are ranked by:
//!   1. tier (low first)
//!   2. unassigned before assigned elsewhere (least disruption)
//!   3. candidate score, then elf id
//!
//! An elf assigned elsewhere is only a candidate if the at-risk elf can
//! cover their station, so a swap never leaves a seat empty, and only if
//! the at-risk elf's risk there is also strictly below the alert's tier.

use crate::{
    alert::BurnoutAlert,
    config::ScheduleConfig,
    error::ShiftResult,
    risk::{RiskAssessment, RiskEstimator},
    roster::{Elf, Roster},
    scheduler::ShiftAssignment,
    types::{AlertId, ElfId, StationId},
};
use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ElfRef {
    pub id: ElfId,
    pub name: String,
}

impl From<&Elf> for ElfRef {
    fn from(elf: &Elf) -> Self {
        Self {
            id: elf.id.clone(),
            name: elf.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Rotation {
    pub id: String,
    pub alert_id: AlertId,
    pub elf_out: ElfRef,
    pub elf_in: ElfRef,
    pub station_id: StationId,
    pub station_name: String,
    /// Station the at-risk elf took over, when the substitute came from one.
    pub elf_out_covers: Option<StationId>,
    pub duration_mins: u32,
    pub substitute_risk: RiskAssessment,
    pub description: String,
}

impl Rotation {
    /// One-line message for the notification channel.
    pub fn notice_text(&self) -> String {
        format!(
            "Auto-rotation: {} swapped with {} at {} for {} mins to reduce burnout risk",
            self.elf_out.name, self.elf_in.name, self.station_name, self.duration_mins
        )
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RotationOutcome {
    Rotated {
        rotation: Rotation,
    },
    NoPartnerAvailable {
        alert_id: AlertId,
        elf_id: ElfId,
        station_id: StationId,
        reason: String,
    },
    /// The alert's elf holds no shift in the current schedule.
    NotOnSchedule {
        alert_id: AlertId,
        elf_id: ElfId,
    },
}

impl RotationOutcome {
    pub fn is_rotated(&self) -> bool {
        matches!(self, Self::Rotated { .. })
    }

    pub fn rotation(&self) -> Option<&Rotation> {
        match self {
            Self::Rotated { rotation } => Some(rotation),
            _ => None,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::Rotated { rotation } => rotation.description.clone(),
            Self::NoPartnerAvailable { reason, .. } => reason.clone(),
            Self::NotOnSchedule { elf_id, .. } => {
                format!("{elf_id} has no shift in the current schedule")
            }
        }
    }
}

struct Candidate<'r> {
    elf: &'r Elf,
    risk: RiskAssessment,
    /// Index of the candidate's current assignment and the at-risk elf's
    /// risk at that station, if the candidate is assigned elsewhere.
    elsewhere: Option<(usize, RiskAssessment)>,
}

pub struct RotationResolver<'a> {
    estimator: &'a RiskEstimator,
    schedule: &'a ScheduleConfig,
    duration_mins: u32,
}

impl<'a> RotationResolver<'a> {
    pub fn new(estimator: &'a RiskEstimator, schedule: &'a ScheduleConfig, duration_mins: u32) -> Self {
        Self {
            estimator,
            schedule,
            duration_mins,
        }
    }

    /// Find a substitute for the alert's elf and rewrite `assignments` in
    /// place. Leaves `assignments` untouched unless the outcome is
    /// `Rotated`. Does not touch the alert itself.
    pub fn resolve(
        &self,
        alert: &BurnoutAlert,
        assignments: &mut [ShiftAssignment],
        roster: &Roster,
    ) -> ShiftResult<RotationOutcome> {
        let Some(pos) = assignments.iter().position(|a| a.elf_id == alert.elf_id) else {
            return Ok(RotationOutcome::NotOnSchedule {
                alert_id: alert.id.clone(),
                elf_id: alert.elf_id.clone(),
            });
        };
        let at_risk = roster.elf(&alert.elf_id)?;
        let station = roster.station(&assignments[pos].station_id)?;
        let ceiling = alert.level();

        let mut candidates: Vec<Candidate<'_>> = roster
            .elves()
            .iter()
            .filter(|e| e.id != at_risk.id && e.is_qualified_for(station))
            .filter_map(|e| {
                let elsewhere = match assignments.iter().position(|a| a.elf_id == e.id) {
                    Some(i) => {
                        if assignments[i].station_id == station.id {
                            return None;
                        }
                        let other = roster.station(&assignments[i].station_id).ok()?;
                        if !at_risk.is_qualified_for(other) {
                            return None;
                        }
                        let cover_risk = self.estimator.assess_for_station(at_risk, other);
                        if cover_risk.level() >= ceiling {
                            return None;
                        }
                        Some((i, cover_risk))
                    }
                    None => None,
                };
                let risk = self.estimator.assess_for_station(e, station);
                (risk.level() < ceiling).then_some(Candidate { elf: e, risk, elsewhere })
            })
            .collect();

        candidates.sort_by(|a, b| {
            a.risk
                .level()
                .cmp(&b.risk.level())
                .then_with(|| a.elsewhere.is_some().cmp(&b.elsewhere.is_some()))
                .then_with(|| a.risk.score().total_cmp(&b.risk.score()))
                .then_with(|| a.elf.id.cmp(&b.elf.id))
        });

        let Some(best) = candidates.first() else {
            let reason = format!(
                "No rotation partner available for {} at {}: no qualified elf below {} risk",
                at_risk.name, station.name, ceiling
            );
            log::warn!("rotation: {reason}");
            return Ok(RotationOutcome::NoPartnerAvailable {
                alert_id: alert.id.clone(),
                elf_id: at_risk.id.clone(),
                station_id: station.id.clone(),
                reason,
            });
        };

        let date = assignments[pos].date;
        let mut elf_out_covers = None;
        let mut description = format!(
            "Rotated {} with {} at {} for {} minutes",
            at_risk.name, best.elf.name, station.name, self.duration_mins
        );

        if let Some((i, cover_risk)) = best.elsewhere {
            let other = roster.station(&assignments[i].station_id)?;
            assignments[i] = ShiftAssignment::new(at_risk, other, date, self.schedule, cover_risk);
            elf_out_covers = Some(other.id.clone());
            description.push_str(&format!("; {} covers {}", at_risk.name, other.name));
        }
        assignments[pos] = ShiftAssignment::new(best.elf, station, date, self.schedule, best.risk);

        log::info!("rotation: {description}");
        Ok(RotationOutcome::Rotated {
            rotation: Rotation {
                id: uuid::Uuid::new_v4().to_string(),
                alert_id: alert.id.clone(),
                elf_out: ElfRef::from(at_risk),
                elf_in: ElfRef::from(best.elf),
                station_id: station.id.clone(),
                station_name: station.name.clone(),
                elf_out_covers,
                duration_mins: self.duration_mins,
                substitute_risk: best.risk,
                description,
            },
        })
    }
}
