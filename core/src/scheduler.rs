//! Shift assignment scheduler: one deterministic priority pass.
//!
//! ORDER OF WORK (fixed):
//!   1. Rank stations by urgency: highest order priority, then earliest
//!      deadline, then largest staffing need, then station id.
//!   2. For each station in rank order, take unassigned qualified elves
//!      lowest candidate risk first (ties by elf id) until staffed.
//!   3. One shift per elf per pass.
//!   4. Unfilled seats become `StationShortfall`s, not errors.
//!   5. Alert on every assignment at or above the alert tier, reusing an
//!      elf's unresolved alert instead of raising a second one.
//!
//! Given the same roster, date, alert history and clock, the output is
//! identical on every call.

use crate::{
    alert::BurnoutAlert,
    clock::wall_time,
    config::ScheduleConfig,
    risk::{RiskAssessment, RiskEstimator},
    roster::{Elf, Order, Priority, Roster, Station},
    types::{AssignmentId, ElfId, StationId},
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashSet;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ShiftAssignment {
    pub id: AssignmentId,
    pub elf_id: ElfId,
    pub elf_name: String,
    pub station_id: StationId,
    pub station_name: String,
    pub date: NaiveDate,
    #[serde(with = "wall_time")]
    pub start_time: NaiveTime,
    #[serde(with = "wall_time")]
    pub end_time: NaiveTime,
    /// Risk at assignment time. Authoritative for this shift even if the
    /// elf's live risk changes later.
    #[serde(flatten)]
    pub risk: RiskAssessment,
}

impl ShiftAssignment {
    pub fn new(
        elf: &Elf,
        station: &Station,
        date: NaiveDate,
        schedule: &ScheduleConfig,
        risk: RiskAssessment,
    ) -> Self {
        let (start_time, end_time) = station.shift_window(schedule);
        Self {
            id: assignment_id(&elf.id, &station.id, date),
            elf_id: elf.id.clone(),
            elf_name: elf.name.clone(),
            station_id: station.id.clone(),
            station_name: station.name.clone(),
            date,
            start_time,
            end_time,
            risk,
        }
    }
}

pub fn assignment_id(elf_id: &str, station_id: &str, date: NaiveDate) -> AssignmentId {
    format!("shift-{elf_id}-{station_id}-{}", date.format("%Y-%m-%d"))
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StationShortfall {
    pub station_id: StationId,
    pub station_name: String,
    pub needed: u32,
    pub filled: u32,
}

impl StationShortfall {
    pub fn missing(&self) -> u32 {
        self.needed.saturating_sub(self.filled)
    }
}

/// Everything one regeneration produced.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleRun {
    pub date: NaiveDate,
    pub assignments: Vec<ShiftAssignment>,
    /// Active alerts for this schedule: newly raised plus carried over.
    pub alerts: Vec<BurnoutAlert>,
    pub shortfalls: Vec<StationShortfall>,
    pub unassigned_elves: Vec<ElfId>,
    pub summary: String,
}

impl ScheduleRun {
    pub fn is_fully_staffed(&self) -> bool {
        self.shortfalls.is_empty()
    }
}

pub struct Scheduler<'a> {
    estimator: &'a RiskEstimator,
    schedule: &'a ScheduleConfig,
    rotation_mins: u32,
}

impl<'a> Scheduler<'a> {
    pub fn new(estimator: &'a RiskEstimator, schedule: &'a ScheduleConfig, rotation_mins: u32) -> Self {
        Self {
            estimator,
            schedule,
            rotation_mins,
        }
    }

    pub fn generate(
        &self,
        roster: &Roster,
        date: NaiveDate,
        alert_history: &[BurnoutAlert],
        now: DateTime<Utc>,
    ) -> ScheduleRun {
        let mut assigned: HashSet<&str> = HashSet::new();
        let mut assignments = Vec::new();
        let mut shortfalls = Vec::new();

        for station in rank_stations(roster.stations(), roster.orders()) {
            let mut candidates: Vec<(RiskAssessment, &Elf)> = roster
                .elves()
                .iter()
                .filter(|e| !assigned.contains(e.id.as_str()) && e.is_qualified_for(station))
                .map(|e| (self.estimator.assess_for_station(e, station), e))
                .collect();
            candidates.sort_by(|a, b| {
                a.0.score()
                    .total_cmp(&b.0.score())
                    .then_with(|| a.1.id.cmp(&b.1.id))
            });

            let mut filled = 0u32;
            for (risk, elf) in candidates.into_iter().take(station.staff_needed as usize) {
                log::debug!(
                    "schedule: {} -> {} risk={:.2} ({})",
                    elf.id, station.id, risk.score(), risk.level()
                );
                assigned.insert(elf.id.as_str());
                assignments.push(ShiftAssignment::new(elf, station, date, self.schedule, risk));
                filled += 1;
            }

            if filled < station.staff_needed {
                log::warn!(
                    "schedule: {} ({}) understaffed {filled}/{}",
                    station.name, station.id, station.staff_needed
                );
                shortfalls.push(StationShortfall {
                    station_id: station.id.clone(),
                    station_name: station.name.clone(),
                    needed: station.staff_needed,
                    filled,
                });
            }
        }

        let unassigned_elves: Vec<ElfId> = roster
            .elves()
            .iter()
            .filter(|e| !assigned.contains(e.id.as_str()))
            .map(|e| e.id.clone())
            .collect();

        let alerts = self.alerts_for(&assignments, alert_history, now);
        let summary = summarize(date, &assignments, &alerts, &shortfalls, &unassigned_elves);

        ScheduleRun {
            date,
            assignments,
            alerts,
            shortfalls,
            unassigned_elves,
            summary,
        }
    }

    fn alerts_for(
        &self,
        assignments: &[ShiftAssignment],
        history: &[BurnoutAlert],
        now: DateTime<Utc>,
    ) -> Vec<BurnoutAlert> {
        assignments
            .iter()
            .filter(|a| self.estimator.should_alert(a.risk.level()))
            .map(|a| {
                match history
                    .iter()
                    .find(|h| h.elf_id == a.elf_id && !h.is_resolved())
                {
                    Some(open) => open.clone(),
                    None => {
                        let prior = history.iter().filter(|h| h.elf_id == a.elf_id).count();
                        BurnoutAlert::raise(a, prior, now, self.rotation_mins)
                    }
                }
            })
            .collect()
    }
}

/// The most urgent demand placed on a station by the order queue.
#[derive(Debug, Clone, Copy)]
struct Urgency {
    priority: Option<Priority>,
    deadline: Option<DateTime<Utc>>,
}

fn urgency(station: &Station, orders: &[Order]) -> Urgency {
    let demanding: Vec<&Order> = orders.iter().filter(|o| o.requires(station)).collect();
    let priority = demanding.iter().map(|o| o.priority).max();
    let deadline = demanding
        .iter()
        .filter(|o| Some(o.priority) == priority)
        .filter_map(|o| o.deadline)
        .min();
    Urgency { priority, deadline }
}

fn rank_stations<'r>(stations: &'r [Station], orders: &[Order]) -> Vec<&'r Station> {
    let mut ranked: Vec<(Urgency, &Station)> =
        stations.iter().map(|s| (urgency(s, orders), s)).collect();
    ranked.sort_by(|(ua, a), (ub, b)| {
        ub.priority
            .cmp(&ua.priority)
            .then_with(|| earliest_first(ua.deadline, ub.deadline))
            .then_with(|| b.staff_needed.cmp(&a.staff_needed))
            .then_with(|| a.id.cmp(&b.id))
    });
    ranked.into_iter().map(|(_, s)| s).collect()
}

fn earliest_first(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn summarize(
    date: NaiveDate,
    assignments: &[ShiftAssignment],
    alerts: &[BurnoutAlert],
    shortfalls: &[StationShortfall],
    unassigned: &[ElfId],
) -> String {
    let mut summary = format!(
        "Generated {} assignments for {date} with {} burnout alerts",
        assignments.len(),
        alerts.len()
    );
    if !shortfalls.is_empty() {
        let parts: Vec<String> = shortfalls
            .iter()
            .map(|s| format!("{} {}/{}", s.station_name, s.filled, s.needed))
            .collect();
        summary.push_str(&format!("; understaffed: {}", parts.join(", ")));
    }
    if !unassigned.is_empty() {
        let noun = if unassigned.len() == 1 { "elf" } else { "elves" };
        summary.push_str(&format!(
            "; {} {noun} unassigned ({})",
            unassigned.len(),
            unassigned.join(", ")
        ));
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn station(id: &str, name: &str, staff: u32) -> Station {
        Station {
            id: id.into(),
            name: name.into(),
            staff_needed: staff,
            stress_level: 5,
            required_skill: None,
            opens_at: None,
            closes_at: None,
        }
    }

    fn order(id: &str, priority: Priority, stations: &[&str], hour: Option<u32>) -> Order {
        Order {
            id: id.into(),
            quantity: 100,
            priority,
            required_stations: stations.iter().map(|s| s.to_string()).collect(),
            deadline: hour.map(|h| Utc.with_ymd_and_hms(2024, 12, 14, h, 0, 0).unwrap()),
        }
    }

    fn ids(ranked: Vec<&Station>) -> Vec<&str> {
        ranked.into_iter().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn higher_priority_orders_rank_first() {
        let stations = vec![station("S1", "Wrapping", 3), station("S2", "QA", 2)];
        let orders = vec![
            order("O1", Priority::Medium, &["wrapping"], None),
            order("O2", Priority::Urgent, &["qa"], None),
        ];
        assert_eq!(ids(rank_stations(&stations, &orders)), vec!["S2", "S1"]);
    }

    #[test]
    fn earlier_deadline_breaks_priority_ties() {
        let stations = vec![station("S1", "Wrapping", 3), station("S2", "QA", 2)];
        let orders = vec![
            order("O1", Priority::High, &["wrapping"], Some(18)),
            order("O2", Priority::High, &["qa"], Some(16)),
        ];
        assert_eq!(ids(rank_stations(&stations, &orders)), vec!["S2", "S1"]);
    }

    #[test]
    fn larger_need_breaks_urgency_ties_and_unordered_stations_come_last() {
        let stations = vec![
            station("S1", "Wrapping", 3),
            station("S2", "QA", 2),
            station("S3", "Assembly", 4),
            station("S4", "Painting", 9),
        ];
        let orders = vec![order("O1", Priority::Urgent, &["wrapping", "qa", "assembly"], Some(16))];
        assert_eq!(ids(rank_stations(&stations, &orders)), vec!["S3", "S1", "S2", "S4"]);
    }

    #[test]
    fn summary_mentions_shortfall_and_unassigned() {
        let date = NaiveDate::from_ymd_opt(2024, 12, 14).unwrap();
        let shortfalls = vec![StationShortfall {
            station_id: "S2".into(),
            station_name: "QA".into(),
            needed: 2,
            filled: 1,
        }];
        let text = summarize(date, &[], &[], &shortfalls, &["E010".to_string()]);
        assert!(text.contains("understaffed: QA 1/2"), "{text}");
        assert!(text.contains("1 elf unassigned (E010)"), "{text}");
    }
}
