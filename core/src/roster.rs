//! Roster model: elves, stations and the order queue.
//!
//! RULE: a Roster is only ever built through `Roster::new`, which validates
//! every record. Nothing downstream re-checks skills, staffing minimums or
//! order references.
//!
//! Stored elf attributes are always raw work history. Burnout risk is never
//! a field here; it is derived by `risk::RiskEstimator` on demand.

use crate::{
    clock::wall_time,
    config::ScheduleConfig,
    error::{ShiftError, ShiftResult},
    types::{ElfId, OrderId, StationId},
};
use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Elf {
    pub id: ElfId,
    pub name: String,
    /// Skill tags; an elf qualifies for a station requiring any of them.
    pub skills: BTreeSet<String>,
    /// Preferred stations, most preferred first.
    #[serde(default)]
    pub preferences: Vec<String>,
    /// Hours worked in the trailing 7-day window.
    pub recent_hours: f64,
    /// Consecutive days with at least one shift.
    pub consecutive_days: u32,
    pub last_break_at: DateTime<Utc>,
    pub breaks_taken_today: u32,
}

impl Elf {
    pub fn has_skill(&self, skill: &str) -> bool {
        self.skills.iter().any(|s| s.eq_ignore_ascii_case(skill))
    }

    pub fn is_qualified_for(&self, station: &Station) -> bool {
        self.has_skill(&station.required_skill())
    }

    /// True if the station appears in the elf's preferences, by name or
    /// by skill tag.
    pub fn prefers(&self, station: &Station) -> bool {
        let skill = station.required_skill();
        self.preferences
            .iter()
            .any(|p| p.eq_ignore_ascii_case(&station.name) || p.eq_ignore_ascii_case(&skill))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Station {
    pub id: StationId,
    pub name: String,
    /// Minimum concurrent elves required.
    pub staff_needed: u32,
    /// Task difficulty, 1–10.
    pub stress_level: u8,
    /// Skill tag an elf needs here. Defaults to the lower-cased name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_skill: Option<String>,
    #[serde(default, with = "wall_time::option", skip_serializing_if = "Option::is_none")]
    pub opens_at: Option<NaiveTime>,
    #[serde(default, with = "wall_time::option", skip_serializing_if = "Option::is_none")]
    pub closes_at: Option<NaiveTime>,
}

impl Station {
    pub fn required_skill(&self) -> String {
        self.required_skill
            .clone()
            .unwrap_or_else(|| self.name.to_lowercase())
    }

    /// Shift window for this station: its operating hours when set,
    /// otherwise the configured default window.
    pub fn shift_window(&self, schedule: &ScheduleConfig) -> (NaiveTime, NaiveTime) {
        match (self.opens_at, self.closes_at) {
            (Some(open), Some(close)) => (open, close),
            _ => (schedule.default_start, schedule.default_end),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: OrderId,
    pub quantity: u32,
    pub priority: Priority,
    /// Station names (case-insensitive) this order depends on.
    pub required_stations: Vec<String>,
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
}

impl Order {
    pub fn requires(&self, station: &Station) -> bool {
        self.required_stations
            .iter()
            .any(|s| s.eq_ignore_ascii_case(&station.name))
    }
}

/// On-disk shape of `roster/workshop.json`.
#[derive(Debug, Clone, Deserialize)]
struct RosterFile {
    elves: Vec<Elf>,
    stations: Vec<Station>,
    #[serde(default)]
    orders: Vec<Order>,
}

#[derive(Debug, Clone)]
pub struct Roster {
    elves: Vec<Elf>,
    stations: Vec<Station>,
    orders: Vec<Order>,
}

impl Roster {
    /// Validate and ingest a roster. Rejects the whole set on the first
    /// invalid record.
    pub fn new(elves: Vec<Elf>, stations: Vec<Station>, orders: Vec<Order>) -> ShiftResult<Self> {
        check_unique("elf", elves.iter().map(|e| e.id.as_str()))?;
        check_unique("station", stations.iter().map(|s| s.id.as_str()))?;
        check_unique("order", orders.iter().map(|o| o.id.as_str()))?;

        let station_names: Vec<String> = stations.iter().map(|s| s.name.to_lowercase()).collect();
        check_unique("station name", station_names.iter().map(String::as_str))?;

        for elf in &elves {
            if elf.id.contains('-') {
                return Err(ShiftError::invalid(format!(
                    "elf id {} must not contain '-', which separates alert sequence numbers",
                    elf.id
                )));
            }
            if elf.skills.is_empty() {
                return Err(ShiftError::invalid(format!("elf {} has no skills", elf.id)));
            }
            if !elf.recent_hours.is_finite() || elf.recent_hours < 0.0 {
                return Err(ShiftError::invalid(format!(
                    "elf {} has invalid recent_hours {}",
                    elf.id, elf.recent_hours
                )));
            }
        }

        for station in &stations {
            if station.staff_needed == 0 {
                return Err(ShiftError::invalid(format!(
                    "station {} must need at least one elf",
                    station.id
                )));
            }
            if !(1..=10).contains(&station.stress_level) {
                return Err(ShiftError::invalid(format!(
                    "station {} stress_level {} is outside 1..=10",
                    station.id, station.stress_level
                )));
            }
            match (station.opens_at, station.closes_at) {
                (Some(open), Some(close)) if open >= close => {
                    return Err(ShiftError::invalid(format!(
                        "station {} opens at {open} but closes at {close}",
                        station.id
                    )));
                }
                (Some(_), None) | (None, Some(_)) => {
                    return Err(ShiftError::invalid(format!(
                        "station {} needs both opens_at and closes_at",
                        station.id
                    )));
                }
                _ => {}
            }
        }

        for order in &orders {
            for name in &order.required_stations {
                if !stations.iter().any(|s| s.name.eq_ignore_ascii_case(name)) {
                    return Err(ShiftError::invalid(format!(
                        "order {} requires unknown station '{name}'",
                        order.id
                    )));
                }
            }
        }

        Ok(Self { elves, stations, orders })
    }

    /// Load from `{data_dir}/roster/workshop.json`.
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/roster/workshop.json");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let file: RosterFile = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        let roster = Self::new(file.elves, file.stations, file.orders)?;
        log::info!(
            "roster: loaded {} elves, {} stations, {} orders from {path}",
            roster.elves.len(),
            roster.stations.len(),
            roster.orders.len()
        );
        Ok(roster)
    }

    pub fn elves(&self) -> &[Elf] {
        &self.elves
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn elf(&self, id: &str) -> ShiftResult<&Elf> {
        self.elves
            .iter()
            .find(|e| e.id == id)
            .ok_or_else(|| ShiftError::not_found("Elf", id))
    }

    pub fn station(&self, id: &str) -> ShiftResult<&Station> {
        self.stations
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| ShiftError::not_found("Station", id))
    }

    pub fn order(&self, id: &str) -> ShiftResult<&Order> {
        self.orders
            .iter()
            .find(|o| o.id == id)
            .ok_or_else(|| ShiftError::not_found("Order", id))
    }

    pub fn station_by_name(&self, name: &str) -> Option<&Station> {
        self.stations
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
    }
}

fn check_unique<'a>(kind: &str, ids: impl Iterator<Item = &'a str>) -> ShiftResult<()> {
    let mut seen = HashSet::new();
    for id in ids {
        if id.trim().is_empty() {
            return Err(ShiftError::invalid(format!("{kind} with empty id")));
        }
        if !seen.insert(id) {
            return Err(ShiftError::invalid(format!("duplicate {kind} id {id}")));
        }
    }
    Ok(())
}
