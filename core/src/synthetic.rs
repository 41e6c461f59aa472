//! Seeded synthetic workshops for demos and volume tests.

use crate::{
    error::ShiftResult,
    name_generator::NameGenerator,
    rng::{RosterRng, RosterStream},
    roster::{Elf, Order, Priority, Roster, Station},
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::BTreeSet;

/// (name, staff_needed, stress_level)
const STANDARD_STATIONS: &[(&str, u32, u8)] = &[
    ("Wrapping", 3, 6),
    ("QA", 2, 4),
    ("Assembly", 4, 8),
    ("Painting", 2, 5),
    ("Packing", 3, 3),
];

const PRIORITIES: &[Priority] = &[Priority::Low, Priority::Medium, Priority::High, Priority::Urgent];

pub struct SyntheticRoster;

impl SyntheticRoster {
    /// Same `(seed, elf_count)` always yields the same roster.
    pub fn generate(seed: u64, elf_count: usize) -> ShiftResult<Roster> {
        let epoch = Utc
            .with_ymd_and_hms(2024, 12, 14, 8, 0, 0)
            .single()
            .ok_or_else(|| anyhow::anyhow!("invalid synthetic epoch"))?;

        let stations = Self::stations();
        let elves = Self::elves(seed, elf_count, &stations, epoch);
        let orders = Self::orders(seed, &stations, epoch);
        log::debug!("synthetic: seed={seed} elves={elf_count} orders={}", orders.len());
        Roster::new(elves, stations, orders)
    }

    fn stations() -> Vec<Station> {
        STANDARD_STATIONS
            .iter()
            .enumerate()
            .map(|(i, &(name, staff_needed, stress_level))| Station {
                id: format!("S{:03}", i + 1),
                name: name.to_string(),
                staff_needed,
                stress_level,
                required_skill: None,
                opens_at: None,
                closes_at: None,
            })
            .collect()
    }

    fn elves(seed: u64, count: usize, stations: &[Station], epoch: DateTime<Utc>) -> Vec<Elf> {
        let mut names = RosterRng::new(seed, RosterStream::Names);
        let mut rng = RosterRng::new(seed, RosterStream::Elves);
        let skills: Vec<String> = stations.iter().map(|s| s.required_skill()).collect();

        (0..count)
            .map(|i| {
                let skill_count = rng.range_u32(1, 3);
                let mut elf_skills = BTreeSet::new();
                while elf_skills.len() < skill_count as usize {
                    if let Some(skill) = rng.pick(&skills) {
                        elf_skills.insert(skill.clone());
                    }
                }
                let preferences = elf_skills
                    .iter()
                    .filter(|_| rng.chance(0.4))
                    .cloned()
                    .collect();
                let hours_since_break = i64::from(rng.range_u32(1, 20));

                Elf {
                    id: format!("E{:03}", i + 1),
                    name: NameGenerator::full_name(&mut names),
                    skills: elf_skills,
                    preferences,
                    recent_hours: (rng.range_f64(10.0, 56.0) * 2.0).round() / 2.0,
                    consecutive_days: rng.range_u32(1, 9),
                    last_break_at: epoch - Duration::hours(hours_since_break),
                    breaks_taken_today: rng.range_u32(0, 3),
                }
            })
            .collect()
    }

    fn orders(seed: u64, stations: &[Station], epoch: DateTime<Utc>) -> Vec<Order> {
        let mut rng = RosterRng::new(seed, RosterStream::Orders);
        let count = rng.range_u32(2, 5);

        (0..count)
            .map(|i| {
                let mut required = Vec::new();
                for _ in 0..rng.range_u32(1, 2) {
                    if let Some(station) = rng.pick(stations) {
                        if !required.contains(&station.name) {
                            required.push(station.name.clone());
                        }
                    }
                }
                Order {
                    id: format!("O{:03}", i + 1),
                    quantity: rng.range_u32(50, 1000),
                    priority: rng.pick(PRIORITIES).copied().unwrap_or(Priority::Medium),
                    required_stations: required,
                    deadline: rng
                        .chance(0.8)
                        .then(|| epoch + Duration::hours(i64::from(rng.range_u32(4, 14)))),
                }
            })
            .collect()
    }
}
