//! Rotation: swapping an at-risk elf out of their shift.

use chrono::{NaiveDate, TimeZone, Utc};
use elfshift_core::{
    alert::BurnoutAlert,
    config::{RiskConfig, ScheduleConfig},
    risk::{RiskEstimator, RiskLevel},
    roster::{Elf, Roster, Station},
    rotation::{RotationOutcome, RotationResolver},
    scheduler::ShiftAssignment,
    ShiftError, Workshop,
};

fn demo_workshop(session: &str) -> Workshop {
    let roster = Roster::load(concat!(env!("CARGO_MANIFEST_DIR"), "/../data")).unwrap();
    let mut ws = Workshop::build_test(session, roster).unwrap();
    ws.regenerate();
    ws
}

fn station_of(ws: &Workshop, elf_id: &str) -> Option<String> {
    ws.schedule()
        .iter()
        .find(|a| a.elf_id == elf_id)
        .map(|a| a.station_id.clone())
}

#[test]
fn high_risk_elf_is_swapped_with_lowest_risk_partner() {
    let mut ws = demo_workshop("rot-swap");

    let outcome = ws.resolve_alert("alert-E003").unwrap();
    let rotation = outcome.rotation().expect("rotated");

    assert_eq!(rotation.elf_out.id, "E003");
    assert_eq!(rotation.elf_in.id, "E005");
    assert_eq!(rotation.station_id, "S003");
    assert_eq!(rotation.elf_out_covers.as_deref(), Some("S001"));
    assert_eq!(rotation.duration_mins, 30);
    assert_eq!(rotation.substitute_risk.level(), RiskLevel::Low);
    assert_eq!(
        rotation.description,
        "Rotated Sparkle with Holly at Assembly for 30 minutes; Sparkle covers Wrapping"
    );
    assert_eq!(
        rotation.notice_text(),
        "Auto-rotation: Sparkle swapped with Holly at Assembly for 30 mins to reduce burnout risk"
    );

    assert_eq!(station_of(&ws, "E005").as_deref(), Some("S003"));
    assert_eq!(station_of(&ws, "E003").as_deref(), Some("S001"));
    let covering = ws.schedule().iter().find(|a| a.elf_id == "E003").unwrap();
    assert!((covering.risk.score() - 4.77).abs() < 1e-9);
    assert_eq!(covering.id, "shift-E003-S001-2024-12-14");

    let counts: Vec<u32> = ws.stations().iter().map(|s| s.current_staff).collect();
    assert_eq!(counts, vec![3, 2, 4], "a swap must not change headcount");

    let alert = ws.alert("alert-E003").unwrap();
    assert!(alert.is_resolved());
    assert!(alert.resolved_at().is_some());
}

#[test]
fn no_partner_leaves_schedule_and_alert_untouched() {
    let mut ws = demo_workshop("rot-none");
    let before = ws.schedule().to_vec();

    let outcome = ws.resolve_alert("alert-E001").unwrap();

    match &outcome {
        RotationOutcome::NoPartnerAvailable { elf_id, station_id, reason, .. } => {
            assert_eq!(elf_id, "E001");
            assert_eq!(station_id, "S001");
            assert!(reason.starts_with("No rotation partner available for Jingle"));
        }
        other => panic!("expected NoPartnerAvailable, got {other:?}"),
    }
    assert_eq!(ws.schedule(), before.as_slice());
    assert!(!ws.alert("alert-E001").unwrap().is_resolved());
}

#[test]
fn resolving_twice_is_an_error() {
    let mut ws = demo_workshop("rot-twice");
    ws.resolve_alert("alert-E003").unwrap();

    match ws.resolve_alert("alert-E003") {
        Err(ShiftError::AlertAlreadyResolved { alert_id }) => assert_eq!(alert_id, "alert-E003"),
        other => panic!("expected AlertAlreadyResolved, got {other:?}"),
    }
}

#[test]
fn unknown_alert_is_not_found() {
    let mut ws = demo_workshop("rot-404");
    let before = ws.schedule().to_vec();

    assert!(matches!(
        ws.resolve_alert("alert-E999"),
        Err(ShiftError::NotFound { kind: "Alert", .. })
    ));
    assert_eq!(ws.schedule(), before.as_slice());
}

#[test]
fn regeneration_after_rotation_raises_a_fresh_alert() {
    let mut ws = demo_workshop("rot-regen");
    ws.resolve_alert("alert-E003").unwrap();

    let run = ws.regenerate();

    assert_eq!(station_of(&ws, "E003").as_deref(), Some("S003"));
    assert!(run.alerts.iter().any(|a| a.id == "alert-E003-2"));
    assert!(run.alerts.iter().any(|a| a.id == "alert-E001"));
    assert_eq!(ws.alerts().len(), 5);
    assert_eq!(ws.unresolved_alerts().count(), 4);
}

// ── Resolver against hand-built schedules ─────────────────────

fn elf(id: &str, skills: &[&str], hours: f64, days: u32, breaks: u32) -> Elf {
    Elf {
        id: id.into(),
        name: format!("Elf {id}"),
        skills: skills.iter().map(|s| s.to_string()).collect(),
        preferences: vec![],
        recent_hours: hours,
        consecutive_days: days,
        last_break_at: Utc.with_ymd_and_hms(2024, 12, 14, 9, 0, 0).unwrap(),
        breaks_taken_today: breaks,
    }
}

fn station(id: &str, name: &str, stress: u8) -> Station {
    Station {
        id: id.into(),
        name: name.into(),
        staff_needed: 1,
        stress_level: stress,
        required_skill: None,
        opens_at: None,
        closes_at: None,
    }
}

struct Fixture {
    roster: Roster,
    estimator: RiskEstimator,
    schedule: ScheduleConfig,
}

impl Fixture {
    fn new(elves: Vec<Elf>) -> Self {
        Self::with_qa_stress(elves, 2)
    }

    fn with_qa_stress(elves: Vec<Elf>, qa_stress: u8) -> Self {
        Self {
            roster: Roster::new(
                elves,
                vec![station("S1", "Assembly", 8), station("S2", "QA", qa_stress)],
                vec![],
            )
            .unwrap(),
            estimator: RiskEstimator::new(RiskConfig::default()),
            schedule: ScheduleConfig::default(),
        }
    }

    fn assign(&self, elf_id: &str, station_id: &str) -> ShiftAssignment {
        let e = self.roster.elf(elf_id).unwrap();
        let s = self.roster.station(station_id).unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 12, 14).unwrap();
        ShiftAssignment::new(e, s, date, &self.schedule, self.estimator.assess_for_station(e, s))
    }

    fn resolver(&self) -> RotationResolver<'_> {
        RotationResolver::new(&self.estimator, &self.schedule, 30)
    }
}

fn alert_for(assignment: &ShiftAssignment) -> BurnoutAlert {
    BurnoutAlert::raise(assignment, 0, Utc.with_ymd_and_hms(2024, 12, 14, 8, 0, 0).unwrap(), 30)
}

#[test]
fn unassigned_partner_beats_a_swap_in_the_same_tier() {
    let fx = Fixture::new(vec![
        elf("E1", &["assembly", "qa"], 55.0, 9, 0),
        elf("E2", &["assembly", "qa"], 10.0, 2, 2),
        elf("E3", &["assembly"], 12.0, 2, 2),
    ]);
    let mut assignments = vec![fx.assign("E1", "S1"), fx.assign("E2", "S2")];
    let alert = alert_for(&assignments[0]);
    assert_eq!(alert.level(), RiskLevel::High);

    let outcome = fx.resolver().resolve(&alert, &mut assignments, &fx.roster).unwrap();
    let rotation = outcome.rotation().expect("rotated");

    assert_eq!(rotation.elf_in.id, "E3");
    assert_eq!(rotation.elf_out_covers, None);
    assert_eq!(assignments[0].elf_id, "E3");
    assert_eq!(assignments[1].elf_id, "E2");
    assert!(assignments.iter().all(|a| a.elf_id != "E1"));
}

#[test]
fn swap_requires_the_tired_elf_to_cover_the_partner_station() {
    let fx = Fixture::new(vec![
        elf("E1", &["assembly"], 55.0, 9, 0),
        elf("E2", &["assembly", "qa"], 10.0, 2, 2),
    ]);
    let mut assignments = vec![fx.assign("E1", "S1"), fx.assign("E2", "S2")];
    let before = assignments.clone();
    let alert = alert_for(&assignments[0]);

    let outcome = fx.resolver().resolve(&alert, &mut assignments, &fx.roster).unwrap();

    assert!(!outcome.is_rotated());
    assert_eq!(assignments, before);
}

#[test]
fn swap_into_an_equally_risky_seat_is_refused() {
    // The tired elf would score 9.33 (critical) on the stress-10 QA line.
    let fx = Fixture::with_qa_stress(
        vec![
            elf("E1", &["assembly", "qa"], 55.0, 9, 0),
            elf("E2", &["assembly", "qa"], 10.0, 2, 2),
        ],
        10,
    );
    let mut assignments = vec![fx.assign("E1", "S1"), fx.assign("E2", "S2")];
    let before = assignments.clone();
    let alert = alert_for(&assignments[0]);
    assert_eq!(alert.level(), RiskLevel::High);

    let outcome = fx.resolver().resolve(&alert, &mut assignments, &fx.roster).unwrap();

    assert!(matches!(outcome, RotationOutcome::NoPartnerAvailable { .. }));
    assert_eq!(assignments, before);
}

#[test]
fn swap_leaves_the_tired_elf_below_the_alert_tier() {
    let fx = Fixture::with_qa_stress(
        vec![
            elf("E1", &["assembly", "qa"], 20.0, 3, 2),
            elf("E2", &["assembly", "qa"], 10.0, 2, 2),
        ],
        1,
    );
    let mut assignments = vec![fx.assign("E1", "S1"), fx.assign("E2", "S2")];
    let alert = alert_for(&assignments[0]);
    assert_eq!(alert.level(), RiskLevel::Medium);

    let outcome = fx.resolver().resolve(&alert, &mut assignments, &fx.roster).unwrap();

    assert_eq!(outcome.rotation().expect("rotated").elf_in.id, "E2");
    let covering = assignments.iter().find(|a| a.elf_id == "E1").unwrap();
    assert_eq!(covering.station_id, "S2");
    assert!(covering.risk.level() < alert.level(), "E1 now at {:?}", covering.risk);
}

#[test]
fn high_alert_falls_back_to_a_medium_partner() {
    let fx = Fixture::new(vec![
        elf("E1", &["assembly"], 55.0, 9, 0),
        elf("E2", &["qa"], 10.0, 2, 2),
        elf("E3", &["assembly"], 30.0, 5, 1),
    ]);
    let mut assignments = vec![fx.assign("E1", "S1"), fx.assign("E2", "S2")];
    let alert = alert_for(&assignments[0]);
    assert_eq!(alert.level(), RiskLevel::High);

    let outcome = fx.resolver().resolve(&alert, &mut assignments, &fx.roster).unwrap();
    let rotation = outcome.rotation().expect("rotated");

    assert_eq!(rotation.elf_in.id, "E3");
    assert_eq!(rotation.substitute_risk.level(), RiskLevel::Medium);
    assert_eq!(assignments[0].elf_id, "E3");
}

#[test]
fn medium_alert_with_only_medium_partners_is_not_rotated() {
    let fx = Fixture::new(vec![
        elf("E1", &["assembly"], 30.0, 5, 1),
        elf("E3", &["assembly"], 28.0, 5, 1),
    ]);
    let mut assignments = vec![fx.assign("E1", "S1")];
    let alert = alert_for(&assignments[0]);
    assert_eq!(alert.level(), RiskLevel::Medium);

    let outcome = fx.resolver().resolve(&alert, &mut assignments, &fx.roster).unwrap();

    assert!(matches!(outcome, RotationOutcome::NoPartnerAvailable { .. }));
    assert_eq!(assignments[0].elf_id, "E1");
}

#[test]
fn alert_for_elf_without_a_shift_is_not_on_schedule() {
    let fx = Fixture::new(vec![
        elf("E1", &["assembly"], 55.0, 9, 0),
        elf("E2", &["assembly"], 10.0, 2, 2),
    ]);
    let alert = alert_for(&fx.assign("E1", "S1"));
    let mut assignments = vec![fx.assign("E2", "S1")];

    let outcome = fx.resolver().resolve(&alert, &mut assignments, &fx.roster).unwrap();

    assert!(matches!(outcome, RotationOutcome::NotOnSchedule { .. }));
    assert_eq!(assignments[0].elf_id, "E2");
}
