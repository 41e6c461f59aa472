//! Roster ingestion: every record is validated up front.

use chrono::{NaiveTime, TimeZone, Utc};
use elfshift_core::{
    roster::{Elf, Order, Priority, Roster, Station},
    ShiftError,
};

fn elf(id: &str, skills: &[&str]) -> Elf {
    Elf {
        id: id.into(),
        name: format!("Elf {id}"),
        skills: skills.iter().map(|s| s.to_string()).collect(),
        preferences: vec![],
        recent_hours: 20.0,
        consecutive_days: 2,
        last_break_at: Utc.with_ymd_and_hms(2024, 12, 14, 9, 0, 0).unwrap(),
        breaks_taken_today: 1,
    }
}

fn station(id: &str, name: &str) -> Station {
    Station {
        id: id.into(),
        name: name.into(),
        staff_needed: 2,
        stress_level: 5,
        required_skill: None,
        opens_at: None,
        closes_at: None,
    }
}

fn order(id: &str, stations: &[&str]) -> Order {
    Order {
        id: id.into(),
        quantity: 100,
        priority: Priority::High,
        required_stations: stations.iter().map(|s| s.to_string()).collect(),
        deadline: None,
    }
}

fn assert_invalid(result: Result<Roster, ShiftError>, needle: &str) {
    match result {
        Err(ShiftError::InvalidRoster { reason }) => {
            assert!(reason.contains(needle), "reason '{reason}' lacks '{needle}'")
        }
        other => panic!("expected InvalidRoster, got {other:?}"),
    }
}

#[test]
fn valid_roster_is_accepted() {
    let roster = Roster::new(
        vec![elf("E1", &["wrapping"]), elf("E2", &["qa"])],
        vec![station("S1", "Wrapping"), station("S2", "QA")],
        vec![order("O1", &["wrapping", "QA"])],
    )
    .unwrap();
    assert_eq!(roster.elves().len(), 2);
    assert_eq!(roster.station_by_name("qa").unwrap().id, "S2");
}

#[test]
fn elf_without_skills_is_rejected() {
    assert_invalid(
        Roster::new(vec![elf("E1", &[])], vec![station("S1", "Wrapping")], vec![]),
        "E1",
    );
}

#[test]
fn negative_hours_are_rejected() {
    let mut e = elf("E1", &["wrapping"]);
    e.recent_hours = -4.0;
    assert_invalid(
        Roster::new(vec![e], vec![station("S1", "Wrapping")], vec![]),
        "recent_hours",
    );
}

#[test]
fn duplicate_elf_ids_are_rejected() {
    assert_invalid(
        Roster::new(
            vec![elf("E1", &["qa"]), elf("E1", &["wrapping"])],
            vec![station("S1", "Wrapping")],
            vec![],
        ),
        "E1",
    );
}

#[test]
fn elf_id_with_a_dash_is_rejected() {
    assert_invalid(
        Roster::new(
            vec![elf("E1", &["qa"]), elf("E1-2", &["qa"])],
            vec![station("S1", "QA")],
            vec![],
        ),
        "E1-2",
    );
}

#[test]
fn station_names_differing_only_in_case_are_rejected() {
    assert_invalid(
        Roster::new(
            vec![elf("E1", &["wrapping"])],
            vec![station("S1", "Wrapping"), station("S2", "WRAPPING")],
            vec![],
        ),
        "wrapping",
    );
}

#[test]
fn station_needing_nobody_is_rejected() {
    let mut s = station("S1", "Wrapping");
    s.staff_needed = 0;
    assert_invalid(Roster::new(vec![elf("E1", &["wrapping"])], vec![s], vec![]), "S1");
}

#[test]
fn stress_outside_one_to_ten_is_rejected() {
    for stress in [0u8, 11] {
        let mut s = station("S1", "Wrapping");
        s.stress_level = stress;
        assert_invalid(
            Roster::new(vec![elf("E1", &["wrapping"])], vec![s], vec![]),
            "stress_level",
        );
    }
}

#[test]
fn station_hours_must_be_paired_and_ordered() {
    let mut half = station("S1", "Wrapping");
    half.opens_at = NaiveTime::from_hms_opt(9, 0, 0);
    assert_invalid(
        Roster::new(vec![elf("E1", &["wrapping"])], vec![half], vec![]),
        "both",
    );

    let mut backwards = station("S1", "Wrapping");
    backwards.opens_at = NaiveTime::from_hms_opt(17, 0, 0);
    backwards.closes_at = NaiveTime::from_hms_opt(9, 0, 0);
    assert_invalid(
        Roster::new(vec![elf("E1", &["wrapping"])], vec![backwards], vec![]),
        "opens at",
    );
}

#[test]
fn order_referencing_unknown_station_is_rejected() {
    assert_invalid(
        Roster::new(
            vec![elf("E1", &["wrapping"])],
            vec![station("S1", "Wrapping")],
            vec![order("O1", &["painting"])],
        ),
        "painting",
    );
}

#[test]
fn unknown_ids_are_not_found() {
    let roster = Roster::new(vec![elf("E1", &["qa"])], vec![station("S1", "QA")], vec![]).unwrap();
    match roster.elf("E404") {
        Err(ShiftError::NotFound { kind, id }) => {
            assert_eq!(kind, "Elf");
            assert_eq!(id, "E404");
        }
        other => panic!("expected NotFound, got {other:?}"),
    }
    assert!(roster.station("S404").is_err());
    assert!(roster.order("O404").is_err());
}

#[test]
fn skill_matching_ignores_case_and_honours_required_skill() {
    let mut s = station("S1", "Gift Wrap");
    s.required_skill = Some("wrapping".into());
    let roster = Roster::new(vec![elf("E1", &["Wrapping"])], vec![s], vec![]).unwrap();
    let e = roster.elf("E1").unwrap();
    assert!(e.is_qualified_for(roster.station("S1").unwrap()));
}

#[test]
fn demo_roster_loads_from_data_dir() {
    let roster = Roster::load(concat!(env!("CARGO_MANIFEST_DIR"), "/../data")).unwrap();
    assert_eq!(roster.elves().len(), 10);
    assert_eq!(roster.stations().len(), 3);
    assert_eq!(roster.orders().len(), 3);
}

#[test]
fn missing_roster_file_names_the_path() {
    let err = Roster::load("/nonexistent/elfshift").unwrap_err();
    assert!(err.to_string().contains("/nonexistent/elfshift/roster/workshop.json"));
}
