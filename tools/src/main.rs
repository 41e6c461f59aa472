//! elfshift-runner: headless shift scheduler for the workshop.
//!
//! Usage:
//!   elfshift-runner --data-dir ./data --db shifts.db
//!   elfshift-runner --synthetic 40 --seed 7
//!   elfshift-runner --ipc-mode

use anyhow::Result;
use chrono::NaiveDate;
use elfshift_core::{
    clock::WorkshopClock,
    config::ShiftConfig,
    notify,
    risk::RiskLevel,
    roster::Roster,
    scheduler::ScheduleRun,
    store::ShiftStore,
    synthetic::SyntheticRoster,
    SharedWorkshop, Workshop, WorkshopCommand,
};
use std::env;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let synthetic = parse_arg(&args, "--synthetic", 0usize);
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let db = arg_str(&args, "--db").unwrap_or(":memory:");
    let data_dir = arg_str(&args, "--data-dir").unwrap_or("./data");

    let mut config = if Path::new(&format!("{data_dir}/config/elfshift.json")).exists() {
        ShiftConfig::load(data_dir)?
    } else {
        log::warn!("No config under {data_dir}, using built-in defaults");
        ShiftConfig::default()
    };
    if let Some(raw) = arg_str(&args, "--date") {
        let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|e| anyhow::anyhow!("Invalid --date {raw}: {e}"))?;
        config.schedule.shift_date = Some(date);
    }
    if let Ok(url) = env::var("SLACK_WEBHOOK_URL") {
        config.notify.webhook_url = Some(url);
    }

    let roster = if synthetic > 0 {
        SyntheticRoster::generate(seed, synthetic)?
    } else {
        Roster::load(data_dir)?
    };

    if !ipc_mode {
        println!("Elf Shift Scheduler - elfshift-runner");
        println!("  data_dir:  {data_dir}");
        println!("  db:        {db}");
        if synthetic > 0 {
            println!("  roster:    synthetic ({synthetic} elves, seed {seed})");
        }
        println!();
    }

    let session_id = format!("session-{}", uuid::Uuid::new_v4());
    let store = ShiftStore::open_or_memory(db)?;
    let notifier: Arc<dyn notify::Notifier> = Arc::from(notify::from_config(&config.notify)?);
    let workshop = Workshop::new(session_id.clone(), config, roster, WorkshopClock::System, store)?;
    let shared = SharedWorkshop::new(workshop, notifier);

    if ipc_mode {
        run_ipc_loop(&shared)?;
    } else {
        let run = shared.regenerate();
        print_summary(&session_id, &run);
        rotate_urgent(&shared, &run)?;
    }

    Ok(())
}

fn run_ipc_loop(shared: &SharedWorkshop) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let value: serde_json::Value = match serde_json::from_str(&buffer) {
            Ok(v) => v,
            Err(e) => {
                write_error(&mut stdout, &e.to_string())?;
                continue;
            }
        };
        if value["cmd"] == "quit" {
            break;
        }
        let cmd: WorkshopCommand = match serde_json::from_value(value) {
            Ok(c) => c,
            Err(e) => {
                write_error(&mut stdout, &e.to_string())?;
                continue;
            }
        };

        let response = shared.execute(cmd);
        writeln!(stdout, "{}", serde_json::to_string(&response)?)?;
        stdout.flush()?;
    }
    Ok(())
}

fn write_error(stdout: &mut io::Stdout, message: &str) -> Result<()> {
    let err_json = serde_json::json!({ "error": message });
    writeln!(stdout, "{}", err_json)?;
    stdout.flush()?;
    Ok(())
}

/// Rotate every elf whose alert is high or critical.
fn rotate_urgent(shared: &SharedWorkshop, run: &ScheduleRun) -> Result<()> {
    let urgent: Vec<_> = run
        .alerts
        .iter()
        .filter(|a| !a.is_resolved() && a.level() >= RiskLevel::High)
        .map(|a| a.id.clone())
        .collect();
    if urgent.is_empty() {
        return Ok(());
    }

    println!();
    println!("=== ROTATIONS ===");
    for alert_id in urgent {
        let report = shared.resolve_alert(&alert_id)?;
        let delivery = match &report.notification {
            Some(status) if status.was_delivered() => "notified",
            Some(_) => "not notified",
            None => "-",
        };
        println!("  {alert_id:<16} {} [{delivery}]", report.message);
    }
    Ok(())
}

fn print_summary(session_id: &str, run: &ScheduleRun) {
    println!("=== SCHEDULE {} ===", run.date);
    println!("  session:   {session_id}");
    println!("  {}", run.summary);
    println!();
    for a in &run.assignments {
        println!(
            "  {:<10} {:<5} {:<22} {}-{}  risk {:>5.2} ({})",
            a.station_name,
            a.elf_id,
            a.elf_name,
            a.start_time.format("%H:%M"),
            a.end_time.format("%H:%M"),
            a.risk.score(),
            a.risk.level()
        );
    }

    if !run.shortfalls.is_empty() {
        println!();
        println!("=== UNDERSTAFFED ===");
        for s in &run.shortfalls {
            println!("  {:<10} {}/{} ({} missing)", s.station_name, s.filled, s.needed, s.missing());
        }
    }

    if !run.alerts.is_empty() {
        println!();
        println!("=== BURNOUT ALERTS ===");
        for alert in &run.alerts {
            println!("  [{}] {}", alert.level(), alert.notice_text());
        }
    }
}

fn arg_str<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2).find(|w| w[0] == flag).map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
