use crate::{
    error::ShiftError,
    shared::SharedWorkshop,
    types::{AlertId, ElfId},
};
use serde::{Deserialize, Serialize};

/// Every request the workshop accepts from the outside.
/// Variants are appended, never removed or reordered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum WorkshopCommand {
    // ── Roster reads ──────────────────────────────
    ListElves,
    GetElf { elf_id: ElfId },
    ListStations,
    ListOrders,

    // ── Schedule ──────────────────────────────────
    GetSchedule,
    GenerateSchedule,

    // ── Alerts ────────────────────────────────────
    ListAlerts,
    ResolveAlert { alert_id: AlertId },
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    NotFound,
    Invalid,
    Error,
}

impl From<&ShiftError> for FailureKind {
    fn from(e: &ShiftError) -> Self {
        match e {
            ShiftError::NotFound { .. } => Self::NotFound,
            ShiftError::InvalidRoster { .. } | ShiftError::AlertAlreadyResolved { .. } => {
                Self::Invalid
            }
            _ => Self::Error,
        }
    }
}

/// One reply per command. A failed command never takes the workshop down.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CommandResponse {
    Ok { data: serde_json::Value },
    Failed { kind: FailureKind, message: String },
}

impl CommandResponse {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok { .. })
    }

    fn from_result<T: Serialize>(result: Result<T, ShiftError>) -> Self {
        let failed = |e: &ShiftError| Self::Failed {
            kind: e.into(),
            message: e.to_string(),
        };
        match result.and_then(|v| serde_json::to_value(v).map_err(ShiftError::from)) {
            Ok(data) => Self::Ok { data },
            Err(e) => failed(&e),
        }
    }
}

impl SharedWorkshop {
    pub fn execute(&self, command: WorkshopCommand) -> CommandResponse {
        log::debug!("command: {command:?}");
        match command {
            WorkshopCommand::ListElves => CommandResponse::from_result(Ok(self.elves())),
            WorkshopCommand::GetElf { elf_id } => CommandResponse::from_result(self.elf(&elf_id)),
            WorkshopCommand::ListStations => CommandResponse::from_result(Ok(self.stations())),
            WorkshopCommand::ListOrders => CommandResponse::from_result(Ok(self.orders())),
            WorkshopCommand::GetSchedule => CommandResponse::from_result(Ok(self.schedule())),
            WorkshopCommand::GenerateSchedule => CommandResponse::from_result(Ok(self.regenerate())),
            WorkshopCommand::ListAlerts => CommandResponse::from_result(Ok(self.alerts())),
            WorkshopCommand::ResolveAlert { alert_id } => {
                CommandResponse::from_result(self.resolve_alert(&alert_id))
            }
        }
    }
}
