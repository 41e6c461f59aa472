//! Schedule snapshots: the full schedule and alert history, serialized to
//! JSON after every regeneration.

use crate::{
    alert::BurnoutAlert,
    scheduler::ShiftAssignment,
    types::{Generation, SessionId},
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct WorkshopSnapshot<'a> {
    pub session_id: &'a SessionId,
    pub generation: Generation,
    pub date: Option<NaiveDate>,
    pub taken_at: DateTime<Utc>,
    pub assignments: &'a [ShiftAssignment],
    pub alerts: &'a [BurnoutAlert],
}
