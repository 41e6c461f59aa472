//! Thread-safe handle over one `Workshop`.
//!
//! Reads take the read lock and return owned copies. Regeneration and
//! alert resolution take the write lock, so a reader never sees a
//! half-built schedule or a half-applied swap.
//!
//! RULE: the outbound notice is sent after the write lock is released.
//! A slow or dead channel must not block readers.

use crate::{
    alert::BurnoutAlert,
    error::ShiftResult,
    notify::{self, NotificationStatus, Notifier},
    roster::Order,
    rotation::RotationOutcome,
    scheduler::{ScheduleRun, ShiftAssignment},
    types::AlertId,
    workshop::{ElfView, StationView, Workshop},
};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;

/// What happened when an alert was resolved: the local outcome, plus how
/// the notice fared if one was sent.
#[derive(Debug, Clone, Serialize)]
pub struct ResolutionReport {
    pub alert_id: AlertId,
    pub resolved: bool,
    pub message: String,
    pub outcome: RotationOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification: Option<NotificationStatus>,
}

#[derive(Clone)]
pub struct SharedWorkshop {
    inner: Arc<RwLock<Workshop>>,
    notifier: Arc<dyn Notifier>,
}

impl SharedWorkshop {
    pub fn new(workshop: Workshop, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(workshop)),
            notifier,
        }
    }

    /// Run `f` under the read lock.
    pub fn read<R>(&self, f: impl FnOnce(&Workshop) -> R) -> R {
        f(&self.inner.read())
    }

    pub fn elves(&self) -> Vec<ElfView> {
        self.inner.read().elves()
    }

    pub fn elf(&self, id: &str) -> ShiftResult<ElfView> {
        self.inner.read().elf(id)
    }

    pub fn stations(&self) -> Vec<StationView> {
        self.inner.read().stations()
    }

    pub fn orders(&self) -> Vec<Order> {
        self.inner.read().orders().to_vec()
    }

    pub fn schedule(&self) -> Vec<ShiftAssignment> {
        self.inner.read().schedule().to_vec()
    }

    pub fn alerts(&self) -> Vec<BurnoutAlert> {
        self.inner.read().alerts().to_vec()
    }

    pub fn regenerate(&self) -> ScheduleRun {
        self.inner.write().regenerate()
    }

    /// Resolve one alert by rotation, then announce the rotation if one
    /// happened. Notification failure never undoes the rotation.
    pub fn resolve_alert(&self, alert_id: &str) -> ShiftResult<ResolutionReport> {
        let outcome = self.inner.write().resolve_alert(alert_id)?;

        let notification = outcome
            .rotation()
            .map(|rotation| notify::dispatch(self.notifier.as_ref(), &rotation.notice_text()));
        if let Some(status) = &notification {
            self.inner.read().record_notification(alert_id, status);
        }

        Ok(ResolutionReport {
            alert_id: alert_id.to_string(),
            resolved: outcome.is_rotated(),
            message: outcome.message(),
            outcome,
            notification,
        })
    }
}
