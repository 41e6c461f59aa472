//! Outbound notification channel for rotation notices.
//!
//! RULE: delivery is best-effort. `dispatch` never returns an error; a
//! failure becomes `NotificationStatus::Failed` and is logged. Callers
//! report it next to, never instead of, the rotation result.

use crate::{
    config::NotifyConfig,
    error::{ShiftError, ShiftResult},
};
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NotificationStatus {
    Delivered { channel: String },
    /// No external channel configured; the message was logged locally.
    AcknowledgedLocally,
    Failed { channel: String, reason: String },
}

impl NotificationStatus {
    /// True if the message left the process.
    pub fn was_delivered(&self) -> bool {
        matches!(self, Self::Delivered { .. })
    }
}

pub trait Notifier: Send + Sync {
    /// Stable channel name for logs and status reports.
    fn channel(&self) -> &'static str;

    fn deliver(&self, message: &str) -> ShiftResult<NotificationStatus>;
}

/// Deliver through `notifier`, folding any error into the status.
pub fn dispatch(notifier: &dyn Notifier, message: &str) -> NotificationStatus {
    match notifier.deliver(message) {
        Ok(status) => status,
        Err(e) => {
            log::warn!("notify: {} delivery failed: {e}", notifier.channel());
            NotificationStatus::Failed {
                channel: notifier.channel().to_string(),
                reason: e.to_string(),
            }
        }
    }
}

/// Build the channel named by config: a webhook if a URL is set,
/// otherwise local acknowledgement.
pub fn from_config(config: &NotifyConfig) -> ShiftResult<Box<dyn Notifier>> {
    match &config.webhook_url {
        Some(url) if !url.trim().is_empty() => Ok(Box::new(WebhookNotifier::new(
            url.clone(),
            Duration::from_millis(config.timeout_ms),
        )?)),
        _ => Ok(Box::new(LocalNotifier)),
    }
}

/// Logs the message and acknowledges it.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalNotifier;

impl Notifier for LocalNotifier {
    fn channel(&self) -> &'static str {
        "local"
    }

    fn deliver(&self, message: &str) -> ShiftResult<NotificationStatus> {
        log::info!("[notify:local] {message}");
        Ok(NotificationStatus::AcknowledgedLocally)
    }
}

/// Posts `{"text": message}` to an incoming-webhook URL.
pub struct WebhookNotifier {
    url: String,
    client: reqwest::blocking::Client,
}

impl WebhookNotifier {
    pub fn new(url: String, timeout: Duration) -> ShiftResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ShiftError::Notification {
                reason: format!("cannot build webhook client: {e}"),
            })?;
        Ok(Self { url, client })
    }
}

impl Notifier for WebhookNotifier {
    fn channel(&self) -> &'static str {
        "webhook"
    }

    fn deliver(&self, message: &str) -> ShiftResult<NotificationStatus> {
        let response = self
            .client
            .post(&self.url)
            .json(&serde_json::json!({ "text": message }))
            .send()
            .map_err(|e| ShiftError::Notification {
                reason: if e.is_timeout() {
                    "webhook timed out".to_string()
                } else {
                    e.to_string()
                },
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ShiftError::Notification {
                reason: format!("webhook returned {status}"),
            });
        }
        log::debug!("notify: webhook accepted message");
        Ok(NotificationStatus::Delivered {
            channel: self.channel().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Broken;

    impl Notifier for Broken {
        fn channel(&self) -> &'static str {
            "broken"
        }

        fn deliver(&self, _message: &str) -> ShiftResult<NotificationStatus> {
            Err(ShiftError::Notification {
                reason: "connection refused".into(),
            })
        }
    }

    #[test]
    fn dispatch_folds_errors_into_status() {
        let status = dispatch(&Broken, "hello");
        assert_eq!(
            status,
            NotificationStatus::Failed {
                channel: "broken".into(),
                reason: "Notification failed: connection refused".into(),
            }
        );
        assert!(!status.was_delivered());
    }

    #[test]
    fn missing_webhook_falls_back_to_local() {
        let notifier = from_config(&NotifyConfig::default()).unwrap();
        assert_eq!(notifier.channel(), "local");
        assert_eq!(dispatch(notifier.as_ref(), "hi"), NotificationStatus::AcknowledgedLocally);
    }
}
