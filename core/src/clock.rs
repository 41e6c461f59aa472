//! Workshop clock: the single source of "now" for alert timestamps and
//! the default shift date.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum WorkshopClock {
    /// Wall-clock time.
    System,
    /// Frozen instant. Tests and replays use this so that alert
    /// timestamps and the default shift date are reproducible.
    Fixed { at: DateTime<Utc> },
}

impl WorkshopClock {
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed { at }
    }

    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Self::System => Utc::now(),
            Self::Fixed { at } => *at,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

impl Default for WorkshopClock {
    fn default() -> Self {
        Self::System
    }
}

/// Serde adapter for wall-clock times written as `HH:MM`.
/// Accepts `HH:MM:SS` on input.
pub mod wall_time {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }

    pub(crate) fn parse(raw: &str) -> Result<NaiveTime, String> {
        NaiveTime::parse_from_str(raw, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
            .map_err(|e| format!("invalid wall-clock time '{raw}': {e}"))
    }

    /// Same format for optional fields.
    pub mod option {
        use chrono::NaiveTime;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(time: &Option<NaiveTime>, s: S) -> Result<S::Ok, S::Error> {
            match time {
                Some(t) => s.serialize_str(&t.format("%H:%M").to_string()),
                None => s.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveTime>, D::Error> {
            let raw: Option<String> = Option::deserialize(d)?;
            raw.map(|r| super::parse(&r).map_err(serde::de::Error::custom))
                .transpose()
        }
    }
}
