use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TaskError;
use crate::time::compute_next;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum IntervalUnit {
    Minutes,
    Hours,
    Days,
}

impl Default for IntervalUnit {
    fn default() -> Self {
        IntervalUnit::Minutes
    }
}

impl IntervalUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntervalUnit::Minutes => "minutes",
            IntervalUnit::Hours => "hours",
            IntervalUnit::Days => "days",
        }
    }

    /// Unit word agreeing with `value`, e.g. "1 hour" / "3 hours".
    pub fn label(&self, value: u32) -> &'static str {
        match (self, value) {
            (IntervalUnit::Minutes, 1) => "minute",
            (IntervalUnit::Minutes, _) => "minutes",
            (IntervalUnit::Hours, 1) => "hour",
            (IntervalUnit::Hours, _) => "hours",
            (IntervalUnit::Days, 1) => "day",
            (IntervalUnit::Days, _) => "days",
        }
    }

    pub fn short(&self) -> &'static str {
        match self {
            IntervalUnit::Minutes => "m",
            IntervalUnit::Hours => "h",
            IntervalUnit::Days => "d",
        }
    }
}

impl fmt::Display for IntervalUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IntervalUnit {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "m" | "min" | "mins" | "minute" | "minutes" => Ok(IntervalUnit::Minutes),
            "h" | "hr" | "hrs" | "hour" | "hours" => Ok(IntervalUnit::Hours),
            "d" | "day" | "days" => Ok(IntervalUnit::Days),
            other => Err(TaskError::UnknownUnit(other.to_string())),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TaskColor {
    Blue,
    Green,
    Purple,
    Orange,
    Pink,
}

impl Default for TaskColor {
    fn default() -> Self {
        TaskColor::Blue
    }
}

impl TaskColor {
    pub const ALL: [TaskColor; 5] = [
        TaskColor::Blue,
        TaskColor::Green,
        TaskColor::Purple,
        TaskColor::Orange,
        TaskColor::Pink,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskColor::Blue => "blue",
            TaskColor::Green => "green",
            TaskColor::Purple => "purple",
            TaskColor::Orange => "orange",
            TaskColor::Pink => "pink",
        }
    }
}

impl fmt::Display for TaskColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskColor {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        TaskColor::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or(TaskError::UnknownColor(wanted))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub interval_value: u32,
    pub interval_unit: IntervalUnit,
    pub color: TaskColor,
    #[serde(with = "iso_millis")]
    pub next_notification_at: DateTime<Utc>,

    // Stored and cleared on resume, but nothing ever sets it.
    pub completed: bool,
    pub active: bool,
}

impl Task {
    /// Builds a running task whose first reminder is one interval after `now`.
    /// Does not validate; `TaskStore::add` does that.
    pub fn new(
        title: String,
        interval_value: u32,
        interval_unit: IntervalUnit,
        color: TaskColor,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            interval_value,
            interval_unit,
            color,
            next_notification_at: compute_next(interval_value, interval_unit, now),
            completed: false,
            active: true,
        }
    }

    pub fn is_running(&self) -> bool {
        self.active && !self.completed
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.is_running() && self.next_notification_at <= now
    }

    pub fn pause(&mut self) {
        self.active = false;
    }

    /// Reactivates from `now`; time spent paused is not credited.
    pub fn resume(&mut self, now: DateTime<Utc>) {
        self.active = true;
        self.completed = false;
        self.reschedule(now);
    }

    pub fn reschedule(&mut self, from: DateTime<Utc>) {
        self.next_notification_at = compute_next(self.interval_value, self.interval_unit, from);
    }

    /// "1 minute", "3 hours", ...
    pub fn interval_label(&self) -> String {
        format!("{} {}", self.interval_value, self.interval_unit.label(self.interval_value))
    }

    pub fn short_id(&self) -> String {
        self.id.to_string()[..8].to_string()
    }
}

/// `nextNotificationAt` is written as `2025-01-31T09:00:00.000Z` and read
/// from any RFC 3339 instant.
mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&at.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
