use std::{fmt, str::FromStr};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::core::errors::CoreError;
use crate::domain::common::{lenient_hours, Identifiable, PurchaseContext, RecordId};

/// Cooling-off periods offered when a decision is deferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaitOption {
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "24h")]
    OneDay,
    #[serde(rename = "72h")]
    ThreeDays,
    #[serde(rename = "7d")]
    OneWeek,
}

impl WaitOption {
    pub const ALL: [WaitOption; 4] = [
        WaitOption::OneHour,
        WaitOption::OneDay,
        WaitOption::ThreeDays,
        WaitOption::OneWeek,
    ];

    pub fn hours(self) -> i64 {
        match self {
            WaitOption::OneHour => 1,
            WaitOption::OneDay => 24,
            WaitOption::ThreeDays => 72,
            WaitOption::OneWeek => 7 * 24,
        }
    }

    pub fn duration(self) -> Duration {
        Duration::hours(self.hours())
    }

    pub fn label(self) -> &'static str {
        match self {
            WaitOption::OneHour => "1h",
            WaitOption::OneDay => "24h",
            WaitOption::ThreeDays => "72h",
            WaitOption::OneWeek => "7d",
        }
    }
}

impl Default for WaitOption {
    fn default() -> Self {
        WaitOption::OneDay
    }
}

impl fmt::Display for WaitOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for WaitOption {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1h" => Ok(WaitOption::OneHour),
            "24h" | "1d" => Ok(WaitOption::OneDay),
            "72h" | "3d" => Ok(WaitOption::ThreeDays),
            "7d" | "1w" | "168h" => Ok(WaitOption::OneWeek),
            other => Err(CoreError::InvalidInput(format!(
                "unsupported wait `{}` (choose 1h, 24h, 72h or 7d)",
                other
            ))),
        }
    }
}

/// A purchase parked for a cooling-off period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuarantineItem {
    pub id: RecordId,
    #[serde(alias = "valor")]
    pub price: f64,
    #[serde(rename = "hours", default, deserialize_with = "lenient_hours")]
    pub hours_equivalent: f64,
    #[serde(flatten)]
    pub context: PurchaseContext,
    #[serde(alias = "lembrete_timestamp", with = "chrono::serde::ts_milliseconds")]
    pub target_time: DateTime<Utc>,
    #[serde(default)]
    pub notified: bool,
}

impl QuarantineItem {
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.target_time <= now
    }

    /// Due and not yet announced.
    pub fn needs_notice(&self, now: DateTime<Utc>) -> bool {
        self.is_due(now) && !self.notified
    }

    /// Remaining wait, never negative.
    pub fn time_left(&self, now: DateTime<Utc>) -> Duration {
        (self.target_time - now).max(Duration::zero())
    }
}

impl Identifiable for QuarantineItem {
    fn id(&self) -> RecordId {
        self.id
    }
}

/// Emitted once per quarantine item when its wait is over.
#[derive(Debug, Clone, PartialEq)]
pub struct ReminderNotice {
    pub id: RecordId,
    pub price: f64,
    pub description: Option<String>,
    pub target_time: DateTime<Utc>,
}

impl From<&QuarantineItem> for ReminderNotice {
    fn from(item: &QuarantineItem) -> Self {
        Self {
            id: item.id,
            price: item.price,
            description: item.context.description.clone(),
            target_time: item.target_time,
        }
    }
}
