use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::errors::CoreError;
use crate::domain::common::{lenient_hours, Identifiable, PurchaseContext, RecordId};

/// Final outcome of a purchase decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionAction {
    Buy,
    Skip,
}

impl DecisionAction {
    pub fn label(self) -> &'static str {
        match self {
            DecisionAction::Buy => "bought",
            DecisionAction::Skip => "skipped",
        }
    }
}

impl fmt::Display for DecisionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DecisionAction {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buy" | "bought" => Ok(DecisionAction::Buy),
            "skip" | "skipped" => Ok(DecisionAction::Skip),
            other => Err(CoreError::InvalidInput(format!(
                "unknown decision `{}` (use buy or skip)",
                other
            ))),
        }
    }
}

/// An immutable record of a finished decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionRecord {
    pub id: RecordId,
    pub price: f64,
    #[serde(rename = "hours", default, deserialize_with = "lenient_hours")]
    pub hours_equivalent: f64,
    pub action: DecisionAction,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub context: PurchaseContext,
}

impl DecisionRecord {
    pub fn is_skip(&self) -> bool {
        self.action == DecisionAction::Skip
    }
}

impl Identifiable for DecisionRecord {
    fn id(&self) -> RecordId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_string_hours_from_older_exports() {
        let record: DecisionRecord = serde_json::from_str(
            r#"{"id": 1712345678901, "price": 250, "hours": "12.5", "action": "skip", "timestamp": 1712345678901}"#,
        )
        .unwrap();
        assert_eq!(record.hours_equivalent, 12.5);
        assert!(record.is_skip());
        assert!(record.context.is_empty());
    }

    #[test]
    fn non_numeric_hours_fall_back_to_zero() {
        let record: DecisionRecord = serde_json::from_str(
            r#"{"id": 1, "price": 10, "hours": "Infinity", "action": "buy", "timestamp": 1}"#,
        )
        .unwrap();
        assert_eq!(record.hours_equivalent, 0.0);
    }
}
