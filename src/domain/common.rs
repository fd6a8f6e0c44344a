use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};

use crate::core::errors::{CoreError, Result};

/// Lowest accepted impulse score.
pub const IMPULSE_MIN: u8 = 1;
/// Highest accepted impulse score.
pub const IMPULSE_MAX: u8 = 10;

/// Identifies entities that expose a stable unique identifier.
pub trait Identifiable {
    fn id(&self) -> RecordId;
}

pub fn find_by_id<T: Identifiable>(items: &[T], id: RecordId) -> Option<&T> {
    items.iter().find(|item| item.id() == id)
}

/// Removes the record with `id`, keeping the others in order.
pub fn take_by_id<T: Identifiable>(items: &mut Vec<T>, id: RecordId) -> Option<T> {
    let index = items.iter().position(|item| item.id() == id)?;
    Some(items.remove(index))
}

/// Time-based record identifier (Unix milliseconds, bumped to stay unique).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl RecordId {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecordId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .parse::<u64>()
            .map(RecordId)
            .map_err(|_| CoreError::InvalidInput(format!("`{}` is not a record id", s)))
    }
}

// Older documents stored ids as strings and some tools write whole floats.
impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(u64),
            Float(f64),
            Text(String),
        }

        match RawId::deserialize(deserializer)? {
            RawId::Number(value) => Ok(RecordId(value)),
            RawId::Float(value) if value >= 0.0 && value.fract() == 0.0 => {
                Ok(RecordId(value as u64))
            }
            RawId::Float(value) => Err(de::Error::custom(format!("invalid record id {value}"))),
            RawId::Text(text) => text.parse().map_err(de::Error::custom),
        }
    }
}

/// Hands out strictly increasing ids derived from the clock.
#[derive(Debug, Default, Clone)]
pub struct IdGenerator {
    last: u64,
}

impl IdGenerator {
    /// Starts after `last`, usually the largest id already stored.
    pub fn seeded(last: u64) -> Self {
        Self { last }
    }

    /// Last id handed out (or the seed).
    pub fn peek(&self) -> u64 {
        self.last
    }

    pub fn next(&mut self, now: DateTime<Utc>) -> RecordId {
        let millis = u64::try_from(now.timestamp_millis()).unwrap_or(0);
        let id = millis.max(self.last.saturating_add(1));
        self.last = id;
        RecordId(id)
    }
}

/// Optional metadata attached to a purchase being considered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseContext {
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "nome")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "categoria")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impulse_score: Option<u8>,
}

impl PurchaseContext {
    /// Builds a context, trimming text and validating the impulse score.
    pub fn new(
        description: Option<&str>,
        category: Option<&str>,
        impulse_score: Option<u8>,
    ) -> Result<Self> {
        if let Some(score) = impulse_score {
            if !(IMPULSE_MIN..=IMPULSE_MAX).contains(&score) {
                return Err(CoreError::InvalidInput(format!(
                    "impulse score must be between {} and {}",
                    IMPULSE_MIN, IMPULSE_MAX
                )));
            }
        }
        Ok(Self {
            description: clean_text(description),
            category: clean_text(category),
            impulse_score,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.description.is_none() && self.category.is_none() && self.impulse_score.is_none()
    }

    /// Drops blank strings and out-of-range scores carried in from older documents.
    pub(crate) fn normalized(self) -> Self {
        Self {
            description: clean_text(self.description.as_deref()),
            category: clean_text(self.category.as_deref()),
            impulse_score: self
                .impulse_score
                .filter(|score| (IMPULSE_MIN..=IMPULSE_MAX).contains(score)),
        }
    }

    /// Short label for listings: the description, or a placeholder.
    pub fn label(&self) -> &str {
        self.description.as_deref().unwrap_or("Unnamed item")
    }
}

fn clean_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

/// Accepts the hour figure either as a number or as the string older
/// documents produced (`"12.5"`). Anything unusable becomes zero.
pub(crate) fn lenient_hours<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawHours {
        Number(f64),
        Text(String),
        Missing(()),
    }

    let hours = match RawHours::deserialize(deserializer)? {
        RawHours::Number(value) => value,
        RawHours::Text(text) => text.trim().parse().unwrap_or(0.0),
        RawHours::Missing(()) => 0.0,
    };
    Ok(if hours.is_finite() { hours } else { 0.0 })
}
