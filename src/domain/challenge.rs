use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::core::errors::{CoreError, Result};

/// Envelope count of the classic challenge.
pub const BASELINE_ENVELOPES: usize = 100;
/// Sum of `1..=100`, the goal of the classic challenge.
pub const BASELINE_GOAL: f64 = 5050.0;
/// Upper bound for `more_envelopes` challenges.
pub const MAX_ENVELOPES: usize = 10_000;

/// How a savings goal is split into envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeStrategy {
    /// Envelopes worth 1, 2, 3, ... until the goal is reached.
    MoreEnvelopes,
    /// Always 100 envelopes, proportionally scaled to the goal.
    Scaled,
}

impl ChallengeStrategy {
    pub fn label(self) -> &'static str {
        match self {
            ChallengeStrategy::MoreEnvelopes => "more_envelopes",
            ChallengeStrategy::Scaled => "scaled",
        }
    }
}

impl fmt::Display for ChallengeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ChallengeStrategy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "more" | "more_envelopes" => Ok(ChallengeStrategy::MoreEnvelopes),
            "scaled" | "scale" => Ok(ChallengeStrategy::Scaled),
            other => Err(CoreError::InvalidInput(format!(
                "unknown strategy `{}` (use more_envelopes or scaled)",
                other
            ))),
        }
    }
}

/// Result of flipping one envelope.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeToggle {
    pub index: usize,
    pub value: f64,
    pub filled: bool,
}

/// A savings goal split into envelopes, each either filled or not.
#[derive(Debug, Clone, PartialEq)]
pub struct SavingsChallenge {
    target_goal: f64,
    strategy: ChallengeStrategy,
    envelope_values: Vec<f64>,
    envelope_filled: Vec<bool>,
}

impl SavingsChallenge {
    /// The classic 100-envelope challenge worth 5050.
    pub fn baseline() -> Self {
        let values = (1..=BASELINE_ENVELOPES).map(|n| n as f64).collect();
        Self::from_parts(
            BASELINE_GOAL,
            ChallengeStrategy::MoreEnvelopes,
            values,
            Vec::new(),
        )
    }

    /// Generates envelopes for `goal`; every envelope starts unfilled.
    pub fn generate(goal: f64, strategy: ChallengeStrategy) -> Result<Self> {
        if !goal.is_finite() || goal <= 0.0 {
            return Err(CoreError::InvalidInput(
                "savings goal must be greater than zero".into(),
            ));
        }
        let values = match strategy {
            ChallengeStrategy::MoreEnvelopes => incremental_values(goal)?,
            ChallengeStrategy::Scaled => (1..=BASELINE_ENVELOPES)
                .map(|n| (n as f64 * goal / BASELINE_GOAL).round())
                .collect(),
        };
        Ok(Self::from_parts(goal, strategy, values, Vec::new()))
    }

    /// Rebuilds a challenge from stored parts, forcing the filled flags to the
    /// same length as the values.
    pub fn from_parts(
        target_goal: f64,
        strategy: ChallengeStrategy,
        envelope_values: Vec<f64>,
        mut envelope_filled: Vec<bool>,
    ) -> Self {
        envelope_filled.resize(envelope_values.len(), false);
        Self {
            target_goal,
            strategy,
            envelope_values,
            envelope_filled,
        }
    }

    pub fn target_goal(&self) -> f64 {
        self.target_goal
    }

    pub fn strategy(&self) -> ChallengeStrategy {
        self.strategy
    }

    pub fn values(&self) -> &[f64] {
        &self.envelope_values
    }

    pub fn filled(&self) -> &[bool] {
        &self.envelope_filled
    }

    pub fn len(&self) -> usize {
        self.envelope_values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.envelope_values.is_empty()
    }

    pub fn filled_count(&self) -> usize {
        self.envelope_filled.iter().filter(|filled| **filled).count()
    }

    pub fn filled_total(&self) -> f64 {
        self.envelope_values
            .iter()
            .zip(&self.envelope_filled)
            .filter(|(_, filled)| **filled)
            .map(|(value, _)| value)
            .sum()
    }

    pub fn unfilled_indices(&self) -> Vec<usize> {
        self.envelope_filled
            .iter()
            .enumerate()
            .filter(|(_, filled)| !**filled)
            .map(|(index, _)| index)
            .collect()
    }

    /// Flips envelope `index`.
    pub fn toggle(&mut self, index: usize) -> Result<EnvelopeToggle> {
        let len = self.len();
        let flag = self
            .envelope_filled
            .get_mut(index)
            .ok_or(CoreError::EnvelopeOutOfRange { index, len })?;
        *flag = !*flag;
        Ok(EnvelopeToggle {
            index,
            value: self.envelope_values[index],
            filled: *flag,
        })
    }
}

impl Default for SavingsChallenge {
    fn default() -> Self {
        Self::baseline()
    }
}

fn incremental_values(goal: f64) -> Result<Vec<f64>> {
    let mut values = Vec::new();
    let mut sum = 0.0;
    while sum < goal {
        if values.len() >= MAX_ENVELOPES {
            return Err(CoreError::InvalidInput(format!(
                "a goal of {} needs more than {} envelopes; try the scaled strategy",
                goal, MAX_ENVELOPES
            )));
        }
        let next = (values.len() + 1) as f64;
        sum += next;
        values.push(next);
    }
    Ok(values)
}
