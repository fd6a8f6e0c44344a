use serde::{Deserialize, Serialize};

use crate::core::services::WageModel;

/// Salary and monthly working hours; the hourly rate is always derived.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "ProfileRecord")]
pub struct Profile {
    salary: f64,
    #[serde(rename = "hours")]
    hours_per_month: f64,
    hourly_rate: f64,
}

impl Profile {
    pub fn new(salary: f64, hours_per_month: f64) -> Self {
        let salary = finite_or_zero(salary);
        let hours_per_month = finite_or_zero(hours_per_month);
        Self {
            salary,
            hours_per_month,
            hourly_rate: WageModel::hourly_rate(salary, hours_per_month),
        }
    }

    pub fn salary(&self) -> f64 {
        self.salary
    }

    pub fn hours_per_month(&self) -> f64 {
        self.hours_per_month
    }

    pub fn hourly_rate(&self) -> f64 {
        self.hourly_rate
    }

    /// True once a usable wage has been entered.
    pub fn is_configured(&self) -> bool {
        self.hourly_rate > 0.0
    }

    /// Work hours needed to pay `price` at this profile's rate.
    pub fn time_cost(&self, price: f64) -> f64 {
        WageModel::time_cost(price, self.hourly_rate)
    }
}

// The stored rate is ignored on load and recomputed from salary and hours.
#[derive(Deserialize)]
struct ProfileRecord {
    #[serde(default)]
    salary: f64,
    #[serde(default)]
    hours: f64,
}

impl From<ProfileRecord> for Profile {
    fn from(record: ProfileRecord) -> Self {
        Profile::new(record.salary, record.hours)
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
