//! Completed user profile.

use serde::{Deserialize, Serialize};

/// Physiological profile the goals are derived from.
///
/// Only ever built with all five fields present; partially collected values
/// live inside a `ProfileSession`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub weight_kg: f64,
    pub height_cm: f64,
    pub age_years: u32,
    /// Typical daily activity in minutes.
    pub activity_minutes: u32,
    pub city: String,
}

impl Profile {
    /// One-line summary for confirmations and logs.
    pub fn summary(&self) -> String {
        format!(
            "{} kg, {} cm, {} y, {} min/day activity, {}",
            self.weight_kg, self.height_cm, self.age_years, self.activity_minutes, self.city
        )
    }
}
