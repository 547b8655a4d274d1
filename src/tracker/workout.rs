//! Known workout types and their burn rates.

use serde::{Deserialize, Serialize};

use crate::error::TrackerError;

/// Workouts the tracker knows a burn rate for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkoutKind {
    Running,
    Walking,
    Cycling,
    Strength,
    Swimming,
}

impl WorkoutKind {
    pub const ALL: [WorkoutKind; 5] = [
        Self::Running,
        Self::Walking,
        Self::Cycling,
        Self::Strength,
        Self::Swimming,
    ];

    /// Calories burned per minute.
    pub fn kcal_per_minute(&self) -> f64 {
        match self {
            Self::Running => 10.0,
            Self::Walking => 5.0,
            Self::Cycling => 8.0,
            Self::Strength => 5.0,
            Self::Swimming => 7.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Walking => "walking",
            Self::Cycling => "cycling",
            Self::Strength => "strength",
            Self::Swimming => "swimming",
        }
    }

    pub fn known_names() -> Vec<&'static str> {
        Self::ALL.iter().map(WorkoutKind::as_str).collect()
    }
}

impl std::str::FromStr for WorkoutKind {
    type Err = TrackerError;

    /// Case-insensitive; inner whitespace is collapsed so that
    /// `"Strength  Training"` matches.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        match normalized.as_str() {
            "running" | "run" => Ok(Self::Running),
            "walking" | "walk" => Ok(Self::Walking),
            "cycling" | "bike" | "biking" => Ok(Self::Cycling),
            "strength" | "strength training" => Ok(Self::Strength),
            "swimming" | "swim" => Ok(Self::Swimming),
            _ => Err(TrackerError::UnknownActivity {
                name: s.trim().to_string(),
            }),
        }
    }
}

impl std::fmt::Display for WorkoutKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
