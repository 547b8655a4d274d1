//! Profile dialogue state machine.
//!
//! Progresses linearly: Weight → Height → Age → Activity → City.
//! Each state carries exactly the values collected before it, so a field can
//! only be read once it has been supplied.

use serde::Serialize;

use super::model::Profile;
use crate::error::TrackerError;

/// The phases of the profile dialogue, for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfilePhase {
    Weight,
    Height,
    Age,
    Activity,
    City,
}

impl std::fmt::Display for ProfilePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Weight => "weight",
            Self::Height => "height",
            Self::Age => "age",
            Self::Activity => "activity",
            Self::City => "city",
        };
        write!(f, "{s}")
    }
}

/// An open profile dialogue.
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileSession {
    CollectingWeight,
    CollectingHeight {
        weight_kg: f64,
    },
    CollectingAge {
        weight_kg: f64,
        height_cm: f64,
    },
    CollectingActivity {
        weight_kg: f64,
        height_cm: f64,
        age_years: u32,
    },
    CollectingCity {
        weight_kg: f64,
        height_cm: f64,
        age_years: u32,
        activity_minutes: u32,
    },
}

/// Outcome of feeding one reply into the dialogue.
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileStep {
    /// Waiting for the next field.
    Next(ProfileSession),
    /// All five fields collected.
    Complete(Profile),
}

impl Default for ProfileSession {
    fn default() -> Self {
        Self::start()
    }
}

impl ProfileSession {
    pub fn start() -> Self {
        Self::CollectingWeight
    }

    pub fn phase(&self) -> ProfilePhase {
        match self {
            Self::CollectingWeight => ProfilePhase::Weight,
            Self::CollectingHeight { .. } => ProfilePhase::Height,
            Self::CollectingAge { .. } => ProfilePhase::Age,
            Self::CollectingActivity { .. } => ProfilePhase::Activity,
            Self::CollectingCity { .. } => ProfilePhase::City,
        }
    }

    /// Question asked while in this state.
    pub fn prompt(&self) -> &'static str {
        match self {
            Self::CollectingWeight => "Enter your weight (kg):",
            Self::CollectingHeight { .. } => "Enter your height (cm):",
            Self::CollectingAge { .. } => "Enter your age:",
            Self::CollectingActivity { .. } => "How many minutes of activity do you have per day?",
            Self::CollectingCity { .. } => "Which city are you in?",
        }
    }

    /// Feed a free-text reply into the dialogue.
    ///
    /// On a parse failure the error is returned and `self` is unchanged, so
    /// the caller can re-prompt for the same field.
    pub fn advance(&self, reply: &str) -> Result<ProfileStep, TrackerError> {
        let step = match *self {
            Self::CollectingWeight => Self::CollectingHeight {
                weight_kg: parse_positive_number(reply, "your weight as a positive number of kg")?,
            },
            Self::CollectingHeight { weight_kg } => Self::CollectingAge {
                weight_kg,
                height_cm: parse_positive_number(reply, "your height as a positive number of cm")?,
            },
            Self::CollectingAge {
                weight_kg,
                height_cm,
            } => Self::CollectingActivity {
                weight_kg,
                height_cm,
                age_years: parse_positive_integer(reply, "your age as a whole number of years")?,
            },
            Self::CollectingActivity {
                weight_kg,
                height_cm,
                age_years,
            } => Self::CollectingCity {
                weight_kg,
                height_cm,
                age_years,
                activity_minutes: parse_whole_minutes(reply)?,
            },
            Self::CollectingCity {
                weight_kg,
                height_cm,
                age_years,
                activity_minutes,
            } => {
                let city = reply.trim();
                if city.is_empty() {
                    return Err(TrackerError::malformed("the name of your city", reply));
                }
                return Ok(ProfileStep::Complete(Profile {
                    weight_kg,
                    height_cm,
                    age_years,
                    activity_minutes,
                    city: city.to_string(),
                }));
            }
        };
        Ok(ProfileStep::Next(step))
    }
}

fn parse_positive_number(reply: &str, expected: &str) -> Result<f64, TrackerError> {
    reply
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0)
        .ok_or_else(|| TrackerError::malformed(expected, reply))
}

fn parse_positive_integer(reply: &str, expected: &str) -> Result<u32, TrackerError> {
    reply
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|v| *v > 0)
        .ok_or_else(|| TrackerError::malformed(expected, reply))
}

/// Activity minutes; zero is allowed.
pub(crate) fn parse_whole_minutes(reply: &str) -> Result<u32, TrackerError> {
    reply
        .trim()
        .parse::<u32>()
        .map_err(|_| TrackerError::malformed("a whole number of minutes (0 or more)", reply))
}
