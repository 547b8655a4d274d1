//! Daily water and calorie targets.

use serde::{Deserialize, Serialize};

use crate::profile::Profile;

/// Water added per complete block of activity.
const WATER_PER_ACTIVITY_BLOCK_ML: f64 = 500.0;
/// Calories added per complete block of activity.
const CALORIES_PER_ACTIVITY_BLOCK_KCAL: f64 = 200.0;
/// Length of one activity block in minutes.
const ACTIVITY_BLOCK_MINUTES: u32 = 30;
/// Temperatures strictly above this earn the hot-weather bonus.
const HOT_WEATHER_THRESHOLD_C: f64 = 25.0;
const HOT_WEATHER_BONUS_ML: f64 = 500.0;

/// Daily targets, fixed when a profile is completed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Goals {
    pub water_ml: f64,
    pub calories_kcal: f64,
}

impl Goals {
    /// Derive both goals from a completed profile and the current temperature.
    pub fn compute(profile: &Profile, temperature_c: f64) -> Self {
        Self {
            water_ml: compute_water_goal(
                profile.weight_kg,
                profile.activity_minutes,
                temperature_c,
            ),
            calories_kcal: compute_calorie_goal(
                profile.weight_kg,
                profile.height_cm,
                profile.age_years,
                profile.activity_minutes,
            ),
        }
    }
}

fn activity_blocks(activity_minutes: u32) -> f64 {
    f64::from(activity_minutes / ACTIVITY_BLOCK_MINUTES)
}

/// `30 ml/kg`, plus 500 ml per full 30 minutes of activity, plus 500 ml when
/// it is hotter than 25 °C.
pub fn compute_water_goal(weight_kg: f64, activity_minutes: u32, temperature_c: f64) -> f64 {
    let mut water = weight_kg * 30.0;
    water += activity_blocks(activity_minutes) * WATER_PER_ACTIVITY_BLOCK_ML;
    if temperature_c > HOT_WEATHER_THRESHOLD_C {
        water += HOT_WEATHER_BONUS_ML;
    }
    water
}

/// Mifflin-St Jeor style estimate without the sex term, plus 200 kcal per
/// full 30 minutes of activity.
pub fn compute_calorie_goal(
    weight_kg: f64,
    height_cm: f64,
    age_years: u32,
    activity_minutes: u32,
) -> f64 {
    let base = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * f64::from(age_years);
    base + activity_blocks(activity_minutes) * CALORIES_PER_ACTIVITY_BLOCK_KCAL
}
