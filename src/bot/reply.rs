//! Bot replies and the fixed texts they are built from.

use crate::channels::OutgoingResponse;
use crate::chart::CumulativeChart;
use crate::tracker::{FoodEntry, Goals, ProgressSnapshot, WorkoutOutcome};

pub const GREETING: &str = "Hi!\n\
I help you lose weight by tracking water, calories and workouts.\n\
Start with /set_profile";

pub const HELP: &str = "Commands:\n\
/set_profile - set up your profile and daily goals\n\
/log_water <ml> - log a drink\n\
/log_food <product> - log food (you will be asked for grams)\n\
/log_workout <type> <minutes> - log a workout\n\
/check_progress - today's water and calories\n\
/show_graphs - cumulative water and calorie charts\n\
/recommended_food, /recommended_snack, /recommended_workout\n\
/cancel - abandon the current question";

/// Response to one inbound message: text plus any charts to render.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reply {
    pub text: String,
    pub charts: Vec<CumulativeChart>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            charts: Vec::new(),
        }
    }

    pub fn with_charts(mut self, charts: Vec<CumulativeChart>) -> Self {
        self.charts = charts;
        self
    }

    pub fn into_response(self) -> OutgoingResponse {
        self.charts
            .iter()
            .fold(OutgoingResponse::text(self.text), |response, chart| {
                response.with_attachment(chart.to_attachment())
            })
    }
}

pub fn profile_created(goals: &Goals, city: &str, temperature_c: f64) -> String {
    format!(
        "Profile created!\nCurrently {temperature_c:.1} °C in {city}.\n\
         Water goal: {} ml\nCalorie goal: {} kcal",
        goals.water_ml.round() as i64,
        goals.calories_kcal.round() as i64,
    )
}

pub fn water_logged(amount_ml: f64, remaining_ml: i64) -> String {
    format!("You drank {amount_ml} ml of water. Remaining: {remaining_ml} ml")
}

pub fn workout_logged(outcome: &WorkoutOutcome) -> String {
    format!(
        "{} {} min: {} kcal burned. Extra water: {} ml",
        outcome.kind, outcome.minutes, outcome.burned_kcal, outcome.extra_water_ml
    )
}

pub fn food_logged(entry: &FoodEntry) -> String {
    format!("Recorded: {} kcal", entry.kcal)
}

pub fn progress(snapshot: &ProgressSnapshot) -> String {
    format!(
        "📊 Progress:\n\
         Water:\n\
         - Drunk: {} ml of {} ml.\n\
         - Remaining: {} ml.\n\n\
         Calories:\n\
         - Consumed: {} kcal of {} kcal.\n\
         - Burned: {} kcal.\n\
         - Balance: {} kcal.",
        snapshot.logged_water_ml,
        snapshot.water_goal_ml,
        snapshot.remaining_water_ml,
        snapshot.logged_calories_kcal,
        snapshot.calorie_goal_kcal,
        snapshot.burned_calories_kcal,
        snapshot.balance_kcal,
    )
}
