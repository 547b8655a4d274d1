//! Per-user nutrition ledger: goals, running totals and ordered event logs.

use serde::Serialize;

use super::goals::Goals;
use super::workout::WorkoutKind;
use crate::error::TrackerError;
use crate::profile::Profile;

/// Lower bound of the hydration adjustment applied to food entries.
pub const MIN_HYDRATION_FACTOR: f64 = 0.5;
/// Hydration credit per complete 30 minutes of workout.
const WORKOUT_WATER_PER_BLOCK_ML: f64 = 200.0;
const WORKOUT_BLOCK_MINUTES: u32 = 30;

/// Which event log a cumulative series is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesKind {
    Water,
    Calories,
}

impl SeriesKind {
    pub fn unit(&self) -> &'static str {
        match self {
            Self::Water => "ml",
            Self::Calories => "kcal",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Water => "Cumulative water intake",
            Self::Calories => "Cumulative calories",
        }
    }
}

/// Result of a logged workout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WorkoutOutcome {
    pub kind: WorkoutKind,
    pub minutes: u32,
    pub burned_kcal: f64,
    pub extra_water_ml: f64,
}

/// Result of a completed food-logging dialogue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoodEntry {
    pub product: String,
    pub grams: f64,
    pub raw_kcal: f64,
    pub hydration_factor: f64,
    /// Adjusted value, rounded to one decimal. This is what the ledger stores.
    pub kcal: f64,
}

/// Rounded view of a ledger for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressSnapshot {
    pub logged_water_ml: i64,
    pub water_goal_ml: i64,
    pub remaining_water_ml: i64,
    pub logged_calories_kcal: i64,
    pub calorie_goal_kcal: i64,
    pub burned_calories_kcal: i64,
    pub balance_kcal: i64,
}

/// Goals and running totals for one user.
///
/// Created when a profile is completed and replaced wholesale when the user
/// sets up a new profile. Event logs are append-only.
#[derive(Debug, Clone)]
pub struct NutritionLedger {
    profile: Profile,
    goals: Goals,
    logged_water_ml: f64,
    logged_calories_kcal: f64,
    burned_calories_kcal: f64,
    /// Drink amounts in ml, in logging order.
    water_events: Vec<f64>,
    /// Adjusted food entries in kcal, in logging order.
    calorie_events: Vec<f64>,
}

impl NutritionLedger {
    /// Fresh ledger: zero totals, empty logs.
    pub fn new(profile: Profile, goals: Goals) -> Self {
        Self {
            profile,
            goals,
            logged_water_ml: 0.0,
            logged_calories_kcal: 0.0,
            burned_calories_kcal: 0.0,
            water_events: Vec::new(),
            calorie_events: Vec::new(),
        }
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn goals(&self) -> Goals {
        self.goals
    }

    pub fn logged_water_ml(&self) -> f64 {
        self.logged_water_ml
    }

    pub fn logged_calories_kcal(&self) -> f64 {
        self.logged_calories_kcal
    }

    pub fn burned_calories_kcal(&self) -> f64 {
        self.burned_calories_kcal
    }

    pub fn water_events(&self) -> &[f64] {
        &self.water_events
    }

    pub fn calorie_events(&self) -> &[f64] {
        &self.calorie_events
    }

    /// Record a drink. The amount must be a positive, finite number of ml.
    pub fn log_water(&mut self, amount_ml: f64) -> Result<(), TrackerError> {
        if !(amount_ml.is_finite() && amount_ml > 0.0) {
            return Err(TrackerError::malformed(
                "a positive amount of water in ml",
                amount_ml.to_string(),
            ));
        }
        self.water_events.push(amount_ml);
        self.logged_water_ml += amount_ml;
        Ok(())
    }

    /// Record a workout. Besides the burned calories, every complete
    /// 30 minutes credits 200 ml to the logged water total. The credit is not
    /// a water event and does not show up in the water series.
    pub fn log_workout(&mut self, kind: WorkoutKind, minutes: u32) -> WorkoutOutcome {
        let burned_kcal = kind.kcal_per_minute() * f64::from(minutes);
        let extra_water_ml =
            f64::from(minutes / WORKOUT_BLOCK_MINUTES) * WORKOUT_WATER_PER_BLOCK_ML;

        self.burned_calories_kcal += burned_kcal;
        self.logged_water_ml += extra_water_ml;

        WorkoutOutcome {
            kind,
            minutes,
            burned_kcal,
            extra_water_ml,
        }
    }

    /// `max(0.5, 1 - logged_water / water_goal)` for the current totals.
    ///
    /// Intentional heuristic: the better hydrated the user is, the fewer
    /// calories a food entry counts for. It is not a nutritional fact.
    pub fn hydration_factor(&self) -> f64 {
        (1.0 - self.logged_water_ml / self.goals.water_ml).max(MIN_HYDRATION_FACTOR)
    }

    /// Append a food entry, adjusted by the hydration factor at this moment.
    pub fn log_food(
        &mut self,
        product: &str,
        kcal_per_100g: f64,
        grams: f64,
    ) -> Result<FoodEntry, TrackerError> {
        if !(grams.is_finite() && grams > 0.0) {
            return Err(TrackerError::malformed(
                "a positive number of grams",
                grams.to_string(),
            ));
        }

        let raw_kcal = grams * kcal_per_100g / 100.0;
        let hydration_factor = self.hydration_factor();
        let kcal = round_to_tenth(raw_kcal * hydration_factor);

        self.calorie_events.push(kcal);
        self.logged_calories_kcal += kcal;

        Ok(FoodEntry {
            product: product.to_string(),
            grams,
            raw_kcal,
            hydration_factor,
            kcal,
        })
    }

    pub fn progress_snapshot(&self) -> ProgressSnapshot {
        let logged_water_ml = self.logged_water_ml.round() as i64;
        let water_goal_ml = self.goals.water_ml.round() as i64;
        let logged_calories_kcal = self.logged_calories_kcal.round() as i64;
        let burned_calories_kcal = self.burned_calories_kcal.round() as i64;

        ProgressSnapshot {
            logged_water_ml,
            water_goal_ml,
            remaining_water_ml: (water_goal_ml - logged_water_ml).max(0),
            logged_calories_kcal,
            calorie_goal_kcal: self.goals.calories_kcal.round() as i64,
            burned_calories_kcal,
            balance_kcal: logged_calories_kcal - burned_calories_kcal,
        }
    }

    /// Running totals over one event log, in insertion order.
    pub fn cumulative_series(&self, kind: SeriesKind) -> Vec<f64> {
        let events = match kind {
            SeriesKind::Water => &self.water_events,
            SeriesKind::Calories => &self.calorie_events,
        };
        events
            .iter()
            .scan(0.0, |total, amount| {
                *total += amount;
                Some(*total)
            })
            .collect()
    }
}

fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger_with_goals(water_ml: f64, calories_kcal: f64) -> NutritionLedger {
        let profile = Profile {
            weight_kg: 70.0,
            height_cm: 175.0,
            age_years: 30,
            activity_minutes: 45,
            city: "Berlin".into(),
        };
        NutritionLedger::new(
            profile,
            Goals {
                water_ml,
                calories_kcal,
            },
        )
    }

    #[test]
    fn new_ledger_is_empty() {
        let ledger = ledger_with_goals(2000.0, 2000.0);
        assert_eq!(ledger.logged_water_ml(), 0.0);
        assert_eq!(ledger.logged_calories_kcal(), 0.0);
        assert_eq!(ledger.burned_calories_kcal(), 0.0);
        assert!(ledger.water_events().is_empty());
        assert!(ledger.calorie_events().is_empty());
        assert!(ledger.cumulative_series(SeriesKind::Water).is_empty());
    }

    #[test]
    fn water_logging_is_additive() {
        let mut ledger = ledger_with_goals(2000.0, 2000.0);
        for amount in [250.0, 500.0, 120.5] {
            ledger.log_water(amount).unwrap();
        }
        assert_eq!(ledger.logged_water_ml(), 870.5);
        assert_eq!(ledger.water_events().len(), 3);
        let sum: f64 = ledger.water_events().iter().sum();
        assert_eq!(sum, ledger.logged_water_ml());
    }

    #[test]
    fn water_rejects_non_positive_amounts() {
        let mut ledger = ledger_with_goals(2000.0, 2000.0);
        assert!(ledger.log_water(0.0).is_err());
        assert!(ledger.log_water(-100.0).is_err());
        assert!(ledger.log_water(f64::NAN).is_err());
        assert!(ledger.water_events().is_empty());
        assert_eq!(ledger.logged_water_ml(), 0.0);
    }

    #[test]
    fn workout_burns_and_credits_water() {
        let mut ledger = ledger_with_goals(2000.0, 2000.0);
        let outcome = ledger.log_workout(WorkoutKind::Running, 45);
        assert_eq!(outcome.burned_kcal, 450.0);
        assert_eq!(outcome.extra_water_ml, 200.0);
        assert_eq!(ledger.burned_calories_kcal(), 450.0);
        assert_eq!(ledger.logged_water_ml(), 200.0);
        // The credit is not a drink.
        assert!(ledger.water_events().is_empty());
    }

    #[test]
    fn short_workout_earns_no_water_credit() {
        let mut ledger = ledger_with_goals(2000.0, 2000.0);
        let outcome = ledger.log_workout(WorkoutKind::Swimming, 29);
        assert_eq!(outcome.burned_kcal, 203.0);
        assert_eq!(outcome.extra_water_ml, 0.0);

        let outcome = ledger.log_workout(WorkoutKind::Walking, 0);
        assert_eq!(outcome.burned_kcal, 0.0);
        assert_eq!(ledger.burned_calories_kcal(), 203.0);
    }

    #[test]
    fn hydration_factor_is_floored_and_non_increasing() {
        let mut ledger = ledger_with_goals(2000.0, 2000.0);
        let mut previous = ledger.hydration_factor();
        assert_eq!(previous, 1.0);
        for _ in 0..10 {
            ledger.log_water(300.0).unwrap();
            let factor = ledger.hydration_factor();
            assert!(factor <= previous);
            assert!(factor >= MIN_HYDRATION_FACTOR);
            previous = factor;
        }
        assert!(ledger.logged_water_ml() >= 2000.0);
        assert_eq!(ledger.hydration_factor(), 0.5);
    }

    #[test]
    fn hydration_factor_at_exact_goal() {
        let mut ledger = ledger_with_goals(2000.0, 2000.0);
        ledger.log_water(2000.0).unwrap();
        assert_eq!(ledger.hydration_factor(), 0.5);
    }

    #[test]
    fn food_entry_uses_current_hydration() {
        let mut ledger = ledger_with_goals(2000.0, 2000.0);
        ledger.log_water(500.0).unwrap();
        // raw 150 kcal, factor 0.75
        let entry = ledger.log_food("Oatmeal", 375.0, 40.0).unwrap();
        assert_eq!(entry.raw_kcal, 150.0);
        assert_eq!(entry.hydration_factor, 0.75);
        assert_eq!(entry.kcal, 112.5);
        assert_eq!(ledger.logged_calories_kcal(), 112.5);
        assert_eq!(ledger.calorie_events().len(), 1);
    }

    #[test]
    fn food_entry_is_rounded_to_one_decimal() {
        let mut ledger = ledger_with_goals(3000.0, 2000.0);
        ledger.log_water(1000.0).unwrap();
        // 33 g at 52 kcal/100g = 17.16 raw, factor 2/3 -> 11.44 -> 11.4
        let entry = ledger.log_food("Apple", 52.0, 33.0).unwrap();
        assert_eq!(entry.kcal, 11.4);
    }

    #[test]
    fn food_rejects_bad_grams_without_mutation() {
        let mut ledger = ledger_with_goals(2000.0, 2000.0);
        assert!(ledger.log_food("Apple", 52.0, 0.0).is_err());
        assert!(ledger.log_food("Apple", 52.0, -5.0).is_err());
        assert!(ledger.calorie_events().is_empty());
        assert_eq!(ledger.logged_calories_kcal(), 0.0);
    }

    #[test]
    fn snapshot_clamps_remaining_water() {
        let mut ledger = ledger_with_goals(1500.0, 2000.0);
        ledger.log_water(1000.0).unwrap();
        assert_eq!(ledger.progress_snapshot().remaining_water_ml, 500);
        ledger.log_water(1000.0).unwrap();
        let snapshot = ledger.progress_snapshot();
        assert_eq!(snapshot.logged_water_ml, 2000);
        assert_eq!(snapshot.remaining_water_ml, 0);
    }

    #[test]
    fn snapshot_rounds_and_balances() {
        let mut ledger = ledger_with_goals(3100.0, 2043.75);
        ledger.log_food("Bread", 250.0, 100.0).unwrap();
        ledger.log_workout(WorkoutKind::Cycling, 10);
        let snapshot = ledger.progress_snapshot();
        assert_eq!(snapshot.calorie_goal_kcal, 2044);
        assert_eq!(snapshot.logged_calories_kcal, 250);
        assert_eq!(snapshot.burned_calories_kcal, 80);
        assert_eq!(snapshot.balance_kcal, 170);
    }

    #[test]
    fn snapshot_does_not_mutate() {
        let mut ledger = ledger_with_goals(2000.0, 2000.0);
        ledger.log_water(300.0).unwrap();
        let first = ledger.progress_snapshot();
        let second = ledger.progress_snapshot();
        assert_eq!(first, second);
        assert_eq!(ledger.water_events().len(), 1);
    }

    #[test]
    fn cumulative_series_is_a_prefix_sum() {
        let mut ledger = ledger_with_goals(2000.0, 2000.0);
        for amount in [200.0, 300.0, 250.0] {
            ledger.log_water(amount).unwrap();
        }
        assert_eq!(
            ledger.cumulative_series(SeriesKind::Water),
            vec![200.0, 500.0, 750.0]
        );
    }

    #[test]
    fn cumulative_series_is_not_aliased() {
        let mut ledger = ledger_with_goals(2000.0, 2000.0);
        ledger.log_water(100.0).unwrap();
        let before = ledger.cumulative_series(SeriesKind::Water);
        ledger.log_water(400.0).unwrap();
        assert_eq!(before, vec![100.0]);
        assert_eq!(ledger.cumulative_series(SeriesKind::Water), vec![100.0, 500.0]);
    }

    #[test]
    fn calorie_series_tracks_food_only() {
        let mut ledger = ledger_with_goals(2000.0, 2000.0);
        ledger.log_food("Rice", 130.0, 200.0).unwrap();
        ledger.log_workout(WorkoutKind::Running, 60);
        ledger.log_food("Egg", 155.0, 50.0).unwrap();
        // Second entry is adjusted by the workout water credit (400 / 2000).
        assert_eq!(
            ledger.cumulative_series(SeriesKind::Calories),
            vec![260.0, 260.0 + 62.0]
        );
    }
}
