//! Tracker core: goal computation, per-user ledgers and the registry that
//! owns them.

pub mod goals;
pub mod ledger;
pub mod registry;
pub mod workout;

pub use goals::{Goals, compute_calorie_goal, compute_water_goal};
pub use ledger::{FoodEntry, NutritionLedger, ProgressSnapshot, SeriesKind, WorkoutOutcome};
pub use registry::UserRegistry;
pub use workout::WorkoutKind;
