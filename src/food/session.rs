//! Food-logging dialogue.
//!
//! Created only after a successful product lookup, so the single open state
//! is "awaiting grams". Submitting grams appends a calorie event to the
//! user's ledger using the ledger's hydration at submission time.

use crate::error::TrackerError;
use crate::lookup::FoodInfo;
use crate::tracker::ledger::{FoodEntry, NutritionLedger};

#[derive(Debug, Clone, PartialEq)]
pub struct FoodLogSession {
    product: FoodInfo,
}

impl FoodLogSession {
    pub fn new(product: FoodInfo) -> Self {
        Self { product }
    }

    pub fn prompt(&self) -> String {
        format!(
            "{}: {} kcal per 100 g.\nHow many grams did you eat?",
            self.product.name, self.product.kcal_per_100g
        )
    }

    /// Parse the grams reply without touching any ledger.
    pub fn parse_grams(reply: &str) -> Result<f64, TrackerError> {
        reply
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|g| g.is_finite() && *g > 0.0)
            .ok_or_else(|| TrackerError::malformed("a positive number of grams", reply))
    }

    /// Complete the dialogue against the user's ledger.
    pub fn submit(
        &self,
        grams: f64,
        ledger: &mut NutritionLedger,
    ) -> Result<FoodEntry, TrackerError> {
        ledger.log_food(&self.product.name, self.product.kcal_per_100g, grams)
    }
}
