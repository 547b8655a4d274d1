//! Static recommendation lists.

use super::command::RecommendationKind;

pub const RECOMMENDED_FOODS: &[&str] = &[
    "Chicken breast",
    "Low-fat cottage cheese",
    "Vegetables",
    "Apples",
    "Oatmeal",
];

pub const RECOMMENDED_SNACKS: &[&str] = &["Carrots", "An apple", "Yogurt", "A protein bar"];

pub const RECOMMENDED_WORKOUTS: &[&str] = &[
    "Cardio, 30 minutes",
    "Intervals, 20 minutes",
    "Walking, 40 minutes",
    "Strength training, 30 minutes",
];

pub fn items(kind: RecommendationKind) -> &'static [&'static str] {
    match kind {
        RecommendationKind::Food => RECOMMENDED_FOODS,
        RecommendationKind::Snack => RECOMMENDED_SNACKS,
        RecommendationKind::Workout => RECOMMENDED_WORKOUTS,
    }
}

pub fn render(kind: RecommendationKind) -> String {
    let heading = match kind {
        RecommendationKind::Food => "Recommended foods:",
        RecommendationKind::Snack => "Recommended snacks:",
        RecommendationKind::Workout => "Recommended workouts:",
    };
    let mut text = heading.to_string();
    for item in items(kind) {
        text.push_str("\n- ");
        text.push_str(item);
    }
    text
}
