//! Parses inbound text into commands.
//!
//! Anything that does not start with `/` is a free-text reply, which the
//! dispatcher feeds to the user's open dialogue (if any).

use serde::{Deserialize, Serialize};

/// Parses user input into Command values.
pub struct CommandParser;

impl CommandParser {
    pub fn parse(content: &str) -> Command {
        let trimmed = content.trim();
        let Some(body) = trimmed.strip_prefix('/') else {
            return Command::Reply {
                text: trimmed.to_string(),
            };
        };

        let (head, args) = match body.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (body, ""),
        };
        // Telegram appends the bot name in groups: /log_water@my_bot 250
        let name = head.split('@').next().unwrap_or(head).to_lowercase();

        match name.as_str() {
            "start" => Command::Start,
            "help" | "?" => Command::Help,
            "set_profile" | "profile" => Command::SetProfile,
            "cancel" => Command::Cancel,
            "log_water" | "water" => Command::LogWater {
                amount: args.to_string(),
            },
            "log_food" | "food" => Command::LogFood {
                product: args.to_string(),
            },
            "log_workout" | "workout" => Command::LogWorkout {
                args: args.to_string(),
            },
            "check_progress" | "progress" => Command::CheckProgress,
            "show_graphs" | "graphs" => Command::ShowGraphs,
            "recommended_food" => Command::Recommend(RecommendationKind::Food),
            "recommended_snack" => Command::Recommend(RecommendationKind::Snack),
            "recommended_workout" => Command::Recommend(RecommendationKind::Workout),
            _ => Command::Unknown { name },
        }
    }
}

/// Static recommendation lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    Food,
    Snack,
    Workout,
}

/// A parsed inbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Greeting.
    Start,
    Help,
    /// Begin (or restart) the profile dialogue.
    SetProfile,
    /// Abandon the open dialogue.
    Cancel,
    /// `/log_water <ml>`; the amount is validated by the dispatcher.
    LogWater { amount: String },
    /// `/log_food <product name>`.
    LogFood { product: String },
    /// `/log_workout <type> <minutes>`; the type may be several words.
    LogWorkout { args: String },
    CheckProgress,
    ShowGraphs,
    Recommend(RecommendationKind),
    Unknown { name: String },
    /// Free text, routed to the open dialogue.
    Reply { text: String },
}

/// Split `/log_workout` arguments into the workout name and the minutes
/// (last word).
pub fn split_workout_args(args: &str) -> Option<(&str, &str)> {
    let args = args.trim();
    let (name, minutes) = args.rsplit_once(char::is_whitespace)?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some((name, minutes))
}
