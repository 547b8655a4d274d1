//! Bot dispatcher: routes each inbound message to a command handler or to
//! the sender's open dialogue, and runs the main channel loop.

use std::sync::Arc;

use futures::StreamExt;

use super::command::{Command, CommandParser, split_workout_args};
use super::dialogue::{Dialogue, DialogueStore};
use super::recommendations;
use super::reply::{self, Reply};
use crate::channels::{ChannelManager, IncomingMessage, StatusUpdate};
use crate::chart::CumulativeChart;
use crate::config::BotConfig;
use crate::error::{Error, TrackerError};
use crate::food::FoodLogSession;
use crate::lookup::ExternalLookup;
use crate::profile::session::parse_whole_minutes;
use crate::profile::{Profile, ProfileSession, ProfileStep};
use crate::tracker::{Goals, NutritionLedger, SeriesKind, UserRegistry, WorkoutKind};

/// Shared collaborators the bot is built from.
#[derive(Clone)]
pub struct BotDeps {
    pub registry: Arc<UserRegistry>,
    pub lookup: Arc<dyn ExternalLookup>,
}

/// The tracker bot.
pub struct Bot {
    config: BotConfig,
    deps: BotDeps,
    dialogues: DialogueStore,
}

impl Bot {
    pub fn new(config: BotConfig, deps: BotDeps) -> Self {
        Self {
            config,
            deps,
            dialogues: DialogueStore::new(),
        }
    }

    pub fn registry(&self) -> &Arc<UserRegistry> {
        &self.deps.registry
    }

    /// Run the main loop until Ctrl+C or until every channel closes.
    ///
    /// Messages are handled one at a time, so all events for a user are
    /// serialized, lookups included.
    pub async fn run(self, channels: ChannelManager) -> Result<(), Error> {
        let mut message_stream = channels.start_all().await?;

        tracing::info!(
            bot = %self.config.name,
            channels = ?channels.names(),
            "Bot ready and listening"
        );

        loop {
            let message = tokio::select! {
                biased;
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Ctrl+C received, shutting down...");
                    break;
                }
                msg = message_stream.next() => {
                    match msg {
                        Some(m) => m,
                        None => {
                            tracing::info!("All channel streams ended, shutting down...");
                            break;
                        }
                    }
                }
            };

            self.handle_message(&channels, &message).await;
        }

        tracing::info!("Bot shutting down...");
        channels.shutdown_all().await?;
        Ok(())
    }

    async fn handle_message(&self, channels: &ChannelManager, message: &IncomingMessage) {
        let command = CommandParser::parse(&message.content);
        tracing::debug!(
            message_id = %message.id,
            channel = %message.channel,
            user_id = %message.user_id,
            user_name = message.user_name.as_deref().unwrap_or("-"),
            received_at = %message.received_at,
            ?command,
            "Handling message"
        );

        if self.expects_lookup(&message.user_id, &command).await
            && let Err(e) = channels
                .send_status(
                    &message.channel,
                    StatusUpdate::Thinking("Looking that up...".into()),
                    &message.metadata,
                )
                .await
        {
            tracing::debug!(channel = %message.channel, error = %e, "Failed to send status");
        }

        let reply = self.dispatch_command(&message.user_id, command).await;
        if reply.text.is_empty() && reply.charts.is_empty() {
            return;
        }
        if let Err(e) = channels.respond(message, reply.into_response()).await {
            tracing::error!(channel = %message.channel, error = %e, "Failed to send reply");
        }
    }

    /// Whether handling `command` will call an external service.
    async fn expects_lookup(&self, user_id: &str, command: &Command) -> bool {
        match command {
            Command::LogFood { product } => {
                !product.is_empty() && self.deps.registry.contains(user_id).await
            }
            Command::Reply { .. } => matches!(
                self.dialogues.get(user_id).await,
                Some(Dialogue::Profile(ProfileSession::CollectingCity { .. }))
            ),
            _ => false,
        }
    }

    /// Handle one inbound text from `user_id`.
    pub async fn dispatch(&self, user_id: &str, text: &str) -> Reply {
        self.dispatch_command(user_id, CommandParser::parse(text))
            .await
    }

    async fn dispatch_command(&self, user_id: &str, command: Command) -> Reply {
        match command {
            Command::Start => Reply::text(reply::GREETING),
            Command::Help => Reply::text(reply::HELP),
            Command::SetProfile => {
                let session = ProfileSession::start();
                let prompt = session.prompt();
                self.dialogues
                    .open(user_id, Dialogue::Profile(session))
                    .await;
                tracing::info!(user_id, "Profile dialogue started");
                Reply::text(prompt)
            }
            Command::Cancel => match self.dialogues.take(user_id).await {
                Some(dialogue) => {
                    tracing::info!(user_id, dialogue = dialogue.label(), "Dialogue cancelled");
                    Reply::text("Cancelled.")
                }
                None => Reply::text("Nothing to cancel."),
            },
            Command::LogWater { amount } => self.log_water(user_id, &amount).await,
            Command::LogFood { product } => self.start_food_log(user_id, &product).await,
            Command::LogWorkout { args } => self.log_workout(user_id, &args).await,
            Command::CheckProgress => match self.deps.registry.snapshot(user_id).await {
                Ok(ledger) => Reply::text(reply::progress(&ledger.progress_snapshot())),
                Err(e) => Reply::text(e.user_message()),
            },
            Command::ShowGraphs => self.show_graphs(user_id).await,
            Command::Recommend(kind) => Reply::text(recommendations::render(kind)),
            Command::Unknown { name } => Reply::text(format!(
                "Unknown command /{name}. Send /help for the list of commands."
            )),
            Command::Reply { text } => self.continue_dialogue(user_id, &text).await,
        }
    }

    async fn log_water(&self, user_id: &str, amount: &str) -> Reply {
        let result = self
            .deps
            .registry
            .update(user_id, |ledger| {
                let amount_ml = amount
                    .parse::<f64>()
                    .map_err(|_| TrackerError::malformed("a positive amount of water in ml", amount))?;
                ledger.log_water(amount_ml)?;
                Ok((amount_ml, ledger.progress_snapshot().remaining_water_ml))
            })
            .await;

        match result {
            Ok((amount_ml, remaining)) => {
                tracing::info!(user_id, amount_ml, "Water logged");
                Reply::text(reply::water_logged(amount_ml, remaining))
            }
            Err(TrackerError::MalformedInput { .. }) => Reply::text("Usage: /log_water <ml>"),
            Err(e) => Reply::text(e.user_message()),
        }
    }

    async fn log_workout(&self, user_id: &str, args: &str) -> Reply {
        let result = self
            .deps
            .registry
            .update(user_id, |ledger| {
                let (name, minutes) = split_workout_args(args)
                    .ok_or_else(|| TrackerError::malformed("a workout type and minutes", args))?;
                let kind: WorkoutKind = name.parse()?;
                let minutes = parse_whole_minutes(minutes)?;
                Ok(ledger.log_workout(kind, minutes))
            })
            .await;

        match result {
            Ok(outcome) => {
                tracing::info!(
                    user_id,
                    kind = %outcome.kind,
                    minutes = outcome.minutes,
                    "Workout logged"
                );
                Reply::text(reply::workout_logged(&outcome))
            }
            Err(TrackerError::MalformedInput { .. }) => {
                Reply::text("Usage: /log_workout <type> <minutes>")
            }
            Err(e) => Reply::text(e.user_message()),
        }
    }

    /// Look the product up and open a food dialogue awaiting grams.
    ///
    /// On failure any dialogue the user already had stays open.
    async fn start_food_log(&self, user_id: &str, product: &str) -> Reply {
        if !self.deps.registry.contains(user_id).await {
            return Reply::text(
                TrackerError::NoProfile {
                    user_id: user_id.to_string(),
                }
                .user_message(),
            );
        }
        if product.is_empty() {
            return Reply::text("Usage: /log_food <product name>");
        }

        match self.deps.lookup.food_info(product).await {
            Ok(info) => {
                let session = FoodLogSession::new(info);
                let prompt = session.prompt();
                self.dialogues.open(user_id, Dialogue::Food(session)).await;
                Reply::text(prompt)
            }
            Err(e) => {
                tracing::warn!(user_id, product, error = %e, "Food lookup failed");
                Reply::text(TrackerError::from(e).user_message())
            }
        }
    }

    async fn show_graphs(&self, user_id: &str) -> Reply {
        let ledger = match self.deps.registry.snapshot(user_id).await {
            Ok(ledger) => ledger,
            Err(e) => return Reply::text(e.user_message()),
        };

        let charts: Vec<CumulativeChart> = [SeriesKind::Water, SeriesKind::Calories]
            .into_iter()
            .map(|kind| CumulativeChart::new(kind, ledger.cumulative_series(kind)))
            .filter(|chart| !chart.values.is_empty())
            .collect();

        if charts.is_empty() {
            return Reply::text("Nothing to plot yet. Log some water or food first.");
        }
        Reply::text("Your progress so far:").with_charts(charts)
    }

    async fn continue_dialogue(&self, user_id: &str, text: &str) -> Reply {
        match self.dialogues.take(user_id).await {
            None => Reply::text("Send /help to see what I can do."),
            Some(Dialogue::Profile(session)) => self.advance_profile(user_id, session, text).await,
            Some(Dialogue::Food(session)) => self.submit_food(user_id, session, text).await,
        }
    }

    async fn advance_profile(&self, user_id: &str, session: ProfileSession, text: &str) -> Reply {
        match session.advance(text) {
            Ok(ProfileStep::Next(next)) => {
                tracing::debug!(user_id, phase = %next.phase(), "Profile dialogue advanced");
                let prompt = next.prompt();
                self.dialogues.open(user_id, Dialogue::Profile(next)).await;
                Reply::text(prompt)
            }
            Ok(ProfileStep::Complete(profile)) => self.complete_profile(user_id, profile).await,
            Err(e) => {
                self.dialogues
                    .open(user_id, Dialogue::Profile(session))
                    .await;
                Reply::text(e.user_message())
            }
        }
    }

    /// Fetch the temperature and install a fresh ledger. A failed lookup
    /// ends the dialogue without touching the registry.
    async fn complete_profile(&self, user_id: &str, profile: Profile) -> Reply {
        let temperature_c = match self.deps.lookup.temperature(&profile.city).await {
            Ok(t) => t,
            Err(e) => {
                tracing::warn!(user_id, city = %profile.city, error = %e, "Temperature lookup failed");
                return Reply::text(TrackerError::from(e).user_message());
            }
        };

        let goals = Goals::compute(&profile, temperature_c);
        let text = reply::profile_created(&goals, &profile.city, temperature_c);
        tracing::info!(
            user_id,
            profile = %profile.summary(),
            water_goal_ml = goals.water_ml,
            calorie_goal_kcal = goals.calories_kcal,
            "Profile completed"
        );
        self.deps
            .registry
            .install(user_id, NutritionLedger::new(profile, goals))
            .await;
        Reply::text(text)
    }

    async fn submit_food(&self, user_id: &str, session: FoodLogSession, text: &str) -> Reply {
        let grams = match FoodLogSession::parse_grams(text) {
            Ok(grams) => grams,
            Err(e) => {
                self.dialogues.open(user_id, Dialogue::Food(session)).await;
                return Reply::text(e.user_message());
            }
        };

        match self
            .deps
            .registry
            .update(user_id, |ledger| session.submit(grams, ledger))
            .await
        {
            Ok(entry) => {
                tracing::info!(
                    user_id,
                    product = %entry.product,
                    grams = entry.grams,
                    kcal = entry.kcal,
                    factor = entry.hydration_factor,
                    "Food logged"
                );
                Reply::text(reply::food_logged(&entry))
            }
            Err(e) => Reply::text(e.user_message()),
        }
    }
}
