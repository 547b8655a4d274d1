//! Conversation layer: command parsing, open dialogues and the dispatcher
//! that ties them to the tracker.

pub mod command;
pub mod dialogue;
pub mod dispatcher;
pub mod recommendations;
pub mod reply;

pub use command::{Command, CommandParser, RecommendationKind};
pub use dialogue::{Dialogue, DialogueStore};
pub use dispatcher::{Bot, BotDeps};
pub use reply::Reply;
