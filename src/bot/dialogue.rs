//! Per-user open dialogues.
//!
//! At most one dialogue is open per user. Replies are routed to it; commands
//! that start a new dialogue replace it.

use std::collections::HashMap;

use tokio::sync::Mutex;

use crate::food::FoodLogSession;
use crate::profile::ProfileSession;

#[derive(Debug, Clone, PartialEq)]
pub enum Dialogue {
    Profile(ProfileSession),
    Food(FoodLogSession),
}

impl Dialogue {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Profile(_) => "profile",
            Self::Food(_) => "food",
        }
    }
}

#[derive(Debug, Default)]
pub struct DialogueStore {
    open: Mutex<HashMap<String, Dialogue>>,
}

impl DialogueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a dialogue, returning the one it replaced.
    pub async fn open(&self, user_id: &str, dialogue: Dialogue) -> Option<Dialogue> {
        let replaced = self
            .open
            .lock()
            .await
            .insert(user_id.to_string(), dialogue);
        if let Some(ref old) = replaced {
            tracing::debug!(user_id, dialogue = old.label(), "Open dialogue replaced");
        }
        replaced
    }

    /// Remove and return the user's dialogue.
    pub async fn take(&self, user_id: &str) -> Option<Dialogue> {
        self.open.lock().await.remove(user_id)
    }

    pub async fn get(&self, user_id: &str) -> Option<Dialogue> {
        self.open.lock().await.get(user_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::FoodInfo;

    #[tokio::test]
    async fn one_dialogue_per_user() {
        let store = DialogueStore::new();
        assert!(
            store
                .open("alice", Dialogue::Profile(ProfileSession::start()))
                .await
                .is_none()
        );
        let food = Dialogue::Food(FoodLogSession::new(FoodInfo {
            name: "Rice".into(),
            kcal_per_100g: 130.0,
        }));
        let replaced = store.open("alice", food.clone()).await;
        assert!(matches!(replaced, Some(Dialogue::Profile(_))));
        assert_eq!(store.get("alice").await, Some(food));
        assert!(store.get("bob").await.is_none());
    }

    #[tokio::test]
    async fn take_removes() {
        let store = DialogueStore::new();
        store
            .open("bob", Dialogue::Profile(ProfileSession::start()))
            .await;
        assert!(store.take("bob").await.is_some());
        assert!(store.take("bob").await.is_none());
        assert!(store.get("bob").await.is_none());
    }

    #[test]
    fn labels() {
        assert_eq!(Dialogue::Profile(ProfileSession::start()).label(), "profile");
    }
}
