//! User registry: the process-wide map of user id to ledger.
//!
//! Handed around as `Arc<UserRegistry>`; nothing reaches it implicitly.
//! Entries are created when a profile is completed, overwritten by a new
//! profile, and live until the process exits.

use std::collections::HashMap;

use tokio::sync::RwLock;
use tracing::info;

use super::ledger::NutritionLedger;
use crate::error::TrackerError;

#[derive(Debug, Default)]
pub struct UserRegistry {
    ledgers: RwLock<HashMap<String, NutritionLedger>>,
}

impl UserRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-filled with ledgers, for tests and tooling.
    pub fn with_ledgers<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, NutritionLedger)>,
        K: Into<String>,
    {
        let ledgers = entries.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Self {
            ledgers: RwLock::new(ledgers),
        }
    }

    /// Install a ledger for a user, replacing (and discarding) any prior one.
    pub async fn install(&self, user_id: &str, ledger: NutritionLedger) {
        let replaced = self
            .ledgers
            .write()
            .await
            .insert(user_id.to_string(), ledger)
            .is_some();
        info!(user_id, replaced, "Ledger installed");
    }

    pub async fn contains(&self, user_id: &str) -> bool {
        self.ledgers.read().await.contains_key(user_id)
    }

    /// Clone of the user's current ledger.
    pub async fn snapshot(&self, user_id: &str) -> Result<NutritionLedger, TrackerError> {
        self.ledgers
            .read()
            .await
            .get(user_id)
            .cloned()
            .ok_or_else(|| no_profile(user_id))
    }

    /// Run `f` against the user's ledger under the write lock.
    pub async fn update<R>(
        &self,
        user_id: &str,
        f: impl FnOnce(&mut NutritionLedger) -> Result<R, TrackerError>,
    ) -> Result<R, TrackerError> {
        let mut ledgers = self.ledgers.write().await;
        let ledger = ledgers.get_mut(user_id).ok_or_else(|| no_profile(user_id))?;
        f(ledger)
    }

    pub async fn len(&self) -> usize {
        self.ledgers.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.ledgers.read().await.is_empty()
    }
}

fn no_profile(user_id: &str) -> TrackerError {
    TrackerError::NoProfile {
        user_id: user_id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::profile::Profile;
    use crate::tracker::goals::Goals;
    use crate::tracker::ledger::SeriesKind;
    use crate::tracker::workout::WorkoutKind;

    fn ledger() -> NutritionLedger {
        let profile = Profile {
            weight_kg: 60.0,
            height_cm: 165.0,
            age_years: 28,
            activity_minutes: 30,
            city: "Lisbon".into(),
        };
        let goals = Goals::compute(&profile, 20.0);
        NutritionLedger::new(profile, goals)
    }

    #[tokio::test]
    async fn starts_empty() {
        let registry = UserRegistry::new();
        assert!(registry.is_empty().await);
        assert!(!registry.contains("alice").await);
    }

    #[tokio::test]
    async fn missing_user_is_no_profile() {
        let registry = UserRegistry::new();
        let err = registry
            .update("ghost", |l| l.log_water(100.0))
            .await
            .unwrap_err();
        assert!(matches!(err, TrackerError::NoProfile { ref user_id } if user_id == "ghost"));
        assert!(registry.snapshot("ghost").await.is_err());
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn reinstall_discards_history() {
        let registry = UserRegistry::with_ledgers([("alice", ledger())]);
        registry
            .update("alice", |l| {
                l.log_water(500.0)?;
                l.log_food("Toast", 260.0, 50.0)?;
                l.log_workout(WorkoutKind::Running, 30);
                Ok(())
            })
            .await
            .unwrap();

        registry.install("alice", ledger()).await;

        let fresh = registry.snapshot("alice").await.unwrap();
        assert_eq!(fresh.logged_water_ml(), 0.0);
        assert_eq!(fresh.logged_calories_kcal(), 0.0);
        assert_eq!(fresh.burned_calories_kcal(), 0.0);
        assert!(fresh.cumulative_series(SeriesKind::Water).is_empty());
        assert!(fresh.cumulative_series(SeriesKind::Calories).is_empty());
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn users_do_not_interfere() {
        let registry = Arc::new(UserRegistry::with_ledgers([
            ("alice", ledger()),
            ("bob", ledger()),
        ]));

        let mut handles = Vec::new();
        for (user, amount) in [("alice", 100.0), ("bob", 250.0)] {
            let registry = Arc::clone(&registry);
            handles.push(tokio::spawn(async move {
                for _ in 0..20 {
                    registry
                        .update(user, |l| l.log_water(amount))
                        .await
                        .unwrap();
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let alice = registry.snapshot("alice").await.unwrap();
        let bob = registry.snapshot("bob").await.unwrap();
        assert_eq!(alice.logged_water_ml(), 2000.0);
        assert_eq!(bob.logged_water_ml(), 5000.0);
        assert_eq!(alice.water_events().len(), 20);
    }

    #[tokio::test]
    async fn failed_update_leaves_ledger_untouched() {
        let registry = UserRegistry::with_ledgers([("alice", ledger())]);
        let result = registry.update("alice", |l| l.log_water(-1.0)).await;
        assert!(result.is_err());
        let snapshot = registry.snapshot("alice").await.unwrap();
        assert!(snapshot.water_events().is_empty());
    }
}
