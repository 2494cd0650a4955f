use crate::config::QueueConfig;
use crate::error::{ConfigError, NotifyError, QueueError};
use crate::matchmaker::formed_match::FormedMatch;
use crate::matchmaker::match_trigger::MatchTrigger;
use crate::notify::MatchNotifier;
use crate::queues::queue_entry::{QueueEntry, UserId};
use crate::queues::queue_store::{normalize, QueueStore};
use log::{debug, error, info};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;

/// Outcome of a successful join.
#[derive(Debug)]
pub struct JoinReceipt {
    /// Place in line at the moment of joining, 1-based.
    pub position: usize,
    pub formed: Option<FormedMatch>,
    /// Delivery of `formed` to the notifiers, running in the background.
    pub announcement: Option<JoinHandle<()>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueSummary {
    pub name: String,
    pub size: usize,
    pub required_size: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueSnapshot {
    pub name: String,
    pub required_size: usize,
    pub roles: Vec<String>,
    pub entries: Vec<QueueEntry>,
}

struct PoolState {
    store: QueueStore,
    triggers: HashMap<String, MatchTrigger>,
    rounds: u64,
    /// Most recent match per queue, kept for host adjustments.
    latest: HashMap<String, FormedMatch>,
}

/// Owns every queue and its trigger. Join and trigger check happen under one
/// lock; notifiers run on a spawned task after it is released.
pub struct QueuePool {
    state: Mutex<PoolState>,
    notifiers: RwLock<Vec<Arc<dyn MatchNotifier>>>,
    default_queue: String,
}

impl QueuePool {
    pub fn new(
        queues: &[QueueConfig],
        notifiers: Vec<Arc<dyn MatchNotifier>>,
    ) -> Result<Self, ConfigError> {
        let mut store = QueueStore::new();
        let mut triggers = HashMap::new();

        for queue in queues {
            if !store.register(&queue.name) {
                return Err(ConfigError::InvalidQueue(format!(
                    "queue '{}' is defined twice",
                    queue.name
                )));
            }
            let trigger = MatchTrigger::new(queue.required_size, queue.roles.clone())?;
            triggers.insert(normalize(&queue.name), trigger);
        }

        let default_queue = store
            .queue_names()
            .first()
            .cloned()
            .ok_or_else(|| {
                ConfigError::InvalidQueue(String::from("at least one queue must be configured"))
            })?;

        Ok(QueuePool {
            state: Mutex::new(PoolState {
                store,
                triggers,
                rounds: 0,
                latest: HashMap::new(),
            }),
            notifiers: RwLock::new(notifiers),
            default_queue,
        })
    }

    /// Registers a notifier that can only be built once other services are up.
    pub async fn add_notifier(&self, notifier: Arc<dyn MatchNotifier>) {
        info!("Registered {} match notifier", notifier.name());
        self.notifiers.write().await.push(notifier);
    }

    pub fn default_queue(&self) -> &str {
        &self.default_queue
    }

    /// Resolves an optional queue name from a command to a concrete one.
    pub fn resolve<'a>(&'a self, queue_name: Option<&'a str>) -> &'a str {
        match queue_name {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.default_queue,
        }
    }

    pub async fn join(&self, queue_name: &str, user_id: UserId) -> Result<JoinReceipt, QueueError> {
        let (position, formed) = {
            let mut state = self.state.lock().await;
            let PoolState {
                store,
                triggers,
                rounds,
                latest,
            } = &mut *state;

            let trigger = triggers
                .get(&normalize(queue_name))
                .ok_or_else(|| QueueError::UnknownQueue(queue_name.to_string()))?;

            store.join(queue_name, user_id.clone())?;
            let position = store.position(queue_name, &user_id)?.unwrap_or_default();

            let formed = match trigger.check(store, queue_name)? {
                Some(assignments) => {
                    *rounds += 1;
                    let formed = FormedMatch::new(*rounds, normalize(queue_name), assignments);
                    latest.insert(formed.queue.clone(), formed.clone());
                    Some(formed)
                }
                None => None,
            };

            (position, formed)
        };

        debug!("{} joined queue {} at position {}", user_id, queue_name, position);

        let announcement = match &formed {
            Some(formed) => {
                info!(
                    "Round {} formed from queue {} ({} players)",
                    formed.round,
                    formed.queue,
                    formed.assignments.len()
                );
                Some(self.announce(formed.clone()).await)
            }
            None => None,
        };

        Ok(JoinReceipt {
            position,
            formed,
            announcement,
        })
    }

    pub async fn leave(&self, queue_name: &str, user_id: &UserId) -> Result<(), QueueError> {
        let mut state = self.state.lock().await;
        state.store.leave(queue_name, user_id)?;
        debug!("{} left queue {}", user_id, queue_name);
        Ok(())
    }

    pub async fn clear(&self, queue_name: &str) -> Result<usize, QueueError> {
        let mut state = self.state.lock().await;
        let removed = state.store.clear(queue_name)?;
        info!("Cleared {} entries from queue {}", removed, queue_name);
        Ok(removed)
    }

    pub async fn size(&self, queue_name: &str) -> Result<usize, QueueError> {
        self.state.lock().await.store.size(queue_name)
    }

    /// Swaps two participants of the latest round drafted from a queue and
    /// returns the revised allocation.
    pub async fn swap(
        &self,
        queue_name: &str,
        first: &UserId,
        second: &UserId,
    ) -> Result<FormedMatch, QueueError> {
        let mut state = self.state.lock().await;
        let key = normalize(queue_name);
        if !state.triggers.contains_key(&key) {
            return Err(QueueError::UnknownQueue(queue_name.to_string()));
        }

        let formed = state
            .latest
            .get_mut(&key)
            .ok_or_else(|| QueueError::NoRound(key.clone()))?;
        formed.swap(first, second)?;

        info!("Swapped {} and {} in round {}", first, second, formed.round);
        Ok(formed.clone())
    }

    pub async fn snapshot(&self, queue_name: &str) -> Result<QueueSnapshot, QueueError> {
        let state = self.state.lock().await;
        let trigger = state
            .triggers
            .get(&normalize(queue_name))
            .ok_or_else(|| QueueError::UnknownQueue(queue_name.to_string()))?;

        Ok(QueueSnapshot {
            name: normalize(queue_name),
            required_size: trigger.required_size(),
            roles: trigger.roles().iter().cloned().collect(),
            entries: state.store.entries(queue_name)?.to_vec(),
        })
    }

    pub async fn summaries(&self) -> Vec<QueueSummary> {
        let state = self.state.lock().await;

        state
            .store
            .queue_names()
            .iter()
            .filter_map(|name| {
                let size = state.store.size(name).ok()?;
                let trigger = state.triggers.get(name)?;
                Some(QueueSummary {
                    name: name.clone(),
                    size,
                    required_size: trigger.required_size(),
                })
            })
            .collect()
    }

    pub async fn queue_exists(&self, queue_name: &str) -> bool {
        self.state.lock().await.store.queue_exists(queue_name)
    }

    async fn announce(&self, formed: FormedMatch) -> JoinHandle<()> {
        let notifiers = self.notifiers.read().await.clone();
        tokio::spawn(async move { notify_all(&notifiers, &formed).await })
    }
}

async fn notify_all(notifiers: &[Arc<dyn MatchNotifier>], formed: &FormedMatch) {
    for notifier in notifiers {
        match notifier.match_formed(formed).await {
            Ok(()) => {}
            Err(NotifyError::NoSubscribers) => {
                debug!("No {} subscribers for round {}", notifier.name(), formed.round);
            }
            Err(err) => {
                error!(
                    target: "operator",
                    "Failed to announce round {} ({}) via {}: {}",
                    formed.round,
                    formed.id,
                    notifier.name(),
                    err
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matchmaker::roles::RoleList;
    use async_trait::async_trait;
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;
    use tokio::sync::Notify;
    use tokio::time::timeout;

    #[derive(Default)]
    struct Recorder {
        formed: StdMutex<Vec<FormedMatch>>,
    }

    #[async_trait]
    impl MatchNotifier for Recorder {
        fn name(&self) -> &str {
            "recorder"
        }

        async fn match_formed(&self, formed: &FormedMatch) -> Result<(), NotifyError> {
            self.formed.lock().unwrap().push(formed.clone());
            Ok(())
        }
    }

    struct Unreachable;

    #[async_trait]
    impl MatchNotifier for Unreachable {
        fn name(&self) -> &str {
            "unreachable"
        }

        async fn match_formed(&self, _formed: &FormedMatch) -> Result<(), NotifyError> {
            Err(NotifyError::from(serenity::Error::Other("channel unreachable")))
        }
    }

    /// Holds every delivery until the gate is opened.
    #[derive(Default)]
    struct Gated {
        gate: Notify,
        delivered: Recorder,
    }

    #[async_trait]
    impl MatchNotifier for Gated {
        fn name(&self) -> &str {
            "gated"
        }

        async fn match_formed(&self, formed: &FormedMatch) -> Result<(), NotifyError> {
            self.gate.notified().await;
            self.delivered.match_formed(formed).await
        }
    }

    fn pool_with(notifiers: Vec<Arc<dyn MatchNotifier>>) -> QueuePool {
        let queues = vec![
            QueueConfig::default(),
            QueueConfig {
                name: String::from("Iron"),
                required_size: 3,
                roles: RoleList::new(vec![
                    String::from("Gov 1"),
                    String::from("Opp 1"),
                    String::from("Judge"),
                ])
                .unwrap(),
            },
        ];
        QueuePool::new(&queues, notifiers).unwrap()
    }

    /// Joins and waits for the background announcement, if any.
    async fn join_settled(pool: &QueuePool, queue: &str, id: &str) -> Option<FormedMatch> {
        let receipt = pool.join(queue, UserId::from(id)).await.unwrap();
        if let Some(announcement) = receipt.announcement {
            announcement.await.unwrap();
        }
        receipt.formed
    }

    #[tokio::test]
    async fn seventh_join_notifies_once_with_all_roles() {
        let recorder = Arc::new(Recorder::default());
        let pool = pool_with(vec![recorder.clone() as Arc<dyn MatchNotifier>]);

        for (i, id) in ["A", "B", "C", "D", "E", "F"].into_iter().enumerate() {
            let receipt = pool.join("ap", UserId::from(id)).await.unwrap();
            assert_eq!(receipt.position, i + 1);
            assert!(receipt.formed.is_none());
            assert!(receipt.announcement.is_none());
        }
        assert_eq!(pool.size("ap").await.unwrap(), 6);

        let receipt = pool.join("ap", UserId::from("G")).await.unwrap();
        receipt.announcement.unwrap().await.unwrap();

        assert_eq!(receipt.position, 7);
        let formed = receipt.formed.unwrap();
        assert_eq!(formed.round, 1);
        assert_eq!(formed.assignments[6].role, "Judge");
        assert_eq!(formed.assignments[6].user_id, UserId::from("G"));
        assert_eq!(pool.size("ap").await.unwrap(), 0);
        assert_eq!(recorder.formed.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn join_returns_before_notifiers_finish() {
        let gated = Arc::new(Gated::default());
        let pool = pool_with(vec![gated.clone() as Arc<dyn MatchNotifier>]);

        let mut last = None;
        for id in ["A", "B", "C"] {
            let receipt = timeout(Duration::from_secs(1), pool.join("iron", UserId::from(id)))
                .await
                .expect("join waited on a notifier")
                .unwrap();
            last = Some(receipt);
        }
        let receipt = last.unwrap();

        assert!(receipt.formed.is_some());
        assert_eq!(pool.size("iron").await.unwrap(), 0);
        assert!(gated.delivered.formed.lock().unwrap().is_empty());

        gated.gate.notify_one();
        receipt.announcement.unwrap().await.unwrap();

        assert_eq!(gated.delivered.formed.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn notifier_added_later_receives_matches() {
        let pool = pool_with(Vec::new());
        let recorder = Arc::new(Recorder::default());
        pool.add_notifier(recorder.clone()).await;

        for id in ["A", "B", "C"] {
            join_settled(&pool, "iron", id).await;
        }

        assert_eq!(recorder.formed.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn failed_announcement_keeps_the_drain() {
        let recorder = Arc::new(Recorder::default());
        let pool = pool_with(vec![
            Arc::new(Unreachable) as Arc<dyn MatchNotifier>,
            recorder.clone() as Arc<dyn MatchNotifier>,
        ]);

        let mut last = None;
        for id in ["A", "B", "C"] {
            last = join_settled(&pool, "iron", id).await;
        }

        assert!(last.is_some());
        assert_eq!(pool.size("iron").await.unwrap(), 0);
        assert_eq!(recorder.formed.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn rounds_count_across_queues() {
        let pool = pool_with(Vec::new());

        let mut rounds = Vec::new();
        for id in ["A", "B", "C", "D", "E", "F"] {
            if let Some(formed) = join_settled(&pool, "iron", id).await {
                rounds.push(formed.round);
            }
        }

        assert_eq!(rounds, vec![1, 2]);
    }

    #[tokio::test]
    async fn unknown_queue_does_not_touch_others() {
        let pool = pool_with(Vec::new());

        let err = pool.join("bp", UserId::from("A")).await.unwrap_err();

        assert_eq!(err, QueueError::UnknownQueue(String::from("bp")));
        assert_eq!(pool.size("ap").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn concurrent_joins_form_exactly_one_match() {
        let recorder = Arc::new(Recorder::default());
        let pool = Arc::new(pool_with(vec![recorder.clone() as Arc<dyn MatchNotifier>]));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let pool = pool.clone();
                tokio::spawn(async move { pool.join("ap", UserId::from(format!("user-{i}"))).await })
            })
            .collect();
        for handle in handles {
            let receipt = handle.await.unwrap().unwrap();
            if let Some(announcement) = receipt.announcement {
                announcement.await.unwrap();
            }
        }

        assert_eq!(recorder.formed.lock().unwrap().len(), 1);
        assert_eq!(pool.size("ap").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn swap_revises_the_latest_round() {
        let pool = pool_with(Vec::new());
        for id in ["A", "B", "C"] {
            join_settled(&pool, "iron", id).await;
        }

        let revised = pool
            .swap("Iron", &UserId::from("A"), &UserId::from("C"))
            .await
            .unwrap();

        assert_eq!(revised.assignments[0].user_id, UserId::from("C"));
        assert_eq!(revised.assignments[2].user_id, UserId::from("A"));

        let again = pool
            .swap("iron", &UserId::from("C"), &UserId::from("B"))
            .await
            .unwrap();
        assert_eq!(again.assignments[0].user_id, UserId::from("B"));
    }

    #[tokio::test]
    async fn swap_needs_a_formed_round() {
        let pool = pool_with(Vec::new());

        let err = pool
            .swap("ap", &UserId::from("A"), &UserId::from("B"))
            .await
            .unwrap_err();
        assert_eq!(err, QueueError::NoRound(String::from("ap")));

        let err = pool
            .swap("bp", &UserId::from("A"), &UserId::from("B"))
            .await
            .unwrap_err();
        assert_eq!(err, QueueError::UnknownQueue(String::from("bp")));
    }

    #[tokio::test]
    async fn snapshot_and_summaries_reflect_the_queue() {
        let pool = pool_with(Vec::new());
        pool.join("AP", UserId::from("A")).await.unwrap();
        pool.join("ap", UserId::from("B")).await.unwrap();
        pool.leave("ap", &UserId::from("A")).await.unwrap();

        let snapshot = pool.snapshot("ap").await.unwrap();
        assert_eq!(snapshot.required_size, 7);
        assert_eq!(snapshot.roles.len(), 7);
        assert_eq!(snapshot.entries.len(), 1);
        assert_eq!(snapshot.entries[0].user_id, UserId::from("B"));

        let summaries = pool.summaries().await;
        let names: Vec<&str> = summaries.iter().map(|x| x.name.as_str()).collect();
        assert_eq!(names, vec!["ap", "iron"]);
        assert_eq!(summaries[0].size, 1);
    }

    #[tokio::test]
    async fn clear_empties_the_queue() {
        let pool = pool_with(Vec::new());
        pool.join("ap", UserId::from("A")).await.unwrap();

        assert_eq!(pool.clear("ap").await.unwrap(), 1);
        assert_eq!(pool.size("ap").await.unwrap(), 0);
    }

    #[test]
    fn resolve_falls_back_to_the_first_queue() {
        let pool = pool_with(Vec::new());

        assert_eq!(pool.resolve(None), "ap");
        assert_eq!(pool.resolve(Some(" ")), "ap");
        assert_eq!(pool.resolve(Some("iron")), "iron");
    }
}
