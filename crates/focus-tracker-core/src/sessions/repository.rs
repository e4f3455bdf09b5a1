use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;

use super::{UserStats, WorkSession};
use crate::auth::load_current_user;
use crate::error::{CoreError, Result, ValidationError};
use crate::storage::{keys, read_json, simulate, write_json, KvStore, LatencyConfig};
use crate::timer::Mode;

/// Append-only session history over a [`KvStore`].
///
/// Appends rewrite the whole collection, so they go through one async lock
/// shared by every clone of the repository.
#[derive(Clone)]
pub struct SessionRepository {
    store: Arc<dyn KvStore>,
    latency: LatencyConfig,
    write_lock: Arc<Mutex<()>>,
}

impl SessionRepository {
    pub fn new(store: Arc<dyn KvStore>, latency: LatencyConfig) -> Self {
        Self {
            store,
            latency,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Every recorded session of every user, in insertion order.
    pub fn all(&self) -> Result<Vec<WorkSession>> {
        Ok(read_json(&*self.store, keys::WORK_SESSIONS)?.unwrap_or_default())
    }

    /// Append a completed countdown for the logged-in user.
    ///
    /// # Errors
    /// `NotAuthenticated` when nobody is logged in; nothing is written.
    pub async fn record(&self, mode: Mode, duration_secs: u64) -> Result<WorkSession> {
        if duration_secs == 0 {
            return Err(ValidationError::InvalidValue {
                field: "duration".into(),
                message: "a recorded session must last at least one second".into(),
            }
            .into());
        }
        simulate(self.latency.session_save()).await;

        let user = load_current_user(&*self.store)?.ok_or(CoreError::NotAuthenticated)?;

        let _guard = self.write_lock.lock().await;
        let mut sessions = self.all()?;
        let session = WorkSession {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user.id,
            mode,
            duration_secs,
            timestamp: Utc::now(),
        };
        sessions.push(session.clone());
        write_json(&*self.store, keys::WORK_SESSIONS, &sessions)?;

        tracing::info!(
            session_id = %session.id,
            user_id = %session.user_id,
            %mode,
            duration_secs,
            "session recorded"
        );
        Ok(session)
    }

    /// Stats for `user_id`, or for the logged-in user when `None` or empty.
    /// Nobody to report on yields zeroed stats rather than an error.
    pub async fn compute_stats(&self, user_id: Option<&str>) -> Result<UserStats> {
        simulate(self.latency.stats()).await;

        let target = match user_id.filter(|id| !id.is_empty()) {
            Some(id) => Some(id.to_string()),
            None => load_current_user(&*self.store)?.map(|u| u.id),
        };
        let Some(target) = target else {
            return Ok(UserStats::default());
        };

        Ok(UserStats::aggregate(&self.all()?, &target))
    }

    /// Drop the whole history, for every user.
    pub async fn clear_all(&self) -> Result<()> {
        simulate(self.latency.clear()).await;

        let _guard = self.write_lock.lock().await;
        self.store.remove(keys::WORK_SESSIONS)?;
        tracing::info!("session history cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Accounts;
    use crate::storage::MemoryStore;
    use std::time::Duration;

    fn setup() -> (Arc<MemoryStore>, Accounts, SessionRepository) {
        let store = Arc::new(MemoryStore::new());
        let accounts = Accounts::new(store.clone(), Duration::ZERO);
        let repo = SessionRepository::new(store.clone(), LatencyConfig::none());
        (store, accounts, repo)
    }

    #[tokio::test]
    async fn record_requires_a_user() {
        let (store, _, repo) = setup();
        let err = repo.record(Mode::Focus, 1500).await.unwrap_err();
        assert!(matches!(err, CoreError::NotAuthenticated));
        assert!(store.get(keys::WORK_SESSIONS).unwrap().is_none());
    }

    #[tokio::test]
    async fn record_and_query() {
        let (_, accounts, repo) = setup();
        let user = accounts.signup("a@b.com", "abcdef", "A").await.unwrap();

        let s = repo.record(Mode::Focus, 1500).await.unwrap();
        assert_eq!(s.user_id, user.id);
        repo.record(Mode::ShortBreak, 300).await.unwrap();

        let stats = repo.compute_stats(None).await.unwrap();
        assert_eq!(stats.total_focus_seconds, 1500);
        assert_eq!(stats.focus_session_count, 1);
        assert_eq!(stats.recent_sessions.len(), 2);

        let same = repo.compute_stats(Some(&user.id)).await.unwrap();
        assert_eq!(same, stats);
    }

    #[tokio::test]
    async fn stats_are_per_user() {
        let (_, accounts, repo) = setup();
        let first = accounts.signup("a@b.com", "abcdef", "A").await.unwrap();
        repo.record(Mode::Focus, 1500).await.unwrap();
        accounts.signup("c@d.com", "abcdef", "C").await.unwrap();
        repo.record(Mode::Focus, 600).await.unwrap();

        let stats = repo.compute_stats(Some(&first.id)).await.unwrap();
        assert_eq!(stats.total_focus_seconds, 1500);
        let current = repo.compute_stats(None).await.unwrap();
        assert_eq!(current.total_focus_seconds, 600);
    }

    #[tokio::test]
    async fn empty_user_id_means_current_user() {
        let (_, accounts, repo) = setup();
        accounts.signup("a@b.com", "abcdef", "A").await.unwrap();
        repo.record(Mode::Focus, 1500).await.unwrap();

        let stats = repo.compute_stats(Some("")).await.unwrap();
        assert_eq!(stats.focus_session_count, 1);
        assert_eq!(stats, repo.compute_stats(None).await.unwrap());
    }

    #[tokio::test]
    async fn no_user_yields_zeroed_stats() {
        let (_, _, repo) = setup();
        assert_eq!(repo.compute_stats(None).await.unwrap(), UserStats::default());
        assert_eq!(
            repo.compute_stats(Some("nobody")).await.unwrap(),
            UserStats::default()
        );
    }

    #[tokio::test]
    async fn clear_all_wipes_every_user() {
        let (_, accounts, repo) = setup();
        accounts.signup("a@b.com", "abcdef", "A").await.unwrap();
        repo.record(Mode::Focus, 1500).await.unwrap();
        accounts.signup("c@d.com", "abcdef", "C").await.unwrap();
        repo.record(Mode::Focus, 1500).await.unwrap();

        repo.clear_all().await.unwrap();
        assert!(repo.all().unwrap().is_empty());
        assert!(accounts.current_user().unwrap().is_some());
    }

    #[tokio::test]
    async fn concurrent_appends_are_not_lost() {
        let (_, accounts, repo) = setup();
        accounts.signup("a@b.com", "abcdef", "A").await.unwrap();

        let tasks: Vec<_> = (0..20)
            .map(|_| {
                let repo = repo.clone();
                tokio::spawn(async move { repo.record(Mode::Focus, 60).await })
            })
            .collect();
        for t in tasks {
            t.await.unwrap().unwrap();
        }

        assert_eq!(repo.all().unwrap().len(), 20);
    }

    #[tokio::test]
    async fn zero_duration_is_rejected() {
        let (_, accounts, repo) = setup();
        accounts.signup("a@b.com", "abcdef", "A").await.unwrap();
        assert!(matches!(
            repo.record(Mode::Focus, 0).await,
            Err(CoreError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn malformed_history_reads_as_empty() {
        let (store, _, repo) = setup();
        store.set(keys::WORK_SESSIONS, "[{\"id\":").unwrap();
        assert!(repo.all().unwrap().is_empty());
    }
}
