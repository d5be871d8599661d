use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use tokio::{
    sync::{Mutex, RwLock},
    task::JoinHandle,
};
use uuid::Uuid;

use crate::{
    errors::{AppError, AppResult},
    models::domain::Identity,
    services::{quiz_service::QuizProvider, quiz_session::QuizSession},
};

pub type SharedSession = Arc<Mutex<QuizSession>>;

pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(30 * 60);
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

struct SessionEntry {
    session: SharedSession,
    last_touched: Instant,
}

/// Live sessions by id. Each session sits behind its own mutex, so requests
/// for one session run one at a time while other sessions stay independent.
///
/// A session that nobody has looked up for `ttl` expires, whatever its
/// phase. The store never holds more than `max_sessions`; creating one more
/// first drops expired sessions and then the least recently used one.
pub struct SessionStore {
    sessions: RwLock<HashMap<String, SessionEntry>>,
    ttl: Duration,
    max_sessions: usize,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_TTL, DEFAULT_MAX_SESSIONS)
    }
}

impl SessionStore {
    pub fn new(ttl: Duration, max_sessions: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
            max_sessions: max_sessions.max(1),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn create(
        &self,
        provider: Arc<dyn QuizProvider>,
        identity: Option<Identity>,
    ) -> (String, SharedSession) {
        let id = Uuid::new_v4().to_string();
        let session = Arc::new(Mutex::new(QuizSession::new(provider, identity)));
        let now = Instant::now();

        let mut sessions = self.sessions.write().await;
        if sessions.len() >= self.max_sessions {
            let expired = Self::drop_expired(&mut sessions, self.ttl, now);
            if expired > 0 {
                log::debug!("Dropped {} expired quiz sessions", expired);
            }
        }
        if sessions.len() >= self.max_sessions {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, entry)| entry.last_touched)
                .map(|(id, _)| id.clone());
            if let Some(oldest) = oldest {
                log::warn!(
                    "Session store is full ({}), evicting session {}",
                    self.max_sessions,
                    oldest
                );
                sessions.remove(&oldest);
            }
        }

        sessions.insert(
            id.clone(),
            SessionEntry {
                session: Arc::clone(&session),
                last_touched: now,
            },
        );

        (id, session)
    }

    /// Fetches a live session and marks it as used.
    pub async fn get(&self, id: &str) -> AppResult<SharedSession> {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;

        match sessions.get_mut(id) {
            Some(entry) if now.saturating_duration_since(entry.last_touched) <= self.ttl => {
                entry.last_touched = now;
                Ok(Arc::clone(&entry.session))
            }
            Some(_) => {
                sessions.remove(id);
                Err(Self::not_found(id))
            }
            None => Err(Self::not_found(id)),
        }
    }

    pub async fn remove(&self, id: &str) -> AppResult<()> {
        self.sessions
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| Self::not_found(id))
    }

    /// Drops every session idle for longer than the ttl and returns how many
    /// went away.
    pub async fn purge_expired(&self) -> usize {
        self.purge_expired_at(Instant::now()).await
    }

    pub async fn purge_expired_at(&self, now: Instant) -> usize {
        let mut sessions = self.sessions.write().await;
        Self::drop_expired(&mut sessions, self.ttl, now)
    }

    /// Runs `purge_expired` every `every` until the returned task is aborted.
    pub fn spawn_sweeper(self: Arc<Self>, every: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let purged = self.purge_expired().await;
                if purged > 0 {
                    log::info!(
                        "Expired {} idle quiz sessions, {} still live",
                        purged,
                        self.len().await
                    );
                }
            }
        })
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn drop_expired(
        sessions: &mut HashMap<String, SessionEntry>,
        ttl: Duration,
        now: Instant,
    ) -> usize {
        let before = sessions.len();
        sessions.retain(|_, entry| now.saturating_duration_since(entry.last_touched) <= ttl);
        before - sessions.len()
    }

    fn not_found(id: &str) -> AppError {
        AppError::NotFound(format!("Quiz session '{}' not found", id))
    }
}
