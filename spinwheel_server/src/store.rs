use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use spinwheel_core::{derive_hash_hex, GameConfig, GameSession, ProvablyFairRng};
use spinwheel_shared::{RoundKind, SessionView, SpinLogEntry};
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

/// Oldest rounds are dropped once a session's history reaches this length.
pub const HISTORY_LIMIT: usize = 1_000;

/// One player's session plus the provably-fair bookkeeping around it.
pub struct SessionEntry {
    pub session: GameSession,
    server_seed: String,
    pub server_seed_hash: String,
    pub client_seed: String,
    pub nonce: u64,
    pub created_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
    pub history: Vec<SpinLogEntry>,
}

impl SessionEntry {
    pub fn new(config: Arc<GameConfig>, client_seed: Option<String>) -> Self {
        let mut seed_bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut seed_bytes);
        let server_seed = hex::encode(seed_bytes);
        Self::with_seeds(
            config,
            server_seed,
            client_seed.unwrap_or_else(|| Uuid::new_v4().simple().to_string()),
        )
    }

    pub fn with_seeds(config: Arc<GameConfig>, server_seed: String, client_seed: String) -> Self {
        let now = Utc::now();
        Self {
            session: GameSession::new(config),
            server_seed_hash: derive_hash_hex(server_seed.as_bytes()),
            server_seed,
            client_seed,
            nonce: 0,
            created_at: now,
            last_active: now,
            history: Vec::new(),
        }
    }

    /// Fresh random stream for the next random operation.
    pub fn next_rng(&mut self) -> ProvablyFairRng {
        self.nonce += 1;
        ProvablyFairRng::new(&self.server_seed, &self.client_seed, self.nonce)
    }

    pub fn log(&mut self, nonce: Option<u64>, round: RoundKind) {
        if self.history.len() >= HISTORY_LIMIT {
            let excess = self.history.len() + 1 - HISTORY_LIMIT;
            self.history.drain(..excess);
        }
        self.history.push(SpinLogEntry {
            ts: Utc::now(),
            nonce,
            round,
        });
    }

    /// Only revealed once the session is closed.
    pub fn server_seed(&self) -> &str {
        &self.server_seed
    }

    pub fn view(&self, session_id: Uuid) -> SessionView {
        let session = &self.session;
        SessionView {
            session_id,
            server_seed_hash: self.server_seed_hash.clone(),
            client_seed: self.client_seed.clone(),
            nonce: self.nonce,
            mode: session.mode(),
            balance: session.current_balance(),
            selected_bet: session.selected_bet(),
            open_bet: session.ledger().open_bet(),
            stops: session.stops().to_vec(),
            window: session.window().iter().map(|column| column.to_vec()).collect(),
            prize_values: session.prize_values(),
            created_at: self.created_at,
        }
    }
}

#[derive(Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<Uuid, SessionEntry>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, entry: SessionEntry) -> Uuid {
        let id = Uuid::new_v4();
        self.sessions.lock().await.insert(id, entry);
        id
    }

    pub async fn remove(&self, id: &Uuid) -> Option<SessionEntry> {
        self.sessions.lock().await.remove(id)
    }

    /// Run `f` against one session while holding the store lock. Engine calls
    /// are synchronous and short, so rounds for one player never interleave.
    pub async fn with<T>(&self, id: &Uuid, f: impl FnOnce(&mut SessionEntry) -> T) -> Option<T> {
        let mut sessions = self.sessions.lock().await;
        sessions.get_mut(id).map(|entry| {
            entry.last_active = Utc::now();
            f(entry)
        })
    }

    /// Drop sessions untouched for longer than `max_idle`. Returns how many
    /// were removed.
    pub async fn evict_idle(&self, max_idle: Duration) -> usize {
        let cutoff = Utc::now() - max_idle;
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|id, entry| {
            let keep = entry.last_active >= cutoff;
            if !keep {
                debug!(session = %id, balance = %entry.session.current_balance(), "idle session evicted");
            }
            keep
        });
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spinwheel_core::Credits;

    #[test]
    fn nonce_advances_per_random_operation() {
        let config = Arc::new(GameConfig::reference());
        let mut entry = SessionEntry::with_seeds(config, "server".into(), "client".into());
        let first = entry.next_rng();
        let second = entry.next_rng();
        assert_eq!(first.nonce, 1);
        assert_eq!(second.nonce, 2);
        assert_eq!(entry.server_seed_hash, derive_hash_hex(b"server"));
    }

    #[test]
    fn history_keeps_only_the_latest_rounds() {
        let config = Arc::new(GameConfig::reference());
        let mut entry = SessionEntry::with_seeds(config, "server".into(), "client".into());
        for nonce in 1..=(HISTORY_LIMIT as u64 + 5) {
            entry.log(
                Some(nonce),
                RoundKind::Spin {
                    stops: vec![0; 5],
                    bet: Credits::new(1),
                    total_win: Credits::ZERO,
                },
            );
        }
        assert_eq!(entry.history.len(), HISTORY_LIMIT);
        assert_eq!(entry.history[0].nonce, Some(6));
        assert_eq!(
            entry.history.last().map(|e| e.nonce),
            Some(Some(HISTORY_LIMIT as u64 + 5))
        );
    }

    #[tokio::test]
    async fn idle_sessions_are_evicted() {
        let config = Arc::new(GameConfig::reference());
        let store = SessionStore::new();
        let mut stale = SessionEntry::new(config.clone(), None);
        stale.last_active = Utc::now() - Duration::hours(2);
        let stale = store.insert(stale).await;
        let fresh = store.insert(SessionEntry::new(config, None)).await;

        assert_eq!(store.evict_idle(Duration::minutes(30)).await, 1);
        assert_eq!(store.len().await, 1);
        assert!(store.with(&stale, |_| ()).await.is_none());
        assert!(store.with(&fresh, |_| ()).await.is_some());
    }

    #[tokio::test]
    async fn touching_a_session_keeps_it_alive() {
        let config = Arc::new(GameConfig::reference());
        let store = SessionStore::new();
        let mut entry = SessionEntry::new(config, None);
        entry.last_active = Utc::now() - Duration::hours(2);
        let id = store.insert(entry).await;
        store.with(&id, |_| ()).await;
        assert_eq!(store.evict_idle(Duration::minutes(30)).await, 0);
    }

    #[tokio::test]
    async fn store_keeps_sessions_apart() {
        let config = Arc::new(GameConfig::reference());
        let store = SessionStore::new();
        let a = store.insert(SessionEntry::new(config.clone(), None)).await;
        let b = store.insert(SessionEntry::new(config, Some("mine".into()))).await;
        assert_ne!(a, b);
        assert_eq!(store.len().await, 2);
        let seed = store.with(&b, |entry| entry.client_seed.clone()).await;
        assert_eq!(seed.as_deref(), Some("mine"));
        assert!(store.remove(&a).await.is_some());
        assert!(store.with(&a, |_| ()).await.is_none());
    }
}
