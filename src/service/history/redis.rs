//! Redis implementation of the conversation history store.
//!
//! Windows are stored as Redis lists under a namespaced key per user id, one
//! JSON-encoded record per element. Appends are `RPUSH` followed by `LTRIM`
//! to the last [`WINDOW_SIZE`](super::WINDOW_SIZE) elements, so the bound is
//! enforced on every write; reads are a full `LRANGE`.

use std::sync::Arc;

use async_trait::async_trait;
use redis::{AsyncCommands, aio::ConnectionManager};
use tracing::{debug, instrument};

use crate::base::{
    config::Config,
    types::{HistoryRecord, Res, Role, Void},
};

use super::{GenericHistoryStore, HistoryStore, WINDOW_SIZE};

// Extra methods on `HistoryStore` applied by the redis implementation.

impl HistoryStore {
    pub async fn redis(config: &Config) -> Res<Self> {
        let store = RedisHistoryStore::new(config).await?;
        Ok(Self { inner: Arc::new(store) })
    }
}

/// Redis-backed history store.
#[derive(Clone)]
pub struct RedisHistoryStore {
    manager: ConnectionManager,
}

impl RedisHistoryStore {
    /// Create a new Redis history store.
    ///
    /// Uses `ConnectionManager` so reconnection is handled by the client;
    /// this system itself has no retry policy.
    #[instrument(name = "RedisHistoryStore::new", skip_all)]
    pub async fn new(config: &Config) -> Res<Self> {
        let client = redis::Client::open(config.redis_url.as_str())?;
        let manager = client.get_connection_manager().await?;

        Ok(Self { manager })
    }

    /// Key for a user's conversation window.
    fn window_key(user_id: &str) -> String {
        format!("chat:history:{user_id}")
    }
}

#[async_trait]
impl GenericHistoryStore for RedisHistoryStore {
    #[instrument(name = "RedisHistoryStore::append", skip(self, content))]
    async fn append(&self, user_id: &str, role: Role, content: &str) -> Void {
        let record = HistoryRecord::now(role, content);
        let payload = serde_json::to_string(&record)?;
        let key = Self::window_key(user_id);

        // Append and trim are two commands; per-user atomicity is the store's
        // concern, not ours.
        let mut conn = self.manager.clone();
        let _: () = conn.rpush(&key, payload).await?;
        let _: () = conn.ltrim(&key, -(WINDOW_SIZE as isize), -1).await?;

        Ok(())
    }

    #[instrument(name = "RedisHistoryStore::read", skip(self))]
    async fn read(&self, user_id: &str) -> Res<Vec<HistoryRecord>> {
        let key = Self::window_key(user_id);

        let mut conn = self.manager.clone();
        let items: Vec<String> = conn.lrange(&key, 0, -1).await?;

        debug!("Read {} history records for `{}`.", items.len(), user_id);

        items.iter().map(|item| Ok(serde_json::from_str(item)?)).collect()
    }
}
