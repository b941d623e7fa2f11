//! In-memory implementation of the conversation history store.
//!
//! Mirrors the append/trim/read semantics of the Redis backend without an
//! external process, which makes it the store of choice for tests.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;

use crate::base::types::{HistoryRecord, Res, Role, Void};

use super::{GenericHistoryStore, HistoryStore, WINDOW_SIZE};

impl HistoryStore {
    pub fn memory() -> Self {
        Self {
            inner: Arc::new(MemoryHistoryStore::default()),
        }
    }
}

/// In-memory history store keyed by user id.
#[derive(Default)]
pub struct MemoryHistoryStore {
    windows: Mutex<HashMap<String, Vec<HistoryRecord>>>,
}

#[async_trait]
impl GenericHistoryStore for MemoryHistoryStore {
    async fn append(&self, user_id: &str, role: Role, content: &str) -> Void {
        let record = HistoryRecord::now(role, content);

        let mut windows = self.windows.lock().unwrap();
        let window = windows.entry(user_id.to_string()).or_default();

        window.push(record);

        if window.len() > WINDOW_SIZE {
            let excess = window.len() - WINDOW_SIZE;
            window.drain(..excess);
        }

        Ok(())
    }

    async fn read(&self, user_id: &str) -> Res<Vec<HistoryRecord>> {
        let windows = self.windows.lock().unwrap();

        Ok(windows.get(user_id).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn read_returns_empty_for_unseen_user() {
        let store = HistoryStore::memory();

        let window = store.read("nobody").await.unwrap();

        assert!(window.is_empty());
    }

    #[tokio::test]
    async fn append_preserves_insertion_order() {
        let store = HistoryStore::memory();

        store.append("u1", Role::User, "first").await.unwrap();
        store.append("u1", Role::Assistant, "second").await.unwrap();
        store.append("u1", Role::User, "third").await.unwrap();

        let window = store.read("u1").await.unwrap();
        let contents: Vec<_> = window.iter().map(|r| r.content.as_str()).collect();

        assert_eq!(contents, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn window_trims_to_most_recent_records() {
        let store = HistoryStore::memory();

        for i in 0..WINDOW_SIZE + 25 {
            store.append("u1", Role::User, &format!("message {i}")).await.unwrap();
        }

        let window = store.read("u1").await.unwrap();

        assert_eq!(window.len(), WINDOW_SIZE);
        assert_eq!(window.first().unwrap().content, "message 25");
        assert_eq!(window.last().unwrap().content, format!("message {}", WINDOW_SIZE + 24));
    }

    #[tokio::test]
    async fn windows_are_isolated_per_user() {
        let store = HistoryStore::memory();

        store.append("u1", Role::User, "hello from u1").await.unwrap();
        store.append("u2", Role::User, "hello from u2").await.unwrap();

        let window = store.read("u1").await.unwrap();

        assert_eq!(window.len(), 1);
        assert_eq!(window[0].content, "hello from u1");
    }
}
