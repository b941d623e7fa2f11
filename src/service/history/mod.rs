pub mod memory;
pub mod redis;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::base::types::{HistoryRecord, Res, Role, Void};

/// Maximum number of records retained per user window.
///
/// Trimming happens on every append, so a window never exceeds this bound and
/// the oldest records are the ones dropped.
pub const WINDOW_SIZE: usize = 200;

// Traits.

/// Generic history store trait that backends must implement.
///
/// This trait defines the core functionality for persisting per-user
/// conversation windows. Implementing this trait allows different storage
/// backends to be used with the helpdesk-bot.
#[async_trait]
pub trait GenericHistoryStore: Send + Sync + 'static {
    /// Append a record to the user's window, stamped with the current UTC time.
    ///
    /// After the append, the window is trimmed to its most recent
    /// [`WINDOW_SIZE`] records. Storage unavailability propagates to the
    /// caller as a dependency failure.
    async fn append(&self, user_id: &str, role: Role, content: &str) -> Void;

    /// Read the full current window for a user, in insertion order.
    ///
    /// Returns an empty sequence for a user id that has never been seen.
    async fn read(&self, user_id: &str) -> Res<Vec<HistoryRecord>>;
}

// Structs.

/// History store handle for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct HistoryStore {
    inner: Arc<dyn GenericHistoryStore>,
}

impl Deref for HistoryStore {
    type Target = dyn GenericHistoryStore;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl HistoryStore {
    pub fn new(inner: Arc<dyn GenericHistoryStore>) -> Self {
        Self { inner }
    }
}
