//! In-memory registry: message id → live selector.
//!
//! A cache only; every record can be rebuilt from the message it points at.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::RwLock;

use super::types::{ChannelId, MessageId, WidgetRecord};

/// Outcome of [`WidgetStore::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    Inserted,
    /// Same message and equal config; nothing changed.
    Unchanged,
    /// Same message, different config; the new one wins.
    Replaced,
}

/// Shared selector registry. Create one per process and hand out `Arc`s.
#[derive(Debug, Default)]
pub struct WidgetStore {
    records: RwLock<HashMap<MessageId, WidgetRecord>>,
    ready: AtomicBool,
}

impl WidgetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, record: WidgetRecord) -> Registration {
        let mut records = self.records.write().await;
        match records.get(&record.message_id) {
            Some(existing) if existing == &record => Registration::Unchanged,
            Some(_) => {
                records.insert(record.message_id, record);
                Registration::Replaced
            }
            None => {
                records.insert(record.message_id, record);
                Registration::Inserted
            }
        }
    }

    pub async fn lookup(&self, message_id: MessageId) -> Option<WidgetRecord> {
        self.records.read().await.get(&message_id).cloned()
    }

    pub async fn forget(&self, message_id: MessageId) -> Option<WidgetRecord> {
        self.records.write().await.remove(&message_id)
    }

    /// Records anchored in `channel_id`, ordered by message id.
    pub async fn records_in_channel(&self, channel_id: ChannelId) -> Vec<WidgetRecord> {
        let mut records = self
            .records
            .read()
            .await
            .values()
            .filter(|record| record.channel_id == channel_id)
            .cloned()
            .collect::<Vec<_>>();
        records.sort_by_key(|record| record.message_id);
        records
    }

    /// Every record, ordered by message id.
    pub async fn snapshot(&self) -> Vec<WidgetRecord> {
        let mut records = self
            .records
            .read()
            .await
            .values()
            .cloned()
            .collect::<Vec<_>>();
        records.sort_by_key(|record| record.message_id);
        records
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Flip once startup recovery has finished.
    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }
}
