//! In-memory reference implementation of [`DataStore`].
//!
//! Backs the demo binary and the test suite. Behaves like the managed
//! service from the application's point of view: it assigns ids and
//! timestamps on insert, answers snapshot queries, and fans out unit change
//! notifications per table.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use carebook_types::Identity;
use serde_json::Value;
use tokio::sync::{broadcast, RwLock};

use super::{ChangeFeed, DataStore, Filter, Table};
use crate::error::StoreError;

/// Capacity of each per-table notification channel. Consumers re-fetch
/// wholesale on any event, so lagged receivers lose nothing.
const CHANGE_CHANNEL_CAPACITY: usize = 16;

pub struct MemoryStore {
    tables: RwLock<HashMap<Table, Vec<Value>>>,
    senders: HashMap<Table, broadcast::Sender<()>>,
    identity: Mutex<Option<Identity>>,
    insert_counts: Mutex<HashMap<Table, usize>>,
    fail_next_insert: Mutex<Option<String>>,
    closed_feeds: Arc<AtomicUsize>,
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MemoryStore {
    pub fn new() -> Self {
        let senders = Table::ALL
            .into_iter()
            .map(|table| (table, broadcast::channel(CHANGE_CHANNEL_CAPACITY).0))
            .collect();

        Self {
            tables: RwLock::new(HashMap::new()),
            senders,
            identity: Mutex::new(None),
            insert_counts: Mutex::new(HashMap::new()),
            fail_next_insert: Mutex::new(None),
            closed_feeds: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Sets the identity reported by [`DataStore::current_user`].
    pub fn sign_in(&self, identity: Identity) {
        *lock(&self.identity) = Some(identity);
    }

    pub fn sign_out(&self) {
        *lock(&self.identity) = None;
    }

    /// Places pre-existing rows into a table without assigning ids,
    /// counting inserts or notifying watchers.
    pub async fn seed(&self, table: Table, rows: impl IntoIterator<Item = Value>) {
        let mut tables = self.tables.write().await;
        tables.entry(table).or_default().extend(rows);
    }

    /// Makes the next insert fail with the given message. One-shot.
    pub fn fail_next_insert(&self, message: impl Into<String>) {
        *lock(&self.fail_next_insert) = Some(message.into());
    }

    /// Number of successful inserts into `table` since construction.
    pub fn insert_count(&self, table: Table) -> usize {
        lock(&self.insert_counts).get(&table).copied().unwrap_or(0)
    }

    /// Number of change feeds that have been torn down so far.
    pub fn closed_feeds(&self) -> usize {
        self.closed_feeds.load(Ordering::SeqCst)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DataStore for MemoryStore {
    async fn current_user(&self) -> Result<Option<Identity>, StoreError> {
        Ok(lock(&self.identity).clone())
    }

    async fn insert(&self, table: Table, mut record: Value) -> Result<Value, StoreError> {
        if let Some(message) = lock(&self.fail_next_insert).take() {
            return Err(StoreError::Rejected(message));
        }

        let Some(fields) = record.as_object_mut() else {
            return Err(StoreError::Rejected("record must be a JSON object".into()));
        };

        let now = chrono::Utc::now().to_rfc3339();
        fields
            .entry("id")
            .or_insert_with(|| Value::String(uuid::Uuid::new_v4().to_string()));
        fields
            .entry("created_at")
            .or_insert_with(|| Value::String(now.clone()));
        fields.entry("updated_at").or_insert(Value::String(now));

        {
            let mut tables = self.tables.write().await;
            tables.entry(table).or_default().push(record.clone());
        }
        *lock(&self.insert_counts).entry(table).or_insert(0) += 1;

        if let Some(sender) = self.senders.get(&table) {
            // No receivers is fine; nobody is watching.
            let _ = sender.send(());
        }

        Ok(record)
    }

    async fn select(
        &self,
        table: Table,
        filter: Option<Filter>,
        order_by: Option<&str>,
    ) -> Result<Vec<Value>, StoreError> {
        let tables = self.tables.read().await;
        let mut rows: Vec<Value> = tables.get(&table).cloned().unwrap_or_default();
        drop(tables);

        if let Some(filter) = filter {
            rows.retain(|row| row.get(filter.column) == Some(&filter.value));
        }

        if let Some(column) = order_by {
            rows.sort_by(|a, b| compare_columns(a.get(column), b.get(column)));
        }

        Ok(rows)
    }

    fn watch(&self, table: Table) -> Box<dyn ChangeFeed> {
        let receiver = self
            .senders
            .get(&table)
            .map(|sender| sender.subscribe())
            // All tables get a sender at construction; this arm is unreachable
            // but keeps the accessor total.
            .unwrap_or_else(|| broadcast::channel(CHANGE_CHANNEL_CAPACITY).1);

        Box::new(MemoryFeed {
            receiver,
            closed: Arc::clone(&self.closed_feeds),
        })
    }
}

/// Column ordering for `order_by`: strings lexicographically, numbers
/// numerically, everything else by its JSON text; absent values sort first.
fn compare_columns(a: Option<&Value>, b: Option<&Value>) -> std::cmp::Ordering {
    use std::cmp::Ordering;

    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => match (a.as_str(), b.as_str()) {
            (Some(a), Some(b)) => a.cmp(b),
            _ => match (a.as_f64(), b.as_f64()) {
                (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
                _ => a.to_string().cmp(&b.to_string()),
            },
        },
    }
}

struct MemoryFeed {
    receiver: broadcast::Receiver<()>,
    closed: Arc<AtomicUsize>,
}

#[async_trait]
impl ChangeFeed for MemoryFeed {
    async fn next(&mut self) -> Option<()> {
        match self.receiver.recv().await {
            Ok(()) => Some(()),
            // Coalesced wake-up; the consumer re-fetches wholesale anyway.
            Err(broadcast::error::RecvError::Lagged(_)) => Some(()),
            Err(broadcast::error::RecvError::Closed) => None,
        }
    }
}

impl Drop for MemoryFeed {
    fn drop(&mut self) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}
