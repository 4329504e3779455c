//! Boundary to the external managed data/identity service.
//!
//! The service owns row storage, authentication and change notifications;
//! this application consumes it exclusively through [`DataStore`]. Rows cross
//! the boundary as loose `serde_json` values and are decoded into typed
//! records in [`crate::models`]; callers never trust the external shape
//! implicitly.

mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use carebook_types::Identity;
use serde_json::Value;

use crate::error::StoreError;

/// The relational tables this application touches.
///
/// Closed on purpose: the set of tables is part of the contract with the
/// external store, not something callers compose at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Ambulances,
    AmbulanceBookings,
    HospitalWards,
    WardBookings,
}

impl Table {
    pub const ALL: [Table; 4] = [
        Table::Ambulances,
        Table::AmbulanceBookings,
        Table::HospitalWards,
        Table::WardBookings,
    ];

    /// Table name as known to the external store.
    pub fn name(&self) -> &'static str {
        match self {
            Table::Ambulances => "ambulances",
            Table::AmbulanceBookings => "ambulance_bookings",
            Table::HospitalWards => "hospital_wards",
            Table::WardBookings => "ward_bookings",
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Equality filter on a single column.
#[derive(Debug, Clone)]
pub struct Filter {
    pub column: &'static str,
    pub value: Value,
}

impl Filter {
    pub fn eq(column: &'static str, value: impl Into<Value>) -> Self {
        Self {
            column,
            value: value.into(),
        }
    }
}

/// An open change-notification subscription on one table.
///
/// The feed is owned by exactly one view; dropping it is the paired teardown
/// and runs on every exit path. Events carry no payload detail; insert,
/// update and delete are indistinguishable, and consumers react by discarding
/// their snapshot and re-fetching wholesale.
#[async_trait]
pub trait ChangeFeed: Send {
    /// Waits for the next change on the watched table.
    ///
    /// Returns `None` once the store side has shut down. Missed events while
    /// the consumer was busy may coalesce into a single wake-up; that is
    /// harmless because every event triggers the same full re-fetch.
    async fn next(&mut self) -> Option<()>;
}

/// The narrow interface consumed from the external data/identity service.
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Current authenticated identity, if any.
    async fn current_user(&self) -> Result<Option<Identity>, StoreError>;

    /// Inserts one record and returns it as stored (ids and timestamps
    /// assigned by the store). A single atomic call: either the record exists
    /// afterwards or it does not.
    async fn insert(&self, table: Table, record: Value) -> Result<Value, StoreError>;

    /// Fetches a point-in-time snapshot of rows, optionally filtered and
    /// ordered by one column.
    async fn select(
        &self,
        table: Table,
        filter: Option<Filter>,
        order_by: Option<&str>,
    ) -> Result<Vec<Value>, StoreError>;

    /// Opens a change-notification subscription on one table.
    fn watch(&self, table: Table) -> Box<dyn ChangeFeed>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_names_match_the_external_schema() {
        assert_eq!(Table::Ambulances.name(), "ambulances");
        assert_eq!(Table::AmbulanceBookings.name(), "ambulance_bookings");
        assert_eq!(Table::HospitalWards.name(), "hospital_wards");
        assert_eq!(Table::WardBookings.name(), "ward_bookings");
        assert_eq!(Table::ALL.len(), 4);
    }
}
