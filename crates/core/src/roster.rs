//! Live ambulance roster: a snapshot of the fleet plus a change feed.
//!
//! The view holds the most recent full snapshot of the `ambulances` table
//! and re-fetches it wholesale whenever the store signals any change: no
//! diffing, no merging. Dropping the view drops its change feed, which is
//! the subscription's one and only teardown.

use std::sync::Arc;

use carebook_types::{AmbulanceId, AmbulanceStatus, AmbulanceType, Route};
use serde::Serialize;

use crate::constants::DEFAULT_MAP_CENTER;
use crate::error::StoreError;
use crate::models::{decode_rows, Ambulance};
use crate::store::{ChangeFeed, DataStore, Table};

/// One map marker: an ambulance whose position is known.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapMarker {
    pub id: AmbulanceId,
    pub position: (f64, f64),
    pub vehicle_number: String,
    pub ambulance_type: AmbulanceType,
    pub status: AmbulanceStatus,
    pub driver_name: String,
}

/// What the roster draws: every row as a list entry, and a marker for each
/// row with both coordinates present.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RosterRender {
    pub center: (f64, f64),
    pub markers: Vec<MapMarker>,
    pub entries: Vec<Ambulance>,
}

pub struct RosterView {
    store: Arc<dyn DataStore>,
    feed: Box<dyn ChangeFeed>,
    snapshot: Vec<Ambulance>,
}

impl RosterView {
    /// Opens the view: acquires the change feed, then fetches the initial
    /// snapshot. There is no ordering guarantee between the fetch and the
    /// first notification; a redundant re-fetch is idempotent.
    pub async fn open(store: Arc<dyn DataStore>) -> Result<Self, StoreError> {
        let feed = store.watch(Table::Ambulances);
        let snapshot = ambulance_snapshot(store.as_ref()).await?;
        tracing::info!(ambulances = snapshot.len(), "roster view opened");
        Ok(Self {
            store,
            feed,
            snapshot,
        })
    }

    pub fn snapshot(&self) -> &[Ambulance] {
        &self.snapshot
    }

    /// Where the "Book Ambulance" action on this view navigates.
    pub fn booking_route(&self) -> Route {
        Route::AmbulanceBooking
    }

    pub fn render(&self) -> RosterRender {
        let markers = self
            .snapshot
            .iter()
            .filter_map(|ambulance| {
                ambulance.position().map(|position| MapMarker {
                    id: ambulance.id.clone(),
                    position,
                    vehicle_number: ambulance.vehicle_number.clone(),
                    ambulance_type: ambulance.ambulance_type,
                    status: ambulance.status,
                    driver_name: ambulance.driver_name.clone(),
                })
            })
            .collect();

        RosterRender {
            center: DEFAULT_MAP_CENTER,
            markers,
            entries: self.snapshot.clone(),
        }
    }

    /// Waits for the next change notification and replaces the snapshot.
    ///
    /// Returns `false` once the store side has shut down and no further
    /// changes can arrive.
    pub async fn sync(&mut self) -> Result<bool, StoreError> {
        if self.feed.next().await.is_none() {
            return Ok(false);
        }
        self.refresh().await?;
        Ok(true)
    }

    /// Discards the held snapshot and fetches the current one.
    pub async fn refresh(&mut self) -> Result<(), StoreError> {
        self.snapshot = ambulance_snapshot(self.store.as_ref()).await?;
        Ok(())
    }
}

/// Fetches and decodes the full ambulance table.
pub async fn ambulance_snapshot(store: &dyn DataStore) -> Result<Vec<Ambulance>, StoreError> {
    let rows = store.select(Table::Ambulances, None, None).await?;
    Ok(decode_rows(Table::Ambulances, rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::{json, Value};

    fn ambulance_row(id: &str, coords: Option<(f64, f64)>) -> Value {
        let mut row = json!({
            "id": id,
            "vehicle_number": format!("DL-01-{id}"),
            "driver_name": "Ravi Kumar",
            "driver_phone": "9876543210",
            "ambulance_type": "basic",
            "status": "available",
        });
        if let Some((lat, lon)) = coords {
            row["current_latitude"] = json!(lat);
            row["current_longitude"] = json!(lon);
        }
        row
    }

    async fn seeded_store() -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        store
            .seed(
                Table::Ambulances,
                [
                    ambulance_row("a1", Some((28.61, 77.21))),
                    ambulance_row("a2", None),
                    ambulance_row("a3", Some((28.55, 77.10))),
                ],
            )
            .await;
        store
    }

    #[tokio::test]
    async fn renders_a_marker_per_located_row_and_an_entry_per_row() {
        let store = seeded_store().await;
        let view = RosterView::open(store.clone()).await.unwrap();

        let render = view.render();
        assert_eq!(render.entries.len(), 3);
        assert_eq!(render.markers.len(), 2);
        assert_eq!(render.center, DEFAULT_MAP_CENTER);
        assert_eq!(render.markers[0].position, (28.61, 77.21));
    }

    #[tokio::test]
    async fn re_fetching_without_changes_renders_identically() {
        let store = seeded_store().await;
        let mut view = RosterView::open(store.clone()).await.unwrap();

        let before = view.render();
        view.refresh().await.unwrap();
        assert_eq!(view.render(), before);
    }

    #[tokio::test]
    async fn change_notification_triggers_a_wholesale_refetch() {
        let store = seeded_store().await;
        let mut view = RosterView::open(store.clone()).await.unwrap();
        assert_eq!(view.snapshot().len(), 3);

        store
            .insert(Table::Ambulances, ambulance_row("a4", Some((28.7, 77.3))))
            .await
            .unwrap();

        assert!(view.sync().await.unwrap());
        assert_eq!(view.snapshot().len(), 4);
        assert_eq!(view.render().markers.len(), 3);
    }

    #[tokio::test]
    async fn teardown_closes_the_feed_exactly_once() {
        let store = seeded_store().await;
        let mut view = RosterView::open(store.clone()).await.unwrap();

        // Several notifications before teardown must not change the count.
        for _ in 0..3 {
            store
                .insert(Table::Ambulances, ambulance_row("x", None))
                .await
                .unwrap();
        }
        view.sync().await.unwrap();

        assert_eq!(store.closed_feeds(), 0);
        drop(view);
        assert_eq!(store.closed_feeds(), 1);
    }

    #[tokio::test]
    async fn malformed_rows_are_skipped_not_fatal() {
        let store = seeded_store().await;
        store
            .seed(Table::Ambulances, [json!({ "id": "broken" })])
            .await;

        let view = RosterView::open(store.clone()).await.unwrap();
        assert_eq!(view.snapshot().len(), 3);
    }
}
