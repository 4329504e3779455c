//! Typed records for the four externally-owned tables.
//!
//! Rows arrive from the store as loose JSON; [`decode_rows`] is the narrow
//! mapping boundary that turns them into these records, warning about and
//! skipping anything that does not carry the required fields. The
//! application never mutates a decoded record: every view holds a
//! point-in-time snapshot and replaces it wholesale.

use carebook_types::{
    AmbulanceId, AmbulanceStatus, AmbulanceType, BookingId, BookingStatus, UserId, WardId, WardType,
};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::store::Table;

/// An ambulance resource row. Read-only to this application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ambulance {
    pub id: AmbulanceId,
    pub vehicle_number: String,
    pub driver_name: String,
    pub driver_phone: String,
    pub ambulance_type: AmbulanceType,
    pub status: AmbulanceStatus,
    /// Absent until the vehicle reports its first location.
    #[serde(default)]
    pub current_latitude: Option<f64>,
    #[serde(default)]
    pub current_longitude: Option<f64>,
    #[serde(default)]
    pub last_location_update: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Ambulance {
    /// Position for the map, present only once both coordinates are known.
    pub fn position(&self) -> Option<(f64, f64)> {
        self.current_latitude.zip(self.current_longitude)
    }
}

/// A hospital ward resource row. `available_beds <= total_beds` is enforced
/// by the external store; this application only reads the value to gate
/// submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HospitalWard {
    pub id: WardId,
    pub ward_name: String,
    pub ward_type: WardType,
    pub total_beds: u32,
    pub available_beds: u32,
    #[serde(default)]
    pub floor_number: Option<i32>,
    pub department: String,
    #[serde(default)]
    pub amenities: Vec<String>,
    pub price_per_day: f64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl HospitalWard {
    pub fn is_full(&self) -> bool {
        self.available_beds == 0
    }
}

/// An ambulance booking request. Created once by the submission flow with
/// status `pending`; every later field is owned by the external store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmbulanceBooking {
    pub id: BookingId,
    pub user_id: UserId,
    pub patient_name: String,
    pub patient_phone: String,
    pub pickup_address: String,
    pub destination_address: String,
    pub emergency_type: String,
    pub status: BookingStatus,
    #[serde(default)]
    pub ambulance_id: Option<AmbulanceId>,
    #[serde(default)]
    pub pickup_latitude: Option<f64>,
    #[serde(default)]
    pub pickup_longitude: Option<f64>,
    #[serde(default)]
    pub destination_latitude: Option<f64>,
    #[serde(default)]
    pub destination_longitude: Option<f64>,
    #[serde(default)]
    pub estimated_arrival: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A ward booking request. Immutable after creation from this application's
/// view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WardBooking {
    pub id: BookingId,
    pub user_id: UserId,
    pub ward_id: WardId,
    pub patient_name: String,
    pub patient_age: u32,
    pub patient_phone: String,
    /// Opaque date-stamp string, exactly as submitted.
    pub admission_date: String,
    #[serde(default)]
    pub doctor_name: Option<String>,
    #[serde(default)]
    pub medical_condition: Option<String>,
    #[serde(default)]
    pub special_requirements: Option<String>,
    #[serde(default)]
    pub discharge_date: Option<String>,
    pub status: BookingStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Decodes one external row, or reports why it was rejected.
pub fn decode_row<T: DeserializeOwned>(table: Table, row: Value) -> Result<T, serde_json::Error> {
    serde_json::from_value(row).inspect_err(|err| {
        tracing::warn!(table = %table, error = %err, "rejecting malformed row");
    })
}

/// Decodes a snapshot of external rows, skipping malformed ones.
///
/// A single bad row must not take down a whole view, so rejects are logged
/// by [`decode_row`] and dropped.
pub fn decode_rows<T: DeserializeOwned>(table: Table, rows: Vec<Value>) -> Vec<T> {
    rows.into_iter()
        .filter_map(|row| decode_row(table, row).ok())
        .collect()
}
