//! # CareBook Core
//!
//! Domain logic for the CareBook patient booking system:
//! - the [`store::DataStore`] boundary to the external managed data/identity
//!   service, plus an in-memory reference implementation
//! - typed records and the mapping boundary for external rows
//! - form validation for the two booking flows
//! - the identity and availability gates
//! - the booking submission state machine
//! - the live ambulance roster view
//!
//! **No API concerns**: HTTP routing, schemas and status mapping belong in
//! `carebook-api-rest`.

pub mod booking;
pub mod constants;
pub mod error;
pub mod models;
pub mod roster;
pub mod session;
pub mod store;
pub mod validation;

pub use booking::{
    find_ward, ward_directory, AmbulanceBookingView, SubmittedBooking, WardBookingView,
};
pub use error::{BookingError, BookingResult, StoreError};
pub use models::{decode_rows, Ambulance, AmbulanceBooking, HospitalWard, WardBooking};
pub use roster::{ambulance_snapshot, MapMarker, RosterRender, RosterView};
pub use session::require_identity;
pub use store::{ChangeFeed, DataStore, Filter, MemoryStore, Table};
pub use validation::{
    AmbulanceBookingForm, FieldViolation, Violations, WardBookingForm,
};
