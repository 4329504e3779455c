//! Booking submission flows for ambulances and hospital wards.
//!
//! Each view runs the same per-attempt machine: validate, then persist a
//! single record with status `pending` and the owning identity attached,
//! then hand the caller a dashboard navigation. Every failure path returns
//! the view to an interactive idle state; nothing is retried automatically.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use carebook_types::{Identity, Route, WardId};
use serde_json::json;

use crate::constants::{GENERIC_SUBMISSION_FAILURE, PENDING_STATUS};
use crate::error::{BookingError, BookingResult, StoreError};
use crate::models::{decode_row, decode_rows, AmbulanceBooking, HospitalWard, WardBooking};
use crate::session::require_identity;
use crate::store::{DataStore, Filter, Table};
use crate::validation::{AmbulanceBookingForm, WardBookingForm};

/// Outcome of a successful submission: the record as stored, plus where the
/// shell should navigate next.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmittedBooking<T> {
    pub booking: T,
    pub navigate_to: Route,
}

/// Releases the in-flight latch on every exit path: success, validation
/// refusal, persistence failure or cancellation.
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> BookingResult<Self> {
        if flag
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(BookingError::SubmissionInFlight);
        }
        Ok(Self { flag })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Maps an insert failure onto the user-facing persistence error, falling
/// back to the generic wording when the store gave nothing usable.
fn submission_failure(err: StoreError) -> BookingError {
    let message = match err {
        StoreError::Unavailable(message) | StoreError::Rejected(message) => message,
    };
    if message.trim().is_empty() {
        BookingError::Persistence(GENERIC_SUBMISSION_FAILURE.to_owned())
    } else {
        BookingError::Persistence(message)
    }
}

/// The ambulance booking view.
///
/// Construction runs the identity gate; an unauthenticated caller never gets
/// a view to submit through.
pub struct AmbulanceBookingView {
    store: Arc<dyn DataStore>,
    identity: Identity,
    in_flight: AtomicBool,
}

impl std::fmt::Debug for AmbulanceBookingView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AmbulanceBookingView")
            .field("identity", &self.identity)
            .field("in_flight", &self.in_flight)
            .finish_non_exhaustive()
    }
}

impl AmbulanceBookingView {
    pub async fn activate(store: Arc<dyn DataStore>) -> BookingResult<Self> {
        let identity = require_identity(store.as_ref()).await?;
        Ok(Self {
            store,
            identity,
            in_flight: AtomicBool::new(false),
        })
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Where the "back" action on this view navigates.
    pub fn back_route(&self) -> Route {
        Route::AmbulanceTracking
    }

    /// Runs one submission attempt: validate, persist once with status
    /// `pending`, navigate to the dashboard. A second call while a prior
    /// attempt is persisting is refused without touching the store.
    pub async fn submit(
        &self,
        form: AmbulanceBookingForm,
    ) -> BookingResult<SubmittedBooking<AmbulanceBooking>> {
        let _guard = InFlightGuard::acquire(&self.in_flight)?;

        let valid = form.validate().map_err(BookingError::Validation)?;

        let record = json!({
            "user_id": self.identity.id,
            "patient_name": valid.patient_name,
            "patient_phone": valid.patient_phone,
            "pickup_address": valid.pickup_address,
            "destination_address": valid.destination_address,
            "emergency_type": valid.emergency_type,
            "status": PENDING_STATUS,
        });

        let row = self
            .store
            .insert(Table::AmbulanceBookings, record)
            .await
            .map_err(submission_failure)?;

        let booking: AmbulanceBooking = decode_row(Table::AmbulanceBookings, row)
            .map_err(|_| BookingError::Persistence(GENERIC_SUBMISSION_FAILURE.to_owned()))?;

        tracing::info!(booking_id = %booking.id, "ambulance booking submitted");
        Ok(SubmittedBooking {
            booking,
            navigate_to: Route::Dashboard,
        })
    }
}

/// The ward booking view: ward directory, availability gate, booking form.
pub struct WardBookingView {
    store: Arc<dyn DataStore>,
    identity: Identity,
    selected: Mutex<Option<HospitalWard>>,
    in_flight: AtomicBool,
}

impl WardBookingView {
    pub async fn activate(store: Arc<dyn DataStore>) -> BookingResult<Self> {
        let identity = require_identity(store.as_ref()).await?;
        Ok(Self {
            store,
            identity,
            selected: Mutex::new(None),
            in_flight: AtomicBool::new(false),
        })
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Current ward directory, ordered by ward type.
    pub async fn fetch_wards(&self) -> Result<Vec<HospitalWard>, StoreError> {
        ward_directory(self.store.as_ref()).await
    }

    /// Availability gate: a ward with zero remaining beds never opens the
    /// booking form. The snapshot may be stale relative to concurrent
    /// bookings; the external store stays the source of truth.
    pub fn select_ward(&self, ward: HospitalWard) -> BookingResult<()> {
        if ward.is_full() {
            return Err(BookingError::WardFull {
                ward_name: ward.ward_name,
            });
        }
        *self.selected_lock() = Some(ward);
        Ok(())
    }

    pub fn selected_ward(&self) -> Option<HospitalWard> {
        self.selected_lock().clone()
    }

    /// Leaves the booking form and returns to the ward directory.
    pub fn clear_selection(&self) {
        *self.selected_lock() = None;
    }

    /// Runs one submission attempt against the selected ward.
    pub async fn submit(
        &self,
        form: WardBookingForm,
    ) -> BookingResult<SubmittedBooking<WardBooking>> {
        let _guard = InFlightGuard::acquire(&self.in_flight)?;

        let valid = form.validate().map_err(BookingError::Validation)?;
        let ward = self.selected_ward().ok_or(BookingError::NoWardSelected)?;

        let record = json!({
            "user_id": self.identity.id,
            "ward_id": ward.id,
            "patient_name": valid.patient_name,
            "patient_age": valid.patient_age,
            "patient_phone": valid.patient_phone,
            "admission_date": valid.admission_date,
            "doctor_name": valid.doctor_name,
            "medical_condition": valid.medical_condition,
            "special_requirements": valid.special_requirements,
            "status": PENDING_STATUS,
        });

        let row = self
            .store
            .insert(Table::WardBookings, record)
            .await
            .map_err(submission_failure)?;

        let booking: WardBooking = decode_row(Table::WardBookings, row)
            .map_err(|_| BookingError::Persistence(GENERIC_SUBMISSION_FAILURE.to_owned()))?;

        tracing::info!(booking_id = %booking.id, ward_id = %booking.ward_id, "ward booking submitted");
        Ok(SubmittedBooking {
            booking,
            navigate_to: Route::Dashboard,
        })
    }

    fn selected_lock(&self) -> std::sync::MutexGuard<'_, Option<HospitalWard>> {
        self.selected.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Fetches the ward directory snapshot, ordered by ward type.
pub async fn ward_directory(store: &dyn DataStore) -> Result<Vec<HospitalWard>, StoreError> {
    let rows = store
        .select(Table::HospitalWards, None, Some("ward_type"))
        .await?;
    Ok(decode_rows(Table::HospitalWards, rows))
}

/// Looks up one ward by id.
pub async fn find_ward(
    store: &dyn DataStore,
    id: &WardId,
) -> Result<Option<HospitalWard>, StoreError> {
    let rows = store
        .select(
            Table::HospitalWards,
            Some(Filter::eq("id", id.as_str())),
            None,
        )
        .await?;
    Ok(rows
        .into_iter()
        .next()
        .and_then(|row| decode_row(Table::HospitalWards, row).ok()))
}
