//! # CareBook REST API
//!
//! REST surface over the CareBook booking core.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation via utoipa
//! - REST-specific concerns (JSON request/response shapes, status mapping)
//!
//! Every request builds its booking view fresh against the shared
//! [`DataStore`], so the identity gate runs per request.

#![warn(rust_2018_idioms)]

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use carebook_core::{
    ambulance_snapshot, find_ward, ward_directory, Ambulance, AmbulanceBookingForm,
    AmbulanceBookingView, BookingError, DataStore, HospitalWard, SubmittedBooking,
    WardBookingForm, WardBookingView,
};
use carebook_types::{Route as NavRoute, WardId};
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};

/// Application state shared across REST handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DataStore>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        list_ambulances,
        list_wards,
        create_ambulance_booking,
        create_ward_booking
    ),
    components(schemas(
        HealthRes,
        AmbulanceRes,
        WardRes,
        AmbulanceBookingReq,
        WardBookingReq,
        BookingRes,
        ViolationRes,
        ErrorRes
    ))
)]
pub struct ApiDoc;

/// Builds the REST router over the given state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ambulances", get(list_ambulances))
        .route("/wards", get(list_wards))
        .route("/ambulance-bookings", post(create_ambulance_booking))
        .route("/ward-bookings", post(create_ward_booking))
        .with_state(state)
}

#[derive(Serialize, ToSchema)]
pub struct HealthRes {
    pub status: String,
}

#[derive(Serialize, ToSchema)]
pub struct AmbulanceRes {
    pub id: String,
    pub vehicle_number: String,
    pub driver_name: String,
    pub driver_phone: String,
    pub ambulance_type: String,
    pub status: String,
    pub current_latitude: Option<f64>,
    pub current_longitude: Option<f64>,
}

impl From<&Ambulance> for AmbulanceRes {
    fn from(ambulance: &Ambulance) -> Self {
        Self {
            id: ambulance.id.to_string(),
            vehicle_number: ambulance.vehicle_number.clone(),
            driver_name: ambulance.driver_name.clone(),
            driver_phone: ambulance.driver_phone.clone(),
            ambulance_type: ambulance.ambulance_type.to_string(),
            status: ambulance.status.to_string(),
            current_latitude: ambulance.current_latitude,
            current_longitude: ambulance.current_longitude,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct WardRes {
    pub id: String,
    pub ward_name: String,
    pub ward_type: String,
    pub total_beds: u32,
    pub available_beds: u32,
    pub floor_number: Option<i32>,
    pub department: String,
    pub amenities: Vec<String>,
    pub price_per_day: f64,
}

impl From<&HospitalWard> for WardRes {
    fn from(ward: &HospitalWard) -> Self {
        Self {
            id: ward.id.to_string(),
            ward_name: ward.ward_name.clone(),
            ward_type: ward.ward_type.to_string(),
            total_beds: ward.total_beds,
            available_beds: ward.available_beds,
            floor_number: ward.floor_number,
            department: ward.department.clone(),
            amenities: ward.amenities.clone(),
            price_per_day: ward.price_per_day,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct AmbulanceBookingReq {
    pub patient_name: String,
    pub patient_phone: String,
    pub pickup_address: String,
    pub destination_address: String,
    pub emergency_type: String,
}

impl AmbulanceBookingReq {
    fn into_form(self) -> AmbulanceBookingForm {
        AmbulanceBookingForm {
            patient_name: self.patient_name,
            patient_phone: self.patient_phone,
            pickup_address: self.pickup_address,
            destination_address: self.destination_address,
            emergency_type: self.emergency_type,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct WardBookingReq {
    pub ward_id: String,
    pub patient_name: String,
    pub patient_age: u32,
    pub patient_phone: String,
    pub admission_date: String,
    #[serde(default)]
    pub doctor_name: String,
    #[serde(default)]
    pub medical_condition: String,
    #[serde(default)]
    pub special_requirements: String,
}

impl WardBookingReq {
    fn into_form(self) -> (WardId, WardBookingForm) {
        let ward_id = WardId::new(self.ward_id);
        let form = WardBookingForm {
            patient_name: self.patient_name,
            patient_age: self.patient_age,
            patient_phone: self.patient_phone,
            admission_date: self.admission_date,
            doctor_name: self.doctor_name,
            medical_condition: self.medical_condition,
            special_requirements: self.special_requirements,
        };
        (ward_id, form)
    }
}

#[derive(Serialize, ToSchema)]
pub struct BookingRes {
    pub id: String,
    pub status: String,
    pub navigate_to: String,
}

impl BookingRes {
    fn ambulance(submitted: SubmittedBooking<carebook_core::AmbulanceBooking>) -> Self {
        Self {
            id: submitted.booking.id.to_string(),
            status: submitted.booking.status.to_string(),
            navigate_to: submitted.navigate_to.path().to_owned(),
        }
    }

    fn ward(submitted: SubmittedBooking<carebook_core::WardBooking>) -> Self {
        Self {
            id: submitted.booking.id.to_string(),
            status: submitted.booking.status.to_string(),
            navigate_to: submitted.navigate_to.path().to_owned(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct ViolationRes {
    pub field: String,
    pub message: String,
}

#[derive(Serialize, ToSchema)]
pub struct ErrorRes {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_to: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<ViolationRes>,
}

impl ErrorRes {
    fn message(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            redirect_to: None,
            violations: Vec::new(),
        }
    }
}

/// REST-side error wrapper mapping flow outcomes onto HTTP statuses.
pub enum ApiError {
    Booking(BookingError),
    NotFound(&'static str),
}

impl From<BookingError> for ApiError {
    fn from(err: BookingError) -> Self {
        ApiError::Booking(err)
    }
}

impl From<carebook_core::StoreError> for ApiError {
    fn from(err: carebook_core::StoreError) -> Self {
        ApiError::Booking(BookingError::Store(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Booking(BookingError::Validation(violations)) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorRes {
                    error: violations.first().message.clone(),
                    redirect_to: None,
                    violations: violations
                        .iter()
                        .map(|v| ViolationRes {
                            field: v.field.to_owned(),
                            message: v.message.clone(),
                        })
                        .collect(),
                },
            ),
            ApiError::Booking(err @ BookingError::AuthRequired) => (
                StatusCode::UNAUTHORIZED,
                ErrorRes {
                    error: err.to_string(),
                    redirect_to: Some(NavRoute::SignIn.path().to_owned()),
                    violations: Vec::new(),
                },
            ),
            ApiError::Booking(err @ BookingError::WardFull { .. }) => {
                (StatusCode::CONFLICT, ErrorRes::message(err.to_string()))
            }
            ApiError::Booking(err @ BookingError::SubmissionInFlight) => {
                (StatusCode::CONFLICT, ErrorRes::message(err.to_string()))
            }
            ApiError::Booking(err @ BookingError::NoWardSelected) => {
                (StatusCode::BAD_REQUEST, ErrorRes::message(err.to_string()))
            }
            ApiError::Booking(err @ BookingError::Persistence(_)) => {
                (StatusCode::BAD_GATEWAY, ErrorRes::message(err.to_string()))
            }
            ApiError::Booking(BookingError::Store(err)) => {
                tracing::warn!(error = %err, "store call failed");
                (StatusCode::BAD_GATEWAY, ErrorRes::message(err.to_string()))
            }
            ApiError::NotFound(what) => (StatusCode::NOT_FOUND, ErrorRes::message(what)),
        };
        (status, Json(body)).into_response()
    }
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint used by monitoring and load balancers.
async fn health() -> Json<HealthRes> {
    Json(HealthRes {
        status: "ok".into(),
    })
}

#[utoipa::path(
    get,
    path = "/ambulances",
    responses(
        (status = 200, description = "Current ambulance fleet snapshot", body = [AmbulanceRes]),
        (status = 502, description = "Data service failure", body = ErrorRes)
    )
)]
/// Snapshot of the ambulance fleet, as shown on the live tracking view.
async fn list_ambulances(
    State(state): State<AppState>,
) -> Result<Json<Vec<AmbulanceRes>>, ApiError> {
    let fleet = ambulance_snapshot(state.store.as_ref()).await?;
    Ok(Json(fleet.iter().map(AmbulanceRes::from).collect()))
}

#[utoipa::path(
    get,
    path = "/wards",
    responses(
        (status = 200, description = "Ward directory ordered by ward type", body = [WardRes]),
        (status = 502, description = "Data service failure", body = ErrorRes)
    )
)]
/// Ward directory, ordered by ward type as on the booking page.
async fn list_wards(State(state): State<AppState>) -> Result<Json<Vec<WardRes>>, ApiError> {
    let wards = ward_directory(state.store.as_ref()).await?;
    Ok(Json(wards.iter().map(WardRes::from).collect()))
}

#[utoipa::path(
    post,
    path = "/ambulance-bookings",
    request_body = AmbulanceBookingReq,
    responses(
        (status = 201, description = "Booking created with status pending", body = BookingRes),
        (status = 401, description = "No authenticated identity", body = ErrorRes),
        (status = 422, description = "Validation refused the form", body = ErrorRes),
        (status = 502, description = "Persistence failure", body = ErrorRes)
    )
)]
/// Submits an ambulance booking through the full validation-and-persistence
/// flow.
async fn create_ambulance_booking(
    State(state): State<AppState>,
    Json(req): Json<AmbulanceBookingReq>,
) -> Result<(StatusCode, Json<BookingRes>), ApiError> {
    let view = AmbulanceBookingView::activate(state.store.clone()).await?;
    let submitted = view.submit(req.into_form()).await?;
    Ok((StatusCode::CREATED, Json(BookingRes::ambulance(submitted))))
}

#[utoipa::path(
    post,
    path = "/ward-bookings",
    request_body = WardBookingReq,
    responses(
        (status = 201, description = "Booking created with status pending", body = BookingRes),
        (status = 401, description = "No authenticated identity", body = ErrorRes),
        (status = 404, description = "Unknown ward", body = ErrorRes),
        (status = 409, description = "Ward has no available beds", body = ErrorRes),
        (status = 422, description = "Validation refused the form", body = ErrorRes),
        (status = 502, description = "Persistence failure", body = ErrorRes)
    )
)]
/// Submits a ward booking: availability gate first, then the full
/// validation-and-persistence flow.
async fn create_ward_booking(
    State(state): State<AppState>,
    Json(req): Json<WardBookingReq>,
) -> Result<(StatusCode, Json<BookingRes>), ApiError> {
    let view = WardBookingView::activate(state.store.clone()).await?;
    let (ward_id, form) = req.into_form();

    let Some(ward) = find_ward(state.store.as_ref(), &ward_id).await? else {
        return Err(ApiError::NotFound("ward not found"));
    };
    view.select_ward(ward)?;

    let submitted = view.submit(form).await?;
    Ok((StatusCode::CREATED, Json(BookingRes::ward(submitted))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request};
    use carebook_core::{MemoryStore, Table};
    use carebook_types::Identity;
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::util::ServiceExt;

    fn app(store: Arc<MemoryStore>) -> Router {
        router(AppState { store })
    }

    async fn seeded_store() -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        store
            .seed(
                Table::HospitalWards,
                [
                    json!({
                        "id": "w1",
                        "ward_name": "General Ward A",
                        "ward_type": "general",
                        "total_beds": 20,
                        "available_beds": 5,
                        "department": "General Medicine",
                        "price_per_day": 1500.0,
                    }),
                    json!({
                        "id": "w2",
                        "ward_name": "ICU Ward 1",
                        "ward_type": "icu",
                        "total_beds": 8,
                        "available_beds": 0,
                        "department": "Critical Care",
                        "price_per_day": 8000.0,
                    }),
                ],
            )
            .await;
        store
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn ambulance_booking_body() -> Value {
        json!({
            "patient_name": "Jane Doe",
            "patient_phone": "9999999999",
            "pickup_address": "12 Elm St, city",
            "destination_address": "City Hospital",
            "emergency_type": "Cardiac Emergency",
        })
    }

    #[tokio::test]
    async fn health_endpoint_answers_ok() {
        let store = seeded_store().await;
        let response = app(store)
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unauthenticated_booking_is_401_with_redirect() {
        let store = seeded_store().await;
        let response = app(store)
            .oneshot(post_json("/ambulance-bookings", ambulance_booking_body()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["redirect_to"], "/login");
    }

    #[tokio::test]
    async fn invalid_form_is_422_with_violations() {
        let store = seeded_store().await;
        store.sign_in(Identity::new("user-1"));

        let mut body = ambulance_booking_body();
        body["patient_phone"] = json!("123");
        let response = app(store.clone())
            .oneshot(post_json("/ambulance-bookings", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Valid phone number required");
        assert_eq!(body["violations"][0]["field"], "patient_phone");
        assert_eq!(store.insert_count(Table::AmbulanceBookings), 0);
    }

    #[tokio::test]
    async fn valid_ambulance_booking_is_created() {
        let store = seeded_store().await;
        store.sign_in(Identity::new("user-1"));

        let response = app(store.clone())
            .oneshot(post_json("/ambulance-bookings", ambulance_booking_body()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["status"], "pending");
        assert_eq!(body["navigate_to"], "/dashboard");
        assert_eq!(store.insert_count(Table::AmbulanceBookings), 1);
    }

    fn ward_booking_body(ward_id: &str) -> Value {
        json!({
            "ward_id": ward_id,
            "patient_name": "Jane Doe",
            "patient_age": 42,
            "patient_phone": "9999999999",
            "admission_date": "2026-09-01",
        })
    }

    #[tokio::test]
    async fn ward_booking_against_full_ward_is_409() {
        let store = seeded_store().await;
        store.sign_in(Identity::new("user-1"));

        let response = app(store.clone())
            .oneshot(post_json("/ward-bookings", ward_booking_body("w2")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(store.insert_count(Table::WardBookings), 0);
    }

    #[tokio::test]
    async fn ward_booking_against_unknown_ward_is_404() {
        let store = seeded_store().await;
        store.sign_in(Identity::new("user-1"));

        let response = app(store)
            .oneshot(post_json("/ward-bookings", ward_booking_body("w9")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn valid_ward_booking_is_created() {
        let store = seeded_store().await;
        store.sign_in(Identity::new("user-1"));

        let response = app(store.clone())
            .oneshot(post_json("/ward-bookings", ward_booking_body("w1")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["status"], "pending");
        assert_eq!(store.insert_count(Table::WardBookings), 1);
    }

    #[tokio::test]
    async fn ward_directory_is_ordered_by_type() {
        let store = seeded_store().await;
        let response = app(store)
            .oneshot(Request::get("/wards").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body[0]["ward_type"], "general");
        assert_eq!(body[1]["ward_type"], "icu");
    }

    #[tokio::test]
    async fn persistence_failure_is_502_with_the_store_message() {
        let store = seeded_store().await;
        store.sign_in(Identity::new("user-1"));
        store.fail_next_insert("row level security policy violation");

        let response = app(store)
            .oneshot(post_json("/ambulance-bookings", ambulance_booking_body()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = body_json(response).await;
        assert_eq!(body["error"], "row level security policy violation");
    }
}
